pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use auth::{AuthError, AuthService};
pub use cart::{CartService, HttpCartService};
pub use catalog::CatalogService;
pub use order::{OrderError, OrderService};
pub use user::UserService;
