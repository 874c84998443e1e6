pub mod cart;
pub mod client;
pub mod config;
pub mod domain;
pub mod logging;
pub mod services;
pub mod storage;
