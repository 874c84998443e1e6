use storefront_client::*;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use config::{Args, CartCommand, Command, Config, OrderCommand};
use log::{info, warn};
use std::sync::Arc;

use cart::{CartNotice, CartStore, RetryPolicy};
use client::ApiClient;
use domain::time::time_since;
use domain::{
    CartData, CreateOrder, LoginRequest, Order, PasswordChange, Product, ProfileUpdate,
    RegisterRequest,
};
use services::{AuthService, CatalogService, HttpCartService, OrderService, UserService};
use storage::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("loading config from {:?}", args.config))?;

    // ===============================
    // STORAGE + API CLIENT
    // ===============================
    let storage_path = match &config.storage.path {
        Some(path) => path.clone(),
        None => Storage::default_path()?,
    };
    let storage = Storage::open(&storage_path).await?;

    let api = ApiClient::new(&config.api.base_url, config.api.timeout(), storage.clone())?;
    info!("🌐 API: {}", api.base_url());

    match args.command {
        Command::Login { username, password } => {
            let user = AuthService::new(api)
                .login_and_store(&LoginRequest { username, password })
                .await?;
            println!("{} {} <{}>", "Signed in:".green(), user.full_name, user.email);
        }

        Command::Register {
            username,
            password,
            email,
            full_name,
        } => {
            let request = RegisterRequest {
                username,
                password,
                email,
                full_name,
            };
            let response = AuthService::new(api).register(&request).await?;
            let message = response.message.unwrap_or_else(|| "Account created".to_string());
            println!("{} {}", "✔".green(), message);
        }

        Command::Logout => {
            AuthService::new(api).logout().await?;
            println!("Signed out.");
        }

        Command::Whoami => match UserService::new(api).current().await? {
            Some(user) => {
                println!("{} ({})", user.full_name.bold(), user.username);
                println!("  email:   {}", user.email);
                println!("  role:    {}", user.role);
                if let Some(phone) = &user.phone {
                    println!("  phone:   {}", phone);
                }
                if let Some(address) = &user.address {
                    println!("  address: {}", address);
                }
            }
            None => println!("{}", "Not signed in.".yellow()),
        },

        Command::Profile {
            full_name,
            phone,
            address,
        } => {
            require_login(&storage).await?;
            let update = ProfileUpdate {
                full_name,
                phone,
                address,
            };
            let user = UserService::new(api).update_profile(&update).await?;
            println!("{} {} <{}>", "Profile updated:".green(), user.full_name, user.email);
        }

        Command::Password { current, new } => {
            require_login(&storage).await?;
            let change = PasswordChange {
                current_password: current,
                new_password: new,
            };
            let message = UserService::new(api).change_password(&change).await?;
            println!("{} {}", "✔".green(), message.unwrap_or_else(|| "Password changed".to_string()));
        }

        Command::Products { page, size } => {
            let listing = CatalogService::new(api).products(page, size).await?;
            for product in &listing.content {
                print_product_line(product);
            }
            println!(
                "{}",
                format!(
                    "page {}/{} · {} products",
                    listing.pageable.page_number + 1,
                    listing.total_pages.max(1),
                    listing.total_elements
                )
                .dimmed()
            );
        }

        Command::Product { id } => {
            let product = CatalogService::new(api).product(id).await?;
            let favorite = storage.is_favorite(product.product_id).await;
            print_product_detail(&product, favorite);
        }

        Command::Search { query } => {
            let results = CatalogService::new(api).search(&query).await?;
            if results.is_empty() {
                println!("No products match {:?}.", query);
            }
            for product in &results {
                print_product_line(product);
            }
        }

        Command::Categories => {
            for category in CatalogService::new(api).categories().await? {
                let marker = if category.is_active { "" } else { " (inactive)" };
                println!("#{:<4} {}{}", category.category_id, category.name, marker);
            }
        }

        Command::Category { id } => {
            for product in &CatalogService::new(api).by_category(id).await? {
                print_product_line(product);
            }
        }

        Command::Favorite { id } => {
            if storage.toggle_favorite(id).await? {
                println!("{} product #{} added to favorites", "♥".red(), id);
            } else {
                println!("product #{} removed from favorites", id);
            }
        }

        Command::Favorites => {
            let favorites = storage.favorites().await;
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for id in favorites {
                println!("♥ #{}", id);
            }
        }

        Command::Cart(command) => {
            require_login(&storage).await?;
            let store = open_cart(&api, &config);
            run_cart(&store, command).await?;
        }

        Command::Checkout { address, payment } => {
            require_login(&storage).await?;
            let store = open_cart(&api, &config);
            if store.load().await.is_ok() && store.cart().is_empty() {
                warn!("🛒 Cart is empty, nothing to check out");
                return Ok(());
            }

            let request = CreateOrder {
                payment_method: payment,
                shipping_address: address,
            };
            let order = OrderService::new(api).checkout(&store, &request).await?;
            store.settled().await;
            println!("{} order #{}", "Order placed:".green().bold(), order.order_id);
            print_order(&order);
        }

        Command::Orders(command) => {
            require_login(&storage).await?;
            let orders = OrderService::new(api);
            match command {
                OrderCommand::List => {
                    let list = orders.list().await?;
                    if list.is_empty() {
                        println!("No orders yet.");
                    }
                    for order in &list {
                        let age = order.created_at.map(time_since).unwrap_or_default();
                        println!(
                            "#{:<6} {:<12} {:>12} {} item(s) {}",
                            order.order_id,
                            order.status,
                            order.total_amount.to_string(),
                            order.item_count(),
                            age.dimmed()
                        );
                    }
                }
                OrderCommand::Show { id } => print_order(&orders.get(id).await?),
                OrderCommand::Cancel { id } => {
                    let order = orders.cancel(id).await?;
                    println!("Order #{} is now {}", order.order_id, order.status.yellow());
                }
                OrderCommand::Status { id } => {
                    let status = orders.status(id).await?;
                    println!("Order #{}: {}", status.order_id, status.status.bold());
                    if !status.message.is_empty() {
                        println!("  {}", status.message);
                    }
                }
            }
        }
    }

    Ok(())
}

// ===============================
// CART
// ===============================

fn open_cart(api: &ApiClient, config: &Config) -> CartStore {
    let service = Arc::new(HttpCartService::new(api.clone()));
    CartStore::new(service, RetryPolicy::from(&config.cart))
}

async fn run_cart(store: &CartStore, command: CartCommand) -> Result<()> {
    let mut notices = store.notices();

    // Initial refresh, waiting out retries so the command sees real data.
    let loaded = store.load().await;
    let mutating = !matches!(command, CartCommand::Show);

    let outcome = match command {
        CartCommand::Show => loaded,
        CartCommand::Add {
            product_id,
            quantity,
        } => store.add(product_id, quantity).await.map(|_| ()),
        CartCommand::Update { cart_id, quantity } => {
            store.update_quantity(cart_id, quantity).await.map(|_| ())
        }
        CartCommand::Remove { cart_id } => store.remove(cart_id).await.map(|_| ()),
        CartCommand::Clear => store.clear().await.map(|_| ()),
    };

    // A failed reconciling fetch keeps retrying in the background.
    store.settled().await;
    while let Ok(CartNotice::LoadFailed { message }) = notices.try_recv() {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    if let (true, Err(e)) = (mutating, &outcome) {
        eprintln!("{} {}", "Cart update failed:".red(), e);
    }
    let state = store.snapshot();
    if state.error.is_none() {
        print_cart(&state.cart);
    }

    Ok(outcome?)
}

async fn require_login(storage: &Storage) -> Result<()> {
    if storage.get_token().await.is_none() {
        anyhow::bail!("not signed in, run `storefront login` first");
    }
    Ok(())
}

// ===============================
// OUTPUT
// ===============================

fn print_cart(cart: &CartData) {
    if cart.is_empty() {
        println!("{}", "Your cart is empty.".dimmed());
        return;
    }

    for item in &cart.items {
        println!(
            "[{:>5}] {:<32} {:>3} × {:>10} = {:>10}  {}",
            item.cart_id,
            item.product_name,
            item.quantity,
            item.sale_price.to_string(),
            item.sub_total.to_string(),
            time_since(item.added_at).dimmed()
        );
    }

    println!(
        "{} {} item(s), total {}",
        "Cart:".bold(),
        cart.total_items,
        cart.total_price.to_string().green().bold()
    );
    if !cart.totals_consistent() {
        println!("{}", "(totals are still syncing)".yellow());
    }
}

fn print_product_line(product: &Product) {
    let price = match product.discount_percent() {
        Some(pct) => format!(
            "{} {} -{}%",
            product.sale_price,
            product.price.to_string().strikethrough(),
            pct
        ),
        None => product.sale_price.to_string(),
    };
    let stock = if product.in_stock() {
        String::new()
    } else {
        " sold out".red().to_string()
    };
    println!("#{:<5} {:<36} {}{}", product.product_id, product.name, price, stock);
}

fn print_product_detail(product: &Product, favorite: bool) {
    let heart = if favorite { " ♥" } else { "" };
    println!("{}{}", product.name.bold(), heart.red());
    println!("  category: {}", product.category_name);
    print_product_line(product);
    if let Some(rating) = product.rating {
        println!("  rating:   {:.1}", rating);
    }
    println!("  stock:    {}", product.stock);
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
}

fn print_order(order: &Order) {
    println!("Order #{} · {}", order.order_id, order.status.bold());
    println!("  payment:  {}", order.payment_method);
    println!("  ship to:  {}", order.shipping_address);
    if let Some(created) = order.created_at {
        println!("  placed:   {}", time_since(created));
    }
    for item in &order.items {
        println!("  - product #{} × {} @ {}", item.product_id, item.quantity, item.price);
    }
    println!("  total:    {}", order.total_amount.to_string().green());
}
