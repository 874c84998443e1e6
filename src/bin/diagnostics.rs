use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront_client::cart::{CartStore, RetryPolicy};
use storefront_client::client::{ApiClient, ApiError};
use storefront_client::config::Config;
use storefront_client::services::{CatalogService, HttpCartService, UserService};
use storefront_client::storage::Storage;

// ==================================================
// DIAGNOSTICS STRUCTURE
// ==================================================
struct Diagnostic {
    name: String,
    status: DiagStatus,
    message: String,
}

enum DiagStatus {
    Pass,
    Warn,
    Fail,
}

impl DiagStatus {
    fn icon(&self) -> &str {
        match self {
            DiagStatus::Pass => "✅",
            DiagStatus::Warn => "⚠️ ",
            DiagStatus::Fail => "❌",
        }
    }
}

impl Diagnostic {
    fn new(name: &str, status: DiagStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
        }
    }
}

// ==================================================
// MAIN DIAGNOSTICS RUNNER
// ==================================================
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    print_header();

    let total_tests = 5;
    let mut results = Vec::new();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("storefront.json"));

    // TEST 1: Configuration
    print_test(1, total_tests, "Loading configuration");
    let config = match Config::load(&config_path) {
        Ok(cfg) => {
            results.push(Diagnostic::new(
                "Configuration",
                DiagStatus::Pass,
                format!("API base URL: {}", cfg.api.base_url),
            ));
            cfg
        }
        Err(e) => {
            results.push(Diagnostic::new("Configuration", DiagStatus::Fail, e.to_string()));
            print_results(&results);
            return Ok(());
        }
    };

    // TEST 2: Local storage
    print_test(2, total_tests, "Opening local storage");
    let (storage, diag) = check_storage(&config).await;
    results.push(diag);

    let api = match ApiClient::new(&config.api.base_url, config.api.timeout(), storage.clone()) {
        Ok(api) => api,
        Err(e) => {
            results.push(Diagnostic::new("API client", DiagStatus::Fail, e.to_string()));
            print_results(&results);
            return Ok(());
        }
    };

    // TEST 3: Public endpoint
    print_test(3, total_tests, "Reaching the catalog API");
    results.push(check_catalog(&api).await);

    // TEST 4: Credentials
    print_test(4, total_tests, "Checking stored credentials");
    let signed_in = storage.get_token().await.is_some();
    results.push(check_account(&api, signed_in).await);

    // TEST 5: Cart endpoint
    print_test(5, total_tests, "Loading the cart");
    results.push(check_cart(&api, signed_in).await);

    print_results(&results);
    Ok(())
}

async fn check_storage(config: &Config) -> (Storage, Diagnostic) {
    let path = match config.storage.path.clone().map(Ok).unwrap_or_else(Storage::default_path) {
        Ok(path) => path,
        Err(e) => {
            return (
                Storage::in_memory(),
                Diagnostic::new("Local storage", DiagStatus::Warn, format!("{}; using memory", e)),
            )
        }
    };

    match Storage::open(&path).await {
        Ok(storage) => (
            storage,
            Diagnostic::new("Local storage", DiagStatus::Pass, format!("{}", path.display())),
        ),
        Err(e) => (
            Storage::in_memory(),
            Diagnostic::new("Local storage", DiagStatus::Fail, format!("{}: {}", path.display(), e)),
        ),
    }
}

async fn check_catalog(api: &ApiClient) -> Diagnostic {
    match CatalogService::new(api.clone()).categories().await {
        Ok(categories) => Diagnostic::new(
            "Catalog API",
            DiagStatus::Pass,
            format!("{} categories", categories.len()),
        ),
        Err(ApiError::Network(e)) => {
            Diagnostic::new("Catalog API", DiagStatus::Fail, format!("Failed to connect: {}", e))
        }
        Err(e) => Diagnostic::new("Catalog API", DiagStatus::Warn, e.to_string()),
    }
}

async fn check_account(api: &ApiClient, signed_in: bool) -> Diagnostic {
    if !signed_in {
        return Diagnostic::new(
            "Account",
            DiagStatus::Warn,
            "No stored token; run `storefront login`",
        );
    }

    match UserService::new(api.clone()).me().await {
        Ok(user) => Diagnostic::new(
            "Account",
            DiagStatus::Pass,
            format!("{} ({})", user.username, user.role),
        ),
        Err(ApiError::Unauthorized) => Diagnostic::new(
            "Account",
            DiagStatus::Fail,
            "Token rejected and cleared; sign in again",
        ),
        Err(e) => Diagnostic::new("Account", DiagStatus::Fail, e.to_string()),
    }
}

async fn check_cart(api: &ApiClient, signed_in: bool) -> Diagnostic {
    if !signed_in {
        return Diagnostic::new("Cart", DiagStatus::Warn, "Skipped (not signed in)");
    }

    let store = CartStore::new(
        Arc::new(HttpCartService::new(api.clone())),
        RetryPolicy {
            max_retries: 0,
            base_delay: Duration::ZERO,
        },
    );

    match store.load().await {
        Ok(()) => {
            let cart = store.cart();
            let mut message = format!("{} line(s), total {}", cart.items.len(), cart.total_price);
            if !cart.totals_consistent() {
                message.push_str("\nServer totals do not match line items");
                return Diagnostic::new("Cart", DiagStatus::Warn, message);
            }
            Diagnostic::new("Cart", DiagStatus::Pass, message)
        }
        Err(e) => Diagnostic::new("Cart", DiagStatus::Fail, e.to_string()),
    }
}

fn print_header() {
    println!("\n╔════════════════════════════════════════════════╗");
    println!("║   STOREFRONT CLIENT - DIAGNOSTICS              ║");
    println!("╚════════════════════════════════════════════════╝\n");
}

fn print_test(num: usize, total: usize, description: &str) {
    println!("[{}/{}] {}...", num, total, description);
}

fn print_results(results: &[Diagnostic]) {
    println!();

    let mut passed = 0;
    let mut warned = 0;
    let mut failed = 0;

    for diag in results {
        match diag.status {
            DiagStatus::Pass => passed += 1,
            DiagStatus::Warn => warned += 1,
            DiagStatus::Fail => failed += 1,
        }

        println!("{} {}", diag.status.icon(), diag.name);
        if !diag.message.is_empty() {
            for line in diag.message.lines() {
                println!("   {}", line);
            }
        }
    }

    println!("\n╔════════════════════════════════════════════════╗");
    println!("║           DIAGNOSTICS SUMMARY                  ║");
    println!("╚════════════════════════════════════════════════╝");
    println!("\n✅ Passed:  {}", passed);
    println!("⚠️  Warnings: {}", warned);
    println!("❌ Failed:  {}", failed);

    if failed == 0 {
        println!("\n✅ Client is ready! Some warnings noted above.");
    } else {
        println!("\n❌ Client has issues. Fix failures above before using it.");
    }
    println!();
}
