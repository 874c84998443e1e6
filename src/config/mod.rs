use crate::domain::PaymentMethod;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid api base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/* =======================
CLI ARGS
======================= */

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "storefront.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        full_name: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update name, phone or address
    Profile {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Change the account password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// List products page by page
    Products {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Show one product
    Product { id: i64 },
    /// Search products by name
    Search { query: String },
    /// List categories
    Categories,
    /// List products of one category
    Category { id: i64 },
    /// Toggle a product in the local favorites list
    Favorite { id: i64 },
    /// List favorite product ids
    Favorites,
    /// Cart operations
    #[command(subcommand)]
    Cart(CartCommand),
    /// Place an order for the current cart
    Checkout {
        #[arg(short, long)]
        address: String,
        #[arg(short, long, default_value = "COD")]
        payment: PaymentMethod,
    },
    /// Order history and tracking
    #[command(subcommand)]
    Orders(OrderCommand),
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    Show,
    Add {
        product_id: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    Update {
        cart_id: i64,
        quantity: i64,
    },
    Remove {
        cart_id: i64,
    },
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    List,
    Show { id: i64 },
    Cancel { id: i64 },
    Status { id: i64 },
}

/* =======================
MAIN CONFIG
======================= */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cart: CartConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Defaults to the per-user data directory.
    pub path: Option<PathBuf>,
}

/* =======================
LOAD / CREATE CONFIG
======================= */

impl Config {
    /// Reads `path`, writing the defaults there first when it is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut cfg = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            let cfg = Config::default();
            let content = serde_json::to_string_pretty(&cfg)?;
            std::fs::write(path, content)?;
            cfg
        };

        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.api.base_url.clone(),
            reason,
        };

        let url = url::Url::parse(&self.api.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {}", other))),
        }
    }
}

// ==================================================
// ENVIRONMENT HELPERS
// ==================================================

impl Config {
    /// `STOREFRONT_API_URL` and `STOREFRONT_STORAGE` win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("STOREFRONT_API_URL") {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        if let Ok(path) = env::var("STOREFRONT_STORAGE") {
            if !path.trim().is_empty() {
                self.storage.path = Some(PathBuf::from(path.trim()));
            }
        }
    }
}
