pub mod app_config;
pub mod config;
pub mod filter;
pub mod products;
pub mod purchase;
pub mod roles;
pub mod stats;

pub use app_config::{AppConfig, AuthMode, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{filter_products, CategoryFilter, FilterCriteria, PriceCeiling};
pub use products::{Product, PurchaseRecord, SweetDraft, KNOWN_CATEGORIES, PRICE_CEILINGS};
pub use purchase::{
    display_total, parse_restock_quantity, reconcile_quantity, PurchaseRequest, QuantitySelector,
};
pub use roles::{load_identity_profile, IdentityProfile, Role, RoleResolver, RoleStrategy};
pub use stats::{InventoryStats, PurchaseSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read identity profile {path}: {source}")]
    IdentityFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse identity profile: {0}")]
    IdentityFileParse(#[source] serde_yaml::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("sweet name must not be empty")]
    EmptyName,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("price must not be negative (got {0})")]
    NegativePrice(rust_decimal::Decimal),

    #[error("restock quantity must be a positive integer (got {0:?})")]
    InvalidRestockQuantity(String),
}
