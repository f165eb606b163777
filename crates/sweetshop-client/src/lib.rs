pub mod auth;
pub mod catalog;
pub mod client;
pub mod error;
pub mod upload;

pub use auth::{token_provider_from_config, LocalLogin, NoAuth, StaticToken, TokenProvider};
pub use catalog::{Catalog, CatalogSync, SyncState};
pub use client::{RegisteredUser, ShopClient};
pub use error::ClientError;
pub use upload::ImageUpload;
