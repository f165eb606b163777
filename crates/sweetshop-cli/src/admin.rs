//! Inventory management command handlers for the CLI.
//!
//! Every mutation goes through [`CatalogSync`] so the catalog is re-fetched
//! after the backend accepts it. The backend enforces authorization; the role
//! gate here only applies when an identity profile is configured.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use sweetshop_client::{CatalogSync, ImageUpload, ShopClient};
use sweetshop_core::{parse_restock_quantity, AppConfig, InventoryStats, SweetDraft};

use crate::shop::{print_products, resolve_role};

/// Sub-commands available under `admin`.
#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Show inventory and sales statistics
    Stats,
    /// Add a new sweet
    Add(NewSweet),
    /// Edit an existing sweet; omitted fields keep their current value
    Edit {
        id: i64,
        #[command(flatten)]
        changes: SweetChanges,
    },
    /// Delete a sweet
    Delete { id: i64 },
    /// Add stock to a sweet
    Restock {
        id: i64,
        /// Units to add (must be positive)
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Suggest image URLs for a sweet name
    Images { query: String },
}

#[derive(Debug, Args)]
pub struct NewSweet {
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    quantity: u32,
    #[arg(long)]
    description: Option<String>,
    #[command(flatten)]
    image: ImageArgs,
}

#[derive(Debug, Args)]
pub struct SweetChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    quantity: Option<u32>,
    #[arg(long)]
    description: Option<String>,
    #[command(flatten)]
    image: ImageArgs,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Local image file uploaded with the sweet
    #[arg(long = "image")]
    image_path: Option<PathBuf>,
    /// Remote image URL stored on the sweet
    #[arg(long)]
    image_url: Option<String>,
}

impl ImageArgs {
    async fn upload(&self) -> anyhow::Result<Option<ImageUpload>> {
        match &self.image_path {
            Some(path) => Ok(Some(ImageUpload::from_path(path).await?)),
            None => Ok(None),
        }
    }
}

impl SweetChanges {
    pub(crate) fn apply(&self, draft: &mut SweetDraft) {
        if let Some(name) = &self.name {
            draft.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            draft.category.clone_from(category);
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(quantity) = self.quantity {
            draft.quantity = quantity;
        }
        if self.description.is_some() {
            draft.description.clone_from(&self.description);
        }
        if self.image.image_url.is_some() {
            draft.image_url.clone_from(&self.image.image_url);
        }
    }
}

/// Refuse admin commands when the identity profile resolves to a non-admin.
///
/// # Errors
///
/// Returns an error if the profile cannot be loaded or the role is not
/// `ADMIN`.
pub(crate) fn ensure_admin(config: &AppConfig) -> anyhow::Result<()> {
    match resolve_role(config)? {
        Some(role) if !role.is_admin() => {
            anyhow::bail!("admin commands require the ADMIN role (resolved {role})")
        }
        Some(_) => Ok(()),
        None => {
            tracing::debug!("no identity profile configured; leaving authorization to the backend");
            Ok(())
        }
    }
}

/// Dispatch an `admin` sub-command.
///
/// # Errors
///
/// Returns an error carrying the backend's message (or a generic one) when
/// the backend rejects the action.
pub(crate) async fn run_admin(client: &ShopClient, command: AdminCommands) -> anyhow::Result<()> {
    match command {
        AdminCommands::Stats => run_admin_stats(client).await,
        AdminCommands::Add(sweet) => run_admin_add(client, sweet).await,
        AdminCommands::Edit { id, changes } => run_admin_edit(client, id, changes).await,
        AdminCommands::Delete { id } => run_admin_delete(client, id).await,
        AdminCommands::Restock { id, quantity } => run_admin_restock(client, id, &quantity).await,
        AdminCommands::Images { query } => run_admin_images(client, &query).await,
    }
}

async fn run_admin_stats(client: &ShopClient) -> anyhow::Result<()> {
    let mut sync = CatalogSync::new(client);
    sync.refresh()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load sweets")))?;
    let purchases = client
        .all_purchases()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load purchases")))?;

    let stats: InventoryStats = sync.catalog().stats(&purchases);
    println!("{:<18}{}", "Total sweets", stats.total_sweets);
    println!("{:<18}${:.2}", "Inventory value", stats.total_value);
    println!("{:<18}{}", "Purchases", stats.total_purchases);
    println!("{:<18}${:.2}", "Revenue", stats.revenue);
    println!(
        "{:<18}{} ({} low, {} out)",
        "Stock alerts",
        stats.stock_alerts(),
        stats.low_stock,
        stats.out_of_stock
    );

    if stats.stock_alerts() > 0 {
        println!();
        let alerts: Vec<_> = sync
            .catalog()
            .products()
            .iter()
            .filter(|p| p.quantity < sweetshop_core::stats::LOW_STOCK_THRESHOLD)
            .collect();
        print_products(&alerts);
    }
    Ok(())
}

async fn run_admin_add(client: &ShopClient, sweet: NewSweet) -> anyhow::Result<()> {
    let image = sweet.image.upload().await?;
    let draft = SweetDraft {
        name: sweet.name,
        category: sweet.category,
        price: sweet.price,
        quantity: sweet.quantity,
        description: sweet.description,
        image_url: sweet.image.image_url,
    };

    let mut sync = CatalogSync::new(client);
    let product = sync
        .create(draft, image)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to save sweet")))?;
    println!("Sweet added successfully (id {})", product.id);
    Ok(())
}

async fn run_admin_edit(client: &ShopClient, id: i64, changes: SweetChanges) -> anyhow::Result<()> {
    let mut sync = CatalogSync::new(client);
    sync.refresh()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load sweets")))?;
    let mut draft = sync
        .catalog()
        .find(id)
        .map(SweetDraft::from)
        .ok_or_else(|| anyhow::anyhow!("sweet {id} not found"))?;
    changes.apply(&mut draft);
    let image = changes.image.upload().await?;

    sync.update(id, draft, image)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to save sweet")))?;
    println!("Sweet updated successfully");
    Ok(())
}

async fn run_admin_delete(client: &ShopClient, id: i64) -> anyhow::Result<()> {
    let mut sync = CatalogSync::new(client);
    sync.delete(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to delete sweet")))?;
    println!("Sweet {id} deleted");
    Ok(())
}

async fn run_admin_restock(client: &ShopClient, id: i64, raw_quantity: &str) -> anyhow::Result<()> {
    let quantity = parse_restock_quantity(raw_quantity)?;
    let mut sync = CatalogSync::new(client);
    let product = sync
        .restock(id, quantity)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Restock failed")))?;
    let stock = sync
        .catalog()
        .find(id)
        .map_or(product.quantity, |p| p.quantity);
    println!("Restocked {} by {quantity}; {stock} in stock", product.name);
    Ok(())
}

async fn run_admin_images(client: &ShopClient, query: &str) -> anyhow::Result<()> {
    let urls = client
        .search_images(query)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Image search failed")))?;
    if urls.is_empty() {
        println!("no images found for '{query}'");
        return Ok(());
    }
    for url in &urls {
        println!("{url}");
    }
    Ok(())
}
