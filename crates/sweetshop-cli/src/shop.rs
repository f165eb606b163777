//! Storefront command handlers: browsing, quoting, purchasing and account
//! views. Called from `main` once the config and client are built.

use sweetshop_client::{CatalogSync, ShopClient};
use sweetshop_core::{
    load_identity_profile, AppConfig, FilterCriteria, Product, PurchaseRecord, PurchaseSummary,
    Role, RoleResolver,
};

/// Longest product name shown before truncation in tables.
const NAME_WIDTH: usize = 28;

/// Resolve the caller's role from the configured identity profile, or `None`
/// when no profile is configured.
///
/// # Errors
///
/// Returns an error if the profile file cannot be read or parsed.
pub(crate) fn resolve_role(config: &AppConfig) -> anyhow::Result<Option<Role>> {
    let Some(path) = config.identity_profile_path.as_deref() else {
        return Ok(None);
    };
    let profile = load_identity_profile(path)?;
    let role = RoleResolver::default().resolve(&profile);
    tracing::debug!(path = %path.display(), %role, "resolved role from identity profile");
    Ok(Some(role))
}

pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

pub(crate) fn print_products(products: &[&Product]) {
    println!(
        "{:<6}{:<30}{:<12}{:>10}{:>8}",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
    );
    for product in products {
        let stock = if product.in_stock() {
            product.quantity.to_string()
        } else {
            "out".to_string()
        };
        println!(
            "{:<6}{:<30}{:<12}{:>10}{:>8}",
            product.id,
            truncate(&product.name, NAME_WIDTH),
            product.category,
            format!("${:.2}", product.price),
            stock
        );
    }
}

fn print_purchases(purchases: &[PurchaseRecord]) {
    println!(
        "{:<18}{:<30}{:>6}{:>10}{:>11}",
        "DATE", "SWEET", "QTY", "UNIT", "TOTAL"
    );
    for purchase in purchases {
        println!(
            "{:<18}{:<30}{:>6}{:>10}{:>11}",
            purchase.created_date.format("%Y-%m-%d %H:%M"),
            truncate(&purchase.sweet_name, NAME_WIDTH),
            purchase.quantity,
            format!("${:.2}", purchase.price_per_unit),
            format!("${:.2}", purchase.total_price)
        );
    }
}

/// Fetch the catalog and print the products matching the filters.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub(crate) async fn run_browse(
    client: &ShopClient,
    search: &str,
    category: &str,
    max_price: &str,
) -> anyhow::Result<()> {
    let mut sync = CatalogSync::new(client);
    sync.refresh()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load sweets")))?;

    let criteria = FilterCriteria::from_raw(search, category, max_price);
    let matches = sync.catalog().filtered(&criteria);
    if matches.is_empty() {
        if criteria.is_unconstrained() {
            println!("the shop has no sweets yet");
        } else {
            println!("no sweets match the current filters");
        }
        return Ok(());
    }

    print_products(&matches);
    Ok(())
}

/// Show the reconciled quantity and total for a prospective purchase.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched or the sweet is unknown
/// or out of stock.
pub(crate) async fn run_quote(client: &ShopClient, id: i64, raw_quantity: &str) -> anyhow::Result<()> {
    let mut sync = CatalogSync::new(client);
    sync.refresh()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load sweets")))?;

    let product = sync
        .catalog()
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("sweet {id} not found"))?;
    let mut selector = sync
        .catalog()
        .selector_for(id)
        .ok_or_else(|| anyhow::anyhow!("'{}' is out of stock", product.name))?;
    selector.set_raw(raw_quantity);

    println!("Sweet:     {}", product.name);
    println!("Unit:      ${:.2}", product.price);
    println!("Available: {}", selector.available());
    println!("Quantity:  {}", selector.quantity());
    println!("Total:     ${:.2}", selector.total());
    Ok(())
}

/// Reconcile the requested quantity against current stock, submit the
/// purchase and report the outcome.
///
/// # Errors
///
/// Returns an error carrying the backend's message (or a generic one) if the
/// purchase is rejected, or if the sweet is unknown or out of stock.
pub(crate) async fn run_purchase(
    client: &ShopClient,
    id: i64,
    raw_quantity: &str,
) -> anyhow::Result<()> {
    let mut sync = CatalogSync::new(client);
    sync.refresh()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load sweets")))?;

    let Some(mut selector) = sync.catalog().selector_for(id) else {
        match sync.catalog().find(id) {
            Some(product) => anyhow::bail!("'{}' is out of stock", product.name),
            None => anyhow::bail!("sweet {id} not found"),
        }
    };
    selector.set_raw(raw_quantity);
    let request = selector.confirm();

    let record = sync
        .purchase(request)
        .await
        .map_err(|e| anyhow::anyhow!("Purchase failed: {}", e.user_message("please try again")))?;

    println!(
        "Purchase successful! {} x {} for ${:.2}",
        record.quantity, record.sweet_name, record.total_price
    );
    if let Some(product) = sync.catalog().find(id) {
        println!("{} left in stock", product.quantity);
    }
    Ok(())
}

/// Print the caller's purchase history with totals.
///
/// # Errors
///
/// Returns an error if the history cannot be fetched.
pub(crate) async fn run_history(client: &ShopClient) -> anyhow::Result<()> {
    let purchases = client
        .my_purchases()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load purchase history")))?;

    if purchases.is_empty() {
        println!("no purchases yet");
        return Ok(());
    }

    print_purchases(&purchases);
    let summary = PurchaseSummary::compute(&purchases);
    println!();
    println!(
        "{} purchases, {} items, ${:.2} spent",
        summary.purchases, summary.total_items, summary.total_spent
    );
    Ok(())
}

/// Print the role resolved from the identity profile.
///
/// # Errors
///
/// Returns an error if the profile cannot be loaded.
pub(crate) fn run_whoami(config: &AppConfig) -> anyhow::Result<()> {
    match resolve_role(config)? {
        Some(role) => println!("role: {role}"),
        None => println!(
            "no identity profile configured (set SWEETSHOP_IDENTITY_PROFILE); the backend decides your role"
        ),
    }
    Ok(())
}

/// Register an account through the backend's local auth endpoint.
///
/// # Errors
///
/// Returns an error carrying the backend's message if registration fails.
pub(crate) async fn run_register(
    client: &ShopClient,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<()> {
    let user = client
        .register(email, password, role)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Registration failed")))?;
    println!(
        "registered {} (id {}, role {})",
        user.email,
        user.id,
        user.role.as_deref().unwrap_or("USER")
    );
    Ok(())
}
