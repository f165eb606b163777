use rust_decimal::Decimal;
use serde::Serialize;

use crate::products::{Product, PurchaseRecord};

/// Products with fewer units than this (but more than zero) count as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Dashboard figures over the catalog and the full purchase history.
///
/// Every field is zero for empty input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total_sweets: usize,
    /// Σ price × quantity over the catalog.
    pub total_value: Decimal,
    pub total_purchases: usize,
    /// Σ total price over purchase records.
    pub revenue: Decimal,
    /// Products with `0 < quantity < 10`.
    pub low_stock: usize,
    pub out_of_stock: usize,
}

impl InventoryStats {
    #[must_use]
    pub fn compute(products: &[Product], purchases: &[PurchaseRecord]) -> Self {
        Self {
            total_sweets: products.len(),
            total_value: saturating_sum(products.iter().map(Product::stock_value)),
            total_purchases: purchases.len(),
            revenue: saturating_sum(purchases.iter().map(|p| p.total_price)),
            low_stock: products
                .iter()
                .filter(|p| p.quantity > 0 && p.quantity < LOW_STOCK_THRESHOLD)
                .count(),
            out_of_stock: products.iter().filter(|p| p.quantity == 0).count(),
        }
    }

    /// Low-stock plus out-of-stock products.
    #[must_use]
    pub fn stock_alerts(&self) -> usize {
        self.low_stock + self.out_of_stock
    }
}

/// Per-customer totals shown alongside purchase history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurchaseSummary {
    pub purchases: usize,
    pub total_spent: Decimal,
    pub total_items: u64,
}

impl PurchaseSummary {
    #[must_use]
    pub fn compute(purchases: &[PurchaseRecord]) -> Self {
        Self {
            purchases: purchases.len(),
            total_spent: saturating_sum(purchases.iter().map(|p| p.total_price)),
            total_items: purchases.iter().map(|p| u64::from(p.quantity)).sum(),
        }
    }
}
