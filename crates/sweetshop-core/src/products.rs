use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Categories the storefront offers in its category picker. Products coming
/// back from the backend may still carry other values; this list only gates
/// what the admin surface accepts for new or edited sweets.
pub const KNOWN_CATEGORIES: [&str; 9] = [
    "chocolate",
    "candy",
    "gummy",
    "lollipop",
    "caramel",
    "mint",
    "licorice",
    "sour",
    "other",
];

/// Price ceilings offered by the storefront's "max price" picker.
pub const PRICE_CEILINGS: [u32; 4] = [5, 10, 20, 50];

/// A sellable catalog item as returned by `GET /sweets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Enum-like category string, e.g. `"chocolate"`. Compared case-insensitively.
    pub category: String,
    pub price: Decimal,
    /// Units currently in stock.
    pub quantity: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Returns `true` when at least one unit can be purchased.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Stock value of this line: `price × quantity`, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// One line of purchase history, as returned by `POST /sweets/{id}/purchase`
/// and the `/purchases` listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: i64,
    #[serde(default)]
    pub sweet_id: Option<i64>,
    pub sweet_name: String,
    pub quantity: u32,
    pub price_per_unit: Decimal,
    /// Computed by the backend. The client only displays it.
    pub total_price: Decimal,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub created_date: NaiveDateTime,
}

/// Payload for creating or editing a sweet. Serialized as the `sweet` part of
/// the multipart body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweetDraft {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl SweetDraft {
    /// Normalizes the draft (trimmed name, lowercase category) and checks the
    /// product invariants before it is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyName`], [`CoreError::UnknownCategory`] or
    /// [`CoreError::NegativePrice`].
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(CoreError::EmptyName);
        }

        self.category = self.category.trim().to_lowercase();
        if !KNOWN_CATEGORIES.contains(&self.category.as_str()) {
            return Err(CoreError::UnknownCategory(self.category));
        }

        if self.price < Decimal::ZERO {
            return Err(CoreError::NegativePrice(self.price));
        }

        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.image_url = self
            .image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Ok(self)
    }
}

impl From<&Product> for SweetDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            quantity: product.quantity,
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}
