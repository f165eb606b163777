//! Catalog filtering.
//!
//! [`FilterCriteria`] combines three independent constraints (name search,
//! category, price ceiling) with logical AND. Each constraint has an explicit
//! "no constraint" variant standing in for the storefront's `"all"` sentinel.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::products::Product;

const ALL_SENTINEL: &str = "all";

/// Category constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Matches a product whose category equals this value, ignoring case.
    Only(String),
}

impl CategoryFilter {
    /// Parses the raw picker value. `"all"` (any case) and blank input mean
    /// no constraint.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted.to_lowercase() == category.to_lowercase(),
        }
    }
}

/// Maximum-price constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceCeiling {
    #[default]
    Any,
    /// Matches a product priced at or below this value.
    AtMost(Decimal),
}

impl PriceCeiling {
    /// Parses the raw picker value.
    ///
    /// `"all"`, blank input, and anything that is not a decimal number all
    /// mean no constraint. Unparseable input is logged at `debug` so a typo
    /// in a ceiling is visible without failing the render.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Self::Any;
        }
        match Decimal::from_str(trimmed) {
            Ok(ceiling) => Self::AtMost(ceiling),
            Err(e) => {
                tracing::debug!(raw = trimmed, error = %e, "non-numeric max price treated as no ceiling");
                Self::Any
            }
        }
    }

    fn matches(self, price: Decimal) -> bool {
        match self {
            Self::Any => true,
            Self::AtMost(ceiling) => price <= ceiling,
        }
    }
}

/// Search, category and price constraints applied to the catalog on render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// Free text matched as a case-insensitive substring of the product name.
    /// Empty matches everything.
    pub search: String,
    pub category: CategoryFilter,
    pub max_price: PriceCeiling,
}

impl FilterCriteria {
    /// Builds criteria from the three raw form values.
    #[must_use]
    pub fn from_raw(search: &str, category: &str, max_price: &str) -> Self {
        Self {
            search: search.to_string(),
            category: CategoryFilter::from_raw(category),
            max_price: PriceCeiling::from_raw(max_price),
        }
    }

    /// Returns `true` when no constraint is active.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty()
            && self.category == CategoryFilter::All
            && self.max_price == PriceCeiling::Any
    }

    /// Returns `true` iff the product satisfies every active constraint.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(&product.name)
            && self.category.matches(&product.category)
            && self.max_price.matches(product.price)
    }

    fn matches_search(&self, name: &str) -> bool {
        self.search.is_empty() || name.to_lowercase().contains(&self.search.to_lowercase())
    }
}

/// Applies `criteria` to `products`, preserving catalog order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], criteria: &FilterCriteria) -> Vec<&'a Product> {
    products.iter().filter(|p| criteria.matches(p)).collect()
}
