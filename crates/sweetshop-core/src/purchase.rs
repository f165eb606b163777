//! Purchase quantity reconciliation.
//!
//! Raw quantity input is never an error: it is parsed leniently and clamped
//! into `[1, available]`. Zero-stock products never reach the reconciler;
//! the functions here return `None` for them so the purchase action can be
//! disabled upstream.

use rust_decimal::Decimal;

use crate::products::Product;
use crate::CoreError;

/// Parses the leading integer of `raw`: optional surrounding whitespace, an
/// optional sign, then digits. Anything after the digits is ignored, so
/// `"3.7"` is 3 and `"12abc"` is 12. Returns `None` when no digit leads.
/// Values past the `i64` range saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Reconciles a raw quantity against the available stock.
///
/// Unparseable input and zero default to 1; the result is clamped into
/// `[1, available]`. Returns `None` when `available` is 0.
#[must_use]
pub fn reconcile_quantity(raw: &str, available: u32) -> Option<u32> {
    if available == 0 {
        return None;
    }
    let requested = match parse_leading_int(raw) {
        Some(0) | None => 1,
        Some(n) => n,
    };
    let clamped = requested.clamp(1, i64::from(available));
    u32::try_from(clamped).ok()
}

/// Display total for `quantity` units at `unit_price`, rounded to 2 dp.
///
/// The backend computes the authoritative total on the purchase record.
#[must_use]
pub fn display_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price
        .saturating_mul(Decimal::from(quantity))
        .round_dp(2)
}

/// Parses an admin restock amount. Must be a positive integer.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRestockQuantity`] for blank, non-numeric, zero
/// or negative input.
pub fn parse_restock_quantity(raw: &str) -> Result<u32, CoreError> {
    parse_leading_int(raw)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| CoreError::InvalidRestockQuantity(raw.to_string()))
}

/// A confirmed purchase, ready to submit. Discarded after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub product_id: i64,
    pub quantity: u32,
}

/// State of the purchase dialog for one product.
///
/// Starts at quantity 1 and always keeps the quantity inside
/// `[1, available]`.
#[derive(Debug, Clone)]
pub struct QuantitySelector {
    product_id: i64,
    unit_price: Decimal,
    available: u32,
    quantity: u32,
}

impl QuantitySelector {
    /// Opens a selector for `product`. Returns `None` when it is out of stock.
    #[must_use]
    pub fn for_product(product: &Product) -> Option<Self> {
        if !product.in_stock() {
            return None;
        }
        Some(Self {
            product_id: product.id,
            unit_price: product.price,
            available: product.quantity,
            quantity: 1,
        })
    }

    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn available(&self) -> u32 {
        self.available
    }

    /// Replaces the quantity with reconciled raw input.
    pub fn set_raw(&mut self, raw: &str) {
        if let Some(q) = reconcile_quantity(raw, self.available) {
            self.quantity = q;
        }
    }

    #[must_use]
    pub fn can_increment(&self) -> bool {
        self.quantity < self.available
    }

    #[must_use]
    pub fn can_decrement(&self) -> bool {
        self.quantity > 1
    }

    pub fn increment(&mut self) {
        if self.can_increment() {
            self.quantity += 1;
        }
    }

    pub fn decrement(&mut self) {
        if self.can_decrement() {
            self.quantity -= 1;
        }
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        display_total(self.unit_price, self.quantity)
    }

    /// Produces the request for the current quantity and resets to 1.
    pub fn confirm(&mut self) -> PurchaseRequest {
        let request = PurchaseRequest {
            product_id: self.product_id,
            quantity: self.quantity,
        };
        self.quantity = 1;
        request
    }
}
