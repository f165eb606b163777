//! Catalog synchronization.
//!
//! [`Catalog`] is the client's read-mostly snapshot of the product list and
//! the `idle → loading → {ready, error}` state machine around it. A failed
//! fetch keeps the last good snapshot available. [`CatalogSync`] drives it
//! against the backend: every successful mutation is followed by a full
//! re-fetch instead of a local patch, so server-side effects such as stock
//! decrements are always reflected. When fetches overlap, whichever completes
//! last defines the snapshot.

use sweetshop_core::{
    filter_products, FilterCriteria, InventoryStats, Product, PurchaseRecord, PurchaseRequest,
    QuantitySelector, SweetDraft,
};

use crate::client::ShopClient;
use crate::error::ClientError;
use crate::upload::ImageUpload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// In-memory product snapshot plus its synchronization state.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    state: SyncState,
    products: Vec<Product>,
    last_error: Option<String>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The last successfully fetched snapshot, in backend order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` while the snapshot on display predates a failed fetch.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state == SyncState::Error
    }

    /// Any state moves to `Loading` when a fetch starts.
    pub fn begin_fetch(&mut self) {
        self.state = SyncState::Loading;
    }

    /// Replaces the snapshot wholesale. No merge with the previous one.
    pub fn apply_snapshot(&mut self, products: Vec<Product>) {
        self.products = products;
        self.last_error = None;
        self.state = SyncState::Ready;
    }

    /// Records a failed fetch. The previous snapshot stays available.
    pub fn apply_failure(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.state = SyncState::Error;
    }

    #[must_use]
    pub fn find(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&Product> {
        filter_products(&self.products, criteria)
    }

    /// Opens a purchase-quantity selector for `id`. `None` if the product is
    /// unknown or out of stock.
    #[must_use]
    pub fn selector_for(&self, id: i64) -> Option<QuantitySelector> {
        self.find(id).and_then(QuantitySelector::for_product)
    }

    #[must_use]
    pub fn stats(&self, purchases: &[PurchaseRecord]) -> InventoryStats {
        InventoryStats::compute(&self.products, purchases)
    }
}

/// Drives a [`Catalog`] against the backend.
pub struct CatalogSync<'a> {
    client: &'a ShopClient,
    catalog: Catalog,
}

impl<'a> CatalogSync<'a> {
    #[must_use]
    pub fn new(client: &'a ShopClient) -> Self {
        Self {
            client,
            catalog: Catalog::new(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetches the full catalog and replaces the snapshot.
    ///
    /// # Errors
    ///
    /// Returns the fetch error. The catalog moves to [`SyncState::Error`]
    /// and keeps its previous snapshot.
    pub async fn refresh(&mut self) -> Result<&[Product], ClientError> {
        self.catalog.begin_fetch();
        match self.client.list_sweets().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "catalog refreshed");
                self.catalog.apply_snapshot(products);
                Ok(self.catalog.products())
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog refresh failed; keeping last snapshot");
                self.catalog.apply_failure(e.user_message("Failed to load sweets"));
                Err(e)
            }
        }
    }

    /// Re-fetch after a mutation that already succeeded. A failure here does
    /// not undo the mutation, so it is recorded on the catalog rather than
    /// returned.
    async fn refresh_after_mutation(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "mutation succeeded but the follow-up refresh failed");
        }
    }

    /// Submits a purchase, then re-fetches.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection or transport failure. The catalog is
    /// left untouched.
    pub async fn purchase(&mut self, request: PurchaseRequest) -> Result<PurchaseRecord, ClientError> {
        let record = self.client.purchase_sweet(request).await?;
        self.refresh_after_mutation().await;
        Ok(record)
    }

    /// Restocks a sweet, then re-fetches.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogSync::purchase`].
    pub async fn restock(&mut self, id: i64, quantity: u32) -> Result<Product, ClientError> {
        let product = self.client.restock_sweet(id, quantity).await?;
        self.refresh_after_mutation().await;
        Ok(product)
    }

    /// Creates a sweet, then re-fetches.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogSync::purchase`].
    pub async fn create(
        &mut self,
        draft: SweetDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let product = self.client.create_sweet(draft, image).await?;
        self.refresh_after_mutation().await;
        Ok(product)
    }

    /// Updates a sweet, then re-fetches.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogSync::purchase`].
    pub async fn update(
        &mut self,
        id: i64,
        draft: SweetDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let product = self.client.update_sweet(id, draft, image).await?;
        self.refresh_after_mutation().await;
        Ok(product)
    }

    /// Deletes a sweet, then re-fetches.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogSync::purchase`].
    pub async fn delete(&mut self, id: i64) -> Result<(), ClientError> {
        self.client.delete_sweet(id).await?;
        self.refresh_after_mutation().await;
        Ok(())
    }
}
