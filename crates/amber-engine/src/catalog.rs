//! # Catalog Cache
//!
//! In-memory snapshot of products, customers, and discounts fetched from
//! the backend. Leaf dependency of the order form, refreshed on demand.
//!
//! ## Failure Policy
//! - Discount fetch failure is non-fatal: the cache degrades to an empty
//!   discount catalog (warned, not surfaced) so order entry keeps working.
//! - Product/customer fetch failures propagate to the caller, but the
//!   previously loaded snapshot stays in place rather than being cleared.

use tracing::{debug, warn};

use amber_core::{Customer, Discount, Product};

use crate::backend::{Backend, BackendError, DiscountFilter};

/// Cached catalog state for one order form.
#[derive(Debug, Default)]
pub struct CatalogCache {
    products: Vec<Product>,
    customers: Vec<Customer>,
    discounts: Vec<Discount>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    /// Looks up a product by id.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a product by barcode (scan path).
    pub fn product_by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.barcode.as_deref() == Some(barcode))
    }

    /// Looks up a discount by id.
    pub fn discount(&self, id: &str) -> Option<&Discount> {
        self.discounts.iter().find(|d| d.id == id)
    }

    /// Refreshes the product snapshot.
    ///
    /// On failure the previous snapshot is kept; the caller surfaces the
    /// error to the user.
    pub async fn refresh_products<B: Backend>(&mut self, backend: &B) -> Result<(), BackendError> {
        let products = backend.list_products().await?;
        debug!(count = products.len(), "product catalog refreshed");
        self.products = products;
        Ok(())
    }

    /// Refreshes the customer snapshot. Same failure policy as products.
    pub async fn refresh_customers<B: Backend>(&mut self, backend: &B) -> Result<(), BackendError> {
        let customers = backend.list_customers().await?;
        debug!(count = customers.len(), "customer catalog refreshed");
        self.customers = customers;
        Ok(())
    }

    /// Refreshes the discount catalog for the given filter.
    ///
    /// Failure degrades to an empty catalog: discounts are a nice-to-have
    /// and must never block order entry.
    pub async fn refresh_discounts<B: Backend>(&mut self, backend: &B, filter: DiscountFilter) {
        match backend.list_discounts(filter).await {
            Ok(discounts) => {
                debug!(count = discounts.len(), "discount catalog refreshed");
                self.discounts = discounts;
            }
            Err(err) => {
                warn!(error = %err, "discount fetch failed, degrading to empty catalog");
                self.discounts.clear();
            }
        }
    }

    /// Registers a customer created mid-flow (walk-in synthesis) so the
    /// shell can select it without a full refetch.
    pub fn insert_customer(&mut self, customer: Customer) {
        self.customers.push(customer);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NewCustomer, OrderConfirmation, OrderPayload};

    /// Backend whose list calls can be switched to fail.
    struct FlakyBackend {
        fail_products: bool,
        fail_discounts: bool,
        products: Vec<Product>,
        discounts: Vec<Discount>,
    }

    impl Backend for FlakyBackend {
        async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
            if self.fail_products {
                return Err(BackendError::Request("boom".to_string()));
            }
            Ok(self.products.clone())
        }

        async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
            Ok(Vec::new())
        }

        async fn list_discounts(
            &self,
            _filter: DiscountFilter,
        ) -> Result<Vec<Discount>, BackendError> {
            if self.fail_discounts {
                return Err(BackendError::Request("boom".to_string()));
            }
            Ok(self.discounts.clone())
        }

        async fn create_customer(&self, _fields: NewCustomer) -> Result<Customer, BackendError> {
            Err(BackendError::Request("unused".to_string()))
        }

        async fn create_order(
            &self,
            _payload: OrderPayload,
        ) -> Result<OrderConfirmation, BackendError> {
            Err(BackendError::Request("unused".to_string()))
        }
    }

    fn product(id: &str, barcode: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            barcode: barcode.map(str::to_string),
            price_minor: 1000,
            currency: "NGN".to_string(),
            product_type: None,
            shop_stock: 5,
            global_stock: 5,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_product_failure_keeps_previous_snapshot() {
        let mut cache = CatalogCache::new();
        let good = FlakyBackend {
            fail_products: false,
            fail_discounts: false,
            products: vec![product("1", None)],
            discounts: Vec::new(),
        };
        cache.refresh_products(&good).await.unwrap();
        assert_eq!(cache.products().len(), 1);

        let bad = FlakyBackend {
            fail_products: true,
            fail_discounts: false,
            products: Vec::new(),
            discounts: Vec::new(),
        };
        // Error surfaces, but the stale snapshot stays usable.
        assert!(cache.refresh_products(&bad).await.is_err());
        assert_eq!(cache.products().len(), 1);
    }

    #[tokio::test]
    async fn test_discount_failure_degrades_to_empty() {
        let mut cache = CatalogCache::new();
        let bad = FlakyBackend {
            fail_products: false,
            fail_discounts: true,
            products: Vec::new(),
            discounts: Vec::new(),
        };
        cache.refresh_discounts(&bad, DiscountFilter::default()).await;
        assert!(cache.discounts().is_empty());
    }

    #[tokio::test]
    async fn test_barcode_lookup() {
        let mut cache = CatalogCache::new();
        let backend = FlakyBackend {
            fail_products: false,
            fail_discounts: false,
            products: vec![product("1", Some("6001234")), product("2", None)],
            discounts: Vec::new(),
        };
        cache.refresh_products(&backend).await.unwrap();

        assert_eq!(cache.product_by_barcode("6001234").unwrap().id, "1");
        assert!(cache.product_by_barcode("0000000").is_none());
        assert_eq!(cache.product("2").unwrap().id, "2");
    }
}
