use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use super::products::{Catalog, Product};
use super::CatalogError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

#[async_trait]
pub trait Cart: Send + Sync {
    async fn add(&self, product_id: u32) -> Result<(), CatalogError>;
    async fn items(&self) -> Result<Vec<CartItem>, CatalogError>;
}

/// Cart held in memory, resolving products through a catalog
pub struct InMemoryCart {
    catalog: Arc<dyn Catalog>,
    items: Mutex<Vec<CartItem>>,
}

impl InMemoryCart {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            items: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Cart for InMemoryCart {
    async fn add(&self, product_id: u32) -> Result<(), CatalogError> {
        let product = self
            .catalog
            .product_by_id(product_id)
            .await?
            .ok_or(CatalogError::UnknownProduct(product_id))?;

        let mut items = self.items.lock().await;
        match items.iter_mut().find(|item| item.product.id == product_id) {
            Some(item) => item.quantity += 1,
            None => items.push(CartItem { product, quantity: 1 }),
        }

        tracing::debug!(product_id, "Item added to cart");
        Ok(())
    }

    async fn items(&self) -> Result<Vec<CartItem>, CatalogError> {
        Ok(self.items.lock().await.clone())
    }
}
