// Private module declarations
mod cart;
mod products;

// ============================================================================
// Catalog - Featured products and the shopping cart
// ============================================================================

pub use cart::{Cart, CartItem, InMemoryCart};
pub use products::{Catalog, InMemoryCatalog, Product};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Product {0} does not exist")]
    UnknownProduct(u32),
}
