use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CatalogError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    pub image: String,
    pub rating: f32,
    pub reviews: u32,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub in_stock: bool,
}

impl Product {
    /// Whole-percent markdown from the original price, 0 when not discounted
    pub fn discount_percent(&self) -> u32 {
        match self.original_price {
            Some(original) if original > self.price && original > 0.0 => {
                ((original - self.price) / original * 100.0).round() as u32
            }
            _ => 0,
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn featured_products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn product_by_id(&self, id: u32) -> Result<Option<Product>, CatalogError> {
        let products = self.featured_products().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    /// Products whose category contains `category`, ignoring case
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        let needle = category.to_lowercase();
        let products = self.featured_products().await?;
        Ok(products
            .into_iter()
            .filter(|p| {
                p.category
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .collect())
    }
}

/// Fixed product list served after an optional delay
pub struct InMemoryCatalog {
    products: Vec<Product>,
    latency: Duration,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The storefront's launch collection
    pub fn seeded() -> Self {
        Self::new(vec![
            product(
                1,
                "Classic Wooden Frame",
                89.0,
                Some(120.0),
                (4.8, 124),
                (false, true),
                "Wooden Frames",
                "Handcrafted from premium oak wood with a natural finish",
                &["5x7", "8x10", "11x14", "16x20"],
                &["Natural", "Dark Walnut", "White Wash"],
                true,
            ),
            product(
                2,
                "Modern Metal Frame",
                65.0,
                None,
                (4.9, 89),
                (true, false),
                "Metal Frames",
                "Sleek aluminum frame perfect for contemporary spaces",
                &["4x6", "5x7", "8x10", "12x16"],
                &["Silver", "Black", "Gold"],
                true,
            ),
            product(
                3,
                "Vintage Gold Frame",
                145.0,
                Some(180.0),
                (4.7, 203),
                (false, true),
                "Vintage Collection",
                "Ornate gold-leafed frame with intricate baroque details",
                &["8x10", "11x14", "16x20", "20x24"],
                &["Antique Gold", "Silver Leaf"],
                true,
            ),
            product(
                4,
                "Minimalist Black Frame",
                75.0,
                None,
                (4.6, 156),
                (false, false),
                "Modern Collection",
                "Clean lines and matte black finish for a modern aesthetic",
                &["5x7", "8x10", "11x14"],
                &["Matte Black", "Glossy Black"],
                false,
            ),
        ])
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: u32,
    name: &str,
    price: f64,
    original_price: Option<f64>,
    (rating, reviews): (f32, u32),
    (is_new, is_bestseller): (bool, bool),
    category: &str,
    description: &str,
    sizes: &[&str],
    colors: &[&str],
    in_stock: bool,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
        original_price,
        image: format!("/placeholder-frame-{}.jpg", id),
        rating,
        reviews,
        is_new,
        is_bestseller,
        category: Some(category.to_string()),
        description: Some(description.to_string()),
        sizes: sizes.iter().map(|s| s.to_string()).collect(),
        colors: colors.iter().map(|c| c.to_string()).collect(),
        in_stock,
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn featured_products(&self) -> Result<Vec<Product>, CatalogError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.products.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent() {
        let catalog = InMemoryCatalog::seeded();
        let wooden = &catalog.products[0];
        let metal = &catalog.products[1];
        let vintage = &catalog.products[2];

        // (120 - 89) / 120 = 25.8%
        assert_eq!(wooden.discount_percent(), 26);
        assert_eq!(metal.discount_percent(), 0);
        assert_eq!(vintage.discount_percent(), 19);
    }

    #[test]
    fn test_markup_is_not_a_discount() {
        let mut p = InMemoryCatalog::seeded().products.remove(0);
        p.original_price = Some(50.0);
        assert_eq!(p.discount_percent(), 0);
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let catalog = InMemoryCatalog::seeded();
        let found = catalog.product_by_id(3).await.unwrap().unwrap();
        assert_eq!(found.name, "Vintage Gold Frame");
        assert!(catalog.product_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_match_is_case_insensitive_substring() {
        let catalog = InMemoryCatalog::seeded();

        let frames = catalog.products_by_category("FRAMES").await.unwrap();
        let ids: Vec<u32> = frames.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let collection = catalog.products_by_category("collection").await.unwrap();
        assert_eq!(collection.len(), 2);
        assert!(catalog.products_by_category("canvas").await.unwrap().is_empty());
    }

    #[test]
    fn test_product_json_shape() {
        let json = serde_json::json!({
            "id": 7,
            "name": "Oak",
            "price": 10.0,
            "originalPrice": null,
            "image": "/oak.jpg",
            "rating": 4.5,
            "reviews": 3,
            "inStock": true
        });
        let p: Product = serde_json::from_value(json).unwrap();
        assert_eq!(p.original_price, None);
        assert!(p.sizes.is_empty());
        assert!(!p.is_new);
    }
}
