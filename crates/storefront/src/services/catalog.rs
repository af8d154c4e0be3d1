//! Catalog reads with caching.
//!
//! Products and categories change rarely and are read on every browse, so
//! whole-collection reads are cached with `moka` (5-minute TTL). Single
//! product fetches go to the store directly.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::models::{Category, Product};
use crate::store::{DocumentStore, StoreError, collections};

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 16;

const PRODUCTS_KEY: &str = "products";
const CATEGORIES_KEY: &str = "categories";

#[derive(Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
}

/// Cached catalog reads.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { store, cache }
    }

    /// All products, cached.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the collection cannot be listed or decoded.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, StoreError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(PRODUCTS_KEY).await {
            return Ok(products);
        }

        let docs = self.store.list(collections::PRODUCT).await?;
        let products: Vec<Product> = docs
            .iter()
            .map(Product::from_document)
            .collect::<Result<_, _>>()?;
        let products = Arc::new(products);

        self.cache
            .insert(
                PRODUCTS_KEY.to_owned(),
                CacheValue::Products(products.clone()),
            )
            .await;
        Ok(products)
    }

    /// All categories, cached.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the collection cannot be listed or decoded.
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, StoreError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(CATEGORIES_KEY).await {
            return Ok(categories);
        }

        let docs = self.store.list(collections::CATEGORY).await?;
        let categories: Vec<Category> = docs
            .iter()
            .map(Category::from_document)
            .collect::<Result<_, _>>()?;
        let categories = Arc::new(categories);

        self.cache
            .insert(
                CATEGORIES_KEY.to_owned(),
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Fetch one product by document id, uncached.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the fetch fails or the body is malformed.
    pub async fn product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let Some(doc) = self.store.get(collections::PRODUCT, id).await? else {
            return Ok(None);
        };
        Product::from_document(&doc).map(Some)
    }

    /// Products belonging to a category.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the product list cannot be loaded.
    pub async fn products_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Product>, StoreError> {
        let products = self.products().await?;
        Ok(products
            .iter()
            .filter(|p| p.id_category == category_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use crate::store::MemoryStore;

    use super::*;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                collections::PRODUCT,
                "p1",
                json!({ "productName": "Shirt", "price": "100", "idCategory": "c1" }),
            )
            .await
            .unwrap();
        store
            .set(
                collections::PRODUCT,
                "p2",
                json!({ "productName": "Cap", "price": "50", "idCategory": "c2" }),
            )
            .await
            .unwrap();
        store
            .set(collections::CATEGORY, "c1", json!({ "Name": "Shirts" }))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_products_and_categories() {
        let catalog = CatalogService::new(seeded_store().await);

        assert_eq!(catalog.products().await.unwrap().len(), 2);
        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories.first().map(|c| c.name.as_str()), Some("Shirts"));
    }

    #[tokio::test]
    async fn test_products_are_cached() {
        let store = seeded_store().await;
        let catalog = CatalogService::new(store.clone());

        assert_eq!(catalog.products().await.unwrap().len(), 2);

        // A write after the first read is invisible until the TTL expires.
        store
            .set(
                collections::PRODUCT,
                "p3",
                json!({ "productName": "Scarf", "price": "75" }),
            )
            .await
            .unwrap();
        assert_eq!(catalog.products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_products_by_category() {
        let catalog = CatalogService::new(seeded_store().await);
        let shirts = catalog.products_by_category("c1").await.unwrap();
        assert_eq!(shirts.len(), 1);
        assert_eq!(
            shirts.first().map(|p| p.product_name.as_str()),
            Some("Shirt")
        );
    }

    #[tokio::test]
    async fn test_missing_product_is_none() {
        let catalog = CatalogService::new(seeded_store().await);
        assert!(catalog.product("nope").await.unwrap().is_none());
    }
}
