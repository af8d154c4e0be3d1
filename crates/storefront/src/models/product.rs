//! Catalog models.

use serde::{Deserialize, Serialize};
use vestia_core::Price;

use crate::store::{Document, StoreError};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document id, attached after decoding.
    #[serde(skip)]
    pub id: String,
    /// Display name.
    pub product_name: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Currency or unit label shown next to the price.
    #[serde(default)]
    pub price_unit: String,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Available sizes.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Owning category document id.
    #[serde(default)]
    pub id_category: String,
}

impl Product {
    /// Decode a product from a store document, attaching its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the document body is malformed.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut product: Self = doc.decode()?;
        product.id = doc.id.clone();
        Ok(product)
    }
}

/// A catalog category.
///
/// The legacy data uses a capitalized `Name` field, kept as-is so existing
/// documents decode without migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Document id, attached after decoding.
    #[serde(skip)]
    pub id: String,
    /// Category display name.
    #[serde(rename = "Name")]
    pub name: String,
}

impl Category {
    /// Decode a category from a store document, attaching its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the document body is malformed.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut category: Self = doc.decode()?;
        category.id = doc.id.clone();
        Ok(category)
    }
}
