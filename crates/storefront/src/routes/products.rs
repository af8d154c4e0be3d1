//! Catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Category, Product};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct ProductQuery {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// One of `price_asc`, `price_desc`, `name`.
    pub sort: Option<String>,
    /// Filter to a category document id.
    pub category: Option<String>,
}

/// GET /products - product listing with search, sort, and category filter.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let mut products: Vec<Product> = match &query.category {
        Some(category) => state.catalog().products_by_category(category).await?,
        None => state.catalog().products().await?.as_ref().clone(),
    };

    if let Some(search) = &query.search {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            products.retain(|p| p.product_name.to_lowercase().contains(&needle));
        }
    }

    match query.sort.as_deref() {
        Some("price_asc") => products.sort_by_key(|p| p.price),
        Some("price_desc") => {
            products.sort_by_key(|p| p.price);
            products.reverse();
        }
        Some("name") => products.sort_by(|a, b| a.product_name.cmp(&b.product_name)),
        _ => {}
    }

    Ok(Json(products))
}

/// GET /products/{id} - product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// GET /categories - category listing.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().categories().await?.as_ref().clone();
    Ok(Json(categories))
}
