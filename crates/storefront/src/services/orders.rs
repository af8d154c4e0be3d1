//! Cart management.
//!
//! Cart lines live as documents in the `Order` collection with status
//! `pending`, one document per product/size choice. Adding a line snapshots
//! the product and mints a sequential display id from the order counter.

use std::sync::Arc;

use chrono::Utc;
use vestia_core::{OrderNo, OrderStatus, Price, Uid};

use crate::models::PendingOrder;
use crate::store::{DocumentStore, StoreError, Subscription, collections};

use super::allocator::{ORDER_COUNTER, SequentialIdAllocator};

/// Errors returned by cart operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// No size was chosen.
    #[error("Please choose a size")]
    SizeRequired,

    /// Quantity must be at least 1.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// The product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The cart line does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Live view of a user's cart.
///
/// Emits the full pending list immediately and after every change. Dropping
/// the watch tears down the underlying store subscription.
pub struct OrderWatch {
    subscription: Subscription,
}

impl OrderWatch {
    /// Wait for the next cart snapshot. Malformed documents are skipped.
    pub async fn recv(&mut self) -> Option<Vec<PendingOrder>> {
        let docs = self.subscription.recv().await?;
        Some(
            docs.iter()
                .filter_map(|doc| match PendingOrder::from_document(doc) {
                    Ok(order) if order.status.is_pending() => Some(order),
                    Ok(_) => None,
                    Err(err) => {
                        tracing::warn!(error = %err, id = %doc.id, "Skipping malformed cart line");
                        None
                    }
                })
                .collect(),
        )
    }
}

/// Cart operations over the document store.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    allocator: SequentialIdAllocator,
}

impl OrderService {
    /// Create an order service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let allocator = SequentialIdAllocator::new(store.clone());
        Self { store, allocator }
    }

    /// Add a product to the cart.
    ///
    /// Snapshots the product's name, description, image, and unit price
    /// into the new line, and computes the line total.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::SizeRequired`] for a blank size,
    /// [`OrderError::InvalidQuantity`] for a zero quantity,
    /// [`OrderError::ProductNotFound`] for an unknown product, and
    /// [`OrderError::Store`] for store failures.
    pub async fn add_to_cart(
        &self,
        uid: &Uid,
        product_id: &str,
        selected_size: &str,
        quantity: u32,
    ) -> Result<PendingOrder, OrderError> {
        let selected_size = selected_size.trim();
        if selected_size.is_empty() {
            return Err(OrderError::SizeRequired);
        }
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }

        let doc = self
            .store
            .get(collections::PRODUCT, product_id)
            .await?
            .ok_or_else(|| OrderError::ProductNotFound(product_id.to_owned()))?;
        let product = crate::models::Product::from_document(&doc)?;

        let id = OrderNo::new(self.allocator.allocate(ORDER_COUNTER).await?);
        let order = PendingOrder {
            id: id.to_string(),
            user_id: uid.clone(),
            product_id: product.id.clone(),
            product_name: product.product_name.clone(),
            description: product.description.clone(),
            image: product.images.clone(),
            price: product.price,
            price_unit: product.price_unit.clone(),
            selected_size: selected_size.to_owned(),
            quantity,
            total_price: product.price.total(quantity),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        self.store
            .set(
                collections::ORDER,
                &order.id,
                serde_json::to_value(&order).map_err(StoreError::Decode)?,
            )
            .await?;

        tracing::debug!(order_id = %order.id, product_id, "Added cart line");
        Ok(order)
    }

    /// Change a line's quantity and, optionally, its size.
    ///
    /// The line total is recomputed from the snapshotted unit price, so the
    /// stored total always matches `price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidQuantity`] for a zero quantity,
    /// [`OrderError::OrderNotFound`] for an unknown line, and
    /// [`OrderError::Store`] for store failures.
    pub async fn update_order(
        &self,
        order_id: &str,
        quantity: u32,
        selected_size: Option<&str>,
    ) -> Result<PendingOrder, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }

        let doc = self
            .store
            .get(collections::ORDER, order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_owned()))?;
        let mut order = PendingOrder::from_document(&doc)?;

        order.quantity = quantity;
        if let Some(size) = selected_size {
            let size = size.trim();
            if size.is_empty() {
                return Err(OrderError::SizeRequired);
            }
            order.selected_size = size.to_owned();
        }
        order.total_price = order.price.total(quantity);

        self.store
            .update(
                collections::ORDER,
                order_id,
                serde_json::json!({
                    "quantity": order.quantity,
                    "selectedSize": order.selected_size,
                    "totalPrice": order.total_price,
                }),
            )
            .await?;

        Ok(order)
    }

    /// Remove a line from the cart. Removing a missing line succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the delete fails.
    pub async fn remove_order(&self, order_id: &str) -> Result<(), OrderError> {
        self.store.delete(collections::ORDER, order_id).await?;
        Ok(())
    }

    /// List a user's pending cart lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the query fails or a line is
    /// malformed.
    pub async fn list_orders(&self, uid: &Uid) -> Result<Vec<PendingOrder>, OrderError> {
        let docs = self
            .store
            .query_eq(
                collections::ORDER,
                "userId",
                serde_json::Value::String(uid.as_str().to_owned()),
            )
            .await?;

        let mut orders = docs
            .iter()
            .map(PendingOrder::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        orders.retain(|o| o.status.is_pending());
        Ok(orders)
    }

    /// Sum of line totals across the user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the cart cannot be listed.
    pub async fn cart_total(&self, uid: &Uid) -> Result<Price, OrderError> {
        let orders = self.list_orders(uid).await?;
        Ok(Price::sum(orders.iter().map(|o| o.total_price)))
    }

    /// Subscribe to a user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the subscription cannot be set up.
    pub async fn subscribe_orders(&self, uid: &Uid) -> Result<OrderWatch, OrderError> {
        let subscription = self
            .store
            .subscribe(
                collections::ORDER,
                "userId",
                serde_json::Value::String(uid.as_str().to_owned()),
            )
            .await?;
        Ok(OrderWatch { subscription })
    }
}
