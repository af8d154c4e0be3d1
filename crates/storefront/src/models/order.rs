//! Cart line and bill models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vestia_core::{OrderStatus, Price, Uid};

use crate::store::{Document, StoreError};

/// A pending cart line in the `Order` collection.
///
/// Lines snapshot the product at add time (name, description, image, unit
/// price), so later catalog edits do not rewrite carts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    /// Document id, attached after decoding.
    #[serde(skip)]
    pub id: String,
    /// Owning user's uid.
    pub user_id: Uid,
    /// Source product document id.
    pub product_id: String,
    /// Product name snapshot.
    pub product_name: String,
    /// Product description snapshot.
    #[serde(default)]
    pub description: String,
    /// Product image snapshot.
    #[serde(default)]
    pub image: Vec<String>,
    /// Unit price snapshot.
    pub price: Price,
    /// Currency or unit label.
    #[serde(default)]
    pub price_unit: String,
    /// Chosen size.
    pub selected_size: String,
    /// Quantity.
    pub quantity: u32,
    /// Line total, `price * quantity`.
    pub total_price: Price,
    /// Lifecycle status; always `pending` while in the cart.
    #[serde(default)]
    pub status: OrderStatus,
    /// When the line was added.
    pub created_at: DateTime<Utc>,
}

impl PendingOrder {
    /// Decode a cart line from a store document, attaching its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the document body is malformed.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut order: Self = doc.decode()?;
        order.id = doc.id.clone();
        Ok(order)
    }
}

/// Recipient details stamped onto every bill in a checkout batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient name.
    pub username: String,
    /// Contact phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
}

/// A finalized bill in the `Bill` collection.
///
/// One bill per cart line; lines checked out together share a `batch_total`
/// and a timestamp, which is how history groups them back into one purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Document id, attached after decoding.
    #[serde(skip)]
    pub id: String,
    /// Owning user's uid.
    pub user_id: Uid,
    /// Recipient name.
    pub username: String,
    /// Recipient phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
    /// Source product document id.
    pub product_id: String,
    /// Product name snapshot.
    pub product_name: String,
    /// Product description snapshot.
    #[serde(default)]
    pub description: String,
    /// Product image snapshot.
    #[serde(default)]
    pub image: Vec<String>,
    /// Unit price snapshot.
    pub price: Price,
    /// Currency or unit label.
    #[serde(default)]
    pub price_unit: String,
    /// Chosen size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    /// Chosen color, when the product had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Quantity.
    pub quantity: u32,
    /// Line total.
    pub total_price: Price,
    /// Total across the whole checkout batch.
    pub batch_total: Price,
    /// Checkout time, shared by the batch.
    pub timestamp: DateTime<Utc>,
}

impl Bill {
    /// Decode a bill from a store document, attaching its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the document body is malformed.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut bill: Self = doc.decode()?;
        bill.id = doc.id.clone();
        Ok(bill)
    }

    /// Build a bill from a cart line and the batch-level details.
    #[must_use]
    pub fn from_order(
        order: &PendingOrder,
        recipient: &Recipient,
        batch_total: Price,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            user_id: order.user_id.clone(),
            username: recipient.username.clone(),
            phone: recipient.phone.clone(),
            address: recipient.address.clone(),
            product_id: order.product_id.clone(),
            product_name: order.product_name.clone(),
            description: order.description.clone(),
            image: order.image.clone(),
            price: order.price,
            price_unit: order.price_unit.clone(),
            selected_size: Some(order.selected_size.clone()),
            color: None,
            quantity: order.quantity,
            total_price: order.total_price,
            batch_total,
            timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_order() -> PendingOrder {
        PendingOrder {
            id: "o1".to_owned(),
            user_id: Uid::new("u1"),
            product_id: "p1".to_owned(),
            product_name: "Linen Shirt".to_owned(),
            description: "Lightweight".to_owned(),
            image: vec!["https://img.example/1.jpg".to_owned()],
            price: Price::parse("120000").unwrap(),
            price_unit: "VND".to_owned(),
            selected_size: "M".to_owned(),
            quantity: 2,
            total_price: Price::parse("240000").unwrap(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_order_roundtrip() {
        let doc = Document {
            id: "o1".to_owned(),
            data: serde_json::to_value(sample_order()).unwrap(),
        };
        let order = PendingOrder::from_document(&doc).unwrap();
        assert_eq!(order.id, "o1");
        assert_eq!(order.selected_size, "M");
        assert!(order.status.is_pending());
    }

    #[test]
    fn test_pending_order_uses_camel_case_keys() {
        let value = serde_json::to_value(sample_order()).unwrap();
        assert!(value.get("totalPrice").is_some());
        assert!(value.get("selectedSize").is_some());
        assert!(value.get("userId").is_some());
        assert_eq!(value["status"], json!("pending"));
    }

    #[test]
    fn test_bill_from_order_copies_snapshot() {
        let order = sample_order();
        let recipient = Recipient {
            username: "Ana".to_owned(),
            phone: "555-0101".to_owned(),
            address: "12 Elm St".to_owned(),
        };
        let now = Utc::now();
        let bill = Bill::from_order(&order, &recipient, Price::parse("500000").unwrap(), now);

        assert_eq!(bill.user_id, order.user_id);
        assert_eq!(bill.product_name, order.product_name);
        assert_eq!(bill.selected_size.as_deref(), Some("M"));
        assert_eq!(bill.total_price, order.total_price);
        assert_eq!(bill.batch_total, Price::parse("500000").unwrap());
        assert_eq!(bill.timestamp, now);
    }
}
