//! Order lifecycle status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order line.
///
/// Cart lines are stored with status `pending`. Checkout converts them into
/// bill documents, so `billed` never appears in the cart collection; it
/// exists so receipts and history entries can carry a status field without a
/// second type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// In the cart, not yet checked out.
    #[default]
    Pending,
    /// Converted into a bill at checkout.
    Billed,
}

impl OrderStatus {
    /// Whether this line is still in the cart.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Billed => write!(f, "billed"),
        }
    }
}
