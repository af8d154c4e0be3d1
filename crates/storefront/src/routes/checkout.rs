//! Checkout routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use vestia_core::Price;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{PendingOrder, Recipient};
use crate::services::{CheckoutDraft, CheckoutReceipt};
use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Lines to check out; omit for the whole cart.
    pub order_ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    /// Lines to check out; omit for the whole cart.
    pub order_ids: Option<Vec<String>>,
    /// Delivery details for this batch only; omit to ship to the profile
    /// address.
    pub recipient: Option<Recipient>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub orders: Vec<PendingOrder>,
    pub recipient: Recipient,
    pub batch_total: Price,
}

/// POST /checkout/quote - preview the lines, recipient, and batch total.
pub async fn quote(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let draft =
        CheckoutDraft::collect(state.store(), &user.uid, request.order_ids.as_deref()).await?;

    Ok(Json(QuoteResponse {
        orders: draft.orders().to_vec(),
        recipient: draft.recipient().clone(),
        batch_total: draft.batch_total(),
    }))
}

/// POST /checkout/confirm - create bills and empty the cart.
pub async fn confirm(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<CheckoutReceipt>> {
    let mut draft =
        CheckoutDraft::collect(state.store(), &user.uid, request.order_ids.as_deref()).await?;

    if let Some(recipient) = request.recipient {
        draft.edit_recipient(recipient)?;
    }

    let receipt = draft.confirm(state.store()).await?;
    Ok(Json(receipt))
}
