//! Cart routes.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use vestia_core::Price;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::PendingOrder;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: String,
    pub size: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub quantity: u32,
    pub size: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub orders: Vec<PendingOrder>,
    pub total: Price,
}

/// GET /cart - the user's pending lines plus their total.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>> {
    let orders = state.orders().list_orders(&user.uid).await?;
    let total = Price::sum(orders.iter().map(|o| o.total_price));
    Ok(Json(CartResponse { orders, total }))
}

/// POST /cart - add a product to the cart.
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<AddRequest>,
) -> Result<(StatusCode, Json<PendingOrder>)> {
    let order = state
        .orders()
        .add_to_cart(&user.uid, &request.product_id, &request.size, request.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /cart/{id} - change a line's quantity or size.
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<PendingOrder>> {
    let order = state
        .orders()
        .update_order(&id, request.quantity, request.size.as_deref())
        .await?;
    Ok(Json(order))
}

/// DELETE /cart/{id} - remove a line.
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.orders().remove_order(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /cart/watch - live cart snapshots over SSE.
///
/// The store subscription lives inside the stream, so client disconnects
/// drop the stream and tear the subscription down with it.
pub async fn watch(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let watch = state.orders().subscribe_orders(&user.uid).await?;

    let stream = stream::unfold(watch, |mut watch| async move {
        loop {
            let orders = watch.recv().await?;
            match Event::default().json_data(&orders) {
                Ok(event) => return Some((Ok(event), watch)),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping unserializable cart snapshot");
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
