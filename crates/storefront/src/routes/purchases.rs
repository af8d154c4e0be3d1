//! Purchase history routes.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::PurchaseDay;
use crate::state::AppState;

/// GET /purchases - the user's bills grouped by day, newest first.
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<PurchaseDay>>> {
    let history = state.purchases().history(&user.uid).await?;
    Ok(Json(history))
}
