//! Profile routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::UserProfile;
use crate::services::ProfileUpdate;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct BiometricRequest {
    pub enabled: bool,
}

/// GET /profile - the signed-in user's profile.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>> {
    let profile = state.accounts().profile(&user.uid).await?;
    Ok(Json(profile))
}

/// PUT /profile - edit profile fields.
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    let profile = state.accounts().update_profile(&user.uid, request).await?;
    Ok(Json(profile))
}

/// GET /profile/address-suggestions - address autocomplete.
///
/// Always succeeds; backend trouble just means no suggestions.
pub async fn address_suggestions(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<String>> {
    Json(state.places().suggest(&query.q).await)
}

/// POST /profile/biometric - enable or disable biometric unlock.
pub async fn set_biometric(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<BiometricRequest>,
) -> Result<StatusCode> {
    if request.enabled {
        state.accounts().enable_biometric(&user.uid).await?;
    } else {
        state.accounts().disable_biometric(&user.uid).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
