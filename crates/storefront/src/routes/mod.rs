//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/signup              - Register, then sign in
//! POST /auth/login               - Email/password sign-in
//! POST /auth/biometric-login     - Device biometric sign-in
//! POST /auth/logout              - Sign out
//! POST /auth/forgot-password     - Send password reset email
//! GET  /auth/session             - Current session, if any
//!
//! # Catalog
//! GET  /products                 - Product listing (search, sort, category)
//! GET  /products/{id}            - Product detail
//! GET  /categories               - Category listing
//!
//! # Cart (requires auth)
//! GET    /cart                   - Pending lines plus total
//! POST   /cart                   - Add a line
//! PATCH  /cart/{id}              - Update quantity/size
//! DELETE /cart/{id}              - Remove a line
//! GET    /cart/watch             - Live cart snapshots (SSE)
//!
//! # Checkout (requires auth)
//! POST /checkout/quote           - Lines, recipient, batch total
//! POST /checkout/confirm         - Create bills, empty the cart
//!
//! # Account (requires auth)
//! GET  /profile                  - Current profile
//! PUT  /profile                  - Edit profile
//! GET  /profile/address-suggestions - Address autocomplete
//! POST /profile/biometric        - Enable/disable biometric unlock
//! GET  /purchases                - Bill history grouped by day
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod profile;
pub mod purchases;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/biometric-login", post(auth::biometric_login))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/session", get(auth::session))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{id}", axum::routing::patch(cart::update).delete(cart::remove))
        .route("/watch", get(cart::watch))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(checkout::quote))
        .route("/confirm", post(checkout::confirm))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).put(profile::update))
        .route("/address-suggestions", get(profile::address_suggestions))
        .route("/biometric", post(profile::set_biometric))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/profile", profile_routes())
        .route("/purchases", get(purchases::index))
}
