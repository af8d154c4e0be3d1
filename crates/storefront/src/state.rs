//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::identity::IdentityProvider;
use crate::services::{
    AccountService, BiometricPrompt, CatalogService, OrderService, PlacesClient, PurchaseHistory,
    SecureStore,
};
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: Arc<dyn DocumentStore>,
    accounts: AccountService,
    catalog: CatalogService,
    orders: OrderService,
    purchases: PurchaseHistory,
    places: PlacesClient,
}

impl AppState {
    /// Create a new application state over the given backends.
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        keystore: Arc<dyn SecureStore>,
        prompt: Arc<dyn BiometricPrompt>,
    ) -> Self {
        let places = PlacesClient::new(&config.places);
        let accounts = AccountService::new(store.clone(), identity, keystore, prompt);
        let catalog = CatalogService::new(store.clone());
        let orders = OrderService::new(store.clone());
        let purchases = PurchaseHistory::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                accounts,
                catalog,
                orders,
                purchases,
                places,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    /// Get a reference to the account service.
    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get a reference to the purchase history reader.
    #[must_use]
    pub fn purchases(&self) -> &PurchaseHistory {
        &self.inner.purchases
    }

    /// Get a reference to the places client.
    #[must_use]
    pub fn places(&self) -> &PlacesClient {
        &self.inner.places
    }
}
