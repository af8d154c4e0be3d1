//! Business services built over the store, identity, and device seams.

pub mod accounts;
pub mod allocator;
pub mod biometric;
pub mod catalog;
pub mod checkout;
pub mod keystore;
pub mod orders;
pub mod places;
pub mod purchases;

pub use accounts::{AccountError, AccountService, ProfileUpdate};
pub use allocator::{ORDER_COUNTER, SequentialIdAllocator, USER_COUNTER};
pub use biometric::{BiometricPrompt, DenyingPrompt};
pub use catalog::CatalogService;
pub use checkout::{CheckoutDraft, CheckoutError, CheckoutReceipt};
pub use keystore::{MemoryKeystore, SecureStore};
pub use orders::{OrderError, OrderService, OrderWatch};
pub use places::PlacesClient;
pub use purchases::{PurchaseDay, PurchaseHistory};
