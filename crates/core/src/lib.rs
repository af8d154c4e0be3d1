//! Vestia Core - Shared types library.
//!
//! This crate provides the common types used across the Vestia storefront:
//! type-safe ids, the canonical money type, validated email addresses, and
//! the order status enum.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no store
//! access. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
