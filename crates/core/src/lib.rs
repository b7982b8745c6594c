//! Carebridge Core - Shared types library.
//!
//! This crate provides common types used across all Carebridge components:
//! - `commerce` - Caregiver profile ↔ BigCommerce customer/cart/order glue
//! - `pharmacist` - Authenticated client for the internal pharmacist API
//! - `cli` - Operator tooling over both facades
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
