//! Core types for Carebridge.
//!
//! This module provides type-safe wrappers for identifiers that cross the
//! commerce and pharmacist boundaries.

pub mod email;
pub mod id;

pub use email::{Email, EmailError};
pub use id::*;
