//! Commerce facade error types.

use carebridge_core::LineItemId;
use thiserror::Error;

use crate::bigcommerce::BigCommerceError;
use crate::profile::ProfileStoreError;

/// Errors surfaced by [`CommerceService`](crate::CommerceService).
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The caregiver profile does not exist.
    #[error("Profile could not be found")]
    ProfileNotFound,

    /// The profile is missing or was never linked to a BigCommerce customer.
    #[error("Error Profile could not be found or missing bigCommerceCustomerId")]
    MissingCustomerId,

    /// The item to move is not in the source cart.
    #[error("Item not found in the source cart: {0}")]
    ItemNotFound(LineItemId),

    /// The caller passed arguments the operation cannot act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// BigCommerce call failed.
    #[error(transparent)]
    BigCommerce(#[from] BigCommerceError),

    /// Profile store call failed.
    #[error(transparent)]
    ProfileStore(#[from] ProfileStoreError),
}

impl CommerceError {
    /// Whether this error comes from bad caller input rather than upstream.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::ItemNotFound(_) | Self::InvalidArgument(_))
    }
}
