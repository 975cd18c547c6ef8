//! Engine error types.
//!
//! Every rejection here is a plain return value surfaced to the dashboard;
//! nothing in the engine panics or aborts the process.

use crate::lot::LotId;
use folio_core::{CoreError, Quantity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested sale quantity exceeds what the lot still holds.
    /// Indicates a race or stale read; the caller should re-fetch the lot
    /// and restart validation.
    #[error("Insufficient quantity: requested {requested}, remaining {remaining}")]
    InsufficientQuantity {
        requested: Quantity,
        remaining: Quantity,
    },

    /// The lot has been fully sold; no further sales are possible.
    #[error("Lot {0} is closed")]
    LotClosed(LotId),

    /// The remaining lot quantity is smaller than the exchange minimum, so
    /// no legal partial sale exists. Hard block, never silently adjusted.
    #[error("Available quantity {ceiling} is below the tradable minimum {min_quantity}")]
    CeilingBelowMinimum {
        ceiling: Quantity,
        min_quantity: Quantity,
    },

    /// User input was not a valid positive quantity.
    #[error("Quantity must be a positive number, got {0:?}")]
    InvalidQuantity(String),

    #[error("Invalid lot: {0}")]
    InvalidLot(String),

    #[error("No lot size rule known for symbol {0}")]
    UnknownSymbol(String),

    #[error("No commission fees known for symbol {0}")]
    UnknownFees(String),

    /// The execution service refused or failed the order. The lot is
    /// untouched; the sale attempt is over.
    #[error("Order rejected by execution service: {0}")]
    OrderRejected(String),

    /// The lot store failed to persist the settled lot state.
    #[error("Lot store failure: {0}")]
    StoreFailure(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
