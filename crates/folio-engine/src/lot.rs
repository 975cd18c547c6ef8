//! Position lots: the authoritative remaining-quantity ledger per purchase.
//!
//! A lot is created once when a purchase is ingested and depleted by
//! settled sales. `reserve` is a non-mutating advisory check so validation
//! stays idempotent; `apply_sale` is the single mutation point, called at
//! most once per externally-confirmed sale. Callers must serialize sale
//! confirmations per lot (single-writer-per-lot); the engine itself holds
//! no lock.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use folio_core::{Price, Quantity, STEP_TOLERANCE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Unique lot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(Uuid);

impl LotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for LotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One purchase, tracked as a depletable quantity with a fixed cost basis.
///
/// Fields are private so `remaining_quantity` can only shrink through
/// [`PositionLot::apply_sale`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionLot {
    id: LotId,
    symbol: String,
    original_quantity: Quantity,
    unit_cost: Price,
    /// Total purchase cost with purchase fees already netted in.
    total_cost: Decimal,
    remaining_quantity: Quantity,
    closed: bool,
    purchased_at: DateTime<Utc>,
}

impl PositionLot {
    /// Create a lot at purchase ingestion.
    pub fn new(
        symbol: impl Into<String>,
        quantity: Quantity,
        unit_cost: Price,
        total_cost: Decimal,
        purchased_at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        let symbol = symbol.into();
        if !quantity.is_positive() {
            return Err(EngineError::InvalidLot(format!(
                "{symbol}: purchase quantity must be positive, got {quantity}"
            )));
        }
        if total_cost.is_sign_negative() {
            return Err(EngineError::InvalidLot(format!(
                "{symbol}: total cost must not be negative, got {total_cost}"
            )));
        }
        Ok(Self {
            id: LotId::new(),
            symbol,
            original_quantity: quantity,
            unit_cost,
            total_cost,
            remaining_quantity: quantity,
            closed: false,
            purchased_at,
        })
    }

    pub fn id(&self) -> LotId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn original_quantity(&self) -> Quantity {
        self.original_quantity
    }

    pub fn unit_cost(&self) -> Price {
        self.unit_cost
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    /// Remaining sellable quantity.
    pub fn remaining(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn purchased_at(&self) -> DateTime<Utc> {
        self.purchased_at
    }

    /// True while the lot still has quantity to sell.
    pub fn sellable(&self) -> bool {
        !self.closed && self.remaining_quantity.is_positive()
    }

    /// Advisory check that `quantity` could be sold right now.
    ///
    /// Does not mutate, so repeated UI re-checks stay side-effect-free.
    /// The actual decrement happens in [`PositionLot::apply_sale`] after the
    /// execution service confirms the order.
    pub fn reserve(&self, quantity: Quantity) -> EngineResult<()> {
        if self.closed {
            return Err(EngineError::LotClosed(self.id));
        }
        if !quantity.is_positive() {
            return Err(EngineError::InvalidQuantity(quantity.to_string()));
        }
        if !quantity.fits_within(self.remaining_quantity) {
            return Err(EngineError::InsufficientQuantity {
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }
        Ok(())
    }

    /// Settle a confirmed sale against this lot.
    ///
    /// The only mutating operation. Decrements the remaining quantity,
    /// clamping to zero and closing the lot once the residue is within
    /// tolerance of zero. Fails without mutating on oversell.
    pub fn apply_sale(&mut self, quantity: Quantity) -> EngineResult<()> {
        self.reserve(quantity)?;

        let residue = self.remaining_quantity - quantity;
        if residue.inner() <= STEP_TOLERANCE {
            self.remaining_quantity = Quantity::ZERO;
            self.closed = true;
        } else {
            self.remaining_quantity = residue;
        }

        debug!(
            lot_id = %self.id,
            symbol = %self.symbol,
            sold = %quantity,
            remaining = %self.remaining_quantity,
            closed = self.closed,
            "sale applied to lot"
        );
        Ok(())
    }
}
