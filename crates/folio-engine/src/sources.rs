//! Collaborator seams for external services.
//!
//! The engine consumes and produces plain data; fetching rules and fees,
//! placing orders, and persisting lots all happen behind these traits.
//! Implementations live in the web/API layer (remote backend calls) or, for
//! config-driven deployments and tests, in the table-backed impls below.

use crate::error::{EngineError, EngineResult};
use crate::lot::PositionLot;
use folio_core::{CommissionSchedule, FeeTable, LotSizeRule, OrderAck, OrderRequest, OrderType, RuleTable};

/// Source of exchange lot size rules per symbol.
///
/// Rules may be stale; callers re-fetch when a sale dialog opens, the
/// engine never refreshes on its own.
pub trait SymbolRuleSource {
    fn rule_for(&self, symbol: &str) -> EngineResult<LotSizeRule>;
}

/// Source of commission rates per symbol and order type.
///
/// Rates are account-tier-dependent; a fresh schedule is requested per
/// sale and must not be cached across calls.
pub trait CommissionRateSource {
    fn schedule_for(&self, symbol: &str, order_type: OrderType) -> EngineResult<CommissionSchedule>;
}

/// Order execution service.
///
/// Only a confirmed acknowledgement permits settling the sale against the
/// lot.
pub trait OrderExecutor {
    fn place_order(&self, request: &OrderRequest) -> EngineResult<OrderAck>;
}

/// System of record for lot state.
///
/// The in-memory mutation from a settled sale is written through here as
/// part of the same logical transaction as order confirmation.
pub trait LotStore {
    fn write_through(&self, lot: &PositionLot) -> EngineResult<()>;
}

impl SymbolRuleSource for RuleTable {
    fn rule_for(&self, symbol: &str) -> EngineResult<LotSizeRule> {
        self.get(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))
    }
}

impl CommissionRateSource for FeeTable {
    fn schedule_for(&self, symbol: &str, order_type: OrderType) -> EngineResult<CommissionSchedule> {
        let fees = self
            .get(symbol)
            .ok_or_else(|| EngineError::UnknownFees(symbol.to_string()))?;
        Ok(fees.schedule_for(symbol, order_type)?)
    }
}
