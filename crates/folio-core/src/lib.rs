//! Core domain types for the folio portfolio dashboard.
//!
//! This crate provides the fundamental types used by the lot sizing and
//! trade settlement engine:
//! - `Price`, `Quantity`: Precision-safe decimal types
//! - `LotSizeRule`, `RuleTable`: Exchange lot size constraints per symbol
//! - `CommissionSchedule`, `FeeTable`: Maker/taker commission rates
//! - `OrderType`, `OrderRequest`, `OrderAck`: Order placement contracts

pub mod commission;
pub mod decimal;
pub mod error;
pub mod order;
pub mod rule;

pub use commission::{CommissionSchedule, FeeTable, SymbolFees};
pub use decimal::{Price, Quantity, STEP_TOLERANCE};
pub use error::{CoreError, CoreResult};
pub use order::{ClientOrderId, OrderAck, OrderRequest, OrderSide, OrderType};
pub use rule::{LotSizeRule, RuleTable};
