//! Lot sizing and trade settlement engine for the folio dashboard.
//!
//! Governs how a partially-owned purchase lot can be sold:
//! - [`sizing`]: map a requested quantity to an exchange-legal one
//! - [`lot`]: the remaining-quantity ledger per purchase
//! - [`settlement`]: commission-aware realized P&L
//! - [`validator`]: the interactive quantity-field state machine
//! - [`sources`]: seams for the rule, fee, execution, and store collaborators
//! - [`flow`]: the reserve -> execute -> settle sequence
//!
//! Everything is synchronous and side-effect-free except
//! [`lot::PositionLot::apply_sale`]; callers serialize sale confirmations
//! per lot.

pub mod error;
pub mod flow;
pub mod lot;
pub mod settlement;
pub mod sizing;
pub mod sources;
pub mod validator;

pub use error::{EngineError, EngineResult};
pub use flow::settle_sale;
pub use lot::{LotId, PositionLot};
pub use settlement::SaleRecord;
pub use sizing::{adjust, max_valid_quantity};
pub use sources::{CommissionRateSource, LotStore, OrderExecutor, SymbolRuleSource};
pub use validator::{validate, FieldState, RejectReason, SaleRequestValidator, ValidationOutcome};
