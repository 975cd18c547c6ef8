//! Exchange lot size constraints per trading symbol.
//!
//! Each symbol carries a minimum order quantity and a step size the exchange
//! enforces on order quantities. Rules are fetched from the symbol rule
//! source when a sale dialog opens and may be stale; the engine never
//! refreshes them on its own.

use crate::decimal::Quantity;
use crate::error::{CoreError, CoreResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Static exchange constraints for a trading symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotSizeRule {
    /// Trading symbol (e.g., "BTCUSDT").
    pub symbol: String,

    /// Minimum order quantity.
    #[serde(rename = "minQuantity")]
    pub min_quantity: Quantity,

    /// Minimum quantity increment.
    #[serde(rename = "stepSize")]
    pub step_size: Quantity,
}

impl LotSizeRule {
    /// Create a new rule, validating that both constraints are positive.
    pub fn new(
        symbol: impl Into<String>,
        min_quantity: Quantity,
        step_size: Quantity,
    ) -> CoreResult<Self> {
        let symbol = symbol.into();
        if !min_quantity.is_positive() {
            return Err(CoreError::InvalidRule(format!(
                "{symbol}: min_quantity must be positive, got {min_quantity}"
            )));
        }
        if !step_size.is_positive() {
            return Err(CoreError::InvalidRule(format!(
                "{symbol}: step_size must be positive, got {step_size}"
            )));
        }
        Ok(Self {
            symbol,
            min_quantity,
            step_size,
        })
    }

    /// Check whether a quantity satisfies this rule: at or above the
    /// minimum and sitting on the step grid (both within tolerance).
    pub fn is_compliant(&self, quantity: Quantity) -> bool {
        self.min_quantity.fits_within(quantity) && quantity.is_step_multiple(self.step_size)
    }

    /// Decimal places implied by the step size.
    ///
    /// An order quantity submitted for this symbol must not carry more
    /// fractional digits than the step itself.
    pub fn step_digits(&self) -> u32 {
        self.step_size.fraction_digits()
    }
}

/// Concurrent symbol -> rule lookup table.
///
/// Read-mostly: populated from a config file or the exchange meta endpoint,
/// then shared across open sale dialogs.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: DashMap<String, LotSizeRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from deserialized rules.
    pub fn from_rules(rules: impl IntoIterator<Item = LotSizeRule>) -> Self {
        let table = Self::new();
        for rule in rules {
            table.upsert(rule);
        }
        table
    }

    /// Get the rule for a symbol.
    pub fn get(&self, symbol: &str) -> Option<LotSizeRule> {
        self.rules.get(symbol).map(|entry| entry.value().clone())
    }

    /// Insert or replace the rule for a symbol.
    pub fn upsert(&self, rule: LotSizeRule) {
        self.rules.insert(rule.symbol.clone(), rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
