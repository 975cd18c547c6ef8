//! Interactive sale request validation.
//!
//! A sale form drives this state machine repeatedly while the user edits
//! the quantity field. Validation is lazy on edit and eager on blur: no
//! error is shown while typing, the field is checked when focus leaves it
//! or on submit. Correctable rejections carry a suggested quantity; the
//! caller surfaces it and the user must accept it explicitly, except on
//! final submit where an unresolved correctable state falls back to the
//! suggestion instead of blocking (preserved dashboard behavior).

use crate::error::{EngineError, EngineResult};
use crate::lot::PositionLot;
use crate::sizing;
use folio_core::{LotSizeRule, Quantity};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a raw quantity was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum RejectReason {
    #[error("must be a positive number")]
    NotPositive,

    #[error("below the exchange minimum quantity")]
    BelowMinimum,

    #[error("exceeds the available lot quantity")]
    ExceedsAvailable,

    #[error("not a multiple of the exchange step size")]
    NotStepAligned,

    #[error("available quantity is below the tradable minimum")]
    CeilingBelowMinimum,
}

/// Result of validating one raw quantity against a lot and its rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationOutcome {
    /// The quantity is exchange-legal and covered by the lot.
    Accepted(Quantity),

    /// The quantity was rejected. With a suggestion the error is
    /// correctable; without one it is a hard block.
    Rejected {
        reason: RejectReason,
        suggested: Option<Quantity>,
    },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn is_correctable(&self) -> bool {
        matches!(
            self,
            Self::Rejected {
                suggested: Some(_),
                ..
            }
        )
    }
}

/// Validate a raw quantity string against a lot and its lot size rule.
///
/// Checks run in order: parse, below-minimum, exceeds-available,
/// step-alignment. Suggestions come from the lot size adjuster; when the
/// adjuster itself cannot produce a legal quantity the rejection degrades
/// to the uncorrectable [`RejectReason::CeilingBelowMinimum`].
///
/// Pure: two calls with the same inputs yield the same outcome.
pub fn validate(raw: &str, lot: &PositionLot, rule: &LotSizeRule) -> ValidationOutcome {
    let quantity = match raw.trim().parse::<Quantity>() {
        Ok(q) if q.is_positive() => q,
        _ => {
            return ValidationOutcome::Rejected {
                reason: RejectReason::NotPositive,
                suggested: None,
            }
        }
    };

    let remaining = lot.remaining();

    if !rule.min_quantity.fits_within(quantity) {
        return rejected_with_suggestion(
            RejectReason::BelowMinimum,
            sizing::adjust(rule.min_quantity, rule, remaining),
        );
    }

    if !quantity.fits_within(remaining) {
        return rejected_with_suggestion(
            RejectReason::ExceedsAvailable,
            sizing::adjust(remaining, rule, remaining),
        );
    }

    if !quantity.is_step_multiple(rule.step_size) {
        return rejected_with_suggestion(
            RejectReason::NotStepAligned,
            sizing::adjust(quantity, rule, remaining),
        );
    }

    ValidationOutcome::Accepted(quantity)
}

fn rejected_with_suggestion(
    reason: RejectReason,
    suggestion: EngineResult<Quantity>,
) -> ValidationOutcome {
    match suggestion {
        Ok(suggested) => ValidationOutcome::Rejected {
            reason,
            suggested: Some(suggested),
        },
        // No legal quantity fits the lot at all: uncorrectable.
        Err(_) => ValidationOutcome::Rejected {
            reason: RejectReason::CeilingBelowMinimum,
            suggested: None,
        },
    }
}

/// State of the sale quantity field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldState {
    /// No validation has run yet.
    Untouched,

    /// The user is typing; validation is suppressed.
    Editing,

    /// Last blur accepted the quantity.
    Valid { quantity: Quantity },

    /// Last blur rejected the quantity but a suggestion exists.
    Correctable {
        reason: RejectReason,
        suggested: Quantity,
    },

    /// Last blur rejected the quantity with no possible correction.
    /// Submission is blocked.
    Invalid { reason: RejectReason },
}

/// Interactive validator for one sale dialog.
///
/// Owns the rule for the dialog's symbol and the quantity field state.
/// The lot is passed into each check so the validator always sees the
/// caller's current view of remaining quantity.
#[derive(Debug)]
pub struct SaleRequestValidator {
    rule: LotSizeRule,
    state: FieldState,
    prefill: Option<Quantity>,
}

impl SaleRequestValidator {
    /// Open a dialog for a lot: pre-fills the largest legal quantity when
    /// one exists.
    pub fn new(lot: &PositionLot, rule: LotSizeRule) -> Self {
        let prefill = sizing::max_valid_quantity(lot.remaining(), &rule).ok();
        Self {
            rule,
            state: FieldState::Untouched,
            prefill,
        }
    }

    pub fn rule(&self) -> &LotSizeRule {
        &self.rule
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// Suggested starting quantity ("use max available").
    pub fn prefill(&self) -> Option<Quantity> {
        self.prefill
    }

    /// The user started changing the field; show no errors until blur.
    pub fn begin_edit(&mut self) {
        self.state = FieldState::Editing;
    }

    /// The field lost focus: validate and transition.
    pub fn on_blur(&mut self, raw: &str, lot: &PositionLot) -> &FieldState {
        let outcome = validate(raw, lot, &self.rule);
        debug!(symbol = %self.rule.symbol, raw, ?outcome, "quantity field blurred");
        self.state = match outcome {
            ValidationOutcome::Accepted(quantity) => FieldState::Valid { quantity },
            ValidationOutcome::Rejected {
                reason,
                suggested: Some(suggested),
            } => FieldState::Correctable { reason, suggested },
            ValidationOutcome::Rejected {
                reason,
                suggested: None,
            } => FieldState::Invalid { reason },
        };
        &self.state
    }

    /// Explicitly accept the suggested correction.
    ///
    /// Returns the suggestion and moves back to `Editing` with it
    /// pre-filled. Never applied silently on blur.
    pub fn apply_suggestion(&mut self) -> Option<Quantity> {
        if let FieldState::Correctable { suggested, .. } = self.state {
            self.state = FieldState::Editing;
            Some(suggested)
        } else {
            None
        }
    }

    /// Final submit.
    ///
    /// Re-validates the raw input, then resolves:
    /// - accepted: the quantity as entered;
    /// - correctable: self-heals to the suggestion rather than blocking;
    /// - uncorrectable: a hard error.
    pub fn submit(&mut self, raw: &str, lot: &PositionLot) -> EngineResult<Quantity> {
        let outcome = validate(raw, lot, &self.rule);
        match outcome {
            ValidationOutcome::Accepted(quantity) => {
                self.state = FieldState::Valid { quantity };
                Ok(quantity)
            }
            ValidationOutcome::Rejected {
                reason,
                suggested: Some(suggested),
            } => {
                warn!(
                    symbol = %self.rule.symbol,
                    raw,
                    %reason,
                    %suggested,
                    "submitting with fallback to suggested quantity"
                );
                self.state = FieldState::Valid {
                    quantity: suggested,
                };
                Ok(suggested)
            }
            ValidationOutcome::Rejected {
                reason,
                suggested: None,
            } => {
                self.state = FieldState::Invalid { reason };
                Err(match reason {
                    RejectReason::NotPositive => EngineError::InvalidQuantity(raw.to_string()),
                    _ => EngineError::CeilingBelowMinimum {
                        ceiling: lot.remaining(),
                        min_quantity: self.rule.min_quantity,
                    },
                })
            }
        }
    }
}
