//! Lot size adjustment.
//!
//! Maps an arbitrary requested sale quantity to the nearest exchange-legal
//! quantity not exceeding a ceiling (usually the lot's remaining quantity).
//! Pure and deterministic; the only failure is a ceiling that cannot fit
//! the exchange minimum.

use crate::error::{EngineError, EngineResult};
use folio_core::{LotSizeRule, Quantity};
use tracing::trace;

/// Adjust `requested` to a rule-compliant quantity no greater than `ceiling`.
///
/// The effective request (capped at the ceiling) is floored to the step
/// grid. If that lands below the exchange minimum, the minimum is bumped up
/// to the next grid point instead; if even that exceeds the ceiling, no
/// legal quantity exists and [`EngineError::CeilingBelowMinimum`] is
/// returned.
///
/// The result is truncated to the decimal precision implied by the step
/// size, so no arithmetic tail survives to order submission.
pub fn adjust(
    requested: Quantity,
    rule: &LotSizeRule,
    ceiling: Quantity,
) -> EngineResult<Quantity> {
    if !ceiling.is_positive() || !rule.min_quantity.fits_within(ceiling) {
        return Err(EngineError::CeilingBelowMinimum {
            ceiling,
            min_quantity: rule.min_quantity,
        });
    }

    let effective = if requested.fits_within(ceiling) {
        requested
    } else {
        ceiling
    };
    let floored = effective.round_down_to_step(rule.step_size);

    let candidate = if rule.min_quantity.fits_within(floored) {
        floored
    } else {
        // Floor landed below the minimum; take the first grid point at or
        // above it, which must still fit under the ceiling.
        let bumped = rule.min_quantity.round_up_to_step(rule.step_size);
        if !bumped.fits_within(ceiling) {
            return Err(EngineError::CeilingBelowMinimum {
                ceiling,
                min_quantity: rule.min_quantity,
            });
        }
        bumped
    };

    let adjusted = candidate.truncate_to_digits(rule.step_digits());
    trace!(
        symbol = %rule.symbol,
        %requested,
        %ceiling,
        %adjusted,
        "adjusted sale quantity"
    );
    Ok(adjusted)
}

/// Largest rule-compliant quantity not exceeding `ceiling`.
///
/// Degenerate call `adjust(ceiling, rule, ceiling)`; used to offer
/// "use max available" and to pre-fill the sale form.
pub fn max_valid_quantity(ceiling: Quantity, rule: &LotSizeRule) -> EngineResult<Quantity> {
    adjust(ceiling, rule, ceiling)
}
