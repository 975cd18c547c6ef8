//! Settlement: realized P&L for a confirmed sale.
//!
//! Combines a validated sale quantity, the execution price, the lot it
//! depletes, and the fresh commission schedule into an immutable
//! [`SaleRecord`]. Pure computation, no I/O; values are kept at full
//! precision and rounded only at the display boundary.

use crate::error::EngineResult;
use crate::lot::{LotId, PositionLot};
use chrono::{DateTime, Utc};
use folio_core::{CommissionSchedule, Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of one settled sale. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Lot the sale depletes.
    pub lot_id: LotId,

    /// Trading symbol.
    pub symbol: String,

    /// Quantity sold.
    pub quantity_sold: Quantity,

    /// Execution price per unit.
    pub sale_price: Price,

    /// quantity_sold * sale_price.
    pub gross_proceeds: Decimal,

    /// Purchase cost attributed to the sold quantity, anchored to the
    /// original lot quantity.
    pub cost_basis: Decimal,

    /// Commission charged on gross proceeds.
    pub commission: Decimal,

    /// Asset the commission settles in.
    pub commission_asset: String,

    /// gross_proceeds - commission - cost_basis.
    pub net_profit: Decimal,

    /// net_profit / gross_proceeds * 100; zero when gross is zero.
    pub profit_percentage: Decimal,

    /// When the sale was computed.
    pub executed_at: DateTime<Utc>,
}

/// Compute the settlement record for a sale.
///
/// Cost basis is allocated proportionally against the lot's original
/// quantity, never the remaining quantity, so historical P&L does not shift
/// as the lot depletes. A sale of the entire original quantity uses the
/// stored total cost exactly, avoiding rounding drift from the ratio.
pub fn compute(
    lot: &PositionLot,
    quantity_sold: Quantity,
    sale_price: Price,
    schedule: &CommissionSchedule,
) -> SaleRecord {
    let gross_proceeds = quantity_sold.notional(sale_price);

    let cost_basis = if quantity_sold.approx_eq(lot.original_quantity()) {
        lot.total_cost()
    } else {
        lot.total_cost() * quantity_sold.inner() / lot.original_quantity().inner()
    };

    let commission = schedule.commission_on(gross_proceeds);
    let net_profit = gross_proceeds - commission - cost_basis;
    let profit_percentage = if gross_proceeds.is_zero() {
        Decimal::ZERO
    } else {
        net_profit / gross_proceeds * Decimal::from(100)
    };

    debug!(
        lot_id = %lot.id(),
        symbol = %lot.symbol(),
        %quantity_sold,
        %sale_price,
        %gross_proceeds,
        %net_profit,
        "computed sale settlement"
    );

    SaleRecord {
        lot_id: lot.id(),
        symbol: lot.symbol().to_string(),
        quantity_sold,
        sale_price,
        gross_proceeds,
        cost_basis,
        commission,
        commission_asset: schedule.settlement_asset.clone(),
        net_profit,
        profit_percentage,
        executed_at: Utc::now(),
    }
}

/// Transition a computed record to "settled" by depleting the lot.
///
/// The single point where a [`SaleRecord`] touches lot state. Call at most
/// once per externally-confirmed sale.
pub fn apply(lot: &mut PositionLot, record: &SaleRecord) -> EngineResult<()> {
    lot.apply_sale(record.quantity_sold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::OrderType;
    use rust_decimal_macros::dec;

    fn lot(quantity: Decimal, total_cost: Decimal) -> PositionLot {
        PositionLot::new(
            "BTCUSDT",
            Quantity::new(quantity),
            Price::new(total_cost / quantity),
            total_cost,
            Utc::now(),
        )
        .unwrap()
    }

    fn taker_schedule(rate: Decimal) -> CommissionSchedule {
        CommissionSchedule::new("BTCUSDT", OrderType::Market, rate, "USDT").unwrap()
    }

    #[test]
    fn test_partial_sale_settlement() {
        let lot = lot(dec!(1.0), dec!(20000));
        let schedule = taker_schedule(dec!(0.001));

        let record = compute(
            &lot,
            Quantity::new(dec!(0.4)),
            Price::new(dec!(22000)),
            &schedule,
        );

        assert_eq!(record.gross_proceeds, dec!(8800));
        assert_eq!(record.cost_basis, dec!(8000));
        assert_eq!(record.commission, dec!(8.8));
        assert_eq!(record.net_profit, dec!(791.2));
        assert_eq!(record.profit_percentage.round_dp(2), dec!(8.99));
        assert_eq!(record.commission_asset, "USDT");
    }

    #[test]
    fn test_full_sale_uses_stored_total_cost() {
        // 3 units at a cost that does not divide evenly: the ratio would
        // reproduce total_cost only up to an epsilon, the stored value is
        // exact.
        let lot = lot(dec!(3), dec!(100));
        let schedule = taker_schedule(dec!(0.001));

        let record = compute(&lot, Quantity::new(dec!(3)), Price::new(dec!(40)), &schedule);
        assert_eq!(record.cost_basis, dec!(100));
    }

    #[test]
    fn test_cost_basis_conservation_over_partial_sales() {
        let mut lot = lot(dec!(3), dec!(100));
        let schedule = taker_schedule(dec!(0.001));

        let mut basis_sum = Decimal::ZERO;
        for _ in 0..3 {
            let record = compute(
                &lot,
                Quantity::new(dec!(1)),
                Price::new(dec!(40)),
                &schedule,
            );
            basis_sum += record.cost_basis;
            apply(&mut lot, &record).unwrap();
        }

        assert!((basis_sum - dec!(100)).abs() < dec!(0.000000001));
        assert_eq!(lot.remaining(), Quantity::ZERO);
        assert!(lot.is_closed());
    }

    #[test]
    fn test_zero_gross_is_finite() {
        let lot = lot(dec!(1.0), dec!(20000));
        let schedule = taker_schedule(dec!(0.001));

        let record = compute(&lot, Quantity::ZERO, Price::new(dec!(22000)), &schedule);
        assert_eq!(record.gross_proceeds, Decimal::ZERO);
        assert_eq!(record.profit_percentage, Decimal::ZERO);

        let record = compute(&lot, Quantity::new(dec!(0.4)), Price::ZERO, &schedule);
        assert_eq!(record.profit_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_cost_basis_anchored_to_original_quantity() {
        // After a partial sale the per-unit basis must not be reassessed
        // against the remaining quantity.
        let mut lot = lot(dec!(2), dec!(40000));
        let schedule = taker_schedule(dec!(0.001));

        let first = compute(
            &lot,
            Quantity::new(dec!(1)),
            Price::new(dec!(25000)),
            &schedule,
        );
        apply(&mut lot, &first).unwrap();

        let second = compute(
            &lot,
            Quantity::new(dec!(0.5)),
            Price::new(dec!(25000)),
            &schedule,
        );
        // 40000 * 0.5 / 2, not 20000 * 0.5 / 1 recomputed over remaining.
        assert_eq!(second.cost_basis, dec!(10000));
    }

    #[test]
    fn test_apply_rejects_oversell() {
        let mut lot = lot(dec!(1.0), dec!(20000));
        let schedule = taker_schedule(dec!(0.001));

        let record = compute(
            &lot,
            Quantity::new(dec!(1.5)),
            Price::new(dec!(22000)),
            &schedule,
        );
        assert!(apply(&mut lot, &record).is_err());
        assert_eq!(lot.remaining(), Quantity::new(dec!(1.0)));
    }

    #[test]
    fn test_record_serializes_for_dashboard() {
        let lot = lot(dec!(1.0), dec!(20000));
        let schedule = taker_schedule(dec!(0.001));

        let record = compute(
            &lot,
            Quantity::new(dec!(0.4)),
            Price::new(dec!(22000)),
            &schedule,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["symbol"], "BTCUSDT");
        // Decimals cross the wire as strings; the dashboard parses them.
        let gross: Decimal = json["gross_proceeds"].as_str().unwrap().parse().unwrap();
        assert_eq!(gross, dec!(8800));
    }

    #[test]
    fn test_loss_sale_negative_profit() {
        let lot = lot(dec!(1.0), dec!(20000));
        let schedule = taker_schedule(dec!(0.001));

        let record = compute(
            &lot,
            Quantity::new(dec!(1.0)),
            Price::new(dec!(15000)),
            &schedule,
        );
        assert_eq!(record.gross_proceeds, dec!(15000));
        assert_eq!(record.commission, dec!(15));
        assert_eq!(record.net_profit, dec!(-5015));
        assert!(record.profit_percentage.is_sign_negative());
    }
}
