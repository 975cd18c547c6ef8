//! The reserve -> execute -> settle sequence for one confirmed sale.
//!
//! Callers that accept a validated quantity drive this flow under their own
//! per-lot serialization (one in-flight sale per lot). Any failure before
//! settlement leaves the lot untouched; an abandoned sale simply never
//! reaches [`settle_sale`].

use crate::error::EngineResult;
use crate::lot::PositionLot;
use crate::settlement::{self, SaleRecord};
use crate::sources::{CommissionRateSource, LotStore, OrderExecutor};
use folio_core::{ClientOrderId, OrderRequest, OrderSide, OrderType, Price, Quantity};
use tracing::{debug, info};

/// Execute and settle one sale against a lot.
///
/// Sequence: advisory `reserve`, fetch the fresh commission schedule, place
/// the order (with a unique client order id for idempotent submission),
/// compute the settlement, deplete the lot, write the lot through to the
/// store. `sale_price` is the execution price the settlement is computed
/// at; for LIMIT orders it normally equals `limit_price`.
pub fn settle_sale<E, C, S>(
    lot: &mut PositionLot,
    quantity: Quantity,
    sale_price: Price,
    order_type: OrderType,
    limit_price: Option<Price>,
    executor: &E,
    fees: &C,
    store: &S,
) -> EngineResult<SaleRecord>
where
    E: OrderExecutor,
    C: CommissionRateSource,
    S: LotStore,
{
    lot.reserve(quantity)?;

    let schedule = fees.schedule_for(lot.symbol(), order_type)?;

    let request = OrderRequest {
        symbol: lot.symbol().to_string(),
        side: OrderSide::Sell,
        quantity,
        order_type,
        limit_price,
        quote_quantity: None,
        client_order_id: ClientOrderId::new(),
    };
    debug!(
        lot_id = %lot.id(),
        cloid = %request.client_order_id,
        %quantity,
        %order_type,
        "placing sell order"
    );
    let ack = executor.place_order(&request)?;

    let record = settlement::compute(lot, quantity, sale_price, &schedule);
    settlement::apply(lot, &record)?;
    store.write_through(lot)?;

    info!(
        lot_id = %lot.id(),
        exchange_order_id = %ack.exchange_order_id,
        net_profit = %record.net_profit,
        remaining = %lot.remaining(),
        "sale settled"
    );
    Ok(record)
}
