//! Commission rates per symbol and order type.
//!
//! MARKET orders remove liquidity and pay the taker rate; LIMIT orders add
//! liquidity and pay the maker rate. Rates are account-tier-dependent and
//! can change between requests, so callers fetch a fresh schedule per sale;
//! the engine never caches one across calls.

use crate::decimal::{Price, Quantity};
use crate::error::{CoreError, CoreResult};
use crate::order::OrderType;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission terms for one sale: symbol, order type, and the selected rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    /// Trading symbol this schedule applies to.
    pub symbol: String,

    /// Order type the rate was selected for.
    pub order_type: OrderType,

    /// Commission rate as a fraction of gross proceeds (e.g., 0.001).
    pub rate: Decimal,

    /// Asset the commission is settled in.
    pub settlement_asset: String,
}

impl CommissionSchedule {
    /// Create a schedule, validating the rate is a sane fraction.
    pub fn new(
        symbol: impl Into<String>,
        order_type: OrderType,
        rate: Decimal,
        settlement_asset: impl Into<String>,
    ) -> CoreResult<Self> {
        let symbol = symbol.into();
        if rate.is_sign_negative() || rate >= Decimal::ONE {
            return Err(CoreError::InvalidCommission(format!(
                "{symbol}: rate must be in [0, 1), got {rate}"
            )));
        }
        Ok(Self {
            symbol,
            order_type,
            rate,
            settlement_asset: settlement_asset.into(),
        })
    }

    /// Commission owed on the given gross proceeds.
    pub fn commission_on(&self, gross_proceeds: Decimal) -> Decimal {
        gross_proceeds * self.rate
    }

    /// Commission owed on a quantity at a price, in the settlement asset.
    pub fn commission_for(&self, quantity: Quantity, price: Price) -> Decimal {
        self.commission_on(quantity.notional(price))
    }
}

/// Maker and taker rates for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolFees {
    /// Rate for LIMIT orders (add liquidity).
    #[serde(rename = "makerRate")]
    pub maker_rate: Decimal,

    /// Rate for MARKET orders (remove liquidity).
    #[serde(rename = "takerRate")]
    pub taker_rate: Decimal,

    /// Asset commissions are settled in.
    #[serde(rename = "settlementAsset")]
    pub settlement_asset: String,
}

impl SymbolFees {
    /// Select the rate for an order type and build the per-sale schedule.
    pub fn schedule_for(&self, symbol: &str, order_type: OrderType) -> CoreResult<CommissionSchedule> {
        let rate = match order_type {
            OrderType::Market => self.taker_rate,
            OrderType::Limit => self.maker_rate,
        };
        CommissionSchedule::new(symbol, order_type, rate, self.settlement_asset.clone())
    }
}

/// Concurrent symbol -> fees lookup table.
///
/// Backs the commission rate source for config-driven deployments. Note the
/// table holds the account's current tier rates; consumers still build a
/// fresh [`CommissionSchedule`] per sale rather than holding one.
#[derive(Debug, Default)]
pub struct FeeTable {
    fees: DashMap<String, SymbolFees>,
}

impl FeeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from deserialized (symbol, fees) pairs.
    pub fn from_fees(fees: impl IntoIterator<Item = (String, SymbolFees)>) -> Self {
        let table = Self::new();
        for (symbol, entry) in fees {
            table.upsert(symbol, entry);
        }
        table
    }

    /// Get the fees for a symbol.
    pub fn get(&self, symbol: &str) -> Option<SymbolFees> {
        self.fees.get(symbol).map(|entry| entry.value().clone())
    }

    /// Insert or replace the fees for a symbol.
    pub fn upsert(&self, symbol: impl Into<String>, fees: SymbolFees) {
        self.fees.insert(symbol.into(), fees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_fees() -> SymbolFees {
        SymbolFees {
            maker_rate: dec!(0.0008),
            taker_rate: dec!(0.001),
            settlement_asset: "USDT".to_string(),
        }
    }

    #[test]
    fn test_maker_taker_selection() {
        let fees = btc_fees();

        let taker = fees.schedule_for("BTCUSDT", OrderType::Market).unwrap();
        assert_eq!(taker.rate, dec!(0.001));

        let maker = fees.schedule_for("BTCUSDT", OrderType::Limit).unwrap();
        assert_eq!(maker.rate, dec!(0.0008));
        assert_eq!(maker.settlement_asset, "USDT");
    }

    #[test]
    fn test_commission_on_gross() {
        let schedule = btc_fees().schedule_for("BTCUSDT", OrderType::Market).unwrap();

        assert_eq!(schedule.commission_on(dec!(8800)), dec!(8.8));
        assert_eq!(
            schedule.commission_for(Quantity::new(dec!(0.4)), Price::new(dec!(22000))),
            dec!(8.8)
        );
    }

    #[test]
    fn test_rate_validation() {
        let err = CommissionSchedule::new("BTCUSDT", OrderType::Market, dec!(-0.001), "USDT");
        assert!(err.is_err());

        let err = CommissionSchedule::new("BTCUSDT", OrderType::Market, dec!(1), "USDT");
        assert!(err.is_err());

        // Zero commission is legal (promotional tiers).
        assert!(CommissionSchedule::new("BTCUSDT", OrderType::Market, dec!(0), "USDT").is_ok());
    }

    #[test]
    fn test_fee_table_lookup() {
        let table = FeeTable::from_fees([("BTCUSDT".to_string(), btc_fees())]);

        assert!(table.get("BTCUSDT").is_some());
        assert!(table.get("ETHUSDT").is_none());
    }

    #[test]
    fn test_symbol_fees_deserialize() {
        let json = r#"{"makerRate":"0.0008","takerRate":"0.001","settlementAsset":"USDT"}"#;
        let fees: SymbolFees = serde_json::from_str(json).unwrap();
        assert_eq!(fees.taker_rate, dec!(0.001));
    }
}
