//! Order placement contracts for the external execution service.
//!
//! The engine never signs or routes orders itself; these types describe the
//! request handed to the order execution collaborator and the acknowledgement
//! it returns. Only on a confirmed acknowledgement may a sale be settled
//! against a lot.

use crate::decimal::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type. MARKET pays the taker commission rate, LIMIT the maker rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    /// MARKET orders remove liquidity.
    pub fn is_taker(&self) -> bool {
        matches!(self, Self::Market)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Client order ID for idempotency.
///
/// Every order submission carries a unique id so retries against the
/// execution service cannot double-place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `folio_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("folio_{ts}_{uuid_short}"))
    }

    /// Create from an existing string (for parsing responses).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sell/buy order handed to the execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Trading symbol.
    pub symbol: String,

    /// Order side.
    pub side: OrderSide,

    /// Exchange-compliant order quantity.
    pub quantity: Quantity,

    /// Order type.
    pub order_type: OrderType,

    /// Limit price; required for LIMIT orders.
    pub limit_price: Option<Price>,

    /// Quote-denominated amount, for exchanges that accept it instead of a
    /// base quantity on MARKET orders.
    pub quote_quantity: Option<Decimal>,

    /// Idempotency key for this submission.
    pub client_order_id: ClientOrderId,
}

/// Acknowledgement from the execution service for an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Exchange-assigned order identifier.
    pub exchange_order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_taker() {
        assert!(OrderType::Market.is_taker());
        assert!(!OrderType::Limit.is_taker());
    }

    #[test]
    fn test_order_type_serde_tags() {
        assert_eq!(serde_json::to_string(&OrderType::Market).unwrap(), "\"MARKET\"");
        assert_eq!(serde_json::to_string(&OrderType::Limit).unwrap(), "\"LIMIT\"");
    }

    #[test]
    fn test_client_order_id_unique() {
        let id1 = ClientOrderId::new();
        let id2 = ClientOrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_client_order_id_format() {
        let id = ClientOrderId::new();
        assert!(id.as_str().starts_with("folio_"));
    }
}
