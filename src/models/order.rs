use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order side. Closed set: any other value on the wire is a decode error,
/// so malformed sides are rejected at ingestion and never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("Unknown side: {}", other)),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted order as carried on the wire.
///
/// `order_id` is assigned by the producer and is not unique at the store
/// layer; the store attaches its own surrogate id and timestamps on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub side: Side,
    pub symbol: String,
    pub amount: f64,
    pub price: f64,
}
