use serde::{Deserialize, Serialize};

/// Render a numeric value with exactly two fraction digits.
///
/// This is the only place the display contract lives; every price and
/// amount leaving the service passes through here. Rounding is Rust's
/// default float formatting (round-half-to-even), display-only.
pub fn format_fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

/// One rendered book level, serialized as a `[price, amount]` string pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel(pub String, pub String);

impl PriceLevel {
    pub fn render(price: f64, amount: f64) -> Self {
        Self(format_fixed2(price), format_fixed2(amount))
    }
}

/// Book snapshot for one symbol: bids sorted by price descending,
/// asks ascending, both already rendered for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}
