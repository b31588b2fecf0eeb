use std::sync::Arc;

use anyhow::Result;

use crate::db::OrderStore;
use crate::models::{BookSnapshot, PriceLevel, Side};

pub const DEFAULT_LIMIT: i32 = 100;
pub const MAX_LIMIT: i32 = 1000;

/// Clamp a requested result-size bound into `[0, MAX_LIMIT]`. Values
/// above the cap are reduced, not rejected.
pub fn clamp_limit(limit: i32) -> i32 {
    limit.clamp(0, MAX_LIMIT)
}

/// Stateless read path over the orders store: one invocation per request,
/// fully concurrent with ingestion. Consistency is whatever the store's
/// read semantics give us; no in-process locks.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn OrderStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Assemble the book for `symbol`: up to `limit` bids (price
    /// descending) and asks (price ascending), rendered as two-decimal
    /// string pairs. An unknown symbol yields empty sides.
    pub async fn snapshot(&self, symbol: &str, limit: i32) -> Result<BookSnapshot> {
        let limit = clamp_limit(limit);

        let bids_fut = self.store.top_of_book(symbol.to_string(), Side::Buy, limit);
        let asks_fut = self.store.top_of_book(symbol.to_string(), Side::Sell, limit);
        let (bids, asks) = tokio::try_join!(bids_fut, asks_fut)?;

        Ok(BookSnapshot {
            bids: render(bids),
            asks: render(asks),
        })
    }
}

fn render(levels: Vec<(f64, f64)>) -> Vec<PriceLevel> {
    levels
        .into_iter()
        .map(|(price, amount)| PriceLevel::render(price, amount))
        .collect()
}
