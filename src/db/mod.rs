use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::models::{Order, Side};

pub mod orders_db;


pub use orders_db::OrdersDb;

/// Store seam shared by the ingestion worker and the book query service.
/// The worker only inserts; the query side only reads one book side at a
/// time, already filtered, sorted, and limited by the store.
pub trait OrderStore: Send + Sync {
    /// Persist one order. The store assigns the surrogate row id and
    /// creation timestamp; business fields are taken verbatim.
    fn insert_order(&self, order: Order) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    /// Fetch up to `limit` `(price, amount)` pairs for one side of the
    /// book: buys sorted by price descending, sells ascending. Ties break
    /// by store-assigned row id, stable across queries.
    fn top_of_book(
        &self,
        symbol: String,
        side: Side,
        limit: i32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<(f64, f64)>>> + Send>>;
}
