use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use scylla::prepared_statement::PreparedStatement;
use scylla::transport::ExecutionProfile;
use scylla::{Session, SessionBuilder};

use crate::common_utils::get_current_timestamp_ms;
use crate::configure::ScyllaDbConfig;
use crate::db::OrderStore;
use crate::models::{Order, Side};
use crate::row_id::RowIdGen;

// CQL Statements
const CREATE_ORDERS_TABLE_CQL: &str = "
    CREATE TABLE IF NOT EXISTS orders (
        symbol     text,
        side       text,
        price      double,
        row_id     bigint,
        order_id   text,
        amount     double,
        created_at bigint,
        deleted_at bigint,
        PRIMARY KEY ((symbol, side), price, row_id)
    )
";

const INSERT_ORDER_CQL: &str = "
    INSERT INTO orders (symbol, side, price, row_id, order_id, amount, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BIDS_CQL: &str = "
    SELECT price, amount FROM orders
    WHERE symbol = ? AND side = 'buy'
    ORDER BY price DESC
    LIMIT ?
";

const SELECT_ASKS_CQL: &str = "
    SELECT price, amount FROM orders
    WHERE symbol = ? AND side = 'sell'
    ORDER BY price ASC
    LIMIT ?
";

/// Orders repository on ScyllaDB.
///
/// The partition key `(symbol, side)` makes both book queries
/// single-partition selects; clustering by `price` gives the store-side
/// sort and `row_id` the stable tie-break. Rows are immutable once
/// inserted and `order_id` is not unique; redelivered events produce
/// duplicate rows under fresh surrogate ids.
#[derive(Clone)]
pub struct OrdersDb {
    session: Arc<Session>,
    insert_order_stmt: PreparedStatement,
    select_bids_stmt: PreparedStatement,
    select_asks_stmt: PreparedStatement,
    row_ids: Arc<Mutex<RowIdGen>>,
}

impl OrdersDb {
    /// Connect to ScyllaDB, create the keyspace and table if missing,
    /// and prepare statements.
    pub async fn connect(config: &ScyllaDbConfig) -> Result<Self> {
        let profile = ExecutionProfile::builder()
            .request_timeout(Some(Duration::from_millis(config.request_timeout_ms)))
            .build();

        let session: Session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
            .default_execution_profile_handle(profile.into_handle())
            .build()
            .await
            .context("Failed to connect to ScyllaDB")?;

        Self::ensure_schema(&session, config).await?;

        session
            .use_keyspace(&config.keyspace, false)
            .await
            .context("Failed to use keyspace")?;

        let insert_order_stmt = session
            .prepare(INSERT_ORDER_CQL)
            .await
            .context("Failed to prepare insert order statement")?;

        let select_bids_stmt = session
            .prepare(SELECT_BIDS_CQL)
            .await
            .context("Failed to prepare select bids statement")?;

        let select_asks_stmt = session
            .prepare(SELECT_ASKS_CQL)
            .await
            .context("Failed to prepare select asks statement")?;

        Ok(Self {
            session: Arc::new(session),
            insert_order_stmt,
            select_bids_stmt,
            select_asks_stmt,
            row_ids: Arc::new(Mutex::new(RowIdGen::new())),
        })
    }

    /// Create the keyspace and orders table if they do not exist yet.
    async fn ensure_schema(session: &Session, config: &ScyllaDbConfig) -> Result<()> {
        let create_keyspace = format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = \
             {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
            config.keyspace, config.replication_factor
        );
        session
            .query(create_keyspace, &[])
            .await
            .context("Failed to create keyspace")?;

        session
            .query(
                format!("USE {}", config.keyspace),
                &[],
            )
            .await
            .context("Failed to switch to keyspace")?;

        session
            .query(CREATE_ORDERS_TABLE_CQL, &[])
            .await
            .context("Failed to create orders table")?;

        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<bool> {
        let query = "SELECT now() FROM system.local";
        self.session.query(query, &[]).await?;
        Ok(true)
    }
}

impl OrderStore for OrdersDb {
    fn insert_order(&self, order: Order) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let session = self.session.clone();
        let stmt = self.insert_order_stmt.clone();

        // Store-assigned metadata; business fields go in verbatim.
        let row_id = {
            let mut ids = self.row_ids.lock().unwrap();
            ids.generate()
        };
        let created_at = get_current_timestamp_ms();

        Box::pin(async move {
            session
                .execute(
                    &stmt,
                    (
                        order.symbol,
                        order.side.as_str(),
                        order.price,
                        row_id as i64,
                        order.order_id,
                        order.amount,
                        created_at,
                    ),
                )
                .await
                .context("Failed to insert order")?;
            Ok(())
        })
    }

    fn top_of_book(
        &self,
        symbol: String,
        side: Side,
        limit: i32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<(f64, f64)>>> + Send>> {
        let session = self.session.clone();
        let stmt = match side {
            Side::Buy => self.select_bids_stmt.clone(),
            Side::Sell => self.select_asks_stmt.clone(),
        };

        Box::pin(async move {
            if limit <= 0 {
                return Ok(Vec::new());
            }

            let result = session
                .execute(&stmt, (symbol, limit))
                .await
                .context("Failed to query book side")?;

            let mut levels = Vec::new();
            if let Some(rows) = result.rows {
                for row in rows {
                    let (price, amount) = row
                        .into_typed::<(f64, f64)>()
                        .context("Failed to parse order row")?;
                    levels.push((price, amount));
                }
            }
            Ok(levels)
        })
    }
}
