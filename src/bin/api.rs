use std::sync::Arc;

use dotenv::dotenv;

use bookfeed::api::{create_app, AppState};
use bookfeed::book_service::BookService;
use bookfeed::configure;
use bookfeed::db::{OrderStore, OrdersDb};
use bookfeed::logger::setup_logger;

const LOG_TARGET: &str = "api";

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = configure::load_config().expect("Failed to load config");

    if let Err(e) = setup_logger(&config) {
        eprintln!("Failed to initialize logger: {}", e);
        return;
    }

    log::info!(target: LOG_TARGET, "Book API service starting...");
    log::info!(target: LOG_TARGET, "=== Book API Boot Parameters ===");
    log::info!(target: LOG_TARGET, "  Bind Address:      {}:{}", config.api.host, config.api.port);
    log::info!(target: LOG_TARGET, "  ScyllaDB Hosts:    {:?}", config.scylladb.hosts);
    log::info!(target: LOG_TARGET, "  ScyllaDB Keyspace: {}", config.scylladb.keyspace);

    let db = match OrdersDb::connect(&config.scylladb).await {
        Ok(db) => {
            log::info!(target: LOG_TARGET, "Connected to ScyllaDB");
            db
        }
        Err(e) => {
            log::error!(target: LOG_TARGET, "Failed to connect to ScyllaDB: {:#}", e);
            std::process::exit(1);
        }
    };

    match db.health_check().await {
        Ok(true) => log::info!(target: LOG_TARGET, "ScyllaDB health check passed"),
        Ok(false) | Err(_) => {
            log::error!(target: LOG_TARGET, "ScyllaDB health check failed");
            std::process::exit(1);
        }
    }

    let store: Arc<dyn OrderStore> = Arc::new(db);
    let state = Arc::new(AppState {
        book: BookService::new(store),
    });

    let app = create_app(state);

    let addr = format!("{}:{}", config.api.host, config.api.port);
    log::info!(target: LOG_TARGET, "Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind API listener");
    axum::serve(listener, app).await.expect("API server error");
}
