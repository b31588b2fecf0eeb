use std::sync::Arc;

use dotenv::dotenv;
use tokio::sync::watch;

use bookfeed::configure;
use bookfeed::consumer::IngestWorker;
use bookfeed::db::{OrderStore, OrdersDb};
use bookfeed::logger::setup_logger;

const LOG_TARGET: &str = "consume";

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = configure::load_config().expect("Failed to load config");

    if let Err(e) = setup_logger(&config) {
        eprintln!("Failed to initialize logger: {}", e);
        return;
    }

    log::info!(target: LOG_TARGET, "Order ingest service starting...");
    log::info!(target: LOG_TARGET, "=== Ingest Service Boot Parameters ===");
    log::info!(target: LOG_TARGET, "  Kafka Broker:      {}", config.kafka.broker);
    log::info!(target: LOG_TARGET, "  Kafka Topic:       {}", config.kafka.topic);
    log::info!(target: LOG_TARGET, "  Consumer Group:    {}", config.kafka.group_id);
    log::info!(target: LOG_TARGET, "  ScyllaDB Hosts:    {:?}", config.scylladb.hosts);
    log::info!(target: LOG_TARGET, "  ScyllaDB Keyspace: {}", config.scylladb.keyspace);

    // No store, no useful work: connectivity failures at startup are fatal.
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

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = match IngestWorker::connect(&config.kafka, store, shutdown_rx) {
        Ok(worker) => worker,
        Err(e) => {
            log::error!(target: LOG_TARGET, "Failed to create Kafka consumer: {:#}", e);
            std::process::exit(1);
        }
    };

    let worker_handle = tokio::spawn(worker.run());

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    log::info!(target: LOG_TARGET, "Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    log::info!(target: LOG_TARGET, "Consumer stopped");
}
