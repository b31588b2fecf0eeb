use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub broker: String,
    pub topic: String,
    pub group_id: String,
    pub session_timeout_ms: String,
    pub heartbeat_interval_ms: String,
    pub socket_keepalive_enable: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScyllaDbConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub replication_factor: i32,
    pub connection_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: String,
    pub log_to_file: bool,
    pub kafka: KafkaConfig,
    pub scylladb: ScyllaDbConfig,
    pub api: ApiConfig,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("log_level", "info")?
        .set_default("log_file", "log/bookfeed.log")?
        .set_default("log_to_file", false)?
        .set_default("kafka.broker", "localhost:9092")?
        .set_default("kafka.topic", "orders")?
        .set_default("kafka.group_id", "orders-consumer")?
        .set_default("kafka.session_timeout_ms", "6000")?
        .set_default("kafka.heartbeat_interval_ms", "2000")?
        .set_default("kafka.socket_keepalive_enable", "true")?
        .set_default("scylladb.hosts", vec!["127.0.0.1:9042"])?
        .set_default("scylladb.keyspace", "bookfeed")?
        .set_default("scylladb.replication_factor", 1)?
        .set_default("scylladb.connection_timeout_ms", 5000)?
        .set_default("scylladb.request_timeout_ms", 5000)?
        .set_default("api.host", "0.0.0.0")?
        .set_default("api.port", 9090)?
        // Add configuration from a file
        .add_source(File::with_name("config/config.yaml").required(false))
        // Add configuration from environment variables
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    s.try_deserialize()
}
