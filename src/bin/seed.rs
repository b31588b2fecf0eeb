use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};

use bookfeed::configure;
use bookfeed::models::{Order, Side};

#[derive(Parser)]
#[clap(author, version, about = "Publish a batch of sample orders to the orders topic", long_about = None)]
struct Args {
    /// Override the configured topic
    #[clap(long)]
    topic: Option<String>,
    /// Publish the sample batch this many times
    #[clap(long, default_value = "1")]
    repeat: u32,
}

fn sample_orders() -> Vec<Order> {
    let raw: [(&str, Side, &str, f64, f64); 10] = [
        ("1", Side::Buy, "AAPL", 10.0, 150.0),
        ("2", Side::Sell, "AAPL", 5.0, 2700.0),
        ("3", Side::Buy, "TSLA", 15.0, 700.0),
        ("4", Side::Sell, "TSLA", 20.0, 250.0),
        ("5", Side::Buy, "AAPL", 10.0, 3200.0),
        ("6", Side::Sell, "AAPL", 10.0, 300.0),
        ("7", Side::Buy, "TSLA", 10.0, 500.0),
        ("8", Side::Sell, "TSLA", 10.0, 500.0),
        ("9", Side::Buy, "AAPL", 10.0, 200.0),
        ("10", Side::Sell, "AAPL", 10.0, 50.0),
    ];

    raw.into_iter()
        .map(|(order_id, side, symbol, amount, price)| Order {
            order_id: order_id.to_string(),
            side,
            symbol: symbol.to_string(),
            amount,
            price,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();
    let config = configure::load_config().expect("Failed to load config");
    let topic = args.topic.unwrap_or(config.kafka.topic);

    println!("=== Order Seeder ===");
    println!("Broker: {}", config.kafka.broker);
    println!("Topic:  {}", topic);
    println!("--------------------");

    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", &config.kafka.broker)
        .set("message.timeout.ms", "5000")
        .set(
            "socket.keepalive.enable",
            &config.kafka.socket_keepalive_enable,
        )
        .create()?;

    let mut sent = 0u32;
    for _ in 0..args.repeat {
        for order in sample_orders() {
            let payload = serde_json::to_string(&order)?;
            let key = order.order_id.clone();
            let record = FutureRecord::to(&topic).key(&key).payload(&payload);

            match producer.send(record, Duration::from_secs(0)).await {
                Ok((partition, offset)) => {
                    sent += 1;
                    println!(
                        "Sent order {}: partition={}, offset={}",
                        order.order_id, partition, offset
                    );
                }
                Err((e, _)) => {
                    eprintln!("Failed to send order {}: {}", order.order_id, e);
                }
            }
        }
    }

    println!("Data seeding completed ({} messages). Exiting...", sent);
    Ok(())
}
