//! # Seed Data
//!
//! Prepares a shop database with the regular customers and the default
//! jewelry catalogue (STK0001..STK0010).
//!
//! ## Usage
//! ```bash
//! # Seed ./kuyum.db if its tables are empty
//! cargo run -p kuyum-db --bin seed
//!
//! # Specify database path (or set KUYUM_DB_PATH)
//! cargo run -p kuyum-db --bin seed -- --db ./data/kuyum.db
//!
//! # Add whatever starter rows are missing, even if tables have data
//! cargo run -p kuyum-db --bin seed -- --force
//! ```

use std::env;

use kuyum_core::catalogue::{default_catalogue, DEMO_CUSTOMERS};
use kuyum_db::{Database, DbConfig, LedgerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kuyum=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("KUYUM_DB_PATH").unwrap_or_else(|_| String::from("kuyum.db"));
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Kuyum Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kuyum.db)");
                println!("  -f, --force        Add missing starter rows even if tables have data");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    println!("Database: {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let config = LedgerConfig::from_env();
    let catalogue = default_catalogue(config.default_critical_qty);
    let ledger = db.ledger(config);

    let committed = if force {
        ledger.seed_missing(&DEMO_CUSTOMERS, &catalogue).await?
    } else {
        ledger.seed_if_empty(&DEMO_CUSTOMERS, &catalogue).await?
    };

    if committed.events.is_empty() {
        println!("Nothing to seed. Use --force to add missing starter rows.");
    }

    println!("{}", serde_json::to_string_pretty(&committed.value)?);
    println!("{}", serde_json::to_string_pretty(&ledger.table_counts().await?)?);

    db.close().await;
    Ok(())
}
