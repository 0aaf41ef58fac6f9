// src/bin/import_records.rs

use std::env;
use std::fs;

use ipo_underwriter_backend::config::Config;
use ipo_underwriter_backend::models::record::CreateRecordRequest;
use ipo_underwriter_backend::services::records::RecordService;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Usage: cargo run --bin import_records -- data/records.json
    let args: Vec<String> = env::args().collect();
    let file_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "data/sample-records.json".to_string());

    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url).await?;

    println!("Importing records from {}", file_path);
    let contents = fs::read_to_string(&file_path)?;
    let records: Vec<CreateRecordRequest> = serde_json::from_str(&contents)?;

    if records.is_empty() {
        eprintln!("No records to import. Provide a JSON array of records.");
        std::process::exit(1);
    }

    println!("Found {} records", records.len());
    let result = RecordService::new().bulk_create(&db, records).await;

    println!("\nImport complete!");
    println!("    Imported: {}", result.success);
    if result.failed > 0 {
        println!("    Failed: {}", result.failed);
        for error in &result.errors {
            println!("      - {}", error);
        }
    }

    Ok(())
}
