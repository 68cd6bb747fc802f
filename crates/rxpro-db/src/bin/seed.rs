//! # Seed Data Generator
//!
//! Stocks the inventory with common pharmacy lines for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p rxpro-db --bin seed
//! cargo run -p rxpro-db --bin seed -- --db ./data/rxpro.db
//! ```

use chrono::NaiveDate;
use rxpro_core::NewDrug;
use rxpro_db::{Database, DbConfig};
use std::env;

/// (name, usage, expiry, stock)
const DRUGS: &[(&str, &str, (i32, u32, u32), i64)] = &[
    ("Paracetamol 500mg", "Fever and mild pain", (2027, 6, 30), 200),
    ("Ibuprofen 400mg", "Pain and inflammation", (2027, 3, 31), 120),
    ("Amoxicillin 500mg", "Bacterial infections", (2026, 11, 30), 80),
    ("Azithromycin 250mg", "Respiratory infections", (2027, 1, 31), 60),
    ("Cetirizine 10mg", "Allergic rhinitis", (2027, 9, 30), 150),
    ("Metformin 500mg", "Type 2 diabetes", (2027, 12, 31), 180),
    ("Amlodipine 5mg", "Hypertension", (2027, 8, 31), 140),
    ("Atorvastatin 10mg", "High cholesterol", (2027, 5, 31), 110),
    ("Omeprazole 20mg", "Acid reflux", (2027, 2, 28), 130),
    ("Salbutamol Inhaler", "Asthma relief", (2026, 12, 31), 40),
    ("ORS Sachet", "Dehydration", (2028, 1, 31), 300),
    ("Vitamin D3 60K", "Vitamin D deficiency", (2027, 10, 31), 90),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rxpro_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("RxPro Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rxpro_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 RxPro Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.drugs().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} drugs", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut stocked = 0;
    for (name, usage, (y, m, d), quantity) in DRUGS {
        let Some(expiry_date) = NaiveDate::from_ymd_opt(*y, *m, *d) else {
            eprintln!("Skipping {}: invalid expiry date", name);
            continue;
        };

        let new_drug = NewDrug {
            name: name.to_string(),
            expiry_date,
            usage: usage.to_string(),
            quantity: *quantity,
        };

        match db.drugs().add(new_drug).await {
            Ok(drug) => {
                println!("  {:>6}  {}", drug.id, drug.name);
                stocked += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Stocked {} drugs", stocked);

    db.close().await;
    Ok(())
}
