//! # Seed Data Generator
//!
//! Fills a development inventory with pantry items.
//!
//! ## Usage
//! ```bash
//! # Generate 200 items (default)
//! cargo run -p pantry-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p pantry-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p pantry-db --bin seed -- --db ./data/pantry.db
//! ```
//!
//! Items cycle through a small catalog of shelves. Barcodes are 13 digits
//! (valid shape, not a real EAN checksum); expiry dates spread over the
//! next ten weeks and quantities over 0-11, so the expiring and low-stock
//! views have something to show.

use chrono::{Duration, Utc};
use pantry_core::NewFoodRecord;
use pantry_db::{Database, DbConfig};
use std::env;

/// (location, category, items) for realistic test data.
const SHELVES: &[(&str, &str, &[&str])] = &[
    (
        "fridge",
        "Dairies",
        &[
            "Whole Milk",
            "Greek Yogurt",
            "Cheddar Cheese",
            "Butter",
            "Oat Milk",
            "Cottage Cheese",
        ],
    ),
    (
        "pantry",
        "Cereals and potatoes",
        &[
            "Rolled Oats",
            "Brown Rice",
            "Penne Pasta",
            "Corn Flakes",
            "Wheat Flour",
        ],
    ),
    (
        "pantry",
        "Spreads",
        &["Peanut Butter", "Strawberry Jam", "Honey", "Hazelnut Spread"],
    ),
    (
        "freezer",
        "Frozen foods",
        &["Frozen Peas", "Vanilla Ice Cream", "Fish Sticks", "Frozen Berries"],
    ),
    (
        "counter",
        "Fruits",
        &["Green Apple", "Bananas", "Oranges", "Apple Juice"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./data/pantry_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Pantry Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/pantry_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Pantry Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.foods().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating items...");

    let catalog: Vec<(&str, &str, &str)> = SHELVES
        .iter()
        .flat_map(|(location, category, items)| {
            items.iter().map(move |item| (*location, *category, *item))
        })
        .collect();

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let (location, category, name) = catalog[seed % catalog.len()];
        let item = generate_item(location, category, name, seed);

        if let Err(e) = db.foods().insert(item).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} items...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} items in {:?}", generated, elapsed);

    println!();
    println!("Verifying views...");
    let today = Utc::now().date_naive();
    let expiring = db.foods().expiring_within(7, today).await?;
    println!("  Expiring within 7 days: {}", expiring.len());
    let low = db.foods().low_stock(3).await?;
    println!("  Quantity below 3: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single inventory item.
fn generate_item(location: &str, category: &str, name: &str, seed: usize) -> NewFoodRecord {
    let today = Utc::now().date_naive();

    NewFoodRecord {
        barcode: format!("590{:010}", seed % 97),
        name: name.to_string(),
        brand: Some(["Pantry Basics", "Green Farm", "Nordic"][seed % 3].to_string()),
        category: vec![category.to_string()],
        calories: Some(40 + ((seed * 37) % 560) as i64),
        protein: Some(((seed * 13) % 250) as f64 / 10.0),
        fat: Some(((seed * 7) % 300) as f64 / 10.0),
        carbs: Some(((seed * 11) % 700) as f64 / 10.0),
        fiber: None,
        sugars: None,
        sodium: None,
        allergens: Vec::new(),
        image_url: None,
        expiry_date: Some(today + Duration::days((seed % 70) as i64)),
        quantity: (seed % 12) as i64,
        location: Some(location.to_string()),
    }
}
