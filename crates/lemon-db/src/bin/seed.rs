//! # Seed Data Generator
//!
//! Populates the database with a sample menu and role-bearing users for
//! development.
//!
//! ## Usage
//! ```bash
//! cargo run -p lemon-db --bin seed
//!
//! # Specify database path
//! cargo run -p lemon-db --bin seed -- --db ./data/little_lemon.db
//! ```
//!
//! ## Generated Data
//! - Categories: starters, mains, desserts, drinks
//! - A handful of menu items per category
//! - Users `admin` (superuser), `manager`, `crew`, `customer`

use chrono::Utc;
use lemon_core::{Category, Group, MenuItem};
use lemon_db::repository::menu::{generate_category_id, generate_menu_item_id};
use lemon_db::{Database, DbConfig};
use std::env;

/// (slug, title, [(item title, price cents, featured)])
const MENU: &[(&str, &str, &[(&str, i64, bool)])] = &[
    (
        "starters",
        "Starters",
        &[
            ("Bruschetta", 799, true),
            ("Greek Salad", 1250, false),
            ("Lemon Garlic Soup", 650, false),
        ],
    ),
    (
        "mains",
        "Mains",
        &[
            ("Grilled Fish", 2099, true),
            ("Lamb Souvlaki", 1899, false),
            ("Pasta Primavera", 1550, false),
            ("Moussaka", 1725, false),
        ],
    ),
    (
        "desserts",
        "Desserts",
        &[
            ("Lemon Dessert", 500, true),
            ("Baklava", 575, false),
            ("Galaktoboureko", 625, false),
        ],
    ),
    (
        "drinks",
        "Drinks",
        &[
            ("Fresh Lemonade", 350, false),
            ("Espresso", 275, false),
            ("House Wine", 900, false),
        ],
    ),
];

/// (username, is_admin, group)
const USERS: &[(&str, bool, Option<Group>)] = &[
    ("admin", true, None),
    ("manager", false, Some(Group::Manager)),
    ("crew", false, Some(Group::DeliveryCrew)),
    ("customer", false, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./little_lemon.db");

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
                println!("Little Lemon Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./little_lemon.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🍋 Little Lemon Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.menu().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} menu items", existing);
        println!("  Skipping menu seed to avoid duplicates.");
    } else {
        seed_menu(&db).await?;
    }

    seed_users(&db).await?;

    println!();
    println!("✓ Seed complete!");
    println!("  Mint a token with: cargo run -p lemon-api --bin issue-token -- <username>");

    Ok(())
}

async fn seed_menu(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("Creating menu...");

    let mut generated = 0;
    for (slug, title, items) in MENU {
        let category = db
            .categories()
            .insert(&Category {
                id: generate_category_id(),
                slug: slug.to_string(),
                title: title.to_string(),
            })
            .await?;

        for (item_title, price_cents, featured) in items.iter() {
            let now = Utc::now();
            let item = MenuItem {
                id: generate_menu_item_id(),
                title: item_title.to_string(),
                price_cents: *price_cents,
                featured: *featured,
                category_id: category.id.clone(),
                created_at: now,
                updated_at: now,
            };

            if let Err(e) = db.menu().insert(&item).await {
                eprintln!("Failed to insert {}: {}", item.title, e);
                continue;
            }
            generated += 1;
        }
    }

    println!("✓ Created {} menu items in {} categories", generated, MENU.len());
    Ok(())
}

async fn seed_users(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("Creating users...");

    for (username, is_admin, group) in USERS {
        let user = match db.users().get_by_username(username).await? {
            Some(user) => {
                println!("  {} already exists", username);
                user
            }
            None => {
                let email = format!("{}@littlelemon.com", username);
                let user = db.users().create(username, Some(&email), *is_admin).await?;
                println!("  {} created (id {})", username, user.id);
                user
            }
        };

        if let Some(group) = group {
            db.users().add_to_group(&user.id, *group).await?;
        }
    }

    Ok(())
}
