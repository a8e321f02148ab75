//! Ethereal Cart CLI - catalog checks and cart management.
//!
//! # Usage
//!
//! ```bash
//! # Validate a catalog file
//! ec-cli catalog validate --catalog data/catalog.json
//!
//! # List in-stock electronics, cheapest first
//! ec-cli catalog list --category electronics --in-stock true --sort price-low
//!
//! # Add two of product 3 to the cart stored under .data/
//! ec-cli cart add 3 -q 2
//!
//! # Show the cart with totals
//! ec-cli cart show
//! ```
//!
//! # Commands
//!
//! - `catalog validate|list|show|search` - Inspect the product catalog
//! - `cart show|add|update|remove|clear|count` - Manage the file-backed cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use ethereal_cart_core::SortKey;

mod commands;

#[derive(Parser)]
#[command(name = "ec-cli")]
#[command(author, version, about = "Ethereal Cart CLI tools")]
struct Cli {
    /// Catalog JSON file (defaults to `STOREFRONT_CATALOG_PATH`, then the embedded catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the persisted cart
    Cart {
        /// Cart data directory (defaults to `STOREFRONT_DATA_DIR`, then `.data`)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Check catalog integrity and print a summary
    Validate,
    /// List products matching a filter
    List(ListArgs),
    /// Show a single product
    Show {
        /// Product ID
        id: String,
    },
    /// Autocomplete suggestions for a query
    Search {
        /// Search text
        query: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Category slug
    #[arg(long)]
    category: Option<String>,

    /// Search text over name, description and tags
    #[arg(short, long)]
    search: Option<String>,

    /// Inclusive minimum price
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Inclusive maximum price
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Stock availability to match
    #[arg(long)]
    in_stock: Option<bool>,

    /// Sort order (`featured`, `price-low`, `price-high`, `rating`, `newest`)
    #[arg(long, default_value_t = SortKey::Featured)]
    sort: SortKey,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with order totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a product's quantity (0 or less removes it)
    Update {
        /// Product ID
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: String,
    },
    /// Remove every product from the cart
    Clear,
    /// Print the total item count
    Count,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::load(cli.catalog).await?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Validate => commands::catalog::validate(&ctx)?,
            CatalogAction::List(args) => {
                let filter = ethereal_cart_core::ProductFilter {
                    category: args.category,
                    search: args.search,
                    min_price: args.min_price,
                    max_price: args.max_price,
                    in_stock: args.in_stock,
                };
                commands::catalog::list(&ctx, &filter, args.sort)?;
            }
            CatalogAction::Show { id } => commands::catalog::show(&ctx, &id)?,
            CatalogAction::Search { query } => commands::catalog::search(&ctx, &query)?,
        },
        Commands::Cart { data_dir, action } => {
            let cart = ctx.cart_service(data_dir);
            match action {
                CartAction::Show => commands::cart::show(&cart).await?,
                CartAction::Add { id, quantity } => {
                    commands::cart::add(&cart, &id, quantity).await?;
                }
                CartAction::Update { id, quantity } => {
                    commands::cart::update(&cart, &id, quantity).await?;
                }
                CartAction::Remove { id } => commands::cart::remove(&cart, &id).await?,
                CartAction::Clear => commands::cart::clear(&cart).await?,
                CartAction::Count => commands::cart::count(&cart).await?,
            }
        }
    }
    Ok(())
}
