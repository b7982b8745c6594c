//! Carebridge CLI - operator tooling over the commerce and pharmacist clients.
//!
//! # Usage
//!
//! ```bash
//! # Signed-in pharmacist's profile
//! cb-cli pharmacist me
//!
//! # Patient search and recent orders
//! cb-cli pharmacist search "smith"
//! cb-cli pharmacist orders --count 20
//!
//! # A patient's health record
//! cb-cli pharmacist health <profile-id>
//!
//! # BigCommerce carts and orders
//! cb-cli commerce cart <cart-id>
//! cb-cli commerce redirect <cart-id> --customer-id 42
//! cb-cli commerce orders 42
//! cb-cli commerce order 1001
//! ```
//!
//! Output is pretty-printed JSON on stdout; logs go to stderr. Set
//! `RUST_LOG` to change verbosity and `CAREBRIDGE_LOG_JSON` for JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "cb-cli")]
#[command(author, version, about = "Carebridge operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Call the pharmacist API as the pharmacist in the environment
    Pharmacist {
        #[command(subcommand)]
        action: PharmacistAction,
    },
    /// Inspect BigCommerce carts and orders
    Commerce {
        #[command(subcommand)]
        action: CommerceAction,
    },
}

#[derive(Debug, Subcommand)]
enum PharmacistAction {
    /// Show the signed-in pharmacist
    Me,
    /// Search patients by name, email or phone
    Search {
        term: String,
    },
    /// List recent orders
    Orders {
        /// Maximum number of orders (server default 10000)
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// Show a patient's health record
    Health {
        profile_id: String,
    },
}

#[derive(Debug, Subcommand)]
enum CommerceAction {
    /// Show a cart
    Cart {
        cart_id: String,
    },
    /// Create checkout URLs for a cart
    Redirect {
        cart_id: String,

        /// Sign this customer in on the way to checkout
        #[arg(short, long)]
        customer_id: Option<i64>,
    },
    /// List a customer's orders
    Orders {
        customer_id: i64,
    },
    /// Show an order with its addresses, shipments and products
    Order {
        order_id: i64,
    },
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "carebridge=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if std::env::var_os("CAREBRIDGE_LOG_JSON").is_some() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Pharmacist { action } => match action {
            PharmacistAction::Me => commands::pharmacist::me().await?,
            PharmacistAction::Search { term } => commands::pharmacist::search(&term).await?,
            PharmacistAction::Orders { count } => commands::pharmacist::orders(count).await?,
            PharmacistAction::Health { profile_id } => {
                commands::pharmacist::health(&profile_id).await?;
            }
        },
        Commands::Commerce { action } => match action {
            CommerceAction::Cart { cart_id } => commands::commerce::cart(&cart_id).await?,
            CommerceAction::Redirect {
                cart_id,
                customer_id,
            } => commands::commerce::redirect(&cart_id, customer_id).await?,
            CommerceAction::Orders { customer_id } => {
                commands::commerce::orders(customer_id).await?;
            }
            CommerceAction::Order { order_id } => commands::commerce::order(order_id).await?,
        },
    }
    Ok(())
}
