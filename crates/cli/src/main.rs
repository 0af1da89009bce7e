//! Provision Store CLI - operator commands against the store backend.
//!
//! # Usage
//!
//! ```bash
//! # List products anonymously
//! ps-cli products list
//!
//! # Add a product as a vendor
//! ps-cli --caller <principal> products add 7 "Basmati Rice" 120 groceries
//!
//! # Change a price
//! ps-cli --caller <principal> products set-price 7 115
//!
//! # Grant vendor access (admin only)
//! ps-cli --caller <admin-principal> vendors assign <principal>
//!
//! # Show the caller's role and access
//! ps-cli --caller <principal> whoami
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_BACKEND_URL` - Base URL of the store backend gateway
//! - `STORE_BACKEND_API_KEY` - Optional bearer key for the gateway
//! - `STORE_CALLER` - Default caller principal

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use provision_store_core::{Price, Principal, ProductCategory, ProductId, UserRole};

mod commands;

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(author, version, about = "Provision Store CLI tools")]
struct Cli {
    /// Principal to act as; anonymous when omitted
    #[arg(long, global = true, env = "STORE_CALLER")]
    caller: Option<Principal>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage vendor access (admin only)
    Vendors {
        #[command(subcommand)]
        action: VendorAction,
    },
    /// Manage roles (admin only)
    Roles {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Show the caller's role and access
    Whoami,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// Add a product (vendor or admin)
    Add {
        /// Product ID
        id: ProductId,

        /// Product name
        name: String,

        /// Price in rupees; decimals are rounded
        #[arg(value_parser = Price::parse_input)]
        price: Price,

        /// Category (`fruits`, `vegetables`, `groceries`, ...)
        category: ProductCategory,
    },
    /// Change a product's price (vendor or admin)
    SetPrice {
        /// Product ID
        id: ProductId,

        /// New price in rupees; decimals are rounded
        #[arg(value_parser = Price::parse_input)]
        price: Price,
    },
}

#[derive(Subcommand)]
enum VendorAction {
    /// Grant vendor access
    Assign {
        /// Principal to grant
        principal: Principal,
    },
    /// Revoke vendor access
    Remove {
        /// Principal to revoke
        principal: Principal,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Assign a role
    Assign {
        /// Principal to update
        principal: Principal,

        /// Role (`admin`, `user`, `guest`)
        role: UserRole,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let actor = commands::connect(cli.caller)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(&actor).await?,
            ProductAction::Show { id } => commands::products::show(&actor, id).await?,
            ProductAction::Add {
                id,
                name,
                price,
                category,
            } => commands::products::add(&actor, id, name, price, category).await?,
            ProductAction::SetPrice { id, price } => {
                commands::products::set_price(&actor, id, price).await?;
            }
        },
        Commands::Vendors { action } => match action {
            VendorAction::Assign { principal } => {
                commands::access::assign_vendor(&actor, &principal).await?;
            }
            VendorAction::Remove { principal } => {
                commands::access::remove_vendor(&actor, &principal).await?;
            }
        },
        Commands::Roles { action } => match action {
            RoleAction::Assign { principal, role } => {
                commands::access::assign_role(&actor, &principal, role).await?;
            }
        },
        Commands::Whoami => commands::access::whoami(&actor).await?,
    }
    Ok(())
}
