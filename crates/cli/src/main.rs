//! FarmaUP CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the customers table
//! farmaup migrate
//!
//! # Insert the demo customers (wipe the table first with --reset)
//! farmaup seed --reset
//!
//! # List customers, optionally filtered
//! farmaup customers list --city fortaleza
//! ```
//!
//! # Environment Variables
//!
//! - `FARMAUP_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "farmaup")]
#[command(author, version, about = "FarmaUP customer records CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo customers
    Seed {
        /// Delete every customer before seeding
        #[arg(long)]
        reset: bool,
    },
    /// Inspect customer records
    Customers {
        #[command(subcommand)]
        action: CustomersAction,
    },
}

#[derive(Subcommand)]
enum CustomersAction {
    /// List customers in id order
    List {
        /// Case-insensitive substring of the name
        #[arg(short, long)]
        name: Option<String>,

        /// Case-insensitive substring of the city
        #[arg(short, long)]
        city: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { reset } => commands::seed::demo_customers(reset).await?,
        Commands::Customers { action } => match action {
            CustomersAction::List { name, city } => commands::customers::list(name, city).await?,
        },
    }
    Ok(())
}
