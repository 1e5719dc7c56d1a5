//! Itadaki CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! itadaki-cli migrate
//!
//! # Seed a development database
//! itadaki-cli seed
//!
//! # Create a staff user with full permissions
//! itadaki-cli user create -e taro@itadaki.jp -n "山田太郎" -r admin --all-permissions
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "itadaki-cli")]
#[command(author, version, about = "Itadaki CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed a development database with demo data
    Seed,
    /// Manage staff users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `recruiter`, `manager`)
        #[arg(short, long, default_value = "recruiter")]
        role: String,

        /// Grant every action on every resource
        #[arg(long)]
        all_permissions: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                all_permissions,
            } => {
                commands::user::create(&email, &name, &role, all_permissions).await?;
            }
        },
    }
    Ok(())
}
