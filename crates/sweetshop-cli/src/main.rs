mod admin;
mod shop;

use clap::{Parser, Subcommand};
use sweetshop_client::{token_provider_from_config, ShopClient};
use sweetshop_core::{AppConfig, Role, PRICE_CEILINGS};
use tracing_subscriber::EnvFilter;

use crate::admin::AdminCommands;

#[derive(Debug, Parser)]
#[command(name = "sweetshop-cli")]
#[command(about = "Sweet Shop storefront and inventory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the catalog, optionally filtered
    Browse {
        /// Case-insensitive substring of the sweet's name
        #[arg(long, default_value = "")]
        search: String,
        /// Category to show, or "all"
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, default_value = "all", help = max_price_help())]
        max_price: String,
    },
    /// Show what a purchase would cost without placing it
    Quote {
        id: i64,
        /// Requested quantity; clamped to the available stock
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Buy a sweet
    Purchase {
        id: i64,
        /// Requested quantity; clamped to the available stock
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Show your purchase history
    History,
    /// Show the role resolved from the configured identity profile
    Whoami,
    /// Register an account with the backend's local auth
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// USER or ADMIN
        #[arg(long, default_value = "USER", value_parser = parse_role)]
        role: Role,
    },
    /// Inventory management
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

/// Help text listing the price ceilings the storefront offers.
fn max_price_help() -> String {
    let ceilings: Vec<String> = PRICE_CEILINGS.iter().map(ToString::to_string).collect();
    format!("Price ceiling ({}), or \"all\"", ceilings.join(", "))
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role '{raw}'; expected USER or ADMIN"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = sweetshop_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("sweetshop-cli: run with --help to see available commands");
        return Ok(());
    };

    tracing::debug!(env = %config.env, api_url = %config.api_url, auth_mode = %config.auth_mode, "configuration loaded");

    match command {
        Commands::Whoami => shop::run_whoami(&config),
        other => run_remote(&config, other).await,
    }
}

/// Dispatch a command that talks to the backend.
async fn run_remote(config: &AppConfig, command: Commands) -> anyhow::Result<()> {
    let tokens = token_provider_from_config(config)?;
    let client = ShopClient::new(config, tokens)?;

    match command {
        Commands::Browse {
            search,
            category,
            max_price,
        } => shop::run_browse(&client, &search, &category, &max_price).await,
        Commands::Quote { id, quantity } => shop::run_quote(&client, id, &quantity).await,
        Commands::Purchase { id, quantity } => shop::run_purchase(&client, id, &quantity).await,
        Commands::History => shop::run_history(&client).await,
        Commands::Register {
            email,
            password,
            role,
        } => shop::run_register(&client, &email, &password, role).await,
        Commands::Admin { command } => {
            admin::ensure_admin(config)?;
            admin::run_admin(&client, command).await
        }
        Commands::Whoami => shop::run_whoami(config),
    }
}
