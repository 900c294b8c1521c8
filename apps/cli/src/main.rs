//! Escrow Rewards CLI
//!
//! Pays out winners through the deployed escrow contract.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use escrow_core::{checksummed, format_base_units, RewardAmount, RewardRequest, REWARD_DECIMALS};
use escrow_settings::{Settings, SettingsMode};
use escrow_settlement::encode_reward_call;

/// Escrow Rewards - pay winners from an escrow contract
#[derive(Parser)]
#[command(name = "escrow-rewards")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file (environment variables override it)
    #[arg(short, long, default_value = "escrow.json")]
    config: PathBuf,

    /// Dotenv file read for variables not set in the environment
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reward winners in a single escrow transaction
    Reward {
        /// Winner addresses, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        winners: Vec<String>,

        /// Decimal amounts, comma separated, one per winner
        #[arg(long, value_delimiter = ',', required = true)]
        amounts: Vec<RewardAmount>,

        /// Print the normalized call without submitting
        #[arg(long)]
        dry_run: bool,

        /// Record the submission in memory instead of broadcasting
        #[arg(long)]
        mock: bool,
    },

    /// Print the checksummed form of an address
    Address {
        address: String,
    },

    /// Write a settings file with default values
    InitConfig {
        /// Escrow contract address to store
        #[arg(long)]
        contract: Option<String>,

        /// RPC endpoint to store
        #[arg(long)]
        rpc_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    escrow_logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Reward {
            winners,
            amounts,
            dry_run,
            mock,
        } => {
            let request = RewardRequest::new(winners, amounts)?;
            if dry_run {
                dry_run_reward(&request)?;
            } else {
                reward(&cli.config, &cli.env_file, &request, mock).await?;
            }
        }
        Commands::Address { address } => {
            println!("{}", checksummed(&address)?);
        }
        Commands::InitConfig { contract, rpc_url } => {
            init_config(&cli.config, contract, rpc_url)?;
        }
    }

    Ok(())
}

// ============================================================================
// Reward
// ============================================================================

async fn reward(
    config: &PathBuf,
    env_file: &PathBuf,
    request: &RewardRequest,
    mock: bool,
) -> Result<()> {
    let mut settings = Settings::load_from(config).context("loading settings")?;
    if mock {
        settings.mode = SettingsMode::Mock;
    }

    let resolved = settings
        .resolve_from_env(env_file)
        .context("resolving settings")?;
    let client = resolved
        .into_client()
        .context("creating settlement client")?;

    info!(
        "Submitting rewards for {} winners as {}",
        request.len(),
        client.signer_address()
    );

    let outcome = client
        .reward_request(request)
        .await
        .context("sending reward transaction")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn dry_run_reward(request: &RewardRequest) -> Result<()> {
    let batch = request.normalize()?;

    println!("Reward Winners (dry run)");
    println!("========================");
    for (winner, amount) in batch.iter() {
        println!(
            "{}  {} ({} base units)",
            winner.to_checksum(None),
            format_base_units(*amount, REWARD_DECIMALS),
            amount
        );
    }
    if let Some(total) = batch.total() {
        println!("Total: {}", format_base_units(total, REWARD_DECIMALS));
    }
    println!("Calldata: {}", encode_reward_call(&batch));

    Ok(())
}

// ============================================================================
// Settings
// ============================================================================

fn init_config(path: &PathBuf, contract: Option<String>, rpc_url: Option<String>) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(contract) = contract {
        settings.contract_address = Some(checksummed(&contract)?);
    }
    if let Some(rpc_url) = rpc_url {
        settings.rpc_url = rpc_url;
    }

    settings.save_to(path)?;
    println!("Wrote settings to {}", path.display());
    Ok(())
}
