use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueHint};
use ethers::types::Address;
use multix::*;
use tokio::{fs, main};
use tracing::metadata::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;
use url::Url;

/// Reads ERC-20 token state through Multicall3 in a single `eth_call`
#[derive(Parser)]
#[clap(version)]
struct Args {
    /// Optional TOML config file
    #[clap(short, long, value_parser, value_hint = ValueHint::FilePath, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the node
    #[clap(long, env = "MAINNET_RPC_URL", value_hint = ValueHint::Url, value_name = "URL")]
    rpc_url: Option<Url>,

    /// Multicall3 deployment [default: 0xcA11bde05977b3631167028862bE2a173976CA11]
    #[clap(long, value_name = "ADDRESS")]
    multicall: Option<Address>,

    /// ERC-20 token to inspect [default: USDC]
    #[clap(long, value_name = "ADDRESS")]
    token: Option<Address>,

    /// Account whose balances are read
    #[clap(long, value_name = "ADDRESS")]
    holder: Option<Address>,

    /// Per-request timeout in seconds
    #[clap(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase verbosity (error (default) -> warn -> info -> debug -> trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            node: self.rpc_url.clone(),
            timeout_secs: self.timeout,
            multicall: self.multicall,
            token: self.token,
            holder: self.holder,
        }
    }
}

#[main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing::subscriber::set_global_default(
        Registry::default().with(
            tracing_subscriber::fmt::layer().with_filter(
                tracing_subscriber::EnvFilter::new("h2=info,hyper=info,reqwest=info,rustls=info")
                    .add_directive(
                        [
                            LevelFilter::ERROR,
                            LevelFilter::WARN,
                            LevelFilter::INFO,
                            LevelFilter::DEBUG,
                            LevelFilter::TRACE,
                        ][(args.verbose.min(4)) as usize]
                            .into(),
                    ),
            ),
        ),
    )?;

    let file = match &args.config {
        Some(path) => toml::from_str(
            fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read config file '{}'", path.display()))?
                .as_str(),
        )
        .with_context(|| format!("failed to parse TOML config file '{}'", path.display()))?,
        None => FileConfig::default(),
    };
    let config = Config::resolve(file, args.overrides())?;
    debug!(?config);

    let app = App::from_config(config)?;
    let report = app.token_report().await?;
    info!(block_number = %report.block_number, "batch evaluated");

    println!("Block:         {}", report.block_number);
    println!("Token:         {} ({})", report.name, report.symbol);
    println!("Decimals:      {}", report.decimals);
    println!("Balance:       {} {}", report.formatted_balance(), report.symbol);
    println!(
        "ETH balance:   {}",
        ethers::utils::format_ether(report.eth_balance)
    );
    Ok(())
}
