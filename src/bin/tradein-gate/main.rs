//! tradein-gate CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tradein_gate::{imei, resolve, TradeInGate};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("tradein-gate v{}", env!("CARGO_PKG_VERSION"));

    let output = match cli.command {
        Command::Validate { imei: raw } => serde_json::to_string_pretty(&imei::validate(&raw))?,
        Command::Resolve {
            brand,
            model,
            capacity,
        } => {
            let gate = TradeInGate::from_config(&config)?;
            let snapshot = gate.catalog().get().await?;
            let resolution = resolve(snapshot.catalog(), &brand, &model, capacity.as_deref());
            serde_json::to_string_pretty(&resolution)?
        }
        Command::Assess(args) => {
            let gate = TradeInGate::from_config(&config)?;
            let decision = gate.assess(&args.into()).await;
            serde_json::to_string_pretty(&decision)?
        }
    };

    println!("{output}");
    Ok(())
}
