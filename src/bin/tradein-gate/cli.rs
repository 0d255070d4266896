//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tradein_gate::gate::TradeInRequest;
use tradein_gate::GateConfig;

/// Trade-in IMEI verification for the shopping assistant.
#[derive(Parser, Debug)]
#[command(name = "tradein-gate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long, short, global = true, env = "TRADEIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Trade-in catalog URL.
    #[arg(long, global = true, env = "TRADEIN_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Verification gateway URL.
    #[arg(long, global = true, env = "TRADEIN_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Timeout for each outbound call, in seconds.
    #[arg(long, global = true, env = "TRADEIN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log level. Overrides `log_level` from the config file; `RUST_LOG`
    /// overrides both.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline and print the decision as JSON.
    Assess(AssessArgs),
    /// Check an IMEI locally without any network access.
    Validate {
        /// IMEI to check.
        #[arg(long)]
        imei: String,
    },
    /// Resolve a device against the trade-in catalog.
    Resolve {
        /// Device brand.
        #[arg(long)]
        brand: String,
        /// Device model.
        #[arg(long)]
        model: String,
        /// Storage capacity.
        #[arg(long)]
        capacity: Option<String>,
    },
}

/// Arguments for `assess`.
#[derive(Args, Debug)]
pub struct AssessArgs {
    /// IMEI of the device.
    #[arg(long)]
    pub imei: String,
    /// Device brand.
    #[arg(long)]
    pub brand: Option<String>,
    /// Device model.
    #[arg(long)]
    pub model: Option<String>,
    /// Storage capacity.
    #[arg(long)]
    pub capacity: Option<String>,
    /// Device is not in good condition (halves the value).
    #[arg(long)]
    pub poor_condition: bool,
    /// Customer session token.
    #[arg(long, env = "TRADEIN_SESSION_TOKEN")]
    pub session_token: Option<String>,
    /// Customer phone number.
    #[arg(long)]
    pub phone: Option<String>,
}

impl From<AssessArgs> for TradeInRequest {
    fn from(args: AssessArgs) -> Self {
        Self {
            identifier: args.imei,
            brand: args.brand,
            model: args.model,
            capacity: args.capacity,
            condition_good: Some(!args.poor_condition),
            session_token: args.session_token,
            phone_number: args.phone,
        }
    }
}

impl Cli {
    /// Build the gate configuration: file (explicit or default path), then
    /// CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn load_config(&self) -> color_eyre::Result<GateConfig> {
        let mut config = match &self.config {
            Some(path) => GateConfig::from_file(path)?,
            None => match GateConfig::default_path().filter(|p| p.exists()) {
                Some(path) => GateConfig::from_file(&path)?,
                None => GateConfig::default(),
            },
        };

        if let Some(url) = &self.catalog_url {
            config.catalog.url.clone_from(url);
        }
        if let Some(url) = &self.gateway_url {
            config.gateway.url.clone_from(url);
        }
        if let Some(secs) = self.timeout_secs {
            config.catalog.timeout_secs = secs;
            config.gateway.timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }

        config.validate()?;
        Ok(config)
    }
}
