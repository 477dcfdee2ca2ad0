// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use skyfare_core::SkyFareConfig;
use skyfare_web::AppState;

#[derive(Parser)]
#[command(author, version, about = "Live Australian flights and synthetic fare trends", long_about = None)]
struct Cli {
    /// Address the page is served on
    #[arg(short, long, env = "SKYFARE_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// OpenSky states endpoint
    #[arg(long, env = "SKYFARE_API_URL")]
    api_url: Option<String>,

    /// Timeout for the live fetch, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    fn app_config(&self) -> SkyFareConfig {
        let mut config = SkyFareConfig::default();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        config
    }
}

fn setup_logging(debug: bool) -> Result<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("skyfare")
        .build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto)
        .context("Failed to initialise logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug)?;

    let config = cli.app_config();
    info!(
        "Starting SkyFare — bind={} api_url={} timeout_secs={} debug={}",
        cli.bind, config.api_url, config.timeout_secs, cli.debug
    );

    skyfare_web::serve(&cli.bind, AppState::new(config)).await
}
