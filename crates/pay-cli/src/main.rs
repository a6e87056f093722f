//! # mp-checkout
//!
//! MercadoPago Checkout Pro from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export API_URL=https://api.example.com
//! export MP_PUBLIC_KEY=TEST-...
//!
//! # Create a payment and get the checkout link
//! mp-checkout pay my-short-url 1
//!
//! # Check a payment after the user returns
//! mp-checkout return "https://app.example.com/sucesso?payment_id=123&status=approved"
//! ```

use clap::Parser;
use pay_cli::{execute, Cli};
use pay_mercadopago::ApiConfig;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let mut config = ApiConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config.base_url = api_url.clone();
    }
    debug!(
        "API configuration: url={}, environment={}",
        config.base_url, config.environment
    );

    let report = execute(&cli.command, config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
