use std::io::Write;

use crypto_markets::{group_by_pair, ExchangeRegistry};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Cli;

/// Logs go to stderr so stdout carries only the JSON document.
pub fn init_tracing() {
    let log_format =
        std::env::var("CRYPTO_MARKETS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = ExchangeRegistry::from_env();
    let markets = registry.fetch(cli.exchange, cli.market_type).await?;
    tracing::info!("Fetched {} markets from {}", markets.len(), cli.exchange);

    let json = if cli.by_pair {
        serde_json::to_string_pretty(&group_by_pair(markets))?
    } else {
        serde_json::to_string_pretty(&markets)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
