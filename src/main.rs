//! siteiq - dump Site-IQ tickets as JSON lines
//!
//! Connects with credentials from the environment, streams every ticket
//! matching an optional status and writes one JSON object per line to
//! stdout. Logs go to stderr.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `SITEIQ_EMAIL`, `SITEIQ_PASSWORD`: account credentials
//! - `SITEIQ_BASE_URL` (optional): service endpoint
//!
//! # Usage
//!
//! ```bash
//! ./siteiq              # server default status
//! ./siteiq "Pending Closed"
//! ```

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use futures::TryStreamExt;
use tracing_subscriber::{fmt, EnvFilter};

use siteiq::{Config, EnvCredentials, SiteIqClient, TicketFilter, TicketStatus};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the ticket lines
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("siteiq=info")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting siteiq v{}", env!("CARGO_PKG_VERSION"));

    let mut filter = TicketFilter::new();
    if let Some(status) = std::env::args().nth(1) {
        let status: TicketStatus = status.parse().context("Invalid status argument")?;
        filter = filter.with_status(status);
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded, base_url: {}", config.base_url);

    let mut client = SiteIqClient::from_config(&config).context("Failed to create client")?;
    client
        .connect_with(&EnvCredentials)
        .await
        .context("Failed to connect to Site-IQ")?;

    let mut tickets = client.iter_tickets(&filter)?;
    let mut out = BufWriter::new(io::stdout().lock());
    let mut ticket_count = 0usize;
    let mut open_alerts = 0usize;

    while let Some(ticket) = tickets
        .try_next()
        .await
        .context("Failed while fetching tickets")?
    {
        ticket_count += 1;
        open_alerts += ticket.open_alerts().len();
        serde_json::to_writer(&mut out, &ticket)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    client.disconnect();

    tracing::info!(
        tickets = ticket_count,
        open_alerts = open_alerts,
        "Finished"
    );

    Ok(())
}
