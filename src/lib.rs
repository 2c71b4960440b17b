//! # siteiq
//!
//! Async client for the DFS Site-IQ tickets external API.
//!
//! The API is small: a token endpoint and one paginated ticket-list endpoint
//! with optional status, date-range or delta filtering. This crate owns the
//! session, validates query parameters before anything is sent, and offers
//! both single-page and auto-paginated retrieval.
//!
//! ## Architecture
//!
//! - [`config`] - Base endpoint configuration and crate-wide constants
//! - [`credentials`] - Where the email/password pair comes from
//! - [`error`] - Error types; authentication failures are distinct from
//!   other service errors
//! - [`query`] - Filter and pagination parameters, validated and encoded
//! - [`client`] - The session-owning HTTP client
//! - [`models`] - Ticket/alert records and session descriptors
//!
//! ## Configuration
//!
//! - `SITEIQ_BASE_URL` (optional): defaults to `https://dfs.site-iq.com`
//! - `SITEIQ_EMAIL`, `SITEIQ_PASSWORD`: read by [`EnvCredentials`]
//! - `RUST_LOG`: log level for the binary (e.g., `siteiq=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use siteiq::{EnvCredentials, Pagination, SiteIqClient, TicketFilter, TicketStatus};
//!
//! async fn example() -> Result<(), siteiq::SiteIqError> {
//!     let mut client = SiteIqClient::with_default_endpoint()?;
//!     client.connect_with(&EnvCredentials).await?;
//!
//!     // One page of in-progress tickets
//!     let filter = TicketFilter::new().with_status(TicketStatus::InProgress);
//!     let page = client.get_tickets(&filter, Pagination::page(100, 0)).await?;
//!
//!     // Everything changed since a timestamp, streamed
//!     let mut changed = client.iter_tickets(&TicketFilter::new().with_delta(1_754_006_400))?;
//!     while let Some(ticket) = changed.try_next().await? {
//!         println!("{:?}: {} open alerts", ticket.id(), ticket.open_alerts().len());
//!     }
//!
//!     client.disconnect();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod query;

pub use client::{SiteIqClient, TicketStream};
pub use config::Config;
pub use credentials::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
pub use error::SiteIqError;
pub use models::{Alert, SessionInfo, Ticket};
pub use query::{DateParam, Pagination, TicketFilter, TicketStatus};
