//! Data models for the Site-IQ API.
//!
//! This module contains the ticket and alert records returned by the
//! ticket-list endpoint, and the session types used by authentication.

mod session;
mod ticket;

pub(crate) use session::{AuthRequest, AuthResponse};
pub use session::SessionInfo;
pub use ticket::*;
