//! Session descriptor and authentication wire types.

use serde::{Deserialize, Serialize};

/// Descriptor returned by a successful `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Always true for a descriptor returned by `connect`.
    pub connected: bool,

    /// The identity the session was opened for.
    pub email: String,

    /// The endpoint the session belongs to.
    pub base_url: String,
}

/// Body of `POST /api/web/auth/token`.
#[derive(Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful response of `POST /api/web/auth/token`.
#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
}
