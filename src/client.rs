//! HTTP client for the Site-IQ tickets API.
//!
//! This module provides `SiteIqClient`, which owns the session (bearer
//! token and identity) and performs single-page and auto-paginated ticket
//! retrieval.
//!
//! # Failure policy
//!
//! Nothing is retried. Every request carries a 30 second timeout; a timeout,
//! a transport failure or a non-success status surfaces to the caller as
//! soon as it happens. Arguments are validated before the first request.
//!
//! # Security
//!
//! The token and password are never logged. Error bodies are sanitized and
//! truncated before they are stored in an error.

use std::fmt;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, Response, StatusCode};

use crate::config::{Config, DEFAULT_TIMEOUT_SECS, MAX_PAGE_LIMIT};
use crate::credentials::CredentialProvider;
use crate::error::SiteIqError;
use crate::models::{AuthRequest, AuthResponse, SessionInfo, Ticket};
use crate::query::{Pagination, QueryPairs, TicketFilter};

/// Path of the token endpoint.
const AUTH_PATH: &str = "/api/web/auth/token";

/// Path of the ticket-list endpoint.
const TICKET_PATH: &str = "/api/external/ticket";

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// A lazily fetched, single-pass sequence of tickets.
pub type TicketStream = BoxStream<'static, Result<Ticket, SiteIqError>>;

/// Token and identity, set and cleared together.
struct Session {
    token: String,
    email: String,
}

/// Client for the Site-IQ tickets external API.
///
/// Each instance owns its own session; instances never share state.
///
/// # Example
///
/// ```ignore
/// use siteiq::{Pagination, SiteIqClient, TicketFilter, TicketStatus};
///
/// let mut client = SiteIqClient::with_default_endpoint()?;
/// client.connect("user@example.com", "password").await?;
///
/// let filter = TicketFilter::new().with_status(TicketStatus::InProgress);
/// let tickets = client.get_tickets(&filter, Pagination::All).await?;
/// client.disconnect();
/// ```
pub struct SiteIqClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base URL, normalized without a trailing slash.
    base_url: String,

    /// Present only between a successful `connect` and `disconnect`.
    session: Option<Session>,

    /// Per-request timeout, reported in `SiteIqError::Timeout`.
    timeout: Duration,
}

impl SiteIqClient {
    /// Creates a disconnected client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `SiteIqError::Config` for an invalid URL and
    /// `SiteIqError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SiteIqError> {
        Self::from_config(&Config::new(base_url)?)
    }

    /// Creates a disconnected client for the default Site-IQ endpoint.
    pub fn with_default_endpoint() -> Result<Self, SiteIqError> {
        Self::from_config(&Config::default())
    }

    /// Creates a disconnected client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, SiteIqError> {
        Self::with_timeout(config, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a disconnected client with a non-default request timeout.
    pub(crate) fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, SiteIqError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SiteIqError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session: None,
            timeout,
        })
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The identity of the current session, if connected.
    pub fn email(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.email.as_str())
    }

    /// Returns true if a token is currently stored. No network call.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Authenticates and stores the returned bearer token.
    ///
    /// Re-connecting a live session replaces its token and identity. If the
    /// call fails, the previous session state is left untouched.
    ///
    /// # Errors
    ///
    /// - `SiteIqError::Authentication` on HTTP 401 or 403
    /// - `SiteIqError::HttpStatus` on any other non-success status
    /// - `SiteIqError::Http` / `SiteIqError::Timeout` on transport failure
    /// - `SiteIqError::Serialization` if the body has no `token`
    /// - `SiteIqError::HttpStatus` if the `token` is empty
    pub async fn connect(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<SessionInfo, SiteIqError> {
        let url = format!("{}{}", self.base_url, AUTH_PATH);
        let operation = format!("POST {}", AUTH_PATH);

        tracing::debug!(path = AUTH_PATH, "Requesting session token");

        let response = self
            .http
            .post(&url)
            .json(&AuthRequest { email, password })
            .send()
            .await
            .map_err(|e| send_error(e, &operation, self.timeout))?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::warn!(status = %status, "Site-IQ rejected the credentials");
            return Err(SiteIqError::Authentication { status });
        }
        if !status.is_success() {
            return Err(http_status_error(status, response, password).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| send_error(e, &operation, self.timeout))?;
        let auth: AuthResponse = serde_json::from_str(&body)?;

        if auth.token.is_empty() {
            return Err(SiteIqError::HttpStatus {
                status,
                body: "authentication response carried an empty token".to_string(),
            });
        }

        self.session = Some(Session {
            token: auth.token,
            email: email.to_string(),
        });

        tracing::info!(email = %email, base_url = %self.base_url, "Connected to Site-IQ");

        Ok(SessionInfo {
            connected: true,
            email: email.to_string(),
            base_url: self.base_url.clone(),
        })
    }

    /// Fetches credentials from `provider` and connects with them.
    pub async fn connect_with<P>(&mut self, provider: &P) -> Result<SessionInfo, SiteIqError>
    where
        P: CredentialProvider + ?Sized,
    {
        let credentials = provider.credentials()?;
        self.connect(&credentials.email, &credentials.password).await
    }

    /// Clears the token and identity. Safe to call when not connected.
    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(email = %session.email, "Disconnected from Site-IQ");
        }
    }

    /// Retrieves tickets matching `filter`.
    ///
    /// With [`Pagination::Page`] exactly one request is issued and the page
    /// is returned as sent. With [`Pagination::All`] pages of 1000 are
    /// fetched in sequence until a short page arrives; if any page fails the
    /// whole call fails and nothing collected so far is returned.
    ///
    /// # Errors
    ///
    /// - `SiteIqError::NotConnected` before `connect`
    /// - `SiteIqError::InvalidArgument` for a bad status, `delta` combined
    ///   with a date, or an out-of-range page cursor
    /// - any service error from the request(s)
    pub async fn get_tickets(
        &self,
        filter: &TicketFilter,
        pagination: Pagination,
    ) -> Result<Vec<Ticket>, SiteIqError> {
        let pages = self.ticket_pages()?;
        let mut query = filter.to_query()?;

        match pagination {
            Pagination::All => pages.stream_all(query).try_collect().await,
            Pagination::Page { limit, offset } => {
                query.extend(Pagination::page_query(limit, offset)?);
                pages.fetch(&query).await
            }
        }
    }

    /// Streams every ticket matching `filter`, fetching pages of 1000 as
    /// the stream is polled.
    ///
    /// Validation and the connection check happen here, before the stream
    /// exists. The stream keeps the token it was created with, is
    /// single-pass, and each call starts again from offset 0.
    ///
    /// ```ignore
    /// use futures::TryStreamExt;
    ///
    /// let mut tickets = client.iter_tickets(&TicketFilter::new().with_status("All"))?;
    /// while let Some(ticket) = tickets.try_next().await? {
    ///     println!("{:?}", ticket.id());
    /// }
    /// ```
    pub fn iter_tickets(&self, filter: &TicketFilter) -> Result<TicketStream, SiteIqError> {
        let pages = self.ticket_pages()?;
        let query = filter.to_query()?;
        Ok(pages.stream_all(query))
    }

    fn ticket_pages(&self) -> Result<TicketPages, SiteIqError> {
        let session = self.session.as_ref().ok_or(SiteIqError::NotConnected)?;
        Ok(TicketPages {
            http: self.http.clone(),
            timeout: self.timeout,
            url: format!("{}{}", self.base_url, TICKET_PATH),
            token: session.token.clone(),
        })
    }
}

impl fmt::Debug for SiteIqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.session {
            Some(ref session) => format!("connected as {}", session.email),
            None => "disconnected".to_string(),
        };
        f.debug_struct("SiteIqClient")
            .field("base_url", &self.base_url)
            .field("state", &state)
            .finish()
    }
}

/// Ticket-list requests bound to one token.
///
/// Owns its handles so a stream built from it does not borrow the client.
#[derive(Clone)]
struct TicketPages {
    http: Client,
    timeout: Duration,
    url: String,
    token: String,
}

impl TicketPages {
    /// Issues one GET and decodes the page.
    async fn fetch(&self, query: &[(&'static str, String)]) -> Result<Vec<Ticket>, SiteIqError> {
        let operation = format!("GET {}", TICKET_PATH);

        tracing::debug!(
            path = TICKET_PATH,
            params = ?query,
            "Making Site-IQ API request"
        );

        let response = self
            .http
            .get(&self.url)
            .query(query)
            .bearer_auth(&self.token)
            .header("Accept", "*/*")
            .send()
            .await
            .map_err(|e| send_error(e, &operation, self.timeout))?;
        let status = response.status();

        if !status.is_success() {
            return Err(http_status_error(status, response, &self.token).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| send_error(e, &operation, self.timeout))?;
        let page: Vec<Ticket> = serde_json::from_str(&body)?;

        tracing::debug!(count = page.len(), "Received ticket page");

        Ok(page)
    }

    /// Fetches the page at `offset` and returns it with the next offset,
    /// or `None` once the page is shorter than `MAX_PAGE_LIMIT`.
    async fn page_at(
        &self,
        mut query: QueryPairs,
        offset: i64,
    ) -> Result<(Vec<Ticket>, Option<i64>), SiteIqError> {
        query.push(("pageLimit", MAX_PAGE_LIMIT.to_string()));
        query.push(("pageOffset", offset.to_string()));

        let page = self.fetch(&query).await?;
        let next = if (page.len() as i64) < MAX_PAGE_LIMIT {
            None
        } else {
            Some(offset + MAX_PAGE_LIMIT)
        };

        Ok((page, next))
    }

    /// Follows pages from offset 0 until a short one arrives. An exact
    /// multiple of the page size costs one extra, empty, request.
    fn stream_all(self, base: QueryPairs) -> TicketStream {
        stream::try_unfold(Some(0i64), move |cursor| {
            let pages = self.clone();
            let base = base.clone();
            async move {
                match cursor {
                    Some(offset) => pages.page_at(base, offset).await.map(Some),
                    None => Ok(None),
                }
            }
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<Ticket, SiteIqError>)))
        .try_flatten()
        .boxed()
    }
}

/// Converts a transport failure (sending or reading the body), singling
/// out timeouts.
fn send_error(e: reqwest::Error, operation: &str, timeout: Duration) -> SiteIqError {
    if e.is_timeout() {
        return SiteIqError::timeout(timeout, operation);
    }
    SiteIqError::Http(e)
}

/// Builds a `HttpStatus` error from a failed response.
async fn http_status_error(status: StatusCode, response: Response, secret: &str) -> SiteIqError {
    let body = response.text().await.unwrap_or_default();
    let body = SiteIqError::sanitize_message(&body, secret);
    let body = if body.len() > MAX_ERROR_BODY_LEN {
        let mut cut = MAX_ERROR_BODY_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...[truncated]", &body[..cut])
    } else {
        body
    };

    tracing::debug!(status = %status, "Site-IQ returned an error status");

    SiteIqError::HttpStatus { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Creates a client for unit tests without touching the network.
    fn test_client() -> SiteIqClient {
        SiteIqClient {
            http: Client::new(),
            base_url: "https://example.com".to_string(),
            session: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    fn connected_client() -> SiteIqClient {
        let mut client = test_client();
        client.session = Some(Session {
            token: "secret-token".to_string(),
            email: "ops@example.com".to_string(),
        });
        client
    }

    #[test]
    fn test_new_client_is_disconnected() {
        let client = SiteIqClient::new("https://example.com/").unwrap();
        assert_eq!(client.base_url(), "https://example.com");
        assert!(!client.is_connected());
        assert_eq!(client.email(), None);
    }

    #[test]
    fn test_default_endpoint() {
        let client = SiteIqClient::with_default_endpoint().unwrap();
        assert_eq!(client.base_url(), "https://dfs.site-iq.com");
    }

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(matches!(
            SiteIqClient::new("dfs.site-iq.com"),
            Err(SiteIqError::Config(_))
        ));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut client = test_client();
        client.disconnect();
        assert!(!client.is_connected());
        client.disconnect();
        assert!(!client.is_connected());
    }

    #[test]
    fn test_disconnect_clears_token_and_identity() {
        let mut client = connected_client();
        assert!(client.is_connected());
        assert_eq!(client.email(), Some("ops@example.com"));

        client.disconnect();
        assert!(!client.is_connected());
        assert_eq!(client.email(), None);
    }

    #[test]
    fn test_debug_never_shows_token() {
        let client = connected_client();
        let debug = format!("{:?}", client);
        assert!(debug.contains("connected as ops@example.com"));
        assert!(!debug.contains("secret-token"));

        let debug = format!("{:?}", test_client());
        assert!(debug.contains("disconnected"));
    }

    #[tokio::test]
    async fn test_get_tickets_requires_connection() {
        let client = test_client();
        let err = client
            .get_tickets(&TicketFilter::new(), Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SiteIqError::NotConnected));
    }

    #[test]
    fn test_iter_tickets_requires_connection() {
        let client = test_client();
        assert!(matches!(
            client.iter_tickets(&TicketFilter::new()),
            Err(SiteIqError::NotConnected)
        ));
    }

    #[test]
    fn test_iter_tickets_validates_eagerly() {
        let client = connected_client();
        let filter = TicketFilter::new().with_status("Open");
        assert!(matches!(
            client.iter_tickets(&filter),
            Err(SiteIqError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ticket_pages_bind_current_token() {
        let client = connected_client();
        let pages = client.ticket_pages().unwrap();
        assert_eq!(pages.url, "https://example.com/api/external/ticket");
        assert_eq!(pages.token, "secret-token");
    }

    #[tokio::test]
    async fn test_slow_auth_response_is_timeout() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"token": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = Config::new(mock_server.uri()).unwrap();
        let mut client = SiteIqClient::with_timeout(&config, Duration::from_millis(50)).unwrap();
        let err = client.connect("ops@example.com", "hunter2").await.unwrap_err();

        match err {
            SiteIqError::Timeout {
                duration,
                ref operation,
            } => {
                assert_eq!(duration, Duration::from_millis(50));
                assert_eq!(operation, "POST /api/web/auth/token");
            }
            ref other => panic!("expected timeout, got {other:?}"),
        }
        assert!(err.is_service_error());
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_slow_ticket_page_is_timeout() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TICKET_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = Config::new(mock_server.uri()).unwrap();
        let mut client = SiteIqClient::with_timeout(&config, Duration::from_millis(50)).unwrap();
        client.session = Some(Session {
            token: "secret-token".to_string(),
            email: "ops@example.com".to_string(),
        });

        let err = client
            .get_tickets(&TicketFilter::new(), Pagination::All)
            .await
            .unwrap_err();

        assert!(matches!(err, SiteIqError::Timeout { .. }), "got {err:?}");
        assert!(err.is_service_error());
    }

    #[tokio::test]
    async fn test_refused_ticket_fetch_is_service_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut client = SiteIqClient::new(format!("http://127.0.0.1:{port}")).unwrap();
        client.session = Some(Session {
            token: "secret-token".to_string(),
            email: "ops@example.com".to_string(),
        });

        let err = client
            .get_tickets(&TicketFilter::new(), Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SiteIqError::Http(_)), "got {err:?}");
        assert!(err.is_service_error());

        let mut stream = client.iter_tickets(&TicketFilter::new()).unwrap();
        let err = stream.try_next().await.unwrap_err();
        assert!(err.is_service_error());
    }
}
