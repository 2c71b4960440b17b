//! Query parameters for the ticket-list endpoint.
//!
//! [`TicketFilter`] describes what to fetch and [`Pagination`] describes which
//! slice of it. Both are validated here, before any request is issued, and
//! turned into the ordered query pairs the endpoint expects:
//! `status`, then `delta` or `startDate`/`endDate`, then
//! `pageLimit`/`pageOffset`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::config::MAX_PAGE_LIMIT;
use crate::error::SiteIqError;

/// Ordered query-string pairs.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Ticket status values accepted by the `status` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    /// `InProgress`
    InProgress,
    /// `Closed`
    Closed,
    /// `Pending Closed`
    PendingClosed,
    /// `Dispatch`
    Dispatch,
    /// `All`
    All,
}

impl TicketStatus {
    /// Every accepted status, in documentation order.
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::InProgress,
        TicketStatus::Closed,
        TicketStatus::PendingClosed,
        TicketStatus::Dispatch,
        TicketStatus::All,
    ];

    /// The exact wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::InProgress => "InProgress",
            TicketStatus::Closed => "Closed",
            TicketStatus::PendingClosed => "Pending Closed",
            TicketStatus::Dispatch => "Dispatch",
            TicketStatus::All => "All",
        }
    }

    fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = SiteIqError;

    /// Parses an exact wire value. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                SiteIqError::invalid_argument(format!(
                    "status must be one of [{}], got {:?}",
                    Self::allowed_list(),
                    s
                ))
            })
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A `startDate`/`endDate` value.
///
/// Literal strings are sent verbatim. Structured values are rendered as a
/// `YYYY-MM-DD` calendar date; time of day and timezone are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParam {
    /// A pre-formatted date string.
    Literal(String),
    /// A calendar date.
    Date(NaiveDate),
}

impl DateParam {
    /// The value sent on the wire.
    pub fn to_query_value(&self) -> String {
        match self {
            DateParam::Literal(s) => s.clone(),
            DateParam::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for DateParam {
    fn from(value: &str) -> Self {
        DateParam::Literal(value.to_string())
    }
}

impl From<String> for DateParam {
    fn from(value: String) -> Self {
        DateParam::Literal(value)
    }
}

impl From<NaiveDate> for DateParam {
    fn from(value: NaiveDate) -> Self {
        DateParam::Date(value)
    }
}

impl From<NaiveDateTime> for DateParam {
    fn from(value: NaiveDateTime) -> Self {
        DateParam::Date(value.date())
    }
}

/// Uses the calendar date in the value's own timezone.
impl<Tz: TimeZone> From<DateTime<Tz>> for DateParam {
    fn from(value: DateTime<Tz>) -> Self {
        DateParam::Date(value.naive_local().date())
    }
}

/// Filter intent for one ticket query.
///
/// `delta` and the date range are mutually exclusive; setting both is
/// rejected by [`TicketFilter::to_query`], not resolved in favour of one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    status: Option<String>,
    start_date: Option<DateParam>,
    end_date: Option<DateParam>,
    delta: Option<i64>,
}

impl TicketFilter {
    /// Creates an empty filter (server defaults apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status. Accepts a [`TicketStatus`] or a raw string, which
    /// is checked against the allowed set when the query is built.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the start of the date range.
    pub fn with_start_date(mut self, date: impl Into<DateParam>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Sets the end of the date range.
    pub fn with_end_date(mut self, date: impl Into<DateParam>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Returns tickets modified after this Unix timestamp (seconds).
    pub fn with_delta(mut self, epoch_seconds: i64) -> Self {
        self.delta = Some(epoch_seconds);
        self
    }

    /// Same as [`with_delta`](Self::with_delta), from a UTC instant.
    pub fn with_delta_since(self, since: DateTime<Utc>) -> Self {
        self.with_delta(since.timestamp())
    }

    /// Validates the filter and builds its query pairs.
    ///
    /// # Errors
    ///
    /// Returns `SiteIqError::InvalidArgument` if `delta` is combined with a
    /// start or end date, or if the status is not in the allowed set.
    pub fn to_query(&self) -> Result<QueryPairs, SiteIqError> {
        if self.delta.is_some() && (self.start_date.is_some() || self.end_date.is_some()) {
            return Err(SiteIqError::invalid_argument(
                "delta cannot be combined with start_date or end_date",
            ));
        }

        let mut pairs = QueryPairs::new();

        if let Some(ref status) = self.status {
            let status = status.parse::<TicketStatus>()?;
            pairs.push(("status", status.as_str().to_string()));
        }

        if let Some(delta) = self.delta {
            pairs.push(("delta", delta.to_string()));
        } else {
            if let Some(ref start) = self.start_date {
                pairs.push(("startDate", start.to_query_value()));
            }
            if let Some(ref end) = self.end_date {
                pairs.push(("endDate", end.to_query_value()));
            }
        }

        Ok(pairs)
    }
}

/// Which slice of the result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Exactly one request with a caller-supplied cursor.
    Page {
        /// Records per page, 1 to 1000.
        limit: i64,
        /// Zero-based offset, non-negative.
        offset: i64,
    },
    /// Follow pages until the service returns a short one.
    All,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::Page {
            limit: MAX_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// A single page at `offset` with `limit` records.
    pub fn page(limit: i64, offset: i64) -> Self {
        Pagination::Page { limit, offset }
    }

    /// Validates a single-page cursor and returns its query pairs.
    pub(crate) fn page_query(limit: i64, offset: i64) -> Result<QueryPairs, SiteIqError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(SiteIqError::invalid_argument(format!(
                "page_limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT, limit
            )));
        }
        if offset < 0 {
            return Err(SiteIqError::invalid_argument(format!(
                "page_offset must be >= 0, got {}",
                offset
            )));
        }
        Ok(vec![
            ("pageLimit", limit.to_string()),
            ("pageOffset", offset.to_string()),
        ])
    }
}
