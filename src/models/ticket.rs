//! Ticket and alert records.
//!
//! The service owns the shape of these records. Both types are transparent
//! wrappers over a JSON object: every field the server sends is kept, in
//! server order, and serializes back unchanged. The accessors below are
//! read-only conveniences for fields the service is known to send; a missing
//! or differently typed field reads as `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A ticket record as returned by the ticket-list endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(Map<String, Value>);

/// An alert record nested inside a ticket.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alert(Map<String, Value>);

/// Reads a field as text, rendering numbers as decimal strings.
fn text_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<Cow<'a, str>> {
    match fields.get(key)? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

impl Ticket {
    /// Returns the raw field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the ticket, returning the raw field map.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Returns a raw field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Unique ticket identifier (`ticketID`), as text.
    pub fn id(&self) -> Option<Cow<'_, str>> {
        text_field(&self.0, "ticketID")
    }

    /// Current status (`ticketStatus`).
    pub fn status(&self) -> Option<&str> {
        str_field(&self.0, "ticketStatus")
    }

    /// Site display name (`siteName`).
    pub fn site_name(&self) -> Option<&str> {
        str_field(&self.0, "siteName")
    }

    /// Site identifier (`siteID`), as text.
    pub fn site_id(&self) -> Option<Cow<'_, str>> {
        text_field(&self.0, "siteID")
    }

    /// Affected component (`component`).
    pub fn component(&self) -> Option<&str> {
        str_field(&self.0, "component")
    }

    /// Dispenser label (`dispenser`), as text.
    pub fn dispenser(&self) -> Option<Cow<'_, str>> {
        text_field(&self.0, "dispenser")
    }

    /// Warranty state (`warrantyStatus`), e.g. "In" or "Out".
    pub fn warranty_status(&self) -> Option<&str> {
        str_field(&self.0, "warrantyStatus")
    }

    /// Open timestamp (`ticketOpenTimestamp`) exactly as sent.
    pub fn opened_at(&self) -> Option<&str> {
        str_field(&self.0, "ticketOpenTimestamp")
    }

    /// Nested alerts. A missing or null `alerts` field yields no alerts.
    pub fn alerts(&self) -> Vec<Alert> {
        match self.0.get("alerts") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned().map(Alert))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Alerts that have not been closed yet.
    pub fn open_alerts(&self) -> Vec<Alert> {
        self.alerts().into_iter().filter(Alert::is_open).collect()
    }
}

impl From<Map<String, Value>> for Ticket {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl Alert {
    /// Returns the raw field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns a raw field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Error description (`error`).
    pub fn error(&self) -> Option<&str> {
        str_field(&self.0, "error")
    }

    /// Fueling position (`fuelingPosition`), as text.
    pub fn fueling_position(&self) -> Option<Cow<'_, str>> {
        text_field(&self.0, "fuelingPosition")
    }

    /// When the alert opened (`alertOpenTimestamp`).
    pub fn opened_at(&self) -> Option<&str> {
        str_field(&self.0, "alertOpenTimestamp")
    }

    /// When the alert closed (`alertCloseTimestamp`), if it has.
    pub fn closed_at(&self) -> Option<&str> {
        str_field(&self.0, "alertCloseTimestamp")
    }

    /// True while the alert has no close timestamp (absent or null).
    pub fn is_open(&self) -> bool {
        matches!(self.0.get("alertCloseTimestamp"), None | Some(Value::Null))
    }
}

impl From<Map<String, Value>> for Alert {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_ticket() -> Ticket {
        serde_json::from_value(json!({
            "ticketID": 48213,
            "ticketStatus": "InProgress",
            "siteName": "Main St",
            "siteID": "S-17",
            "component": "Card Reader",
            "dispenser": 3,
            "warrantyStatus": "In",
            "ticketOpenTimestamp": "2025-01-07T08:15:00",
            "alerts": [
                {
                    "error": "Reader offline",
                    "fuelingPosition": 5,
                    "alertOpenTimestamp": "2025-01-07T08:10:00",
                    "alertCloseTimestamp": null
                },
                {
                    "error": "Paper low",
                    "fuelingPosition": 6,
                    "alertOpenTimestamp": "2025-01-06T12:00:00",
                    "alertCloseTimestamp": "2025-01-06T13:00:00"
                },
                {
                    "error": "Door open",
                    "alertOpenTimestamp": "2025-01-07T09:00:00"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_ticket_accessors() {
        let ticket = sample_ticket();
        assert_eq!(ticket.id().as_deref(), Some("48213"));
        assert_eq!(ticket.status(), Some("InProgress"));
        assert_eq!(ticket.site_name(), Some("Main St"));
        assert_eq!(ticket.site_id().as_deref(), Some("S-17"));
        assert_eq!(ticket.component(), Some("Card Reader"));
        assert_eq!(ticket.dispenser().as_deref(), Some("3"));
        assert_eq!(ticket.warranty_status(), Some("In"));
        assert_eq!(ticket.opened_at(), Some("2025-01-07T08:15:00"));
    }

    #[test]
    fn test_open_alerts_treat_null_and_missing_as_open() {
        let ticket = sample_ticket();
        assert_eq!(ticket.alerts().len(), 3);

        let open: Vec<_> = ticket
            .open_alerts()
            .iter()
            .map(|a| a.error().unwrap_or_default().to_string())
            .collect();
        assert_eq!(open, vec!["Reader offline", "Door open"]);
    }

    #[test]
    fn test_closed_alert_accessors() {
        let alerts = sample_ticket().alerts();
        let closed = &alerts[1];
        assert!(!closed.is_open());
        assert_eq!(closed.closed_at(), Some("2025-01-06T13:00:00"));
        assert_eq!(closed.fueling_position().as_deref(), Some("6"));
    }

    #[test]
    fn test_null_alerts_field_yields_empty() {
        let ticket: Ticket = serde_json::from_value(json!({"ticketID": 1, "alerts": null})).unwrap();
        assert!(ticket.alerts().is_empty());

        let ticket: Ticket = serde_json::from_value(json!({"ticketID": 2})).unwrap();
        assert!(ticket.open_alerts().is_empty());
    }

    #[test]
    fn test_unknown_fields_pass_through_in_order() {
        let raw = json!({"zeta": 1, "ticketID": 9, "alpha": {"nested": true}});
        let ticket: Ticket = serde_json::from_value(raw.clone()).unwrap();
        let keys: Vec<_> = ticket.fields().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "ticketID", "alpha"]);
        assert_eq!(serde_json::to_value(&ticket).unwrap(), raw);
    }

    #[test]
    fn test_mistyped_fields_read_as_none() {
        let ticket: Ticket =
            serde_json::from_value(json!({"ticketID": [1], "ticketStatus": 5})).unwrap();
        assert_eq!(ticket.id(), None);
        assert_eq!(ticket.status(), None);
    }
}
