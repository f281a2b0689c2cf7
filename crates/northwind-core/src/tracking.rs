//! Request tracking domain model for auditing inbound traffic.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Source IP recorded when the peer address cannot be resolved.
pub const UNKNOWN_SOURCE_IP: &str = "unknown";

/// One audit record of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEntry {
    /// Store-assigned, strictly increasing identifier.
    #[serde(rename = "Id")]
    pub id: i64,
    /// Request path plus query string.
    #[serde(rename = "URLRequest")]
    pub url_request: String,
    #[serde(rename = "SourceIp")]
    pub source_ip: String,
    #[serde(rename = "TimeOfAction")]
    pub time_of_action: DateTime<Utc>,
}

impl TrackingEntry {
    /// Builds an entry stamped with the current UTC time.
    ///
    /// A blank `source_ip` is replaced with [`UNKNOWN_SOURCE_IP`].
    #[must_use]
    pub fn new(id: i64, url_request: impl Into<String>, source_ip: impl Into<String>) -> Self {
        let source_ip = source_ip.into();
        let source_ip = if source_ip.trim().is_empty() {
            UNKNOWN_SOURCE_IP.to_string()
        } else {
            source_ip
        };

        Self {
            id,
            url_request: url_request.into(),
            source_ip,
            time_of_action: Utc::now(),
        }
    }

    /// Round-trippable text form of `time_of_action`.
    #[must_use]
    pub fn timestamp_text(&self) -> String {
        format_timestamp(&self.time_of_action)
    }
}

/// Formats a tracking timestamp as RFC 3339 with microseconds and a `Z` suffix.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a timestamp written by [`format_timestamp`] (or any RFC 3339 text).
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text.trim()).map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_source_ip_becomes_unknown() {
        let entry = TrackingEntry::new(1, "/", "  ");
        assert_eq!(entry.source_ip, UNKNOWN_SOURCE_IP);
    }

    #[test]
    fn timestamp_text_round_trips() {
        let entry = TrackingEntry::new(7, "/Customers?country=UK", "10.0.0.1");
        let text = entry.timestamp_text();
        assert!(text.ends_with('Z'));

        let parsed = parse_timestamp(&text).unwrap();
        assert_eq!(
            parsed.timestamp_micros(),
            entry.time_of_action.timestamp_micros()
        );
    }
}
