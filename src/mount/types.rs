//! Mount identity and notification vocabulary types

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::CodecError;

/// Identity of a mounted device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub node_id: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Capability URIs advertised in the session hello
    pub capabilities: Vec<String>,
    pub connected_at: DateTime<Utc>,
}

impl NodeDescriptor {
    #[must_use]
    pub fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            host: None,
            port: None,
            capabilities: Vec::new(),
            connected_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_address(mut self, host: &str, port: u16) -> Self {
        self.host = Some(host.to_string());
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Notification stream advertised by a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub replay_support: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_log_creation_time: Option<DateTime<FixedOffset>>,
}

impl Stream {
    /// Stream without replay support
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            replay_support: false,
            replay_log_creation_time: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Mark the stream as replayable, logging since `created`
    #[must_use]
    pub fn with_replay(mut self, created: Option<DateTime<FixedOffset>>) -> Self {
        self.replay_support = true;
        self.replay_log_creation_time = created;
        self
    }
}

/// YANG `date-and-time` value: an offset date-time string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateAndTime {
    text: String,
    instant: DateTime<FixedOffset>,
}

impl DateAndTime {
    /// Validate an offset date-time string
    ///
    /// # Errors
    ///
    /// Returns error if the value is not an RFC 3339 date-time
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        let instant =
            DateTime::parse_from_rfc3339(value).map_err(|_| CodecError::InvalidValue {
                leaf: "date-and-time".to_string(),
                value: value.to_string(),
            })?;
        Ok(Self {
            text: value.to_string(),
            instant,
        })
    }

    /// Format an instant in the local offset
    #[must_use]
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        let local = instant.with_timezone(&Local);
        Self {
            text: local.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            instant: DateTime::<FixedOffset>::from(local),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Instant with its original offset
    #[must_use]
    pub const fn to_datetime(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

impl fmt::Display for DateAndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Input of the `create-subscription` operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscriptionInput {
    pub stream: String,
    /// Replay start; present only for streams that support replay
    pub start_time: Option<DateAndTime>,
}

impl CreateSubscriptionInput {
    /// Build the request for `stream`, replaying from `last_event_time` when supported
    ///
    /// A requested replay on a stream without replay support is dropped.
    #[must_use]
    pub fn for_stream(stream: &Stream, last_event_time: Option<DateTime<Utc>>) -> Self {
        let start_time = last_event_time
            .filter(|_| stream.replay_support)
            .map(DateAndTime::from_instant);
        Self {
            stream: stream.name.clone(),
            start_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn date_and_time_round_trips_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 15).unwrap();
        let formatted = DateAndTime::from_instant(instant);

        let parsed = DateAndTime::parse(formatted.as_str()).unwrap();
        assert_eq!(parsed.to_datetime().with_timezone(&Utc), instant);
    }

    #[test]
    fn date_and_time_keeps_subsecond_precision() {
        let instant = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        let formatted = DateAndTime::from_instant(instant);
        assert_eq!(formatted.to_datetime().with_timezone(&Utc), instant);
    }

    #[test]
    fn date_and_time_rejects_garbage() {
        assert!(DateAndTime::parse("yesterday").is_err());
        assert!(DateAndTime::parse("2024-03-01").is_err());
    }

    #[test]
    fn replay_time_dropped_without_support() {
        let stream = Stream::new("NETCONF");
        let input = CreateSubscriptionInput::for_stream(&stream, Some(Utc::now()));
        assert_eq!(input, CreateSubscriptionInput::for_stream(&stream, None));
        assert!(input.start_time.is_none());
    }

    #[test]
    fn replay_time_kept_with_support() {
        let stream = Stream::new("NETCONF").with_replay(None);
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let input = CreateSubscriptionInput::for_stream(&stream, Some(instant));
        assert_eq!(input.stream, "NETCONF");
        assert_eq!(
            input.start_time.unwrap().to_datetime().with_timezone(&Utc),
            instant
        );
    }

    #[test]
    fn stream_serializes_camel_case() {
        let stream = Stream::new("NETCONF").with_replay(None);
        let json = serde_json::to_value(&stream).unwrap();
        assert_eq!(json["replaySupport"], true);
        assert!(json.get("description").is_none());
    }
}
