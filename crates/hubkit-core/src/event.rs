//! The immutable event record and its builder
//!
//! Events are the only unit of communication the hub transports. Every event
//! carries a globally unique identifier, a type/source pair used for listener
//! matching, and an optional typed payload. Response events additionally
//! carry the identifier of the event that triggered them.

use serde::{Deserialize, Serialize};

use crate::time::{SystemTimeSource, TimeSource};
use crate::types::Timestamp;
use crate::value::EventData;

// ----------------------------------------------------------------------------
// Well-Known Types and Sources
// ----------------------------------------------------------------------------

/// Well-known event type strings. Comparison is case-insensitive.
pub mod event_type {
    /// Matches any event type when used in a listener registration.
    pub const WILDCARD: &str = "*";
    /// Events published by the hub itself.
    pub const HUB: &str = "com.adobe.eventType.hub";
}

/// Well-known event source strings. Comparison is case-insensitive.
pub mod event_source {
    /// Matches any event source when used in a listener registration.
    pub const WILDCARD: &str = "*";
    /// Shared-state change notifications published by the hub.
    pub const SHARED_STATE: &str = "com.adobe.eventSource.sharedState";
    /// Generic request events from host applications.
    pub const REQUEST_CONTENT: &str = "com.adobe.eventSource.requestContent";
    /// Generic response events paired with a request.
    pub const RESPONSE_CONTENT: &str = "com.adobe.eventSource.responseContent";
}

// ----------------------------------------------------------------------------
// Event
// ----------------------------------------------------------------------------

/// An immutable message dispatched through the hub.
///
/// Events are constructed through [`Event::builder`] and never mutated after
/// [`EventBuilder::build`]. The runtime shares them across extension lanes by
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique identifier, generated at creation.
    id: String,
    /// Human-readable label for logs; not used for matching.
    name: String,
    /// Event type, e.g. `com.adobe.eventType.hub`.
    #[serde(rename = "type")]
    event_type: String,
    /// Event source, e.g. `com.adobe.eventSource.sharedState`.
    source: String,
    /// Typed payload. Absent payloads stay absent, they are not empty maps.
    data: Option<EventData>,
    /// Identifier of the trigger event when this event is a response.
    response_id: Option<String>,
    /// Creation time.
    timestamp: Timestamp,
    /// Optional key mask selecting payload entries for history recording.
    mask: Option<Vec<String>>,
}

impl Event {
    /// Start building an event with the given name, type, and source.
    pub fn builder(
        name: impl Into<String>,
        event_type: impl Into<String>,
        source: impl Into<String>,
    ) -> EventBuilder {
        EventBuilder {
            name: name.into(),
            event_type: event_type.into(),
            source: source.into(),
            data: None,
            response_id: None,
            timestamp: None,
            mask: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn data(&self) -> Option<&EventData> {
        self.data.as_ref()
    }

    /// Identifier of the event this one responds to, if any.
    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn mask(&self) -> Option<&[String]> {
        self.mask.as_deref()
    }

    /// True when this event's type/source match the given pair,
    /// case-insensitively and honoring `"*"` wildcards in `event_type` /
    /// `source` (the arguments, not the event).
    pub fn matches(&self, event_type: &str, source: &str) -> bool {
        fn field_matches(pattern: &str, value: &str) -> bool {
            pattern == event_type::WILDCARD || pattern.eq_ignore_ascii_case(value)
        }
        field_matches(event_type, &self.event_type) && field_matches(source, &self.source)
    }
}

// ----------------------------------------------------------------------------
// Event Builder
// ----------------------------------------------------------------------------

/// Chaining builder for [`Event`].
#[derive(Debug)]
pub struct EventBuilder {
    name: String,
    event_type: String,
    source: String,
    data: Option<EventData>,
    response_id: Option<String>,
    timestamp: Option<Timestamp>,
    mask: Option<Vec<String>>,
}

impl EventBuilder {
    /// Attach a payload.
    pub fn data(mut self, data: EventData) -> Self {
        self.data = Some(data);
        self
    }

    /// Mark this event as a response to `trigger`, linking it by identifier.
    pub fn in_response_to(mut self, trigger: &Event) -> Self {
        self.response_id = Some(trigger.id.clone());
        self
    }

    /// Override the creation timestamp. Defaults to the system clock.
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Select payload keys for event-history recording.
    pub fn mask(mut self, mask: Vec<String>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Finalize the event, generating its unique identifier.
    pub fn build(self) -> Event {
        self.build_with_time_source(&SystemTimeSource)
    }

    /// Finalize the event using the given clock for the default timestamp.
    pub fn build_with_time_source(self, time_source: &dyn TimeSource) -> Event {
        Event {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            event_type: self.event_type,
            source: self.source,
            data: self.data,
            response_id: self.response_id,
            timestamp: self.timestamp.unwrap_or_else(|| time_source.now()),
            mask: self.mask,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{event_data, Value};

    #[test]
    fn test_builder_assigns_unique_ids() {
        let a = Event::builder("a", "t", "s").build();
        let b = Event::builder("b", "t", "s").build();
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_empty());
    }

    #[test]
    fn test_response_links_trigger_id() {
        let trigger = Event::builder("request", "t", "s").build();
        let response = Event::builder("response", "t", "s")
            .in_response_to(&trigger)
            .build();
        assert_eq!(response.response_id(), Some(trigger.id()));
        assert_eq!(trigger.response_id(), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let event = Event::builder("e", "com.Example.Type", "com.Example.Source").build();
        assert!(event.matches("com.example.type", "com.example.source"));
        assert!(event.matches("*", "com.EXAMPLE.source"));
        assert!(event.matches("com.example.type", "*"));
        assert!(!event.matches("com.example.other", "*"));
    }

    #[test]
    fn test_payload_round_trips_through_serde() {
        let event = Event::builder("e", "t", "s")
            .data(event_data([("k", Value::from("v")), ("n", Value::from(2i64))]))
            .mask(vec!["k".to_string()])
            .build();

        let text = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&text).unwrap();
        assert_eq!(back, event);
    }
}
