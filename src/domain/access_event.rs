//! Access event model for asynchronous access tracking.

use serde::{Deserialize, Serialize};

/// One alias access, emitted on every create and resolve operation.
///
/// Travels from the resolver through the in-process channel, is serialized to
/// JSON by the emitter, and is decoded again by the ingestor on the far side
/// of the broker. The event is transient: it only exists in flight and as a
/// row in the raw-event log.
///
/// # Wire format
///
/// The serialized field names (`url`, `user_id`) are a contract: the analytics
/// store extracts them by name from the raw JSON, not by position. Renaming a
/// field silently breaks aggregation.
///
/// # User identity
///
/// Create-time events carry the id of the creating user. Resolve-time events
/// always carry `user_id = 0` because resolution is anonymous; callers that
/// need per-user resolve analytics must carry identity through another
/// channel. This is a documented limitation of the current design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// The short code that was created or resolved.
    pub url: String,
    /// The acting user, or 0 for anonymous resolution.
    pub user_id: i64,
}

impl AccessEvent {
    /// Creates an event for an alias created by `user_id`.
    pub fn created(code: impl Into<String>, user_id: i64) -> Self {
        Self {
            url: code.into(),
            user_id,
        }
    }

    /// Creates an event for an anonymous resolution of `code`.
    pub fn resolved(code: impl Into<String>) -> Self {
        Self {
            url: code.into(),
            user_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_event_carries_user() {
        let event = AccessEvent::created("Ab3xZ", 42);

        assert_eq!(event.url, "Ab3xZ");
        assert_eq!(event.user_id, 42);
    }

    #[test]
    fn test_resolved_event_is_anonymous() {
        let event = AccessEvent::resolved("Ab3xZ");

        assert_eq!(event.url, "Ab3xZ");
        assert_eq!(event.user_id, 0);
    }

    #[test]
    fn test_wire_field_names() {
        // The analytics store extracts `url` and `user_id` from the raw JSON
        // by name; this pins the wire contract.
        let json = serde_json::to_value(AccessEvent::created("xYz12", 7)).unwrap();

        assert_eq!(json["url"], "xYz12");
        assert_eq!(json["user_id"], 7);
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_deserialize_from_wire() {
        let event: AccessEvent = serde_json::from_str(r#"{"url":"abcDE","user_id":3}"#).unwrap();

        assert_eq!(event, AccessEvent::created("abcDE", 3));
    }
}
