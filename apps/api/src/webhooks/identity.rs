//! Identity-provider user lifecycle events.
//!
//! One handler per event type. Each maps to an idempotent upsert or delete,
//! so redelivered events are harmless.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::interests::display_name;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IdentityUser {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    pub image_url: Option<String>,
}

impl IdentityUser {
    pub fn name(&self) -> String {
        display_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.trim())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeletedUser {
    pub id: String,
}

/// Raw envelope: `{"type": "...", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityEvent {
    UserCreated(IdentityUser),
    UserUpdated(IdentityUser),
    UserDeleted(DeletedUser),
    Ignored(String),
}

impl TryFrom<WebhookEnvelope> for IdentityEvent {
    type Error = serde_json::Error;

    fn try_from(envelope: WebhookEnvelope) -> Result<Self, Self::Error> {
        Ok(match envelope.event_type.as_str() {
            "user.created" => IdentityEvent::UserCreated(serde_json::from_value(envelope.data)?),
            "user.updated" => IdentityEvent::UserUpdated(serde_json::from_value(envelope.data)?),
            "user.deleted" => IdentityEvent::UserDeleted(serde_json::from_value(envelope.data)?),
            _ => IdentityEvent::Ignored(envelope.event_type),
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookAck {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> IdentityEvent {
        let envelope: WebhookEnvelope = serde_json::from_value(v).unwrap();
        IdentityEvent::try_from(envelope).unwrap()
    }

    #[test]
    fn test_parse_created() {
        let event = parse(json!({
            "type": "user.created",
            "data": {
                "id": "user_123",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email_addresses": [{"email_address": "ada@example.com"}, {"email_address": "x@y.z"}],
                "image_url": "https://img.example.com/ada.png"
            }
        }));
        let IdentityEvent::UserCreated(user) = event else {
            panic!("expected UserCreated");
        };
        assert_eq!(user.name(), "Ada Lovelace");
        assert_eq!(user.primary_email(), Some("ada@example.com"));
    }

    #[test]
    fn test_parse_deleted() {
        let event = parse(json!({"type": "user.deleted", "data": {"id": "user_9", "deleted": true}}));
        assert_eq!(event, IdentityEvent::UserDeleted(DeletedUser { id: "user_9".to_string() }));
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let event = parse(json!({"type": "session.created", "data": {}}));
        assert_eq!(event, IdentityEvent::Ignored("session.created".to_string()));
    }

    #[test]
    fn test_missing_email_detected() {
        let event = parse(json!({"type": "user.updated", "data": {"id": "u", "email_addresses": []}}));
        let IdentityEvent::UserUpdated(user) = event else {
            panic!("expected UserUpdated");
        };
        assert!(user.primary_email().is_none());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let envelope: WebhookEnvelope =
            serde_json::from_value(json!({"type": "user.created", "data": {"first_name": "A"}})).unwrap();
        assert!(IdentityEvent::try_from(envelope).is_err());
    }
}
