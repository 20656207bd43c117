//! Slack Events API envelope parsing.
//!
//! Every delivery is reduced to one [`InboundEvent`] variant plus the key
//! used to deduplicate it.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub const URL_VERIFICATION: &str = "url_verification";
pub const EVENT_CALLBACK: &str = "event_callback";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("url_verification without challenge")]
    MissingChallenge,
}

/// Outer Events API payload
#[derive(Debug, Deserialize)]
pub struct RawEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub event: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl MessageEvent {
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.as_deref().is_some_and(|id| !id.is_empty())
            || self.subtype.as_deref() == Some("bot_message")
    }

    /// A reply inside a thread, not the thread's parent message
    pub fn is_thread_reply(&self) -> bool {
        matches!(&self.thread_ts, Some(thread) if !thread.is_empty() && *thread != self.ts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReactionItem {
    #[serde(default)]
    pub channel: String,
    /// Platform id of the message reacted to
    pub ts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReactionEvent {
    #[serde(default)]
    pub user: Option<String>,
    pub reaction: String,
    pub item: ReactionItem,
}

/// Closed set of deliveries the router understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    UrlVerification { challenge: String },
    Message(MessageEvent),
    Mention(MentionEvent),
    Reaction(ReactionEvent),
    Unsupported { kind: String },
}

/// Identity of a delivery for deduplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKey {
    Explicit(String),
    /// No event id was sent. Distinct events of the same type from the
    /// same team collide under this key.
    Composite { team_id: String, event_type: String },
}

impl EventKey {
    pub fn resolve(event_id: Option<&str>, team_id: Option<&str>, event_type: &str) -> Self {
        match event_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => EventKey::Explicit(id.to_string()),
            None => EventKey::Composite {
                team_id: team_id.unwrap_or_default().to_string(),
                event_type: event_type.to_string(),
            },
        }
    }

    pub fn cache_key(&self) -> String {
        match self {
            EventKey::Explicit(id) => id.clone(),
            EventKey::Composite {
                team_id,
                event_type,
            } => format!("{}:{}", team_id, event_type),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, EventKey::Composite { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// `None` for URL verification, which is never deduplicated
    pub key: Option<EventKey>,
    pub event: InboundEvent,
}

pub fn parse_envelope(body: &[u8]) -> Result<Envelope, EnvelopeError> {
    let raw: RawEnvelope = serde_json::from_slice(body)?;

    if raw.kind == URL_VERIFICATION {
        let challenge = raw.challenge.ok_or(EnvelopeError::MissingChallenge)?;
        return Ok(Envelope {
            key: None,
            event: InboundEvent::UrlVerification { challenge },
        });
    }

    let key = EventKey::resolve(raw.event_id.as_deref(), raw.team_id.as_deref(), &raw.kind);
    if key.is_degraded() {
        warn!(key = %key.cache_key(), "Envelope without event_id, deduplicating on team and type");
    }

    let event = match (raw.kind.as_str(), raw.event) {
        (EVENT_CALLBACK, Some(inner)) => parse_inner(inner),
        (kind, _) => InboundEvent::Unsupported {
            kind: kind.to_string(),
        },
    };

    Ok(Envelope {
        key: Some(key),
        event,
    })
}

/// Only the outer envelope can be malformed. An inner event of a known type
/// in a shape we do not handle (file reactions, hidden message subtypes) is
/// still a valid delivery and is treated as unsupported.
fn parse_inner(inner: Value) -> InboundEvent {
    let kind = inner
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let parsed = match kind.as_str() {
        "message" => serde_json::from_value(inner).map(InboundEvent::Message),
        "app_mention" => serde_json::from_value(inner).map(InboundEvent::Mention),
        "reaction_added" => serde_json::from_value(inner).map(InboundEvent::Reaction),
        _ => return InboundEvent::Unsupported { kind },
    };

    parsed.unwrap_or_else(|e| {
        warn!(kind = %kind, error = %e, "Unhandled inner event shape");
        InboundEvent::Unsupported { kind }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Envelope {
        parse_envelope(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn url_verification_has_no_key() {
        let envelope = parse(json!({"type": "url_verification", "challenge": "abc123"}));
        assert_eq!(envelope.key, None);
        assert_eq!(
            envelope.event,
            InboundEvent::UrlVerification {
                challenge: "abc123".into()
            }
        );
    }

    #[test]
    fn reaction_event_carries_message_ts() {
        let envelope = parse(json!({
            "type": "event_callback",
            "team_id": "T1",
            "event_id": "Ev42",
            "event": {
                "type": "reaction_added",
                "user": "U1",
                "reaction": "two",
                "item": {"type": "message", "channel": "C1", "ts": "1700000000.000100"}
            }
        }));
        assert_eq!(envelope.key, Some(EventKey::Explicit("Ev42".into())));
        match envelope.event {
            InboundEvent::Reaction(r) => {
                assert_eq!(r.reaction, "two");
                assert_eq!(r.item.ts, "1700000000.000100");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_event_id_degrades_to_team_and_type() {
        let envelope = parse(json!({
            "type": "event_callback",
            "team_id": "T1",
            "event": {"type": "message", "channel": "C1", "text": "hi", "ts": "1.0"}
        }));
        let key = envelope.key.unwrap();
        assert!(key.is_degraded());
        assert_eq!(key.cache_key(), "T1:event_callback");
    }

    #[test]
    fn unknown_inner_type_is_unsupported() {
        let envelope = parse(json!({
            "type": "event_callback",
            "event_id": "Ev1",
            "event": {"type": "channel_created"}
        }));
        assert_eq!(
            envelope.event,
            InboundEvent::Unsupported {
                kind: "channel_created".into()
            }
        );
    }

    #[test]
    fn unexpected_inner_shapes_are_unsupported() {
        let file_reaction = parse(json!({
            "type": "event_callback",
            "event_id": "Ev5",
            "event": {
                "type": "reaction_added",
                "reaction": "thumbsup",
                "item": {"type": "file", "file": "F123"}
            }
        }));
        assert_eq!(
            file_reaction.event,
            InboundEvent::Unsupported {
                kind: "reaction_added".into()
            }
        );

        let hidden = parse(json!({
            "type": "event_callback",
            "event_id": "Ev6",
            "event": {"type": "message", "subtype": "message_replied", "hidden": true, "ts": "1.0"}
        }));
        assert_eq!(
            hidden.event,
            InboundEvent::Unsupported {
                kind: "message".into()
            }
        );
    }

    #[test]
    fn thread_replies_and_bots_are_recognised() {
        let mut message = MessageEvent {
            channel: "C1".into(),
            user: Some("U1".into()),
            text: "hi".into(),
            ts: "2.0".into(),
            thread_ts: Some("1.0".into()),
            bot_id: None,
            subtype: None,
        };
        assert!(message.is_thread_reply());
        message.thread_ts = Some("2.0".into());
        assert!(!message.is_thread_reply());
        message.bot_id = Some("B1".into());
        assert!(message.is_from_bot());
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_envelope(b"not json"),
            Err(EnvelopeError::Malformed(_))
        ));
    }
}
