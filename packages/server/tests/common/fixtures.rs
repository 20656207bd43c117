//! Slack and Linear payload fixtures.

use serde_json::{json, Value};

pub const CHANNEL: &str = "C0GHOST";
pub const TEAM: &str = "T0TEAM";

pub fn event_callback(event_id: Option<&str>, event: Value) -> String {
    let mut envelope = json!({
        "type": "event_callback",
        "team_id": TEAM,
        "event": event,
    });
    if let Some(id) = event_id {
        envelope["event_id"] = json!(id);
    }
    envelope.to_string()
}

pub fn message_event(event_id: &str, text: &str) -> String {
    event_callback(
        Some(event_id),
        json!({
            "type": "message",
            "channel": CHANNEL,
            "user": "U0AUTHOR",
            "text": text,
            "ts": "1700000100.000100",
        }),
    )
}

pub fn mention_event(event_id: &str, text: &str) -> String {
    event_callback(
        Some(event_id),
        json!({
            "type": "app_mention",
            "channel": CHANNEL,
            "user": "U0AUTHOR",
            "text": format!("<@U0BOT> {}", text),
            "ts": "1700000200.000100",
        }),
    )
}

pub fn reaction_event(event_id: &str, reaction: &str, message_ts: &str) -> String {
    event_callback(
        Some(event_id),
        json!({
            "type": "reaction_added",
            "user": "U0AUTHOR",
            "reaction": reaction,
            "item": {"type": "message", "channel": CHANNEL, "ts": message_ts},
        }),
    )
}

pub fn linear_issue(id: &str, title: &str, state_type: &str) -> String {
    json!({
        "action": "update",
        "type": "Issue",
        "data": {
            "id": id,
            "title": title,
            "description": "Swapped the hand-rolled map for a bounded cache",
            "state": {"name": "Done", "type": state_type},
            "team": {"name": "Core"},
        },
    })
    .to_string()
}
