//! Push-channel message envelope.
//!
//! The server sends small JSON envelopes over the websocket:
//! `{ "type": "connected" | "refresh", "message": "...", "project_id": "..." }`.
//! Parsing is deliberately forgiving: a malformed or unknown message must
//! never take the connection down.

use serde_json::Value;

/// A parsed push message from the event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// Connection acknowledgement; informational only.
    Connected { project_id: String },
    /// The server wants the client to refresh its dashboard snapshot.
    Refresh { message: String },
    /// A type this client does not recognize. Logged and ignored upstream.
    Unknown { kind: String },
}

impl PushMessage {
    /// Parse a raw websocket text frame into a push message.
    ///
    /// Returns `None` for frames that are not JSON objects or carry no
    /// `type` field; the caller logs and drops those.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        let kind = value.get("type").and_then(Value::as_str)?;

        let field = |key: &str| -> String {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(match kind {
            "connected" => Self::Connected {
                project_id: field("project_id"),
            },
            "refresh" => Self::Refresh {
                message: field("message"),
            },
            other => Self::Unknown {
                kind: other.to_string(),
            },
        })
    }
}
