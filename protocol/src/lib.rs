//! Messages exchanged between an embedded minigame and the page hosting it.
//!
//! Every message travels as a JSON object `{ "type": ..., "payload": ... }`.
//! Inbound messages come from the host, outbound ones are posted by the game.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanity: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityPayload {
    pub sanity: u32,
}

/// Messages sent by the host page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    Init(InitPayload),
    UpdateSanity(SanityPayload),
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

impl HostMessage {
    /// Decodes a host message, `Ok(None)` for message types this side does not know about.
    pub fn decode(raw: &str) -> Result<Option<Self>> {
        let envelope: RawEnvelope = serde_json::from_str(raw)?;
        let message = match envelope.kind.as_str() {
            "INIT" => {
                // a bare `{ "type": "INIT" }` still initializes with defaults
                let payload = if envelope.payload.is_null() {
                    InitPayload::default()
                } else {
                    serde_json::from_value(envelope.payload)?
                };
                HostMessage::Init(payload)
            }
            "UPDATE_SANITY" => HostMessage::UpdateSanity(serde_json::from_value(envelope.payload)?),
            _ => return Ok(None),
        };
        Ok(Some(message))
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub minigame_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanityChangePayload {
    pub sanity_delta: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCompletePayload {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
}

/// Messages posted by the minigame to its host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestMessage {
    Ready(ReadyPayload),
    SanityChange(SanityChangePayload),
    GameComplete(GameCompletePayload),
}

impl GuestMessage {
    pub fn ready(minigame_type: impl Into<String>) -> Self {
        Self::Ready(ReadyPayload {
            minigame_type: minigame_type.into(),
        })
    }

    pub fn sanity_change(sanity_delta: i32) -> Self {
        Self::SanityChange(SanityChangePayload { sanity_delta })
    }

    pub fn game_complete(success: bool, final_answer: Option<String>) -> Self {
        Self::GameComplete(GameCompletePayload {
            success,
            final_answer,
        })
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Where an outbound message may be delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetOrigin {
    /// Any origin, the `"*"` target.
    Any,
    Exact(String),
}

impl TargetOrigin {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Exact(origin) => origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_init_with_sanity() {
        let raw = r#"{"type":"INIT","payload":{"gameId":"case-7","sanity":64}}"#;

        let message = HostMessage::decode(raw).unwrap();

        assert_eq!(
            message,
            Some(HostMessage::Init(InitPayload {
                game_id: Some("case-7".into()),
                sanity: Some(64),
            }))
        );
    }

    #[test]
    fn decodes_init_without_payload() {
        let message = HostMessage::decode(r#"{"type":"INIT"}"#).unwrap();

        assert_eq!(message, Some(HostMessage::Init(InitPayload::default())));
    }

    #[test]
    fn unknown_types_are_ignored() {
        let raw = r#"{"type":"PAUSE","payload":{"reason":"menu"}}"#;

        assert_eq!(HostMessage::decode(raw).unwrap(), None);
    }

    #[test]
    fn malformed_update_is_an_error() {
        let raw = r#"{"type":"UPDATE_SANITY","payload":{"sanity":"lots"}}"#;

        assert!(HostMessage::decode(raw).is_err());
        assert!(HostMessage::decode("not json").is_err());
    }

    #[test]
    fn outbound_messages_use_camel_case_payloads() {
        let encoded = GuestMessage::sanity_change(-1).encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            value,
            json!({ "type": "SANITY_CHANGE", "payload": { "sanityDelta": -1 } })
        );

        let encoded = GuestMessage::ready("puzzle").encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            value,
            json!({ "type": "READY", "payload": { "minigameType": "puzzle" } })
        );
    }

    #[test]
    fn game_complete_omits_missing_answer() {
        let encoded = GuestMessage::game_complete(true, None).encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(
            value,
            json!({ "type": "GAME_COMPLETE", "payload": { "success": true } })
        );
    }

    #[test]
    fn target_origin_strings() {
        assert_eq!(TargetOrigin::Any.as_str(), "*");
        assert_eq!(
            TargetOrigin::Exact("https://host.example".into()).as_str(),
            "https://host.example"
        );
    }
}
