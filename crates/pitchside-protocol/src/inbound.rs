//! Typed decoding of inbound client messages.
//!
//! Every inbound payload goes through a single decode step per message
//! kind. The step either yields a fully-typed [`ClientEvent`] with all
//! required fields present, or a [`ProtocolError`]. Nothing downstream
//! pokes at raw JSON.
//!
//! Decoding happens in two stages so the two error families stay
//! distinguishable:
//!
//! 1. Parse the text into a JSON object → [`ProtocolError::Decode`] or
//!    [`ProtocolError::InvalidMessage`] on failure.
//! 2. Pull out each required field → [`ProtocolError::MissingField`] if
//!    absent, [`ProtocolError::InvalidField`] if the wrong type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EventKind, ProtocolError, DEFAULT_USERNAME};

/// A join request.
///
/// A `username` that is empty or all whitespace is accepted and replaced
/// with [`DEFAULT_USERNAME`] rather than rejected with `join-error`. Older
/// coordinators refused such joins, so clients that relied on that
/// rejection to prompt for a name must check the name themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRequest {
    /// Display name, never blank.
    pub username: String,
    /// The client's requested turn position. Required on the wire but
    /// ignored for placement: the registry appends to the end.
    pub turn_hint: Value,
}

/// New value for whose turn it is. Also the rebroadcast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnChange {
    pub player_turn: Value,
}

/// New facing direction. Also the rebroadcast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionChange {
    pub player_direction: Value,
}

/// New kick force. Also the rebroadcast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickForceChange {
    pub kick_force: Value,
}

/// A decoded, validated inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Join(JoinRequest),
    Leave,
    TurnChange(TurnChange),
    DirectionChange(DirectionChange),
    KickForceChange(KickForceChange),
    RosterQuery,
}

impl ClientEvent {
    /// Decodes the textual payload of a message of the given kind.
    ///
    /// `leave` and `roster-query` carry no payload; whatever text they
    /// arrive with is ignored.
    ///
    /// # Errors
    /// See the module docs for which variant each failure produces.
    pub fn decode(kind: EventKind, data: &str) -> Result<Self, ProtocolError> {
        let event = match kind {
            EventKind::Leave => Self::Leave,
            EventKind::RosterQuery => Self::RosterQuery,
            EventKind::Join => {
                let mut fields = parse_object(data)?;
                let username = match require(&mut fields, "username")? {
                    Value::String(name) => name,
                    other => {
                        return Err(ProtocolError::InvalidField {
                            field: "username",
                            reason: format!("expected a string, got {}", json_type(&other)),
                        });
                    }
                };
                let turn_hint = require(&mut fields, "turnOrder")?;
                Self::Join(JoinRequest {
                    username: or_default_username(username),
                    turn_hint,
                })
            }
            EventKind::TurnChange => Self::TurnChange(TurnChange {
                player_turn: require(&mut parse_object(data)?, "playerTurn")?,
            }),
            EventKind::DirectionChange => Self::DirectionChange(DirectionChange {
                player_direction: require(&mut parse_object(data)?, "playerDirection")?,
            }),
            EventKind::KickForceChange => Self::KickForceChange(KickForceChange {
                kick_force: require(&mut parse_object(data)?, "kickForce")?,
            }),
        };
        Ok(event)
    }
}

fn parse_object(data: &str) -> Result<Map<String, Value>, ProtocolError> {
    match serde_json::from_str(data).map_err(ProtocolError::Decode)? {
        Value::Object(fields) => Ok(fields),
        other => Err(ProtocolError::InvalidMessage(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn require(fields: &mut Map<String, Value>, field: &'static str) -> Result<Value, ProtocolError> {
    fields.remove(field).ok_or(ProtocolError::MissingField(field))
}

fn or_default_username(username: String) -> String {
    if username.trim().is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        username
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // =====================================================================
    // join
    // =====================================================================

    #[test]
    fn test_decode_join_valid() {
        let event = ClientEvent::decode(EventKind::Join, r#"{"username":"Alice","turnOrder":4}"#)
            .unwrap();

        assert_eq!(
            event,
            ClientEvent::Join(JoinRequest {
                username: "Alice".into(),
                turn_hint: json!(4),
            })
        );
    }

    #[test]
    fn test_decode_join_zero_turn_hint_is_present() {
        // 0 is a real value, not an absent one.
        let event = ClientEvent::decode(EventKind::Join, r#"{"username":"Alice","turnOrder":0}"#);
        assert!(event.is_ok());
    }

    #[test]
    fn test_decode_join_missing_username_is_validation_error() {
        let err = ClientEvent::decode(EventKind::Join, r#"{"turnOrder":1}"#)
            .unwrap_err();

        assert!(matches!(err, ProtocolError::MissingField("username")));
        assert!(err.is_validation());
    }

    #[test]
    fn test_decode_join_missing_turn_hint_is_validation_error() {
        let err =
            ClientEvent::decode(EventKind::Join, r#"{"username":"Alice"}"#)
                .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("turnOrder")));
    }

    #[test]
    fn test_decode_join_blank_username_becomes_placeholder() {
        let event = ClientEvent::decode(EventKind::Join, r#"{"username":"   ","turnOrder":1}"#)
            .unwrap();

        match event {
            ClientEvent::Join(req) => assert_eq!(req.username, "Guest"),
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_join_empty_username_is_accepted_not_rejected() {
        let event = ClientEvent::decode(EventKind::Join, r#"{"username":"","turnOrder":0}"#)
            .expect("an empty name is not a join error");

        assert_eq!(
            event,
            ClientEvent::Join(JoinRequest {
                username: DEFAULT_USERNAME.into(),
                turn_hint: json!(0),
            })
        );
    }

    #[test]
    fn test_decode_join_numeric_username_is_invalid_field() {
        let err = ClientEvent::decode(EventKind::Join, r#"{"username":42,"turnOrder":1}"#)
            .unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidField { field: "username", .. }));
        assert_eq!(
            err.to_string(),
            "invalid field `username`: expected a string, got a number"
        );
    }

    #[test]
    fn test_decode_join_malformed_json_is_decode_error() {
        let err = ClientEvent::decode(EventKind::Join, "{username: Alice")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_decode_join_non_object_is_invalid_message() {
        let err = ClientEvent::decode(EventKind::Join, r#""Alice""#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_decode_join_empty_payload_is_decode_error() {
        let err = ClientEvent::decode(EventKind::Join, "").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    // =====================================================================
    // state changes
    // =====================================================================

    #[test]
    fn test_decode_turn_change_passes_value_through() {
        let event = ClientEvent::decode(
            EventKind::TurnChange,
            r#"{"playerTurn":{"seat":2,"note":"anything"}}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::TurnChange(TurnChange {
                player_turn: json!({"seat": 2, "note": "anything"}),
            })
        );
    }

    #[test]
    fn test_decode_turn_change_null_counts_as_present() {
        let event =
            ClientEvent::decode(EventKind::TurnChange, r#"{"playerTurn":null}"#)
                .unwrap();
        assert_eq!(
            event,
            ClientEvent::TurnChange(TurnChange {
                player_turn: Value::Null
            })
        );
    }

    #[test]
    fn test_decode_turn_change_missing_field() {
        let err = ClientEvent::decode(EventKind::TurnChange, r#"{"turn":1}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("playerTurn")));
    }

    #[test]
    fn test_decode_direction_change() {
        let event = ClientEvent::decode(
            EventKind::DirectionChange,
            r#"{"playerDirection":[0.5,-1.0]}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::DirectionChange(DirectionChange {
                player_direction: json!([0.5, -1.0]),
            })
        );
    }

    #[test]
    fn test_decode_direction_change_missing_field() {
        let err = ClientEvent::decode(EventKind::DirectionChange, "{}")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("playerDirection")));
    }

    #[test]
    fn test_decode_kick_force_change() {
        let event = ClientEvent::decode(EventKind::KickForceChange, r#"{"kickForce":"12.5"}"#)
            .unwrap();
        assert_eq!(
            event,
            ClientEvent::KickForceChange(KickForceChange {
                kick_force: json!("12.5"),
            })
        );
    }

    #[test]
    fn test_decode_kick_force_change_malformed() {
        let err = ClientEvent::decode(EventKind::KickForceChange, "kick!")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    // =====================================================================
    // payload-less kinds
    // =====================================================================

    #[test]
    fn test_decode_roster_query_ignores_payload() {
        assert_eq!(
            ClientEvent::decode(EventKind::RosterQuery, "").unwrap(),
            ClientEvent::RosterQuery
        );
        assert_eq!(
            ClientEvent::decode(EventKind::RosterQuery, "garbage").unwrap(),
            ClientEvent::RosterQuery
        );
    }

    #[test]
    fn test_decode_leave_ignores_payload() {
        assert_eq!(
            ClientEvent::decode(EventKind::Leave, "").unwrap(),
            ClientEvent::Leave
        );
    }

    #[test]
    fn test_rebroadcast_payload_shape_matches_inbound() {
        let change = KickForceChange {
            kick_force: json!(7),
        };
        assert_eq!(
            serde_json::to_string(&change).unwrap(),
            r#"{"kickForce":7}"#
        );
    }
}
