//! Webhook normalization
//!
//! Maps opaque provider webhook actions onto a stable internal event
//! taxonomy. The provider reports a card move, an archive, and a plain
//! rename all as `updateCard`; classification disambiguates them from the
//! `old`/`listAfter` fragments attached to the action.
//!
//! [`normalize`] is total: any structural irregularity degrades to
//! [`EventKind::Unknown`] instead of failing, so a malformed delivery can
//! never poison the ingest path.

use serde::Serialize;
use serde_json::Value;

/// Canonical classification of a board change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "createCard")]
    CardCreated,
    #[serde(rename = "updateCardDetails")]
    CardUpdated,
    #[serde(rename = "moveCard")]
    CardMoved,
    #[serde(rename = "archiveCard")]
    CardArchived,
    #[serde(rename = "deleteCard")]
    CardDeleted,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Card fields projected out of the raw action.
///
/// `closed` is copied only when the raw value is a genuine JSON boolean;
/// anything else is absent rather than defaulted to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "idList", skip_serializing_if = "Option::is_none")]
    pub id_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

/// Provider-agnostic description of a board/list/card change.
///
/// Immutable value type; produced fresh per notification and consumed
/// immediately by fan-out and invalidation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalEvent {
    #[serde(rename = "eventType")]
    pub kind: EventKind,
    #[serde(rename = "boardId")]
    pub board_id: Option<String>,
    #[serde(rename = "listId")]
    pub list_id: Option<String>,
    pub card: Option<CardSummary>,
}

impl CanonicalEvent {
    /// The degraded event emitted for any unrecognizable action
    pub fn unknown() -> Self {
        Self {
            kind: EventKind::Unknown,
            board_id: None,
            list_id: None,
            card: None,
        }
    }
}

/// Normalize a raw webhook action into a [`CanonicalEvent`].
///
/// Pure and total: identical input yields an identical event, and no input
/// shape raises an error.
pub fn normalize(action: &Value) -> CanonicalEvent {
    let kind = match action.get("type").and_then(Value::as_str) {
        // Deletions map by type alone, whatever else the action carries.
        Some("deleteCard") => EventKind::CardDeleted,
        Some(raw_type) if action.get("data").is_some_and(Value::is_object) => match raw_type {
            "createCard" => EventKind::CardCreated,
            "updateCard" => classify_update(action),
            _ => EventKind::Unknown,
        },
        _ => EventKind::Unknown,
    };

    CanonicalEvent {
        kind,
        board_id: first_str(
            action,
            &["/data/board/id", "/data/card/idBoard", "/data/list/idBoard"],
        ),
        list_id: first_str(
            action,
            &["/data/list/id", "/data/listAfter/id", "/data/card/idList"],
        ),
        card: action
            .pointer("/data/card")
            .filter(|card| card.is_object())
            .map(project_card),
    }
}

/// Disambiguate `updateCard`, first match wins: a move (list changed), an
/// archive (closed flipped false to true), otherwise a details update.
fn classify_update(action: &Value) -> EventKind {
    let old_list = action.pointer("/data/old/idList").and_then(Value::as_str);
    let new_list = action.pointer("/data/listAfter/id").and_then(Value::as_str);
    if let (Some(old), Some(new)) = (old_list, new_list) {
        if old != new {
            return EventKind::CardMoved;
        }
    }

    let was_open = action.pointer("/data/old/closed").and_then(Value::as_bool) == Some(false);
    let now_closed = action.pointer("/data/card/closed").and_then(Value::as_bool) == Some(true);
    if was_open && now_closed {
        return EventKind::CardArchived;
    }

    EventKind::CardUpdated
}

/// First string found under the given JSON pointer paths
fn first_str(action: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| action.pointer(path).and_then(Value::as_str))
        .map(str::to_owned)
}

fn project_card(card: &Value) -> CardSummary {
    let text = |field: &str| {
        card.get(field)
            .and_then(Value::as_str)
            .map(str::to_owned)
    };
    CardSummary {
        id: text("id"),
        name: text("name"),
        desc: text("desc"),
        id_list: text("idList"),
        closed: card.get("closed").and_then(Value::as_bool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_detected_from_differing_lists() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "old": { "idList": "L1" },
                "listAfter": { "id": "L2" },
                "card": { "id": "C1", "idList": "L2" }
            }
        });

        let event = normalize(&action);
        assert_eq!(event.kind, EventKind::CardMoved);
        assert_eq!(event.list_id.as_deref(), Some("L2"));
        let card = event.card.unwrap();
        assert_eq!(card.id.as_deref(), Some("C1"));
        assert_eq!(card.id_list.as_deref(), Some("L2"));
    }

    #[test]
    fn test_same_list_is_not_a_move() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "old": { "idList": "L1", "name": "before" },
                "listAfter": { "id": "L1" },
                "card": { "id": "C1" }
            }
        });

        assert_eq!(normalize(&action).kind, EventKind::CardUpdated);
    }

    #[test]
    fn test_archive_from_closed_flip() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "old": { "closed": false },
                "card": { "id": "C1", "closed": true }
            }
        });

        let event = normalize(&action);
        assert_eq!(event.kind, EventKind::CardArchived);
        assert_eq!(event.card.unwrap().id.as_deref(), Some("C1"));
    }

    #[test]
    fn test_move_outranks_archive() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "old": { "idList": "L1", "closed": false },
                "listAfter": { "id": "L2" },
                "card": { "id": "C1", "closed": true }
            }
        });

        assert_eq!(normalize(&action).kind, EventKind::CardMoved);
    }

    #[test]
    fn test_plain_update_passes_through() {
        let action = json!({
            "type": "updateCard",
            "data": { "card": { "id": "C1", "name": "renamed" } }
        });

        assert_eq!(normalize(&action).kind, EventKind::CardUpdated);
    }

    #[test]
    fn test_details_update_from_old_name() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "old": { "name": "before" },
                "card": { "id": "C1", "name": "after" }
            }
        });

        assert_eq!(normalize(&action).kind, EventKind::CardUpdated);
    }

    #[test]
    fn test_delete_wins_regardless_of_other_fields() {
        let action = json!({
            "type": "deleteCard",
            "data": {
                "old": { "idList": "L1" },
                "listAfter": { "id": "L2" },
                "card": { "id": "C1" }
            }
        });

        assert_eq!(normalize(&action).kind, EventKind::CardDeleted);
    }

    #[test]
    fn test_create_card() {
        let action = json!({
            "type": "createCard",
            "data": {
                "board": { "id": "B1" },
                "list": { "id": "L1" },
                "card": { "id": "C1", "name": "new", "idList": "L1" }
            }
        });

        let event = normalize(&action);
        assert_eq!(event.kind, EventKind::CardCreated);
        assert_eq!(event.board_id.as_deref(), Some("B1"));
        assert_eq!(event.list_id.as_deref(), Some("L1"));
    }

    #[test]
    fn test_board_id_fallback_precedence() {
        // No explicit board reference: falls back to the card's board.
        let action = json!({
            "type": "createCard",
            "data": { "card": { "id": "C1", "idBoard": "B7" } }
        });
        assert_eq!(normalize(&action).board_id.as_deref(), Some("B7"));

        // Explicit board reference wins over the card's.
        let action = json!({
            "type": "createCard",
            "data": {
                "board": { "id": "B1" },
                "card": { "id": "C1", "idBoard": "B7" }
            }
        });
        assert_eq!(normalize(&action).board_id.as_deref(), Some("B1"));

        // Last resort: the list's board.
        let action = json!({
            "type": "createCard",
            "data": { "list": { "idBoard": "B9" } }
        });
        assert_eq!(normalize(&action).board_id.as_deref(), Some("B9"));
    }

    #[test]
    fn test_list_id_prefers_list_then_list_after() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "list": { "id": "L0" },
                "listAfter": { "id": "L2" },
                "card": { "idList": "L9" }
            }
        });
        assert_eq!(normalize(&action).list_id.as_deref(), Some("L0"));
    }

    #[test]
    fn test_non_boolean_closed_is_omitted() {
        let action = json!({
            "type": "updateCard",
            "data": { "card": { "id": "C1", "closed": "true" } }
        });

        let card = normalize(&action).card.unwrap();
        assert_eq!(card.closed, None);
    }

    #[test]
    fn test_malformed_input_degrades_to_unknown() {
        for raw in [
            json!({}),
            json!(null),
            json!([1, 2, 3]),
            json!("updateCard"),
            json!({ "type": 42 }),
            json!({ "type": "somethingElse", "data": {} }),
            json!({ "type": "updateCard" }),
            json!({ "type": "createCard", "data": "not-an-object" }),
        ] {
            let event = normalize(&raw);
            assert_eq!(event, CanonicalEvent::unknown(), "input: {raw}");
        }
    }

    #[test]
    fn test_update_with_empty_data_falls_through() {
        let action = json!({ "type": "updateCard", "data": {} });
        let event = normalize(&action);
        assert_eq!(event.kind, EventKind::CardUpdated);
        assert_eq!(event.card, None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let action = json!({
            "type": "updateCard",
            "data": {
                "old": { "idList": "L1" },
                "listAfter": { "id": "L2" },
                "card": { "id": "C1", "idList": "L2", "closed": false }
            }
        });

        assert_eq!(normalize(&action), normalize(&action));
    }

    #[test]
    fn test_wire_serialization_shape() {
        let event = normalize(&json!({
            "type": "deleteCard",
            "data": { "card": { "id": "C1" } }
        }));

        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["eventType"], "deleteCard");
        assert_eq!(wire["boardId"], Value::Null);
        assert_eq!(wire["listId"], Value::Null);
        assert_eq!(wire["card"]["id"], "C1");
        // Absent closed flag stays absent on the wire.
        assert!(wire["card"].get("closed").is_none());
    }
}
