//! Request and response bodies of the Slides and Drive APIs.

use serde::{Deserialize, Serialize};
use slides_core::SlideMutation;
use std::collections::BTreeMap;

/// Field mask for reads that only need slide ids.
pub const SLIDE_ORDER_FIELDS: &str = "presentationId,slides.objectId";

/// One request of a `presentations.batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchRequest {
    #[serde(rename_all = "camelCase")]
    DuplicateObject {
        object_id: String,
        object_ids: BTreeMap<String, String>,
    },
    #[serde(rename_all = "camelCase")]
    DeleteObject { object_id: String },
    #[serde(rename_all = "camelCase")]
    UpdateSlidesPosition {
        slide_object_ids: Vec<String>,
        insertion_index: usize,
    },
}

/// Body of `presentations.batchUpdate`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateBody {
    pub requests: Vec<BatchRequest>,
}

impl BatchUpdateBody {
    /// Translate a mutation batch, preserving its order.
    ///
    /// `updateSlidesPosition` only accepts slides listed in their current
    /// order, so a full reorder becomes one move per slide: moving slide `i`
    /// to index `i` once slides `0..i` are already in place.
    pub fn from_mutations(mutations: &[SlideMutation]) -> Self {
        let mut requests = Vec::new();
        for mutation in mutations {
            match mutation {
                SlideMutation::DuplicateSlide {
                    object_id,
                    new_object_id,
                } => requests.push(BatchRequest::DuplicateObject {
                    object_id: object_id.clone(),
                    object_ids: BTreeMap::from([(object_id.clone(), new_object_id.clone())]),
                }),
                SlideMutation::DeleteSlide { object_id } => {
                    requests.push(BatchRequest::DeleteObject {
                        object_id: object_id.clone(),
                    })
                }
                SlideMutation::SetSlideOrder { object_ids } => {
                    requests.extend(object_ids.iter().enumerate().map(|(index, id)| {
                        BatchRequest::UpdateSlidesPosition {
                            slide_object_ids: vec![id.clone()],
                            insertion_index: index,
                        }
                    }))
                }
            }
        }
        Self { requests }
    }
}

/// Body of Drive `files.copy`.
#[derive(Debug, Clone, Serialize)]
pub struct CopyFileBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

/// Drive file metadata subset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Google API error envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub status: String,
}

/// Best human-readable message from an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutations_translate_in_order() {
        let body = BatchUpdateBody::from_mutations(&[
            SlideMutation::DuplicateSlide {
                object_id: "A".into(),
                new_object_id: "gen_1".into(),
            },
            SlideMutation::DeleteSlide {
                object_id: "B".into(),
            },
            SlideMutation::SetSlideOrder {
                object_ids: vec!["C".into(), "A".into(), "gen_1".into()],
            },
        ]);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "requests": [
                    {"duplicateObject": {"objectId": "A", "objectIds": {"A": "gen_1"}}},
                    {"deleteObject": {"objectId": "B"}},
                    {"updateSlidesPosition": {"slideObjectIds": ["C"], "insertionIndex": 0}},
                    {"updateSlidesPosition": {"slideObjectIds": ["A"], "insertionIndex": 1}},
                    {"updateSlidesPosition": {"slideObjectIds": ["gen_1"], "insertionIndex": 2}}
                ]
            })
        );
    }

    /// Replays `updateSlidesPosition` requests the way the remote API does:
    /// the insertion index refers to the arrangement before the move.
    fn replay_moves(start: &[&str], requests: &[BatchRequest]) -> Vec<String> {
        let mut slides: Vec<String> = start.iter().map(|s| s.to_string()).collect();
        for request in requests {
            if let BatchRequest::UpdateSlidesPosition {
                slide_object_ids,
                insertion_index,
            } = request
            {
                let from = slides
                    .iter()
                    .position(|s| s == &slide_object_ids[0])
                    .unwrap();
                let moved = slides.remove(from);
                let to = if from < *insertion_index {
                    insertion_index - 1
                } else {
                    *insertion_index
                };
                slides.insert(to, moved);
            }
        }
        slides
    }

    #[test]
    fn test_reorder_moves_reach_target_order() {
        let cases: [(&[&str], &[&str]); 4] = [
            // Seeded A,B,C after duplicating A and deleting B.
            (&["A", "gen_1", "C"], &["C", "A", "gen_1"]),
            (&["a", "b", "c", "d", "e"], &["e", "d", "c", "b", "a"]),
            (&["a", "b", "c", "d"], &["b", "d", "a", "c"]),
            (&["a", "b", "c"], &["a", "b", "c"]),
        ];

        for (start, target) in cases {
            let body = BatchUpdateBody::from_mutations(&[SlideMutation::SetSlideOrder {
                object_ids: target.iter().map(|s| s.to_string()).collect(),
            }]);
            assert_eq!(body.requests.len(), target.len());
            assert_eq!(replay_moves(start, &body.requests), target);
        }
    }

    #[test]
    fn test_copy_body_omits_missing_parents() {
        let body = CopyFileBody {
            name: "Deck".into(),
            parents: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"name": "Deck"}));
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(error_message(body), "The caller does not have permission");
        assert_eq!(error_message("  upstream timeout "), "upstream timeout");
    }
}
