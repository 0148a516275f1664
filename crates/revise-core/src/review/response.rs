//! Parse-and-validate stage for review replies.
//!
//! The service may wrap its answer in prose or code fences, so the first
//! well-formed JSON object anywhere in the text is taken as the reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ReviewError;

/// One suggested subject change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub id: String,
    pub subject: String,
}

/// A validated review reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReply {
    pub updated_sessions: Vec<SessionUpdate>,
    /// Free text the service added; never used for merging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Extract and validate a reply from raw service output.
///
/// # Errors
/// `MalformedResponse` when no JSON object is present, `updated_sessions` is
/// missing or not a list, or any entry lacks a non-empty `id` or a text
/// `subject`.
pub fn parse_review_reply(raw: &str) -> Result<ReviewReply, ReviewError> {
    let object = first_json_object(raw)
        .ok_or_else(|| ReviewError::MalformedResponse("no JSON object in reply".to_string()))?;

    let entries = object
        .get("updated_sessions")
        .ok_or_else(|| ReviewError::MalformedResponse("missing 'updated_sessions'".to_string()))?
        .as_array()
        .ok_or_else(|| {
            ReviewError::MalformedResponse("'updated_sessions' is not a list".to_string())
        })?;

    let updated_sessions = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| validate_entry(i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let feedback = object
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ReviewReply {
        updated_sessions,
        feedback,
    })
}

fn validate_entry(position: usize, entry: &Value) -> Result<SessionUpdate, ReviewError> {
    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ReviewError::MalformedResponse(format!("entry {position} has no usable 'id'"))
        })?;
    let subject = entry.get("subject").and_then(Value::as_str).ok_or_else(|| {
        ReviewError::MalformedResponse(format!("entry {position} has no text 'subject'"))
    })?;

    Ok(SessionUpdate {
        id: id.to_string(),
        subject: subject.trim().to_string(),
    })
}

/// First `{` that starts a complete JSON object, parsed.
fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => Some(object),
            _ => None,
        }
    })
}
