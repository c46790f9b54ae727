//! Answer validation.
//!
//! Both sides of the comparison go through [`normalize`]: trim surrounding
//! whitespace, then lowercase. Nothing else is folded, so separators inside
//! compound answers (`user|10.0.0.1`, `T1110—Brute Force`) must match
//! exactly.

use serde_json::Value;

use crate::error::{PayloadDefect, ValidationError};
use crate::model::QuestionId;
use crate::store::AnswerStore;

/// Trim leading/trailing whitespace and lowercase the whole string.
///
/// Uses Unicode default case mapping, which is locale-independent.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Judge a submission against the expected answer for `id`.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a wrong answer, and
/// `Err(UnknownQuestion)` when the store has no entry for `id`.
pub fn validate(
    store: &AnswerStore,
    id: QuestionId,
    submission: &str,
) -> Result<bool, ValidationError> {
    let expected = store
        .lookup(id)
        .ok_or(ValidationError::UnknownQuestion(id))?;
    Ok(normalize(submission) == normalize(expected))
}

/// Schema-check an untyped request body, then validate it.
///
/// Type errors are reported before any store lookup happens.
pub fn validate_payload(store: &AnswerStore, payload: &Value) -> Result<bool, ValidationError> {
    let (id, answer) = parse_payload(payload)?;
    validate(store, id, answer)
}

/// Parse raw body bytes as JSON and validate them.
pub fn validate_body(store: &AnswerStore, body: &[u8]) -> Result<bool, ValidationError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|_| ValidationError::InvalidPayload(PayloadDefect::MalformedJson))?;
    validate_payload(store, &payload)
}

/// Extract `(id, answer)` from a JSON object, rejecting wrong types.
pub fn parse_payload(payload: &Value) -> Result<(QuestionId, &str), ValidationError> {
    let object = match payload {
        Value::Object(map) => map,
        Value::Null => return Err(ValidationError::InvalidPayload(PayloadDefect::MalformedJson)),
        _ => return Err(ValidationError::InvalidPayload(PayloadDefect::NotAnObject)),
    };

    let id = match object.get("id") {
        Some(Value::Number(n)) if n.is_i64() => n.as_i64(),
        // Integers beyond i64 are well-typed but can never be configured.
        Some(Value::Number(n)) if n.is_u64() => None,
        // `1.0` and `1e0` are integer values written in float syntax.
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f.fract() == 0.0) => {
            n.as_f64().and_then(integral_float_id)
        }
        _ => return Err(ValidationError::InvalidPayload(PayloadDefect::IdNotInteger)),
    };

    let answer = object
        .get("answer")
        .and_then(Value::as_str)
        .ok_or(ValidationError::InvalidPayload(PayloadDefect::AnswerNotString))?;

    match id {
        Some(id) => Ok((id, answer)),
        None => Err(ValidationError::UnknownQuestion(QuestionId::MAX)),
    }
}

/// `None` when the value lies outside the `QuestionId` range.
fn integral_float_id(f: f64) -> Option<QuestionId> {
    // `QuestionId::MAX as f64` rounds up to 2^63, which is out of range.
    (f >= QuestionId::MIN as f64 && f < QuestionId::MAX as f64).then_some(f as QuestionId)
}
