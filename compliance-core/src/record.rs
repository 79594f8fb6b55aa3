//! Communication Record
//!
//! Input side of the engine. Records are read leniently from JSON:
//! a wrong-typed field falls back to its default instead of failing
//! the whole record. Only a non-object body or non-text `content`
//! makes a record unparseable.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("communication must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("`content` must be text, got {0}")]
    InvalidContent(&'static str),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// TIME SENT
// ============================================================================

/// Local time of day the communication went out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSent {
    /// Not supplied; the calling-hours check is skipped
    #[default]
    Absent,
    Known(NaiveTime),
    /// Supplied but not `HH:MM[:SS]`; kept verbatim for the violation message
    Unreadable(String),
}

impl TimeSent {
    /// `Known` time at `hour:minute`, `Absent` if out of range
    pub fn at(hour: u32, minute: u32) -> Self {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(TimeSent::Known)
            .unwrap_or_default()
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// Metadata and text of one outbound communication
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunicationRecord {
    /// Caller-chosen identifier, echoed back in batch results
    pub id: Option<String>,
    pub content: String,
    pub consent_obtained: bool,
    pub opt_out_available: bool,
    pub time_sent: TimeSent,
    pub debt_validation_notice_given: bool,
    pub harassment_indicators_present: bool,
    pub third_party_disclosure: bool,
    pub consumer_protection_measures_present: bool,
    pub unfair_practices_present: bool,
}

impl CommunicationRecord {
    /// A record with every safeguard in place, sent at 14:30.
    /// Handy as a baseline that individual fields are flipped against.
    pub fn fully_compliant(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            consent_obtained: true,
            opt_out_available: true,
            time_sent: TimeSent::at(14, 30),
            debt_validation_notice_given: true,
            harassment_indicators_present: false,
            third_party_disclosure: false,
            consumer_protection_measures_present: true,
            unfair_practices_present: false,
        }
    }

    /// Read a record from an arbitrary JSON value, coercing field by field
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RecordError::NotAnObject(json_kind(value)))?;

        let content = match obj.get("content") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(RecordError::InvalidContent(json_kind(other))),
        };

        Ok(Self {
            id: obj.get("id").and_then(coerce_id),
            content,
            consent_obtained: flag(obj, "consentObtained"),
            opt_out_available: flag(obj, "optOutAvailable"),
            time_sent: obj.get("timeSent").map(coerce_time_sent).unwrap_or_default(),
            debt_validation_notice_given: flag(obj, "debtValidationNoticeGiven"),
            harassment_indicators_present: flag(obj, "harassmentIndicatorsPresent"),
            third_party_disclosure: flag(obj, "thirdPartyDisclosure"),
            consumer_protection_measures_present: flag(obj, "consumerProtectionMeasuresPresent"),
            unfair_practices_present: flag(obj, "unfairPracticesPresent"),
        })
    }
}

// ============================================================================
// FIELD COERCION
// ============================================================================

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(value) => coerce_bool(value),
        None => false,
    }
}

/// JSON booleans pass through, "true"/"false" strings are accepted,
/// everything else is `false`
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Parse `HH:MM` or `HH:MM:SS`
pub fn coerce_time(value: &Value) -> Option<NaiveTime> {
    let raw = value.as_str()?.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Null counts as absent; any other value that doesn't parse is unreadable
pub fn coerce_time_sent(value: &Value) -> TimeSent {
    match value {
        Value::Null => TimeSent::Absent,
        other => match coerce_time(other) {
            Some(time) => TimeSent::Known(time),
            None => TimeSent::Unreadable(match other {
                Value::String(s) => s.clone(),
                _ => other.to_string(),
            }),
        },
    }
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
