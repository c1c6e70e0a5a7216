//! Raw slot type from scheduling providers.
//!
//! This module defines [`RawSlot`], one offered appointment instant as it
//! comes from the provider's free-time endpoint, and [`FreeTimeEnvelope`],
//! the response wrapper around a batch of them.
//!
//! Both are deserialized leniently: a slot with a missing or malformed `from`
//! still parses, and is dropped later during normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicslots_core::{format_instant, parse_instant};

/// The `code` value the provider uses for a successful response.
pub const SUCCESS_CODE: &str = "Success";

/// One offered appointment instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSlot {
    /// Start instant as sent by the provider (ISO-8601, usually `...000Z`).
    #[serde(default)]
    pub from: Option<String>,

    /// The scheduler this slot belongs to.
    #[serde(rename = "schedulerID", default)]
    pub scheduler_id: Option<i64>,
}

impl RawSlot {
    /// Creates a raw slot from a UTC instant.
    pub fn new(from: DateTime<Utc>, scheduler_id: i64) -> Self {
        Self {
            from: Some(format_instant(from)),
            scheduler_id: Some(scheduler_id),
        }
    }

    /// Creates a raw slot from an unparsed string.
    pub fn from_raw(from: impl Into<String>, scheduler_id: i64) -> Self {
        Self {
            from: Some(from.into()),
            scheduler_id: Some(scheduler_id),
        }
    }

    /// Returns the parsed start instant, or `None` if missing or unparseable.
    pub fn parsed_from(&self) -> Option<DateTime<Utc>> {
        self.from.as_deref().and_then(parse_instant)
    }

    /// Returns true if the slot belongs to one of the given schedulers.
    pub fn belongs_to(&self, scheduler_ids: &[i64]) -> bool {
        self.scheduler_id
            .is_some_and(|id| scheduler_ids.contains(&id))
    }
}

/// The provider's response envelope.
///
/// `result` is the only field the gateway depends on; a non-success `code`
/// with a present `result` is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTimeEnvelope {
    /// Provider status code, `"Success"` when healthy.
    #[serde(default)]
    pub code: Option<String>,

    /// Provider error message, if any.
    #[serde(default)]
    pub error: Option<String>,

    /// The free slots.
    #[serde(default)]
    pub result: Option<Vec<RawSlot>>,
}

impl FreeTimeEnvelope {
    /// Creates a successful envelope around slots.
    pub fn success(result: Vec<RawSlot>) -> Self {
        Self {
            code: Some(SUCCESS_CODE.to_string()),
            error: None,
            result: Some(result),
        }
    }

    /// Returns true if the provider reported success.
    pub fn is_success(&self) -> bool {
        self.code.as_deref() == Some(SUCCESS_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_provider_shape() {
        let json = r#"{
            "code": "Success",
            "error": null,
            "result": [
                {"from": "2025-12-28T09:00:00.000Z", "schedulerID": 7},
                {"from": "2025-12-28T09:30:00.000Z", "schedulerID": 7}
            ]
        }"#;

        let envelope: FreeTimeEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.is_success());
        let result = envelope.result.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].scheduler_id, Some(7));
        assert_eq!(
            result[0].parsed_from(),
            Some(Utc.with_ymd_and_hms(2025, 12, 28, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn tolerates_missing_fields() {
        let json = r#"{"result": [{"schedulerID": 7}, {"from": "not a date"}, {}]}"#;
        let envelope: FreeTimeEnvelope = serde_json::from_str(json).unwrap();
        assert!(!envelope.is_success());

        let result = envelope.result.unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|s| s.parsed_from().is_none()));
        assert_eq!(result[1].scheduler_id, None);
    }

    #[test]
    fn missing_result_is_none() {
        let envelope: FreeTimeEnvelope =
            serde_json::from_str(r#"{"code": "Error", "error": "bad scheduler"}"#).unwrap();
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error.as_deref(), Some("bad scheduler"));
    }

    #[test]
    fn new_formats_millis() {
        let slot = RawSlot::new(Utc.with_ymd_and_hms(2025, 12, 28, 9, 0, 0).unwrap(), 7);
        assert_eq!(slot.from.as_deref(), Some("2025-12-28T09:00:00.000Z"));
        assert!(slot.belongs_to(&[3, 7]));
        assert!(!slot.belongs_to(&[3]));
    }
}
