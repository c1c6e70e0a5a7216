//! Development fixture dataset.
//!
//! When the live provider is unreachable, the availability service serves
//! slots from a static dataset instead. The dataset has two parts:
//!
//! - a free-time envelope `{ "result": [RawSlot, ...] }`
//! - a scheduler metadata list `[{ id, doctor_id, clinic_id, treatment_type }]`
//!   used to pre-filter the slots by booking context
//!
//! A copy is compiled into the crate; deployments may point at their own files.
//! Fixture data is a degraded path and callers must label it as such.
//!
//! The bundled slots carry fixed dates (late December 2025) and are not kept
//! current. They are served as-is whatever the query window, so a fallback
//! response may list dates in the past.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use clinicslots_core::{BookingContext, SchedulerDescriptor, context::lenient};

use crate::raw_slot::{FreeTimeEnvelope, RawSlot};

const BUNDLED_SLOTS: &str = include_str!("../fixtures/free_time.json");
const BUNDLED_SCHEDULERS: &str = include_str!("../fixtures/schedulers.json");

/// Errors loading a fixture dataset.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A fixture file could not be read.
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixture document was not valid JSON of the expected shape.
    #[error("invalid {what} fixture: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry of the scheduler metadata list.
///
/// Ids may be numbers or strings; `treatment_type` may be a single string or
/// a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerRecord {
    #[serde(deserialize_with = "lenient::int_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::id")]
    pub doctor_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub clinic_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub treatment_type: Vec<String>,
}

impl SchedulerRecord {
    /// Converts the record into a scheduler descriptor.
    pub fn to_descriptor(&self) -> SchedulerDescriptor {
        let mut descriptor =
            SchedulerDescriptor::new(self.id).with_treatment_types(self.treatment_type.iter().cloned());
        descriptor.doctor_id = self.doctor_id.clone();
        descriptor.clinic_id = self.clinic_id.clone();
        descriptor
    }

    /// Returns true if every non-empty field of the context matches.
    pub fn matches(&self, context: &BookingContext) -> bool {
        self.to_descriptor().matches(context)
    }
}

/// Parses a scheduler metadata list.
pub fn parse_records(json: &str) -> Result<Vec<SchedulerRecord>, FixtureError> {
    serde_json::from_str(json).map_err(|source| FixtureError::Parse {
        what: "scheduler",
        source,
    })
}

/// Returns the records matching the context.
///
/// An empty context returns every record.
pub fn filter_records<'a>(
    records: &'a [SchedulerRecord],
    context: &BookingContext,
) -> Vec<&'a SchedulerRecord> {
    if context.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| r.matches(context)).collect()
}

/// Outcome of filtering the fixture by booking context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureMatch {
    /// Slots belonging to the matching schedulers; may be empty if those
    /// schedulers have no fixture slots.
    Slots(Vec<RawSlot>),
    /// No scheduler record satisfied the context.
    NoMatch,
}

/// A static slot dataset plus the scheduler metadata that scopes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureDataset {
    pub slots: Vec<RawSlot>,
    pub schedulers: Vec<SchedulerRecord>,
}

impl FixtureDataset {
    /// Returns the dataset compiled into the crate.
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(BUNDLED_SLOTS, BUNDLED_SCHEDULERS)
    }

    /// Parses a dataset from its two JSON documents.
    ///
    /// An envelope without `result` yields an empty slot list.
    pub fn from_json(slots_json: &str, schedulers_json: &str) -> Result<Self, FixtureError> {
        let envelope: FreeTimeEnvelope =
            serde_json::from_str(slots_json).map_err(|source| FixtureError::Parse {
                what: "slot",
                source,
            })?;
        Ok(Self {
            slots: envelope.result.unwrap_or_default(),
            schedulers: parse_records(schedulers_json)?,
        })
    }

    /// Loads a dataset from files.
    pub fn load(slots_path: &Path, schedulers_path: &Path) -> Result<Self, FixtureError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let dataset = Self::from_json(&read(slots_path)?, &read(schedulers_path)?)?;
        debug!(
            slots = dataset.slots.len(),
            schedulers = dataset.schedulers.len(),
            path = %slots_path.display(),
            "loaded fixture dataset"
        );
        Ok(dataset)
    }

    /// Returns the fixture slots for schedulers matching the context.
    ///
    /// An empty context returns every slot.
    pub fn slots_for(&self, context: &BookingContext) -> FixtureMatch {
        if context.is_empty() {
            return FixtureMatch::Slots(self.slots.clone());
        }

        let ids: Vec<i64> = filter_records(&self.schedulers, context)
            .into_iter()
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            return FixtureMatch::NoMatch;
        }

        FixtureMatch::Slots(
            self.slots
                .iter()
                .filter(|s| s.belongs_to(&ids))
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> FixtureDataset {
        FixtureDataset::bundled().unwrap()
    }

    mod records {
        use super::*;

        #[test]
        fn parses_mixed_id_shapes() {
            let records = parse_records(
                r#"[
                    {"id": "11", "doctor_id": 12, "clinic_id": " 5 ", "treatment_type": "checkup"},
                    {"id": 4}
                ]"#,
            )
            .unwrap();

            assert_eq!(records[0].id, 11);
            assert_eq!(records[0].doctor_id.as_deref(), Some("12"));
            assert_eq!(records[0].clinic_id.as_deref(), Some("5"));
            assert_eq!(records[0].treatment_type, vec!["checkup"]);
            assert_eq!(records[1].doctor_id, None);
            assert!(records[1].treatment_type.is_empty());
        }

        #[test]
        fn rejects_non_numeric_scheduler_id() {
            let err = parse_records(r#"[{"id": "seven"}]"#).unwrap_err();
            assert!(matches!(err, FixtureError::Parse { what: "scheduler", .. }));
        }

        #[test]
        fn filter_by_doctor_keeps_only_that_doctor() {
            let records = dataset().schedulers;
            let ctx = BookingContext::new().with_doctor("12");
            let ids: Vec<_> = filter_records(&records, &ctx).iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![7, 11]);
        }

        #[test]
        fn empty_context_returns_everything() {
            let records = dataset().schedulers;
            assert_eq!(filter_records(&records, &BookingContext::new()).len(), records.len());
        }

        #[test]
        fn combined_fields_must_all_match() {
            let records = dataset().schedulers;
            let ctx = BookingContext::new().with_doctor("12").with_clinic("5");
            let ids: Vec<_> = filter_records(&records, &ctx).iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![11]);

            let ctx = BookingContext::new().with_clinic("3").with_treatment("Whitening");
            assert!(filter_records(&records, &ctx).is_empty());
        }
    }

    mod dataset {
        use super::*;

        #[test]
        fn bundled_dataset_loads() {
            let data = dataset();
            assert!(!data.slots.is_empty());
            assert_eq!(data.schedulers.len(), 3);
        }

        #[test]
        fn slots_scoped_to_matching_schedulers() {
            let ctx = BookingContext::new().with_treatment("whitening");
            let FixtureMatch::Slots(slots) = dataset().slots_for(&ctx) else {
                panic!("expected slots");
            };
            assert!(!slots.is_empty());
            assert!(slots.iter().all(|s| s.scheduler_id == Some(9)));
        }

        #[test]
        fn explicit_scheduler_id_scopes_slots() {
            let ctx = BookingContext::new().with_scheduler(11);
            let FixtureMatch::Slots(slots) = dataset().slots_for(&ctx) else {
                panic!("expected slots");
            };
            assert_eq!(slots.len(), 2);
        }

        #[test]
        fn unmatched_context_is_no_match() {
            let ctx = BookingContext::new().with_doctor("999");
            assert_eq!(dataset().slots_for(&ctx), FixtureMatch::NoMatch);
        }

        #[test]
        fn matched_scheduler_without_slots_is_empty_not_no_match() {
            let data = FixtureDataset::from_json(
                r#"{"result": []}"#,
                r#"[{"id": 1, "doctor_id": 2}]"#,
            )
            .unwrap();
            let ctx = BookingContext::new().with_doctor("2");
            assert_eq!(data.slots_for(&ctx), FixtureMatch::Slots(vec![]));
        }

        #[test]
        fn envelope_without_result_is_empty() {
            let data = FixtureDataset::from_json(r#"{"code": "Error"}"#, "[]").unwrap();
            assert!(data.slots.is_empty());
        }

        #[test]
        fn load_reads_files() {
            let dir = tempfile::tempdir().unwrap();
            let slots = dir.path().join("slots.json");
            let schedulers = dir.path().join("schedulers.json");
            std::fs::write(&slots, r#"{"result": [{"from": "2025-12-28T09:00:00.000Z", "schedulerID": 1}]}"#).unwrap();
            std::fs::write(&schedulers, r#"[{"id": 1}]"#).unwrap();

            let data = FixtureDataset::load(&slots, &schedulers).unwrap();
            assert_eq!(data.slots.len(), 1);
        }

        #[test]
        fn load_reports_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("nope.json");
            let err = FixtureDataset::load(&missing, &missing).unwrap_err();
            assert!(matches!(err, FixtureError::Io { .. }));
        }
    }
}
