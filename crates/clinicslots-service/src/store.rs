//! Content store access.
//!
//! The content store owns doctors, clinics and schedulers and the relations
//! between them. The service only needs three lookups, captured by the
//! [`ContentStore`] trait.

use std::path::Path;

use tracing::debug;

use clinicslots_core::{SchedulerDescriptor, ids_match};
use clinicslots_providers::BoxFuture;
use clinicslots_providers::fixture::{SchedulerRecord, parse_records};

use crate::error::StoreResult;

/// Relation lookups against the system of record.
pub trait ContentStore: Send + Sync {
    /// Schedulers related to a clinic.
    fn schedulers_by_clinic<'a>(
        &'a self,
        clinic_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<SchedulerDescriptor>>>;

    /// Schedulers related to a doctor.
    fn schedulers_by_doctor<'a>(
        &'a self,
        doctor_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<SchedulerDescriptor>>>;

    /// Treatment types a scheduler accepts.
    fn treatment_allow_list(&self, scheduler_id: i64) -> BoxFuture<'_, StoreResult<Vec<String>>>;
}

/// An in-memory store built from scheduler records.
#[derive(Debug, Clone, Default)]
pub struct StaticContentStore {
    schedulers: Vec<SchedulerDescriptor>,
}

impl StaticContentStore {
    pub fn new(schedulers: Vec<SchedulerDescriptor>) -> Self {
        Self { schedulers }
    }

    /// Builds a store from scheduler metadata records.
    pub fn from_records(records: &[SchedulerRecord]) -> Self {
        Self::new(records.iter().map(SchedulerRecord::to_descriptor).collect())
    }

    /// Parses a JSON list of `{id, doctor_id, clinic_id, treatment_type}`.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let records = parse_records(json)?;
        Ok(Self::from_records(&records))
    }

    /// Loads a store from a JSON file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        debug!(path = %path.display(), schedulers = store.len(), "loaded content store");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.schedulers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedulers.is_empty()
    }

    fn select(&self, pred: impl Fn(&SchedulerDescriptor) -> bool) -> Vec<SchedulerDescriptor> {
        self.schedulers.iter().filter(|d| pred(d)).cloned().collect()
    }
}

impl ContentStore for StaticContentStore {
    fn schedulers_by_clinic<'a>(
        &'a self,
        clinic_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<SchedulerDescriptor>>> {
        let found = self.select(|d| d.clinic_id.as_deref().is_some_and(|c| ids_match(c, clinic_id)));
        Box::pin(async move { Ok(found) })
    }

    fn schedulers_by_doctor<'a>(
        &'a self,
        doctor_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Vec<SchedulerDescriptor>>> {
        let found = self.select(|d| d.doctor_id.as_deref().is_some_and(|c| ids_match(c, doctor_id)));
        Box::pin(async move { Ok(found) })
    }

    fn treatment_allow_list(&self, scheduler_id: i64) -> BoxFuture<'_, StoreResult<Vec<String>>> {
        let list = self
            .schedulers
            .iter()
            .filter(|d| d.scheduler_id == scheduler_id)
            .flat_map(|d| d.treatment_types.iter().cloned())
            .collect();
        Box::pin(async move { Ok(list) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    const RECORDS: &str = r#"[
        {"id": 7, "doctor_id": 12, "clinic_id": 3, "treatment_type": ["checkup", "cleaning"]},
        {"id": 9, "doctor_id": "15", "clinic_id": "3", "treatment_type": "whitening"},
        {"id": 11, "doctor_id": 12, "clinic_id": 5}
    ]"#;

    fn store() -> StaticContentStore {
        StaticContentStore::from_json(RECORDS).unwrap()
    }

    fn ids(found: Vec<SchedulerDescriptor>) -> Vec<i64> {
        found.into_iter().map(|d| d.scheduler_id).collect()
    }

    #[tokio::test]
    async fn lookups_by_clinic_and_doctor() {
        let store = store();
        assert_eq!(ids(store.schedulers_by_clinic("3").await.unwrap()), vec![7, 9]);
        assert_eq!(ids(store.schedulers_by_clinic("003").await.unwrap()), vec![7, 9]);
        assert_eq!(ids(store.schedulers_by_doctor("12").await.unwrap()), vec![7, 11]);
        assert!(store.schedulers_by_doctor("99").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn allow_list() {
        let store = store();
        assert_eq!(
            store.treatment_allow_list(7).await.unwrap(),
            vec!["checkup".to_string(), "cleaning".to_string()]
        );
        assert!(store.treatment_allow_list(11).await.unwrap().is_empty());
        assert!(store.treatment_allow_list(404).await.unwrap().is_empty());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(
            StaticContentStore::from_json("{"),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedulers.json");
        std::fs::write(&path, RECORDS).unwrap();

        let store = StaticContentStore::load(&path).unwrap();
        assert_eq!(store.len(), 3);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            StaticContentStore::load(&missing),
            Err(StoreError::Io(_))
        ));
    }
}
