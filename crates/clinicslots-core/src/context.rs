//! Booking context and scheduler identity.
//!
//! A [`BookingContext`] is what the caller knows about the appointment it
//! wants to book (doctor, clinic, treatment type, or an explicit scheduler).
//! A [`SchedulerDescriptor`] is a resolved provider calendar with the
//! doctor/clinic/treatment combination it serves.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Compares two identifiers after normalization.
///
/// Identifiers are compared numerically when both sides parse as integers
/// (so `"07"` matches `7`), and as trimmed strings otherwise.
pub fn ids_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// What the caller knows about the appointment being booked.
///
/// Absent or blank fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingContext {
    /// Doctor identifier.
    pub doctor_id: Option<String>,
    /// Clinic identifier.
    pub clinic_id: Option<String>,
    /// Treatment type name (case-sensitive).
    pub treatment_type: Option<String>,
    /// Explicit scheduler, bypassing relation lookups.
    pub scheduler_id: Option<i64>,
}

impl BookingContext {
    /// Creates an empty (unconstrained) context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the doctor.
    pub fn with_doctor(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    /// Builder method to set the clinic.
    pub fn with_clinic(mut self, clinic_id: impl Into<String>) -> Self {
        self.clinic_id = Some(clinic_id.into());
        self
    }

    /// Builder method to set the treatment type.
    pub fn with_treatment(mut self, treatment_type: impl Into<String>) -> Self {
        self.treatment_type = Some(treatment_type.into());
        self
    }

    /// Builder method to set an explicit scheduler.
    pub fn with_scheduler(mut self, scheduler_id: i64) -> Self {
        self.scheduler_id = Some(scheduler_id);
        self
    }

    /// The doctor constraint, if any.
    pub fn doctor(&self) -> Option<&str> {
        non_blank(&self.doctor_id)
    }

    /// The clinic constraint, if any.
    pub fn clinic(&self) -> Option<&str> {
        non_blank(&self.clinic_id)
    }

    /// The treatment constraint, if any.
    pub fn treatment(&self) -> Option<&str> {
        non_blank(&self.treatment_type)
    }

    /// Returns true if no field constrains the search.
    pub fn is_empty(&self) -> bool {
        self.doctor().is_none()
            && self.clinic().is_none()
            && self.treatment().is_none()
            && self.scheduler_id.is_none()
    }
}

/// A resolved scheduler and the booking combination it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerDescriptor {
    /// Provider scheduler (calendar) identifier.
    pub scheduler_id: i64,
    /// Doctor served by this scheduler.
    pub doctor_id: Option<String>,
    /// Clinic hosting this scheduler.
    pub clinic_id: Option<String>,
    /// Treatment types this scheduler accepts.
    #[serde(default)]
    pub treatment_types: BTreeSet<String>,
    /// Identifier of the credentials record used for this scheduler, if any.
    pub source_credentials_id: Option<String>,
}

impl SchedulerDescriptor {
    /// Creates a descriptor with only a scheduler id.
    pub fn new(scheduler_id: i64) -> Self {
        Self {
            scheduler_id,
            doctor_id: None,
            clinic_id: None,
            treatment_types: BTreeSet::new(),
            source_credentials_id: None,
        }
    }

    /// Builder method to set the doctor.
    pub fn with_doctor(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    /// Builder method to set the clinic.
    pub fn with_clinic(mut self, clinic_id: impl Into<String>) -> Self {
        self.clinic_id = Some(clinic_id.into());
        self
    }

    /// Builder method to set the treatment allow-list.
    pub fn with_treatment_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.treatment_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the credentials record.
    pub fn with_credentials_id(mut self, id: impl Into<String>) -> Self {
        self.source_credentials_id = Some(id.into());
        self
    }

    /// Returns true if this scheduler accepts the treatment type.
    pub fn accepts_treatment(&self, treatment_type: &str) -> bool {
        self.treatment_types.contains(treatment_type)
    }

    /// Returns true if every constraint present in the context holds.
    pub fn matches(&self, context: &BookingContext) -> bool {
        if let Some(id) = context.scheduler_id
            && id != self.scheduler_id
        {
            return false;
        }
        if let Some(doctor) = context.doctor()
            && !self.doctor_id.as_deref().is_some_and(|d| ids_match(d, doctor))
        {
            return false;
        }
        if let Some(clinic) = context.clinic()
            && !self.clinic_id.as_deref().is_some_and(|c| ids_match(c, clinic))
        {
            return false;
        }
        if let Some(treatment) = context.treatment()
            && !self.accepts_treatment(treatment)
        {
            return false;
        }
        true
    }
}

/// Serde helpers for identifiers that arrive as numbers or strings.
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(i64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListRepr {
        One(String),
        Many(Vec<String>),
    }

    /// Reads an optional id given as a number or a string.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<IdRepr>::deserialize(deserializer)?.and_then(|repr| match repr {
            IdRepr::Int(n) => Some(n.to_string()),
            IdRepr::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }))
    }

    /// Reads a required integer id given as a number or a numeric string.
    pub fn int_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match IdRepr::deserialize(deserializer)? {
            IdRepr::Int(n) => Ok(n),
            IdRepr::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid numeric id: {s}"))),
        }
    }

    /// Reads a string-or-list field into a list, skipping blanks.
    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let items = match Option::<ListRepr>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(ListRepr::One(s)) => vec![s],
            Some(ListRepr::Many(v)) => v,
        };
        Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SchedulerDescriptor {
        SchedulerDescriptor::new(7)
            .with_doctor("12")
            .with_clinic("3")
            .with_treatment_types(["checkup", "cleaning"])
    }

    #[test]
    fn ids_compare_numerically() {
        assert!(ids_match("7", "7"));
        assert!(ids_match("007", "7"));
        assert!(ids_match(" 7 ", "7"));
        assert!(!ids_match("7", "8"));
        assert!(ids_match("abc", "abc"));
        assert!(!ids_match("abc", "ABC"));
    }

    #[test]
    fn blank_fields_are_wildcards() {
        let ctx = BookingContext::new().with_doctor("  ").with_treatment("");
        assert!(ctx.is_empty());
        assert!(ctx.doctor().is_none());
        assert!(descriptor().matches(&ctx));
    }

    #[test]
    fn matches_present_fields() {
        let d = descriptor();
        assert!(d.matches(&BookingContext::new().with_doctor("12")));
        assert!(d.matches(&BookingContext::new().with_clinic("03")));
        assert!(d.matches(&BookingContext::new().with_doctor("12").with_clinic("3")));
        assert!(!d.matches(&BookingContext::new().with_doctor("13")));
        assert!(!d.matches(&BookingContext::new().with_doctor("12").with_clinic("4")));
    }

    #[test]
    fn treatment_is_allow_list_membership() {
        let d = descriptor();
        assert!(d.matches(&BookingContext::new().with_treatment("cleaning")));
        assert!(!d.matches(&BookingContext::new().with_treatment("Cleaning")));
        assert!(!d.matches(&BookingContext::new().with_treatment("surgery")));
    }

    #[test]
    fn explicit_scheduler_must_match() {
        let d = descriptor();
        assert!(d.matches(&BookingContext::new().with_scheduler(7)));
        assert!(!d.matches(&BookingContext::new().with_scheduler(8)));
    }

    #[test]
    fn missing_descriptor_field_fails_constraint() {
        let d = SchedulerDescriptor::new(9);
        assert!(!d.matches(&BookingContext::new().with_doctor("12")));
        assert!(d.matches(&BookingContext::new()));
    }

    #[test]
    fn lenient_ids_and_lists() {
        #[derive(Deserialize)]
        struct Record {
            #[serde(deserialize_with = "lenient::int_id")]
            id: i64,
            #[serde(default, deserialize_with = "lenient::id")]
            doctor_id: Option<String>,
            #[serde(default, deserialize_with = "lenient::list")]
            treatment_type: Vec<String>,
        }

        let r: Record =
            serde_json::from_str(r#"{"id": "7", "doctor_id": 12, "treatment_type": "checkup"}"#)
                .unwrap();
        assert_eq!(r.id, 7);
        assert_eq!(r.doctor_id.as_deref(), Some("12"));
        assert_eq!(r.treatment_type, vec!["checkup"]);

        let r: Record = serde_json::from_str(
            r#"{"id": 8, "doctor_id": "", "treatment_type": ["a", " ", "b"]}"#,
        )
        .unwrap();
        assert_eq!(r.id, 8);
        assert!(r.doctor_id.is_none());
        assert_eq!(r.treatment_type, vec!["a", "b"]);

        let r: Record = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert!(r.doctor_id.is_none());
        assert!(r.treatment_type.is_empty());
    }
}
