//! Booking context to scheduler resolution.
//!
//! The engine turns a [`BookingContext`] into the schedulers to query:
//!
//! 1. An explicit scheduler id is used directly (only the treatment type is
//!    still checked against its allow-list).
//! 2. Otherwise schedulers are looked up by clinic and/or doctor. When both
//!    are given, only schedulers related to both survive.
//! 3. Candidates are matched against the context and, when a treatment type
//!    is requested, against their treatment allow-list.
//!
//! Store failures never propagate; they are logged and the lookup counts as
//! empty.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use tracing::{debug, warn};

use clinicslots_core::{BookingContext, SchedulerDescriptor};

use crate::error::StoreResult;
use crate::store::ContentStore;

/// Outcome of resolving a booking context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Schedulers to query, ordered by id.
    Schedulers(Vec<SchedulerDescriptor>),
    /// Candidates existed but the context filtered all of them away.
    NoMatch,
    /// Nothing could be resolved from the context.
    Unresolved,
}

impl Resolution {
    /// Returns the resolved scheduler ids, if any.
    pub fn scheduler_ids(&self) -> Vec<i64> {
        match self {
            Self::Schedulers(found) => found.iter().map(|d| d.scheduler_id).collect(),
            _ => Vec::new(),
        }
    }
}

/// Resolves booking contexts against a content store.
pub struct ResolutionEngine<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> std::fmt::Debug for ResolutionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine").finish_non_exhaustive()
    }
}

impl<S: ?Sized> Clone for ResolutionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ContentStore + ?Sized> ResolutionEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves the context to schedulers.
    pub async fn resolve(&self, context: &BookingContext) -> Resolution {
        if let Some(id) = context.scheduler_id {
            return self.resolve_explicit(id, context).await;
        }

        let clinic = context.clinic();
        let doctor = context.doctor();
        if clinic.is_none() && doctor.is_none() {
            debug!("context names no clinic, doctor or scheduler");
            return Resolution::Unresolved;
        }

        let by_clinic = match clinic {
            Some(id) => Some(lookup(
                Relation::Clinic,
                id,
                self.store.schedulers_by_clinic(id).await,
            )),
            None => None,
        };
        let by_doctor = match doctor {
            Some(id) => Some(lookup(
                Relation::Doctor,
                id,
                self.store.schedulers_by_doctor(id).await,
            )),
            None => None,
        };

        let candidates = match (by_clinic, by_doctor) {
            (Some(c), Some(d)) => {
                if c.is_empty() && d.is_empty() {
                    return Resolution::Unresolved;
                }
                intersect(c, d)
            }
            (Some(only), None) | (None, Some(only)) => {
                if only.is_empty() {
                    return Resolution::Unresolved;
                }
                only
            }
            (None, None) => return Resolution::Unresolved,
        };

        let mut matched = Vec::new();
        for descriptor in candidates.into_values() {
            if let Some(descriptor) = self.check_treatment(descriptor, context).await
                && descriptor.matches(context)
            {
                matched.push(descriptor);
            }
        }

        if matched.is_empty() {
            debug!(?context, "context filtered every candidate scheduler");
            Resolution::NoMatch
        } else {
            debug!(count = matched.len(), "resolved schedulers");
            Resolution::Schedulers(matched)
        }
    }

    async fn resolve_explicit(&self, id: i64, context: &BookingContext) -> Resolution {
        let descriptor = SchedulerDescriptor::new(id);
        match self.check_treatment(descriptor, context).await {
            Some(descriptor) => Resolution::Schedulers(vec![descriptor]),
            None => Resolution::NoMatch,
        }
    }

    /// Fills in the allow-list from the store when needed and returns the
    /// descriptor if it accepts the requested treatment.
    async fn check_treatment(
        &self,
        mut descriptor: SchedulerDescriptor,
        context: &BookingContext,
    ) -> Option<SchedulerDescriptor> {
        let Some(treatment) = context.treatment() else {
            return Some(descriptor);
        };

        if descriptor.treatment_types.is_empty() {
            match self.store.treatment_allow_list(descriptor.scheduler_id).await {
                Ok(list) => descriptor.treatment_types.extend(list),
                Err(e) => warn!(
                    error = %e,
                    scheduler_id = descriptor.scheduler_id,
                    "treatment allow-list lookup failed, treating as empty"
                ),
            }
        }

        descriptor.accepts_treatment(treatment).then_some(descriptor)
    }
}

#[derive(Debug, Clone, Copy)]
enum Relation {
    Clinic,
    Doctor,
}

impl Relation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Clinic => "clinic",
            Self::Doctor => "doctor",
        }
    }
}

/// Indexes lookup results by scheduler id, recording the relation that
/// found them.
fn lookup(
    relation: Relation,
    id: &str,
    result: StoreResult<Vec<SchedulerDescriptor>>,
) -> BTreeMap<i64, SchedulerDescriptor> {
    match result {
        Ok(found) => {
            debug!(relation = relation.as_str(), id, count = found.len(), "scheduler lookup");
            let mut by_id = BTreeMap::new();
            for mut descriptor in found {
                let field = match relation {
                    Relation::Clinic => &mut descriptor.clinic_id,
                    Relation::Doctor => &mut descriptor.doctor_id,
                };
                if field.is_none() {
                    *field = Some(id.to_string());
                }
                match by_id.entry(descriptor.scheduler_id) {
                    Entry::Occupied(mut existing) => merge(existing.get_mut(), &descriptor),
                    Entry::Vacant(slot) => {
                        slot.insert(descriptor);
                    }
                }
            }
            by_id
        }
        Err(e) => {
            warn!(
                error = %e,
                relation = relation.as_str(),
                id,
                "scheduler lookup failed, treating as empty"
            );
            BTreeMap::new()
        }
    }
}

/// Keeps schedulers present in both maps, merging what each side knows.
fn intersect(
    mut left: BTreeMap<i64, SchedulerDescriptor>,
    right: BTreeMap<i64, SchedulerDescriptor>,
) -> BTreeMap<i64, SchedulerDescriptor> {
    left.retain(|id, _| right.contains_key(id));
    for (id, descriptor) in &mut left {
        if let Some(other) = right.get(id) {
            merge(descriptor, other);
        }
    }
    left
}

fn merge(into: &mut SchedulerDescriptor, other: &SchedulerDescriptor) {
    if into.doctor_id.is_none() {
        into.doctor_id.clone_from(&other.doctor_id);
    }
    if into.clinic_id.is_none() {
        into.clinic_id.clone_from(&other.clinic_id);
    }
    if into.source_credentials_id.is_none() {
        into.source_credentials_id
            .clone_from(&other.source_credentials_id);
    }
    into.treatment_types
        .extend(other.treatment_types.iter().cloned());
}
