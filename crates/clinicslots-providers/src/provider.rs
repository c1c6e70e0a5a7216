//! SlotProvider trait definition.
//!
//! This module defines the [`SlotProvider`] trait, the abstraction over
//! scheduling backends that report free appointment time, and the
//! [`FreeTimeRequest`] passed to it.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use clinicslots_core::TimeWindow;

use crate::error::{ProviderError, ProviderResult};
use crate::normalize::DEFAULT_DURATION_MINUTES;
use crate::raw_slot::RawSlot;

/// A free-time query for one or more schedulers.
#[derive(Clone)]
pub struct FreeTimeRequest {
    /// Schedulers to query; usually one.
    pub scheduler_ids: Vec<i64>,
    /// Appointment length in minutes.
    pub duration_minutes: u32,
    /// The range to search.
    pub window: TimeWindow,
    /// Token sent to the provider.
    pub auth_token: String,
}

impl std::fmt::Debug for FreeTimeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeTimeRequest")
            .field("scheduler_ids", &self.scheduler_ids)
            .field("duration_minutes", &self.duration_minutes)
            .field("window", &self.window)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

impl FreeTimeRequest {
    /// Creates a request for a single scheduler with the default duration.
    pub fn new(scheduler_id: i64, window: TimeWindow, auth_token: impl Into<String>) -> Self {
        Self {
            scheduler_ids: vec![scheduler_id],
            duration_minutes: DEFAULT_DURATION_MINUTES,
            window,
            auth_token: auth_token.into(),
        }
    }

    /// Builder method to query several schedulers at once.
    pub fn with_scheduler_ids(mut self, ids: Vec<i64>) -> Self {
        self.scheduler_ids = ids;
        self
    }

    /// Builder method to set the appointment length.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// The `schedulerIDsStr` query value: ids joined with commas.
    pub fn scheduler_ids_param(&self) -> String {
        self.scheduler_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so providers can be swapped
/// behind `Arc<dyn SlotProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core abstraction for scheduling providers.
///
/// # Implementation Notes
///
/// - Implementations should be `Send + Sync` for use in async contexts
/// - Every failure (transport, status, body) is reported as a
///   [`ProviderError`]; callers decide whether to fall back
/// - Requests must be bounded by a timeout
pub trait SlotProvider: Send + Sync {
    /// Returns the name/type of this provider (e.g., "freetime").
    fn name(&self) -> &str;

    /// Fetches free slots for the request's schedulers and window.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, non-success statuses,
    /// malformed bodies, or a response without a `result` array.
    fn fetch_free_slots(
        &self,
        request: FreeTimeRequest,
    ) -> BoxFuture<'_, ProviderResult<Vec<RawSlot>>>;

    /// Upper bound on a single fetch, used by callers for logging.
    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }
}

/// A provider that always returns an error.
///
/// Stands in for a provider that failed to initialize, so the fallback path
/// still runs.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl SlotProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_free_slots(
        &self,
        _request: FreeTimeRequest,
    ) -> BoxFuture<'_, ProviderResult<Vec<RawSlot>>> {
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}
