//! Availability orchestration.
//!
//! [`AvailabilityService::get_availability`] runs one query end to end:
//!
//! 1. resolve the booking context to schedulers
//! 2. resolve the auth token for the first scheduler
//! 3. fetch free time (from the cache when fresh), bounded by the provider timeout
//! 4. on failure, or an empty result when configured, substitute fixture data
//! 5. normalize into day groups in the configured zone
//!
//! Queries never fail. Provider, store and credential problems are logged
//! and turned into `NoData`, `NoMatch` or fixture-backed slots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use clinicslots_core::{Availability, BookingContext, SlotSource, TimeWindow};
use clinicslots_providers::{
    CredentialResolver, ErrorProvider, FixtureDataset, FixtureMatch, FreeTimeProvider,
    FreeTimeRequest, ProviderError, ProviderResult, RawSlot, SlotProvider, normalize_slots,
};

use crate::cache::{FetchKey, SlotCache};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::resolver::{Resolution, ResolutionEngine};
use crate::store::ContentStore;

/// One availability query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub context: BookingContext,
    /// Appointment length; `None` or zero uses the configured default.
    pub duration_minutes: Option<u32>,
    /// Search range; `None` uses now plus the configured number of days.
    pub window: Option<TimeWindow>,
}

impl AvailabilityQuery {
    pub fn new(context: BookingContext) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    /// Builder: set the appointment length.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Builder: set the search range.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }
}

/// Answers availability queries.
pub struct AvailabilityService {
    config: ServiceConfig,
    resolver: ResolutionEngine<dyn ContentStore>,
    credentials: CredentialResolver,
    provider: Arc<dyn SlotProvider>,
    fixture: Option<FixtureDataset>,
    cache: RwLock<SlotCache>,
}

impl std::fmt::Debug for AvailabilityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityService")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .field("credentials", &self.credentials)
            .field("fixture", &self.fixture.is_some())
            .finish_non_exhaustive()
    }
}

impl AvailabilityService {
    /// Creates a service from its parts. The fixture fallback starts empty;
    /// see [`with_fixture`](Self::with_fixture).
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn ContentStore>,
        provider: Arc<dyn SlotProvider>,
        credentials: CredentialResolver,
    ) -> Self {
        let cache = SlotCache::new(config.cache_ttl());
        Self {
            config,
            resolver: ResolutionEngine::new(store),
            credentials,
            provider,
            fixture: None,
            cache: RwLock::new(cache),
        }
    }

    /// Builds a service from configuration.
    ///
    /// Without a provider base URL the service still runs, with every query
    /// taking the fallback path.
    pub fn from_config(
        config: ServiceConfig,
        store: Arc<dyn ContentStore>,
        credentials: CredentialResolver,
    ) -> ServiceResult<Self> {
        config.validate().map_err(ServiceError::config)?;

        let provider: Arc<dyn SlotProvider> = match config.provider.to_freetime_config() {
            Some(freetime) => Arc::new(FreeTimeProvider::new(freetime)?),
            None => {
                warn!("no provider base_url configured; live availability is disabled");
                Arc::new(ErrorProvider::new(
                    FreeTimeProvider::NAME,
                    ProviderError::configuration("provider base_url is not set"),
                ))
            }
        };
        let fixture = config.fixture.load()?;

        let service = Self::new(config, store, provider, credentials);
        Ok(match fixture {
            Some(fixture) => service.with_fixture(fixture),
            None => service,
        })
    }

    /// Enables the fixture fallback with the given dataset.
    pub fn with_fixture(mut self, fixture: FixtureDataset) -> Self {
        self.fixture = Some(fixture);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Answers a query using the current time for the default window.
    pub async fn get_availability(&self, query: AvailabilityQuery) -> Availability {
        self.get_availability_at(query, Utc::now()).await
    }

    /// Answers a query as of `now`.
    pub async fn get_availability_at(
        &self,
        query: AvailabilityQuery,
        now: DateTime<Utc>,
    ) -> Availability {
        let duration = self.effective_duration(query.duration_minutes);
        let window = query
            .window
            .unwrap_or_else(|| TimeWindow::upcoming(now, self.config.default_range_days));

        let ids = match self.resolver.resolve(&query.context).await {
            Resolution::Schedulers(found) => {
                found.into_iter().map(|d| d.scheduler_id).collect::<Vec<_>>()
            }
            Resolution::NoMatch => {
                info!(context = ?query.context, "no scheduler matches the booking context");
                return Availability::NoMatch;
            }
            Resolution::Unresolved => {
                info!(context = ?query.context, "no scheduler could be resolved");
                return Availability::NoData;
            }
        };

        let Some(&first) = ids.first() else {
            return Availability::NoData;
        };
        let Some(token) = self.credentials.resolve(Some(first)) else {
            warn!(scheduler_id = first, "no provider token could be resolved");
            return Availability::NoData;
        };

        let request = FreeTimeRequest::new(first, window, token.value)
            .with_scheduler_ids(ids)
            .with_duration(duration);

        match self.fetch_live(request).await {
            Ok(raw) if !raw.is_empty() => self.slots(SlotSource::Live, &raw, duration),
            Ok(_) if self.fixture.is_none() || !self.config.fixture.on_empty => {
                debug!("provider returned no free slots");
                self.slots(SlotSource::Live, &[], duration)
            }
            Ok(_) => self.fallback(&query.context, duration, "provider returned no slots"),
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.code().as_str(),
                    provider = self.provider.name(),
                    "provider request failed"
                );
                self.fallback(&query.context, duration, "provider request failed")
            }
        }
    }

    fn effective_duration(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(0) => {
                debug!(
                    default = self.config.default_duration_minutes,
                    "zero duration requested, using default"
                );
                self.config.default_duration_minutes
            }
            Some(minutes) => minutes,
            None => self.config.default_duration_minutes,
        }
    }

    /// Fetches from the cache or the provider, bounded by the provider timeout.
    async fn fetch_live(&self, request: FreeTimeRequest) -> ProviderResult<Vec<RawSlot>> {
        let key = FetchKey::for_request(&request);
        if let Some(entry) = self.cache.read().await.get_valid(&key) {
            debug!(
                schedulers = ?key.scheduler_ids,
                fetched_at = %entry.fetched_at,
                age_secs = entry.age().num_seconds(),
                "serving cached slots"
            );
            return Ok(entry.slots.clone());
        }

        let timeout = self.provider.timeout();
        let raw = tokio::time::timeout(timeout, self.provider.fetch_free_slots(request))
            .await
            .map_err(|_| {
                ProviderError::timeout(format!("no response within {}s", timeout.as_secs()))
                    .with_provider(self.provider.name())
            })??;

        if !raw.is_empty() {
            let mut cache = self.cache.write().await;
            cache.evict_expired();
            cache.insert(key, raw.clone());
        }
        Ok(raw)
    }

    fn fallback(&self, context: &BookingContext, duration: u32, reason: &str) -> Availability {
        let Some(fixture) = &self.fixture else {
            debug!(reason, "fixture fallback disabled");
            return Availability::NoData;
        };

        match fixture.slots_for(context) {
            FixtureMatch::Slots(raw) => {
                warn!(
                    source = SlotSource::Fixture.as_str(),
                    reason,
                    slots = raw.len(),
                    "serving fixture availability instead of live data"
                );
                self.slots(SlotSource::Fixture, &raw, duration)
            }
            FixtureMatch::NoMatch => {
                warn!(
                    source = SlotSource::Fixture.as_str(),
                    reason, "fixture has no scheduler for this context"
                );
                Availability::NoData
            }
        }
    }

    fn slots(&self, source: SlotSource, raw: &[RawSlot], duration: u32) -> Availability {
        Availability::Slots {
            source,
            timezone: self.config.timezone.name().to_string(),
            days: normalize_slots(raw, duration, &self.config.timezone),
        }
    }
}
