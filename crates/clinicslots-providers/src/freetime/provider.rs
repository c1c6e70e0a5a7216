//! Free-time provider implementation.
//!
//! This module implements the [`SlotProvider`] trait over the HTTP
//! [`FreeTimeClient`].

use std::time::Duration;

use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, FreeTimeRequest, SlotProvider};
use crate::raw_slot::RawSlot;

use super::client::FreeTimeClient;
use super::config::FreeTimeConfig;

/// Provider backed by the `Scheduler/GetFreeTime` HTTP endpoint.
#[derive(Debug, Clone)]
pub struct FreeTimeProvider {
    client: FreeTimeClient,
    timeout: Duration,
}

impl FreeTimeProvider {
    /// Provider name used in errors and logs.
    pub const NAME: &'static str = "freetime";

    /// Creates a provider, validating the configuration first.
    pub fn new(config: FreeTimeConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_provider(Self::NAME))?;
        let client = FreeTimeClient::new(&config).map_err(|e| e.with_provider(Self::NAME))?;
        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    async fn fetch(&self, request: FreeTimeRequest) -> ProviderResult<Vec<RawSlot>> {
        debug!(
            endpoint = %self.client.endpoint(),
            schedulers = %request.scheduler_ids_param(),
            duration = request.duration_minutes,
            "querying free time"
        );
        self.client
            .get_free_time(&request)
            .await
            .map_err(|e| e.with_provider(Self::NAME))
    }
}

impl SlotProvider for FreeTimeProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch_free_slots(
        &self,
        request: FreeTimeRequest,
    ) -> BoxFuture<'_, ProviderResult<Vec<RawSlot>>> {
        Box::pin(self.fetch(request))
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
