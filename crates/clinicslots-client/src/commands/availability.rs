//! Availability command: builds the service from config and prints one
//! query's outcome as JSON.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use clinicslots_providers::FixtureDataset;
use clinicslots_service::{
    AvailabilityService, ContentStore, ServiceConfig, ServiceError, StaticContentStore,
};

use crate::cli::AvailabilityArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Runs one availability query and prints the result.
pub async fn run(args: &AvailabilityArgs, config: &ClientConfig) -> ClientResult<()> {
    let service = build_service(config)?;
    let query = args.to_query(Utc::now(), config.service.default_range_days)?;

    let availability = service.get_availability(query).await;
    info!(
        slots = availability.slot_count(),
        source = availability.source().map(|s| s.as_str()),
        "availability query finished"
    );

    println!("{}", serde_json::to_string_pretty(&availability)?);
    Ok(())
}

/// Builds the availability service described by the config file.
pub fn build_service(config: &ClientConfig) -> ClientResult<AvailabilityService> {
    let store = load_store(&config.service)?;
    let credentials = config.credentials.to_resolver().map_err(ClientError::Config)?;
    Ok(AvailabilityService::from_config(
        config.service.clone(),
        store,
        credentials,
    )?)
}

/// Loads the content store from `content_path`, or from the fixture's
/// scheduler metadata when no path is configured.
pub fn load_store(config: &ServiceConfig) -> ClientResult<Arc<dyn ContentStore>> {
    let store = match &config.content_path {
        Some(path) => StaticContentStore::load(path)?,
        None => {
            debug!("no content_path configured, using fixture scheduler metadata");
            let dataset = match (&config.fixture.slots_path, &config.fixture.schedulers_path) {
                (Some(slots), Some(schedulers)) => FixtureDataset::load(slots, schedulers),
                _ => FixtureDataset::bundled(),
            }
            .map_err(ServiceError::from)?;
            StaticContentStore::from_records(&dataset.schedulers)
        }
    };
    Ok(Arc::new(store))
}
