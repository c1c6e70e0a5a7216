//! Availability service: scheduler resolution, fetch cache, fixture fallback.
//!
//! This crate answers "when can this appointment be booked?" queries:
//! - Resolves a booking context to schedulers through a [`ContentStore`]
//! - Resolves the provider token through a `CredentialResolver`
//! - Caches live provider responses with a TTL
//! - Falls back to fixture data when the provider fails or returns nothing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use clinicslots_core::BookingContext;
//! use clinicslots_providers::{CredentialResolver, CredentialSources, TokenCipher};
//! use clinicslots_service::{AvailabilityQuery, AvailabilityService, ServiceConfig, StaticContentStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default().with_base_url("https://proxy.example.com");
//!     let store = Arc::new(StaticContentStore::default());
//!     let credentials =
//!         CredentialResolver::new(CredentialSources::default(), TokenCipher::new("salt", "site"));
//!     let service = AvailabilityService::from_config(config, store, credentials)?;
//!
//!     let query = AvailabilityQuery::new(BookingContext::new().with_doctor("12"));
//!     let availability = service.get_availability(query).await;
//!     println!("{} slots", availability.slot_count());
//!     Ok(())
//! }
//! ```

mod availability;
mod cache;
mod config;
mod error;
mod resolver;
mod store;

pub use availability::{AvailabilityQuery, AvailabilityService};
pub use cache::{CacheEntry, FetchKey, SlotCache};
pub use config::{FixtureSettings, ProviderSettings, ServiceConfig};
pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use resolver::{Resolution, ResolutionEngine};
pub use store::{ContentStore, StaticContentStore};
