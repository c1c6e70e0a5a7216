//! SlotProvider trait and implementations.
//!
//! This crate provides the layer between the scheduling backend and the
//! availability service:
//!
//! - [`SlotProvider`] - The trait every free-time backend implements
//! - [`RawSlot`] - One offered instant as the provider reports it
//! - [`normalize_slots`] - Pipeline grouping raw slots into bookable days
//! - [`FixtureDataset`] - Static fallback data for provider outages
//! - [`CredentialResolver`] - Picks the auth token for a query
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐    ┌─────────────────┐
//! │ Scheduler/GetFree.. │    │ Fixture files   │
//! └──────────┬──────────┘    └────────┬────────┘
//!            │                        │
//!            ▼                        ▼
//! ┌─────────────────────┐    ┌─────────────────┐
//! │  FreeTimeProvider   │    │ FixtureDataset  │
//! └──────────┬──────────┘    └────────┬────────┘
//!            │    SlotProvider        │ slots_for(ctx)
//!            └───────────┬────────────┘
//!                        ▼
//!                 ┌─────────────┐
//!                 │   RawSlot   │
//!                 └──────┬──────┘
//!                        │
//!                        ▼ normalize_slots()
//!                 ┌──────────────┐
//!                 │ DaySlotGroup │
//!                 └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use clinicslots_providers::{FreeTimeRequest, SlotProvider, normalize_slots};
//!
//! async fn days(provider: &dyn SlotProvider, request: FreeTimeRequest) -> Vec<DaySlotGroup> {
//!     let duration = request.duration_minutes;
//!     let raw = provider.fetch_free_slots(request).await?;
//!     normalize_slots(&raw, duration, &DisplayZone::Local)
//! }
//! ```

pub mod credentials;
pub mod error;
pub mod fixture;
pub mod freetime;
pub mod normalize;
pub mod provider;
pub mod raw_slot;

// Re-export main types at crate root
pub use credentials::{
    CipherMode, CredentialError, CredentialResolver, CredentialSources, ResolvedToken,
    TokenCipher, TokenHook, TokenSource,
};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fixture::{FixtureDataset, FixtureError, FixtureMatch, SchedulerRecord, filter_records};
pub use freetime::{FreeTimeClient, FreeTimeConfig, FreeTimeProvider};
pub use normalize::{DEFAULT_DURATION_MINUTES, normalize_slots};
pub use provider::{BoxFuture, ErrorProvider, FreeTimeRequest, SlotProvider};
pub use raw_slot::{FreeTimeEnvelope, RawSlot, SUCCESS_CODE};
