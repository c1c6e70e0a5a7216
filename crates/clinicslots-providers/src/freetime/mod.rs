//! Free-time HTTP provider.
//!
//! This module provides a [`FreeTimeProvider`] that asks the scheduling
//! backend for open appointment instants via `GET Scheduler/GetFreeTime`.
//!
//! # Request
//!
//! | Query parameter   | Value                                   |
//! |-------------------|-----------------------------------------|
//! | `schedulerIDsStr` | scheduler ids joined with commas        |
//! | `duration`        | appointment length in minutes           |
//! | `fromDateUTC`     | window start, `YYYY-MM-DDTHH:MM:SS.mmmZ` |
//! | `toDateUTC`       | window end, same format                 |
//!
//! The auth token travels in the `DoctorOnlineProxyAuthToken` header unless
//! configured otherwise.
//!
//! # Example
//!
//! ```ignore
//! use clinicslots_providers::freetime::{FreeTimeConfig, FreeTimeProvider};
//!
//! let provider = FreeTimeProvider::new(FreeTimeConfig::new("https://proxy.example.com/api"))?;
//! let raw = provider.fetch_free_slots(request).await?;
//! ```

mod client;
mod config;
mod provider;

pub use client::FreeTimeClient;
pub use config::{FREE_TIME_PATH, FreeTimeConfig};
pub use provider::FreeTimeProvider;
