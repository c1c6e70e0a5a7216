//! Normalized slot types.
//!
//! A [`NormalizedSlot`] is one bookable instant enriched with its display time
//! and end instant. Slots sharing a calendar date are collected into a
//! [`DaySlotGroup`], and a whole availability answer is an [`Availability`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable slot ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSlot {
    /// Wall-clock start time, zero-padded `HH:MM`.
    pub time: String,

    /// The scheduler (provider calendar) that offers this slot.
    #[serde(rename = "schedulerID")]
    pub scheduler_id: Option<i64>,

    /// Start instant.
    #[serde(with = "crate::time::instant_millis")]
    pub from: DateTime<Utc>,

    /// End instant, `from` plus the requested duration.
    #[serde(with = "crate::time::instant_millis")]
    pub to: DateTime<Utc>,
}

impl NormalizedSlot {
    /// Returns the slot length in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.to - self.from).num_minutes()
    }
}

/// Slots that share a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlotGroup {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Slots on this date, ascending by `time`.
    pub slots: Vec<NormalizedSlot>,
}

impl DaySlotGroup {
    /// Creates an empty group for a date.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            slots: Vec::new(),
        }
    }
}

/// Where a set of slots came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// The live scheduling provider.
    Live,
    /// The bundled development fixture, served when the provider is unavailable.
    Fixture,
}

impl SlotSource {
    /// Returns true for the degraded fixture path.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fixture)
    }

    /// Returns a stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fixture => "fixture",
        }
    }
}

/// The outcome of an availability query.
///
/// `NoData` and `NoMatch` are distinct states: the former means nothing could
/// be resolved or fetched at all, the latter that the booking context filtered
/// every candidate away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Availability {
    /// Slots grouped by day (possibly empty).
    #[serde(rename = "ok")]
    Slots {
        /// Live or fixture data.
        source: SlotSource,
        /// Zone used to derive `date` and `time`.
        timezone: String,
        /// Day groups, ascending by date.
        days: Vec<DaySlotGroup>,
    },
    /// No scheduler could be resolved and no data is available.
    NoData,
    /// The booking context matched no scheduler.
    NoMatch,
}

impl Availability {
    /// Returns the day groups if this is a `Slots` outcome.
    pub fn days(&self) -> Option<&[DaySlotGroup]> {
        match self {
            Self::Slots { days, .. } => Some(days),
            _ => None,
        }
    }

    /// Returns the slot source if this is a `Slots` outcome.
    pub fn source(&self) -> Option<SlotSource> {
        match self {
            Self::Slots { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Total number of slots across all days.
    pub fn slot_count(&self) -> usize {
        self.days()
            .map(|days| days.iter().map(|d| d.slots.len()).sum())
            .unwrap_or(0)
    }
}
