//! RawSlot to DaySlotGroup conversion pipeline.
//!
//! The normalization process:
//! 1. Parses each raw `from` instant, dropping slots where it is missing, malformed
//!    or too close to the end of the representable range to add the duration
//! 2. Converts the instant to wall-clock time in the configured [`DisplayZone`]
//! 3. Groups slots by wall-clock date and computes `to = from + duration`
//! 4. Sorts slots within each day by `time`, and days by `date`
//!
//! The pipeline is pure: the same input always yields the same output.

use std::collections::{BTreeMap, HashSet};

use chrono::Duration;
use tracing::debug;

use clinicslots_core::{DaySlotGroup, DisplayZone, NormalizedSlot};

use crate::raw_slot::RawSlot;

/// Slot length used when the caller does not specify one.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Converts raw provider slots into day groups.
///
/// # Arguments
///
/// * `raw` - Slots as returned by the provider, in any order
/// * `duration_minutes` - Length of each appointment; callers should pass a
///   positive value, zero yields slots whose `to` equals `from`
/// * `zone` - Zone used to derive each slot's `date` and `time`
///
/// Slots repeating the same instant for the same scheduler are kept once.
pub fn normalize_slots(
    raw: &[RawSlot],
    duration_minutes: u32,
    zone: &DisplayZone,
) -> Vec<DaySlotGroup> {
    let duration = Duration::minutes(i64::from(duration_minutes));
    let mut by_date: BTreeMap<String, Vec<NormalizedSlot>> = BTreeMap::new();
    let mut seen = HashSet::new();
    let mut dropped = 0usize;

    for slot in raw {
        let Some((from, to)) = slot
            .parsed_from()
            .and_then(|from| Some((from, from.checked_add_signed(duration)?)))
        else {
            dropped += 1;
            continue;
        };
        if !seen.insert((from, slot.scheduler_id)) {
            continue;
        }

        let wall = zone.wall_clock(from);
        by_date
            .entry(wall.format("%Y-%m-%d").to_string())
            .or_default()
            .push(NormalizedSlot {
                time: wall.format("%H:%M").to_string(),
                scheduler_id: slot.scheduler_id,
                from,
                to,
            });
    }

    if dropped > 0 {
        debug!(dropped, "skipped raw slots without a usable start time");
    }

    // BTreeMap iteration already yields dates in ascending order.
    by_date
        .into_iter()
        .map(|(date, mut slots)| {
            slots.sort_by(|a, b| {
                (&a.time, a.from, a.scheduler_id).cmp(&(&b.time, b.from, b.scheduler_id))
            });
            DaySlotGroup { date, slots }
        })
        .collect()
}
