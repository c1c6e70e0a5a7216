//! Core types: slots, booking context, time zones, tracing

pub mod context;
pub mod slot;
pub mod time;
pub mod tracing;

pub use context::{BookingContext, SchedulerDescriptor, ids_match};
pub use slot::{Availability, DaySlotGroup, NormalizedSlot, SlotSource};
pub use time::{DisplayZone, TimeError, TimeWindow, format_instant, parse_instant};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
