//! Time-related utilities with clock abstraction for testability.

use chrono::{FixedOffset, Local, Offset, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;

    /// Short time-of-day string (`HH:MM`) attached to server-stamped messages
    fn display_time(&self) -> String {
        format_display_time(self.now_millis())
    }
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
    offset: FixedOffset,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp, rendered in UTC
    pub fn new(fixed_time_millis: i64) -> Self {
        Self::with_offset(fixed_time_millis, utc_offset())
    }

    /// Create a new fixed clock rendered in the given UTC offset
    pub fn with_offset(fixed_time_millis: i64, offset: FixedOffset) -> Self {
        Self {
            fixed_time: fixed_time_millis,
            offset,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }

    fn display_time(&self) -> String {
        format_display_time_with_offset(self.fixed_time, self.offset)
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a timestamp as `HH:MM` in the server's local time zone
pub fn format_display_time(timestamp_millis: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => format_display_time_with_offset(timestamp_millis, utc_offset()),
    }
}

/// Render a timestamp as `HH:MM` in a fixed UTC offset
pub fn format_display_time_with_offset(timestamp_millis: i64, offset: FixedOffset) -> String {
    match offset.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
