//! # Outbound Ports (Driven Ports)

use shared_types::UnixTimestamp;

/// Source of the current time.
///
/// Production: `SystemTimeSource`
/// Testing: `ManualTimeSource`
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> UnixTimestamp;
}
