pub mod error;
pub mod logger;
pub mod monitor;
pub mod validation;

/// Serializes a `Duration` as whole milliseconds in run reports.
pub mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
