//! Formatting for UTC instants carried by date tokens and conditions.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Formats an instant as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter that writes an instant with [`format_instant`].
pub fn serialize<S: Serializer>(
    instant: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_instant(instant))
}
