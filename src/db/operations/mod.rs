pub mod platforms;
pub mod profile;
pub mod progress;
pub mod quiz;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

pub(crate) fn to_iso(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
