//! Service-day time helpers.
//!
//! All times inside the search are whole seconds since midnight of the
//! service day ([`Time`]). Values past 24:00:00 are allowed for trips running
//! after midnight.

use std::fmt::Write;

use serde::de::{self, Deserializer, Visitor};

use crate::error::{Error, Result};

/// Seconds since midnight of the service day.
pub type Time = i32;

/// Duration in seconds.
pub type Duration = i32;

/// Parse `HH:MM` or `HH:MM:SS` into seconds since midnight.
pub fn parse_time(value: &str) -> Result<Time> {
    let invalid = || Error::InvalidTime {
        value: value.to_string(),
    };
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(invalid());
    }
    let mut fields = [0i32; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        *slot = part.parse().map_err(|_| invalid())?;
    }
    let [hours, minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Format seconds since midnight as `HH:MM`, appending `:SS` only when needed.
pub fn format_time(time: Time) -> String {
    let sign = if time < 0 { "-" } else { "" };
    let t = time.abs();
    let (h, m, s) = (t / 3600, (t % 3600) / 60, t % 60);
    if s == 0 {
        format!("{sign}{h:02}:{m:02}")
    } else {
        format!("{sign}{h:02}:{m:02}:{s:02}")
    }
}

/// Format a duration compactly, e.g. `1h2m`, `5m`, `3m45s`, `20s`.
pub fn format_duration(duration: Duration) -> String {
    if duration == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    if duration < 0 {
        out.push('-');
    }
    let d = duration.abs();
    let (h, m, s) = (d / 3600, (d % 3600) / 60, d % 60);
    if h > 0 {
        let _ = write!(out, "{h}h");
    }
    if m > 0 {
        let _ = write!(out, "{m}m");
    }
    if s > 0 {
        let _ = write!(out, "{s}s");
    }
    out
}

/// Serde helper accepting either a number of seconds or an `HH:MM[:SS]` string.
pub(crate) fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TimeVisitor)
}

/// Optional variant of [`deserialize_time`].
pub(crate) fn deserialize_opt_time<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_time")] Time);

    let value: Option<Wrapper> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.map(|Wrapper(t)| t))
}

/// Serde helper for a list of times.
pub(crate) fn deserialize_times<'de, D>(deserializer: D) -> std::result::Result<Vec<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_time")] Time);

    let values: Vec<Wrapper> = serde::Deserialize::deserialize(deserializer)?;
    Ok(values.into_iter().map(|Wrapper(t)| t).collect())
}

struct TimeVisitor;

impl<'de> Visitor<'de> for TimeVisitor {
    type Value = Time;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("seconds since midnight or an HH:MM[:SS] string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Time, E> {
        Time::try_from(v).map_err(|_| E::custom(format!("time {v} out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Time, E> {
        Time::try_from(v).map_err(|_| E::custom(format!("time {v} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Time, E> {
        parse_time(v).map_err(E::custom)
    }
}
