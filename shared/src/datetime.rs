//! Conversions between wire timestamps and what the UI shows or edits.
//!
//! Wire timestamps are UTC. Form inputs use the `datetime-local` format, which
//! carries no zone and is interpreted in the zone passed in (the browser's
//! local zone in the UI).

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// `<input type="datetime-local">` value, minute precision.
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const INPUT_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn to_input_value<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format(INPUT_FORMAT).to_string()
}

/// Blank or malformed input means "unset".
pub fn parse_input_value<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(text, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, INPUT_FORMAT_SECONDS))
        .ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

pub fn to_display<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

pub fn to_local_input_value(ts: &DateTime<Utc>) -> String {
    to_input_value(ts, &Local)
}

pub fn parse_local_input_value(text: &str) -> Option<DateTime<Utc>> {
    parse_input_value(text, &Local)
}

pub fn to_local_display(ts: &DateTime<Utc>) -> String {
    to_display(ts, &Local)
}
