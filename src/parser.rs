//! Temporal string parsing
//!
//! Strings are matched against the formats of a [`FormatPolicy`] in order.
//! For each format the pattern for the expected shape is tried first, then the
//! pattern for the other shape:
//!
//! - date-only input where a date-time is expected becomes midnight
//! - date-time input where a date is expected keeps the calendar date
//!
//! Each format is first tried against the whole string. Only when that fails
//! is a trailing UTC offset (`Z`, `+HH:MM`, `-HHMM`, ...) split off and the
//! remainder tried again, so formats that end in a date component are not
//! misread as carrying an offset. The offset is kept on date-time results. The
//! parser never applies a session time zone; naive input stays naive.
//!
//! Two-digit years (`YY`, `RR`) resolve into 1950 through 2049.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::column::LogicalType;
use crate::config::{FormatPolicy, TemporalFormat};
use crate::error::{Error, Result};
use crate::value::TemporalValue;

/// ISO date-time pattern with a `T` separator
const ISO_T_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Years chrono assigns to two-digit input that belong to the previous century
const TWO_DIGIT_PIVOT: std::ops::RangeInclusive<i32> = 2050..=2068;

/// Parse `input` into a value of the `expected` shape
pub fn parse(input: &str, expected: LogicalType, policy: &FormatPolicy) -> Result<TemporalValue> {
    let trimmed = input.trim();
    let split = split_offset(trimmed);

    for format in policy.formats() {
        let parsed = parse_with(trimmed, None, expected, format).or_else(|| {
            split.and_then(|(body, offset)| parse_with(body, Some(offset), expected, format))
        });
        if let Some(value) = parsed {
            tracing::trace!(input = input, format = %format.name, "Parsed temporal value");
            return Ok(value);
        }
    }

    Err(Error::format(input, expected))
}

/// Parse `input` using the process-wide policy
pub fn parse_global(input: &str, expected: LogicalType) -> Result<TemporalValue> {
    parse(input, expected, FormatPolicy::global())
}

fn parse_with(
    body: &str,
    offset: Option<FixedOffset>,
    expected: LogicalType,
    format: &TemporalFormat,
) -> Option<TemporalValue> {
    let as_datetime = || {
        parse_datetime(body, &format.datetime).or_else(|| {
            format
                .is_iso()
                .then(|| parse_datetime(body, ISO_T_DATETIME_FORMAT))
                .flatten()
        })
    };
    let as_date = || {
        NaiveDate::parse_from_str(body, &format.date)
            .ok()
            .map(|d| pivot_century(d, &format.date))
    };

    match expected {
        LogicalType::DateTime => as_datetime()
            .or_else(|| as_date().map(|d| d.and_time(NaiveTime::MIN)))
            .map(|dt| TemporalValue::DateTime(dt, offset)),
        LogicalType::Date => as_date()
            .or_else(|| as_datetime().map(|dt| dt.date()))
            .map(TemporalValue::Date),
    }
}

fn parse_datetime(body: &str, pattern: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(body, pattern)
        .ok()
        .map(|dt| pivot_century(dt, pattern))
}

/// Move a two-digit year chrono placed in 2050-2068 back a century
fn pivot_century<T: Datelike + Copy>(value: T, pattern: &str) -> T {
    if pattern.contains("%y") && TWO_DIGIT_PIVOT.contains(&value.year()) {
        value.with_year(value.year() - 100).unwrap_or(value)
    } else {
        value
    }
}

/// Split a trailing UTC offset from a date-time string
///
/// Only strings with a time part (a `:`) are considered, so a date such as
/// `2008-06-28` is never mistaken for one carrying a `-28` offset. A suffix
/// that is out of range as an offset (`+25:00`) is not split.
fn split_offset(input: &str) -> Option<(&str, FixedOffset)> {
    if !input.contains(':') {
        return None;
    }

    if let Some(body) = input.strip_suffix('Z') {
        return Some((body.trim_end(), FixedOffset::east_opt(0)?));
    }

    let bytes = input.as_bytes();
    let candidates: [(usize, bool); 2] = [(6, true), (5, false)];
    for (len, with_colon) in candidates {
        if bytes.len() <= len {
            continue;
        }
        let start = bytes.len() - len;
        let suffix = &bytes[start..];
        let sign = match suffix[0] {
            b'+' => 1,
            b'-' => -1,
            _ => continue,
        };
        let digits: Vec<u8> = if with_colon {
            if suffix[3] != b':' {
                continue;
            }
            [suffix[1], suffix[2], suffix[4], suffix[5]].to_vec()
        } else {
            suffix[1..].to_vec()
        };
        if !digits.iter().all(u8::is_ascii_digit) {
            continue;
        }
        // the offset must follow a time, not a date component
        if !with_colon && bytes[..start].iter().rev().take(3).any(|b| *b == b'-') {
            continue;
        }

        let hours = i32::from((digits[0] - b'0') * 10 + (digits[1] - b'0'));
        let minutes = i32::from((digits[2] - b'0') * 10 + (digits[3] - b'0'));
        if hours > 14 || minutes > 59 {
            return None;
        }
        let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
        return Some((input[..start].trim_end(), offset));
    }

    None
}

/// Render a value through a chrono pattern
///
/// Dates are rendered at midnight so that date-time patterns can be used for
/// them. An explicit offset is appended as `+HH:MM`, which [`parse`] accepts.
pub fn format(value: &TemporalValue, pattern: &str) -> String {
    let rendered = value.naive_datetime().format(pattern).to_string();
    match value.offset() {
        Some(offset) => format!("{}{}", rendered, offset),
        None => rendered,
    }
}

/// Render a value with the pattern of `format` matching its shape
pub fn format_with(value: &TemporalValue, format: &TemporalFormat) -> String {
    match value.logical_type() {
        LogicalType::Date => self::format(value, &format.date),
        LogicalType::DateTime => self::format(value, &format.datetime),
    }
}

/// Translate an Oracle NLS date format model into a chrono pattern
///
/// Supported elements: `YYYY`, `RRRR`, `YY`, `RR`, `MM`, `MONTH`, `MON`, `DD`,
/// `HH24`, `HH12`, `HH`, `MI`, `SS`, `FF`/`FF1`-`FF9` (after a `.`), `AM`/`PM`,
/// quoted literals and the punctuation `- / . , : ;` and space.
///
/// `YY` and `RR` both read as the `RR` model does for the current half
/// century: `00`-`49` is 2000-2049 and `50`-`99` is 1950-1999. Writing a year
/// outside that window through a two-digit model loses its century.
pub fn translate_nls(model: &str) -> Result<String> {
    const ELEMENTS: &[(&str, &str)] = &[
        ("YYYY", "%Y"),
        ("RRRR", "%Y"),
        ("MONTH", "%B"),
        ("MON", "%b"),
        ("HH24", "%H"),
        ("HH12", "%I"),
        ("HH", "%I"),
        ("YY", "%y"),
        ("RR", "%y"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("MI", "%M"),
        ("SS", "%S"),
        ("AM", "%p"),
        ("PM", "%p"),
    ];

    let mut pattern = String::with_capacity(model.len() * 2);
    let mut rest = model;

    while let Some(c) = rest.chars().next() {
        if c == '"' {
            let end = rest[1..].find('"').ok_or_else(|| {
                Error::InvalidConfig(format!("unterminated literal in format model {:?}", model))
            })?;
            pattern.push_str(&rest[1..=end].replace('%', "%%"));
            rest = &rest[end + 2..];
            continue;
        }

        if c == '.' {
            let upper = rest[1..].to_ascii_uppercase();
            if upper.starts_with("FF") {
                let digits = upper[2..].chars().take_while(char::is_ascii_digit).count().min(1);
                pattern.push_str("%.f");
                rest = &rest[3 + digits..];
                continue;
            }
        }

        if matches!(c, '-' | '/' | '.' | ',' | ':' | ';' | ' ') {
            pattern.push(c);
            rest = &rest[1..];
            continue;
        }

        let upper = rest.to_ascii_uppercase();
        match ELEMENTS.iter().find(|(element, _)| upper.starts_with(element)) {
            Some((element, chrono)) => {
                pattern.push_str(chrono);
                rest = &rest[element.len()..];
            }
            None => {
                return Err(Error::InvalidConfig(format!(
                    "unsupported element at {:?} in format model {:?}",
                    rest, model
                )))
            }
        }
    }

    Ok(pattern)
}
