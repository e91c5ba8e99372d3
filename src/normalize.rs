//! Turning raw values into display-ready cells.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{ExportError, Result};
use crate::value::Value;

pub const DATE_FORMAT: &str = "%m/%d/%Y";
pub const DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Timezone that aware datetimes are converted into before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayTimezone {
    #[default]
    Utc,
    /// The host's local timezone, looked up at format time.
    Local,
    Fixed(FixedOffset),
    /// IANA zone such as `America/Chicago`; the offset follows daylight saving.
    Named(Tz),
}

fn write_instant<Z: TimeZone>(out: &mut String, dt: &DateTime<FixedOffset>, tz: &Z, fmt: &str) -> fmt::Result
where
    Z::Offset: fmt::Display,
{
    write!(out, "{}", dt.with_timezone(tz).format(fmt))
}

// A wall time that does not exist in `tz` (skipped by a DST jump) is written
// without an offset.
fn write_wall_time<Z: TimeZone>(out: &mut String, dt: &NaiveDateTime, tz: &Z, fmt: &str) -> fmt::Result
where
    Z::Offset: fmt::Display,
{
    match tz.from_local_datetime(dt).earliest() {
        Some(local) => write!(out, "{}", local.format(fmt)),
        None => write!(out, "{}", dt.format(fmt)),
    }
}

fn format_failed(fmt: &str) -> ExportError {
    ExportError::serialization(format!("invalid datetime format '{fmt}'"))
}

impl DisplayTimezone {
    /// Offset east of UTC, e.g. `DisplayTimezone::offset_hours(-5)`.
    #[must_use]
    pub fn offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours * 3600).map(Self::Fixed)
    }

    /// # Errors
    /// Returns `Serialization` if `fmt` cannot be rendered.
    pub fn format(&self, dt: &DateTime<FixedOffset>, fmt: &str) -> Result<String> {
        let mut out = String::new();
        let written = match self {
            Self::Utc => write_instant(&mut out, dt, &Utc, fmt),
            Self::Local => write_instant(&mut out, dt, &Local, fmt),
            Self::Fixed(off) => write_instant(&mut out, dt, off, fmt),
            Self::Named(tz) => write_instant(&mut out, dt, tz, fmt),
        };
        written.map_err(|_| format_failed(fmt))?;
        Ok(out)
    }

    /// Format a naive datetime as wall time in this timezone. The wall time is
    /// not shifted; the zone only supplies `%z`/`%Z`.
    ///
    /// # Errors
    /// Returns `Serialization` if `fmt` cannot be rendered.
    pub fn format_wall_time(&self, dt: &NaiveDateTime, fmt: &str) -> Result<String> {
        let mut out = String::new();
        let written = match self {
            Self::Utc => write_wall_time(&mut out, dt, &Utc, fmt),
            Self::Local => write_wall_time(&mut out, dt, &Local, fmt),
            Self::Fixed(off) => write_wall_time(&mut out, dt, off, fmt),
            Self::Named(tz) => write_wall_time(&mut out, dt, tz, fmt),
        };
        written.map_err(|_| format_failed(fmt))?;
        Ok(out)
    }

    /// Current calendar date in this timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self {
            Self::Utc => now.date_naive(),
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::Fixed(off) => now.with_timezone(off).date_naive(),
            Self::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }
}

impl FromStr for DisplayTimezone {
    type Err = ExportError;

    /// Accepts `UTC`, `Z`, `local`, IANA names like `America/Chicago`, and
    /// offsets like `-05:00`, `+0530`, `UTC-5` or `GMT+01:00`.
    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "utc" | "z" | "gmt" => return Ok(Self::Utc),
            "local" => return Ok(Self::Local),
            _ => {}
        }
        let invalid = || ExportError::InvalidTimezone(s.to_string());
        let offset = lower
            .strip_prefix("utc")
            .or_else(|| lower.strip_prefix("gmt"))
            .unwrap_or(&lower);
        let Some(digits) = offset.strip_prefix(['+', '-']) else {
            return raw.parse::<Tz>().map(Self::Named).map_err(|_| invalid());
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
            return Err(invalid());
        }
        // Bare hours (`UTC-5`, `+9`); chrono wants two-digit hours and minutes.
        if digits.len() <= 2 && !digits.contains(':') {
            let hours: i32 = digits.parse().map_err(|_| invalid())?;
            let sign = if offset.starts_with('-') { -1 } else { 1 };
            return Self::offset_hours(sign * hours).ok_or_else(invalid);
        }
        offset.parse::<FixedOffset>().map(Self::Fixed).map_err(|_| invalid())
    }
}

/// Which values the null-coercion step blanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Only `Null` becomes `""`.
    #[default]
    Strict,
    /// `Null`, `false`, `0`, `0.0`, `""` and empty lists all become `""`.
    BlankFalsy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// When false, line breaks inside text are replaced by `", "`.
    pub allow_newlines: bool,
    pub timezone: DisplayTimezone,
    pub datetime_format: String,
    pub date_format: String,
    pub null_policy: NullPolicy,
    pub true_label: String,
    pub false_label: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            allow_newlines: true,
            timezone: DisplayTimezone::Utc,
            datetime_format: DATETIME_FORMAT.to_string(),
            date_format: DATE_FORMAT.to_string(),
            null_policy: NullPolicy::Strict,
            true_label: "Yes".to_string(),
            false_label: "No".to_string(),
        }
    }
}

/// Check that a strftime pattern has no unknown specifiers.
///
/// Offset specifiers (`%z`, `%Z`) are fine for naive datetimes too; they take
/// the display timezone's offset.
///
/// # Errors
/// Returns `Config` naming the bad pattern.
pub fn validate_format(fmt: &str) -> Result<()> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(ExportError::Config(format!("invalid datetime format '{fmt}'")));
    }
    Ok(())
}

/// Apply, in order: temporal formatting, newline stripping, null coercion,
/// boolean labelling.
///
/// # Errors
/// Returns `Serialization` if a datetime cannot be rendered with the
/// configured format.
pub fn normalize(raw: Value, options: &FormatOptions) -> Result<Value> {
    let value = format_temporal(raw, options)?;
    let value = strip_newlines(value, options.allow_newlines);
    let value = coerce_null(value, options.null_policy);
    Ok(label_bool(value, options))
}

fn format_temporal(value: Value, options: &FormatOptions) -> Result<Value> {
    let text = match value {
        Value::DateTime(dt) => options.timezone.format(&dt, &options.datetime_format)?,
        // Naive datetimes are taken to already be display-local wall time.
        Value::NaiveDateTime(dt) => options.timezone.format_wall_time(&dt, &options.datetime_format)?,
        Value::Date(d) => {
            let mut out = String::new();
            write!(out, "{}", d.format(&options.date_format)).map_err(|_| format_failed(&options.date_format))?;
            out
        }
        other => return Ok(other),
    };
    Ok(Value::Text(text))
}

fn strip_newlines(value: Value, allow_newlines: bool) -> Value {
    match value {
        Value::Text(s) if !allow_newlines => Value::Text(split_lines(&s).join(", ")),
        other => other,
    }
}

fn coerce_null(value: Value, policy: NullPolicy) -> Value {
    let blank = match policy {
        NullPolicy::Strict => value.is_null(),
        NullPolicy::BlankFalsy => value.is_falsy(),
    };
    if blank { Value::Text(String::new()) } else { value }
}

fn label_bool(value: Value, options: &FormatOptions) -> Value {
    match value {
        Value::Bool(true) => Value::Text(options.true_label.clone()),
        Value::Bool(false) => Value::Text(options.false_label.clone()),
        other => other,
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split on universal line breaks (`\r\n` counts once). A trailing break does
/// not produce an empty last line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r'
            && let Some(&(j, '\n')) = chars.peek()
        {
            chars.next();
            start = j + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
