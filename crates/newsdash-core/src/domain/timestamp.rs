use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Publication time of a news record, normalized to UTC wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NewsDate(PrimitiveDateTime);

impl NewsDate {
    /// Leniently parse a date or date-time string.
    ///
    /// Accepts `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by a time of day
    /// (space or `T` separated, seconds and fractions optional) and a `Z`, `UTC`,
    /// or numeric offset suffix. Anything else yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.len() < 10 {
            return None;
        }

        let (body, offset) = split_offset(trimmed);
        let body = normalize_separators(body)?;
        let datetime = parse_body(body.as_str())?;

        let datetime = match offset {
            Some(offset) if offset != UtcOffset::UTC => {
                let utc = datetime.assume_offset(offset).to_offset(UtcOffset::UTC);
                PrimitiveDateTime::new(utc.date(), utc.time())
            }
            _ => datetime,
        };

        Some(Self(datetime))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn format(self) -> String {
        self.0
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .unwrap_or_else(|_| self.0.to_string())
    }
}

impl Display for NewsDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

impl Serialize for NewsDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format())
    }
}

/// Split a trailing `Z`, `UTC`, or `+HH[:MM]` suffix from the time portion.
fn split_offset(input: &str) -> (&str, Option<UtcOffset>) {
    for suffix in [" UTC", "UTC", "Z", "z"] {
        if let Some(body) = input.strip_suffix(suffix) {
            return (body.trim_end(), Some(UtcOffset::UTC));
        }
    }

    // The date part itself contains '-', so only look past it.
    if let Some(tail) = input.get(10..) {
        if let Some(position) = tail.rfind(['+', '-']) {
            let split_at = 10 + position;
            if let Some(offset) = parse_offset(&input[split_at..]) {
                return (input[..split_at].trim_end(), Some(offset));
            }
        }
    }

    (input, None)
}

fn parse_offset(text: &str) -> Option<UtcOffset> {
    let sign: i8 = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits = text[1..].chars().filter(|ch| *ch != ':').collect::<String>();
    if !(digits.len() == 2 || digits.len() == 4) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i8 = digits[..2].parse().ok()?;
    let minutes: i8 = if digits.len() == 4 {
        digits[2..].parse().ok()?
    } else {
        0
    };
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

/// Rewrite `YYYY/MM/DD` and a `T` separator into the canonical `YYYY-MM-DD HH...` shape.
fn normalize_separators(body: &str) -> Option<String> {
    let mut normalized = body.to_owned();
    let bytes = normalized.as_bytes();
    if bytes.len() < 10 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }

    if bytes[4] == b'/' && bytes[7] == b'/' {
        normalized.replace_range(4..5, "-");
        normalized.replace_range(7..8, "-");
    }
    if normalized.as_bytes().get(10).is_some_and(|b| *b == b'T' || *b == b't') {
        normalized.replace_range(10..11, " ");
    }

    Some(normalized)
}

fn parse_body(body: &str) -> Option<PrimitiveDateTime> {
    if body.len() == 10 {
        return Date::parse(body, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT));
    }

    PrimitiveDateTime::parse(
        body,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            body,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(body, format_description!("[year]-[month]-[day] [hour]:[minute]"))
    })
    .ok()
}

/// RFC3339 timestamp guaranteed to be UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}
