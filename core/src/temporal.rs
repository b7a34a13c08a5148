// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Temporal primitives: `Edm.DateTimeOffset`, `Edm.Date`,
//! `Edm.TimeOfDay` and `Edm.Duration`.
//!
//! Each type has exactly one canonical text form, used both in CSDL
//! documents and in URI literals:
//!
//! - `Edm.DateTimeOffset`: RFC 3339, `+00:00` rendered as `Z`.
//! - `Edm.Date`: `YYYY-MM-DD`.
//! - `Edm.TimeOfDay`: `hh:mm:ss` with optional fractional seconds,
//!   trailing zeros removed.
//! - `Edm.Duration`: ISO 8601 day-time duration, `[-]PnDTnHnMn.nS`.
//!
//! ```rust
//! use odata_core::EdmDateTimeOffset;
//!
//! let v: EdmDateTimeOffset = "2021-03-04T05:06:07+00:00".parse().unwrap();
//! assert_eq!(v.to_string(), "2021-03-04T05:06:07Z");
//! ```

use core::str::FromStr;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Error as FmtError;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::Date;
use time::Duration;
use time::OffsetDateTime;
use time::Time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidDateTimeOffset(String),
    InvalidDate(String),
    InvalidTimeOfDay(String),
    InvalidDuration(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidDateTimeOffset(v) => write!(f, "invalid Edm.DateTimeOffset: {v}"),
            Self::InvalidDate(v) => write!(f, "invalid Edm.Date: {v}"),
            Self::InvalidTimeOfDay(v) => write!(f, "invalid Edm.TimeOfDay: {v}"),
            Self::InvalidDuration(v) => write!(f, "invalid Edm.Duration: {v}"),
        }
    }
}

impl StdError for Error {}

/// Type corresponding to `Edm.DateTimeOffset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdmDateTimeOffset(OffsetDateTime);

impl From<OffsetDateTime> for EdmDateTimeOffset {
    fn from(dt: OffsetDateTime) -> Self {
        Self(dt)
    }
}

impl From<EdmDateTimeOffset> for OffsetDateTime {
    fn from(w: EdmDateTimeOffset) -> Self {
        w.0
    }
}

impl Display for EdmDateTimeOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = self.0.format(&Rfc3339).map_err(|_| FmtError)?;
        f.write_str(&s)
    }
}

impl FromStr for EdmDateTimeOffset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OffsetDateTime::parse(s, &Rfc3339)
            .map(Self)
            .map_err(|_| Error::InvalidDateTimeOffset(s.into()))
    }
}

/// Type corresponding to `Edm.Date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdmDate(Date);

impl EdmDate {
    #[must_use]
    pub const fn inner(&self) -> Date {
        self.0
    }
}

impl From<Date> for EdmDate {
    fn from(d: Date) -> Self {
        Self(d)
    }
}

impl Display for EdmDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = self
            .0
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|_| FmtError)?;
        f.write_str(&s)
    }
}

impl FromStr for EdmDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(|_| Error::InvalidDate(s.into()))
    }
}

/// Type corresponding to `Edm.TimeOfDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdmTimeOfDay(Time);

impl EdmTimeOfDay {
    #[must_use]
    pub const fn inner(&self) -> Time {
        self.0
    }
}

impl From<Time> for EdmTimeOfDay {
    fn from(t: Time) -> Self {
        Self(t)
    }
}

impl Display for EdmTimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let (h, m, s, nanos) = self.0.as_hms_nano();
        write!(f, "{h:02}:{m:02}:{s:02}")?;
        write_fraction(f, nanos)
    }
}

impl FromStr for EdmTimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Time::parse(
            s,
            format_description!("[hour]:[minute][optional [:[second]]][optional [.[subsecond]]]"),
        )
        .map(Self)
        .map_err(|_| Error::InvalidTimeOfDay(s.into()))
    }
}

/// Type corresponding to `Edm.Duration`. Only the day-time subset of
/// ISO 8601 is representable: years and months have no fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdmDuration(Duration);

impl EdmDuration {
    #[must_use]
    pub const fn inner(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for EdmDuration {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl Display for EdmDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let d = self.0;
        if d.is_negative() {
            f.write_str("-")?;
        }
        let total = d.whole_seconds().unsigned_abs();
        let nanos = d.subsec_nanoseconds().unsigned_abs();
        let days = total / 86_400;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;
        let seconds = total % 60;
        f.write_str("P")?;
        if days > 0 {
            write!(f, "{days}D")?;
        }
        if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 || days == 0 {
            f.write_str("T")?;
            if hours > 0 {
                write!(f, "{hours}H")?;
            }
            if minutes > 0 {
                write!(f, "{minutes}M")?;
            }
            if seconds > 0 || nanos > 0 || (hours == 0 && minutes == 0) {
                write!(f, "{seconds}")?;
                write_fraction(f, nanos)?;
                f.write_str("S")?;
            }
        }
        Ok(())
    }
}

impl FromStr for EdmDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || Error::InvalidDuration(s.into());
        let (negative, rest) = s.strip_prefix('-').map_or((false, s), |r| (true, r));
        let rest = rest.strip_prefix('P').ok_or_else(err)?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((d, t)) if !t.is_empty() => (d, Some(t)),
            Some(_) => return Err(err()),
            None => (rest, None),
        };
        if date_part.is_empty() && time_part.is_none() {
            return Err(err());
        }
        let mut nanos: i128 = 0;
        if !date_part.is_empty() {
            let days = date_part.strip_suffix('D').ok_or_else(err)?;
            nanos += parse_component(days, 86_400).ok_or_else(err)?;
        }
        if let Some(mut time_part) = time_part {
            for (designator, unit) in [('H', 3_600), ('M', 60), ('S', 1)] {
                if let Some((value, tail)) = time_part.split_once(designator) {
                    nanos += parse_component(value, unit).ok_or_else(err)?;
                    time_part = tail;
                }
            }
            if !time_part.is_empty() {
                return Err(err());
            }
        }
        if negative {
            nanos = -nanos;
        }
        let seconds = i64::try_from(nanos / 1_000_000_000).map_err(|_| err())?;
        let subsec = i32::try_from(nanos % 1_000_000_000).map_err(|_| err())?;
        Ok(Self(Duration::new(seconds, subsec)))
    }
}

// Component of a duration in nanoseconds; fractions only on seconds.
fn parse_component(value: &str, unit_seconds: i128) -> Option<i128> {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.is_empty() && (unit_seconds != 1 || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let whole: i128 = whole.parse().ok()?;
    let fraction_nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0_i128, |acc, b| acc * 10 + i128::from(b - b'0'));
    Some(whole * unit_seconds * 1_000_000_000 + fraction_nanos)
}

fn write_fraction(f: &mut Formatter<'_>, nanos: u32) -> FmtResult {
    if nanos == 0 {
        return Ok(());
    }
    let digits = format!("{nanos:09}");
    write!(f, ".{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::UtcOffset;

    #[test]
    fn date_time_offset_canonical_form() {
        let z: EdmDateTimeOffset = "2021-03-04T05:06:07Z".parse().unwrap();
        assert_eq!(z.to_string(), "2021-03-04T05:06:07Z");
        let dt: OffsetDateTime = z.into();
        assert_eq!(dt.offset(), UtcOffset::UTC);

        let plus00: EdmDateTimeOffset = "2021-03-04T05:06:07+00:00".parse().unwrap();
        assert_eq!(plus00.to_string(), "2021-03-04T05:06:07Z");

        let minus00: EdmDateTimeOffset = "2021-03-04T05:06:07-00:00".parse().unwrap();
        assert_eq!(minus00.to_string(), "2021-03-04T05:06:07Z");

        let pos: EdmDateTimeOffset = "2021-03-04T10:36:07+05:30".parse().unwrap();
        assert_eq!(pos.to_string(), "2021-03-04T10:36:07+05:30");

        let frac: EdmDateTimeOffset = "2021-03-04T05:06:07.5+01:00".parse().unwrap();
        assert_eq!(frac.to_string(), "2021-03-04T05:06:07.5+01:00");
    }

    #[test]
    fn date_time_offset_rejects_invalid() {
        assert!("not-a-date".parse::<EdmDateTimeOffset>().is_err());
        assert!("2021-03-04T05:06:07".parse::<EdmDateTimeOffset>().is_err());
        assert!("2021-03-04T23:59:60Z".parse::<EdmDateTimeOffset>().is_err());
    }

    #[test]
    fn date() {
        let d: EdmDate = "2024-02-29".parse().unwrap();
        assert_eq!(d.to_string(), "2024-02-29");
        assert!("2023-02-29".parse::<EdmDate>().is_err());
        assert!("2023-2-1".parse::<EdmDate>().is_err());
    }

    #[test]
    fn time_of_day() {
        let t: EdmTimeOfDay = "13:20:00".parse().unwrap();
        assert_eq!(t.to_string(), "13:20:00");
        let t: EdmTimeOfDay = "13:20".parse().unwrap();
        assert_eq!(t.to_string(), "13:20:00");
        let t: EdmTimeOfDay = "07:59:59.250".parse().unwrap();
        assert_eq!(t.to_string(), "07:59:59.25");
        assert!("25:00:00".parse::<EdmTimeOfDay>().is_err());
    }

    #[test]
    fn duration() {
        for (input, expected) in [
            ("P1DT2H3M4S", "P1DT2H3M4S"),
            ("PT0S", "PT0S"),
            ("PT1.5S", "PT1.5S"),
            ("-P2D", "-P2D"),
            ("PT90M", "PT1H30M"),
            ("P0DT12H", "PT12H"),
        ] {
            let d: EdmDuration = input.parse().unwrap();
            assert_eq!(d.to_string(), expected, "input {input}");
        }
        assert_eq!(
            "-PT1.25S".parse::<EdmDuration>().unwrap().inner(),
            Duration::new(-1, -250_000_000)
        );
    }

    #[test]
    fn duration_rejects_invalid() {
        for input in ["", "P", "PT", "1D", "P1Y", "PT1.5H", "P1DT", "PTxS", "P1D2H"] {
            assert!(
                input.parse::<EdmDuration>().is_err(),
                "should reject {input}"
            );
        }
    }
}
