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

//! EDM primitive types and values.
//!
//! [`PrimitiveValue::canonical_text`] and [`PrimitiveValue::parse`] define
//! the single textual form of every kind as used in CSDL attributes.

use crate::identifier::Namespace;
use crate::identifier::QualifiedName;
use crate::identifier::SimpleIdentifier;
use crate::temporal::EdmDate;
use crate::temporal::EdmDateTimeOffset;
use crate::temporal::EdmDuration;
use crate::temporal::EdmTimeOfDay;
use rust_decimal::Decimal;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownPrimitiveType(String),
    InvalidLiteral(PrimitiveKind, String),
    NotAValueKind(PrimitiveKind),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnknownPrimitiveType(name) => write!(f, "unknown primitive type: {name}"),
            Self::InvalidLiteral(kind, text) => write!(f, "invalid {kind} literal: {text}"),
            Self::NotAValueKind(kind) => write!(f, "{kind} has no literal form"),
        }
    }
}

impl StdError for Error {}

macro_rules! primitive_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Primitive types of the `Edm` namespace.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum PrimitiveKind {
            $($variant,)*
        }

        impl PrimitiveKind {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Local name inside `Edm` namespace.
            #[must_use]
            pub const fn local_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

primitive_kinds! {
    Binary => "Binary",
    Boolean => "Boolean",
    Byte => "Byte",
    Date => "Date",
    DateTime => "DateTime",
    DateTimeOffset => "DateTimeOffset",
    Decimal => "Decimal",
    Double => "Double",
    Duration => "Duration",
    Guid => "Guid",
    Int16 => "Int16",
    Int32 => "Int32",
    Int64 => "Int64",
    SByte => "SByte",
    Single => "Single",
    Stream => "Stream",
    String => "String",
    Time => "Time",
    TimeOfDay => "TimeOfDay",
    PrimitiveType => "PrimitiveType",
    Untyped => "Untyped",
    Geography => "Geography",
    GeographyPoint => "GeographyPoint",
    GeographyLineString => "GeographyLineString",
    GeographyPolygon => "GeographyPolygon",
    GeographyMultiPoint => "GeographyMultiPoint",
    GeographyMultiLineString => "GeographyMultiLineString",
    GeographyMultiPolygon => "GeographyMultiPolygon",
    GeographyCollection => "GeographyCollection",
    Geometry => "Geometry",
    GeometryPoint => "GeometryPoint",
    GeometryLineString => "GeometryLineString",
    GeometryPolygon => "GeometryPolygon",
    GeometryMultiPoint => "GeometryMultiPoint",
    GeometryMultiLineString => "GeometryMultiLineString",
    GeometryMultiPolygon => "GeometryMultiPolygon",
    GeometryCollection => "GeometryCollection",
}

impl PrimitiveKind {
    /// Lookup by qualified name, `None` for non-`Edm` names.
    #[must_use]
    pub fn from_qualified_name(name: &QualifiedName) -> Option<Self> {
        if name.is_edm() {
            Self::from_local_name(name.name.inner())
        } else {
            None
        }
    }

    #[must_use]
    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.local_name() == name)
    }

    #[must_use]
    pub fn qualified_name(self) -> QualifiedName {
        Namespace::edm().qualify(SimpleIdentifier::from_static(self.local_name()))
    }

    #[must_use]
    pub const fn is_geography(self) -> bool {
        matches!(
            self,
            Self::Geography
                | Self::GeographyPoint
                | Self::GeographyLineString
                | Self::GeographyPolygon
                | Self::GeographyMultiPoint
                | Self::GeographyMultiLineString
                | Self::GeographyMultiPolygon
                | Self::GeographyCollection
        )
    }

    #[must_use]
    pub const fn is_geometry(self) -> bool {
        matches!(
            self,
            Self::Geometry
                | Self::GeometryPoint
                | Self::GeometryLineString
                | Self::GeometryPolygon
                | Self::GeometryMultiPoint
                | Self::GeometryMultiLineString
                | Self::GeometryMultiPolygon
                | Self::GeometryCollection
        )
    }

    #[must_use]
    pub const fn is_spatial(self) -> bool {
        self.is_geography() || self.is_geometry()
    }

    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::SByte | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    /// `MaxLength` applies.
    #[must_use]
    pub const fn has_max_length(self) -> bool {
        matches!(self, Self::Binary | Self::String | Self::Stream)
    }

    /// `Precision` applies.
    #[must_use]
    pub const fn has_precision(self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::DateTime
                | Self::DateTimeOffset
                | Self::Duration
                | Self::Time
                | Self::TimeOfDay
        )
    }

    #[must_use]
    pub const fn has_scale(self) -> bool {
        matches!(self, Self::Decimal)
    }

    #[must_use]
    pub const fn has_unicode(self) -> bool {
        matches!(self, Self::String)
    }

    #[must_use]
    pub const fn has_srid(self) -> bool {
        self.is_spatial()
    }

    /// Default SRID: 4326 for geography, 0 for geometry.
    #[must_use]
    pub const fn default_srid(self) -> Option<i32> {
        if self.is_geography() {
            Some(4326)
        } else if self.is_geometry() {
            Some(0)
        } else {
            None
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("Edm.")
            .and_then(Self::from_local_name)
            .ok_or_else(|| Error::UnknownPrimitiveType(s.into()))
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Edm.{}", self.local_name())
    }
}

/// Well-known text of a spatial value with its reference system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialValue {
    pub kind: PrimitiveKind,
    pub srid: Option<i32>,
    pub wkt: String,
}

impl SpatialValue {
    /// Text with optional `SRID=n;` prefix.
    #[must_use]
    pub fn text(&self) -> String {
        match self.srid {
            Some(srid) => format!("SRID={srid};{}", self.wkt),
            None => self.wkt.clone(),
        }
    }

    fn parse(kind: PrimitiveKind, text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidLiteral(kind, text.into());
        let (srid, wkt) = match text.strip_prefix("SRID=") {
            Some(rest) => {
                let (srid, wkt) = rest.split_once(';').ok_or_else(invalid)?;
                (Some(srid.parse().map_err(|_| invalid())?), wkt)
            }
            None => (None, text),
        };
        if wkt.trim().is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            kind,
            srid,
            wkt: wkt.into(),
        })
    }
}

/// Value of an enum type: one member, or several for flags enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: QualifiedName,
    pub members: Vec<SimpleIdentifier>,
}

impl EnumValue {
    /// Member names joined by `,`.
    #[must_use]
    pub fn member_text(&self) -> String {
        self.members
            .iter()
            .map(SimpleIdentifier::inner)
            .cloned()
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Null,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Guid(Uuid),
    DateTimeOffset(EdmDateTimeOffset),
    Date(EdmDate),
    TimeOfDay(EdmTimeOfDay),
    Duration(EdmDuration),
    Binary(Vec<u8>),
    Spatial(SpatialValue),
    Enum(EnumValue),
}

impl PrimitiveValue {
    /// Kind of the value. `None` for null and enum values.
    #[must_use]
    pub const fn kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Self::Null | Self::Enum(_) => return None,
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Byte(_) => PrimitiveKind::Byte,
            Self::SByte(_) => PrimitiveKind::SByte,
            Self::Int16(_) => PrimitiveKind::Int16,
            Self::Int32(_) => PrimitiveKind::Int32,
            Self::Int64(_) => PrimitiveKind::Int64,
            Self::Single(_) => PrimitiveKind::Single,
            Self::Double(_) => PrimitiveKind::Double,
            Self::Decimal(_) => PrimitiveKind::Decimal,
            Self::String(_) => PrimitiveKind::String,
            Self::Guid(_) => PrimitiveKind::Guid,
            Self::DateTimeOffset(_) => PrimitiveKind::DateTimeOffset,
            Self::Date(_) => PrimitiveKind::Date,
            Self::TimeOfDay(_) => PrimitiveKind::TimeOfDay,
            Self::Duration(_) => PrimitiveKind::Duration,
            Self::Binary(_) => PrimitiveKind::Binary,
            Self::Spatial(v) => v.kind,
        })
    }

    /// Canonical text used in CSDL documents. Strings are returned as is,
    /// without quoting.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Boolean(v) => v.to_string(),
            Self::Byte(v) => v.to_string(),
            Self::SByte(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::Single(v) => format_single(*v),
            Self::Double(v) => format_double(*v),
            Self::Decimal(v) => v.normalize().to_string(),
            Self::String(v) => v.clone(),
            Self::Guid(v) => v.hyphenated().to_string(),
            Self::DateTimeOffset(v) => v.to_string(),
            Self::Date(v) => v.to_string(),
            Self::TimeOfDay(v) => v.to_string(),
            Self::Duration(v) => v.to_string(),
            Self::Binary(v) => hex::encode_upper(v),
            Self::Spatial(v) => v.text(),
            Self::Enum(v) => v.member_text(),
        }
    }

    /// Parse the canonical text of `kind`.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid literal of `kind` or the
    /// kind has no literal form (`Edm.Stream`, abstract types).
    pub fn parse(kind: PrimitiveKind, text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidLiteral(kind, text.into());
        Ok(match kind {
            PrimitiveKind::Boolean => match text {
                "true" | "1" => Self::Boolean(true),
                "false" | "0" => Self::Boolean(false),
                _ => return Err(invalid()),
            },
            PrimitiveKind::Byte => Self::Byte(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::SByte => Self::SByte(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Int16 => Self::Int16(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Int32 => Self::Int32(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Int64 => Self::Int64(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Single => Self::Single(parse_float(text).ok_or_else(invalid)?),
            PrimitiveKind::Double => Self::Double(parse_float(text).ok_or_else(invalid)?),
            PrimitiveKind::Decimal => Self::Decimal(
                Decimal::from_str(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .map_err(|_| invalid())?,
            ),
            PrimitiveKind::String => Self::String(text.into()),
            PrimitiveKind::Guid => Self::Guid(Uuid::parse_str(text).map_err(|_| invalid())?),
            PrimitiveKind::DateTimeOffset | PrimitiveKind::DateTime => {
                Self::DateTimeOffset(text.parse().map_err(|_| invalid())?)
            }
            PrimitiveKind::Date => Self::Date(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::TimeOfDay | PrimitiveKind::Time => {
                Self::TimeOfDay(text.parse().map_err(|_| invalid())?)
            }
            PrimitiveKind::Duration => Self::Duration(text.parse().map_err(|_| invalid())?),
            PrimitiveKind::Binary => Self::Binary(hex::decode(text).map_err(|_| invalid())?),
            k if k.is_spatial() => Self::Spatial(SpatialValue::parse(k, text)?),
            k => return Err(Error::NotAValueKind(k)),
        })
    }
}

/// Canonical `Edm.Double` text: `INF`, `-INF`, `NaN` or the shortest
/// representation that round-trips, exponent as `E+n`/`E-n`.
#[must_use]
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        String::from(if v > 0.0 { "INF" } else { "-INF" })
    } else {
        exponent_form(format!("{v:?}"))
    }
}

/// Canonical `Edm.Single` text, same rules as [`format_double`].
#[must_use]
pub fn format_single(v: f32) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        String::from(if v > 0.0 { "INF" } else { "-INF" })
    } else {
        exponent_form(format!("{v:?}"))
    }
}

fn exponent_form(debug: String) -> String {
    match debug.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}E{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}E+{exp}"),
        None => debug,
    }
}

fn parse_float<T: FromStr + FloatSpecials>(text: &str) -> Option<T> {
    match text {
        "INF" => Some(T::INFINITY),
        "-INF" => Some(T::NEG_INFINITY),
        "NaN" => Some(T::NAN),
        _ if text.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c)) => text.parse().ok(),
        _ => None,
    }
}

trait FloatSpecials {
    const INFINITY: Self;
    const NEG_INFINITY: Self;
    const NAN: Self;
}

impl FloatSpecials for f64 {
    const INFINITY: Self = Self::INFINITY;
    const NEG_INFINITY: Self = Self::NEG_INFINITY;
    const NAN: Self = Self::NAN;
}

impl FloatSpecials for f32 {
    const INFINITY: Self = Self::INFINITY;
    const NEG_INFINITY: Self = Self::NEG_INFINITY;
    const NAN: Self = Self::NAN;
}
