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

//! URI literal forms of primitive values.
//!
//! | Kind | Literal |
//! |------|---------|
//! | integers | `42`, Int64 `42L` |
//! | Single / Double | `1.5f` / `1.5D`, `.0` added to integral doubles |
//! | Decimal | `1.5M` |
//! | String | `'it''s'` |
//! | Guid | `guid'…'` |
//! | DateTimeOffset / Duration | `datetimeoffset'…'` / `duration'…'` |
//! | Binary | `X'0AFF'` |
//! | spatial | `geography'…'` / `geometry'…'` |
//! | enum | `NS.Color'Red,Blue'` |

use odata_core::primitive::format_double;
use odata_core::primitive::format_single;
use odata_core::EnumValue;
use odata_core::PrimitiveKind;
use odata_core::PrimitiveValue;
use odata_core::QualifiedName;

/// Literal text of `value`.
#[must_use]
pub fn format_literal(value: &PrimitiveValue) -> String {
    match value {
        PrimitiveValue::Null => "null".into(),
        PrimitiveValue::Int64(v) => format!("{v}L"),
        PrimitiveValue::Single(v) => format!("{}f", format_single(*v)),
        PrimitiveValue::Double(v) => format!("{}D", with_fraction(format_double(*v))),
        PrimitiveValue::Decimal(_) => format!("{}M", value.canonical_text()),
        PrimitiveValue::String(s) => quote(s),
        PrimitiveValue::Guid(_) => format!("guid'{}'", value.canonical_text()),
        PrimitiveValue::DateTimeOffset(_) => format!("datetimeoffset'{}'", value.canonical_text()),
        PrimitiveValue::Duration(_) => format!("duration'{}'", value.canonical_text()),
        PrimitiveValue::Binary(_) => format!("X'{}'", value.canonical_text()),
        PrimitiveValue::Spatial(s) => {
            let prefix = if s.kind.is_geography() {
                "geography"
            } else {
                "geometry"
            };
            format!("{prefix}'{}'", s.text())
        }
        PrimitiveValue::Enum(e) => format!("{}'{}'", e.type_name, e.member_text()),
        PrimitiveValue::Boolean(_)
        | PrimitiveValue::Byte(_)
        | PrimitiveValue::SByte(_)
        | PrimitiveValue::Int16(_)
        | PrimitiveValue::Int32(_)
        | PrimitiveValue::Date(_)
        | PrimitiveValue::TimeOfDay(_) => value.canonical_text(),
    }
}

/// Single-quoted string with embedded quotes doubled.
#[must_use]
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn with_fraction(text: String) -> String {
    if text.contains(['.', 'E', 'e']) || text.contains("INF") || text.contains("NaN") {
        text
    } else {
        text + ".0"
    }
}

/// Value of a numeric literal, suffix included.
pub(crate) fn parse_number(text: &str) -> Option<PrimitiveValue> {
    if matches!(text, "INF" | "-INF" | "NaN") {
        return PrimitiveValue::parse(PrimitiveKind::Double, text).ok();
    }
    let (body, suffix) = match text.char_indices().last() {
        Some((i, c)) if "LlDdFfMm".contains(c) => (&text[..i], Some(c.to_ascii_uppercase())),
        _ => (text, None),
    };
    let float = |kind| PrimitiveValue::parse(kind, body).ok();
    match suffix {
        Some('L') => body.parse().ok().map(PrimitiveValue::Int64),
        Some('D') => float(PrimitiveKind::Double),
        Some('F') => float(PrimitiveKind::Single),
        Some('M') => float(PrimitiveKind::Decimal),
        _ if body.contains(['.', 'e', 'E']) => float(PrimitiveKind::Double),
        _ => body
            .parse()
            .map(PrimitiveValue::Int32)
            .or_else(|_| body.parse().map(PrimitiveValue::Int64))
            .ok(),
    }
}

/// Value of `prefix'body'`. `body` has its quotes already undoubled.
pub(crate) fn parse_typed(prefix: &str, body: &str) -> Option<PrimitiveValue> {
    let kind = match prefix {
        "guid" => PrimitiveKind::Guid,
        "datetimeoffset" | "datetime" => PrimitiveKind::DateTimeOffset,
        "duration" | "time" => PrimitiveKind::Duration,
        "date" => PrimitiveKind::Date,
        "timeofday" => PrimitiveKind::TimeOfDay,
        "X" | "binary" => PrimitiveKind::Binary,
        "geography" | "geometry" => return spatial(prefix == "geography", body),
        _ => return enum_value(prefix, body),
    };
    PrimitiveValue::parse(kind, body).ok()
}

fn spatial(geography: bool, body: &str) -> Option<PrimitiveValue> {
    let wkt = body.split_once(';').map_or(body, |(_, wkt)| wkt);
    let shape = wkt
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let kind = match (geography, shape.as_str()) {
        (true, "point") => PrimitiveKind::GeographyPoint,
        (true, "linestring") => PrimitiveKind::GeographyLineString,
        (true, "polygon") => PrimitiveKind::GeographyPolygon,
        (true, "multipoint") => PrimitiveKind::GeographyMultiPoint,
        (true, "multilinestring") => PrimitiveKind::GeographyMultiLineString,
        (true, "multipolygon") => PrimitiveKind::GeographyMultiPolygon,
        (true, "geometrycollection" | "collection") => PrimitiveKind::GeographyCollection,
        (true, _) => PrimitiveKind::Geography,
        (false, "point") => PrimitiveKind::GeometryPoint,
        (false, "linestring") => PrimitiveKind::GeometryLineString,
        (false, "polygon") => PrimitiveKind::GeometryPolygon,
        (false, "multipoint") => PrimitiveKind::GeometryMultiPoint,
        (false, "multilinestring") => PrimitiveKind::GeometryMultiLineString,
        (false, "multipolygon") => PrimitiveKind::GeometryMultiPolygon,
        (false, "geometrycollection" | "collection") => PrimitiveKind::GeometryCollection,
        (false, _) => PrimitiveKind::Geometry,
    };
    PrimitiveValue::parse(kind, body).ok()
}

fn enum_value(type_name: &str, body: &str) -> Option<PrimitiveValue> {
    let type_name: QualifiedName = type_name.parse().ok()?;
    let members = body
        .split(',')
        .map(|m| m.trim().parse())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    Some(PrimitiveValue::Enum(EnumValue { type_name, members }))
}
