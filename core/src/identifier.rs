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

//! CSDL identifiers (17 Attribute Values).
//!
//! - [`SimpleIdentifier`]: a letter or underscore followed by letters,
//!   digits or underscores.
//! - [`Namespace`]: dot-separated simple identifiers, never empty.
//! - [`QualifiedName`]: namespace plus simple identifier, the identity
//!   of every schema element.
//! - [`TypeName`]: qualified name or `Collection(qualified name)`.

use serde::de::Error as DeError;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

/// Namespace of the EDM primitive types.
pub const EDM_NAMESPACE: &str = "Edm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidSimpleIdentifier(String),
    InvalidQualifiedIdentifier(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidSimpleIdentifier(id) => write!(f, "invalid simple identifier {id}"),
            Self::InvalidQualifiedIdentifier(id) => write!(f, "invalid qualified identifier {id}"),
        }
    }
}

impl StdError for Error {}

/// 17.1 `Namespace`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    pub ids: Vec<SimpleIdentifier>,
}

impl Namespace {
    /// `Edm` namespace of primitive types.
    #[must_use]
    pub fn edm() -> Self {
        Self {
            ids: vec![SimpleIdentifier(EDM_NAMESPACE.into())],
        }
    }

    #[must_use]
    pub fn is_edm(&self) -> bool {
        self.ids.len() == 1 && self.ids[0].inner() == EDM_NAMESPACE
    }

    /// Qualify `name` with this namespace.
    #[must_use]
    pub fn qualify(&self, name: SimpleIdentifier) -> QualifiedName {
        QualifiedName {
            namespace: self.clone(),
            name,
        }
    }
}

impl FromStr for Namespace {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            ids: s
                .split('.')
                .map(SimpleIdentifier::from_str)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut iter = self.ids.iter();
        if let Some(v) = iter.next() {
            v.fmt(f)?;
        }
        for v in iter {
            ".".fmt(f)?;
            v.fmt(f)?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct NsVisitor {}
        impl Visitor<'_> for NsVisitor {
            type Value = Namespace;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("Namespace string")
            }
            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(DeError::custom)
            }
        }

        de.deserialize_string(NsVisitor {})
    }
}

/// 17.2 `SimpleIdentifier`
#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct SimpleIdentifier(String);

impl SimpleIdentifier {
    // Caller guarantees `s` is a valid identifier.
    pub(crate) fn from_static(s: &'static str) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub const fn inner(&self) -> &String {
        &self.0
    }
}

impl Display for SimpleIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

impl AsRef<str> for SimpleIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SimpleIdentifier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();

        // Normative: starts with a letter or underscore, followed by
        // at most 127 letters, underscores or digits.
        //
        // Implementation: we don't check max length.
        chars
            .next()
            .and_then(|first| {
                if first.is_alphabetic() || first == '_' {
                    Some(())
                } else {
                    None
                }
            })
            .ok_or_else(|| Error::InvalidSimpleIdentifier(s.into()))?;

        if chars.any(|c| !c.is_alphanumeric() && c != '_') {
            Err(Error::InvalidSimpleIdentifier(s.into()))
        } else {
            Ok(Self(s.into()))
        }
    }
}

impl<'de> Deserialize<'de> for SimpleIdentifier {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct SiVisitor {}
        impl Visitor<'_> for SiVisitor {
            type Value = SimpleIdentifier;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("SimpleIdentifier string")
            }
            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(DeError::custom)
            }
        }

        de.deserialize_string(SiVisitor {})
    }
}

/// 17.3 `QualifiedName`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    pub namespace: Namespace,
    pub name: SimpleIdentifier,
}

impl QualifiedName {
    #[must_use]
    pub const fn new(namespace: Namespace, name: SimpleIdentifier) -> Self {
        Self { namespace, name }
    }

    /// Name in `Edm` namespace, for example `Edm.String`.
    #[must_use]
    pub fn is_edm(&self) -> bool {
        self.namespace.is_edm()
    }
}

impl FromStr for QualifiedName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ids = s
            .split('.')
            .map(SimpleIdentifier::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidQualifiedIdentifier(s.into()))?;
        let name = ids
            .pop()
            .ok_or_else(|| Error::InvalidQualifiedIdentifier(s.into()))?;
        if ids.is_empty() {
            return Err(Error::InvalidQualifiedIdentifier(s.into()));
        }
        Ok(Self {
            namespace: Namespace { ids },
            name,
        })
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// 17.4 `TypeName`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    One(QualifiedName),
    CollectionOf(QualifiedName),
}

impl TypeName {
    #[must_use]
    pub const fn qualified_name(&self) -> &QualifiedName {
        match self {
            Self::One(v) | Self::CollectionOf(v) => v,
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::CollectionOf(_))
    }
}

impl FromStr for TypeName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const COLLECTION_PREFIX: &str = "Collection(";
        const COLLECTION_SUFFIX: &str = ")";
        if s.starts_with(COLLECTION_PREFIX) && s.ends_with(COLLECTION_SUFFIX) {
            let qtype = s[COLLECTION_PREFIX.len()..s.len() - COLLECTION_SUFFIX.len()].parse()?;
            Ok(Self::CollectionOf(qtype))
        } else {
            Ok(Self::One(s.parse()?))
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::One(v) => v.fmt(f),
            Self::CollectionOf(v) => write!(f, "Collection({v})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::from_str as json_from_str;

    #[test]
    fn test_namespace_valid() {
        let valid_cases = vec!["Namespace", "My.Namespace", "My.Complex.Namespace", "Edm"];

        for case in valid_cases {
            let ns = Namespace::from_str(case);
            assert!(ns.is_ok(), "Failed to parse valid Namespace: {}", case);

            let ns = ns.unwrap();
            let expected_count = case.chars().filter(|c| *c == '.').count() + 1;
            assert_eq!(ns.ids.len(), expected_count);
        }
    }

    #[test]
    fn test_namespace_invalid() {
        let invalid_cases = vec![
            "Invalid.123Name", // Invalid SimpleIdentifier
            "Namespace.",      // Trailing dot
            ".Namespace",      // Leading dot
            "Namespace..Name", // Double dot
            "",                // Empty string
        ];

        for case in invalid_cases {
            assert!(
                Namespace::from_str(case).is_err(),
                "Should reject invalid Namespace: {}",
                case
            );
        }
    }

    #[test]
    fn test_namespace_is_edm() {
        assert!(Namespace::from_str("Edm").unwrap().is_edm());
        assert!(Namespace::edm().is_edm());

        let not_edm = vec![
            Namespace::from_str("NotEdm").unwrap(),
            Namespace::from_str("Edm.Something").unwrap(),
            Namespace::from_str("Something.Edm").unwrap(),
        ];

        for ns in not_edm {
            assert!(!ns.is_edm());
        }
    }

    #[test]
    fn test_namespace_display() {
        for (input, expected) in [
            ("SingleNamespace", "SingleNamespace"),
            ("My.Namespace", "My.Namespace"),
            ("Complex.Name.Space", "Complex.Name.Space"),
        ] {
            let ns = Namespace::from_str(input).unwrap();
            assert_eq!(ns.to_string(), expected);
        }
    }

    #[test]
    fn test_namespace_deserialize() {
        let ns: Namespace =
            json_from_str(r#""My.Valid.Namespace""#).expect("Should deserialize valid Namespace");
        assert_eq!(ns.ids.len(), 3);

        let result: Result<Namespace, _> = json_from_str(r#""Invalid..Namespace""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_simple_identifier_valid() {
        for case in ["Name", "name", "_name", "Name123", "Name_with_underscores", "a"] {
            assert!(
                SimpleIdentifier::from_str(case).is_ok(),
                "Failed to parse valid SimpleIdentifier: {}",
                case
            );
        }
    }

    #[test]
    fn test_simple_identifier_invalid() {
        for case in [
            "123Name",
            "Name-with-hyphens",
            "Name.with.dots",
            "Name with spaces",
            "",
            "$Name",
        ] {
            assert!(
                SimpleIdentifier::from_str(case).is_err(),
                "Should reject invalid SimpleIdentifier: {}",
                case
            );
        }
    }

    #[test]
    fn test_qualified_name_valid() {
        for case in [
            "Namespace.Name",
            "My.Namespace.Name",
            "Complex.Namespace.Structure.Name",
        ] {
            let qn = QualifiedName::from_str(case).unwrap();
            let parts: Vec<&str> = case.split('.').collect();
            assert_eq!(qn.name.to_string(), *parts.last().unwrap());
            assert_eq!(qn.namespace.ids.len(), parts.len() - 1);
            assert_eq!(qn.to_string(), case);
        }
    }

    #[test]
    fn test_qualified_name_invalid() {
        for case in [
            "Invalid.123Name",
            "Name-with-hyphens",
            "Namespace.",
            ".Namespace",
            "Namespace..Name",
            "",
            "Name with spaces",
            "Name.with.123invalid",
            // Namespace must not be empty.
            "Name",
        ] {
            assert!(
                QualifiedName::from_str(case).is_err(),
                "Should reject invalid QualifiedName: {}",
                case
            );
        }
    }

    #[test]
    fn test_type_name() {
        let one: TypeName = "Edm.String".parse().unwrap();
        assert!(!one.is_collection());
        let many: TypeName = "Collection(My.Namespace.Type)".parse().unwrap();
        assert!(many.is_collection());
        assert_eq!(many.qualified_name().to_string(), "My.Namespace.Type");
        assert_eq!(many.to_string(), "Collection(My.Namespace.Type)");

        for case in [
            "Collection()",
            "Collection(Edm/Invalid)",
            "Collection(Edm.String",
            "CollectionEdm.String)",
            "Collection Edm.String",
        ] {
            assert!(
                TypeName::from_str(case).is_err(),
                "Should reject invalid TypeName: {}",
                case
            );
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidSimpleIdentifier("123invalid".to_string()).to_string(),
            "invalid simple identifier 123invalid"
        );
        assert_eq!(
            Error::InvalidQualifiedIdentifier("invalid..qualified".to_string()).to_string(),
            "invalid qualified identifier invalid..qualified"
        );
    }
}
