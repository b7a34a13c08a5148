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

//! Parse diagnostics.

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Warning => "warning".fmt(f),
            Self::Error => "error".fmt(f),
        }
    }
}

/// Position in an XML document. Both numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// Not well-formed XML. Parsing stops.
    MalformedXml,
    /// Unknown `edmx:Edmx` version or CSDL namespace. Parsing stops.
    UnsupportedVersion,
    /// Element not permitted at this place.
    UnexpectedElement,
    MissingAttribute,
    /// Attribute value is not a valid literal.
    InvalidAttribute,
    /// Attribute not known for the element. Ignored.
    UnusedAttribute,
    /// Element rejected by the model (duplicate names and alike).
    StructuralConflict,
    /// `Association`, role or entity set of a legacy document not found.
    UnresolvedRelationship,
    /// Referenced document could not be loaded.
    UnresolvedReference,
    /// Referenced document refers back to a document being loaded.
    ReferenceCycle,
    /// Input could not be read.
    Io,
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MalformedXml => "malformed-xml",
            Self::UnsupportedVersion => "unsupported-version",
            Self::UnexpectedElement => "unexpected-element",
            Self::MissingAttribute => "missing-attribute",
            Self::InvalidAttribute => "invalid-attribute",
            Self::UnusedAttribute => "unused-attribute",
            Self::StructuralConflict => "structural-conflict",
            Self::UnresolvedRelationship => "unresolved-relationship",
            Self::UnresolvedReference => "unresolved-reference",
            Self::ReferenceCycle => "reference-cycle",
            Self::Io => "io",
        }
        .fmt(f)
    }
}

/// One finding of the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub location: Option<Location>,
    pub message: String,
    /// URI of the referenced document; `None` for the main document.
    pub document: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(code: DiagnosticCode, location: Option<Location>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            location,
            message: message.into(),
            document: None,
        }
    }

    #[must_use]
    pub fn warning(
        code: DiagnosticCode,
        location: Option<Location>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, location, message)
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(document) = &self.document {
            write!(f, "{document}:")?;
        }
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)
    }
}

/// Value together with the diagnostics produced while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// Take the diagnostics of `other` and return its value.
    pub fn absorb<U>(&mut self, other: Parsed<U>) -> U {
        self.diagnostics.extend(other.diagnostics);
        other.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}
