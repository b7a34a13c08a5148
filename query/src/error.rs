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

use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnterminatedString,
    UnexpectedCharacter(char),
    UnexpectedToken(String),
    UnexpectedEnd,
    InvalidLiteral(String),
    /// Property not declared by the type it is read from.
    UnknownProperty { type_name: String, property: String },
    /// `any`, `all` or `$count` applied to a single value.
    NotACollection(String),
    UnknownOption(String),
    DuplicateOption(String),
    InvalidOptionValue { option: String, value: String },
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            Self::UnexpectedToken(t) => write!(f, "unexpected '{t}'"),
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::InvalidLiteral(t) => write!(f, "invalid literal {t}"),
            Self::UnknownProperty {
                type_name,
                property,
            } => write!(f, "type {type_name} has no property {property}"),
            Self::NotACollection(t) => write!(f, "{t} is not a collection"),
            Self::UnknownOption(o) => write!(f, "unknown query option {o}"),
            Self::DuplicateOption(o) => write!(f, "query option {o} given twice"),
            Self::InvalidOptionValue { option, value } => {
                write!(f, "invalid value '{value}' of {option}")
            }
        }
    }
}

/// Query text error at a character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Offset in characters from the start of the parsed text.
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    #[must_use]
    pub const fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "at position {}: {}", self.offset, self.kind)
    }
}

impl StdError for ParseError {}

/// Error of a query option, with the option it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Option(String, ParseError),
    InvalidBase(url::ParseError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Option(option, err) => write!(f, "while parsing {option}: {err}"),
            Self::InvalidBase(err) => write!(f, "invalid service URL: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Option(_, err) => Some(err),
            Self::InvalidBase(err) => Some(err),
        }
    }
}
