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

//! Errors for tests

use odata_batch::BatchError;
use odata_csdl::WriteError;
use odata_query::Error as QueryError;
use odata_query::ParseError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug)]
pub enum Error {
    /// Reader diagnostics of a fixture that failed to load.
    Csdl(Vec<String>),
    Validation(Vec<String>),
    Write(WriteError),
    Expression(ParseError),
    Query(QueryError),
    Batch(BatchError),
    Url(url::ParseError),
    EntitySetNotFound(String),
    ExpectedOperation,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Csdl(lines) => write!(f, "CSDL errors: {}", lines.join("; ")),
            Self::Validation(lines) => write!(f, "validation errors: {}", lines.join("; ")),
            Self::Write(err) => write!(f, "write error: {err}"),
            Self::Expression(err) => write!(f, "expression error {err}"),
            Self::Query(err) => write!(f, "query error {err}"),
            Self::Batch(err) => write!(f, "batch error: {err}"),
            Self::Url(err) => write!(f, "url error: {err}"),
            Self::EntitySetNotFound(name) => write!(f, "entity set not found: {name}"),
            Self::ExpectedOperation => write!(f, "reader is not at an operation"),
        }
    }
}

impl StdError for Error {}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        Self::Write(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Expression(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

impl From<BatchError> for Error {
    fn from(err: BatchError) -> Self {
        Self::Batch(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err)
    }
}
