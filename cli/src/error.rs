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

use odata_batch::BatchError;
use odata_core::version::Error as VersionError;
use odata_csdl::WriteError;
use odata_query::Error as QueryError;
use odata_query::ParseError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;
use std::path::PathBuf;
use toml::de::Error as TomlError;

/// Tool errors.
#[derive(Debug)]
pub enum Error {
    Io(PathBuf, IoError),
    Config(PathBuf, TomlError),
    Version(VersionError),
    /// Reader diagnostics of a document that has errors.
    Csdl(PathBuf, Vec<String>),
    Validation(PathBuf, Vec<String>),
    Write(WriteError),
    WriteOutput(PathBuf, IoError),
    UnknownEntitySet(String),
    Expression(ParseError),
    Query(QueryError),
    Batch(PathBuf, BatchError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Io(fname, error) => {
                write!(f, "input/output error: file: {}: {error}", fname.display())
            }
            Self::Config(fname, error) => {
                write!(f, "config file format error: {}: {error}", fname.display())
            }
            Self::Version(error) => write!(f, "{error}"),
            Self::Csdl(fname, lines) => {
                write!(f, "CSDL errors in {}:", fname.display())?;
                lines.iter().try_for_each(|line| write!(f, "\n  {line}"))
            }
            Self::Validation(fname, lines) => {
                write!(f, "validation errors in {}:", fname.display())?;
                lines
                    .iter()
                    .enumerate()
                    .try_for_each(|(no, line)| write!(f, "\n #{no}: {line}"))
            }
            Self::Write(error) => write!(f, "CSDL write error: {error}"),
            Self::WriteOutput(fname, error) => {
                write!(f, "failed write output file: {}: {error}", fname.display())
            }
            Self::UnknownEntitySet(name) => write!(f, "entity set not found: {name}"),
            Self::Expression(error) => write!(f, "expression error {error}"),
            Self::Query(error) => write!(f, "query error {error}"),
            Self::Batch(fname, error) => {
                write!(f, "batch error: file: {}: {error}", fname.display())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(_, err) | Self::WriteOutput(_, err) => Some(err),
            Self::Config(_, err) => Some(err),
            Self::Version(err) => Some(err),
            Self::Write(err) => Some(err),
            Self::Expression(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Batch(_, err) => Some(err),
            Self::Csdl(..) | Self::Validation(..) | Self::UnknownEntitySet(_) => None,
        }
    }
}
