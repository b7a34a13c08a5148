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

use http::header::InvalidHeaderName;
use http::header::InvalidHeaderValue;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;

/// Batch reader and writer errors.
#[derive(Debug)]
pub enum BatchError {
    /// Call is not legal in the current reader or writer state. This is
    /// a defect of the caller and is never collected.
    Usage {
        call: &'static str,
        state: &'static str,
    },
    /// Operation with this content ID was already written in the same
    /// change set.
    DuplicateContentId(String),
    /// `dependsOn` names a content ID that was not written before.
    UnknownContentId(String),
    /// Request operation on a response writer or the other way around.
    MessageKind(&'static str),
    /// Malformed batch payload at the given line.
    Framing { line: usize, message: String },
    /// Part is larger than the configured limit.
    PartTooLarge { line: usize, limit: usize },
    /// Body cannot be carried by the JSON framing.
    Body(String),
    InvalidHeaderName(InvalidHeaderName),
    InvalidHeaderValue(InvalidHeaderValue),
    Json(serde_json::Error),
    Io(IoError),
}

impl BatchError {
    pub(crate) fn framing(line: usize, message: impl Into<String>) -> Self {
        Self::Framing {
            line,
            message: message.into(),
        }
    }
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Usage { call, state } => {
                write!(f, "{call} is not allowed in state {state}")
            }
            Self::DuplicateContentId(id) => {
                write!(f, "content ID {id} is already used in this change set")
            }
            Self::UnknownContentId(id) => write!(f, "unknown content ID: {id}"),
            Self::MessageKind(expected) => write!(f, "batch carries {expected} only"),
            Self::Framing { line, message } => write!(f, "line {line}: {message}"),
            Self::PartTooLarge { line, limit } => {
                write!(f, "line {line}: part exceeds {limit} bytes")
            }
            Self::Body(message) => write!(f, "invalid body: {message}"),
            Self::InvalidHeaderName(err) => write!(f, "invalid header name: {err}"),
            Self::InvalidHeaderValue(err) => write!(f, "invalid header value: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Io(err) => write!(f, "stream error: {err}"),
        }
    }
}

impl StdError for BatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidHeaderName(err) => Some(err),
            Self::InvalidHeaderValue(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IoError> for BatchError {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for BatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<InvalidHeaderName> for BatchError {
    fn from(err: InvalidHeaderName) -> Self {
        Self::InvalidHeaderName(err)
    }
}

impl From<InvalidHeaderValue> for BatchError {
    fn from(err: InvalidHeaderValue) -> Self {
        Self::InvalidHeaderValue(err)
    }
}
