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

//! Expectations for batch reader events.

use crate::Error;
use http::Method;
use http::StatusCode;
use odata_batch::BatchReader;
use odata_batch::FrameReader;
use odata_batch::OperationUrl;
use odata_batch::ReaderState;
use std::io::Read as _;

/// Event produced by a batch reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    ChangesetStart,
    Request {
        method: Method,
        /// Resolved URL, `$id/path` for content ID references.
        url: String,
        content_id: Option<String>,
        body: String,
    },
    Response {
        status: StatusCode,
        content_id: Option<String>,
        body: String,
    },
    ChangesetEnd,
}

impl Expect {
    pub fn request(method: Method, url: impl Into<String>) -> Self {
        Self::Request {
            method,
            url: url.into(),
            content_id: None,
            body: String::new(),
        }
    }

    #[must_use]
    pub const fn response(status: StatusCode) -> Self {
        Self::Response {
            status,
            content_id: None,
            body: String::new(),
        }
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        match &mut self {
            Self::Request { content_id, .. } | Self::Response { content_id, .. } => {
                *content_id = Some(id.into());
            }
            Self::ChangesetStart | Self::ChangesetEnd => {}
        }
        self
    }

    #[must_use]
    pub fn body(mut self, text: &str) -> Self {
        match &mut self {
            Self::Request { body, .. } | Self::Response { body, .. } => *body = text.into(),
            Self::ChangesetStart | Self::ChangesetEnd => {}
        }
        self
    }

    /// Reads the whole batch into events.
    ///
    /// # Errors
    ///
    /// Returns error if the batch cannot be read.
    pub fn read_all<F: FrameReader>(reader: &mut BatchReader<F>) -> Result<Vec<Self>, Error> {
        let mut events = Vec::new();
        while reader.read()? {
            let event = match reader.state() {
                ReaderState::ChangesetStart => Self::ChangesetStart,
                ReaderState::ChangesetEnd => Self::ChangesetEnd,
                _ => {
                    let mut body = String::new();
                    reader
                        .body()?
                        .read_to_string(&mut body)
                        .map_err(|err| Error::Batch(err.into()))?;
                    let op = reader.operation().ok_or(Error::ExpectedOperation)?;
                    match (op.method(), op.status()) {
                        (Some(method), _) => Self::Request {
                            method: method.clone(),
                            url: op.target.as_ref().map(url_text).unwrap_or_default(),
                            content_id: op.content_id.clone(),
                            body,
                        },
                        (None, Some(status)) => Self::Response {
                            status,
                            content_id: op.content_id.clone(),
                            body,
                        },
                        (None, None) => return Err(Error::ExpectedOperation),
                    }
                }
            };
            events.push(event);
        }
        Ok(events)
    }
}

fn url_text(url: &OperationUrl) -> String {
    match url {
        OperationUrl::Absolute(url) => url.to_string(),
        OperationUrl::ContentIdReference { content_id, path } => format!("${content_id}{path}"),
        OperationUrl::Relative(url) => url.clone(),
    }
}
