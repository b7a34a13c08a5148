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

use crate::body::BodyReader;
use crate::error::BatchError;
use crate::json::JsonReader;
use crate::multipart::MultipartReader;
use crate::operation::boundary_of;
use crate::operation::Operation;
use crate::operation::OperationUrl;
use crate::operation::StartLine;
use http::header::HOST;
use std::collections::HashSet;
use std::io::BufRead;
use tracing::debug;
use tracing::warn;
use url::Url;

/// Default limit of a single batch part.
pub const DEFAULT_MAX_PART_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct BatchReaderSettings {
    /// Base for relative operation URLs. When unset, the base is taken
    /// from the `Host` header of the first operation.
    pub base_uri: Option<Url>,
    pub max_part_size: usize,
}

impl Default for BatchReaderSettings {
    fn default() -> Self {
        Self {
            base_uri: None,
            max_part_size: DEFAULT_MAX_PART_SIZE,
        }
    }
}

/// Unit of a batch payload as seen by the framing.
#[derive(Debug)]
pub enum Frame {
    ChangesetStart { group: String },
    Operation(Operation),
    ChangesetEnd,
    End,
}

/// Framing of a batch payload. Implementations split the payload into
/// frames; the batch reader checks their order.
pub trait FrameReader {
    /// Next frame. `End` is returned once and then repeatedly.
    ///
    /// # Errors
    ///
    /// Returns error if the payload is malformed or the stream fails.
    fn next_frame(&mut self) -> Result<Frame, BatchError>;
}

impl<F: FrameReader + ?Sized> FrameReader for Box<F> {
    fn next_frame(&mut self) -> Result<Frame, BatchError> {
        (**self).next_frame()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Nothing has been read. The batch start is consumed by the first
    /// `read()` together with the first item, so there is no separate
    /// not-started state.
    Initial,
    Operation,
    ChangesetStart,
    ChangesetEnd,
    Completed,
    /// Reading failed. Nothing can be read any more.
    Exception,
}

impl ReaderState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Operation => "Operation",
            Self::ChangesetStart => "ChangesetStart",
            Self::ChangesetEnd => "ChangesetEnd",
            Self::Completed => "Completed",
            Self::Exception => "Exception",
        }
    }
}

/// Pull reader over a batch payload.
///
/// ```
/// use odata_batch::BatchReader;
/// use odata_batch::BatchReaderSettings;
/// use odata_batch::ReaderState;
///
/// let payload = "--b\r\nContent-Type: application/http\r\n\r\n\
///                GET Customers HTTP/1.1\r\nHost: example.org\r\n\r\n\r\n--b--\r\n";
/// let mut reader = BatchReader::multipart(payload.as_bytes(), "b", BatchReaderSettings::default());
/// assert!(reader.read().unwrap());
/// assert_eq!(reader.state(), ReaderState::Operation);
/// let url = reader.operation().unwrap().target.clone();
/// assert_eq!(
///     url,
///     Some(odata_batch::OperationUrl::Absolute("http://example.org/Customers".parse().unwrap()))
/// );
/// assert!(!reader.read().unwrap());
/// ```
pub struct BatchReader<F> {
    frames: F,
    settings: BatchReaderSettings,
    state: ReaderState,
    in_changeset: bool,
    base: Option<Url>,
    base_checked: bool,
    content_ids: HashSet<String>,
    current: Option<Operation>,
}

impl<R: BufRead> BatchReader<MultipartReader<R>> {
    /// Reader of a `multipart/mixed` payload with the given boundary.
    pub fn multipart(input: R, boundary: &str, settings: BatchReaderSettings) -> Self {
        let frames = MultipartReader::new(input, boundary, settings.max_part_size);
        Self::new(frames, settings)
    }
}

impl<R: BufRead> BatchReader<JsonReader<R>> {
    /// Reader of an `application/json` payload.
    pub fn json(input: R, settings: BatchReaderSettings) -> Self {
        let frames = JsonReader::new(input, settings.max_part_size);
        Self::new(frames, settings)
    }
}

impl<'r> BatchReader<Box<dyn FrameReader + 'r>> {
    /// Reader with the framing chosen by the payload content type.
    ///
    /// # Errors
    ///
    /// Returns error if the content type is neither `multipart/mixed`
    /// with a boundary nor JSON.
    pub fn for_content_type<R: BufRead + 'r>(
        input: R,
        content_type: &str,
        settings: BatchReaderSettings,
    ) -> Result<Self, BatchError> {
        let frames: Box<dyn FrameReader + 'r> = if let Some(boundary) = boundary_of(content_type)
        {
            Box::new(MultipartReader::new(
                input,
                boundary,
                settings.max_part_size,
            ))
        } else if content_type
            .split(';')
            .next()
            .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
        {
            Box::new(JsonReader::new(input, settings.max_part_size))
        } else {
            return Err(BatchError::framing(
                0,
                format!("unsupported batch content type: {content_type}"),
            ));
        };
        Ok(Self::new(frames, settings))
    }
}

impl<F: FrameReader> BatchReader<F> {
    pub fn new(frames: F, settings: BatchReaderSettings) -> Self {
        let base = settings.base_uri.clone();
        Self {
            frames,
            base_checked: base.is_some(),
            base,
            settings,
            state: ReaderState::Initial,
            in_changeset: false,
            content_ids: HashSet::new(),
            current: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ReaderState {
        self.state
    }

    #[must_use]
    pub const fn settings(&self) -> &BatchReaderSettings {
        &self.settings
    }

    /// True between `ChangesetStart` and `ChangesetEnd`.
    #[must_use]
    pub const fn in_changeset(&self) -> bool {
        self.in_changeset
    }

    /// Current operation when the state is `Operation`.
    #[must_use]
    pub const fn operation(&self) -> Option<&Operation> {
        self.current.as_ref()
    }

    /// Body of the current operation.
    ///
    /// # Errors
    ///
    /// Returns usage error if the reader is not at an operation.
    pub fn body(&mut self) -> Result<BodyReader<'_>, BatchError> {
        self.current.as_ref().map(Operation::body).ok_or(BatchError::Usage {
            call: "body",
            state: self.state.as_str(),
        })
    }

    /// Moves to the next item. Returns `false` once the batch is
    /// complete.
    ///
    /// # Errors
    ///
    /// Returns error if the payload is malformed. The reader then stays
    /// in `Exception` and further calls are usage errors.
    pub fn read(&mut self) -> Result<bool, BatchError> {
        match self.state {
            ReaderState::Completed => return Ok(false),
            ReaderState::Exception => {
                return Err(BatchError::Usage {
                    call: "read",
                    state: self.state.as_str(),
                })
            }
            _ => {}
        }
        self.current = None;
        match self.advance() {
            Ok(state) => {
                debug!(from = self.state.as_str(), to = state.as_str(), "batch reader");
                self.state = state;
                Ok(state != ReaderState::Completed)
            }
            Err(err) => {
                debug!(from = self.state.as_str(), %err, "batch reader failed");
                self.state = ReaderState::Exception;
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<ReaderState, BatchError> {
        match self.frames.next_frame()? {
            Frame::ChangesetStart { group } => {
                if self.in_changeset {
                    return Err(BatchError::framing(
                        0,
                        format!("change set {group} inside a change set"),
                    ));
                }
                self.in_changeset = true;
                self.content_ids.clear();
                Ok(ReaderState::ChangesetStart)
            }
            Frame::ChangesetEnd => {
                if !self.in_changeset {
                    return Err(BatchError::framing(0, "change set end without start"));
                }
                self.in_changeset = false;
                self.content_ids.clear();
                Ok(ReaderState::ChangesetEnd)
            }
            Frame::Operation(mut operation) => {
                if let Some(length) = operation.content_length() {
                    if length > operation.body.len() {
                        return Err(BatchError::framing(
                            operation.line,
                            format!(
                                "body has {} bytes, Content-Length is {length}",
                                operation.body.len()
                            ),
                        ));
                    }
                }
                let target = match &operation.start {
                    StartLine::Request { url, .. } => Some(self.resolve(url, &operation)),
                    StartLine::Response { .. } => None,
                };
                operation.target = target;
                if let Some(id) = &operation.content_id {
                    if !self.content_ids.insert(id.clone()) {
                        warn!(content_id = %id, line = operation.line, "duplicate content ID");
                    }
                }
                self.current = Some(operation);
                Ok(ReaderState::Operation)
            }
            Frame::End => {
                if self.in_changeset {
                    return Err(BatchError::framing(0, "batch ends inside a change set"));
                }
                Ok(ReaderState::Completed)
            }
        }
    }

    fn resolve(&mut self, raw: &str, operation: &Operation) -> OperationUrl {
        if let Some(reference) = raw.strip_prefix('$') {
            let (id, path) = reference
                .find('/')
                .map_or((reference, ""), |i| reference.split_at(i));
            if self.content_ids.contains(id) {
                return OperationUrl::ContentIdReference {
                    content_id: id.to_string(),
                    path: path.to_string(),
                };
            }
        }
        if let Ok(url) = Url::parse(raw) {
            return OperationUrl::Absolute(url);
        }
        if !self.base_checked {
            self.base_checked = true;
            self.base = operation
                .headers
                .get(HOST)
                .and_then(|host| host.to_str().ok())
                .and_then(|host| Url::parse(&format!("http://{host}/")).ok());
            debug!(base = ?self.base.as_ref().map(Url::as_str), "batch base from Host");
        }
        self.base
            .as_ref()
            .and_then(|base| base.join(raw).ok())
            .map_or_else(|| OperationUrl::Relative(raw.to_string()), OperationUrl::Absolute)
    }
}
