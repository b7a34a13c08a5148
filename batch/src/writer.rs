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

use crate::error::BatchError;
use crate::json::JsonWriter;
use crate::multipart::MultipartWriter;
use crate::operation::BatchRequest;
use crate::operation::BatchResponse;
use crate::operation::MessageKind;
use crate::operation::Outgoing;
use http::Method;
use std::collections::HashSet;
use std::io::Write;
use tracing::debug;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct BatchWriterSettings {
    /// Multipart batch boundary. Generated when unset.
    pub boundary: Option<String>,
    /// Base for relative request URLs. Relative URLs are written as is
    /// when unset.
    pub base_uri: Option<Url>,
}

/// Framing of a batch payload on the writing side. Calls arrive in an
/// order already checked by the batch writer.
pub trait FrameWriter {
    /// # Errors
    ///
    /// Returns error if the output fails.
    fn start_batch(&mut self) -> Result<(), BatchError>;
    /// # Errors
    ///
    /// Returns error if the output fails.
    fn start_changeset(&mut self, group: &str) -> Result<(), BatchError>;
    /// Writes one operation with its final URL.
    ///
    /// # Errors
    ///
    /// Returns error if the operation cannot be framed or the output
    /// fails.
    fn operation(&mut self, operation: Outgoing<'_>, url: &str) -> Result<(), BatchError>;
    /// # Errors
    ///
    /// Returns error if the output fails.
    fn end_changeset(&mut self) -> Result<(), BatchError>;
    /// # Errors
    ///
    /// Returns error if the output fails.
    fn end_batch(&mut self) -> Result<(), BatchError>;
    /// # Errors
    ///
    /// Returns error if the output fails.
    fn flush(&mut self) -> Result<(), BatchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    NotStarted,
    BatchStarted,
    ChangesetStarted,
    OperationCreated,
    ChangesetCompleted,
    BatchCompleted,
    /// Writing failed. Output is undefined past the last completed part.
    Error,
}

impl WriterState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::BatchStarted => "BatchStarted",
            Self::ChangesetStarted => "ChangesetStarted",
            Self::OperationCreated => "OperationCreated",
            Self::ChangesetCompleted => "ChangesetCompleted",
            Self::BatchCompleted => "BatchCompleted",
            Self::Error => "Error",
        }
    }
}

/// Push writer of a batch payload.
///
/// ```
/// use http::Method;
/// use odata_batch::BatchRequest;
/// use odata_batch::BatchWriter;
/// use odata_batch::BatchWriterSettings;
///
/// let settings = BatchWriterSettings {
///     boundary: Some("batch_1".into()),
///     ..BatchWriterSettings::default()
/// };
/// let mut writer = BatchWriter::multipart_requests(Vec::new(), settings);
/// writer.write_start_batch().unwrap();
/// writer.create_operation_request(&BatchRequest::new(Method::GET, "Customers")).unwrap();
/// writer.write_end_batch().unwrap();
/// let text = String::from_utf8(writer.into_inner().into_inner()).unwrap();
/// assert!(text.starts_with("--batch_1\r\nContent-Type: application/http\r\n"));
/// assert!(text.ends_with("--batch_1--\r\n"));
/// ```
pub struct BatchWriter<F> {
    frames: F,
    kind: MessageKind,
    settings: BatchWriterSettings,
    state: WriterState,
    in_changeset: bool,
    /// Content IDs of the current change set, or of the top level.
    scope_ids: HashSet<String>,
    top_level_ids: HashSet<String>,
    /// Every content ID written so far, for `dependsOn`.
    written_ids: HashSet<String>,
}

impl<W: Write> BatchWriter<MultipartWriter<W>> {
    fn multipart(output: W, kind: MessageKind, settings: BatchWriterSettings) -> Self {
        let boundary = settings
            .boundary
            .clone()
            .unwrap_or_else(|| format!("batch_{}", Uuid::new_v4()));
        Self::new(MultipartWriter::new(output, boundary), kind, settings)
    }

    pub fn multipart_requests(output: W, settings: BatchWriterSettings) -> Self {
        Self::multipart(output, MessageKind::Request, settings)
    }

    pub fn multipart_responses(output: W, settings: BatchWriterSettings) -> Self {
        Self::multipart(output, MessageKind::Response, settings)
    }
}

impl<W: Write> BatchWriter<JsonWriter<W>> {
    pub fn json_requests(output: W, settings: BatchWriterSettings) -> Self {
        Self::new(
            JsonWriter::new(output, MessageKind::Request),
            MessageKind::Request,
            settings,
        )
    }

    pub fn json_responses(output: W, settings: BatchWriterSettings) -> Self {
        Self::new(
            JsonWriter::new(output, MessageKind::Response),
            MessageKind::Response,
            settings,
        )
    }
}

impl<F: FrameWriter> BatchWriter<F> {
    pub fn new(frames: F, kind: MessageKind, settings: BatchWriterSettings) -> Self {
        Self {
            frames,
            kind,
            settings,
            state: WriterState::NotStarted,
            in_changeset: false,
            scope_ids: HashSet::new(),
            top_level_ids: HashSet::new(),
            written_ids: HashSet::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> WriterState {
        self.state
    }

    /// Framing writer, e.g. to read the multipart boundary.
    #[must_use]
    pub const fn framing(&self) -> &F {
        &self.frames
    }

    pub fn into_inner(self) -> F {
        self.frames
    }

    /// # Errors
    ///
    /// Returns usage error unless this is the first call.
    pub fn write_start_batch(&mut self) -> Result<(), BatchError> {
        self.check("write_start_batch", self.state == WriterState::NotStarted)?;
        let result = self.frames.start_batch();
        self.enter(result, WriterState::BatchStarted)
    }

    /// Starts a change set. Returns its group, which is the change set
    /// boundary in multipart and the atomicity group in JSON.
    ///
    /// # Errors
    ///
    /// Returns usage error outside the batch or inside another change
    /// set.
    pub fn write_start_changeset(&mut self) -> Result<String, BatchError> {
        self.check(
            "write_start_changeset",
            self.top_level_open() && !self.in_changeset,
        )?;
        let group = format!("changeset_{}", Uuid::new_v4());
        let result = self.frames.start_changeset(&group);
        self.enter(result, WriterState::ChangesetStarted)?;
        self.in_changeset = true;
        self.top_level_ids = std::mem::take(&mut self.scope_ids);
        Ok(group)
    }

    /// # Errors
    ///
    /// Returns usage error if the state does not allow an operation or
    /// this is a response batch, or `GET` inside a change set. Returns
    /// error on duplicate content ID in the change set and on unknown
    /// `dependsOn` IDs.
    pub fn create_operation_request(&mut self, request: &BatchRequest) -> Result<(), BatchError> {
        if self.kind != MessageKind::Request {
            return Err(BatchError::MessageKind("responses"));
        }
        if self.in_changeset && request.method == Method::GET {
            return Err(BatchError::Usage {
                call: "create_operation_request(GET)",
                state: self.state.as_str(),
            });
        }
        if let Some(id) = request.depends_on.iter().find(|id| !self.written_ids.contains(*id)) {
            return Err(BatchError::UnknownContentId(id.clone()));
        }
        let url = self.request_url(&request.url);
        self.operation("create_operation_request", Outgoing::Request(request), &url)
    }

    /// # Errors
    ///
    /// Returns usage error if the state does not allow an operation or
    /// this is a request batch. Returns error on duplicate content ID in
    /// the change set.
    pub fn create_operation_response(
        &mut self,
        response: &BatchResponse,
    ) -> Result<(), BatchError> {
        if self.kind != MessageKind::Response {
            return Err(BatchError::MessageKind("requests"));
        }
        self.operation("create_operation_response", Outgoing::Response(response), "")
    }

    /// # Errors
    ///
    /// Returns usage error without a matching `write_start_changeset`.
    pub fn write_end_changeset(&mut self) -> Result<(), BatchError> {
        self.check(
            "write_end_changeset",
            self.in_changeset
                && matches!(
                    self.state,
                    WriterState::ChangesetStarted | WriterState::OperationCreated
                ),
        )?;
        let result = self.frames.end_changeset();
        self.enter(result, WriterState::ChangesetCompleted)?;
        self.in_changeset = false;
        self.scope_ids = std::mem::take(&mut self.top_level_ids);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns usage error before the batch start, inside a change set
    /// and on a second call.
    pub fn write_end_batch(&mut self) -> Result<(), BatchError> {
        self.check(
            "write_end_batch",
            self.top_level_open() && !self.in_changeset,
        )?;
        let result = self.frames.end_batch().and_then(|()| self.frames.flush());
        self.enter(result, WriterState::BatchCompleted)
    }

    /// # Errors
    ///
    /// Returns error if the output fails.
    pub fn flush(&mut self) -> Result<(), BatchError> {
        self.check("flush", self.state != WriterState::Error)?;
        let result = self.frames.flush();
        let state = self.state;
        self.enter(result, state)
    }

    fn top_level_open(&self) -> bool {
        matches!(
            self.state,
            WriterState::BatchStarted
                | WriterState::OperationCreated
                | WriterState::ChangesetCompleted
        )
    }

    fn operation(
        &mut self,
        call: &'static str,
        operation: Outgoing<'_>,
        url: &str,
    ) -> Result<(), BatchError> {
        self.check(
            call,
            self.top_level_open() || self.state == WriterState::ChangesetStarted,
        )?;
        if let Some(id) = operation.content_id() {
            if self.scope_ids.contains(id) {
                return Err(BatchError::DuplicateContentId(id.to_string()));
            }
        }
        let result = self.frames.operation(operation, url);
        self.enter(result, WriterState::OperationCreated)?;
        if let Some(id) = operation.content_id() {
            self.scope_ids.insert(id.to_string());
            self.written_ids.insert(id.to_string());
        }
        Ok(())
    }

    fn request_url(&self, url: &str) -> String {
        if url.starts_with('$') || Url::parse(url).is_ok() {
            return url.to_string();
        }
        self.settings
            .base_uri
            .as_ref()
            .and_then(|base| base.join(url).ok())
            .map_or_else(|| url.to_string(), String::from)
    }

    fn check(&self, call: &'static str, legal: bool) -> Result<(), BatchError> {
        if legal {
            Ok(())
        } else {
            Err(BatchError::Usage {
                call,
                state: self.state.as_str(),
            })
        }
    }

    fn enter(&mut self, result: Result<(), BatchError>, state: WriterState) -> Result<(), BatchError> {
        match result {
            Ok(()) => {
                debug!(from = self.state.as_str(), to = state.as_str(), "batch writer");
                self.state = state;
                Ok(())
            }
            Err(err) => {
                debug!(from = self.state.as_str(), %err, "batch writer failed");
                self.state = WriterState::Error;
                Err(err)
            }
        }
    }
}
