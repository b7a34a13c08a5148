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

//! Batch reader and writer.
//!
//! A batch is a sequence of operations and change sets carried in one
//! `multipart/mixed` or JSON payload. Both framings share one reader and
//! one writer state machine:
//!
//! ```
//! use http::Method;
//! use odata_batch::BatchReader;
//! use odata_batch::BatchReaderSettings;
//! use odata_batch::BatchRequest;
//! use odata_batch::BatchWriter;
//! use odata_batch::BatchWriterSettings;
//! use odata_batch::ReaderState;
//!
//! let mut writer = BatchWriter::json_requests(Vec::new(), BatchWriterSettings::default());
//! writer.write_start_batch().unwrap();
//! writer.write_start_changeset().unwrap();
//! writer
//!     .create_operation_request(&BatchRequest::new(Method::DELETE, "Customers(1)").content_id("1"))
//!     .unwrap();
//! writer.write_end_changeset().unwrap();
//! writer.write_end_batch().unwrap();
//! let payload = writer.into_inner().into_inner();
//!
//! let mut reader = BatchReader::json(payload.as_slice(), BatchReaderSettings::default());
//! let mut states = Vec::new();
//! while reader.read().unwrap() {
//!     states.push(reader.state());
//! }
//! assert_eq!(
//!     states,
//!     [ReaderState::ChangesetStart, ReaderState::Operation, ReaderState::ChangesetEnd]
//! );
//! ```

/// Bounded body reader.
pub mod body;
pub mod error;
/// JSON framing.
pub mod json;
/// Multipart framing.
pub mod multipart;
/// Operations and their start lines.
pub mod operation;
/// Reader state machine.
pub mod reader;
/// Writer state machine.
pub mod writer;

pub use body::BodyReader;
pub use body::Bounded;
pub use error::BatchError;
pub use json::JsonReader;
pub use json::JsonWriter;
pub use multipart::MultipartReader;
pub use multipart::MultipartWriter;
pub use operation::boundary_of;
pub use operation::BatchRequest;
pub use operation::BatchResponse;
pub use operation::MessageKind;
pub use operation::Operation;
pub use operation::OperationUrl;
pub use operation::StartLine;
pub use reader::BatchReader;
pub use reader::BatchReaderSettings;
pub use reader::Frame;
pub use reader::FrameReader;
pub use reader::ReaderState;
pub use writer::BatchWriter;
pub use writer::BatchWriterSettings;
pub use writer::FrameWriter;
pub use writer::WriterState;
