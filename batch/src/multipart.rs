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
use crate::operation::boundary_of;
use crate::operation::format_http_message;
use crate::operation::parse_header_line;
use crate::operation::parse_http_message;
use crate::operation::Outgoing;
use crate::reader::Frame;
use crate::reader::FrameReader;
use crate::writer::FrameWriter;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::HeaderName;
use std::io::BufRead;
use std::io::Write;
use tracing::debug;

const CONTENT_ID: HeaderName = HeaderName::from_static("content-id");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    /// `--boundary`
    Part,
    /// `--boundary--`
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Preamble,
    /// Just after a part delimiter of the innermost boundary.
    PartStart,
    /// Just after the close delimiter of the innermost boundary.
    Closed,
    Done,
}

/// `multipart/mixed` framing reader. A change set is a nested
/// `multipart/mixed` part with its own boundary.
pub struct MultipartReader<R> {
    input: R,
    /// Batch boundary, then the change set boundary when inside one.
    boundaries: Vec<String>,
    position: Position,
    line: usize,
    max_part_size: usize,
}

impl<R: BufRead> MultipartReader<R> {
    pub fn new(input: R, boundary: &str, max_part_size: usize) -> Self {
        Self {
            input,
            boundaries: vec![boundary.to_string()],
            position: Position::Preamble,
            line: 0,
            max_part_size,
        }
    }

    /// Reads one line with its terminator. Empty at end of stream.
    fn next_line(&mut self, buf: &mut Vec<u8>) -> Result<bool, BatchError> {
        buf.clear();
        let n = self.input.read_until(b'\n', buf)?;
        if n > 0 {
            self.line += 1;
        }
        Ok(n > 0)
    }

    fn delimiter(&self, line: &[u8]) -> Option<Delimiter> {
        let boundary = self.boundaries.last()?;
        let rest = line.strip_prefix(b"--")?.strip_prefix(boundary.as_bytes())?;
        let (close, rest) = rest
            .strip_prefix(b"--")
            .map_or((false, rest), |rest| (true, rest));
        rest.iter().all(u8::is_ascii_whitespace).then_some(if close {
            Delimiter::Close
        } else {
            Delimiter::Part
        })
    }

    /// Skips lines up to the next delimiter of the innermost boundary.
    fn skip_to_delimiter(&mut self) -> Result<Delimiter, BatchError> {
        let mut buf = Vec::new();
        loop {
            if !self.next_line(&mut buf)? {
                return Err(self.missing_boundary());
            }
            if let Some(delimiter) = self.delimiter(&buf) {
                return Ok(delimiter);
            }
        }
    }

    /// Collects part content up to the next delimiter. The line break
    /// before the delimiter belongs to the delimiter.
    fn part_content(&mut self) -> Result<(Vec<u8>, Delimiter), BatchError> {
        let start = self.line;
        let mut content = Vec::new();
        let mut buf = Vec::new();
        loop {
            if !self.next_line(&mut buf)? {
                return Err(self.missing_boundary());
            }
            if let Some(delimiter) = self.delimiter(&buf) {
                if content.ends_with(b"\r\n") {
                    content.truncate(content.len() - 2);
                } else if content.ends_with(b"\n") {
                    content.truncate(content.len() - 1);
                }
                return Ok((content, delimiter));
            }
            content.extend_from_slice(&buf);
            if content.len() > self.max_part_size {
                return Err(BatchError::PartTooLarge {
                    line: start + 1,
                    limit: self.max_part_size,
                });
            }
        }
    }

    fn part_headers(&mut self) -> Result<HeaderMap, BatchError> {
        let mut headers = HeaderMap::new();
        let mut buf = Vec::new();
        loop {
            if !self.next_line(&mut buf)? {
                return Err(self.missing_boundary());
            }
            let text = std::str::from_utf8(&buf)
                .map_err(|_| BatchError::framing(self.line, "part header is not text"))?
                .trim_end();
            if text.is_empty() {
                return Ok(headers);
            }
            parse_header_line(&mut headers, text, self.line)?;
        }
    }

    fn missing_boundary(&self) -> BatchError {
        let boundary = self.boundaries.last().map_or("", String::as_str);
        BatchError::framing(
            self.line,
            format!("unexpected end of stream, missing boundary {boundary}"),
        )
    }

    fn after(&mut self, delimiter: Delimiter) {
        self.position = match delimiter {
            Delimiter::Part => Position::PartStart,
            Delimiter::Close => Position::Closed,
        };
    }

    fn part(&mut self) -> Result<Frame, BatchError> {
        let headers = self.part_headers()?;
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if let Some(boundary) = boundary_of(content_type) {
            if self.boundaries.len() > 1 {
                return Err(BatchError::framing(
                    self.line,
                    "change set inside a change set",
                ));
            }
            let group = boundary.to_string();
            debug!(line = self.line, boundary = %group, "change set part");
            self.boundaries.push(group.clone());
            let delimiter = self.skip_to_delimiter()?;
            self.after(delimiter);
            return Ok(Frame::ChangesetStart { group });
        }
        let media = content_type.split(';').next().unwrap_or("").trim();
        if !media.eq_ignore_ascii_case("application/http") {
            return Err(BatchError::framing(
                self.line,
                format!("unsupported part content type: {content_type}"),
            ));
        }
        let first = self.line + 1;
        let (content, delimiter) = self.part_content()?;
        self.after(delimiter);
        let mut operation = parse_http_message(&content, first)?;
        operation.content_id = headers
            .get(CONTENT_ID)
            .or_else(|| operation.headers.get(CONTENT_ID))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if self.boundaries.len() > 1 {
            operation.atomicity_group = self.boundaries.last().cloned();
        }
        Ok(Frame::Operation(operation))
    }
}

impl<R: BufRead> FrameReader for MultipartReader<R> {
    fn next_frame(&mut self) -> Result<Frame, BatchError> {
        match self.position {
            Position::Preamble => {
                let delimiter = self.skip_to_delimiter()?;
                self.after(delimiter);
                if delimiter == Delimiter::Close {
                    self.position = Position::Done;
                    return Ok(Frame::End);
                }
                self.part()
            }
            Position::PartStart => self.part(),
            Position::Closed => {
                if self.boundaries.len() > 1 {
                    self.boundaries.pop();
                    let delimiter = self.skip_to_delimiter()?;
                    self.after(delimiter);
                    Ok(Frame::ChangesetEnd)
                } else {
                    self.position = Position::Done;
                    Ok(Frame::End)
                }
            }
            Position::Done => Ok(Frame::End),
        }
    }
}

/// `multipart/mixed` framing writer.
pub struct MultipartWriter<W> {
    output: W,
    boundary: String,
    changeset: Option<String>,
}

impl<W: Write> MultipartWriter<W> {
    pub fn new(output: W, boundary: impl Into<String>) -> Self {
        Self {
            output,
            boundary: boundary.into(),
            changeset: None,
        }
    }

    /// Batch boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value of the `Content-Type` header of the whole batch.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary={}", self.boundary)
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn current_boundary(&self) -> &str {
        self.changeset.as_deref().unwrap_or(&self.boundary)
    }
}

impl<W: Write> FrameWriter for MultipartWriter<W> {
    fn start_batch(&mut self) -> Result<(), BatchError> {
        Ok(())
    }

    fn start_changeset(&mut self, group: &str) -> Result<(), BatchError> {
        write!(
            self.output,
            "--{}\r\nContent-Type: multipart/mixed; boundary={group}\r\n\r\n",
            self.boundary
        )?;
        self.changeset = Some(group.to_string());
        Ok(())
    }

    fn operation(&mut self, operation: Outgoing<'_>, url: &str) -> Result<(), BatchError> {
        let mut part = Vec::new();
        part.extend_from_slice(
            format!(
                "--{}\r\nContent-Type: application/http\r\nContent-Transfer-Encoding: binary\r\n",
                self.current_boundary()
            )
            .as_bytes(),
        );
        if let Some(id) = operation.content_id() {
            part.extend_from_slice(format!("Content-ID: {id}\r\n").as_bytes());
        }
        part.extend_from_slice(b"\r\n");
        format_http_message(&mut part, operation, url);
        part.extend_from_slice(b"\r\n");
        self.output.write_all(&part)?;
        Ok(())
    }

    fn end_changeset(&mut self) -> Result<(), BatchError> {
        if let Some(group) = self.changeset.take() {
            write!(self.output, "--{group}--\r\n")?;
        }
        Ok(())
    }

    fn end_batch(&mut self) -> Result<(), BatchError> {
        write!(self.output, "--{}--\r\n", self.boundary)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BatchError> {
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(payload: &str) -> Result<Vec<String>, BatchError> {
        let mut reader = MultipartReader::new(payload.as_bytes(), "batch", 1024);
        let mut out = Vec::new();
        loop {
            match reader.next_frame()? {
                Frame::ChangesetStart { group } => out.push(format!("start {group}")),
                Frame::Operation(op) => out.push(format!(
                    "{} {} {}",
                    op.method().map_or("-", http::Method::as_str),
                    op.raw_url().unwrap_or("-"),
                    op.content_id.as_deref().unwrap_or("-")
                )),
                Frame::ChangesetEnd => out.push("end".into()),
                Frame::End => return Ok(out),
            }
        }
    }

    #[test]
    fn preamble_changeset_and_epilogue() {
        let payload = "preamble text\r\n\
            --batch\r\n\
            Content-Type: multipart/mixed; boundary=cs\r\n\
            \r\n\
            --cs\r\n\
            Content-Type: application/http\r\n\
            Content-ID: 1\r\n\
            \r\n\
            POST Customers HTTP/1.1\r\n\
            \r\n\
            {}\r\n\
            --cs--\r\n\
            --batch\r\n\
            Content-Type: application/http\r\n\
            \r\n\
            GET Customers HTTP/1.1\r\n\
            \r\n\
            \r\n\
            --batch--\r\n\
            epilogue\r\n";
        assert_eq!(
            frames(payload).unwrap(),
            vec!["start cs", "POST Customers 1", "end", "GET Customers -"]
        );
    }

    #[test]
    fn empty_changeset() {
        let payload = "--batch\n\
            Content-Type: multipart/mixed; boundary=cs\n\
            \n\
            --cs--\n\
            --batch--\n";
        assert_eq!(frames(payload).unwrap(), vec!["start cs", "end"]);
    }

    #[test]
    fn truncated_stream_reports_line() {
        let payload = "--batch\r\n\
            Content-Type: application/http\r\n\
            \r\n\
            GET Customers HTTP/1.1\r\n";
        let err = frames(payload).unwrap_err();
        assert!(
            matches!(&err, BatchError::Framing { line: 4, message } if message.contains("missing boundary batch")),
            "{err}"
        );
    }

    #[test]
    fn oversized_part() {
        let body = "x".repeat(2048);
        let payload = format!(
            "--batch\r\nContent-Type: application/http\r\n\r\nPOST A HTTP/1.1\r\n\r\n{body}\r\n--batch--\r\n"
        );
        let err = frames(&payload).unwrap_err();
        assert!(matches!(err, BatchError::PartTooLarge { line: 4, limit: 1024 }), "{err}");
    }

    #[test]
    fn unsupported_part_type() {
        let payload = "--batch\r\nContent-Type: text/plain\r\n\r\nhello\r\n--batch--\r\n";
        assert!(matches!(
            frames(payload).unwrap_err(),
            BatchError::Framing { line: 3, .. }
        ));
    }
}
