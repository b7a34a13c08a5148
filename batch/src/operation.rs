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
use crate::body::Bounded;
use crate::error::BatchError;
use http::header::CONTENT_LENGTH;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use http::Method;
use http::StatusCode;
use url::Url;

/// Whether a batch carries requests or responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

/// First line of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request { method: Method, url: String },
    Response { status: StatusCode },
}

/// Target of a request operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationUrl {
    Absolute(Url),
    /// `$<content-id>` followed by the rest of the path. Substituting the
    /// referenced URL is left to the caller.
    ContentIdReference { content_id: String, path: String },
    /// Relative URL with no base to resolve it against.
    Relative(String),
}

/// Operation read from a batch.
#[derive(Debug, Clone)]
pub struct Operation {
    pub start: StartLine,
    pub headers: HeaderMap,
    pub content_id: Option<String>,
    /// Change set (multipart) or atomicity group (JSON) the operation
    /// belongs to.
    pub atomicity_group: Option<String>,
    pub depends_on: Vec<String>,
    /// Resolved request URL. Filled by the batch reader.
    pub target: Option<OperationUrl>,
    /// Line where the operation starts in the payload.
    pub line: usize,
    pub(crate) body: Vec<u8>,
}

impl Operation {
    #[must_use]
    pub const fn method(&self) -> Option<&Method> {
        match &self.start {
            StartLine::Request { method, .. } => Some(method),
            StartLine::Response { .. } => None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match &self.start {
            StartLine::Request { .. } => None,
            StartLine::Response { status } => Some(*status),
        }
    }

    /// URL as written in the payload.
    #[must_use]
    pub fn raw_url(&self) -> Option<&str> {
        match &self.start {
            StartLine::Request { url, .. } => Some(url),
            StartLine::Response { .. } => None,
        }
    }

    /// Body bounded by the part and by `Content-Length` when present.
    #[must_use]
    pub fn body(&self) -> BodyReader<'_> {
        let limit = self.content_length().unwrap_or(self.body.len());
        Bounded::new(self.body.as_slice(), limit.min(self.body.len()) as u64)
    }

    pub(crate) fn content_length(&self) -> Option<usize> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

/// Request to write into a batch.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub content_id: Option<String>,
    pub depends_on: Vec<String>,
    pub body: Vec<u8>,
}

impl BatchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            content_id: None,
            depends_on: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn content_id(mut self, id: impl Into<String>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Response to write into a batch.
#[derive(Debug, Clone)]
pub struct BatchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content_id: Option<String>,
    pub body: Vec<u8>,
}

impl BatchResponse {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content_id: None,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn content_id(mut self, id: impl Into<String>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Operation handed to a framing writer.
#[derive(Debug, Clone, Copy)]
pub enum Outgoing<'a> {
    Request(&'a BatchRequest),
    Response(&'a BatchResponse),
}

impl Outgoing<'_> {
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        match self {
            Self::Request(r) => r.content_id.as_deref(),
            Self::Response(r) => r.content_id.as_deref(),
        }
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        match self {
            Self::Request(r) => &r.headers,
            Self::Response(r) => &r.headers,
        }
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        match self {
            Self::Request(r) => &r.body,
            Self::Response(r) => &r.body,
        }
    }
}

/// Boundary parameter of a `multipart/mixed` content type.
#[must_use]
pub fn boundary_of(content_type: &str) -> Option<&str> {
    let mut params = content_type.split(';');
    let media = params.next()?.trim();
    if !media.eq_ignore_ascii_case("multipart/mixed") {
        return None;
    }
    params.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Parses `name: value` into a header map.
pub(crate) fn parse_header_line(
    headers: &mut HeaderMap,
    line: &str,
    at: usize,
) -> Result<(), BatchError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| BatchError::framing(at, format!("malformed header: {line}")))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())?;
    let value = HeaderValue::from_str(value.trim())?;
    headers.append(name, value);
    Ok(())
}

/// Parses an `application/http` part: start line, headers, blank line
/// and body. `line` is the payload line of the first byte.
pub(crate) fn parse_http_message(content: &[u8], line: usize) -> Result<Operation, BatchError> {
    let mut rest = content;
    let mut at = line;
    let start = loop {
        match split_line(&mut rest) {
            None => return Err(BatchError::framing(at, "part has no start line")),
            Some([]) => at += 1,
            Some(text) => break text,
        }
    };
    let start_at = at;
    let start = std::str::from_utf8(start)
        .map_err(|_| BatchError::framing(at, "start line is not text"))
        .and_then(|text| parse_start_line(text, at))?;

    let mut headers = HeaderMap::new();
    loop {
        at += 1;
        match split_line(&mut rest) {
            None | Some([]) => break,
            Some(text) => {
                let text = std::str::from_utf8(text)
                    .map_err(|_| BatchError::framing(at, "header is not text"))?;
                parse_header_line(&mut headers, text, at)?;
            }
        }
    }
    Ok(Operation {
        start,
        headers,
        content_id: None,
        atomicity_group: None,
        depends_on: Vec::new(),
        target: None,
        line: start_at,
        body: rest.to_vec(),
    })
}

fn split_line<'a>(rest: &mut &'a [u8]) -> Option<&'a [u8]> {
    if rest.is_empty() {
        return None;
    }
    let whole: &'a [u8] = rest;
    let (head, tail) = whole
        .iter()
        .position(|b| *b == b'\n')
        .map_or((whole, &whole[whole.len()..]), |i| (&whole[..i], &whole[i + 1..]));
    *rest = tail;
    Some(head.strip_suffix(b"\r").unwrap_or(head))
}

fn parse_start_line(text: &str, at: usize) -> Result<StartLine, BatchError> {
    let mut words = text.split_whitespace();
    let first = words
        .next()
        .ok_or_else(|| BatchError::framing(at, "empty start line"))?;
    if first.starts_with("HTTP/") {
        let status = words
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| BatchError::framing(at, format!("invalid status line: {text}")))?;
        return Ok(StartLine::Response { status });
    }
    let method = Method::from_bytes(first.as_bytes())
        .map_err(|_| BatchError::framing(at, format!("invalid method: {first}")))?;
    let url = words
        .next()
        .ok_or_else(|| BatchError::framing(at, format!("request line has no URL: {text}")))?;
    match words.next() {
        Some(version) if version.starts_with("HTTP/") => Ok(StartLine::Request {
            method,
            url: url.to_string(),
        }),
        _ => Err(BatchError::framing(
            at,
            format!("request line has no HTTP version: {text}"),
        )),
    }
}

/// Writes the start line, headers and body of an `application/http`
/// part.
pub(crate) fn format_http_message(out: &mut Vec<u8>, operation: Outgoing<'_>, url: &str) {
    match operation {
        Outgoing::Request(r) => {
            out.extend_from_slice(format!("{} {url} HTTP/1.1\r\n", r.method).as_bytes());
        }
        Outgoing::Response(r) => {
            let reason = r.status.canonical_reason().unwrap_or("");
            out.extend_from_slice(
                format!("HTTP/1.1 {} {reason}\r\n", r.status.as_u16()).as_bytes(),
            );
        }
    }
    for (name, value) in operation.headers() {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(operation.body());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn boundary_parameter() {
        assert_eq!(
            boundary_of("multipart/mixed; boundary=batch_1"),
            Some("batch_1")
        );
        assert_eq!(
            boundary_of("Multipart/Mixed;charset=utf-8; Boundary=\"b 2\""),
            Some("b 2")
        );
        assert_eq!(boundary_of("application/json"), None);
        assert_eq!(boundary_of("multipart/mixed"), None);
    }

    #[test]
    fn request_part() {
        let op = parse_http_message(
            b"PATCH Customers(1) HTTP/1.1\r\nContent-Type: application/json\r\n\r\n{\"Name\":\"x\"}",
            10,
        )
        .unwrap();
        assert_eq!(op.method(), Some(&Method::PATCH));
        assert_eq!(op.raw_url(), Some("Customers(1)"));
        assert_eq!(op.headers["content-type"], "application/json");
        assert_eq!(op.line, 10);
        let mut body = String::new();
        op.body().read_to_string(&mut body).unwrap();
        assert_eq!(body, "{\"Name\":\"x\"}");
    }

    #[test]
    fn response_part_with_content_length() {
        let op =
            parse_http_message(b"\nHTTP/1.1 201 Created\nContent-Length: 2\n\nokay", 1).unwrap();
        assert_eq!(op.status(), Some(StatusCode::CREATED));
        assert_eq!(op.line, 2);
        let mut body = Vec::new();
        op.body().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"ok");
    }

    #[test]
    fn malformed_start_lines() {
        for text in ["GET", "GET Customers", "HTTP/1.1 abc"] {
            let err = parse_http_message(text.as_bytes(), 3).unwrap_err();
            assert!(
                matches!(err, BatchError::Framing { line: 3, .. }),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn request_formatting() {
        let request = BatchRequest::new(Method::PUT, "Customers(1)")
            .header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain"),
            )
            .body("abc");
        let mut out = Vec::new();
        format_http_message(&mut out, Outgoing::Request(&request), "Customers(1)");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "PUT Customers(1) HTTP/1.1\r\ncontent-type: text/plain\r\n\r\nabc"
        );
    }
}
