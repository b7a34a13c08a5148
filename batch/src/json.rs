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
use crate::operation::MessageKind;
use crate::operation::Operation;
use crate::operation::Outgoing;
use crate::operation::StartLine;
use crate::reader::Frame;
use crate::reader::FrameReader;
use crate::writer::FrameWriter;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use http::Method;
use http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::io::BufRead;
use std::io::Write;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Envelope {
    requests: Option<Vec<JsonPart>>,
    responses: Option<Vec<JsonPart>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    atomicity_group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("json"))
}

/// JSON batch framing reader. Adjacent elements of one atomicity group
/// form a change set.
pub struct JsonReader<R> {
    input: Option<R>,
    parts: VecDeque<JsonPart>,
    index: usize,
    group: Option<String>,
    seen_groups: HashSet<String>,
    max_part_size: usize,
}

impl<R: BufRead> JsonReader<R> {
    pub fn new(input: R, max_part_size: usize) -> Self {
        Self {
            input: Some(input),
            parts: VecDeque::new(),
            index: 0,
            group: None,
            seen_groups: HashSet::new(),
            max_part_size,
        }
    }

    fn load(&mut self) -> Result<(), BatchError> {
        if let Some(input) = self.input.take() {
            let envelope: Envelope = serde_json::from_reader(input)?;
            let parts = match (envelope.requests, envelope.responses) {
                (Some(parts), None) | (None, Some(parts)) => parts,
                _ => {
                    return Err(BatchError::framing(
                        1,
                        "expected exactly one of requests and responses",
                    ))
                }
            };
            debug!(parts = parts.len(), "json batch loaded");
            self.parts = parts.into();
        }
        Ok(())
    }

    fn operation(&self, part: JsonPart) -> Result<Operation, BatchError> {
        let at = self.index;
        let start = match (part.method, part.url, part.status) {
            (Some(method), Some(url), None) => StartLine::Request {
                method: Method::from_bytes(method.as_bytes())
                    .map_err(|_| BatchError::framing(at, format!("invalid method: {method}")))?,
                url,
            },
            (None, None, Some(status)) => StartLine::Response {
                status: StatusCode::from_u16(status)
                    .map_err(|_| BatchError::framing(at, format!("invalid status: {status}")))?,
            },
            _ => {
                return Err(BatchError::framing(
                    at,
                    "element needs method and url, or status",
                ))
            }
        };
        let mut headers = HeaderMap::new();
        for (name, value) in &part.headers {
            headers.append(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        let body = match part.body {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(text)) if !is_json(&headers) => text.into_bytes(),
            Some(value) => serde_json::to_vec(&value)?,
        };
        if body.len() > self.max_part_size {
            return Err(BatchError::PartTooLarge {
                line: at,
                limit: self.max_part_size,
            });
        }
        Ok(Operation {
            start,
            headers,
            content_id: part.id,
            atomicity_group: part.atomicity_group,
            depends_on: part.depends_on,
            target: None,
            line: at,
            body,
        })
    }
}

impl<R: BufRead> FrameReader for JsonReader<R> {
    fn next_frame(&mut self) -> Result<Frame, BatchError> {
        self.load()?;
        let next_group = match self.parts.front() {
            None => {
                return Ok(if self.group.take().is_some() {
                    Frame::ChangesetEnd
                } else {
                    Frame::End
                })
            }
            Some(part) => part.atomicity_group.clone(),
        };
        if next_group != self.group {
            if self.group.take().is_some() {
                return Ok(Frame::ChangesetEnd);
            }
            if let Some(group) = next_group {
                if !self.seen_groups.insert(group.clone()) {
                    return Err(BatchError::framing(
                        self.index + 1,
                        format!("atomicity group {group} is not adjacent"),
                    ));
                }
                self.group = Some(group.clone());
                return Ok(Frame::ChangesetStart { group });
            }
        }
        match self.parts.pop_front() {
            Some(part) => {
                self.index += 1;
                self.operation(part).map(Frame::Operation)
            }
            None => Ok(Frame::End),
        }
    }
}

/// JSON batch framing writer.
pub struct JsonWriter<W> {
    output: W,
    kind: MessageKind,
    first: bool,
    group: Option<String>,
}

impl<W: Write> JsonWriter<W> {
    pub const fn new(output: W, kind: MessageKind) -> Self {
        Self {
            output,
            kind,
            first: true,
            group: None,
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        "application/json"
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

fn json_body(headers: &HeaderMap, body: &[u8]) -> Result<Option<Value>, BatchError> {
    if body.is_empty() {
        return Ok(None);
    }
    if is_json(headers) {
        return serde_json::from_slice(body)
            .map(Some)
            .map_err(|err| BatchError::Body(format!("JSON content is not valid JSON: {err}")));
    }
    String::from_utf8(body.to_vec())
        .map(|text| Some(Value::String(text)))
        .map_err(|_| BatchError::Body("binary content cannot be written as JSON".into()))
}

impl<W: Write> FrameWriter for JsonWriter<W> {
    fn start_batch(&mut self) -> Result<(), BatchError> {
        let key = match self.kind {
            MessageKind::Request => "requests",
            MessageKind::Response => "responses",
        };
        write!(self.output, "{{\"{key}\":[")?;
        Ok(())
    }

    fn start_changeset(&mut self, group: &str) -> Result<(), BatchError> {
        self.group = Some(group.to_string());
        Ok(())
    }

    fn operation(&mut self, operation: Outgoing<'_>, url: &str) -> Result<(), BatchError> {
        let mut headers = BTreeMap::new();
        for (name, value) in operation.headers() {
            let value = value.to_str().map_err(|_| {
                BatchError::Body(format!("header {name} is not visible ASCII"))
            })?;
            headers.insert(name.as_str().to_string(), value.to_string());
        }
        let mut part = JsonPart {
            id: Some(
                operation
                    .content_id()
                    .map_or_else(|| Uuid::new_v4().to_string(), str::to_string),
            ),
            atomicity_group: self.group.clone(),
            headers,
            body: json_body(operation.headers(), operation.body())?,
            ..JsonPart::default()
        };
        match operation {
            Outgoing::Request(r) => {
                part.method = Some(r.method.to_string());
                part.url = Some(url.to_string());
                part.depends_on.clone_from(&r.depends_on);
            }
            Outgoing::Response(r) => part.status = Some(r.status.as_u16()),
        }
        if !self.first {
            self.output.write_all(b",")?;
        }
        self.first = false;
        serde_json::to_writer(&mut self.output, &part)?;
        Ok(())
    }

    fn end_changeset(&mut self) -> Result<(), BatchError> {
        self.group = None;
        Ok(())
    }

    fn end_batch(&mut self) -> Result<(), BatchError> {
        self.output.write_all(b"]}")?;
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
        let mut reader = JsonReader::new(payload.as_bytes(), 1024);
        let mut out = Vec::new();
        loop {
            match reader.next_frame()? {
                Frame::ChangesetStart { group } => out.push(format!("start {group}")),
                Frame::Operation(op) => out.push(format!(
                    "{} {}",
                    op.content_id.as_deref().unwrap_or("-"),
                    op.method()
                        .map(ToString::to_string)
                        .or_else(|| op.status().map(|s| s.as_u16().to_string()))
                        .unwrap_or_default()
                )),
                Frame::ChangesetEnd => out.push("end".into()),
                Frame::End => return Ok(out),
            }
        }
    }

    #[test]
    fn atomicity_groups_become_changesets() {
        let payload = r#"{"requests":[
            {"id":"1","atomicityGroup":"g1","method":"PUT","url":"Customers(1)","body":{"Name":"a"}},
            {"id":"2","atomicityGroup":"g1","method":"PATCH","url":"Customers(2)"},
            {"id":"3","atomicityGroup":"g2","method":"DELETE","url":"Customers(3)"},
            {"id":"4","method":"GET","url":"Customers"}
        ]}"#;
        assert_eq!(
            frames(payload).unwrap(),
            vec![
                "start g1", "1 PUT", "2 PATCH", "end", "start g2", "3 DELETE", "end", "4 GET"
            ]
        );
    }

    #[test]
    fn group_ending_the_batch_is_closed() {
        let payload = r#"{"responses":[{"id":"1","atomicityGroup":"g","status":204}]}"#;
        assert_eq!(frames(payload).unwrap(), vec!["start g", "1 204", "end"]);
    }

    #[test]
    fn split_group_is_rejected() {
        let payload = r#"{"requests":[
            {"id":"1","atomicityGroup":"g","method":"POST","url":"A"},
            {"id":"2","method":"GET","url":"A"},
            {"id":"3","atomicityGroup":"g","method":"POST","url":"A"}
        ]}"#;
        let err = frames(payload).unwrap_err();
        assert!(matches!(err, BatchError::Framing { line: 3, .. }), "{err}");
    }

    #[test]
    fn incomplete_element() {
        let payload = r#"{"requests":[{"id":"1","method":"GET"}]}"#;
        assert!(matches!(
            frames(payload).unwrap_err(),
            BatchError::Framing { line: 1, .. }
        ));
    }

    #[test]
    fn bodies_by_content_type() {
        let payload = r#"{"requests":[
            {"id":"1","method":"POST","url":"A","headers":{"content-type":"application/json"},"body":{"x":1}},
            {"id":"2","method":"POST","url":"A","headers":{"content-type":"text/plain"},"body":"plain"}
        ]}"#;
        let mut reader = JsonReader::new(payload.as_bytes(), 1024);
        let mut bodies = Vec::new();
        while let Frame::Operation(op) = reader.next_frame().unwrap() {
            bodies.push(String::from_utf8(op.body).unwrap());
        }
        assert_eq!(bodies, vec![r#"{"x":1}"#.to_string(), "plain".to_string()]);
    }

    #[test]
    fn binary_body_cannot_be_written() {
        let headers = HeaderMap::new();
        assert!(matches!(
            json_body(&headers, &[0xff, 0xfe]),
            Err(BatchError::Body(_))
        ));
        assert_eq!(
            json_body(&headers, b"text").unwrap(),
            Some(Value::String("text".into()))
        );
    }
}
