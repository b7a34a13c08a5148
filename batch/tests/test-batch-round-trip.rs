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

use http::header::CONTENT_TYPE;
use http::header::HOST;
use http::HeaderValue;
use http::Method;
use http::StatusCode;
use odata_batch::BatchError;
use odata_batch::BatchReader;
use odata_batch::BatchReaderSettings;
use odata_batch::BatchRequest;
use odata_batch::BatchResponse;
use odata_batch::BatchWriter;
use odata_batch::BatchWriterSettings;
use odata_batch::FrameReader;
use odata_batch::FrameWriter;
use odata_batch::OperationUrl;
use odata_batch::ReaderState;
use pretty_assertions::assert_eq;
use std::error::Error as StdError;
use std::io::Read;
use url::Url;

fn write_scenario<F: FrameWriter>(writer: &mut BatchWriter<F>) -> Result<(), BatchError> {
    let json = HeaderValue::from_static("application/json");
    writer.write_start_batch()?;
    writer.write_start_changeset()?;
    writer.create_operation_request(
        &BatchRequest::new(Method::PUT, "Customers(1)")
            .content_id("1")
            .header(CONTENT_TYPE, json.clone())
            .body(r#"{"Name":"Ann"}"#),
    )?;
    writer.create_operation_request(
        &BatchRequest::new(Method::PATCH, "Customers(2)")
            .content_id("2")
            .header(CONTENT_TYPE, json)
            .body(r#"{"Name":"Bob"}"#),
    )?;
    writer.write_end_changeset()?;
    writer.create_operation_request(
        &BatchRequest::new(Method::GET, "Customers").header(HOST, HeaderValue::from_static("example.org")),
    )?;
    writer.write_end_batch()
}

type Seen = (Vec<ReaderState>, Vec<(Method, String, Option<String>)>);

fn read_all<F: FrameReader>(reader: &mut BatchReader<F>) -> Result<Seen, BatchError> {
    let mut states = Vec::new();
    let mut operations = Vec::new();
    while reader.read()? {
        states.push(reader.state());
        if reader.state() == ReaderState::Operation {
            let mut body = String::new();
            reader.body()?.read_to_string(&mut body)?;
            let op = reader.operation().ok_or(BatchError::Usage {
                call: "operation",
                state: "Operation",
            })?;
            let method = op.method().cloned().unwrap_or(Method::OPTIONS);
            operations.push((method, body, op.atomicity_group.clone()));
        }
    }
    Ok((states, operations))
}

fn check_scenario(seen: &Seen) {
    let (states, operations) = seen;
    assert_eq!(
        states,
        &[
            ReaderState::ChangesetStart,
            ReaderState::Operation,
            ReaderState::Operation,
            ReaderState::ChangesetEnd,
            ReaderState::Operation,
        ]
    );
    let methods: Vec<&Method> = operations.iter().map(|(m, _, _)| m).collect();
    assert_eq!(methods, [&Method::PUT, &Method::PATCH, &Method::GET]);
    assert_eq!(operations[0].1, r#"{"Name":"Ann"}"#);
    assert_eq!(operations[1].1, r#"{"Name":"Bob"}"#);
    assert_eq!(operations[2].1, "");
    assert!(operations[0].2.is_some());
    assert_eq!(operations[0].2, operations[1].2);
    assert_eq!(operations[2].2, None);
}

#[test]
fn multipart_round_trip() -> Result<(), Box<dyn StdError>> {
    let mut writer = BatchWriter::multipart_requests(Vec::new(), BatchWriterSettings::default());
    write_scenario(&mut writer)?;
    let framing = writer.into_inner();
    let content_type = framing.content_type();
    let payload = framing.into_inner();

    let mut reader = BatchReader::for_content_type(
        payload.as_slice(),
        &content_type,
        BatchReaderSettings::default(),
    )?;
    check_scenario(&read_all(&mut reader)?);
    assert_eq!(reader.state(), ReaderState::Completed);
    assert!(!reader.read()?);
    Ok(())
}

#[test]
fn json_round_trip() -> Result<(), Box<dyn StdError>> {
    let mut writer = BatchWriter::json_requests(Vec::new(), BatchWriterSettings::default());
    write_scenario(&mut writer)?;
    let framing = writer.into_inner();
    let content_type = framing.content_type();
    let payload = framing.into_inner();
    let value: serde_json::Value = serde_json::from_slice(&payload)?;
    assert_eq!(value["requests"][0]["body"]["Name"], "Ann");
    assert_eq!(value["requests"][2]["method"], "GET");

    let mut reader = BatchReader::for_content_type(
        payload.as_slice(),
        content_type,
        BatchReaderSettings::default(),
    )?;
    check_scenario(&read_all(&mut reader)?);
    Ok(())
}

#[test]
fn end_changeset_without_start_is_usage_error() {
    let mut multipart = BatchWriter::multipart_requests(Vec::new(), BatchWriterSettings::default());
    let mut json = BatchWriter::json_requests(Vec::new(), BatchWriterSettings::default());
    multipart.write_start_batch().unwrap();
    json.write_start_batch().unwrap();
    assert!(matches!(
        multipart.write_end_changeset(),
        Err(BatchError::Usage {
            call: "write_end_changeset",
            state: "BatchStarted"
        })
    ));
    assert!(matches!(
        json.write_end_changeset(),
        Err(BatchError::Usage {
            call: "write_end_changeset",
            state: "BatchStarted"
        })
    ));
}

#[test]
fn responses_round_trip() -> Result<(), Box<dyn StdError>> {
    let settings = BatchWriterSettings {
        boundary: Some("batchresponse_1".into()),
        ..BatchWriterSettings::default()
    };
    let mut writer = BatchWriter::multipart_responses(Vec::new(), settings);
    writer.write_start_batch()?;
    writer.write_start_changeset()?;
    writer.create_operation_response(&BatchResponse::new(StatusCode::CREATED).content_id("1"))?;
    writer.write_end_changeset()?;
    writer.create_operation_response(
        &BatchResponse::new(StatusCode::OK)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body("done"),
    )?;
    writer.write_end_batch()?;
    let payload = writer.into_inner().into_inner();
    let text = String::from_utf8(payload.clone())?;
    assert!(text.contains("HTTP/1.1 201 Created\r\n"));
    assert!(text.contains("Content-ID: 1\r\n"));

    let mut reader =
        BatchReader::multipart(payload.as_slice(), "batchresponse_1", BatchReaderSettings::default());
    let mut statuses = Vec::new();
    while reader.read()? {
        if let Some(op) = reader.operation() {
            statuses.push((op.status(), op.content_id.clone()));
        }
    }
    assert_eq!(
        statuses,
        [
            (Some(StatusCode::CREATED), Some("1".to_string())),
            (Some(StatusCode::OK), None)
        ]
    );
    Ok(())
}

#[test]
fn urls_are_resolved() -> Result<(), Box<dyn StdError>> {
    let payload = "--b\r\n\
        Content-Type: multipart/mixed; boundary=cs\r\n\
        \r\n\
        --cs\r\n\
        Content-Type: application/http\r\n\
        Content-ID: 5\r\n\
        \r\n\
        POST /svc/Customers HTTP/1.1\r\n\
        Host: example.org:8080\r\n\
        \r\n\
        {}\r\n\
        --cs\r\n\
        Content-Type: application/http\r\n\
        \r\n\
        POST $5/Orders HTTP/1.1\r\n\
        \r\n\
        {}\r\n\
        --cs--\r\n\
        --b\r\n\
        Content-Type: application/http\r\n\
        \r\n\
        GET https://other.example/Products HTTP/1.1\r\n\
        \r\n\
        \r\n\
        --b--\r\n";
    let mut reader = BatchReader::multipart(payload.as_bytes(), "b", BatchReaderSettings::default());
    let mut targets = Vec::new();
    while reader.read()? {
        if let Some(op) = reader.operation() {
            targets.push(op.target.clone());
        }
    }
    assert_eq!(
        targets,
        [
            Some(OperationUrl::Absolute(Url::parse(
                "http://example.org:8080/svc/Customers"
            )?)),
            Some(OperationUrl::ContentIdReference {
                content_id: "5".into(),
                path: "/Orders".into(),
            }),
            Some(OperationUrl::Absolute(Url::parse(
                "https://other.example/Products"
            )?)),
        ]
    );
    Ok(())
}

#[test]
fn configured_base_wins_over_host() -> Result<(), Box<dyn StdError>> {
    let payload = r#"{"requests":[{"id":"1","method":"GET","url":"Customers","headers":{"host":"ignored.example"}}]}"#;
    let settings = BatchReaderSettings {
        base_uri: Some(Url::parse("http://service.example/odata/")?),
        ..BatchReaderSettings::default()
    };
    let mut reader = BatchReader::json(payload.as_bytes(), settings);
    assert!(reader.read()?);
    assert_eq!(
        reader.operation().and_then(|op| op.target.clone()),
        Some(OperationUrl::Absolute(Url::parse(
            "http://service.example/odata/Customers"
        )?))
    );
    Ok(())
}

#[test]
fn body_is_bounded_by_content_length() -> Result<(), Box<dyn StdError>> {
    let payload = "--b\r\n\
        Content-Type: application/http\r\n\
        \r\n\
        POST Customers HTTP/1.1\r\n\
        Content-Length: 5\r\n\
        \r\n\
        hello and more\r\n\
        --b--\r\n";
    let mut reader = BatchReader::multipart(payload.as_bytes(), "b", BatchReaderSettings::default());
    assert!(reader.read()?);
    let mut body = reader.body()?;
    let mut text = String::new();
    body.read_to_string(&mut text)?;
    assert_eq!(text, "hello");
    assert_eq!(body.remaining(), 0);
    assert!(!reader.read()?);
    assert!(matches!(reader.body(), Err(BatchError::Usage { call: "body", .. })));
    Ok(())
}

#[test]
fn truncated_payload_fails_deterministically() {
    let payload = "--b\r\n\
        Content-Type: application/http\r\n\
        \r\n\
        POST Customers HTTP/1.1\r\n\
        Content-Length: 50\r\n\
        \r\n\
        short\r\n\
        --b--\r\n";
    let mut reader = BatchReader::multipart(payload.as_bytes(), "b", BatchReaderSettings::default());
    let err = reader.read().unwrap_err();
    assert!(matches!(err, BatchError::Framing { line: 4, .. }), "{err}");
    assert_eq!(reader.state(), ReaderState::Exception);
    assert!(matches!(
        reader.read(),
        Err(BatchError::Usage {
            call: "read",
            state: "Exception"
        })
    ));

    let mut reader =
        BatchReader::multipart("--b\r\n".as_bytes(), "b", BatchReaderSettings::default());
    assert!(matches!(reader.read(), Err(BatchError::Framing { .. })));
}

#[test]
fn nothing_is_read_before_the_first_read() {
    let mut reader =
        BatchReader::multipart("garbage".as_bytes(), "b", BatchReaderSettings::default());
    assert_eq!(reader.state(), ReaderState::Initial);
    assert!(reader.operation().is_none());
    assert!(matches!(
        reader.body(),
        Err(BatchError::Usage {
            call: "body",
            state: "Initial"
        })
    ));
    assert!(reader.read().is_err());
    assert_eq!(reader.state(), ReaderState::Exception);
}
