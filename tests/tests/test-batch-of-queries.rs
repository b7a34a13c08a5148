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

//! Batches carrying requests built from bound queries.

use http::header::CONTENT_TYPE;
use http::HeaderValue;
use http::Method;
use odata_batch::BatchReader;
use odata_batch::BatchReaderSettings;
use odata_batch::BatchRequest;
use odata_batch::BatchWriter;
use odata_batch::BatchWriterSettings;
use odata_batch::FrameWriter;
use odata_query::uri::build_uri;
use odata_query::QueryParser;
use odata_tests::fixtures;
use odata_tests::Error;
use odata_tests::Expect;
use odata_tests::SERVICE_ROOT;
use pretty_assertions::assert_eq;
use url::Url;

const NEW_AUTHOR: &str = r#"{"Name":"Ursula K. Le Guin"}"#;
const NEW_BOOK: &str = r#"{"Title":"The Dispossessed"}"#;

fn settings() -> Result<BatchWriterSettings, Error> {
    Ok(BatchWriterSettings {
        boundary: Some("batch_library".into()),
        base_uri: Some(Url::parse(SERVICE_ROOT)?),
    })
}

fn query_url() -> Result<Url, Error> {
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let parser = QueryParser::for_entity_set(&model, "Books")
        .ok_or_else(|| Error::EntitySetNotFound("Books".into()))?;
    let options = parser.parse_query("$filter=Author/Name eq 'Le Guin' and Price lt 10&$orderby=Title&$top=3")?;
    Ok(build_uri(&Url::parse(SERVICE_ROOT)?, "Books", &options)?)
}

fn write_batch<F: FrameWriter>(writer: &mut BatchWriter<F>, get: &Url) -> Result<(), Error> {
    let json = HeaderValue::from_static("application/json");
    writer.write_start_batch()?;
    writer.write_start_changeset()?;
    writer.create_operation_request(
        &BatchRequest::new(Method::POST, "Authors")
            .content_id("1")
            .header(CONTENT_TYPE, json.clone())
            .body(NEW_AUTHOR),
    )?;
    writer.create_operation_request(
        &BatchRequest::new(Method::POST, "$1/Books")
            .content_id("2")
            .header(CONTENT_TYPE, json)
            .body(NEW_BOOK),
    )?;
    writer.write_end_changeset()?;
    writer.create_operation_request(
        &BatchRequest::new(Method::GET, get.as_str()).content_id("3"),
    )?;
    writer.write_end_batch()?;
    Ok(())
}

fn expected(get: &Url) -> Vec<Expect> {
    vec![
        Expect::ChangesetStart,
        Expect::request(Method::POST, "http://example.org/library/Authors")
            .id("1")
            .body(NEW_AUTHOR),
        Expect::request(Method::POST, "$1/Books").id("2").body(NEW_BOOK),
        Expect::ChangesetEnd,
        Expect::request(Method::GET, get.as_str()).id("3"),
    ]
}

// The query of a request read back from a batch parses to the same
// canonical form.
fn check_query(events: &[Expect]) -> Result<(), Error> {
    let Some(Expect::Request { url, .. }) = events.last() else {
        panic!("expected request, got {events:?}");
    };
    let url = Url::parse(url)?;
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let parser = QueryParser::for_entity_set(&model, "Books")
        .ok_or_else(|| Error::EntitySetNotFound("Books".into()))?;
    let options = parser.parse_query(url.query().unwrap_or(""))?;
    assert_eq!(build_uri(&Url::parse(SERVICE_ROOT)?, "Books", &options)?, url);
    Ok(())
}

#[test]
fn multipart_batch_of_queries() -> Result<(), Error> {
    let get = query_url()?;
    let mut writer = BatchWriter::multipart_requests(Vec::new(), settings()?);
    write_batch(&mut writer, &get)?;
    let payload = writer.into_inner().into_inner();

    let mut reader = BatchReader::multipart(
        payload.as_slice(),
        "batch_library",
        BatchReaderSettings::default(),
    );
    let events = Expect::read_all(&mut reader)?;
    assert_eq!(events, expected(&get));
    check_query(&events)
}

#[test]
fn json_batch_of_queries() -> Result<(), Error> {
    let get = query_url()?;
    let mut writer = BatchWriter::json_requests(Vec::new(), settings()?);
    write_batch(&mut writer, &get)?;
    let payload = writer.into_inner().into_inner();

    let value: serde_json::Value =
        serde_json::from_slice(&payload).map_err(|err| Error::Batch(err.into()))?;
    let requests = value["requests"].as_array().cloned().unwrap_or_default();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["atomicityGroup"], requests[1]["atomicityGroup"]);
    assert!(requests[2].get("atomicityGroup").is_none());
    assert_eq!(requests[1]["url"], "$1/Books");

    let mut reader = BatchReader::json(payload.as_slice(), BatchReaderSettings::default());
    let events = Expect::read_all(&mut reader)?;
    assert_eq!(events, expected(&get));
    check_query(&events)
}

// Relative URLs without a configured base are resolved against the
// Host header of the first operation.
#[test]
fn host_header_gives_base() -> Result<(), Error> {
    let mut writer = BatchWriter::json_requests(Vec::new(), BatchWriterSettings::default());
    writer.write_start_batch()?;
    writer.create_operation_request(
        &BatchRequest::new(Method::GET, "/library/Authors?$top=1")
            .content_id("a")
            .header(http::header::HOST, HeaderValue::from_static("example.org")),
    )?;
    writer.create_operation_request(&BatchRequest::new(Method::GET, "Books").content_id("b"))?;
    writer.write_end_batch()?;
    let payload = writer.into_inner().into_inner();

    let mut reader = BatchReader::json(payload.as_slice(), BatchReaderSettings::default());
    let events = Expect::read_all(&mut reader)?;
    assert_eq!(
        events,
        vec![
            Expect::request(Method::GET, "http://example.org/library/Authors?$top=1").id("a"),
            Expect::request(Method::GET, "http://example.org/Books").id("b"),
        ]
    );
    Ok(())
}
