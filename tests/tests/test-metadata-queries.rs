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

//! Queries bound to a model read from CSDL.

use odata_core::EdmVersion;
use odata_csdl::Model;
use odata_query::uri::build_uri;
use odata_query::ParseErrorKind;
use odata_query::QueryNode;
use odata_query::QueryParser;
use odata_query::SelectItem;
use odata_tests::fixtures;
use odata_tests::Error;
use odata_tests::SERVICE_ROOT;
use pretty_assertions::assert_eq;
use url::Url;

fn books(model: &Model) -> Result<QueryParser<'_>, Error> {
    QueryParser::for_entity_set(model, "Books").ok_or_else(|| Error::EntitySetNotFound("Books".into()))
}

// The fixture must load without diagnostics and survive a v4 rewrite.
#[test]
fn library_loads_and_rewrites() -> Result<(), Error> {
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let xml = fixtures::write(&model, EdmVersion::V4)?;
    let again = fixtures::load(&xml)?;
    assert_eq!(fixtures::write(&again, EdmVersion::V4)?, xml);
    assert!(xml.contains(r#"<Schema Namespace="Library" Alias="Lib""#), "{xml}");
    Ok(())
}

#[test]
fn navigation_records_target_entity_set() -> Result<(), Error> {
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let node = books(&model)?.parse_filter("Author/Name eq 'Le Guin'")?;
    let QueryNode::BinaryOperator { left, .. } = &node else {
        panic!("expected eq, got {node:?}");
    };
    let QueryNode::SingleValueProperty { source, property } = left.as_ref() else {
        panic!("expected property, got {left:?}");
    };
    assert_eq!(property, "Name");
    assert!(matches!(
        source.as_ref(),
        QueryNode::SingleNavigation { navigation_source: Some(set), .. } if set == "Authors"
    ));
    Ok(())
}

#[test]
fn canonical_rendering_over_bound_types() -> Result<(), Error> {
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let parser = books(&model)?;
    for (text, canonical) in [
        (
            "(Genre has Library.Genre'Fiction') and (Price lt 20.5M)",
            "Genre has Library.Genre'Fiction' and Price lt 20.5M",
        ),
        (
            "Tags/any(t:(t eq 'classic'))",
            "Tags/any(t:t eq 'classic')",
        ),
        (
            "Author/Books/$count gt 3 or year(Published) eq 1969",
            "Author/Books/$count gt 3 or year(Published) eq 1969",
        ),
        (
            "Published ge 1969-01-01 and Author/Address/City eq 'Berkeley'",
            "Published ge 1969-01-01 and Author/Address/City eq 'Berkeley'",
        ),
    ] {
        assert_eq!(parser.parse_filter(text)?.to_string(), canonical);
    }
    Ok(())
}

#[test]
fn unknown_members_are_located() -> Result<(), Error> {
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let err = books(&model)?
        .parse_filter("Title eq 'x' and Author/Nickname eq 'y'")
        .unwrap_err();
    assert_eq!(err.offset, 24);
    assert_eq!(
        err.kind,
        ParseErrorKind::UnknownProperty {
            type_name: "Library.Author".into(),
            property: "Nickname".into(),
        }
    );

    let err = books(&model)?
        .parse_query("$expand=Author($filter=Rating gt 3)")
        .unwrap_err();
    assert!(err.to_string().starts_with("while parsing $expand:"), "{err}");
    Ok(())
}

#[test]
fn request_url_from_bound_query() -> Result<(), Error> {
    let model = fixtures::load(fixtures::LIBRARY_V4)?;
    let options = books(&model)?.parse_query(
        "$select=Title,Price&$expand=Author($select=Name)&$orderby=Price desc,Title&$top=10&$count=true",
    )?;
    assert_eq!(
        options.select,
        vec![
            SelectItem::Path(vec!["Title".into()]),
            SelectItem::Path(vec!["Price".into()])
        ]
    );
    let url = build_uri(&Url::parse(SERVICE_ROOT)?, "Books", &options)?;
    assert_eq!(
        url.as_str(),
        "http://example.org/library/Books?$orderby=Price%20desc%2CTitle&$select=Title%2CPrice\
         &$expand=Author%28%24select%3DName%29&$top=10&$count=true"
    );
    Ok(())
}
