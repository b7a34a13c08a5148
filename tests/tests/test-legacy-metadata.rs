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

//! Documents before CSDL 4.0 feed the same query binding.

use odata_core::EdmVersion;
use odata_query::QueryNode;
use odata_query::QueryParser;
use odata_tests::fixtures;
use odata_tests::Error;

#[test]
fn associations_bind_navigation_targets() -> Result<(), Error> {
    let model = fixtures::load(fixtures::WAREHOUSE_V3)?;
    let parser = QueryParser::for_entity_set(&model, "Products")
        .ok_or_else(|| Error::EntitySetNotFound("Products".into()))?;
    let node = parser.parse_filter("Orders/any(o:o/Quantity gt 1)")?;
    let QueryNode::Any(lambda) = &node else {
        panic!("expected any, got {node:?}");
    };
    assert!(matches!(
        lambda.source.as_ref(),
        QueryNode::CollectionNavigation { navigation_source: Some(set), .. } if set == "Orders"
    ));
    assert_eq!(node.to_string(), "Orders/any(o:o/Quantity gt 1)");
    Ok(())
}

// Converting to 4.0 keeps what queries depend on: navigation types,
// partners and bindings.
#[test]
fn converted_document_binds_the_same() -> Result<(), Error> {
    let v3 = fixtures::load(fixtures::WAREHOUSE_V3)?;
    let v4 = fixtures::load(&fixtures::write(&v3, EdmVersion::V4)?)?;
    for model in [&v3, &v4] {
        let parser = QueryParser::for_entity_set(model, "Orders")
            .ok_or_else(|| Error::EntitySetNotFound("Orders".into()))?;
        let node = parser.parse_filter("Product/Name eq 'bolt'")?;
        let QueryNode::BinaryOperator { left, .. } = &node else {
            panic!("expected eq, got {node:?}");
        };
        let QueryNode::SingleValueProperty { source, .. } = left.as_ref() else {
            panic!("expected property, got {left:?}");
        };
        assert!(matches!(
            source.as_ref(),
            QueryNode::SingleNavigation { navigation_source: Some(set), .. } if set == "Products"
        ));
    }
    let again = fixtures::write(&v4, EdmVersion::V3)?;
    assert!(again.contains("<Association "), "{again}");
    Ok(())
}

#[test]
fn unknown_navigation_on_legacy_model() -> Result<(), Error> {
    let model = fixtures::load(fixtures::WAREHOUSE_V3)?;
    let parser = QueryParser::for_entity_set(&model, "Orders")
        .ok_or_else(|| Error::EntitySetNotFound("Orders".into()))?;
    assert!(parser.parse_filter("Supplier/Name eq 'x'").is_err());
    Ok(())
}
