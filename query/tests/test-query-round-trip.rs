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

//! Parse and render query options.

use odata_core::PrimitiveValue;
use odata_core::QualifiedName;
use odata_csdl::CsdlReader;
use odata_csdl::Model;
use odata_query::node::Levels;
use odata_query::BinaryOperatorKind;
use odata_query::NodeToStringBuilder;
use odata_query::ParseErrorKind;
use odata_query::QueryNode;
use odata_query::QueryParser;
use odata_query::SelectItem;
use odata_query::UriBuilder;
use pretty_assertions::assert_eq;

const SHOP: &str = r#"<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="Shop" xmlns="http://docs.oasis-open.org/odata/ns/edm">
      <ComplexType Name="Address">
        <Property Name="City" Type="Edm.String"/>
      </ComplexType>
      <EntityType Name="Customer">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
        <Property Name="Name" Type="Edm.String"/>
        <Property Name="Address" Type="Shop.Address"/>
        <Property Name="Emails" Type="Collection(Edm.String)"/>
        <NavigationProperty Name="Orders" Type="Collection(Shop.Order)" Partner="Customer"/>
      </EntityType>
      <EntityType Name="Order" OpenType="true">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
        <Property Name="Total" Type="Edm.Decimal"/>
        <NavigationProperty Name="Customer" Type="Shop.Customer" Partner="Orders"/>
      </EntityType>
      <EntityContainer Name="Default">
        <EntitySet Name="Customers" EntityType="Shop.Customer">
          <NavigationPropertyBinding Path="Orders" Target="Orders"/>
        </EntitySet>
        <EntitySet Name="Orders" EntityType="Shop.Order">
          <NavigationPropertyBinding Path="Customer" Target="Customers"/>
        </EntitySet>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

fn shop() -> Model {
    CsdlReader::default().parse(SHOP).value.unwrap()
}

fn qn(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

#[test]
fn rendering_parsed_filters_is_idempotent() {
    let parser = QueryParser::new();
    for text in [
        "Name eq 'O''Brien'",
        "(a or b) and c",
        "a and b or c",
        "not (Price gt 5) and Price lt 10",
        "-Price add 3 gt -2.5D",
        "Items/any(i:i/Qty ge 2 and i/Tags/any(t:t eq 'x'))",
        "Items/all(i:i/Price lt 100.0M)",
        "Items/any()",
        "Items/$count gt 1",
        "Color has Shop.Color'Red,Blue'",
        "Id in (1,2,3)",
        "startswith(tolower(Name),'a') eq true",
        "Created lt 2024-01-31T10:00:00Z and Id ne null",
        "Shop.VipCustomer/Level eq 3",
        "Price eq @p",
        "Total eq 5000000000",
    ] {
        let first = parser.parse_filter(text).unwrap();
        let rendered = first.to_string();
        assert_eq!(rendered, text);
        assert_eq!(parser.parse_filter(&rendered).unwrap(), first);
    }
}

#[test]
fn integer_minimums_read_back() {
    let parser = QueryParser::new();
    for value in [PrimitiveValue::Int64(i64::MIN), PrimitiveValue::Int32(i32::MIN)] {
        let rendered = QueryNode::constant(value.clone()).to_string();
        let node = parser.parse_filter(&format!("X eq {rendered}")).unwrap();
        let QueryNode::BinaryOperator { right, .. } = node else {
            panic!("expected eq");
        };
        let QueryNode::Constant(c) = *right else {
            panic!("expected constant");
        };
        assert_eq!(c.value, value);
        assert_eq!(c.literal, rendered);
    }
    let err = parser.parse_filter("X eq -9223372036854775809L").unwrap_err();
    assert_eq!(err.offset, 5);
    assert_eq!(
        parser.parse_filter("X eq - 5").unwrap().to_string(),
        "X eq -5"
    );
}

#[test]
fn parentheses_follow_precedence() {
    let node = QueryParser::new()
        .parse_filter("((a add b)) mul (c sub d) eq (e)")
        .unwrap();
    assert_eq!(node.to_string(), "(a add b) mul (c sub d) eq e");
    assert_eq!(node.binary_kind(), Some(BinaryOperatorKind::Equal));
}

#[test]
fn bound_parser_classifies_members() {
    let model = shop();
    let parser = QueryParser::for_entity_set(&model, "Customers").unwrap();
    let node = parser
        .parse_filter("Orders/any(o:o/Total gt 10 and o/Extra eq 'y') and Address/City eq 'Oslo'")
        .unwrap();
    let QueryNode::BinaryOperator { left, right, .. } = node else {
        panic!("expected and");
    };
    let QueryNode::Any(lambda) = *left else {
        panic!("expected any");
    };
    assert!(matches!(
        lambda.source.as_ref(),
        QueryNode::CollectionNavigation { navigation_source: Some(set), .. } if set == "Orders"
    ));
    let QueryNode::BinaryOperator { right: extra, .. } = *lambda.body else {
        panic!("expected and");
    };
    let QueryNode::BinaryOperator { left: extra, .. } = *extra else {
        panic!("expected eq");
    };
    assert!(matches!(*extra, QueryNode::OpenProperty { .. }));
    let QueryNode::BinaryOperator { left: city, .. } = *right else {
        panic!("expected eq");
    };
    assert!(matches!(*city, QueryNode::SingleValueProperty { .. }));

    let emails = parser.parse_filter("Emails/$count eq 0").unwrap();
    assert_eq!(emails.to_string(), "Emails/$count eq 0");
}

#[test]
fn bound_parser_rejects_unknown_property() {
    let model = shop();
    let customer = qn("Shop.Customer");
    let err = QueryParser::bound(&model, &customer)
        .parse_filter("Name eq 'a' or Nmae eq 'b'")
        .unwrap_err();
    assert_eq!(err.offset, 15);
    assert_eq!(
        err.kind,
        ParseErrorKind::UnknownProperty {
            type_name: "Shop.Customer".into(),
            property: "Nmae".into(),
        }
    );
    let err = QueryParser::bound(&model, &customer)
        .parse_filter("Name/any(x:x eq 'a')")
        .unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::NotACollection(_)));
}

#[test]
fn errors_report_character_offsets() {
    let parser = QueryParser::new();
    let err = parser.parse_filter("Name eq").unwrap_err();
    assert_eq!(err.offset, 7);
    assert_eq!(err.kind, ParseErrorKind::UnexpectedEnd);
    let err = parser.parse_filter("Name eq 'x' 'y'").unwrap_err();
    assert_eq!(err.offset, 12);
    let err = parser.parse_filter("Name eq #").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedCharacter('#'));
}

#[test]
fn select_and_expand() {
    let model = shop();
    let parser = QueryParser::for_entity_set(&model, "Customers").unwrap();
    let select = parser.parse_select("Name,Address/City,Shop.*,*").unwrap();
    assert_eq!(
        select,
        vec![
            SelectItem::Path(vec!["Name".into()]),
            SelectItem::Path(vec!["Address".into(), "City".into()]),
            SelectItem::AllOperations("Shop".into()),
            SelectItem::Wildcard,
        ]
    );

    let expand = parser
        .parse_expand("Orders($filter=Total gt 5;$select=Id,Total;$expand=Customer($levels=max);$top=3)")
        .unwrap();
    let orders = &expand[0];
    assert_eq!(orders.path, vec!["Orders"]);
    assert_eq!(orders.options.top, Some(3));
    assert_eq!(orders.options.expand[0].options.levels, Some(Levels::Max));
    assert_eq!(
        NodeToStringBuilder::filter().expand(&expand),
        "Orders($filter=Total gt 5;$select=Id,Total;$expand=Customer($levels=max);$top=3)"
    );

    let err = parser.parse_expand("Orders($expand=Customer($filter=Nope eq 1))").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnknownProperty { .. }));
}

#[test]
fn whole_query_string() {
    let options = QueryParser::new()
        .parse_query("?$filter=Price%20gt%20%40min&$orderby=Name%20desc,Id&$search=blue%20OR%20green&$top=10&$skip=20&$count=true&@min=5&custom=1")
        .unwrap();
    assert_eq!(options.top, Some(10));
    assert_eq!(options.skip, Some(20));
    assert_eq!(options.count, Some(true));
    assert_eq!(options.parameter_aliases.len(), 1);
    assert_eq!(
        options.parameter_aliases[0].1,
        QueryNode::Constant(odata_query::Constant::with_literal(PrimitiveValue::Int32(5), "5"))
    );

    let mut uri = UriBuilder::new("Products");
    uri.options(&options);
    assert_eq!(
        uri.finish(),
        "Products?$filter=Price%20gt%20%40min&$orderby=Name%20desc%2CId&$search=blue%20OR%20green&$top=10&$skip=20&$count=true&@min=5"
    );

    let err = QueryParser::new().parse_query("$top=1&$top=2").unwrap_err();
    assert_eq!(err.to_string(), "while parsing $top: at position 0: query option $top given twice");
    assert!(QueryParser::new().parse_query("$format=json").is_err());
}
