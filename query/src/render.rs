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

//! Query tree to URI text.

use crate::node::BinaryOperatorKind;
use crate::node::ExpandItem;
use crate::node::FunctionCall;
use crate::node::Lambda;
use crate::node::Levels;
use crate::node::OrderByClause;
use crate::node::OrderByDirection;
use crate::node::QueryNode;
use crate::node::QueryOptions;
use crate::node::SelectItem;
use crate::node::UnaryOperatorKind;
use crate::node::IT;

/// Renders query nodes with minimal parentheses.
///
/// An operand is parenthesized only when its operator binds strictly
/// weaker than the parent. Trees produced by the parser are left-deep
/// for equal precedence and render back to the same tree. A hand-built
/// right operand of equal precedence, as in `X sub (Y sub Z)`, renders
/// as `X sub Y sub Z` and reads back left-deep, which changes the
/// result for `sub`, `div` and `mod`.
///
/// The search flag selects the keyword vocabulary: `AND`/`OR`/`NOT` in
/// `$search`, `and`/`or`/`not` everywhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeToStringBuilder {
    search: bool,
}

impl NodeToStringBuilder {
    /// Builder for `$filter`, `$orderby` and alias values.
    #[must_use]
    pub const fn filter() -> Self {
        Self { search: false }
    }

    /// Builder for `$search`.
    #[must_use]
    pub const fn search() -> Self {
        Self { search: true }
    }

    #[must_use]
    pub fn render(&self, node: &QueryNode) -> String {
        match node {
            QueryNode::BinaryOperator { kind, left, right } => {
                let l = self.operand(*kind, left);
                let r = self.operand(*kind, right);
                format!("{l} {} {r}", self.binary_keyword(*kind))
            }
            QueryNode::UnaryOperator { kind, operand } => {
                let inner = self.render(operand);
                let inner = if operand.binary_kind().is_some() {
                    format!("({inner})")
                } else {
                    inner
                };
                match kind {
                    UnaryOperatorKind::Not if self.search => format!("NOT {inner}"),
                    UnaryOperatorKind::Not => format!("not {inner}"),
                    UnaryOperatorKind::Negate => format!("-{inner}"),
                }
            }
            QueryNode::Constant(c) => {
                if c.is_null() {
                    "null".into()
                } else {
                    c.literal.clone()
                }
            }
            QueryNode::Convert { source, .. } => self.render(source),
            QueryNode::SingleValueProperty { source, property }
            | QueryNode::CollectionProperty { source, property }
            | QueryNode::SingleNavigation {
                source, property, ..
            }
            | QueryNode::CollectionNavigation {
                source, property, ..
            }
            | QueryNode::OpenProperty {
                source,
                name: property,
            } => self.segment(source, property),
            QueryNode::RangeVariable(name) => {
                if name == IT {
                    String::new()
                } else {
                    name.clone()
                }
            }
            QueryNode::SingleResourceCast { source, type_name }
            | QueryNode::CollectionResourceCast { source, type_name } => {
                self.segment(source, &type_name.to_string())
            }
            QueryNode::Any(lambda) => self.lambda("any", lambda),
            QueryNode::All(lambda) => self.lambda("all", lambda),
            QueryNode::SingleValueFunctionCall(call)
            | QueryNode::SingleResourceFunctionCall(call)
            | QueryNode::CollectionFunctionCall(call) => self.call(call),
            QueryNode::ParameterAlias(name) => format!("@{name}"),
            QueryNode::In { left, right } => {
                format!("{} in {}", self.render(left), self.render(right))
            }
            QueryNode::CollectionConstant(items) => format!(
                "({})",
                items
                    .iter()
                    .map(|c| c.literal.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            QueryNode::Count { source } => self.segment(source, "$count"),
            QueryNode::SearchTerm(term) => search_term(term),
        }
    }

    fn binary_keyword(&self, kind: BinaryOperatorKind) -> &'static str {
        match kind {
            BinaryOperatorKind::And if self.search => "AND",
            BinaryOperatorKind::Or if self.search => "OR",
            _ => kind.keyword(),
        }
    }

    /// Parenthesize a binary operand binding weaker than its parent.
    fn operand(&self, parent: BinaryOperatorKind, node: &QueryNode) -> String {
        let text = self.render(node);
        match node.binary_kind() {
            Some(kind) if kind.precedence() < parent.precedence() => format!("({text})"),
            _ => text,
        }
    }

    /// `source/name`, or `name` when the source renders empty.
    fn segment(&self, source: &QueryNode, name: &str) -> String {
        let source = self.render(source);
        if source.is_empty() {
            name.to_string()
        } else {
            format!("{source}/{name}")
        }
    }

    fn lambda(&self, operator: &str, lambda: &Lambda) -> String {
        let head = self.segment(&lambda.source, operator);
        match &lambda.variable {
            None if matches!(*lambda.body, QueryNode::Constant(_)) => format!("{head}()"),
            None => format!("{head}({})", self.render(&lambda.body)),
            Some(var) => format!("{head}({var}:{})", self.render(&lambda.body)),
        }
    }

    fn call(&self, call: &FunctionCall) -> String {
        let args = call
            .arguments
            .iter()
            .map(|a| self.render(a))
            .collect::<Vec<_>>()
            .join(",");
        let head = match &call.source {
            Some(source) => self.segment(source, &call.name),
            None => call.name.clone(),
        };
        format!("{head}({args})")
    }

    /// `expr[ desc]` terms joined by `,`.
    #[must_use]
    pub fn order_by(&self, clause: &OrderByClause) -> String {
        let term = self.render(&clause.expression);
        let term = match clause.direction {
            OrderByDirection::Ascending => term,
            OrderByDirection::Descending => format!("{term} desc"),
        };
        match &clause.then_by {
            Some(next) => format!("{term},{}", self.order_by(next)),
            None => term,
        }
    }

    #[must_use]
    pub fn select(&self, items: &[SelectItem]) -> String {
        items
            .iter()
            .map(|item| match item {
                SelectItem::Path(path) => path.join("/"),
                SelectItem::Wildcard => "*".into(),
                SelectItem::AllOperations(ns) => format!("{ns}.*"),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[must_use]
    pub fn expand(&self, items: &[ExpandItem]) -> String {
        items
            .iter()
            .map(|item| {
                let path = item.path.join("/");
                let nested = Self::filter().options(&item.options, ";");
                if nested.is_empty() {
                    path
                } else {
                    format!("{path}({nested})")
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `$option=value` pairs joined by `separator`, unencoded. Parameter
    /// aliases are not included.
    #[must_use]
    pub fn options(&self, options: &QueryOptions, separator: &str) -> String {
        self.option_pairs(options)
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// System query options in canonical order.
    #[must_use]
    pub fn option_pairs(&self, options: &QueryOptions) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &options.filter {
            pairs.push(("$filter", Self::filter().render(filter)));
        }
        if let Some(order_by) = &options.order_by {
            pairs.push(("$orderby", Self::filter().order_by(order_by)));
        }
        if let Some(search) = &options.search {
            pairs.push(("$search", Self::search().render(search)));
        }
        if !options.select.is_empty() {
            pairs.push(("$select", self.select(&options.select)));
        }
        if !options.expand.is_empty() {
            pairs.push(("$expand", self.expand(&options.expand)));
        }
        if let Some(top) = options.top {
            pairs.push(("$top", top.to_string()));
        }
        if let Some(skip) = options.skip {
            pairs.push(("$skip", skip.to_string()));
        }
        if let Some(count) = options.count {
            pairs.push(("$count", count.to_string()));
        }
        match options.levels {
            Some(Levels::Count(n)) => pairs.push(("$levels", n.to_string())),
            Some(Levels::Max) => pairs.push(("$levels", "max".into())),
            None => {}
        }
        pairs
    }
}

/// Search word, or a double-quoted phrase when the term would not read
/// back as one word.
fn search_term(term: &str) -> String {
    let word = !term.is_empty()
        && !matches!(term, "AND" | "OR" | "NOT")
        && !term
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'));
    if word {
        term.to_string()
    } else {
        format!("\"{}\"", term.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Constant;
    use odata_core::PrimitiveValue;

    fn prop(name: &str) -> QueryNode {
        QueryNode::property(name)
    }

    fn bin(kind: BinaryOperatorKind, l: QueryNode, r: QueryNode) -> QueryNode {
        QueryNode::binary(kind, l, r)
    }

    fn render(node: &QueryNode) -> String {
        NodeToStringBuilder::filter().render(node)
    }

    #[test]
    fn equal_precedence_on_the_right_is_not_parenthesized() {
        use BinaryOperatorKind::Subtract;
        let right_deep = bin(Subtract, prop("X"), bin(Subtract, prop("Y"), prop("Z")));
        let left_deep = bin(Subtract, bin(Subtract, prop("X"), prop("Y")), prop("Z"));
        assert_eq!(render(&right_deep), "X sub Y sub Z");
        assert_eq!(render(&left_deep), "X sub Y sub Z");
    }

    #[test]
    fn lower_precedence_operand_is_parenthesized() {
        let or = bin(BinaryOperatorKind::Or, prop("a"), prop("b"));
        let node = bin(BinaryOperatorKind::And, or, prop("c"));
        assert_eq!(render(&node), "(a or b) and c");

        let and = bin(BinaryOperatorKind::And, prop("a"), prop("b"));
        let node = bin(BinaryOperatorKind::Or, and, prop("c"));
        assert_eq!(render(&node), "a and b or c");
    }

    #[test]
    fn equal_precedence_is_not_parenthesized() {
        let inner = bin(BinaryOperatorKind::Add, prop("a"), prop("b"));
        let node = bin(BinaryOperatorKind::Subtract, inner, prop("c"));
        assert_eq!(render(&node), "a add b sub c");
    }

    #[test]
    fn unary_wraps_binary_operand() {
        let eq = bin(
            BinaryOperatorKind::Equal,
            prop("a"),
            QueryNode::constant(PrimitiveValue::Int32(1)),
        );
        let not = QueryNode::unary(UnaryOperatorKind::Not, eq);
        assert_eq!(render(&not), "not (a eq 1)");
        let neg = QueryNode::unary(UnaryOperatorKind::Negate, prop("a"));
        assert_eq!(render(&neg), "-a");
    }

    #[test]
    fn implicit_range_variable_is_elided() {
        assert_eq!(render(&prop("Name")), "Name");
        let nested = QueryNode::property_of(
            QueryNode::RangeVariable("x".into()),
            "Price",
        );
        assert_eq!(render(&nested), "x/Price");
    }

    #[test]
    fn lambdas_and_calls() {
        let items = QueryNode::CollectionNavigation {
            source: Box::new(QueryNode::it()),
            property: "Items".into(),
            navigation_source: None,
        };
        let body = bin(
            BinaryOperatorKind::GreaterThan,
            QueryNode::property_of(QueryNode::RangeVariable("x".into()), "Price"),
            QueryNode::constant(PrimitiveValue::Int32(10)),
        );
        let any = QueryNode::Any(Lambda {
            source: Box::new(items.clone()),
            variable: Some("x".into()),
            body: Box::new(body),
        });
        assert_eq!(render(&any), "Items/any(x:x/Price gt 10)");

        let empty = QueryNode::Any(Lambda {
            source: Box::new(items),
            variable: None,
            body: Box::new(QueryNode::constant(PrimitiveValue::Boolean(true))),
        });
        assert_eq!(render(&empty), "Items/any()");

        let call = QueryNode::call(
            "contains",
            vec![prop("Name"), QueryNode::constant(PrimitiveValue::String("o'k".into()))],
        );
        assert_eq!(render(&call), "contains(Name,'o''k')");
    }

    #[test]
    fn in_and_count() {
        let node = QueryNode::In {
            left: Box::new(prop("Id")),
            right: Box::new(QueryNode::CollectionConstant(vec![
                Constant::new(PrimitiveValue::Int32(1)),
                Constant::new(PrimitiveValue::Int32(2)),
            ])),
        };
        assert_eq!(render(&node), "Id in (1,2)");
        let count = QueryNode::Count {
            source: Box::new(QueryNode::CollectionProperty {
                source: Box::new(QueryNode::it()),
                property: "Tags".into(),
            }),
        };
        assert_eq!(render(&count), "Tags/$count");
    }

    #[test]
    fn search_keywords_follow_mode() {
        let node = bin(
            BinaryOperatorKind::Or,
            QueryNode::SearchTerm("blue".into()),
            QueryNode::unary(
                UnaryOperatorKind::Not,
                QueryNode::SearchTerm("dark red".into()),
            ),
        );
        assert_eq!(
            NodeToStringBuilder::search().render(&node),
            "blue OR NOT \"dark red\""
        );
        assert_eq!(render(&node), "blue or not \"dark red\"");
    }

    #[test]
    fn order_by_terms() {
        let clause = OrderByClause::chain(vec![
            (prop("Name"), OrderByDirection::Ascending),
            (prop("Price"), OrderByDirection::Descending),
        ])
        .unwrap();
        assert_eq!(
            NodeToStringBuilder::filter().order_by(&clause),
            "Name,Price desc"
        );
    }

    #[test]
    fn expand_with_nested_options() {
        let mut item = ExpandItem::new(vec!["Orders".into()]);
        item.options.levels = Some(Levels::Count(2));
        item.options.select = vec![SelectItem::Path(vec!["Id".into()])];
        item.options.top = Some(5);
        assert_eq!(
            NodeToStringBuilder::filter().expand(&[item, ExpandItem::new(vec!["Customer".into()])]),
            "Orders($select=Id;$top=5;$levels=2),Customer"
        );
    }
}
