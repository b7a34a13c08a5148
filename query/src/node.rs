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

//! Query expression tree.
//!
//! Nodes are immutable values. Sources are owned (`Box`), so a tree has
//! no back references; navigation nodes remember the entity set they
//! lead to when the parser knew it.

use odata_core::PrimitiveValue;
use odata_core::QualifiedName;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Name of the implicit range variable of `$filter` and `$orderby`.
pub const IT: &str = "$it";

/// Binary operator kinds with their precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    Or,
    And,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Has,
}

impl BinaryOperatorKind {
    /// Binding strength. Higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal
            | Self::NotEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual
            | Self::LessThan
            | Self::LessThanOrEqual => 3,
            Self::Add | Self::Subtract => 4,
            Self::Multiply | Self::Divide | Self::Modulo => 5,
            Self::Has => 6,
        }
    }

    /// Keyword in `$filter` syntax.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "ge",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "le",
            Self::Add => "add",
            Self::Subtract => "sub",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::Modulo => "mod",
            Self::Has => "has",
        }
    }

    /// Operator for a `$filter` keyword.
    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "or" => Self::Or,
            "and" => Self::And,
            "eq" => Self::Equal,
            "ne" => Self::NotEqual,
            "gt" => Self::GreaterThan,
            "ge" => Self::GreaterThanOrEqual,
            "lt" => Self::LessThan,
            "le" => Self::LessThanOrEqual,
            "add" => Self::Add,
            "sub" => Self::Subtract,
            "mul" => Self::Multiply,
            "div" => Self::Divide,
            "mod" => Self::Modulo,
            "has" => Self::Has,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::Or | Self::And)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    Negate,
    Not,
}

/// Literal with the text it is written as.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: PrimitiveValue,
    /// Literal text, verbatim from the parsed query or formatted from
    /// the value.
    pub literal: String,
}

impl Constant {
    /// Constant with freshly formatted literal text.
    #[must_use]
    pub fn new(value: PrimitiveValue) -> Self {
        let literal = crate::literal::format_literal(&value);
        Self { value, literal }
    }

    /// Constant keeping the literal text it was read from.
    #[must_use]
    pub fn with_literal(value: PrimitiveValue, literal: impl Into<String>) -> Self {
        Self {
            value,
            literal: literal.into(),
        }
    }

    #[must_use]
    pub fn null() -> Self {
        Self::new(PrimitiveValue::Null)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.value, PrimitiveValue::Null)
    }
}

/// `any` or `all` with its range variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub source: Box<QueryNode>,
    /// `None` for the predicate-less form `any()`.
    pub variable: Option<String>,
    pub body: Box<QueryNode>,
}

/// Function call, bound when `source` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub source: Option<Box<QueryNode>>,
    pub name: String,
    pub arguments: Vec<QueryNode>,
}

/// Node of a query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    BinaryOperator {
        kind: BinaryOperatorKind,
        left: Box<QueryNode>,
        right: Box<QueryNode>,
    },
    UnaryOperator {
        kind: UnaryOperatorKind,
        operand: Box<QueryNode>,
    },
    Constant(Constant),
    /// Implicit conversion. Rendered as its source.
    Convert {
        source: Box<QueryNode>,
        type_name: QualifiedName,
    },
    SingleValueProperty {
        source: Box<QueryNode>,
        property: String,
    },
    CollectionProperty {
        source: Box<QueryNode>,
        property: String,
    },
    /// Dynamic property of an open type.
    OpenProperty {
        source: Box<QueryNode>,
        name: String,
    },
    SingleNavigation {
        source: Box<QueryNode>,
        property: String,
        /// Entity set the navigation leads to.
        navigation_source: Option<String>,
    },
    CollectionNavigation {
        source: Box<QueryNode>,
        property: String,
        navigation_source: Option<String>,
    },
    /// Reference to `$it` or a lambda variable.
    RangeVariable(String),
    SingleResourceCast {
        source: Box<QueryNode>,
        type_name: QualifiedName,
    },
    CollectionResourceCast {
        source: Box<QueryNode>,
        type_name: QualifiedName,
    },
    Any(Lambda),
    All(Lambda),
    SingleValueFunctionCall(FunctionCall),
    SingleResourceFunctionCall(FunctionCall),
    CollectionFunctionCall(FunctionCall),
    /// `@name`, stored without the `@`.
    ParameterAlias(String),
    In {
        left: Box<QueryNode>,
        right: Box<QueryNode>,
    },
    CollectionConstant(Vec<Constant>),
    /// `source/$count`.
    Count {
        source: Box<QueryNode>,
    },
    /// Word or phrase of `$search`.
    SearchTerm(String),
}

impl QueryNode {
    /// The implicit range variable `$it`.
    #[must_use]
    pub fn it() -> Self {
        Self::RangeVariable(IT.into())
    }

    #[must_use]
    pub fn binary(kind: BinaryOperatorKind, left: Self, right: Self) -> Self {
        Self::BinaryOperator {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn unary(kind: UnaryOperatorKind, operand: Self) -> Self {
        Self::UnaryOperator {
            kind,
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn constant(value: PrimitiveValue) -> Self {
        Self::Constant(Constant::new(value))
    }

    /// Single-valued property of `$it`.
    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self::property_of(Self::it(), name)
    }

    #[must_use]
    pub fn property_of(source: Self, name: impl Into<String>) -> Self {
        Self::SingleValueProperty {
            source: Box::new(source),
            property: name.into(),
        }
    }

    #[must_use]
    pub fn call(name: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self::SingleValueFunctionCall(FunctionCall {
            source: None,
            name: name.into(),
            arguments,
        })
    }

    /// Operator kind when this is a binary operator node.
    #[must_use]
    pub const fn binary_kind(&self) -> Option<BinaryOperatorKind> {
        match self {
            Self::BinaryOperator { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the node denotes a collection.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::CollectionProperty { .. }
                | Self::CollectionNavigation { .. }
                | Self::CollectionResourceCast { .. }
                | Self::CollectionFunctionCall(_)
                | Self::CollectionConstant(_)
        )
    }
}

impl Display for QueryNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        crate::render::NodeToStringBuilder::filter()
            .render(self)
            .fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderByDirection {
    #[default]
    Ascending,
    Descending,
}

/// One `$orderby` term linked to the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub expression: QueryNode,
    pub direction: OrderByDirection,
    pub then_by: Option<Box<OrderByClause>>,
}

impl OrderByClause {
    #[must_use]
    pub const fn new(expression: QueryNode, direction: OrderByDirection) -> Self {
        Self {
            expression,
            direction,
            then_by: None,
        }
    }

    /// Build the chain from terms in order. `None` for no terms.
    #[must_use]
    pub fn chain(terms: Vec<(QueryNode, OrderByDirection)>) -> Option<Self> {
        terms
            .into_iter()
            .rev()
            .fold(None, |next, (expression, direction)| {
                Some(Self {
                    expression,
                    direction,
                    then_by: next.map(Box::new),
                })
            })
    }

    /// Terms of the chain starting at this one.
    pub fn terms(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |c| c.then_by.as_deref())
    }
}

/// `$select` item: a property path, `*` or `Namespace.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    Path(Vec<String>),
    Wildcard,
    AllOperations(String),
}

/// `$levels` of an expand item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Levels {
    Count(u32),
    Max,
}

/// `$expand` item with its nested options.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandItem {
    /// Navigation path, `*` for all.
    pub path: Vec<String>,
    pub options: QueryOptions,
}

impl ExpandItem {
    #[must_use]
    pub fn new(path: Vec<String>) -> Self {
        Self {
            path,
            options: QueryOptions::default(),
        }
    }
}

/// System query options and parameter aliases of one request, or the
/// nested options of an expand item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOptions {
    pub filter: Option<QueryNode>,
    pub order_by: Option<OrderByClause>,
    pub search: Option<QueryNode>,
    pub select: Vec<SelectItem>,
    pub expand: Vec<ExpandItem>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    pub count: Option<bool>,
    /// Only meaningful for expand items.
    pub levels: Option<Levels>,
    /// Alias name without `@` and its value, in insertion order.
    pub parameter_aliases: Vec<(String, QueryNode)>,
}

impl QueryOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_table() {
        use BinaryOperatorKind::*;
        let order = [Or, And, Equal, Add, Multiply, Has];
        for pair in order.windows(2) {
            assert!(pair[0].precedence() < pair[1].precedence());
        }
        assert_eq!(LessThanOrEqual.precedence(), NotEqual.precedence());
        assert_eq!(Modulo.precedence(), Divide.precedence());
    }

    #[test]
    fn order_by_chain_keeps_order() {
        let chain = OrderByClause::chain(vec![
            (QueryNode::property("A"), OrderByDirection::Ascending),
            (QueryNode::property("B"), OrderByDirection::Descending),
        ])
        .unwrap();
        let names: Vec<_> = chain
            .terms()
            .map(|t| match &t.expression {
                QueryNode::SingleValueProperty { property, .. } => property.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(chain.then_by.unwrap().direction, OrderByDirection::Descending);
        assert!(OrderByClause::chain(Vec::new()).is_none());
    }
}
