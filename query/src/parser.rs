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

//! Recursive descent parser for `$filter`, `$orderby`, `$select` and
//! `$expand`, and for whole query strings.
//!
//! Without a model every path segment is read as a single-valued
//! property, turned into a collection when `any`, `all` or `$count`
//! follows. A parser bound to an entity type classifies segments as
//! structural, navigation or open properties and rejects unknown ones.

use crate::bind;
use crate::bind::Member;
use crate::bind::Shape;
use crate::error::Error;
use crate::error::ParseError;
use crate::error::ParseErrorKind;
use crate::lexer::tokenize;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::literal::parse_number;
use crate::literal::parse_typed;
use crate::node::BinaryOperatorKind;
use crate::node::Constant;
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
use crate::search::parse_search;
use odata_core::PrimitiveKind;
use odata_core::PrimitiveValue;
use odata_core::QualifiedName;
use odata_csdl::Model;
use tracing::debug;

/// Query parser, optionally bound to the type `$it` ranges over.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser<'m> {
    model: Option<&'m Model>,
    it_type: Option<&'m QualifiedName>,
    entity_set: Option<&'m str>,
}

impl<'m> QueryParser<'m> {
    /// Parser that does not know the model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser for expressions over instances of `entity_type`.
    #[must_use]
    pub const fn bound(model: &'m Model, entity_type: &'m QualifiedName) -> Self {
        Self {
            model: Some(model),
            it_type: Some(entity_type),
            entity_set: None,
        }
    }

    /// Parser for expressions over entity set `name` of the default
    /// container. Navigation nodes record their target entity set.
    #[must_use]
    pub fn for_entity_set(model: &'m Model, name: &'m str) -> Option<Self> {
        let (_, container) = model.entity_container()?;
        let set = container.entity_set(name)?;
        Some(Self {
            model: Some(model),
            it_type: Some(&set.entity_type),
            entity_set: Some(name),
        })
    }

    /// Parse a `$filter` expression.
    ///
    /// # Errors
    ///
    /// Returns error with character offset if the text is not a valid
    /// expression or names an unknown property of a bound type.
    pub fn parse_filter(&self, text: &str) -> Result<QueryNode, ParseError> {
        let mut cursor = self.cursor(text)?;
        let node = cursor.expression(1)?;
        cursor.expect_end()?;
        Ok(node)
    }

    /// Parse an `$orderby` list.
    ///
    /// # Errors
    ///
    /// Same as [`QueryParser::parse_filter`].
    pub fn parse_order_by(&self, text: &str) -> Result<OrderByClause, ParseError> {
        let mut cursor = self.cursor(text)?;
        let clause = cursor.order_by()?;
        cursor.expect_end()?;
        Ok(clause)
    }

    /// Parse a `$select` list.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a list of paths.
    pub fn parse_select(&self, text: &str) -> Result<Vec<SelectItem>, ParseError> {
        let mut cursor = self.cursor(text)?;
        let items = cursor.select()?;
        cursor.expect_end()?;
        Ok(items)
    }

    /// Parse an `$expand` list with nested options.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid or a path is not a
    /// navigation property of a bound type.
    pub fn parse_expand(&self, text: &str) -> Result<Vec<ExpandItem>, ParseError> {
        let mut cursor = self.cursor(text)?;
        let items = cursor.expand()?;
        cursor.expect_end()?;
        Ok(items)
    }

    /// Parse the query part of a URL (with or without leading `?`).
    /// Values are percent-decoded first. Custom options (names not
    /// starting with `$` or `@`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns error naming the option that failed.
    pub fn parse_query(&self, query: &str) -> Result<QueryOptions, Error> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut options = QueryOptions::default();
        let mut seen = Vec::new();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let name = name.into_owned();
            let fail = |err: ParseError| Error::Option(name.clone(), err);
            if name.starts_with('$') {
                if seen.contains(&name) {
                    return Err(fail(ParseError::new(
                        0,
                        ParseErrorKind::DuplicateOption(name.clone()),
                    )));
                }
                seen.push(name.clone());
            }
            match name.as_str() {
                "$filter" => options.filter = Some(self.parse_filter(&value).map_err(fail)?),
                "$orderby" => options.order_by = Some(self.parse_order_by(&value).map_err(fail)?),
                "$search" => options.search = Some(parse_search(&value).map_err(fail)?),
                "$select" => options.select = self.parse_select(&value).map_err(fail)?,
                "$expand" => options.expand = self.parse_expand(&value).map_err(fail)?,
                "$top" => options.top = Some(integer(&name, &value).map_err(fail)?),
                "$skip" => options.skip = Some(integer(&name, &value).map_err(fail)?),
                "$count" => options.count = Some(boolean(&name, &value).map_err(fail)?),
                alias if alias.starts_with('@') => {
                    let node = self.parse_filter(&value).map_err(fail)?;
                    options.parameter_aliases.push((alias[1..].to_string(), node));
                }
                unknown if unknown.starts_with('$') => {
                    return Err(fail(ParseError::new(
                        0,
                        ParseErrorKind::UnknownOption(unknown.to_string()),
                    )));
                }
                custom => debug!(option = custom, "custom query option ignored"),
            }
        }
        Ok(options)
    }

    fn cursor(&self, text: &str) -> Result<Cursor<'m>, ParseError> {
        Ok(Cursor {
            model: self.model,
            it_type: self.it_type.cloned(),
            entity_set: self.entity_set,
            tokens: tokenize(text)?,
            pos: 0,
            scope: Vec::new(),
        })
    }
}

fn integer(option: &str, value: &str) -> Result<u64, ParseError> {
    value.trim().parse().map_err(|_| invalid_value(option, value))
}

fn boolean(option: &str, value: &str) -> Result<bool, ParseError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid_value(option, value)),
    }
}

fn invalid_value(option: &str, value: &str) -> ParseError {
    ParseError::new(
        0,
        ParseErrorKind::InvalidOptionValue {
            option: option.into(),
            value: value.into(),
        },
    )
}

/// Path node with the structured type it denotes, when known.
struct Typed {
    node: QueryNode,
    ty: Option<QualifiedName>,
}

struct Cursor<'m> {
    model: Option<&'m Model>,
    it_type: Option<QualifiedName>,
    entity_set: Option<&'m str>,
    tokens: Vec<Token>,
    pos: usize,
    /// Lambda variables in scope with their element types.
    scope: Vec<(String, Option<QualifiedName>)>,
}

impl<'m> Cursor<'m> {
    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_identifier(&mut self, name: &str) -> bool {
        if self.peek().is_identifier(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ParseError {
        let token = self.peek();
        let kind = if token.kind == TokenKind::End {
            ParseErrorKind::UnexpectedEnd
        } else {
            ParseErrorKind::UnexpectedToken(token.text.clone())
        };
        ParseError::new(token.offset, kind)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        if *self.peek_kind() == TokenKind::End {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Binary operators with precedence `min` or higher, left
    /// associative.
    fn expression(&mut self, min: u8) -> Result<QueryNode, ParseError> {
        let mut left = self.unary()?;
        loop {
            if self.peek().is_identifier("in")
                && BinaryOperatorKind::Equal.precedence() >= min
            {
                self.advance();
                let right = self.in_operand()?;
                left = QueryNode::In {
                    left: Box::new(left),
                    right: Box::new(right),
                };
                continue;
            }
            let kind = match self.peek_kind() {
                TokenKind::Identifier(kw) => BinaryOperatorKind::from_keyword(kw),
                _ => None,
            };
            let Some(kind) = kind.filter(|k| k.precedence() >= min) else {
                return Ok(left);
            };
            self.advance();
            let right = self.expression(kind.precedence() + 1)?;
            left = QueryNode::binary(kind, left, right);
        }
    }

    fn unary(&mut self) -> Result<QueryNode, ParseError> {
        if self.eat_identifier("not") {
            let operand = self.unary()?;
            return Ok(QueryNode::unary(UnaryOperatorKind::Not, operand));
        }
        if let Some(node) = self.signed_number()? {
            return Ok(node);
        }
        if self.eat(&TokenKind::Minus) {
            let operand = self.unary()?;
            if let QueryNode::Constant(c) = &operand {
                let text = format!("-{}", c.literal);
                if c.value.kind().is_some_and(is_numeric) {
                    if let Some(value) = parse_number(&text) {
                        return Ok(QueryNode::Constant(Constant::with_literal(value, text)));
                    }
                }
            }
            return Ok(QueryNode::unary(UnaryOperatorKind::Negate, operand));
        }
        self.primary()
    }

    // A `-` directly followed by a number belongs to the literal, so the
    // minimum of each integer type reads back.
    fn signed_number(&mut self) -> Result<Option<QueryNode>, ParseError> {
        let minus = self.peek();
        if minus.kind != TokenKind::Minus {
            return Ok(None);
        }
        let offset = minus.offset;
        let Some(number) = self.tokens.get(self.pos + 1) else {
            return Ok(None);
        };
        if number.kind != TokenKind::Number || number.offset != offset + 1 {
            return Ok(None);
        }
        let text = format!("-{}", number.text);
        let value = parse_number(&text)
            .ok_or_else(|| ParseError::new(offset, ParseErrorKind::InvalidLiteral(text.clone())))?;
        self.advance();
        self.advance();
        Ok(Some(QueryNode::Constant(Constant::with_literal(value, text))))
    }

    fn primary(&mut self) -> Result<QueryNode, ParseError> {
        let token = self.peek().clone();
        let invalid = || ParseError::new(token.offset, ParseErrorKind::InvalidLiteral(token.text.clone()));
        let constant = |value| QueryNode::Constant(Constant::with_literal(value, token.text.clone()));
        let node = match &token.kind {
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.expression(1)?;
                self.expect(&TokenKind::CloseParen)?;
                return Ok(inner);
            }
            TokenKind::String(s) => constant(PrimitiveValue::String(s.clone())),
            TokenKind::Number => constant(parse_number(&token.text).ok_or_else(invalid)?),
            TokenKind::Typed { prefix, body } => {
                constant(parse_typed(prefix, body).ok_or_else(invalid)?)
            }
            TokenKind::Date => constant(temporal(PrimitiveKind::Date, &token.text).ok_or_else(invalid)?),
            TokenKind::DateTimeOffset => constant(
                temporal(PrimitiveKind::DateTimeOffset, &token.text).ok_or_else(invalid)?,
            ),
            TokenKind::TimeOfDay => {
                constant(temporal(PrimitiveKind::TimeOfDay, &token.text).ok_or_else(invalid)?)
            }
            TokenKind::Alias(name) => QueryNode::ParameterAlias(name.clone()),
            TokenKind::Identifier(name) => {
                if let Some(value) = keyword_constant(name) {
                    constant(value)
                } else {
                    return Ok(self.path()?.node);
                }
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(node)
    }

    /// Right side of `in`: a parenthesized literal list, an alias or a
    /// collection path.
    fn in_operand(&mut self) -> Result<QueryNode, ParseError> {
        if !self.eat(&TokenKind::OpenParen) {
            return self.primary();
        }
        let mut items = Vec::new();
        loop {
            let offset = self.peek().offset;
            match self.unary()? {
                QueryNode::Constant(c) => items.push(c),
                _ => {
                    return Err(ParseError::new(
                        offset,
                        ParseErrorKind::InvalidLiteral("in list item".into()),
                    ))
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::CloseParen)?;
        Ok(QueryNode::CollectionConstant(items))
    }

    /// Member path starting at `$it`, a lambda variable or an implicit
    /// `$it`.
    fn path(&mut self) -> Result<Typed, ParseError> {
        let first = self.identifier()?;
        let mut current = if first == IT {
            Typed {
                node: QueryNode::it(),
                ty: self.it_type.clone(),
            }
        } else if let Some((name, ty)) = self.scope.iter().rev().find(|(n, _)| *n == first) {
            Typed {
                node: QueryNode::RangeVariable(name.clone()),
                ty: ty.clone(),
            }
        } else {
            let it = Typed {
                node: QueryNode::it(),
                ty: self.it_type.clone(),
            };
            let offset = self.tokens[self.pos - 1].offset;
            self.segment(it, first, offset, true)?
        };
        while self.eat(&TokenKind::Slash) {
            let offset = self.peek().offset;
            let name = self.identifier()?;
            current = self.segment(current, name, offset, false)?;
        }
        Ok(current)
    }

    fn segment(
        &mut self,
        source: Typed,
        name: String,
        offset: usize,
        implicit: bool,
    ) -> Result<Typed, ParseError> {
        if *self.peek_kind() == TokenKind::OpenParen {
            return if name == "any" || name == "all" {
                self.lambda(source, &name, offset)
            } else {
                self.function(source, name, implicit)
            };
        }
        if name == "$count" {
            let source = self.as_collection(source, offset)?;
            return Ok(Typed {
                node: QueryNode::Count {
                    source: Box::new(source.node),
                },
                ty: None,
            });
        }
        if name.contains('.') {
            let type_name: QualifiedName = name
                .parse()
                .map_err(|_| ParseError::new(offset, ParseErrorKind::UnexpectedToken(name.clone())))?;
            let source_node = Box::new(source.node);
            let node = if source_node.is_collection() {
                QueryNode::CollectionResourceCast {
                    source: source_node,
                    type_name: type_name.clone(),
                }
            } else {
                QueryNode::SingleResourceCast {
                    source: source_node,
                    type_name: type_name.clone(),
                }
            };
            return Ok(Typed {
                node,
                ty: Some(type_name),
            });
        }
        self.property(source, name, offset)
    }

    fn property(&self, source: Typed, name: String, offset: usize) -> Result<Typed, ParseError> {
        let (Some(model), Some(owner)) = (self.model, source.ty.as_ref()) else {
            return Ok(Typed {
                node: QueryNode::property_of(source.node, name),
                ty: None,
            });
        };
        let from_it = source.node == QueryNode::it();
        let boxed = Box::new(source.node);
        match bind::member(model, owner, &name) {
            Some(Member::Navigation(np)) => {
                let navigation_source = self
                    .entity_set
                    .filter(|_| from_it)
                    .and_then(|set| bind::binding_target(model, set, &name));
                let ty = np.type_ref.entity_type().cloned();
                let node = if np.type_ref.is_collection() {
                    QueryNode::CollectionNavigation {
                        source: boxed,
                        property: name,
                        navigation_source,
                    }
                } else {
                    QueryNode::SingleNavigation {
                        source: boxed,
                        property: name,
                        navigation_source,
                    }
                };
                Ok(Typed { node, ty })
            }
            Some(Member::Structural(sp)) => {
                let ty = bind::structured_type(model, &sp.type_ref);
                let node = if sp.type_ref.is_collection() {
                    QueryNode::CollectionProperty {
                        source: boxed,
                        property: name,
                    }
                } else {
                    QueryNode::SingleValueProperty {
                        source: boxed,
                        property: name,
                    }
                };
                Ok(Typed { node, ty })
            }
            Some(Member::Open) => Ok(Typed {
                node: QueryNode::OpenProperty {
                    source: boxed,
                    name,
                },
                ty: None,
            }),
            None => Err(ParseError::new(
                offset,
                ParseErrorKind::UnknownProperty {
                    type_name: owner.to_string(),
                    property: name,
                },
            )),
        }
    }

    /// Collection view of a path node for `any`, `all` and `$count`.
    /// Properties of unbound parsers and open properties become
    /// collections.
    fn as_collection(&self, source: Typed, offset: usize) -> Result<Typed, ParseError> {
        let bound = self.model.is_some() && self.it_type.is_some();
        let node = match source.node {
            node if node.is_collection() => node,
            QueryNode::SingleValueProperty { source, property } if !bound => {
                QueryNode::CollectionProperty { source, property }
            }
            QueryNode::OpenProperty { source, name } => QueryNode::CollectionProperty {
                source,
                property: name,
            },
            other => {
                return Err(ParseError::new(
                    offset,
                    ParseErrorKind::NotACollection(other.to_string()),
                ))
            }
        };
        Ok(Typed { node, ty: source.ty })
    }

    fn lambda(&mut self, source: Typed, operator: &str, offset: usize) -> Result<Typed, ParseError> {
        let source = self.as_collection(source, offset)?;
        self.expect(&TokenKind::OpenParen)?;
        let (variable, body) = if self.eat(&TokenKind::CloseParen) {
            (None, QueryNode::constant(PrimitiveValue::Boolean(true)))
        } else {
            let variable = self.identifier()?;
            self.expect(&TokenKind::Colon)?;
            self.scope.push((variable.clone(), source.ty.clone()));
            let body = self.expression(1);
            self.scope.pop();
            let body = body?;
            self.expect(&TokenKind::CloseParen)?;
            (Some(variable), body)
        };
        let lambda = Lambda {
            source: Box::new(source.node),
            variable,
            body: Box::new(body),
        };
        Ok(Typed {
            node: if operator == "any" {
                QueryNode::Any(lambda)
            } else {
                QueryNode::All(lambda)
            },
            ty: None,
        })
    }

    fn function(&mut self, source: Typed, name: String, implicit: bool) -> Result<Typed, ParseError> {
        self.expect(&TokenKind::OpenParen)?;
        let mut arguments = Vec::new();
        if !self.eat(&TokenKind::CloseParen) {
            loop {
                arguments.push(self.expression(1)?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::CloseParen)?;
        }
        let shape = self
            .model
            .and_then(|m| bind::function_shape(m, &name))
            .unwrap_or(Shape::SingleValue);
        let call = FunctionCall {
            source: (!implicit).then(|| Box::new(source.node)),
            name,
            arguments,
        };
        Ok(Typed {
            node: match shape {
                Shape::SingleValue => QueryNode::SingleValueFunctionCall(call),
                Shape::SingleResource => QueryNode::SingleResourceFunctionCall(call),
                Shape::Collection => QueryNode::CollectionFunctionCall(call),
            },
            ty: None,
        })
    }

    fn order_by(&mut self) -> Result<OrderByClause, ParseError> {
        let mut terms = Vec::new();
        loop {
            let expression = self.expression(1)?;
            let direction = if self.eat_identifier("desc") {
                OrderByDirection::Descending
            } else {
                self.eat_identifier("asc");
                OrderByDirection::Ascending
            };
            terms.push((expression, direction));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        OrderByClause::chain(terms).ok_or_else(|| self.unexpected())
    }

    fn select(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&TokenKind::Star) {
                items.push(SelectItem::Wildcard);
            } else {
                let first = self.identifier()?;
                if let Some(ns) = first.strip_suffix('.') {
                    self.expect(&TokenKind::Star)?;
                    items.push(SelectItem::AllOperations(ns.to_string()));
                } else {
                    let mut path = vec![first];
                    while self.eat(&TokenKind::Slash) {
                        path.push(self.identifier()?);
                    }
                    items.push(SelectItem::Path(path));
                }
            }
            if !self.eat(&TokenKind::Comma) {
                return Ok(items);
            }
        }
    }

    fn expand(&mut self) -> Result<Vec<ExpandItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let offset = self.peek().offset;
            let path = if self.eat(&TokenKind::Star) {
                vec!["*".to_string()]
            } else {
                let mut path = vec![self.identifier()?];
                while self.eat(&TokenKind::Slash) {
                    path.push(self.identifier()?);
                }
                path
            };
            let target = self.expand_target(&path, offset)?;
            let mut item = ExpandItem::new(path);
            if self.eat(&TokenKind::OpenParen) {
                let outer = std::mem::replace(&mut self.it_type, target);
                let options = self.nested_options();
                self.it_type = outer;
                item.options = options?;
                self.expect(&TokenKind::CloseParen)?;
            }
            items.push(item);
            if !self.eat(&TokenKind::Comma) {
                return Ok(items);
            }
        }
    }

    /// Entity type reached by an expand path of a bound parser.
    fn expand_target(&self, path: &[String], offset: usize) -> Result<Option<QualifiedName>, ParseError> {
        let (Some(model), Some(mut ty)) = (self.model, self.it_type.clone()) else {
            return Ok(None);
        };
        if path.first().is_some_and(|p| p == "*") {
            return Ok(None);
        }
        for name in path {
            if name.contains('.') {
                ty = name
                    .parse()
                    .map_err(|_| ParseError::new(offset, ParseErrorKind::UnexpectedToken(name.clone())))?;
                continue;
            }
            match bind::member(model, &ty, name) {
                Some(Member::Navigation(np)) => match np.type_ref.entity_type() {
                    Some(target) => ty = target.clone(),
                    None => return Ok(None),
                },
                Some(Member::Structural(sp)) => match bind::structured_type(model, &sp.type_ref) {
                    Some(target) => ty = target,
                    None => return Ok(None),
                },
                Some(Member::Open) => return Ok(None),
                None => {
                    return Err(ParseError::new(
                        offset,
                        ParseErrorKind::UnknownProperty {
                            type_name: ty.to_string(),
                            property: name.clone(),
                        },
                    ))
                }
            }
        }
        Ok(Some(ty))
    }

    /// `$option=value` pairs separated by `;` inside an expand item.
    fn nested_options(&mut self) -> Result<QueryOptions, ParseError> {
        let mut options = QueryOptions::default();
        let mut seen: Vec<String> = Vec::new();
        loop {
            let offset = self.peek().offset;
            let name = self.identifier()?;
            if seen.contains(&name) {
                return Err(ParseError::new(offset, ParseErrorKind::DuplicateOption(name)));
            }
            seen.push(name.clone());
            self.expect(&TokenKind::Equals)?;
            match name.as_str() {
                "$filter" => options.filter = Some(self.expression(1)?),
                "$orderby" => options.order_by = Some(self.order_by()?),
                "$select" => options.select = self.select()?,
                "$expand" => options.expand = self.expand()?,
                "$top" => options.top = Some(self.number(&name)?),
                "$skip" => options.skip = Some(self.number(&name)?),
                "$count" => {
                    let value = self.identifier()?;
                    options.count = Some(boolean(&name, &value).map_err(|e| ParseError { offset, ..e })?);
                }
                "$levels" => {
                    options.levels = Some(if self.eat_identifier("max") {
                        Levels::Max
                    } else {
                        let n = self.number(&name)?;
                        Levels::Count(u32::try_from(n).map_err(|_| invalid_value(&name, &n.to_string()))?)
                    });
                }
                _ => return Err(ParseError::new(offset, ParseErrorKind::UnknownOption(name))),
            }
            if !self.eat(&TokenKind::Semicolon) {
                return Ok(options);
            }
        }
    }

    fn number(&mut self, option: &str) -> Result<u64, ParseError> {
        let token = self.advance();
        if token.kind != TokenKind::Number {
            return Err(ParseError::new(token.offset, ParseErrorKind::UnexpectedToken(token.text)));
        }
        token
            .text
            .parse()
            .map_err(|_| ParseError { offset: token.offset, ..invalid_value(option, &token.text) })
    }
}

fn keyword_constant(name: &str) -> Option<PrimitiveValue> {
    match name {
        "true" => Some(PrimitiveValue::Boolean(true)),
        "false" => Some(PrimitiveValue::Boolean(false)),
        "null" => Some(PrimitiveValue::Null),
        _ if name.starts_with("INF") || name.starts_with("NaN") => parse_number(name),
        _ => None,
    }
}

fn temporal(kind: PrimitiveKind, text: &str) -> Option<PrimitiveValue> {
    PrimitiveValue::parse(kind, text).ok()
}

const fn is_numeric(kind: PrimitiveKind) -> bool {
    matches!(
        kind,
        PrimitiveKind::Byte
            | PrimitiveKind::SByte
            | PrimitiveKind::Int16
            | PrimitiveKind::Int32
            | PrimitiveKind::Int64
            | PrimitiveKind::Single
            | PrimitiveKind::Double
            | PrimitiveKind::Decimal
    )
}
