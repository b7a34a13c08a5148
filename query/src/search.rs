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

//! `$search` expressions: words and phrases combined with `AND`, `OR`
//! and `NOT`. Adjacent terms are joined by an implicit `AND`. Keywords
//! are recognized in upper case only.

use crate::error::ParseError;
use crate::error::ParseErrorKind;
use crate::node::BinaryOperatorKind;
use crate::node::QueryNode;
use crate::node::UnaryOperatorKind;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Phrase(String),
    And,
    Or,
    Not,
    OpenParen,
    CloseParen,
    End,
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let start = pos;
        match chars[pos] {
            c if c.is_whitespace() => {
                pos += 1;
                continue;
            }
            '(' => {
                pos += 1;
                tokens.push((Token::OpenParen, start));
            }
            ')' => {
                pos += 1;
                tokens.push((Token::CloseParen, start));
            }
            '"' => {
                pos += 1;
                let mut phrase = String::new();
                loop {
                    match chars.get(pos) {
                        None => {
                            return Err(ParseError::new(start, ParseErrorKind::UnterminatedString))
                        }
                        Some('"') => break,
                        Some('\\') => {
                            let Some(escaped) = chars.get(pos + 1) else {
                                return Err(ParseError::new(start, ParseErrorKind::UnterminatedString));
                            };
                            phrase.push(*escaped);
                            pos += 2;
                        }
                        Some(c) => {
                            phrase.push(*c);
                            pos += 1;
                        }
                    }
                }
                pos += 1;
                tokens.push((Token::Phrase(phrase), start));
            }
            _ => {
                while pos < chars.len()
                    && !chars[pos].is_whitespace()
                    && !matches!(chars[pos], '(' | ')' | '"')
                {
                    pos += 1;
                }
                let word: String = chars[start..pos].iter().collect();
                let token = match word.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Word(word),
                };
                tokens.push((token, start));
            }
        }
    }
    tokens.push((Token::End, chars.len()));
    Ok(tokens)
}

/// Parse a `$search` expression into search term and operator nodes.
///
/// # Errors
///
/// Returns error with character offset for unbalanced parentheses,
/// unterminated phrases, dangling operators and empty input.
pub fn parse_search(text: &str) -> Result<QueryNode, ParseError> {
    let mut parser = SearchParser {
        tokens: tokenize(text)?,
        pos: 0,
    };
    let node = parser.or()?;
    match parser.peek() {
        Token::End => Ok(node),
        _ => Err(parser.unexpected()),
    }
}

struct SearchParser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl SearchParser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> ParseError {
        let (token, offset) = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        let kind = match token {
            Token::End => ParseErrorKind::UnexpectedEnd,
            Token::Word(w) => ParseErrorKind::UnexpectedToken(w.clone()),
            Token::Phrase(p) => ParseErrorKind::UnexpectedToken(format!("\"{p}\"")),
            Token::And => ParseErrorKind::UnexpectedToken("AND".into()),
            Token::Or => ParseErrorKind::UnexpectedToken("OR".into()),
            Token::Not => ParseErrorKind::UnexpectedToken("NOT".into()),
            Token::OpenParen => ParseErrorKind::UnexpectedToken("(".into()),
            Token::CloseParen => ParseErrorKind::UnexpectedToken(")".into()),
        };
        ParseError::new(*offset, kind)
    }

    fn or(&mut self) -> Result<QueryNode, ParseError> {
        let mut left = self.and()?;
        while *self.peek() == Token::Or {
            self.advance();
            let right = self.and()?;
            left = QueryNode::binary(BinaryOperatorKind::Or, left, right);
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<QueryNode, ParseError> {
        let mut left = self.unary()?;
        loop {
            if *self.peek() == Token::And {
                self.advance();
            } else if !matches!(
                self.peek(),
                Token::Word(_) | Token::Phrase(_) | Token::Not | Token::OpenParen
            ) {
                return Ok(left);
            }
            let right = self.unary()?;
            left = QueryNode::binary(BinaryOperatorKind::And, left, right);
        }
    }

    fn unary(&mut self) -> Result<QueryNode, ParseError> {
        match self.peek().clone() {
            Token::Not => {
                self.advance();
                let operand = self.unary()?;
                Ok(QueryNode::unary(UnaryOperatorKind::Not, operand))
            }
            Token::OpenParen => {
                self.advance();
                let inner = self.or()?;
                if *self.peek() != Token::CloseParen {
                    return Err(self.unexpected());
                }
                self.advance();
                Ok(inner)
            }
            Token::Word(term) | Token::Phrase(term) => {
                self.advance();
                Ok(QueryNode::SearchTerm(term))
            }
            _ => Err(self.unexpected()),
        }
    }
}
