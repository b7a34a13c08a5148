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

//! Tokens of `$filter`, `$orderby`, `$select` and `$expand` text.

use crate::error::ParseError;
use crate::error::ParseErrorKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Name, keyword or dotted qualified name. May start with `$`.
    Identifier(String),
    /// `@name` without the `@`.
    Alias(String),
    /// String literal with quotes undoubled.
    String(String),
    /// Number, suffix included.
    Number,
    /// `prefix'body'`: guid, duration, binary, spatial or enum literal.
    Typed { prefix: String, body: String },
    Date,
    DateTimeOffset,
    TimeOfDay,
    OpenParen,
    CloseParen,
    Comma,
    Slash,
    Colon,
    Equals,
    Semicolon,
    Star,
    Minus,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Character offset of the first character.
    pub offset: usize,
    /// Source text of the token.
    pub text: String,
}

impl Token {
    pub(crate) fn is_identifier(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(id) if id == name)
    }
}

/// Split `text` into tokens. The last token is always [`TokenKind::End`].
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut lexer = Lexer { chars, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let end = token.kind == TokenKind::End;
        tokens.push(token);
        if end {
            return Ok(tokens);
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn digits_ahead(&self, from: usize) -> usize {
        self.chars[(self.pos + from).min(self.chars.len())..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count()
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) {
        while self.peek(0).is_some_and(&f) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.take_while(char::is_whitespace);
        let start = self.pos;
        let Some(c) = self.peek(0) else {
            return Ok(self.token(TokenKind::End, start));
        };
        let kind = match c {
            '(' | ')' | ',' | '/' | ':' | '=' | ';' | '*' | '-' => {
                self.pos += 1;
                match c {
                    '(' => TokenKind::OpenParen,
                    ')' => TokenKind::CloseParen,
                    ',' => TokenKind::Comma,
                    '/' => TokenKind::Slash,
                    ':' => TokenKind::Colon,
                    '=' => TokenKind::Equals,
                    ';' => TokenKind::Semicolon,
                    '*' => TokenKind::Star,
                    _ => TokenKind::Minus,
                }
            }
            '\'' => TokenKind::String(self.quoted(start)?),
            '@' => {
                self.pos += 1;
                let name_start = self.pos;
                self.take_while(is_name_char);
                if self.pos == name_start {
                    return Err(ParseError::new(start, ParseErrorKind::UnexpectedCharacter('@')));
                }
                TokenKind::Alias(self.slice(name_start))
            }
            c if c.is_ascii_digit() => self.number_or_temporal(start),
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                self.pos += 1;
                self.take_while(|c| is_name_char(c) || c == '.');
                let name = self.slice(start);
                if self.peek(0) == Some('\'') {
                    let quote = self.pos;
                    TokenKind::Typed {
                        prefix: name,
                        body: self.quoted(quote)?,
                    }
                } else {
                    TokenKind::Identifier(name)
                }
            }
            c => return Err(ParseError::new(start, ParseErrorKind::UnexpectedCharacter(c))),
        };
        Ok(self.token(kind, start))
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            offset: start,
            text: self.slice(start),
        }
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// Body of a single-quoted literal starting at `start`.
    fn quoted(&mut self, start: usize) -> Result<String, ParseError> {
        self.pos += 1;
        let mut body = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Err(ParseError::new(start, ParseErrorKind::UnterminatedString));
                }
                Some('\'') if self.peek(1) == Some('\'') => {
                    body.push('\'');
                    self.pos += 2;
                }
                Some('\'') => {
                    self.pos += 1;
                    return Ok(body);
                }
                Some(c) => {
                    body.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn number_or_temporal(&mut self, start: usize) -> TokenKind {
        let leading = self.digits_ahead(0);
        if leading == 4 && self.peek(4) == Some('-') && self.digits_ahead(5) > 0 {
            self.take_while(|c| c.is_ascii_alphanumeric() || "-:.+".contains(c));
            return if self.chars[start..self.pos].contains(&'T') {
                TokenKind::DateTimeOffset
            } else {
                TokenKind::Date
            };
        }
        if leading == 2 && self.peek(2) == Some(':') {
            self.take_while(|c| c.is_ascii_digit() || c == ':' || c == '.');
            return TokenKind::TimeOfDay;
        }
        self.pos += leading;
        if self.peek(0) == Some('.') && self.digits_ahead(1) > 0 {
            self.pos += 1;
            self.take_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek(1), Some('+' | '-')));
            if self.digits_ahead(1 + sign) > 0 {
                self.pos += 1 + sign;
                self.take_while(|c| c.is_ascii_digit());
            }
        }
        if let Some(c) = self.peek(0) {
            if "LlDdFfMm".contains(c) && !self.peek(1).is_some_and(is_name_char) {
                self.pos += 1;
            }
        }
        TokenKind::Number
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
