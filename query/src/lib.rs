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

//! OData query expressions.
//!
//! A parsed `$filter` renders back to its canonical text:
//!
//! ```
//! use odata_query::QueryParser;
//!
//! let node = QueryParser::new()
//!     .parse_filter("(Price add 1) mul 2 gt 10 and not contains(Name,'x')")
//!     .unwrap();
//! assert_eq!(
//!     node.to_string(),
//!     "(Price add 1) mul 2 gt 10 and not contains(Name,'x')"
//! );
//! ```

/// Model lookups used by bound parsers.
mod bind;
/// Query parse errors.
pub mod error;
/// Tokenizer.
mod lexer;
/// Literal text of primitive values.
pub mod literal;
/// Query tree.
pub mod node;
/// Expression parser.
pub mod parser;
/// Query tree to text.
pub mod render;
/// `$search` parser.
pub mod search;
/// Request URI assembly.
pub mod uri;

pub use error::Error;
pub use error::ParseError;
pub use error::ParseErrorKind;
pub use node::BinaryOperatorKind;
pub use node::Constant;
pub use node::ExpandItem;
pub use node::OrderByClause;
pub use node::OrderByDirection;
pub use node::QueryNode;
pub use node::QueryOptions;
pub use node::SelectItem;
pub use node::UnaryOperatorKind;
pub use parser::QueryParser;
pub use render::NodeToStringBuilder;
pub use search::parse_search;
pub use uri::UriBuilder;
