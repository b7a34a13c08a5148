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

//! Request URI assembly.
//!
//! ```
//! use odata_query::QueryParser;
//! use odata_query::UriBuilder;
//!
//! let options = QueryParser::new()
//!     .parse_query("$filter=Price gt @p&$top=5&@p=10")
//!     .unwrap();
//! let mut uri = UriBuilder::new("Products");
//! uri.options(&options);
//! assert_eq!(uri.finish(), "Products?$filter=Price%20gt%20%40p&$top=5&@p=10");
//! ```

use crate::error::Error;
use crate::node::QueryNode;
use crate::node::QueryOptions;
use crate::render::NodeToStringBuilder;
use url::Url;

/// Percent-encode a query option value. Only unreserved characters and
/// `*` stay as they are; space becomes `%20`.
#[must_use]
pub fn percent_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Resource path followed by query options.
///
/// Every part appended after the path is prefixed with `?` if it is the
/// first one and with `&` otherwise.
#[derive(Debug, Clone)]
pub struct UriBuilder {
    out: String,
    wrote_any_query_part: bool,
}

impl UriBuilder {
    #[must_use]
    pub fn new(resource_path: &str) -> Self {
        Self {
            out: resource_path.to_string(),
            wrote_any_query_part: false,
        }
    }

    fn separator(&mut self) {
        self.out
            .push(if self.wrote_any_query_part { '&' } else { '?' });
        self.wrote_any_query_part = true;
    }

    /// Append `name=value` with `value` percent-encoded.
    pub fn option(&mut self, name: &str, value: &str) -> &mut Self {
        self.separator();
        self.out.push_str(name);
        self.out.push('=');
        self.out.push_str(&percent_encode(value));
        self
    }

    /// Append system query options in canonical order, then parameter
    /// aliases.
    pub fn options(&mut self, options: &QueryOptions) -> &mut Self {
        for (name, value) in NodeToStringBuilder::filter().option_pairs(options) {
            self.option(name, &value);
        }
        self.parameter_aliases(&options.parameter_aliases)
    }

    /// Append `@name=value` for each alias in the given order. Aliases
    /// whose value renders empty are skipped.
    pub fn parameter_aliases(&mut self, aliases: &[(String, QueryNode)]) -> &mut Self {
        let builder = NodeToStringBuilder::filter();
        for (name, value) in aliases {
            let text = builder.render(value);
            if !text.is_empty() {
                self.option(&format!("@{name}"), &text);
            }
        }
        self
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

impl QueryOptions {
    /// Options as they appear after `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut builder = UriBuilder::new("");
        builder.options(self);
        let out = builder.finish();
        out.strip_prefix('?').unwrap_or(&out).to_string()
    }
}

/// Absolute request URL of `resource_path` below `service_root`.
///
/// # Errors
///
/// Returns error if the path cannot be joined to the root.
pub fn build_uri(
    service_root: &Url,
    resource_path: &str,
    options: &QueryOptions,
) -> Result<Url, Error> {
    let mut root = service_root.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    let mut url = root
        .join(resource_path.trim_start_matches('/'))
        .map_err(Error::InvalidBase)?;
    let query = options.to_query_string();
    url.set_query((!query.is_empty()).then_some(query.as_str()));
    Ok(url)
}
