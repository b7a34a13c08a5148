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

//! Tool configuration file.
//!
//! An optional TOML file provides defaults for the reader, writer and
//! batch settings. Command line flags override file values.
//!
//! ```toml
//! [csdl]
//! version = "3.0"
//! indent = 4
//! fail-on-warnings = true
//!
//! [csdl.aliases]
//! "Org.Example.Service" = "Svc"
//!
//! [batch]
//! base-uri = "http://example.org/service/"
//! max-part-size = 1048576
//! ```

use crate::Error;
use odata_batch::BatchReaderSettings;
use odata_core::EdmVersion;
use odata_core::Namespace;
use odata_core::SimpleIdentifier;
use odata_csdl::AliasMap;
use odata_csdl::Model;
use odata_csdl::ReaderSettings;
use odata_csdl::WriterSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read as _;
use std::path::Path;
use url::Url;

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default)]
    pub csdl: CsdlConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CsdlConfig {
    /// Version written by `normalize`.
    pub version: Option<EdmVersion>,
    /// Spaces per nesting level. Zero writes everything on one line.
    pub indent: Option<usize>,
    pub report_unused_attributes: Option<bool>,
    pub fail_on_warnings: Option<bool>,
    /// Aliases written for these namespaces instead of the declared ones.
    #[serde(default)]
    pub aliases: BTreeMap<Namespace, SimpleIdentifier>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BatchConfig {
    pub base_uri: Option<Url>,
    pub max_part_size: Option<usize>,
}

impl ToolConfig {
    /// Read configuration from TOML file.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if failed to read file
    /// - `Error::Config` if the content is not a valid configuration.
    pub fn read(fname: &Path) -> Result<Self, Error> {
        let mut file = File::open(fname).map_err(|err| Error::Io(fname.into(), err))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|err| Error::Io(fname.into(), err))?;
        toml::from_str(&content).map_err(|err| Error::Config(fname.into(), err))
    }

    #[must_use]
    pub fn reader_settings(&self) -> ReaderSettings {
        let default = ReaderSettings::default();
        ReaderSettings {
            report_unused_attributes: self
                .csdl
                .report_unused_attributes
                .unwrap_or(default.report_unused_attributes),
            fail_on_warnings: self.csdl.fail_on_warnings.unwrap_or(default.fail_on_warnings),
        }
    }

    #[must_use]
    pub fn writer_settings(&self) -> WriterSettings {
        let default = WriterSettings::default();
        WriterSettings {
            version: self.csdl.version.unwrap_or(default.version),
            indent: match self.csdl.indent {
                Some(0) => None,
                Some(n) => Some(n),
                None => default.indent,
            },
        }
    }

    /// Aliases declared by `model` with the configured ones on top.
    #[must_use]
    pub fn aliases(&self, model: &Model) -> AliasMap {
        self.csdl
            .aliases
            .iter()
            .fold(AliasMap::from_model(model), |map, (namespace, alias)| {
                map.with_override(namespace.clone(), alias.clone())
            })
    }

    #[must_use]
    pub fn batch_reader_settings(&self) -> BatchReaderSettings {
        let default = BatchReaderSettings::default();
        BatchReaderSettings {
            base_uri: self.batch.base_uri.clone().or(default.base_uri),
            max_part_size: self.batch.max_part_size.unwrap_or(default.max_part_size),
        }
    }
}
