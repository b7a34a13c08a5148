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

//! EDM versions and their XML namespaces.

use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

const CSDL_V1: &str = "http://schemas.microsoft.com/ado/2006/04/edm";
const CSDL_V1_1: &str = "http://schemas.microsoft.com/ado/2007/05/edm";
const CSDL_V1_2: &str = "http://schemas.microsoft.com/ado/2008/01/edm";
const CSDL_V2: &str = "http://schemas.microsoft.com/ado/2008/09/edm";
const CSDL_V3: &str = "http://schemas.microsoft.com/ado/2009/11/edm";
const CSDL_V4: &str = "http://docs.oasis-open.org/odata/ns/edm";

const EDMX_V1: &str = "http://schemas.microsoft.com/ado/2007/06/edmx";
const EDMX_V3: &str = "http://schemas.microsoft.com/ado/2009/11/edmx";
const EDMX_V4: &str = "http://docs.oasis-open.org/odata/ns/edmx";

/// Namespace of the legacy data services attributes
/// (`m:IsDefaultEntityContainer`, `m:DataServiceVersion`).
pub const LEGACY_METADATA_NAMESPACE: &str =
    "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnsupportedVersion(String),
    UnknownNamespace(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnsupportedVersion(v) => write!(f, "unsupported EDM version: {v}"),
            Self::UnknownNamespace(ns) => write!(f, "unknown CSDL namespace: {ns}"),
        }
    }
}

impl StdError for Error {}

/// Version of the Entity Data Model a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum EdmVersion {
    V1,
    V1_1,
    V1_2,
    V2,
    V3,
    V4,
    V4_01,
}

impl EdmVersion {
    pub const ALL: [Self; 7] = [
        Self::V1,
        Self::V1_1,
        Self::V1_2,
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V4_01,
    ];

    /// Namespace URI of `Schema` elements in this version.
    #[must_use]
    pub const fn csdl_namespace(self) -> &'static str {
        match self {
            Self::V1 => CSDL_V1,
            Self::V1_1 => CSDL_V1_1,
            Self::V1_2 => CSDL_V1_2,
            Self::V2 => CSDL_V2,
            Self::V3 => CSDL_V3,
            Self::V4 | Self::V4_01 => CSDL_V4,
        }
    }

    /// Namespace URI of the `edmx:Edmx` envelope in this version.
    #[must_use]
    pub const fn edmx_namespace(self) -> &'static str {
        match self {
            Self::V1 | Self::V1_1 | Self::V1_2 | Self::V2 => EDMX_V1,
            Self::V3 => EDMX_V3,
            Self::V4 | Self::V4_01 => EDMX_V4,
        }
    }

    /// Value of the `Version` attribute of `edmx:Edmx`.
    #[must_use]
    pub const fn edmx_version(self) -> &'static str {
        match self {
            Self::V1 | Self::V1_1 | Self::V1_2 | Self::V2 => "1.0",
            Self::V3 => "3.0",
            Self::V4 => "4.0",
            Self::V4_01 => "4.01",
        }
    }

    /// Value of `m:DataServiceVersion` on `edmx:DataServices` in legacy
    /// documents.
    #[must_use]
    pub const fn data_service_version(self) -> &'static str {
        match self {
            Self::V1 | Self::V1_1 => "1.0",
            Self::V1_2 | Self::V2 => "2.0",
            Self::V3 => "3.0",
            Self::V4 => "4.0",
            Self::V4_01 => "4.01",
        }
    }

    /// Versions before 4.0 model relationships as associations.
    #[must_use]
    pub const fn uses_associations(self) -> bool {
        !matches!(self, Self::V4 | Self::V4_01)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V2 => "2.0",
            Self::V3 => "3.0",
            Self::V4 => "4.0",
            Self::V4_01 => "4.01",
        }
    }

    /// Version identified by a CSDL namespace URI. Both 4.x versions
    /// share one namespace; `V4` is returned for it.
    ///
    /// # Errors
    ///
    /// Returns error if the namespace is not a CSDL namespace.
    pub fn from_csdl_namespace(ns: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|v| v.csdl_namespace() == ns)
            .ok_or_else(|| Error::UnknownNamespace(ns.into()))
    }

    /// True if `ns` is the envelope namespace of any version.
    #[must_use]
    pub fn is_edmx_namespace(ns: &str) -> bool {
        [EDMX_V1, EDMX_V3, EDMX_V4].contains(&ns)
    }

    /// True if `ns` is the CSDL namespace of any version.
    #[must_use]
    pub fn is_csdl_namespace(ns: &str) -> bool {
        Self::from_csdl_namespace(ns).is_ok()
    }
}

impl Default for EdmVersion {
    fn default() -> Self {
        Self::V4
    }
}

impl FromStr for EdmVersion {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::UnsupportedVersion(s.into()))
    }
}

impl TryFrom<String> for EdmVersion {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for EdmVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
