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

use crate::Error;
use odata_core::EdmVersion;
use odata_csdl::AliasMap;
use odata_csdl::CsdlReader;
use odata_csdl::CsdlWriter;
use odata_csdl::Model;
use odata_csdl::WriterSettings;

/// Library service: enum, type definition, complex and entity types,
/// operations and out of line annotations.
pub const LIBRARY_V4: &str = include_str!("../schemas/library.xml");
/// Warehouse service in CSDL 3.0 with associations.
pub const WAREHOUSE_V3: &str = include_str!("../schemas/warehouse-v3.xml");

/// Read a document that must have no errors and pass validation.
///
/// # Errors
///
/// Returns reader or validation errors as text.
pub fn load(text: &str) -> Result<Model, Error> {
    let parsed = CsdlReader::default().parse(text);
    let model = parsed.value.ok_or_else(|| {
        Error::Csdl(parsed.diagnostics.iter().map(ToString::to_string).collect())
    })?;
    let errors = model.validate();
    if errors.is_empty() {
        Ok(model)
    } else {
        Err(Error::Validation(
            errors.iter().map(ToString::to_string).collect(),
        ))
    }
}

/// Write `model` in `version` with its own aliases.
///
/// # Errors
///
/// Returns error if the writer fails.
pub fn write(model: &Model, version: EdmVersion) -> Result<String, Error> {
    let settings = WriterSettings {
        version,
        ..WriterSettings::default()
    };
    Ok(CsdlWriter::new(settings).write_to_string(model, &AliasMap::from_model(model))?)
}
