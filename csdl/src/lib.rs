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

//! Entity Data Model with CSDL-XML reader and writer.
//!
//! ```
//! use odata_csdl::alias::AliasMap;
//! use odata_csdl::reader::CsdlReader;
//! use odata_csdl::writer::CsdlWriter;
//!
//! let text = r#"<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
//!   <edmx:DataServices>
//!     <Schema Namespace="NS" xmlns="http://docs.oasis-open.org/odata/ns/edm">
//!       <ComplexType Name="Address"><Property Name="City" Type="Edm.String"/></ComplexType>
//!     </Schema>
//!   </edmx:DataServices>
//! </edmx:Edmx>"#;
//! let parsed = CsdlReader::default().parse(text);
//! assert!(parsed.diagnostics.is_empty());
//! let model = parsed.value.unwrap();
//! let xml = CsdlWriter::default()
//!     .write_to_string(&model, &AliasMap::from_model(&model))
//!     .unwrap();
//! assert!(xml.contains(r#"<ComplexType Name="Address">"#));
//! ```

/// Namespace aliases used for writing.
pub mod alias;
/// Model, validation and write errors.
pub mod error;
/// Schema model.
pub mod model;
/// CSDL-XML reader.
pub mod reader;
/// Semantic checks over a complete model.
pub mod validation;
/// CSDL-XML writer.
pub mod writer;

pub use alias::AliasMap;
pub use error::ModelError;
pub use error::WriteError;
pub use model::Model;
pub use reader::CsdlReader;
pub use reader::ParseOutput;
pub use reader::ReaderSettings;
pub use validation::ValidationError;
pub use writer::CsdlWriter;
pub use writer::WriterSettings;
