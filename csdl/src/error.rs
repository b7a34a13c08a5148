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

use odata_core::Namespace;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use quick_xml::Error as XmlError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;

/// Structural conflict: an edit that can never become valid. Returned
/// immediately by the model mutation methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Element with the same qualified name already exists. Operations
    /// only conflict with non-operations.
    DuplicateElement(QualifiedName),
    /// Entity container with the same name already exists.
    DuplicateContainer(QualifiedName),
    /// Entity set, singleton or import name is taken in the container.
    DuplicateContainerChild(QualifiedName, String),
    /// Property name is taken in the type or one of its base types.
    DuplicateProperty(QualifiedName, String),
    /// Enum member name is taken.
    DuplicateEnumMember(QualifiedName, String),
    /// The entity type already declares a key.
    KeyAlreadyDefined(QualifiedName),
    /// Base type chain through existing types loops back.
    BaseTypeCycle(QualifiedName),
    /// Collection of collections.
    NestedCollection,
    /// Name in `Edm` namespace that is not a primitive type.
    UnknownPrimitiveType(QualifiedName),
    ElementNotFound(QualifiedName),
    ContainerNotFound(QualifiedName),
    /// Entity set or singleton not found in the container.
    NavigationSourceNotFound(QualifiedName, String),
    NotAnEntityType(QualifiedName),
    NotAStructuredType(QualifiedName),
    NotAnEnumType(QualifiedName),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::DuplicateElement(name) => write!(f, "duplicate schema element: {name}"),
            Self::DuplicateContainer(name) => write!(f, "duplicate entity container: {name}"),
            Self::DuplicateContainerChild(container, name) => {
                write!(f, "duplicate name in entity container {container}: {name}")
            }
            Self::DuplicateProperty(ty, name) => {
                write!(f, "duplicate property {name} in type {ty}")
            }
            Self::DuplicateEnumMember(ty, name) => {
                write!(f, "duplicate member {name} in enum type {ty}")
            }
            Self::KeyAlreadyDefined(name) => write!(f, "key is already defined for {name}"),
            Self::BaseTypeCycle(name) => write!(f, "base type cycle through {name}"),
            Self::NestedCollection => write!(f, "collection element cannot be a collection"),
            Self::UnknownPrimitiveType(name) => write!(f, "unknown primitive type: {name}"),
            Self::ElementNotFound(name) => write!(f, "schema element not found: {name}"),
            Self::ContainerNotFound(name) => write!(f, "entity container not found: {name}"),
            Self::NavigationSourceNotFound(container, name) => {
                write!(f, "entity set or singleton {name} not found in {container}")
            }
            Self::NotAnEntityType(name) => write!(f, "not an entity type: {name}"),
            Self::NotAStructuredType(name) => write!(f, "not a structured type: {name}"),
            Self::NotAnEnumType(name) => write!(f, "not an enum type: {name}"),
        }
    }
}

impl StdError for ModelError {}

/// CSDL writer errors. Output written before the error is undefined
/// past the last completed element.
#[derive(Debug)]
pub enum WriteError {
    Io(IoError),
    Xml(XmlError),
    /// Composable operation is side-effecting (an action). Detected
    /// before anything is written.
    ComposableSideEffecting(QualifiedName),
    /// The same alias is given to more than one written namespace.
    AmbiguousAlias(SimpleIdentifier),
    /// Error while writing a schema.
    Schema(Namespace, Box<WriteError>),
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(err) => write!(f, "output error: {err}"),
            Self::Xml(err) => write!(f, "xml error: {err}"),
            Self::ComposableSideEffecting(name) => write!(
                f,
                "operation {name} is composable and side-effecting at the same time"
            ),
            Self::AmbiguousAlias(alias) => {
                write!(f, "alias {alias} is used for more than one namespace")
            }
            Self::Schema(ns, err) => write!(f, "while writing schema: {ns}\n{err}"),
        }
    }
}

impl StdError for WriteError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Xml(err) => Some(err),
            Self::ComposableSideEffecting(_) | Self::AmbiguousAlias(_) => None,
            Self::Schema(_, err) => Some(err),
        }
    }
}

impl From<IoError> for WriteError {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl From<XmlError> for WriteError {
    fn from(err: XmlError) -> Self {
        Self::Xml(err)
    }
}
