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

//! Actions, functions, terms and type definitions.

use crate::model::Annotation;
use crate::model::Facets;
use crate::model::TypeReference;
use odata_core::PrimitiveKind;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// 12.1 Element edm:Action. Actions may have side effects.
    Action,
    /// 12.2 Element edm:Function. Functions never have side effects.
    Function,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Action => "Action",
            Self::Function => "Function",
        }
        .fmt(f)
    }
}

/// Action or function. Several operations may share one name
/// (overloads).
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: SimpleIdentifier,
    pub kind: OperationKind,
    /// 12.1.2 Attribute `IsBound`. The first parameter is the binding
    /// parameter.
    pub is_bound: bool,
    /// 12.2.3 Attribute `IsComposable`
    pub is_composable: bool,
    /// 12.1.3 Attribute `EntitySetPath`
    pub entity_set_path: Option<String>,
    pub parameters: Vec<Parameter>,
    /// 12.3 Element edm:ReturnType
    pub return_type: Option<TypeReference>,
    pub annotations: Vec<Annotation>,
}

impl Operation {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, kind: OperationKind) -> Self {
        Self {
            name,
            kind,
            is_bound: false,
            is_composable: false,
            entity_set_path: None,
            parameters: Vec::new(),
            return_type: None,
            annotations: Vec::new(),
        }
    }

    /// Actions are side-effecting, functions are not.
    #[must_use]
    pub fn is_side_effecting(&self) -> bool {
        self.kind == OperationKind::Action
    }

    /// Binding parameter of a bound operation.
    #[must_use]
    pub fn binding_parameter(&self) -> Option<&Parameter> {
        if self.is_bound {
            self.parameters.first()
        } else {
            None
        }
    }
}

/// 12.4 Element edm:Parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: SimpleIdentifier,
    pub type_ref: TypeReference,
    pub annotations: Vec<Annotation>,
}

impl Parameter {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, type_ref: TypeReference) -> Self {
        Self {
            name,
            type_ref,
            annotations: Vec::new(),
        }
    }
}

/// 14.1 Element edm:Term
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub name: SimpleIdentifier,
    pub type_ref: TypeReference,
    /// 14.1.2 Attribute `BaseTerm`
    pub base_term: Option<QualifiedName>,
    /// 14.1.3 Attribute `DefaultValue`
    pub default_value: Option<String>,
    /// 14.1.4 Attribute `AppliesTo`: whitespace separated in XML.
    pub applies_to: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl Term {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, type_ref: TypeReference) -> Self {
        Self {
            name,
            type_ref,
            base_term: None,
            default_value: None,
            applies_to: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// 11.1 Element edm:TypeDefinition
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: SimpleIdentifier,
    pub underlying_type: PrimitiveKind,
    pub facets: Facets,
    pub annotations: Vec<Annotation>,
}

impl TypeDefinition {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, underlying_type: PrimitiveKind) -> Self {
        Self {
            name,
            underlying_type,
            facets: Facets::EMPTY,
            annotations: Vec::new(),
        }
    }
}
