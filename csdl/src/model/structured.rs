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

//! Entity types, complex types and their properties.

use crate::model::Annotation;
use crate::model::TypeReference;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;
use tagged_types::TaggedType;

pub type PropertyName = TaggedType<SimpleIdentifier, PropertyNameTag>;
#[derive(tagged_types::Tag)]
#[implement(Clone, Hash, PartialEq, Eq)]
#[transparent(Debug, Display, FromStr)]
#[capability(inner_access)]
pub enum PropertyNameTag {}

/// 8.1 Element edm:EntityType
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    /// 8.1.1 Attribute `Name`
    pub name: SimpleIdentifier,
    /// 8.1.2 Attribute `BaseType`
    pub base_type: Option<QualifiedName>,
    /// 8.1.3 Attribute `Abstract`
    pub is_abstract: bool,
    /// 8.1.4 Attribute `OpenType`
    pub open_type: bool,
    /// 8.1.5 Attribute `HasStream`
    pub has_stream: bool,
    /// 8.2 Element edm:Key. `None` when the type declares no key.
    pub key: Option<Vec<PropertyRef>>,
    pub properties: Vec<Property>,
    pub annotations: Vec<Annotation>,
}

impl EntityType {
    #[must_use]
    pub const fn new(name: SimpleIdentifier) -> Self {
        Self {
            name,
            base_type: None,
            is_abstract: false,
            open_type: false,
            has_stream: false,
            key: None,
            properties: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// 9.1 Element edm:ComplexType
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    pub name: SimpleIdentifier,
    pub base_type: Option<QualifiedName>,
    pub is_abstract: bool,
    pub open_type: bool,
    pub properties: Vec<Property>,
    pub annotations: Vec<Annotation>,
}

impl ComplexType {
    #[must_use]
    pub const fn new(name: SimpleIdentifier) -> Self {
        Self {
            name,
            base_type: None,
            is_abstract: false,
            open_type: false,
            properties: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// 8.3 Element edm:PropertyRef
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    /// Path to a primitive property, possibly through complex properties.
    pub name: String,
    pub alias: Option<SimpleIdentifier>,
}

impl PropertyRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// Structural or navigation property of a structured type.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Structural(StructuralProperty),
    Navigation(NavigationProperty),
}

impl Property {
    #[must_use]
    pub const fn name(&self) -> &PropertyName {
        match self {
            Self::Structural(p) => &p.name,
            Self::Navigation(p) => &p.name,
        }
    }

    #[must_use]
    pub const fn type_ref(&self) -> &TypeReference {
        match self {
            Self::Structural(p) => &p.type_ref,
            Self::Navigation(p) => &p.type_ref,
        }
    }

    #[must_use]
    pub const fn annotations(&self) -> &Vec<Annotation> {
        match self {
            Self::Structural(p) => &p.annotations,
            Self::Navigation(p) => &p.annotations,
        }
    }

    #[must_use]
    pub const fn as_structural(&self) -> Option<&StructuralProperty> {
        match self {
            Self::Structural(p) => Some(p),
            Self::Navigation(_) => None,
        }
    }

    #[must_use]
    pub const fn as_navigation(&self) -> Option<&NavigationProperty> {
        match self {
            Self::Navigation(p) => Some(p),
            Self::Structural(_) => None,
        }
    }
}

/// 6.1 Element edm:Property
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralProperty {
    pub name: PropertyName,
    pub type_ref: TypeReference,
    /// 6.2.7 Attribute `DefaultValue`
    pub default_value: Option<String>,
    pub concurrency_mode: ConcurrencyMode,
    pub annotations: Vec<Annotation>,
}

impl StructuralProperty {
    #[must_use]
    pub const fn new(name: PropertyName, type_ref: TypeReference) -> Self {
        Self {
            name,
            type_ref,
            default_value: None,
            concurrency_mode: ConcurrencyMode::None,
            annotations: Vec::new(),
        }
    }
}

/// 7.1 Element edm:NavigationProperty
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationProperty {
    pub name: PropertyName,
    /// Entity type or collection of entity type.
    pub type_ref: TypeReference,
    /// 7.1.4 Attribute `Partner`
    pub partner: Option<PropertyName>,
    /// 7.1.5 Attribute `ContainsTarget`
    pub contains_target: bool,
    /// 7.3 Element edm:OnDelete
    pub on_delete: Option<OnDeleteAction>,
    /// 7.2 Element edm:ReferentialConstraint
    pub referential_constraints: Vec<ReferentialConstraint>,
    pub annotations: Vec<Annotation>,
}

impl NavigationProperty {
    #[must_use]
    pub const fn new(name: PropertyName, type_ref: TypeReference) -> Self {
        Self {
            name,
            type_ref,
            partner: None,
            contains_target: false,
            on_delete: None,
            referential_constraints: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// 7.2 Element edm:ReferentialConstraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialConstraint {
    /// Property of the dependent (declaring) type.
    pub property: String,
    /// Property of the principal (target) type.
    pub referenced_property: String,
}

/// 7.3.1 Attribute `Action`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDeleteAction {
    Cascade,
    None,
    SetNull,
    SetDefault,
}

impl FromStr for OnDeleteAction {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cascade" => Ok(Self::Cascade),
            "None" => Ok(Self::None),
            "SetNull" => Ok(Self::SetNull),
            "SetDefault" => Ok(Self::SetDefault),
            _ => Err(()),
        }
    }
}

impl Display for OnDeleteAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Cascade => "Cascade",
            Self::None => "None",
            Self::SetNull => "SetNull",
            Self::SetDefault => "SetDefault",
        }
        .fmt(f)
    }
}

/// Optimistic concurrency participation of a structural property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyMode {
    #[default]
    None,
    Fixed,
}

impl FromStr for ConcurrencyMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Fixed" => Ok(Self::Fixed),
            _ => Err(()),
        }
    }
}

impl Display for ConcurrencyMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => "None",
            Self::Fixed => "Fixed",
        }
        .fmt(f)
    }
}
