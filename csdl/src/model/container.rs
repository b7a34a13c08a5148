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

//! 13 Entity Container

use crate::model::Annotation;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;

/// 13.1 Element edm:EntityContainer
#[derive(Debug, Clone, PartialEq)]
pub struct EntityContainer {
    pub name: SimpleIdentifier,
    /// 13.1.2 Attribute `Extends`
    pub extends: Option<QualifiedName>,
    pub entity_sets: Vec<EntitySet>,
    pub singletons: Vec<Singleton>,
    pub action_imports: Vec<ActionImport>,
    pub function_imports: Vec<FunctionImport>,
    pub annotations: Vec<Annotation>,
}

impl EntityContainer {
    #[must_use]
    pub const fn new(name: SimpleIdentifier) -> Self {
        Self {
            name,
            extends: None,
            entity_sets: Vec::new(),
            singletons: Vec::new(),
            action_imports: Vec::new(),
            function_imports: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Names of all children. Children share one name scope.
    pub fn child_names(&self) -> impl Iterator<Item = &SimpleIdentifier> {
        self.entity_sets
            .iter()
            .map(|v| &v.name)
            .chain(self.singletons.iter().map(|v| &v.name))
            .chain(self.action_imports.iter().map(|v| &v.name))
            .chain(self.function_imports.iter().map(|v| &v.name))
    }

    #[must_use]
    pub fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|s| s.name.inner() == name)
    }

    #[must_use]
    pub fn singleton(&self, name: &str) -> Option<&Singleton> {
        self.singletons.iter().find(|s| s.name.inner() == name)
    }

    /// Entity type of an entity set or singleton.
    #[must_use]
    pub fn navigation_source_type(&self, name: &str) -> Option<&QualifiedName> {
        self.entity_set(name)
            .map(|s| &s.entity_type)
            .or_else(|| self.singleton(name).map(|s| &s.entity_type))
    }
}

/// 13.2 Element edm:EntitySet
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySet {
    pub name: SimpleIdentifier,
    /// 13.2.2 Attribute `EntityType`
    pub entity_type: QualifiedName,
    /// 13.2.3 Attribute `IncludeInServiceDocument`
    pub include_in_service_document: bool,
    pub bindings: Vec<NavigationPropertyBinding>,
    pub annotations: Vec<Annotation>,
}

impl EntitySet {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, entity_type: QualifiedName) -> Self {
        Self {
            name,
            entity_type,
            include_in_service_document: true,
            bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Bindings for navigation path `path`. More than one is a
    /// validation error.
    pub fn bindings_for<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a NavigationPropertyBinding> + 'a {
        self.bindings.iter().filter(move |b| b.path == path)
    }
}

/// 13.3 Element edm:Singleton
#[derive(Debug, Clone, PartialEq)]
pub struct Singleton {
    pub name: SimpleIdentifier,
    /// 13.3.2 Attribute `Type`
    pub entity_type: QualifiedName,
    pub bindings: Vec<NavigationPropertyBinding>,
    pub annotations: Vec<Annotation>,
}

impl Singleton {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, entity_type: QualifiedName) -> Self {
        Self {
            name,
            entity_type,
            bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// 13.4 Element edm:NavigationPropertyBinding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPropertyBinding {
    /// Navigation property path, optionally with type casts.
    pub path: String,
    /// Entity set or singleton, optionally qualified by container.
    pub target: String,
}

impl NavigationPropertyBinding {
    #[must_use]
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }
}

/// 13.5 Element edm:ActionImport
#[derive(Debug, Clone, PartialEq)]
pub struct ActionImport {
    pub name: SimpleIdentifier,
    pub action: QualifiedName,
    pub entity_set: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl ActionImport {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, action: QualifiedName) -> Self {
        Self {
            name,
            action,
            entity_set: None,
            annotations: Vec::new(),
        }
    }
}

/// 13.6 Element edm:FunctionImport
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionImport {
    pub name: SimpleIdentifier,
    pub function: QualifiedName,
    pub entity_set: Option<String>,
    pub include_in_service_document: bool,
    pub annotations: Vec<Annotation>,
}

impl FunctionImport {
    #[must_use]
    pub const fn new(name: SimpleIdentifier, function: QualifiedName) -> Self {
        Self {
            name,
            function,
            entity_set: None,
            include_in_service_document: false,
            annotations: Vec::new(),
        }
    }
}
