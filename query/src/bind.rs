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

//! Lookups that classify path segments against a model.

use odata_csdl::model::NavigationProperty;
use odata_csdl::model::Property;
use odata_csdl::model::StructuralProperty;
use odata_csdl::model::TypeKind;
use odata_csdl::model::TypeReference;
use odata_csdl::Model;
use odata_core::QualifiedName;

/// What a name resolves to on a structured type.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Member<'m> {
    Navigation(&'m NavigationProperty),
    Structural(&'m StructuralProperty),
    /// Undeclared property of an open type.
    Open,
}

/// Result type shape of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    SingleValue,
    SingleResource,
    Collection,
}

/// Member `name` of `owner`, including inherited ones. `None` when the
/// type is closed and declares no such property.
pub(crate) fn member<'m>(model: &'m Model, owner: &QualifiedName, name: &str) -> Option<Member<'m>> {
    match model.find_property(owner, name) {
        Some(Property::Navigation(np)) => Some(Member::Navigation(np)),
        Some(Property::Structural(sp)) => Some(Member::Structural(sp)),
        None if is_open(model, owner) => Some(Member::Open),
        None => None,
    }
}

/// Name of the entity or complex (element) type of a reference.
pub(crate) fn structured_type(model: &Model, type_ref: &TypeReference) -> Option<QualifiedName> {
    let resolved = model.resolve_type(type_ref);
    match &resolved.element().kind {
        TypeKind::Entity(name) | TypeKind::Complex(name) => Some(name.clone()),
        _ => None,
    }
}

fn is_open(model: &Model, owner: &QualifiedName) -> bool {
    std::iter::once(owner.clone())
        .chain(model.base_types(owner))
        .any(|t| {
            model.find_entity_type(&t).is_some_and(|et| et.open_type)
                || model.find_complex_type(&t).is_some_and(|ct| ct.open_type)
        })
}

/// Shape of the first overload of function `name` with a return type.
pub(crate) fn function_shape(model: &Model, name: &str) -> Option<Shape> {
    let name: QualifiedName = name.parse().ok()?;
    let rt = model
        .find_operations(&name)
        .into_iter()
        .find_map(|op| op.return_type.as_ref())?;
    let rt = model.resolve_type(rt);
    Some(if rt.is_collection() {
        Shape::Collection
    } else if rt.entity_type().is_some() {
        Shape::SingleResource
    } else {
        Shape::SingleValue
    })
}

/// Target entity set of navigation `path` from entity set `set` of the
/// default container.
pub(crate) fn binding_target(model: &Model, set: &str, path: &str) -> Option<String> {
    let (_, container) = model.entity_container()?;
    let target = container
        .entity_set(set)?
        .bindings_for(path)
        .next()?
        .target
        .clone();
    Some(target)
}
