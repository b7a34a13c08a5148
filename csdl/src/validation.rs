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

//! Semantic validation of a model.
//!
//! Unlike [`ModelError`](crate::error::ModelError), validation errors
//! describe states the model is allowed to pass through while it is
//! being built: forward references, keys declared later, bindings to
//! sets not added yet.

use crate::model::EntityContainer;
use crate::model::EnumType;
use crate::model::Model;
use crate::model::NavigationProperty;
use crate::model::Operation;
use crate::model::OperationKind;
use crate::model::Property;
use crate::model::SchemaElement;
use crate::model::TypeKind;
use crate::model::TypeReference;
use odata_core::QualifiedName;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Type reference does not name an element of the model.
    UnresolvedType(QualifiedName),
    /// Type reference names an element of the wrong kind.
    TypeKindMismatch(QualifiedName),
    UnresolvedBaseType(QualifiedName),
    /// Entity type derives from a complex type or vice versa.
    BaseTypeKindMismatch(QualifiedName),
    BaseTypeCycle,
    /// Property declared again in a derived type.
    DuplicateInheritedProperty(String),
    /// Non-abstract entity type without a declared or inherited key.
    MissingKey,
    /// Derived entity type declares a key while its base has one.
    KeyRedefined,
    KeyPropertyNotFound(String),
    KeyPropertyNullable(String),
    NavigationTargetNotEntity,
    PartnerNotFound(String),
    /// Partner exists but does not point back.
    PartnerMismatch(String),
    UnresolvedEntityType(QualifiedName),
    UnresolvedOperation(QualifiedName),
    UnresolvedContainer(QualifiedName),
    BindingPathNotFound(String),
    BindingTargetNotFound(String),
    /// More than one binding for the same navigation path.
    DuplicateBinding(String),
    BoundOperationWithoutParameters,
    /// Explicit or implicit member value outside the underlying type.
    EnumValueOverflow(String),
    ComposableSideEffecting,
}

impl Display for ValidationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnresolvedType(name) => write!(f, "unresolved type {name}"),
            Self::TypeKindMismatch(name) => write!(f, "type {name} is of unexpected kind"),
            Self::UnresolvedBaseType(name) => write!(f, "unresolved base type {name}"),
            Self::BaseTypeKindMismatch(name) => {
                write!(f, "base type {name} is of different kind")
            }
            Self::BaseTypeCycle => write!(f, "base type cycle"),
            Self::DuplicateInheritedProperty(p) => {
                write!(f, "property {p} is already defined by a base type")
            }
            Self::MissingKey => write!(f, "entity type has no key"),
            Self::KeyRedefined => write!(f, "key is redefined by derived type"),
            Self::KeyPropertyNotFound(p) => write!(f, "key property {p} not found"),
            Self::KeyPropertyNullable(p) => write!(f, "key property {p} is nullable"),
            Self::NavigationTargetNotEntity => {
                write!(f, "navigation property type is not an entity type")
            }
            Self::PartnerNotFound(p) => write!(f, "partner navigation property {p} not found"),
            Self::PartnerMismatch(p) => {
                write!(f, "partner navigation property {p} does not point back")
            }
            Self::UnresolvedEntityType(name) => write!(f, "unresolved entity type {name}"),
            Self::UnresolvedOperation(name) => write!(f, "unresolved operation {name}"),
            Self::UnresolvedContainer(name) => write!(f, "unresolved entity container {name}"),
            Self::BindingPathNotFound(p) => write!(f, "binding path {p} not found"),
            Self::BindingTargetNotFound(t) => write!(f, "binding target {t} not found"),
            Self::DuplicateBinding(p) => write!(f, "duplicate binding for path {p}"),
            Self::BoundOperationWithoutParameters => {
                write!(f, "bound operation has no binding parameter")
            }
            Self::EnumValueOverflow(m) => {
                write!(f, "value of member {m} does not fit the underlying type")
            }
            Self::ComposableSideEffecting => {
                write!(f, "composable operation is side-effecting")
            }
        }
    }
}

/// Semantic problem of the element at `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Path of the offending element, for example `NS.Customer/Orders`.
    pub target: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.target, self.kind)
    }
}

impl std::error::Error for ValidationError {}

struct Collector(Vec<ValidationError>);

impl Collector {
    fn push(&mut self, target: impl Display, kind: ValidationErrorKind) {
        self.0.push(ValidationError {
            kind,
            target: target.to_string(),
        });
    }
}

impl Model {
    /// Check semantic rules over the whole model. Referenced models are
    /// consulted for lookups but not validated themselves.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Collector(Vec::new());
        for (name, element) in self.elements() {
            match element {
                SchemaElement::EntityType(_) | SchemaElement::ComplexType(_) => {
                    self.validate_structured(&name, element, &mut errors);
                }
                SchemaElement::EnumType(e) => validate_enum(&name, e, &mut errors),
                SchemaElement::Operation(op) => self.validate_operation(&name, op, &mut errors),
                SchemaElement::Term(t) => {
                    self.validate_type(&name, &t.type_ref, &mut errors);
                }
                SchemaElement::TypeDefinition(_) => (),
            }
        }
        for (name, container) in self.containers() {
            self.validate_container(&name, container, &mut errors);
        }
        errors.0
    }

    fn validate_type(&self, target: &impl Display, t: &TypeReference, errors: &mut Collector) {
        let element = t.element();
        let expected = match &element.kind {
            TypeKind::Primitive(..) | TypeKind::Collection(_) => return,
            TypeKind::Unresolved(n, _) => {
                if self.find_element(n).is_none() {
                    errors.push(target, ValidationErrorKind::UnresolvedType(n.clone()));
                }
                return;
            }
            TypeKind::Entity(n) | TypeKind::EntityReference(n) => {
                (n, matches!(self.find_element(n), Some(SchemaElement::EntityType(_))))
            }
            TypeKind::Complex(n) => (
                n,
                matches!(self.find_element(n), Some(SchemaElement::ComplexType(_))),
            ),
            TypeKind::Enum(n) => (n, self.find_enum_type(n).is_some()),
            TypeKind::TypeDefinition(n, _) => (n, self.find_type_definition(n).is_some()),
        };
        match expected {
            (n, false) if self.find_element(n).is_none() => {
                errors.push(target, ValidationErrorKind::UnresolvedType(n.clone()));
            }
            (n, false) => errors.push(target, ValidationErrorKind::TypeKindMismatch(n.clone())),
            (_, true) => (),
        }
    }

    fn validate_structured(
        &self,
        name: &QualifiedName,
        element: &SchemaElement,
        errors: &mut Collector,
    ) {
        if let Some(base) = element.base_type() {
            match self.find_element(base) {
                None => errors.push(name, ValidationErrorKind::UnresolvedBaseType(base.clone())),
                Some(b) if std::mem::discriminant(b) != std::mem::discriminant(element) => errors
                    .push(
                        name,
                        ValidationErrorKind::BaseTypeKindMismatch(base.clone()),
                    ),
                Some(_) => (),
            }
            if self.has_base_cycle(name) {
                errors.push(name, ValidationErrorKind::BaseTypeCycle);
                // Inherited members are meaningless on a cycle.
                return;
            }
        }
        let declared = element.properties().map(Vec::as_slice).unwrap_or_default();
        // A base type from a model referenced later is not checked
        // against the derived properties at mutation time.
        let mut seen = HashSet::new();
        for p in self.all_properties(name) {
            if !seen.insert(p.name().inner().inner()) {
                errors.push(
                    name,
                    ValidationErrorKind::DuplicateInheritedProperty(p.name().to_string()),
                );
            }
        }
        for p in declared {
            let target = format!("{name}/{}", p.name());
            self.validate_type(&target, p.type_ref(), errors);
            if let Property::Navigation(nav) = p {
                self.validate_navigation(name, &target, nav, errors);
            }
        }
        if let SchemaElement::EntityType(et) = element {
            self.validate_key(name, et.is_abstract, et.key.as_deref(), errors);
        }
    }

    fn has_base_cycle(&self, name: &QualifiedName) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.find_element(name).and_then(SchemaElement::base_type);
        while let Some(base) = current {
            if base == name {
                return true;
            }
            if !visited.insert(base) {
                return false;
            }
            current = self.find_element(base).and_then(SchemaElement::base_type);
        }
        false
    }

    fn validate_key(
        &self,
        name: &QualifiedName,
        is_abstract: bool,
        declared: Option<&[crate::model::PropertyRef]>,
        errors: &mut Collector,
    ) {
        let inherited = self
            .base_types(name)
            .iter()
            .find_map(|b| self.find_entity_type(b)?.key.clone());
        match (declared, inherited) {
            (Some(_), Some(_)) => errors.push(name, ValidationErrorKind::KeyRedefined),
            (None, None) if !is_abstract => errors.push(name, ValidationErrorKind::MissingKey),
            (Some(key), None) => {
                for r in key {
                    match self.resolve_property_path(name, &r.name) {
                        None => errors.push(
                            name,
                            ValidationErrorKind::KeyPropertyNotFound(r.name.clone()),
                        ),
                        Some(p) if p.type_ref().nullable => errors.push(
                            name,
                            ValidationErrorKind::KeyPropertyNullable(r.name.clone()),
                        ),
                        Some(_) => (),
                    }
                }
            }
            _ => (),
        }
    }

    // Follows `A/B/C` through complex properties.
    fn resolve_property_path(&self, type_name: &QualifiedName, path: &str) -> Option<&Property> {
        let mut segments = path.split('/');
        let first = self.find_property(type_name, segments.next()?)?;
        segments.try_fold(first, |p, segment| {
            let (TypeKind::Complex(n) | TypeKind::Unresolved(n, _)) = &p.type_ref().element().kind
            else {
                return None;
            };
            self.find_property(n, segment)
        })
    }

    fn validate_navigation(
        &self,
        owner: &QualifiedName,
        target: &str,
        nav: &NavigationProperty,
        errors: &mut Collector,
    ) {
        let to = match &nav.type_ref.element().kind {
            TypeKind::Entity(n) | TypeKind::Unresolved(n, _) => n,
            _ => {
                errors.push(target, ValidationErrorKind::NavigationTargetNotEntity);
                return;
            }
        };
        if self.find_entity_type(to).is_none() {
            if self.find_element(to).is_some() {
                errors.push(target, ValidationErrorKind::NavigationTargetNotEntity);
            }
            return;
        }
        let Some(partner) = &nav.partner else {
            return;
        };
        match self
            .find_property(to, partner.inner().inner())
            .and_then(Property::as_navigation)
        {
            None => errors.push(
                target,
                ValidationErrorKind::PartnerNotFound(partner.to_string()),
            ),
            Some(back) => {
                let points_back = back.partner.as_ref().map_or(true, |p| p == &nav.name);
                let back_type = match &back.type_ref.element().kind {
                    TypeKind::Entity(n) | TypeKind::Unresolved(n, _) => Some(n),
                    _ => None,
                };
                let type_fits = back_type.is_some_and(|t| {
                    t == owner || self.base_types(owner).contains(t) || self.base_types(t).contains(owner)
                });
                if !points_back || !type_fits {
                    errors.push(
                        target,
                        ValidationErrorKind::PartnerMismatch(partner.to_string()),
                    );
                }
            }
        }
    }

    fn validate_operation(&self, name: &QualifiedName, op: &Operation, errors: &mut Collector) {
        if op.is_bound && op.parameters.is_empty() {
            errors.push(name, ValidationErrorKind::BoundOperationWithoutParameters);
        }
        if op.is_composable && op.kind == OperationKind::Action {
            errors.push(name, ValidationErrorKind::ComposableSideEffecting);
        }
        for p in &op.parameters {
            self.validate_type(&format!("{name}/{}", p.name), &p.type_ref, errors);
        }
        if let Some(rt) = &op.return_type {
            self.validate_type(&format!("{name}/$ReturnType"), rt, errors);
        }
    }

    fn validate_container(
        &self,
        name: &QualifiedName,
        container: &EntityContainer,
        errors: &mut Collector,
    ) {
        if let Some(extends) = &container.extends {
            if self.find_container(extends).is_none() {
                errors.push(name, ValidationErrorKind::UnresolvedContainer(extends.clone()));
            }
        }
        let sources = container
            .entity_sets
            .iter()
            .map(|s| (&s.name, &s.entity_type, &s.bindings))
            .chain(
                container
                    .singletons
                    .iter()
                    .map(|s| (&s.name, &s.entity_type, &s.bindings)),
            );
        for (source, entity_type, bindings) in sources {
            let target = format!("{name}/{source}");
            if self.find_entity_type(entity_type).is_none() {
                errors.push(
                    &target,
                    ValidationErrorKind::UnresolvedEntityType(entity_type.clone()),
                );
                continue;
            }
            let mut paths = HashSet::new();
            for b in bindings {
                if !paths.insert(b.path.as_str()) {
                    errors.push(&target, ValidationErrorKind::DuplicateBinding(b.path.clone()));
                }
                if self.binding_path_target(entity_type, &b.path).is_none() {
                    errors.push(
                        &target,
                        ValidationErrorKind::BindingPathNotFound(b.path.clone()),
                    );
                }
                if !self.binding_target_exists(container, &b.target) {
                    errors.push(
                        &target,
                        ValidationErrorKind::BindingTargetNotFound(b.target.clone()),
                    );
                }
            }
        }
        for import in &container.action_imports {
            let ok = self
                .find_operations(&import.action)
                .iter()
                .any(|op| op.kind == OperationKind::Action);
            if !ok {
                errors.push(
                    format!("{name}/{}", import.name),
                    ValidationErrorKind::UnresolvedOperation(import.action.clone()),
                );
            }
        }
        for import in &container.function_imports {
            let ok = self
                .find_operations(&import.function)
                .iter()
                .any(|op| op.kind == OperationKind::Function);
            if !ok {
                errors.push(
                    format!("{name}/{}", import.name),
                    ValidationErrorKind::UnresolvedOperation(import.function.clone()),
                );
            }
        }
    }

    /// Navigation property addressed by a binding path: segments are
    /// property names or type casts, the last one is a navigation
    /// property.
    #[must_use]
    pub fn binding_path_target(
        &self,
        entity_type: &QualifiedName,
        path: &str,
    ) -> Option<&NavigationProperty> {
        let mut current = entity_type.clone();
        let segments: Vec<&str> = path.split('/').collect();
        let (last, prefix) = segments.split_last()?;
        for segment in prefix {
            if segment.contains('.') {
                current = segment.parse().ok()?;
                self.find_element(&current)?;
            } else {
                current = self
                    .find_property(&current, segment)?
                    .type_ref()
                    .qualified_name();
            }
        }
        self.find_property(&current, last)?.as_navigation()
    }

    fn binding_target_exists(&self, container: &EntityContainer, target: &str) -> bool {
        match target.rsplit_once('/') {
            Some((qualified, source)) => qualified
                .parse()
                .ok()
                .and_then(|c: QualifiedName| self.find_container(&c))
                .is_some_and(|c| c.navigation_source_type(source).is_some()),
            None => container.navigation_source_type(target).is_some(),
        }
    }
}

fn validate_enum(name: &QualifiedName, e: &EnumType, errors: &mut Collector) {
    for (member, value) in e.member_values() {
        if !value.is_some_and(|v| e.fits_underlying(v)) {
            errors.push(
                name,
                ValidationErrorKind::EnumValueOverflow(member.name.to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComplexType;
    use crate::model::EntitySet;
    use crate::model::EntityType;
    use crate::model::EnumMember;
    use crate::model::NavigationPropertyBinding;
    use crate::model::PropertyRef;
    use crate::model::StructuralProperty;
    use odata_core::Namespace;
    use odata_core::PrimitiveKind;

    fn ns() -> Namespace {
        "NS".parse().unwrap()
    }

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn id_property() -> Property {
        Property::Structural(StructuralProperty::new(
            "Id".parse().unwrap(),
            TypeReference::primitive(PrimitiveKind::Int32).with_nullable(false),
        ))
    }

    fn nav(name: &str, target: &str, partner: Option<&str>) -> Property {
        let mut nav = NavigationProperty::new(
            name.parse().unwrap(),
            TypeReference::collection(TypeReference::entity(qn(target))).unwrap(),
        );
        nav.partner = partner.map(|p| p.parse().unwrap());
        Property::Navigation(nav)
    }

    fn keyed(name: &str, extra: Vec<Property>) -> SchemaElement {
        let mut et = EntityType::new(name.parse().unwrap());
        et.key = Some(vec![PropertyRef::new("Id")]);
        et.properties = std::iter::once(id_property()).chain(extra).collect();
        SchemaElement::EntityType(et)
    }

    fn kinds(model: &Model) -> Vec<ValidationErrorKind> {
        model.validate().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn valid_model_has_no_errors() {
        let mut model = Model::new();
        model
            .add_element(&ns(), keyed("A", vec![nav("Bs", "NS.B", Some("As"))]))
            .unwrap();
        model
            .add_element(&ns(), keyed("B", vec![nav("As", "NS.A", Some("Bs"))]))
            .unwrap();
        assert_eq!(kinds(&model), vec![]);
    }

    #[test]
    fn unresolved_and_missing_key() {
        let mut model = Model::new();
        let mut et = EntityType::new("A".parse().unwrap());
        et.properties.push(Property::Structural(StructuralProperty::new(
            "P".parse().unwrap(),
            TypeReference::unresolved(qn("NS.Missing")),
        )));
        model
            .add_element(&ns(), SchemaElement::EntityType(et))
            .unwrap();
        assert_eq!(
            kinds(&model),
            vec![
                ValidationErrorKind::UnresolvedType(qn("NS.Missing")),
                ValidationErrorKind::MissingKey,
            ]
        );
    }

    #[test]
    fn key_rules() {
        let mut model = Model::new();
        let mut et = EntityType::new("A".parse().unwrap());
        et.key = Some(vec![PropertyRef::new("Id"), PropertyRef::new("Name")]);
        et.properties.push(Property::Structural(StructuralProperty::new(
            "Id".parse().unwrap(),
            TypeReference::primitive(PrimitiveKind::Int32),
        )));
        model
            .add_element(&ns(), SchemaElement::EntityType(et))
            .unwrap();
        let mut derived = EntityType::new("B".parse().unwrap());
        derived.base_type = Some(qn("NS.A"));
        derived.key = Some(vec![PropertyRef::new("Id")]);
        model
            .add_element(&ns(), SchemaElement::EntityType(derived))
            .unwrap();
        assert_eq!(
            kinds(&model),
            vec![
                ValidationErrorKind::KeyPropertyNullable("Id".into()),
                ValidationErrorKind::KeyPropertyNotFound("Name".into()),
                ValidationErrorKind::KeyRedefined,
            ]
        );
    }

    #[test]
    fn key_paths_through_complex_properties() {
        let mut model = Model::new();
        let mut address = ComplexType::new("Address".parse().unwrap());
        address.properties.push(Property::Structural(StructuralProperty::new(
            "Zip".parse().unwrap(),
            TypeReference::primitive(PrimitiveKind::String).with_nullable(false),
        )));
        model
            .add_element(&ns(), SchemaElement::ComplexType(address))
            .unwrap();
        let mut et = EntityType::new("Site".parse().unwrap());
        et.key = Some(vec![
            PropertyRef::new("Location/Zip"),
            PropertyRef::new("Location/Street"),
        ]);
        et.properties.push(Property::Structural(StructuralProperty::new(
            "Location".parse().unwrap(),
            TypeReference::complex(qn("NS.Address")).with_nullable(false),
        )));
        model
            .add_element(&ns(), SchemaElement::EntityType(et))
            .unwrap();
        assert_eq!(
            kinds(&model),
            vec![ValidationErrorKind::KeyPropertyNotFound(
                "Location/Street".into()
            )]
        );
    }

    #[test]
    fn dangling_base_and_late_base_properties() {
        let mut model = Model::new();
        let mut derived = EntityType::new("B".parse().unwrap());
        derived.base_type = Some(qn("Base.A"));
        derived.properties.push(id_property());
        model
            .add_element(&ns(), SchemaElement::EntityType(derived))
            .unwrap();
        assert_eq!(
            kinds(&model),
            vec![
                ValidationErrorKind::UnresolvedBaseType(qn("Base.A")),
                ValidationErrorKind::MissingKey,
            ]
        );
        let mut base = Model::new();
        base.add_element(&"Base".parse().unwrap(), keyed("A", vec![]))
            .unwrap();
        model.add_referenced_model(base);
        assert_eq!(
            kinds(&model),
            vec![ValidationErrorKind::DuplicateInheritedProperty("Id".into())]
        );
    }

    #[test]
    fn cycles_are_rejected_before_validation() {
        let mut model = Model::new();
        let mut a = EntityType::new("A".parse().unwrap());
        a.base_type = Some(qn("NS.B"));
        model
            .add_element(&ns(), SchemaElement::EntityType(a))
            .unwrap();
        let mut b = EntityType::new("B".parse().unwrap());
        b.base_type = Some(qn("NS.A"));
        assert!(model
            .add_element(&ns(), SchemaElement::EntityType(b))
            .is_err());
        assert!(!model.has_base_cycle(&qn("NS.A")));
    }

    #[test]
    fn partner_mismatch() {
        let mut model = Model::new();
        model
            .add_element(&ns(), keyed("A", vec![nav("Bs", "NS.B", Some("As"))]))
            .unwrap();
        model
            .add_element(&ns(), keyed("B", vec![nav("As", "NS.A", Some("Other"))]))
            .unwrap();
        assert_eq!(
            kinds(&model),
            vec![
                ValidationErrorKind::PartnerMismatch("As".into()),
                ValidationErrorKind::PartnerNotFound("Other".into()),
            ]
        );
    }

    #[test]
    fn bindings() {
        let mut model = Model::new();
        model
            .add_element(&ns(), keyed("A", vec![nav("Friends", "NS.A", None)]))
            .unwrap();
        let mut c = EntityContainer::new("Default".parse().unwrap());
        let mut set = EntitySet::new("As".parse().unwrap(), qn("NS.A"));
        set.bindings = vec![
            NavigationPropertyBinding::new("Friends", "As"),
            NavigationPropertyBinding::new("Friends", "As"),
            NavigationPropertyBinding::new("Enemies", "Nobody"),
        ];
        c.entity_sets.push(set);
        model.add_container(&ns(), c).unwrap();
        assert_eq!(
            kinds(&model),
            vec![
                ValidationErrorKind::DuplicateBinding("Friends".into()),
                ValidationErrorKind::BindingPathNotFound("Enemies".into()),
                ValidationErrorKind::BindingTargetNotFound("Nobody".into()),
            ]
        );
    }

    #[test]
    fn operations_and_enums() {
        let mut model = Model::new();
        let mut op = Operation::new("Act".parse().unwrap(), OperationKind::Action);
        op.is_bound = true;
        op.is_composable = true;
        model
            .add_element(&ns(), SchemaElement::Operation(op))
            .unwrap();
        let mut e = EnumType::new("Small".parse().unwrap());
        e.underlying_type = PrimitiveKind::Byte;
        e.members = vec![
            EnumMember::new("Max".parse().unwrap(), Some(255)),
            EnumMember::new("Over".parse().unwrap(), None),
        ];
        model
            .add_element(&ns(), SchemaElement::EnumType(e))
            .unwrap();
        assert_eq!(
            kinds(&model),
            vec![
                ValidationErrorKind::BoundOperationWithoutParameters,
                ValidationErrorKind::ComposableSideEffecting,
                ValidationErrorKind::EnumValueOverflow("Over".into()),
            ]
        );
    }
}
