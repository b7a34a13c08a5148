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

//! In-memory Entity Data Model.
//!
//! A [`Model`] owns schemas keyed by namespace. Every schema element is
//! identified by its qualified name; mutation methods reject structural
//! conflicts immediately with [`ModelError`], while semantic problems
//! (unresolved names, cycles through forward references, key rules) are
//! reported by [`Model::validate`](crate::validation).
//!
//! Read-only traversal never mutates: there are no lazily filled caches,
//! so a constructed model can be shared between threads.

/// 14 Annotations.
pub mod annotation;
/// 13 Entity container.
pub mod container;
/// 10 Enumeration types.
pub mod enum_type;
/// 12 Operations, 11 type definitions and 14.1 terms.
pub mod operation;
/// 8 Entity types, 9 complex types and their properties.
pub mod structured;
/// Type references.
pub mod type_ref;

pub use annotation::Annotation;
pub use annotation::AnnotationValue;
pub use annotation::AnnotationsBlock;
pub use annotation::EnumMemberRef;
pub use annotation::PropertyValue;
pub use annotation::Record;
pub use container::ActionImport;
pub use container::EntityContainer;
pub use container::EntitySet;
pub use container::FunctionImport;
pub use container::NavigationPropertyBinding;
pub use container::Singleton;
pub use enum_type::EnumMember;
pub use enum_type::EnumMemberName;
pub use enum_type::EnumType;
pub use operation::Operation;
pub use operation::OperationKind;
pub use operation::Parameter;
pub use operation::Term;
pub use operation::TypeDefinition;
pub use structured::ComplexType;
pub use structured::ConcurrencyMode;
pub use structured::EntityType;
pub use structured::NavigationProperty;
pub use structured::OnDeleteAction;
pub use structured::Property;
pub use structured::PropertyName;
pub use structured::PropertyRef;
pub use structured::ReferentialConstraint;
pub use structured::StructuralProperty;
pub use type_ref::Facets;
pub use type_ref::MaxLength;
pub use type_ref::Scale;
pub use type_ref::Srid;
pub use type_ref::TypeKind;
pub use type_ref::TypeReference;

use crate::error::ModelError;
use odata_core::Namespace;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use std::collections::HashSet;

/// Element of a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaElement {
    EntityType(EntityType),
    ComplexType(ComplexType),
    EnumType(EnumType),
    Operation(Operation),
    Term(Term),
    TypeDefinition(TypeDefinition),
}

impl SchemaElement {
    #[must_use]
    pub const fn name(&self) -> &SimpleIdentifier {
        match self {
            Self::EntityType(v) => &v.name,
            Self::ComplexType(v) => &v.name,
            Self::EnumType(v) => &v.name,
            Self::Operation(v) => &v.name,
            Self::Term(v) => &v.name,
            Self::TypeDefinition(v) => &v.name,
        }
    }

    /// Human readable element kind for messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::EntityType(_) => "entity type",
            Self::ComplexType(_) => "complex type",
            Self::EnumType(_) => "enum type",
            Self::Operation(op) => match op.kind {
                OperationKind::Action => "action",
                OperationKind::Function => "function",
            },
            Self::Term(_) => "term",
            Self::TypeDefinition(_) => "type definition",
        }
    }

    #[must_use]
    pub const fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Base type of entity and complex types.
    #[must_use]
    pub const fn base_type(&self) -> Option<&QualifiedName> {
        match self {
            Self::EntityType(v) => v.base_type.as_ref(),
            Self::ComplexType(v) => v.base_type.as_ref(),
            _ => None,
        }
    }

    /// Declared properties of entity and complex types.
    #[must_use]
    pub const fn properties(&self) -> Option<&Vec<Property>> {
        match self {
            Self::EntityType(v) => Some(&v.properties),
            Self::ComplexType(v) => Some(&v.properties),
            _ => None,
        }
    }

    fn properties_mut(&mut self) -> Option<&mut Vec<Property>> {
        match self {
            Self::EntityType(v) => Some(&mut v.properties),
            Self::ComplexType(v) => Some(&mut v.properties),
            _ => None,
        }
    }

    /// Type references of properties, parameters, return types and terms.
    #[must_use]
    pub fn type_refs(&self) -> Vec<&TypeReference> {
        match self {
            Self::EntityType(_) | Self::ComplexType(_) => self
                .properties()
                .map(|props| props.iter().map(Property::type_ref).collect())
                .unwrap_or_default(),
            Self::Operation(op) => op
                .parameters
                .iter()
                .map(|p| &p.type_ref)
                .chain(op.return_type.as_ref())
                .collect(),
            Self::Term(t) => vec![&t.type_ref],
            Self::EnumType(_) | Self::TypeDefinition(_) => Vec::new(),
        }
    }

    // Same order as `type_refs`.
    fn type_refs_mut(&mut self) -> Vec<&mut TypeReference> {
        match self {
            Self::EntityType(_) | Self::ComplexType(_) => self
                .properties_mut()
                .map(|props| {
                    props
                        .iter_mut()
                        .map(|p| match p {
                            Property::Structural(s) => &mut s.type_ref,
                            Property::Navigation(n) => &mut n.type_ref,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Self::Operation(op) => op
                .parameters
                .iter_mut()
                .map(|p| &mut p.type_ref)
                .chain(op.return_type.as_mut())
                .collect(),
            Self::Term(t) => vec![&mut t.type_ref],
            Self::EnumType(_) | Self::TypeDefinition(_) => Vec::new(),
        }
    }

    #[must_use]
    pub const fn annotations(&self) -> &Vec<Annotation> {
        match self {
            Self::EntityType(v) => &v.annotations,
            Self::ComplexType(v) => &v.annotations,
            Self::EnumType(v) => &v.annotations,
            Self::Operation(v) => &v.annotations,
            Self::Term(v) => &v.annotations,
            Self::TypeDefinition(v) => &v.annotations,
        }
    }
}

/// 5.1 Element edm:Schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub namespace: Namespace,
    pub alias: Option<SimpleIdentifier>,
    /// Elements in declaration order.
    pub elements: Vec<SchemaElement>,
    pub containers: Vec<EntityContainer>,
    /// Annotations of the schema itself.
    pub annotations: Vec<Annotation>,
    /// Out of line annotations.
    pub annotation_blocks: Vec<AnnotationsBlock>,
}

impl Schema {
    #[must_use]
    pub const fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            alias: None,
            elements: Vec::new(),
            containers: Vec::new(),
            annotations: Vec::new(),
            annotation_blocks: Vec::new(),
        }
    }

    pub fn elements_named<'a>(
        &'a self,
        name: &SimpleIdentifier,
    ) -> impl Iterator<Item = &'a SchemaElement> + 'a {
        let name = name.clone();
        self.elements.iter().filter(move |e| e.name() == &name)
    }
}

/// 3.3 Element edmx:Reference
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub uri: String,
    pub includes: Vec<Include>,
    pub include_annotations: Vec<IncludeAnnotations>,
    pub annotations: Vec<Annotation>,
}

impl Reference {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            includes: Vec::new(),
            include_annotations: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// 3.4 Element edmx:Include
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub namespace: Namespace,
    pub alias: Option<SimpleIdentifier>,
}

/// 3.5 Element edmx:IncludeAnnotations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeAnnotations {
    pub term_namespace: Namespace,
    pub qualifier: Option<SimpleIdentifier>,
    pub target_namespace: Option<Namespace>,
}

/// Entity Data Model: schemas of one document plus the models of the
/// documents it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    schemas: Vec<Schema>,
    references: Vec<Reference>,
    referenced_models: Vec<Model>,
}

impl Model {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schemas: Vec::new(),
            references: Vec::new(),
            referenced_models: Vec::new(),
        }
    }

    #[must_use]
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    #[must_use]
    pub fn schema(&self, namespace: &Namespace) -> Option<&Schema> {
        self.schemas.iter().find(|s| &s.namespace == namespace)
    }

    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Models loaded for `edmx:Reference`. They take part in lookups and
    /// are never written back.
    #[must_use]
    pub fn referenced_models(&self) -> &[Model] {
        &self.referenced_models
    }

    /// Add a schema, or set the alias of an existing one.
    pub fn add_schema(&mut self, namespace: Namespace, alias: Option<SimpleIdentifier>) {
        let idx = self.schema_index(namespace);
        if alias.is_some() {
            self.schemas[idx].alias = alias;
        }
    }

    pub fn add_reference(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    pub fn add_referenced_model(&mut self, model: Self) {
        self.referenced_models.push(model);
    }

    pub fn add_schema_annotation(&mut self, namespace: Namespace, annotation: Annotation) {
        let idx = self.schema_index(namespace);
        self.schemas[idx].annotations.push(annotation);
    }

    pub fn add_annotations(&mut self, namespace: Namespace, block: AnnotationsBlock) {
        let idx = self.schema_index(namespace);
        self.schemas[idx].annotation_blocks.push(block);
    }

    /// Add an element to the schema of `namespace`, creating the schema
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the name is taken (operations may only share
    /// names with operations), a structured type has duplicate
    /// properties (including inherited ones), its base type chain loops
    /// back to it, or an enum type has duplicate members.
    pub fn add_element(
        &mut self,
        namespace: &Namespace,
        element: SchemaElement,
    ) -> Result<(), ModelError> {
        let qname = namespace.qualify(element.name().clone());
        let taken = self.schema(namespace).is_some_and(|s| {
            s.elements_named(element.name())
                .any(|e| !(e.is_operation() && element.is_operation()))
                || s.containers.iter().any(|c| &c.name == element.name())
        });
        if taken {
            return Err(ModelError::DuplicateElement(qname));
        }
        if let Some(base) = element.base_type() {
            self.check_base_chain(&qname, base)?;
        }
        if let Some(props) = element.properties() {
            let inherited = element
                .base_type()
                .map(|b| self.property_names_with_base(b))
                .unwrap_or_default();
            let names = props.iter().try_fold(inherited, |mut seen, p| {
                if seen.insert(p.name().inner().inner().clone()) {
                    Ok(seen)
                } else {
                    Err(ModelError::DuplicateProperty(
                        qname.clone(),
                        p.name().to_string(),
                    ))
                }
            })?;
            // Types added earlier may already derive from this one.
            if let Some((derived, clash)) = self.derived_clash(&qname, &names) {
                return Err(ModelError::DuplicateProperty(derived, clash));
            }
        }
        if let SchemaElement::EnumType(e) = &element {
            e.members.iter().try_fold(HashSet::new(), |mut seen, m| {
                if seen.insert(m.name.inner().inner()) {
                    Ok(seen)
                } else {
                    Err(ModelError::DuplicateEnumMember(
                        qname.clone(),
                        m.name.to_string(),
                    ))
                }
            })?;
        }
        let idx = self.schema_index(namespace.clone());
        self.schemas[idx].elements.push(element);
        Ok(())
    }

    /// Add a property to an entity or complex type.
    ///
    /// # Errors
    ///
    /// Returns error if the type is not found, is not structured, or the
    /// name is taken by the type, a base type or a derived type.
    pub fn add_property(
        &mut self,
        type_name: &QualifiedName,
        property: Property,
    ) -> Result<(), ModelError> {
        let element = self
            .local_element(type_name)
            .ok_or_else(|| ModelError::ElementNotFound(type_name.clone()))?;
        if element.properties().is_none() {
            return Err(ModelError::NotAStructuredType(type_name.clone()));
        }
        let name = property.name().inner().inner();
        let conflicts = self.property_names_with_base(type_name).contains(name)
            || self.all_derived_types(type_name).iter().any(|d| {
                self.declared_properties(d)
                    .iter()
                    .any(|p| p.name().inner().inner() == name)
            });
        if conflicts {
            return Err(ModelError::DuplicateProperty(
                type_name.clone(),
                property.name().to_string(),
            ));
        }
        self.local_element_mut(type_name)
            .and_then(SchemaElement::properties_mut)
            .ok_or_else(|| ModelError::NotAStructuredType(type_name.clone()))?
            .push(property);
        Ok(())
    }

    /// Set or clear the base type of an entity or complex type. The base
    /// type may not exist yet.
    ///
    /// # Errors
    ///
    /// Returns error if the type is not structured, the chain through
    /// existing types loops back, or a property newly inherited by the
    /// type or one of its derived types clashes with a declared one.
    pub fn set_base_type(
        &mut self,
        type_name: &QualifiedName,
        base: Option<QualifiedName>,
    ) -> Result<(), ModelError> {
        let element = self
            .local_element(type_name)
            .ok_or_else(|| ModelError::ElementNotFound(type_name.clone()))?;
        let own: Vec<String> = element
            .properties()
            .ok_or_else(|| ModelError::NotAStructuredType(type_name.clone()))?
            .iter()
            .map(|p| p.name().inner().inner().clone())
            .collect();
        if let Some(base) = &base {
            self.check_base_chain(type_name, base)?;
            let inherited = self.property_names_with_base(base);
            if let Some(clash) = own.iter().find(|p| inherited.contains(*p)) {
                return Err(ModelError::DuplicateProperty(
                    type_name.clone(),
                    clash.clone(),
                ));
            }
            if let Some((derived, clash)) = self.derived_clash(type_name, &inherited) {
                return Err(ModelError::DuplicateProperty(derived, clash));
            }
        }
        match self.local_element_mut(type_name) {
            Some(SchemaElement::EntityType(v)) => v.base_type = base,
            Some(SchemaElement::ComplexType(v)) => v.base_type = base,
            _ => return Err(ModelError::NotAStructuredType(type_name.clone())),
        }
        Ok(())
    }

    /// Declare the key of an entity type.
    ///
    /// # Errors
    ///
    /// Returns error if the type is not an entity type or already has a
    /// key.
    pub fn set_key(
        &mut self,
        type_name: &QualifiedName,
        key: Vec<PropertyRef>,
    ) -> Result<(), ModelError> {
        match self.local_element_mut(type_name) {
            Some(SchemaElement::EntityType(et)) => {
                if et.key.is_some() {
                    Err(ModelError::KeyAlreadyDefined(type_name.clone()))
                } else {
                    et.key = Some(key);
                    Ok(())
                }
            }
            Some(_) => Err(ModelError::NotAnEntityType(type_name.clone())),
            None => Err(ModelError::ElementNotFound(type_name.clone())),
        }
    }

    /// # Errors
    ///
    /// Returns error if the enum type is not found or the member name is
    /// taken.
    pub fn add_enum_member(
        &mut self,
        type_name: &QualifiedName,
        member: EnumMember,
    ) -> Result<(), ModelError> {
        match self.local_element_mut(type_name) {
            Some(SchemaElement::EnumType(e)) => {
                if e.members.iter().any(|m| m.name == member.name) {
                    Err(ModelError::DuplicateEnumMember(
                        type_name.clone(),
                        member.name.to_string(),
                    ))
                } else {
                    e.members.push(member);
                    Ok(())
                }
            }
            Some(_) => Err(ModelError::NotAnEnumType(type_name.clone())),
            None => Err(ModelError::ElementNotFound(type_name.clone())),
        }
    }

    /// # Errors
    ///
    /// Returns error if the name is taken in the namespace or children of
    /// the container share a name.
    pub fn add_container(
        &mut self,
        namespace: &Namespace,
        container: EntityContainer,
    ) -> Result<(), ModelError> {
        let qname = namespace.qualify(container.name.clone());
        if let Some(schema) = self.schema(namespace) {
            if schema.containers.iter().any(|c| c.name == container.name) {
                return Err(ModelError::DuplicateContainer(qname));
            }
            if schema.elements_named(&container.name).next().is_some() {
                return Err(ModelError::DuplicateElement(qname));
            }
        }
        container
            .child_names()
            .try_fold(HashSet::new(), |mut seen, name| {
                if seen.insert(name) {
                    Ok(seen)
                } else {
                    Err(ModelError::DuplicateContainerChild(
                        qname.clone(),
                        name.to_string(),
                    ))
                }
            })?;
        let idx = self.schema_index(namespace.clone());
        self.schemas[idx].containers.push(container);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if the container is not found or the name is taken.
    pub fn add_entity_set(
        &mut self,
        container: &QualifiedName,
        set: EntitySet,
    ) -> Result<(), ModelError> {
        self.container_for_child(container, &set.name)?
            .entity_sets
            .push(set);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if the container is not found or the name is taken.
    pub fn add_singleton(
        &mut self,
        container: &QualifiedName,
        singleton: Singleton,
    ) -> Result<(), ModelError> {
        self.container_for_child(container, &singleton.name)?
            .singletons
            .push(singleton);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if the container is not found or the name is taken.
    pub fn add_action_import(
        &mut self,
        container: &QualifiedName,
        import: ActionImport,
    ) -> Result<(), ModelError> {
        self.container_for_child(container, &import.name)?
            .action_imports
            .push(import);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if the container is not found or the name is taken.
    pub fn add_function_import(
        &mut self,
        container: &QualifiedName,
        import: FunctionImport,
    ) -> Result<(), ModelError> {
        self.container_for_child(container, &import.name)?
            .function_imports
            .push(import);
        Ok(())
    }

    /// Add a navigation property binding to an entity set or singleton.
    /// Duplicate paths are accepted here and reported by validation.
    ///
    /// # Errors
    ///
    /// Returns error if the container or navigation source is not found.
    pub fn add_binding(
        &mut self,
        container: &QualifiedName,
        source: &str,
        binding: NavigationPropertyBinding,
    ) -> Result<(), ModelError> {
        let c = self
            .local_container_mut(container)
            .ok_or_else(|| ModelError::ContainerNotFound(container.clone()))?;
        if let Some(set) = c.entity_sets.iter_mut().find(|s| s.name.inner() == source) {
            set.bindings.push(binding);
            return Ok(());
        }
        if let Some(s) = c.singletons.iter_mut().find(|s| s.name.inner() == source) {
            s.bindings.push(binding);
            return Ok(());
        }
        Err(ModelError::NavigationSourceNotFound(
            container.clone(),
            source.into(),
        ))
    }

    /// All elements of this model (not referenced ones) with their
    /// qualified names.
    pub fn elements(&self) -> impl Iterator<Item = (QualifiedName, &SchemaElement)> {
        self.schemas.iter().flat_map(|s| {
            s.elements
                .iter()
                .map(move |e| (s.namespace.qualify(e.name().clone()), e))
        })
    }

    /// All containers of this model with their qualified names.
    pub fn containers(&self) -> impl Iterator<Item = (QualifiedName, &EntityContainer)> {
        self.schemas.iter().flat_map(|s| {
            s.containers
                .iter()
                .map(move |c| (s.namespace.qualify(c.name.clone()), c))
        })
    }

    /// Element by qualified name, looking into referenced models too. For
    /// overloaded operations the first overload is returned.
    #[must_use]
    pub fn find_element(&self, name: &QualifiedName) -> Option<&SchemaElement> {
        self.local_element(name).or_else(|| {
            self.referenced_models
                .iter()
                .find_map(|m| m.find_element(name))
        })
    }

    /// All overloads of an operation.
    #[must_use]
    pub fn find_operations(&self, name: &QualifiedName) -> Vec<&Operation> {
        let local: Vec<&Operation> = self
            .schema(&name.namespace)
            .map(|s| {
                s.elements_named(&name.name)
                    .filter_map(|e| match e {
                        SchemaElement::Operation(op) => Some(op),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        if local.is_empty() {
            self.referenced_models
                .iter()
                .map(|m| m.find_operations(name))
                .find(|ops| !ops.is_empty())
                .unwrap_or_default()
        } else {
            local
        }
    }

    #[must_use]
    pub fn find_entity_type(&self, name: &QualifiedName) -> Option<&EntityType> {
        match self.find_element(name)? {
            SchemaElement::EntityType(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_complex_type(&self, name: &QualifiedName) -> Option<&ComplexType> {
        match self.find_element(name)? {
            SchemaElement::ComplexType(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_enum_type(&self, name: &QualifiedName) -> Option<&EnumType> {
        match self.find_element(name)? {
            SchemaElement::EnumType(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_term(&self, name: &QualifiedName) -> Option<&Term> {
        match self.find_element(name)? {
            SchemaElement::Term(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_type_definition(&self, name: &QualifiedName) -> Option<&TypeDefinition> {
        match self.find_element(name)? {
            SchemaElement::TypeDefinition(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_container(&self, name: &QualifiedName) -> Option<&EntityContainer> {
        self.schema(&name.namespace)
            .and_then(|s| s.containers.iter().find(|c| c.name == name.name))
            .or_else(|| {
                self.referenced_models
                    .iter()
                    .find_map(|m| m.find_container(name))
            })
    }

    /// First container of the model. OData services expose exactly one.
    #[must_use]
    pub fn entity_container(&self) -> Option<(QualifiedName, &EntityContainer)> {
        self.containers().next()
    }

    /// Transitive base types, direct base first. Stops at the first
    /// repeated or unknown type.
    #[must_use]
    pub fn base_types(&self, name: &QualifiedName) -> Vec<QualifiedName> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([name.clone()]);
        let mut current = self.find_element(name).and_then(SchemaElement::base_type);
        while let Some(base) = current {
            if !visited.insert(base.clone()) {
                break;
            }
            result.push(base.clone());
            current = self.find_element(base).and_then(SchemaElement::base_type);
        }
        result
    }

    /// Properties declared by the type itself.
    #[must_use]
    pub fn declared_properties(&self, name: &QualifiedName) -> &[Property] {
        self.find_element(name)
            .and_then(SchemaElement::properties)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Inherited and declared properties, most general base type first.
    #[must_use]
    pub fn all_properties(&self, name: &QualifiedName) -> Vec<&Property> {
        self.base_types(name)
            .iter()
            .rev()
            .chain(std::iter::once(name))
            .flat_map(|t| self.declared_properties(t))
            .collect()
    }

    /// Declared or inherited property by name.
    #[must_use]
    pub fn find_property(&self, type_name: &QualifiedName, property: &str) -> Option<&Property> {
        self.all_properties(type_name)
            .into_iter()
            .find(|p| p.name().inner().inner() == property)
    }

    /// Types whose base type is `name`.
    #[must_use]
    pub fn derived_types(&self, name: &QualifiedName) -> Vec<QualifiedName> {
        self.elements()
            .filter(|(_, e)| e.base_type() == Some(name))
            .map(|(n, _)| n)
            .collect()
    }

    /// Types derived from `name` directly or indirectly.
    #[must_use]
    pub fn all_derived_types(&self, name: &QualifiedName) -> Vec<QualifiedName> {
        let mut result: Vec<QualifiedName> = Vec::new();
        let mut pending = self.derived_types(name);
        while let Some(next) = pending.pop() {
            if &next == name || result.contains(&next) {
                continue;
            }
            pending.extend(self.derived_types(&next));
            result.push(next);
        }
        result
    }

    /// Key of the entity type, declared or inherited.
    #[must_use]
    pub fn key_of(&self, name: &QualifiedName) -> Option<&[PropertyRef]> {
        std::iter::once(name.clone())
            .chain(self.base_types(name))
            .find_map(|t| self.find_entity_type(&t)?.key.as_deref())
    }

    /// Bind an unresolved type reference to the element it names.
    #[must_use]
    pub fn resolve_type(&self, type_ref: &TypeReference) -> TypeReference {
        let kind = match &type_ref.kind {
            TypeKind::Unresolved(name, facets) => match self.find_element(name) {
                Some(SchemaElement::EntityType(_)) => TypeKind::Entity(name.clone()),
                Some(SchemaElement::ComplexType(_)) => TypeKind::Complex(name.clone()),
                Some(SchemaElement::EnumType(_)) => TypeKind::Enum(name.clone()),
                Some(SchemaElement::TypeDefinition(_)) => {
                    TypeKind::TypeDefinition(name.clone(), *facets)
                }
                _ => type_ref.kind.clone(),
            },
            TypeKind::Collection(e) => TypeKind::Collection(Box::new(self.resolve_type(e))),
            other => other.clone(),
        };
        TypeReference::new(kind, type_ref.nullable)
    }

    /// Bind every unresolved type reference of the model's own elements.
    /// Names that stay unknown are left for validation to report.
    pub fn resolve_types(&mut self) {
        let resolved: Vec<Vec<Vec<TypeReference>>> = self
            .schemas
            .iter()
            .map(|s| {
                s.elements
                    .iter()
                    .map(|e| e.type_refs().into_iter().map(|t| self.resolve_type(t)).collect())
                    .collect()
            })
            .collect();
        for (schema, types) in self.schemas.iter_mut().zip(resolved) {
            for (element, types) in schema.elements.iter_mut().zip(types) {
                for (slot, t) in element.type_refs_mut().into_iter().zip(types) {
                    *slot = t;
                }
            }
        }
    }

    fn schema_index(&mut self, namespace: Namespace) -> usize {
        if let Some(idx) = self.schemas.iter().position(|s| s.namespace == namespace) {
            idx
        } else {
            self.schemas.push(Schema::new(namespace));
            self.schemas.len() - 1
        }
    }

    fn local_element(&self, name: &QualifiedName) -> Option<&SchemaElement> {
        self.schema(&name.namespace)
            .and_then(|s| s.elements_named(&name.name).next())
    }

    fn local_element_mut(&mut self, name: &QualifiedName) -> Option<&mut SchemaElement> {
        self.schemas
            .iter_mut()
            .find(|s| s.namespace == name.namespace)
            .and_then(|s| s.elements.iter_mut().find(|e| e.name() == &name.name))
    }

    fn local_container_mut(&mut self, name: &QualifiedName) -> Option<&mut EntityContainer> {
        self.schemas
            .iter_mut()
            .find(|s| s.namespace == name.namespace)
            .and_then(|s| s.containers.iter_mut().find(|c| c.name == name.name))
    }

    fn container_for_child(
        &mut self,
        container: &QualifiedName,
        child: &SimpleIdentifier,
    ) -> Result<&mut EntityContainer, ModelError> {
        let c = self
            .local_container_mut(container)
            .ok_or_else(|| ModelError::ContainerNotFound(container.clone()))?;
        if c.child_names().any(|n| n == child) {
            Err(ModelError::DuplicateContainerChild(
                container.clone(),
                child.to_string(),
            ))
        } else {
            Ok(c)
        }
    }

    // Walks `base` and its bases through existing types.
    fn check_base_chain(
        &self,
        type_name: &QualifiedName,
        base: &QualifiedName,
    ) -> Result<(), ModelError> {
        let mut visited = HashSet::new();
        let mut current = Some(base);
        while let Some(cur) = current {
            if cur == type_name {
                return Err(ModelError::BaseTypeCycle(type_name.clone()));
            }
            if !visited.insert(cur.clone()) {
                break;
            }
            current = self.find_element(cur).and_then(SchemaElement::base_type);
        }
        Ok(())
    }

    // Property names of `name` and all its base types.
    // First property declared by a type derived from `name` that is
    // also in `names`.
    fn derived_clash(
        &self,
        name: &QualifiedName,
        names: &HashSet<String>,
    ) -> Option<(QualifiedName, String)> {
        self.all_derived_types(name).into_iter().find_map(|derived| {
            let clash = self
                .declared_properties(&derived)
                .iter()
                .map(|p| p.name().inner().inner())
                .find(|p| names.contains(*p))?
                .clone();
            Some((derived, clash))
        })
    }

    fn property_names_with_base(&self, name: &QualifiedName) -> HashSet<String> {
        std::iter::once(name.clone())
            .chain(self.base_types(name))
            .flat_map(|t| {
                self.declared_properties(&t)
                    .iter()
                    .map(|p| p.name().inner().inner().clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odata_core::PrimitiveKind;

    fn ns() -> Namespace {
        "NS".parse().unwrap()
    }

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn prop(name: &str) -> Property {
        Property::Structural(StructuralProperty::new(
            name.parse().unwrap(),
            TypeReference::primitive(PrimitiveKind::String),
        ))
    }

    fn entity(name: &str, base: Option<&str>, props: &[&str]) -> SchemaElement {
        let mut et = EntityType::new(name.parse().unwrap());
        et.base_type = base.map(qn);
        et.properties = props.iter().map(|p| prop(p)).collect();
        SchemaElement::EntityType(et)
    }

    #[test]
    fn duplicate_element_is_rejected() {
        let mut model = Model::new();
        model.add_element(&ns(), entity("A", None, &[])).unwrap();
        assert_eq!(
            model.add_element(&ns(), entity("A", None, &[])),
            Err(ModelError::DuplicateElement(qn("NS.A")))
        );
        let op = SchemaElement::Operation(Operation::new(
            "A".parse().unwrap(),
            OperationKind::Action,
        ));
        assert_eq!(
            model.add_element(&ns(), op),
            Err(ModelError::DuplicateElement(qn("NS.A")))
        );
    }

    #[test]
    fn operation_overloads_are_allowed() {
        let mut model = Model::new();
        for _ in 0..2 {
            let op = Operation::new("F".parse().unwrap(), OperationKind::Function);
            model
                .add_element(&ns(), SchemaElement::Operation(op))
                .unwrap();
        }
        assert_eq!(model.find_operations(&qn("NS.F")).len(), 2);
    }

    #[test]
    fn inherited_property_conflict() {
        let mut model = Model::new();
        model.add_element(&ns(), entity("Base", None, &["Id"])).unwrap();
        assert_eq!(
            model.add_element(&ns(), entity("Derived", Some("NS.Base"), &["Id"])),
            Err(ModelError::DuplicateProperty(qn("NS.Derived"), "Id".into()))
        );
        model
            .add_element(&ns(), entity("Derived", Some("NS.Base"), &["Name"]))
            .unwrap();
        // Adding to the base clashes with the derived type.
        assert_eq!(
            model.add_property(&qn("NS.Base"), prop("Name")),
            Err(ModelError::DuplicateProperty(qn("NS.Base"), "Name".into()))
        );
        model.add_property(&qn("NS.Base"), prop("Other")).unwrap();
        let names: Vec<_> = model
            .all_properties(&qn("NS.Derived"))
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["Id", "Other", "Name"]);
    }

    #[test]
    fn key_can_be_declared_once() {
        let mut model = Model::new();
        model.add_element(&ns(), entity("A", None, &["Id"])).unwrap();
        model
            .set_key(&qn("NS.A"), vec![PropertyRef::new("Id")])
            .unwrap();
        assert_eq!(
            model.set_key(&qn("NS.A"), vec![PropertyRef::new("Id")]),
            Err(ModelError::KeyAlreadyDefined(qn("NS.A")))
        );
        model.add_element(&ns(), entity("B", Some("NS.A"), &[])).unwrap();
        assert_eq!(model.key_of(&qn("NS.B")).map(<[_]>::len), Some(1));
    }

    #[test]
    fn base_type_cycle_through_existing_types() {
        let mut model = Model::new();
        // Forward reference is fine.
        model.add_element(&ns(), entity("A", Some("NS.B"), &[])).unwrap();
        assert_eq!(
            model.add_element(&ns(), entity("B", Some("NS.A"), &[])),
            Err(ModelError::BaseTypeCycle(qn("NS.B")))
        );
        model.add_element(&ns(), entity("B", None, &[])).unwrap();
        assert_eq!(
            model.set_base_type(&qn("NS.B"), Some(qn("NS.A"))),
            Err(ModelError::BaseTypeCycle(qn("NS.B")))
        );
        assert_eq!(model.base_types(&qn("NS.A")), vec![qn("NS.B")]);
        assert_eq!(model.derived_types(&qn("NS.B")), vec![qn("NS.A")]);
    }

    #[test]
    fn new_base_type_clashes_with_derived_property() {
        let mut model = Model::new();
        model.add_element(&ns(), entity("A", None, &["Name"])).unwrap();
        model.add_element(&ns(), entity("B", None, &["Id"])).unwrap();
        model.add_element(&ns(), entity("C", Some("NS.B"), &["Name"])).unwrap();
        assert_eq!(
            model.set_base_type(&qn("NS.B"), Some(qn("NS.A"))),
            Err(ModelError::DuplicateProperty(qn("NS.C"), "Name".into()))
        );
        assert!(model.base_types(&qn("NS.B")).is_empty());

        // Derived type added before its base.
        model.add_element(&ns(), entity("E", Some("NS.D"), &["Id"])).unwrap();
        assert_eq!(
            model.add_element(&ns(), entity("D", None, &["Id"])),
            Err(ModelError::DuplicateProperty(qn("NS.E"), "Id".into()))
        );
        assert!(model.find_element(&qn("NS.D")).is_none());
    }

    #[test]
    fn container_children_share_names() {
        let mut model = Model::new();
        let mut c = EntityContainer::new("Default".parse().unwrap());
        c.entity_sets
            .push(EntitySet::new("People".parse().unwrap(), qn("NS.Person")));
        model.add_container(&ns(), c).unwrap();
        let container = qn("NS.Default");
        assert_eq!(
            model.add_singleton(
                &container,
                Singleton::new("People".parse().unwrap(), qn("NS.Person"))
            ),
            Err(ModelError::DuplicateContainerChild(
                container.clone(),
                "People".into()
            ))
        );
        model
            .add_binding(
                &container,
                "People",
                NavigationPropertyBinding::new("Friends", "People"),
            )
            .unwrap();
        assert!(model
            .add_binding(
                &container,
                "Nobody",
                NavigationPropertyBinding::new("Friends", "People")
            )
            .is_err());
        assert_eq!(
            model
                .find_container(&container)
                .and_then(|c| c.navigation_source_type("People")),
            Some(&qn("NS.Person"))
        );
    }

    #[test]
    fn lookup_through_referenced_models() {
        let mut core = Model::new();
        core.add_element(
            &"Core".parse().unwrap(),
            SchemaElement::Term(Term::new(
                "Description".parse().unwrap(),
                TypeReference::primitive(PrimitiveKind::String),
            )),
        )
        .unwrap();
        let mut model = Model::new();
        model.add_referenced_model(core);
        assert!(model.find_term(&qn("Core.Description")).is_some());
        assert!(model.find_entity_type(&qn("Core.Description")).is_none());
    }

    #[test]
    fn resolve_type_binds_names() {
        let mut model = Model::new();
        model.add_element(&ns(), entity("A", None, &[])).unwrap();
        let unresolved =
            TypeReference::collection(TypeReference::unresolved(qn("NS.A")).with_nullable(false))
                .unwrap();
        let resolved = model.resolve_type(&unresolved);
        assert_eq!(resolved.entity_type(), Some(&qn("NS.A")));
        assert!(!resolved.element().nullable);
        let missing = model.resolve_type(&TypeReference::unresolved(qn("NS.Missing")));
        assert!(matches!(missing.kind, TypeKind::Unresolved(..)));
    }

    #[test]
    fn resolve_types_in_place() {
        let mut model = Model::new();
        model.add_element(&ns(), entity("A", None, &[])).unwrap();
        let mut b = EntityType::new("B".parse().unwrap());
        b.properties.push(Property::Structural(StructuralProperty::new(
            "A".parse().unwrap(),
            TypeReference::unresolved(qn("NS.A")),
        )));
        model.add_element(&ns(), SchemaElement::EntityType(b)).unwrap();
        model.resolve_types();
        let t = model.find_property(&qn("NS.B"), "A").unwrap().type_ref();
        assert_eq!(t.kind, TypeKind::Entity(qn("NS.A")));
    }
}
