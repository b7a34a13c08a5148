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

//! Type references and type facets (6.2 Property facets).

use crate::error::ModelError;
use odata_core::PrimitiveKind;
use odata_core::QualifiedName;
use odata_core::TypeName;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

/// 6.2.2 Attribute `MaxLength`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxLength {
    Value(u32),
    Max,
}

impl FromStr for MaxLength {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" | "Max" => Ok(Self::Max),
            _ => s.parse().map(Self::Value).map_err(|_| ()),
        }
    }
}

impl Display for MaxLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Value(v) => v.fmt(f),
            Self::Max => "max".fmt(f),
        }
    }
}

/// 6.2.4 Attribute `Scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Value(u32),
    Variable,
    Floating,
}

impl FromStr for Scale {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variable" => Ok(Self::Variable),
            "floating" => Ok(Self::Floating),
            _ => s.parse().map(Self::Value).map_err(|_| ()),
        }
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Value(v) => v.fmt(f),
            Self::Variable => "variable".fmt(f),
            Self::Floating => "floating".fmt(f),
        }
    }
}

/// 6.2.6 Attribute `SRID`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Srid {
    Value(i32),
    Variable,
}

impl FromStr for Srid {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variable" => Ok(Self::Variable),
            _ => s.parse().map(Self::Value).map_err(|_| ()),
        }
    }
}

impl Display for Srid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Value(v) => v.fmt(f),
            Self::Variable => "variable".fmt(f),
        }
    }
}

/// Facets of primitive types and type definitions. `None` means the
/// facet is not specified and takes its default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Facets {
    pub max_length: Option<MaxLength>,
    pub precision: Option<u32>,
    pub scale: Option<Scale>,
    pub srid: Option<Srid>,
    pub unicode: Option<bool>,
    pub fixed_length: Option<bool>,
}

impl Facets {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.max_length.is_none()
            && self.precision.is_none()
            && self.scale.is_none()
            && self.srid.is_none()
            && self.unicode.is_none()
            && self.fixed_length.is_none()
    }
}

/// What a type reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind, Facets),
    Entity(QualifiedName),
    Complex(QualifiedName),
    Enum(QualifiedName),
    TypeDefinition(QualifiedName, Facets),
    /// Name not (yet) bound to an element of the model.
    Unresolved(QualifiedName, Facets),
    Collection(Box<TypeReference>),
    EntityReference(QualifiedName),
}

/// Reference to a type together with its nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub kind: TypeKind,
    pub nullable: bool,
}

impl TypeReference {
    #[must_use]
    pub const fn new(kind: TypeKind, nullable: bool) -> Self {
        Self { kind, nullable }
    }

    #[must_use]
    pub const fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(TypeKind::Primitive(kind, Facets::EMPTY), true)
    }

    #[must_use]
    pub const fn entity(name: QualifiedName) -> Self {
        Self::new(TypeKind::Entity(name), true)
    }

    #[must_use]
    pub const fn complex(name: QualifiedName) -> Self {
        Self::new(TypeKind::Complex(name), true)
    }

    #[must_use]
    pub const fn enumeration(name: QualifiedName) -> Self {
        Self::new(TypeKind::Enum(name), true)
    }

    #[must_use]
    pub const fn type_definition(name: QualifiedName) -> Self {
        Self::new(TypeKind::TypeDefinition(name, Facets::EMPTY), true)
    }

    #[must_use]
    pub const fn unresolved(name: QualifiedName) -> Self {
        Self::new(TypeKind::Unresolved(name, Facets::EMPTY), true)
    }

    #[must_use]
    pub const fn entity_reference(name: QualifiedName) -> Self {
        Self::new(TypeKind::EntityReference(name), true)
    }

    /// Collection of `element`. Collections themselves are never null.
    ///
    /// # Errors
    ///
    /// Returns error if `element` is a collection.
    pub fn collection(element: Self) -> Result<Self, ModelError> {
        if element.is_collection() {
            Err(ModelError::NestedCollection)
        } else {
            Ok(Self::new(TypeKind::Collection(Box::new(element)), false))
        }
    }

    /// Reference to a named type, classified as primitive when it is in
    /// `Edm` namespace and left unresolved otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the name is in `Edm` namespace but is not a
    /// primitive type.
    pub fn from_type_name(name: &TypeName) -> Result<Self, ModelError> {
        let qname = name.qualified_name();
        let one = if qname.is_edm() {
            PrimitiveKind::from_qualified_name(qname)
                .map(Self::primitive)
                .ok_or_else(|| ModelError::UnknownPrimitiveType(qname.clone()))?
        } else {
            Self::unresolved(qname.clone())
        };
        if name.is_collection() {
            Self::collection(one)
        } else {
            Ok(one)
        }
    }

    #[must_use]
    pub const fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Replace facets. Has no effect on kinds without facets; applies to
    /// the element of a collection.
    #[must_use]
    pub fn with_facets(mut self, facets: Facets) -> Self {
        if let Some(f) = self.facets_mut() {
            *f = facets;
        }
        self
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection(_))
    }

    /// Element type for collections, self otherwise.
    #[must_use]
    pub fn element(&self) -> &Self {
        match &self.kind {
            TypeKind::Collection(e) => e,
            _ => self,
        }
    }

    #[must_use]
    pub fn facets(&self) -> Option<&Facets> {
        match &self.kind {
            TypeKind::Primitive(_, f)
            | TypeKind::TypeDefinition(_, f)
            | TypeKind::Unresolved(_, f) => Some(f),
            TypeKind::Collection(e) => e.facets(),
            TypeKind::Entity(_)
            | TypeKind::Complex(_)
            | TypeKind::Enum(_)
            | TypeKind::EntityReference(_) => None,
        }
    }

    pub fn facets_mut(&mut self) -> Option<&mut Facets> {
        match &mut self.kind {
            TypeKind::Primitive(_, f)
            | TypeKind::TypeDefinition(_, f)
            | TypeKind::Unresolved(_, f) => Some(f),
            TypeKind::Collection(e) => e.facets_mut(),
            TypeKind::Entity(_)
            | TypeKind::Complex(_)
            | TypeKind::Enum(_)
            | TypeKind::EntityReference(_) => None,
        }
    }

    /// Qualified name of the referenced (element) type.
    #[must_use]
    pub fn qualified_name(&self) -> QualifiedName {
        match &self.kind {
            TypeKind::Primitive(kind, _) => kind.qualified_name(),
            TypeKind::Entity(n)
            | TypeKind::Complex(n)
            | TypeKind::Enum(n)
            | TypeKind::TypeDefinition(n, _)
            | TypeKind::Unresolved(n, _)
            | TypeKind::EntityReference(n) => n.clone(),
            TypeKind::Collection(e) => e.qualified_name(),
        }
    }

    /// Name usable in a single `Type` attribute. `None` when the
    /// reference needs child elements (entity references).
    #[must_use]
    pub fn type_name(&self) -> Option<TypeName> {
        match &self.kind {
            TypeKind::EntityReference(_) => None,
            TypeKind::Collection(e) => match e.type_name()? {
                TypeName::One(n) => Some(TypeName::CollectionOf(n)),
                TypeName::CollectionOf(_) => None,
            },
            _ => Some(TypeName::One(self.qualified_name())),
        }
    }

    /// Qualified name of the entity type when this is an entity or a
    /// collection of entities.
    #[must_use]
    pub fn entity_type(&self) -> Option<&QualifiedName> {
        match &self.element().kind {
            TypeKind::Entity(n) => Some(n),
            _ => None,
        }
    }
}

impl Facets {
    pub const EMPTY: Self = Self {
        max_length: None,
        precision: None,
        scale: None,
        srid: None,
        unicode: None,
        fixed_length: None,
    };
}

impl Display for TypeReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            TypeKind::Collection(e) => write!(f, "Collection({e})"),
            TypeKind::EntityReference(n) => write!(f, "Ref({n})"),
            _ => self.qualified_name().fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_collection_is_rejected() {
        let inner = TypeReference::collection(TypeReference::primitive(PrimitiveKind::Int32)).unwrap();
        assert_eq!(
            TypeReference::collection(inner),
            Err(ModelError::NestedCollection)
        );
    }

    #[test]
    fn from_type_name() {
        let t = TypeReference::from_type_name(&"Collection(Edm.String)".parse().unwrap()).unwrap();
        assert!(t.is_collection());
        assert!(!t.nullable);
        assert_eq!(
            t.element().kind,
            TypeKind::Primitive(PrimitiveKind::String, Facets::EMPTY)
        );
        assert_eq!(t.to_string(), "Collection(Edm.String)");

        let t = TypeReference::from_type_name(&"NS.Customer".parse().unwrap()).unwrap();
        assert!(matches!(t.kind, TypeKind::Unresolved(..)));

        assert!(TypeReference::from_type_name(&"Edm.Nope".parse().unwrap()).is_err());
    }

    #[test]
    fn facets_apply_to_collection_element() {
        let facets = Facets {
            max_length: Some(MaxLength::Max),
            ..Facets::default()
        };
        let t = TypeReference::collection(TypeReference::primitive(PrimitiveKind::String))
            .unwrap()
            .with_facets(facets);
        assert_eq!(t.facets(), Some(&facets));
        assert_eq!(
            TypeReference::entity("NS.E".parse().unwrap())
                .with_facets(facets)
                .facets(),
            None
        );
    }

    #[test]
    fn facet_literals() {
        assert_eq!("max".parse(), Ok(MaxLength::Max));
        assert_eq!("12".parse(), Ok(MaxLength::Value(12)));
        assert_eq!("floating".parse(), Ok(Scale::Floating));
        assert_eq!("variable".parse(), Ok(Srid::Variable));
        assert!("-1".parse::<MaxLength>().is_err());
        assert_eq!(Srid::Value(4326).to_string(), "4326");
    }

    #[test]
    fn entity_reference_has_no_inline_name() {
        let r = TypeReference::entity_reference("NS.E".parse().unwrap());
        assert_eq!(r.type_name(), None);
        let c = TypeReference::collection(r).unwrap();
        assert_eq!(c.type_name(), None);
        assert_eq!(c.to_string(), "Collection(Ref(NS.E))");
    }
}
