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

//! CSDL-XML writer.
//!
//! Each schema is converted into a small element tree that is then
//! written with `quick_xml`. Whether a type is written as an inline
//! `Type` attribute or as a child element is decided by the shape of the
//! type reference alone.

/// Association based output of versions before 4.0.
pub mod legacy;

use crate::alias::AliasMap;
use crate::error::WriteError;
use crate::model::Annotation;
use crate::model::AnnotationValue;
use crate::model::AnnotationsBlock;
use crate::model::ComplexType;
use crate::model::EntityContainer;
use crate::model::EntityType;
use crate::model::EnumType;
use crate::model::Facets;
use crate::model::Model;
use crate::model::Operation;
use crate::model::OperationKind;
use crate::model::Property;
use crate::model::Schema;
use crate::model::SchemaElement;
use crate::model::Term;
use crate::model::TypeDefinition;
use crate::model::TypeKind;
use crate::model::TypeReference;
use odata_core::EdmVersion;
use odata_core::PrimitiveKind;
use odata_core::PrimitiveValue;
use odata_core::QualifiedName;
use odata_core::TypeName;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::fmt::Display;
use std::io::Write;
use tracing::debug;
use tracing::warn;

/// Output options of [`CsdlWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterSettings {
    pub version: EdmVersion,
    /// Spaces per nesting level. `None` writes everything on one line.
    pub indent: Option<usize>,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            version: EdmVersion::V4,
            indent: Some(2),
        }
    }
}

/// Writes a [`Model`] as an `edmx:Edmx` document.
#[derive(Debug, Clone, Default)]
pub struct CsdlWriter {
    settings: WriterSettings,
}

impl CsdlWriter {
    #[must_use]
    pub const fn new(settings: WriterSettings) -> Self {
        Self { settings }
    }

    /// Write `model` to `out`. Qualified names are written through
    /// `aliases`, which also supplies the `Alias` attribute of every
    /// schema and include. Aliases of namespaces the document does not
    /// declare are ignored. Referenced models are not written.
    ///
    /// # Errors
    ///
    /// Returns error if an action is marked composable or one alias is
    /// given to two written namespaces (both detected before anything is
    /// written), or the output fails.
    pub fn write<W: Write>(
        &self,
        model: &Model,
        aliases: &AliasMap,
        out: W,
    ) -> Result<(), WriteError> {
        preflight(model)?;
        let version = self.settings.version;
        let includes = model
            .references()
            .iter()
            .filter(|_| !version.uses_associations())
            .flat_map(|r| &r.includes)
            .map(|i| &i.namespace);
        let aliases = aliases.restricted_to(
            model.schemas().iter().map(|s| &s.namespace).chain(includes),
        );
        if let Some(alias) = aliases.ambiguous_alias() {
            return Err(WriteError::AmbiguousAlias(alias.clone()));
        }
        let mut writer = match self.settings.indent {
            Some(n) => Writer::new_with_indent(out, b' ', n),
            None => Writer::new(out),
        };
        let ctx = Ctx {
            model,
            aliases: &aliases,
            version,
        };
        debug!(version = %ctx.version, "writing CSDL document");
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        let mut root = BytesStart::new("edmx:Edmx");
        root.push_attribute(("Version", ctx.version.edmx_version()));
        root.push_attribute(("xmlns:edmx", ctx.version.edmx_namespace()));
        writer.write_event(Event::Start(root))?;
        if ctx.legacy() {
            if !model.references().is_empty() {
                warn!("references are not written in version {}", ctx.version);
            }
        } else {
            for r in model.references() {
                ctx.reference(r).write(&mut writer)?;
            }
        }
        let mut services = BytesStart::new("edmx:DataServices");
        if ctx.legacy() {
            services.push_attribute(("xmlns:m", odata_core::version::LEGACY_METADATA_NAMESPACE));
            services.push_attribute((
                "m:DataServiceVersion",
                ctx.version.data_service_version(),
            ));
        }
        writer.write_event(Event::Start(services))?;
        for schema in model.schemas() {
            let elem = if ctx.legacy() {
                ctx.legacy_schema(schema)
            } else {
                ctx.schema(schema)
            };
            elem.write(&mut writer)
                .map_err(|err| WriteError::Schema(schema.namespace.clone(), Box::new(err)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("edmx:DataServices")))?;
        writer.write_event(Event::End(BytesEnd::new("edmx:Edmx")))?;
        Ok(())
    }

    /// Write `model` into a string.
    ///
    /// # Errors
    ///
    /// Same as [`CsdlWriter::write`].
    pub fn write_to_string(&self, model: &Model, aliases: &AliasMap) -> Result<String, WriteError> {
        let mut out = Vec::new();
        self.write(model, aliases, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

// Cross-element constraints that must hold before any output.
fn preflight(model: &Model) -> Result<(), WriteError> {
    model
        .elements()
        .find_map(|(name, e)| match e {
            SchemaElement::Operation(op)
                if op.is_composable && op.kind == OperationKind::Action =>
            {
                Some(name)
            }
            _ => None,
        })
        .map_or(Ok(()), |name| Err(WriteError::ComposableSideEffecting(name)))
}

/// Element under construction.
#[derive(Debug)]
pub(crate) struct Elem {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Elem>,
    text: Option<String>,
}

impl Elem {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub(crate) fn attr(mut self, key: &'static str, value: impl Display) -> Self {
        self.attrs.push((key, value.to_string()));
        self
    }

    pub(crate) fn attr_opt(self, key: &'static str, value: Option<impl Display>) -> Self {
        match value {
            Some(v) => self.attr(key, v),
            None => self,
        }
    }

    /// Boolean attribute written only when it differs from `default`.
    pub(crate) fn flag(self, key: &'static str, value: bool, default: bool) -> Self {
        if value == default {
            self
        } else {
            self.attr(key, value)
        }
    }

    pub(crate) fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    pub(crate) fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Writer<W>) -> Result<(), WriteError> {
        let start = BytesStart::new(self.name)
            .with_attributes(self.attrs.iter().map(|(k, v)| (*k, v.as_str())));
        if self.children.is_empty() && self.text.is_none() {
            w.write_event(Event::Empty(start))?;
            return Ok(());
        }
        w.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            w.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(w)?;
        }
        w.write_event(Event::End(BytesEnd::new(self.name)))?;
        Ok(())
    }
}

/// Everything the conversion of one document needs.
pub(crate) struct Ctx<'a> {
    pub(crate) model: &'a Model,
    pub(crate) aliases: &'a AliasMap,
    pub(crate) version: EdmVersion,
}

impl Ctx<'_> {
    pub(crate) const fn legacy(&self) -> bool {
        self.version.uses_associations()
    }

    pub(crate) fn name(&self, name: &QualifiedName) -> String {
        self.aliases.serialize_name(name)
    }

    pub(crate) fn type_name(&self, name: &TypeName) -> String {
        match name {
            TypeName::One(n) => self.name(n),
            TypeName::CollectionOf(n) => format!("Collection({})", self.name(n)),
        }
    }

    fn reference(&self, r: &crate::model::Reference) -> Elem {
        Elem::new("edmx:Reference")
            .attr("Uri", &r.uri)
            .children(r.includes.iter().map(|i| {
                Elem::new("edmx:Include")
                    .attr("Namespace", &i.namespace)
                    .attr_opt("Alias", self.aliases.alias(&i.namespace))
            }))
            .children(r.include_annotations.iter().map(|i| {
                Elem::new("edmx:IncludeAnnotations")
                    .attr("TermNamespace", &i.term_namespace)
                    .attr_opt("Qualifier", i.qualifier.as_ref())
                    .attr_opt("TargetNamespace", i.target_namespace.as_ref())
            }))
            .children(self.annotations(&r.annotations))
    }

    fn schema(&self, schema: &Schema) -> Elem {
        Elem::new("Schema")
            .attr("Namespace", &schema.namespace)
            .attr_opt("Alias", self.aliases.alias(&schema.namespace))
            .attr("xmlns", self.version.csdl_namespace())
            .children(schema.elements.iter().map(|e| match e {
                SchemaElement::EntityType(v) => self.entity_type(v),
                SchemaElement::ComplexType(v) => self.complex_type(v),
                SchemaElement::EnumType(v) => self.enum_type(v),
                SchemaElement::Operation(v) => self.operation(v),
                SchemaElement::Term(v) => self.term(v),
                SchemaElement::TypeDefinition(v) => self.type_definition(v),
            }))
            .children(schema.containers.iter().map(|c| self.container(c)))
            .children(schema.annotation_blocks.iter().map(|b| self.annotations_block(b)))
            .children(self.annotations(&schema.annotations))
    }

    fn entity_type(&self, et: &EntityType) -> Elem {
        let key = et.key.as_ref().map(|key| {
            Elem::new("Key").children(key.iter().map(|r| {
                Elem::new("PropertyRef")
                    .attr("Name", &r.name)
                    .attr_opt("Alias", r.alias.as_ref())
            }))
        });
        Elem::new("EntityType")
            .attr("Name", &et.name)
            .attr_opt("BaseType", et.base_type.as_ref().map(|b| self.name(b)))
            .flag("Abstract", et.is_abstract, false)
            .flag("OpenType", et.open_type, false)
            .flag("HasStream", et.has_stream, false)
            .children(key)
            .children(et.properties.iter().map(|p| self.property(p)))
            .children(self.annotations(&et.annotations))
    }

    fn complex_type(&self, ct: &ComplexType) -> Elem {
        Elem::new("ComplexType")
            .attr("Name", &ct.name)
            .attr_opt("BaseType", ct.base_type.as_ref().map(|b| self.name(b)))
            .flag("Abstract", ct.is_abstract, false)
            .flag("OpenType", ct.open_type, false)
            .children(ct.properties.iter().map(|p| self.property(p)))
            .children(self.annotations(&ct.annotations))
    }

    fn property(&self, p: &Property) -> Elem {
        match p {
            Property::Structural(sp) => self
                .typed(Elem::new("Property").attr("Name", &sp.name), &sp.type_ref)
                .attr_opt("DefaultValue", sp.default_value.as_ref())
                .children(self.annotations(&sp.annotations)),
            Property::Navigation(np) => {
                let elem = Elem::new("NavigationProperty")
                    .attr("Name", &np.name)
                    .attr("Type", self.nav_type_name(&np.type_ref));
                let elem = if np.type_ref.is_collection() {
                    elem
                } else {
                    elem.flag("Nullable", np.type_ref.nullable, true)
                };
                elem.attr_opt("Partner", np.partner.as_ref())
                    .flag("ContainsTarget", np.contains_target, false)
                    .children(np.referential_constraints.iter().map(|rc| {
                        Elem::new("ReferentialConstraint")
                            .attr("Property", &rc.property)
                            .attr("ReferencedProperty", &rc.referenced_property)
                    }))
                    .children(
                        np.on_delete
                            .map(|action| Elem::new("OnDelete").attr("Action", action)),
                    )
                    .children(self.annotations(&np.annotations))
            }
        }
    }

    fn nav_type_name(&self, t: &TypeReference) -> String {
        let name = self.name(&t.qualified_name());
        if t.is_collection() {
            format!("Collection({name})")
        } else {
            name
        }
    }

    fn enum_type(&self, et: &EnumType) -> Elem {
        let values = et.member_values();
        Elem::new("EnumType")
            .attr("Name", &et.name)
            .attr_opt(
                "UnderlyingType",
                (et.underlying_type != PrimitiveKind::Int32).then_some(et.underlying_type),
            )
            .flag("IsFlags", et.is_flags, false)
            .children(values.iter().enumerate().map(|(i, (m, value))| {
                let explicit = et.is_flags || *value != et.implicit_value(i);
                Elem::new("Member")
                    .attr("Name", &m.name)
                    .attr_opt("Value", value.filter(|_| explicit))
                    .children(self.annotations(&m.annotations))
            }))
            .children(self.annotations(&et.annotations))
    }

    fn operation(&self, op: &Operation) -> Elem {
        let elem = match op.kind {
            OperationKind::Action => Elem::new("Action"),
            OperationKind::Function => Elem::new("Function"),
        };
        elem.attr("Name", &op.name)
            .flag("IsBound", op.is_bound, false)
            .flag("IsComposable", op.is_composable, false)
            .attr_opt("EntitySetPath", op.entity_set_path.as_ref())
            .children(op.parameters.iter().map(|p| {
                self.typed(Elem::new("Parameter").attr("Name", &p.name), &p.type_ref)
                    .children(self.annotations(&p.annotations))
            }))
            .children(
                op.return_type
                    .as_ref()
                    .map(|rt| self.typed(Elem::new("ReturnType"), rt)),
            )
            .children(self.annotations(&op.annotations))
    }

    fn term(&self, t: &Term) -> Elem {
        self.typed(Elem::new("Term").attr("Name", &t.name), &t.type_ref)
            .attr_opt("BaseTerm", t.base_term.as_ref().map(|b| self.name(b)))
            .attr_opt("DefaultValue", t.default_value.as_ref())
            .attr_opt(
                "AppliesTo",
                (!t.applies_to.is_empty()).then(|| t.applies_to.join(" ")),
            )
            .children(self.annotations(&t.annotations))
    }

    fn type_definition(&self, td: &TypeDefinition) -> Elem {
        self.facets(
            Elem::new("TypeDefinition")
                .attr("Name", &td.name)
                .attr("UnderlyingType", td.underlying_type),
            &td.facets,
        )
        .children(self.annotations(&td.annotations))
    }

    fn container(&self, c: &EntityContainer) -> Elem {
        let bindings = |bindings: &[crate::model::NavigationPropertyBinding]| {
            bindings
                .iter()
                .map(|b| {
                    Elem::new("NavigationPropertyBinding")
                        .attr("Path", &b.path)
                        .attr("Target", &b.target)
                })
                .collect::<Vec<_>>()
        };
        Elem::new("EntityContainer")
            .attr("Name", &c.name)
            .attr_opt("Extends", c.extends.as_ref().map(|e| self.name(e)))
            .children(c.entity_sets.iter().map(|s| {
                Elem::new("EntitySet")
                    .attr("Name", &s.name)
                    .attr("EntityType", self.name(&s.entity_type))
                    .flag(
                        "IncludeInServiceDocument",
                        s.include_in_service_document,
                        true,
                    )
                    .children(bindings(&s.bindings))
                    .children(self.annotations(&s.annotations))
            }))
            .children(c.singletons.iter().map(|s| {
                Elem::new("Singleton")
                    .attr("Name", &s.name)
                    .attr("Type", self.name(&s.entity_type))
                    .children(bindings(&s.bindings))
                    .children(self.annotations(&s.annotations))
            }))
            .children(c.action_imports.iter().map(|i| {
                Elem::new("ActionImport")
                    .attr("Name", &i.name)
                    .attr("Action", self.name(&i.action))
                    .attr_opt("EntitySet", i.entity_set.as_ref())
                    .children(self.annotations(&i.annotations))
            }))
            .children(c.function_imports.iter().map(|i| {
                Elem::new("FunctionImport")
                    .attr("Name", &i.name)
                    .attr("Function", self.name(&i.function))
                    .attr_opt("EntitySet", i.entity_set.as_ref())
                    .flag(
                        "IncludeInServiceDocument",
                        i.include_in_service_document,
                        false,
                    )
                    .children(self.annotations(&i.annotations))
            }))
            .children(self.annotations(&c.annotations))
    }

    fn annotations_block(&self, b: &AnnotationsBlock) -> Elem {
        Elem::new("Annotations")
            .attr("Target", &b.target)
            .attr_opt("Qualifier", b.qualifier.as_ref())
            .children(self.annotations(&b.annotations))
    }

    /// Inline annotations of an element. Versions before 3.0 have no
    /// annotations.
    pub(crate) fn annotations(&self, annotations: &[Annotation]) -> Vec<Elem> {
        match self.version {
            EdmVersion::V4 | EdmVersion::V4_01 => {
                annotations.iter().map(|a| self.annotation(a)).collect()
            }
            EdmVersion::V3 => annotations
                .iter()
                .map(|a| self.value_annotation(a))
                .collect(),
            _ => {
                if !annotations.is_empty() {
                    debug!(
                        count = annotations.len(),
                        "annotations dropped in version {}", self.version
                    );
                }
                Vec::new()
            }
        }
    }

    fn annotation(&self, a: &Annotation) -> Elem {
        let elem = Elem::new("Annotation")
            .attr("Term", self.name(&a.term))
            .attr_opt("Qualifier", a.qualifier.as_ref());
        match &a.value {
            Some(v) => self.with_value(elem, v),
            None => elem,
        }
        .children(a.annotations.iter().map(|n| self.annotation(n)))
    }

    /// Value as attribute when it has one, as child element otherwise.
    pub(crate) fn with_value(&self, elem: Elem, value: &AnnotationValue) -> Elem {
        match self.value_attribute(value) {
            Some((key, text)) => elem.attr(key, text),
            None => elem.child(self.value_element(value)),
        }
    }

    fn value_element(&self, value: &AnnotationValue) -> Elem {
        match value {
            AnnotationValue::Collection(items) => {
                Elem::new("Collection").children(items.iter().map(|i| self.value_element(i)))
            }
            AnnotationValue::Record(r) => Elem::new("Record")
                .attr_opt("Type", r.type_name.as_ref().map(|t| self.name(t)))
                .children(r.properties.iter().map(|p| {
                    self.with_value(
                        Elem::new("PropertyValue").attr("Property", &p.property),
                        &p.value,
                    )
                })),
            other => match self.value_attribute(other) {
                Some((key, text)) => Elem::new(key).text(text),
                None => Elem::new("Null"),
            },
        }
    }

    fn value_attribute(&self, value: &AnnotationValue) -> Option<(&'static str, String)> {
        let legacy = self.legacy();
        let path = |key: &'static str, p: &String| {
            Some((if legacy { "Path" } else { key }, p.clone()))
        };
        match value {
            AnnotationValue::Constant(c) => self.constant(c),
            AnnotationValue::EnumMember(members) => {
                let text = members
                    .iter()
                    .map(|m| format!("{}/{}", self.name(&m.type_name), m.member))
                    .collect::<Vec<_>>()
                    .join(" ");
                Some((if legacy { "String" } else { "EnumMember" }, text))
            }
            AnnotationValue::Path(p) => path("Path", p),
            AnnotationValue::PropertyPath(p) => path("PropertyPath", p),
            AnnotationValue::NavigationPropertyPath(p) => path("NavigationPropertyPath", p),
            AnnotationValue::AnnotationPath(p) => path("AnnotationPath", p),
            AnnotationValue::Null | AnnotationValue::Collection(_) | AnnotationValue::Record(_) => {
                None
            }
        }
    }

    /// Constant expression name and canonical text.
    fn constant(&self, c: &PrimitiveValue) -> Option<(&'static str, String)> {
        let legacy = self.legacy();
        let key = match c {
            PrimitiveValue::Null => return None,
            PrimitiveValue::Boolean(_) => "Bool",
            PrimitiveValue::Byte(_)
            | PrimitiveValue::SByte(_)
            | PrimitiveValue::Int16(_)
            | PrimitiveValue::Int32(_)
            | PrimitiveValue::Int64(_) => "Int",
            PrimitiveValue::Single(_) | PrimitiveValue::Double(_) => "Float",
            PrimitiveValue::Decimal(_) => "Decimal",
            PrimitiveValue::String(_) | PrimitiveValue::Spatial(_) => "String",
            PrimitiveValue::Guid(_) => "Guid",
            PrimitiveValue::DateTimeOffset(_) => "DateTimeOffset",
            PrimitiveValue::Date(_) if legacy => "DateTime",
            PrimitiveValue::Date(_) => "Date",
            PrimitiveValue::TimeOfDay(_) if legacy => "Time",
            PrimitiveValue::TimeOfDay(_) => "TimeOfDay",
            PrimitiveValue::Duration(_) if legacy => "Time",
            PrimitiveValue::Duration(_) => "Duration",
            PrimitiveValue::Binary(_) => "Binary",
            PrimitiveValue::Enum(e) => {
                let text = e
                    .members
                    .iter()
                    .map(|m| format!("{}/{m}", self.name(&e.type_name)))
                    .collect::<Vec<_>>()
                    .join(" ");
                return Some((if legacy { "String" } else { "EnumMember" }, text));
            }
        };
        Some((key, c.canonical_text()))
    }

    /// Type as `Type` attribute plus facets, or as child element when the
    /// reference has no single name.
    pub(crate) fn typed(&self, elem: Elem, t: &TypeReference) -> Elem {
        match t.type_name() {
            Some(name) => {
                let elem = elem
                    .attr("Type", self.type_name(&name))
                    .flag("Nullable", t.element().nullable, true);
                match t.facets() {
                    Some(f) => self.facets(elem, f),
                    None => elem,
                }
            }
            None => elem.child(self.type_element(t)),
        }
    }

    pub(crate) fn type_element(&self, t: &TypeReference) -> Elem {
        match &t.kind {
            TypeKind::Collection(e) => Elem::new("CollectionType").child(self.type_element(e)),
            TypeKind::EntityReference(n) => Elem::new("ReferenceType").attr("Type", self.name(n)),
            _ => self.typed(Elem::new("TypeRef"), t),
        }
    }

    pub(crate) fn facets(&self, elem: Elem, f: &Facets) -> Elem {
        elem.attr_opt("MaxLength", f.max_length)
            .attr_opt("FixedLength", f.fixed_length.filter(|_| self.legacy()))
            .attr_opt("Precision", f.precision)
            .attr_opt("Scale", f.scale)
            .attr_opt("SRID", f.srid)
            .attr_opt("Unicode", f.unicode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityContainer;
    use crate::model::EntitySet;
    use crate::model::EnumMember;
    use crate::model::PropertyRef;
    use crate::model::StructuralProperty;
    use crate::model::MaxLength;
    use odata_core::Namespace;
    use pretty_assertions::assert_eq;

    fn ns() -> Namespace {
        "NS".parse().unwrap()
    }

    fn write(model: &Model) -> String {
        CsdlWriter::default()
            .write_to_string(model, &AliasMap::from_model(model))
            .unwrap()
    }

    #[test]
    fn entity_type_and_container() {
        let mut model = Model::new();
        model.add_schema(ns(), Some("Self".parse().unwrap()));
        let mut et = EntityType::new("Customer".parse().unwrap());
        et.key = Some(vec![PropertyRef::new("Id")]);
        et.properties.push(Property::Structural(StructuralProperty::new(
            "Id".parse().unwrap(),
            TypeReference::primitive(PrimitiveKind::Int32).with_nullable(false),
        )));
        et.properties.push(Property::Structural(StructuralProperty::new(
            "Name".parse().unwrap(),
            TypeReference::primitive(PrimitiveKind::String).with_facets(Facets {
                max_length: Some(MaxLength::Value(40)),
                ..Facets::EMPTY
            }),
        )));
        model
            .add_element(&ns(), SchemaElement::EntityType(et))
            .unwrap();
        let mut c = EntityContainer::new("Default".parse().unwrap());
        c.entity_sets.push(EntitySet::new(
            "Customers".parse().unwrap(),
            "NS.Customer".parse().unwrap(),
        ));
        model.add_container(&ns(), c).unwrap();
        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="NS" Alias="Self" xmlns="http://docs.oasis-open.org/odata/ns/edm">
      <EntityType Name="Customer">
        <Key>
          <PropertyRef Name="Id"/>
        </Key>
        <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
        <Property Name="Name" Type="Edm.String" MaxLength="40"/>
      </EntityType>
      <EntityContainer Name="Default">
        <EntitySet Name="Customers" EntityType="Self.Customer"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;
        assert_eq!(write(&model), expected);
    }

    #[test]
    fn implicit_enum_values_are_omitted() {
        let mut model = Model::new();
        let mut e = EnumType::new("Color".parse().unwrap());
        e.members = vec![
            EnumMember::new("Red".parse().unwrap(), Some(0)),
            EnumMember::new("Green".parse().unwrap(), None),
            EnumMember::new("Blue".parse().unwrap(), Some(5)),
        ];
        model.add_element(&ns(), SchemaElement::EnumType(e)).unwrap();
        let out = write(&model);
        assert!(out.contains(r#"<Member Name="Red"/>"#));
        assert!(out.contains(r#"<Member Name="Green"/>"#));
        assert!(out.contains(r#"<Member Name="Blue" Value="5"/>"#));
    }

    #[test]
    fn composable_action_is_rejected_before_output() {
        let mut model = Model::new();
        let mut op = Operation::new("Act".parse().unwrap(), OperationKind::Action);
        op.is_composable = true;
        model.add_element(&ns(), SchemaElement::Operation(op)).unwrap();
        let mut out = Vec::new();
        let err = CsdlWriter::default()
            .write(&model, &AliasMap::new(), &mut out)
            .unwrap_err();
        assert!(matches!(err, WriteError::ComposableSideEffecting(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn annotation_values() {
        let mut model = Model::new();
        let mut t = Term::new(
            "Tags".parse().unwrap(),
            TypeReference::collection(TypeReference::primitive(PrimitiveKind::String)).unwrap(),
        );
        let mut a = Annotation::new(
            "Core.Description".parse().unwrap(),
            Some(AnnotationValue::Constant(PrimitiveValue::String(
                "a & b".into(),
            ))),
        );
        a.qualifier = Some("Short".parse().unwrap());
        t.annotations.push(a);
        t.annotations.push(Annotation::new(
            "NS.Tags".parse().unwrap(),
            Some(AnnotationValue::Collection(vec![
                AnnotationValue::Constant(PrimitiveValue::String("x".into())),
                AnnotationValue::Null,
            ])),
        ));
        model.add_element(&ns(), SchemaElement::Term(t)).unwrap();
        let out = write(&model);
        assert!(out.contains(
            r#"<Annotation Term="Core.Description" Qualifier="Short" String="a &amp; b"/>"#
        ));
        assert!(out.contains("<String>x</String>"));
        assert!(out.contains("<Null/>"));
        assert!(out.contains(r#"<Term Name="Tags" Type="Collection(Edm.String)">"#));
    }

    #[test]
    fn entity_reference_uses_child_element() {
        let mut model = Model::new();
        let mut op = Operation::new("Refs".parse().unwrap(), OperationKind::Function);
        op.return_type = Some(
            TypeReference::collection(TypeReference::entity_reference(
                "NS.Customer".parse().unwrap(),
            ))
            .unwrap(),
        );
        model.add_element(&ns(), SchemaElement::Operation(op)).unwrap();
        let out = write(&model);
        assert!(out.contains("<ReturnType>"));
        assert!(out.contains("<CollectionType>"));
        assert!(out.contains(r#"<ReferenceType Type="NS.Customer"/>"#));
    }
}
