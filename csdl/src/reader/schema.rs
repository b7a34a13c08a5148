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

use super::grammar;
use super::xml::XmlElement;
use super::Context;
use super::DiagnosticCode;
use crate::model::ActionImport;
use crate::model::ComplexType;
use crate::model::EntityContainer;
use crate::model::EntitySet;
use crate::model::EntityType;
use crate::model::EnumMember;
use crate::model::EnumMemberName;
use crate::model::EnumType;
use crate::model::FunctionImport;
use crate::model::Model;
use crate::model::NavigationProperty;
use crate::model::NavigationPropertyBinding;
use crate::model::Operation;
use crate::model::OperationKind;
use crate::model::Parameter;
use crate::model::Property;
use crate::model::PropertyName;
use crate::model::PropertyRef;
use crate::model::ReferentialConstraint;
use crate::model::SchemaElement;
use crate::model::Singleton;
use crate::model::StructuralProperty;
use crate::model::Term;
use crate::model::TypeDefinition;
use odata_core::Namespace;
use odata_core::PrimitiveKind;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use std::collections::HashSet;
use tracing::debug;

/// Operations declared by `FunctionImport` elements of documents before
/// 4.0, with the element declaring them.
type LegacyOperations<'e> = Vec<(&'e XmlElement, Operation)>;

impl Context<'_> {
    /// 5.1 Element edm:Schema
    pub(super) fn schema(&mut self, el: &XmlElement, model: &mut Model) {
        if !self.check(el, "Schema") {
            return;
        }
        let Some(namespace) = self.parse_attr::<Namespace>(el, "Namespace") else {
            return;
        };
        let alias = self.identifier(el, "Alias");
        model.add_schema(namespace.clone(), alias);
        let grammar = grammar::csdl("Schema", self.legacy());
        for child in self.csdl_children(el) {
            // Reported by `check` already.
            if !grammar.is_some_and(|g| g.allows_child(&child.name)) {
                continue;
            }
            let element = match child.name.as_str() {
                "EntityType" => self
                    .entity_type(child, &namespace)
                    .map(SchemaElement::EntityType),
                "ComplexType" => self.complex_type(child).map(SchemaElement::ComplexType),
                "EnumType" => self.enum_type(child).map(SchemaElement::EnumType),
                "Action" => self
                    .operation(child, OperationKind::Action)
                    .map(SchemaElement::Operation),
                "Function" if !self.legacy() => self
                    .operation(child, OperationKind::Function)
                    .map(SchemaElement::Operation),
                "Term" | "ValueTerm" => self.term(child).map(SchemaElement::Term),
                "TypeDefinition" => self.type_definition(child).map(SchemaElement::TypeDefinition),
                "Association" => {
                    self.record_association(child, &namespace);
                    None
                }
                "EntityContainer" => {
                    if let Some((container, operations)) = self.entity_container(child, &namespace)
                    {
                        if let Err(err) = model.add_container(&namespace, container) {
                            self.error(DiagnosticCode::StructuralConflict, child, err.to_string());
                        }
                        for (el, op) in operations {
                            self.add_element(model, &namespace, el, SchemaElement::Operation(op));
                        }
                    }
                    None
                }
                "Annotations" => {
                    if let Some(block) = self.annotations_block(child) {
                        model.add_annotations(namespace.clone(), block);
                    }
                    None
                }
                "Annotation" | "ValueAnnotation" => {
                    if let Some(annotation) = self.annotation(child) {
                        model.add_schema_annotation(namespace.clone(), annotation);
                    }
                    None
                }
                other => {
                    debug!(element = other, "schema element skipped");
                    None
                }
            };
            if let Some(element) = element {
                self.add_element(model, &namespace, child, element);
            }
        }
    }

    /// Report a name already used in the same scope.
    fn unique(&mut self, seen: &mut HashSet<String>, el: &XmlElement, name: &str) -> bool {
        if seen.insert(name.to_string()) {
            true
        } else {
            self.error(
                DiagnosticCode::StructuralConflict,
                el,
                format!("{} {name} is declared more than once", el.name),
            );
            false
        }
    }

    /// 8.1 Element edm:EntityType
    fn entity_type(&mut self, el: &XmlElement, namespace: &Namespace) -> Option<EntityType> {
        if !self.check(el, "EntityType") {
            return None;
        }
        let mut et = EntityType::new(self.identifier(el, "Name")?);
        let owner = namespace.qualify(et.name.clone());
        let has_stream = if self.legacy() {
            "m:HasStream"
        } else {
            "HasStream"
        };
        et.base_type = self.qualified(el, "BaseType");
        et.is_abstract = self.flag(el, "Abstract", false);
        et.open_type = self.flag(el, "OpenType", false);
        et.has_stream = self.flag(el, has_stream, false);
        let mut seen = HashSet::new();
        for child in self.csdl_children(el) {
            match child.name.as_str() {
                "Key" => {
                    let key = self.key(child);
                    if et.key.is_some() {
                        self.error(
                            DiagnosticCode::StructuralConflict,
                            child,
                            format!("entity type {owner} declares more than one key"),
                        );
                    } else {
                        et.key = Some(key);
                    }
                }
                "NavigationProperty" if self.legacy() => self.record_navigation(child, &owner),
                _ => {
                    if let Some(p) = self.property_of(child, &mut seen) {
                        et.properties.push(p);
                    }
                }
            }
        }
        et.annotations = self.annotations(el);
        Some(et)
    }

    /// 9.1 Element edm:ComplexType
    fn complex_type(&mut self, el: &XmlElement) -> Option<ComplexType> {
        if !self.check(el, "ComplexType") {
            return None;
        }
        let mut ct = ComplexType::new(self.identifier(el, "Name")?);
        ct.base_type = self.qualified(el, "BaseType");
        ct.is_abstract = self.flag(el, "Abstract", false);
        ct.open_type = self.flag(el, "OpenType", false);
        let mut seen = HashSet::new();
        for child in self.csdl_children(el) {
            if let Some(p) = self.property_of(child, &mut seen) {
                ct.properties.push(p);
            }
        }
        ct.annotations = self.annotations(el);
        Some(ct)
    }

    // Structural or navigation property element, `None` for other
    // children.
    fn property_of(&mut self, el: &XmlElement, seen: &mut HashSet<String>) -> Option<Property> {
        let property = match el.name.as_str() {
            "Property" => Property::Structural(self.property(el)?),
            "NavigationProperty" => Property::Navigation(self.navigation_property(el)?),
            _ => return None,
        };
        self.unique(seen, el, property.name().inner().inner())
            .then_some(property)
    }

    /// 8.2 Element edm:Key
    fn key(&mut self, el: &XmlElement) -> Vec<PropertyRef> {
        if !self.check(el, "Key") {
            return Vec::new();
        }
        self.children(el, "PropertyRef")
            .filter_map(|r| {
                if !self.check(r, "PropertyRef") {
                    return None;
                }
                let mut property_ref = PropertyRef::new(r.attribute("Name")?);
                property_ref.alias = self.identifier(r, "Alias");
                Some(property_ref)
            })
            .collect()
    }

    /// 6.1 Element edm:Property
    fn property(&mut self, el: &XmlElement) -> Option<StructuralProperty> {
        if !self.check(el, "Property") {
            return None;
        }
        let name = self.parse_attr::<PropertyName>(el, "Name");
        let type_ref = self.type_reference(el);
        let mut property = StructuralProperty::new(name?, type_ref?);
        property.default_value = el.attribute("DefaultValue").map(str::to_string);
        if self.legacy() {
            property.concurrency_mode = self
                .parse_attr(el, "ConcurrencyMode")
                .unwrap_or_default();
        }
        property.annotations = self.annotations(el);
        Some(property)
    }

    /// 7.1 Element edm:NavigationProperty
    fn navigation_property(&mut self, el: &XmlElement) -> Option<NavigationProperty> {
        if !self.check(el, "NavigationProperty") {
            return None;
        }
        let name = self.parse_attr::<PropertyName>(el, "Name");
        let type_ref = self.type_reference(el);
        let mut nav = NavigationProperty::new(name?, type_ref?);
        nav.partner = self.parse_attr(el, "Partner");
        nav.contains_target = self.flag(el, "ContainsTarget", false);
        for child in self.csdl_children(el) {
            match child.name.as_str() {
                "ReferentialConstraint" if self.check(child, "ReferentialConstraint") => {
                    if let (Some(property), Some(referenced)) = (
                        child.attribute("Property"),
                        child.attribute("ReferencedProperty"),
                    ) {
                        nav.referential_constraints.push(ReferentialConstraint {
                            property: property.to_string(),
                            referenced_property: referenced.to_string(),
                        });
                    }
                }
                "OnDelete" if self.check(child, "OnDelete") => {
                    nav.on_delete = self.parse_attr(child, "Action");
                }
                _ => {}
            }
        }
        nav.annotations = self.annotations(el);
        Some(nav)
    }

    /// 10.1 Element edm:EnumType
    fn enum_type(&mut self, el: &XmlElement) -> Option<EnumType> {
        if !self.check(el, "EnumType") {
            return None;
        }
        let mut enum_type = EnumType::new(self.identifier(el, "Name")?);
        if let Some(text) = el.attribute("UnderlyingType") {
            match primitive_kind(text) {
                Some(kind) if kind.is_integral() => enum_type.underlying_type = kind,
                _ => self.error(
                    DiagnosticCode::InvalidAttribute,
                    el,
                    format!("underlying type of an enum type must be integral, found '{text}'"),
                ),
            }
        }
        enum_type.is_flags = self.flag(el, "IsFlags", false);
        let mut seen = HashSet::new();
        for m in self.children(el, "Member") {
            if !self.check(m, "Member") {
                continue;
            }
            let Some(name) = self.parse_attr::<EnumMemberName>(m, "Name") else {
                continue;
            };
            let value = self.parse_attr::<i64>(m, "Value");
            if !self.unique(&mut seen, m, name.inner().inner()) {
                continue;
            }
            let mut member = EnumMember::new(name, value);
            member.annotations = self.annotations(m);
            enum_type.members.push(member);
        }
        enum_type.annotations = self.annotations(el);
        Some(enum_type)
    }

    /// 12.1 Element edm:Action and 12.2 Element edm:Function
    fn operation(&mut self, el: &XmlElement, kind: OperationKind) -> Option<Operation> {
        if !self.check(el, &el.name) {
            return None;
        }
        let mut op = Operation::new(self.identifier(el, "Name")?, kind);
        op.is_bound = self.flag(el, "IsBound", false);
        op.is_composable =
            kind == OperationKind::Function && self.flag(el, "IsComposable", false);
        op.entity_set_path = el.attribute("EntitySetPath").map(str::to_string);
        self.signature(el, &mut op);
        op.annotations = self.annotations(el);
        Some(op)
    }

    // Parameters and return type from child elements.
    fn signature(&mut self, el: &XmlElement, op: &mut Operation) {
        let mut seen = HashSet::new();
        for child in self.csdl_children(el) {
            match child.name.as_str() {
                "Parameter" => {
                    if let Some(p) = self.parameter(child) {
                        if self.unique(&mut seen, child, p.name.inner()) {
                            op.parameters.push(p);
                        }
                    }
                }
                "ReturnType" if self.check(child, "ReturnType") => {
                    if op.return_type.is_some() {
                        self.error(
                            DiagnosticCode::StructuralConflict,
                            child,
                            format!("operation {} has more than one return type", op.name),
                        );
                    } else {
                        op.return_type = self.type_reference(child);
                    }
                }
                _ => {}
            }
        }
    }

    /// 12.4 Element edm:Parameter
    fn parameter(&mut self, el: &XmlElement) -> Option<Parameter> {
        if !self.check(el, "Parameter") {
            return None;
        }
        let name = self.identifier(el, "Name");
        let type_ref = self.type_reference(el);
        if let Some(mode) = el.attribute("Mode").filter(|m| *m != "In") {
            self.warning(
                DiagnosticCode::InvalidAttribute,
                el,
                format!("parameter mode {mode} is read as In"),
            );
        }
        let mut parameter = Parameter::new(name?, type_ref?);
        parameter.annotations = self.annotations(el);
        Some(parameter)
    }

    /// 14.1 Element edm:Term, `ValueTerm` before 4.0.
    fn term(&mut self, el: &XmlElement) -> Option<Term> {
        if !self.check(el, &el.name) {
            return None;
        }
        let name = self.identifier(el, "Name");
        let type_ref = self.type_reference(el);
        let mut term = Term::new(name?, type_ref?);
        term.base_term = self.qualified(el, "BaseTerm");
        term.default_value = el.attribute("DefaultValue").map(str::to_string);
        term.applies_to = el
            .attribute("AppliesTo")
            .map(|a| a.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        term.annotations = self.annotations(el);
        Some(term)
    }

    /// 11.1 Element edm:TypeDefinition
    fn type_definition(&mut self, el: &XmlElement) -> Option<TypeDefinition> {
        if !self.check(el, "TypeDefinition") {
            return None;
        }
        let name = self.identifier(el, "Name")?;
        let text = el.attribute("UnderlyingType")?;
        let Some(kind) = primitive_kind(text) else {
            self.error(
                DiagnosticCode::InvalidAttribute,
                el,
                format!("underlying type of a type definition must be primitive, found '{text}'"),
            );
            return None;
        };
        let mut td = TypeDefinition::new(name, kind);
        td.facets = self.facets(el);
        td.annotations = self.annotations(el);
        Some(td)
    }

    /// 13.1 Element edm:EntityContainer
    fn entity_container<'e>(
        &mut self,
        el: &'e XmlElement,
        namespace: &Namespace,
    ) -> Option<(EntityContainer, LegacyOperations<'e>)> {
        if !self.check(el, "EntityContainer") {
            return None;
        }
        let mut container = EntityContainer::new(self.identifier(el, "Name")?);
        let qname = namespace.qualify(container.name.clone());
        container.extends = if self.legacy() {
            // Written as a local name before 4.0.
            el.attribute("Extends").and_then(|text| {
                text.parse::<SimpleIdentifier>()
                    .map(|id| namespace.qualify(id))
                    .ok()
                    .or_else(|| self.qualified(el, "Extends"))
            })
        } else {
            self.qualified(el, "Extends")
        };
        let mut operations = Vec::new();
        let mut seen = HashSet::new();
        for child in self.csdl_children(el) {
            match child.name.as_str() {
                "EntitySet" => {
                    if let Some(set) = self.entity_set(child) {
                        if self.unique(&mut seen, child, set.name.inner()) {
                            container.entity_sets.push(set);
                        }
                    }
                }
                "Singleton" if !self.legacy() => {
                    if let Some(singleton) = self.singleton(child) {
                        if self.unique(&mut seen, child, singleton.name.inner()) {
                            container.singletons.push(singleton);
                        }
                    }
                }
                "ActionImport" if !self.legacy() => {
                    if let Some(import) = self.action_import(child) {
                        if self.unique(&mut seen, child, import.name.inner()) {
                            container.action_imports.push(import);
                        }
                    }
                }
                "FunctionImport" if self.legacy() => {
                    if let Some(op) =
                        self.legacy_function_import(child, namespace, &mut container, &mut seen)
                    {
                        operations.push((child, op));
                    }
                }
                "FunctionImport" => {
                    if let Some(import) = self.function_import(child) {
                        if self.unique(&mut seen, child, import.name.inner()) {
                            container.function_imports.push(import);
                        }
                    }
                }
                "AssociationSet" if self.legacy() => self.record_association_set(child, &qname),
                _ => {}
            }
        }
        container.annotations = self.annotations(el);
        Some((container, operations))
    }

    /// 13.2 Element edm:EntitySet
    fn entity_set(&mut self, el: &XmlElement) -> Option<EntitySet> {
        if !self.check(el, "EntitySet") {
            return None;
        }
        let name = self.identifier(el, "Name");
        let entity_type = self.qualified(el, "EntityType");
        let mut set = EntitySet::new(name?, entity_type?);
        set.include_in_service_document = self.flag(el, "IncludeInServiceDocument", true);
        set.bindings = self.bindings(el);
        set.annotations = self.annotations(el);
        Some(set)
    }

    /// 13.3 Element edm:Singleton
    fn singleton(&mut self, el: &XmlElement) -> Option<Singleton> {
        if !self.check(el, "Singleton") {
            return None;
        }
        let name = self.identifier(el, "Name");
        let entity_type = self.qualified(el, "Type");
        let mut singleton = Singleton::new(name?, entity_type?);
        singleton.bindings = self.bindings(el);
        singleton.annotations = self.annotations(el);
        Some(singleton)
    }

    /// 13.4 Element edm:NavigationPropertyBinding
    fn bindings(&mut self, el: &XmlElement) -> Vec<NavigationPropertyBinding> {
        self.children(el, "NavigationPropertyBinding")
            .filter_map(|b| {
                if !self.check(b, "NavigationPropertyBinding") {
                    return None;
                }
                let path = self.unalias_path(b.attribute("Path")?);
                let target = self.unalias_path(b.attribute("Target")?);
                Some(NavigationPropertyBinding::new(path, target))
            })
            .collect()
    }

    /// 13.5 Element edm:ActionImport
    fn action_import(&mut self, el: &XmlElement) -> Option<ActionImport> {
        if !self.check(el, "ActionImport") {
            return None;
        }
        let name = self.identifier(el, "Name");
        let action = self.qualified(el, "Action");
        let mut import = ActionImport::new(name?, action?);
        import.entity_set = el.attribute("EntitySet").map(|s| self.unalias_path(s));
        import.annotations = self.annotations(el);
        Some(import)
    }

    /// 13.6 Element edm:FunctionImport
    fn function_import(&mut self, el: &XmlElement) -> Option<FunctionImport> {
        if !self.check(el, "FunctionImport") {
            return None;
        }
        let name = self.identifier(el, "Name");
        let function = self.qualified(el, "Function");
        let mut import = FunctionImport::new(name?, function?);
        import.entity_set = el.attribute("EntitySet").map(|s| self.unalias_path(s));
        import.include_in_service_document = self.flag(el, "IncludeInServiceDocument", false);
        import.annotations = self.annotations(el);
        Some(import)
    }

    /// `FunctionImport` before 4.0 declares the operation itself. It is
    /// an action when side-effecting (`IsSideEffecting`, or an HTTP
    /// method other than GET). Unless bindable the operation is also
    /// imported into `container`.
    fn legacy_function_import(
        &mut self,
        el: &XmlElement,
        namespace: &Namespace,
        container: &mut EntityContainer,
        seen: &mut HashSet<String>,
    ) -> Option<Operation> {
        if !self.check(el, "FunctionImport") {
            return None;
        }
        let name = self.identifier(el, "Name")?;
        let side_effecting = if el.attribute("IsSideEffecting").is_some() {
            self.flag(el, "IsSideEffecting", true)
        } else {
            !matches!(el.attribute("m:HttpMethod"), Some(m) if m.eq_ignore_ascii_case("GET"))
        };
        let kind = if side_effecting {
            OperationKind::Action
        } else {
            OperationKind::Function
        };
        let mut op = Operation::new(name.clone(), kind);
        op.is_bound = self.flag(el, "IsBindable", false);
        op.is_composable =
            kind == OperationKind::Function && self.flag(el, "IsComposable", false);
        op.entity_set_path = el
            .attribute("m:EntitySetPath")
            .or_else(|| el.attribute("EntitySetPath"))
            .map(str::to_string);
        op.return_type = self.type_attribute(el, "ReturnType");
        self.signature(el, &mut op);
        op.annotations = self.annotations(el);
        if op.is_bound {
            return Some(op);
        }
        if seen.contains(name.inner()) {
            debug!(import = %name, "overload shares the function import");
            return Some(op);
        }
        seen.insert(name.to_string());
        let target = namespace.qualify(name.clone());
        let entity_set = el.attribute("EntitySet").map(str::to_string);
        match kind {
            OperationKind::Action => {
                let mut import = ActionImport::new(name, target);
                import.entity_set = entity_set;
                container.action_imports.push(import);
            }
            OperationKind::Function => {
                let mut import = FunctionImport::new(name, target);
                import.entity_set = entity_set;
                container.function_imports.push(import);
            }
        }
        Some(op)
    }
}

fn primitive_kind(text: &str) -> Option<PrimitiveKind> {
    text.parse::<QualifiedName>()
        .ok()
        .and_then(|name| PrimitiveKind::from_qualified_name(&name))
}

#[cfg(test)]
mod tests {
    use crate::model::OperationKind;
    use crate::model::TypeKind;
    use crate::reader::CsdlReader;
    use crate::reader::DiagnosticCode;
    use crate::reader::ParseOutput;
    use odata_core::PrimitiveKind;
    use odata_core::QualifiedName;

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn parse(body: &str) -> ParseOutput {
        CsdlReader::default().parse(&format!(
            r#"<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
<edmx:DataServices>
<Schema Namespace="Sales" Alias="S" xmlns="http://docs.oasis-open.org/odata/ns/edm">
{body}
</Schema>
</edmx:DataServices>
</edmx:Edmx>"#
        ))
    }

    const SALES: &str = r#"<EntityType Name="Customer">
  <Key><PropertyRef Name="Id"/></Key>
  <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
  <Property Name="Name" Type="Edm.String" MaxLength="100"/>
  <NavigationProperty Name="Orders" Type="Collection(S.Order)" Partner="Customer"/>
</EntityType>
<EntityType Name="Order">
  <Key><PropertyRef Name="Id"/></Key>
  <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
  <Property Name="CustomerId" Type="Edm.Int32"/>
  <NavigationProperty Name="Customer" Type="S.Customer" Nullable="false" Partner="Orders">
    <ReferentialConstraint Property="CustomerId" ReferencedProperty="Id"/>
    <OnDelete Action="Cascade"/>
  </NavigationProperty>
</EntityType>
<EnumType Name="Status" UnderlyingType="Edm.Byte" IsFlags="true">
  <Member Name="Open" Value="1"/>
  <Member Name="Closed" Value="2"/>
</EnumType>
<TypeDefinition Name="Money" UnderlyingType="Edm.Decimal" Precision="18" Scale="2"/>
<Function Name="TopCustomers" IsComposable="true">
  <Parameter Name="Count" Type="Edm.Int32" Nullable="false"/>
  <ReturnType Type="Collection(S.Customer)"/>
</Function>
<Action Name="Close" IsBound="true">
  <Parameter Name="Order" Type="S.Order"/>
</Action>
<Term Name="Audited" Type="Edm.Boolean" AppliesTo="EntityType EntitySet"/>
<EntityContainer Name="Default">
  <EntitySet Name="Customers" EntityType="S.Customer">
    <NavigationPropertyBinding Path="Orders" Target="Orders"/>
  </EntitySet>
  <EntitySet Name="Orders" EntityType="S.Order"/>
  <Singleton Name="Best" Type="S.Customer"/>
  <FunctionImport Name="TopCustomers" Function="S.TopCustomers" EntitySet="Customers" IncludeInServiceDocument="true"/>
</EntityContainer>"#;

    #[test]
    fn reads_all_element_kinds() {
        let out = parse(SALES);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let model = out.value.unwrap();

        let customer = model.find_entity_type(&qn("Sales.Customer")).unwrap();
        assert_eq!(customer.properties.len(), 3);
        let orders = customer.properties[2].as_navigation().unwrap();
        assert_eq!(orders.type_ref.entity_type(), Some(&qn("Sales.Order")));
        assert!(orders.type_ref.is_collection());
        assert_eq!(orders.partner, Some("Customer".parse().unwrap()));

        let order = model.find_entity_type(&qn("Sales.Order")).unwrap();
        let nav = order.properties[2].as_navigation().unwrap();
        assert!(!nav.type_ref.nullable);
        assert_eq!(nav.referential_constraints[0].property, "CustomerId");
        assert_eq!(nav.on_delete, Some(crate::model::OnDeleteAction::Cascade));

        let status = model.find_enum_type(&qn("Sales.Status")).unwrap();
        assert_eq!(status.underlying_type, PrimitiveKind::Byte);
        assert!(status.is_flags);
        assert_eq!(status.value_of("Closed"), Some(2));

        let money = model.find_type_definition(&qn("Sales.Money")).unwrap();
        assert_eq!(money.facets.precision, Some(18));

        let top = &model.find_operations(&qn("Sales.TopCustomers"))[0];
        assert_eq!(top.kind, OperationKind::Function);
        assert!(top.is_composable);
        let close = &model.find_operations(&qn("Sales.Close"))[0];
        assert!(close.is_bound);
        assert_eq!(
            close.binding_parameter().map(|p| &p.type_ref.kind),
            Some(&TypeKind::Entity(qn("Sales.Order")))
        );

        let term = model.find_term(&qn("Sales.Audited")).unwrap();
        assert_eq!(term.applies_to, vec!["EntityType", "EntitySet"]);

        let container = model.find_container(&qn("Sales.Default")).unwrap();
        assert_eq!(container.entity_sets.len(), 2);
        assert_eq!(container.entity_sets[0].bindings[0].target, "Orders");
        assert_eq!(container.singletons.len(), 1);
        assert!(container.function_imports[0].include_in_service_document);
        assert!(model.validate().is_empty(), "{:?}", model.validate());
    }

    #[test]
    fn duplicate_property_is_skipped() {
        let out = parse(
            r#"<ComplexType Name="C">
<Property Name="A" Type="Edm.String"/>
<Property Name="A" Type="Edm.Int32"/>
</ComplexType>"#,
        );
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].code, DiagnosticCode::StructuralConflict);
        assert_eq!(out.diagnostics[0].location.map(|l| l.line), Some(6));
    }

    #[test]
    fn second_key_is_a_conflict() {
        let out = parse(
            r#"<EntityType Name="E">
<Key><PropertyRef Name="Id"/></Key>
<Key><PropertyRef Name="Id"/></Key>
<Property Name="Id" Type="Edm.Int32" Nullable="false"/>
</EntityType>"#,
        );
        assert_eq!(out.diagnostics[0].code, DiagnosticCode::StructuralConflict);
    }

    #[test]
    fn enum_underlying_type_must_be_integral() {
        let out = parse(r#"<EnumType Name="E" UnderlyingType="Edm.String"/>"#);
        assert_eq!(out.diagnostics[0].code, DiagnosticCode::InvalidAttribute);
        let out = parse(
            r#"<EnumType Name="E"><Member Name="A" Value="one"/><Member Name="A"/></EnumType>"#,
        );
        let codes: Vec<_> = out.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::InvalidAttribute, DiagnosticCode::StructuralConflict]
        );
    }

    #[test]
    fn missing_type_is_reported_once() {
        let out = parse(
            r#"<Function Name="F"><Parameter Name="P"/><ReturnType Type="Edm.Int32"/></Function>"#,
        );
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].code, DiagnosticCode::MissingAttribute);
    }

    #[test]
    fn legacy_function_imports_declare_operations() {
        let text = r#"<edmx:Edmx Version="3.0" xmlns:edmx="http://schemas.microsoft.com/ado/2009/11/edmx">
<edmx:DataServices xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
<Schema Namespace="NS" xmlns="http://schemas.microsoft.com/ado/2009/11/edm">
<EntityType Name="Item"><Key><PropertyRef Name="Id"/></Key><Property Name="Id" Type="Edm.Int32" Nullable="false"/></EntityType>
<EntityContainer Name="Default" m:IsDefaultEntityContainer="true">
<EntitySet Name="Items" EntityType="NS.Item"/>
<FunctionImport Name="Recent" ReturnType="Collection(NS.Item)" EntitySet="Items" IsSideEffecting="false">
<Parameter Name="Days" Type="Edm.Int32" Mode="In"/>
</FunctionImport>
<FunctionImport Name="Reset"/>
<FunctionImport Name="Touch" IsBindable="true"><Parameter Name="Item" Type="NS.Item" Mode="In"/></FunctionImport>
</EntityContainer>
</Schema>
</edmx:DataServices>
</edmx:Edmx>"#;
        let out = CsdlReader::default().parse(text);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let model = out.value.unwrap();
        let recent = &model.find_operations(&qn("NS.Recent"))[0];
        assert_eq!(recent.kind, OperationKind::Function);
        assert_eq!(recent.parameters.len(), 1);
        assert!(recent.return_type.as_ref().is_some_and(|t| t.is_collection()));
        assert_eq!(
            model.find_operations(&qn("NS.Reset"))[0].kind,
            OperationKind::Action
        );
        assert!(model.find_operations(&qn("NS.Touch"))[0].is_bound);
        let container = model.find_container(&qn("NS.Default")).unwrap();
        assert_eq!(container.function_imports.len(), 1);
        assert_eq!(container.function_imports[0].entity_set.as_deref(), Some("Items"));
        assert_eq!(container.action_imports.len(), 1);
    }
}
