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

//! Relationships of documents before 4.0.
//!
//! Navigation properties there name an `Association` and two of its
//! roles instead of a type. Associations, navigation properties and
//! association sets are recorded while the schemas are walked and turned
//! into typed navigation properties and bindings once every schema of
//! the document is known:
//!
//! * the type is the entity type of the `ToRole` end, a collection for
//!   multiplicity `*` and not nullable for `1`;
//! * the partner is the navigation property of the same association
//!   whose `FromRole` is this property's `ToRole`;
//! * `OnDelete` of the `FromRole` end becomes the property's action;
//! * a referential constraint belongs to the property whose `FromRole`
//!   is the dependent role;
//! * each end of an association set binds the navigation properties
//!   leaving that role to the entity set of the other end.

use super::xml::XmlElement;
use super::Context;
use super::Diagnostic;
use super::DiagnosticCode;
use super::Location;
use crate::model::Annotation;
use crate::model::Model;
use crate::model::NavigationProperty;
use crate::model::NavigationPropertyBinding;
use crate::model::OnDeleteAction;
use crate::model::Property;
use crate::model::PropertyName;
use crate::model::ReferentialConstraint;
use crate::model::TypeReference;
use odata_core::Namespace;
use odata_core::QualifiedName;
use std::collections::HashMap;
use std::str::FromStr;

/// `Multiplicity` of an association end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Multiplicity {
    Many,
    ZeroOrOne,
    One,
}

impl FromStr for Multiplicity {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(Self::Many),
            "0..1" => Ok(Self::ZeroOrOne),
            "1" => Ok(Self::One),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
struct End {
    role: String,
    entity_type: QualifiedName,
    multiplicity: Multiplicity,
    on_delete: Option<OnDeleteAction>,
}

#[derive(Debug)]
struct Constraint {
    principal_role: String,
    principal: Vec<String>,
    dependent_role: String,
    dependent: Vec<String>,
}

#[derive(Debug)]
struct Association {
    ends: Vec<End>,
    constraint: Option<Constraint>,
}

impl Association {
    fn end(&self, role: &str) -> Option<&End> {
        self.ends.iter().find(|e| e.role == role)
    }
}

#[derive(Debug)]
struct PendingNavigation {
    owner: QualifiedName,
    name: PropertyName,
    relationship: QualifiedName,
    from_role: String,
    to_role: String,
    contains_target: bool,
    annotations: Vec<Annotation>,
    location: Location,
}

#[derive(Debug)]
struct PendingAssociationSet {
    container: QualifiedName,
    association: QualifiedName,
    /// Role and entity set of each end.
    ends: Vec<(String, String)>,
    location: Location,
}

/// Associations, navigation properties and association sets seen so far.
#[derive(Debug, Default)]
pub(crate) struct Relationships {
    associations: HashMap<QualifiedName, Association>,
    navigations: Vec<PendingNavigation>,
    association_sets: Vec<PendingAssociationSet>,
}

impl Relationships {
    fn navigation_property(&self, nav: &PendingNavigation) -> Result<NavigationProperty, String> {
        let association = self.associations.get(&nav.relationship).ok_or_else(|| {
            format!(
                "association {} of navigation property {} not found",
                nav.relationship, nav.name
            )
        })?;
        let role = |name: &str| {
            association.end(name).ok_or_else(|| {
                format!("role {name} not found in association {}", nav.relationship)
            })
        };
        let from = role(&nav.from_role)?;
        let to = role(&nav.to_role)?;
        let target = TypeReference::entity(to.entity_type.clone());
        let type_ref = match to.multiplicity {
            Multiplicity::Many => TypeReference::collection(target).map_err(|e| e.to_string())?,
            Multiplicity::ZeroOrOne => target,
            Multiplicity::One => target.with_nullable(false),
        };
        let mut property = NavigationProperty::new(nav.name.clone(), type_ref);
        property.partner = self
            .navigations
            .iter()
            .find(|other| {
                other.relationship == nav.relationship
                    && other.from_role == nav.to_role
                    && other.to_role == nav.from_role
            })
            .map(|other| other.name.clone());
        property.contains_target = nav.contains_target;
        property.on_delete = from.on_delete;
        if let Some(c) = association
            .constraint
            .as_ref()
            .filter(|c| c.dependent_role == nav.from_role)
        {
            property.referential_constraints = c
                .dependent
                .iter()
                .zip(&c.principal)
                .map(|(dependent, principal)| ReferentialConstraint {
                    property: dependent.clone(),
                    referenced_property: principal.clone(),
                })
                .collect();
        }
        property.annotations = nav.annotations.clone();
        Ok(property)
    }

    /// Bindings of one association set: source entity set, navigation
    /// owner and binding.
    fn bindings(
        &self,
        set: &PendingAssociationSet,
    ) -> Result<Vec<(String, &QualifiedName, NavigationPropertyBinding)>, String> {
        let association = self.associations.get(&set.association).ok_or_else(|| {
            format!("association {} of association set not found", set.association)
        })?;
        if set.ends.len() != 2 {
            return Err(format!(
                "association set of {} must have two ends",
                set.association
            ));
        }
        let mut result = Vec::new();
        for (i, (role, source)) in set.ends.iter().enumerate() {
            if association.end(role).is_none() {
                return Err(format!(
                    "role {role} not found in association {}",
                    set.association
                ));
            }
            let target = &set.ends[1 - i].1;
            for nav in self
                .navigations
                .iter()
                .filter(|n| n.relationship == set.association && &n.from_role == role)
            {
                result.push((
                    source.clone(),
                    &nav.owner,
                    NavigationPropertyBinding::new(nav.name.to_string(), target.clone()),
                ));
            }
        }
        Ok(result)
    }
}

impl Context<'_> {
    fn error_at(&mut self, code: DiagnosticCode, location: Location, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(code, Some(location), message));
    }

    /// `Association` element.
    pub(super) fn record_association(&mut self, el: &XmlElement, namespace: &Namespace) {
        if !self.check(el, "Association") {
            return;
        }
        let Some(name) = self.identifier(el, "Name") else {
            return;
        };
        let mut ends = Vec::new();
        for end in self.children(el, "End") {
            if !self.check(end, "End") {
                continue;
            }
            let entity_type = self.qualified(end, "Type");
            let multiplicity = self.parse_attr::<Multiplicity>(end, "Multiplicity");
            let on_delete = self.children(end, "OnDelete").find_map(|d| {
                if self.check(d, "OnDelete") {
                    self.parse_attr(d, "Action")
                } else {
                    None
                }
            });
            if let (Some(role), Some(entity_type), Some(multiplicity)) =
                (end.attribute("Role"), entity_type, multiplicity)
            {
                ends.push(End {
                    role: role.to_string(),
                    entity_type,
                    multiplicity,
                    on_delete,
                });
            }
        }
        let qname = namespace.qualify(name);
        if ends.len() != 2 {
            self.error(
                DiagnosticCode::UnresolvedRelationship,
                el,
                format!("association {qname} must have two ends"),
            );
            return;
        }
        let constraint = self
            .children(el, "ReferentialConstraint")
            .next()
            .and_then(|rc| self.constraint(rc))
            .filter(|c| {
                let unknown = [&c.principal_role, &c.dependent_role]
                    .into_iter()
                    .find(|role| !ends.iter().any(|e| &&e.role == role));
                if let Some(role) = unknown {
                    self.error(
                        DiagnosticCode::UnresolvedRelationship,
                        el,
                        format!("constraint role {role} not found in association {qname}"),
                    );
                }
                unknown.is_none()
            });
        if self.relationships.associations.contains_key(&qname) {
            self.error(
                DiagnosticCode::StructuralConflict,
                el,
                format!("association {qname} is declared more than once"),
            );
            return;
        }
        self.relationships
            .associations
            .insert(qname, Association { ends, constraint });
    }

    fn constraint(&mut self, el: &XmlElement) -> Option<Constraint> {
        if !self.check(el, "ReferentialConstraint") {
            return None;
        }
        let (principal_role, principal) = self.constraint_side(el, "Principal")?;
        let (dependent_role, dependent) = self.constraint_side(el, "Dependent")?;
        if principal.len() != dependent.len() {
            self.error(
                DiagnosticCode::UnresolvedRelationship,
                el,
                "principal and dependent list different numbers of properties",
            );
            return None;
        }
        Some(Constraint {
            principal_role,
            principal,
            dependent_role,
            dependent,
        })
    }

    fn constraint_side(&mut self, el: &XmlElement, name: &str) -> Option<(String, Vec<String>)> {
        let Some(side) = self.children(el, name).next() else {
            self.error(
                DiagnosticCode::UnresolvedRelationship,
                el,
                format!("referential constraint has no {name}"),
            );
            return None;
        };
        if !self.check(side, name) {
            return None;
        }
        let role = side.attribute("Role")?.to_string();
        let properties = self
            .children(side, "PropertyRef")
            .filter(|r| self.check(r, "PropertyRef"))
            .filter_map(|r| r.attribute("Name").map(str::to_string))
            .collect();
        Some((role, properties))
    }

    /// `NavigationProperty` naming an association.
    pub(super) fn record_navigation(&mut self, el: &XmlElement, owner: &QualifiedName) {
        if !self.check(el, "NavigationProperty") {
            return;
        }
        let name = self.parse_attr::<PropertyName>(el, "Name");
        let relationship = self.qualified(el, "Relationship");
        let contains_target = self.flag(el, "ContainsTarget", false);
        let annotations = self.annotations(el);
        if let (Some(name), Some(relationship), Some(from_role), Some(to_role)) = (
            name,
            relationship,
            el.attribute("FromRole"),
            el.attribute("ToRole"),
        ) {
            self.relationships.navigations.push(PendingNavigation {
                owner: owner.clone(),
                name,
                relationship,
                from_role: from_role.to_string(),
                to_role: to_role.to_string(),
                contains_target,
                annotations,
                location: el.location,
            });
        }
    }

    /// `AssociationSet` of `container`.
    pub(super) fn record_association_set(&mut self, el: &XmlElement, container: &QualifiedName) {
        if !self.check(el, "AssociationSet") {
            return;
        }
        let Some(association) = self.qualified(el, "Association") else {
            return;
        };
        let ends = self
            .children(el, "End")
            .filter_map(|end| {
                if !self.check(end, "AssociationSetEnd") {
                    return None;
                }
                Some((
                    end.attribute("Role")?.to_string(),
                    end.attribute("EntitySet")?.to_string(),
                ))
            })
            .collect();
        self.relationships
            .association_sets
            .push(PendingAssociationSet {
                container: container.clone(),
                association,
                ends,
                location: el.location,
            });
    }

    /// Add the recorded navigation properties and bindings to `model`.
    pub(super) fn resolve_relationships(&mut self, model: &mut Model) {
        if !self.legacy() {
            return;
        }
        let relationships = std::mem::take(&mut self.relationships);
        for nav in &relationships.navigations {
            let added = relationships
                .navigation_property(nav)
                .map_err(|message| (DiagnosticCode::UnresolvedRelationship, message))
                .and_then(|property| {
                    model
                        .add_property(&nav.owner, Property::Navigation(property))
                        .map_err(|err| (DiagnosticCode::StructuralConflict, err.to_string()))
                });
            if let Err((code, message)) = added {
                self.error_at(code, nav.location, message);
            }
        }
        for set in &relationships.association_sets {
            let bindings = match relationships.bindings(set) {
                Ok(bindings) => bindings,
                Err(message) => {
                    self.error_at(DiagnosticCode::UnresolvedRelationship, set.location, message);
                    continue;
                }
            };
            for (source, owner, mut binding) in bindings {
                let source_type = model
                    .find_container(&set.container)
                    .and_then(|c| c.navigation_source_type(&source))
                    .cloned();
                // Navigation properties of derived types need a type cast.
                if let Some(source_type) = source_type {
                    if &source_type != owner && !model.base_types(&source_type).contains(owner) {
                        binding.path = format!("{owner}/{}", binding.path);
                    }
                }
                if let Err(err) = model.add_binding(&set.container, &source, binding) {
                    self.error_at(
                        DiagnosticCode::UnresolvedRelationship,
                        set.location,
                        err.to_string(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::OnDeleteAction;
    use crate::model::Property;
    use crate::reader::CsdlReader;
    use crate::reader::DiagnosticCode;
    use odata_core::QualifiedName;

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn v3(body: &str) -> String {
        format!(
            r#"<edmx:Edmx Version="3.0" xmlns:edmx="http://schemas.microsoft.com/ado/2009/11/edmx">
<edmx:DataServices>
<Schema Namespace="NS" xmlns="http://schemas.microsoft.com/ado/2009/11/edm">
{body}
</Schema>
</edmx:DataServices>
</edmx:Edmx>"#
        )
    }

    const TYPES: &str = r#"<EntityType Name="Customer">
  <Key><PropertyRef Name="Id"/></Key>
  <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
  <NavigationProperty Name="Orders" Relationship="NS.Customer_Orders_Order_Customer" FromRole="Customer_Orders" ToRole="Order_Customer"/>
</EntityType>
<EntityType Name="Order">
  <Key><PropertyRef Name="Id"/></Key>
  <Property Name="Id" Type="Edm.Int32" Nullable="false"/>
  <Property Name="CustomerId" Type="Edm.Int32" Nullable="false"/>
  <NavigationProperty Name="Customer" Relationship="NS.Customer_Orders_Order_Customer" FromRole="Order_Customer" ToRole="Customer_Orders"/>
</EntityType>"#;

    const ASSOCIATION: &str = r#"<Association Name="Customer_Orders_Order_Customer">
  <End Role="Customer_Orders" Type="NS.Customer" Multiplicity="1"><OnDelete Action="Cascade"/></End>
  <End Role="Order_Customer" Type="NS.Order" Multiplicity="*"/>
  <ReferentialConstraint>
    <Principal Role="Customer_Orders"><PropertyRef Name="Id"/></Principal>
    <Dependent Role="Order_Customer"><PropertyRef Name="CustomerId"/></Dependent>
  </ReferentialConstraint>
</Association>
<EntityContainer Name="Default">
  <EntitySet Name="Customers" EntityType="NS.Customer"/>
  <EntitySet Name="Orders" EntityType="NS.Order"/>
  <AssociationSet Name="Customers_Orders" Association="NS.Customer_Orders_Order_Customer">
    <End Role="Customer_Orders" EntitySet="Customers"/>
    <End Role="Order_Customer" EntitySet="Orders"/>
  </AssociationSet>
</EntityContainer>"#;

    #[test]
    fn associations_become_navigation_properties() {
        let out = CsdlReader::default().parse(&v3(&format!("{TYPES}\n{ASSOCIATION}")));
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let model = out.value.unwrap();

        let orders = model
            .find_property(&qn("NS.Customer"), "Orders")
            .and_then(Property::as_navigation)
            .unwrap();
        assert!(orders.type_ref.is_collection());
        assert_eq!(orders.type_ref.entity_type(), Some(&qn("NS.Order")));
        assert_eq!(orders.partner, Some("Customer".parse().unwrap()));
        assert_eq!(orders.on_delete, Some(OnDeleteAction::Cascade));
        assert!(orders.referential_constraints.is_empty());

        let customer = model
            .find_property(&qn("NS.Order"), "Customer")
            .and_then(Property::as_navigation)
            .unwrap();
        assert!(!customer.type_ref.nullable);
        assert_eq!(customer.on_delete, None);
        assert_eq!(customer.referential_constraints[0].property, "CustomerId");
        assert_eq!(customer.referential_constraints[0].referenced_property, "Id");

        let container = model.find_container(&qn("NS.Default")).unwrap();
        let customers = container.entity_set("Customers").unwrap();
        assert_eq!(customers.bindings[0].path, "Orders");
        assert_eq!(customers.bindings[0].target, "Orders");
        let orders_set = container.entity_set("Orders").unwrap();
        assert_eq!(orders_set.bindings[0].path, "Customer");
        assert_eq!(orders_set.bindings[0].target, "Customers");
        assert!(model.validate().is_empty(), "{:?}", model.validate());
    }

    #[test]
    fn missing_association_is_reported() {
        let out = CsdlReader::default().parse(&v3(TYPES));
        assert!(out.value.is_none());
        let codes: Vec<_> = out.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::UnresolvedRelationship,
                DiagnosticCode::UnresolvedRelationship
            ]
        );
        assert_eq!(out.diagnostics[0].location.map(|l| l.line), Some(7));
    }

    #[test]
    fn unknown_role_in_association_set() {
        let broken = ASSOCIATION.replace(
            r#"<End Role="Order_Customer" EntitySet="Orders"/>"#,
            r#"<End Role="Nobody" EntitySet="Orders"/>"#,
        );
        let out = CsdlReader::default().parse(&v3(&format!("{TYPES}\n{broken}")));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(
            out.diagnostics[0].code,
            DiagnosticCode::UnresolvedRelationship
        );
    }
}
