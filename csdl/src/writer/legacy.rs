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

//! Output for versions 1.0 to 3.0.
//!
//! Relationships are written as `Association` elements derived from the
//! navigation properties, operations as `FunctionImport` elements of the
//! entity container.
//!
//! Association naming: `{Source}_{Nav}` for a navigation property without
//! partner, `{Source}_{Nav}_{Target}_{Partner}` for a partnered pair,
//! named after the side declared first. Roles are `{Source}_{Nav}` and
//! `{Target}_{Partner}` (or `{Target}_{Nav}Partner` without partner).
//! Association sets are `{EntitySet}_{Nav}` and are written only for
//! navigation properties with exactly one binding.

use super::Ctx;
use super::Elem;
use crate::model::Annotation;
use crate::model::ComplexType;
use crate::model::EntityContainer;
use crate::model::EntityType;
use crate::model::NavigationProperty;
use crate::model::OnDeleteAction;
use crate::model::Operation;
use crate::model::OperationKind;
use crate::model::Property;
use crate::model::ReferentialConstraint;
use crate::model::Schema;
use crate::model::SchemaElement;
use crate::model::TypeReference;
use odata_core::EdmVersion;
use odata_core::QualifiedName;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::debug;
use tracing::warn;

/// Multiplicity of an association end pointing to a type reference.
#[must_use]
pub fn multiplicity(t: &TypeReference) -> &'static str {
    if t.is_collection() {
        "*"
    } else if t.nullable {
        "0..1"
    } else {
        "1"
    }
}

#[derive(Debug)]
struct End {
    role: String,
    entity_type: QualifiedName,
    multiplicity: &'static str,
    on_delete: Option<OnDeleteAction>,
}

#[derive(Debug)]
struct Association {
    name: QualifiedName,
    ends: [End; 2],
    /// Constraints with the index of the dependent end.
    constraints: Option<(usize, Vec<ReferentialConstraint>)>,
}

/// Association and roles of one navigation property.
#[derive(Debug, Clone)]
struct NavLink {
    association: QualifiedName,
    from_role: String,
    to_role: String,
}

/// Associations derived from all navigation properties of a model.
#[derive(Debug, Default)]
struct Associations {
    list: Vec<Association>,
    links: HashMap<(QualifiedName, String), NavLink>,
}

impl Associations {
    fn build(ctx: &Ctx<'_>) -> Self {
        let mut result = Self::default();
        for (source, element) in ctx.model.elements() {
            let SchemaElement::EntityType(et) = element else {
                continue;
            };
            for nav in et.properties.iter().filter_map(Property::as_navigation) {
                let key = (source.clone(), nav.name.to_string());
                if !result.links.contains_key(&key) {
                    result.add(ctx, &source, nav);
                }
            }
        }
        result
    }

    fn add(&mut self, ctx: &Ctx<'_>, source: &QualifiedName, nav: &NavigationProperty) {
        let target = nav.type_ref.qualified_name();
        let partner = nav.partner.as_ref().and_then(|p| {
            ctx.model
                .find_property(&target, p.inner().inner())
                .and_then(Property::as_navigation)
        });
        let s = &source.name;
        let t = &target.name;
        let p = &nav.name;
        let (name, to_role, source_multiplicity) = match partner {
            Some(q) => (
                format!("{s}_{p}_{t}_{}", q.name),
                format!("{t}_{}", q.name),
                multiplicity(&q.type_ref),
            ),
            None => (format!("{s}_{p}"), format!("{t}_{p}Partner"), "*"),
        };
        let from_role = format!("{s}_{p}");
        let association = source.namespace.qualify(match name.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(%name, "association name is not an identifier");
                return;
            }
        });
        let constraints = if nav.referential_constraints.is_empty() {
            partner
                .filter(|q| !q.referential_constraints.is_empty())
                .map(|q| (1, q.referential_constraints.clone()))
        } else {
            Some((0, nav.referential_constraints.clone()))
        };
        self.links.insert(
            (source.clone(), p.to_string()),
            NavLink {
                association: association.clone(),
                from_role: from_role.clone(),
                to_role: to_role.clone(),
            },
        );
        if let Some(q) = partner {
            self.links.insert(
                (target.clone(), q.name.to_string()),
                NavLink {
                    association: association.clone(),
                    from_role: to_role.clone(),
                    to_role: from_role.clone(),
                },
            );
        }
        self.list.push(Association {
            name: association,
            ends: [
                End {
                    role: from_role,
                    entity_type: source.clone(),
                    multiplicity: source_multiplicity,
                    on_delete: nav.on_delete,
                },
                End {
                    role: to_role,
                    entity_type: target,
                    multiplicity: multiplicity(&nav.type_ref),
                    on_delete: partner.and_then(|q| q.on_delete),
                },
            ],
            constraints,
        });
    }

    fn link(&self, owner: &QualifiedName, nav: &str) -> Option<&NavLink> {
        self.links.get(&(owner.clone(), nav.to_string()))
    }
}

impl Ctx<'_> {
    pub(crate) fn legacy_schema(&self, schema: &Schema) -> Elem {
        let associations = Associations::build(self);
        let v3 = self.version == EdmVersion::V3;
        let mut elem = Elem::new("Schema")
            .attr("Namespace", &schema.namespace)
            .attr_opt("Alias", self.aliases.alias(&schema.namespace))
            .attr("xmlns", self.version.csdl_namespace());
        for element in &schema.elements {
            let qname = schema.namespace.qualify(element.name().clone());
            elem = match element {
                SchemaElement::EntityType(et) => {
                    elem.child(self.legacy_entity_type(&qname, et, &associations))
                }
                SchemaElement::ComplexType(ct) => elem.child(self.legacy_complex_type(ct)),
                SchemaElement::EnumType(et) if v3 => elem.child(self.enum_type(et)),
                SchemaElement::Term(t) if v3 => elem.child(
                    self.typed(Elem::new("ValueTerm").attr("Name", &t.name), &t.type_ref)
                        .children(self.annotations(&t.annotations)),
                ),
                // Operations are written as function imports.
                SchemaElement::Operation(_) => elem,
                other => {
                    warn!(
                        element = %qname,
                        "{} is not supported in version {}",
                        other.kind_name(),
                        self.version
                    );
                    elem
                }
            };
        }
        elem = elem.children(
            associations
                .list
                .iter()
                .filter(|a| a.name.namespace == schema.namespace)
                .map(|a| self.association(a)),
        );
        for (i, container) in schema.containers.iter().enumerate() {
            let is_default = self
                .model
                .entity_container()
                .is_some_and(|(_, c)| std::ptr::eq(c, container));
            let bound = if i == 0 {
                schema
                    .elements
                    .iter()
                    .filter_map(|e| match e {
                        SchemaElement::Operation(op) if op.is_bound => Some(op),
                        _ => None,
                    })
                    .collect()
            } else {
                Vec::new()
            };
            elem = elem.child(self.legacy_container(container, is_default, &bound, &associations));
        }
        if v3 {
            elem = elem.children(schema.annotation_blocks.iter().map(|b| {
                Elem::new("Annotations")
                    .attr("Target", &b.target)
                    .attr_opt("Qualifier", b.qualifier.as_ref())
                    .children(self.annotations(&b.annotations))
            }));
        }
        elem.children(self.annotations(&schema.annotations))
    }

    fn legacy_entity_type(
        &self,
        name: &QualifiedName,
        et: &EntityType,
        associations: &Associations,
    ) -> Elem {
        let key = et.key.as_ref().map(|key| {
            Elem::new("Key").children(
                key.iter()
                    .map(|r| Elem::new("PropertyRef").attr("Name", &r.name)),
            )
        });
        Elem::new("EntityType")
            .attr("Name", &et.name)
            .attr_opt("BaseType", et.base_type.as_ref().map(|b| self.name(b)))
            .flag("Abstract", et.is_abstract, false)
            .flag("OpenType", et.open_type, false)
            .flag("m:HasStream", et.has_stream, false)
            .children(key)
            .children(et.properties.iter().filter_map(|p| match p {
                Property::Structural(sp) => Some(self.legacy_property(sp)),
                Property::Navigation(np) => {
                    let link = associations.link(name, np.name.inner().inner())?;
                    Some(
                        Elem::new("NavigationProperty")
                            .attr("Name", &np.name)
                            .attr("Relationship", self.name(&link.association))
                            .attr("FromRole", &link.from_role)
                            .attr("ToRole", &link.to_role)
                            .flag(
                                "ContainsTarget",
                                np.contains_target && self.version == EdmVersion::V3,
                                false,
                            )
                            .children(self.annotations(&np.annotations)),
                    )
                }
            }))
            .children(self.annotations(&et.annotations))
    }

    fn legacy_property(&self, sp: &crate::model::StructuralProperty) -> Elem {
        self.typed(Elem::new("Property").attr("Name", &sp.name), &sp.type_ref)
            .attr_opt("DefaultValue", sp.default_value.as_ref())
            .attr_opt(
                "ConcurrencyMode",
                (sp.concurrency_mode != crate::model::ConcurrencyMode::None)
                    .then_some(sp.concurrency_mode),
            )
            .children(self.annotations(&sp.annotations))
    }

    fn legacy_complex_type(&self, ct: &ComplexType) -> Elem {
        Elem::new("ComplexType")
            .attr("Name", &ct.name)
            .attr_opt("BaseType", ct.base_type.as_ref().map(|b| self.name(b)))
            .flag("Abstract", ct.is_abstract, false)
            .children(ct.properties.iter().filter_map(|p| match p {
                Property::Structural(sp) => Some(self.legacy_property(sp)),
                Property::Navigation(np) => {
                    debug!(property = %np.name, "navigation property of complex type dropped");
                    None
                }
            }))
            .children(self.annotations(&ct.annotations))
    }

    fn association(&self, a: &Association) -> Elem {
        let constraint = a.constraints.as_ref().map(|(dependent, pairs)| {
            let principal = &a.ends[1 - dependent];
            let dependent = &a.ends[*dependent];
            Elem::new("ReferentialConstraint")
                .child(
                    Elem::new("Principal").attr("Role", &principal.role).children(
                        pairs.iter().map(|rc| {
                            Elem::new("PropertyRef").attr("Name", &rc.referenced_property)
                        }),
                    ),
                )
                .child(
                    Elem::new("Dependent")
                        .attr("Role", &dependent.role)
                        .children(
                            pairs
                                .iter()
                                .map(|rc| Elem::new("PropertyRef").attr("Name", &rc.property)),
                        ),
                )
        });
        Elem::new("Association")
            .attr("Name", &a.name.name)
            .children(a.ends.iter().map(|end| {
                Elem::new("End")
                    .attr("Role", &end.role)
                    .attr("Type", self.name(&end.entity_type))
                    .attr("Multiplicity", end.multiplicity)
                    .children(
                        end.on_delete
                            .map(|action| Elem::new("OnDelete").attr("Action", action)),
                    )
            }))
            .children(constraint)
    }

    fn legacy_container(
        &self,
        c: &EntityContainer,
        is_default: bool,
        bound: &[&Operation],
        associations: &Associations,
    ) -> Elem {
        if !c.singletons.is_empty() {
            warn!(container = %c.name, "singletons are not supported in version {}", self.version);
        }
        let imports = c
            .action_imports
            .iter()
            .map(|i| (&i.name, &i.action, i.entity_set.as_ref(), OperationKind::Action))
            .chain(c.function_imports.iter().map(|i| {
                (
                    &i.name,
                    &i.function,
                    i.entity_set.as_ref(),
                    OperationKind::Function,
                )
            }))
            .filter_map(|(name, op_name, entity_set, kind)| {
                let op = self
                    .model
                    .find_operations(op_name)
                    .into_iter()
                    .find(|op| op.kind == kind && !op.is_bound);
                if op.is_none() {
                    warn!(import = %name, "imported operation {op_name} not found");
                }
                Some(self.function_import(name.inner(), op?, entity_set))
            });
        let bound = bound
            .iter()
            .map(|op| self.function_import(op.name.inner(), op, None));
        Elem::new("EntityContainer")
            .attr("Name", &c.name)
            .flag("m:IsDefaultEntityContainer", is_default, false)
            .attr_opt("Extends", c.extends.as_ref().map(|e| e.name.clone()))
            .children(c.entity_sets.iter().map(|s| {
                Elem::new("EntitySet")
                    .attr("Name", &s.name)
                    .attr("EntityType", self.name(&s.entity_type))
                    .children(self.annotations(&s.annotations))
            }))
            .children(self.association_sets(c, associations))
            .children(imports)
            .children(bound)
            .children(self.annotations(&c.annotations))
    }

    fn association_sets(&self, c: &EntityContainer, associations: &Associations) -> Vec<Elem> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for set in &c.entity_sets {
            let owners = std::iter::once(set.entity_type.clone())
                .chain(self.model.base_types(&set.entity_type));
            for owner in owners {
                for nav in self
                    .model
                    .declared_properties(&owner)
                    .iter()
                    .filter_map(Property::as_navigation)
                {
                    let path = nav.name.to_string();
                    let mut bindings = set.bindings_for(&path);
                    let (Some(binding), None) = (bindings.next(), bindings.next()) else {
                        debug!(set = %set.name, %path, "no unique binding, association set skipped");
                        continue;
                    };
                    if c.entity_set(&binding.target).is_none() {
                        continue;
                    }
                    let Some(link) = associations.link(&owner, &path) else {
                        continue;
                    };
                    let mut ends = [
                        (link.from_role.clone(), set.name.to_string()),
                        (link.to_role.clone(), binding.target.clone()),
                    ];
                    ends.sort();
                    if !seen.insert((link.association.clone(), ends)) {
                        continue;
                    }
                    result.push(
                        Elem::new("AssociationSet")
                            .attr("Name", format!("{}_{path}", set.name))
                            .attr("Association", self.name(&link.association))
                            .child(
                                Elem::new("End")
                                    .attr("Role", &link.from_role)
                                    .attr("EntitySet", &set.name),
                            )
                            .child(
                                Elem::new("End")
                                    .attr("Role", &link.to_role)
                                    .attr("EntitySet", &binding.target),
                            ),
                    );
                }
            }
        }
        result
    }

    fn function_import(&self, name: &str, op: &Operation, entity_set: Option<&String>) -> Elem {
        let v3 = self.version == EdmVersion::V3;
        let elem = Elem::new("FunctionImport").attr("Name", name);
        // Facets and entity references need the child element form.
        let return_child = op
            .return_type
            .as_ref()
            .filter(|rt| v3 && (rt.type_name().is_none() || rt.facets().is_some_and(|f| !f.is_empty())));
        let elem = match (&op.return_type, return_child) {
            (Some(rt), None) => match rt.type_name() {
                Some(n) => elem.attr("ReturnType", self.type_name(&n)),
                None => elem,
            },
            _ => elem,
        };
        let elem = elem.attr_opt("EntitySet", entity_set);
        let elem = if v3 {
            elem.flag("IsSideEffecting", op.is_side_effecting(), true)
                .flag("IsComposable", op.is_composable, false)
                .flag("IsBindable", op.is_bound, false)
                .attr_opt("m:EntitySetPath", op.entity_set_path.as_ref())
        } else {
            elem.attr(
                "m:HttpMethod",
                match op.kind {
                    OperationKind::Action => "POST",
                    OperationKind::Function => "GET",
                },
            )
        };
        elem.children(op.parameters.iter().map(|p| {
            self.typed(Elem::new("Parameter").attr("Name", &p.name), &p.type_ref)
                .attr("Mode", "In")
        }))
        .children(return_child.map(|rt| self.typed(Elem::new("ReturnType"), rt)))
        .children(self.annotations(&op.annotations))
    }

    /// 3.0 `ValueAnnotation`. Annotations of annotations are dropped.
    pub(crate) fn value_annotation(&self, a: &Annotation) -> Elem {
        let elem = Elem::new("ValueAnnotation")
            .attr("Term", self.name(&a.term))
            .attr_opt("Qualifier", a.qualifier.as_ref());
        match &a.value {
            Some(v) => self.with_value(elem, v),
            None => elem,
        }
    }
}
