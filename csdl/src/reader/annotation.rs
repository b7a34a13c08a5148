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

use super::grammar::EXPRESSION_ATTRIBUTES;
use super::grammar::EXPRESSION_ELEMENTS;
use super::grammar::LEGACY_EXPRESSION_ATTRIBUTES;
use super::grammar::LEGACY_EXPRESSION_ELEMENTS;
use super::xml::XmlElement;
use super::Context;
use super::DiagnosticCode;
use crate::model::Annotation;
use crate::model::AnnotationValue;
use crate::model::AnnotationsBlock;
use crate::model::EnumMemberRef;
use crate::model::PropertyValue;
use crate::model::Record;
use odata_core::PrimitiveKind;
use odata_core::PrimitiveValue;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;

impl Context<'_> {
    const fn annotation_element(&self) -> &'static str {
        if self.legacy() {
            "ValueAnnotation"
        } else {
            "Annotation"
        }
    }

    /// Inline annotations of `el`: `Annotation` children, or
    /// `ValueAnnotation` children before 4.0.
    pub(super) fn annotations(&mut self, el: &XmlElement) -> Vec<Annotation> {
        self.children(el, self.annotation_element())
            .filter_map(|a| self.annotation(a))
            .collect()
    }

    /// 14.3 Element edm:Annotation
    pub(super) fn annotation(&mut self, el: &XmlElement) -> Option<Annotation> {
        if !self.check(el, &el.name) {
            return None;
        }
        let term = self.qualified(el, "Term")?;
        let mut annotation = Annotation::new(term, None);
        annotation.qualifier = self.identifier(el, "Qualifier");
        annotation.value = self.value_of(el);
        annotation.annotations = self.annotations(el);
        Some(annotation)
    }

    /// 14.2 Element edm:Annotations
    pub(super) fn annotations_block(&mut self, el: &XmlElement) -> Option<AnnotationsBlock> {
        if !self.check(el, "Annotations") {
            return None;
        }
        let target = self.unalias_path(el.attribute("Target")?);
        Some(AnnotationsBlock {
            target,
            qualifier: self.identifier(el, "Qualifier"),
            annotations: self.annotations(el),
        })
    }

    /// Value given by an expression attribute or by the first expression
    /// child element.
    fn value_of(&mut self, el: &XmlElement) -> Option<AnnotationValue> {
        let (attributes, elements) = if self.legacy() {
            (LEGACY_EXPRESSION_ATTRIBUTES, LEGACY_EXPRESSION_ELEMENTS)
        } else {
            (EXPRESSION_ATTRIBUTES, EXPRESSION_ELEMENTS)
        };
        let mut inline = attributes
            .iter()
            .filter_map(|key| el.attribute(key).map(|text| (*key, text)));
        if let Some((key, text)) = inline.next() {
            if inline.next().is_some() {
                self.error(
                    DiagnosticCode::InvalidAttribute,
                    el,
                    format!("element {} has more than one expression", el.name),
                );
            }
            return self.expression(el, key, text);
        }
        let child = self
            .csdl_children(el)
            .find(|c| elements.contains(&c.name.as_str()))?;
        self.expression_element(child)
    }

    fn expression_element(&mut self, el: &XmlElement) -> Option<AnnotationValue> {
        if !self.check(el, &el.name) {
            return None;
        }
        match el.name.as_str() {
            "Null" => Some(AnnotationValue::Null),
            "Collection" => Some(AnnotationValue::Collection(
                self.csdl_children(el)
                    .filter_map(|c| self.expression_element(c))
                    .collect(),
            )),
            "Record" => {
                let type_name = self.qualified(el, "Type");
                let properties = self
                    .children(el, "PropertyValue")
                    .filter_map(|pv| self.property_value(pv))
                    .collect();
                Some(AnnotationValue::Record(Record {
                    type_name,
                    properties,
                }))
            }
            name => self.expression(el, name, el.trimmed_text()),
        }
    }

    /// 14.5.14.2 Element edm:PropertyValue
    fn property_value(&mut self, el: &XmlElement) -> Option<PropertyValue> {
        if !self.check(el, "PropertyValue") {
            return None;
        }
        let property = self.identifier(el, "Property")?;
        let value = self.value_of(el).unwrap_or(AnnotationValue::Null);
        Some(PropertyValue { property, value })
    }

    fn expression(&mut self, el: &XmlElement, key: &str, text: &str) -> Option<AnnotationValue> {
        match key {
            "Path" => Some(AnnotationValue::Path(self.unalias_path(text))),
            "PropertyPath" => Some(AnnotationValue::PropertyPath(self.unalias_path(text))),
            "NavigationPropertyPath" => Some(AnnotationValue::NavigationPropertyPath(
                self.unalias_path(text),
            )),
            "AnnotationPath" => Some(AnnotationValue::AnnotationPath(self.unalias_path(text))),
            "EnumMember" => self.enum_members(el, text).map(AnnotationValue::EnumMember),
            _ => self.constant(el, key, text).map(AnnotationValue::Constant),
        }
    }

    /// 14.4.7 Expression edm:EnumMember: `Type/Member` separated by
    /// whitespace.
    fn enum_members(&mut self, el: &XmlElement, text: &str) -> Option<Vec<EnumMemberRef>> {
        let members: Option<Vec<EnumMemberRef>> = text
            .split_whitespace()
            .map(|item| {
                let (type_name, member) = item.split_once('/')?;
                Some(EnumMemberRef {
                    type_name: self.unalias(type_name.parse::<QualifiedName>().ok()?),
                    member: member.parse::<SimpleIdentifier>().ok()?,
                })
            })
            .collect();
        if members.is_none() {
            self.error(
                DiagnosticCode::InvalidAttribute,
                el,
                format!("invalid enum member expression '{text}'"),
            );
        }
        members
    }

    /// Constant expression. `DateTime` of documents before 4.0 is read
    /// as a date when possible; `Time` is a duration when it has the
    /// duration form and a time of day otherwise.
    fn constant(&mut self, el: &XmlElement, key: &str, text: &str) -> Option<PrimitiveValue> {
        let kinds: &[PrimitiveKind] = match key {
            "Binary" => &[PrimitiveKind::Binary],
            "Bool" => &[PrimitiveKind::Boolean],
            "Date" => &[PrimitiveKind::Date],
            "DateTimeOffset" => &[PrimitiveKind::DateTimeOffset],
            "Decimal" => &[PrimitiveKind::Decimal],
            "Duration" => &[PrimitiveKind::Duration],
            "Float" => &[PrimitiveKind::Double],
            "Guid" => &[PrimitiveKind::Guid],
            "Int" => &[PrimitiveKind::Int64],
            "String" => &[PrimitiveKind::String],
            "TimeOfDay" => &[PrimitiveKind::TimeOfDay],
            "DateTime" => &[PrimitiveKind::Date, PrimitiveKind::DateTimeOffset],
            "Time" if text.starts_with('P') || text.starts_with("-P") => {
                &[PrimitiveKind::Duration]
            }
            "Time" => &[PrimitiveKind::TimeOfDay],
            _ => return None,
        };
        let value = kinds
            .iter()
            .find_map(|kind| PrimitiveValue::parse(*kind, text).ok());
        if value.is_none() {
            self.error(
                DiagnosticCode::InvalidAttribute,
                el,
                format!("invalid {key} constant '{text}'"),
            );
        }
        value
    }
}
