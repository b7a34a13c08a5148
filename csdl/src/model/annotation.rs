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

//! 14 Vocabulary and Annotation

use odata_core::PrimitiveValue;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;

/// 14.3 Element edm:Annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub term: QualifiedName,
    pub qualifier: Option<SimpleIdentifier>,
    /// `None` applies the default value of the term.
    pub value: Option<AnnotationValue>,
    /// Annotations of the annotation.
    pub annotations: Vec<Annotation>,
}

impl Annotation {
    #[must_use]
    pub const fn new(term: QualifiedName, value: Option<AnnotationValue>) -> Self {
        Self {
            term,
            qualifier: None,
            value,
            annotations: Vec::new(),
        }
    }
}

/// 14.4 Constant Expressions and 14.5 Dynamic Expressions (subset).
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// `Binary`, `Bool`, `Date`, `DateTimeOffset`, `Decimal`, `Duration`,
    /// `Float`, `Guid`, `Int`, `String` and `TimeOfDay`.
    Constant(PrimitiveValue),
    /// 14.4.7 Expression edm:EnumMember
    EnumMember(Vec<EnumMemberRef>),
    /// 14.5.12 Expression edm:Path
    Path(String),
    /// 14.5.13 Expression edm:PropertyPath
    PropertyPath(String),
    /// 14.5.11 Expression edm:NavigationPropertyPath
    NavigationPropertyPath(String),
    /// 14.5.2 Expression edm:AnnotationPath
    AnnotationPath(String),
    /// 14.5.10 Expression edm:Null
    Null,
    /// 14.5.6 Expression edm:Collection
    Collection(Vec<AnnotationValue>),
    /// 14.5.14 Expression edm:Record
    Record(Record),
}

/// Reference to one enum member, `Type/Member` in XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberRef {
    pub type_name: QualifiedName,
    pub member: SimpleIdentifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Structured type of the record. Derived from the term if absent.
    pub type_name: Option<QualifiedName>,
    pub properties: Vec<PropertyValue>,
}

/// 14.5.14.2 Element edm:PropertyValue
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: SimpleIdentifier,
    pub value: AnnotationValue,
}

/// 14.2 Element edm:Annotations: out of line annotations of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationsBlock {
    /// Path to the annotated element, for example `NS.Customer/Name`.
    pub target: String,
    pub qualifier: Option<SimpleIdentifier>,
    pub annotations: Vec<Annotation>,
}
