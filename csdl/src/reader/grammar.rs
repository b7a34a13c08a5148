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

//! Attributes and children permitted per element and version.

/// Permitted content of one element.
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static [&'static str]],
    pub children: &'static [&'static [&'static str]],
}

impl Grammar {
    const fn new(
        required: &'static [&'static str],
        optional: &'static [&'static [&'static str]],
        children: &'static [&'static [&'static str]],
    ) -> Self {
        Self {
            required,
            optional,
            children,
        }
    }

    #[must_use]
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.required.contains(&name) || self.optional.iter().any(|g| g.contains(&name))
    }

    #[must_use]
    pub fn allows_child(&self, name: &str) -> bool {
        self.children.iter().any(|g| g.contains(&name))
    }
}

const FACETS: &[&str] = &["MaxLength", "Precision", "Scale", "SRID", "Unicode"];
const LEGACY_FACETS: &[&str] = &[
    "MaxLength",
    "Precision",
    "Scale",
    "SRID",
    "Unicode",
    "FixedLength",
    "Collation",
];
const TYPE_CHILDREN: &[&str] = &["CollectionType", "ReferenceType", "TypeRef"];
const ANNOTATION: &[&str] = &["Annotation"];
const VALUE_ANNOTATION: &[&str] = &["ValueAnnotation", "TypeAnnotation"];

/// Inline constant and path expressions.
pub const EXPRESSION_ATTRIBUTES: &[&str] = &[
    "Binary",
    "Bool",
    "Date",
    "DateTimeOffset",
    "Decimal",
    "Duration",
    "EnumMember",
    "Float",
    "Guid",
    "Int",
    "String",
    "TimeOfDay",
    "AnnotationPath",
    "NavigationPropertyPath",
    "Path",
    "PropertyPath",
];

pub const LEGACY_EXPRESSION_ATTRIBUTES: &[&str] = &[
    "Binary",
    "Bool",
    "DateTime",
    "DateTimeOffset",
    "Decimal",
    "Float",
    "Guid",
    "Int",
    "String",
    "Time",
    "Path",
];

/// Element forms of the expressions.
pub const EXPRESSION_ELEMENTS: &[&str] = &[
    "Binary",
    "Bool",
    "Date",
    "DateTimeOffset",
    "Decimal",
    "Duration",
    "EnumMember",
    "Float",
    "Guid",
    "Int",
    "String",
    "TimeOfDay",
    "AnnotationPath",
    "NavigationPropertyPath",
    "Path",
    "PropertyPath",
    "Null",
    "Collection",
    "Record",
];

pub const LEGACY_EXPRESSION_ELEMENTS: &[&str] = &[
    "Binary",
    "Bool",
    "DateTime",
    "DateTimeOffset",
    "Decimal",
    "Float",
    "Guid",
    "Int",
    "String",
    "Time",
    "Path",
    "Null",
    "Collection",
    "Record",
];

/// Elements of the `edmx` namespace.
#[must_use]
pub fn edmx(name: &str) -> Option<Grammar> {
    let g = match name {
        "Edmx" => Grammar::new(&["Version"], &[], &[&["Reference", "DataServices"]]),
        "DataServices" => Grammar::new(&[], &[&["m:DataServiceVersion", "m:MaxDataServiceVersion"]], &[&["Schema"]]),
        "Reference" => Grammar::new(
            &["Uri"],
            &[],
            &[&["Include", "IncludeAnnotations"], ANNOTATION],
        ),
        "Include" => Grammar::new(&["Namespace"], &[&["Alias"]], &[ANNOTATION]),
        "IncludeAnnotations" => Grammar::new(
            &["TermNamespace"],
            &[&["Qualifier", "TargetNamespace"]],
            &[],
        ),
        _ => return None,
    };
    Some(g)
}

/// Elements of the CSDL namespace. `key` is the local name, except for
/// `AssociationSetEnd`, which shares the local name `End`.
#[must_use]
pub fn csdl(key: &str, legacy: bool) -> Option<Grammar> {
    if legacy {
        legacy_csdl(key)
    } else {
        v4_csdl(key)
    }
}

fn v4_csdl(key: &str) -> Option<Grammar> {
    let g = match key {
        "Schema" => Grammar::new(
            &["Namespace"],
            &[&["Alias"]],
            &[
                &[
                    "EntityType",
                    "ComplexType",
                    "EnumType",
                    "Action",
                    "Function",
                    "Term",
                    "TypeDefinition",
                    "EntityContainer",
                    "Annotations",
                ],
                ANNOTATION,
            ],
        ),
        "EntityType" => Grammar::new(
            &["Name"],
            &[&["BaseType", "Abstract", "OpenType", "HasStream"]],
            &[&["Key", "Property", "NavigationProperty"], ANNOTATION],
        ),
        "ComplexType" => Grammar::new(
            &["Name"],
            &[&["BaseType", "Abstract", "OpenType"]],
            &[&["Property", "NavigationProperty"], ANNOTATION],
        ),
        "Key" => Grammar::new(&[], &[], &[&["PropertyRef"]]),
        "PropertyRef" => Grammar::new(&["Name"], &[&["Alias"]], &[]),
        "Property" => Grammar::new(
            &["Name", "Type"],
            &[&["Nullable", "DefaultValue"], FACETS],
            &[ANNOTATION],
        ),
        "NavigationProperty" => Grammar::new(
            &["Name", "Type"],
            &[&["Nullable", "Partner", "ContainsTarget"]],
            &[&["ReferentialConstraint", "OnDelete"], ANNOTATION],
        ),
        "ReferentialConstraint" => {
            Grammar::new(&["Property", "ReferencedProperty"], &[], &[ANNOTATION])
        }
        "OnDelete" => Grammar::new(&["Action"], &[], &[ANNOTATION]),
        "EnumType" => Grammar::new(
            &["Name"],
            &[&["UnderlyingType", "IsFlags"]],
            &[&["Member"], ANNOTATION],
        ),
        "Member" => Grammar::new(&["Name"], &[&["Value"]], &[ANNOTATION]),
        "TypeDefinition" => Grammar::new(&["Name", "UnderlyingType"], &[FACETS], &[ANNOTATION]),
        "Action" => Grammar::new(
            &["Name"],
            &[&["IsBound", "EntitySetPath"]],
            &[&["Parameter", "ReturnType"], ANNOTATION],
        ),
        "Function" => Grammar::new(
            &["Name"],
            &[&["IsBound", "IsComposable", "EntitySetPath"]],
            &[&["Parameter", "ReturnType"], ANNOTATION],
        ),
        "Parameter" => Grammar::new(
            &["Name"],
            &[&["Type", "Nullable"], FACETS],
            &[TYPE_CHILDREN, ANNOTATION],
        ),
        "ReturnType" => Grammar::new(
            &[],
            &[&["Type", "Nullable"], FACETS],
            &[TYPE_CHILDREN, ANNOTATION],
        ),
        "CollectionType" => Grammar::new(&[], &[&["ElementType"]], &[TYPE_CHILDREN]),
        "ReferenceType" => Grammar::new(&["Type"], &[], &[]),
        "TypeRef" => Grammar::new(&["Type"], &[&["Nullable"], FACETS], &[]),
        "Term" => Grammar::new(
            &["Name"],
            &[
                &["Type", "BaseTerm", "DefaultValue", "AppliesTo", "Nullable"],
                FACETS,
            ],
            &[TYPE_CHILDREN, ANNOTATION],
        ),
        "EntityContainer" => Grammar::new(
            &["Name"],
            &[&["Extends"]],
            &[
                &["EntitySet", "Singleton", "ActionImport", "FunctionImport"],
                ANNOTATION,
            ],
        ),
        "EntitySet" => Grammar::new(
            &["Name", "EntityType"],
            &[&["IncludeInServiceDocument"]],
            &[&["NavigationPropertyBinding"], ANNOTATION],
        ),
        "Singleton" => Grammar::new(
            &["Name", "Type"],
            &[],
            &[&["NavigationPropertyBinding"], ANNOTATION],
        ),
        "NavigationPropertyBinding" => Grammar::new(&["Path", "Target"], &[], &[]),
        "ActionImport" => Grammar::new(&["Name", "Action"], &[&["EntitySet"]], &[ANNOTATION]),
        "FunctionImport" => Grammar::new(
            &["Name", "Function"],
            &[&["EntitySet", "IncludeInServiceDocument"]],
            &[ANNOTATION],
        ),
        "Annotations" => Grammar::new(&["Target"], &[&["Qualifier"]], &[ANNOTATION]),
        "Annotation" => Grammar::new(
            &["Term"],
            &[&["Qualifier"], EXPRESSION_ATTRIBUTES],
            &[EXPRESSION_ELEMENTS, ANNOTATION],
        ),
        "Record" => Grammar::new(&[], &[&["Type"]], &[&["PropertyValue"], ANNOTATION]),
        "PropertyValue" => Grammar::new(
            &["Property"],
            &[EXPRESSION_ATTRIBUTES],
            &[EXPRESSION_ELEMENTS, ANNOTATION],
        ),
        "Collection" => Grammar::new(&[], &[], &[EXPRESSION_ELEMENTS]),
        "Null" => Grammar::new(&[], &[], &[ANNOTATION]),
        _ if EXPRESSION_ELEMENTS.contains(&key) => Grammar::new(&[], &[], &[]),
        _ => return None,
    };
    Some(g)
}

fn legacy_csdl(key: &str) -> Option<Grammar> {
    let g = match key {
        "Schema" => Grammar::new(
            &["Namespace"],
            &[&["Alias"]],
            &[
                &[
                    "EntityType",
                    "ComplexType",
                    "EnumType",
                    "Association",
                    "EntityContainer",
                    "ValueTerm",
                    "Annotations",
                    "Using",
                    "Function",
                ],
                VALUE_ANNOTATION,
            ],
        ),
        "EntityType" => Grammar::new(
            &["Name"],
            &[&["BaseType", "Abstract", "OpenType", "m:HasStream"]],
            &[&["Key", "Property", "NavigationProperty"], VALUE_ANNOTATION],
        ),
        "ComplexType" => Grammar::new(
            &["Name"],
            &[&["BaseType", "Abstract"]],
            &[&["Property"], VALUE_ANNOTATION],
        ),
        "Key" => Grammar::new(&[], &[], &[&["PropertyRef"]]),
        "PropertyRef" => Grammar::new(&["Name"], &[], &[]),
        "Property" => Grammar::new(
            &["Name", "Type"],
            &[&["Nullable", "DefaultValue", "ConcurrencyMode"], LEGACY_FACETS],
            &[VALUE_ANNOTATION],
        ),
        "NavigationProperty" => Grammar::new(
            &["Name", "Relationship", "FromRole", "ToRole"],
            &[&["ContainsTarget"]],
            &[VALUE_ANNOTATION],
        ),
        "Association" => Grammar::new(
            &["Name"],
            &[],
            &[&["End", "ReferentialConstraint"], VALUE_ANNOTATION],
        ),
        "End" => Grammar::new(
            &["Role", "Type", "Multiplicity"],
            &[],
            &[&["OnDelete"]],
        ),
        "OnDelete" => Grammar::new(&["Action"], &[], &[]),
        "ReferentialConstraint" => Grammar::new(&[], &[], &[&["Principal", "Dependent"]]),
        "Principal" | "Dependent" => Grammar::new(&["Role"], &[], &[&["PropertyRef"]]),
        "EnumType" => Grammar::new(
            &["Name"],
            &[&["UnderlyingType", "IsFlags"]],
            &[&["Member"], VALUE_ANNOTATION],
        ),
        "Member" => Grammar::new(&["Name"], &[&["Value"]], &[VALUE_ANNOTATION]),
        "ValueTerm" => Grammar::new(
            &["Name", "Type"],
            &[&["Nullable", "DefaultValue"], LEGACY_FACETS],
            &[VALUE_ANNOTATION],
        ),
        "EntityContainer" => Grammar::new(
            &["Name"],
            &[&["Extends", "m:IsDefaultEntityContainer", "m:LazyLoadingEnabled"]],
            &[
                &["EntitySet", "AssociationSet", "FunctionImport"],
                VALUE_ANNOTATION,
            ],
        ),
        "EntitySet" => Grammar::new(&["Name", "EntityType"], &[], &[VALUE_ANNOTATION]),
        "AssociationSet" => Grammar::new(&["Name", "Association"], &[], &[&["End"]]),
        "AssociationSetEnd" => Grammar::new(&["Role", "EntitySet"], &[], &[]),
        "FunctionImport" => Grammar::new(
            &["Name"],
            &[&[
                "ReturnType",
                "EntitySet",
                "EntitySetPath",
                "IsSideEffecting",
                "IsComposable",
                "IsBindable",
                "m:HttpMethod",
                "m:EntitySetPath",
            ]],
            &[&["Parameter", "ReturnType"], VALUE_ANNOTATION],
        ),
        "Parameter" => Grammar::new(
            &["Name"],
            &[&["Type", "Mode", "Nullable"], LEGACY_FACETS],
            &[TYPE_CHILDREN, VALUE_ANNOTATION],
        ),
        "ReturnType" => Grammar::new(
            &[],
            &[&["Type", "EntitySet", "Nullable"], LEGACY_FACETS],
            &[TYPE_CHILDREN],
        ),
        "CollectionType" => Grammar::new(&[], &[&["ElementType"]], &[TYPE_CHILDREN]),
        "ReferenceType" => Grammar::new(&["Type"], &[], &[]),
        "TypeRef" => Grammar::new(&["Type"], &[&["Nullable"], LEGACY_FACETS], &[]),
        "Annotations" => Grammar::new(&["Target"], &[&["Qualifier"]], &[VALUE_ANNOTATION]),
        "ValueAnnotation" => Grammar::new(
            &["Term"],
            &[&["Qualifier"], LEGACY_EXPRESSION_ATTRIBUTES],
            &[LEGACY_EXPRESSION_ELEMENTS, VALUE_ANNOTATION],
        ),
        "Record" => Grammar::new(&[], &[&["Type"]], &[&["PropertyValue"]]),
        "PropertyValue" => Grammar::new(
            &["Property"],
            &[LEGACY_EXPRESSION_ATTRIBUTES],
            &[LEGACY_EXPRESSION_ELEMENTS],
        ),
        "Collection" => Grammar::new(&[], &[], &[LEGACY_EXPRESSION_ELEMENTS]),
        _ if LEGACY_EXPRESSION_ELEMENTS.contains(&key) => Grammar::new(&[], &[], &[]),
        _ => return None,
    };
    Some(g)
}
