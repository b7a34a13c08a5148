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

//! CSDL-XML reader.
//!
//! Reading happens in two phases. The first detects the EDM version from
//! the `edmx:Edmx` envelope (or from the schema namespace for documents
//! before 4.0). The second walks a located element tree and checks every
//! element against the grammar of that version before building model
//! elements from it.
//!
//! Problems never stop the walk: a missing or invalid attribute skips
//! (or defaults) the affected element and is reported as a
//! [`Diagnostic`] with line and column. Only XML that is not well-formed
//! and unknown versions abort reading.

/// 3.1 Element edmx:Edmx and 14.3 annotations.
mod annotation;
/// Parse diagnostics.
pub mod diagnostics;
/// Permitted attributes and children.
pub mod grammar;
/// Associations of documents before 4.0.
mod legacy;
/// 5.1 Element edm:Schema and its elements.
mod schema;
/// Located XML tree.
pub mod xml;

pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticCode;
pub use diagnostics::Location;
pub use diagnostics::Parsed;
pub use diagnostics::Severity;

use crate::model::Facets;
use crate::model::Include;
use crate::model::IncludeAnnotations;
use crate::model::Model;
use crate::model::Reference;
use crate::model::SchemaElement;
use crate::model::TypeKind;
use crate::model::TypeReference;
use legacy::Relationships;
use odata_core::EdmVersion;
use odata_core::Namespace;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use odata_core::TypeName;
use std::collections::HashMap;
use std::collections::HashSet;
use std::io::Read;
use std::str::FromStr;
use tracing::debug;
use xml::XmlElement;

/// Result of reading a document: the model unless errors were found.
pub type ParseOutput = Parsed<Option<Model>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    /// Report attributes the grammar does not know as warnings.
    pub report_unused_attributes: bool,
    /// Treat warnings as errors.
    pub fail_on_warnings: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            report_unused_attributes: true,
            fail_on_warnings: false,
        }
    }
}

/// Source of documents named by `edmx:Reference`.
pub trait ReferenceResolver {
    /// Text of the document at `uri`, `None` when it is not available.
    fn resolve(&mut self, uri: &str) -> Option<String>;
}

impl ReferenceResolver for HashMap<String, String> {
    fn resolve(&mut self, uri: &str) -> Option<String> {
        self.get(uri).cloned()
    }
}

/// Resolver backed by a closure.
pub struct FnResolver<F>(pub F);

impl<F> ReferenceResolver for FnResolver<F>
where
    F: FnMut(&str) -> Option<String>,
{
    fn resolve(&mut self, uri: &str) -> Option<String> {
        (self.0)(uri)
    }
}

/// CSDL-XML reader for all EDM versions.
#[derive(Default)]
pub struct CsdlReader<'r> {
    settings: ReaderSettings,
    resolver: Option<&'r mut dyn ReferenceResolver>,
}

impl<'r> CsdlReader<'r> {
    #[must_use]
    pub const fn new(settings: ReaderSettings) -> Self {
        Self {
            settings,
            resolver: None,
        }
    }

    /// Load referenced documents through `resolver`. Without resolver
    /// references are recorded but not loaded.
    #[must_use]
    pub fn with_resolver(mut self, resolver: &'r mut dyn ReferenceResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Read a document. The model is `None` when an error was reported.
    pub fn parse(&mut self, text: &str) -> ParseOutput {
        let mut loading = HashSet::new();
        let output = self.parse_document(text, None, &mut loading);
        self.finish(output)
    }

    /// Read a document from `input`.
    pub fn parse_reader<R: Read>(&mut self, mut input: R) -> ParseOutput {
        let mut text = String::new();
        match input.read_to_string(&mut text) {
            Ok(_) => self.parse(&text),
            Err(err) => Parsed {
                value: None,
                diagnostics: vec![Diagnostic::error(
                    DiagnosticCode::Io,
                    None,
                    format!("cannot read document: {err}"),
                )],
            },
        }
    }

    fn finish(&self, mut output: ParseOutput) -> ParseOutput {
        if self.settings.fail_on_warnings {
            for d in &mut output.diagnostics {
                d.severity = Severity::Error;
            }
        }
        if output.has_errors() {
            output.value = None;
        }
        output
    }

    fn parse_document(
        &mut self,
        text: &str,
        document: Option<&str>,
        loading: &mut HashSet<String>,
    ) -> ParseOutput {
        let mut output = match xml::parse_document(text) {
            Err(err) => Parsed {
                value: None,
                diagnostics: vec![Diagnostic::error(
                    DiagnosticCode::MalformedXml,
                    err.location(),
                    err.to_string(),
                )],
            },
            Ok(root) => match detect_version(&root) {
                Err(diagnostic) => Parsed {
                    value: None,
                    diagnostics: vec![diagnostic],
                },
                Ok(version) => self.load(&root, version, loading),
            },
        };
        if let Some(uri) = document {
            for d in &mut output.diagnostics {
                d.document.get_or_insert_with(|| uri.to_string());
            }
        }
        output
    }

    fn load(
        &mut self,
        root: &XmlElement,
        version: EdmVersion,
        loading: &mut HashSet<String>,
    ) -> ParseOutput {
        debug!(%version, "reading csdl document");
        let (mut model, mut diagnostics, nested) = {
            let mut ctx = Context::new(version, &self.settings, collect_aliases(root, version));
            let mut model = Model::new();
            let mut nested = Vec::new();
            ctx.check(root, "Edmx");
            for child in root.children_in(version.edmx_namespace()) {
                match child.name.as_str() {
                    "Reference" => {
                        if let Some(reference) = ctx.reference(child) {
                            nested.push(reference.uri.clone());
                            model.add_reference(reference);
                        }
                    }
                    "DataServices" => {
                        if ctx.check(child, "DataServices") {
                            for schema in ctx.children(child, "Schema") {
                                ctx.schema(schema, &mut model);
                            }
                        }
                    }
                    _ => {}
                }
            }
            ctx.resolve_relationships(&mut model);
            model.resolve_types();
            (model, ctx.diagnostics, nested)
        };
        for uri in nested {
            if let Some(m) = self.load_reference(&uri, loading, &mut diagnostics) {
                model.add_referenced_model(m);
            }
        }
        Parsed {
            value: Some(model),
            diagnostics,
        }
    }

    fn load_reference(
        &mut self,
        uri: &str,
        loading: &mut HashSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Model> {
        let resolver = self.resolver.as_deref_mut()?;
        if loading.contains(uri) {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCode::ReferenceCycle,
                None,
                format!("document {uri} is already being loaded"),
            ));
            return None;
        }
        let Some(text) = resolver.resolve(uri) else {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCode::UnresolvedReference,
                None,
                format!("referenced document {uri} is not available"),
            ));
            return None;
        };
        loading.insert(uri.to_string());
        let output = self.parse_document(&text, Some(uri), loading);
        loading.remove(uri);
        diagnostics.extend(output.diagnostics);
        output.value
    }
}

/// Version from `edmx:Edmx/@Version`, or from the namespace of the first
/// schema for documents before 4.0.
fn detect_version(root: &XmlElement) -> Result<EdmVersion, Diagnostic> {
    let unsupported = |message: String| {
        Diagnostic::error(
            DiagnosticCode::UnsupportedVersion,
            Some(root.location),
            message,
        )
    };
    let namespace = root.namespace.as_deref().unwrap_or_default();
    if root.name != "Edmx" || !EdmVersion::is_edmx_namespace(namespace) {
        return Err(unsupported(format!(
            "root element must be edmx:Edmx, found {{{namespace}}}{}",
            root.name
        )));
    }
    if namespace == EdmVersion::V4.edmx_namespace() {
        let version = root.attribute("Version").unwrap_or_default();
        return match version.parse::<EdmVersion>() {
            Ok(v) if !v.uses_associations() => Ok(v),
            _ => Err(unsupported(format!("unsupported edmx version '{version}'"))),
        };
    }
    let schema_ns = root
        .children_in(namespace)
        .filter(|c| c.name == "DataServices")
        .flat_map(|ds| ds.children.iter())
        .find(|s| s.name == "Schema")
        .and_then(|s| s.namespace.as_deref());
    match schema_ns {
        Some(ns) => match EdmVersion::from_csdl_namespace(ns) {
            Ok(v) if v.uses_associations() => Ok(v),
            _ => Err(unsupported(format!("unsupported schema namespace {ns}"))),
        },
        None if namespace == EdmVersion::V3.edmx_namespace() => Ok(EdmVersion::V3),
        None => Ok(EdmVersion::V2),
    }
}

/// Aliases declared anywhere in the document: by schemas and includes.
fn collect_aliases(root: &XmlElement, version: EdmVersion) -> HashMap<String, Namespace> {
    let edmx = version.edmx_namespace();
    let csdl = version.csdl_namespace();
    let includes = root
        .children_named(edmx, "Reference")
        .flat_map(move |r| r.children_named(edmx, "Include"));
    let schemas = root
        .children_named(edmx, "DataServices")
        .flat_map(move |ds| ds.children_named(csdl, "Schema"));
    includes
        .chain(schemas)
        .filter_map(|el| {
            let alias = el.attribute("Alias")?;
            let namespace = el.attribute("Namespace")?.parse().ok()?;
            Some((alias.to_string(), namespace))
        })
        .collect()
}

/// State of reading one document.
pub(crate) struct Context<'s> {
    version: EdmVersion,
    csdl_namespace: &'static str,
    edmx_namespace: &'static str,
    settings: &'s ReaderSettings,
    aliases: HashMap<String, Namespace>,
    relationships: Relationships,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Context<'s> {
    fn new(
        version: EdmVersion,
        settings: &'s ReaderSettings,
        aliases: HashMap<String, Namespace>,
    ) -> Self {
        Self {
            version,
            csdl_namespace: version.csdl_namespace(),
            edmx_namespace: version.edmx_namespace(),
            settings,
            aliases,
            relationships: Relationships::default(),
            diagnostics: Vec::new(),
        }
    }

    const fn legacy(&self) -> bool {
        self.version.uses_associations()
    }

    fn error(&mut self, code: DiagnosticCode, el: &XmlElement, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(code, Some(el.location), message));
    }

    fn warning(&mut self, code: DiagnosticCode, el: &XmlElement, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(code, Some(el.location), message));
    }

    /// CSDL children of `el` named `name`.
    fn children<'e>(
        &self,
        el: &'e XmlElement,
        name: &'e str,
    ) -> impl Iterator<Item = &'e XmlElement> + 'e {
        el.children_named(self.csdl_namespace, name)
    }

    /// CSDL children of `el`.
    fn csdl_children<'e>(&self, el: &'e XmlElement) -> impl Iterator<Item = &'e XmlElement> + 'e {
        el.children_in(self.csdl_namespace)
    }

    /// Check `el` against the grammar registered under `key`. Returns
    /// false if the element is unknown in this version.
    fn check(&mut self, el: &XmlElement, key: &str) -> bool {
        let in_edmx = el.is_in(self.edmx_namespace);
        let grammar = if in_edmx {
            grammar::edmx(key)
        } else {
            grammar::csdl(key, self.legacy())
        };
        let Some(grammar) = grammar else {
            self.error(
                DiagnosticCode::UnexpectedElement,
                el,
                format!("element {} is not supported in version {}", el.name, self.version),
            );
            return false;
        };
        for required in grammar.required {
            if el.attribute(required).is_none() {
                self.error(
                    DiagnosticCode::MissingAttribute,
                    el,
                    format!("element {} requires attribute {required}", el.name),
                );
            }
        }
        for attr in &el.attributes {
            if grammar.allows_attribute(&attr.name) {
                continue;
            }
            if attr.name.starts_with(xml::LEGACY_PREFIX) || !self.settings.report_unused_attributes
            {
                debug!(element = %el.name, attribute = %attr.name, "attribute ignored");
            } else {
                self.warning(
                    DiagnosticCode::UnusedAttribute,
                    el,
                    format!("attribute {} of element {} is not used", attr.name, el.name),
                );
            }
        }
        for child in &el.children {
            let known = child.is_in(self.csdl_namespace) || child.is_in(self.edmx_namespace);
            if !known || child.name == "Documentation" {
                debug!(parent = %el.name, element = %child.name, "element skipped");
            } else if !grammar.allows_child(&child.name) {
                self.error(
                    DiagnosticCode::UnexpectedElement,
                    child,
                    format!("element {} is not allowed in {}", child.name, el.name),
                );
            }
        }
        true
    }

    /// Value of `attr` parsed as `T`. Invalid values are reported.
    fn parse_attr<T: FromStr>(&mut self, el: &XmlElement, attr: &str) -> Option<T> {
        let text = el.attribute(attr)?;
        let parsed = text.parse().ok();
        if parsed.is_none() {
            self.error(
                DiagnosticCode::InvalidAttribute,
                el,
                format!("invalid value '{text}' of attribute {attr}"),
            );
        }
        parsed
    }

    fn flag(&mut self, el: &XmlElement, attr: &str, default: bool) -> bool {
        match el.attribute(attr) {
            None => default,
            Some("true" | "1") => true,
            Some("false" | "0") => false,
            Some(other) => {
                self.error(
                    DiagnosticCode::InvalidAttribute,
                    el,
                    format!("invalid boolean '{other}' of attribute {attr}"),
                );
                default
            }
        }
    }

    fn identifier(&mut self, el: &XmlElement, attr: &str) -> Option<SimpleIdentifier> {
        self.parse_attr(el, attr)
    }

    /// Qualified name with the namespace alias replaced.
    fn qualified(&mut self, el: &XmlElement, attr: &str) -> Option<QualifiedName> {
        self.parse_attr(el, attr).map(|qn| self.unalias(qn))
    }

    fn unalias(&self, name: QualifiedName) -> QualifiedName {
        match self.aliases.get(&name.namespace.to_string()) {
            Some(ns) => ns.qualify(name.name),
            None => name,
        }
    }

    /// Path with aliases replaced in every segment that is a qualified
    /// name, including `Name(Params)` operation segments.
    fn unalias_path(&self, path: &str) -> String {
        path.split('/')
            .map(|segment| {
                let (head, rest) = segment
                    .find('(')
                    .map_or((segment, ""), |i| segment.split_at(i));
                match head.parse::<QualifiedName>() {
                    Ok(qn) if self.aliases.contains_key(&qn.namespace.to_string()) => {
                        let params = rest
                            .strip_prefix('(')
                            .and_then(|r| r.strip_suffix(')'))
                            .map(|p| {
                                let p = p
                                    .split(',')
                                    .map(|t| self.unalias_type_text(t.trim()))
                                    .collect::<Vec<_>>()
                                    .join(",");
                                format!("({p})")
                            })
                            .unwrap_or_else(|| rest.to_string());
                        format!("{}{params}", self.unalias(qn))
                    }
                    _ => segment.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn unalias_type_text(&self, text: &str) -> String {
        match text.parse::<TypeName>() {
            Ok(TypeName::One(n)) => self.unalias(n).to_string(),
            Ok(TypeName::CollectionOf(n)) => format!("Collection({})", self.unalias(n)),
            Err(_) => text.to_string(),
        }
    }

    fn facets(&mut self, el: &XmlElement) -> Facets {
        Facets {
            max_length: self.parse_attr(el, "MaxLength"),
            precision: self.parse_attr(el, "Precision"),
            scale: self.parse_attr(el, "Scale"),
            srid: self.parse_attr(el, "SRID"),
            unicode: el
                .attribute("Unicode")
                .map(|_| self.flag(el, "Unicode", true)),
            fixed_length: if self.legacy() {
                el.attribute("FixedLength")
                    .map(|_| self.flag(el, "FixedLength", false))
            } else {
                None
            },
        }
    }

    /// Type of `el` from its `Type` attribute (with `Nullable` and
    /// facets) or from a `CollectionType`, `ReferenceType` or `TypeRef`
    /// child.
    fn type_reference(&mut self, el: &XmlElement) -> Option<TypeReference> {
        self.type_attribute(el, "Type")
            .or_else(|| {
                let child = self
                    .csdl_children(el)
                    .find(|c| matches!(c.name.as_str(), "CollectionType" | "ReferenceType" | "TypeRef"))?;
                self.type_element(child)
            })
            .or_else(|| {
                let reported = grammar::csdl(&el.name, self.legacy())
                    .is_some_and(|g| g.required.contains(&"Type"));
                if el.attribute("Type").is_none() && !reported {
                    self.error(
                        DiagnosticCode::MissingAttribute,
                        el,
                        format!("element {} requires attribute Type", el.name),
                    );
                }
                None
            })
    }

    fn type_attribute(&mut self, el: &XmlElement, attr: &str) -> Option<TypeReference> {
        let name: TypeName = self.parse_attr(el, attr)?;
        let name = match name {
            TypeName::One(n) => TypeName::One(self.unalias(n)),
            TypeName::CollectionOf(n) => TypeName::CollectionOf(self.unalias(n)),
        };
        let t = match TypeReference::from_type_name(&name) {
            Ok(t) => t,
            Err(err) => {
                self.error(DiagnosticCode::InvalidAttribute, el, err.to_string());
                return None;
            }
        };
        let nullable = self.flag(el, "Nullable", true);
        let mut t = t.with_facets(self.facets(el));
        match &mut t.kind {
            TypeKind::Collection(element) => element.nullable = nullable,
            _ => t.nullable = nullable,
        }
        Some(t)
    }

    fn type_element(&mut self, el: &XmlElement) -> Option<TypeReference> {
        if !self.check(el, &el.name) {
            return None;
        }
        match el.name.as_str() {
            "CollectionType" => {
                let element = self.type_attribute(el, "ElementType").or_else(|| {
                    let child = self.csdl_children(el).next()?;
                    self.type_element(child)
                })?;
                match TypeReference::collection(element) {
                    Ok(t) => Some(t),
                    Err(err) => {
                        self.error(DiagnosticCode::InvalidAttribute, el, err.to_string());
                        None
                    }
                }
            }
            "ReferenceType" => self
                .qualified(el, "Type")
                .map(TypeReference::entity_reference),
            _ => self.type_attribute(el, "Type"),
        }
    }

    /// 3.3 Element edmx:Reference
    fn reference(&mut self, el: &XmlElement) -> Option<Reference> {
        if !self.check(el, "Reference") {
            return None;
        }
        let mut reference = Reference::new(el.attribute("Uri")?);
        for child in el.children_in(self.edmx_namespace) {
            match child.name.as_str() {
                "Include" if self.check(child, "Include") => {
                    if let Some(namespace) = self.parse_attr(child, "Namespace") {
                        let alias = self.identifier(child, "Alias");
                        reference.includes.push(Include { namespace, alias });
                    }
                }
                "IncludeAnnotations" if self.check(child, "IncludeAnnotations") => {
                    if let Some(term_namespace) = self.parse_attr(child, "TermNamespace") {
                        reference.include_annotations.push(IncludeAnnotations {
                            term_namespace,
                            qualifier: self.identifier(child, "Qualifier"),
                            target_namespace: self.parse_attr(child, "TargetNamespace"),
                        });
                    }
                }
                _ => {}
            }
        }
        reference.annotations = self.annotations(el);
        Some(reference)
    }

    fn add_element(
        &mut self,
        model: &mut Model,
        namespace: &Namespace,
        el: &XmlElement,
        element: SchemaElement,
    ) {
        if let Err(err) = model.add_element(namespace, element) {
            self.error(DiagnosticCode::StructuralConflict, el, err.to_string());
        }
    }
}
