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

//! Namespace resolved XML element tree with source locations.

use crate::reader::diagnostics::Location;
use odata_core::version::LEGACY_METADATA_NAMESPACE;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Prefix used for attributes in the legacy data services namespace.
pub const LEGACY_PREFIX: &str = "m:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    Syntax(Location, String),
    /// End of input inside an open element.
    Unbalanced(Location, String),
    /// Prefix without namespace binding.
    UnboundPrefix(Location, String),
    /// No root element.
    Empty,
}

impl XmlError {
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        match self {
            Self::Syntax(l, _) | Self::Unbalanced(l, _) | Self::UnboundPrefix(l, _) => Some(*l),
            Self::Empty => None,
        }
    }
}

impl Display for XmlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Syntax(_, msg) => write!(f, "invalid xml: {msg}"),
            Self::Unbalanced(_, name) => write!(f, "element {name} is not closed"),
            Self::UnboundPrefix(_, prefix) => write!(f, "namespace prefix {prefix} is not bound"),
            Self::Empty => write!(f, "document has no root element"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Local name, or `m:Local` for the legacy metadata namespace.
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace URI; `None` for unqualified elements.
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<Self>,
    /// Character content with whitespace-only runs dropped.
    pub text: String,
    pub location: Location,
}

impl XmlElement {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[must_use]
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// Children in `namespace`.
    pub fn children_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.is_in(namespace))
    }

    /// Children in `namespace` with local name `name`.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Self> + 'a {
        self.children_in(namespace).filter(move |c| c.name == name)
    }

    #[must_use]
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

// Byte offsets of line starts.
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    fn location(&self, offset: usize) -> Location {
        let offset = offset.min(self.text.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let start = self.starts[line];
        let column = self
            .text
            .get(start..offset)
            .map_or(offset - start, |s| s.chars().count());
        Location {
            line: line + 1,
            column: column + 1,
        }
    }

    // Start of the tag that ends right before `end`.
    fn tag_start(&self, end: usize) -> Location {
        let end = end.min(self.text.len());
        let start = self
            .text
            .get(..end)
            .and_then(|s| s.rfind('<'))
            .unwrap_or(end);
        self.location(start)
    }
}

fn to_offset(pos: u64) -> usize {
    usize::try_from(pos).unwrap_or(usize::MAX)
}

// Owned namespace URI, or the unbound prefix.
fn namespace_of(resolved: ResolveResult<'_>) -> Result<Option<String>, String> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(String::from_utf8_lossy(&prefix).into_owned()),
    }
}

fn element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
    location: Location,
) -> Result<XmlElement, XmlError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax(location, e.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let local = String::from_utf8_lossy(local.as_ref()).into_owned();
        let name = match namespace_of(resolved).map_err(|p| XmlError::UnboundPrefix(location, p))? {
            None => local,
            Some(ns) if ns == LEGACY_METADATA_NAMESPACE => format!("{LEGACY_PREFIX}{local}"),
            // xml:lang and foreign annotations
            Some(_) => continue,
        };
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map_err(|e| XmlError::Syntax(location, e.to_string()))?
            .into_owned();
        attributes.push(XmlAttribute { name, value });
    }
    Ok(XmlElement {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
        location,
    })
}

fn general_ref(name: &str, location: Location) -> Result<String, XmlError> {
    let resolved = if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        value.and_then(char::from_u32).map(String::from)
    } else {
        resolve_predefined_entity(name).map(String::from)
    };
    resolved.ok_or_else(|| XmlError::Syntax(location, format!("unknown entity &{name};")))
}

/// Parse a whole document into its root element.
///
/// # Errors
///
/// Returns error if the text is not well-formed XML or uses an unbound
/// namespace prefix.
pub fn parse_document(text: &str) -> Result<XmlElement, XmlError> {
    let lines = LineIndex::new(text);
    let mut reader = NsReader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;
    loop {
        let (namespace, event) = match reader.read_resolved_event() {
            Ok((resolved, event)) => (namespace_of(resolved), event),
            Err(e) => {
                let location = lines.location(to_offset(reader.error_position()));
                return Err(XmlError::Syntax(location, e.to_string()));
            }
        };
        let location = lines.tag_start(to_offset(reader.buffer_position()));
        match event {
            Event::Start(start) => {
                let ns = namespace.map_err(|p| XmlError::UnboundPrefix(location, p))?;
                stack.push(element(&reader, ns, &start, location)?);
            }
            Event::Empty(start) => {
                let ns = namespace.map_err(|p| XmlError::UnboundPrefix(location, p))?;
                let el = element(&reader, ns, &start, location)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(el),
                    None => root = Some(el),
                }
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| XmlError::Syntax(location, "unexpected end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(el),
                    None => root = Some(el),
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let s = String::from_utf8_lossy(&t);
                    if !s.trim().is_empty() || !top.text.is_empty() {
                        top.text.push_str(&s);
                    }
                }
            }
            Event::CData(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::GeneralRef(r) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&general_ref(&String::from_utf8_lossy(&r), location)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if let Some(open) = stack.pop() {
        return Err(XmlError::Unbalanced(
            lines.location(text.len()),
            open.name,
        ));
    }
    root.ok_or(XmlError::Empty)
}
