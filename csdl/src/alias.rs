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

//! Namespace to alias mapping used when writing qualified names.

use crate::model::Model;
use odata_core::Namespace;
use odata_core::QualifiedName;
use odata_core::SimpleIdentifier;
use std::collections::HashMap;

/// Snapshot of namespace aliases for one write operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    aliases: HashMap<Namespace, SimpleIdentifier>,
}

impl AliasMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aliases declared by the schemas of the model and by the includes
    /// of its references. Schema aliases win.
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let includes = model
            .references()
            .iter()
            .flat_map(|r| &r.includes)
            .filter_map(|i| Some((i.namespace.clone(), i.alias.clone()?)));
        let schemas = model
            .schemas()
            .iter()
            .filter_map(|s| Some((s.namespace.clone(), s.alias.clone()?)));
        Self {
            aliases: includes.chain(schemas).collect(),
        }
    }

    /// Replace or add the alias of `namespace`.
    #[must_use]
    pub fn with_override(mut self, namespace: Namespace, alias: SimpleIdentifier) -> Self {
        self.aliases.insert(namespace, alias);
        self
    }

    /// Only the aliases of `namespaces`. Names in any other namespace
    /// are serialized in full.
    #[must_use]
    pub fn restricted_to<'n>(&self, namespaces: impl IntoIterator<Item = &'n Namespace>) -> Self {
        Self {
            aliases: namespaces
                .into_iter()
                .filter_map(|ns| Some((ns.clone(), self.alias(ns)?.clone())))
                .collect(),
        }
    }

    /// Smallest alias given to more than one namespace.
    #[must_use]
    pub fn ambiguous_alias(&self) -> Option<&SimpleIdentifier> {
        let mut aliases: Vec<&SimpleIdentifier> = self.aliases.values().collect();
        aliases.sort();
        aliases.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
    }

    /// Alias of `namespace`. `Edm` is never aliased.
    #[must_use]
    pub fn alias(&self, namespace: &Namespace) -> Option<&SimpleIdentifier> {
        if namespace.is_edm() {
            None
        } else {
            self.aliases.get(namespace)
        }
    }

    /// Namespace an alias stands for.
    #[must_use]
    pub fn namespace_of(&self, alias: &str) -> Option<&Namespace> {
        self.aliases
            .iter()
            .find(|(_, a)| a.inner() == alias)
            .map(|(ns, _)| ns)
    }

    /// `alias.Local` when an alias exists, `Namespace.Local` otherwise.
    #[must_use]
    pub fn serialize_name(&self, name: &QualifiedName) -> String {
        match self.alias(&name.namespace) {
            Some(alias) => format!("{alias}.{}", name.name),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Include;
    use crate::model::Reference;

    #[test]
    fn aliases_from_schemas_and_includes() {
        let mut model = Model::new();
        model.add_schema("My.Service".parse().unwrap(), Some("Self".parse().unwrap()));
        let mut reference = Reference::new("https://example.com/Core.xml");
        reference.includes.push(Include {
            namespace: "Org.OData.Core.V1".parse().unwrap(),
            alias: Some("Core".parse().unwrap()),
        });
        model.add_reference(reference);
        let aliases = AliasMap::from_model(&model);
        assert_eq!(
            aliases.serialize_name(&"My.Service.Customer".parse().unwrap()),
            "Self.Customer"
        );
        assert_eq!(
            aliases.serialize_name(&"Org.OData.Core.V1.Description".parse().unwrap()),
            "Core.Description"
        );
        assert_eq!(
            aliases.serialize_name(&"Other.Thing".parse().unwrap()),
            "Other.Thing"
        );
        assert_eq!(
            aliases.namespace_of("Self"),
            Some(&"My.Service".parse().unwrap())
        );
    }

    #[test]
    fn edm_is_never_aliased() {
        let aliases = AliasMap::new().with_override(Namespace::edm(), "E".parse().unwrap());
        assert_eq!(
            aliases.serialize_name(&"Edm.String".parse().unwrap()),
            "Edm.String"
        );
    }

    #[test]
    fn restriction_drops_undeclared_namespaces() {
        let aliases = AliasMap::new()
            .with_override("NS".parse().unwrap(), "A".parse().unwrap())
            .with_override("Other".parse().unwrap(), "O".parse().unwrap());
        let declared: Namespace = "NS".parse().unwrap();
        let restricted = aliases.restricted_to([&declared]);
        assert_eq!(restricted.serialize_name(&"NS.T".parse().unwrap()), "A.T");
        assert_eq!(restricted.serialize_name(&"Other.T".parse().unwrap()), "Other.T");
    }

    #[test]
    fn shared_alias_is_ambiguous() {
        let aliases = AliasMap::new()
            .with_override("One".parse().unwrap(), "A".parse().unwrap())
            .with_override("Two".parse().unwrap(), "B".parse().unwrap());
        assert_eq!(aliases.ambiguous_alias(), None);
        let aliases = aliases.with_override("Three".parse().unwrap(), "A".parse().unwrap());
        assert_eq!(aliases.ambiguous_alias(), Some(&"A".parse().unwrap()));
    }

    #[test]
    fn override_replaces_schema_alias() {
        let mut model = Model::new();
        model.add_schema("NS".parse().unwrap(), Some("A".parse().unwrap()));
        let aliases = AliasMap::from_model(&model).with_override("NS".parse().unwrap(), "B".parse().unwrap());
        assert_eq!(aliases.serialize_name(&"NS.T".parse().unwrap()), "B.T");
    }
}
