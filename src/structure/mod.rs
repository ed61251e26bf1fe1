//! Response structure model: canonical type-trees per endpoint.
//!
//! The resolver turns declared types into [`TypeNode`] trees, the extractor
//! pairs each with a request URL as an [`EndpointEntry`], and a
//! [`StructureSnapshot`] is the unit of comparison and persistence.

pub mod diff;
pub mod extract;
pub mod resolve;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved property key for index-signature members.
///
/// Not a valid identifier, so it never clashes with a declared field.
pub const INDEX_KEY: &str = "[index]";

/// A literal type's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `'text'`.
    String(String),
    /// `18`, `-1.5`.
    Number(serde_json::Number),
}

impl Literal {
    /// The literal as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
        }
    }
}

/// A resolved type.
///
/// Closed set: every consumer matches all variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum TypeNode {
    /// `string`.
    String,
    /// `number`.
    Number,
    /// Array of the inner element type.
    Array(Box<TypeNode>),
    /// A nested interface or object type.
    Reference(Box<InterfaceEntry>),
    /// A literal type, served verbatim.
    Literal(Literal),
    /// Value type of an index signature; lives under [`INDEX_KEY`].
    Indexable(Box<TypeNode>),
    /// A type parameter no call site supplied a type for.
    Generic(String),
    /// Source text of a type the resolver could not model.
    Raw(String),
    /// Back-reference to an interface still being resolved.
    Recursive(String),
}

/// One member of an [`InterfaceEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Field name, or [`INDEX_KEY`].
    pub key: String,
    /// Resolved type of the field.
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

impl Property {
    /// Creates a property.
    pub fn new(key: impl Into<String>, ty: TypeNode) -> Self {
        Self { key: key.into(), ty }
    }
}

/// Canonical form of a declared interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceEntry {
    /// Declared name; empty for inline object types.
    pub name: String,
    /// Type-parameter names in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    /// Names of merged supertypes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    /// Properties in declaration order, inherited ones first.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl InterfaceEntry {
    /// Creates an empty entry with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Inserts `property`, replacing an existing one with the same key in
    /// place so that earlier positions are kept.
    pub fn upsert(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }

    /// Binds type arguments to this entry's generics.
    ///
    /// Only properties whose declared type is exactly one of the entry's
    /// own type parameters are replaced. Missing arguments leave the
    /// parameter unresolved.
    pub fn bind(&mut self, args: &[TypeNode]) {
        let generics = &self.generics;
        let argument = |name: &str| {
            generics.iter().position(|g| g == name).and_then(|i| args.get(i)).cloned()
        };
        for property in &mut self.properties {
            match &mut property.ty {
                TypeNode::Generic(name) => {
                    if let Some(bound) = argument(name) {
                        property.ty = bound;
                    }
                }
                TypeNode::Indexable(inner) => {
                    if let TypeNode::Generic(name) = inner.as_ref() {
                        if let Some(bound) = argument(name) {
                            **inner = bound;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Replaces every property still typed as an unresolved generic with
    /// `payload`, whatever the parameter is called.
    pub fn fill(&mut self, payload: &TypeNode) {
        for property in &mut self.properties {
            match &mut property.ty {
                TypeNode::Generic(_) => property.ty = payload.clone(),
                TypeNode::Indexable(inner) if matches!(inner.as_ref(), TypeNode::Generic(_)) => {
                    **inner = payload.clone();
                }
                _ => {}
            }
        }
    }
}

/// A recognized network call and the shape it responds with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointEntry {
    /// Request URL; endpoint identity.
    pub url: String,
    /// Resolved response type-tree.
    pub response_body: TypeNode,
}

impl EndpointEntry {
    /// Creates an endpoint entry.
    pub fn new(url: impl Into<String>, response_body: TypeNode) -> Self {
        Self { url: url.into(), response_body }
    }
}

/// All endpoints found by one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureSnapshot {
    /// Endpoints in discovery order.
    pub endpoints: Vec<EndpointEntry>,
}

impl StructureSnapshot {
    /// Wraps a list of endpoints.
    #[must_use]
    pub fn new(endpoints: Vec<EndpointEntry>) -> Self {
        Self { endpoints }
    }

    /// url → response body. Later entries win on duplicate URLs.
    #[must_use]
    pub fn by_url(&self) -> IndexMap<&str, &TypeNode> {
        self.endpoints.iter().map(|e| (e.url.as_str(), &e.response_body)).collect()
    }

    /// Number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns `true` when no endpoint was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Merges `current` over `self`: current bodies replace previous ones,
    /// new URLs are appended, URLs absent from `current` are kept.
    #[must_use]
    pub fn merged(&self, current: &StructureSnapshot) -> StructureSnapshot {
        let mut merged: IndexMap<String, TypeNode> = self
            .endpoints
            .iter()
            .map(|e| (e.url.clone(), e.response_body.clone()))
            .collect();
        for endpoint in &current.endpoints {
            merged.insert(endpoint.url.clone(), endpoint.response_body.clone());
        }
        StructureSnapshot::new(
            merged.into_iter().map(|(url, body)| EndpointEntry::new(url, body)).collect(),
        )
    }
}
