//! Type-graph resolver: declared types to canonical [`TypeNode`] trees.
//!
//! One [`Resolver`] lives for one extraction pass. Interfaces are memoized
//! by (declaring unit, name); a placeholder is installed before members are
//! resolved so that self-referential declarations terminate with
//! [`TypeNode::Recursive`] instead of unrolling forever.

use std::collections::HashMap;

use tracing::debug;

use crate::ports::oracle::{AliasDecl, Declaration, InterfaceDecl, MemberDecl, TypeExpr, TypeOracle, UnitId};
use crate::structure::{InterfaceEntry, Property, TypeNode, INDEX_KEY};

enum Slot {
    Pending,
    Done(TypeNode),
}

/// Resolves declared types through a [`TypeOracle`].
pub struct Resolver<'o> {
    oracle: &'o dyn TypeOracle,
    cache: HashMap<(UnitId, String), Slot>,
}

impl<'o> Resolver<'o> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new(oracle: &'o dyn TypeOracle) -> Self {
        Self { oracle, cache: HashMap::new() }
    }

    /// Resolves `ty` as written in `unit`.
    ///
    /// `scope` lists the type-parameter names visible at that position; a
    /// bare reference to one of them stays an unresolved
    /// [`TypeNode::Generic`] until a call site binds it. Never fails:
    /// names the oracle cannot find degrade to [`TypeNode::Raw`].
    pub fn resolve(&mut self, unit: &UnitId, ty: &TypeExpr, scope: &[String]) -> TypeNode {
        match ty {
            TypeExpr::Keyword(keyword) => match keyword.as_str() {
                "string" => TypeNode::String,
                "number" => TypeNode::Number,
                other => TypeNode::Raw(other.to_string()),
            },
            TypeExpr::Array(elem) => TypeNode::Array(Box::new(self.resolve(unit, elem, scope))),
            TypeExpr::Literal(literal) => TypeNode::Literal(literal.clone()),
            TypeExpr::Object(members) => {
                let mut entry = InterfaceEntry::default();
                for property in self.members(unit, members, scope) {
                    entry.upsert(property);
                }
                TypeNode::Reference(Box::new(entry))
            }
            TypeExpr::Other(text) => TypeNode::Raw(text.clone()),
            TypeExpr::Reference { name, args } => {
                self.resolve_reference(unit, ty, name, args, scope)
            }
        }
    }

    fn resolve_reference(
        &mut self,
        unit: &UnitId,
        ty: &TypeExpr,
        name: &str,
        args: &[TypeExpr],
        scope: &[String],
    ) -> TypeNode {
        if args.is_empty() && scope.iter().any(|g| g == name) {
            return TypeNode::Generic(name.to_string());
        }

        let Some(declaration) = self.oracle.declaration(unit, name) else {
            debug!(unit = %unit, reference = %ty, "unresolved type reference, keeping source text");
            return TypeNode::Raw(ty.to_string());
        };

        let node = match declaration {
            Declaration::Interface(decl) => self.interface(&decl),
            Declaration::Alias(decl) => self.alias(&decl),
            Declaration::Other { text } => return TypeNode::Raw(text),
        };

        if args.is_empty() {
            return node;
        }
        let bound: Vec<TypeNode> = args.iter().map(|arg| self.resolve(unit, arg, scope)).collect();
        match node {
            TypeNode::Reference(mut entry) => {
                entry.bind(&bound);
                TypeNode::Reference(entry)
            }
            other => other,
        }
    }

    fn interface(&mut self, decl: &InterfaceDecl) -> TypeNode {
        let key = (decl.unit.clone(), decl.name.clone());
        match self.cache.get(&key) {
            Some(Slot::Done(node)) => return node.clone(),
            Some(Slot::Pending) => return TypeNode::Recursive(decl.name.clone()),
            None => {}
        }
        self.cache.insert(key.clone(), Slot::Pending);

        let mut entry = InterfaceEntry::named(&decl.name);
        entry.generics.clone_from(&decl.generics);

        for parent in &decl.heritage {
            match self.resolve(&decl.unit, parent, &decl.generics) {
                TypeNode::Reference(parent_entry) => {
                    entry.extends.push(parent_entry.name.clone());
                    for property in parent_entry.properties {
                        entry.upsert(property);
                    }
                }
                other => {
                    debug!(interface = %decl.name, parent = %parent, resolved = ?other, "supertype is not an interface, skipping");
                }
            }
        }
        for property in self.members(&decl.unit, &decl.members, &decl.generics) {
            entry.upsert(property);
        }

        let node = TypeNode::Reference(Box::new(entry));
        self.settle(key, &node);
        node
    }

    fn alias(&mut self, decl: &AliasDecl) -> TypeNode {
        let key = (decl.unit.clone(), decl.name.clone());
        match self.cache.get(&key) {
            Some(Slot::Done(node)) => return node.clone(),
            Some(Slot::Pending) => return TypeNode::Recursive(decl.name.clone()),
            None => {}
        }
        self.cache.insert(key.clone(), Slot::Pending);

        let node = match self.resolve(&decl.unit, &decl.target, &decl.generics) {
            TypeNode::Reference(mut entry) if entry.name.is_empty() => {
                entry.name.clone_from(&decl.name);
                entry.generics.clone_from(&decl.generics);
                TypeNode::Reference(entry)
            }
            other => other,
        };
        self.settle(key, &node);
        node
    }

    /// Memoizes `node` unless it was cut short by a cycle. A cyclic tree is
    /// unrolled from whichever root was requested, so caching it would make
    /// the shape depend on resolution order.
    fn settle(&mut self, key: (UnitId, String), node: &TypeNode) {
        if is_cyclic(node) {
            self.cache.remove(&key);
        } else {
            self.cache.insert(key, Slot::Done(node.clone()));
        }
    }

    fn members(&mut self, unit: &UnitId, members: &[MemberDecl], scope: &[String]) -> Vec<Property> {
        members
            .iter()
            .map(|member| match member {
                MemberDecl::Property { name, ty: Some(ty) } => {
                    Property::new(name, self.resolve(unit, ty, scope))
                }
                MemberDecl::Property { name, ty: None } => {
                    Property::new(name, TypeNode::Raw(String::new()))
                }
                MemberDecl::Index { ty } => Property::new(
                    INDEX_KEY,
                    TypeNode::Indexable(Box::new(self.resolve(unit, ty, scope))),
                ),
            })
            .collect()
    }
}

fn is_cyclic(node: &TypeNode) -> bool {
    match node {
        TypeNode::Recursive(_) => true,
        TypeNode::Array(inner) | TypeNode::Indexable(inner) => is_cyclic(inner),
        TypeNode::Reference(entry) => entry.properties.iter().any(|p| is_cyclic(&p.ty)),
        TypeNode::String
        | TypeNode::Number
        | TypeNode::Literal(_)
        | TypeNode::Generic(_)
        | TypeNode::Raw(_) => false,
    }
}
