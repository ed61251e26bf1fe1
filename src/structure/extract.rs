//! Endpoint extractor: request call sites to [`EndpointEntry`] values.

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::ports::oracle::{CallExpr, ClassDecl, Expr, MethodDecl, TypeOracle};
use crate::structure::resolve::Resolver;
use crate::structure::{EndpointEntry, StructureSnapshot, TypeNode};

/// Callee names recognized as network requests, matched case-insensitively.
pub const REQUEST_VERBS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options"];

/// Selects service classes by name.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl ClassFilter {
    /// Compiles include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Pattern`] if any pattern is not a valid
    /// regular expression.
    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self> {
        let compile = |patterns: &[S]| -> Result<Vec<Regex>> {
            patterns.iter().map(|p| Ok(Regex::new(p.as_ref())?)).collect()
        };
        Ok(Self { includes: compile(includes)?, excludes: compile(excludes)? })
    }

    /// A class is selected when it matches some include (or there are none)
    /// and no exclude.
    #[must_use]
    pub fn matches(&self, class: &str) -> bool {
        let included = self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(class));
        included && !self.excludes.iter().any(|re| re.is_match(class))
    }
}

/// Returns `true` if `name` is one of [`REQUEST_VERBS`].
#[must_use]
pub fn is_request_verb(name: &str) -> bool {
    REQUEST_VERBS.iter().any(|verb| verb.eq_ignore_ascii_case(name))
}

/// Extracts every request endpoint from the selected classes.
///
/// Call sites are visited class by class, method by method, in source
/// order; branches of `if` statements each contribute their own calls.
#[must_use]
pub fn extract(oracle: &dyn TypeOracle, filter: &ClassFilter) -> StructureSnapshot {
    let mut resolver = Resolver::new(oracle);
    let mut endpoints = Vec::new();

    for class in oracle.classes().iter().filter(|class| filter.matches(&class.name)) {
        for method in &class.methods {
            for call in method.call_sites() {
                let leaf = call.leaf();
                if !is_request_verb(leaf.callee.name()) {
                    continue;
                }
                let url = request_url(oracle, class, leaf);
                let body = response_body(oracle, &mut resolver, class, method, leaf);
                debug!(class = %class.name, method = %method.name, url = %url, "found request");
                endpoints.push(EndpointEntry::new(url, body));
            }
        }
    }

    StructureSnapshot::new(endpoints)
}

fn request_url(oracle: &dyn TypeOracle, class: &ClassDecl, call: &CallExpr) -> String {
    match call.args.first() {
        Some(Expr::String(url)) => url.clone(),
        Some(Expr::Path(segments)) if segments.len() >= 2 => {
            let (object, member) = segments.split_at(segments.len() - 1);
            oracle.string_initializer(&class.unit, object, &member[0]).unwrap_or_else(|| {
                debug!(class = %class.name, path = %segments.join("."), "url argument has no string initializer");
                String::new()
            })
        }
        _ => String::new(),
    }
}

fn response_body(
    oracle: &dyn TypeOracle,
    resolver: &mut Resolver<'_>,
    class: &ClassDecl,
    method: &MethodDecl,
    call: &CallExpr,
) -> TypeNode {
    // The calling method's own type parameters stay generic.
    let scope: Vec<String> = method.type_params.iter().map(|p| p.name.clone()).collect();
    let payload = match call.type_args.first() {
        Some(ty) => resolver.resolve(&class.unit, ty, &scope),
        None => TypeNode::Raw("any".to_string()),
    };

    let Some(container) = oracle.request_container(&class.unit, call) else {
        return payload;
    };
    match resolver.resolve(&container.unit, &container.ty, &container.scope) {
        TypeNode::Reference(mut entry) => {
            entry.fill(&payload);
            TypeNode::Reference(entry)
        }
        other => {
            debug!(container = %container.ty, resolved = ?other, "request container is not an object type");
            payload
        }
    }
}
