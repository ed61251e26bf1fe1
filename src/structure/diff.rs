//! Structural diff between two extraction passes.
//!
//! Shapes are compared by structure only: interface names, generic lists
//! and property order do not count, so renaming a type or reordering its
//! fields keeps the previously generated (and possibly hand-edited) mock.

use std::fmt::Write;

use crate::structure::{InterfaceEntry, StructureSnapshot, TypeNode};

/// URLs that differ between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureDiff {
    /// URLs present only in the current snapshot.
    pub added: Vec<String>,
    /// URLs present in both whose response shape changed.
    pub changed: Vec<String>,
    /// URLs present only in the previous snapshot.
    pub removed: Vec<String>,
}

impl StructureDiff {
    /// Returns `true` when nothing was added, changed or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// URLs whose mocks must be regenerated: added and changed, in the
    /// current snapshot's order. Removed URLs never appear here.
    #[must_use]
    pub fn regenerate(&self) -> Vec<String> {
        self.added.iter().chain(&self.changed).cloned().collect()
    }
}

/// Compares two snapshots.
#[must_use]
pub fn compare(previous: &StructureSnapshot, current: &StructureSnapshot) -> StructureDiff {
    let before = previous.by_url();
    let after = current.by_url();
    let mut diff = StructureDiff::default();

    for (url, body) in &after {
        match before.get(url) {
            None => diff.added.push((*url).to_string()),
            Some(old) if !same_shape(old, body) => diff.changed.push((*url).to_string()),
            Some(_) => {}
        }
    }
    diff.removed = before
        .keys()
        .filter(|url| !after.contains_key(*url))
        .map(|url| (*url).to_string())
        .collect();
    diff
}

/// The set of URLs whose shape is new or changed.
#[must_use]
pub fn diff(previous: &StructureSnapshot, current: &StructureSnapshot) -> Vec<String> {
    compare(previous, current).regenerate()
}

/// Deep structural equality of two type-trees.
#[must_use]
pub fn same_shape(a: &TypeNode, b: &TypeNode) -> bool {
    match (a, b) {
        (TypeNode::String, TypeNode::String) | (TypeNode::Number, TypeNode::Number) => true,
        (TypeNode::Array(a), TypeNode::Array(b)) | (TypeNode::Indexable(a), TypeNode::Indexable(b)) => {
            same_shape(a, b)
        }
        (TypeNode::Reference(a), TypeNode::Reference(b)) => same_entry(a, b),
        (TypeNode::Literal(a), TypeNode::Literal(b)) => a == b,
        (TypeNode::Generic(a), TypeNode::Generic(b))
        | (TypeNode::Raw(a), TypeNode::Raw(b))
        | (TypeNode::Recursive(a), TypeNode::Recursive(b)) => a == b,
        _ => false,
    }
}

fn same_entry(a: &InterfaceEntry, b: &InterfaceEntry) -> bool {
    a.properties.len() == b.properties.len()
        && a.properties.iter().all(|property| {
            b.property(&property.key).is_some_and(|other| same_shape(&property.ty, &other.ty))
        })
}

/// Formats a diff as a human-readable report.
#[must_use]
pub fn format_diff(diff: &StructureDiff) -> String {
    if diff.is_empty() {
        return "No endpoint changes.\n".to_string();
    }

    let mut out = String::new();
    for (label, urls) in [("Added", &diff.added), ("Changed", &diff.changed), ("Removed", &diff.removed)] {
        if urls.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{label} ({}):", urls.len());
        for url in urls {
            let shown = if url.is_empty() { "(empty url)" } else { url.as_str() };
            let _ = writeln!(out, "  {shown}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{EndpointEntry, Literal, Property};

    fn object(name: &str, properties: Vec<(&str, TypeNode)>) -> TypeNode {
        TypeNode::Reference(Box::new(InterfaceEntry {
            name: name.into(),
            generics: vec![],
            extends: vec![],
            properties: properties.into_iter().map(|(k, ty)| Property::new(k, ty)).collect(),
        }))
    }

    fn normal() -> TypeNode {
        object(
            "ResponseData",
            vec![
                ("code", TypeNode::Number),
                ("msg", TypeNode::String),
                ("data", object("MName", vec![("name", TypeNode::String)])),
            ],
        )
    }

    fn snapshot(entries: Vec<(&str, TypeNode)>) -> StructureSnapshot {
        StructureSnapshot::new(entries.into_iter().map(|(url, body)| EndpointEntry::new(url, body)).collect())
    }

    #[test]
    fn snapshot_against_itself_is_empty() {
        let s = snapshot(vec![
            ("/api/normal", normal()),
            ("/api/list", TypeNode::Array(Box::new(TypeNode::String))),
            ("/api/literal", TypeNode::Literal(Literal::Number(18.into()))),
        ]);
        assert!(diff(&s, &s).is_empty());
        assert!(compare(&s, &s).is_empty());
    }

    #[test]
    fn against_empty_reports_every_url() {
        let s = snapshot(vec![("/a", TypeNode::String), ("/b", normal())]);
        assert_eq!(diff(&StructureSnapshot::default(), &s), vec!["/a", "/b"]);
    }

    #[test]
    fn property_order_and_names_are_ignored() {
        let reordered = object(
            "Renamed",
            vec![
                ("data", object("Other", vec![("name", TypeNode::String)])),
                ("msg", TypeNode::String),
                ("code", TypeNode::Number),
            ],
        );
        assert!(same_shape(&normal(), &reordered));
    }

    #[test]
    fn nested_change_is_detected() {
        let changed = object(
            "ResponseData",
            vec![
                ("code", TypeNode::Number),
                ("msg", TypeNode::String),
                ("data", object("MName", vec![("name", TypeNode::Number)])),
            ],
        );
        let before = snapshot(vec![("/api/normal", normal())]);
        let after = snapshot(vec![("/api/normal", changed)]);
        let result = compare(&before, &after);
        assert_eq!(result.changed, vec!["/api/normal"]);
        assert!(result.added.is_empty());
    }

    #[test]
    fn extra_property_is_a_change() {
        let extended = object(
            "ResponseData",
            vec![
                ("code", TypeNode::Number),
                ("msg", TypeNode::String),
                ("data", object("MName", vec![("name", TypeNode::String)])),
                ("extra", TypeNode::String),
            ],
        );
        assert!(!same_shape(&normal(), &extended));
        assert!(!same_shape(&extended, &normal()));
    }

    #[test]
    fn removed_urls_are_listed_but_not_regenerated() {
        let before = snapshot(vec![("/old", TypeNode::String), ("/kept", TypeNode::String)]);
        let after = snapshot(vec![("/kept", TypeNode::String)]);
        let result = compare(&before, &after);
        assert_eq!(result.removed, vec!["/old"]);
        assert!(result.regenerate().is_empty());
    }

    #[test]
    fn literal_values_must_match() {
        assert!(!same_shape(
            &TypeNode::Literal(Literal::String("a".into())),
            &TypeNode::Literal(Literal::String("b".into()))
        ));
    }

    #[test]
    fn format_lists_sections() {
        let result = StructureDiff {
            added: vec!["/new".into()],
            changed: vec![],
            removed: vec![String::new()],
        };
        let text = format_diff(&result);
        assert!(text.contains("Added (1):\n  /new"));
        assert!(!text.contains("Changed"));
        assert!(text.contains("Removed (1):\n  (empty url)"));
        assert_eq!(format_diff(&StructureDiff::default()), "No endpoint changes.\n");
    }
}
