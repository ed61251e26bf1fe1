//! Mock value synthesizer.

use serde_json::{Map, Value};

use crate::ports::Faker;
use crate::structure::TypeNode;

/// Produces a JSON value shaped like `node`.
///
/// Scalars come from `faker`; literals are served verbatim; arrays always
/// hold exactly one sample element. Raw fallback text is passed through
/// with quote characters removed, and a recursive back-reference becomes
/// `null`.
#[must_use]
pub fn synthesize(node: &TypeNode, faker: &dyn Faker) -> Value {
    match node {
        TypeNode::String => Value::String(faker.word()),
        TypeNode::Number => Value::from(faker.number()),
        TypeNode::Array(inner) => Value::Array(vec![synthesize(inner, faker)]),
        TypeNode::Reference(entry) => {
            let object: Map<String, Value> = entry
                .properties
                .iter()
                .map(|property| (property.key.clone(), synthesize(&property.ty, faker)))
                .collect();
            Value::Object(object)
        }
        TypeNode::Literal(literal) => literal.to_value(),
        TypeNode::Indexable(inner) => synthesize(inner, faker),
        TypeNode::Generic(name) => Value::String(name.clone()),
        TypeNode::Raw(text) => Value::String(text.replace(['"', '\''], "")),
        TypeNode::Recursive(_) => Value::Null,
    }
}
