//! Schema-to-validator compilation.
//!
//! Walks a [`Node`] tree against an environment snapshot and produces two
//! parallel artifacts: a [`Validator`] whose labels carry the resolved
//! environment variable names, and a value bag keyed by the schema's own
//! keys, ready for a single validation pass. Compilation only touches the
//! environment through the resolver.

use serde_json::{Map, Value};

use crate::error::{EnvError, Result};
use crate::resolve::{resolve_key, resolve_tagged};
use crate::schema::Node;
use crate::snapshot::EnvSnapshot;
use crate::validator::{Kind, Validator};

/// A compiled schema: the validator plus the exact value bag to feed it
pub(crate) struct Compiled {
    pub validator: Validator,
    pub values: Value,
}

/// Compile a schema root.
///
/// Leaf nodes that carry their own name are lifted into a single-key object
/// keyed by that name. A pattern leaf at the root has no key context to
/// infer a name from and fails immediately, before any validation.
pub(crate) fn compile(node: &Node, env: &EnvSnapshot) -> Result<Compiled> {
    match node {
        Node::Object(fields) => compile_object(fields, env),
        Node::Validator(root) => compile_validator_root(root, env),
        Node::Named(name) | Node::OptionalNamed(name) => {
            compile_object(&[(name.clone(), node.clone())], env)
        }
        Node::Descriptor(field) => compile_object(&[(field.env.clone(), node.clone())], env),
        Node::Pattern(_) => Err(EnvError::NameInference),
    }
}

fn compile_object(fields: &[(String, Node)], env: &EnvSnapshot) -> Result<Compiled> {
    let mut children = Vec::with_capacity(fields.len());
    let mut bag = Map::new();

    for (key, node) in fields {
        match node {
            Node::Named(name) => {
                children.push((key.clone(), Validator::string().required().label(name)));
                if let Some(value) = env.get(name) {
                    bag.insert(key.clone(), Value::String(value.to_string()));
                }
            }
            Node::OptionalNamed(name) => {
                children.push((
                    key.clone(),
                    Validator::string().optional().empty_as_absent().label(name),
                ));
                if let Some(value) = env.get(name) {
                    bag.insert(key.clone(), Value::String(value.to_string()));
                }
            }
            Node::Pattern(pattern) => {
                let binding = resolve_key(env, key);
                children.push((
                    key.clone(),
                    Validator::string()
                        .required()
                        .pattern(pattern.clone())
                        .label(&binding.name),
                ));
                if let Some(value) = binding.value {
                    bag.insert(key.clone(), Value::String(value));
                }
            }
            Node::Descriptor(field) => {
                children.push((key.clone(), field.to_validator()));
                // unset sources are omitted entirely so default/required
                // logic applies uniformly inside the validator
                if let Some(value) = env.get(&field.env) {
                    bag.insert(key.clone(), Value::String(value.to_string()));
                }
            }
            Node::Object(sub) => {
                let compiled = compile_object(sub, env)?;
                children.push((key.clone(), compiled.validator));
                bag.insert(key.clone(), compiled.values);
            }
            Node::Validator(validator) => {
                if validator.kind() == Kind::Object {
                    let (relabeled, values) = compile_validator_object(validator, env);
                    children.push((key.clone(), relabeled));
                    bag.insert(key.clone(), values);
                } else {
                    let binding = resolve_tagged(env, key, validator.tag_name());
                    tracing::debug!(key = %key, name = %binding.name, "bound validator leaf");
                    let mut child = validator.clone();
                    child.apply_label_if_unset(&binding.name);
                    children.push((key.clone(), child));
                    if let Some(value) = binding.value {
                        bag.insert(key.clone(), Value::String(value));
                    }
                }
            }
        }
    }

    Ok(Compiled {
        validator: Validator::object(children),
        values: Value::Object(bag),
    })
}

/// Relabel an object-shaped validator's children with their resolved names
/// and collect their raw values, recursing into object-typed children.
fn compile_validator_object(validator: &Validator, env: &EnvSnapshot) -> (Validator, Value) {
    let mut relabeled = validator.clone();
    let mut bag = Map::new();

    for (key, child) in relabeled.children_mut() {
        if child.kind() == Kind::Object {
            let (sub, values) = compile_validator_object(child, env);
            *child = sub;
            bag.insert(key.clone(), values);
        } else {
            let tag = child.tag_name().map(str::to_string);
            let binding = resolve_tagged(env, key, tag.as_deref());
            child.apply_label_if_unset(&binding.name);
            if let Some(value) = binding.value {
                bag.insert(key.clone(), Value::String(value));
            }
        }
    }

    (relabeled, Value::Object(bag))
}

/// Compile a validator sitting at the schema root.
///
/// A non-object root has no key context, so the name must come from its
/// tag; without one the schema is unusable and compilation fails with a
/// name-inference error, distinct from a missing value.
fn compile_validator_root(root: &Validator, env: &EnvSnapshot) -> Result<Compiled> {
    if root.kind() == Kind::Object {
        let (validator, values) = compile_validator_object(root, env);
        return Ok(Compiled { validator, values });
    }

    let Some(tag) = root.tag_name() else {
        return Err(EnvError::NameInference);
    };
    let name = tag.to_string();
    let mut leaf = root.clone();
    leaf.apply_label_if_unset(&name);

    let mut bag = Map::new();
    if let Some(value) = env.get(&name) {
        bag.insert(name.clone(), Value::String(value.to_string()));
    }

    Ok(Compiled {
        validator: Validator::object([(name, leaf)]),
        values: Value::Object(bag),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        pairs.iter().copied().collect()
    }

    #[test]
    fn named_leaf_reads_its_exact_name() {
        let env = env(&[("FOO", "foo")]);
        let schema = Node::object([("foo", "FOO")]);

        let compiled = compile(&schema, &env).unwrap();

        assert_eq!(compiled.values, json!({"foo": "foo"}));
    }

    #[test]
    fn unset_descriptor_source_is_omitted_from_the_bag() {
        let schema = Node::object([("foo", crate::schema::Field::new("FOO"))]);

        let compiled = compile(&schema, &EnvSnapshot::default()).unwrap();

        assert_eq!(compiled.values, json!({}));
    }

    #[test]
    fn unlabeled_validator_leaf_gets_the_resolved_name() {
        let env = env(&[("KEY", "upper")]);
        let schema = Node::object([("Key", Validator::string())]);

        let compiled = compile(&schema, &env).unwrap();
        let description = compiled.validator.describe();

        assert_eq!(description.keys, vec!["Key"]);
        assert_eq!(compiled.values, json!({"Key": "upper"}));
    }

    #[test]
    fn root_validator_without_a_tag_cannot_be_inferred() {
        let result = compile(&Node::from(Validator::string()), &EnvSnapshot::default());
        assert!(matches!(result, Err(EnvError::NameInference)));
    }

    #[test]
    fn root_validator_with_a_tag_wraps_into_an_object() {
        let env = env(&[("TEST_ROOT_OBJ", "toot")]);
        let schema = Node::from(Validator::string().required().tag("TEST_ROOT_OBJ"));

        let compiled = compile(&schema, &env).unwrap();

        assert_eq!(compiled.values, json!({"TEST_ROOT_OBJ": "toot"}));
        assert_eq!(compiled.validator.describe().keys, vec!["TEST_ROOT_OBJ"]);
    }

    #[test]
    fn root_pattern_has_no_key_context() {
        let pattern = regex::Regex::new("^x$").unwrap();
        let result = compile(&Node::Pattern(pattern), &EnvSnapshot::default());
        assert!(matches!(result, Err(EnvError::NameInference)));
    }
}
