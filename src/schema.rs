//! Schema node types.
//!
//! A schema is a tree of [`Node`]s. Leaves name an environment variable in
//! one of several dialects; internal nodes map output keys to child schemas.
//! The string dialect carries a sentinel: a leading `?` marks the variable
//! as optional.

use regex::Regex;
use serde_json::Value;

use crate::validator::{Kind, Validator};

/// One node of a binding schema
#[derive(Debug, Clone)]
pub enum Node {
    /// A required string field read from the named variable
    Named(String),
    /// An optional string field read from the named variable; empty input
    /// is treated as absent
    OptionalNamed(String),
    /// A required string field whose name is inferred from the object key
    /// and whose value must match the pattern
    Pattern(Regex),
    /// A field with explicit options ([`Field`])
    Descriptor(Field),
    /// A nested mapping from output key to child schema, order-preserving
    Object(Vec<(String, Node)>),
    /// A compiled [`Validator`], possibly object-shaped with tagged children
    Validator(Validator),
}

impl Node {
    /// Build an object node from `(key, child)` pairs, preserving order
    pub fn object<K, N, I>(fields: I) -> Self
    where
        K: Into<String>,
        N: Into<Self>,
        I: IntoIterator<Item = (K, N)>,
    {
        Self::Object(
            fields
                .into_iter()
                .map(|(key, node)| (key.into(), node.into()))
                .collect(),
        )
    }
}

impl From<&str> for Node {
    /// Apply the string dialect: `"?NAME"` is optional, anything else is a
    /// required variable name.
    fn from(name: &str) -> Self {
        match name.strip_prefix('?') {
            Some(rest) => Self::OptionalNamed(rest.to_string()),
            None => Self::Named(name.to_string()),
        }
    }
}

impl From<String> for Node {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Regex> for Node {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Field> for Node {
    fn from(field: Field) -> Self {
        Self::Descriptor(field)
    }
}

impl From<Validator> for Node {
    fn from(validator: Validator) -> Self {
        Self::Validator(validator)
    }
}

/// A field descriptor with explicit options.
///
/// Fields are required strings by default; [`Field::optional`] or a
/// [`Field::default_value`] relaxes that, [`Field::number`] and
/// [`Field::boolean`] change the coercion, [`Field::trim`] strips
/// surrounding whitespace, and [`Field::valid`] restricts the value to a
/// membership set.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) env: String,
    pub(crate) kind: Kind,
    pub(crate) required: bool,
    pub(crate) trim: bool,
    pub(crate) default: Option<Value>,
    pub(crate) valid: Option<Vec<Value>>,
}

impl Field {
    /// A required string field sourced from `env`
    pub fn new(env: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            kind: Kind::String,
            required: true,
            trim: false,
            default: None,
            valid: None,
        }
    }

    /// Coerce the raw value to a number
    pub fn number(mut self) -> Self {
        self.kind = Kind::Number;
        self
    }

    /// Coerce the raw value to a boolean
    pub fn boolean(mut self) -> Self {
        self.kind = Kind::Boolean;
        self
    }

    /// Set whether the field is required (it is by default)
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Mark the field as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Trim surrounding whitespace before coercion (off by default)
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Substitute this value when the variable is unset.
    ///
    /// Implies the field is optional. `false`, `null`, and `""` are all
    /// honored verbatim.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    /// Restrict the coerced value to a membership set
    pub fn valid<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.valid = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Compile the descriptor to a validator labeled with its source name
    pub(crate) fn to_validator(&self) -> Validator {
        let mut validator = match self.kind {
            Kind::Number => Validator::number(),
            Kind::Boolean => Validator::boolean(),
            Kind::String | Kind::Object => Validator::string(),
        };
        if self.trim {
            validator = validator.trim();
        }
        if let Some(default) = &self.default {
            validator = validator.default_value(default.clone());
        }
        if let Some(valid) = &self.valid {
            validator = validator.valid(valid.iter().cloned());
        }
        validator = if self.required && self.default.is_none() {
            validator.required()
        } else {
            validator.optional()
        };
        validator.label(&self.env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_dialect_parses_the_optional_sentinel() {
        assert!(matches!(Node::from("FOO"), Node::Named(name) if name == "FOO"));
        assert!(matches!(Node::from("?FOO"), Node::OptionalNamed(name) if name == "FOO"));
    }

    #[test]
    fn object_preserves_declaration_order() {
        let node = Node::object([("foo", "FOO"), ("bar", "BAR"), ("baz", "BAZ")]);
        let Node::Object(fields) = node else {
            panic!("expected an object node");
        };
        let keys: Vec<&str> = fields.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn descriptor_defaults_make_the_field_optional() {
        let validator = Field::new("FOO").default_value(false).to_validator();
        let mut violations = Vec::new();

        let checked = validator.check(None, "foo", &mut violations);

        assert!(violations.is_empty());
        assert_eq!(checked, Some(serde_json::json!(false)));
    }

    #[test]
    fn descriptor_label_is_the_source_name() {
        let validator = Field::new("FOO").to_validator();
        assert_eq!(validator.describe().label, Some("FOO"));
    }
}
