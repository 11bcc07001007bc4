//! Structural validation engine.
//!
//! A [`Validator`] is a compiled description of one field (string, number,
//! boolean) or an object of named children. Validation runs in one pass with
//! collect-all semantics: every violation across the tree is gathered before
//! the result is reported, never one at a time.
//!
//! Unlike a dynamically-inspected schema object, a validator exposes its
//! shape through [`Validator::describe`] so the compiler can read its type,
//! tag, label, and child keys without touching internals.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Value kinds a validator can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// UTF-8 string, the raw form of every environment variable
    String,
    /// JSON number, coerced from the raw string
    Number,
    /// Boolean, coerced case-insensitively from `true`/`false`
    Boolean,
    /// Object with an ordered list of named children
    Object,
}

/// Classification of a single validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field has no value
    Required,
    /// The value is not a string
    NotAString,
    /// The value could not be coerced to a number
    NotANumber,
    /// The value could not be coerced to a boolean
    NotABoolean,
    /// The value does not match the required pattern
    PatternMismatch,
    /// The value is outside the allowed set
    NotAllowed,
    /// The number is outside the declared range
    OutOfRange,
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// What went wrong
    pub kind: ViolationKind,
    /// The resolved, human-facing name of the field
    pub label: String,
    /// The full message, exactly as it appears in the combined error
    pub message: String,
}

/// Read-only description of a validator's declared shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description<'a> {
    /// Declared value kind
    pub kind: Kind,
    /// Explicit display label, if any
    pub label: Option<&'a str>,
    /// Explicit environment variable tag, if any
    pub tag: Option<&'a str>,
    /// Child field keys, in declaration order (empty for non-objects)
    pub keys: Vec<&'a str>,
}

/// A compiled validator for one field or one object of fields
#[derive(Debug, Clone)]
pub struct Validator {
    kind: Kind,
    required: bool,
    label: Option<String>,
    tag: Option<String>,
    trim: bool,
    empty_as_absent: bool,
    pattern: Option<Regex>,
    valid: Option<Vec<Value>>,
    default: Option<Value>,
    min: Option<f64>,
    max: Option<f64>,
    rule_message: Option<String>,
    children: Vec<(String, Validator)>,
}

impl Validator {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            required: false,
            label: None,
            tag: None,
            trim: false,
            empty_as_absent: false,
            pattern: None,
            valid: None,
            default: None,
            min: None,
            max: None,
            rule_message: None,
            children: Vec::new(),
        }
    }

    /// A string field
    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    /// A number field, coerced from the raw string
    pub fn number() -> Self {
        Self::new(Kind::Number)
    }

    /// A boolean field, coerced from the raw string
    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    /// An object of named children, validated in declaration order
    pub fn object<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        let mut validator = Self::new(Kind::Object);
        validator.children = children
            .into_iter()
            .map(|(key, child)| (key.into(), child))
            .collect();
        validator
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the display label used in violation messages
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name the environment variable to read, verbatim and exact-case
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Trim surrounding whitespace from the raw string before coercion
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Treat an empty raw string as if the variable were unset
    pub fn empty_as_absent(mut self) -> Self {
        self.empty_as_absent = true;
        self
    }

    /// Require string values to match a pattern
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
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

    /// Substitute this value when the variable is unset.
    ///
    /// Any JSON-safe scalar works, including `false`, `null`, and `""`. A
    /// default makes the field optional; it is used verbatim, bypassing
    /// coercion and constraints, and never when the variable is set.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    /// Require numbers to be at least `min`
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Require numbers to be at most `max`
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Override the range-violation message.
    ///
    /// The message is prefixed with the quoted field label, so
    /// `"must be between 1 and 100"` renders as
    /// `"PORT" must be between 1 and 100`.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.rule_message = Some(message.into());
        self
    }

    /// Describe the validator's declared shape
    pub fn describe(&self) -> Description<'_> {
        Description {
            kind: self.kind,
            label: self.label.as_deref(),
            tag: self.tag.as_deref(),
            keys: self.children.iter().map(|(key, _)| key.as_str()).collect(),
        }
    }

    pub(crate) const fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub(crate) fn children_mut(&mut self) -> std::slice::IterMut<'_, (String, Self)> {
        self.children.iter_mut()
    }

    /// Attach a label only if the validator does not already carry one.
    ///
    /// Explicit labels always win over resolved names.
    pub(crate) fn apply_label_if_unset(&mut self, label: &str) {
        if self.label.is_none() {
            self.label = Some(label.to_string());
        }
    }

    /// Validate a value bag against this validator, collecting every
    /// violation instead of stopping at the first.
    pub fn validate(&self, values: &Value) -> std::result::Result<Value, Vec<Violation>> {
        let mut violations = Vec::new();
        let checked = self.check(Some(values), "value", &mut violations);
        if violations.is_empty() {
            Ok(checked.unwrap_or(Value::Null))
        } else {
            tracing::debug!(count = violations.len(), "validation failed");
            Err(violations)
        }
    }

    /// Check one value; `key` is the fallback label when none is set.
    ///
    /// Returns the coerced value, or `None` when the field is absent or
    /// failed a check (the violation is already recorded).
    pub(crate) fn check(
        &self,
        value: Option<&Value>,
        key: &str,
        violations: &mut Vec<Violation>,
    ) -> Option<Value> {
        let label = self.label.as_deref().unwrap_or(key);

        if self.kind == Kind::Object {
            let empty = Map::new();
            let bag = match value {
                Some(Value::Object(map)) => map,
                _ => &empty,
            };
            let mut object = Map::new();
            for (child_key, child) in &self.children {
                if let Some(checked) = child.check(bag.get(child_key), child_key, violations) {
                    object.insert(child_key.clone(), checked);
                }
            }
            return Some(Value::Object(object));
        }

        let mut raw = match value {
            None | Some(Value::Null) => None,
            Some(present) => Some(present.clone()),
        };

        if self.trim {
            if let Some(Value::String(text)) = raw.as_mut() {
                *text = text.trim().to_string();
            }
        }
        if self.empty_as_absent
            && matches!(raw.as_ref(), Some(Value::String(text)) if text.is_empty())
        {
            raw = None;
        }

        let Some(raw) = raw else {
            if let Some(default) = &self.default {
                return Some(default.clone());
            }
            if self.required {
                violations.push(Violation {
                    kind: ViolationKind::Required,
                    label: label.to_string(),
                    message: format!("\"{label}\" is required"),
                });
            }
            return None;
        };

        let coerced = self.coerce(raw, label, violations)?;

        if let (Some(pattern), Value::String(text)) = (&self.pattern, &coerced) {
            if !pattern.is_match(text) {
                violations.push(Violation {
                    kind: ViolationKind::PatternMismatch,
                    label: label.to_string(),
                    message: format!(
                        "\"{label}\" with value \"{text}\" fails to match the required pattern: /{}/",
                        pattern.as_str()
                    ),
                });
                return None;
            }
        }

        if let Some(valid) = &self.valid {
            if !valid.contains(&coerced) {
                let allowed = valid.iter().map(display_value).collect::<Vec<_>>().join(", ");
                violations.push(Violation {
                    kind: ViolationKind::NotAllowed,
                    label: label.to_string(),
                    message: format!("\"{label}\" must be one of [{allowed}]"),
                });
                return None;
            }
        }

        if let Value::Number(number) = &coerced {
            if let Some(out_of_range) = number
                .as_f64()
                .and_then(|value| self.range_violation(value, label))
            {
                violations.push(out_of_range);
                return None;
            }
        }

        Some(coerced)
    }

    fn coerce(&self, raw: Value, label: &str, violations: &mut Vec<Violation>) -> Option<Value> {
        match self.kind {
            Kind::String => match raw {
                Value::String(text) => Some(Value::String(text)),
                _ => {
                    violations.push(Violation {
                        kind: ViolationKind::NotAString,
                        label: label.to_string(),
                        message: format!("\"{label}\" must be a string"),
                    });
                    None
                }
            },
            Kind::Number => {
                let number = match &raw {
                    Value::Number(number) => Some(number.clone()),
                    Value::String(text) => parse_number(text),
                    _ => None,
                };
                match number {
                    Some(number) => Some(Value::Number(number)),
                    None => {
                        violations.push(Violation {
                            kind: ViolationKind::NotANumber,
                            label: label.to_string(),
                            message: format!("\"{label}\" must be a number"),
                        });
                        None
                    }
                }
            }
            Kind::Boolean => {
                let boolean = match &raw {
                    Value::Bool(boolean) => Some(*boolean),
                    Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
                    Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
                    _ => None,
                };
                match boolean {
                    Some(boolean) => Some(Value::Bool(boolean)),
                    None => {
                        violations.push(Violation {
                            kind: ViolationKind::NotABoolean,
                            label: label.to_string(),
                            message: format!("\"{label}\" must be a boolean"),
                        });
                        None
                    }
                }
            }
            Kind::Object => None,
        }
    }

    fn range_violation(&self, value: f64, label: &str) -> Option<Violation> {
        let message = if self.min.is_some_and(|min| value < min) {
            match &self.rule_message {
                Some(rule) => format!("\"{label}\" {rule}"),
                None => format!(
                    "\"{label}\" must be greater than or equal to {}",
                    self.min.unwrap_or_default()
                ),
            }
        } else if self.max.is_some_and(|max| value > max) {
            match &self.rule_message {
                Some(rule) => format!("\"{label}\" {rule}"),
                None => format!(
                    "\"{label}\" must be less than or equal to {}",
                    self.max.unwrap_or_default()
                ),
            }
        } else {
            return None;
        };
        Some(Violation {
            kind: ViolationKind::OutOfRange,
            label: label.to_string(),
            message,
        })
    }
}

/// Parse an integral string to a JSON integer, anything else to a finite
/// float.
fn parse_number(text: &str) -> Option<Number> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Number::from(integer));
    }
    let float: f64 = text.parse().ok()?;
    if !float.is_finite() {
        return None;
    }
    Number::from_f64(float)
}

/// Render a value for the `must be one of [..]` list: strings bare, the
/// rest as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_field_without_value_violates() {
        let validator = Validator::string().required().label("FOO");
        let mut violations = Vec::new();

        let checked = validator.check(None, "foo", &mut violations);

        assert_eq!(checked, None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Required);
        assert_eq!(violations[0].message, "\"FOO\" is required");
    }

    #[test]
    fn optional_field_without_value_is_just_absent() {
        let validator = Validator::string().optional();
        let mut violations = Vec::new();

        assert_eq!(validator.check(None, "foo", &mut violations), None);
        assert!(violations.is_empty());
    }

    #[test]
    fn label_falls_back_to_the_key() {
        let validator = Validator::string().required();
        let mut violations = Vec::new();

        validator.check(None, "BAR", &mut violations);

        assert_eq!(violations[0].message, "\"BAR\" is required");
    }

    #[test]
    fn explicit_label_is_never_overwritten() {
        let mut validator = Validator::string().label("explicit");
        validator.apply_label_if_unset("resolved");

        assert_eq!(validator.describe().label, Some("explicit"));
    }

    #[test]
    fn number_coercion_keeps_integers_integral() {
        let validator = Validator::number();
        let mut violations = Vec::new();

        let checked = validator.check(Some(&json!("4242")), "n", &mut violations);

        assert_eq!(checked, Some(json!(4242)));
        assert!(violations.is_empty());
    }

    #[test]
    fn number_coercion_parses_floats() {
        let validator = Validator::number();
        let mut violations = Vec::new();

        let checked = validator.check(Some(&json!("13.37")), "n", &mut violations);

        assert_eq!(checked, Some(json!(13.37)));
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let validator = Validator::number().label("N");
        let mut violations = Vec::new();

        assert_eq!(validator.check(Some(&json!("abc")), "n", &mut violations), None);
        assert_eq!(violations[0].kind, ViolationKind::NotANumber);
        assert_eq!(violations[0].message, "\"N\" must be a number");
    }

    #[test]
    fn boolean_coercion_is_case_insensitive() {
        let validator = Validator::boolean();
        let mut violations = Vec::new();

        assert_eq!(
            validator.check(Some(&json!("FALSE")), "b", &mut violations),
            Some(json!(false))
        );
        assert_eq!(
            validator.check(Some(&json!("True")), "b", &mut violations),
            Some(json!(true))
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn pattern_mismatch_reports_value_and_pattern() {
        let validator = Validator::string()
            .pattern(Regex::new("^test$").unwrap())
            .label("Key");
        let mut violations = Vec::new();

        validator.check(Some(&json!("Test")), "Key", &mut violations);

        assert_eq!(violations[0].kind, ViolationKind::PatternMismatch);
        assert_eq!(
            violations[0].message,
            "\"Key\" with value \"Test\" fails to match the required pattern: /^test$/"
        );
    }

    #[test]
    fn membership_set_restricts_values() {
        let validator = Validator::string().valid(["dev", "prod"]).label("ENV");
        let mut violations = Vec::new();

        assert_eq!(
            validator.check(Some(&json!("dev")), "e", &mut violations),
            Some(json!("dev"))
        );
        assert_eq!(validator.check(Some(&json!("qa")), "e", &mut violations), None);
        assert_eq!(violations[0].message, "\"ENV\" must be one of [dev, prod]");
    }

    #[test]
    fn defaults_substitute_only_on_absence() {
        let validator = Validator::boolean().default_value(false);
        let mut violations = Vec::new();

        assert_eq!(validator.check(None, "b", &mut violations), Some(json!(false)));
        assert_eq!(
            validator.check(Some(&json!("true")), "b", &mut violations),
            Some(json!(true))
        );
    }

    #[test]
    fn null_and_empty_string_defaults_are_verbatim() {
        let mut violations = Vec::new();

        let null_default = Validator::string().default_value(Value::Null);
        assert_eq!(null_default.check(None, "x", &mut violations), Some(Value::Null));

        let empty_default = Validator::string().default_value("");
        assert_eq!(empty_default.check(None, "x", &mut violations), Some(json!("")));
    }

    #[test]
    fn present_empty_string_beats_the_default() {
        let validator = Validator::string().default_value("fallback");
        let mut violations = Vec::new();

        assert_eq!(
            validator.check(Some(&json!("")), "x", &mut violations),
            Some(json!(""))
        );
    }

    #[test]
    fn trim_applies_before_coercion() {
        let validator = Validator::number().trim();
        let mut violations = Vec::new();

        assert_eq!(
            validator.check(Some(&json!("  42  ")), "n", &mut violations),
            Some(json!(42))
        );
    }

    #[test]
    fn empty_as_absent_normalizes_empty_input() {
        let validator = Validator::string().optional().empty_as_absent();
        let mut violations = Vec::new();

        assert_eq!(validator.check(Some(&json!("")), "x", &mut violations), None);
        assert!(violations.is_empty());
    }

    #[test]
    fn object_collects_all_violations_in_order() {
        let validator = Validator::object([
            ("foo", Validator::string().required().label("FOO")),
            ("bar", Validator::string().required().label("BAR")),
        ]);

        let violations = validator.validate(&json!({})).unwrap_err();

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].label, "FOO");
        assert_eq!(violations[1].label, "BAR");
    }

    #[test]
    fn object_strips_undeclared_keys() {
        let validator = Validator::object([("foo", Validator::string().required())]);

        let value = validator
            .validate(&json!({"foo": "ok", "sneaky": "nope"}))
            .unwrap();

        assert_eq!(value, json!({"foo": "ok"}));
    }

    #[test]
    fn range_rule_uses_the_custom_message() {
        let validator = Validator::number()
            .min(1.0)
            .max(100.0)
            .message("must be between 1 and 100")
            .label("TEST");
        let mut violations = Vec::new();

        validator.check(Some(&json!("4242")), "n", &mut violations);

        assert_eq!(violations[0].kind, ViolationKind::OutOfRange);
        assert_eq!(violations[0].message, "\"TEST\" must be between 1 and 100");
    }

    #[test]
    fn describe_exposes_kind_tag_label_and_keys() {
        let validator = Validator::object([
            ("uname", Validator::string().tag("UNAME")),
            ("pass", Validator::string().tag("PASS")),
        ]);

        let description = validator.describe();
        assert_eq!(description.kind, Kind::Object);
        assert_eq!(description.keys, vec!["uname", "pass"]);

        let leaf = Validator::string().tag("TEST_ENV").label("shown");
        let description = leaf.describe();
        assert_eq!(description.tag, Some("TEST_ENV"));
        assert_eq!(description.label, Some("shown"));
    }
}
