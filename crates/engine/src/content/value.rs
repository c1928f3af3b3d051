use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::VariableRegistry;

/// A scripted value. The canonical form is the text; the integer and boolean
/// readings are derived from it once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawValue", into = "String")]
pub struct Value {
    text: String,
    int: i32,
    flag: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Bool(value) => Value::new(value.to_string()),
            RawValue::Int(value) => Value::new(value.to_string()),
            RawValue::Float(value) => Value::new(value.to_string()),
            RawValue::Text(value) => Value::new(value),
        }
    }
}

impl From<Value> for String {
    fn from(value: Value) -> Self {
        value.text
    }
}

impl Value {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let int = parse_int(&text);
        let flag = parse_bool(&text, int);
        Self { text, int, flag }
    }

    pub fn as_int(&self) -> i32 {
        self.int
    }

    pub fn as_bool(&self) -> bool {
        self.flag
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::new(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::new(value.to_string())
    }
}

fn parse_int(text: &str) -> i32 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i32>() {
        return value;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return value as i32;
        }
    }
    match trimmed {
        "true" => 1,
        _ => 0,
    }
}

fn parse_bool(text: &str, int: i32) -> bool {
    match text.trim() {
        "true" => true,
        "false" | "" => false,
        _ => int != 0,
    }
}

/// Either a literal or a reference to a declared variable, resolved each time
/// it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Expression {
    #[serde(rename = "value")]
    Literal { value: Value },
    Variable { name: String },
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    /// Unknown variables log and resolve to `None`; callers substitute the
    /// zero value of the reading they need.
    pub fn lookup<'v>(&'v self, variables: &'v VariableRegistry) -> Option<&'v Value> {
        match self {
            Self::Literal { value } => Some(value),
            Self::Variable { name } => match variables.get(name) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(variable = %name, "variable_not_found");
                    None
                }
            },
        }
    }

    pub fn as_int(&self, variables: &VariableRegistry) -> i32 {
        self.lookup(variables).map(Value::as_int).unwrap_or(0)
    }

    pub fn as_bool(&self, variables: &VariableRegistry) -> bool {
        self.lookup(variables).map(Value::as_bool).unwrap_or(false)
    }

    pub fn as_str<'v>(&'v self, variables: &'v VariableRegistry) -> &'v str {
        self.lookup(variables).map(Value::as_str).unwrap_or("")
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::literal(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> VariableRegistry {
        VariableRegistry::new([("coins", Value::from(12)), ("door_open", Value::from(true))])
            .expect("registry")
    }

    #[test]
    fn literal_text_derives_int_and_bool_readings() {
        let number = Value::new("42");
        assert_eq!(number.as_int(), 42);
        assert!(number.as_bool());
        assert_eq!(number.as_str(), "42");

        let yes = Value::new("true");
        assert_eq!(yes.as_int(), 1);
        assert!(yes.as_bool());

        let word = Value::new("hello");
        assert_eq!(word.as_int(), 0);
        assert!(!word.as_bool());

        let zero = Value::new("0");
        assert!(!zero.as_bool());
        assert!(!Value::default().as_bool());
    }

    #[test]
    fn padded_numbers_keep_their_spelling() {
        let padded = Value::new("05");
        assert_eq!(padded.as_int(), 5);
        assert_eq!(padded.as_str(), "05");
        assert_ne!(padded, Value::new("5"));
    }

    #[test]
    fn json_scalars_deserialize_to_canonical_text() {
        let values: Vec<Value> = serde_json::from_str(r#"[3, true, "abc", -1]"#).expect("values");
        let texts: Vec<&str> = values.iter().map(Value::as_str).collect();
        assert_eq!(texts, vec!["3", "true", "abc", "-1"]);
        assert_eq!(values[3].as_int(), -1);
    }

    #[test]
    fn variable_expression_reads_registry() {
        let variables = registry();
        let coins = Expression::variable("coins");
        assert_eq!(coins.as_int(&variables), 12);
        assert_eq!(coins.as_str(&variables), "12");
        assert!(Expression::variable("door_open").as_bool(&variables));
    }

    #[test]
    fn unknown_variable_resolves_to_zero_values() {
        let variables = registry();
        let missing = Expression::variable("nope");
        assert_eq!(missing.as_int(&variables), 0);
        assert!(!missing.as_bool(&variables));
        assert_eq!(missing.as_str(&variables), "");
    }

    #[test]
    fn tagged_expressions_deserialize() {
        let parsed: Vec<Expression> = serde_json::from_str(
            r#"[{"type":"value","value":7},{"type":"variable","name":"coins"}]"#,
        )
        .expect("expressions");
        assert_eq!(parsed[0], Expression::literal(7));
        assert_eq!(parsed[1], Expression::variable("coins"));
    }
}
