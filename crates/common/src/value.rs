//! Runtime value representation.
//!
//! Values are what the actor carries, what tiles hold and what travels
//! through the inbox and outbox.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A single value: an integer or an uppercase letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// A letter in `A..=Z`.
    Char(char),
}

impl Value {
    /// Build a letter value, normalizing lowercase input to uppercase.
    pub fn letter(c: char) -> Result<Self, ValueError> {
        if c.is_ascii_alphabetic() {
            Ok(Value::Char(c.to_ascii_uppercase()))
        } else {
            Err(ValueError::NotALetter(c))
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Char(_) => None,
        }
    }

    /// Returns true for `Int(0)`. Letters are never zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Int(0))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Char(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for Value {
    type Err = ValueError;

    /// Parse `"12"`, `"-3"`, `"A"` or `"a"` (letters are uppercased).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return Value::letter(c);
            }
        }
        s.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ValueError::Invalid(s.to_string()))
    }
}

/// JSON shape of a value: a number or a one-letter string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Text(String),
}

impl TryFrom<RawValue> for Value {
    type Error = ValueError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw {
            RawValue::Int(n) => Ok(Value::Int(n)),
            RawValue::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::letter(c),
                    _ => Err(ValueError::Invalid(s)),
                }
            }
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(n) => RawValue::Int(n),
            Value::Char(c) => RawValue::Text(c.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integers() {
        assert_eq!("42".parse::<Value>(), Ok(Value::Int(42)));
        assert_eq!("-7".parse::<Value>(), Ok(Value::Int(-7)));
        assert_eq!(" 0 ".parse::<Value>(), Ok(Value::Int(0)));
    }

    #[test]
    fn parse_letters_uppercased() {
        assert_eq!("B".parse::<Value>(), Ok(Value::Char('B')));
        assert_eq!("z".parse::<Value>(), Ok(Value::Char('Z')));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(
            "AB".parse::<Value>(),
            Err(ValueError::Invalid("AB".to_string()))
        );
        assert_eq!("".parse::<Value>(), Err(ValueError::Invalid(String::new())));
        assert_eq!(
            "?".parse::<Value>(),
            Err(ValueError::Invalid("?".to_string()))
        );
    }

    #[test]
    fn letter_rejects_non_letters() {
        assert_eq!(Value::letter('3'), Err(ValueError::NotALetter('3')));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Char('Q').to_string(), "Q");
    }

    #[test]
    fn zero_check() {
        assert!(Value::Int(0).is_zero());
        assert!(!Value::Int(1).is_zero());
        assert!(!Value::Char('A').is_zero());
    }

    #[test]
    fn json_shapes() {
        let values: Vec<Value> = serde_json::from_str(r#"[3, "a", -1, "Z"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Int(3),
                Value::Char('A'),
                Value::Int(-1),
                Value::Char('Z')
            ]
        );
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[3,"A",-1,"Z"]"#
        );
    }

    #[test]
    fn json_rejects_long_strings() {
        assert!(serde_json::from_str::<Value>(r#""AB""#).is_err());
        assert!(serde_json::from_str::<Value>(r#""7""#).is_err());
    }
}
