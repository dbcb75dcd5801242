//! Runtime values and the operations the interpreter performs on them.
//!
//! Operations report failures as [`OpError`] without a position; the
//! interpreter attaches the input name and the operator's position.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A number is either an exact 64 bit integer or a float.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl PartialEq for Number {
    /// Numeric equality across the int/float split, so `1 == 1.0`.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => f.write_str(itoa::Buffer::new().format(*i)),
            Number::Float(x) => {
                let s = x.to_string();

                if x.is_finite() && !s.contains('.') {
                    write!(f, "{}.0", s)
                } else {
                    f.write_str(&s)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Failure of a value operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    ZeroDivision(String),
}

/// An arithmetic operator, for dispatch and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }
}

impl Value {
    pub fn int(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }

    /// Name of the runtime type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Falsiness: null, false, zero, and empty strings, lists and maps.
    pub fn is_zero_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.is_zero(),
            Value::String(s) => s.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
        }
    }

    /// Structural equality; values of different types are never equal.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equals(vb))
            }
            _ => false,
        }
    }

    /// `self < other`, or `self <= other` with `or_eq`.
    pub fn sm(&self, other: &Value, or_eq: bool) -> Result<bool, OpError> {
        self.less(other, or_eq, if or_eq { "<=" } else { "<" })
    }

    /// `self > other`, or `self >= other` with `or_eq`, as the negation of
    /// the opposite [`sm`](Self::sm).
    pub fn gr(&self, other: &Value, or_eq: bool) -> Result<bool, OpError> {
        let op = if or_eq { ">=" } else { ">" };
        Ok(!self.less(other, !or_eq, op)?)
    }

    fn less(&self, other: &Value, or_eq: bool, op: &str) -> Result<bool, OpError> {
        match (self, other) {
            (Value::Number(Number::Int(a)), Value::Number(Number::Int(b))) => {
                Ok(if or_eq { a <= b } else { a < b })
            }
            (Value::Number(a), Value::Number(b)) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                Ok(if or_eq { a <= b } else { a < b })
            }
            (Value::String(a), Value::String(b)) => Ok(if or_eq { a <= b } else { a < b }),
            (Value::List(a), Value::List(b)) => {
                // first unequal pair decides, else the shorter list is smaller
                for (x, y) in a.iter().zip(b) {
                    if !x.equals(y) {
                        return x.less(y, false, op);
                    }
                }

                Ok(if or_eq {
                    a.len() <= b.len()
                } else {
                    a.len() < b.len()
                })
            }
            _ => Err(OpError::Type(format!(
                "'{}' not supported between types '{}' and '{}'",
                op,
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// Binary arithmetic. `+` also concatenates two strings.
    pub fn arith(&self, op: ArithOp, other: &Value) -> Result<Value, OpError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => arith_numbers(op, *a, *b).map(Value::Number),
            (Value::String(a), Value::String(b)) if op == ArithOp::Add => {
                let mut s = String::with_capacity(a.len() + b.len());
                s.push_str(a);
                s.push_str(b);
                Ok(Value::String(s))
            }
            _ => Err(OpError::Type(format!(
                "unsupported operand type(s) for {}: '{}' and '{}'",
                op.symbol(),
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// Unary `-`.
    pub fn negate(&self) -> Result<Value, OpError> {
        match self {
            Value::Number(Number::Int(i)) => Ok(Value::int(i.wrapping_neg())),
            Value::Number(Number::Float(f)) => Ok(Value::float(-f)),
            other => Err(bad_unary("-", other)),
        }
    }

    /// Unary `+`: identity on numbers.
    pub fn identity(&self) -> Result<Value, OpError> {
        match self {
            Value::Number(_) => Ok(self.clone()),
            other => Err(bad_unary("+", other)),
        }
    }

    /// `item in self`: list element, map key or substring.
    pub fn contains(&self, item: &Value) -> Result<bool, OpError> {
        match (self, item) {
            (Value::List(list), _) => Ok(list.iter().any(|v| v.equals(item))),
            (Value::Map(map), Value::String(key)) => Ok(map.contains_key(key)),
            (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
            (Value::Map(_), _) => Err(OpError::Type(format!(
                "'in <map>' requires string as left operand, not {}",
                item.type_name()
            ))),
            (Value::String(_), _) => Err(OpError::Type(format!(
                "'in <string>' requires string as left operand, not {}",
                item.type_name()
            ))),
            _ => Err(OpError::Type(format!(
                "argument of type '{}' is not iterable",
                self.type_name()
            ))),
        }
    }
}

fn bad_unary(op: &str, operand: &Value) -> OpError {
    OpError::Type(format!(
        "bad operand type for unary {}: '{}'",
        op,
        operand.type_name()
    ))
}

/// Integer arithmetic when both sides are integers, float otherwise.
fn arith_numbers(op: ArithOp, a: Number, b: Number) -> Result<Number, OpError> {
    if matches!(op, ArithOp::Div | ArithOp::Mod) && b.is_zero() {
        let msg = match (a, b) {
            (Number::Int(_), Number::Int(_)) => "int division by zero",
            _ => "float division by zero",
        };
        return Err(OpError::ZeroDivision(msg.to_owned()));
    }

    let n = match (a, b) {
        (Number::Int(x), Number::Int(y)) => Number::Int(match op {
            ArithOp::Add => x.wrapping_add(y),
            ArithOp::Sub => x.wrapping_sub(y),
            ArithOp::Mul => x.wrapping_mul(y),
            ArithOp::Div => x.wrapping_div(y),
            ArithOp::Mod => x.wrapping_rem(y),
        }),
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            Number::Float(match op {
                ArithOp::Add => x + y,
                ArithOp::Sub => x - y,
                ArithOp::Mul => x * y,
                ArithOp::Div => x / y,
                ArithOp::Mod => x % y,
            })
        }
    };

    Ok(n)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl fmt::Display for Value {
    /// Strings print raw at the top level and quoted inside containers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write_nested(f, other),
        }
    }
}

fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => write!(f, "{}", n),
        Value::String(s) => write_quoted(f, s),
        Value::List(list) => {
            f.write_str("[")?;
            for (i, v) in list.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_nested(f, v)?;
            }
            f.write_str("]")
        }
        Value::Map(map) => {
            f.write_str("{")?;
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_quoted(f, k)?;
                f.write_str(": ")?;
                write_nested(f, v)?;
            }
            f.write_str("}")
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_are_falsy() {
        for v in [
            Value::Null,
            Value::Bool(false),
            Value::int(0),
            Value::float(0.0),
            Value::from(""),
            Value::List(vec![]),
            Value::Map(BTreeMap::new()),
        ] {
            assert!(v.is_zero_value(), "{:?} should be a zero value", v);
        }

        assert!(!Value::from("x").is_zero_value());
        assert!(!Value::int(-1).is_zero_value());
    }

    #[test]
    fn equality_is_numeric_across_int_and_float() {
        assert!(Value::int(1).equals(&Value::float(1.0)));
        assert!(!Value::int(1).equals(&Value::from("1")));
        assert!(Value::from(vec![Value::int(1), Value::from("a")])
            .equals(&Value::from(vec![Value::float(1.0), Value::from("a")])));
    }

    #[test]
    fn greater_is_negated_smaller() {
        let (one, two) = (Value::int(1), Value::int(2));

        assert_eq!(two.gr(&one, false), Ok(true));
        assert_eq!(one.gr(&one, false), Ok(false));
        assert_eq!(one.gr(&one, true), Ok(true));
        assert_eq!(one.sm(&two, true), Ok(true));
    }

    #[test]
    fn lists_order_lexicographically() {
        let a = Value::from(vec![Value::int(1), Value::int(2)]);
        let b = Value::from(vec![Value::int(1), Value::int(3)]);
        let prefix = Value::from(vec![Value::int(1)]);

        assert_eq!(a.sm(&b, false), Ok(true));
        assert_eq!(prefix.sm(&a, false), Ok(true));
        assert_eq!(a.sm(&a, true), Ok(true));
        assert_eq!(a.sm(&a, false), Ok(false));
    }

    #[test]
    fn unordered_types_report_operator() {
        let err = Value::Bool(true).gr(&Value::int(1), false).unwrap_err();
        assert_eq!(
            err,
            OpError::Type("'>' not supported between types 'bool' and 'number'".into())
        );
    }

    #[test]
    fn integer_arithmetic_truncates_and_wraps() {
        let r = Value::int(-7).arith(ArithOp::Div, &Value::int(2)).unwrap();
        assert_eq!(r, Value::int(-3));

        let r = Value::int(-7).arith(ArithOp::Mod, &Value::int(2)).unwrap();
        assert_eq!(r, Value::int(-1));

        let r = Value::int(i64::MAX).arith(ArithOp::Add, &Value::int(1)).unwrap();
        assert_eq!(r, Value::int(i64::MIN));
    }

    #[test]
    fn float_modulo_is_fmod() {
        let r = Value::float(7.5).arith(ArithOp::Mod, &Value::int(2)).unwrap();
        assert_eq!(r, Value::float(1.5));
    }

    #[test]
    fn membership() {
        let list = Value::from(vec![Value::int(1), Value::from("a")]);
        assert_eq!(list.contains(&Value::float(1.0)), Ok(true));
        assert_eq!(list.contains(&Value::from("b")), Ok(false));

        let s = Value::from("hello");
        assert_eq!(s.contains(&Value::from("ell")), Ok(true));
        assert!(s.contains(&Value::int(1)).is_err());

        assert_eq!(
            Value::int(3).contains(&Value::int(3)),
            Err(OpError::Type("argument of type 'number' is not iterable".into()))
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::float(3.0).to_string(), "3.0");
        assert_eq!(Value::float(2.5).to_string(), "2.5");
        assert_eq!(Value::int(-12).to_string(), "-12");
        assert_eq!(Value::from("ab").to_string(), "ab");

        let list = Value::from(vec![Value::int(1), Value::int(4), Value::from("x")]);
        assert_eq!(list.to_string(), "[1, 4, 'x']");

        let mut map = BTreeMap::new();
        map.insert("k".to_owned(), Value::Null);
        assert_eq!(Value::Map(map).to_string(), "{'k': null}");
    }
}
