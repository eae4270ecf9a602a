use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SqlType {
    Int,
    Text,
    Bool,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Int => "INT",
            SqlType::Text => "TEXT",
            SqlType::Bool => "BOOL",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the stored representation, used in scan error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Text(_) => "TEXT",
            Value::Bool(_) => "BOOL",
            Value::Null => "NULL",
        }
    }

    /// Decode the stored representation into the semantic type of a column,
    /// the way a driver decodes wire text into a typed value.
    ///
    /// `Null` passes through unchanged. Returns `None` when the stored value
    /// has no sensible reading as `ty`.
    pub fn coerce_to(&self, ty: SqlType) -> Option<Value> {
        match (self, ty) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Int(v), SqlType::Int) => Some(Value::Int(*v)),
            (Value::Int(v), SqlType::Text) => Some(Value::Text(v.to_string())),
            (Value::Int(0), SqlType::Bool) => Some(Value::Bool(false)),
            (Value::Int(1), SqlType::Bool) => Some(Value::Bool(true)),
            (Value::Int(_), SqlType::Bool) => None,
            (Value::Text(s), SqlType::Text) => Some(Value::Text(s.clone())),
            (Value::Text(s), SqlType::Int) => s.trim().parse().ok().map(Value::Int),
            (Value::Text(s), SqlType::Bool) => parse_bool(s).map(Value::Bool),
            (Value::Bool(b), SqlType::Bool) => Some(Value::Bool(*b)),
            (Value::Bool(b), SqlType::Int) => Some(Value::Int(i64::from(*b))),
            (Value::Bool(b), SqlType::Text) => Some(Value::Text(b.to_string())),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("NULL"),
        }
    }
}

macro_rules! int_from {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )+
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a (possibly coerced) column value into a Rust scan target.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|v| u64::try_from(v).ok())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Build a `Vec<Value>` from heterogeneous literals.
///
/// ```
/// use types::{values, Value};
///
/// let row = values![1, "Foobar", true];
/// assert_eq!(row, vec![Value::Int(1), Value::Text("Foobar".into()), Value::Bool(true)]);
/// ```
#[macro_export]
macro_rules! values {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($v)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_coerces_to_declared_type() {
        let t = Value::Text("true".into());
        assert_eq!(t.coerce_to(SqlType::Bool), Some(Value::Bool(true)));
        assert_eq!(
            Value::Text(" 42 ".into()).coerce_to(SqlType::Int),
            Some(Value::Int(42))
        );
        assert_eq!(Value::Text("nope".into()).coerce_to(SqlType::Bool), None);
    }

    #[test]
    fn int_to_bool_only_for_zero_and_one() {
        assert_eq!(Value::Int(1).coerce_to(SqlType::Bool), Some(Value::Bool(true)));
        assert_eq!(Value::Int(0).coerce_to(SqlType::Bool), Some(Value::Bool(false)));
        assert_eq!(Value::Int(7).coerce_to(SqlType::Bool), None);
    }

    #[test]
    fn null_survives_coercion() {
        for ty in [SqlType::Int, SqlType::Text, SqlType::Bool] {
            assert_eq!(Value::Null.coerce_to(ty), Some(Value::Null));
        }
    }

    #[test]
    fn option_scan_targets_accept_null() {
        assert_eq!(Option::<i64>::from_value(&Value::Null), Some(None));
        assert_eq!(Option::<i64>::from_value(&Value::Int(3)), Some(Some(3)));
        assert_eq!(i64::from_value(&Value::Null), None);
    }

    #[test]
    fn values_macro_converts_literals() {
        let none: Option<i64> = None;
        assert_eq!(
            values![2, 3, "x", none],
            vec![
                Value::Int(2),
                Value::Int(3),
                Value::Text("x".into()),
                Value::Null
            ]
        );
    }

    #[test]
    fn serde_roundtrip() {
        let v = Value::Text("Foobar".into());
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }

    proptest! {
        #[test]
        fn int_text_int_roundtrip(n in any::<i64>()) {
            let text = Value::Int(n).coerce_to(SqlType::Text).unwrap();
            prop_assert_eq!(text.coerce_to(SqlType::Int), Some(Value::Int(n)));
        }

        #[test]
        fn coercion_to_own_type_is_identity(b in any::<bool>(), s in "[a-z]{0,12}") {
            prop_assert_eq!(Value::Bool(b).coerce_to(SqlType::Bool), Some(Value::Bool(b)));
            prop_assert_eq!(
                Value::Text(s.clone()).coerce_to(SqlType::Text),
                Some(Value::Text(s))
            );
        }
    }
}
