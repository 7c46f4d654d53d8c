//! Cell values read back from SQLite.

use std::fmt;

use serde::Serialize;

/// A cell value, typed by SQLite storage class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true for SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a number when it is one, or when it is text
    /// that reads as one (`'42'`, ` 4.50 `).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Self::Null | Self::Blob(_) => None,
        }
    }

    /// Returns the SQLite storage class name.
    #[must_use]
    pub const fn storage_class(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(text) => f.write_str(text),
            Self::Blob(bytes) => {
                f.write_str("X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Integer(3).as_number(), Some(3.0));
        assert_eq!(Value::Text(String::from(" 4.50 ")).as_number(), Some(4.5));
        assert_eq!(Value::Text(String::from("abc")).as_number(), None);
        assert_eq!(Value::Text(String::from("inf")).as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Blob(vec![0xAB, 0x01]).to_string(), "X'AB01'");
    }

    #[test]
    fn test_serialize_untagged() {
        let values = vec![
            Value::Null,
            Value::Integer(1),
            Value::Real(1.5),
            Value::Text(String::from("a")),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,1,1.5,"a"]"#
        );
    }
}
