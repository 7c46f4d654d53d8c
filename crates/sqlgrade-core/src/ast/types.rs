//! SQL data type definitions.
//!
//! Used for `CAST(x AS type)` and for the declared column types of sample
//! schemas, which arrive as free-form strings such as `varchar(50)`.

use std::fmt;

/// SQL data types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    // Integer types
    /// Small integer (2 bytes).
    Smallint,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    Bigint,

    // Floating point
    /// Real (4-byte float).
    Real,
    /// Double precision (8-byte float).
    Double,
    /// Decimal with precision and scale.
    Decimal {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },
    /// Numeric (alias for Decimal).
    Numeric {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },

    // String types
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),
    /// Text (variable length, no limit).
    Text,

    // Binary types
    /// Binary large object.
    Blob,

    // Date/time types
    /// Date.
    Date,
    /// Time.
    Time,
    /// Timestamp.
    Timestamp,
    /// DateTime (SQLite-style).
    Datetime,

    // Boolean
    /// Boolean.
    Boolean,

    /// Any other type name, kept as written.
    Custom(String),
}

/// SQLite column affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// INTEGER affinity.
    Integer,
    /// REAL affinity.
    Real,
    /// TEXT affinity.
    Text,
    /// BLOB affinity (no conversion).
    Blob,
    /// NUMERIC affinity.
    Numeric,
}

impl Affinity {
    /// Returns the type name that gives a column this affinity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Numeric => "NUMERIC",
        }
    }
}

impl DataType {
    /// Builds a data type from its name words and parenthesized arguments,
    /// e.g. `("decimal", [10, 2])`.
    #[must_use]
    pub fn from_parts(name: &str, args: &[u32]) -> Self {
        let upper = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        let first = args.first().copied();
        let precision = first.and_then(|p| u16::try_from(p).ok());
        let scale = args.get(1).and_then(|s| u16::try_from(*s).ok());

        match upper.as_str() {
            "SMALLINT" | "INT2" => Self::Smallint,
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" | "TINYINT" => Self::Integer,
            "BIGINT" | "INT8" => Self::Bigint,
            "REAL" | "FLOAT4" => Self::Real,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT" | "FLOAT8" => Self::Double,
            "DECIMAL" | "DEC" => Self::Decimal { precision, scale },
            "NUMERIC" => Self::Numeric { precision, scale },
            "CHAR" | "CHARACTER" => Self::Char(first),
            "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" => Self::Varchar(first),
            "TEXT" => Self::Text,
            "BLOB" => Self::Blob,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP" => Self::Timestamp,
            "DATETIME" => Self::Datetime,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            _ => Self::Custom(name.trim().to_string()),
        }
    }

    /// Parses a declared type such as `VARCHAR(50)` or `decimal(10, 2)`.
    ///
    /// Never fails: anything unrecognised becomes [`DataType::Custom`], whose
    /// affinity follows SQLite's name-matching rules.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let Some((name, rest)) = text.split_once('(') else {
            return Self::from_parts(text, &[]);
        };
        let inner = rest.trim_end().trim_end_matches(')');
        let args: Option<Vec<u32>> = inner
            .split(',')
            .map(|part| part.trim().parse::<u32>().ok())
            .collect();
        match args {
            Some(args) => Self::from_parts(name, &args),
            None => Self::Custom(text.trim().to_string()),
        }
    }

    /// Returns the SQLite affinity of a column declared with this type.
    #[must_use]
    pub fn sqlite_affinity(&self) -> Affinity {
        match self {
            Self::Smallint | Self::Integer | Self::Bigint => Affinity::Integer,
            Self::Real | Self::Double => Affinity::Real,
            Self::Char(_) | Self::Varchar(_) | Self::Text => Affinity::Text,
            Self::Blob => Affinity::Blob,
            Self::Decimal { .. }
            | Self::Numeric { .. }
            | Self::Date
            | Self::Time
            | Self::Timestamp
            | Self::Datetime
            | Self::Boolean => Affinity::Numeric,
            Self::Custom(name) => affinity_by_name(name),
        }
    }

    /// Returns the SQL representation of the data type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Smallint => String::from("SMALLINT"),
            Self::Integer => String::from("INTEGER"),
            Self::Bigint => String::from("BIGINT"),
            Self::Real => String::from("REAL"),
            Self::Double => String::from("DOUBLE"),
            Self::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => format!("DECIMAL({p}, {s})"),
                (Some(p), None) => format!("DECIMAL({p})"),
                _ => String::from("DECIMAL"),
            },
            Self::Numeric { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => format!("NUMERIC({p}, {s})"),
                (Some(p), None) => format!("NUMERIC({p})"),
                _ => String::from("NUMERIC"),
            },
            Self::Char(len) => len.map_or_else(|| String::from("CHAR"), |n| format!("CHAR({n})")),
            Self::Varchar(len) => {
                len.map_or_else(|| String::from("VARCHAR"), |n| format!("VARCHAR({n})"))
            }
            Self::Text => String::from("TEXT"),
            Self::Blob => String::from("BLOB"),
            Self::Date => String::from("DATE"),
            Self::Time => String::from("TIME"),
            Self::Timestamp => String::from("TIMESTAMP"),
            Self::Datetime => String::from("DATETIME"),
            Self::Boolean => String::from("BOOLEAN"),
            Self::Custom(name) => name.clone(),
        }
    }
}

/// SQLite's rules for an arbitrary declared type name, applied in order.
fn affinity_by_name(name: &str) -> Affinity {
    let upper = name.to_ascii_uppercase();
    if upper.is_empty() {
        Affinity::Blob
    } else if upper.contains("INT") {
        Affinity::Integer
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        Affinity::Text
    } else if upper.contains("BLOB") {
        Affinity::Blob
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        Affinity::Real
    } else {
        Affinity::Numeric
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
