use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::value::Value;

/// The homogeneous element type of a column.
///
/// Serialized by its Rust-style name (`"i64"`). Parsing additionally accepts
/// the SQL spellings commonly used to describe record fields (`"BIGINT"`,
/// `"DOUBLE PRECISION"`, ...), case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    Bool,
    I16,
    I32,
    I64,
    U32,
    F32,
    F64,
}

impl ElementType {
    /// All element types, in declaration order.
    pub const ALL: [ElementType; 7] = [
        Self::Bool,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U32,
        Self::F32,
        Self::F64,
    ];

    /// Rust-style name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U32 => "u32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Size of one element in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::I16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
        }
    }

    /// The zero value: `false`, `0` or `0.0`.
    pub fn zero(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U32 => Value::U32(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
        }
    }

    /// Map a SQL type name to an element type.
    fn from_sql_name(name: &str) -> Option<Self> {
        let ty = match name {
            "BIGINT" | "BIGSERIAL" | "INT8" | "SERIAL8" => Self::I64,
            "INT" | "INTEGER" | "INT4" | "SERIAL" | "SERIAL4" => Self::I32,
            "SMALLINT" | "SMALLSERIAL" | "INT2" | "SERIAL2" => Self::I16,
            "BOOLEAN" => Self::Bool,
            "DOUBLE PRECISION" | "FLOAT8" => Self::F64,
            "REAL" | "FLOAT4" => Self::F32,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(ty) = Self::ALL
            .iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(trimmed))
        {
            return Ok(*ty);
        }
        // Collapse runs of whitespace so "double  precision" still matches.
        let normalized = trimmed
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        Self::from_sql_name(&normalized).ok_or_else(|| TypeError::UnknownElementType(s.to_string()))
    }
}

impl TryFrom<String> for ElementType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(ty: ElementType) -> Self {
        ty.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rust_names() {
        for ty in ElementType::ALL {
            assert_eq!(ty.name().parse::<ElementType>().unwrap(), ty);
        }
        assert_eq!("I64".parse::<ElementType>().unwrap(), ElementType::I64);
    }

    #[test]
    fn parse_sql_names() {
        assert_eq!("BIGINT".parse::<ElementType>().unwrap(), ElementType::I64);
        assert_eq!("integer".parse::<ElementType>().unwrap(), ElementType::I32);
        assert_eq!("SmallSerial".parse::<ElementType>().unwrap(), ElementType::I16);
        assert_eq!("BOOLEAN".parse::<ElementType>().unwrap(), ElementType::Bool);
        assert_eq!(
            "double   precision".parse::<ElementType>().unwrap(),
            ElementType::F64
        );
        assert_eq!("FLOAT4".parse::<ElementType>().unwrap(), ElementType::F32);
    }

    #[test]
    fn parse_unknown_name() {
        let err = "VARCHAR".parse::<ElementType>().unwrap_err();
        assert_eq!(err, TypeError::UnknownElementType("VARCHAR".into()));
    }

    #[test]
    fn zero_matches_type() {
        for ty in ElementType::ALL {
            assert_eq!(ty.zero().element_type(), Some(ty));
        }
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(ElementType::Bool.byte_size(), 1);
        assert_eq!(ElementType::I16.byte_size(), 2);
        assert_eq!(ElementType::U32.byte_size(), 4);
        assert_eq!(ElementType::F64.byte_size(), 8);
    }

    #[test]
    fn serde_uses_rust_name() {
        let json = serde_json::to_string(&ElementType::F32).unwrap();
        assert_eq!(json, "\"f32\"");
        let parsed: ElementType = serde_json::from_str("\"REAL\"").unwrap();
        assert_eq!(parsed, ElementType::F32);
        assert!(serde_json::from_str::<ElementType>("\"TEXT\"").is_err());
    }
}
