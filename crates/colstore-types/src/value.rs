use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::error::TypeError;

/// A single cell read from or written to a column.
///
/// Scalar variants mirror [`ElementType`]. Members declared with a width
/// greater than one hold a [`Value::Row`] of scalars per slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    U32(u32),
    F32(f32),
    F64(f64),
    Row(Vec<Value>),
}

impl Value {
    /// The element type of a scalar value, `None` for rows.
    pub fn element_type(&self) -> Option<ElementType> {
        let ty = match self {
            Self::Bool(_) => ElementType::Bool,
            Self::I16(_) => ElementType::I16,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
            Self::U32(_) => ElementType::U32,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
            Self::Row(_) => return None,
        };
        Some(ty)
    }

    /// Returns `true` for [`Value::Row`].
    pub fn is_row(&self) -> bool {
        matches!(self, Self::Row(_))
    }

    /// Build a row by repeating a scalar `width` times.
    pub fn row_of(scalar: Value, width: usize) -> Value {
        Self::Row(vec![scalar; width])
    }

    /// Check that this value can be stored in a slot of `element_type` and
    /// `width`.
    ///
    /// Width-1 slots take a bare scalar; wider slots take a row of exactly
    /// `width` scalars, all of `element_type`.
    pub fn check(&self, element_type: ElementType, width: usize) -> Result<(), TypeError> {
        match self {
            Self::Row(items) => {
                if width == 1 {
                    return Err(TypeError::Mismatch {
                        expected: element_type,
                        actual: format!("row of {}", items.len()),
                    });
                }
                if items.len() != width {
                    return Err(TypeError::WidthMismatch {
                        expected: width,
                        actual: items.len(),
                    });
                }
                items.iter().try_for_each(|item| item.check(element_type, 1))
            }
            scalar => {
                if width != 1 {
                    return Err(TypeError::WidthMismatch {
                        expected: width,
                        actual: 1,
                    });
                }
                match scalar.element_type() {
                    Some(ty) if ty == element_type => Ok(()),
                    _ => Err(TypeError::Mismatch {
                        expected: element_type,
                        actual: scalar.type_label(),
                    }),
                }
            }
        }
    }

    fn type_label(&self) -> String {
        match self.element_type() {
            Some(ty) => ty.to_string(),
            None => "row".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Row(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! scalar_conversions {
    ($($prim:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$prim> for Value {
                fn from(v: $prim) -> Self {
                    Self::$variant(v)
                }
            }

            impl TryFrom<Value> for $prim {
                type Error = TypeError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(TypeError::Mismatch {
                            expected: ElementType::$variant,
                            actual: other.type_label(),
                        }),
                    }
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    f32 => F32,
    f64 => F64,
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Row(items.into_iter().map(Into::into).collect())
    }
}

/// An untyped literal as written in configuration (`true`, `42`, `0.5`).
///
/// Literals are coerced into a [`Value`] once the target element type is
/// known.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Literal {
    /// Coerce into a scalar of `target`.
    ///
    /// Integers must fit the target range; floats are only accepted by the
    /// float types and booleans only by `bool`. Integers widen into floats.
    pub fn to_value(&self, target: ElementType) -> Result<Value, TypeError> {
        let out_of_range = || TypeError::OutOfRange {
            literal: self.to_string(),
            target,
        };
        let value = match (*self, target) {
            (Self::Bool(b), ElementType::Bool) => Value::Bool(b),
            (Self::Int(i), ElementType::I16) => Value::I16(i16::try_from(i).map_err(|_| out_of_range())?),
            (Self::Int(i), ElementType::I32) => Value::I32(i32::try_from(i).map_err(|_| out_of_range())?),
            (Self::Int(i), ElementType::I64) => Value::I64(i),
            (Self::Int(i), ElementType::U32) => Value::U32(u32::try_from(i).map_err(|_| out_of_range())?),
            (Self::Int(i), ElementType::F32) => Value::F32(i as f32),
            (Self::Int(i), ElementType::F64) => Value::F64(i as f64),
            (Self::Float(x), ElementType::F32) => Value::F32(x as f32),
            (Self::Float(x), ElementType::F64) => Value::F64(x),
            _ => return Err(out_of_range()),
        };
        Ok(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Conversions
    // -----------------------------------------------------------------------

    #[test]
    fn primitive_conversions() {
        assert_eq!(Value::from(7i64), Value::I64(7));
        assert_eq!(i64::try_from(Value::I64(7)).unwrap(), 7);
        assert!(bool::try_from(Value::Bool(true)).unwrap());
        assert!(i32::try_from(Value::I64(7)).is_err());
    }

    #[test]
    fn vec_becomes_row() {
        let row = Value::from(vec![1i32, 2, 3]);
        assert_eq!(row, Value::Row(vec![Value::I32(1), Value::I32(2), Value::I32(3)]));
        assert!(row.is_row());
        assert_eq!(row.element_type(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Value::I32(5).to_string(), "5");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "[1, 2]");
    }

    // -----------------------------------------------------------------------
    // Slot checks
    // -----------------------------------------------------------------------

    #[test]
    fn check_scalar() {
        assert!(Value::I64(1).check(ElementType::I64, 1).is_ok());
        let err = Value::I32(1).check(ElementType::I64, 1).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { expected: ElementType::I64, .. }));
    }

    #[test]
    fn check_row_width() {
        let row = Value::row_of(Value::F64(1.0), 4);
        assert!(row.check(ElementType::F64, 4).is_ok());
        assert_eq!(
            row.check(ElementType::F64, 3).unwrap_err(),
            TypeError::WidthMismatch { expected: 3, actual: 4 }
        );
        assert!(Value::F64(1.0).check(ElementType::F64, 4).is_err());
        assert!(row.check(ElementType::F64, 1).is_err());
    }

    #[test]
    fn check_row_element_types() {
        let mixed = Value::Row(vec![Value::I64(1), Value::I32(2)]);
        assert!(matches!(
            mixed.check(ElementType::I64, 2).unwrap_err(),
            TypeError::Mismatch { .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Literals
    // -----------------------------------------------------------------------

    #[test]
    fn literal_coercion() {
        assert_eq!(Literal::Int(3).to_value(ElementType::I16).unwrap(), Value::I16(3));
        assert_eq!(Literal::Int(3).to_value(ElementType::F64).unwrap(), Value::F64(3.0));
        assert_eq!(Literal::Float(0.5).to_value(ElementType::F32).unwrap(), Value::F32(0.5));
        assert_eq!(Literal::Bool(true).to_value(ElementType::Bool).unwrap(), Value::Bool(true));
    }

    #[test]
    fn literal_rejections() {
        assert!(Literal::Int(70_000).to_value(ElementType::I16).is_err());
        assert!(Literal::Int(-1).to_value(ElementType::U32).is_err());
        assert!(Literal::Float(1.5).to_value(ElementType::I64).is_err());
        assert!(Literal::Bool(false).to_value(ElementType::I32).is_err());
        assert!(Literal::Int(1).to_value(ElementType::Bool).is_err());
    }

    #[test]
    fn literal_untagged_serde() {
        let lits: Vec<Literal> = serde_json::from_str("[true, 12, 2.5]").unwrap();
        assert_eq!(lits, vec![Literal::Bool(true), Literal::Int(12), Literal::Float(2.5)]);
    }
}
