use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::error::TypeError;
use crate::value::{Literal, Value};

/// Declaration of one named member of a store.
///
/// A member holds one slot per store index. With `width == 1` every slot is a
/// scalar of `element_type`; with a larger width every slot is a fixed-length
/// row of `width` scalars.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
    /// Element type of every scalar in the member.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Scalars per slot.
    #[serde(default = "default_width")]
    pub width: usize,
    /// Initial value of every scalar. The element type's zero when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
}

fn default_width() -> usize {
    1
}

impl MemberSpec {
    /// A scalar member of `element_type` filled with zero.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            width: 1,
            default: None,
        }
    }

    /// Set the number of scalars per slot.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set the fill value for unwritten scalars.
    pub fn with_default(mut self, default: Literal) -> Self {
        self.default = Some(default);
        self
    }

    /// Validate the spec and resolve the scalar fill value.
    pub fn fill_value(&self) -> Result<Value, TypeError> {
        if self.width == 0 {
            return Err(TypeError::InvalidSpec("width must be at least 1".into()));
        }
        match &self.default {
            Some(lit) => lit
                .to_value(self.element_type)
                .map_err(|e| TypeError::InvalidSpec(e.to_string())),
            None => Ok(self.element_type.zero()),
        }
    }

    /// The value an unwritten slot reads as: the fill scalar, or a row of it.
    pub fn slot_default(&self) -> Result<Value, TypeError> {
        let fill = self.fill_value()?;
        if self.width == 1 {
            Ok(fill)
        } else {
            Ok(Value::row_of(fill, self.width))
        }
    }

    /// Bytes occupied by one slot.
    pub fn slot_bytes(&self) -> usize {
        self.element_type.byte_size() * self.width
    }
}

impl From<ElementType> for MemberSpec {
    fn from(element_type: ElementType) -> Self {
        Self::new(element_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fill_by_default() {
        let spec = MemberSpec::new(ElementType::I32);
        assert_eq!(spec.fill_value().unwrap(), Value::I32(0));
        assert_eq!(spec.slot_default().unwrap(), Value::I32(0));
        assert_eq!(spec.slot_bytes(), 4);
    }

    #[test]
    fn custom_default_and_width() {
        let spec = MemberSpec::new(ElementType::F64)
            .with_width(3)
            .with_default(Literal::Float(-1.0));
        assert_eq!(spec.fill_value().unwrap(), Value::F64(-1.0));
        assert_eq!(spec.slot_default().unwrap(), Value::from(vec![-1.0f64; 3]));
        assert_eq!(spec.slot_bytes(), 24);
    }

    #[test]
    fn zero_width_is_malformed() {
        let spec = MemberSpec::new(ElementType::I64).with_width(0);
        assert!(matches!(spec.fill_value(), Err(TypeError::InvalidSpec(_))));
    }

    #[test]
    fn unrepresentable_default_is_malformed() {
        let spec = MemberSpec::new(ElementType::I16).with_default(Literal::Int(1 << 20));
        assert!(matches!(spec.fill_value(), Err(TypeError::InvalidSpec(_))));
    }

    #[test]
    fn deserialize_from_toml() {
        let spec: MemberSpec = toml::from_str("type = \"SMALLINT\"\nwidth = 2\ndefault = 7").unwrap();
        assert_eq!(spec.element_type, ElementType::I16);
        assert_eq!(spec.width, 2);
        assert_eq!(spec.default, Some(Literal::Int(7)));

        let minimal: MemberSpec = toml::from_str("type = \"f32\"").unwrap();
        assert_eq!(minimal, MemberSpec::new(ElementType::F32));
    }
}
