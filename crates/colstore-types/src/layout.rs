//! Ordered, validated member declarations shared by every store segment.
//!
//! Member names must be non-empty and must not contain whitespace or
//! control characters. Names are unique within a layout.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TypeError;
use crate::spec::MemberSpec;
use crate::value::Value;

/// One declared member with its resolved fill value.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberDef {
    /// Member name.
    pub name: Arc<str>,
    /// Declared spec.
    pub spec: MemberSpec,
    /// Scalar every element starts out as.
    pub fill: Value,
}

/// The member layout of a store, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    members: Vec<MemberDef>,
    positions: HashMap<Arc<str>, usize>,
}

/// Validate a member name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use colstore_types::layout::validate_member_name;
///
/// assert!(validate_member_name("fitness").is_ok());
/// assert!(validate_member_name("").is_err());
/// assert!(validate_member_name("two words").is_err());
/// ```
pub fn validate_member_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::InvalidMember {
            name: name.to_string(),
            reason: "member name must not be empty".into(),
        });
    }
    if let Some(ch) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(TypeError::InvalidMember {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }
    Ok(())
}

impl Layout {
    /// Build a layout from `(name, spec)` pairs, keeping their order.
    ///
    /// Fails on an invalid or duplicate name, or a malformed spec.
    pub fn new<I, S>(members: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = (S, MemberSpec)>,
        S: Into<String>,
    {
        let mut layout = Self::default();
        for (name, spec) in members {
            let name: String = name.into();
            validate_member_name(&name)?;
            let fill = spec.fill_value()?;
            let name: Arc<str> = Arc::from(name);
            if layout.positions.contains_key(&name) {
                return Err(TypeError::DuplicateMember(name.to_string()));
            }
            layout.positions.insert(Arc::clone(&name), layout.members.len());
            layout.members.push(MemberDef { name, spec, fill });
        }
        Ok(layout)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if no members are declared.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of `name` in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Returns `true` if `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// The member at `position`.
    pub fn member(&self, position: usize) -> Option<&MemberDef> {
        self.members.get(position)
    }

    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&MemberDef> {
        self.position(name).and_then(|pos| self.members.get(pos))
    }

    /// All members in declaration order.
    pub fn members(&self) -> &[MemberDef] {
        &self.members
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|m| &*m.name)
    }

    /// Bytes occupied by one index across all members.
    pub fn row_bytes(&self) -> usize {
        self.members.iter().map(|m| m.spec.slot_bytes()).sum()
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::value::Literal;

    fn xyz() -> Layout {
        Layout::new([
            ("x", MemberSpec::new(ElementType::I64)),
            ("y", MemberSpec::new(ElementType::F32).with_width(2)),
            ("z", MemberSpec::new(ElementType::Bool).with_default(Literal::Bool(true))),
        ])
        .unwrap()
    }

    #[test]
    fn keeps_declaration_order() {
        let layout = xyz();
        assert_eq!(layout.names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
        assert_eq!(layout.position("y"), Some(1));
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn resolves_fill_values() {
        let layout = xyz();
        assert_eq!(layout.get("x").unwrap().fill, Value::I64(0));
        assert_eq!(layout.get("z").unwrap().fill, Value::Bool(true));
        assert!(layout.get("missing").is_none());
    }

    #[test]
    fn row_bytes_sums_slots() {
        assert_eq!(xyz().row_bytes(), 8 + 8 + 1);
    }

    #[test]
    fn rejects_duplicates() {
        let err = Layout::new([
            ("a", MemberSpec::new(ElementType::I32)),
            ("a", MemberSpec::new(ElementType::I64)),
        ])
        .unwrap_err();
        assert_eq!(err, TypeError::DuplicateMember("a".into()));
    }

    #[test]
    fn rejects_bad_names() {
        assert!(Layout::new([("", MemberSpec::new(ElementType::I32))]).is_err());
        assert!(Layout::new([("a\tb", MemberSpec::new(ElementType::I32))]).is_err());
    }

    #[test]
    fn rejects_malformed_specs() {
        let err = Layout::new([("w", MemberSpec::new(ElementType::I32).with_width(0))]).unwrap_err();
        assert!(matches!(err, TypeError::InvalidSpec(_)));
    }

    #[test]
    fn empty_layout() {
        let layout = Layout::new(Vec::<(String, MemberSpec)>::new()).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.row_bytes(), 0);
    }
}
