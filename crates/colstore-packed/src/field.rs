//! Field declarations for a packed store.

use std::collections::BTreeMap;

use colstore_types::{ElementType, MemberSpec};
use serde::{Deserialize, Serialize};

use crate::error::{PackedError, PackedResult};
use crate::store::PackedStore;

/// Default `log2` of the slots added per allocation (65536 entries).
pub const DEFAULT_LOG2_ALLOCATION: u32 = 16;

/// How a field's values are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// One column slot per entry.
    #[default]
    Dense,
    /// A 32-bit handle per entry into a shared value pool. Entries holding
    /// the default take no pool space.
    Sparse,
    /// A variable-length row of the element type per entry, pooled like a
    /// sparse field. Unset entries read as an empty row.
    List,
}

/// A declared field: its storage spec plus access mode.
///
/// Read-only fields can only be written when an entry is inserted. They are
/// laid out ahead of writable fields so that stable data stays clustered.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(flatten)]
    pub member: MemberSpec,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldSpec {
    /// A writable scalar field.
    pub fn new(element_type: ElementType) -> Self {
        Self::from(MemberSpec::new(element_type))
    }

    /// Mark the field read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Hold the field's values in a pool.
    pub fn sparse(mut self) -> Self {
        self.kind = FieldKind::Sparse;
        self
    }

    /// Hold a variable-length row per entry.
    pub fn list(mut self) -> Self {
        self.kind = FieldKind::List;
        self
    }
}

impl From<MemberSpec> for FieldSpec {
    fn from(member: MemberSpec) -> Self {
        Self {
            member,
            read_only: false,
            kind: FieldKind::Dense,
        }
    }
}

/// How often a field was read through entry views and written by inserts
/// and updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldUsage {
    pub reads: usize,
    pub writes: usize,
}

/// TOML-facing packed store configuration.
///
/// ```toml
/// log2_allocation = 10
///
/// [fields.ref]
/// type = "BIGINT"
/// read_only = true
///
/// [fields.count]
/// type = "INT"
/// default = 1
///
/// [fields.parent]
/// type = "BIGINT"
/// kind = "sparse"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedConfig {
    #[serde(default = "default_log2_allocation")]
    pub log2_allocation: u32,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
}

fn default_log2_allocation() -> u32 {
    DEFAULT_LOG2_ALLOCATION
}

impl Default for PackedConfig {
    fn default() -> Self {
        Self {
            log2_allocation: DEFAULT_LOG2_ALLOCATION,
            fields: BTreeMap::new(),
        }
    }
}

impl PackedConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(s: &str) -> PackedResult<Self> {
        toml::from_str(s).map_err(|e| PackedError::InvalidField {
            name: String::new(),
            reason: e.to_string(),
        })
    }

    /// Build an empty packed store.
    pub fn build(&self) -> PackedResult<PackedStore> {
        PackedStore::new(
            self.fields.iter().map(|(name, field)| (name.clone(), *field)),
            self.log2_allocation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colstore_types::Literal;

    #[test]
    fn builder() {
        let field = FieldSpec::new(ElementType::I64).read_only();
        assert!(field.read_only);
        assert_eq!(field.member.width, 1);
        assert!(!FieldSpec::new(ElementType::F32).read_only);
        assert_eq!(field.kind, FieldKind::Dense);
        assert_eq!(FieldSpec::new(ElementType::I64).sparse().kind, FieldKind::Sparse);
        assert_eq!(FieldSpec::new(ElementType::I32).list().kind, FieldKind::List);
    }

    #[test]
    fn parse_config() {
        let config = PackedConfig::from_toml_str(
            r#"
log2_allocation = 3

[fields.ref]
type = "BIGINT"
read_only = true

[fields.count]
type = "INT"
default = 1

[fields.pair]
type = "REAL"
width = 2

[fields.parent]
type = "BIGINT"
kind = "sparse"

[fields.inputs]
type = "INT"
kind = "list"
"#,
        )
        .unwrap();
        assert_eq!(config.log2_allocation, 3);
        assert_eq!(config.fields["ref"], FieldSpec::new(ElementType::I64).read_only());
        assert_eq!(
            config.fields["count"],
            FieldSpec::from(MemberSpec::new(ElementType::I32).with_default(Literal::Int(1)))
        );
        assert_eq!(
            config.fields["pair"],
            FieldSpec::from(MemberSpec::new(ElementType::F32).with_width(2))
        );
        assert_eq!(config.fields["parent"], FieldSpec::new(ElementType::I64).sparse());
        assert_eq!(config.fields["inputs"], FieldSpec::new(ElementType::I32).list());

        let store = config.build().unwrap();
        assert_eq!(store.read_only_fields().collect::<Vec<_>>(), vec!["ref"]);
        assert_eq!(store.segment_capacity(), 8);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = PackedConfig::from_toml_str("").unwrap();
        assert_eq!(config, PackedConfig::default());
        assert_eq!(config.build().unwrap().segment_capacity(), 1 << 16);
    }

    #[test]
    fn bad_config() {
        assert!(matches!(
            PackedConfig::from_toml_str("[fields.x]\ntype = \"VARCHAR\""),
            Err(PackedError::InvalidField { .. })
        ));
        assert!(matches!(
            PackedConfig::from_toml_str("[fields.x]\ntype = \"INT\"\nkind = \"ragged\""),
            Err(PackedError::InvalidField { .. })
        ));
    }
}
