use std::collections::BTreeMap;

use colstore_types::{Layout, MemberSpec};
use serde::{Deserialize, Serialize};

use crate::dynamic::{DynamicStore, DEFAULT_SEGMENT_CAPACITY};
use crate::error::{StoreError, StoreResult};
use crate::static_store::StaticStore;

/// Construction-time configuration for a store.
///
/// ```toml
/// capacity = 1024          # static stores
/// segment_capacity = 64    # dynamic stores
///
/// [members.fitness]
/// type = "DOUBLE PRECISION"
///
/// [members.code]
/// type = "i32"
/// width = 32
/// default = -1
/// ```
///
/// Members are laid out in name order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Slots per member of a static store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Slots per member in each segment of a dynamic store.
    #[serde(default = "default_segment_capacity")]
    pub segment_capacity: usize,
    /// Member declarations keyed by name.
    #[serde(default)]
    pub members: BTreeMap<String, MemberSpec>,
}

fn default_segment_capacity() -> usize {
    DEFAULT_SEGMENT_CAPACITY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            segment_capacity: DEFAULT_SEGMENT_CAPACITY,
            members: BTreeMap::new(),
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Configuration(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Configuration(e.to_string()))
    }

    /// Set the static capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the dynamic segment capacity.
    pub fn with_segment_capacity(mut self, segment_capacity: usize) -> Self {
        self.segment_capacity = segment_capacity;
        self
    }

    /// Declare a member.
    pub fn with_member(mut self, name: impl Into<String>, spec: MemberSpec) -> Self {
        self.members.insert(name.into(), spec);
        self
    }

    /// Validate the member declarations into a layout.
    pub fn layout(&self) -> StoreResult<Layout> {
        Ok(Layout::new(
            self.members.iter().map(|(name, spec)| (name.clone(), *spec)),
        )?)
    }

    /// Build a static store. Requires `capacity`.
    pub fn build_static(&self) -> StoreResult<StaticStore> {
        let capacity = self.capacity.ok_or_else(|| {
            StoreError::Configuration("static store requires `capacity`".into())
        })?;
        StaticStore::new(capacity, self.layout()?)
    }

    /// Build a dynamic store.
    pub fn build_dynamic(&self) -> StoreResult<DynamicStore> {
        DynamicStore::new(self.segment_capacity, self.layout()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MemberMut, Store};
    use colstore_types::{ElementType, Literal, Value};

    const SAMPLE: &str = r#"
capacity = 16
segment_capacity = 4

[members.fitness]
type = "DOUBLE PRECISION"

[members.code]
type = "i32"
width = 3
default = -1
"#;

    #[test]
    fn parse_sample() {
        let config = StoreConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.capacity, Some(16));
        assert_eq!(config.segment_capacity, 4);
        assert_eq!(config.members["fitness"], MemberSpec::new(ElementType::F64));
        assert_eq!(
            config.members["code"],
            MemberSpec::new(ElementType::I32)
                .with_width(3)
                .with_default(Literal::Int(-1))
        );
    }

    #[test]
    fn defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.segment_capacity, 2048);
    }

    #[test]
    fn build_both_variants() {
        let config = StoreConfig::from_toml_str(SAMPLE).unwrap();

        let sstore = config.build_static().unwrap();
        assert_eq!(sstore.capacity(), 16);
        assert_eq!(sstore.member_names(), vec!["code", "fitness"]);
        assert_eq!(
            sstore.member("code").unwrap().get(15).unwrap(),
            Value::from(vec![-1i32; 3])
        );

        let mut dstore = config.build_dynamic().unwrap();
        assert_eq!(dstore.segment_capacity(), 4);
        dstore.member_mut("fitness").unwrap().set(6, Value::F64(0.5)).unwrap();
        assert_eq!(dstore.segment_count(), 2);
    }

    #[test]
    fn static_requires_capacity() {
        let config = StoreConfig::default().with_member("x", MemberSpec::new(ElementType::I64));
        assert!(matches!(config.build_static(), Err(StoreError::Configuration(_))));
        assert!(config.with_capacity(8).build_static().is_ok());
    }

    #[test]
    fn invalid_configurations() {
        assert!(matches!(
            StoreConfig::from_toml_str("[members.x]\ntype = \"TEXT\""),
            Err(StoreError::Configuration(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("capacity = \"big\""),
            Err(StoreError::Configuration(_))
        ));
        let bad_default = StoreConfig::default()
            .with_capacity(4)
            .with_member("x", MemberSpec::new(ElementType::Bool).with_default(Literal::Int(3)));
        assert!(matches!(bad_default.build_static(), Err(StoreError::Configuration(_))));
        let zero = StoreConfig::default()
            .with_segment_capacity(0)
            .with_member("x", MemberSpec::new(ElementType::I64));
        assert!(matches!(zero.build_dynamic(), Err(StoreError::Configuration(_))));
    }

    #[test]
    fn oversized_capacity_is_an_error() {
        for width in [4, 1] {
            let config = StoreConfig::from_toml_str(&format!(
                "capacity = 4611686018427387904\n\n[members.x]\ntype = \"INT\"\nwidth = {width}\n"
            ))
            .unwrap();
            assert!(matches!(config.build_static(), Err(StoreError::Configuration(_))));
        }
    }

    #[test]
    fn toml_roundtrip() {
        let config = StoreConfig::from_toml_str(SAMPLE).unwrap();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(StoreConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
