//! Model construction configuration.

use serde::{Deserialize, Serialize};

/// Name of the schema that records without a schema name are routed to.
pub const DEFAULT_SCHEMA_NAME: &str = "public";

/// When enum-to-field binding runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumBindingPolicy {
    /// Bind each enum when it is pushed into its schema, against the tables
    /// that exist at that moment. Fields created later stay unbound.
    #[default]
    OnEnumInsert,
    /// Bind every enum in one pass after the whole pipeline has run.
    AfterConstruction,
}

/// Configuration for building a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Schema used for records that name no schema.
    pub default_schema_name: String,

    /// First identifier issued for every entity kind.
    pub id_base: u32,

    /// When enum binding runs.
    pub enum_binding: EnumBindingPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_schema_name: DEFAULT_SCHEMA_NAME.to_string(),
            id_base: 1,
            enum_binding: EnumBindingPolicy::OnEnumInsert,
        }
    }
}

impl ModelConfig {
    /// Set the default schema name.
    pub fn with_default_schema_name(mut self, name: impl Into<String>) -> Self {
        self.default_schema_name = name.into();
        self
    }

    /// Set the identifier base.
    pub fn with_id_base(mut self, base: u32) -> Self {
        self.id_base = base;
        self
    }

    /// Set the enum binding policy.
    pub fn with_enum_binding(mut self, policy: EnumBindingPolicy) -> Self {
        self.enum_binding = policy;
        self
    }

    /// Note given to the default schema when it is created implicitly,
    /// e.g. `Default Public Schema`.
    pub fn default_schema_note(&self) -> String {
        let mut chars = self.default_schema_name.chars();
        let capitalized = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        };
        format!("Default {} Schema", capitalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.default_schema_name, "public");
        assert_eq!(config.id_base, 1);
        assert_eq!(config.enum_binding, EnumBindingPolicy::OnEnumInsert);
        assert_eq!(config.default_schema_note(), "Default Public Schema");
    }

    #[test]
    fn test_builder() {
        let config = ModelConfig::default()
            .with_default_schema_name("DBO")
            .with_id_base(10)
            .with_enum_binding(EnumBindingPolicy::AfterConstruction);

        assert_eq!(config.default_schema_note(), "Default Dbo Schema");
        assert_eq!(config.id_base, 10);
        assert_eq!(config.enum_binding, EnumBindingPolicy::AfterConstruction);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"enum_binding": "after_construction"}"#).unwrap();
        assert_eq!(config.default_schema_name, "public");
        assert_eq!(config.enum_binding, EnumBindingPolicy::AfterConstruction);
    }
}
