// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How enum fields may change between consecutive versions of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumEvolution {
    /// Any change is accepted; raw integers are carried unchanged.
    #[default]
    Permissive,
    /// A newer version may only append variants to a same-named enum field.
    AppendOnly,
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Enum evolution policy checked at build time
    pub enum_evolution: EnumEvolution,

    /// Upper bound on chain length; headers at or above it are corrupt
    pub max_versions: u32,

    /// Maximum depth of nested struct fields
    pub max_nesting_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enum_evolution: EnumEvolution::Permissive,
            max_versions: 65_536,
            max_nesting_depth: 32,
        }
    }
}

impl RegistryConfig {
    /// Create a new config builder
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    /// Load from a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_versions == 0 {
            return Err(ConfigError::Invalid("max_versions must be at least 1".into()));
        }
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_nesting_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct RegistryConfigBuilder {
    enum_evolution: Option<EnumEvolution>,
    max_versions: Option<u32>,
    max_nesting_depth: Option<usize>,
}

impl RegistryConfigBuilder {
    /// Set enum evolution policy
    pub fn enum_evolution(mut self, policy: EnumEvolution) -> Self {
        self.enum_evolution = Some(policy);
        self
    }

    /// Set maximum chain length
    pub fn max_versions(mut self, max: u32) -> Self {
        self.max_versions = Some(max);
        self
    }

    /// Set maximum nested struct depth
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = Some(depth);
        self
    }

    /// Build the configuration
    pub fn build(self) -> RegistryConfig {
        let defaults = RegistryConfig::default();

        RegistryConfig {
            enum_evolution: self.enum_evolution.unwrap_or(defaults.enum_evolution),
            max_versions: self.max_versions.unwrap_or(defaults.max_versions),
            max_nesting_depth: self
                .max_nesting_depth
                .unwrap_or(defaults.max_nesting_depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::builder()
            .enum_evolution(EnumEvolution::AppendOnly)
            .max_versions(16)
            .build();

        assert_eq!(config.enum_evolution, EnumEvolution::AppendOnly);
        assert_eq!(config.max_versions, 16);
        assert_eq!(config.max_nesting_depth, 32);
    }

    #[test]
    fn test_config_defaults() {
        let config = RegistryConfig::default();

        assert_eq!(config.enum_evolution, EnumEvolution::Permissive);
        assert_eq!(config.max_versions, 65_536);
        assert_eq!(config.max_nesting_depth, 32);
    }

    #[test]
    fn test_config_from_json() {
        let config = RegistryConfig::from_json(r#"{ "enum_evolution": "append_only" }"#)
            .expect("valid config");
        assert_eq!(config.enum_evolution, EnumEvolution::AppendOnly);
        assert_eq!(config.max_versions, 65_536);

        let round = RegistryConfig::from_json(&config.to_json().expect("serialize"))
            .expect("reparse");
        assert_eq!(round, config);
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        assert!(matches!(
            RegistryConfig::from_json(r#"{ "max_versions": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RegistryConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
