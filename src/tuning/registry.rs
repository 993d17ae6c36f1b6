//! Profile & rule registry
//!
//! Read-only lookup from a variant key to a crack profile and a fragment
//! rule set. Unknown keys resolve to the "default" entry. The registry is
//! built once from configuration and passed around explicitly; there is no
//! global instance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_KEY, builtin_config};
use super::profile::{CrackProfile, GrowthRules};
use super::rules::FragmentRuleSet;
use crate::error::{ConfigError, ConfigResult};

/// Maps an asteroid variant onto a profile key and a rule-set key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantBinding {
    pub profile: String,
    pub rules: String,
}

/// Raw tables supplied by the configuration collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub profiles: BTreeMap<String, CrackProfile>,
    pub rules: BTreeMap<String, FragmentRuleSet>,
    pub variants: BTreeMap<String, VariantBinding>,
    pub growth: Option<GrowthRules>,
}

impl RegistryConfig {
    /// The shipped tables
    pub fn builtin() -> Self {
        builtin_config()
    }

    /// Parse a (possibly partial) JSON table document
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace entries in `self` with any entries `other` defines
    pub fn overlay(mut self, other: RegistryConfig) -> Self {
        self.profiles.extend(other.profiles);
        self.rules.extend(other.rules);
        self.variants.extend(other.variants);
        if other.growth.is_some() {
            self.growth = other.growth;
        }
        self
    }

    /// Check every table entry and cross-reference
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.profiles.contains_key(DEFAULT_KEY) {
            return Err(ConfigError::MissingDefault { table: "profiles" });
        }
        if !self.rules.contains_key(DEFAULT_KEY) {
            return Err(ConfigError::MissingDefault { table: "rules" });
        }

        for (key, profile) in &self.profiles {
            profile.validate(key)?;
        }
        for (key, rules) in &self.rules {
            rules.validate(key)?;
        }
        if let Some(growth) = &self.growth {
            growth.validate()?;
        }

        for (variant, binding) in &self.variants {
            if !self.profiles.contains_key(&binding.profile) {
                return Err(ConfigError::UnknownBinding {
                    variant: variant.clone(),
                    table: "profiles",
                    key: binding.profile.clone(),
                });
            }
            if !self.rules.contains_key(&binding.rules) {
                return Err(ConfigError::UnknownBinding {
                    variant: variant.clone(),
                    table: "rules",
                    key: binding.rules.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validated, immutable lookup tables
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: BTreeMap<String, CrackProfile>,
    rules: BTreeMap<String, FragmentRuleSet>,
    variants: BTreeMap<String, VariantBinding>,
    growth: GrowthRules,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// Registry over the shipped tables
    pub fn builtin() -> Self {
        let config = RegistryConfig::builtin();
        Self {
            profiles: config.profiles,
            rules: config.rules,
            variants: config.variants,
            growth: config.growth.unwrap_or_default(),
        }
    }

    /// Validate and freeze a complete table set
    pub fn from_config(config: RegistryConfig) -> ConfigResult<Self> {
        config.validate()?;
        log::debug!(
            "registry loaded: {} profiles, {} rule sets, {} variants",
            config.profiles.len(),
            config.rules.len(),
            config.variants.len()
        );
        Ok(Self {
            profiles: config.profiles,
            rules: config.rules,
            variants: config.variants,
            growth: config.growth.unwrap_or_default(),
        })
    }

    /// Built-in tables overridden by a JSON document
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let overrides = RegistryConfig::from_json(json)?;
        Self::from_config(RegistryConfig::builtin().overlay(overrides))
    }

    /// Key of the profile `key` resolves to
    pub fn profile_key<'a>(&'a self, key: &'a str) -> &'a str {
        if self.profiles.contains_key(key) {
            return key;
        }
        match self.variants.get(key) {
            Some(binding) if self.profiles.contains_key(&binding.profile) => binding.profile.as_str(),
            _ => {
                log::debug!("unknown crack profile \"{key}\", using default");
                DEFAULT_KEY
            }
        }
    }

    /// Key of the rule set `key` resolves to
    pub fn rules_key<'a>(&'a self, key: &'a str) -> &'a str {
        if self.rules.contains_key(key) {
            return key;
        }
        match self.variants.get(key) {
            Some(binding) if self.rules.contains_key(&binding.rules) => binding.rules.as_str(),
            _ => {
                log::debug!("unknown fragment rule set \"{key}\", using default");
                DEFAULT_KEY
            }
        }
    }

    /// Crack profile for a profile or variant key
    pub fn profile_for(&self, key: &str) -> &CrackProfile {
        let resolved = self.profile_key(key);
        self.profiles
            .get(resolved)
            .or_else(|| self.profiles.get(DEFAULT_KEY))
            .unwrap_or_else(|| fallback_profile())
    }

    /// Fragment rule set for a rule-set or variant key
    pub fn rules_for(&self, key: &str) -> &FragmentRuleSet {
        let resolved = self.rules_key(key);
        self.rules
            .get(resolved)
            .or_else(|| self.rules.get(DEFAULT_KEY))
            .unwrap_or_else(|| fallback_rules())
    }

    pub fn growth(&self) -> &GrowthRules {
        &self.growth
    }

    pub fn profile_keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn variants(&self) -> impl Iterator<Item = (&str, &VariantBinding)> {
        self.variants.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// Validation guarantees a default entry, so these only back the type system.
fn fallback_profile() -> &'static CrackProfile {
    static PROFILE: std::sync::OnceLock<CrackProfile> = std::sync::OnceLock::new();
    PROFILE.get_or_init(CrackProfile::default)
}

fn fallback_rules() -> &'static FragmentRuleSet {
    static RULES: std::sync::OnceLock<FragmentRuleSet> = std::sync::OnceLock::new();
    RULES.get_or_init(FragmentRuleSet::default)
}
