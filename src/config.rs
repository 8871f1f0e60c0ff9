//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/settree/settree.toml`
//! 3. Local config: `--config <path>`, else `./.settree.toml`
//! 4. Environment variables: `SETTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::DEFAULT_TAB_WIDTH;

/// Which child policy trees loaded from outlines use.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    Unrestricted,
    Unique,
}

/// How two node values are compared when trees are matched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ValueMatching {
    #[default]
    Exact,
    CaseInsensitive,
}

impl ValueMatching {
    pub fn matches(self, left: &str, right: &str) -> bool {
        match self {
            ValueMatching::Exact => left == right,
            ValueMatching::CaseInsensitive => left.to_lowercase() == right.to_lowercase(),
        }
    }
}

/// Which side's value a union node keeps.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    #[default]
    Left,
    Right,
}

impl MergeStrategy {
    pub fn apply(self, left: &str, right: &str) -> String {
        match self {
            MergeStrategy::Left => left.to_string(),
            MergeStrategy::Right => right.to_string(),
        }
    }
}

/// When a matched node with nothing left below it is removed by a difference.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionRule {
    #[default]
    Always,
    /// Only when both values are exactly equal, so case-insensitive matches survive.
    Equal,
}

impl DeletionRule {
    pub fn deletes(self, left: &str, right: &str) -> bool {
        match self {
            DeletionRule::Always => true,
            DeletionRule::Equal => left == right,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub policy: Option<PolicyKind>,
    pub matching: Option<ValueMatching>,
    pub merge: Option<MergeStrategy>,
    pub deletion: Option<DeletionRule>,
    pub tab_width: Option<usize>,
    pub color: Option<bool>,
}

/// Unified configuration for settree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Child policy of loaded trees
    pub policy: PolicyKind,
    /// Node matching for union, intersection, difference and similarity
    pub matching: ValueMatching,
    /// Value kept by union
    pub merge: MergeStrategy,
    /// Deletion rule of difference
    pub deletion: DeletionRule,
    /// Columns a tab counts for in outlines
    pub tab_width: usize,
    /// Colored terminal output
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            matching: ValueMatching::default(),
            merge: MergeStrategy::default(),
            deletion: DeletionRule::default(),
            tab_width: DEFAULT_TAB_WIDTH,
            color: true,
        }
    }
}

/// Get the XDG config directory for settree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "settree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("settree.toml"))
}

/// Local config file looked up in `dir` when no `--config` is given.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".settree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Parse a kebab-case enum value given as a plain string.
fn parse_choice<'de, E: Deserialize<'de>>(key: &str, value: &'de str) -> Result<E, ApplicationError> {
    let deserializer: StrDeserializer<'de, ValueError> = value.into_deserializer();
    E::deserialize(deserializer).map_err(|e| ApplicationError::Config {
        message: format!("{key}: {e}"),
    })
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            policy: overlay.policy.unwrap_or(self.policy),
            matching: overlay.matching.unwrap_or(self.matching),
            merge: overlay.merge.unwrap_or(self.merge),
            deletion: overlay.deletion.unwrap_or(self.deletion),
            tab_width: overlay.tab_width.unwrap_or(self.tab_width),
            color: overlay.color.unwrap_or(self.color),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; when `None`, `./.settree.toml`
    ///   is used if it exists. An explicit file must exist.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        let local_path = match local {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .map(|dir| local_config_path(&dir))
                .filter(|path| path.exists()),
        };
        if let Some(path) = local_path {
            debug!("local config: {}", path.display());
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply SETTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        Self::apply_overrides(settings, env_source())
    }

    fn apply_overrides(mut settings: Self, source: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Some(val) = present("policy", config.get_string("policy"))? {
            settings.policy = parse_choice("policy", &val)?;
        }
        if let Some(val) = present("matching", config.get_string("matching"))? {
            settings.matching = parse_choice("matching", &val)?;
        }
        if let Some(val) = present("merge", config.get_string("merge"))? {
            settings.merge = parse_choice("merge", &val)?;
        }
        if let Some(val) = present("deletion", config.get_string("deletion"))? {
            settings.deletion = parse_choice("deletion", &val)?;
        }
        if let Some(val) = present("tab_width", config.get_int("tab_width"))? {
            settings.tab_width = usize::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("tab_width: {e}"),
            })?;
        }
        if let Some(val) = present("color", config.get_bool("color"))? {
            settings.color = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# settree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/settree/settree.toml
#   Local:  --config <file>, else ./.settree.toml
#   Env:    SETTREE_* environment variables (e.g. SETTREE_MATCHING=case-insensitive)

# Child policy of loaded trees: "unrestricted" or "unique" (no duplicate siblings)
# policy = "unrestricted"

# Node matching: "exact" or "case-insensitive"
# matching = "exact"

# Value a union node keeps when both sides match: "left" or "right"
# merge = "left"

# Difference deletes a matched leaf: "always", or only when values are "equal"
# deletion = "always"

# Columns a tab counts for in outline files
# tab_width = 4

# Colored output (NO_COLOR is honored as well)
# color = true
"#
        .to_string()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SETTREE")
        .prefix_separator("_")
        .separator("__")
}

/// An unset key is `None`; a set key that does not parse is an error.
fn present<V>(key: &str, result: Result<V, ConfigError>) -> Result<Option<V>, ApplicationError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("{key}: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use rstest::rstest;

    #[test]
    fn given_defaults_when_created_then_unrestricted_exact_left_always() {
        let settings = Settings::default();
        assert_eq!(settings.policy, PolicyKind::Unrestricted);
        assert_eq!(settings.matching, ValueMatching::Exact);
        assert_eq!(settings.merge, MergeStrategy::Left);
        assert_eq!(settings.deletion, DeletionRule::Always);
        assert_eq!(settings.tab_width, 4);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_keys_change() {
        let overlay = RawSettings {
            matching: Some(ValueMatching::CaseInsensitive),
            color: Some(false),
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.matching, ValueMatching::CaseInsensitive);
        assert!(!merged.color);
        assert_eq!(merged.merge, MergeStrategy::Left);
    }

    #[test]
    fn given_kebab_case_value_when_parsing_choice_then_maps_to_variant() {
        let matching: ValueMatching = parse_choice("matching", "case-insensitive").unwrap();
        assert_eq!(matching, ValueMatching::CaseInsensitive);
        let err = parse_choice::<PolicyKind>("policy", "strict").unwrap_err();
        assert!(err.to_string().contains("policy"));
    }

    #[test]
    fn given_missing_or_malformed_key_when_checking_presence_then_only_malformed_fails() {
        let missing: Result<i64, ConfigError> = Err(ConfigError::NotFound("tab_width".into()));
        assert!(present("tab_width", missing).unwrap().is_none());
        let malformed: Result<i64, ConfigError> = Err(ConfigError::Message("invalid digit".into()));
        let err = present("tab_width", malformed).unwrap_err();
        assert!(err.to_string().contains("tab_width"));
    }

    #[rstest]
    #[case::tab_width("SETTREE_TAB_WIDTH", "wide", "tab_width")]
    #[case::color("SETTREE_COLOR", "sometimes", "color")]
    #[case::matching("SETTREE_MATCHING", "fuzzy", "matching")]
    fn given_malformed_env_value_when_overriding_then_config_error(
        #[case] var: &str,
        #[case] value: &str,
        #[case] key: &str,
    ) {
        let vars = Map::from([(var.to_string(), value.to_string())]);
        let err = Settings::apply_overrides(Settings::default(), env_source().source(Some(vars)))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
        assert!(err.to_string().contains(key));
    }

    #[test]
    fn given_valid_env_values_when_overriding_then_applied() {
        let vars = Map::from([
            ("SETTREE_TAB_WIDTH".to_string(), "2".to_string()),
            ("SETTREE_MERGE".to_string(), "right".to_string()),
        ]);
        let settings =
            Settings::apply_overrides(Settings::default(), env_source().source(Some(vars))).unwrap();
        assert_eq!(settings.tab_width, 2);
        assert_eq!(settings.merge, MergeStrategy::Right);
        assert!(settings.color);
    }

    #[test]
    fn given_strategies_when_applied_then_follow_their_rule() {
        assert!(ValueMatching::CaseInsensitive.matches("Apple", "aPPLE"));
        assert!(!ValueMatching::Exact.matches("Apple", "apple"));
        assert_eq!(MergeStrategy::Right.apply("a", "A"), "A");
        assert!(!DeletionRule::Equal.deletes("a", "A"));
        assert!(DeletionRule::Always.deletes("a", "A"));
    }

    #[test]
    fn given_settings_when_serialized_then_template_keys_round_trip() {
        let toml = Settings::default().to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&toml).unwrap();
        assert_eq!(raw.policy, Some(PolicyKind::Unrestricted));
        let template: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(template.policy.is_none());
    }
}
