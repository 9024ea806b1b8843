//! Configuration file support for pyfix
//!
//! Loads `.pyfix.toml` from the current directory or parent directories.

use anyhow::{Context, Result};
use pyfix_core::{RuleSet, UnknownRule};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
    pub future: FutureConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// If set, only these rules will run
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled)
    pub disabled: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from directory walks
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FutureConfig {
    /// `__future__` features whose imports must be kept
    pub allow: Vec<String>,
}

impl Config {
    /// Load config from `.pyfix.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(".pyfix.toml");
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Apply the `[rules]` section to a registry. Rules named on the
    /// command line bypass this entirely.
    pub fn apply_rules(&self, registry: RuleSet) -> Result<RuleSet, UnknownRule> {
        let registry = match &self.rules.enabled {
            Some(enabled) => registry.select(enabled)?,
            None => registry,
        };
        Ok(registry.without(&self.rules.disabled))
    }

    /// Check if a walked path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                // Also try matching against just the file/dir name
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Simple prefix/contains matching for directory patterns
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(".pyfix.toml"), content).unwrap();
    }

    #[test]
    fn test_load_basic_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[rules]
enabled = ["dict_literal", "not_in"]
disabled = ["not_in"]

[paths]
exclude = ["vendor/", "*_pb2.py"]

[future]
allow = ["annotations"]
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert_eq!(path, temp.path().join(".pyfix.toml"));
        assert_eq!(
            config.rules.enabled,
            Some(vec!["dict_literal".to_string(), "not_in".to_string()])
        );
        assert_eq!(config.rules.disabled, vec!["not_in".to_string()]);
        assert_eq!(
            config.paths.exclude,
            vec!["vendor/".to_string(), "*_pb2.py".to_string()]
        );
        assert_eq!(config.future.allow, vec!["annotations".to_string()]);
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "");

        let (config, _) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert!(config.rules.enabled.is_none());
        assert!(config.rules.disabled.is_empty());
        assert!(config.paths.exclude.is_empty());
        assert!(config.future.allow.is_empty());
    }

    #[test]
    fn test_config_found_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules]\ndisabled = [\"not_in\"]\n");
        let nested = temp.path().join("pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::load_from(nested).unwrap().unwrap();

        assert_eq!(path, temp.path().join(".pyfix.toml"));
        assert_eq!(config.rules.disabled, vec!["not_in".to_string()]);
    }

    #[test]
    fn test_no_config_found() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(temp.path().to_path_buf()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules\nenabled = ");
        assert!(Config::load_from(temp.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_apply_rules_enabled_subset() {
        let config = Config {
            rules: RulesConfig {
                enabled: Some(vec!["not_in".to_string(), "dict_literal".to_string()]),
                disabled: vec![],
            },
            ..Default::default()
        };

        let rules = config.apply_rules(pyfix_rules::with_defaults()).unwrap();

        assert_eq!(rules.names(), vec!["dict_literal", "not_in"]);
    }

    #[test]
    fn test_apply_rules_disabled() {
        let config = Config {
            rules: RulesConfig {
                enabled: None,
                disabled: vec!["past_imports".to_string()],
            },
            ..Default::default()
        };

        let rules = config.apply_rules(pyfix_rules::with_defaults()).unwrap();

        assert!(!rules.names().contains(&"past_imports"));
        assert_eq!(rules.len(), pyfix_rules::with_defaults().len() - 1);
    }

    #[test]
    fn test_apply_rules_unknown_enabled_name() {
        let config = Config {
            rules: RulesConfig {
                enabled: Some(vec!["no_such_rule".to_string()]),
                disabled: vec![],
            },
            ..Default::default()
        };

        let err = config.apply_rules(pyfix_rules::with_defaults()).unwrap_err();

        assert_eq!(err, UnknownRule("no_such_rule".to_string()));
    }

    #[test]
    fn test_should_exclude_glob() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["*_pb2.py".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("api_pb2.py")));
        assert!(config.should_exclude(Path::new("gen/api_pb2.py")));
        assert!(!config.should_exclude(Path::new("api.py")));
    }

    #[test]
    fn test_should_exclude_directory() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["vendor/".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("project/vendor/dep.py")));
        assert!(config.should_exclude(Path::new("vendor/dep.py")));
        assert!(!config.should_exclude(Path::new("src/vendor.py")));
    }
}
