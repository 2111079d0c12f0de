//! Project configuration (`ktlst.json`).
//!
//! ```json
//! {
//!   "sources": ["src/Main.kt", "src/util/Strings.kt"],
//!   "classpath": ["stubs/okio.json"],
//!   "defaultImports": ["kotlinx.coroutines"],
//!   "threads": 4,
//!   "checkRoundTrip": true
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// JSON stub files adding platform classes and functions.
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
    /// Star imports added to every unit after the language defaults.
    #[serde(default)]
    pub default_imports: Vec<String>,
    /// Attribution worker threads; 0 uses the rayon default.
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub check_round_trip: bool,
}

impl ProjectConfig {
    pub fn from_json(path: &Path, json: &str) -> Result<ProjectConfig, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file and make its paths absolute relative to it.
    pub fn load(path: &Path) -> Result<ProjectConfig, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = ProjectConfig::from_json(path, &json)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in self.sources.iter_mut().chain(self.classpath.iter_mut()) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_are_missing() {
        let config = ProjectConfig::from_json(Path::new("ktlst.json"), "{}").unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{ "defaultImports": ["a.b"], "checkRoundTrip": true, "threads": 2 }"#;
        let config = ProjectConfig::from_json(Path::new("ktlst.json"), json).unwrap();
        assert_eq!(config.default_imports, vec!["a.b".to_string()]);
        assert!(config.check_round_trip);
        assert_eq!(config.threads, 2);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ProjectConfig::from_json(Path::new("ktlst.json"), r#"{ "source": [] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config ktlst.json"));
    }

    #[test]
    fn test_relative_paths_resolved_against_base() {
        let mut config = ProjectConfig {
            sources: vec![PathBuf::from("src/A.kt"), PathBuf::from("/abs/B.kt")],
            classpath: vec![PathBuf::from("stubs.json")],
            ..ProjectConfig::default()
        };
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.sources,
            vec![PathBuf::from("/project/src/A.kt"), PathBuf::from("/abs/B.kt")]
        );
        assert_eq!(config.classpath, vec![PathBuf::from("/project/stubs.json")]);
    }
}
