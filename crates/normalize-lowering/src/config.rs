//! Lowering options.
//!
//! Example `lowering.toml`:
//! ```toml
//! comments = true
//! doc_strings = false
//! receiver = "this"
//! entry_point = true
//! ```

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid lowering config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoweringConfig {
    /// Carry source comments over as `#` comment statements.
    pub comments: bool,
    /// Emit doc comments of functions and struct types as doc strings.
    pub doc_strings: bool,
    /// Base name for anonymous method receivers and constructor receivers.
    pub receiver: String,
    /// Append an `if __name__ == "__main__":` guard when `main` is declared.
    pub entry_point: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            comments: true,
            doc_strings: true,
            receiver: "self".into(),
            entry_point: true,
        }
    }
}

impl LoweringConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LoweringConfig::default();
        assert!(config.comments);
        assert!(config.doc_strings);
        assert_eq!(config.receiver, "self");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LoweringConfig::from_toml("receiver = \"this\"\n").unwrap();
        assert_eq!(config.receiver, "this");
        assert!(config.comments);
        assert!(config.entry_point);
    }

    #[test]
    fn test_invalid_toml() {
        let err = LoweringConfig::from_toml("comments = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "comments = false\ndoc_strings = false").unwrap();
        let config = LoweringConfig::load(file.path()).unwrap();
        assert!(!config.comments);
        assert!(!config.doc_strings);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LoweringConfig::load(Path::new("/nonexistent/lowering.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
