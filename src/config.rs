//! Ambient engine configuration: which languages get structural merge versus
//! falling back to line-level diff3, loaded from an optional TOML file.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::lang::Language;

/// Top-level structural merge engine configuration.
///
/// Missing file or missing fields fall back to defaults: every language the
/// engine has a grammar for gets structural merge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Which languages use structural (entity-based) merge. Languages absent
    /// from this list, or whose parse fails, fall back to line-level diff3.
    #[serde(default = "default_languages")]
    pub structural_languages: Vec<ConfigLanguage>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            structural_languages: default_languages(),
        }
    }
}

fn default_languages() -> Vec<ConfigLanguage> {
    vec![
        ConfigLanguage::Go,
        ConfigLanguage::Python,
        ConfigLanguage::Rust,
        ConfigLanguage::TypeScript,
        ConfigLanguage::JavaScript,
        ConfigLanguage::C,
        ConfigLanguage::Cpp,
        ConfigLanguage::Java,
    ]
}

impl EngineConfig {
    /// Whether `language` should attempt structural (entity-based) merge.
    #[must_use]
    pub fn is_enabled_for(&self, language: Language) -> bool {
        self.structural_languages
            .iter()
            .any(|l| l.to_language() == language)
    }

    /// Load configuration from a TOML file. A missing file yields defaults;
    /// this is not an error (§9: structural merge is opt-out, not opt-in).
    ///
    /// # Errors
    /// Returns [`ConfigError`] on I/O errors other than not-found, or on
    /// invalid TOML / unknown fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start].chars().filter(|&c| c == '\n').count() + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError { path: None, message }
        })
    }
}

/// A language name as it appears in config TOML (kept distinct from
/// [`Language`] so a future grammar addition doesn't become a breaking config
/// change for files that already list it by name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLanguage {
    Go,
    Python,
    Rust,
    #[serde(alias = "ts")]
    TypeScript,
    JavaScript,
    C,
    #[serde(rename = "cpp", alias = "c++")]
    Cpp,
    Java,
}

impl ConfigLanguage {
    const fn to_language(self) -> Language {
        match self {
            Self::Go => Language::Go,
            Self::Python => Language::Python,
            Self::Rust => Language::Rust,
            Self::TypeScript => Language::TypeScript,
            Self::JavaScript => Language::JavaScript,
            Self::C => Language::C,
            Self::Cpp => Language::Cpp,
            Self::Java => Language::Java,
        }
    }
}

/// Error loading or parsing an [`EngineConfig`] TOML file.
#[derive(Debug)]
pub struct ConfigError {
    pub path: Option<std::path::PathBuf>,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_all_languages() {
        let cfg = EngineConfig::default();
        assert!(cfg.is_enabled_for(Language::Go));
        assert!(cfg.is_enabled_for(Language::Rust));
        assert!(cfg.is_enabled_for(Language::Java));
    }

    #[test]
    fn parse_empty_string_yields_defaults() {
        let cfg = EngineConfig::parse("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn parse_restricts_to_listed_languages() {
        let toml = r#"structural_languages = ["go", "python"]"#;
        let cfg = EngineConfig::parse(toml).unwrap();
        assert!(cfg.is_enabled_for(Language::Go));
        assert!(cfg.is_enabled_for(Language::Python));
        assert!(!cfg.is_enabled_for(Language::Rust));
    }

    #[test]
    fn ts_alias_resolves_to_typescript() {
        let toml = r#"structural_languages = ["ts"]"#;
        let cfg = EngineConfig::parse(toml).unwrap();
        assert!(cfg.is_enabled_for(Language::TypeScript));
    }

    #[test]
    fn rejects_unknown_top_level_field() {
        let err = EngineConfig::parse("unknown_field = true").unwrap_err();
        assert!(err.message.contains("unknown field"));
    }

    #[test]
    fn rejects_unknown_language() {
        let toml = r#"structural_languages = ["cobol"]"#;
        let err = EngineConfig::parse(toml).unwrap_err();
        assert!(err.message.contains("unknown variant"));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = EngineConfig::load(Path::new("/nonexistent/engine.toml")).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn config_error_display_with_path() {
        let err = ConfigError {
            path: Some(std::path::PathBuf::from("/repo/engine.toml")),
            message: "bad field".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("/repo/engine.toml"));
        assert!(msg.contains("bad field"));
    }
}
