//! Configuration types for parlor-core.
//!
//! This module defines [`EngineConfig`] (CLI-level overrides) and
//! [`ProjectConfig`] (from `.parlor/config.yaml`). During engine
//! initialization, CLI flags in `EngineConfig` take precedence over values
//! read from `ProjectConfig`.

use std::path::{Path, PathBuf};

use parlor_pm::{DEFAULT_UNKNOWN_SPEAKER, Encoding, ExportTarget};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

// ── Engine Configuration (CLI-level) ─────────────────────────

/// Engine configuration provided by the CLI layer.
///
/// Contains the working directory and optional overrides for the tokenizer
/// encoding and the unknown-speaker handle. These take precedence over
/// [`ProjectConfig`] values from `.parlor/config.yaml`.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use parlor_core::EngineConfig;
/// use parlor_pm::Encoding;
///
/// let config = EngineConfig::builder()
///     .work_dir(PathBuf::from("/tmp/my-chats"))
///     .encoding(Encoding::Cl100k)
///     .build();
/// assert_eq!(config.encoding(), Some(Encoding::Cl100k));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
pub struct EngineConfig {
    /// Directory holding `.parlor/`.
    work_dir: PathBuf,

    /// Override tokenizer encoding (takes precedence over config.yaml).
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<Encoding>,

    /// Override the handle for history messages from non-members.
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    unknown_speaker: Option<String>,
}

impl EngineConfig {
    pub fn work_dir(&self) -> &PathBuf {
        &self.work_dir
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn unknown_speaker(&self) -> Option<&str> {
        self.unknown_speaker.as_deref()
    }

    /// Returns the `.parlor` directory path.
    pub fn parlor_dir(&self) -> PathBuf {
        self.work_dir.join(".parlor")
    }

    /// Returns the path to `config.yaml` inside the `.parlor` directory.
    pub fn config_path(&self) -> PathBuf {
        self.parlor_dir().join("config.yaml")
    }
}

// ── Project Configuration (.parlor/config.yaml) ─────────────

/// Project-level configuration, deserialized from `.parlor/config.yaml`.
///
/// Every field has a serde default so a partial or empty file still yields
/// a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Prompt assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    /// BPE vocabulary used to count prompt tokens.
    #[serde(default)]
    pub encoding: Encoding,

    /// Handle rendered for history messages whose author is not a member.
    #[serde(default = "default_unknown_speaker")]
    pub unknown_speaker: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            unknown_speaker: default_unknown_speaker(),
        }
    }
}

/// Character export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Target used when the CLI is not given one.
    #[serde(default)]
    pub default_target: ExportTarget,
}

fn default_unknown_speaker() -> String {
    DEFAULT_UNKNOWN_SPEAKER.to_owned()
}

// ── Config loading ───────────────────────────────────────────

/// Load [`ProjectConfig`] from `.parlor/config.yaml`.
///
/// If the file does not exist, returns the default configuration.
///
/// # Errors
///
/// Returns `CoreError::Io` if the file exists but cannot be read.
/// Returns `CoreError::Yaml` if the file contains invalid YAML.
pub fn load_project_config(config_path: &Path) -> Result<ProjectConfig, crate::CoreError> {
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = std::fs::read_to_string(config_path)?;
    // A file with only comments is an empty document.
    let config: Option<ProjectConfig> = serde_yaml::from_str(&content)?;
    Ok(config.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_build_engine_config_with_defaults() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/tmp/chats"))
            .build();

        assert_eq!(config.work_dir(), &PathBuf::from("/tmp/chats"));
        assert!(config.encoding().is_none());
        assert!(config.unknown_speaker().is_none());
    }

    #[test]
    fn test_should_build_engine_config_with_overrides() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/tmp/chats"))
            .encoding(Encoding::O200k)
            .unknown_speaker("Stranger")
            .build();

        assert_eq!(config.encoding(), Some(Encoding::O200k));
        assert_eq!(config.unknown_speaker(), Some("Stranger"));
    }

    #[test]
    fn test_should_compute_parlor_paths() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/home/user/chats"))
            .build();

        assert_eq!(config.parlor_dir(), PathBuf::from("/home/user/chats/.parlor"));
        assert_eq!(
            config.config_path(),
            PathBuf::from("/home/user/chats/.parlor/config.yaml")
        );
    }

    #[test]
    fn test_should_default_project_config() {
        let config = ProjectConfig::default();

        assert_eq!(config.prompt.encoding, Encoding::R50k);
        assert_eq!(config.prompt.unknown_speaker, "Unknown");
        assert_eq!(config.export.default_target, ExportTarget::Tavern);
    }

    #[test]
    fn test_should_deserialize_full_project_config() {
        let yaml = r#"
prompt:
  encoding: cl100k
  unknownSpeaker: Someone
export:
  defaultTarget: ooba
"#;

        let config: ProjectConfig = serde_yaml::from_str(yaml).expect("should parse YAML");

        assert_eq!(config.prompt.encoding, Encoding::Cl100k);
        assert_eq!(config.prompt.unknown_speaker, "Someone");
        assert_eq!(config.export.default_target, ExportTarget::Ooba);
    }

    #[test]
    fn test_should_apply_defaults_to_partial_config() {
        let config: ProjectConfig =
            serde_yaml::from_str("prompt:\n  encoding: p50k\n").expect("should parse YAML");

        assert_eq!(config.prompt.encoding, Encoding::P50k);
        assert_eq!(config.prompt.unknown_speaker, "Unknown");
        assert_eq!(config.export.default_target, ExportTarget::Tavern);
    }

    #[test]
    fn test_should_reject_unknown_encoding_in_config() {
        let result: Result<ProjectConfig, _> = serde_yaml::from_str("prompt:\n  encoding: gpt9\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_should_serialize_engine_config_to_json() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/tmp/chats"))
            .encoding(Encoding::Cl100k)
            .build();

        let value = serde_json::to_value(&config).expect("should serialize");
        assert_eq!(value["work_dir"], json!("/tmp/chats"));
        assert_eq!(value["encoding"], json!("cl100k"));
        assert!(value.get("unknown_speaker").is_none());
    }

    #[test]
    fn test_should_load_default_when_config_file_missing() {
        let path = PathBuf::from("/nonexistent/config.yaml");
        let config = load_project_config(&path).expect("should return default");
        assert_eq!(config.prompt.encoding, Encoding::R50k);
    }

    #[test]
    fn test_should_load_default_from_empty_file() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "# nothing set\n").expect("should write config");

        let config = load_project_config(&config_path).expect("should load config");
        assert_eq!(config.prompt.unknown_speaker, "Unknown");
    }

    #[test]
    fn test_should_load_config_from_tempfile() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "export:\n  defaultTarget: ooba\n")
            .expect("should write config");

        let config = load_project_config(&config_path).expect("should load config");
        assert_eq!(config.export.default_target, ExportTarget::Ooba);
        assert_eq!(config.prompt.encoding, Encoding::R50k);
    }
}
