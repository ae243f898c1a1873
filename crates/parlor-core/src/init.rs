//! Init workflow implementation.
//!
//! Creates the `.parlor/` directory with a commented default `config.yaml`
//! and keeps `.parlor/logs/` out of version control.

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::config::EngineConfig;
use crate::error::CoreError;

const LOGS_IGNORE_ENTRY: &str = ".parlor/logs/";

/// Run the init workflow.
///
/// # Errors
///
/// Returns `CoreError::AlreadyInitialized` if `.parlor/config.yaml` exists.
/// Returns `CoreError::Io` if directory or file creation fails.
#[instrument(skip(config))]
pub(crate) fn run_init(config: &EngineConfig) -> Result<(), CoreError> {
    let config_path = config.config_path();
    if config_path.exists() {
        return Err(CoreError::AlreadyInitialized(config_path));
    }
    info!(dir = %config.work_dir().display(), "initializing parlor directory");

    let parlor_dir = config.parlor_dir();
    fs::create_dir_all(&parlor_dir)?;
    write_default_config(&parlor_dir)?;
    debug!(path = %config_path.display(), "wrote default config");

    update_gitignore(config.work_dir())?;
    debug!("updated .gitignore");

    Ok(())
}

/// Write a default `.parlor/config.yaml` file.
///
/// Every option is spelled out with its default value.
///
/// # Errors
///
/// Returns `CoreError::Io` if the file cannot be written.
pub(crate) fn write_default_config(parlor_dir: &Path) -> Result<(), CoreError> {
    let default_config = r#"# Parlor Configuration

prompt:
  # Tokenizer vocabulary for prompt token counts: r50k, p50k, cl100k, o200k
  encoding: r50k
  # Handle shown for history messages from users who are not chat members
  unknownSpeaker: Unknown

export:
  # Card schema used by `parlor export` without --target: tavern, ooba
  defaultTarget: tavern
"#;

    fs::write(parlor_dir.join("config.yaml"), default_config)?;
    Ok(())
}

/// Add `.parlor/logs/` to `.gitignore` if not already present.
///
/// # Errors
///
/// Returns `CoreError::Io` if the file cannot be read or written.
pub(crate) fn update_gitignore(work_dir: &Path) -> Result<(), CoreError> {
    let gitignore_path = work_dir.join(".gitignore");

    let content = if gitignore_path.exists() {
        fs::read_to_string(&gitignore_path)?
    } else {
        String::new()
    };

    if content.lines().any(|line| line.trim() == LOGS_IGNORE_ENTRY) {
        return Ok(());
    }

    let mut new_content = content;
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(LOGS_IGNORE_ENTRY);
    new_content.push('\n');
    fs::write(&gitignore_path, new_content)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use parlor_pm::{Encoding, ExportTarget};

    use super::*;
    use crate::config::load_project_config;

    fn engine_config(dir: &Path) -> EngineConfig {
        EngineConfig::builder().work_dir(PathBuf::from(dir)).build()
    }

    #[test]
    fn test_should_write_default_config_that_parses() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        write_default_config(dir.path()).expect("should write config");

        let config = load_project_config(&dir.path().join("config.yaml")).expect("should parse");
        assert_eq!(config.prompt.encoding, Encoding::R50k);
        assert_eq!(config.prompt.unknown_speaker, "Unknown");
        assert_eq!(config.export.default_target, ExportTarget::Tavern);
    }

    #[test]
    fn test_should_init_parlor_dir() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config = engine_config(dir.path());

        run_init(&config).expect("should init");

        assert!(config.config_path().exists());
        let gitignore = fs::read_to_string(dir.path().join(".gitignore")).expect("should read");
        assert!(gitignore.lines().any(|l| l == ".parlor/logs/"));
    }

    #[test]
    fn test_should_refuse_second_init() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config = engine_config(dir.path());

        run_init(&config).expect("should init");
        let result = run_init(&config);
        assert!(matches!(result, Err(CoreError::AlreadyInitialized(_))));
    }

    #[test]
    fn test_should_append_to_gitignore_without_trailing_newline() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        fs::write(dir.path().join(".gitignore"), "target/").expect("should write gitignore");

        update_gitignore(dir.path()).expect("should update gitignore");

        let content = fs::read_to_string(dir.path().join(".gitignore")).expect("should read");
        assert_eq!(content, "target/\n.parlor/logs/\n");
    }

    #[test]
    fn test_should_not_duplicate_gitignore_entry() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        fs::write(dir.path().join(".gitignore"), ".parlor/logs/\n").expect("should write");

        update_gitignore(dir.path()).expect("should update gitignore");

        let content = fs::read_to_string(dir.path().join(".gitignore")).expect("should read");
        assert_eq!(content.matches(".parlor/logs/").count(), 1);
    }
}
