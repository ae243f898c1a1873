//! Core engine.
//!
//! The [`Engine`] is the main entry point for all parlor-core operations.
//! It merges configuration, owns the tokenizer and prompt builder, and
//! serves the init, prompt, persona, export and token-count workflows.

use std::sync::Arc;

use parlor_pm::{
    BpeTokenizer, Character, Encoding, ExportTarget, ExportedCharacter, Prompt, PromptBuilder,
    Tokenizer, export_character, format_character,
};
use tracing::{info, instrument};

use crate::config::{EngineConfig, ProjectConfig, load_project_config};
use crate::error::CoreError;
use crate::snapshot::ChatSnapshot;

/// Core engine that drives all Parlor workflows.
///
/// # Examples
///
/// ```no_run
/// use std::path::{Path, PathBuf};
/// use parlor_core::{Engine, EngineConfig, load_snapshot};
///
/// # fn example() -> Result<(), parlor_core::CoreError> {
/// let config = EngineConfig::builder()
///     .work_dir(PathBuf::from("."))
///     .build();
///
/// let engine = Engine::new(config)?;
/// let snapshot = load_snapshot(Path::new("chat.yaml"))?;
/// let prompt = engine.prompt(&snapshot, "Hello there");
/// println!("{}", prompt.text);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Engine {
    /// CLI-level configuration.
    config: EngineConfig,
    /// Project-level configuration from `.parlor/config.yaml`.
    project_config: ProjectConfig,
    tokenizer: Arc<BpeTokenizer>,
    builder: PromptBuilder,
}

impl Engine {
    /// Create a new engine with the given configuration.
    ///
    /// Loads `.parlor/config.yaml` (defaults if absent), applies CLI
    /// overrides and loads the tokenizer vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Yaml` if the config file exists but is invalid.
    /// Returns `CoreError::Prompt` if the tokenizer cannot be loaded.
    #[instrument(skip_all)]
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        info!(dir = %config.work_dir().display(), "initializing engine");

        let project_config = load_project_config(&config.config_path())?;

        let encoding = config.encoding().unwrap_or(project_config.prompt.encoding);
        let unknown_speaker = config
            .unknown_speaker()
            .unwrap_or(project_config.prompt.unknown_speaker.as_str())
            .to_owned();

        let tokenizer = Arc::new(BpeTokenizer::new(encoding)?);
        let builder = PromptBuilder::new(tokenizer.clone()).with_unknown_speaker(unknown_speaker);

        Ok(Self {
            config,
            project_config,
            tokenizer,
            builder,
        })
    }

    /// Create `.parlor/` with a default configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AlreadyInitialized` if a config file exists.
    /// Returns `CoreError::Io` if directory creation fails.
    pub fn init(&self) -> Result<(), CoreError> {
        crate::init::run_init(&self.config)
    }

    /// Build the prompt for `message` arriving in the chat `snapshot`.
    pub fn prompt(&self, snapshot: &ChatSnapshot, message: &str) -> Prompt {
        self.builder.create_prompt(&snapshot.request(message))
    }

    /// Render a character's own persona.
    pub fn persona(&self, character: &Character) -> String {
        format_character(&character.name, &character.persona)
    }

    /// Export `character`, using the configured default target when
    /// `target` is `None`.
    #[instrument(skip(self, character), fields(character = %character.name))]
    pub fn export(&self, character: &Character, target: Option<ExportTarget>) -> ExportedCharacter {
        let target = target.unwrap_or(self.project_config.export.default_target);
        info!(%target, "exporting character");
        export_character(character, target)
    }

    /// Count tokens in `text` with the engine's tokenizer.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.count(text)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn project_config(&self) -> &ProjectConfig {
        &self.project_config
    }

    /// Encoding the tokenizer was loaded with.
    pub fn encoding(&self) -> Encoding {
        self.tokenizer.encoding()
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.builder
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use parlor_pm::{Attributes, Chat, ChatMessage, Persona, Profile};

    use super::*;

    fn engine_in(dir: &std::path::Path) -> Engine {
        let config = EngineConfig::builder().work_dir(PathBuf::from(dir)).build();
        Engine::new(config).expect("should create engine")
    }

    fn snapshot() -> ChatSnapshot {
        ChatSnapshot {
            sender: Profile {
                user_id: "u1".to_owned(),
                handle: String::new(),
            },
            character: Character {
                name: "Rex".to_owned(),
                persona: Persona::Boostyle(Attributes::from([(
                    "mind".to_owned(),
                    vec!["loyal".to_owned()],
                )])),
                greeting: "Woof!".to_owned(),
                scenario: String::new(),
                sample_chat: "Rex: Hello!".to_owned(),
            },
            chat: Chat::default(),
            history: Vec::new(),
            members: Vec::new(),
        }
    }

    #[test]
    fn test_should_use_defaults_without_config_file() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let engine = engine_in(dir.path());

        assert_eq!(engine.encoding(), Encoding::R50k);
        assert_eq!(engine.prompt_builder().unknown_speaker(), "Unknown");
    }

    #[test]
    fn test_should_build_prompt_from_snapshot() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let engine = engine_in(dir.path());

        let prompt = engine.prompt(&snapshot(), "Hi");
        assert_eq!(
            prompt.text,
            "Rex's Persona: Rex + loyal\n<START>\nRex: Hello!\nYou: Hi\nRex:"
        );
        assert_eq!(prompt.tokens, engine.count_tokens(&prompt.text));
    }

    #[test]
    fn test_should_apply_project_config() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        fs::create_dir_all(dir.path().join(".parlor")).expect("should create .parlor");
        fs::write(
            dir.path().join(".parlor/config.yaml"),
            "prompt:\n  encoding: cl100k\n  unknownSpeaker: Stranger\nexport:\n  defaultTarget: ooba\n",
        )
        .expect("should write config");

        let engine = engine_in(dir.path());
        assert_eq!(engine.encoding(), Encoding::Cl100k);

        let mut snapshot = snapshot();
        snapshot.history.push(ChatMessage::from_member("ghost", "Boo"));
        let prompt = engine.prompt(&snapshot, "Hi");
        assert!(prompt.text.contains("\nStranger: Boo\n"));

        let exported = engine.export(&snapshot.character, None);
        assert!(matches!(exported, ExportedCharacter::Ooba(_)));
    }

    #[test]
    fn test_should_prefer_cli_overrides() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        fs::create_dir_all(dir.path().join(".parlor")).expect("should create .parlor");
        fs::write(
            dir.path().join(".parlor/config.yaml"),
            "prompt:\n  encoding: cl100k\n  unknownSpeaker: Stranger\n",
        )
        .expect("should write config");

        let config = EngineConfig::builder()
            .work_dir(PathBuf::from(dir.path()))
            .encoding(Encoding::P50k)
            .unknown_speaker("Visitor")
            .build();
        let engine = Engine::new(config).expect("should create engine");

        assert_eq!(engine.encoding(), Encoding::P50k);
        assert_eq!(engine.prompt_builder().unknown_speaker(), "Visitor");
    }

    #[test]
    fn test_should_fail_on_invalid_config() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        fs::create_dir_all(dir.path().join(".parlor")).expect("should create .parlor");
        fs::write(dir.path().join(".parlor/config.yaml"), "prompt: [unclosed\n")
            .expect("should write config");

        let config = EngineConfig::builder()
            .work_dir(PathBuf::from(dir.path()))
            .build();
        assert!(matches!(Engine::new(config), Err(CoreError::Yaml(_))));
    }

    #[test]
    fn test_should_export_with_explicit_target() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let engine = engine_in(dir.path());
        let character = snapshot().character;

        match engine.export(&character, Some(ExportTarget::Tavern)) {
            ExportedCharacter::Tavern(card) => {
                assert_eq!(card.description, engine.persona(&character));
                assert_eq!(card.first_mes, "Woof!");
            }
            other => panic!("unexpected export: {other:?}"),
        }
    }

    #[test]
    fn test_should_init_through_engine() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let engine = engine_in(dir.path());

        engine.init().expect("should init");
        assert!(engine.config().config_path().exists());
        assert!(matches!(engine.init(), Err(CoreError::AlreadyInitialized(_))));
    }
}
