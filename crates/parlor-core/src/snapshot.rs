//! Chat snapshot files and their loaders.
//!
//! A [`ChatSnapshot`] bundles everything the prompt builder needs for one
//! chat: the sending profile, the character, per-chat overrides, history
//! and member profiles. Snapshots and character files are read from YAML
//! (`.yaml` / `.yml`) or JSON (`.json`) documents.

use std::fs;
use std::path::Path;

use parlor_pm::{Character, Chat, ChatMessage, Profile, PromptRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::CoreError;

/// Snapshot of a chat at the moment a new message arrives.
///
/// # Examples
///
/// ```
/// use parlor_core::ChatSnapshot;
///
/// let yaml = r#"
/// sender:
///   userId: u1
///   handle: Ann
/// character:
///   name: Rex
///   persona:
///     kind: boostyle
///     attributes:
///       mind: [loyal]
///   sampleChat: "Rex: Hello!"
/// history:
///   - characterId: c1
///     msg: Woof!
/// members:
///   - userId: u1
///     handle: Ann
/// "#;
///
/// let snapshot: ChatSnapshot = serde_yaml::from_str(yaml).expect("valid yaml");
/// assert_eq!(snapshot.character.name, "Rex");
/// assert_eq!(snapshot.history.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    /// Profile of whoever sends the new message.
    #[serde(default)]
    pub sender: Profile,

    pub character: Character,

    #[serde(default)]
    pub chat: Chat,

    /// Prior messages, oldest first.
    #[serde(default)]
    pub history: Vec<ChatMessage>,

    #[serde(default)]
    pub members: Vec<Profile>,
}

impl ChatSnapshot {
    /// Borrow this snapshot as a prompt request for `message`.
    pub fn request<'a>(&'a self, message: &'a str) -> PromptRequest<'a> {
        PromptRequest {
            sender: &self.sender,
            chat: &self.chat,
            character: &self.character,
            history: &self.history,
            message,
            members: &self.members,
        }
    }
}

/// Load a [`ChatSnapshot`] from a YAML or JSON file.
///
/// # Errors
///
/// Returns `CoreError::SnapshotNotFound` if the file does not exist.
/// Returns `CoreError::UnsupportedFormat` for unknown file extensions.
/// Returns `CoreError::InvalidSnapshot` if the content cannot be parsed.
#[instrument]
pub fn load_snapshot(path: &Path) -> Result<ChatSnapshot, CoreError> {
    let snapshot: ChatSnapshot = load_document(path)?;
    debug!(
        character = %snapshot.character.name,
        history = snapshot.history.len(),
        members = snapshot.members.len(),
        "loaded chat snapshot"
    );
    Ok(snapshot)
}

/// Load a single [`Character`] from a YAML or JSON file.
///
/// # Errors
///
/// Same as [`load_snapshot`].
#[instrument]
pub fn load_character(path: &Path) -> Result<Character, CoreError> {
    let character: Character = load_document(path)?;
    debug!(name = %character.name, kind = character.persona.kind(), "loaded character");
    Ok(character)
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    if !path.exists() {
        return Err(CoreError::SnapshotNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let content = fs::read_to_string(path)?;

    let invalid = |e: &dyn std::fmt::Display| {
        CoreError::InvalidSnapshot(format!("{}: {e}", path.display()))
    };
    match extension.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|e| invalid(&e)),
        Some("json") => serde_json::from_str(&content).map_err(|e| invalid(&e)),
        _ => Err(CoreError::UnsupportedFormat(path.to_path_buf())),
    }
}
