//! Snapshot types consumed by the prompt builder.
//!
//! These mirror the records owned by the upstream chat service. They are
//! read-only here: formatting never creates or mutates any of them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PmError;

/// Attribute name to ordered values, kept in insertion order.
pub type Attributes = IndexMap<String, Vec<String>>;

/// A character's traits in one of the three persona encodings.
///
/// Serialized adjacently tagged, e.g.
/// `{ "kind": "wpp", "attributes": { "mind": ["kind", "brave"] } }`.
/// Any other `kind` is rejected when deserializing.
///
/// # Examples
///
/// ```
/// use parlor_pm::Persona;
///
/// let persona: Persona = serde_json::from_str(
///     r#"{ "kind": "sbf", "attributes": { "mind": ["curious"] } }"#,
/// )
/// .expect("valid persona");
/// assert_eq!(persona.kind(), "sbf");
/// assert_eq!(persona.attributes()["mind"], vec!["curious".to_owned()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "attributes", rename_all = "lowercase")]
pub enum Persona {
    /// W++ square-bracket encoding.
    Wpp(Attributes),
    /// Square Bracket Format.
    Sbf(Attributes),
    /// Boostyle `name + trait + trait` encoding.
    Boostyle(Attributes),
}

impl Persona {
    /// Returns the persona's attribute map regardless of encoding.
    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Wpp(attrs) | Self::Sbf(attrs) | Self::Boostyle(attrs) => attrs,
        }
    }

    /// Returns the wire tag of this persona (`wpp`, `sbf` or `boostyle`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Wpp(_) => "wpp",
            Self::Sbf(_) => "sbf",
            Self::Boostyle(_) => "boostyle",
        }
    }
}

/// A role-play character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Display name, substituted for `{{char}}`.
    pub name: String,

    /// Trait description rendered into the prompt.
    pub persona: Persona,

    /// First message the character sends in a new chat.
    #[serde(default)]
    pub greeting: String,

    /// Default scenario for chats with this character.
    #[serde(default)]
    pub scenario: String,

    /// Example dialogue, one utterance per line.
    #[serde(default)]
    pub sample_chat: String,
}

/// Per-chat settings. `None` falls back to the character's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Persona>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_chat: Option<String>,
}

impl Chat {
    /// The persona in effect: the chat override, else the character's own.
    pub fn persona<'a>(&'a self, character: &'a Character) -> &'a Persona {
        self.overrides.as_ref().unwrap_or(&character.persona)
    }

    /// The scenario in effect. An explicit empty override hides the
    /// character's scenario.
    pub fn scenario<'a>(&'a self, character: &'a Character) -> &'a str {
        self.scenario.as_deref().unwrap_or(&character.scenario)
    }

    /// The sample dialogue in effect.
    pub fn sample_chat<'a>(&'a self, character: &'a Character) -> &'a str {
        self.sample_chat.as_deref().unwrap_or(&character.sample_chat)
    }
}

/// Who wrote a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    /// Written by the chat's character.
    FromCharacter(String),
    /// Written by the chat member with this user id.
    FromMember(String),
}

/// A single message from the chat history.
///
/// On the wire a message carries nullable `characterId` and `userId`
/// fields; exactly one of them must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChatMessage", into = "RawChatMessage")]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub msg: String,
}

impl ChatMessage {
    pub fn from_character(character_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::FromCharacter(character_id.into()),
            msg: msg.into(),
        }
    }

    pub fn from_member(user_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::FromMember(user_id.into()),
            msg: msg.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChatMessage {
    #[serde(default)]
    character_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    msg: String,
}

impl TryFrom<RawChatMessage> for ChatMessage {
    type Error = PmError;

    fn try_from(raw: RawChatMessage) -> Result<Self, Self::Error> {
        let speaker = match (raw.character_id, raw.user_id) {
            (Some(id), None) => Speaker::FromCharacter(id),
            (None, Some(id)) => Speaker::FromMember(id),
            (Some(_), Some(_)) => {
                return Err(PmError::InvalidMessage(
                    "both characterId and userId are set".to_owned(),
                ));
            }
            (None, None) => {
                return Err(PmError::InvalidMessage(
                    "neither characterId nor userId is set".to_owned(),
                ));
            }
        };
        Ok(Self {
            speaker,
            msg: raw.msg,
        })
    }
}

impl From<ChatMessage> for RawChatMessage {
    fn from(message: ChatMessage) -> Self {
        let (character_id, user_id) = match message.speaker {
            Speaker::FromCharacter(id) => (Some(id), None),
            Speaker::FromMember(id) => (None, Some(id)),
        };
        Self {
            character_id,
            user_id,
            msg: message.msg,
        }
    }
}

/// A chat member's public profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,

    #[serde(default)]
    pub handle: String,
}
