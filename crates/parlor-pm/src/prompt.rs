//! Prompt assembly for a chat turn.
//!
//! [`PromptBuilder::create_prompt`] lays out the persona, scenario, sample
//! dialogue, chat history and the new message as newline-separated lines,
//! drops empty lines, substitutes the `{{char}}` / `{{user}}` placeholders
//! across the whole text and reports the token count.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::persona::format_character;
use crate::schema::{Character, Chat, ChatMessage, Profile, Speaker};
use crate::tokenizer::Tokenizer;

/// Name used for the sender when their handle is empty.
pub const FALLBACK_USERNAME: &str = "You";

/// Handle rendered for history messages whose author is not a chat member.
pub const DEFAULT_UNKNOWN_SPEAKER: &str = "Unknown";

const START_DELIMITER: &str = "<START>";
const CHAR_PLACEHOLDER: &str = "{{char}}";
const USER_PLACEHOLDER: &str = "{{user}}";

/// Everything needed to build the prompt for one incoming message.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    /// Author of the new message.
    pub sender: &'a Profile,
    pub chat: &'a Chat,
    pub character: &'a Character,
    /// Prior messages, oldest first.
    pub history: &'a [ChatMessage],
    /// The new message text.
    pub message: &'a str,
    /// Profiles of every chat member, used to name history speakers.
    pub members: &'a [Profile],
}

/// An assembled prompt and its size in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub text: String,
    pub tokens: usize,
}

/// Builds language-model prompts from chat snapshots.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use parlor_pm::{
///     Attributes, BpeTokenizer, Character, Chat, Encoding, Persona, Profile, PromptBuilder,
///     PromptRequest,
/// };
///
/// let tokenizer = BpeTokenizer::new(Encoding::R50k).expect("bundled vocabulary");
/// let builder = PromptBuilder::new(Arc::new(tokenizer));
///
/// let character = Character {
///     name: "Rex".to_owned(),
///     persona: Persona::Boostyle(Attributes::from([("mind".to_owned(), vec!["loyal".to_owned()])])),
///     greeting: String::new(),
///     scenario: String::new(),
///     sample_chat: "Rex: Hello!".to_owned(),
/// };
///
/// let prompt = builder.create_prompt(&PromptRequest {
///     sender: &Profile::default(),
///     chat: &Chat::default(),
///     character: &character,
///     history: &[],
///     message: "Hi",
///     members: &[],
/// });
///
/// assert_eq!(
///     prompt.text,
///     "Rex's Persona: Rex + loyal\n<START>\nRex: Hello!\nYou: Hi\nRex:",
/// );
/// assert!(prompt.tokens > 0);
/// ```
#[derive(Clone)]
pub struct PromptBuilder {
    tokenizer: Arc<dyn Tokenizer>,
    unknown_speaker: String,
}

impl PromptBuilder {
    /// Create a builder that counts tokens with `tokenizer`.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            unknown_speaker: DEFAULT_UNKNOWN_SPEAKER.to_owned(),
        }
    }

    /// Set the handle used for history messages from non-members.
    pub fn with_unknown_speaker(mut self, handle: impl Into<String>) -> Self {
        self.unknown_speaker = handle.into();
        self
    }

    pub fn unknown_speaker(&self) -> &str {
        &self.unknown_speaker
    }

    /// Assemble the prompt for `request` and count its tokens.
    ///
    /// The token count is logged at debug level together with the prompt
    /// text; it never truncates the prompt.
    #[instrument(skip_all, fields(character = %request.character.name))]
    pub fn create_prompt(&self, request: &PromptRequest<'_>) -> Prompt {
        let PromptRequest {
            sender,
            chat,
            character,
            history,
            message,
            members,
        } = *request;

        let name = character.name.as_str();
        let username = if sender.handle.is_empty() {
            FALLBACK_USERNAME
        } else {
            sender.handle.as_str()
        };

        let mut lines = vec![format!(
            "{name}'s Persona: {}",
            format_character(name, chat.persona(character))
        )];

        let scenario = chat.scenario(character);
        if !scenario.is_empty() {
            lines.push(format!("Scenario: {scenario}"));
        }

        lines.push(START_DELIMITER.to_owned());
        lines.extend(chat.sample_chat(character).split('\n').map(str::to_owned));
        lines.extend(
            history
                .iter()
                .filter(|entry| !entry.msg.is_empty())
                .map(|entry| format!("{}: {}", self.speaker_name(entry, name, members), entry.msg)),
        );
        lines.push(format!("{username}: {message}"));
        lines.push(format!("{name}:"));

        let text = lines
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .replace(CHAR_PLACEHOLDER, name)
            .replace(USER_PLACEHOLDER, username);

        let tokens = self.tokenizer.count(&text);
        debug!(tokens, prompt = %text, "Tokens");

        Prompt { text, tokens }
    }

    /// Like [`create_prompt`](Self::create_prompt) but returns only the text.
    pub fn create_prompt_text(&self, request: &PromptRequest<'_>) -> String {
        self.create_prompt(request).text
    }

    fn speaker_name<'a>(
        &'a self,
        entry: &ChatMessage,
        character_name: &'a str,
        members: &'a [Profile],
    ) -> &'a str {
        match &entry.speaker {
            Speaker::FromCharacter(_) => character_name,
            Speaker::FromMember(user_id) => members
                .iter()
                .find(|member| &member.user_id == user_id)
                .map(|member| member.handle.as_str())
                .unwrap_or(self.unknown_speaker.as_str()),
        }
    }
}

impl fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptBuilder")
            .field("unknown_speaker", &self.unknown_speaker)
            .finish_non_exhaustive()
    }
}
