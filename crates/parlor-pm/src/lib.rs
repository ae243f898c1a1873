//! Prompt construction for Parlor role-play chats.
//!
//! The crate turns character and chat snapshots into a single text prompt
//! for a language model. [`format_character`] renders a [`Persona`] in one
//! of the WPP, SBF or Boostyle encodings, [`PromptBuilder`] assembles the
//! full prompt and counts its tokens, and [`export_character`] maps a
//! [`Character`] onto the Tavern and Ooba card schemas.

mod error;
mod export;
mod persona;
mod prompt;
mod schema;
mod tokenizer;

pub use error::PmError;
pub use export::{ExportTarget, ExportedCharacter, OobaCharacter, TavernCharacter, export_character};
pub use persona::format_character;
pub use prompt::{
    DEFAULT_UNKNOWN_SPEAKER, FALLBACK_USERNAME, Prompt, PromptBuilder, PromptRequest,
};
pub use schema::{Attributes, Character, Chat, ChatMessage, Persona, Profile, Speaker};
pub use tokenizer::{BpeTokenizer, Encoding, Tokenizer};
