//! Character export to third-party card schemas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PmError;
use crate::persona::format_character;
use crate::schema::Character;

/// Card schema to export a character to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    /// TavernAI character card.
    #[default]
    Tavern,
    /// text-generation-webui character.
    Ooba,
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tavern => "tavern",
            Self::Ooba => "ooba",
        })
    }
}

impl FromStr for ExportTarget {
    type Err = PmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tavern" => Ok(Self::Tavern),
            "ooba" => Ok(Self::Ooba),
            other => Err(PmError::UnknownExportTarget(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TavernCharacter {
    pub name: String,
    pub first_mes: String,
    pub scenario: String,
    pub description: String,
    pub mes_example: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OobaCharacter {
    pub char_name: String,
    pub char_greeting: String,
    pub world_scenario: String,
    pub char_persona: String,
    pub example_dialogue: String,
}

/// An exported character record. Serializes as the bare card object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExportedCharacter {
    Tavern(TavernCharacter),
    Ooba(OobaCharacter),
}

/// Map `character` onto the `target` card schema.
///
/// The persona is rendered with [`format_character`] in the character's own
/// encoding.
///
/// # Examples
///
/// ```
/// use parlor_pm::{Attributes, Character, ExportTarget, ExportedCharacter, Persona, export_character};
///
/// let character = Character {
///     name: "Rex".to_owned(),
///     persona: Persona::Boostyle(Attributes::from([("mind".to_owned(), vec!["loyal".to_owned()])])),
///     greeting: "Woof!".to_owned(),
///     scenario: "A park".to_owned(),
///     sample_chat: "Rex: Hello!".to_owned(),
/// };
///
/// let ExportedCharacter::Tavern(card) = export_character(&character, ExportTarget::Tavern) else {
///     panic!("expected a tavern card");
/// };
/// assert_eq!(card.description, "Rex + loyal");
/// assert_eq!(card.first_mes, "Woof!");
/// ```
pub fn export_character(character: &Character, target: ExportTarget) -> ExportedCharacter {
    let persona = format_character(&character.name, &character.persona);

    match target {
        ExportTarget::Tavern => ExportedCharacter::Tavern(TavernCharacter {
            name: character.name.clone(),
            first_mes: character.greeting.clone(),
            scenario: character.scenario.clone(),
            description: persona,
            mes_example: character.sample_chat.clone(),
        }),
        ExportTarget::Ooba => ExportedCharacter::Ooba(OobaCharacter {
            char_name: character.name.clone(),
            char_greeting: character.greeting.clone(),
            world_scenario: character.scenario.clone(),
            char_persona: persona,
            example_dialogue: character.sample_chat.clone(),
        }),
    }
}
