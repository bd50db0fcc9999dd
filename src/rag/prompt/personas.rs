//! Assistant personas and their prompt instructions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selectable assistant persona.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Plain helpful assistant.
    #[default]
    Default,
    /// Speaks like Yoda.
    Yoda,
    /// Cheerful pirate slang.
    Pirate,
}

impl Persona {
    /// All selectable personas.
    pub const ALL: &'static [Self] = &[Self::Default, Self::Yoda, Self::Pirate];

    /// Stable identifier for APIs and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Yoda => "yoda",
            Self::Pirate => "pirate",
        }
    }

    /// System instruction injected ahead of the context.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Default => "You are a helpful AI assistant. Answer clearly and concisely.",
            Self::Yoda => {
                "You are Yoda from Star Wars. Speak in Yoda's style: rearrange sentences, \
                 use wisdom and 'hmm' often. Example: 'Much to learn, you still have.'"
            }
            Self::Pirate => {
                "You are a cheerful pirate. Use pirate slang like 'ahoy', 'matey', 'arr', \
                 'treasure'. Talk about the sea and sailing."
            }
        }
    }

    /// Lossy parsing: unknown names fall back to the default persona.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse error for [`Persona`].
#[derive(Debug, Clone)]
pub struct PersonaParseError {
    value: String,
}

impl fmt::Display for PersonaParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown persona: {}", self.value)
    }
}

impl std::error::Error for PersonaParseError {}

impl FromStr for Persona {
    type Err = PersonaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "yoda" => Ok(Self::Yoda),
            "pirate" => Ok(Self::Pirate),
            other => Err(PersonaParseError {
                value: other.to_string(),
            }),
        }
    }
}
