use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Fixed mood tag attached to a diary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Sad,
    Excited,
    Thoughtful,
    Grateful,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Sad,
        Mood::Excited,
        Mood::Thoughtful,
        Mood::Grateful,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Thoughtful => "thoughtful",
            Mood::Grateful => "grateful",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Calm => "😌",
            Mood::Sad => "😢",
            Mood::Excited => "🎉",
            Mood::Thoughtful => "🤔",
            Mood::Grateful => "🙏",
        }
    }

    /// "happy, calm, ..." for error messages.
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact_and_lowercase() {
        assert_eq!("grateful".parse::<Mood>(), Ok(Mood::Grateful));
        assert!("Happy".parse::<Mood>().is_err());
        assert!("furious".parse::<Mood>().is_err());
        assert!("".parse::<Mood>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Thoughtful).unwrap(), "\"thoughtful\"");
    }

    #[test]
    fn test_valid_list_names_all_six() {
        assert_eq!(
            Mood::valid_list(),
            "happy, calm, sad, excited, thoughtful, grateful"
        );
    }
}
