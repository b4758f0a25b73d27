use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Best-of-N match format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum MatchFormat {
    #[default]
    #[serde(rename = "BEST_OF_3", alias = "best_of_3")]
    BestOf3,
    #[serde(rename = "BEST_OF_5", alias = "best_of_5")]
    BestOf5,
}

impl MatchFormat {
    /// Set wins needed to take the match.
    #[inline]
    pub fn sets_to_win(self) -> u8 {
        match self {
            MatchFormat::BestOf3 => 2,
            MatchFormat::BestOf5 => 3,
        }
    }

    #[inline]
    pub fn max_sets(self) -> u8 {
        self.sets_to_win() * 2 - 1
    }

    /// Maps the legacy `sets_to_win` request field onto a format.
    pub fn from_sets_to_win(sets: u8) -> Option<Self> {
        match sets {
            2 => Some(MatchFormat::BestOf3),
            3 => Some(MatchFormat::BestOf5),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchFormat::BestOf3 => "BEST_OF_3",
            MatchFormat::BestOf5 => "BEST_OF_5",
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEST_OF_3" | "BO3" | "3" => Ok(MatchFormat::BestOf3),
            "BEST_OF_5" | "BO5" | "5" => Ok(MatchFormat::BestOf5),
            other => Err(format!("Unknown match format: {}", other)),
        }
    }
}

/// Who serves the first game of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServeOrder {
    #[default]
    Player1,
    Player2,
    /// One extra uniform draw per trial decides the opening server.
    CoinToss,
}
