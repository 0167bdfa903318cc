use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

pub type CardId = String;

/// One prompt of the quiz. `content` is what must be matched against a
/// subregion; for flag games it is the subregion name and `img_url` carries
/// the picture actually shown.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Card {
    pub id: CardId,
    // Ground truth: the subregion this card was generated from
    pub subregion_name: String,
    pub content: String,
    pub img_url: Option<String>,
}

/// Which property of each subregion is being quizzed.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Name,
    Capital,
    Leader,
    Flag,
    Landmarks,
}

impl QuizMode {
    pub const ALL: [QuizMode; 5] = [
        QuizMode::Name,
        QuizMode::Capital,
        QuizMode::Leader,
        QuizMode::Flag,
        QuizMode::Landmarks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Name => "name",
            QuizMode::Capital => "capital",
            QuizMode::Leader => "leader",
            QuizMode::Flag => "flag",
            QuizMode::Landmarks => "landmarks",
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<QuizMode, QuizError> {
        QuizMode::ALL
            .iter()
            .cloned()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| QuizError::UnknownMode(s.to_string()))
    }
}

/// How much help the player gets while playing.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    // Correct subregion may be revealed on request
    Learn,
    // Hovering over a subregion reports whether it matches
    Train,
    Test,
}

impl GameType {
    pub fn allows_verify(self) -> bool {
        match self {
            GameType::Learn | GameType::Train => true,
            GameType::Test => false,
        }
    }

    pub fn allows_reveal(self) -> bool {
        self == GameType::Learn
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Learn => "learn",
            GameType::Train => "train",
            GameType::Test => "test",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<GameType, QuizError> {
        match s {
            "learn" => Ok(GameType::Learn),
            "train" => Ok(GameType::Train),
            "test" => Ok(GameType::Test),
            _ => Err(QuizError::UnknownGameType(s.to_string())),
        }
    }
}
