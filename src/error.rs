use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("unknown quiz mode {0:?} (expected name, capital, leader, flag or landmarks)")]
    UnknownMode(String),

    #[error("unknown game type {0:?} (expected learn, train or test)")]
    UnknownGameType(String),

    #[error("no gameplay session with id {0}")]
    SessionNotFound(String),

    #[error("invalid grade table: {0}")]
    InvalidGradeTable(String),

    #[error("game still has {0} cards remaining")]
    GameNotFinished(usize),
}

impl QuizError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> QuizError {
        QuizError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json<P: Into<PathBuf>>(path: P, source: serde_json::Error) -> QuizError {
        QuizError::Json {
            path: path.into(),
            source,
        }
    }
}
