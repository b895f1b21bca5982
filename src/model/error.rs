use thiserror::Error;

use super::Screen;

/// Everything a player action can be refused for. None of these are fatal:
/// the engine reports them and leaves the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("please enter a valid price")]
    InvalidGuess,
    #[error("you haven't made any matches yet")]
    NoMatchesYet { total: usize },
    #[error("match all {total} pairs before checking ({unmatched} still unmatched)")]
    IncompleteMatches { unmatched: usize, total: usize },
    #[error("resetting statistics cannot be undone and needs confirmation")]
    ConfirmationRequired,
    #[error("no game is in progress")]
    NoActiveGame,
    #[error("this round is already over")]
    SessionOver,
    #[error("{what} {index} does not exist (there are {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("cannot {action} from {from:?}")]
    InvalidTransition { from: Screen, action: &'static str },
    #[error("invalid custom settings: {0}")]
    InvalidCustomSettings(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidGuess
            | GameError::IndexOutOfRange { .. }
            | GameError::InvalidCustomSettings(_) => ErrorKind::Validation,
            GameError::NoMatchesYet { .. }
            | GameError::IncompleteMatches { .. }
            | GameError::NoActiveGame
            | GameError::SessionOver
            | GameError::InvalidTransition { .. } => ErrorKind::Precondition,
            GameError::ConfirmationRequired => ErrorKind::ConfirmationRequired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Precondition,
    ConfirmationRequired,
}
