//! Errors returned by session manager operations.

use super::types::Color;

/// Protocol misuse detected by the session manager.
///
/// None of these mutate state; the offending request is dropped and the
/// mover is told why through an `error` message carrying [`SessionError::code`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("You are not in a game")]
    NotInGame,

    #[error("Not your turn: waiting for {expected}")]
    OutOfTurn { expected: Color },

    #[error("Move must not be empty")]
    EmptyMove,
}

impl SessionError {
    /// Stable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::NotInGame => "NOT_IN_GAME",
            SessionError::OutOfTurn { .. } => "OUT_OF_TURN",
            SessionError::EmptyMove => "EMPTY_MOVE",
        }
    }
}
