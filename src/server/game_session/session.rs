/// State of one paired game: who plays which color, whose turn it is, and the move log.
///
/// Moves are opaque tokens; the session only enforces that the mover owns the turn.
use crate::server::error::SessionError;
use crate::server::types::{Color, PlayerId, SessionId};

pub struct GameSession {
    pub id: SessionId,
    white: PlayerId,
    black: PlayerId,
    current_turn: Color,
    moves: Vec<String>,
}

/// Read-only copy of a session, handed out of the session manager.
#[cfg(test)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub white: PlayerId,
    pub black: PlayerId,
    pub current_turn: Color,
    pub moves: Vec<String>,
}

impl GameSession {
    /// Pairs two distinct players. White always moves first.
    pub fn new(white: PlayerId, black: PlayerId) -> Self {
        debug_assert_ne!(white, black, "a player cannot be paired with itself");
        Self {
            id: SessionId::new(),
            white,
            black,
            current_turn: Color::White,
            moves: Vec::new(),
        }
    }

    pub fn player(&self, color: Color) -> PlayerId {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.white, self.black]
    }

    pub fn color_of(&self, player_id: &PlayerId) -> Option<Color> {
        if *player_id == self.white {
            Some(Color::White)
        } else if *player_id == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, player_id: &PlayerId) -> Option<PlayerId> {
        self.color_of(player_id).map(|color| self.player(color.opposite()))
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Records a move for `player_id` and hands the turn to the other side.
    ///
    /// Returns the number of moves in the log after this one. On error nothing is recorded.
    pub fn make_move(&mut self, player_id: &PlayerId, token: &str) -> Result<usize, SessionError> {
        let color = self.color_of(player_id).ok_or(SessionError::NotInGame)?;
        if token.trim().is_empty() {
            return Err(SessionError::EmptyMove);
        }
        if color != self.current_turn {
            return Err(SessionError::OutOfTurn { expected: self.current_turn });
        }
        self.moves.push(token.to_string());
        self.current_turn = self.current_turn.opposite();
        Ok(self.moves.len())
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            white: self.white,
            black: self.black,
            current_turn: self.current_turn,
            moves: self.moves.clone(),
        }
    }
}
