//! Local view of a connection's progress through matchmaking and play.
//!
//! The session manager stays authoritative; this view only lets the handler reject
//! requests that cannot be valid (a move while not in a game) without a round trip.

use crate::server::protocol::ServerMessage;
use crate::server::types::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerState {
    /// Connected, no game requested yet.
    Connected,
    /// `find_game` sent, waiting for an opponent.
    Searching,
    /// Previous game ended; may search again.
    Idle,
    InGame { color: Color },
    /// Terminal.
    Closed,
}

impl HandlerState {
    /// Transition for an outgoing `find_game`.
    pub fn on_find_game(self) -> Self {
        match self {
            HandlerState::Connected | HandlerState::Idle | HandlerState::Searching => {
                HandlerState::Searching
            }
            other => other,
        }
    }

    /// Transition for a message about to be written to the client.
    pub fn on_server_message(self, msg: &ServerMessage) -> Self {
        if self == HandlerState::Closed {
            return self;
        }
        match msg {
            ServerMessage::GameFound { color } => HandlerState::InGame { color: *color },
            ServerMessage::GameOver { .. } => HandlerState::Idle,
            _ => self,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            HandlerState::InGame { color } => Some(color),
            _ => None,
        }
    }

    pub fn is_in_game(self) -> bool {
        self.color().is_some()
    }
}
