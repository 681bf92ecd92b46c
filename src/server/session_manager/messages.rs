use actix::prelude::*;

use crate::server::error::SessionError;
#[cfg(test)]
use crate::server::game_session::SessionSnapshot;
use crate::server::protocol::ServerMessage;
use crate::server::types::{Color, PlayerId, SessionId};

/// Message: record the outgoing channel of a freshly connected player.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RegisterConnection {
    pub player_id: PlayerId,
    pub recipient: Recipient<ServerMessage>,
}

/// Message: pair the player with the longest-waiting one, or enqueue it.
#[derive(Message)]
#[rtype(result = "FindGameOutcome")]
pub struct FindGame {
    pub player_id: PlayerId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindGameOutcome {
    /// No opponent yet; `game_found` will be pushed once someone pairs with us.
    Queued,
    /// A new session was created with the requester as `color`.
    Paired { session_id: SessionId, color: Color },
    /// The requester already plays in `session_id`.
    Resumed { session_id: SessionId, color: Color },
}

/// Message: play a move in the sender's current session.
#[derive(Message)]
#[rtype(result = "Result<MoveReceipt, SessionError>")]
pub struct SubmitMove {
    pub player_id: PlayerId,
    pub token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveReceipt {
    pub session_id: SessionId,
    pub opponent: PlayerId,
    /// Number of moves in the session log, this one included.
    pub ply: usize,
    pub next_turn: Color,
    /// False when the relay could not be handed to the opponent's connection.
    pub delivered: bool,
}

/// Message: player disconnected. Returns the opponent notified of the game end, if any.
#[derive(Message)]
#[rtype(result = "Option<PlayerId>")]
pub struct RemovePlayer {
    pub player_id: PlayerId,
}

/// Message: notify both players with `game_over` and discard the session.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct EndSession {
    pub session_id: SessionId,
    pub reason: String,
}

/// Message: a player ends its own game (resignation or reported result).
#[derive(Message)]
#[rtype(result = "Result<SessionId, SessionError>")]
pub struct ConcludeGame {
    pub player_id: PlayerId,
    pub reason: String,
}

/// Message: read-only view of the player's current session.
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "Option<SessionSnapshot>")]
pub struct LookupSession {
    pub player_id: PlayerId,
}
