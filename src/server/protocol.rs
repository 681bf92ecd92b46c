//! Wire protocol between clients and the server.
//!
//! Every WebSocket text frame carries exactly one JSON object tagged by its
//! `type` field. Move tokens are opaque: the server never looks inside them.

use actix::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::Color;

/// Client -> server messages.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Informational hello sent right after connecting. No reply.
    Connect {
        #[serde(default)]
        message: String,
    },
    /// Enqueue for a new game, or get paired with the longest-waiting player.
    FindGame,
    /// Play a move in the current game.
    Move {
        #[serde(rename = "move")]
        token: String,
    },
    /// Concede the current game.
    Resign,
    /// Report that the client's rules engine considers the game finished.
    GameEnd {
        #[serde(default)]
        result: String,
    },
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// Server -> client messages, delivered to connection handlers through the registry.
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "()")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameFound {
        color: Color,
    },
    Move {
        #[serde(rename = "move")]
        token: String,
    },
    GameOver {
        result: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerMessage {
    pub fn game_found(color: Color) -> Self {
        Self::GameFound { color }
    }
    pub fn relay_move(token: &str) -> Self {
        Self::Move { token: token.to_string() }
    }
    pub fn game_over(result: &str) -> Self {
        Self::GameOver { result: result.to_string() }
    }
    pub fn error(code: &str, message: &str) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}
