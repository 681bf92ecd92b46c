/// FIFO waiting queue for players who asked for a game and have no opponent yet.
///
/// A player appears at most once; the longest-waiting player is always paired first.
use std::collections::VecDeque;

use crate::server::types::PlayerId;

#[derive(Debug, Default)]
pub struct WaitingQueue {
    players: VecDeque<PlayerId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a player at the tail. Returns false if the player was already waiting.
    pub fn push(&mut self, player_id: PlayerId) -> bool {
        if self.contains(&player_id) {
            return false;
        }
        self.players.push_back(player_id);
        true
    }

    /// Pops the longest-waiting player.
    pub fn pop_front(&mut self) -> Option<PlayerId> {
        self.players.pop_front()
    }

    /// Removes a player wherever it sits in the queue. Returns true if it was present.
    pub fn remove(&mut self, player_id: &PlayerId) -> bool {
        match self.players.iter().position(|p| p == player_id) {
            Some(idx) => {
                self.players.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.contains(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
