/// Session manager actor.
///
/// Owns the waiting queue, the active game sessions and the connection registry.
/// Every operation is one actor message handled to completion, so pairing, move relay
/// and disconnect cleanup never interleave. Outgoing messages are enqueued on the
/// recipients held in the registry; the manager itself never blocks on a connection.

use actix::prelude::*;
use std::collections::HashMap;
use log::{info, debug, warn};

use super::messages::{
    ConcludeGame, EndSession, FindGame, FindGameOutcome, MoveReceipt, RegisterConnection,
    RemovePlayer, SubmitMove,
};
use crate::config::game::OPPONENT_DISCONNECTED_REASON;
use crate::server::error::SessionError;
use crate::server::game_session::GameSession;
use crate::server::matchmaking::WaitingQueue;
use crate::server::protocol::ServerMessage;
use crate::server::types::{Color, PlayerId, SessionId};
use crate::server::ws_error::ws_session_error_message;

type ConnectionRecipient = Recipient<ServerMessage>;

/// Main session manager actor.
pub struct SessionManager {
    /// Players waiting for an opponent, longest-waiting first.
    queue: WaitingQueue,
    /// Active game sessions.
    sessions: HashMap<SessionId, GameSession>,
    /// Which session each paired player belongs to.
    player_sessions: HashMap<PlayerId, SessionId>,
    /// Outgoing channel of every connected player.
    connections: HashMap<PlayerId, ConnectionRecipient>,
}

impl SessionManager {
    /// Create an empty session manager.
    pub fn new() -> Self {
        Self {
            queue: WaitingQueue::new(),
            sessions: HashMap::new(),
            player_sessions: HashMap::new(),
            connections: HashMap::new(),
        }
    }

    /// Deliver a message to a player's connection.
    ///
    /// Returns false when the message could not be handed to a live connection.
    /// Failures are only logged: state already mutated by the caller stays as is.
    fn send_to(&self, player_id: &PlayerId, msg: ServerMessage) -> bool {
        let Some(recipient) = self.connections.get(player_id) else {
            warn!(
                "[SessionManager] No connection registered for player {}, dropping {:?}",
                player_id, msg
            );
            return false;
        };
        match recipient.try_send(msg) {
            Ok(()) => true,
            Err(SendError::Full(msg)) => {
                // Mailbox over capacity: still deliver, the peer is alive.
                warn!("[SessionManager] Mailbox of player {} is full, forcing delivery", player_id);
                recipient.do_send(msg);
                true
            }
            Err(SendError::Closed(msg)) => {
                warn!(
                    "[SessionManager] Connection of player {} is closed, dropping {:?}",
                    player_id, msg
                );
                false
            }
        }
    }

    fn session_of(&self, player_id: &PlayerId) -> Option<&GameSession> {
        self.player_sessions
            .get(player_id)
            .and_then(|session_id| self.sessions.get(session_id))
    }

    fn session_of_mut(&mut self, player_id: &PlayerId) -> Option<&mut GameSession> {
        let session_id = self.player_sessions.get(player_id)?;
        self.sessions.get_mut(session_id)
    }

    /// Remove a session and its player index entries.
    fn drop_session(&mut self, session_id: &SessionId) -> Option<GameSession> {
        let session = self.sessions.remove(session_id)?;
        for player_id in session.players() {
            self.player_sessions.remove(&player_id);
        }
        Some(session)
    }

    fn register_connection(&mut self, player_id: PlayerId, recipient: ConnectionRecipient) {
        if self.connections.insert(player_id, recipient).is_some() {
            debug!("[SessionManager] Connection of player {} replaced", player_id);
        } else {
            debug!("[SessionManager] Player {} connected", player_id);
        }
    }

    fn find_or_create_session(&mut self, player_id: PlayerId) -> FindGameOutcome {
        // Already playing: repeat the pairing result.
        if let Some(session) = self.session_of(&player_id) {
            let session_id = session.id;
            if let Some(color) = session.color_of(&player_id) {
                self.send_to(&player_id, ServerMessage::game_found(color));
                return FindGameOutcome::Resumed { session_id, color };
            }
        }

        // Already waiting: never enqueue twice, never pair with itself.
        if self.queue.contains(&player_id) {
            return FindGameOutcome::Queued;
        }

        match self.queue.pop_front() {
            Some(white) => {
                let session = GameSession::new(white, player_id);
                let session_id = session.id;
                self.player_sessions.insert(white, session_id);
                self.player_sessions.insert(player_id, session_id);
                self.sessions.insert(session_id, session);

                self.send_to(&white, ServerMessage::game_found(Color::White));
                self.send_to(&player_id, ServerMessage::game_found(Color::Black));
                info!(
                    "[SessionManager] Game {} created: white={} black={}",
                    session_id, white, player_id
                );
                FindGameOutcome::Paired {
                    session_id,
                    color: Color::Black,
                }
            }
            None => {
                self.queue.push(player_id);
                FindGameOutcome::Queued
            }
        }
    }

    fn submit_move(
        &mut self,
        player_id: PlayerId,
        token: &str,
    ) -> Result<MoveReceipt, SessionError> {
        let session = self.session_of_mut(&player_id).ok_or(SessionError::NotInGame)?;
        let ply = session.make_move(&player_id, token)?;
        let opponent = session
            .opponent_of(&player_id)
            .ok_or(SessionError::NotInGame)?;
        let session_id = session.id;
        let next_turn = session.current_turn();

        // The move stays recorded even if the relay cannot be delivered.
        let delivered = self.send_to(&opponent, ServerMessage::relay_move(token));
        Ok(MoveReceipt {
            session_id,
            opponent,
            ply,
            next_turn,
            delivered,
        })
    }

    fn remove_player(&mut self, player_id: PlayerId) -> Option<PlayerId> {
        if self.queue.remove(&player_id) {
            debug!("[SessionManager] Player {} left the waiting queue", player_id);
        }
        self.connections.remove(&player_id);

        let session_id = self.player_sessions.get(&player_id).copied()?;
        let session = self.drop_session(&session_id)?;
        let opponent = session.opponent_of(&player_id)?;
        self.send_to(&opponent, ServerMessage::game_over(OPPONENT_DISCONNECTED_REASON));
        info!(
            "[SessionManager] Game {} ended after {} moves: player {} disconnected",
            session_id,
            session.moves().len(),
            player_id
        );
        Some(opponent)
    }

    fn end_session(&mut self, session_id: SessionId, reason: &str) -> bool {
        let Some(session) = self.sessions.get(&session_id) else {
            debug!("[SessionManager] Game {} already ended", session_id);
            return false;
        };
        for player_id in session.players() {
            self.send_to(&player_id, ServerMessage::game_over(reason));
        }
        if let Some(session) = self.drop_session(&session_id) {
            info!(
                "[SessionManager] Game {} ended after {} moves: {}",
                session_id,
                session.moves().len(),
                reason
            );
        }
        true
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for SessionManager {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[SessionManager] Started");
    }
}

impl Handler<RegisterConnection> for SessionManager {
    type Result = ();

    fn handle(&mut self, msg: RegisterConnection, _ctx: &mut Self::Context) -> Self::Result {
        self.register_connection(msg.player_id, msg.recipient);
    }
}

impl Handler<FindGame> for SessionManager {
    type Result = MessageResult<FindGame>;

    fn handle(&mut self, msg: FindGame, _ctx: &mut Self::Context) -> Self::Result {
        let outcome = self.find_or_create_session(msg.player_id);
        match outcome {
            FindGameOutcome::Queued => debug!(
                "[SessionManager] Player {} waiting ({} in queue)",
                msg.player_id,
                self.queue.len()
            ),
            FindGameOutcome::Paired { session_id, color } => debug!(
                "[SessionManager] Player {} joined game {} as {}",
                msg.player_id, session_id, color
            ),
            FindGameOutcome::Resumed { session_id, color } => debug!(
                "[SessionManager] Player {} asked again for a game, still {} in {}",
                msg.player_id, color, session_id
            ),
        }
        MessageResult(outcome)
    }
}

impl Handler<SubmitMove> for SessionManager {
    type Result = Result<MoveReceipt, SessionError>;

    /// Rejected moves are reported to the mover; nothing is recorded or relayed.
    fn handle(&mut self, msg: SubmitMove, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.submit_move(msg.player_id, &msg.token);
        match &result {
            Ok(receipt) => {
                debug!(
                    "[SessionManager] Game {} move {}: {} played {:?}, {} to move",
                    receipt.session_id, receipt.ply, msg.player_id, msg.token, receipt.next_turn
                );
                if !receipt.delivered {
                    warn!(
                        "[SessionManager] Move {} of game {} not delivered to {}",
                        receipt.ply, receipt.session_id, receipt.opponent
                    );
                }
            }
            Err(err) => {
                warn!(
                    "[SessionManager] Move {:?} from player {} rejected: {}",
                    msg.token, msg.player_id, err
                );
                self.send_to(&msg.player_id, ws_session_error_message(err));
            }
        }
        result
    }
}

impl Handler<RemovePlayer> for SessionManager {
    type Result = MessageResult<RemovePlayer>;

    fn handle(&mut self, msg: RemovePlayer, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.remove_player(msg.player_id))
    }
}

impl Handler<EndSession> for SessionManager {
    type Result = MessageResult<EndSession>;

    fn handle(&mut self, msg: EndSession, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.end_session(msg.session_id, &msg.reason))
    }
}

impl Handler<ConcludeGame> for SessionManager {
    type Result = Result<SessionId, SessionError>;

    /// Ends the sender's game through `EndSession`, within this same message.
    fn handle(&mut self, msg: ConcludeGame, ctx: &mut Self::Context) -> Self::Result {
        let Some(session_id) = self.player_sessions.get(&msg.player_id).copied() else {
            let err = SessionError::NotInGame;
            warn!("[SessionManager] Player {} cannot end a game: {}", msg.player_id, err);
            self.send_to(&msg.player_id, ws_session_error_message(&err));
            return Err(err);
        };
        let end = EndSession {
            session_id,
            reason: msg.reason,
        };
        <Self as Handler<EndSession>>::handle(self, end, ctx);
        Ok(session_id)
    }
}

#[cfg(test)]
impl Handler<super::messages::LookupSession> for SessionManager {
    type Result = MessageResult<super::messages::LookupSession>;

    fn handle(
        &mut self,
        msg: super::messages::LookupSession,
        _ctx: &mut Self::Context,
    ) -> Self::Result {
        MessageResult(self.session_of(&msg.player_id).map(GameSession::snapshot))
    }
}
