/// WebSocket connection handler.
///
/// This actor owns a single player's connection. It decodes client frames,
/// forwards requests to the session manager, and serializes server messages
/// (pairing results, relayed moves, game over, errors) back to the client.
/// Closing the connection, for any reason, removes the player from the session manager.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};

use super::fragments::{FragmentError, Fragments};
use super::state::HandlerState;
use crate::config::game::DEFAULT_GAME_OVER_REASON;
use crate::server::protocol::{ClientMessage, ServerMessage};
use crate::server::session_manager::SessionManager;
use crate::server::session_manager::messages::{
    ConcludeGame, FindGame, RegisterConnection, RemovePlayer, SubmitMove,
};
use crate::server::error::SessionError;
use crate::server::types::PlayerId;
use crate::server::ws_error::{
    ws_invalid_message, ws_session_error_message, ws_unsupported_frame_message,
};

/// Represents one player's WebSocket connection.
pub struct ConnectionHandler {
    pub player_id: PlayerId,
    pub peer: String,
    pub state: HandlerState,
    pub session_manager: Addr<SessionManager>,
    /// Text message currently arriving in fragments.
    fragments: Fragments,
}

impl ConnectionHandler {
    pub fn new(session_manager: Addr<SessionManager>, peer: String) -> Self {
        Self {
            player_id: PlayerId::new(),
            peer,
            state: HandlerState::Connected,
            session_manager,
            fragments: Fragments::new(),
        }
    }

    /// Write a server message to the client without touching the local state.
    fn send_json(&self, ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: close the connection.
                warn!(
                    "[Connection] Failed to serialize {:?} for player {}: {}",
                    msg, self.player_id, e
                );
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }

    fn reject_frame(&self, ctx: &mut ws::WebsocketContext<Self>, reply: ServerMessage) {
        warn!("[Connection] Dropped frame from player {}: {:?}", self.player_id, reply);
        self.send_json(ctx, &reply);
    }

    /// Decodes one complete text message; malformed input is dropped, the connection stays.
    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match ClientMessage::decode(text) {
            Ok(client_msg) => self.handle_client_message(client_msg, ctx),
            Err(e) => self.reject_frame(ctx, ws_invalid_message(&e.to_string())),
        }
    }

    fn reject_not_in_game(&self, ctx: &mut ws::WebsocketContext<Self>, request: &str) {
        warn!("[Connection] Player {} sent {} while {:?}", self.player_id, request, self.state);
        self.send_json(ctx, &ws_session_error_message(&SessionError::NotInGame));
    }

    /// Dispatch one decoded client message.
    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg {
            ClientMessage::Connect { message } => {
                debug!("[Connection] Player {} says: {}", self.player_id, message);
            }
            ClientMessage::FindGame => {
                self.state = self.state.on_find_game();
                self.session_manager.do_send(FindGame {
                    player_id: self.player_id,
                });
            }
            ClientMessage::Move { token } => {
                if !self.state.is_in_game() {
                    self.reject_not_in_game(ctx, "move");
                    return;
                }
                self.session_manager.do_send(SubmitMove {
                    player_id: self.player_id,
                    token,
                });
            }
            ClientMessage::Resign => {
                let Some(color) = self.state.color() else {
                    self.reject_not_in_game(ctx, "resign");
                    return;
                };
                self.session_manager.do_send(ConcludeGame {
                    player_id: self.player_id,
                    reason: format!("{} resigned", color.title()),
                });
            }
            ClientMessage::GameEnd { result } => {
                if !self.state.is_in_game() {
                    self.reject_not_in_game(ctx, "game_end");
                    return;
                }
                let reason = if result.trim().is_empty() {
                    DEFAULT_GAME_OVER_REASON.to_string()
                } else {
                    result
                };
                self.session_manager.do_send(ConcludeGame {
                    player_id: self.player_id,
                    reason,
                });
            }
        }
    }
}

impl Actor for ConnectionHandler {
    type Context = ws::WebsocketContext<Self>;

    /// Registers the connection's outgoing channel with the session manager.
    fn started(&mut self, ctx: &mut Self::Context) {
        info!("[Connection] New connection from {} as player {}", self.peer, self.player_id);
        self.session_manager.do_send(RegisterConnection {
            player_id: self.player_id,
            recipient: ctx.address().recipient(),
        });
    }

    /// Removes the player from the queue or its game; the opponent is told the game is over.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.state = HandlerState::Closed;
        self.session_manager.do_send(RemovePlayer {
            player_id: self.player_id,
        });
        info!("[Connection] Player {} ({}) disconnected", self.player_id, self.peer);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionHandler {
    /// Handles incoming WebSocket frames from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                if self.fragments.abort() {
                    let e = FragmentError::Interrupted;
                    self.reject_frame(ctx, ws_invalid_message(&e.to_string()));
                }
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Continuation(item)) => match self.fragments.push(item) {
                Ok(Some(text)) => self.handle_text(&text, ctx),
                Ok(None) => (),
                Err(FragmentError::Binary) => {
                    self.reject_frame(ctx, ws_unsupported_frame_message())
                }
                Err(e) => self.reject_frame(ctx, ws_invalid_message(&e.to_string())),
            },
            Ok(ws::Message::Binary(_)) => self.reject_frame(ctx, ws_unsupported_frame_message()),
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => (),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                // Undecodable frame: treat as a lost connection.
                warn!("[Connection] Protocol error from player {}: {}", self.player_id, e);
                ctx.stop();
            }
        }
    }
}

impl Handler<ServerMessage> for ConnectionHandler {
    type Result = ();

    /// Handles messages pushed by the session manager to this connection.
    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        self.state = self.state.on_server_message(&msg);
        self.send_json(ctx, &msg);
    }
}

/// WebSocket endpoint players connect to.
///
/// Every connection gets a fresh player identity; no query parameters are needed.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let peer = req
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    ws::start(
        ConnectionHandler::new(data.session_manager.clone(), peer),
        &req,
        stream,
    )
}
