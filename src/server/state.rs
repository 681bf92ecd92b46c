// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the address of the session manager actor, shared by every
//! WebSocket connection handler.

use actix::Addr;
use crate::server::session_manager::SessionManager;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the session manager actor (queue, sessions, connection registry).
    pub session_manager: Addr<SessionManager>,
}

impl AppState {
    /// Create a new AppState with the given actor address.
    pub fn new(session_manager: Addr<SessionManager>) -> Self {
        AppState { session_manager }
    }
}
