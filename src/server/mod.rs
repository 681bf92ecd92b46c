// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Wire protocol and error replies
//! - Matchmaking queue and game sessions
//! - The session manager actor and per-connection handlers

pub mod state;
pub mod router;
pub mod types;
pub mod protocol;
pub mod error;
pub mod ws_error;
pub mod matchmaking;
pub mod game_session;
pub mod session_manager;
pub mod connection;
