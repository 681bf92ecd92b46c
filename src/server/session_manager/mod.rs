/// Session manager module: matchmaking queue, game sessions and the connection registry.

pub mod server;
pub mod messages;

pub use server::SessionManager;
