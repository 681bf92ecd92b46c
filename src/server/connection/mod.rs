/// Connection module: one WebSocket actor per player connection.

pub mod fragments;
pub mod handler;
pub mod state;
