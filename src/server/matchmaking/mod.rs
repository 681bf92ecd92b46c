/// Matchmaking module: holds players waiting for an opponent.

pub mod queue;

pub use queue::WaitingQueue;
