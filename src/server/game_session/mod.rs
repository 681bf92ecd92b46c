pub mod session;

pub use session::GameSession;
#[cfg(test)]
pub use session::SessionSnapshot;
