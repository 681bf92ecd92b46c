/// Game session configuration constants.
///
/// Reason texts carried by `game_over` messages when the server ends a session.
pub const OPPONENT_DISCONNECTED_REASON: &str = "Opponent disconnected";

/// Reason used when a finished game is reported without a result text.
pub const DEFAULT_GAME_OVER_REASON: &str = "Game Over";
