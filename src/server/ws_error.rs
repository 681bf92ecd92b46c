/// Centralized helpers for WebSocket error replies.
///
/// Use these helpers so every rejected request reaches the client with a stable code
/// and a human-readable message. Errors never close the connection.
use super::error::SessionError;
use super::protocol::ServerMessage;

pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
pub const UNSUPPORTED_FRAME: &str = "UNSUPPORTED_FRAME";

/// Builds an `error` message for the given code.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "INVALID_MESSAGE").
/// - `message`: Human-readable error message (in English).
pub fn ws_error_message(code: &str, message: &str) -> ServerMessage {
    ServerMessage::error(code, message)
}

/// Returns the `error` message for a rejected session manager operation.
pub fn ws_session_error_message(err: &SessionError) -> ServerMessage {
    ws_error_message(err.code(), &err.to_string())
}

/// Returns the `error` message for a frame that could not be decoded as a client message.
pub fn ws_invalid_message(detail: &str) -> ServerMessage {
    ws_error_message(INVALID_MESSAGE, &format!("Invalid client message: {}", detail))
}

/// Returns the `error` message for binary frames, fragmented or not.
pub fn ws_unsupported_frame_message() -> ServerMessage {
    ws_error_message(UNSUPPORTED_FRAME, "Only JSON text frames are supported")
}
