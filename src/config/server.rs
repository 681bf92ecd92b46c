/// Network configuration constants.
///
/// Defaults for the listening address and the WebSocket endpoint path.
/// Host and port can be overridden from the command line.
pub const DEFAULT_HOST: &str = "localhost";

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 5555;

/// Path of the WebSocket endpoint players connect to.
pub const WS_PATH: &str = "/ws";

/// Largest client message accepted once its fragments are reassembled, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;
