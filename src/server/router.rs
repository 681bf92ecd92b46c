//! HTTP and WebSocket routing configuration.
//!
//! Players reach the server through a single WebSocket endpoint; each
//! connection is handled by its own actor.

use actix_web::web;
use crate::config::server::WS_PATH;
use crate::server::connection::handler::ws_connect;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(WS_PATH)
            .to(ws_connect)
    );
}
