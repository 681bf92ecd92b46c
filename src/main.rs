//! Main entry point for the relay server.
//!
//! Initializes logging, starts the session manager actor, and launches the HTTP server
//! with the WebSocket endpoint players connect to.

use actix::Actor;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use cli::CliArgs;
use server::session_manager::SessionManager;

mod cli;
pub mod config;
mod server;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    if let Err(e) = run(&args).await {
        // Only startup failures (e.g. the port is taken) end up here.
        eprintln!("Server error: {}", e);
        wait_for_acknowledgment().await;
        return Err(e);
    }
    Ok(())
}

async fn run(args: &CliArgs) -> std::io::Result<()> {
    // Start the SessionManager actor (queue, sessions and connection registry).
    let session_manager = SessionManager::new().start();

    // Shared application state for WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(session_manager));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((args.host.as_str(), args.port))?;

    info!("[Server] Chess relay started on {}:{}", args.host, args.port);
    info!("[Server] Waiting for players to connect...");

    server.run().await
}

/// Block until the operator presses Enter, so the error stays visible.
async fn wait_for_acknowledgment() {
    eprintln!("Press Enter to exit...");
    let mut line = String::new();
    let _ = BufReader::new(tokio::io::stdin()).read_line(&mut line).await;
}
