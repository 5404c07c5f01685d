//! Main entry point for the backend server.
//!
//! Initializes logging, starts the matchmaking actor, and launches the HTTP server
//! with the player WebSocket endpoint.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;
use server::matchmaking::server::MatchmakingServer;

use crate::config::server::{bind_port, BIND_HOST};
use crate::game::state::MatchSettings;

pub mod config;
mod server;
mod game;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Start the MatchmakingServer actor (handles pairing, matches and ball timers).
    let matchmaking_addr = MatchmakingServer::new(MatchSettings::default()).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(matchmaking_addr));

    let port = bind_port();
    info!("WebSocket server is running on {}:{}", BIND_HOST, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((BIND_HOST, port))?
    .run()
    .await
}
