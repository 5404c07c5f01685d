//! HTTP and WebSocket routing configuration.
//!
//! `/ws` upgrades to a player session; `/` and `/stats` are plain HTTP.

use actix_web::{web, HttpResponse, Responder};
use log::warn;
use crate::server::matchmaking::server::GetStats;
use crate::server::matchmaking::session::ws_matchmaking;
use crate::server::state::AppState;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/stats").route(web::get().to(stats)))
        .service(web::resource("/ws").to(ws_matchmaking));
}

async fn index() -> impl Responder {
    HttpResponse::Ok().body("hand cricket server is running")
}

async fn stats(data: web::Data<AppState>) -> HttpResponse {
    match data.matchmaking_addr.send(GetStats).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            warn!("[Router] Matchmaking server unavailable: {}", e);
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}
