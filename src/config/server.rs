/// Server configuration constants.
/// 
/// Listener address for the HTTP/WebSocket server.
pub const BIND_HOST: &str = "0.0.0.0";

/// Default port, overridden by the `PORT` environment variable when it holds a valid port.
pub const BIND_PORT: u16 = 8867;

/// Resolve the port to bind, preferring `PORT` from the environment.
pub fn bind_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(BIND_PORT)
}
