// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Matchmaking and match hosting (pairing, ball timers, disconnect teardown)
//! - Protocol error frames

pub mod state;
pub mod router;
pub mod matchmaking;
pub mod ws_error;
