/// Matchmaking module: pairs players, hosts their matches and routes their moves.

pub mod messages;
pub mod registry;
pub mod server;
pub mod session;
