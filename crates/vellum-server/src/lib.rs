//! HTTP server for Vellum.
//!
//! Exposes artifact CRUD and ordered collation over HTTP:
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/artifacts` | 200, sorted JSON array of keys |
//! | GET | `/artifacts/:key` | 200, raw bytes |
//! | PUT | `/artifacts/:key` | 204 |
//! | DELETE | `/artifacts/:key` | 204 |
//! | GET | `/collation?artifacts=k1,k2` | 200, concatenated bytes |
//!
//! Missing artifacts answer 404, malformed requests 400, and anything else
//! 500 with the detail logged server-side only.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{status_for, ServerError, ServerResult};
pub use handler::AppState;
pub use server::VellumServer;
