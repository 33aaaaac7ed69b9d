//! Prototodo API server library.
//!
//! Exposes the building blocks (config, state, status taxonomy, RPC
//! handler, routes, client) so integration tests and both binaries can
//! access them.

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod router;
pub mod routes;
pub mod rpc;
pub mod state;
pub mod telemetry;
