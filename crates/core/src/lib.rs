//! Domain core of the to-do service: the item model, the repository
//! contract it is persisted through, and the service the request handler
//! calls.

pub mod error;
pub mod memory;
pub mod repository;
pub mod service;
pub mod stream;
pub mod todo;
pub mod types;
