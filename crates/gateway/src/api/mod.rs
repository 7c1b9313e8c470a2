//! HTTP API server implementation

pub mod handlers;
pub mod routes;
pub mod server;
pub mod validation;

pub use server::ApiServer;
