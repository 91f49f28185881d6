//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the conversion service.

pub mod handlers;
mod rate_limit;
mod server;

pub use rate_limit::RateLimiterState;
pub use server::HttpServer;
