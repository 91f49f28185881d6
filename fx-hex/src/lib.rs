//! # FX Hex
//!
//! Application layer and HTTP adapter for the FX conversion service.
//!
//! ## Architecture
//!
//! - `cache/` - Per-base provider rate cache with stampede protection
//! - `service/` - Conversion pipeline (identity, override, provider)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `R: RateRepository`, allowing
//! different store implementations to be injected.

pub mod cache;
pub mod inbound;
pub mod openapi;
pub mod service;


pub use cache::{CacheConfig, CacheSnapshot, RateCache, StalePolicy};
pub use service::ConversionService;
