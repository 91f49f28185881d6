//! Rate provider adapters.
//!
//! - [`HttpRateProvider`]: fetches `{base_url}/latest/{BASE}` over HTTP.
//! - [`FixedRateProvider`]: serves the built-in reference table, for development.

mod fixed;
mod http;

pub use fixed::FixedRateProvider;
pub use http::HttpRateProvider;
