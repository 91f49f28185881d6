//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The service layer depends on these traits, not concrete implementations.

mod provider;
mod repository;

pub use provider::RateProvider;
pub use repository::RateRepository;
