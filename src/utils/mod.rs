//! Shared utilities
//!
//! Currently the deterministic RNG used for weight initialization and
//! synthetic data.

pub mod rng;

pub use rng::SimpleRng;
