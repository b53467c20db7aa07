//! Starclaim engine library.
//!
//! Exposes the world model, turn resolution, the strategist, and the
//! session and protocol layers for the binaries and integration tests.

pub mod config;
pub mod engine;
pub mod eval;
pub mod protocol;
pub mod random;
pub mod resolve;
pub mod selfplay;
pub mod strategist;
pub mod world;
