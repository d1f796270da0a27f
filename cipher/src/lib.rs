#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Cipher
//! The Cipher Trader engine: one composition root owning the route
//! registry, market-data state, exchange simulators, strategy dispatch,
//! mode-driven clock and persistence wiring.

/// Mode-driven time source.
pub mod clock;

/// Typed run configuration and debug-event masking.
pub mod config;

/// The engine composition root and its ingest/dispatch API.
pub mod engine;

/// Errors crossing the engine boundary.
pub mod error;

/// `tracing` subscriber initialisation.
pub mod logging;

/// Process-wide trading-mode switch.
pub mod mode;

/// The strategy trait and its per-tick context.
pub mod strategy;

/// Hashing, compression, encoding and identifier helpers.
pub mod util;

pub use engine::Engine;
pub use error::EngineError;
pub use mode::TradingMode;
pub use strategy::{Strategy, StrategyContext};

/// Technical-analysis catalog, re-exported for strategy authors.
pub use cipher_ta as ta;
