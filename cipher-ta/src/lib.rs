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

//! # Cipher-TA
//! Stateless technical indicators over candle matrices.
//!
//! Every indicator consumes a slice of candle rows
//! (`[timestamp, open, close, high, low, volume]`) plus scalar parameters
//! and a `sequential` flag:
//!
//! * `sequential = true` returns one value per input row, with `NaN` filling
//!   warmup positions that have no defined value yet;
//! * `sequential = false` trims the input to the newest
//!   [`WARMUP_CANDLES`](slice::WARMUP_CANDLES) rows and returns only the
//!   newest value (a one-element vector, or a one-element series per field
//!   for multi-series results).
//!
//! Indicators fail with [`IndicatorError::InsufficientData`](error::IndicatorError)
//! below their minimum row count and with
//! [`IndicatorError::InvalidParameter`](error::IndicatorError) for degenerate
//! parameters.

/// Errors raised by the indicator engine.
pub mod error;

/// Shared smoothing and window helpers the catalog is composed from.
pub mod helpers;

/// The indicator catalog.
pub mod indicators;

/// Input trimming shared by every indicator.
pub mod slice;

/// Candle-source selection (close, hl2, ohlc4, ...).
pub mod source;

/// Synthetic candle generators for tests and examples.
pub mod test_utils;

/// One candle row: `[timestamp, open, close, high, low, volume]`.
pub type CandleRow = [f64; 6];

pub use indicators::*;
