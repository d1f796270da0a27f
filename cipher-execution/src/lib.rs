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

//! # Cipher-Execution
//! The order lifecycle state machine, the spot and futures exchange
//! simulators that react to it, and the PNL / arbitrage math built on top.

/// Triangular-arbitrage evaluation over market snapshots.
pub mod arbitrage;

/// Errors raised by order transitions and balance accounting.
pub mod error;

/// The [`Exchange`](exchange::Exchange) contract and its spot and futures
/// simulators.
pub mod exchange;

/// Notification hook invoked on order lifecycle events.
pub mod notify;

/// The [`Order`](order::Order) entity and its lifecycle.
pub mod order;

/// Realized PNL and average-entry-price estimation.
pub mod pnl;
