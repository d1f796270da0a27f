//! The indicator catalog.
//!
//! Functions are grouped by family; everything re-exports flat from
//! `cipher_ta` so call sites read `cipher_ta::ema(...)`.

pub mod momentum;
pub mod moving_averages;
pub mod statistics;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use momentum::{
    AcResult, AoResult, AroonResult, acosc, ao, aroon, aroonosc, bop, cci, cfo, cg, cmo, dti, efi,
};
pub use moving_averages::{Alligator, alligator, alma, cwma, dema, edcf, ema, epma};
pub use statistics::{CorrelationCycleResult, beta, correl, correlation_cycle};
pub use trend::{CkspResult, DiResult, DmResult, DonchianResult, adx, adxr, cksp, di, dm, donchian};
pub use volatility::{DamianiVolatmeterResult, atr, bbw, chop, damiani_volatmeter};
pub use volume::{ad, adosc, avgprice};
