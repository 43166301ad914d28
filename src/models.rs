pub mod mining;
pub mod transactions;
pub mod users;

/// Opaque caller reference handed to us by the external auth layer.
/// The core never generates or validates one.
pub type Identity = String;

/// Balances are fixed-point integers, 1 unit = 0.1 USDT.
pub type Amount = i64;

pub const NANOS_PER_DAY: i64 = 24 * 60 * 60 * 1_000_000_000;
