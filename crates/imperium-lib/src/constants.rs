//! Tuning constants shared by the calculator, resolver and scanner.

/// Per-level stat growth. A module at level `L` yields `base * STAT_MULTIPLIER^(L-1)`.
pub const STAT_MULTIPLIER: f64 = 1.15;

/// Per-level cost growth. A module at level `L` costs `base * L^COST_EXPONENT`.
pub const COST_EXPONENT: f64 = 1.5;

/// Reported as `estimated_ticks` for production-gated research when the
/// player produces none of the gating resource.
pub const UNREACHABLE_TICKS: u64 = 999_999;

/// Default interval between construction queue scans.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 10;

/// Milliseconds per build-time minute.
pub const MILLIS_PER_MINUTE: i64 = 60_000;
