//! Process exit codes
//!
//! The harness contract is binary: every failure exits with 1.

/// Successful termination
pub const OK: i32 = 0;

/// Any failure: unmet precondition, failed step, or usage error
pub const FAILURE: i32 = 1;
