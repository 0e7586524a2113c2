//! Risk score over a set of findings
//!
//! Start at 100, apply a per-flag delta, clamp once at the end. Because the
//! clamp is applied after summation the result does not depend on order.

use termscope_common::{Finding, Flag};

pub const BASE_SCORE: i64 = 100;
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Score delta contributed by one flag
pub fn flag_delta(flag: Flag) -> i64 {
    match flag {
        Flag::Critical => -15,
        Flag::Warning => -7,
        Flag::Good => 5,
        Flag::Info => 0,
    }
}

/// Compute the 0..=100 score for a list of findings
pub fn score(findings: &[Finding]) -> u8 {
    let total = findings
        .iter()
        .fold(BASE_SCORE, |acc, f| acc.saturating_add(flag_delta(f.flag)));
    total.clamp(MIN_SCORE, MAX_SCORE) as u8
}
