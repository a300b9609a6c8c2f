//! Per-opponent statistics.
//!
//! Rates are kept as incremental running means so that one observed action
//! costs O(1), except the aggression factor which is recomputed from the
//! full action history.

use serde::{Deserialize, Serialize};

use super::action::{ActionRecord, ShowdownRecord, ShowdownResult};

/// Rolling statistics for one opponent address.
///
/// All rates lie in [0, 1] except `af`, which is any non-negative ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentStats {
    pub address: String,
    pub hands_played: u64,
    /// Voluntarily put money in pot.
    pub vpip: f64,
    /// Preflop raise.
    pub pfr: f64,
    /// Aggression factor.
    pub af: f64,
    /// Went to showdown.
    pub wtsd: f64,
    /// Won at showdown.
    pub wsd: f64,
    pub cbet: f64,
    pub fold_to_cbet: f64,
    pub three_bet: f64,
    pub fold_to_three_bet: f64,
}

impl OpponentStats {
    /// Fresh statistics: every rate 0, aggression factor 1.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hands_played: 0,
            vpip: 0.0,
            pfr: 0.0,
            af: 1.0,
            wtsd: 0.0,
            wsd: 0.0,
            cbet: 0.0,
            fold_to_cbet: 0.0,
            three_bet: 0.0,
            fold_to_three_bet: 0.0,
        }
    }

    /// Recompute showdown rates from the showdown history.
    pub fn refresh_showdowns(&mut self, showdowns: &[ShowdownRecord]) {
        let total = showdowns.len() as f64;
        let wins = showdowns
            .iter()
            .filter(|s| s.result == ShowdownResult::Win)
            .count() as f64;

        self.wtsd = if self.hands_played == 0 {
            0.0
        } else {
            total / self.hands_played as f64
        };
        self.wsd = if showdowns.is_empty() { 0.0 } else { wins / total };
    }
}

/// Fold one sample into a running mean over `count` samples.
///
/// The mean is left unchanged while `count <= 1`.
pub fn running_mean(mean: f64, sample: f64, count: u64) -> f64 {
    if count <= 1 {
        mean
    } else {
        mean + (sample - mean) / count as f64
    }
}

/// Indicator sample for `running_mean`.
#[inline]
pub fn sample(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

/// Aggressive actions divided by calls over a whole history.
///
/// With no calls the raise count itself is returned, or 1 when there were
/// no raises either.
pub fn aggression_factor(history: &[ActionRecord]) -> f64 {
    let raises = history.iter().filter(|r| r.action.is_aggressive()).count();
    let calls = history.iter().filter(|r| r.action.is_call()).count();

    match (raises, calls) {
        (0, 0) => 1.0,
        (r, 0) => r as f64,
        (r, c) => r as f64 / c as f64,
    }
}
