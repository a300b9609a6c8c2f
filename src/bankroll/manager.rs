//! Bankroll ledger, Kelly wager sizing and risk gates.
//!
//! All money is held as exact integers in the smallest currency unit.
//! Probabilities are `f64`; the two only meet when a Kelly fraction is turned
//! into a wager, where the fraction is quantized to billionths and applied
//! with integer arithmetic.
//!
//! A wager moves through `Idle -> Reserved -> Idle`: [`BankrollManager::reserve_for_match`]
//! moves funds from available to in-play, and [`BankrollManager::record_result`]
//! settles them. Only one wager may be reserved at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::{BankrollConfig, ConfigError};
use crate::{unix_millis, Amount, Profit};

/// Resolution of a wager fraction: 1 part in a billion.
pub const FRACTION_SCALE: Amount = 1_000_000_000;

/// Payout ratio of an even-money match.
pub const EVEN_MONEY: f64 = 1.0;

/// Session loss, as a divisor of the start balance, that stops play.
const STOP_LOSS_DIVISOR: Amount = 5;

/// Largest wager against an unknown opponent, as a divisor of the total balance.
const UNKNOWN_OPPONENT_DIVISOR: Amount = 20;

pub const REASON_INSUFFICIENT_BALANCE: &str = "Insufficient balance";
pub const REASON_EXCEEDS_MAX_RISK: &str = "Wager exceeds max risk";
pub const REASON_NEGATIVE_EV: &str = "Negative expected value";
pub const REASON_STOP_LOSS: &str = "Session stop-loss reached";
pub const REASON_UNKNOWN_OPPONENT: &str = "High wager against unknown opponent";
pub const REASON_FAVORABLE: &str = "Conditions favorable";

/// Balances of the ledger.
///
/// `total_balance == available_balance + in_play` after every mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankrollState {
    pub total_balance: Amount,
    pub available_balance: Amount,
    pub in_play: Amount,
    pub session_profit: Profit,
    pub all_time_profit: Profit,
}

/// Bookkeeping for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub start_balance: Amount,
    pub current_balance: Amount,
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    /// Largest net profit of a single won match.
    pub biggest_win: Profit,
    /// Largest wager lost in a single match.
    pub biggest_loss: Amount,
    /// Unix time in milliseconds.
    pub start_time_ms: u64,
}

impl SessionStats {
    /// Fraction of settled matches won, 0 before the first match.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.wins as f64 / self.games_played as f64
        }
    }

    pub fn duration_secs(&self) -> u64 {
        unix_millis().saturating_sub(self.start_time_ms) / 1000
    }
}

/// Outcome of the play gate. A rejection is ordinary data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayDecision {
    pub should_play: bool,
    pub reason: String,
}

impl PlayDecision {
    fn play() -> Self {
        Self {
            should_play: true,
            reason: REASON_FAVORABLE.to_string(),
        }
    }

    fn reject(reason: &str) -> Self {
        Self {
            should_play: false,
            reason: reason.to_string(),
        }
    }
}

/// Settlement requests that do not match the reserved wager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankrollError {
    /// A result was recorded while no wager was reserved.
    NoReservation { wager: Amount },
    /// The settled wager differs from the reserved one.
    WagerMismatch { reserved: Amount, wager: Amount },
}

impl fmt::Display for BankrollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankrollError::NoReservation { wager } => {
                write!(f, "Cannot settle wager {}: no wager is reserved", wager)
            }
            BankrollError::WagerMismatch { reserved, wager } => {
                write!(f, "Cannot settle wager {}: reserved wager is {}", wager, reserved)
            }
        }
    }
}

impl std::error::Error for BankrollError {}

/// Point-in-time report of the bankroll.
#[derive(Debug, Clone, Serialize)]
pub struct BankrollSummary {
    pub state: BankrollState,
    pub session: SessionStats,
    pub win_rate: f64,
    pub session_duration_secs: u64,
    pub reserved_wager: Option<Amount>,
}

impl fmt::Display for BankrollSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total balance:     {}", self.state.total_balance)?;
        writeln!(f, "Available:         {}", self.state.available_balance)?;
        writeln!(f, "In play:           {}", self.state.in_play)?;
        writeln!(f, "Session profit:    {}", self.state.session_profit)?;
        writeln!(f, "All-time profit:   {}", self.state.all_time_profit)?;
        writeln!(
            f,
            "Games played:      {} ({}W / {}L, {:.1}% won)",
            self.session.games_played,
            self.session.wins,
            self.session.losses,
            self.win_rate * 100.0
        )?;
        writeln!(f, "Biggest win:       {}", self.session.biggest_win)?;
        writeln!(f, "Biggest loss:      {}", self.session.biggest_loss)?;
        write!(f, "Session duration:  {}s", self.session_duration_secs)
    }
}

/// Convert an amount to a signed profit, saturating at the top of the range.
fn to_profit(amount: Amount) -> Profit {
    Profit::try_from(amount).unwrap_or(Profit::MAX)
}

/// `floor(amount * parts / FRACTION_SCALE)` without overflowing.
fn apply_fraction(amount: Amount, parts: Amount) -> Amount {
    let whole = amount / FRACTION_SCALE;
    let rest = amount % FRACTION_SCALE;
    whole * parts + rest * parts / FRACTION_SCALE
}

/// Owns the ledger for one agent.
#[derive(Debug, Clone)]
pub struct BankrollManager {
    config: BankrollConfig,
    state: BankrollState,
    session: SessionStats,
    reserved: Option<Amount>,
}

impl BankrollManager {
    /// Create a manager holding `initial_balance`, all of it available.
    pub fn new(initial_balance: Amount, config: BankrollConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            state: BankrollState {
                total_balance: initial_balance,
                available_balance: initial_balance,
                in_play: 0,
                session_profit: 0,
                all_time_profit: 0,
            },
            session: SessionStats {
                start_balance: initial_balance,
                current_balance: initial_balance,
                games_played: 0,
                wins: 0,
                losses: 0,
                biggest_win: 0,
                biggest_loss: 0,
                start_time_ms: unix_millis(),
            },
            reserved: None,
        })
    }

    pub fn config(&self) -> &BankrollConfig {
        &self.config
    }

    pub fn state(&self) -> &BankrollState {
        &self.state
    }

    pub fn session_stats(&self) -> &SessionStats {
        &self.session
    }

    /// The wager currently in play, if any.
    pub fn reserved_wager(&self) -> Option<Amount> {
        self.reserved
    }

    pub fn summary(&self) -> BankrollSummary {
        BankrollSummary {
            state: self.state.clone(),
            session: self.session.clone(),
            win_rate: self.session.win_rate(),
            session_duration_secs: self.session.duration_secs(),
            reserved_wager: self.reserved,
        }
    }

    /// Fractional-Kelly wager for a match, capped at the max risk fraction
    /// of the available balance.
    ///
    /// `payout_ratio` is the net amount won per unit staked ([`EVEN_MONEY`] = 1).
    pub fn calculate_optimal_wager(&self, win_probability: f64, payout_ratio: f64) -> Amount {
        if payout_ratio.is_nan() || payout_ratio <= 0.0 || win_probability.is_nan() {
            return 0;
        }
        let p = win_probability.clamp(0.0, 1.0);

        let kelly = (payout_ratio * p - (1.0 - p)) / payout_ratio;
        let fraction = (kelly * self.config.kelly_fraction)
            .max(0.0)
            .min(self.config.max_risk_percent);

        // Rounding may land a billionth above the cap, so clamp again in parts
        let cap = (self.config.max_risk_percent * FRACTION_SCALE as f64).floor() as Amount;
        let parts = ((fraction * FRACTION_SCALE as f64).round() as Amount).min(cap);
        apply_fraction(self.state.available_balance, parts)
    }

    /// Decide whether a match at `wager` should be played. The first failing
    /// check determines the reason.
    pub fn should_play_match(
        &self,
        wager: Amount,
        estimated_win_prob: f64,
        opponent_unknown: bool,
    ) -> PlayDecision {
        let total = self.state.total_balance;

        if self.state.available_balance < wager {
            return PlayDecision::reject(REASON_INSUFFICIENT_BALANCE);
        }

        let risk = if total == 0 {
            0.0
        } else {
            wager as f64 / total as f64
        };
        if risk > self.config.max_risk_percent {
            return PlayDecision::reject(REASON_EXCEEDS_MAX_RISK);
        }

        // An unusable estimate counts as a certain loss
        let p = if estimated_win_prob.is_nan() {
            0.0
        } else {
            estimated_win_prob.clamp(0.0, 1.0)
        };
        let stake = wager as f64;
        let expected_value = p * stake - (1.0 - p) * stake;
        if expected_value < 0.0 && !opponent_unknown {
            return PlayDecision::reject(REASON_NEGATIVE_EV);
        }

        let stop_loss = -to_profit(self.session.start_balance / STOP_LOSS_DIVISOR);
        if self.state.session_profit < stop_loss {
            log::warn!(
                "session stop-loss reached: profit {} below {}",
                self.state.session_profit,
                stop_loss
            );
            return PlayDecision::reject(REASON_STOP_LOSS);
        }

        if opponent_unknown && wager > total / UNKNOWN_OPPONENT_DIVISOR {
            return PlayDecision::reject(REASON_UNKNOWN_OPPONENT);
        }

        PlayDecision::play()
    }

    /// Move `wager` from available to in-play.
    ///
    /// Returns `false` without touching the ledger when funds are short or
    /// another wager is already reserved.
    pub fn reserve_for_match(&mut self, wager: Amount) -> bool {
        if let Some(reserved) = self.reserved {
            log::warn!("cannot reserve {}: wager {} already in play", wager, reserved);
            return false;
        }
        if self.state.available_balance < wager {
            log::warn!(
                "cannot reserve {}: only {} available",
                wager,
                self.state.available_balance
            );
            return false;
        }

        self.state.available_balance -= wager;
        self.state.in_play += wager;
        self.reserved = Some(wager);
        self.sync_totals();

        log::info!("reserved {} for match", wager);
        true
    }

    /// Settle the reserved wager. On a win the whole pot is credited.
    pub fn record_result(
        &mut self,
        wager: Amount,
        won: bool,
        pot: Amount,
    ) -> Result<(), BankrollError> {
        match self.reserved {
            None => return Err(BankrollError::NoReservation { wager }),
            Some(reserved) if reserved != wager => {
                return Err(BankrollError::WagerMismatch { reserved, wager })
            }
            Some(_) => {}
        }

        self.state.in_play -= wager;
        self.reserved = None;

        if won {
            self.state.available_balance = self.state.available_balance.saturating_add(pot);
            let profit = to_profit(pot).saturating_sub(to_profit(wager));
            self.add_profit(profit);
            self.session.wins += 1;
            self.session.biggest_win = self.session.biggest_win.max(profit);
        } else {
            self.add_profit(-to_profit(wager));
            self.session.losses += 1;
            self.session.biggest_loss = self.session.biggest_loss.max(wager);
        }

        self.session.games_played += 1;
        self.sync_totals();

        log::info!(
            "settled wager {} ({}), balance {}",
            wager,
            if won { "won" } else { "lost" },
            self.state.total_balance
        );
        Ok(())
    }

    /// Resynchronize with an externally observed available balance.
    pub fn update_balance(&mut self, new_available_balance: Amount) {
        log::info!(
            "balance resync: available {} -> {}",
            self.state.available_balance,
            new_available_balance
        );
        self.state.available_balance = new_available_balance;
        self.sync_totals();
    }

    fn add_profit(&mut self, profit: Profit) {
        self.state.session_profit = self.state.session_profit.saturating_add(profit);
        self.state.all_time_profit = self.state.all_time_profit.saturating_add(profit);
    }

    fn sync_totals(&mut self) {
        self.state.total_balance = self.state.available_balance.saturating_add(self.state.in_play);
        self.session.current_balance = self.state.total_balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn manager(balance: Amount) -> BankrollManager {
        BankrollManager::new(balance, BankrollConfig::default()).unwrap()
    }

    fn assert_balanced(m: &BankrollManager) {
        let s = m.state();
        assert_eq!(s.total_balance, s.available_balance + s.in_play);
        assert_eq!(m.session_stats().current_balance, s.total_balance);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BankrollConfig::default().with_max_risk(0.0);
        assert!(BankrollManager::new(1000, config).is_err());
    }

    #[test]
    fn test_kelly_reference_case() {
        let m = manager(1000);
        assert_eq!(m.calculate_optimal_wager(0.6, EVEN_MONEY), 50);
    }

    #[test]
    fn test_kelly_no_edge() {
        let m = manager(1000);
        assert_eq!(m.calculate_optimal_wager(0.5, EVEN_MONEY), 0);
        assert_eq!(m.calculate_optimal_wager(0.3, EVEN_MONEY), 0);
        assert_eq!(m.calculate_optimal_wager(0.9, 0.0), 0);
        assert_eq!(m.calculate_optimal_wager(f64::NAN, EVEN_MONEY), 0);
    }

    #[test]
    fn test_kelly_scaling_and_clamp() {
        // Full Kelly 0.8 scaled to 0.2, clamped to 0.05
        assert_eq!(manager(1000).calculate_optimal_wager(0.9, EVEN_MONEY), 50);

        // Payout 2: raw (2 * 0.5 - 0.5) / 2 = 0.25, scaled 0.0625
        let config = BankrollConfig::default().with_max_risk(0.1);
        let m = BankrollManager::new(1000, config).unwrap();
        assert_eq!(m.calculate_optimal_wager(0.5, 2.0), 62);

        // Small edge stays under the cap
        assert_eq!(m.calculate_optimal_wager(0.54, EVEN_MONEY), 20);
    }

    #[test]
    fn test_kelly_uses_available_balance() {
        let mut m = manager(1000);
        assert!(m.reserve_for_match(500));
        assert_eq!(m.calculate_optimal_wager(0.6, EVEN_MONEY), 25);
    }

    #[test]
    fn test_kelly_large_balance_is_exact() {
        let m = manager(10u128.pow(30));
        assert_eq!(m.calculate_optimal_wager(0.6, EVEN_MONEY), 5 * 10u128.pow(28));
    }

    #[test]
    fn test_kelly_never_exceeds_max_risk() {
        let balance: Amount = 1_000_000_000_000;
        let max_risk = 0.04999999951;
        let config = BankrollConfig::default().with_max_risk(max_risk);
        let m = BankrollManager::new(balance, config).unwrap();

        let cap = (balance as f64 * max_risk).floor() as Amount;
        for p in [0.6, 0.75, 0.9, 1.0] {
            let wager = m.calculate_optimal_wager(p, EVEN_MONEY);
            assert!(wager <= cap, "wager {} above cap {} at p={}", wager, cap, p);

            let decision = m.should_play_match(wager, p, false);
            assert_ne!(decision.reason, REASON_EXCEEDS_MAX_RISK);
            assert!(decision.should_play);
        }
    }

    #[test]
    fn test_gate_insufficient_balance() {
        let m = manager(1000);
        for p in [0.0, 0.3, 0.5, 0.99, 1.0] {
            for unknown in [false, true] {
                let decision = m.should_play_match(2000, p, unknown);
                assert!(!decision.should_play);
                assert_eq!(decision.reason, REASON_INSUFFICIENT_BALANCE);
            }
        }
    }

    #[test]
    fn test_gate_nan_probability_is_negative_ev() {
        let m = manager(1000);
        assert_eq!(m.should_play_match(40, f64::NAN, false).reason, REASON_NEGATIVE_EV);
        assert_eq!(m.should_play_match(40, -0.5, false).reason, REASON_NEGATIVE_EV);
        // Clamped to 1, so still positive
        assert!(m.should_play_match(40, 1.5, false).should_play);
    }

    #[test]
    fn test_gate_max_risk() {
        let m = manager(1000);
        assert_eq!(m.should_play_match(60, 0.9, false).reason, REASON_EXCEEDS_MAX_RISK);
        assert!(m.should_play_match(50, 0.9, false).should_play);
    }

    #[test]
    fn test_gate_negative_ev_only_for_known_opponents() {
        let m = manager(1000);
        assert_eq!(m.should_play_match(40, 0.4, false).reason, REASON_NEGATIVE_EV);

        let decision = m.should_play_match(40, 0.4, true);
        assert!(decision.should_play);
        assert_eq!(decision.reason, REASON_FAVORABLE);
    }

    #[test]
    fn test_gate_unknown_opponent_cap() {
        let config = BankrollConfig::default().with_max_risk(0.1);
        let m = BankrollManager::new(1000, config).unwrap();

        assert_eq!(m.should_play_match(80, 0.7, true).reason, REASON_UNKNOWN_OPPONENT);
        assert!(m.should_play_match(50, 0.7, true).should_play);
        assert!(m.should_play_match(80, 0.7, false).should_play);
    }

    #[test]
    fn test_gate_stop_loss() {
        let mut m = manager(1000);
        for _ in 0..5 {
            assert!(m.reserve_for_match(50));
            m.record_result(50, false, 100).unwrap();
        }
        assert_eq!(m.state().session_profit, -250);

        let decision = m.should_play_match(10, 0.9, false);
        assert!(!decision.should_play);
        assert_eq!(decision.reason, REASON_STOP_LOSS);
    }

    #[test]
    fn test_stop_loss_boundary() {
        let mut m = manager(1000);
        for _ in 0..4 {
            assert!(m.reserve_for_match(50));
            m.record_result(50, false, 100).unwrap();
        }
        // Exactly -200 is not below the limit
        assert!(m.should_play_match(10, 0.9, false).should_play);
    }

    #[test]
    fn test_reserve_and_win() {
        let mut m = manager(1000);
        assert!(m.reserve_for_match(50));
        assert_eq!(m.state().available_balance, 950);
        assert_eq!(m.state().in_play, 50);
        assert_eq!(m.reserved_wager(), Some(50));
        assert_balanced(&m);

        m.record_result(50, true, 100).unwrap();
        let state = m.state();
        assert_eq!(state.available_balance, 1050);
        assert_eq!(state.in_play, 0);
        assert_eq!(state.session_profit, 50);
        assert_eq!(state.all_time_profit, 50);
        assert_eq!(m.session_stats().biggest_win, 50);
        assert_eq!(m.session_stats().wins, 1);
        assert_eq!(m.reserved_wager(), None);
        assert_balanced(&m);
    }

    #[test]
    fn test_reserve_and_lose() {
        let mut m = manager(1000);
        assert!(m.reserve_for_match(40));
        m.record_result(40, false, 80).unwrap();

        let state = m.state();
        assert_eq!(state.total_balance, 960);
        assert_eq!(state.session_profit, -40);
        assert_eq!(m.session_stats().biggest_loss, 40);
        assert_eq!(m.session_stats().losses, 1);
        assert_eq!(m.session_stats().games_played, 1);
        assert_balanced(&m);
    }

    #[test]
    fn test_reserve_insufficient_funds() {
        let mut m = manager(100);
        let before = m.state().clone();
        assert!(!m.reserve_for_match(101));
        assert_eq!(m.state(), &before);
        assert_eq!(m.reserved_wager(), None);
    }

    #[test]
    fn test_double_reservation_rejected() {
        let mut m = manager(1000);
        assert!(m.reserve_for_match(30));
        let before = m.state().clone();

        assert!(!m.reserve_for_match(30));
        assert_eq!(m.state(), &before);
        assert_eq!(m.state().in_play, 30);

        m.record_result(30, true, 60).unwrap();
        assert!(m.reserve_for_match(30));
    }

    #[test]
    fn test_settle_without_reservation() {
        let mut m = manager(1000);
        let before = m.state().clone();

        assert_eq!(
            m.record_result(50, true, 100),
            Err(BankrollError::NoReservation { wager: 50 })
        );
        assert_eq!(m.state(), &before);

        assert!(m.reserve_for_match(20));
        assert_eq!(
            m.record_result(50, false, 100),
            Err(BankrollError::WagerMismatch { reserved: 20, wager: 50 })
        );
        assert_eq!(m.state().in_play, 20);
        assert_eq!(m.session_stats().games_played, 0);
    }

    #[test]
    fn test_update_balance_keeps_in_play() {
        let mut m = manager(1000);
        assert!(m.reserve_for_match(50));
        m.update_balance(2000);

        let state = m.state();
        assert_eq!(state.available_balance, 2000);
        assert_eq!(state.in_play, 50);
        assert_eq!(state.total_balance, 2050);
        assert_balanced(&m);
    }

    #[test]
    fn test_ledger_invariant_over_random_sessions() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut m = manager(1_000_000);

        for _ in 0..500 {
            let p: f64 = rng.gen_range(0.3..0.8);
            let wager = m.calculate_optimal_wager(p, EVEN_MONEY).max(1);
            if m.reserve_for_match(wager) {
                assert_balanced(&m);
                let won = rng.gen_bool(p);
                m.record_result(wager, won, wager * 2).unwrap();
            }
            assert_balanced(&m);

            if rng.gen_ratio(1, 50) {
                let resync = m.state().available_balance + rng.gen_range(0..100);
                m.update_balance(resync);
                assert_balanced(&m);
            }
        }

        let session = m.session_stats();
        assert_eq!(session.games_played, session.wins + session.losses);
    }

    #[test]
    fn test_summary() {
        let mut m = manager(1000);
        assert!(m.reserve_for_match(50));
        m.record_result(50, true, 100).unwrap();

        let summary = m.summary();
        assert_eq!(summary.win_rate, 1.0);
        assert_eq!(summary.state.total_balance, 1050);
        assert_eq!(summary.reserved_wager, None);

        let text = summary.to_string();
        assert!(text.contains("Total balance:     1050"));
        assert!(text.contains("1W / 0L"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["session"]["games_played"], 1);
    }
}
