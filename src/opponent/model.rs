//! Opponent modelling.
//!
//! The model keeps one profile per opponent address: running statistics plus
//! the raw action and showdown history they were derived from. Profiles are
//! created lazily on the first recorded event and live as long as the model,
//! unless evicted with [`OpponentModel::forget`] or [`OpponentModel::reset`].
//!
//! Classification, strategy adjustment and range estimation are fixed lookup
//! heuristics over those statistics.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::{
    ActionRecord, ObservedAction, PlayerAction, ShowdownRecord, ShowdownResult,
};
use super::stats::{aggression_factor, running_mean, sample, OpponentStats};
use crate::cards::Card;
use crate::unix_millis;

/// Hands needed before an opponent is classified.
pub const MIN_HANDS_TO_CLASSIFY: u64 = 10;

/// VPIP above which a player counts as loose.
pub const LOOSE_VPIP: f64 = 0.30;

/// Aggression factor above which a player counts as aggressive.
pub const AGGRESSIVE_AF: f64 = 2.0;

/// Playing style of an opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    /// Loose-passive.
    Fish,
    /// Tight-passive.
    Nit,
    /// Loose-aggressive.
    Lag,
    /// Tight-aggressive.
    Tag,
    /// Not enough hands observed.
    Unknown,
}

impl PlayerType {
    /// Classify a set of statistics.
    pub fn classify(stats: &OpponentStats) -> Self {
        if stats.hands_played < MIN_HANDS_TO_CLASSIFY {
            return PlayerType::Unknown;
        }

        let loose = stats.vpip > LOOSE_VPIP;
        let aggressive = stats.af > AGGRESSIVE_AF;

        match (loose, aggressive) {
            (true, true) => PlayerType::Lag,
            (true, false) => PlayerType::Fish,
            (false, true) => PlayerType::Tag,
            (false, false) => PlayerType::Nit,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlayerType::Fish => "fish",
            PlayerType::Nit => "nit",
            PlayerType::Lag => "lag",
            PlayerType::Tag => "tag",
            PlayerType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to deviate from default play against a player type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrategyAdjustment {
    pub bluff_more: bool,
    pub value_wider: bool,
    pub fold_more: bool,
    pub call_more_bluffs: bool,
}

impl StrategyAdjustment {
    /// Fixed adjustment table.
    pub const fn for_player_type(player_type: PlayerType) -> Self {
        let (bluff_more, value_wider, fold_more, call_more_bluffs) = match player_type {
            PlayerType::Fish => (false, true, false, false),
            PlayerType::Nit => (true, false, true, false),
            PlayerType::Lag => (false, true, false, true),
            PlayerType::Tag => (false, false, true, false),
            PlayerType::Unknown => (false, false, false, false),
        };
        Self {
            bluff_more,
            value_wider,
            fold_more,
            call_more_bluffs,
        }
    }
}

/// Coarse estimate of an opponent's holding range in the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeEstimate {
    Premium,
    Tight,
    Standard,
    Wide,
    Any,
}

impl RangeEstimate {
    /// Estimate a range from the actions seen this hand and the player type.
    pub fn from_actions(actions_this_hand: &[ObservedAction], player_type: PlayerType) -> Self {
        let raises = actions_this_hand
            .iter()
            .filter(|a| a.action == PlayerAction::Raise)
            .count();
        if raises >= 2 {
            return RangeEstimate::Premium;
        }

        let raised_preflop = actions_this_hand
            .iter()
            .any(|a| a.is_preflop() && a.action == PlayerAction::Raise);
        if !raised_preflop {
            return RangeEstimate::Any;
        }

        match player_type {
            PlayerType::Nit => RangeEstimate::Tight,
            PlayerType::Lag => RangeEstimate::Wide,
            _ => RangeEstimate::Standard,
        }
    }
}

/// Everything known about one opponent.
#[derive(Debug, Clone, Serialize)]
pub struct OpponentProfile {
    pub stats: OpponentStats,
    pub actions: Vec<ActionRecord>,
    pub showdowns: Vec<ShowdownRecord>,
}

impl OpponentProfile {
    fn new(address: &str) -> Self {
        Self {
            stats: OpponentStats::new(address),
            actions: Vec::new(),
            showdowns: Vec::new(),
        }
    }

    fn apply_action(&mut self, observed: &ObservedAction) {
        // Looked up before the new record is appended
        let raised_before = self
            .actions
            .last()
            .map_or(false, |r| r.street == observed.street && r.action.is_aggressive());

        self.actions.push(ActionRecord::from_observed(observed));

        let stats = &mut self.stats;
        let action = observed.action;

        if observed.is_preflop() {
            // TODO: count hands on a hand-id transition once the relay reports one
            stats.hands_played += 1;
            let n = stats.hands_played;
            stats.vpip = running_mean(stats.vpip, sample(action.is_voluntary()), n);
            stats.pfr = running_mean(stats.pfr, sample(action.is_aggressive()), n);

            if observed.facing_bet {
                stats.three_bet = running_mean(stats.three_bet, sample(action.is_aggressive()), n);
                if raised_before {
                    stats.fold_to_three_bet =
                        running_mean(stats.fold_to_three_bet, sample(action.is_fold()), n);
                }
            }
        }

        if observed.is_flop() {
            let n = stats.hands_played;
            stats.cbet = running_mean(stats.cbet, sample(action == PlayerAction::Raise), n);
            if observed.facing_bet {
                stats.fold_to_cbet = running_mean(stats.fold_to_cbet, sample(action.is_fold()), n);
            }
        }

        stats.af = aggression_factor(&self.actions);
    }
}

/// Per-address opponent statistics and history.
#[derive(Debug, Clone, Default)]
pub struct OpponentModel {
    profiles: FxHashMap<String, OpponentProfile>,
}

impl OpponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn profile_mut(&mut self, address: &str) -> &mut OpponentProfile {
        self.profiles
            .entry(address.to_string())
            .or_insert_with(|| OpponentProfile::new(address))
    }

    /// Record one observed action and update the address's statistics.
    pub fn record_action(&mut self, address: &str, observed: ObservedAction) -> &OpponentStats {
        let profile = self.profile_mut(address);
        profile.apply_action(&observed);

        log::debug!(
            "{} {} {} (hands={})",
            address,
            observed.street,
            observed.action,
            profile.stats.hands_played
        );
        if observed.is_preflop() && profile.stats.hands_played == MIN_HANDS_TO_CLASSIFY {
            log::info!(
                "{} classified as {}",
                address,
                PlayerType::classify(&profile.stats)
            );
        }

        &profile.stats
    }

    /// Record a showdown and recompute the showdown rates.
    pub fn record_showdown(
        &mut self,
        address: &str,
        hole_cards: Vec<Card>,
        community_cards: Vec<Card>,
        result: ShowdownResult,
        actions_this_hand: Vec<ObservedAction>,
    ) -> &OpponentStats {
        let profile = self.profile_mut(address);
        profile.showdowns.push(ShowdownRecord {
            hole_cards,
            community_cards,
            result,
            actions_this_hand,
            timestamp_ms: unix_millis(),
        });
        profile.stats.refresh_showdowns(&profile.showdowns);

        log::debug!("{} showdown {:?}", address, result);
        &profile.stats
    }

    /// Statistics for an address; unseen addresses get fresh defaults.
    pub fn stats(&self, address: &str) -> OpponentStats {
        self.profiles
            .get(address)
            .map(|p| p.stats.clone())
            .unwrap_or_else(|| OpponentStats::new(address))
    }

    pub fn profile(&self, address: &str) -> Option<&OpponentProfile> {
        self.profiles.get(address)
    }

    pub fn action_history(&self, address: &str) -> &[ActionRecord] {
        self.profiles
            .get(address)
            .map(|p| p.actions.as_slice())
            .unwrap_or(&[])
    }

    pub fn showdown_history(&self, address: &str) -> &[ShowdownRecord] {
        self.profiles
            .get(address)
            .map(|p| p.showdowns.as_slice())
            .unwrap_or(&[])
    }

    pub fn classify_player(&self, address: &str) -> PlayerType {
        self.profiles
            .get(address)
            .map_or(PlayerType::Unknown, |p| PlayerType::classify(&p.stats))
    }

    pub fn strategy_adjustment(&self, address: &str) -> StrategyAdjustment {
        StrategyAdjustment::for_player_type(self.classify_player(address))
    }

    pub fn estimate_range(
        &self,
        address: &str,
        actions_this_hand: &[ObservedAction],
    ) -> RangeEstimate {
        RangeEstimate::from_actions(actions_this_hand, self.classify_player(address))
    }

    /// Number of addresses with a profile.
    pub fn tracked_opponents(&self) -> usize {
        self.profiles.len()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Drop one address's profile. Returns whether it existed.
    pub fn forget(&mut self, address: &str) -> bool {
        self.profiles.remove(address).is_some()
    }

    /// Drop every profile.
    pub fn reset(&mut self) {
        self.profiles.clear();
    }
}
