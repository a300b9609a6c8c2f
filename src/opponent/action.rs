//! Observed opponent actions and showdowns.
//!
//! These are the inputs the game-event relay feeds into the opponent model.
//! Records are append-only: once stored under an address they are never
//! edited, only re-read when statistics are recomputed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cards::{Card, Street};
use crate::{unix_millis, Amount};

/// A betting action taken by an opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold the hand, forfeiting any money invested.
    Fold,
    /// Check (pass action when no bet to call).
    Check,
    /// Call the current bet.
    Call,
    /// Bet or raise.
    Raise,
    /// Go all-in for all remaining chips.
    AllIn,
}

impl PlayerAction {
    /// Raise or all-in.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, PlayerAction::Raise | PlayerAction::AllIn)
    }

    /// Puts money in the pot by choice (call, raise, all-in).
    pub fn is_voluntary(&self) -> bool {
        matches!(self, PlayerAction::Call | PlayerAction::Raise | PlayerAction::AllIn)
    }

    pub fn is_call(&self) -> bool {
        matches!(self, PlayerAction::Call)
    }

    pub fn is_fold(&self) -> bool {
        matches!(self, PlayerAction::Fold)
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Fold => write!(f, "fold"),
            PlayerAction::Check => write!(f, "check"),
            PlayerAction::Call => write!(f, "call"),
            PlayerAction::Raise => write!(f, "raise"),
            PlayerAction::AllIn => write!(f, "all-in"),
        }
    }
}

/// One action as reported by the game relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedAction {
    pub action: PlayerAction,
    pub street: Street,
    /// Chips put in by the action, when the relay reports it.
    #[serde(default)]
    pub amount: Option<Amount>,
    pub pot_size: Amount,
    /// Whether the player was facing a bet when acting.
    #[serde(default)]
    pub facing_bet: bool,
}

impl ObservedAction {
    pub fn new(action: PlayerAction, street: Street, pot_size: Amount) -> Self {
        Self {
            action,
            street,
            amount: None,
            pot_size,
            facing_bet: false,
        }
    }

    /// Builder method: set the amount committed.
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Builder method: mark the action as taken facing a bet.
    pub fn facing_bet(mut self, facing: bool) -> Self {
        self.facing_bet = facing;
        self
    }

    pub fn is_preflop(&self) -> bool {
        self.street == Street::Preflop
    }

    pub fn is_flop(&self) -> bool {
        self.street == Street::Flop
    }
}

/// A stored action with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub street: Street,
    pub action: PlayerAction,
    pub amount: Option<Amount>,
    pub pot_size: Amount,
    pub facing_bet: bool,
    /// Unix time in milliseconds; descriptive only.
    pub timestamp_ms: u64,
}

impl ActionRecord {
    /// Stamp an observed action with the current time.
    pub fn from_observed(observed: &ObservedAction) -> Self {
        Self {
            street: observed.street,
            action: observed.action,
            amount: observed.amount,
            pot_size: observed.pot_size,
            facing_bet: observed.facing_bet,
            timestamp_ms: unix_millis(),
        }
    }
}

/// Outcome of a showdown from the opponent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowdownResult {
    Win,
    Loss,
    Tie,
}

/// A hand the opponent took to showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownRecord {
    pub hole_cards: Vec<Card>,
    pub community_cards: Vec<Card>,
    pub result: ShowdownResult,
    pub actions_this_hand: Vec<ObservedAction>,
    pub timestamp_ms: u64,
}
