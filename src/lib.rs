//! # Poker Agent Core
//!
//! Decision-support engine for an autonomous poker-playing agent. It turns
//! cards, observed opponent behaviour and bankroll constraints into the
//! quantitative inputs of a fold/check/call/raise decision.
//!
//! ## Modules
//!
//! - [`cards`]: Card codec and the 5-7 card hand evaluator
//! - [`opponent`]: Per-opponent statistics, classification and range estimates
//! - [`bankroll`]: Fractional-Kelly wager sizing, risk gates and settlement
//! - [`engine`]: One instance of all the above, optionally shared behind a mutex
//!
//! ## Architecture
//!
//! ```text
//!   cards ──► HandEvaluator ──► hand strength
//!                                     │
//!   relay ──► OpponentModel ──► player type, range
//!                                     │           external policy layer
//!   equity ─► BankrollManager ─► wager, play/skip ──────────────────────►
//! ```
//!
//! Money is always an exact integer ([`Amount`], [`Profit`]); floating point
//! is reserved for probabilities and statistics.
//!
//! ## Quick Start
//!
//! ```
//! use poker_agent_core::bankroll::{BankrollConfig, EVEN_MONEY};
//! use poker_agent_core::cards::parse_cards;
//! use poker_agent_core::Engine;
//!
//! let engine = Engine::new(1000, BankrollConfig::default()).unwrap();
//!
//! let rank = engine.evaluate(&parse_cards("As Ks Qs Js Ts 2d 3c").unwrap()).unwrap();
//! assert_eq!(rank.category().name(), "Royal Flush");
//!
//! let plan = engine.plan_wager("0xopponent", 0.6, EVEN_MONEY);
//! assert_eq!(plan.wager, 50);
//! ```

/// Card codec and hand evaluation.
pub mod cards;

/// Opponent statistics and classification.
pub mod opponent;

/// Bankroll ledger and wager sizing.
pub mod bankroll;

/// Engine instance owning per-agent state.
pub mod engine;

pub use engine::{Engine, SharedEngine, WagerPlan};

/// Exact money amount in the smallest currency unit.
pub type Amount = u128;

/// Signed profit or loss in the smallest currency unit.
pub type Profit = i128;

/// Current Unix time in milliseconds, 0 if the clock is before the epoch.
pub(crate) fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
