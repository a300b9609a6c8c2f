//! Opponent behaviour modelling.
//!
//! ## Modules
//!
//! - `action`: Observed actions, stored action records and showdowns
//! - `stats`: Per-opponent statistics and the running-mean reducer
//! - `model`: Per-address profiles, classification, strategy adjustment and range estimation

pub mod action;
pub mod model;
pub mod stats;

pub use action::{ActionRecord, ObservedAction, PlayerAction, ShowdownRecord, ShowdownResult};
pub use model::{OpponentModel, OpponentProfile, PlayerType, RangeEstimate, StrategyAdjustment};
pub use stats::{running_mean, OpponentStats};
