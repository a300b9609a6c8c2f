//! Bankroll and risk control.
//!
//! ## Modules
//!
//! - `config`: Risk settings and JSON loading
//! - `manager`: The ledger, Kelly wager sizing, play gates and settlement

pub mod config;
pub mod manager;

pub use config::{BankrollConfig, ConfigError};
pub use manager::{
    BankrollError, BankrollManager, BankrollState, BankrollSummary, PlayDecision, SessionStats,
    EVEN_MONEY,
};
