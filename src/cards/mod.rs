//! Cards and hand strength.
//!
//! ## Modules
//!
//! - `card`: Card codec, betting streets and the deck
//! - `hand_eval`: 5-7 card hand ranking and comparison

pub mod card;
pub mod hand_eval;

pub use card::{parse_cards, Card, CardError, Deck, Street};
pub use hand_eval::{EvalError, HandCategory, HandEvaluator, HandRank};
