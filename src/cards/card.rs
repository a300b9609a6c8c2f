//! Card representation for the evaluator and opponent model.
//!
//! This module provides the card codec used throughout the engine:
//! - `Card`: A single playing card, stored as its index `rank * 4 + suit`
//! - `Street`: The betting phase an action was observed in
//! - `Deck`: A deck of 52 cards with dealing functionality

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Rank of a card (0-12: 2-A).
pub const RANK_2: u8 = 0;
pub const RANK_3: u8 = 1;
pub const RANK_4: u8 = 2;
pub const RANK_5: u8 = 3;
pub const RANK_6: u8 = 4;
pub const RANK_7: u8 = 5;
pub const RANK_8: u8 = 6;
pub const RANK_9: u8 = 7;
pub const RANK_T: u8 = 8;
pub const RANK_J: u8 = 9;
pub const RANK_Q: u8 = 10;
pub const RANK_K: u8 = 11;
pub const RANK_A: u8 = 12;

/// Suit of a card (0-3).
pub const SUIT_HEARTS: u8 = 0;
pub const SUIT_DIAMONDS: u8 = 1;
pub const SUIT_CLUBS: u8 = 2;
pub const SUIT_SPADES: u8 = 3;

/// Number of distinct cards.
pub const DECK_SIZE: usize = 52;

const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];
const SUIT_CHARS: [char; 4] = ['h', 'd', 'c', 's'];

/// Errors produced when decoding cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// Card index outside 0-51.
    InvalidIndex(u8),
    /// Text that is not two-character card notation.
    InvalidNotation(String),
    /// Rank outside 0-12 or suit outside 0-3.
    InvalidRankSuit { rank: u8, suit: u8 },
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardError::InvalidIndex(index) => {
                write!(f, "Card index {} is out of range [0, 51]", index)
            }
            CardError::InvalidNotation(text) => write!(f, "Invalid card notation '{}'", text),
            CardError::InvalidRankSuit { rank, suit } => {
                write!(f, "Invalid rank {} / suit {} (expected 0-12 / 0-3)", rank, suit)
            }
        }
    }
}

impl std::error::Error for CardError {}

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    /// Card index 0-51: rank * 4 + suit
    index: u8,
}

impl Card {
    /// Create a new card from rank (0-12) and suit (0-3).
    ///
    /// The caller must pass in-range values; only debug builds check them.
    /// Decode untrusted input with [`Card::try_new`], [`Card::from_index`] or
    /// [`str::parse`].
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { index: rank * 4 + suit }
    }

    /// Create a card from rank and suit, rejecting out-of-range values.
    pub fn try_new(rank: u8, suit: u8) -> Result<Self, CardError> {
        if rank < 13 && suit < 4 {
            Ok(Self::new(rank, suit))
        } else {
            Err(CardError::InvalidRankSuit { rank, suit })
        }
    }

    /// Decode a card from its index (0-51).
    pub fn from_index(index: u8) -> Result<Self, CardError> {
        if (index as usize) < DECK_SIZE {
            Ok(Self { index })
        } else {
            Err(CardError::InvalidIndex(index))
        }
    }

    /// Get the card's index (0-51).
    #[inline]
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Get the card's rank (0-12: 2-A).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.index / 4
    }

    /// Get the card's suit (0-3).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.index % 4
    }

    /// Face value used in tiebreaks: 2-14, ace high.
    #[inline]
    pub fn rank_value(&self) -> u8 {
        self.rank() + 2
    }

    pub fn rank_char(&self) -> char {
        RANK_CHARS[self.rank() as usize]
    }

    pub fn suit_char(&self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }
}

impl FromStr for Card {
    type Err = CardError;

    /// Parse a card from notation like "As", "Kh", "2c".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CardError::InvalidNotation(s.to_string());
        let mut chars = s.chars();
        let (Some(r), Some(u), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == r.to_ascii_uppercase())
            .ok_or_else(invalid)?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == u.to_ascii_lowercase())
            .ok_or_else(invalid)?;

        Ok(Self::new(rank as u8, suit as u8))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a list of cards like "AhKsQd" or "Ah Ks Qd".
pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 || !compact.is_ascii() {
        return Err(CardError::InvalidNotation(s.to_string()));
    }

    (0..compact.len())
        .step_by(2)
        .map(|i| compact[i..i + 2].parse())
        .collect()
}

/// Betting phase of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Street::Preflop => write!(f, "preflop"),
            Street::Flop => write!(f, "flop"),
            Street::Turn => write!(f, "turn"),
            Street::River => write!(f, "river"),
            Street::Showdown => write!(f, "showdown"),
        }
    }
}

/// A deck of 52 playing cards.
#[derive(Clone)]
pub struct Deck {
    cards: Vec<Card>,
    /// Index of next card to deal.
    next: usize,
}

impl Deck {
    /// Create a new deck in index order.
    pub fn new() -> Self {
        Self::without(&[])
    }

    /// Create a deck with specific cards removed.
    pub fn without(dead_cards: &[Card]) -> Self {
        let cards = (0..DECK_SIZE as u8)
            .map(|index| Card { index })
            .filter(|card| !dead_cards.contains(card))
            .collect();
        Self { cards, next: 0 }
    }

    /// Shuffle the undealt cards.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards[self.next..].shuffle(rng);
    }

    /// Deal the next card from the deck.
    pub fn deal(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied()?;
        self.next += 1;
        Some(card)
    }

    /// Deal up to `n` cards.
    pub fn deal_n(&mut self, n: usize) -> Vec<Card> {
        std::iter::from_fn(|| self.deal()).take(n).collect()
    }

    /// Get the number of remaining cards.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }

    /// Get remaining cards as a slice.
    pub fn remaining_cards(&self) -> &[Card] {
        &self.cards[self.next..]
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} remaining)", self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_card_creation() {
        let ace_spades = Card::new(RANK_A, SUIT_SPADES);
        assert_eq!(ace_spades.rank(), RANK_A);
        assert_eq!(ace_spades.suit(), SUIT_SPADES);
        assert_eq!(ace_spades.rank_value(), 14);
        assert_eq!(ace_spades.index(), 51);
        assert_eq!(ace_spades.to_string(), "As");

        let two_hearts = Card::new(RANK_2, SUIT_HEARTS);
        assert_eq!(two_hearts.index(), 0);
        assert_eq!(two_hearts.rank_value(), 2);
        assert_eq!(two_hearts.to_string(), "2h");
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert_eq!(Card::try_new(RANK_A, SUIT_SPADES), Ok(Card::new(RANK_A, SUIT_SPADES)));
        assert_eq!(
            Card::try_new(13, 0),
            Err(CardError::InvalidRankSuit { rank: 13, suit: 0 })
        );
        assert!(Card::try_new(0, 4).is_err());
        assert!(Card::try_new(255, 255).is_err());
        assert!(Card::from_index(52).is_err());
    }

    #[test]
    fn test_index_encoding() {
        let ten_clubs: Card = "Tc".parse().unwrap();
        assert_eq!(ten_clubs.index(), RANK_T * 4 + SUIT_CLUBS);
        assert_eq!(Card::from_index(ten_clubs.index()).unwrap(), ten_clubs);

        assert_eq!(Card::from_index(52), Err(CardError::InvalidIndex(52)));
    }

    #[test]
    fn test_card_parsing() {
        assert_eq!("As".parse::<Card>().unwrap().to_string(), "As");
        assert_eq!("kh".parse::<Card>().unwrap().to_string(), "Kh");
        assert_eq!("2C".parse::<Card>().unwrap().to_string(), "2c");
        assert!("XX".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert!("Asd".parse::<Card>().is_err());
    }

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards("Ah Ks Qd").unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(parse_cards("AhKsQd").unwrap(), cards);
        assert!(parse_cards("AhK").is_err());
        assert!(parse_cards("").unwrap().is_empty());
    }

    #[test]
    fn test_card_serde() {
        let card: Card = "Jd".parse().unwrap();
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"Jd\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert!(serde_json::from_str::<Card>("\"1x\"").is_err());
    }

    #[test]
    fn test_deck() {
        let mut deck = Deck::new();
        assert_eq!(deck.remaining(), 52);

        deck.deal().unwrap();
        assert_eq!(deck.remaining(), 51);

        let cards = deck.deal_n(60);
        assert_eq!(cards.len(), 51);
        assert!(deck.deal().is_none());
    }

    #[test]
    fn test_deck_without_and_shuffle() {
        let dead = parse_cards("As Ah").unwrap();
        let mut deck = Deck::without(&dead);
        assert_eq!(deck.remaining(), 50);

        let mut rng = StdRng::seed_from_u64(7);
        deck.shuffle(&mut rng);
        let dealt = deck.deal_n(50);
        assert!(dealt.iter().all(|c| !dead.contains(c)));
    }

    #[test]
    fn test_street_wire_names() {
        assert_eq!(Street::Preflop.to_string(), "preflop");
        let street: Street = serde_json::from_str("\"river\"").unwrap();
        assert_eq!(street, Street::River);
        assert_eq!(serde_json::to_string(&Street::Flop).unwrap(), "\"flop\"");
    }
}
