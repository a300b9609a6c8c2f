//! Poker hand evaluation.
//!
//! This module ranks 5-7 card poker hands. A 5-card hand is ranked directly
//! by grouping its cards by rank; larger hands are ranked as the best of all
//! their 5-card subsets. Every ranked hand carries a category and an integer
//! tiebreak value, and hands are ordered by category first, then value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::card::Card;

/// Fewest cards `evaluate` accepts.
pub const MIN_CARDS: usize = 5;

/// Most cards `evaluate` accepts (two hole cards plus a full board).
pub const MAX_CARDS: usize = 7;

/// Base of the positional encoding used for flushes and high cards.
const KICKER_BASE: u64 = 15;

/// Hand rank categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl HandCategory {
    /// All categories from worst to best.
    pub const ALL: [HandCategory; 10] = [
        HandCategory::HighCard,
        HandCategory::Pair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
        HandCategory::RoyalFlush,
    ];

    /// Get the category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors for malformed evaluation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Fewer than five cards were supplied.
    TooFewCards(usize),
    /// More than seven cards were supplied.
    TooManyCards(usize),
    /// The same card appears twice.
    DuplicateCard(Card),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::TooFewCards(n) => {
                write!(f, "Need at least {} cards to evaluate, got {}", MIN_CARDS, n)
            }
            EvalError::TooManyCards(n) => {
                write!(f, "Cannot evaluate more than {} cards, got {}", MAX_CARDS, n)
            }
            EvalError::DuplicateCard(card) => write!(f, "Duplicate card {}", card),
        }
    }
}

impl std::error::Error for EvalError {}

/// The best 5-card hand found by the evaluator.
///
/// Equality and ordering only look at `(category, value)`: two different
/// sets of cards with the same key compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct HandRank {
    category: HandCategory,
    value: u64,
    /// The five cards, grouped by rank the way they were detected.
    cards: [Card; 5],
    kickers: Vec<Card>,
}

impl HandRank {
    pub fn category(&self) -> HandCategory {
        self.category
    }

    /// Tiebreak value within the category.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The five cards forming the hand.
    pub fn cards(&self) -> &[Card; 5] {
        &self.cards
    }

    /// Cards of the hand that are not part of the made combination.
    pub fn kickers(&self) -> &[Card] {
        &self.kickers
    }

    fn key(&self) -> (HandCategory, u64) {
        (self.category, self.value)
    }
}

impl PartialEq for HandRank {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HandRank {}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.category)?;
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        write!(f, "]")
    }
}

/// Cards sharing one rank.
struct RankGroup {
    rank: u64,
    cards: Vec<Card>,
}

/// Hand evaluator for poker hands.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandEvaluator;

impl HandEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Rank 5 to 7 cards, returning the best 5-card hand.
    pub fn evaluate(&self, cards: &[Card]) -> Result<HandRank, EvalError> {
        if cards.len() < MIN_CARDS {
            return Err(EvalError::TooFewCards(cards.len()));
        }
        if cards.len() > MAX_CARDS {
            return Err(EvalError::TooManyCards(cards.len()));
        }

        let mut seen = 0u64;
        for &card in cards {
            let bit = 1u64 << card.index();
            if seen & bit != 0 {
                return Err(EvalError::DuplicateCard(card));
            }
            seen |= bit;
        }

        let n = cards.len();
        let mut best: Option<HandRank> = None;

        // C(7,5) = 21 subsets at most
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    for l in (k + 1)..n {
                        for m in (l + 1)..n {
                            let rank =
                                self.evaluate_5(&[cards[i], cards[j], cards[k], cards[l], cards[m]]);
                            if best.as_ref().map_or(true, |b| rank > *b) {
                                best = Some(rank);
                            }
                        }
                    }
                }
            }
        }

        best.ok_or(EvalError::TooFewCards(n))
    }

    /// Compare two evaluated hands by category, then tiebreak value.
    pub fn compare_hands(&self, a: &HandRank, b: &HandRank) -> Ordering {
        a.cmp(b)
    }

    /// Evaluate exactly five cards.
    pub fn evaluate_5(&self, cards: &[Card; 5]) -> HandRank {
        let mut groups: Vec<RankGroup> = Vec::with_capacity(5);
        for &card in cards {
            let rank = card.rank_value() as u64;
            match groups.iter_mut().find(|g| g.rank == rank) {
                Some(group) => group.cards.push(card),
                None => groups.push(RankGroup {
                    rank,
                    cards: vec![card],
                }),
            }
        }
        groups.sort_by(|a, b| {
            b.cards
                .len()
                .cmp(&a.cards.len())
                .then(b.rank.cmp(&a.rank))
        });

        let mut ordered: Vec<Card> = groups.iter().flat_map(|g| g.cards.iter().copied()).collect();
        let counts: Vec<usize> = groups.iter().map(|g| g.cards.len()).collect();
        let ranks: Vec<u64> = groups.iter().map(|g| g.rank).collect();

        let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());
        let straight_high = Self::straight_high(&ranks);
        if straight_high == Some(5) {
            // Wheel: the ace plays low
            ordered.rotate_left(1);
        }

        let (category, value, kicker_groups) = match (is_flush, straight_high, counts.as_slice()) {
            (true, Some(14), _) => (HandCategory::RoyalFlush, 14, 0),
            (true, Some(high), _) => (HandCategory::StraightFlush, high, 0),
            (_, _, [4, 1]) => (HandCategory::FourOfAKind, ranks[0] * 100 + ranks[1], 1),
            (_, _, [3, 2]) => (HandCategory::FullHouse, ranks[0] * 100 + ranks[1], 0),
            (true, None, _) => (HandCategory::Flush, Self::positional(&ranks), 0),
            (false, Some(high), _) => (HandCategory::Straight, high, 0),
            (_, _, [3, 1, 1]) => (
                HandCategory::ThreeOfAKind,
                ranks[0] * 10_000 + ranks[1] * 100 + ranks[2],
                2,
            ),
            (_, _, [2, 2, 1]) => (
                HandCategory::TwoPair,
                ranks[0] * 10_000 + ranks[1] * 100 + ranks[2],
                1,
            ),
            (_, _, [2, 1, 1, 1]) => (
                HandCategory::Pair,
                ranks[0] * 1_000_000 + ranks[1] * 10_000 + ranks[2] * 100 + ranks[3],
                3,
            ),
            _ => (HandCategory::HighCard, Self::positional(&ranks), 4),
        };

        let kickers = groups[groups.len() - kicker_groups..]
            .iter()
            .flat_map(|g| g.cards.iter().copied())
            .collect();

        HandRank {
            category,
            value,
            cards: [ordered[0], ordered[1], ordered[2], ordered[3], ordered[4]],
            kickers,
        }
    }

    /// High card of a straight, given group ranks sorted descending.
    /// The wheel (A-2-3-4-5) counts as 5-high.
    fn straight_high(ranks: &[u64]) -> Option<u64> {
        if ranks.len() != 5 {
            return None;
        }
        if ranks[0] - ranks[4] == 4 {
            Some(ranks[0])
        } else if ranks == [14, 5, 4, 3, 2] {
            Some(5)
        } else {
            None
        }
    }

    /// Base-15 polynomial over ranks, most significant first.
    fn positional(ranks: &[u64]) -> u64 {
        ranks.iter().fold(0, |acc, &r| acc * KICKER_BASE + r)
    }
}
