//! Hand Census
//!
//! Ranks every one of the C(52,5) five-card hands in parallel and checks the
//! category counts against the known combinatorial totals.

use std::process;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use poker_agent_core::cards::{Card, Deck, HandCategory, HandEvaluator};

const EXPECTED: [(HandCategory, u64); 10] = [
    (HandCategory::HighCard, 1_302_540),
    (HandCategory::Pair, 1_098_240),
    (HandCategory::TwoPair, 123_552),
    (HandCategory::ThreeOfAKind, 54_912),
    (HandCategory::Straight, 10_200),
    (HandCategory::Flush, 5_108),
    (HandCategory::FullHouse, 3_744),
    (HandCategory::FourOfAKind, 624),
    (HandCategory::StraightFlush, 36),
    (HandCategory::RoyalFlush, 4),
];

type Counts = [u64; 10];

/// Count categories of all hands whose lowest-index card is `deck[first]`.
fn census_from(evaluator: &HandEvaluator, deck: &[Card], first: usize) -> Counts {
    let n = deck.len();
    let mut counts = [0u64; 10];

    for b in (first + 1)..n {
        for c in (b + 1)..n {
            for d in (c + 1)..n {
                for e in (d + 1)..n {
                    let hand = [deck[first], deck[b], deck[c], deck[d], deck[e]];
                    counts[evaluator.evaluate_5(&hand).category() as usize] += 1;
                }
            }
        }
    }

    counts
}

fn main() {
    env_logger::init();

    println!("=== Hand Census ===\n");

    let start = Instant::now();
    let deck = Deck::new().remaining_cards().to_vec();
    let evaluator = HandEvaluator::new();

    let progress = ProgressBar::new(deck.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} first cards [{elapsed}]") {
        progress.set_style(style);
    }

    let counts = (0..deck.len())
        .into_par_iter()
        .map(|first| {
            let counts = census_from(&evaluator, &deck, first);
            progress.inc(1);
            counts
        })
        .reduce(
            || [0u64; 10],
            |mut acc, counts| {
                for (total, count) in acc.iter_mut().zip(counts) {
                    *total += count;
                }
                acc
            },
        );
    progress.finish_and_clear();

    println!("{:<18}{:>12}{:>12}", "Category", "Counted", "Expected");
    let mut mismatches = 0;
    for (category, expected) in EXPECTED {
        let counted = counts[category as usize];
        let marker = if counted == expected { "" } else { "  MISMATCH" };
        if counted != expected {
            mismatches += 1;
        }
        println!("{:<18}{:>12}{:>12}{}", category.name(), counted, expected, marker);
    }

    let total: u64 = counts.iter().sum();
    println!("\n{} hands in {:.2}s", total, start.elapsed().as_secs_f64());

    if mismatches > 0 {
        eprintln!("{} categories do not match the expected totals", mismatches);
        process::exit(1);
    }
}
