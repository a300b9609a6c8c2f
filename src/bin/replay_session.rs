//! Session Replay
//!
//! Feeds a recorded session (opponent actions, showdowns, matches and
//! balance resyncs) through an engine and prints the resulting bankroll
//! summary and opponent classifications.
//!
//! Usage: replay_session <session.json> [--json]

use std::fs;
use std::process;

use serde::{Deserialize, Serialize};

use poker_agent_core::bankroll::{BankrollConfig, BankrollSummary, EVEN_MONEY};
use poker_agent_core::cards::Card;
use poker_agent_core::opponent::{ObservedAction, OpponentStats, PlayerType, ShowdownResult};
use poker_agent_core::{Amount, Engine};

/// A recorded session file.
#[derive(Debug, Deserialize)]
struct SessionFile {
    initial_balance: Amount,
    #[serde(default)]
    bankroll: BankrollConfig,
    events: Vec<SessionEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SessionEvent {
    Action {
        address: String,
        observed: ObservedAction,
    },
    Showdown {
        address: String,
        hole_cards: Vec<Card>,
        community_cards: Vec<Card>,
        result: ShowdownResult,
        #[serde(default)]
        actions_this_hand: Vec<ObservedAction>,
    },
    Match {
        opponent: String,
        win_probability: f64,
        #[serde(default = "even_money")]
        payout_ratio: f64,
        won: bool,
        /// Pot credited on a win; defaults to twice the wager.
        #[serde(default)]
        pot: Option<Amount>,
    },
    Balance {
        available: Amount,
    },
}

fn even_money() -> f64 {
    EVEN_MONEY
}

#[derive(Debug, Serialize)]
struct OpponentReport {
    player_type: PlayerType,
    stats: OpponentStats,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    matches_played: u64,
    matches_skipped: u64,
    bankroll: BankrollSummary,
    opponents: Vec<OpponentReport>,
}

fn replay(session: SessionFile) -> Result<ReplayReport, Box<dyn std::error::Error>> {
    let mut engine = Engine::new(session.initial_balance, session.bankroll)?;
    let mut played = 0;
    let mut skipped = 0;

    for event in session.events {
        match event {
            SessionEvent::Action { address, observed } => {
                engine.opponents_mut().record_action(&address, observed);
            }
            SessionEvent::Showdown {
                address,
                hole_cards,
                community_cards,
                result,
                actions_this_hand,
            } => {
                engine.opponents_mut().record_showdown(
                    &address,
                    hole_cards,
                    community_cards,
                    result,
                    actions_this_hand,
                );
            }
            SessionEvent::Match {
                opponent,
                win_probability,
                payout_ratio,
                won,
                pot,
            } => {
                let plan = engine.plan_wager(&opponent, win_probability, payout_ratio);
                if !plan.decision.should_play || plan.wager == 0 {
                    println!("skip  vs {:<16} {}", opponent, plan.decision.reason);
                    skipped += 1;
                    continue;
                }

                let bankroll = engine.bankroll_mut();
                if !bankroll.reserve_for_match(plan.wager) {
                    println!("skip  vs {:<16} reservation failed", opponent);
                    skipped += 1;
                    continue;
                }
                let pot = pot.unwrap_or(plan.wager * 2);
                bankroll.record_result(plan.wager, won, pot)?;
                played += 1;

                println!(
                    "{}   vs {:<16} wager {:>10}  ({}, balance {})",
                    if won { "win " } else { "loss" },
                    opponent,
                    plan.wager,
                    plan.opponent,
                    bankroll.state().total_balance
                );
            }
            SessionEvent::Balance { available } => {
                engine.bankroll_mut().update_balance(available);
            }
        }
    }

    let mut addresses: Vec<&str> = engine.opponents().addresses().collect();
    addresses.sort_unstable();
    let opponents = addresses
        .into_iter()
        .map(|address| OpponentReport {
            player_type: engine.opponents().classify_player(address),
            stats: engine.opponents().stats(address),
        })
        .collect();

    Ok(ReplayReport {
        matches_played: played,
        matches_skipped: skipped,
        bankroll: engine.bankroll().summary(),
        opponents,
    })
}

fn print_help() {
    println!("Usage: replay_session <session.json> [--json]");
    println!();
    println!("Options:");
    println!("  --json, -j    Print the final report as JSON");
    println!("  --help, -h    Show this help");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut path: Option<String> = None;
    let mut as_json = false;

    for arg in &args {
        match arg.as_str() {
            "--json" | "-j" => as_json = true,
            "--help" | "-h" => {
                print_help();
                return;
            }
            other if path.is_none() && !other.starts_with('-') => path = Some(other.to_string()),
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                process::exit(2);
            }
        }
    }

    let Some(path) = path else {
        print_help();
        process::exit(2);
    };

    let session: SessionFile = match fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error loading session {}: {}", path, e);
            process::exit(1);
        }
    };

    let report = match replay(session) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Replay failed: {}", e);
            process::exit(1);
        }
    };

    if as_json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error encoding report: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("\n=== Bankroll ===");
    println!("{}", report.bankroll);
    println!(
        "Matches played: {} | skipped: {}",
        report.matches_played, report.matches_skipped
    );

    println!("\n=== Opponents ===");
    for opponent in &report.opponents {
        let s = &opponent.stats;
        println!(
            "{:<16} {:<8} hands {:>4}  vpip {:>5.1}%  pfr {:>5.1}%  af {:>4.2}  wsd {:>5.1}%",
            s.address,
            opponent.player_type.name(),
            s.hands_played,
            s.vpip * 100.0,
            s.pfr * 100.0,
            s.af,
            s.wsd * 100.0
        );
    }
}
