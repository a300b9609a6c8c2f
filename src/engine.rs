//! Engine instance owning the per-agent state.
//!
//! An [`Engine`] owns exactly one opponent model and one bankroll ledger;
//! nothing is global. Callers that share an engine between threads or tasks
//! wrap it in a [`SharedEngine`], which runs every call as a critical section.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

use crate::bankroll::{BankrollConfig, BankrollManager, ConfigError, PlayDecision};
use crate::cards::{Card, EvalError, HandEvaluator, HandRank};
use crate::opponent::{OpponentModel, PlayerType, StrategyAdjustment};
use crate::Amount;

/// Sizing and gating result for one prospective match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WagerPlan {
    pub wager: Amount,
    pub opponent: PlayerType,
    pub adjustment: StrategyAdjustment,
    pub decision: PlayDecision,
}

/// Hand evaluator, opponent model and bankroll for one agent.
#[derive(Debug, Clone)]
pub struct Engine {
    evaluator: HandEvaluator,
    opponents: OpponentModel,
    bankroll: BankrollManager,
}

impl Engine {
    pub fn new(initial_balance: Amount, config: BankrollConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            evaluator: HandEvaluator::new(),
            opponents: OpponentModel::new(),
            bankroll: BankrollManager::new(initial_balance, config)?,
        })
    }

    pub fn evaluate(&self, cards: &[Card]) -> Result<HandRank, EvalError> {
        self.evaluator.evaluate(cards)
    }

    pub fn opponents(&self) -> &OpponentModel {
        &self.opponents
    }

    pub fn opponents_mut(&mut self) -> &mut OpponentModel {
        &mut self.opponents
    }

    pub fn bankroll(&self) -> &BankrollManager {
        &self.bankroll
    }

    pub fn bankroll_mut(&mut self) -> &mut BankrollManager {
        &mut self.bankroll
    }

    /// Size a wager against `address` and run it through the play gate.
    ///
    /// The opponent counts as unknown until it has been classified.
    pub fn plan_wager(&self, address: &str, win_probability: f64, payout_ratio: f64) -> WagerPlan {
        let opponent = self.opponents.classify_player(address);
        let wager = self.bankroll.calculate_optimal_wager(win_probability, payout_ratio);
        let unknown = opponent == PlayerType::Unknown;
        let decision = self.bankroll.should_play_match(wager, win_probability, unknown);

        WagerPlan {
            wager,
            opponent,
            adjustment: StrategyAdjustment::for_player_type(opponent),
            decision,
        }
    }
}

/// An [`Engine`] behind a mutex, cloneable across threads.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        // Each engine method leaves the ledger balanced; a wager reserved by a closure that
        // panicked before settling stays reserved
        let mut engine = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bankroll::EVEN_MONEY;
    use crate::cards::{parse_cards, HandCategory, Street};
    use crate::opponent::{ObservedAction, PlayerAction};
    use std::thread;

    fn engine() -> Engine {
        Engine::new(1000, BankrollConfig::default()).unwrap()
    }

    #[test]
    fn test_evaluate_through_engine() {
        let rank = engine()
            .evaluate(&parse_cards("Ah Kh Qh Jh Th 2c 3d").unwrap())
            .unwrap();
        assert_eq!(rank.category(), HandCategory::RoyalFlush);
    }

    #[test]
    fn test_plan_against_unknown_opponent() {
        let plan = engine().plan_wager("0xaaaa", 0.6, EVEN_MONEY);
        assert_eq!(plan.wager, 50);
        assert_eq!(plan.opponent, PlayerType::Unknown);
        assert_eq!(plan.adjustment, StrategyAdjustment::default());
        // 50 is exactly total / 20, still allowed
        assert!(plan.decision.should_play);
    }

    #[test]
    fn test_plan_against_known_opponent() {
        let mut engine = engine();
        for _ in 0..12 {
            engine.opponents_mut().record_action(
                "0xbbbb",
                ObservedAction::new(PlayerAction::Call, Street::Preflop, 20),
            );
        }

        let plan = engine.plan_wager("0xbbbb", 0.45, EVEN_MONEY);
        assert_eq!(plan.opponent, PlayerType::Fish);
        assert_eq!(plan.wager, 0);
        // Zero wager has zero expected value, which is not negative
        assert!(plan.decision.should_play);
        assert!(plan.adjustment.value_wider);
    }

    #[test]
    fn test_shared_engine_survives_panicking_closure() {
        let shared = SharedEngine::new(engine());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            shared.with(|engine| {
                assert!(engine.bankroll_mut().reserve_for_match(40));
                panic!("caller failed before settling");
            })
        }));
        assert!(result.is_err());

        shared.with(|engine| {
            let bankroll = engine.bankroll_mut();
            let state = bankroll.state();
            assert_eq!(state.total_balance, state.available_balance + state.in_play);
            assert_eq!(bankroll.reserved_wager(), Some(40));

            bankroll.record_result(40, false, 80).unwrap();
            assert_eq!(bankroll.reserved_wager(), None);
            assert_eq!(bankroll.state().total_balance, 960);
        });
    }

    #[test]
    fn test_shared_engine_serializes_mutations() {
        let shared = SharedEngine::new(Engine::new(100_000, BankrollConfig::default()).unwrap());

        thread::scope(|scope| {
            for worker in 0..4 {
                let shared = shared.clone();
                scope.spawn(move || {
                    let address = format!("0x{:04}", worker);
                    for round in 0..50 {
                        shared.with(|engine| {
                            engine.opponents_mut().record_action(
                                &address,
                                ObservedAction::new(PlayerAction::Raise, Street::Preflop, 30),
                            );

                            let bankroll = engine.bankroll_mut();
                            if bankroll.reserve_for_match(10) {
                                bankroll.record_result(10, round % 2 == 0, 20).unwrap();
                            }
                            let state = bankroll.state();
                            assert_eq!(state.total_balance, state.available_balance + state.in_play);
                        });
                    }
                });
            }
        });

        shared.with(|engine| {
            assert_eq!(engine.opponents().tracked_opponents(), 4);
            assert_eq!(engine.opponents().stats("0x0001").hands_played, 50);
            assert_eq!(engine.bankroll().session_stats().games_played, 200);
            assert_eq!(engine.bankroll().state().total_balance, 100_000);
        });
    }
}
