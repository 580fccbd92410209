//! Built-in scenarios

use railsynth_core::Result;
use railsynth_tools::UiAction;

use super::Scenario;
use crate::components::{
    Component, FailureKind, Navigation, Purchase, Qa, Refusal, RudeDeescalation, Search,
    SearchFailure, SmallTalk, TalkKind,
};
use crate::dialogue::Dialogue;
use crate::resources::Env;

/// Search for trains, nothing else
pub struct SearchTrains;

impl Scenario for SearchTrains {
    fn name(&self) -> &'static str {
        "search_trains"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        Search::fresh().build(env, dialogue)
    }
}

/// Search, pick a train, pick a seat, pay
pub struct TicketPurchase;

impl Scenario for TicketPurchase {
    fn name(&self) -> &'static str {
        "ticket_purchase"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let dialogue = Search::fresh().build(env, dialogue)?;
        Purchase::default().build(env, dialogue)
    }
}

/// Purchase with optional browsing and a change of destination on the way
pub struct LongTicketPurchase;

impl LongTicketPurchase {
    const NAVIGATE_CHANCE: u32 = 30;
    const REFINE_CHANCE: u32 = 40;
    const SEAT_ASIDE_CHANCE: u32 = 20;
}

impl Scenario for LongTicketPurchase {
    fn name(&self) -> &'static str {
        "long_ticket_purchase"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let mut dialogue = Search::fresh().build(env, dialogue)?;
        if env.decisions.chance("long:navigate", Self::NAVIGATE_CHANCE) {
            dialogue = Navigation::any().staying().build(env, dialogue)?;
        }
        if env.decisions.chance("long:refine", Self::REFINE_CHANCE) {
            dialogue = Search::refine().build(env, dialogue)?;
        }
        let purchase = if env.decisions.chance("long:seat_aside", Self::SEAT_ASIDE_CHANCE) {
            Purchase::default().with_seat_aside()
        } else {
            Purchase::default()
        };
        purchase.build(env, dialogue)
    }
}

/// One interface action after a search
pub struct UiNavigation;

impl UiNavigation {
    const PRELIMINARY_NEXT_CHANCE: u32 = 50;
    const WEIGHTS: [(UiAction, u32); 5] = [
        (UiAction::Next, 40),
        (UiAction::Prev, 20),
        (UiAction::Back, 15),
        (UiAction::Status, 15),
        (UiAction::ShowChanges, 10),
    ];
}

impl Scenario for UiNavigation {
    fn name(&self) -> &'static str {
        "ui_navigation"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let mut dialogue = Search::fresh().build(env, dialogue)?;
        // page 2 makes prev legal
        if dialogue.state().capabilities().next
            && env.decisions.chance("ui:preliminary_next", Self::PRELIMINARY_NEXT_CHANCE)
        {
            dialogue = Navigation::weighted(&[(UiAction::Next, 1)]).build(env, dialogue)?;
        }
        Navigation::weighted(&Self::WEIGHTS).build(env, dialogue)
    }
}

/// Randomly composed multi-turn conversation
pub struct MultiTurn;

impl Scenario for MultiTurn {
    fn name(&self) -> &'static str {
        "multi_turn"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        match env.decisions.int("multi_turn:variant", 0, 4) {
            0 => {
                let count = env.decisions.int("multi_turn:qa_count", 2, 4) as usize;
                Qa::new(count).build(env, dialogue)
            }
            1 => {
                let dialogue = Refusal::new(1).build(env, dialogue)?;
                Search::fresh().build(env, dialogue)
            }
            2 => {
                let dialogue = Search::fresh().build(env, dialogue)?;
                Qa::new(1).build(env, dialogue)
            }
            3 => {
                let dialogue = SmallTalk::new(TalkKind::Greeting).build(env, dialogue)?;
                Search::fresh().build(env, dialogue)
            }
            _ => {
                let mut dialogue = Search::fresh().build(env, dialogue)?;
                let steps = env.decisions.int("multi_turn:interleaved", 1, 3);
                for _ in 0..steps {
                    dialogue = if env.decisions.chance("multi_turn:qa_step", 50) {
                        Qa::new(1).build(env, dialogue)?
                    } else {
                        Navigation::any().staying().build(env, dialogue)?
                    };
                }
                Purchase::default().build(env, dialogue)
            }
        }
    }
}

pub struct QaScenario;

impl Scenario for QaScenario {
    fn name(&self) -> &'static str {
        "qa"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        Qa::new(1).build(env, dialogue)
    }
}

pub struct RefusalScenario;

impl Scenario for RefusalScenario {
    fn name(&self) -> &'static str {
        "refusal"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let rounds = env.decisions.int("refusal:rounds", 1, 2) as usize;
        Refusal::new(rounds).build(env, dialogue)
    }
}

pub struct RudeScenario;

impl Scenario for RudeScenario {
    fn name(&self) -> &'static str {
        "rude"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        RudeDeescalation::default().build(env, dialogue)
    }
}

/// A scripted backend failure during search, or a failed payment
pub struct SearchFail;

impl Scenario for SearchFail {
    fn name(&self) -> &'static str {
        "search_fail"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let variant = env
            .decisions
            .int("search_fail:variant", 0, FailureKind::ALL.len() as u32) as usize;
        match FailureKind::ALL.get(variant) {
            Some(kind) => SearchFailure::new(*kind).build(env, dialogue),
            None => {
                let dialogue = Search::fresh().build(env, dialogue)?;
                Purchase::default().with_payment_retry().build(env, dialogue)
            }
        }
    }
}

/// Fixed ten-exchange conversation touching every component family
pub struct TenTurn;

impl Scenario for TenTurn {
    fn name(&self) -> &'static str {
        "ten_turn"
    }

    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let dialogue = SmallTalk::new(TalkKind::Greeting).build(env, dialogue)?;
        let dialogue = SmallTalk::new(TalkKind::ChitChat).build(env, dialogue)?;
        let dialogue = Qa::new(2).build(env, dialogue)?;
        let dialogue = Refusal::new(2).build(env, dialogue)?;
        let dialogue = Search::fresh().build(env, dialogue)?;
        let dialogue = SmallTalk::new(TalkKind::Confirmation).build(env, dialogue)?;
        let dialogue = Purchase::default().build(env, dialogue)?;
        SmallTalk::new(TalkKind::Farewell).build(env, dialogue)
    }
}
