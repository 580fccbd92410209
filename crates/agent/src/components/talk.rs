//! Content-only exchanges: Q&A, refusals, rude users and small talk
//!
//! None of these call a tool, so the dialogue state never changes.

use railsynth_config::{QaConfig, QaPair};
use railsynth_core::Result;
use std::fmt;

use super::Component;
use crate::corpus::CorpusFilter;
use crate::dialogue::Dialogue;
use crate::phrases::categories::{
    CHIT_CHAT, CHIT_CHAT_REPLIES, CONFIRMATIONS, CONFIRMATION_REPLIES, DEESCALATIONS,
    DEESCALATION_FOLLOWUPS, FAREWELLS, FAREWELL_REPLIES, GREETINGS, GREETING_REPLIES, OFF_TOPIC,
    REFUSAL_APOLOGIES, REFUSAL_REDIRECTS, RUDE_FOLLOWUPS, RUDE_PHRASES,
};
use crate::resources::Env;

/// One user line and one assistant line
fn exchange(dialogue: Dialogue, user: String, assistant: String) -> Result<Dialogue> {
    let mut turn = dialogue.begin_turn();
    turn.user(user);
    turn.assistant(assistant);
    dialogue.push_turn(turn)
}

/// Distinct question/answer pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qa {
    pub count: usize,
}

impl Default for Qa {
    fn default() -> Self {
        Self { count: 1 }
    }
}

impl Qa {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Component for Qa {
    fn name(&self) -> &'static str {
        "qa"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let builtin;
        let pairs: &[QaPair] = if env.resources.qa.pairs.is_empty() {
            builtin = QaConfig::default();
            env.decisions.record_fallback("qa:pair", "builtin");
            &builtin.pairs
        } else {
            &env.resources.qa.pairs
        };

        let mut remaining: Vec<usize> = (0..pairs.len()).collect();
        let mut dialogue = dialogue;
        for _ in 0..self.count.min(pairs.len()) {
            let slot = env.decisions.int("qa:pair", 0, remaining.len() as u32 - 1) as usize;
            let pair = &pairs[remaining.remove(slot)];
            dialogue = exchange(dialogue, pair.question.clone(), pair.answer.clone())?;
        }
        Ok(dialogue)
    }
}

/// Off-topic questions answered with an apology and a redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refusal {
    pub rounds: usize,
}

impl Default for Refusal {
    fn default() -> Self {
        Self { rounds: 1 }
    }
}

impl Refusal {
    pub fn new(rounds: usize) -> Self {
        Self { rounds }
    }
}

impl Component for Refusal {
    fn name(&self) -> &'static str {
        "refusal"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let mut dialogue = dialogue;
        for _ in 0..self.rounds {
            let question = env.phrase(OFF_TOPIC, CorpusFilter::ANY)?;
            let apology = env.phrase(REFUSAL_APOLOGIES, CorpusFilter::ANY)?;
            let redirect = env.phrase(REFUSAL_REDIRECTS, CorpusFilter::ANY)?;
            dialogue = exchange(dialogue, question, format!("{} {}", apology, redirect))?;
        }
        Ok(dialogue)
    }
}

/// Aggressive user calmed down by the assistant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RudeDeescalation {
    pub force_second_round: bool,
}

impl RudeDeescalation {
    /// Percent chance of a second rude message
    pub const SECOND_ROUND_CHANCE: u32 = 30;
}

impl Component for RudeDeescalation {
    fn name(&self) -> &'static str {
        "rude_deescalation"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let rude = env.phrase(RUDE_PHRASES, CorpusFilter::ANY)?;
        let calm = env.phrase(DEESCALATIONS, CorpusFilter::ANY)?;
        let mut dialogue = exchange(dialogue, rude, calm)?;

        let second = self.force_second_round
            || env.decisions.chance("rude:second_round", Self::SECOND_ROUND_CHANCE);
        if second {
            let rude = env.phrase(RUDE_FOLLOWUPS, CorpusFilter::ANY)?;
            let calm = env.phrase(DEESCALATION_FOLLOWUPS, CorpusFilter::ANY)?;
            dialogue = exchange(dialogue, rude, calm)?;
        }
        Ok(dialogue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkKind {
    Greeting,
    Confirmation,
    ChitChat,
    Farewell,
}

impl TalkKind {
    fn categories(&self) -> (&'static str, &'static str) {
        match self {
            TalkKind::Greeting => (GREETINGS, GREETING_REPLIES),
            TalkKind::Confirmation => (CONFIRMATIONS, CONFIRMATION_REPLIES),
            TalkKind::ChitChat => (CHIT_CHAT, CHIT_CHAT_REPLIES),
            TalkKind::Farewell => (FAREWELLS, FAREWELL_REPLIES),
        }
    }
}

impl fmt::Display for TalkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TalkKind::Greeting => "greeting",
            TalkKind::Confirmation => "confirmation",
            TalkKind::ChitChat => "chit_chat",
            TalkKind::Farewell => "farewell",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallTalk {
    pub kind: TalkKind,
}

impl SmallTalk {
    pub fn new(kind: TalkKind) -> Self {
        Self { kind }
    }
}

impl Component for SmallTalk {
    fn name(&self) -> &'static str {
        "small_talk"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let (asked, replied) = self.kind.categories();
        let user = env.phrase(asked, CorpusFilter::ANY)?;
        let assistant = env.phrase(replied, CorpusFilter::ANY)?;
        tracing::trace!(kind = %self.kind, "Small talk turn");
        exchange(dialogue, user, assistant)
    }
}
