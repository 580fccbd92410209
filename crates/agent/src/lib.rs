//! Deterministic kiosk dialogue synthesis
//!
//! Features:
//! - Dialogue protocol with an explicit transition table
//! - Dialogue accumulator producing context slices per turn
//! - Corpus index with built-in fallback phrases
//! - Reusable components (search, purchase, navigation, failures, talk)
//! - Scenario catalog and the seeded `run_scenario` driver

pub mod components;
pub mod corpus;
pub mod dialogue;
pub mod phrases;
pub mod protocol;
pub mod resources;
pub mod scenarios;

pub use components::{
    select_train, Component, FailureKind, Mention, Navigation, Purchase, Qa, Refusal,
    RudeDeescalation, Search, SearchFailure, SearchPlan, SeatFlow, Selection, SmallTalk,
    TalkKind,
};
pub use corpus::{CorpusFilter, CorpusIndex};
pub use dialogue::{Dialogue, Turn};
pub use protocol::{is_legal, legal_ui_actions, transition, Action, ActionKind, Outcome};
pub use resources::{Env, Resources};
pub use scenarios::{
    run_scenario, run_scenario_with_seed, GeneratedSample, Scenario, ScenarioRegistry,
};
