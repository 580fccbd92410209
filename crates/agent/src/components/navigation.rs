//! Navigation component
//!
//! One `ui_control` exchange. The action is drawn from the subset the
//! protocol allows in the current state, so `next`/`prev` only appear when
//! the interface offers them.

use railsynth_core::{ContextParams, DialogueState, Error, Result};
use railsynth_tools::{UiAction, UiControlArgs};

use super::Component;
use crate::corpus::CorpusFilter;
use crate::dialogue::Dialogue;
use crate::phrases::categories::{
    DELAY_REPLIES, NAV_BACK, NAV_BACK_REPLIES, NAV_BACK_TO_RESULTS_REPLIES, NAV_CARRIAGE_REPLIES,
    NAV_NEXT, NAV_PAGE_REPLIES, NAV_PREV, NAV_SHOW_CHANGES, NAV_STATUS, ON_TIME_REPLIES,
};
use crate::protocol::{legal_ui_actions, Action, Outcome};
use crate::resources::Env;

/// Placeholders a `show_changes` request may use
const CHANGES_PLACEHOLDERS: &[&str] = &["{train_type}", "{dep}"];

#[derive(Debug, Clone)]
pub struct Navigation {
    /// Used whenever it is legal
    pub preferred: Option<UiAction>,
    /// Relative weights; actions missing here are never drawn
    pub weights: Vec<(UiAction, u32)>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::any()
    }
}

impl Navigation {
    /// Every legal action equally likely
    pub fn any() -> Self {
        Self::weighted(&UiAction::ALL.map(|action| (action, 1u32)))
    }

    pub fn weighted(weights: &[(UiAction, u32)]) -> Self {
        Self {
            preferred: None,
            weights: weights.to_vec(),
        }
    }

    pub fn prefer(mut self, action: UiAction) -> Self {
        self.preferred = Some(action);
        self
    }

    /// Drop `back` so the dialogue keeps its results on screen
    pub fn staying(mut self) -> Self {
        self.weights.retain(|(action, _)| *action != UiAction::Back);
        self
    }

    /// Action to emit in `state`, `None` when nothing allowed is legal
    fn draw(&self, env: &mut Env<'_>, state: &DialogueState) -> Option<UiAction> {
        let legal = legal_ui_actions(state);
        if let Some(preferred) = self.preferred {
            if legal.contains(&preferred) {
                return Some(preferred);
            }
        }

        let pool: Vec<(UiAction, u32)> = self
            .weights
            .iter()
            .copied()
            .filter(|(action, weight)| *weight > 0 && legal.contains(action))
            .collect();
        let total: u32 = pool.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return None;
        }

        let mut roll = env.decisions.int("nav:action", 0, total - 1);
        for (action, weight) in pool {
            if roll < weight {
                return Some(action);
            }
            roll -= weight;
        }
        None
    }
}

impl Component for Navigation {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let Some(action) = self.draw(env, dialogue.state()) else {
            tracing::debug!(state = %dialogue.state(), "No navigation action available, skipped");
            return Ok(dialogue);
        };
        let backend = env.resources.backend;
        let mut turn = dialogue.begin_turn();

        match action {
            UiAction::Next | UiAction::Prev => {
                let category = if action == UiAction::Next { NAV_NEXT } else { NAV_PREV };
                turn.user(env.phrase(category, CorpusFilter::ANY)?);
                turn.call(Action::Ui(action), UiControlArgs::new(action).into())?;

                match turn.state().clone() {
                    DialogueState::Results { page, total_pages } => {
                        let page = if action == UiAction::Next { page + 1 } else { page - 1 };
                        let response = backend.page_response(turn.results(), page);
                        turn.respond(Outcome::Done, &response)?;
                        let (page, total) = (page.to_string(), total_pages.to_string());
                        let reply = env.say(
                            NAV_PAGE_REPLIES,
                            &[("page", page.as_str()), ("total_pages", total.as_str())],
                        )?;
                        turn.assistant(reply);
                    }
                    DialogueState::ChoosingSeat {
                        train_id,
                        carriage,
                        total_carriages,
                        ..
                    } => {
                        let carriage = if action == UiAction::Next { carriage + 1 } else { carriage - 1 };
                        let train = turn
                            .params()
                            .train(&train_id)
                            .cloned()
                            .ok_or_else(|| Error::Structure(format!("seated train {} not on screen", train_id)))?;
                        let response = backend.seat_map_response(env.decisions, &train, carriage);
                        turn.respond(Outcome::Done, &response)?;
                        let (carriage, total) = (carriage.to_string(), total_carriages.to_string());
                        let reply = env.say(
                            NAV_CARRIAGE_REPLIES,
                            &[
                                ("carriage", carriage.as_str()),
                                ("total_carriages", total.as_str()),
                            ],
                        )?;
                        turn.assistant(reply);
                    }
                    // next/prev are never legal here
                    _ => {}
                }
            }

            UiAction::Back => {
                turn.user(env.phrase(NAV_BACK, CorpusFilter::ANY)?);
                turn.call(Action::Ui(action), UiControlArgs::new(action).into())?;
                let to_results = matches!(turn.state(), DialogueState::ChoosingSeat { .. });
                let target = if to_results { "results" } else { "idle" };
                turn.respond(Outcome::Done, &backend.back_response(target))?;
                let category = if to_results {
                    NAV_BACK_TO_RESULTS_REPLIES
                } else {
                    NAV_BACK_REPLIES
                };
                turn.assistant(env.phrase(category, CorpusFilter::ANY)?);
            }

            UiAction::Status => {
                turn.user(env.phrase(NAV_STATUS, CorpusFilter::ANY)?);
                turn.call(Action::Ui(action), UiControlArgs::new(action).into())?;
                let response = backend.status_response(turn.params());
                turn.respond(Outcome::Done, &response)?;
                let reply = status_reply(env, turn.state(), turn.params());
                turn.assistant(reply);
            }

            UiAction::ShowChanges => {
                let visible = turn.params().trains.clone();
                if visible.is_empty() {
                    return Err(Error::Structure("show_changes with no trains on screen".into()));
                }
                let index = env.decisions.int("nav:train_position", 0, visible.len() as u32 - 1) as usize;
                let train = &visible[index];
                let filter = CorpusFilter::ANY.supporting(CHANGES_PLACEHOLDERS);
                let named = visible.len() > 1;
                let template = env.resources.corpus.phrase_where(
                    env.decisions,
                    NAV_SHOW_CHANGES,
                    filter,
                    |text| !named || text.contains("{dep}"),
                )?;
                let text = crate::corpus::render(
                    &template,
                    &[("train_type", train.train_type.as_str()), ("dep", train.dep.as_str())],
                )?;
                turn.user(text);
                turn.call(
                    Action::Ui(action),
                    UiControlArgs::show_changes(train.pos).into(),
                )?;
                let response = backend.changes_response(env.decisions, train);
                turn.respond(Outcome::Done, &response)?;
                let reply = match response["delay_minutes"].as_u64() {
                    Some(delay) => {
                        let delay = delay.to_string();
                        env.say(DELAY_REPLIES, &[("delay", delay.as_str())])?
                    }
                    None => env.phrase(ON_TIME_REPLIES, CorpusFilter::ANY)?,
                };
                turn.assistant(reply);
            }
        }

        tracing::debug!(action = %action, state = %turn.state(), "Navigation turn");
        dialogue.push_turn(turn)
    }
}

fn status_reply(env: &Env<'_>, state: &DialogueState, params: &ContextParams) -> String {
    let city = params
        .destination
        .as_deref()
        .map(|d| super::search::spoken_city(env, d))
        .unwrap_or_default();
    match state {
        DialogueState::Idle => "🙂 Nessuna ricerca attiva. Dove vuoi andare?".to_string(),
        DialogueState::Results { page, total_pages } => format!(
            "😊 Stai guardando i treni per {}, pagina {} di {}.",
            city, page, total_pages
        ),
        DialogueState::ChoosingSeat {
            train_id, carriage, ..
        } => format!(
            "🙂 Stai scegliendo il posto sul {}, carrozza {}.",
            train_id, carriage
        ),
        DialogueState::Purchased => match &params.ticket {
            Some(ticket) => format!(
                "😊 Hai acquistato il biglietto {} per il {}.",
                ticket.confirmation_code, ticket.train_id
            ),
            None => "😊 Il tuo acquisto è completato.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Search;
    use crate::resources::Resources;
    use chrono::{NaiveDate, NaiveTime};
    use railsynth_core::{DecisionSource, Message};
    use railsynth_tools::{SearchArgs, SearchResults};
    use serde_json::json;

    fn searched(env: &mut Env<'_>) -> Dialogue {
        let dialogue = Dialogue::new(ContextParams::new(
            "Napoli Centrale",
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
        ));
        Search::fresh().build(env, dialogue).unwrap()
    }

    /// Dialogues left on the seat map at carriage 1, across a range of seeds
    fn seated(resources: &Resources, seeds: std::ops::Range<u64>) -> Vec<(DecisionSource, Dialogue)> {
        use crate::components::Purchase;

        let mut seated = Vec::new();
        for seed in seeds {
            let mut decisions = DecisionSource::new(seed);
            let mut env = Env::new(&mut decisions, resources);
            let dialogue = searched(&mut env);
            let dialogue = Purchase::default()
                .stop_at_seat_map()
                .build(&mut env, dialogue)
                .unwrap();
            if matches!(dialogue.state(), DialogueState::ChoosingSeat { .. }) {
                seated.push((decisions, dialogue));
            }
        }
        seated
    }

    fn last_action(dialogue: &Dialogue) -> String {
        let call = dialogue
            .messages()
            .iter()
            .rev()
            .flat_map(Message::tool_calls)
            .next()
            .unwrap();
        call.arguments_json().unwrap()["action"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    fn carriage(dialogue: &Dialogue) -> u32 {
        match dialogue.state() {
            DialogueState::ChoosingSeat { carriage, .. } => *carriage,
            other => panic!("expected the seat map, got {}", other),
        }
    }

    #[test]
    fn test_seat_map_carriage_walk_and_back() {
        let resources = Resources::builtin();
        let seated = seated(&resources, 0..60);
        assert!(!seated.is_empty());

        for (mut decisions, dialogue) in seated {
            let mut env = Env::new(&mut decisions, &resources);
            let DialogueState::ChoosingSeat {
                train_id,
                page,
                total_pages,
                ..
            } = dialogue.state().clone()
            else {
                unreachable!()
            };
            let on_screen = dialogue.visible_trains().to_vec();
            assert!(on_screen.iter().any(|t| t.id == train_id));

            let can = dialogue.state().capabilities();
            assert_eq!(carriage(&dialogue), 1);
            assert!(can.next && !can.prev && can.back);
            assert!(!legal_ui_actions(dialogue.state()).contains(&UiAction::ShowChanges));

            let dialogue = Navigation::any().prefer(UiAction::Next).build(&mut env, dialogue).unwrap();
            assert_eq!(last_action(&dialogue), "next");
            assert_eq!(carriage(&dialogue), 2);
            assert!(dialogue.state().capabilities().prev);
            assert_eq!(dialogue.visible_trains(), on_screen.as_slice());

            let dialogue = Navigation::any().prefer(UiAction::Prev).build(&mut env, dialogue).unwrap();
            assert_eq!(last_action(&dialogue), "prev");
            assert_eq!(carriage(&dialogue), 1);
            assert_eq!(dialogue.visible_trains(), on_screen.as_slice());

            let dialogue = Navigation::any().prefer(UiAction::Back).build(&mut env, dialogue).unwrap();
            assert_eq!(last_action(&dialogue), "back");
            assert_eq!(*dialogue.state(), DialogueState::Results { page, total_pages });
            assert_eq!(dialogue.visible_trains(), on_screen.as_slice());
            assert_eq!(dialogue.params().ui.page, Some(page));
        }
    }

    #[test]
    fn test_last_carriage_offers_no_next() {
        let resources = Resources::builtin();
        let (mut decisions, mut dialogue) = seated(&resources, 0..60).remove(0);
        let mut env = Env::new(&mut decisions, &resources);

        let DialogueState::ChoosingSeat { total_carriages, .. } = dialogue.state().clone() else {
            unreachable!()
        };
        while dialogue.state().capabilities().next {
            dialogue = Navigation::any().prefer(UiAction::Next).build(&mut env, dialogue).unwrap();
        }
        assert_eq!(carriage(&dialogue), total_carriages);
        assert!(!legal_ui_actions(dialogue.state()).contains(&UiAction::Next));

        let after = Navigation::any()
            .staying()
            .prefer(UiAction::Next)
            .build(&mut env, dialogue)
            .unwrap();
        assert_ne!(last_action(&after), "next");
        assert_eq!(carriage(&after), total_carriages);
    }

    #[test]
    fn test_show_changes_on_empty_page_is_an_error() {
        let resources = Resources::builtin();
        let mut decisions = DecisionSource::new(4);
        let mut env = Env::new(&mut decisions, &resources);

        let dialogue = Dialogue::new(ContextParams::new(
            "Napoli Centrale",
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
        ));
        let mut turn = dialogue.begin_turn();
        turn.user("Un treno per Salerno");
        turn.call(
            Action::Search,
            SearchArgs::new("Napoli Centrale", "Salerno").into(),
        )
        .unwrap();
        turn.respond(Outcome::Results { total_pages: 1 }, &json!({"trains": []}))
            .unwrap();
        turn.set_results(SearchResults::default());
        turn.assistant("Ecco i treni");
        let dialogue = dialogue.push_turn(turn).unwrap();
        assert!(dialogue.visible_trains().is_empty());

        let result = Navigation::any().prefer(UiAction::ShowChanges).build(&mut env, dialogue);
        assert!(matches!(result, Err(Error::Structure(_))));
    }

    #[test]
    fn test_preferred_action_needs_legality() {
        let resources = Resources::builtin();
        for seed in 0..30 {
            let mut decisions = DecisionSource::new(seed);
            let mut env = Env::new(&mut decisions, &resources);
            let dialogue = searched(&mut env);
            let can = dialogue.state().capabilities();
            let after = Navigation::any().prefer(UiAction::Prev).build(&mut env, dialogue).unwrap();

            // page 1 never offers prev
            assert!(!can.prev);
            let call = &after.messages()[after.messages().len() - 3].tool_calls()[0];
            assert_ne!(call.function.arguments, r#"{"action":"prev"}"#);
        }
    }

    #[test]
    fn test_next_moves_page() {
        let resources = Resources::builtin();
        let mut decisions = DecisionSource::new(2);
        let mut env = Env::new(&mut decisions, &resources);
        let dialogue = searched(&mut env);
        // at least five results, so a second page exists
        assert!(dialogue.state().capabilities().next);
        let after = Navigation::any().prefer(UiAction::Next).build(&mut env, dialogue).unwrap();
        assert_eq!(after.params().ui.page, Some(2));
        assert_eq!(after.visible_trains()[0].pos, 4);
    }

    #[test]
    fn test_staying_never_goes_back() {
        let resources = Resources::builtin();
        for seed in 0..30 {
            let mut decisions = DecisionSource::new(seed);
            let mut env = Env::new(&mut decisions, &resources);
            let dialogue = searched(&mut env);
            let after = Navigation::any().staying().build(&mut env, dialogue).unwrap();
            assert_ne!(*after.state(), DialogueState::Idle);
        }
    }

    #[test]
    fn test_idle_offers_back_and_status_only() {
        let resources = Resources::builtin();
        let mut decisions = DecisionSource::new(8);
        let mut env = Env::new(&mut decisions, &resources);
        let dialogue = Dialogue::new(ContextParams::new(
            "Roma Termini",
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
        ));
        let after = Navigation::any().build(&mut env, dialogue).unwrap();
        let call = &after.messages()[2].tool_calls()[0];
        let args = call.arguments_json().unwrap();
        assert!(args["action"] == "back" || args["action"] == "status");
    }
}
