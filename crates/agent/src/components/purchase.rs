//! Purchase component
//!
//! Turns a selection utterance into a `purchase_ticket` call. High-speed
//! trains open the seat map first; the seat turn then issues the ticket.

use railsynth_config::constants::backend::CARRIAGES;
use railsynth_core::{DialogueState, Error, Message, Result, Train};
use railsynth_tools::{
    has_first_class, is_high_speed, BackendFailure, PurchaseArgs, SeatPreference, ToolArguments,
    ToolName, FIRST_CLASS, SECOND_CLASS,
};
use serde_json::json;
use std::fmt;

use super::{with_aside, Component};
use crate::corpus::CorpusFilter;
use crate::dialogue::{Dialogue, Turn};
use crate::phrases::categories::{
    PAYMENT_FAILURE_REPLIES, PAYMENT_RETRY_CONFIRMATIONS, PURCHASE_SUCCESS, SEAT_AISLE,
    SEAT_INDIFFERENT, SEAT_PROMPTS, SEAT_WINDOW, SELECTION_CHEAPEST, SELECTION_DIRECT,
    SELECTION_FASTEST, SELECTION_NAMED, SELECTION_ORDINAL,
};
use crate::phrases::ordinal;
use crate::protocol::{Action, Outcome};
use crate::resources::Env;

/// How the user points at a train on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// "il secondo"
    Ordinal,
    Cheapest,
    Fastest,
    /// Only offered when a visible train has no stops
    Direct,
    /// Type and departure, "il Frecciarossa delle 10:15"
    Named,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Selection::Ordinal => "ordinal",
            Selection::Cheapest => "cheapest",
            Selection::Fastest => "fastest",
            Selection::Direct => "direct",
            Selection::Named => "named",
        })
    }
}

/// Train a selection refers to. `pick` is the list index for
/// [`Selection::Ordinal`] and [`Selection::Named`].
pub fn select_train(selection: Selection, trains: &[Train], pick: usize) -> Option<&Train> {
    match selection {
        Selection::Ordinal | Selection::Named => trains.get(pick),
        Selection::Cheapest => trains.iter().min_by_key(|t| (t.price, t.pos)),
        Selection::Fastest => trains
            .iter()
            .min_by_key(|t| (t.duration_minutes().unwrap_or(u32::MAX), t.pos)),
        Selection::Direct => trains.iter().filter(|t| t.is_direct()).min_by_key(|t| t.pos),
    }
}

/// What happens once the seat map is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeatFlow {
    /// The user picks a seat and the ticket is issued
    #[default]
    Complete,
    /// The dialogue ends on the seat map
    StopAtSeatMap,
}

#[derive(Debug, Clone, Default)]
pub struct Purchase {
    /// Drawn from the options the visible list supports when unset
    pub selection: Option<Selection>,
    pub seat_flow: SeatFlow,
    /// The first payment attempt times out and the user confirms a retry
    pub payment_retry: bool,
    /// The selection utterance already states a window/aisle preference
    pub seat_aside: bool,
}

impl Purchase {
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn stop_at_seat_map(mut self) -> Self {
        self.seat_flow = SeatFlow::StopAtSeatMap;
        self
    }

    pub fn with_payment_retry(mut self) -> Self {
        self.payment_retry = true;
        self
    }

    pub fn with_seat_aside(mut self) -> Self {
        self.seat_aside = true;
        self
    }

    fn select(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let trains = dialogue.visible_trains().to_vec();
        if trains.is_empty() {
            tracing::debug!("No trains on screen, purchase skipped");
            return Ok(dialogue);
        }

        let has_direct = trains.iter().any(Train::is_direct);
        let selection = match self.selection {
            Some(Selection::Direct) if !has_direct => Selection::Ordinal,
            Some(selection) => selection,
            None => {
                let mut offered = vec![
                    Selection::Ordinal,
                    Selection::Cheapest,
                    Selection::Fastest,
                    Selection::Named,
                ];
                if has_direct {
                    offered.push(Selection::Direct);
                }
                *env.decisions.choose("purchase:selection", &offered)
            }
        };
        let pick = match selection {
            Selection::Ordinal | Selection::Named => {
                env.decisions.int("purchase:pick", 0, trains.len() as u32 - 1) as usize
            }
            _ => 0,
        };
        let train = select_train(selection, &trains, pick)
            .cloned()
            .ok_or_else(|| Error::Structure(format!("{} selection found no train", selection)))?;

        let mut text = match selection {
            Selection::Ordinal => {
                let word = ordinal(pick);
                env.say(SELECTION_ORDINAL, &[("ordinal", word.as_str())])?
            }
            Selection::Cheapest => env.say(SELECTION_CHEAPEST, &[])?,
            Selection::Fastest => env.say(SELECTION_FASTEST, &[])?,
            Selection::Direct => env.say(SELECTION_DIRECT, &[])?,
            Selection::Named => env.say(
                SELECTION_NAMED,
                &[
                    ("train_type", train.train_type.as_str()),
                    ("dep", train.dep.as_str()),
                ],
            )?,
        };

        let travel_class =
            if has_first_class(&train.train_type) && env.decisions.chance("purchase:first_class", 20) {
                text = with_aside(&text, " in prima classe");
                FIRST_CLASS
            } else {
                SECOND_CLASS
            };

        let mut args = PurchaseArgs::new(train.id.clone(), travel_class);
        if self.seat_aside {
            let preference = *env
                .decisions
                .choose("purchase:seat_aside", &[SeatPreference::Window, SeatPreference::Aisle]);
            text = with_aside(&text, seat_aside_text(preference));
            let (seat, carriage) = env.resources.backend.pick_seat(env.decisions, preference);
            args = args.with_seat(seat, carriage);
        }

        tracing::debug!(
            selection = %selection,
            train_id = %train.id,
            class = travel_class,
            "Purchase selection"
        );

        let mut turn = dialogue.begin_turn();
        turn.user(text);

        if !is_high_speed(&train.train_type) || args.seat.is_some() {
            return self.issue(env, dialogue, turn, args, &train);
        }

        turn.call(
            Action::Purchase {
                train_id: train.id.clone(),
                high_speed: true,
                seat: false,
            },
            args.into(),
        )?;
        let seat_map = env.resources.backend.seat_map_response(env.decisions, &train, 1);
        turn.respond(
            Outcome::SeatMap {
                total_carriages: CARRIAGES,
            },
            &seat_map,
        )?;
        turn.assistant(env.phrase(SEAT_PROMPTS, CorpusFilter::ANY)?);
        let dialogue = dialogue.push_turn(turn)?;

        match self.seat_flow {
            SeatFlow::StopAtSeatMap => Ok(dialogue),
            SeatFlow::Complete => self.choose_seat(env, dialogue, &train, travel_class),
        }
    }

    fn choose_seat(
        &self,
        env: &mut Env<'_>,
        dialogue: Dialogue,
        train: &Train,
        travel_class: &str,
    ) -> Result<Dialogue> {
        let preference = *env
            .decisions
            .choose("purchase:seat_preference", &SeatPreference::ALL);
        let category = match preference {
            SeatPreference::Window => SEAT_WINDOW,
            SeatPreference::Aisle => SEAT_AISLE,
            SeatPreference::Indifferent => SEAT_INDIFFERENT,
        };
        let text = env.phrase(category, CorpusFilter::ANY)?;
        let (seat, picked) = env.resources.backend.pick_seat(env.decisions, preference);
        let carriage = match dialogue.state() {
            DialogueState::ChoosingSeat { carriage, .. } => *carriage,
            _ => picked,
        };

        let mut turn = dialogue.begin_turn();
        turn.user(text);
        let args = PurchaseArgs::new(train.id.clone(), travel_class).with_seat(seat, carriage);
        self.issue(env, dialogue, turn, args, train)
    }

    /// Issue the ticket, after a failed payment attempt when scripted
    fn issue(
        &self,
        env: &mut Env<'_>,
        dialogue: Dialogue,
        mut turn: Turn,
        args: PurchaseArgs,
        train: &Train,
    ) -> Result<Dialogue> {
        let action = Action::Purchase {
            train_id: train.id.clone(),
            high_speed: is_high_speed(&train.train_type),
            seat: args.seat.is_some(),
        };

        let mut dialogue = dialogue;
        if self.payment_retry {
            turn.call(action.clone(), args.clone().into())?;
            turn.respond(
                Outcome::Failed,
                &BackendFailure::PaymentGatewayTimeout.response(),
            )?;
            turn.assistant(env.phrase(PAYMENT_FAILURE_REPLIES, CorpusFilter::ANY)?);
            dialogue = dialogue.push_turn(turn)?;

            turn = dialogue.begin_turn();
            turn.user(env.phrase(PAYMENT_RETRY_CONFIRMATIONS, CorpusFilter::ANY)?);
        }

        turn.call(action, args.clone().into())?;
        let ticket = env.resources.backend.purchase(env.decisions, &args, train);
        let response = json!({
            "status": "confirmed",
            "ticket": serde_json::to_value(&ticket)?,
        });
        turn.respond(Outcome::Done, &response)?;

        let carriage = ticket.carriage.to_string();
        let price = ticket.price.to_string();
        let reply = env.say(
            PURCHASE_SUCCESS,
            &[
                ("code", ticket.confirmation_code.as_str()),
                ("carriage", carriage.as_str()),
                ("seat", ticket.seat.as_str()),
                ("price", price.as_str()),
            ],
        )?;
        turn.set_ticket(ticket);
        turn.assistant(reply);
        dialogue.push_turn(turn)
    }
}

fn seat_aside_text(preference: SeatPreference) -> &'static str {
    match preference {
        SeatPreference::Window => ", posto al finestrino",
        SeatPreference::Aisle => ", posto lato corridoio",
        SeatPreference::Indifferent => "",
    }
}

/// Travel class of the last purchase call, for a seat map opened earlier
fn last_requested_class(dialogue: &Dialogue) -> String {
    dialogue
        .messages()
        .iter()
        .rev()
        .flat_map(Message::tool_calls)
        .find(|call| call.name() == ToolName::PurchaseTicket.as_str())
        .and_then(|call| ToolArguments::parse(ToolName::PurchaseTicket, &call.function.arguments).ok())
        .and_then(|args| match args {
            ToolArguments::Purchase(args) => Some(args.travel_class),
            _ => None,
        })
        .unwrap_or_else(|| SECOND_CLASS.to_string())
}

impl Component for Purchase {
    fn name(&self) -> &'static str {
        "purchase"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        match dialogue.state().clone() {
            DialogueState::Results { .. } => self.select(env, dialogue),
            DialogueState::ChoosingSeat { train_id, .. } => {
                let train = dialogue
                    .visible_trains()
                    .iter()
                    .find(|t| t.id == train_id)
                    .cloned()
                    .ok_or_else(|| Error::Structure(format!("seated train {} not on screen", train_id)))?;
                let travel_class = last_requested_class(&dialogue);
                self.choose_seat(env, dialogue, &train, &travel_class)
            }
            other => {
                tracing::debug!(state = %other, "Purchase not possible, skipped");
                Ok(dialogue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railsynth_core::{Price, StateKind};

    fn train(pos: u32, id: &str, dep: &str, arr: &str, stops: u32, cents: u32) -> Train {
        let train_type = match &id[..2] {
            "FR" => "Frecciarossa",
            "IC" => "Intercity",
            _ => "Regionale",
        };
        Train {
            pos,
            id: id.into(),
            dep: dep.into(),
            arr: arr.into(),
            train_type: train_type.into(),
            stops,
            price: Price(cents),
        }
    }

    fn page() -> Vec<Train> {
        vec![
            train(1, "IC4501", "09:10", "12:40", 5, 2890),
            train(2, "FR9812", "09:40", "11:45", 0, 2450),
            train(3, "R22145", "10:05", "14:55", 15, 2450),
        ]
    }

    #[test]
    fn test_cheapest_selection() {
        let trains = page();
        // ties on price go to the lower position
        assert_eq!(select_train(Selection::Cheapest, &trains, 0).unwrap().id, "FR9812");
    }

    #[test]
    fn test_fastest_and_direct_selection() {
        let trains = page();
        assert_eq!(select_train(Selection::Fastest, &trains, 0).unwrap().id, "FR9812");
        assert_eq!(select_train(Selection::Direct, &trains, 0).unwrap().id, "FR9812");
        assert!(select_train(Selection::Direct, &trains[..1], 0).is_none());
    }

    #[test]
    fn test_fastest_handles_overnight_arrival() {
        let trains = vec![
            train(1, "IC1000", "22:30", "01:00", 5, 3000),
            train(2, "IC1001", "21:00", "23:59", 5, 3000),
        ];
        assert_eq!(select_train(Selection::Fastest, &trains, 0).unwrap().id, "IC1000");
    }

    #[test]
    fn test_ordinal_selection() {
        let trains = page();
        assert_eq!(select_train(Selection::Ordinal, &trains, 2).unwrap().id, "R22145");
        assert!(select_train(Selection::Ordinal, &trains, 3).is_none());
    }

    mod seat_flow {
        use super::super::*;
        use crate::components::{Navigation, Search};
        use crate::resources::Resources;
        use chrono::{NaiveDate, NaiveTime};
        use railsynth_core::{ContextParams, DecisionSource};
        use railsynth_tools::UiAction;

        fn searched(env: &mut Env<'_>) -> Dialogue {
            let dialogue = Dialogue::new(ContextParams::new(
                "Firenze Santa Maria Novella",
                NaiveDate::from_ymd_opt(2025, 12, 18).unwrap(),
                NaiveTime::from_hms_opt(10, 20, 0).unwrap(),
            ));
            Search::fresh().build(env, dialogue).unwrap()
        }

        #[test]
        fn test_stop_at_seat_map_then_finish_on_current_carriage() {
            let resources = Resources::builtin();
            let mut finished = 0;
            for seed in 0..60 {
                let mut decisions = DecisionSource::new(seed);
                let mut env = Env::new(&mut decisions, &resources);
                let dialogue = searched(&mut env);
                let dialogue = Purchase::default()
                    .stop_at_seat_map()
                    .build(&mut env, dialogue)
                    .unwrap();
                let DialogueState::ChoosingSeat {
                    train_id,
                    carriage,
                    total_carriages,
                    ..
                } = dialogue.state().clone()
                else {
                    continue;
                };
                assert_eq!(carriage, 1);
                assert_eq!(total_carriages, CARRIAGES);
                assert!(dialogue.params().ticket.is_none());

                // walk one carriage on half the runs
                let (dialogue, carriage) = if seed % 2 == 0 {
                    let moved = Navigation::any().prefer(UiAction::Next).build(&mut env, dialogue).unwrap();
                    (moved, 2)
                } else {
                    (dialogue, 1)
                };

                let bought = Purchase::default().build(&mut env, dialogue).unwrap();
                assert_eq!(*bought.state(), DialogueState::Purchased);
                let ticket = bought.params().ticket.clone().unwrap();
                assert_eq!(ticket.train_id, train_id);
                assert_eq!(ticket.carriage, carriage);
                finished += 1;
            }
            assert!(finished > 0);
        }

        #[test]
        fn test_with_selection_buys_that_train() {
            let resources = Resources::builtin();
            for seed in 0..30 {
                let mut decisions = DecisionSource::new(seed);
                let mut env = Env::new(&mut decisions, &resources);
                let dialogue = searched(&mut env);
                let expected = select_train(Selection::Cheapest, dialogue.visible_trains(), 0)
                    .unwrap()
                    .id
                    .clone();

                let bought = Purchase::default()
                    .with_selection(Selection::Cheapest)
                    .build(&mut env, dialogue)
                    .unwrap();
                assert_eq!(*bought.state(), DialogueState::Purchased);
                assert_eq!(bought.params().ticket.as_ref().unwrap().train_id, expected);
            }
        }

        #[test]
        fn test_stop_at_seat_map_only_holds_high_speed_trains() {
            let resources = Resources::builtin();
            for seed in 0..30 {
                let mut decisions = DecisionSource::new(seed);
                let mut env = Env::new(&mut decisions, &resources);
                let dialogue = searched(&mut env);
                let on_screen = dialogue.visible_trains().to_vec();
                let after = Purchase::default()
                    .stop_at_seat_map()
                    .build(&mut env, dialogue)
                    .unwrap();

                let (train_id, seat_map) = match after.state() {
                    DialogueState::ChoosingSeat { train_id, .. } => (train_id.clone(), true),
                    DialogueState::Purchased => (after.params().ticket.clone().unwrap().train_id, false),
                    other => panic!("unexpected state {}", other),
                };
                let train = on_screen.iter().find(|t| t.id == train_id).unwrap();
                assert_eq!(is_high_speed(&train.train_type), seat_map);
            }
        }
    }

    #[test]
    fn test_purchase_outside_results_is_noop() {
        use crate::resources::Resources;
        use chrono::{NaiveDate, NaiveTime};
        use railsynth_core::{ContextParams, DecisionSource};

        let resources = Resources::builtin();
        let mut decisions = DecisionSource::new(1);
        let mut env = Env::new(&mut decisions, &resources);
        let dialogue = Dialogue::new(ContextParams::new(
            "Roma Termini",
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        ));
        let after = Purchase::default().build(&mut env, dialogue).unwrap();
        assert_eq!(after.messages().len(), 1);
        assert_eq!(after.params().state(), StateKind::Idle);
    }
}
