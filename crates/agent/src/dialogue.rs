//! Dialogue accumulator
//!
//! A [`Dialogue`] is threaded by value through the components of a scenario.
//! Each component opens a [`Turn`], appends messages to it and hands it back
//! with [`Dialogue::push_turn`], which closes one context slice carrying the
//! parameters the turn was generated under.

use chrono::NaiveTime;
use railsynth_core::{
    call_id, ContextParams, ContextSlice, DialogueState, Error, Message, Result, SampleMeta,
    SkeletonRecord, Ticket, ToolCall, Train, SYSTEM_PROMPT_PLACEHOLDER,
};
use railsynth_tools::{SearchResults, ToolArguments};
use serde_json::Value as JsonValue;

use crate::protocol::{self, Action, Outcome};

/// Conversation under construction
#[derive(Debug, Clone)]
pub struct Dialogue {
    messages: Vec<Message>,
    contexts: Vec<ContextSlice>,
    state: DialogueState,
    params: ContextParams,
    /// Full result list of the last successful search
    results: SearchResults,
    next_call: u32,
    /// Messages not yet covered by a slice
    unsliced: usize,
    user_turns: usize,
}

impl Dialogue {
    /// Start a conversation at the kiosk described by `params`
    pub fn new(params: ContextParams) -> Self {
        let mut params = params;
        params.ui = DialogueState::Idle.snapshot();
        params.trains.clear();
        params.ticket = None;
        Self {
            messages: vec![Message::system(SYSTEM_PROMPT_PLACEHOLDER)],
            contexts: Vec::new(),
            state: DialogueState::Idle,
            params,
            results: SearchResults::default(),
            next_call: 1,
            unsliced: 1,
            user_turns: 0,
        }
    }

    /// Open the next turn from the current state
    pub fn begin_turn(&self) -> Turn {
        Turn {
            pre_params: self.params.clone(),
            params: self.params.clone(),
            state: self.state.clone(),
            results: self.results.clone(),
            next_call: self.next_call,
            messages: Vec::new(),
            pending: None,
            has_user: false,
        }
    }

    /// Append a finished turn and close its context slice
    pub fn push_turn(mut self, turn: Turn) -> Result<Dialogue> {
        if let Some((call, _)) = &turn.pending {
            return Err(Error::Structure(format!(
                "call {} closed without a tool response",
                call.id
            )));
        }
        if turn.messages.is_empty() {
            return Ok(self);
        }

        self.contexts.push(ContextSlice {
            slice_length: self.unsliced + turn.messages.len(),
            params: turn.pre_params,
        });
        self.unsliced = 0;
        self.messages.extend(turn.messages);
        if turn.has_user {
            self.user_turns += 1;
        }

        self.state = turn.state;
        self.results = turn.results;
        self.next_call = turn.next_call;
        self.params = turn.params;
        self.params.ui = self.state.snapshot();
        self.params.trains = visible_trains(&self.state, &self.results);
        if self.state != DialogueState::Purchased {
            self.params.ticket = None;
        }
        Ok(self)
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Parameters the next turn will be generated under
    pub fn params(&self) -> &ContextParams {
        &self.params
    }

    /// Trains on screen
    pub fn visible_trains(&self) -> &[Train] {
        &self.params.trains
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn contexts(&self) -> &[ContextSlice] {
        &self.contexts
    }

    /// Whether no user message has been written yet
    pub fn is_opening(&self) -> bool {
        self.user_turns == 0
    }

    /// Tool calls issued so far
    pub fn call_count(&self) -> u32 {
        self.next_call - 1
    }

    /// Seal the conversation into a validated skeleton record
    pub fn finish(
        self,
        scenario: &str,
        seed: u64,
        run_id: u32,
        tools: JsonValue,
    ) -> Result<SkeletonRecord> {
        if self.unsliced > 0 {
            return Err(Error::Structure(format!(
                "scenario '{}' produced no turns",
                scenario
            )));
        }
        let record = SkeletonRecord {
            tools,
            messages: self.messages,
            meta: SampleMeta {
                scenario: scenario.to_string(),
                seed,
                run_id,
                contexts: self.contexts,
            },
        };
        record.validate()?;
        Ok(record)
    }
}

fn visible_trains(state: &DialogueState, results: &SearchResults) -> Vec<Train> {
    match state {
        DialogueState::Results { page, .. } | DialogueState::ChoosingSeat { page, .. } => {
            results.page(*page)
        }
        _ => Vec::new(),
    }
}

/// Messages of one turn, generated under a fixed parameter set
#[derive(Debug, Clone)]
pub struct Turn {
    /// Parameters recorded for the slice
    pre_params: ContextParams,
    /// Parameters carried into the next turn
    params: ContextParams,
    state: DialogueState,
    results: SearchResults,
    next_call: u32,
    messages: Vec<Message>,
    pending: Option<(ToolCall, Action)>,
    has_user: bool,
}

impl Turn {
    /// Move the kiosk clock before anything is said in this turn
    pub fn at_time(&mut self, time: NaiveTime) {
        self.pre_params.time = time;
        self.params.time = time;
    }

    pub fn user(&mut self, content: impl Into<String>) {
        self.has_user = true;
        self.messages.push(Message::user(content));
    }

    pub fn assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Emit a tool call after checking it against the protocol and the
    /// visible context
    pub fn call(&mut self, action: Action, arguments: ToolArguments) -> Result<ToolCall> {
        if let Some((call, _)) = &self.pending {
            return Err(Error::Structure(format!(
                "call {} is still waiting for its response",
                call.id
            )));
        }
        if !protocol::is_legal(&self.state, &action) {
            return Err(Error::IllegalAction {
                state: self.state.to_string(),
                action: action.to_string(),
            });
        }
        if action.tool() != arguments.tool() {
            return Err(Error::Structure(format!(
                "{} emitted with {} arguments",
                action,
                arguments.tool()
            )));
        }
        arguments.validate()?;

        match &arguments {
            ToolArguments::Search(args) if args.origin != self.pre_params.origin => {
                return Err(Error::Structure(format!(
                    "search origin '{}' differs from kiosk station '{}'",
                    args.origin, self.pre_params.origin
                )));
            }
            ToolArguments::Purchase(args) if self.pre_params.train(&args.train_id).is_none() => {
                return Err(Error::Structure(format!(
                    "train {} is not on screen",
                    args.train_id
                )));
            }
            _ => {}
        }

        let call = ToolCall::function(
            call_id(self.next_call),
            arguments.tool().as_str(),
            arguments.to_json_string()?,
        );
        self.next_call += 1;
        self.messages.push(Message::tool_call(call.clone()));
        self.pending = Some((call.clone(), action));
        Ok(call)
    }

    /// Answer the pending call and apply the resulting transition
    pub fn respond(&mut self, outcome: Outcome, response: &JsonValue) -> Result<()> {
        let (call, action) = self
            .pending
            .take()
            .ok_or_else(|| Error::Structure("tool response without a pending call".into()))?;
        self.state = protocol::transition(&self.state, &action, outcome)?;
        self.messages
            .push(Message::tool_response(&call, serde_json::to_string(response)?));
        Ok(())
    }

    pub fn set_results(&mut self, results: SearchResults) {
        self.results = results;
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.params.destination = Some(destination.into());
    }

    pub fn set_ticket(&mut self, ticket: Ticket) {
        self.params.ticket = Some(ticket);
    }

    /// Working state, including transitions made in this turn
    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Parameters the turn is generated under
    pub fn params(&self) -> &ContextParams {
        &self.pre_params
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use railsynth_core::{Price, StateKind};
    use railsynth_tools::{PurchaseArgs, SearchArgs, UiAction, UiControlArgs};
    use serde_json::json;

    fn params() -> ContextParams {
        ContextParams::new(
            "Roma Termini",
            NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
    }

    fn results(count: u32) -> SearchResults {
        let trains = (1..=count)
            .map(|pos| Train {
                pos,
                id: format!("IC{}", 1000 + pos),
                dep: "10:00".into(),
                arr: "13:00".into(),
                train_type: "Intercity".into(),
                stops: 5,
                price: Price(2500),
            })
            .collect();
        SearchResults::new(trains, 3)
    }

    fn searched() -> Dialogue {
        let dialogue = Dialogue::new(params());
        let mut turn = dialogue.begin_turn();
        turn.user("Un treno per Milano");
        turn.call(
            Action::Search,
            SearchArgs::new("Roma Termini", "Milano Centrale").into(),
        )
        .unwrap();
        turn.respond(Outcome::Results { total_pages: 2 }, &json!({"page": 1}))
            .unwrap();
        turn.set_results(results(5));
        turn.set_destination("Milano Centrale");
        turn.assistant("Ecco i treni");
        dialogue.push_turn(turn).unwrap()
    }

    #[test]
    fn test_first_slice_covers_system_message() {
        let dialogue = searched();
        assert_eq!(dialogue.contexts().len(), 1);
        assert_eq!(dialogue.contexts()[0].slice_length, 5);
        assert_eq!(dialogue.contexts()[0].params.state(), StateKind::Idle);
        assert!(dialogue.contexts()[0].params.trains.is_empty());

        // the search result shows from the next slice on
        assert_eq!(dialogue.params().state(), StateKind::Results);
        assert_eq!(dialogue.visible_trains().len(), 3);
        assert_eq!(dialogue.params().destination.as_deref(), Some("Milano Centrale"));
        assert!(!dialogue.is_opening());
        assert_eq!(dialogue.call_count(), 1);
    }

    #[test]
    fn test_page_change_updates_visible_trains() {
        let dialogue = searched();
        let mut turn = dialogue.begin_turn();
        turn.user("Altri?");
        turn.call(Action::Ui(UiAction::Next), UiControlArgs::new(UiAction::Next).into())
            .unwrap();
        turn.respond(Outcome::Done, &json!({"page": 2})).unwrap();
        let dialogue = dialogue.push_turn(turn).unwrap();

        assert_eq!(dialogue.contexts()[1].params.ui.page, Some(1));
        assert_eq!(dialogue.params().ui.page, Some(2));
        let ids: Vec<&str> = dialogue.params().train_ids().collect();
        assert_eq!(ids, vec!["IC1004", "IC1005"]);
    }

    #[test]
    fn test_illegal_call_rejected() {
        let dialogue = Dialogue::new(params());
        let mut turn = dialogue.begin_turn();
        let err = turn
            .call(Action::Ui(UiAction::Next), UiControlArgs::new(UiAction::Next).into())
            .unwrap_err();
        assert!(matches!(err, Error::IllegalAction { .. }));
    }

    #[test]
    fn test_wrong_origin_rejected() {
        let dialogue = Dialogue::new(params());
        let mut turn = dialogue.begin_turn();
        let err = turn
            .call(Action::Search, SearchArgs::new("Napoli Centrale", "Bari Centrale").into())
            .unwrap_err();
        assert!(matches!(err, Error::Structure(_)));
    }

    #[test]
    fn test_purchase_must_name_visible_train() {
        let dialogue = searched();
        let mut turn = dialogue.begin_turn();
        let hidden = Action::Purchase {
            train_id: "IC1005".into(),
            high_speed: false,
            seat: false,
        };
        assert!(turn
            .call(hidden, PurchaseArgs::new("IC1005", "Seconda Classe").into())
            .is_err());

        let visible = Action::Purchase {
            train_id: "IC1002".into(),
            high_speed: false,
            seat: false,
        };
        turn.call(visible, PurchaseArgs::new("IC1002", "Seconda Classe").into())
            .unwrap();
    }

    #[test]
    fn test_unanswered_call_rejected() {
        let dialogue = Dialogue::new(params());
        let mut turn = dialogue.begin_turn();
        turn.call(Action::Search, SearchArgs::new("Roma Termini", "Bari Centrale").into())
            .unwrap();
        assert!(dialogue.push_turn(turn).is_err());
    }

    #[test]
    fn test_failure_keeps_state() {
        let dialogue = searched();
        let mut turn = dialogue.begin_turn();
        turn.call(Action::Search, SearchArgs::new("Roma Termini", "Bari Centrale").into())
            .unwrap();
        turn.respond(Outcome::Failed, &json!({"error": "timeout"})).unwrap();
        assert_eq!(turn.state(), dialogue.state());
    }

    #[test]
    fn test_at_time_overrides_opening_slice() {
        let dialogue = Dialogue::new(params());
        let mut turn = dialogue.begin_turn();
        turn.at_time(NaiveTime::from_hms_opt(19, 10, 0).unwrap());
        turn.user("Ciao");
        turn.assistant("Buonasera!");
        let dialogue = dialogue.push_turn(turn).unwrap();
        assert_eq!(
            dialogue.contexts()[0].params.time,
            NaiveTime::from_hms_opt(19, 10, 0).unwrap()
        );
        assert_eq!(dialogue.params().time, NaiveTime::from_hms_opt(19, 10, 0).unwrap());
    }

    #[test]
    fn test_finish_validates() {
        let record = searched().finish("search_trains", 7, 1, json!([])).unwrap();
        assert_eq!(record.messages.len(), 5);
        assert_eq!(record.meta.covered_messages(), 5);

        let empty = Dialogue::new(params());
        assert!(empty.finish("search_trains", 7, 1, json!([])).is_err());
    }
}
