//! Dialogue protocol
//!
//! Finite-state gate over the kiosk interface. Every tool call a component
//! emits is checked against the transition table first; an action the table
//! does not allow is a construction defect.

use railsynth_core::{DialogueState, Error, Result, StateKind};
use railsynth_tools::{ToolName, UiAction};
use std::fmt;

/// Tool invocation as seen by the protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search,
    Purchase {
        train_id: String,
        /// Train type requires seat selection
        high_speed: bool,
        /// Seat supplied in the arguments
        seat: bool,
    },
    Ui(UiAction),
}

/// Table trigger, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Search,
    Purchase,
    Next,
    Prev,
    Back,
    Status,
    ShowChanges,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Search => ActionKind::Search,
            Action::Purchase { .. } => ActionKind::Purchase,
            Action::Ui(UiAction::Next) => ActionKind::Next,
            Action::Ui(UiAction::Prev) => ActionKind::Prev,
            Action::Ui(UiAction::Back) => ActionKind::Back,
            Action::Ui(UiAction::Status) => ActionKind::Status,
            Action::Ui(UiAction::ShowChanges) => ActionKind::ShowChanges,
        }
    }

    pub fn tool(&self) -> ToolName {
        match self {
            Action::Search => ToolName::SearchTrains,
            Action::Purchase { .. } => ToolName::PurchaseTicket,
            Action::Ui(_) => ToolName::UiControl,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("search_trains"),
            Action::Purchase { train_id, .. } => write!(f, "purchase_ticket({})", train_id),
            Action::Ui(action) => write!(f, "ui_control({})", action),
        }
    }
}

/// What the backend answered to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Simulated backend error; the interface does not move
    Failed,
    /// Search results are on screen
    Results { total_pages: u32 },
    /// Seat map opened on the first carriage
    SeatMap { total_carriages: u32 },
    /// Any other success
    Done,
}

/// Transition table: (trigger, target) pairs allowed from each state.
///
/// A trigger listed twice has its target chosen by the action payload.
pub fn transitions(from: StateKind) -> &'static [(ActionKind, StateKind)] {
    use ActionKind as A;
    use StateKind as S;
    match from {
        S::Idle => &[
            (A::Search, S::Results),
            (A::Back, S::Idle),
            (A::Status, S::Idle),
        ],
        S::Results => &[
            (A::Search, S::Results),
            (A::Next, S::Results),
            (A::Prev, S::Results),
            (A::Back, S::Idle),
            (A::Purchase, S::Purchased),
            (A::Purchase, S::ChoosingSeat),
            (A::Status, S::Results),
            (A::ShowChanges, S::Results),
        ],
        S::ChoosingSeat => &[
            (A::Next, S::ChoosingSeat),
            (A::Prev, S::ChoosingSeat),
            (A::Purchase, S::Purchased),
            (A::Back, S::Results),
            (A::Status, S::ChoosingSeat),
        ],
        S::Purchased => &[
            (A::Search, S::Results),
            (A::Back, S::Idle),
            (A::Status, S::Purchased),
        ],
    }
}

fn listed(from: StateKind, trigger: ActionKind) -> bool {
    transitions(from).iter().any(|(t, _)| *t == trigger)
}

/// Whether `action` may be emitted in `state`
pub fn is_legal(state: &DialogueState, action: &Action) -> bool {
    if !listed(state.kind(), action.kind()) {
        return false;
    }
    let can = state.capabilities();
    match (state, action) {
        (_, Action::Ui(UiAction::Next)) => can.next,
        (_, Action::Ui(UiAction::Prev)) => can.prev,
        (
            DialogueState::ChoosingSeat { train_id, .. },
            Action::Purchase {
                train_id: requested,
                seat,
                ..
            },
        ) => *seat && train_id == requested,
        _ => true,
    }
}

/// `ui_control` actions legal in `state`, in declaration order
pub fn legal_ui_actions(state: &DialogueState) -> Vec<UiAction> {
    UiAction::ALL
        .into_iter()
        .filter(|action| is_legal(state, &Action::Ui(*action)))
        .collect()
}

fn illegal(state: &DialogueState, action: &Action) -> Error {
    Error::IllegalAction {
        state: state.to_string(),
        action: action.to_string(),
    }
}

fn mismatch(action: &Action, outcome: Outcome) -> Error {
    Error::Structure(format!("outcome {:?} does not fit {}", outcome, action))
}

/// State after `action` completed with `outcome`
pub fn transition(state: &DialogueState, action: &Action, outcome: Outcome) -> Result<DialogueState> {
    if !is_legal(state, action) {
        return Err(illegal(state, action));
    }
    if outcome == Outcome::Failed {
        return Ok(state.clone());
    }

    let next = match (state, action) {
        (_, Action::Search) => match outcome {
            Outcome::Results { total_pages } => DialogueState::first_page(total_pages),
            _ => return Err(mismatch(action, outcome)),
        },

        (DialogueState::Results { page, total_pages }, Action::Ui(UiAction::Next)) => {
            DialogueState::Results {
                page: page + 1,
                total_pages: *total_pages,
            }
        }
        (DialogueState::Results { page, total_pages }, Action::Ui(UiAction::Prev)) => {
            DialogueState::Results {
                page: page - 1,
                total_pages: *total_pages,
            }
        }
        (DialogueState::ChoosingSeat { .. }, Action::Ui(UiAction::Next | UiAction::Prev)) => {
            let mut moved = state.clone();
            if let DialogueState::ChoosingSeat { carriage, .. } = &mut moved {
                if action.kind() == ActionKind::Next {
                    *carriage += 1;
                } else {
                    *carriage -= 1;
                }
            }
            moved
        }
        (_, Action::Ui(UiAction::Next | UiAction::Prev)) => return Err(illegal(state, action)),

        (DialogueState::ChoosingSeat { page, total_pages, .. }, Action::Ui(UiAction::Back)) => {
            DialogueState::Results {
                page: *page,
                total_pages: *total_pages,
            }
        }
        (_, Action::Ui(UiAction::Back)) => DialogueState::Idle,
        (_, Action::Ui(UiAction::Status | UiAction::ShowChanges)) => state.clone(),

        (
            DialogueState::Results { page, total_pages },
            Action::Purchase {
                train_id,
                high_speed: true,
                seat: false,
            },
        ) => match outcome {
            Outcome::SeatMap { total_carriages } => DialogueState::ChoosingSeat {
                train_id: train_id.clone(),
                carriage: 1,
                total_carriages: total_carriages.max(1),
                page: *page,
                total_pages: *total_pages,
            },
            _ => return Err(mismatch(action, outcome)),
        },
        (_, Action::Purchase { .. }) => match outcome {
            Outcome::Done => DialogueState::Purchased,
            _ => return Err(mismatch(action, outcome)),
        },
    };

    debug_assert!(transitions(state.kind())
        .iter()
        .any(|(t, to)| *t == action.kind() && *to == next.kind()));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(page: u32, total_pages: u32) -> DialogueState {
        DialogueState::Results { page, total_pages }
    }

    fn seat_map(carriage: u32) -> DialogueState {
        DialogueState::ChoosingSeat {
            train_id: "FR9812".into(),
            carriage,
            total_carriages: 8,
            page: 2,
            total_pages: 3,
        }
    }

    fn purchase(train_id: &str, high_speed: bool, seat: bool) -> Action {
        Action::Purchase {
            train_id: train_id.into(),
            high_speed,
            seat,
        }
    }

    #[test]
    fn test_search_legality() {
        assert!(is_legal(&DialogueState::Idle, &Action::Search));
        assert!(is_legal(&results(1, 2), &Action::Search));
        assert!(is_legal(&DialogueState::Purchased, &Action::Search));
        assert!(!is_legal(&seat_map(1), &Action::Search));
    }

    #[test]
    fn test_purchase_legality() {
        assert!(!is_legal(&DialogueState::Idle, &purchase("IC1234", false, false)));
        assert!(!is_legal(&DialogueState::Purchased, &purchase("IC1234", false, false)));
        assert!(is_legal(&results(1, 1), &purchase("IC1234", false, false)));
        // seat map needs the seated train and a seat
        assert!(is_legal(&seat_map(1), &purchase("FR9812", true, true)));
        assert!(!is_legal(&seat_map(1), &purchase("FR9812", true, false)));
        assert!(!is_legal(&seat_map(1), &purchase("FA1111", true, true)));
    }

    #[test]
    fn test_navigation_follows_capabilities() {
        assert_eq!(
            legal_ui_actions(&results(1, 3)),
            vec![UiAction::Next, UiAction::Back, UiAction::Status, UiAction::ShowChanges]
        );
        assert_eq!(
            legal_ui_actions(&results(3, 3)),
            vec![UiAction::Prev, UiAction::Back, UiAction::Status, UiAction::ShowChanges]
        );
        assert_eq!(
            legal_ui_actions(&DialogueState::Idle),
            vec![UiAction::Back, UiAction::Status]
        );
        assert_eq!(
            legal_ui_actions(&seat_map(8)),
            vec![UiAction::Prev, UiAction::Back, UiAction::Status]
        );
        assert!(!is_legal(&results(1, 1), &Action::Ui(UiAction::Next)));
    }

    #[test]
    fn test_transitions() {
        let state = transition(&DialogueState::Idle, &Action::Search, Outcome::Results { total_pages: 3 })
            .unwrap();
        assert_eq!(state, results(1, 3));

        let state = transition(&state, &Action::Ui(UiAction::Next), Outcome::Done).unwrap();
        assert_eq!(state, results(2, 3));

        let state = transition(&state, &purchase("FR9812", true, false), Outcome::SeatMap { total_carriages: 8 })
            .unwrap();
        assert_eq!(state, seat_map(1));

        let state = transition(&state, &Action::Ui(UiAction::Next), Outcome::Done).unwrap();
        assert_eq!(state, seat_map(2));

        let back = transition(&state, &Action::Ui(UiAction::Back), Outcome::Done).unwrap();
        assert_eq!(back, results(2, 3));

        let bought = transition(&state, &purchase("FR9812", true, true), Outcome::Done).unwrap();
        assert_eq!(bought, DialogueState::Purchased);

        let home = transition(&bought, &Action::Ui(UiAction::Back), Outcome::Done).unwrap();
        assert_eq!(home, DialogueState::Idle);
    }

    #[test]
    fn test_regional_purchase_skips_seat_map() {
        let state = transition(&results(1, 2), &purchase("R2345", false, false), Outcome::Done).unwrap();
        assert_eq!(state, DialogueState::Purchased);
    }

    #[test]
    fn test_failure_keeps_state() {
        let state = results(2, 3);
        assert_eq!(
            transition(&state, &Action::Search, Outcome::Failed).unwrap(),
            state
        );
        assert_eq!(
            transition(&state, &purchase("IC1234", false, false), Outcome::Failed).unwrap(),
            state
        );
    }

    #[test]
    fn test_illegal_and_mismatched_input() {
        assert!(matches!(
            transition(&results(1, 1), &Action::Ui(UiAction::Next), Outcome::Done),
            Err(Error::IllegalAction { .. })
        ));
        assert!(matches!(
            transition(&DialogueState::Idle, &Action::Search, Outcome::Done),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn test_status_never_moves() {
        for state in [DialogueState::Idle, results(2, 2), seat_map(3), DialogueState::Purchased] {
            let after = transition(&state, &Action::Ui(UiAction::Status), Outcome::Done).unwrap();
            assert_eq!(after, state);
        }
    }
}
