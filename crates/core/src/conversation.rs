//! Kiosk interface state as seen by the assistant

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface state of the ticket kiosk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DialogueState {
    /// No active search
    #[default]
    Idle,
    /// Paged search results on screen
    Results { page: u32, total_pages: u32 },
    /// Seat map of a high-speed train; `page`/`total_pages` remember the
    /// results page to return to
    ChoosingSeat {
        train_id: String,
        carriage: u32,
        total_carriages: u32,
        page: u32,
        total_pages: u32,
    },
    /// Ticket issued
    Purchased,
}

/// State discriminant used on the wire and in lookup tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StateKind {
    #[default]
    Idle,
    Results,
    ChoosingSeat,
    Purchased,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Idle => "idle",
            StateKind::Results => "results",
            StateKind::ChoosingSeat => "choosingSeat",
            StateKind::Purchased => "purchased",
        }
    }

    /// Whether the `<trains>` context block is shown in this state
    pub fn shows_trains(&self) -> bool {
        matches!(self, StateKind::Results | StateKind::ChoosingSeat)
    }

    /// Whether the `<ticket>` context block is shown in this state
    pub fn shows_ticket(&self) -> bool {
        matches!(self, StateKind::Purchased)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation capabilities exposed by the interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Capabilities {
    pub next: bool,
    pub prev: bool,
    pub back: bool,
}

/// Serializable view of a [`DialogueState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSnapshot {
    pub state: StateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carriage: Option<u32>,
    pub can: Capabilities,
}

impl Default for UiSnapshot {
    fn default() -> Self {
        DialogueState::Idle.snapshot()
    }
}

impl DialogueState {
    pub fn kind(&self) -> StateKind {
        match self {
            DialogueState::Idle => StateKind::Idle,
            DialogueState::Results { .. } => StateKind::Results,
            DialogueState::ChoosingSeat { .. } => StateKind::ChoosingSeat,
            DialogueState::Purchased => StateKind::Purchased,
        }
    }

    /// Results state on the first page
    pub fn first_page(total_pages: u32) -> Self {
        DialogueState::Results {
            page: 1,
            total_pages: total_pages.max(1),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            DialogueState::Idle => Capabilities::default(),
            DialogueState::Results { page, total_pages } => Capabilities {
                next: page < total_pages,
                prev: *page > 1,
                back: true,
            },
            DialogueState::ChoosingSeat {
                carriage,
                total_carriages,
                ..
            } => Capabilities {
                next: carriage < total_carriages,
                prev: *carriage > 1,
                back: true,
            },
            DialogueState::Purchased => Capabilities {
                next: false,
                prev: false,
                back: true,
            },
        }
    }

    pub fn snapshot(&self) -> UiSnapshot {
        let (page, total_pages, carriage) = match self {
            DialogueState::Results { page, total_pages } => (Some(*page), Some(*total_pages), None),
            DialogueState::ChoosingSeat {
                carriage,
                page,
                total_pages,
                ..
            } => (Some(*page), Some(*total_pages), Some(*carriage)),
            _ => (None, None, None),
        };
        UiSnapshot {
            state: self.kind(),
            page,
            total_pages,
            carriage,
            can: self.capabilities(),
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueState::Results { page, total_pages } => {
                write!(f, "results({}/{})", page, total_pages)
            }
            DialogueState::ChoosingSeat {
                carriage,
                total_carriages,
                ..
            } => write!(f, "choosingSeat({}/{})", carriage, total_carriages),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_has_no_capabilities() {
        let can = DialogueState::Idle.capabilities();
        assert!(!can.next && !can.prev && !can.back);
    }

    #[test]
    fn test_results_capabilities_follow_page() {
        let first = DialogueState::Results { page: 1, total_pages: 3 }.capabilities();
        assert!(first.next);
        assert!(!first.prev);
        assert!(first.back);

        let last = DialogueState::Results { page: 3, total_pages: 3 }.capabilities();
        assert!(!last.next);
        assert!(last.prev);
    }

    #[test]
    fn test_seat_map_capabilities_follow_carriage() {
        let state = DialogueState::ChoosingSeat {
            train_id: "FR9812".into(),
            carriage: 8,
            total_carriages: 8,
            page: 1,
            total_pages: 2,
        };
        let can = state.capabilities();
        assert!(!can.next);
        assert!(can.prev);
        assert!(can.back);
    }

    #[test]
    fn test_snapshot_serialization() {
        let json = serde_json::to_string(&DialogueState::Results { page: 2, total_pages: 4 }.snapshot())
            .unwrap();
        assert_eq!(
            json,
            r#"{"state":"results","page":2,"total_pages":4,"can":{"next":true,"prev":true,"back":true}}"#
        );

        let seat = DialogueState::ChoosingSeat {
            train_id: "FA1234".into(),
            carriage: 1,
            total_carriages: 6,
            page: 1,
            total_pages: 1,
        };
        let json = serde_json::to_value(seat.snapshot()).unwrap();
        assert_eq!(json["state"], "choosingSeat");
        assert_eq!(json["carriage"], 1);
    }

    #[test]
    fn test_first_page_clamps_total() {
        assert_eq!(
            DialogueState::first_page(0),
            DialogueState::Results { page: 1, total_pages: 1 }
        );
    }
}
