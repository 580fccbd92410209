//! Typed tool arguments
//!
//! Arguments are encoded into the `arguments` string of a tool call with a
//! fixed key order per tool. Optional keys are omitted when unset.

use railsynth_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three kiosk tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SearchTrains,
    PurchaseTicket,
    UiControl,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [
        ToolName::SearchTrains,
        ToolName::PurchaseTicket,
        ToolName::UiControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchTrains => "search_trains",
            ToolName::PurchaseTicket => "purchase_ticket",
            ToolName::UiControl => "ui_control",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::Structure(format!("unknown tool '{}'", s)))
    }
}

/// `ui_control` actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiAction {
    Next,
    Prev,
    Back,
    Status,
    ShowChanges,
}

impl UiAction {
    pub const ALL: [UiAction; 5] = [
        UiAction::Next,
        UiAction::Prev,
        UiAction::Back,
        UiAction::Status,
        UiAction::ShowChanges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UiAction::Next => "next",
            UiAction::Prev => "prev",
            UiAction::Back => "back",
            UiAction::Status => "status",
            UiAction::ShowChanges => "show_changes",
        }
    }
}

impl fmt::Display for UiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UiAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::Structure(format!("unknown ui action '{}'", s)))
    }
}

/// Default `date` argument
pub const DATE_TODAY: &str = "today";
pub const DATE_TOMORROW: &str = "tomorrow";
/// Default `time` argument
pub const TIME_NOW: &str = "now";

/// Travel classes accepted by `purchase_ticket`
pub const SECOND_CLASS: &str = "Seconda Classe";
pub const FIRST_CLASS: &str = "Prima Classe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchArgs {
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
}

impl SearchArgs {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date: DATE_TODAY.to_string(),
            time: TIME_NOW.to_string(),
            passengers: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Single passenger is the schema default and stays implicit
    pub fn with_passengers(mut self, passengers: u32) -> Self {
        self.passengers = (passengers > 1).then_some(passengers);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseArgs {
    pub train_id: String,
    #[serde(rename = "class")]
    pub travel_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carriage: Option<u32>,
}

impl PurchaseArgs {
    pub fn new(train_id: impl Into<String>, travel_class: impl Into<String>) -> Self {
        Self {
            train_id: train_id.into(),
            travel_class: travel_class.into(),
            seat: None,
            carriage: None,
        }
    }

    pub fn with_seat(mut self, seat: impl Into<String>, carriage: u32) -> Self {
        self.seat = Some(seat.into());
        self.carriage = Some(carriage);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiControlArgs {
    pub action: UiAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_position: Option<u32>,
}

impl UiControlArgs {
    pub fn new(action: UiAction) -> Self {
        Self {
            action,
            train_position: None,
        }
    }

    pub fn show_changes(train_position: u32) -> Self {
        Self {
            action: UiAction::ShowChanges,
            train_position: Some(train_position),
        }
    }
}

/// Arguments of one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolArguments {
    Search(SearchArgs),
    Purchase(PurchaseArgs),
    UiControl(UiControlArgs),
}

impl ToolArguments {
    pub fn tool(&self) -> ToolName {
        match self {
            ToolArguments::Search(_) => ToolName::SearchTrains,
            ToolArguments::Purchase(_) => ToolName::PurchaseTicket,
            ToolArguments::UiControl(_) => ToolName::UiControl,
        }
    }

    /// Check that every required argument is present and non-empty
    pub fn validate(&self) -> Result<()> {
        let tool = self.tool().as_str();
        let missing = |argument: &str| Error::MissingArgument {
            tool: tool.to_string(),
            argument: argument.to_string(),
        };

        match self {
            ToolArguments::Search(args) => {
                if args.origin.trim().is_empty() {
                    return Err(missing("origin"));
                }
                if args.destination.trim().is_empty() {
                    return Err(missing("destination"));
                }
            }
            ToolArguments::Purchase(args) => {
                if args.train_id.trim().is_empty() {
                    return Err(missing("train_id"));
                }
                if args.travel_class.trim().is_empty() {
                    return Err(missing("class"));
                }
            }
            ToolArguments::UiControl(args) => {
                if args.action == UiAction::ShowChanges && args.train_position.is_none() {
                    return Err(missing("train_position"));
                }
            }
        }
        Ok(())
    }

    /// Encode as the JSON string carried by `function.arguments`
    pub fn to_json_string(&self) -> Result<String> {
        let encoded = match self {
            ToolArguments::Search(args) => serde_json::to_string(args)?,
            ToolArguments::Purchase(args) => serde_json::to_string(args)?,
            ToolArguments::UiControl(args) => serde_json::to_string(args)?,
        };
        Ok(encoded)
    }

    /// Decode the arguments string of a call to `tool`
    pub fn parse(tool: ToolName, arguments: &str) -> Result<Self> {
        let parsed = match tool {
            ToolName::SearchTrains => ToolArguments::Search(serde_json::from_str(arguments)?),
            ToolName::PurchaseTicket => ToolArguments::Purchase(serde_json::from_str(arguments)?),
            ToolName::UiControl => ToolArguments::UiControl(serde_json::from_str(arguments)?),
        };
        Ok(parsed)
    }

    pub fn ui_action(&self) -> Option<UiAction> {
        match self {
            ToolArguments::UiControl(args) => Some(args.action),
            _ => None,
        }
    }
}

impl From<SearchArgs> for ToolArguments {
    fn from(args: SearchArgs) -> Self {
        ToolArguments::Search(args)
    }
}

impl From<PurchaseArgs> for ToolArguments {
    fn from(args: PurchaseArgs) -> Self {
        ToolArguments::Purchase(args)
    }
}

impl From<UiControlArgs> for ToolArguments {
    fn from(args: UiControlArgs) -> Self {
        ToolArguments::UiControl(args)
    }
}
