//! Kiosk tools
//!
//! The three function-calling tools of the ticket kiosk (`search_trains`,
//! `purchase_ticket`, `ui_control`), their typed arguments, and a
//! deterministic mock backend that answers them from the sample's decision
//! source.

pub mod arguments;
pub mod backend;
pub mod failures;
pub mod registry;
pub mod schema;

pub use arguments::{
    PurchaseArgs, SearchArgs, ToolArguments, ToolName, UiAction, UiControlArgs, DATE_TODAY,
    DATE_TOMORROW, FIRST_CLASS, SECOND_CLASS, TIME_NOW,
};
pub use backend::{
    has_first_class, is_high_speed, resolve_time, MockBackend, SearchResults, SeatPreference,
    TrainKind, HIGH_SPEED_TYPES, TRAIN_KINDS,
};
pub use failures::BackendFailure;
pub use registry::ToolRegistry;
pub use schema::{builtin_schemas, tool_definitions, ToolParameter, ToolSchema};
