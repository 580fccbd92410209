//! Core types for deterministic dialogue synthesis
//!
//! This crate provides the foundational types used across all other crates:
//! - Chat message and tool-call wire types
//! - Kiosk interface state and capabilities
//! - Context parameters and slices
//! - Skeleton records and metadata
//! - The seeded decision source
//! - Error types

pub mod context;
pub mod conversation;
pub mod decision;
pub mod error;
pub mod message;
pub mod sample;

pub use context::{format_hhmm, ContextParams, ContextSlice, Price, Ticket, Train};
pub use conversation::{Capabilities, DialogueState, StateKind, UiSnapshot};
pub use decision::{derive_seed, Decision, DecisionSource};
pub use error::{Error, Result};
pub use message::{call_id, parse_call_id, FunctionCall, Message, Role, ToolCall};
pub use sample::{SampleMeta, SkeletonRecord, SYSTEM_PROMPT_PLACEHOLDER};
