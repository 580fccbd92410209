//! Skeleton records and their metadata trail

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::context::ContextSlice;
use crate::error::{Error, Result};
use crate::message::{call_id, Message, Role};

/// Placeholder written as the system message of every skeleton
pub const SYSTEM_PROMPT_PLACEHOLDER: &str = "{{SYSTEM_PROMPT}}";

/// Everything needed to regenerate a sample and hydrate its context blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMeta {
    pub scenario: String,
    /// Derived per-sample seed
    pub seed: u64,
    pub run_id: u32,
    pub contexts: Vec<ContextSlice>,
}

impl SampleMeta {
    /// Exclusive end index of each slice
    pub fn slice_ends(&self) -> Vec<usize> {
        self.contexts
            .iter()
            .scan(0usize, |end, slice| {
                *end += slice.slice_length;
                Some(*end)
            })
            .collect()
    }

    /// Slice covering the message at `index`
    pub fn slice_for(&self, index: usize) -> Option<&ContextSlice> {
        self.slice_ends()
            .into_iter()
            .position(|end| index < end)
            .map(|i| &self.contexts[i])
    }

    pub fn covered_messages(&self) -> usize {
        self.contexts.iter().map(|s| s.slice_length).sum()
    }
}

/// One line of skeleton output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonRecord {
    /// Tool schemas offered to the assistant
    pub tools: JsonValue,
    pub messages: Vec<Message>,
    #[serde(rename = "_meta")]
    pub meta: SampleMeta,
}

impl SkeletonRecord {
    /// Re-check the structural contract before a record is emitted
    pub fn validate(&self) -> Result<()> {
        match self.messages.first() {
            Some(Message::System { .. }) => {}
            _ => return Err(Error::Structure("first message must be the system message".into())),
        }
        if self.messages[1..].iter().any(|m| m.role() == Role::System) {
            return Err(Error::Structure("system message outside position 0".into()));
        }

        if self.meta.contexts.iter().any(|s| s.slice_length == 0) {
            return Err(Error::Structure("empty context slice".into()));
        }
        let covered = self.meta.covered_messages();
        if covered != self.messages.len() {
            return Err(Error::Structure(format!(
                "context slices cover {} of {} messages",
                covered,
                self.messages.len()
            )));
        }

        let mut issued = 0u32;
        let mut pending: Vec<(String, String)> = Vec::new();
        for (index, message) in self.messages.iter().enumerate() {
            match message {
                Message::ToolCalls { tool_calls } => {
                    if tool_calls.is_empty() {
                        return Err(Error::Structure(format!("message {} has empty tool_calls", index)));
                    }
                    for call in tool_calls {
                        issued += 1;
                        if call.id != call_id(issued) {
                            return Err(Error::Structure(format!(
                                "message {}: expected id {}, found {}",
                                index,
                                call_id(issued),
                                call.id
                            )));
                        }
                        pending.push((call.id.clone(), call.function.name.clone()));
                    }
                }
                Message::Tool {
                    tool_call_id, name, ..
                } => {
                    let position = pending
                        .iter()
                        .position(|(id, _)| id == tool_call_id)
                        .ok_or_else(|| {
                            Error::Structure(format!(
                                "message {}: tool response to unknown call {}",
                                index, tool_call_id
                            ))
                        })?;
                    let (_, call_name) = pending.remove(position);
                    if &call_name != name {
                        return Err(Error::Structure(format!(
                            "message {}: response name {} does not match call {}",
                            index, name, call_name
                        )));
                    }
                }
                _ => {}
            }
        }
        if let Some((id, _)) = pending.first() {
            return Err(Error::Structure(format!("call {} has no tool response", id)));
        }
        Ok(())
    }

    /// Serialize as one JSONL line
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextParams;
    use crate::message::ToolCall;
    use chrono::{NaiveDate, NaiveTime};

    fn params() -> ContextParams {
        ContextParams::new(
            "Roma Termini",
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    fn record(messages: Vec<Message>, lengths: &[usize]) -> SkeletonRecord {
        SkeletonRecord {
            tools: JsonValue::Array(vec![]),
            messages,
            meta: SampleMeta {
                scenario: "test".into(),
                seed: 1,
                run_id: 1,
                contexts: lengths
                    .iter()
                    .map(|&slice_length| ContextSlice {
                        slice_length,
                        params: params(),
                    })
                    .collect(),
            },
        }
    }

    fn search_exchange(n: u32) -> Vec<Message> {
        let call = ToolCall::function(call_id(n), "search_trains", "{}");
        vec![
            Message::user("Roma"),
            Message::tool_call(call.clone()),
            Message::tool_response(&call, "{}"),
            Message::assistant("Ecco"),
        ]
    }

    #[test]
    fn test_valid_record_passes() {
        let mut messages = vec![Message::system(SYSTEM_PROMPT_PLACEHOLDER)];
        messages.extend(search_exchange(1));
        messages.extend(search_exchange(2));
        let record = record(messages, &[5, 4]);
        record.validate().unwrap();
        assert_eq!(record.meta.slice_ends(), vec![5, 9]);
        assert_eq!(record.meta.slice_for(4).map(|s| s.slice_length), Some(5));
        assert_eq!(record.meta.slice_for(5).map(|s| s.slice_length), Some(4));
        assert!(record.meta.slice_for(9).is_none());
    }

    #[test]
    fn test_gap_in_ids_rejected() {
        let mut messages = vec![Message::system(SYSTEM_PROMPT_PLACEHOLDER)];
        messages.extend(search_exchange(2));
        assert!(record(messages, &[5]).validate().is_err());
    }

    #[test]
    fn test_uncovered_messages_rejected() {
        let mut messages = vec![Message::system(SYSTEM_PROMPT_PLACEHOLDER)];
        messages.extend(search_exchange(1));
        assert!(record(messages, &[3]).validate().is_err());
    }

    #[test]
    fn test_missing_system_rejected() {
        let messages = search_exchange(1);
        assert!(record(messages, &[4]).validate().is_err());
    }
}
