//! Hydrator
//!
//! Renders the dynamic context of a slice into the system prompt template:
//!
//! ```text
//! <ctx>
//! data: 2025-12-20
//! ora: 14:05
//! stazione: Roma Termini
//! </ctx>
//!
//! <ui>
//! {"state":"results","can":{"next":true,"prev":false,"back":true}}
//! </ui>
//! ```
//!
//! followed by `<trains>` while results are on screen and `<ticket>` after a
//! purchase. Skeleton records are read-only input; every sample is a new
//! value.

use rayon::prelude::*;
use railsynth_config::constants::placeholders::{DYN_CONTEXT, TOOL_DEFINITION};
use railsynth_config::{HydrationConfig, HydrationMode};
use railsynth_core::{
    format_hhmm, Capabilities, ContextParams, ContextSlice, Message, SampleMeta, SkeletonRecord,
};
use railsynth_tools::{tool_definitions, ToolRegistry};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sink::{parse_record, read_lines, write_lines};
use crate::{PipelineError, Result};

/// Station/date/time placeholders accepted in the template besides the
/// context block
const STATION_PLACEHOLDER: &str = "{{stazione}}";
const DATE_PLACEHOLDER: &str = "{{data}}";
const TIME_PLACEHOLDER: &str = "{{ora}}";

#[derive(Debug, Clone)]
pub struct HydrationOptions {
    /// System prompt text containing the context placeholder
    pub template: String,
    /// Replacement tool array
    pub tools: Option<JsonValue>,
    pub mode: HydrationMode,
    pub remove_meta: bool,
    pub context_placeholder: String,
}

impl HydrationOptions {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            tools: None,
            mode: HydrationMode::Whole,
            remove_meta: false,
            context_placeholder: DYN_CONTEXT.to_string(),
        }
    }

    /// Options from settings; template and tools are read from disk
    pub fn from_config(config: &HydrationConfig) -> Result<Self> {
        let template = fs::read_to_string(&config.template_path)
            .map_err(|e| PipelineError::io(&config.template_path, e))?;
        let tools = match &config.tools_path {
            Some(path) => Some(load_tools(Path::new(path))?),
            None => None,
        };
        Ok(Self {
            template,
            tools,
            mode: config.mode,
            remove_meta: config.remove_meta,
            context_placeholder: config.context_placeholder.clone(),
        })
    }

    pub fn with_mode(mut self, mode: HydrationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tools(mut self, tools: JsonValue) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn removing_meta(mut self) -> Self {
        self.remove_meta = true;
        self
    }
}

/// Load a replacement tool array, either bare or wrapped in `{"tools": [...]}`
pub fn load_tools(path: &Path) -> Result<JsonValue> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let value: JsonValue = serde_json::from_str(&content)?;
    let definitions = match value {
        JsonValue::Object(mut object) if object.contains_key("tools") => {
            object.remove("tools").unwrap_or(JsonValue::Null)
        }
        other => other,
    };
    Ok(ToolRegistry::from_definitions(&definitions)?.definitions())
}

/// `<ui>` block payload
#[derive(Serialize)]
struct UiBlock<'a> {
    state: &'a str,
    can: &'a Capabilities,
}

/// One trainable sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydratedSample {
    pub tools: JsonValue,
    pub messages: Vec<Message>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonValue>,
}

/// Counts of one hydration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub files: usize,
    pub records: usize,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct Hydrator {
    options: HydrationOptions,
}

impl Hydrator {
    pub fn new(options: HydrationOptions) -> Result<Self> {
        if !options.template.contains(&options.context_placeholder) {
            return Err(PipelineError::Template(format!(
                "template has no {} placeholder",
                options.context_placeholder
            )));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &HydrationOptions {
        &self.options
    }

    /// Context blocks for one parameter set
    pub fn render_context(params: &ContextParams) -> Result<String> {
        let ui = UiBlock {
            state: params.ui.state.as_str(),
            can: &params.ui.can,
        };
        let mut block = format!(
            "<ctx>\ndata: {}\nora: {}\nstazione: {}\n</ctx>\n\n<ui>\n{}\n</ui>",
            params.date.format("%Y-%m-%d"),
            format_hhmm(params.time),
            params.origin,
            serde_json::to_string(&ui)?
        );
        if params.ui.state.shows_trains() {
            block.push_str(&format!(
                "\n\n<trains>\n{}\n</trains>",
                serde_json::to_string(&params.trains)?
            ));
        }
        if params.ui.state.shows_ticket() {
            if let Some(ticket) = &params.ticket {
                block.push_str(&format!("\n\n<ticket>\n{}\n</ticket>", serde_json::to_string(ticket)?));
            }
        }
        Ok(block)
    }

    /// System prompt rendered for one parameter set
    pub fn system_prompt(&self, params: &ContextParams) -> Result<String> {
        let context = Self::render_context(params)?;
        Ok(self
            .options
            .template
            .replace(&self.options.context_placeholder, &context)
            .replace(STATION_PLACEHOLDER, &params.origin)
            .replace(DATE_PLACEHOLDER, &params.date.format("%Y-%m-%d").to_string())
            .replace(TIME_PLACEHOLDER, &format_hhmm(params.time)))
    }

    fn tools(&self, record: &SkeletonRecord) -> JsonValue {
        match &self.options.tools {
            Some(tools) => tools.clone(),
            None if record.tools.as_str() == Some(TOOL_DEFINITION) => tool_definitions(),
            None => record.tools.clone(),
        }
    }

    fn meta(&self, meta: &SampleMeta, slice: Option<usize>) -> Result<Option<JsonValue>> {
        if self.options.remove_meta {
            return Ok(None);
        }
        let mut value = serde_json::to_value(meta)?;
        if let (Some(index), Some(object)) = (slice, value.as_object_mut()) {
            object.insert("slice".to_string(), json!(index));
        }
        Ok(Some(value))
    }

    fn sample(
        &self,
        record: &SkeletonRecord,
        slice: &ContextSlice,
        end: usize,
        index: Option<usize>,
    ) -> Result<HydratedSample> {
        let prompt = self.system_prompt(&slice.params)?;
        let messages = record.messages[..end]
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, message)| if i == 0 { message.with_system_content(prompt.clone()) } else { message })
            .collect();
        Ok(HydratedSample {
            tools: self.tools(record),
            messages,
            meta: self.meta(&record.meta, index)?,
        })
    }

    /// Expand one skeleton into samples
    pub fn hydrate(&self, record: &SkeletonRecord) -> Result<Vec<HydratedSample>> {
        record.validate()?;
        let first = record
            .meta
            .contexts
            .first()
            .ok_or_else(|| PipelineError::Template("record has no context slices".into()))?;

        match self.options.mode {
            HydrationMode::Whole => Ok(vec![self.sample(record, first, record.messages.len(), None)?]),
            HydrationMode::Sliced => record
                .meta
                .contexts
                .iter()
                .zip(record.meta.slice_ends())
                .enumerate()
                .map(|(index, (slice, end))| self.sample(record, slice, end, Some(index)))
                .collect(),
        }
    }

    /// Hydrate the lines of one file into output lines
    pub fn hydrate_lines(&self, path: &Path, lines: &[(usize, String)]) -> Result<Vec<Vec<String>>> {
        lines
            .par_iter()
            .map(|(line, text)| {
                let record = parse_record(path, *line, text)?;
                self.hydrate(&record)?
                    .iter()
                    .map(|sample| serde_json::to_string(sample).map_err(PipelineError::from))
                    .collect::<Result<Vec<String>>>()
            })
            .collect()
    }

    /// Hydrate one `.jsonl` file
    pub fn hydrate_file(&self, input: &Path, output: &Path) -> Result<HydrationReport> {
        let lines = read_lines(input)?;
        let hydrated = self.hydrate_lines(input, &lines)?;
        let records = hydrated.len();
        let out: Vec<String> = hydrated.into_iter().flatten().collect();
        write_lines(output, &out)?;
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            records,
            samples = out.len(),
            "Hydrated file"
        );
        Ok(HydrationReport {
            files: 1,
            records,
            samples: out.len(),
        })
    }

    /// Hydrate a file, or every `.jsonl` file of a directory into `output`
    pub fn hydrate_path(&self, input: &Path, output: &Path) -> Result<HydrationReport> {
        if !input.is_dir() {
            return self.hydrate_file(input, output);
        }

        let mut files: Vec<PathBuf> = fs::read_dir(input)
            .map_err(|e| PipelineError::io(input, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();

        let mut report = HydrationReport::default();
        for file in files {
            let Some(name) = file.file_name() else { continue };
            let one = self.hydrate_file(&file, &output.join(name))?;
            report.files += one.files;
            report.records += one.records;
            report.samples += one.samples;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use railsynth_agent::{run_scenario, Resources, ScenarioRegistry};
    use railsynth_core::DialogueState;

    const TEMPLATE: &str = "Sei l'assistente della biglietteria di {{stazione}}.\n\n{{DYN_CONTEXT}}";

    fn record(scenario: &str, run_id: u32) -> SkeletonRecord {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        run_scenario(&resources, registry.get(scenario).unwrap(), 42, run_id)
            .unwrap()
            .record
    }

    fn params() -> ContextParams {
        ContextParams::new(
            "Roma Termini",
            NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            NaiveTime::from_hms_opt(14, 5, 0).unwrap(),
        )
    }

    #[test]
    fn test_template_needs_context_placeholder() {
        assert!(Hydrator::new(HydrationOptions::new("no placeholder")).is_err());
        assert!(Hydrator::new(HydrationOptions::new(TEMPLATE)).is_ok());
    }

    #[test]
    fn test_idle_context_has_no_trains_block() {
        let block = Hydrator::render_context(&params()).unwrap();
        assert_eq!(
            block,
            "<ctx>\ndata: 2025-12-20\nora: 14:05\nstazione: Roma Termini\n</ctx>\n\n<ui>\n\
             {\"state\":\"idle\",\"can\":{\"next\":false,\"prev\":false,\"back\":false}}\n</ui>"
        );
    }

    #[test]
    fn test_results_context_lists_trains() {
        let mut params = params();
        params.ui = DialogueState::Results {
            page: 1,
            total_pages: 2,
        }
        .snapshot();
        let block = Hydrator::render_context(&params).unwrap();
        assert!(block.contains("<trains>\n[]\n</trains>"));
        assert!(!block.contains("<ticket>"));
    }

    #[test]
    fn test_whole_mode_renders_first_slice() {
        let hydrator = Hydrator::new(HydrationOptions::new(TEMPLATE)).unwrap();
        let record = record("ticket_purchase", 1);
        let samples = hydrator.hydrate(&record).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].messages.len(), record.messages.len());

        let system = samples[0].messages[0].content().unwrap();
        let origin = &record.meta.contexts[0].params.origin;
        assert!(system.starts_with(&format!("Sei l'assistente della biglietteria di {}.", origin)));
        assert!(system.contains("\"state\":\"idle\""));
        assert!(samples[0].meta.is_some());
    }

    #[test]
    fn test_sliced_mode_emits_one_sample_per_slice() {
        let hydrator =
            Hydrator::new(HydrationOptions::new(TEMPLATE).with_mode(HydrationMode::Sliced).removing_meta())
                .unwrap();
        let record = record("ticket_purchase", 3);
        let samples = hydrator.hydrate(&record).unwrap();
        let ends = record.meta.slice_ends();

        assert_eq!(samples.len(), record.meta.contexts.len());
        for (sample, end) in samples.iter().zip(ends) {
            assert_eq!(sample.messages.len(), end);
            assert!(sample.meta.is_none());
        }
        // by the second slice results are on screen
        let second = samples[1].messages[0].content().unwrap();
        assert!(second.contains("<trains>"));
    }

    #[test]
    fn test_skeleton_is_left_untouched() {
        let hydrator = Hydrator::new(HydrationOptions::new(TEMPLATE)).unwrap();
        let record = record("qa", 0);
        let before = record.clone();
        hydrator.hydrate(&record).unwrap();
        assert_eq!(record, before);
    }
}
