//! JSONL files
//!
//! One record per line, UTF-8, `\n` terminated. Skeletons are written as
//! `<dir>/<scenario>.jsonl`.

use railsynth_core::SkeletonRecord;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::generator::ScenarioBatch;
use crate::{PipelineError, Result};

/// Writes skeleton batches into an output directory
#[derive(Debug, Clone)]
pub struct JsonlSink {
    dir: PathBuf,
}

impl JsonlSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, scenario: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", scenario))
    }

    /// Write one batch, replacing any previous file of the scenario
    pub fn write_batch(&self, batch: &ScenarioBatch) -> Result<PathBuf> {
        let path = self.path_for(batch.scenario);
        let lines = batch
            .samples
            .iter()
            .map(|sample| sample.record.to_json_line())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        write_lines(&path, &lines)?;
        tracing::info!(
            scenario = batch.scenario,
            samples = lines.len(),
            path = %path.display(),
            "Wrote skeletons"
        );
        Ok(path)
    }

    pub fn write_all(&self, batches: &[ScenarioBatch]) -> Result<Vec<PathBuf>> {
        batches.iter().map(|batch| self.write_batch(batch)).collect()
    }
}

/// Write `lines` to `path`, creating parent directories
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| PipelineError::io(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// Non-blank lines of a file with their 1-based line numbers
pub fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect())
}

/// Parse a skeleton file, naming the first malformed line
pub fn read_records(path: &Path) -> Result<Vec<SkeletonRecord>> {
    read_lines(path)?
        .into_iter()
        .map(|(line, text)| parse_record(path, line, &text))
        .collect()
}

pub(crate) fn parse_record(path: &Path, line: usize, text: &str) -> Result<SkeletonRecord> {
    serde_json::from_str(text).map_err(|e| PipelineError::MalformedLine {
        path: path.to_path_buf(),
        line,
        message: e.to_string(),
    })
}
