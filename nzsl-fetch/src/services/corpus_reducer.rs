//! Corpus reducer
//!
//! Copies a raw corpus into a normalized one holding only the identifier and
//! the English gloss terms of each sign. One bad file never stops the run;
//! it is logged and counted.

use nzsl_common::corpus::{Rejection, SignRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::corpus::{list_record_files, read_raw_record, CorpusError};

/// Counters for one reducer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceSummary {
    /// Record files found in the input directory
    pub scanned: usize,
    /// Normalized records written
    pub written: usize,
    /// Records without primary gloss or id
    pub skipped: usize,
    /// Files that failed to read, parse or write
    pub failed: usize,
}

/// Raw → normalized corpus transform
#[derive(Debug, Clone)]
pub struct CorpusReducer {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl CorpusReducer {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Reduce every record file in the input directory
    ///
    /// Fails only when the input directory cannot be listed or the output
    /// directory cannot be created.
    pub fn run(&self) -> Result<ReduceSummary, CorpusError> {
        let files = list_record_files(&self.input_dir)?;

        std::fs::create_dir_all(&self.output_dir).map_err(|source| CorpusError::Write {
            path: self.output_dir.clone(),
            source,
        })?;

        info!(
            input = %self.input_dir.display(),
            output = %self.output_dir.display(),
            files = files.len(),
            "Reducing corpus"
        );

        let mut summary = ReduceSummary {
            scanned: files.len(),
            ..Default::default()
        };

        for path in &files {
            let raw = match read_raw_record(path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                    continue;
                }
            };

            let record = match raw.normalize() {
                Ok(record) => record,
                Err(Rejection::MissingPrimaryGloss) => {
                    debug!(file = %path.display(), "No primary gloss, skipping");
                    summary.skipped += 1;
                    continue;
                }
                Err(Rejection::MissingId) => {
                    warn!(file = %path.display(), "Record has gloss terms but no nzsl_id, skipping");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.write_record(path, &record) {
                Ok(out) => {
                    debug!(nzsl_id = record.nzsl_id, file = %out.display(), "Wrote normalized record");
                    summary.written += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            scanned = summary.scanned,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            "Corpus reduction complete"
        );

        Ok(summary)
    }

    /// Write `record` under the same base name as `source`
    fn write_record(&self, source: &Path, record: &SignRecord) -> Result<PathBuf, CorpusError> {
        let name = source.file_name().unwrap_or_default();
        let out = self.output_dir.join(name);

        let json = serde_json::to_string_pretty(record).map_err(|e| CorpusError::Encode {
            path: out.clone(),
            source: e,
        })?;

        std::fs::write(&out, json).map_err(|e| CorpusError::Write {
            path: out.clone(),
            source: e,
        })?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_is_two_space_pretty_json() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(
            input.path().join("42.json"),
            r#"{"nzsl_id":42,"gloss":{"english":["cat"],"english_secondary":[]}}"#,
        )
        .unwrap();

        CorpusReducer::new(input.path(), output.path()).run().unwrap();

        let text = std::fs::read_to_string(output.path().join("42.json")).unwrap();
        assert!(text.starts_with("{\n  \"nzsl_id\": 42,"));
    }

    #[test]
    fn output_directory_created_recursively() {
        let input = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let output = root.path().join("a").join("b");
        std::fs::write(
            input.path().join("1.json"),
            r#"{"nzsl_id":1,"gloss":{"english":["one"]}}"#,
        )
        .unwrap();

        let summary = CorpusReducer::new(input.path(), &output).run().unwrap();
        assert_eq!(summary.written, 1);
        assert!(output.join("1.json").exists());
    }
}
