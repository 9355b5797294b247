//! Sequential batch driver shared by the file-rewriting tools.
//!
//! Each file is processed to completion before the next one starts. A
//! failure is recorded against its file and the batch moves on.

use std::path::{Path, PathBuf};

use crate::error::{QbankError, Result};
use crate::logger::Logger;
use crate::processing::images::has_extension;

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Rewritten in place; the original was moved to `backup`
    Rewritten { backup: PathBuf },
    /// Written to a separate output file
    Written { output: PathBuf },
    /// Nothing to change, file left untouched
    Unchanged,
}

/// Counters and failures for one batch
#[derive(Debug, Default)]
pub struct BatchState {
    processed: usize,
    updated: usize,
    unchanged: usize,
    skipped: Vec<(String, String)>,
    failures: Vec<(String, String)>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of one file and logs it
    pub fn record(&mut self, path: &Path, result: Result<FileOutcome>) {
        self.processed += 1;
        let name = path.display().to_string();
        match result {
            Ok(FileOutcome::Rewritten { backup }) => {
                self.updated += 1;
                Logger::success(&format!("Updated {} (backup: {})", name, backup.display()));
            }
            Ok(FileOutcome::Written { output }) => {
                self.updated += 1;
                Logger::success(&format!("Wrote {}", output.display()));
            }
            Ok(FileOutcome::Unchanged) => {
                self.unchanged += 1;
                Logger::info("No changes needed");
            }
            Err(e @ (QbankError::MissingInput { .. } | QbankError::ArrayNotFound { .. })) => {
                Logger::warning(&format!("{}, skipping", e));
                self.skipped.push((name, e.to_string()));
            }
            Err(e) => {
                Logger::error(&e.to_string());
                self.failures.push((name, e.to_string()));
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    pub fn skipped(&self) -> &[(String, String)] {
        &self.skipped
    }

    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }

    /// Report completion and log failures
    pub fn report_completion(&self, operation: &str) {
        Logger::batch_complete(
            self.updated,
            self.unchanged,
            self.skipped.len(),
            self.failures.len(),
            self.processed,
            operation,
        );
        Logger::batch_failures(&self.failures);
    }
}

/// Runs `process_fn` on every path in order with progress lines.
///
/// # Arguments
/// * `paths` - Files to process
/// * `process_fn` - Pipeline for a single file
/// * `operation` - Name used in the completion summary
pub fn process_files<F>(paths: &[PathBuf], mut process_fn: F, operation: &str) -> BatchState
where
    F: FnMut(&Path) -> Result<FileOutcome>,
{
    let total = paths.len();
    let mut state = BatchState::new();

    for (i, path) in paths.iter().enumerate() {
        Logger::file_progress(i + 1, total, path);
        let result = process_fn(path);
        state.record(path, result);
    }

    state.report_completion(operation);
    state
}

/// Expands directory arguments to the `*.js` files directly inside them,
/// in name order. Other paths pass through unchanged, including missing ones
/// so that they are reported by the batch.
pub fn expand_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file() && has_extension(e.path(), "js"))
            .map(|e| e.path().to_path_buf())
            .collect();
        found.sort();
        if found.is_empty() {
            Logger::warning(&format!("No .js files in {}", path.display()));
        }
        files.extend(found);
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_batch_state_counts() {
        let mut state = BatchState::new();
        state.record(
            Path::new("a.js"),
            Ok(FileOutcome::Rewritten {
                backup: PathBuf::from("a.js.bak"),
            }),
        );
        state.record(Path::new("b.js"), Ok(FileOutcome::Unchanged));
        state.record(
            Path::new("c.js"),
            Err(QbankError::MissingInput {
                path: PathBuf::from("c.js"),
            }),
        );
        state.record(Path::new("d.js"), Err(QbankError::InvalidArguments("boom".into())));

        assert_eq!(state.processed(), 4);
        assert_eq!(state.updated(), 1);
        assert_eq!(state.unchanged(), 1);
        assert_eq!(state.skipped().len(), 1);
        assert_eq!(state.failures().len(), 1);
        assert_eq!(state.failures()[0].0, "d.js");
    }

    #[test]
    fn test_process_files_continues_after_failure() {
        let paths = vec![PathBuf::from("bad.js"), PathBuf::from("good.js")];
        let mut seen = Vec::new();
        let state = process_files(
            &paths,
            |path| {
                seen.push(path.to_path_buf());
                if path.ends_with("bad.js") {
                    Err(QbankError::InvalidArguments("broken".into()))
                } else {
                    Ok(FileOutcome::Unchanged)
                }
            },
            "test",
        );
        assert_eq!(seen, paths);
        assert_eq!(state.failures().len(), 1);
        assert_eq!(state.unchanged(), 1);
    }

    #[test]
    fn test_expand_inputs() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("banks");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("data_B.js"), "").unwrap();
        fs::write(dir.join("data_A.js"), "").unwrap();
        fs::write(dir.join("notes.md"), "").unwrap();
        let missing = temp_dir.path().join("data_Z.js");

        let files = expand_inputs(&[dir.clone(), missing.clone()]);

        assert_eq!(files, vec![dir.join("data_A.js"), dir.join("data_B.js"), missing]);
    }
}
