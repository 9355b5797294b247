use std::path::Path;

use crate::batch::{expand_inputs, process_files, BatchState, FileOutcome};
use crate::config::{CleanConfig, SourceConfig};
use crate::error::{QbankError, Result};
use crate::logger::Logger;
use crate::parser::LiteralParser;
use crate::processing::pages::PageCleaner;
use crate::source::rewrite::{render_document, write_to, write_with_backup};
use crate::source::SourceDocument;

/// Runs page-number cleanup over every configured file.
///
/// With `output` set, the single input is left alone and the cleaned
/// document is written to `output`, even when nothing changed.
pub fn run(config: &CleanConfig) -> Result<BatchState> {
    let files = expand_inputs(&config.paths);
    if config.output.is_some() && files.len() != 1 {
        return Err(QbankError::InvalidArguments(format!(
            "--output needs exactly one input file, got {}",
            files.len()
        )));
    }

    let cleaner = PageCleaner::new(config.page_range.clone())?;
    let parser = LiteralParser::new(config.source.capabilities);
    Logger::info(&format!(
        "Removing page numbers {}-{}",
        cleaner.range().start(),
        cleaner.range().end()
    ));

    Ok(process_files(
        &files,
        |path| clean_file(path, config.output.as_deref(), &cleaner, &parser, &config.source),
        "page cleanup",
    ))
}

/// Parses one question bank file, removes page numbers from its question and
/// option texts and writes the result.
///
/// # Arguments
/// * `path` - Question bank file to process
/// * `output` - Separate destination; `None` rewrites `path` in place
/// * `cleaner` - Page-number matcher with its page range
/// * `parser` - Strategy chain used to read the array
/// * `source` - Declaration prefix and backup suffix
///
/// # Returns
/// * `Ok(FileOutcome::Written)` when `output` is set, whether or not text changed
/// * `Ok(FileOutcome::Rewritten)` with the backup path after an in-place rewrite
/// * `Ok(FileOutcome::Unchanged)` for an in-place run with nothing to remove
/// * `Err(QbankError)` for a missing file, missing array, parse or write failure
///
/// # Notes
/// - With `output`, no backup is made and the input is never modified
/// - Bytes outside the array span are written back unchanged
pub fn clean_file(
    path: &Path,
    output: Option<&Path>,
    cleaner: &PageCleaner,
    parser: &LiteralParser,
    source: &SourceConfig,
) -> Result<FileOutcome> {
    let doc = SourceDocument::load(path, &source.prefix)?;
    let mut parsed = doc.parse(parser)?;
    Logger::detail(&format!(
        "Bank {} ({}): {} questions read with the {}",
        doc.declaration().letter,
        doc.declaration().name,
        parsed.records.len(),
        parsed.strategy
    ));

    let report = cleaner.apply(&mut parsed.records);
    if report.modified() {
        Logger::stats(
            "Cleaned:",
            &format!(
                "{} questions, {} options",
                report.questions_changed, report.options_changed
            ),
        );
    }

    match output {
        Some(output) => {
            let contents = render_document(&doc, &parsed.records)?;
            write_to(output, &contents)?;
            Ok(FileOutcome::Written {
                output: output.to_path_buf(),
            })
        }
        None if !report.modified() => Ok(FileOutcome::Unchanged),
        None => {
            let contents = render_document(&doc, &parsed.records)?;
            let backup = write_with_backup(path, &contents, &source.backup_suffix)?;
            Logger::file_operation("Backup", &backup);
            Ok(FileOutcome::Rewritten { backup })
        }
    }
}
