use std::path::Path;

use crate::batch::{expand_inputs, process_files, BatchState, FileOutcome};
use crate::config::{SourceConfig, TagConfig};
use crate::error::Result;
use crate::logger::Logger;
use crate::parser::LiteralParser;
use crate::processing::images::ImageIndex;
use crate::processing::tags::{apply_tags, TagRules};
use crate::source::rewrite::{render_document, write_with_backup};
use crate::source::SourceDocument;

/// Runs image tagging over every configured question bank file.
///
/// The image index is built once and shared read-only by every file. A file
/// is rewritten (after a backup) only when at least one record changed.
pub fn run(config: &TagConfig) -> Result<BatchState> {
    Logger::progress("[1/2]", "Indexing images");
    let index = ImageIndex::build(&config.images_dir, &config.image_ext);
    Logger::info(&format!(
        "Found {} image files (.{}) in {}",
        index.len(),
        config.image_ext,
        config.images_dir.display()
    ));

    let rules = TagRules::new(&config.legacy_ext)?;
    let parser = LiteralParser::new(config.source.capabilities);
    let files = expand_inputs(&config.paths);

    Logger::progress("[2/2]", "Tagging question banks");
    Ok(process_files(
        &files,
        |path| tag_file(path, &index, &rules, &parser, &config.source),
        "image tagging",
    ))
}

/// Parses one question bank file, synchronizes its image tags and rewrites
/// it when anything changed.
///
/// The pipeline:
/// 1. Loads the file and locates the `const <prefix>_<Letter> = [ ... ];` span
/// 2. Reads the span with the parser's strategy chain
/// 3. Removes legacy tags, then appends current tags from `index`
/// 4. Renames the original to its backup name and writes the new document
///
/// # Arguments
/// * `path` - Question bank file to process
/// * `index` - Image index shared by the whole batch
/// * `rules` - Compiled legacy-tag pattern
/// * `parser` - Strategy chain used to read the array
/// * `source` - Declaration prefix and backup suffix
///
/// # Returns
/// * `Ok(FileOutcome::Rewritten)` with the backup path when records changed
/// * `Ok(FileOutcome::Unchanged)` when nothing changed; the file is not touched
/// * `Err(QbankError)` for a missing file, missing array, parse or write failure
///
/// # Notes
/// - Bytes outside the array span are written back unchanged
/// - A parse failure leaves the file and its backup slot untouched
pub fn tag_file(
    path: &Path,
    index: &ImageIndex,
    rules: &TagRules,
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

    let report = apply_tags(&mut parsed.records, index, rules);
    if !report.modified() {
        return Ok(FileOutcome::Unchanged);
    }
    Logger::stats(
        "Changes:",
        &format!(
            "{} legacy removed, {} tags added, {} already tagged",
            report.legacy_removed, report.tags_added, report.already_tagged
        ),
    );

    let contents = render_document(&doc, &parsed.records)?;
    let backup = write_with_backup(path, &contents, &source.backup_suffix)?;
    Ok(FileOutcome::Rewritten { backup })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserCapabilities;
    use std::fs;
    use tempfile::TempDir;

    const BANK_A: &str = r#"// 题库 A
const questions_A = [
    {
        id: "Q1",
        question: "What is X? [image: Q1.png]",
        options: [
            { label: "A", text: "x" },
            { label: "B", text: "y" },
        ],
        answer: "A",
    },
    {
        id: "Q2",
        question: "无图题目",
        options: [{ label: "A", text: "z" }],
        answer: "A",
        note: null,
    },
];
"#;

    const BANK_PLAIN: &str = "const questions_B = [\n    {\"id\": \"Q9\", \"question\": \"Nothing to do\", \"options\": []}\n];\n";

    fn setup(temp_dir: &TempDir) -> TagConfig {
        let images = temp_dir.path().join("imageswebp");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("Q1.webp"), b"img").unwrap();
        TagConfig {
            paths: vec![],
            images_dir: images,
            ..TagConfig::default()
        }
    }

    fn strict_source() -> SourceConfig {
        SourceConfig {
            capabilities: ParserCapabilities {
                relaxed: false,
                dynamic_eval: false,
            },
            ..SourceConfig::default()
        }
    }

    #[cfg(feature = "relaxed")]
    #[test]
    fn test_tag_file_rewrites_and_backs_up() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = setup(&temp_dir);
        let bank = temp_dir.path().join("data_A.js");
        fs::write(&bank, BANK_A).unwrap();
        config.paths = vec![bank.clone()];

        let state = run(&config).unwrap();

        assert_eq!(state.updated(), 1);
        assert_eq!(fs::read_to_string(temp_dir.path().join("data_A.js.bak")).unwrap(), BANK_A);
        let rewritten = fs::read_to_string(&bank).unwrap();
        assert!(rewritten.starts_with("// 题库 A\nconst questions_A = [\n    {\n        \"id\": \"Q1\""));
        assert!(rewritten.ends_with("];\n"));
        assert!(rewritten.contains("\"question\": \"What is X? [image: Q1.webp]\""));
        assert!(rewritten.contains("\"question\": \"无图题目\""));
        assert!(rewritten.contains("\"note\": null"));
        assert!(!rewritten.contains("Q1.png"));
    }

    #[cfg(feature = "relaxed")]
    #[test]
    fn test_second_run_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = setup(&temp_dir);
        let bank = temp_dir.path().join("data_A.js");
        fs::write(&bank, BANK_A).unwrap();
        config.paths = vec![bank.clone()];

        run(&config).unwrap();
        let after_first = fs::read_to_string(&bank).unwrap();
        fs::remove_file(temp_dir.path().join("data_A.js.bak")).unwrap();

        let state = run(&config).unwrap();

        assert_eq!(state.unchanged(), 1);
        assert_eq!(fs::read_to_string(&bank).unwrap(), after_first);
        assert!(!temp_dir.path().join("data_A.js.bak").exists());
    }

    #[test]
    fn test_strict_reader_tags_quoted_bank() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup(&temp_dir);
        let bank = temp_dir.path().join("data_C.js");
        let text = "// 题库 C\nconst questions_C = [\n    {\"id\": \"Q1\", \"question\": \"What is X? [image: Q1.png]\", \"note\": null,},\n];\nexport default questions_C;\n";
        fs::write(&bank, text).unwrap();

        let rules = TagRules::new("png").unwrap();
        let index = ImageIndex::build(&config.images_dir, "webp");
        let parser = LiteralParser::new(strict_source().capabilities);
        let outcome = tag_file(&bank, &index, &rules, &parser, &strict_source()).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Rewritten {
                backup: temp_dir.path().join("data_C.js.bak")
            }
        );
        let rewritten = fs::read_to_string(&bank).unwrap();
        assert!(rewritten.starts_with("// 题库 C\nconst questions_C = [\n    {\n        \"id\": \"Q1\""));
        assert!(rewritten.contains("\"question\": \"What is X? [image: Q1.webp]\""));
        assert!(rewritten.ends_with("];\nexport default questions_C;\n"));
        assert_eq!(fs::read_to_string(temp_dir.path().join("data_C.js.bak")).unwrap(), text);
    }

    #[test]
    fn test_unmodified_file_is_not_touched() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup(&temp_dir);
        let bank = temp_dir.path().join("data_B.js");
        fs::write(&bank, BANK_PLAIN).unwrap();

        let rules = TagRules::new("png").unwrap();
        let index = ImageIndex::build(&config.images_dir, "webp");
        let outcome = tag_file(&bank, &index, &rules, &LiteralParser::default(), &strict_source()).unwrap();

        assert_eq!(outcome, FileOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&bank).unwrap(), BANK_PLAIN);
        assert!(!temp_dir.path().join("data_B.js.bak").exists());
    }

    #[test]
    fn test_batch_isolation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = setup(&temp_dir);
        let broken = temp_dir.path().join("data_A.js");
        let good = temp_dir.path().join("data_B.js");
        fs::write(&broken, "const questions_A = [ { \"id\": \"Q1\", question: ??? } ];\n").unwrap();
        fs::write(&good, "const questions_B = [{\"id\": \"Q1\", \"question\": \"Pick one\"}];\n").unwrap();
        config.paths = vec![broken.clone(), good.clone(), temp_dir.path().join("data_C.js")];

        let state = run(&config).unwrap();

        assert_eq!(state.failures().len(), 1);
        assert_eq!(state.skipped().len(), 1);
        assert_eq!(state.updated(), 1);
        assert!(fs::read_to_string(&good).unwrap().contains("Pick one [image: Q1.webp]"));
        assert!(fs::read_to_string(&broken).unwrap().contains("???"));
        assert!(!temp_dir.path().join("data_A.js.bak").exists());
    }

    #[cfg(feature = "relaxed")]
    #[test]
    fn test_missing_image_directory_removes_legacy_only() {
        let temp_dir = TempDir::new().unwrap();
        let bank = temp_dir.path().join("data_A.js");
        fs::write(&bank, BANK_A).unwrap();
        let config = TagConfig {
            paths: vec![bank.clone()],
            images_dir: temp_dir.path().join("missing"),
            ..TagConfig::default()
        };

        let state = run(&config).unwrap();

        assert_eq!(state.updated(), 1);
        let rewritten = fs::read_to_string(&bank).unwrap();
        assert!(rewritten.contains("\"question\": \"What is X?\""));
        assert!(!rewritten.contains("[image:"));
    }
}
