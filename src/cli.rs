use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    CleanConfig, ConvertConfig, SourceConfig, TagConfig, DEFAULT_BACKUP_SUFFIX, DEFAULT_CLEAN_FILE,
    DEFAULT_IMAGES_DIR, DEFAULT_IMAGE_EXT, DEFAULT_LEGACY_EXT, DEFAULT_MAX_PAGE, DEFAULT_MIN_PAGE,
    DEFAULT_PREFIX, DEFAULT_QUALITY, DEFAULT_TAG_FILES,
};
use crate::error::{QbankError, Result};
use crate::parser::{ParserCapabilities, RELAXED_AVAILABLE};

#[derive(Parser, Debug)]
#[command(
    name = "qbank-tools",
    version,
    about = "Maintenance tools for quiz question banks stored as JavaScript array literals.",
    long_about = r#"Qbank Tools maintains question bank files of the form

    const questions_A = [ { "id": "...", "question": "...", "options": [...] }, ... ];

Only the array literal is rewritten; everything around it is kept byte for byte,
and the original file is saved next to it with a backup suffix before any write.

FEATURES:
- Append [image: <id>.webp] tags to questions that have an image, and drop
  stale [image: ....png] tags
- Remove stray page numbers left in question and option text by document import
- Convert a directory tree of PNG images to lossy WebP at a chosen quality
- Read hand-edited literals: unquoted keys, trailing commas, comments

PARSING:
- A JSON5 reader is tried first, then a strict JavaScript-literal reader
- An expression evaluator (string concatenation, template literals, undefined)
  is only used with --allow-eval and is meant for trusted files"#,
    after_help = r##"EXAMPLES:

IMAGE TAGS:
    qbank-tools tag                                    # data_A.js data_B.js data_C.js with ./imageswebp
    qbank-tools tag banks/ --images-dir assets/webp    # Every .js file in banks/
    qbank-tools tag data_A.js --no-relaxed             # Strict literal reader only

PAGE NUMBERS:
    qbank-tools clean                                  # Clean data_C.js in place
    qbank-tools clean data_C.js --output clean/data_C.js
    qbank-tools clean data_B.js --min-page 10 --max-page 120

IMAGES:
    qbank-tools convert images imageswebp              # Quality 80
    qbank-tools convert images imageswebp -q 95

NOTES:
- Files without changes are left untouched and get no backup
- A failing file is reported and the batch continues with the next one"##
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize image tags in question text with an image directory.
    ///
    /// Every question whose id matches an image file stem gets an
    /// `[image: <file>]` tag appended. Tags pointing at the legacy extension
    /// are removed first.
    #[command(
        about = "Add [image: ...] tags for questions that have an image",
        long_about = r#"Synchronize image tags in question text with an image directory.

This command:
1. Indexes the image directory (file stem -> file name, not recursive)
2. Parses each question bank file
3. Removes [image: ...] tags that use the legacy extension
4. Appends [image: <file>] to every question whose id has an image
5. Rewrites the file, after a backup, only if something changed

Running it twice changes nothing the second time."#
    )]
    Tag {
        /// Question bank files or directories
        #[arg(
            value_name = "PATHS",
            default_values = DEFAULT_TAG_FILES,
            long_help = r#"Question bank files to process.

A directory is expanded to the .js files directly inside it, in name order.
Missing files are reported and skipped."#
        )]
        paths: Vec<PathBuf>,

        /// Directory holding the current images
        #[arg(long, value_name = "DIR", default_value = DEFAULT_IMAGES_DIR)]
        images_dir: PathBuf,

        /// Extension of the current images
        #[arg(long, value_name = "EXT", default_value = DEFAULT_IMAGE_EXT)]
        image_ext: String,

        /// Extension whose tags are removed
        #[arg(long, value_name = "EXT", default_value = DEFAULT_LEGACY_EXT)]
        legacy_ext: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Remove stray page numbers from question and option text.
    #[command(
        about = "Remove stray page numbers from question and option text",
        long_about = r#"Remove stray page numbers from question and option text.

A page number is a run of 1-3 digits preceded by a space and followed by
whitespace, closing punctuation or the end of the text. It is removed,
together with the space before it, when its value is within the page range.

EXAMPLES:
  "这是一个选项 273 继续"  ->  "这是一个选项 继续"
  "值为 900 的情况"        ->  unchanged (outside 1-332)
  "year 1273 was"          ->  unchanged (4 digits)"#
    )]
    Clean {
        /// Question bank files or directories
        #[arg(value_name = "PATHS", default_value = DEFAULT_CLEAN_FILE)]
        paths: Vec<PathBuf>,

        /// Write the cleaned document here instead of rewriting the input
        #[arg(
            short,
            long,
            value_name = "PATH",
            long_help = "Write the cleaned document to PATH and leave the input untouched.\nRequires exactly one input file."
        )]
        output: Option<PathBuf>,

        /// Smallest value treated as a page number
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MIN_PAGE)]
        min_page: u32,

        /// Largest value treated as a page number
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_PAGE)]
        max_page: u32,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Convert every PNG under a directory to lossy WebP.
    #[command(
        about = "Convert a PNG directory tree to WebP",
        long_about = r#"Convert every PNG under INPUT_DIR to lossy WebP under OUTPUT_DIR.

The directory structure is mirrored and only the extension changes:
  images/chapter1/Q12.png  ->  imageswebp/chapter1/Q12.webp

Files that cannot be decoded are reported and skipped."#
    )]
    Convert {
        /// Directory searched recursively for .png files
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Root of the mirrored output tree
        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,

        /// WebP quality, 0 (smallest) to 100 (best)
        #[arg(
            short,
            long,
            value_name = "0-100",
            default_value_t = DEFAULT_QUALITY,
            value_parser = clap::value_parser!(u8).range(0..=100)
        )]
        quality: u8,
    },
}

/// Options shared by the commands that rewrite question bank files
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Declaration name before `_<Letter>`
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Appended to the file name of the backup copy
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_BACKUP_SUFFIX)]
    pub backup_suffix: String,

    /// Do not try the JSON5 reader
    #[arg(long)]
    pub no_relaxed: bool,

    /// Fall back to the expression evaluator (trusted files only)
    #[arg(long)]
    pub allow_eval: bool,
}

impl From<SourceArgs> for SourceConfig {
    fn from(args: SourceArgs) -> Self {
        SourceConfig {
            prefix: args.prefix,
            backup_suffix: args.backup_suffix,
            capabilities: ParserCapabilities {
                relaxed: RELAXED_AVAILABLE && !args.no_relaxed,
                dynamic_eval: args.allow_eval,
            },
        }
    }
}

/// A parsed command with its resolved configuration
#[derive(Debug, Clone)]
pub enum Invocation {
    Tag(TagConfig),
    Clean(CleanConfig),
    Convert(ConvertConfig),
}

impl Commands {
    pub fn into_invocation(self) -> Result<Invocation> {
        match self {
            Commands::Tag {
                paths,
                images_dir,
                image_ext,
                legacy_ext,
                source,
            } => Ok(Invocation::Tag(TagConfig {
                paths,
                images_dir,
                image_ext: image_ext.trim_start_matches('.').to_string(),
                legacy_ext: legacy_ext.trim_start_matches('.').to_string(),
                source: source.into(),
            })),
            Commands::Clean {
                paths,
                output,
                min_page,
                max_page,
                source,
            } => {
                if min_page > max_page {
                    return Err(QbankError::InvalidArguments(format!(
                        "--min-page {} is greater than --max-page {}",
                        min_page, max_page
                    )));
                }
                Ok(Invocation::Clean(CleanConfig {
                    paths,
                    output,
                    page_range: min_page..=max_page,
                    source: source.into(),
                }))
            }
            Commands::Convert {
                input_dir,
                output_dir,
                quality,
            } => Ok(Invocation::Convert(ConvertConfig {
                input_dir,
                output_dir,
                quality,
            })),
        }
    }
}
