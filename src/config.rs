//! Run configuration for each tool.
//!
//! Everything is configured from the command line; these structs hold the
//! resolved values and their documented defaults.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::parser::ParserCapabilities;

pub const DEFAULT_IMAGES_DIR: &str = "imageswebp";
pub const DEFAULT_IMAGE_EXT: &str = "webp";
pub const DEFAULT_LEGACY_EXT: &str = "png";
pub const DEFAULT_PREFIX: &str = "questions";
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";
pub const DEFAULT_TAG_FILES: [&str; 3] = ["data_A.js", "data_B.js", "data_C.js"];
pub const DEFAULT_CLEAN_FILE: &str = "data_C.js";
pub const DEFAULT_MIN_PAGE: u32 = 1;
pub const DEFAULT_MAX_PAGE: u32 = 332;
pub const DEFAULT_QUALITY: u8 = 80;

/// How source files are located, parsed and backed up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Declaration name before `_<Letter>`
    pub prefix: String,
    pub backup_suffix: String,
    pub capabilities: ParserCapabilities,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            capabilities: ParserCapabilities::default(),
        }
    }
}

/// Image tagging run
#[derive(Debug, Clone)]
pub struct TagConfig {
    pub paths: Vec<PathBuf>,
    pub images_dir: PathBuf,
    /// Extension of current-generation images
    pub image_ext: String,
    /// Extension whose tags are removed
    pub legacy_ext: String,
    pub source: SourceConfig,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            paths: DEFAULT_TAG_FILES.iter().map(PathBuf::from).collect(),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            image_ext: DEFAULT_IMAGE_EXT.to_string(),
            legacy_ext: DEFAULT_LEGACY_EXT.to_string(),
            source: SourceConfig::default(),
        }
    }
}

/// Page-number cleanup run
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub paths: Vec<PathBuf>,
    /// Write here instead of rewriting the input in place
    pub output: Option<PathBuf>,
    pub page_range: RangeInclusive<u32>,
    pub source: SourceConfig,
}

impl Default for CleanConfig {
    fn default() -> Self {
        CleanConfig {
            paths: vec![PathBuf::from(DEFAULT_CLEAN_FILE)],
            output: None,
            page_range: DEFAULT_MIN_PAGE..=DEFAULT_MAX_PAGE,
            source: SourceConfig::default(),
        }
    }
}

/// PNG to WebP conversion run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 0-100
    pub quality: u8,
}

impl ConvertConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ConvertConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            quality: DEFAULT_QUALITY,
        }
    }
}
