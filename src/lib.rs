//! # Qbank Tools Library
//!
//! Maintenance utilities for quiz question banks stored as JavaScript array
//! literals. This library provides:
//! - A tolerant literal parser with an ordered strategy chain
//! - Span-preserving rewriting of the declared array, with backups
//! - Image tag synchronization and page-number cleanup on question records
//! - PNG to WebP batch conversion

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod parser;
pub mod processing;
pub mod record;
pub mod source;

// Re-export commonly used items
pub use batch::{process_files, BatchState, FileOutcome};
pub use error::{QbankError, Result};
pub use logger::Logger;
pub use parser::{LiteralParser, ParserCapabilities};
pub use record::QuestionRecord;
pub use source::SourceDocument;
