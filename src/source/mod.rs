//! Question bank source files.
//!
//! A source file holds one declaration `const <prefix>_<Letter> = [ ... ];`.
//! The document is split into three regions: the prefix up to the opening
//! `[`, the array span `[`..=`]`, and the suffix from just after the `]`.
//! Only the span is ever replaced; prefix and suffix are written back
//! byte for byte.

pub mod rewrite;

use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{QbankError, Result};
use crate::parser::{LiteralParser, ParsedArray};

/// The located declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Full declared name, e.g. `questions_A`
    pub name: String,
    /// The bank letter after the prefix
    pub letter: char,
    /// Byte range of the array literal, brackets included
    pub span: Range<usize>,
}

/// One loaded source file
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    text: String,
    declaration: Declaration,
}

impl SourceDocument {
    /// Reads `path` and locates its question array
    pub fn load(path: &Path, prefix: &str) -> Result<Self> {
        if !path.is_file() {
            return Err(QbankError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| QbankError::io(path, e))?;
        Self::from_text(path, text, prefix)
    }

    pub fn from_text(path: &Path, text: String, prefix: &str) -> Result<Self> {
        let declaration = locate_declaration(&text, prefix)?.ok_or_else(|| QbankError::ArrayNotFound {
            path: path.to_path_buf(),
        })?;
        Ok(SourceDocument {
            path: path.to_path_buf(),
            text,
            declaration,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn span(&self) -> Range<usize> {
        self.declaration.span.clone()
    }

    pub fn prefix(&self) -> &str {
        &self.text[..self.declaration.span.start]
    }

    pub fn array_text(&self) -> &str {
        &self.text[self.declaration.span.clone()]
    }

    pub fn suffix(&self) -> &str {
        &self.text[self.declaration.span.end..]
    }

    /// The document with the array span replaced by `array`
    pub fn splice(&self, array: &str) -> String {
        let mut out = String::with_capacity(self.prefix().len() + array.len() + self.suffix().len());
        out.push_str(self.prefix());
        out.push_str(array);
        out.push_str(self.suffix());
        out
    }

    /// Strips comment lines from the span and runs the parser cascade on it
    pub fn parse(&self, parser: &LiteralParser) -> Result<ParsedArray> {
        let stripped = strip_comment_lines(self.array_text());
        parser.parse(&stripped).map_err(|failure| QbankError::Parse {
            path: self.path.clone(),
            span: self.span(),
            failure,
        })
    }
}

/// Finds the first uncommented `const <prefix>_<Letter> = [ ... ];`.
///
/// The closing bracket is found by bracket matching that skips strings and
/// comments, so brackets inside question text never end the span.
pub fn locate_declaration(text: &str, prefix: &str) -> Result<Option<Declaration>> {
    let anchor = Regex::new(&format!(r"\bconst\s+({}_([A-Z]))\s*=\s*\[", regex::escape(prefix)))?;

    for caps in anchor.captures_iter(text) {
        let (Some(whole), Some(name), Some(letter)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if !is_code_at(text, whole.start()) {
            continue;
        }
        let open = whole.end() - 1;
        let Some(close) = find_matching_bracket(text, open) else {
            continue;
        };
        if !text[close + 1..].trim_start().starts_with(';') {
            continue;
        }
        return Ok(Some(Declaration {
            name: name.as_str().to_string(),
            letter: letter.as_str().chars().next().unwrap_or('?'),
            span: open..close + 1,
        }));
    }
    Ok(None)
}

/// Whether byte `at` lies outside every string literal and comment
fn is_code_at(text: &str, at: usize) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < at {
        match skip_non_code(bytes, i) {
            Some(last) if last >= at => return false,
            Some(last) => i = last + 1,
            None => i += 1,
        }
    }
    true
}

/// If a string literal or comment starts at `i`, the index of its last byte
/// (clamped to the end of the text when it is unterminated).
///
/// All delimiters are ASCII, so scanning bytes is safe on UTF-8 text.
fn skip_non_code(bytes: &[u8], i: usize) -> Option<usize> {
    let last = bytes.len().saturating_sub(1);
    match bytes[i] {
        quote @ (b'"' | b'\'' | b'`') => {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j] != quote {
                if bytes[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            Some(j.min(last))
        }
        b'/' if bytes.get(i + 1) == Some(&b'/') => {
            Some(bytes[i..].iter().position(|&b| b == b'\n').map_or(last, |n| i + n - 1))
        }
        b'/' if bytes.get(i + 1) == Some(&b'*') => {
            let end = bytes[i + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(last, |n| i + 2 + n + 1);
            Some(end)
        }
        _ => None,
    }
}

/// Index of the `]` matching the `[` at `open`, skipping brackets inside
/// strings and comments.
pub fn find_matching_bracket(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'[') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(last) = skip_non_code(bytes, i) {
            i = last + 1;
            continue;
        }
        match bytes[i] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Drops lines whose first non-blank characters are `//`
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
