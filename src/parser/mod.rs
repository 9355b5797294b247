//! Tolerant recovery of the question array from its source text.
//!
//! The array text is tried against an ordered chain of strategies until one
//! yields an array of objects:
//! 1. `Strategy::Relaxed`: JSON5, the closest match to hand-written JS data.
//!    Only present when the `relaxed` feature is built and the capability is on.
//! 2. `Strategy::StrictLiteral`: literal data shapes only, see [`literal`].
//! 3. `Strategy::Expression`: evaluates a JS expression subset. Opt-in only;
//!    it accepts far more than data and is meant for trusted input.
//!
//! The input text is never modified; every failed attempt leaves its
//! diagnostic in the returned [`ParseFailure`].

pub mod literal;

use serde_json::Value;
use std::fmt;

use crate::record::QuestionRecord;
use literal::Dialect;

/// Whether the crate was built with the JSON5 reader
pub const RELAXED_AVAILABLE: bool = cfg!(feature = "relaxed");

const EXCERPT_CHARS: usize = 80;

/// Which strategies a parser may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserCapabilities {
    /// JSON5 reader, ignored when the crate lacks the `relaxed` feature
    pub relaxed: bool,
    /// Expression evaluator; unsafe for untrusted input
    pub dynamic_eval: bool,
}

impl Default for ParserCapabilities {
    fn default() -> Self {
        ParserCapabilities {
            relaxed: RELAXED_AVAILABLE,
            dynamic_eval: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Relaxed,
    StrictLiteral,
    Expression,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Relaxed => "relaxed JSON5 reader",
            Strategy::StrictLiteral => "strict literal reader",
            Strategy::Expression => "expression evaluator",
        };
        f.write_str(name)
    }
}

/// Records recovered by the first strategy that succeeded
#[derive(Debug, Clone)]
pub struct ParsedArray {
    pub records: Vec<QuestionRecord>,
    pub strategy: Strategy,
}

/// Diagnostic left by one failed strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyError {
    pub strategy: Strategy,
    pub message: String,
}

/// Every enabled strategy failed
#[derive(Debug, Clone)]
pub struct ParseFailure {
    /// Start of the offending text, for diagnostics
    pub excerpt: String,
    pub attempts: Vec<StrategyError>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no strategy could read `{}`", self.excerpt)?;
        for attempt in &self.attempts {
            write!(f, "; {}: {}", attempt.strategy, attempt.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}

/// Strategy chain built from a capability set
#[derive(Debug, Clone)]
pub struct LiteralParser {
    strategies: Vec<Strategy>,
}

impl LiteralParser {
    pub fn new(capabilities: ParserCapabilities) -> Self {
        let mut strategies = Vec::with_capacity(3);
        if capabilities.relaxed && RELAXED_AVAILABLE {
            strategies.push(Strategy::Relaxed);
        }
        strategies.push(Strategy::StrictLiteral);
        if capabilities.dynamic_eval {
            strategies.push(Strategy::Expression);
        }
        LiteralParser { strategies }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Parses `text` as an array of question records
    pub fn parse(&self, text: &str) -> Result<ParsedArray, ParseFailure> {
        let mut attempts = Vec::new();
        for &strategy in &self.strategies {
            match run_strategy(strategy, text).and_then(into_records) {
                Ok(records) => return Ok(ParsedArray { records, strategy }),
                Err(message) => attempts.push(StrategyError { strategy, message }),
            }
        }
        Err(ParseFailure {
            excerpt: excerpt(text),
            attempts,
        })
    }
}

impl Default for LiteralParser {
    fn default() -> Self {
        LiteralParser::new(ParserCapabilities::default())
    }
}

fn run_strategy(strategy: Strategy, text: &str) -> Result<Value, String> {
    match strategy {
        Strategy::Relaxed => read_relaxed(text),
        Strategy::StrictLiteral => literal::read_literal(text, Dialect::Strict).map_err(|e| e.to_string()),
        Strategy::Expression => literal::read_literal(text, Dialect::Expression).map_err(|e| e.to_string()),
    }
}

#[cfg(feature = "relaxed")]
fn read_relaxed(text: &str) -> Result<Value, String> {
    json5::from_str::<Value>(text).map_err(|e| e.to_string())
}

#[cfg(not(feature = "relaxed"))]
fn read_relaxed(_text: &str) -> Result<Value, String> {
    Err("JSON5 support is not built in".to_string())
}

fn into_records(value: Value) -> Result<Vec<QuestionRecord>, String> {
    let Value::Array(items) = value else {
        return Err("top-level value is not an array".to_string());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| QuestionRecord::from_value(item).ok_or_else(|| format!("element {} is not an object", i)))
        .collect()
}

fn excerpt(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut)
}
