//! Question records as parsed from a question bank file.
//!
//! A record keeps every field it was parsed with, in parsed order, so that
//! fields the tools never touch (`answer`, `type`, `explanation`, ...) are
//! written back unchanged.

use serde_json::{Map, Value};

/// One question of the bank: `id`, `question`, `options` and anything else
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    fields: Map<String, Value>,
}

impl QuestionRecord {
    /// Wraps a parsed value; only objects are records
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(QuestionRecord { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The join key against image file stems; only string ids are keys
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    pub fn question(&self) -> Option<&str> {
        self.fields.get("question").and_then(Value::as_str)
    }

    pub fn question_mut(&mut self) -> Option<&mut String> {
        match self.fields.get_mut("question") {
            Some(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Every option `text` that is a string, in option order
    pub fn option_texts_mut(&mut self) -> Vec<&mut String> {
        match self.fields.get_mut("options") {
            Some(Value::Array(options)) => options
                .iter_mut()
                .filter_map(|option| match option.get_mut("text") {
                    Some(Value::String(text)) => Some(text),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Human-readable label for progress lines
    pub fn label(&self) -> String {
        match self.fields.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => "<no id>".to_string(),
        }
    }
}
