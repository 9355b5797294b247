//! Image tag maintenance in question text.
//!
//! Tags have the surface form `[image: <filename>]`. Legacy tags point at
//! the retired raster extension and are removed; current tags are appended
//! for every question that has an image in the index.

use regex::{Regex, RegexBuilder};

use super::images::ImageIndex;
use crate::error::Result;
use crate::logger::Logger;
use crate::record::QuestionRecord;

/// Canonical tag for an image file name
pub fn image_tag(file_name: &str) -> String {
    format!("[image: {}]", file_name)
}

/// Compiled legacy-tag pattern
#[derive(Debug, Clone)]
pub struct TagRules {
    legacy: Regex,
    whitespace: Regex,
}

impl TagRules {
    pub fn new(legacy_ext: &str) -> Result<Self> {
        let legacy = RegexBuilder::new(&format!(r"\[image:\s*\S+\.{}\]", regex::escape(legacy_ext)))
            .case_insensitive(true)
            .build()?;
        Ok(TagRules {
            legacy,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Text without legacy tags and with whitespace runs collapsed, or
    /// `None` when there was no legacy tag to remove
    pub fn remove_legacy_tags(&self, text: &str) -> Option<String> {
        if !self.legacy.is_match(text) {
            return None;
        }
        let stripped = self.legacy.replace_all(text, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        Some(collapsed.trim().to_string())
    }
}

/// Appends ` <tag>` unless the exact tag is already present
pub fn insert_tag(text: &mut String, tag: &str) -> bool {
    if text.contains(tag) {
        return false;
    }
    text.push(' ');
    text.push_str(tag);
    true
}

/// Counts from one tagging pass over a record list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagReport {
    pub legacy_removed: usize,
    pub tags_added: usize,
    pub already_tagged: usize,
}

impl TagReport {
    pub fn modified(&self) -> bool {
        self.legacy_removed > 0 || self.tags_added > 0
    }
}

/// Removes legacy tags from every record, then appends current tags.
///
/// Records keep their order, ids and options; applying this twice changes
/// nothing the second time.
pub fn apply_tags(records: &mut [QuestionRecord], index: &ImageIndex, rules: &TagRules) -> TagReport {
    let mut report = TagReport::default();

    for record in records.iter_mut() {
        let label = record.label();
        let Some(question) = record.question_mut() else {
            continue;
        };
        if let Some(cleaned) = rules.remove_legacy_tags(question) {
            if cleaned != *question {
                *question = cleaned;
                report.legacy_removed += 1;
                Logger::detail(&format!("Question {}: removed legacy image tags", label));
            }
        }
    }

    for record in records.iter_mut() {
        let Some(file_name) = record.id().and_then(|id| index.lookup(id)) else {
            continue;
        };
        let tag = image_tag(file_name);
        let label = record.label();
        let Some(question) = record.question_mut() else {
            Logger::warning(&format!("Question {} has an image but no question text", label));
            continue;
        };
        if insert_tag(question, &tag) {
            report.tags_added += 1;
            Logger::detail(&format!("Question {}: added {}", label, tag));
        } else {
            report.already_tagged += 1;
            Logger::detail(&format!("Question {}: already has {}", label, tag));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<QuestionRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .cloned()
            .map(|v| QuestionRecord::from_value(v).unwrap())
            .collect()
    }

    fn index(pairs: &[(&str, &str)]) -> ImageIndex {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn rules() -> TagRules {
        TagRules::new("png").unwrap()
    }

    #[test]
    fn test_tag_insertion() {
        let mut rs = records(json!([{"id": "Q1", "question": "What is X?"}]));
        let report = apply_tags(&mut rs, &index(&[("Q1", "Q1.webp")]), &rules());
        assert_eq!(rs[0].question(), Some("What is X? [image: Q1.webp]"));
        assert_eq!(report.tags_added, 1);
        assert!(report.modified());
    }

    #[test]
    fn test_legacy_removal() {
        let mut rs = records(json!([{"id": "Q2", "question": "See diagram [image: old.png] for details"}]));
        let report = apply_tags(&mut rs, &ImageIndex::default(), &rules());
        assert_eq!(rs[0].question(), Some("See diagram for details"));
        assert_eq!(report.legacy_removed, 1);
    }

    #[test]
    fn test_legacy_removal_is_case_insensitive() {
        let out = rules().remove_legacy_tags("A [IMAGE:  x-1.PNG]  B [image: y.Png]").unwrap();
        assert_eq!(out, "A B");
    }

    #[test]
    fn test_current_tags_are_not_legacy() {
        assert_eq!(rules().remove_legacy_tags("Q [image: Q1.webp]"), None);
    }

    #[test]
    fn test_untagged_whitespace_is_left_alone() {
        let mut rs = records(json!([{"id": "Q3", "question": "  spaced   text  "}]));
        let report = apply_tags(&mut rs, &ImageIndex::default(), &rules());
        assert_eq!(rs[0].question(), Some("  spaced   text  "));
        assert!(!report.modified());
    }

    #[test]
    fn test_legacy_replaced_by_current() {
        let mut rs = records(json!([{"id": "Q4", "question": "Look [image: Q4.png]"}]));
        apply_tags(&mut rs, &index(&[("Q4", "Q4.webp")]), &rules());
        assert_eq!(rs[0].question(), Some("Look [image: Q4.webp]"));
    }

    #[test]
    fn test_idempotent() {
        let mut rs = records(json!([
            {"id": "Q1", "question": "What is X? [image: Q1.png]", "options": [{"text": "a"}]},
            {"id": "Q2", "question": "No image"},
        ]));
        let idx = index(&[("Q1", "Q1.webp")]);
        let first = apply_tags(&mut rs, &idx, &rules());
        assert!(first.modified());
        let snapshot = rs.clone();

        let second = apply_tags(&mut rs, &idx, &rules());
        assert!(!second.modified());
        assert_eq!(second.already_tagged, 1);
        assert_eq!(rs, snapshot);
    }

    #[test]
    fn test_ids_order_and_options_untouched() {
        let mut rs = records(json!([
            {"id": "B", "question": "b", "options": [{"text": "1"}, {"text": "2"}]},
            {"id": "A", "question": "a", "options": [{"text": "3"}]},
        ]));
        apply_tags(&mut rs, &index(&[("A", "A.webp"), ("B", "B.webp")]), &rules());
        assert_eq!(rs[0].id(), Some("B"));
        assert_eq!(rs[1].id(), Some("A"));
        assert_eq!(rs[0].fields()["options"], json!([{"text": "1"}, {"text": "2"}]));
    }

    #[test]
    fn test_record_without_question_is_skipped() {
        let mut rs = records(json!([{"id": "Q1", "answer": "A"}]));
        let report = apply_tags(&mut rs, &index(&[("Q1", "Q1.webp")]), &rules());
        assert!(!report.modified());
        assert_eq!(rs[0].fields().get("question"), None);
    }

    #[test]
    fn test_insert_tag() {
        let mut text = "Q".to_string();
        assert!(insert_tag(&mut text, "[image: a.webp]"));
        assert!(!insert_tag(&mut text, "[image: a.webp]"));
        assert_eq!(text, "Q [image: a.webp]");
    }
}
