//! Removal of stray page numbers left behind by document import.
//!
//! A candidate is ` <1-3 decimal digits>` followed by whitespace, one of
//! `, ; . : ! ? ) ]`, or the end of the text. It is deleted, leading space
//! included, only when its value lies in the configured page range. Digits
//! are any Unicode decimal digits, so full-width `１２` counts as 12.

use regex::Regex;
use std::borrow::Cow;
use std::ops::RangeInclusive;

use crate::error::Result;
use crate::record::QuestionRecord;

const CLOSING_PUNCTUATION: &[char] = &[',', ';', '.', ':', '!', '?', ')', ']'];

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || CLOSING_PUNCTUATION.contains(&c)
}

#[derive(Debug, Clone)]
pub struct PageCleaner {
    pattern: Regex,
    digit: Regex,
    range: RangeInclusive<u32>,
}

impl PageCleaner {
    pub fn new(range: RangeInclusive<u32>) -> Result<Self> {
        Ok(PageCleaner {
            pattern: Regex::new(r" (\d{1,3})")?,
            digit: Regex::new(r"^\d$")?,
            range,
        })
    }

    pub fn range(&self) -> &RangeInclusive<u32> {
        &self.range
    }

    /// `text` with every in-range page number removed
    pub fn clean<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut out = String::new();
        let mut last = 0;
        let mut changed = false;

        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // The regex crate has no lookahead, so the boundary is checked here
            if !text[whole.end()..].chars().next().map_or(true, is_boundary) {
                continue;
            }
            let Some(value) = self.value_of(digits.as_str()) else {
                continue;
            };
            if !self.range.contains(&value) {
                continue;
            }
            out.push_str(&text[last..whole.start()]);
            last = whole.end();
            changed = true;
        }

        if !changed {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[last..]);
        Cow::Owned(out)
    }

    fn value_of(&self, digits: &str) -> Option<u32> {
        digits
            .chars()
            .try_fold(0u32, |acc, c| self.digit_value(c).map(|d| acc * 10 + d))
    }

    /// Decimal value of a Unicode `Nd` character.
    ///
    /// Nd characters come in contiguous runs of ten starting at zero, so the
    /// value is the offset from the start of the surrounding digit block.
    fn digit_value(&self, c: char) -> Option<u32> {
        if let Some(d) = c.to_digit(10) {
            return Some(d);
        }
        if !self.is_digit(c) {
            return None;
        }
        let mut zero = c as u32;
        while let Some(prev) = zero.checked_sub(1).and_then(char::from_u32) {
            if !self.is_digit(prev) {
                break;
            }
            zero -= 1;
        }
        Some((c as u32 - zero) % 10)
    }

    fn is_digit(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.digit.is_match(c.encode_utf8(&mut buf))
    }

    /// Cleans one field in place, returning whether it changed
    pub fn clean_in_place(&self, text: &mut String) -> bool {
        let cleaned = match self.clean(text) {
            Cow::Owned(cleaned) => cleaned,
            Cow::Borrowed(_) => return false,
        };
        *text = cleaned;
        true
    }

    /// Cleans every question and option text
    pub fn apply(&self, records: &mut [QuestionRecord]) -> PageReport {
        let mut report = PageReport::default();
        for record in records.iter_mut() {
            if let Some(question) = record.question_mut() {
                if self.clean_in_place(question) {
                    report.questions_changed += 1;
                }
            }
            for text in record.option_texts_mut() {
                if self.clean_in_place(text) {
                    report.options_changed += 1;
                }
            }
        }
        report
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageReport {
    pub questions_changed: usize,
    pub options_changed: usize,
}

impl PageReport {
    pub fn modified(&self) -> bool {
        self.questions_changed + self.options_changed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cleaner() -> PageCleaner {
        PageCleaner::new(1..=332).unwrap()
    }

    #[test]
    fn test_in_range_page_removed() {
        assert_eq!(cleaner().clean("这是一个选项 273 继续"), "这是一个选项 继续");
    }

    #[test]
    fn test_out_of_range_number_kept() {
        let text = "值为 900 的情况";
        assert!(matches!(cleaner().clean(text), Cow::Borrowed(_)));
        assert_eq!(cleaner().clean("zero 0 stays"), "zero 0 stays");
    }

    #[test]
    fn test_end_of_text_and_punctuation() {
        assert_eq!(cleaner().clean("the end 12"), "the end");
        assert_eq!(cleaner().clean("see 5, then 7."), "see, then.");
        assert_eq!(cleaner().clean("(page 3) [ref 44]"), "(page) [ref]");
    }

    #[test]
    fn test_embedded_digits_untouched() {
        let c = cleaner();
        assert_eq!(c.clean("year 1273 was"), "year 1273 was");
        assert_eq!(c.clean("abc12 def"), "abc12 def");
        assert_eq!(c.clean("size 12kg"), "size 12kg");
    }

    #[test]
    fn test_full_width_digits() {
        let c = cleaner();
        assert_eq!(c.clean("选项 １２ 继续"), "选项 继续");
        assert_eq!(c.clean("第 ２７３ 页"), "第 页");
        assert_eq!(c.clean("值为 ９００ 的情况"), "值为 ９００ 的情况");
        assert_eq!(c.clean("mixed 1２ end"), "mixed end");
    }

    #[test]
    fn test_other_decimal_scripts() {
        // Arabic-Indic ٤٢ and Devanagari ४२ are both 42
        assert_eq!(cleaner().clean("a ٤٢ b ४२ c"), "a b c");
        assert_eq!(PageCleaner::new(1..=40).unwrap().clean("a ٤٢ b"), "a ٤٢ b");
    }

    #[test]
    fn test_consecutive_pages() {
        assert_eq!(cleaner().clean("text 12 34 end"), "text end");
    }

    #[test]
    fn test_leading_zeros_use_numeric_value() {
        assert_eq!(cleaner().clean("a 007 b"), "a b");
        assert_eq!(cleaner().clean("a 000 b"), "a 000 b");
    }

    #[test]
    fn test_custom_range() {
        let c = PageCleaner::new(10..=20).unwrap();
        assert_eq!(c.clean("a 5 b 15 c 25"), "a 5 b c 25");
    }

    #[test]
    fn test_apply_to_questions_and_options() {
        let mut rs: Vec<QuestionRecord> = vec![QuestionRecord::from_value(json!({
            "id": "C1",
            "question": "下列说法正确的是 12",
            "options": [{"label": "A", "text": "选项 273 继续"}, {"label": "B", "text": "值为 900 的情况"}]
        }))
        .unwrap()];

        let report = cleaner().apply(&mut rs);

        assert_eq!(report, PageReport { questions_changed: 1, options_changed: 1 });
        assert_eq!(rs[0].question(), Some("下列说法正确的是"));
        assert_eq!(rs[0].fields()["options"][0]["text"], "选项 继续");
        assert_eq!(rs[0].fields()["options"][1]["text"], "值为 900 的情况");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut rs = vec![QuestionRecord::from_value(json!({"id": "C2", "question": "q 3"})).unwrap()];
        assert!(cleaner().apply(&mut rs).modified());
        assert!(!cleaner().apply(&mut rs).modified());
    }
}
