// File: src/model/sanitize.rs
// Cleans free-text property values pulled from calendar exports
use crate::model::parser::RawField;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-z]+;").expect("entity regex"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space regex"));

/// Normalizes a field for display. A missing field yields an empty string.
pub fn field_text(field: Option<&RawField>) -> String {
    field.map(|f| clean_text(f.value())).unwrap_or_default()
}

/// Order matters: markup is replaced by spaces first so the final collapse
/// swallows whatever gaps the replacements leave behind.
pub fn clean_text(raw: &str) -> String {
    let s = TAG_RE.replace_all(raw, " ");
    let s = ENTITY_RE.replace_all(&s, " ");
    let s = s.replace("\\r", " ").replace("\\n", " ");
    let s = s.replace('\\', "");
    let s = s
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    let s = s.replace(['\u{2013}', '\u{2014}'], "-");
    let s = s.replace(['\r', '\n'], " ");
    SPACE_RE.replace_all(&s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_and_entities() {
        assert_eq!(
            clean_text("<p>Doors&nbsp;at <b>8</b></p>"),
            "Doors at 8"
        );
    }

    #[test]
    fn test_escaped_newlines_and_backslashes() {
        assert_eq!(
            clean_text(r"Line one\nLine two\r\nSmith\, Jones\; more"),
            "Line one Line two Smith, Jones; more"
        );
    }

    #[test]
    fn test_unicode_punctuation() {
        assert_eq!(
            clean_text("\u{201C}Live\u{201D} \u{2018}n\u{2019} loud \u{2013} 2024 \u{2014} tour"),
            "\"Live\" 'n' loud - 2024 - tour"
        );
    }

    #[test]
    fn test_real_newlines_and_whitespace_runs() {
        assert_eq!(clean_text("  a\r\n\n b \t  c  "), "a b c");
    }

    #[test]
    fn test_uppercase_entities_are_kept() {
        // Only lowercase entity names are recognized.
        assert_eq!(clean_text("R&B; &AMP;"), "R&B; &AMP;");
    }

    #[test]
    fn test_field_text_handles_both_shapes() {
        let bare = RawField::Bare("  (c) Show ".to_string());
        let with_params = RawField::WithParams {
            value: "The <i>Venue</i>".to_string(),
            params: [("LANGUAGE".to_string(), "en".to_string())].into(),
        };
        assert_eq!(field_text(Some(&bare)), "(c) Show");
        assert_eq!(field_text(Some(&with_params)), "The Venue");
        assert_eq!(field_text(None), "");
    }
}
