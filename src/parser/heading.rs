//! Heading classification from style and text shape.
//!
//! Filing HTML almost never uses `<h1>`-`<h6>`. Headings are recognized from
//! a combination of visual traits (weight, size, margins, alignment) and the
//! wording conventions of regulatory filings ("PART I", "ITEM 7.", ...).

use regex::Regex;

use crate::model::StyleRecord;

use super::options::HeadingConfig;

/// Keywords that make a short prominent line look like a section heading.
const SECTION_KEYWORDS: &[&str] = &[
    "overview",
    "background",
    "business",
    "operations",
    "risk factors",
    "management",
    "financial",
    "discussion",
    "analysis",
    "results",
    "liquidity",
    "capital resources",
    "critical accounting",
    "controls",
    "procedures",
];

/// Prefixes that rule out a level-4 heading.
const MINOR_EXCLUDED_PREFIXES: &[&str] = &["*", "(", "$"];

/// Traversal facts the classifier cannot see from style and text alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingContext {
    /// The element's text was already consumed by a merged multi-span heading
    pub suppressed: bool,
}

/// Classifies text as a heading level 1-4.
///
/// Patterns are compiled once in [`HeadingClassifier::new`].
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    config: HeadingConfig,
    part: Regex,
    major: Vec<Regex>,
    sections: Vec<Regex>,
}

impl HeadingClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: HeadingConfig) -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("valid heading pattern");

        Self {
            config,
            part: compile(r"(?is)^PART\s+[IVX0-9]+(\s.*)?$"),
            major: vec![
                compile(r"(?is)^ITEM\s+\d+[A-Za-z]?\.?(\s.*)?$"),
                compile(r"(?is)^ARTICLE\s+[IVX0-9]+([\s.].*)?$"),
                compile(r"(?is)^SECTION\s+\d+(\.\d+)*(\s.*)?$"),
            ],
            sections: vec![
                compile(r"^[A-Z][A-Z &\-]{5,}$"),
                compile(r"^(CONSOLIDATED|COMBINED)\s+[A-Z][A-Z ,'&\-]*$"),
                compile(r"(?is)^MANAGEMENT.*(DISCUSSION|ANALYSIS)"),
                compile(r"^NOTES\s+TO\s+[A-Z][A-Z ,'&\-]*$"),
                compile(r"(?i)^SELECTED\s+FINANCIAL\s+DATA\b"),
                compile(r"(?i)^SUPPLEMENTARY\s+INFORMATION\b"),
                compile(r"(?i)^SIGNATURES?\b"),
                compile(r"(?i)^EXHIBITS\s+AND\s+FINANCIAL\s+STATEMENT\s+SCHEDULES\b"),
            ],
        }
    }

    /// Get the configured thresholds.
    pub fn config(&self) -> &HeadingConfig {
        &self.config
    }

    /// Classify `text` rendered with `style`.
    ///
    /// Returns the heading level, or `None` when the text is not a heading.
    pub fn classify(&self, style: &StyleRecord, text: &str, context: HeadingContext) -> Option<u8> {
        let text = text.trim();
        let length = text.chars().count();
        if context.suppressed || length == 0 || length > self.config.max_length {
            return None;
        }

        let bold = style.is_bold();
        let ratio = style.font_size_ratio().unwrap_or(1.0);
        let margin_top = style.margin_top_pt().unwrap_or(0.0);
        let caps = style.is_centered() && is_all_caps(text) && length > self.config.caps_min_length;

        let passes_gate = bold
            || ratio >= self.config.large_font_ratio
            || (margin_top >= self.config.gate_margin_top_pt && (bold || caps));
        if !passes_gate {
            return None;
        }

        if self.part.is_match(text) {
            return Some(1);
        }
        if self.major.iter().any(|re| re.is_match(text)) {
            return Some(2);
        }

        let prominent = ratio > self.config.prominent_font_ratio
            || margin_top >= self.config.prominent_margin_top_pt
            || style.is_centered()
            || (bold && style.margin_top.is_some());

        if prominent && (self.is_sec_section(text) || self.is_section_heading(text, length)) {
            return Some(3);
        }

        if bold && length < self.config.minor_max_length && is_minor_heading_shape(text) {
            return Some(4);
        }

        None
    }

    fn is_sec_section(&self, text: &str) -> bool {
        self.sections.iter().any(|re| re.is_match(text))
    }

    fn is_section_heading(&self, text: &str, length: usize) -> bool {
        let (min, max) = self.config.section_length;
        if length < min || length > max {
            return false;
        }
        let lower = text.to_lowercase();
        SECTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(HeadingConfig::default())
    }
}

/// Whether text has letters and none of them are lowercase.
pub(crate) fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn is_minor_heading_shape(text: &str) -> bool {
    let starts_with_note = text
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("note:"));

    !starts_with_note
        && !MINOR_EXCLUDED_PREFIXES.iter().any(|p| text.starts_with(p))
        && !text.ends_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Length;

    fn bold() -> StyleRecord {
        StyleRecord {
            font_weight: Some("bold".to_string()),
            ..Default::default()
        }
    }

    fn bold_large_centered() -> StyleRecord {
        StyleRecord {
            font_size: Some(Length::pt(14.0)),
            text_align: Some("center".to_string()),
            ..bold()
        }
    }

    fn classify(style: &StyleRecord, text: &str) -> Option<u8> {
        HeadingClassifier::default().classify(style, text, HeadingContext::default())
    }

    #[test]
    fn test_part_is_level_one() {
        let style = StyleRecord {
            font_size: Some(Length::pt(12.0)),
            ..bold()
        };
        assert_eq!(classify(&style, "PART I"), Some(1));
        assert_eq!(classify(&style, "Part II Other Information"), Some(1));
    }

    #[test]
    fn test_item_is_level_two() {
        assert_eq!(classify(&bold(), "ITEM 1A. Risk Factors"), Some(2));
        assert_eq!(classify(&bold(), "Article IV. Definitions"), Some(2));
        assert_eq!(classify(&bold(), "Section 2.01 Defined Terms"), Some(2));
    }

    #[test]
    fn test_mdna_is_level_three() {
        assert_eq!(
            classify(&bold_large_centered(), "MANAGEMENT'S DISCUSSION AND ANALYSIS"),
            Some(3)
        );
        assert_eq!(
            classify(&bold_large_centered(), "NOTES TO CONSOLIDATED FINANCIAL STATEMENTS"),
            Some(3)
        );
    }

    #[test]
    fn test_item_beats_prominence() {
        assert_eq!(
            classify(
                &bold_large_centered(),
                "ITEM 7. MANAGEMENT'S DISCUSSION AND ANALYSIS"
            ),
            Some(2)
        );
    }

    #[test]
    fn test_bold_short_text_is_level_four() {
        assert_eq!(classify(&bold(), "Competition"), Some(4));
    }

    #[test]
    fn test_note_prefix_is_not_heading() {
        assert_eq!(
            classify(&bold(), "Note: The following table presents..."),
            None
        );
        assert_eq!(classify(&bold(), "(in thousands)"), None);
        assert_eq!(classify(&bold(), "As of December 31:"), None);
    }

    #[test]
    fn test_plain_text_fails_gate() {
        assert_eq!(classify(&StyleRecord::default(), "PART I"), None);
        assert_eq!(classify(&StyleRecord::default(), "Competition"), None);
    }

    #[test]
    fn test_margin_gate_with_centered_caps() {
        let style = StyleRecord {
            margin_top: Some(Length::pt(12.0)),
            text_align: Some("center".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(&style, "RISK FACTORS"), Some(3));
        assert_eq!(classify(&style, "Risk factors"), None);
    }

    #[test]
    fn test_generic_section_heading() {
        let style = StyleRecord {
            margin_top: Some(Length::pt(6.0)),
            ..bold()
        };
        assert_eq!(classify(&style, "Liquidity and Capital Resources"), Some(3));
    }

    #[test]
    fn test_length_and_suppression() {
        let long = "A".repeat(101);
        assert_eq!(classify(&bold(), &long), None);
        assert_eq!(classify(&bold(), "   "), None);

        let suppressed = HeadingContext { suppressed: true };
        assert_eq!(
            HeadingClassifier::default().classify(&bold(), "PART I", suppressed),
            None
        );
    }
}
