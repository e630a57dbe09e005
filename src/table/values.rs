//! Recognition of financial values, dates and reporting-period headers.

use regex::Regex;

/// Currency symbols stripped before numeric parsing.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Parse a financial value.
///
/// Accepts currency symbols, thousands separators, parenthetical negatives
/// and a trailing percent sign: `$1,234.00`, `(500)`, `12.5%`, `€ 40`.
/// Dash placeholders and empty strings are not values.
pub fn parse_financial(text: &str) -> Option<f64> {
    let mut s = text.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_suffix('%') {
        s = rest.trim_end();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim_start();
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Check if text is a financial value.
pub fn is_financial_value(text: &str) -> bool {
    parse_financial(text).is_some()
}

/// Check if a cell holds nothing but a dollar sign.
pub fn is_lone_dollar(text: &str) -> bool {
    text.trim() == "$"
}

/// Check if text is a bare four-digit year.
pub fn is_year(text: &str) -> bool {
    let t = text.trim();
    t.len() == 4
        && t.chars().all(|c| c.is_ascii_digit())
        && (t.starts_with("19") || t.starts_with("20"))
}

/// Check if a cell carries numeric data, not counting bare years.
pub fn is_data_value(text: &str) -> bool {
    !is_year(text) && is_financial_value(text)
}

/// Rewrite a parenthetical negative as a leading-minus value.
///
/// `(600)` becomes `-600` and `(1,234)` becomes `-1,234`. Anything else,
/// including `(a)` footnote markers, is returned unchanged.
pub fn normalize_negative(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        let inner = inner.trim();
        if !inner.starts_with('-') && is_financial_value(inner) {
            return format!("-{inner}");
        }
    }
    text.to_string()
}

/// Date and period token patterns.
///
/// Built once and shared; the processor holds one per instance.
#[derive(Debug, Clone)]
pub struct PeriodPatterns {
    date_token: Regex,
    bare_period: Regex,
    period_header: Regex,
}

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec";

impl PeriodPatterns {
    /// Compile the patterns.
    pub fn new() -> Self {
        let date_token = Regex::new(&format!(
            r"(?i)\b(?:(?:19|20)\d{{2}}|q[1-4]|(?:first|second|third|fourth)\s+quarter|(?:{MONTHS})\.?)\b"
        ))
        .expect("valid date token pattern");
        let bare_period = Regex::new(
            r"(?i)^\s*(?:(?:19|20)\d{2}|q[1-4](?:\s+(?:19|20)\d{2})?|(?:first|second|third|fourth)\s+quarter)\s*$",
        )
        .expect("valid bare period pattern");
        let period_header = Regex::new(&format!(
            r"(?ix)
            (?:three|six|nine|twelve|\d{{1,2}})[\s-]+months?\s+ended
            | (?:fiscal\s+)?years?\s+ended
            | (?:quarters?|weeks?|periods?)\s+ended
            | \bas\s+of\b
            | \bfiscal\s+(?:year|quarter)
            | \b(?:19|20)\d{{2}}\b .* \b(?:19|20)\d{{2}}\b
            | \b(?:{MONTHS})\.?\s+\d{{1,2}},?\s+(?:19|20)\d{{2}}"
        ))
        .expect("valid period header pattern");

        Self {
            date_token,
            bare_period,
            period_header,
        }
    }

    /// Check if text carries a year, quarter or month token.
    pub fn has_date_token(&self, text: &str) -> bool {
        self.date_token.is_match(text)
    }

    /// Check if a cell is only a year or quarter.
    pub fn is_bare_period(&self, text: &str) -> bool {
        self.bare_period.is_match(text)
    }

    /// Check if a row reads as a reporting-period header.
    ///
    /// The cells are joined with spaces so that `2023 | 2022` counts as a
    /// multi-year sequence.
    pub fn is_period_header(&self, cells: &[String]) -> bool {
        let joined = cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        !joined.is_empty() && self.period_header.is_match(&joined)
    }
}

impl Default for PeriodPatterns {
    fn default() -> Self {
        Self::new()
    }
}
