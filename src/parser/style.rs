//! Style resolution for inline `style` declarations.
//!
//! Filing agents emit a lot of malformed CSS: scientific-notation margins,
//! unknown units, stray colons. Every declaration is interpreted on its own
//! and a bad one is dropped without affecting the rest of the element.

use regex::Regex;

use crate::model::{Length, StyleRecord, Unit};

/// Split a declaration string into `(property, value)` pairs.
///
/// Splits on `;`, then on the first `:`. Properties and values are
/// lowercased and trimmed, and a trailing `!important` is removed.
/// Declarations without a colon or with an empty property are skipped.
pub fn declarations(input: &str) -> impl Iterator<Item = (String, String)> + '_ {
    input.split(';').filter_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return None;
        }
        let mut value = value.trim().to_ascii_lowercase();
        if let Some(stripped) = value.strip_suffix("!important") {
            value = stripped.trim_end().to_string();
        }
        Some((key, value))
    })
}

/// Parses inline style declarations into [`StyleRecord`]s.
///
/// Build once per parse and share by reference.
#[derive(Debug, Clone)]
pub struct StyleResolver {
    number: Regex,
    scientific: Regex,
}

impl StyleResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self {
            number: Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+))\s*([a-z%]*)$")
                .expect("valid number pattern"),
            scientific: Regex::new(r"\d[eE][+-]?\d").expect("valid scientific pattern"),
        }
    }

    /// Parse a declaration string into a style record.
    ///
    /// Never fails; malformed numeric declarations are dropped.
    pub fn parse(&self, input: &str) -> StyleRecord {
        let mut style = StyleRecord::new();
        let mut shorthand: Option<(Option<Length>, Option<Length>)> = None;

        for (key, value) in declarations(input) {
            match key.as_str() {
                "display" => style.display = Some(value),
                "font-weight" => style.font_weight = Some(value),
                "text-align" => style.text_align = Some(value),
                "text-decoration" | "text-decoration-line" => style.text_decoration = Some(value),
                "margin-top" => style.margin_top = self.length_or_trace(&key, &value),
                "margin-bottom" => style.margin_bottom = self.length_or_trace(&key, &value),
                "font-size" => style.font_size = self.length_or_trace(&key, &value),
                "line-height" => style.line_height = self.length_or_trace(&key, &value),
                "width" => style.width = self.length_or_trace(&key, &value),
                "margin" => shorthand = Some(self.margin_shorthand(&value)),
                _ => {}
            }
        }

        if let Some((top, bottom)) = shorthand {
            if style.margin_top.is_none() {
                style.margin_top = top;
            }
            if style.margin_bottom.is_none() {
                style.margin_bottom = bottom;
            }
        }

        style
    }

    /// Resolve the declared style of an element.
    ///
    /// Tag defaults (`<b>` is bold, `<center>` is centered, ...) apply first,
    /// then the legacy `align` attribute, then the `style` attribute.
    pub fn resolve_element(
        &self,
        tag: &str,
        style_attr: Option<&str>,
        align_attr: Option<&str>,
    ) -> StyleRecord {
        let mut base = tag_defaults(tag);
        if let Some(align) = align_attr {
            let align = align.trim().to_ascii_lowercase();
            if !align.is_empty() {
                base.text_align = Some(align);
            }
        }

        match style_attr {
            Some(declared) if !declared.trim().is_empty() => self.parse(declared).merge(Some(&base)),
            _ => base,
        }
    }

    /// Parse a `<number><unit>` value.
    ///
    /// Returns `None` for unknown units, scientific notation, and anything
    /// that is not a plain decimal number. A bare number is in pixels.
    pub fn parse_length(&self, value: &str) -> Option<Length> {
        let value = value.trim();
        if self.scientific.is_match(value) {
            return None;
        }
        let caps = self.number.captures(value)?;
        let number: f64 = caps.get(1)?.as_str().parse().ok()?;
        if !number.is_finite() {
            return None;
        }
        let unit = Unit::from_suffix(caps.get(2).map_or("", |m| m.as_str()))?;
        Some(Length::new(number, unit))
    }

    fn length_or_trace(&self, key: &str, value: &str) -> Option<Length> {
        let length = self.parse_length(value);
        if length.is_none() {
            log::trace!("dropping malformed declaration {key}: {value}");
        }
        length
    }

    /// Top and bottom margins from a 1-4 value `margin` shorthand.
    fn margin_shorthand(&self, value: &str) -> (Option<Length>, Option<Length>) {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let (top, bottom) = match parts.as_slice() {
            [all] => (*all, *all),
            [vertical, _] => (*vertical, *vertical),
            [top, _, bottom] | [top, _, bottom, _] => (*top, *bottom),
            _ => {
                log::trace!("dropping malformed margin shorthand: {value}");
                return (None, None);
            }
        };
        (self.parse_length(top), self.parse_length(bottom))
    }
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Style implied by the tag itself.
fn tag_defaults(tag: &str) -> StyleRecord {
    let mut style = StyleRecord::new();
    match tag {
        "b" | "strong" | "th" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            style.font_weight = Some("bold".to_string());
        }
        "center" => style.text_align = Some("center".to_string()),
        "u" | "ins" => style.text_decoration = Some("underline".to_string()),
        _ => {}
    }
    style
}
