//! Resolved style records.

use serde::{Deserialize, Serialize};

/// Base font size (points) that relative units and font-size ratios use.
pub const BASE_FONT_SIZE_PT: f64 = 10.0;

/// A CSS length unit accepted by the style resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Points (1/72 inch)
    Pt,
    /// CSS pixels (0.75pt)
    Px,
    /// Inches
    In,
    /// Centimeters
    Cm,
    /// Millimeters
    Mm,
    /// Percent of the base font size
    Percent,
    /// Multiple of the base font size
    Em,
    /// Multiple of the root font size
    Rem,
}

impl Unit {
    /// Parse a unit suffix (`pt`, `px`, `%`, ...). Empty input is pixels.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "px" => Some(Unit::Px),
            "pt" => Some(Unit::Pt),
            "in" => Some(Unit::In),
            "cm" => Some(Unit::Cm),
            "mm" => Some(Unit::Mm),
            "%" => Some(Unit::Percent),
            "em" => Some(Unit::Em),
            "rem" => Some(Unit::Rem),
            _ => None,
        }
    }

    /// Whether the unit is an absolute physical length.
    pub fn is_absolute(&self) -> bool {
        matches!(self, Unit::Pt | Unit::Px | Unit::In | Unit::Cm | Unit::Mm)
    }
}

/// A numeric style value with its original unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    /// Value as written in the source
    pub value: f64,
    /// Unit as written in the source
    pub unit: Unit,
}

impl Length {
    /// Create a new length.
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Create a length in points.
    pub fn pt(value: f64) -> Self {
        Self::new(value, Unit::Pt)
    }

    /// Create a length in pixels.
    pub fn px(value: f64) -> Self {
        Self::new(value, Unit::Px)
    }

    /// Convert to points. Relative units resolve against [`BASE_FONT_SIZE_PT`].
    pub fn to_points(&self) -> f64 {
        match self.unit {
            Unit::Pt => self.value,
            Unit::Px => self.value * 0.75,
            Unit::In => self.value * 72.0,
            Unit::Cm => self.value * 72.0 / 2.54,
            Unit::Mm => self.value * 72.0 / 25.4,
            Unit::Percent => self.value / 100.0 * BASE_FONT_SIZE_PT,
            Unit::Em | Unit::Rem => self.value * BASE_FONT_SIZE_PT,
        }
    }

    /// Whether two lengths can be compared numerically.
    pub fn comparable(&self, other: &Length) -> bool {
        (self.unit.is_absolute() && other.unit.is_absolute()) || self.unit == other.unit
    }
}

/// Normalized style of an element after the cascade.
///
/// Every field is optional; `None` means "not declared anywhere in the
/// ancestor chain".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    /// `display` value (e.g. "block", "none")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// `margin-top`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<Length>,

    /// `margin-bottom`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<Length>,

    /// `font-size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Length>,

    /// `font-weight` (e.g. "bold", "700")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,

    /// `text-align`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,

    /// `line-height`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<Length>,

    /// `width`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,

    /// `text-decoration`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
}

impl StyleRecord {
    /// Create an empty style record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cascade this (child) record over `parent`. Child values win.
    pub fn merge(&self, parent: Option<&StyleRecord>) -> StyleRecord {
        let Some(parent) = parent else {
            return self.clone();
        };

        StyleRecord {
            display: self.display.clone().or_else(|| parent.display.clone()),
            margin_top: self.margin_top.or(parent.margin_top),
            margin_bottom: self.margin_bottom.or(parent.margin_bottom),
            font_size: self.font_size.or(parent.font_size),
            font_weight: self
                .font_weight
                .clone()
                .or_else(|| parent.font_weight.clone()),
            text_align: self.text_align.clone().or_else(|| parent.text_align.clone()),
            line_height: self.line_height.or(parent.line_height),
            width: self.width.or(parent.width),
            text_decoration: self
                .text_decoration
                .clone()
                .or_else(|| parent.text_decoration.clone()),
        }
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == StyleRecord::default()
    }

    /// Whether the font weight is bold.
    pub fn is_bold(&self) -> bool {
        matches!(
            self.font_weight.as_deref(),
            Some("bold" | "bolder" | "700" | "800" | "900")
        )
    }

    /// Whether text is centered.
    pub fn is_centered(&self) -> bool {
        self.text_align.as_deref() == Some("center")
    }

    /// Whether the element is hidden (`display: none`).
    pub fn is_hidden(&self) -> bool {
        self.display.as_deref() == Some("none")
    }

    /// Font size in points, if declared.
    pub fn font_size_pt(&self) -> Option<f64> {
        self.font_size.map(|l| l.to_points())
    }

    /// Font size relative to the base font size, if declared.
    pub fn font_size_ratio(&self) -> Option<f64> {
        self.font_size_pt().map(|pt| pt / BASE_FONT_SIZE_PT)
    }

    /// Top margin in points, if declared.
    pub fn margin_top_pt(&self) -> Option<f64> {
        self.margin_top.map(|l| l.to_points())
    }

    /// Effective alignment, treating an undeclared alignment as `left`.
    pub fn alignment(&self) -> &str {
        match self.text_align.as_deref() {
            None | Some("start") | Some("") => "left",
            Some(other) => other,
        }
    }
}
