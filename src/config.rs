use crate::{colour::colours, Colour, LayoutError, Pt};
use serde::{Deserialize, Serialize};

/// Every tunable constant used by the solver and the block composer. The defaults
/// reproduce the template designer's look; load overrides with [LayoutConfig::from_json].
///
/// Lengths are in points; gaps are fractions of the base font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Font size increment tried by the dynamic fit solver
    pub fit_step: Pt,
    /// Overflow that is tolerated before the solver shrinks, to avoid oscillating at a
    /// box boundary
    pub fit_tolerance: Pt,
    /// Number of spaces a tab expands to
    pub tab_width: usize,
    /// Font size multipliers for heading levels 1 through 6
    pub heading_multipliers: [f32; 6],
    /// Horizontal offset of the second pass that simulates bold, as a fraction of the
    /// font size (half of it is applied)
    pub bold_stroke_ratio: f32,
    pub code_font_ratio: f32,
    pub code_padding: Pt,
    pub code_background: Colour,
    pub blockquote_padding: Pt,
    pub blockquote_rule_width: Pt,
    pub blockquote_text: Colour,
    pub list_indent: Pt,
    pub list_marker_width: Pt,
    pub list_bullet: String,
    pub list_item_spacing: Pt,
    pub table_cell_padding: Pt,
    pub table_rule_width: Pt,
    pub table_header_background: Colour,
    pub rule_colour: Colour,
    pub paragraph_gap: f32,
    pub heading_gap: f32,
    pub blockquote_gap: f32,
    pub list_gap: f32,
    pub code_gap: f32,
    pub table_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            fit_step: Pt(0.25),
            fit_tolerance: Pt(0.01),
            tab_width: 4,
            heading_multipliers: [2.0, 1.5, 1.25, 1.0, 0.875, 0.75],
            bold_stroke_ratio: 0.03,
            code_font_ratio: 0.875,
            code_padding: Pt(5.0),
            code_background: colours::CODE_BACKGROUND,
            blockquote_padding: Pt(10.0),
            blockquote_rule_width: Pt(3.0),
            blockquote_text: colours::QUOTE_TEXT,
            list_indent: Pt(15.0),
            list_marker_width: Pt(15.0),
            list_bullet: "\u{2022}".to_string(),
            list_item_spacing: Pt(2.0),
            table_cell_padding: Pt(6.0),
            table_rule_width: Pt(0.5),
            table_header_background: colours::TABLE_HEADER,
            rule_colour: colours::RULE,
            paragraph_gap: 0.3,
            heading_gap: 0.3,
            blockquote_gap: 0.3,
            list_gap: 0.3,
            code_gap: 1.0,
            table_gap: 0.5,
        }
    }
}

impl LayoutConfig {
    /// Load a (possibly partial) JSON configuration; missing keys keep their defaults.
    /// Values layout cannot work with, such as a fit step that is not positive, are
    /// rejected here rather than when a field is laid out.
    pub fn from_json(json: &str) -> Result<LayoutConfig, LayoutError> {
        let config: LayoutConfig = serde_json::from_str(json).map_err(LayoutError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that must be positive, or at least not negative
    pub fn validate(&self) -> Result<(), LayoutError> {
        require_positive("fitStep", self.fit_step.0)?;
        require_non_negative("fitTolerance", self.fit_tolerance.0)?;
        require_positive("codeFontRatio", self.code_font_ratio)?;
        for multiplier in self.heading_multipliers {
            require_positive("headingMultipliers", multiplier)?;
        }
        Ok(())
    }

    /// Font size multiplier for a heading level; levels outside 1–6 are clamped
    pub fn heading_multiplier(&self, level: u8) -> f32 {
        let index = level.clamp(1, 6) as usize - 1;
        self.heading_multipliers[index]
    }
}

pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(LayoutError::InvalidSetting {
        name,
        expected: "a positive number",
        value,
    })
}

pub(crate) fn require_non_negative(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(LayoutError::InvalidSetting {
        name,
        expected: "zero or a positive number",
        value,
    })
}
