use crate::{Colour, Mm, Pt};
use serde::{Deserialize, Serialize};

/// Horizontal placement of each line within its box
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    /// Left aligned, with every line but the last of a paragraph stretched to the box
    /// width by extra spacing between grapheme clusters
    Justify,
}

/// Vertical placement of the block of lines within its box
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Which dimension of the box the dynamic font size tries to fill
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitAxis {
    /// Fill the box width with each paragraph's unwrapped width
    Horizontal,
    /// Fill the box height with the wrapped lines
    #[default]
    Vertical,
}

/// Bounds for dynamically sizing a field's font. A setting whose `max` is below its
/// `min` disables fitting and leaves the declared font size untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DynamicFitSetting {
    pub min: Pt,
    pub max: Pt,
    pub fit: FitAxis,
}

impl Default for DynamicFitSetting {
    fn default() -> Self {
        DynamicFitSetting {
            min: Pt(4.0),
            max: Pt(72.0),
            fit: FitAxis::Vertical,
        }
    }
}

impl DynamicFitSetting {
    pub fn new(min: Pt, max: Pt, fit: FitAxis) -> Self {
        DynamicFitSetting { min, max, fit }
    }

    /// Fitting only runs when the bounds form a non-empty range
    pub fn is_enabled(&self) -> bool {
        self.max >= self.min
    }
}

/// The box text is laid out in. Immutable input to every layout call.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub width: Pt,
    pub height: Pt,
}

impl LayoutBox {
    pub fn new(width: Pt, height: Pt) -> Self {
        LayoutBox { width, height }
    }

    /// Convert template geometry, authored in millimetres
    pub fn from_mm(width: Mm, height: Mm) -> Self {
        LayoutBox {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// The base style of a text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Logical font name; `None` uses the font set's fallback font
    pub font_name: Option<String>,
    pub font_size: Pt,
    /// Multiplier applied to the font size to get the distance between baselines
    pub line_height: f32,
    pub character_spacing: Pt,
    pub alignment: Alignment,
    pub vertical_alignment: VerticalAlignment,
    #[serde(rename = "fontColor")]
    pub colour: Colour,
    #[serde(rename = "backgroundColor")]
    pub background: Option<Colour>,
    pub underline: bool,
    pub strikethrough: bool,
    pub opacity: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_name: None,
            font_size: Pt(13.0),
            line_height: 1.0,
            character_spacing: Pt(0.0),
            alignment: Alignment::Left,
            vertical_alignment: VerticalAlignment::Top,
            colour: Colour::default(),
            background: None,
            underline: false,
            strikethrough: false,
            opacity: 1.0,
        }
    }
}

impl TextStyle {
    /// The field's style with no per-segment overrides applied
    pub fn resolved(&self) -> ResolvedStyle {
        self.resolve(&SegmentStyle::default())
    }

    /// Apply a segment's overrides; anything the segment leaves unset is inherited
    pub fn resolve(&self, overrides: &SegmentStyle) -> ResolvedStyle {
        ResolvedStyle {
            font_name: overrides
                .font_name
                .clone()
                .or_else(|| self.font_name.clone()),
            font_size: overrides.font_size.unwrap_or(self.font_size),
            line_height: self.line_height,
            character_spacing: overrides
                .character_spacing
                .unwrap_or(self.character_spacing),
            colour: overrides.colour.unwrap_or(self.colour),
            background: overrides.background.or(self.background),
            bold: overrides.bold.unwrap_or(false),
            italic: overrides.italic.unwrap_or(false),
            code: overrides.code.unwrap_or(false),
            underline: overrides.underline.unwrap_or(self.underline),
            strikethrough: overrides.strikethrough.unwrap_or(self.strikethrough),
            opacity: overrides.opacity.unwrap_or(self.opacity),
        }
    }

    /// The same style at another font size
    pub fn with_font_size(&self, font_size: Pt) -> TextStyle {
        TextStyle {
            font_size,
            ..self.clone()
        }
    }
}

/// Per-segment style overrides. Every field is optional and falls back to the field's
/// [TextStyle] when resolved. Line spacing belongs to the field as a whole: every line
/// advances by the field's font size times its line height, whatever its runs hold.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Pt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_spacing: Option<Pt>,
    #[serde(rename = "fontColor", skip_serializing_if = "Option::is_none")]
    pub colour: Option<Colour>,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background: Option<Colour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl SegmentStyle {
    pub fn bold() -> Self {
        SegmentStyle {
            bold: Some(true),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        SegmentStyle {
            italic: Some(true),
            ..Default::default()
        }
    }

    pub fn code() -> Self {
        SegmentStyle {
            code: Some(true),
            ..Default::default()
        }
    }

    pub fn coloured(colour: Colour) -> Self {
        SegmentStyle {
            colour: Some(colour),
            ..Default::default()
        }
    }

    pub fn highlighted(background: Colour) -> Self {
        SegmentStyle {
            background: Some(background),
            ..Default::default()
        }
    }

    /// Layer `over` on top of this style; fields set in `over` win
    pub fn merged(&self, over: &SegmentStyle) -> SegmentStyle {
        SegmentStyle {
            font_name: over.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: over.font_size.or(self.font_size),
            character_spacing: over.character_spacing.or(self.character_spacing),
            colour: over.colour.or(self.colour),
            background: over.background.or(self.background),
            bold: over.bold.or(self.bold),
            italic: over.italic.or(self.italic),
            code: over.code.or(self.code),
            underline: over.underline.or(self.underline),
            strikethrough: over.strikethrough.or(self.strikethrough),
            opacity: over.opacity.or(self.opacity),
        }
    }
}

/// A fully resolved style: what the drawing surface needs to render a run of text
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_name: Option<String>,
    pub font_size: Pt,
    pub line_height: f32,
    pub character_spacing: Pt,
    pub colour: Colour,
    pub background: Option<Colour>,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub opacity: f32,
}

impl ResolvedStyle {
    /// Distance between consecutive baselines in this style
    pub fn line_advance(&self) -> Pt {
        self.font_size * self.line_height
    }
}

/// A template text field: its box (in millimetres, as authored), its base style, and
/// optional dynamic font sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    pub width: Mm,
    pub height: Mm,
    #[serde(flatten)]
    pub style: TextStyle,
    #[serde(default)]
    pub dynamic_font_size: Option<DynamicFitSetting>,
}

impl TextField {
    pub fn layout_box(&self) -> LayoutBox {
        LayoutBox::from_mm(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_overrides_inherit_the_base_style() {
        let base = TextStyle {
            font_name: Some("Roboto".into()),
            font_size: Pt(12.0),
            ..Default::default()
        };
        let over = SegmentStyle {
            font_size: Some(Pt(20.0)),
            bold: Some(true),
            ..Default::default()
        };
        let resolved = base.resolve(&over);
        assert_eq!(resolved.font_name.as_deref(), Some("Roboto"));
        assert_eq!(resolved.font_size, Pt(20.0));
        assert!(resolved.bold);
        assert!(!resolved.italic);
        assert_eq!(resolved.line_advance(), Pt(20.0));
    }

    #[test]
    fn merging_prefers_the_upper_layer() {
        let lower = SegmentStyle::bold().merged(&SegmentStyle::coloured(Colour::new_rgb(1.0, 0.0, 0.0)));
        assert_eq!(lower.bold, Some(true));
        assert!(lower.colour.is_some());
        let upper = lower.merged(&SegmentStyle {
            bold: Some(false),
            ..Default::default()
        });
        assert_eq!(upper.bold, Some(false));
    }

    #[test]
    fn fields_deserialize_from_template_json() {
        let json = r##"{
            "width": 50, "height": 20,
            "fontName": "Roboto", "fontSize": 14, "lineHeight": 1.2,
            "alignment": "justify", "verticalAlignment": "middle",
            "fontColor": "#ff0000",
            "dynamicFontSize": { "min": 10, "max": 20, "fit": "horizontal" }
        }"##;
        let field: TextField = serde_json::from_str(json).expect("valid field");
        assert_eq!(field.style.font_size, Pt(14.0));
        assert_eq!(field.style.alignment, Alignment::Justify);
        assert_eq!(field.style.vertical_alignment, VerticalAlignment::Middle);
        assert_eq!(field.style.character_spacing, Pt(0.0));
        let fit = field.dynamic_font_size.expect("fit setting");
        assert_eq!(fit.fit, FitAxis::Horizontal);
        assert!(fit.is_enabled());
        assert!((field.layout_box().width.0 - 141.73).abs() < 1e-3);
    }

    #[test]
    fn inverted_bounds_disable_fitting() {
        assert!(!DynamicFitSetting::new(Pt(20.0), Pt(10.0), FitAxis::Vertical).is_enabled());
        assert!(DynamicFitSetting::new(Pt(10.0), Pt(10.0), FitAxis::Vertical).is_enabled());
    }
}
