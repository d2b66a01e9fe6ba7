use super::block::{BlockComposer, Composition, MarkupProbe, RenderOutcome};
use super::fit::{DynamicFitSolver, PlainProbe, RichProbe};
use super::line::{Line, LineRange};
use super::splitter::RichSegmentSplitter;
use super::surface::{align_line, paint_line, PaintOptions, Surface};
use crate::fonts::FontResolver;
use crate::markup::parse_blocks;
use crate::{
    LayoutConfig, LayoutError, Pt, RichContent, StyledSegment, TextField, TextStyle,
    VerticalAlignment,
};

/// What a text field holds
#[derive(Debug, Clone, Copy)]
pub enum FieldContent<'c> {
    /// Text in the field's base style
    Plain(&'c str),
    /// Text with per-character styles
    Rich(&'c RichContent),
}

impl<'c> From<&'c str> for FieldContent<'c> {
    fn from(text: &'c str) -> Self {
        FieldContent::Plain(text)
    }
}

impl<'c> From<&'c RichContent> for FieldContent<'c> {
    fn from(content: &'c RichContent) -> Self {
        FieldContent::Rich(content)
    }
}

/// A line placed within its field's box
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub line: Line,
    /// Left edge of the line, after alignment
    pub x: Pt,
    /// Distance from the top of the box to the line's baseline
    pub baseline: Pt,
    /// Extra space between grapheme clusters when the line is justified
    pub extra_spacing: Pt,
}

/// The final layout of one text field
#[derive(Debug, Clone)]
pub struct FieldLayout {
    /// The font size the text was laid out at, after any dynamic fitting
    pub font_size: Pt,
    pub lines: Vec<PositionedLine>,
    config: LayoutConfig,
}

impl FieldLayout {
    /// Draw every line
    pub fn render(&self, surface: &mut dyn Surface) {
        let options = PaintOptions {
            bold: false,
            code_backgrounds: true,
        };
        for positioned in self.lines.iter() {
            paint_line(
                surface,
                &positioned.line,
                positioned.x,
                positioned.baseline,
                positioned.extra_spacing,
                options,
                &self.config,
            );
        }
    }
}

fn expand_tabs(text: &str, config: &LayoutConfig) -> String {
    text.replace('\t', &" ".repeat(config.tab_width))
}

/// Half of the extra leading a line height multiplier adds, which is split evenly
/// above and below each line
fn half_leading(style: &TextStyle, size: Pt) -> Pt {
    if style.line_height == 0.0 {
        return Pt::ZERO;
    }
    size * ((style.line_height - 1.0) / 2.0)
}

/// Lay out a field's content: pick its font size, wrap it, and position every line
/// according to the field's alignment.
///
/// Fails with a configuration error if the field, or any styled run in it, names a
/// font that `fonts` does not have.
pub fn layout_field(
    field: &TextField,
    content: FieldContent<'_>,
    fonts: &dyn FontResolver,
    config: &LayoutConfig,
) -> Result<FieldLayout, LayoutError> {
    let layout_box = field.layout_box();
    let font = fonts.resolve(field.style.font_name.as_deref())?;
    let solver = DynamicFitSolver::from_config(config);
    let setting = field.dynamic_font_size.as_ref();
    let declared = field.style.font_size;

    let (font_size, segments) = match content {
        FieldContent::Plain(text) => {
            let text = expand_tabs(text, config);
            let probe = PlainProbe::new(font.metrics, &text, &field.style, layout_box.width);
            let size = solver.solve(declared, setting, layout_box, &probe)?;
            (size, vec![StyledSegment::plain(text)])
        }
        FieldContent::Rich(content) => {
            let segments: Vec<StyledSegment> = content
                .segments()
                .into_iter()
                .map(|segment| StyledSegment::new(expand_tabs(&segment.text, config), segment.style))
                .collect();
            let probe = RichProbe::new(fonts, &field.style, &segments, layout_box.width);
            let size = solver.solve(declared, setting, layout_box, &probe)?;
            (size, segments)
        }
    };

    let style = field.style.with_font_size(font_size);
    let splitter = RichSegmentSplitter::new(fonts, &style);
    let lines = splitter.split(&segments, layout_box.width)?;

    let first = match lines.first() {
        Some(line) => splitter.text_height(line)?,
        None => Pt::ZERO,
    };
    let advance = font_size * style.line_height;
    let others = advance * lines.len().saturating_sub(1) as f32;
    let descent = font.metrics.descent(font_size);
    let half = half_leading(&style, font_size);
    let top = match style.vertical_alignment {
        VerticalAlignment::Top => first + half,
        VerticalAlignment::Bottom => layout_box.height - others + descent - half,
        VerticalAlignment::Middle => (layout_box.height - others - first + descent) / 2.0 + first,
    };
    log::debug!(
        "field laid out at {font_size}: {} lines, first baseline {top}",
        lines.len()
    );

    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let (x, extra_spacing) = align_line(&line, layout_box.width, style.alignment);
            PositionedLine {
                line,
                x,
                baseline: top + advance * i as f32,
                extra_spacing,
            }
        })
        .collect();

    Ok(FieldLayout {
        font_size,
        lines,
        config: config.clone(),
    })
}

/// A field holding markup, laid out as blocks
#[derive(Debug, Clone)]
pub struct MarkupField {
    pub font_size: Pt,
    /// Distance from the top of the box to the first baseline
    pub top: Pt,
    pub composition: Composition,
}

impl MarkupField {
    /// Draw the lines inside `range`
    pub fn render(&self, surface: &mut dyn Surface, range: LineRange) -> RenderOutcome {
        self.composition.render(surface, self.top, range)
    }
}

/// Lay out a field whose content is markup, fitting its font size with complete
/// composer passes
pub fn layout_markup_field(
    field: &TextField,
    markup: &str,
    fonts: &dyn FontResolver,
    config: &LayoutConfig,
) -> Result<MarkupField, LayoutError> {
    let layout_box = field.layout_box();
    fonts.resolve(field.style.font_name.as_deref())?;
    let blocks = parse_blocks(&expand_tabs(markup, config));

    let probe = MarkupProbe::new(fonts, &field.style, config, &blocks, layout_box.width);
    let font_size = DynamicFitSolver::from_config(config).solve(
        field.style.font_size,
        field.dynamic_font_size.as_ref(),
        layout_box,
        &probe,
    )?;

    let style = field.style.with_font_size(font_size);
    let composition =
        BlockComposer::new(fonts, &style, config, layout_box.width).measure(&blocks)?;
    let top = composition.first_text_height() + half_leading(&style, font_size);
    let top = match style.vertical_alignment {
        VerticalAlignment::Top => top,
        VerticalAlignment::Middle => top + (layout_box.height - composition.height()) / 2.0,
        VerticalAlignment::Bottom => top + layout_box.height - composition.height(),
    };
    log::debug!(
        "markup field laid out at {font_size}: {} blocks, {} lines",
        composition.blocks().len(),
        composition.line_count()
    );

    Ok(MarkupField {
        font_size,
        top,
        composition,
    })
}
