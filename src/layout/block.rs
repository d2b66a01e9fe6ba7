use super::breaker::split_manual_breaks;
use super::fit::{FitMeasure, FitProbe};
use super::line::{Line, LineRange};
use super::splitter::RichSegmentSplitter;
use super::surface::{
    align_line, paint_line, DrawCommand, NullSurface, PaintOptions, RectCommand, RuleCommand,
    Surface, TextCommand,
};
use crate::fonts::FontResolver;
use crate::markup::{ContentBlock, ListMarker};
use crate::{
    Alignment, FitAxis, LayoutConfig, LayoutError, Pt, ResolvedStyle, SegmentStyle,
    StyledSegment, TextStyle,
};
use std::slice;

const UNBOUNDED: Pt = Pt(f32::INFINITY);

/// One list item, drawn as a single line behind its marker
#[derive(Debug, Clone, PartialEq)]
pub struct ListLine {
    pub level: usize,
    /// `1.`, `2.`, ... for ordered items, the configured bullet otherwise
    pub marker: String,
    pub line: Line,
}

/// A [ContentBlock] with its lines measured
#[derive(Debug, Clone, PartialEq)]
pub enum BlockLayout {
    Paragraph {
        lines: Vec<Line>,
    },
    Heading {
        level: u8,
        size: Pt,
        lines: Vec<Line>,
    },
    Code {
        size: Pt,
        text_height: Pt,
        lines: Vec<Line>,
    },
    Blockquote {
        lines: Vec<Line>,
    },
    List {
        items: Vec<ListLine>,
    },
    Table {
        columns: usize,
        header: Vec<Line>,
        rows: Vec<Vec<Line>>,
    },
}

impl BlockLayout {
    /// Number of lines the block contributes to pagination. A table counts its header
    /// row and each data row as one line.
    pub fn line_count(&self) -> usize {
        match self {
            BlockLayout::Paragraph { lines }
            | BlockLayout::Heading { lines, .. }
            | BlockLayout::Code { lines, .. }
            | BlockLayout::Blockquote { lines } => lines.len(),
            BlockLayout::List { items } => items.len(),
            BlockLayout::Table { columns: 0, .. } => 0,
            BlockLayout::Table { rows, .. } => rows.len() + 1,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            BlockLayout::Paragraph { .. } => "paragraph",
            BlockLayout::Heading { .. } => "heading",
            BlockLayout::Code { .. } => "code",
            BlockLayout::Blockquote { .. } => "blockquote",
            BlockLayout::List { .. } => "list",
            BlockLayout::Table { .. } => "table",
        }
    }
}

/// Measures markup blocks against a box width. Every call to [BlockComposer::measure]
/// is a fresh pass that produces an immutable [Composition].
pub struct BlockComposer<'a> {
    fonts: &'a dyn FontResolver,
    base: &'a TextStyle,
    config: &'a LayoutConfig,
    width: Pt,
}

impl<'a> BlockComposer<'a> {
    pub fn new(
        fonts: &'a dyn FontResolver,
        base: &'a TextStyle,
        config: &'a LayoutConfig,
        width: Pt,
    ) -> Self {
        BlockComposer {
            fonts,
            base,
            config,
            width,
        }
    }

    fn splitter<'s>(&self, style: &'s TextStyle) -> RichSegmentSplitter<'s>
    where
        'a: 's,
    {
        RichSegmentSplitter::new(self.fonts, style).with_code_ratio(self.config.code_font_ratio)
    }

    /// Lay out every block
    pub fn measure(&self, blocks: &[ContentBlock]) -> Result<Composition, LayoutError> {
        let splitter = self.splitter(self.base);
        let base_style = splitter.resolve(&SegmentStyle::default())?;
        let base_text_height = splitter.text_height(&Line::blank())?;

        let mut layouts = Vec::with_capacity(blocks.len());
        for block in blocks {
            let layout = self.measure_block(block)?;
            log::trace!("{} block: {} lines", layout.kind(), layout.line_count());
            layouts.push(layout);
        }

        Ok(Composition {
            blocks: layouts,
            config: self.config.clone(),
            width: self.width,
            base_style,
            alignment: self.base.alignment,
            base_text_height,
        })
    }

    fn measure_block(&self, block: &ContentBlock) -> Result<BlockLayout, LayoutError> {
        let splitter = self.splitter(self.base);
        let layout = match block {
            ContentBlock::Paragraph(segments) => BlockLayout::Paragraph {
                lines: splitter.split(segments, self.width)?,
            },
            ContentBlock::Heading { level, segments } => {
                let size = self.base.font_size * self.config.heading_multiplier(*level);
                let style = self.base.with_font_size(size);
                BlockLayout::Heading {
                    level: *level,
                    size,
                    lines: self.splitter(&style).split(segments, self.width)?,
                }
            }
            ContentBlock::Code { text, .. } => {
                let tab = " ".repeat(self.config.tab_width);
                let mut lines = Vec::new();
                for source in split_manual_breaks(text) {
                    if source.is_empty() {
                        continue;
                    }
                    let segment = StyledSegment::new(source.replace('\t', &tab), SegmentStyle::code());
                    lines.push(first_line(splitter.split(slice::from_ref(&segment), UNBOUNDED)?));
                }
                let text_height = lines
                    .iter()
                    .flat_map(|line| line.fragments.iter())
                    .map(|fragment| fragment.text_height)
                    .fold(Pt::ZERO, Pt::max);
                BlockLayout::Code {
                    size: self.base.font_size * self.config.code_font_ratio,
                    text_height,
                    lines,
                }
            }
            ContentBlock::Blockquote(segments) => {
                let quote = SegmentStyle::coloured(self.config.blockquote_text);
                let quoted: Vec<StyledSegment> = segments
                    .iter()
                    .map(|segment| {
                        StyledSegment::new(segment.text.clone(), quote.merged(&segment.style))
                    })
                    .collect();
                let width = (self.width - self.config.blockquote_padding).max(Pt::ZERO);
                BlockLayout::Blockquote {
                    lines: splitter.split(&quoted, width)?,
                }
            }
            ContentBlock::List(items) => {
                let mut lines = Vec::with_capacity(items.len());
                for item in items {
                    let marker = match item.marker {
                        ListMarker::Ordered(n) => format!("{n}."),
                        ListMarker::Bullet => self.config.list_bullet.clone(),
                    };
                    lines.push(ListLine {
                        level: item.level,
                        marker,
                        line: first_line(splitter.split(&item.segments, UNBOUNDED)?),
                    });
                }
                BlockLayout::List { items: lines }
            }
            ContentBlock::Table(table) => {
                let columns = table.headers.len();
                let header = table
                    .headers
                    .iter()
                    .map(|cell| Ok(first_line(splitter.split(cell, UNBOUNDED)?)))
                    .collect::<Result<Vec<_>, LayoutError>>()?;
                let mut rows = Vec::with_capacity(table.rows.len());
                for row in table.rows.iter() {
                    let mut cells = Vec::with_capacity(columns);
                    for column in 0..columns {
                        cells.push(match row.get(column) {
                            Some(cell) => first_line(splitter.split(cell, UNBOUNDED)?),
                            None => Line::blank(),
                        });
                    }
                    rows.push(cells);
                }
                BlockLayout::Table {
                    columns,
                    header,
                    rows,
                }
            }
        };
        Ok(layout)
    }
}

fn first_line(lines: Vec<Line>) -> Line {
    lines.into_iter().next().unwrap_or_else(Line::blank)
}

/// Where a render pass ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOutcome {
    /// The vertical cursor after the last block, in the same space as the start
    pub end: Pt,
    pub lines_rendered: usize,
    /// Baseline of the first line that was drawn, if any was
    pub first_baseline: Option<Pt>,
}

/// Measured blocks, ready to be drawn in whole or one page-sized window at a time.
///
/// Lines are numbered globally in block order. Each block also owns the index right
/// after its lines for the gap below it, which is only added when that index falls in
/// the rendered [LineRange]. Lines outside the range are not drawn but still move the
/// cursor, so a later page continues where the previous one stopped.
#[derive(Debug, Clone)]
pub struct Composition {
    blocks: Vec<BlockLayout>,
    config: LayoutConfig,
    width: Pt,
    base_style: ResolvedStyle,
    alignment: Alignment,
    base_text_height: Pt,
}

struct Pass<'s> {
    surface: &'s mut dyn Surface,
    range: LineRange,
    y: Pt,
    index: usize,
    lines_rendered: usize,
    first_baseline: Option<Pt>,
}

impl Composition {
    pub fn blocks(&self) -> &[BlockLayout] {
        &self.blocks
    }

    /// Number of lines drawn by a full render
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(BlockLayout::line_count).sum()
    }

    /// Number of global indices, counting the gap slot after every block
    pub fn index_count(&self) -> usize {
        self.blocks.iter().map(|block| block.line_count() + 1).sum()
    }

    /// Height from the top of the base font to its baseline, which is where the first
    /// baseline sits below the top of the box
    pub fn first_text_height(&self) -> Pt {
        self.base_text_height
    }

    /// Height of the full composition, from the first baseline to the end of the gap
    /// after the last block
    pub fn height(&self) -> Pt {
        let outcome = self.render(&mut NullSurface, Pt::ZERO, LineRange::all());
        outcome.end
    }

    /// The widest extent of any line, including indents, markers, and padding. For a
    /// composition measured at an unbounded width, this is the natural content width.
    pub fn width(&self) -> Pt {
        let padding = |lines: &[Line], by: Pt| by + widest(lines);
        self.blocks
            .iter()
            .map(|block| match block {
                BlockLayout::Paragraph { lines } | BlockLayout::Heading { lines, .. } => {
                    widest(lines)
                }
                BlockLayout::Code { lines, .. } => padding(lines, self.config.code_padding),
                BlockLayout::Blockquote { lines } => {
                    padding(lines, self.config.blockquote_padding)
                }
                BlockLayout::List { items } => items
                    .iter()
                    .map(|item| {
                        self.config.list_indent * item.level as f32
                            + self.config.list_marker_width
                            + item.line.width
                    })
                    .fold(Pt::ZERO, Pt::max),
                BlockLayout::Table {
                    columns,
                    header,
                    rows,
                } => (0..*columns)
                    .map(|column| {
                        let cells = std::iter::once(&header[column])
                            .chain(rows.iter().map(|row| &row[column]));
                        cells.map(|cell| cell.width).fold(Pt::ZERO, Pt::max)
                            + self.config.table_cell_padding * 2.0
                    })
                    .sum::<Pt>(),
            })
            .fold(Pt::ZERO, Pt::max)
    }

    /// Baseline of global line `index` relative to the start of a render pass that
    /// begins at that line, for positioning a page that continues the content
    pub fn offset_of_line(&self, index: usize) -> Option<Pt> {
        self.render(&mut NullSurface, Pt::ZERO, LineRange::new(index, usize::MAX))
            .first_baseline
    }

    /// Split the composition into consecutive windows whose content fits in
    /// `page_height`. A window always holds at least one line, even one too tall for
    /// the page, and a gap that does not fit stays at the bottom of its page.
    pub fn paginate(&self, page_height: Pt) -> Vec<LineRange> {
        let mut slots = Vec::with_capacity(self.index_count());
        for block in self.blocks.iter() {
            slots.extend(self.advances(block).into_iter().map(|advance| (advance, false)));
            slots.push((self.gap(block), true));
        }

        let mut pages = Vec::new();
        let mut start = 0;
        let mut used = Pt::ZERO;
        for (index, &(advance, is_gap)) in slots.iter().enumerate() {
            if index > start && used + advance > page_height && !is_gap {
                pages.push(LineRange::new(start, index - 1));
                start = index;
                used = Pt::ZERO;
            }
            used += advance;
        }
        if start < slots.len() {
            pages.push(LineRange::new(start, slots.len() - 1));
        }
        pages
    }

    /// Draw the lines inside `range` with the first baseline at `start`
    pub fn render(&self, surface: &mut dyn Surface, start: Pt, range: LineRange) -> RenderOutcome {
        let mut pass = Pass {
            surface,
            range,
            y: start,
            index: 0,
            lines_rendered: 0,
            first_baseline: None,
        };

        for block in self.blocks.iter() {
            if range.is_beyond(pass.index) {
                break;
            }
            let count = block.line_count();
            self.render_block(block, &mut pass);
            if range.contains(pass.index + count) {
                pass.y += self.gap(block);
            }
            pass.index += count + 1;
        }

        RenderOutcome {
            end: pass.y,
            lines_rendered: pass.lines_rendered,
            first_baseline: pass.first_baseline,
        }
    }

    fn gap(&self, block: &BlockLayout) -> Pt {
        let fraction = match block {
            BlockLayout::Paragraph { .. } => self.config.paragraph_gap,
            BlockLayout::Heading { .. } => self.config.heading_gap,
            BlockLayout::Code { .. } => self.config.code_gap,
            BlockLayout::Blockquote { .. } => self.config.blockquote_gap,
            BlockLayout::List { .. } => self.config.list_gap,
            BlockLayout::Table { .. } => self.config.table_gap,
        };
        self.base_style.font_size * fraction
    }

    /// How far each of the block's lines moves the cursor. Body lines advance by the
    /// base size whatever sizes their runs use; headings and code use their own size.
    fn advances(&self, block: &BlockLayout) -> Vec<Pt> {
        let advance = self.base_style.line_advance();
        match block {
            BlockLayout::Paragraph { lines } | BlockLayout::Blockquote { lines } => {
                vec![advance; lines.len()]
            }
            BlockLayout::Heading { size, lines, .. } | BlockLayout::Code { size, lines, .. } => {
                vec![*size * self.base_style.line_height; lines.len()]
            }
            BlockLayout::List { items } => {
                vec![advance + self.config.list_item_spacing; items.len()]
            }
            BlockLayout::Table { .. } => vec![self.row_height(); block.line_count()],
        }
    }

    fn row_height(&self) -> Pt {
        self.base_style.line_advance() + self.config.table_cell_padding * 2.0
    }

    fn text_height(&self, line: &Line) -> Pt {
        if line.fragments.is_empty() {
            return self.base_text_height;
        }
        line.fragments
            .iter()
            .map(|fragment| fragment.text_height)
            .fold(Pt::ZERO, Pt::max)
    }

    fn render_block(&self, block: &BlockLayout, pass: &mut Pass<'_>) {
        let advances = self.advances(block);
        let top = pass.y;
        let baseline = |k: usize| top + advances[..k].iter().copied().sum::<Pt>();
        let visible: Vec<usize> = (0..advances.len())
            .filter(|k| pass.range.contains(pass.index + k))
            .collect();

        if let (Some(&first), Some(&last)) = (visible.first(), visible.last()) {
            let span: Pt = advances[first..=last].iter().copied().sum();
            self.decorate(block, &mut *pass.surface, baseline(first), span, (first, last));
        }
        for &k in visible.iter() {
            let y = baseline(k);
            self.draw_line(block, k, y, &mut *pass.surface);
            pass.lines_rendered += 1;
            pass.first_baseline.get_or_insert(y);
        }

        pass.y = top + advances.iter().copied().sum::<Pt>();
    }

    /// Backgrounds and rules that span every visible line of a block, drawn first so
    /// that text sits on top of them
    fn decorate(
        &self,
        block: &BlockLayout,
        surface: &mut dyn Surface,
        first_baseline: Pt,
        span: Pt,
        (first, last): (usize, usize),
    ) {
        match block {
            BlockLayout::Code {
                text_height, lines, ..
            } => {
                let padding = self.config.code_padding;
                let top = if first == 0 { padding } else { Pt::ZERO };
                let bottom = if last + 1 == lines.len() {
                    padding
                } else {
                    Pt::ZERO
                };
                surface.draw(DrawCommand::Rect(RectCommand {
                    x: Pt::ZERO,
                    y: first_baseline - *text_height - top,
                    width: self.width,
                    height: span + top + bottom,
                    colour: self.config.code_background,
                }));
            }
            BlockLayout::Blockquote { lines } => {
                surface.draw(DrawCommand::Rule(RuleCommand {
                    x: Pt::ZERO,
                    y: first_baseline - self.text_height(&lines[first]),
                    length: span,
                    thickness: self.config.blockquote_rule_width,
                    horizontal: false,
                    colour: self.config.rule_colour,
                }));
            }
            BlockLayout::Table { header, .. } if first == 0 => {
                let th = header
                    .iter()
                    .map(|cell| self.text_height(cell))
                    .fold(Pt::ZERO, Pt::max);
                surface.draw(DrawCommand::Rect(RectCommand {
                    x: Pt::ZERO,
                    y: first_baseline - th,
                    width: self.table_width(),
                    height: self.row_height(),
                    colour: self.config.table_header_background,
                }));
            }
            _ => {}
        }
    }

    fn table_width(&self) -> Pt {
        (self.width - self.config.table_cell_padding * 2.0).max(Pt::ZERO)
    }

    fn draw_line(&self, block: &BlockLayout, k: usize, y: Pt, surface: &mut dyn Surface) {
        let plain = PaintOptions {
            bold: false,
            code_backgrounds: true,
        };
        match block {
            BlockLayout::Paragraph { lines } => {
                self.draw_aligned(surface, &lines[k], Pt::ZERO, self.width, y, plain);
            }
            BlockLayout::Heading { lines, .. } => {
                let bold = PaintOptions {
                    bold: true,
                    ..plain
                };
                self.draw_aligned(surface, &lines[k], Pt::ZERO, self.width, y, bold);
            }
            BlockLayout::Blockquote { lines } => {
                let padding = self.config.blockquote_padding;
                let width = (self.width - padding).max(Pt::ZERO);
                self.draw_aligned(surface, &lines[k], padding, width, y, plain);
            }
            BlockLayout::Code { lines, .. } => {
                let options = PaintOptions {
                    code_backgrounds: false,
                    ..plain
                };
                let x = self.config.code_padding;
                paint_line(surface, &lines[k], x, y, Pt::ZERO, options, &self.config);
            }
            BlockLayout::List { items } => {
                let item = &items[k];
                let x = self.config.list_indent * item.level as f32;
                let style = item
                    .line
                    .fragments
                    .first()
                    .map(|fragment| fragment.style.clone())
                    .unwrap_or_else(|| self.base_style.clone());
                surface.draw(DrawCommand::Text(TextCommand {
                    x,
                    baseline_y: y,
                    text: item.marker.clone(),
                    style,
                    grapheme_spacing: Pt::ZERO,
                }));
                let x = x + self.config.list_marker_width;
                paint_line(surface, &item.line, x, y, Pt::ZERO, plain, &self.config);
            }
            BlockLayout::Table {
                columns,
                header,
                rows,
            } => {
                let (cells, options) = match k {
                    0 => (header, PaintOptions { bold: true, ..plain }),
                    _ => (&rows[k - 1], plain),
                };
                let th = cells
                    .iter()
                    .map(|cell| self.text_height(cell))
                    .fold(Pt::ZERO, Pt::max);
                let padding = self.config.table_cell_padding;
                let cell_width = self.table_width() / *columns as f32;
                for (column, cell) in cells.iter().enumerate() {
                    let x = cell_width * column as f32 + padding;
                    paint_line(surface, cell, x, y + padding, Pt::ZERO, options, &self.config);
                }
                surface.draw(DrawCommand::Rule(RuleCommand {
                    x: Pt::ZERO,
                    y: y - th + self.row_height(),
                    length: self.table_width(),
                    thickness: self.config.table_rule_width,
                    horizontal: true,
                    colour: self.config.rule_colour,
                }));
            }
        }
    }

    fn draw_aligned(
        &self,
        surface: &mut dyn Surface,
        line: &Line,
        x: Pt,
        width: Pt,
        y: Pt,
        options: PaintOptions,
    ) {
        let (offset, spacing) = align_line(line, width, self.alignment);
        paint_line(surface, line, x + offset, y, spacing, options, &self.config);
    }
}

fn widest(lines: &[Line]) -> Pt {
    lines.iter().map(|line| line.width).fold(Pt::ZERO, Pt::max)
}

/// Probes markup content: every measurement is a complete composer pass at the
/// candidate size
pub struct MarkupProbe<'a> {
    fonts: &'a dyn FontResolver,
    base: &'a TextStyle,
    config: &'a LayoutConfig,
    blocks: &'a [ContentBlock],
    box_width: Pt,
}

impl<'a> MarkupProbe<'a> {
    pub fn new(
        fonts: &'a dyn FontResolver,
        base: &'a TextStyle,
        config: &'a LayoutConfig,
        blocks: &'a [ContentBlock],
        box_width: Pt,
    ) -> Self {
        MarkupProbe {
            fonts,
            base,
            config,
            blocks,
            box_width,
        }
    }
}

impl FitProbe for MarkupProbe<'_> {
    fn measure(&self, size: Pt, axis: FitAxis) -> Result<FitMeasure, LayoutError> {
        let style = self.base.with_font_size(size);
        let wrapped = BlockComposer::new(self.fonts, &style, self.config, self.box_width)
            .measure(self.blocks)?;
        let width = match axis {
            FitAxis::Vertical => wrapped.width(),
            FitAxis::Horizontal => BlockComposer::new(self.fonts, &style, self.config, UNBOUNDED)
                .measure(self.blocks)?
                .width(),
        };
        Ok(FitMeasure {
            width,
            height: wrapped.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::SingleFont;
    use crate::layout::RecordingSurface;
    use crate::markup::parse_blocks;
    use crate::metrics::MonospaceMetrics;

    const FONT: MonospaceMetrics = MonospaceMetrics {
        units_per_em: 1000.0,
        advance: 500.0,
        ascender: 800.0,
        descender: -200.0,
    };

    fn style() -> TextStyle {
        TextStyle {
            font_size: Pt(10.0),
            ..Default::default()
        }
    }

    fn compose<'a>(
        fonts: &'a SingleFont<'a>,
        style: &'a TextStyle,
        config: &'a LayoutConfig,
        markup: &str,
        width: f32,
    ) -> Composition {
        BlockComposer::new(fonts, style, config, Pt(width))
            .measure(&parse_blocks(markup))
            .expect("layout")
    }

    #[test]
    fn paragraphs_wrap_and_headings_scale() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let composition = compose(&fonts, &style, &config, "# Title\n\nthis will wrap", 20.0);

        match &composition.blocks()[0] {
            BlockLayout::Heading { size, lines, .. } => {
                assert_eq!(*size, Pt(20.0));
                // 10pt per character at twice the base size
                assert_eq!(lines.len(), 3);
            }
            other => panic!("expected a heading, got {other:?}"),
        }
        match &composition.blocks()[1] {
            BlockLayout::Paragraph { lines } => assert_eq!(lines.len(), 3),
            other => panic!("expected a paragraph, got {other:?}"),
        }
        assert_eq!(composition.line_count(), 6);
        assert_eq!(composition.index_count(), 8);
    }

    #[test]
    fn code_keeps_its_lines_unwrapped() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let composition = compose(
            &fonts,
            &style,
            &config,
            "```rust\nfn main() {\n\n\tbody();\n}\n```",
            20.0,
        );
        match &composition.blocks()[0] {
            BlockLayout::Code { size, lines, .. } => {
                assert_eq!(*size, Pt(8.75));
                let texts: Vec<String> = lines.iter().map(Line::text).collect();
                assert_eq!(texts, vec!["fn main() {", "    body();", "}"]);
            }
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn full_render_draws_every_counted_line() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let markup = "# Heading\n\nSome text here\n\n- one\n- two\n\n> quoted\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n```\ncode\n```";
        let composition = compose(&fonts, &style, &config, markup, 100.0);

        let mut surface = RecordingSurface::new();
        let outcome = composition.render(&mut surface, Pt(8.0), LineRange::all());
        assert_eq!(outcome.lines_rendered, composition.line_count());
        assert_eq!(outcome.first_baseline, Some(Pt(8.0)));
        assert!((outcome.end - Pt(8.0) - composition.height()).abs() < Pt(1e-3));
    }

    #[test]
    fn windows_still_advance_past_hidden_lines() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let composition = compose(&fonts, &style, &config, "aaaa bbbb cccc dddd", 20.0);

        let mut surface = RecordingSurface::new();
        let outcome = composition.render(&mut surface, Pt(0.0), LineRange::new(2, 3));
        let texts: Vec<&str> = surface.texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["cccc", "dddd"]);
        assert_eq!(outcome.lines_rendered, 2);
        assert_eq!(outcome.first_baseline, Some(Pt(20.0)));
        assert_eq!(composition.offset_of_line(2), Some(Pt(20.0)));
        // the gap slot after the paragraph is outside the window
        assert_eq!(outcome.end, Pt(40.0));
    }

    #[test]
    fn body_lines_advance_by_the_base_size() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        // the first paragraph is set entirely in the smaller code size
        let composition = compose(&fonts, &style, &config, "`code`\n\nnext", 100.0);

        let mut surface = RecordingSurface::new();
        composition.render(&mut surface, Pt(0.0), LineRange::all());
        let next = surface.texts().find(|t| t.text == "next").map(|t| t.baseline_y);
        // one 10pt line and the 3pt paragraph gap
        assert!(next.is_some_and(|y| (y - Pt(13.0)).abs() < Pt(1e-4)));
    }

    #[test]
    fn pages_partition_the_content() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let composition = compose(&fonts, &style, &config, "aaaa bbbb cccc dddd\n\neeee", 20.0);

        let pages = composition.paginate(Pt(25.0));
        assert_eq!(
            pages,
            vec![
                LineRange::new(0, 1),
                LineRange::new(2, 4),
                LineRange::new(5, 6),
            ]
        );
        let drawn: usize = pages
            .iter()
            .map(|&range| {
                composition
                    .render(&mut NullSurface, Pt::ZERO, range)
                    .lines_rendered
            })
            .sum();
        assert_eq!(drawn, composition.line_count());
    }

    #[test]
    fn lists_and_tables_are_decorated() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let composition = compose(
            &fonts,
            &style,
            &config,
            "1. first\n  - nested\n\n| h1 | h2 |\n|---|---|\n| a | b |",
            200.0,
        );

        let mut surface = RecordingSurface::new();
        composition.render(&mut surface, Pt(10.0), LineRange::all());
        let texts: Vec<(&str, Pt)> = surface.texts().map(|t| (t.text.as_str(), t.x)).collect();
        assert_eq!(texts[0], ("1.", Pt(0.0)));
        assert_eq!(texts[1], ("first", Pt(15.0)));
        assert_eq!(texts[2], ("\u{2022}", Pt(15.0)));
        assert_eq!(texts[3], ("nested", Pt(30.0)));

        // header background, then a rule under each row
        assert_eq!(surface.rects().count(), 1);
        assert_eq!(surface.rules().count(), 2);
        // header cells are drawn twice to embolden them
        assert_eq!(surface.texts().filter(|t| t.text == "h1").count(), 2);
        assert_eq!(surface.texts().filter(|t| t.text == "a").count(), 1);
    }

    #[test]
    fn natural_width_includes_markers_and_padding() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let composition = compose(&fonts, &style, &config, "- abcd\n\n> ab", f32::INFINITY);
        // marker width 15 plus 20 for "abcd"
        assert_eq!(composition.width(), Pt(35.0));
    }

    #[test]
    fn markup_probe_measures_complete_passes() {
        let fonts = SingleFont::new("Mono", &FONT);
        let (style, config) = (style(), LayoutConfig::default());
        let blocks = parse_blocks("this will wrap");
        let probe = MarkupProbe::new(&fonts, &style, &config, &blocks, Pt(20.0));

        let vertical = probe.measure(Pt(10.0), FitAxis::Vertical).unwrap();
        assert_eq!(vertical.width, Pt(20.0));
        // three lines and the paragraph gap
        assert!((vertical.height - Pt(33.0)).abs() < Pt(1e-4));
        let horizontal = probe.measure(Pt(10.0), FitAxis::Horizontal).unwrap();
        assert_eq!(horizontal.width, Pt(70.0));
    }
}
