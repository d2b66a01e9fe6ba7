use super::breaker::{advance_of, break_cells, cells_width, is_manual_break, Cell};
use super::line::{Line, LineFragment};
use crate::fonts::FontResolver;
use crate::metrics::FontMetrics;
use crate::{LayoutError, Pt, ResolvedStyle, SegmentStyle, StyledSegment, TextStyle};

/// A segment's style with its font looked up
struct SegmentFont<'f> {
    style: ResolvedStyle,
    metrics: &'f dyn FontMetrics,
}

/// Characters collected for the paragraph currently being broken, with the index of
/// the segment each one came from
#[derive(Default)]
struct Paragraph {
    cells: Vec<Cell>,
    owners: Vec<usize>,
}

impl Paragraph {
    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.owners.clear();
    }
}

/// Wraps styled segments, where every character may use its own font, size, and
/// spacing. Break points follow the same policy as [super::LineBreaker]; a line broken
/// inside a segment continues with that segment's style.
///
/// Manual breaks inside segment text always end the line, and a segment with no text
/// is an explicit blank line.
pub struct RichSegmentSplitter<'a> {
    fonts: &'a dyn FontResolver,
    base: &'a TextStyle,
    code_ratio: f32,
}

impl<'a> RichSegmentSplitter<'a> {
    pub fn new(fonts: &'a dyn FontResolver, base: &'a TextStyle) -> Self {
        RichSegmentSplitter {
            fonts,
            base,
            code_ratio: 1.0,
        }
    }

    /// Scale segments flagged as code by `ratio`
    pub fn with_code_ratio(mut self, ratio: f32) -> Self {
        self.code_ratio = ratio;
        self
    }

    /// Resolve a segment's style against the base style, including its font. The
    /// returned style always names the concrete font it was measured with.
    pub fn resolve(&self, style: &SegmentStyle) -> Result<ResolvedStyle, LayoutError> {
        Ok(self.resolve_font(style)?.style)
    }

    fn resolve_font(&self, style: &SegmentStyle) -> Result<SegmentFont<'a>, LayoutError> {
        let mut style = self.base.resolve(style);
        let font = self.fonts.resolve(style.font_name.as_deref())?;
        style.font_name = Some(font.name.to_string());
        if style.code {
            style.font_size = style.font_size * self.code_ratio;
        }
        Ok(SegmentFont {
            style,
            metrics: font.metrics,
        })
    }

    /// The height from the top of the tallest font on `line` to its baseline, or that
    /// of the base style for a blank line
    pub fn text_height(&self, line: &Line) -> Result<Pt, LayoutError> {
        if line.fragments.is_empty() {
            let font = self.resolve_font(&SegmentStyle::default())?;
            return Ok(font.metrics.line_height(font.style.font_size));
        }
        Ok(line
            .fragments
            .iter()
            .map(|fragment| fragment.text_height)
            .fold(Pt::ZERO, Pt::max))
    }

    /// Break `segments` into lines no wider than `max_width`
    pub fn split(&self, segments: &[StyledSegment], max_width: Pt) -> Result<Vec<Line>, LayoutError> {
        let fonts = segments
            .iter()
            .map(|segment| self.resolve_font(&segment.style))
            .collect::<Result<Vec<_>, _>>()?;

        let mut lines = Vec::new();
        let mut paragraph = Paragraph::default();
        // a paragraph has been started that must be emitted, even if it stays empty
        let mut open = true;

        for (owner, segment) in segments.iter().enumerate() {
            if segment.text.is_empty() {
                if !paragraph.is_empty() {
                    self.flush(&mut paragraph, &fonts, max_width, &mut lines);
                }
                lines.push(Line::blank());
                open = false;
                continue;
            }

            let font = &fonts[owner];
            let mut chars = segment.text.chars().peekable();
            while let Some(ch) = chars.next() {
                if is_manual_break(ch) {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    self.flush(&mut paragraph, &fonts, max_width, &mut lines);
                    open = true;
                    continue;
                }
                paragraph.cells.push(Cell {
                    ch,
                    advance: advance_of(font.metrics, ch, font.style.font_size),
                    spacing: font.style.character_spacing,
                });
                paragraph.owners.push(owner);
                open = true;
            }
        }

        if open {
            self.flush(&mut paragraph, &fonts, max_width, &mut lines);
        }
        log::trace!(
            "split {} segments into {} lines at {}",
            segments.len(),
            lines.len(),
            max_width
        );
        Ok(lines)
    }

    fn flush(
        &self,
        paragraph: &mut Paragraph,
        fonts: &[SegmentFont<'_>],
        max_width: Pt,
        lines: &mut Vec<Line>,
    ) {
        let ranges = break_cells(&paragraph.cells, max_width);
        let last = ranges.len().saturating_sub(1);
        for (i, range) in ranges.into_iter().enumerate() {
            let line = build_line(
                &paragraph.cells[range.clone()],
                &paragraph.owners[range],
                fonts,
                i == last,
            );
            lines.push(line);
        }
        paragraph.clear();
    }
}

fn build_line(cells: &[Cell], owners: &[usize], fonts: &[SegmentFont<'_>], hard_break: bool) -> Line {
    if cells.is_empty() {
        return Line {
            hard_break,
            ..Line::blank()
        };
    }

    let width = cells_width(cells);
    let mut fragments: Vec<LineFragment> = Vec::new();
    let mut current_owner = None;
    let mut x = Pt::ZERO;

    for (i, (cell, &owner)) in cells.iter().zip(owners).enumerate() {
        let advance = if i == 0 {
            cell.advance
        } else {
            cell.advance + cell.spacing
        };
        match fragments.last_mut() {
            Some(fragment) if current_owner == Some(owner) => {
                fragment.text.push(cell.ch);
                fragment.width += advance;
            }
            _ => {
                let font = &fonts[owner];
                fragments.push(LineFragment {
                    text: cell.ch.to_string(),
                    style: font.style.clone(),
                    x,
                    width: advance,
                    text_height: font.metrics.line_height(font.style.font_size),
                });
                current_owner = Some(owner);
            }
        }
        x += advance;
    }

    if let [only] = fragments.as_mut_slice() {
        only.width = width;
    }

    Line {
        fragments,
        width,
        hard_break,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontSet, SingleFont};
    use crate::metrics::MonospaceMetrics;
    use crate::ConfigurationError;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    fn base() -> TextStyle {
        TextStyle {
            font_size: Pt(10.0),
            ..Default::default()
        }
    }

    #[test]
    fn plain_text_is_the_one_segment_case() {
        let font = MonospaceMetrics::default();
        let fonts = SingleFont::new("Mono", &font);
        let style = base();
        let splitter = RichSegmentSplitter::new(&fonts, &style);

        let lines = splitter
            .split(&[StyledSegment::plain("this will wrap")], Pt(20.0))
            .unwrap();
        assert_eq!(texts(&lines), vec!["this", "will", "wrap"]);
        assert!(!lines[0].hard_break);
        assert!(lines[2].hard_break);
        assert_eq!(lines[0].width, Pt(20.0));
        assert_eq!(lines[0].fragments[0].style.font_name.as_deref(), Some("Mono"));
    }

    #[test]
    fn widths_follow_each_characters_own_size() {
        let font = MonospaceMetrics::default();
        let fonts = SingleFont::new("Mono", &font);
        let style = base();
        let splitter = RichSegmentSplitter::new(&fonts, &style);

        let big = SegmentStyle {
            font_size: Some(Pt(20.0)),
            ..Default::default()
        };
        // "ab" at 5pt each, then "cd" at 10pt each
        let segments = [StyledSegment::plain("ab"), StyledSegment::new("cd", big)];
        let lines = splitter.split(&segments, Pt(25.0)).unwrap();
        assert_eq!(texts(&lines), vec!["abc", "d"]);
        assert_eq!(lines[0].fragments.len(), 2);
        assert_eq!(lines[0].fragments[1].x, Pt(10.0));
        assert_eq!(lines[0].fragments[1].width, Pt(10.0));
        // the interrupted segment's style carries onto the next line
        assert_eq!(lines[1].fragments[0].style.font_size, Pt(20.0));
        assert_eq!(lines[0].fragments[0].style.font_size, Pt(10.0));
    }

    #[test]
    fn breaks_across_segment_boundaries_at_spaces() {
        let font = MonospaceMetrics::default();
        let fonts = SingleFont::new("Mono", &font);
        let style = base();
        let splitter = RichSegmentSplitter::new(&fonts, &style);

        let segments = [
            StyledSegment::plain("one "),
            StyledSegment::new("two", SegmentStyle::bold()),
            StyledSegment::plain(" three"),
        ];
        let lines = splitter.split(&segments, Pt(40.0)).unwrap();
        assert_eq!(texts(&lines), vec!["one two", "three"]);
        assert!(lines[0].fragments[1].style.bold);
    }

    #[test]
    fn manual_breaks_and_blank_segments_make_lines() {
        let font = MonospaceMetrics::default();
        let fonts = SingleFont::new("Mono", &font);
        let style = base();
        let splitter = RichSegmentSplitter::new(&fonts, &style);

        let segments = [
            StyledSegment::plain("a\n\nb"),
            StyledSegment::plain(""),
            StyledSegment::plain("c\n"),
        ];
        let lines = splitter.split(&segments, Pt(100.0)).unwrap();
        assert_eq!(texts(&lines), vec!["a", "", "b", "", "c", ""]);
        assert!(lines.iter().all(|line| line.hard_break));

        assert_eq!(splitter.split(&[], Pt(100.0)).unwrap().len(), 1);
        assert_eq!(
            splitter.split(&[StyledSegment::plain("")], Pt(100.0)).unwrap().len(),
            1
        );
    }

    #[test]
    fn code_segments_are_scaled() {
        let font = MonospaceMetrics::default();
        let fonts = SingleFont::new("Mono", &font);
        let style = base();
        let splitter = RichSegmentSplitter::new(&fonts, &style).with_code_ratio(0.5);

        let lines = splitter
            .split(&[StyledSegment::new("abcd", SegmentStyle::code())], Pt(100.0))
            .unwrap();
        assert_eq!(lines[0].width, Pt(10.0));
        assert_eq!(lines[0].fragments[0].style.font_size, Pt(5.0));
    }

    #[test]
    fn unknown_fonts_are_a_configuration_error() {
        let fonts = FontSet::builder()
            .add("Roboto", MonospaceMetrics::default(), true)
            .build()
            .unwrap();
        let style = base();
        let splitter = RichSegmentSplitter::new(&fonts, &style);

        let segment = StyledSegment::new(
            "x",
            SegmentStyle {
                font_name: Some("Garamond".into()),
                ..Default::default()
            },
        );
        let err = splitter.split(&[segment], Pt(100.0)).err();
        assert!(matches!(
            err,
            Some(LayoutError::Configuration(ConfigurationError::UnknownFont(name))) if name == "Garamond"
        ));
    }
}
