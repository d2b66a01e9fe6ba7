use crate::metrics::{width_of_text, FontMetrics};
use crate::Pt;
use std::ops::Range;

/// Characters after which a line may wrap. Scripts without spaces have no break
/// opportunities and are split wherever they overflow.
pub fn is_breakable(ch: char) -> bool {
    matches!(ch, ' ' | '-' | '\u{2014}' | '\u{2013}')
}

/// Characters that force a new line
pub fn is_manual_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{000C}' | '\u{000B}')
}

/// Split text into paragraphs on manual breaks (`\r\n`, `\r`, `\n`, form feed, and
/// vertical tab). Consecutive breaks produce empty paragraphs.
pub fn split_manual_breaks(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if !is_manual_break(ch) {
            continue;
        }
        paragraphs.push(&text[start..i]);
        start = i + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    paragraphs.push(&text[start..]);
    paragraphs
}

/// One measured character awaiting line breaking
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cell {
    pub ch: char,
    /// Glyph advance at the character's own size
    pub advance: Pt,
    /// Character spacing of the character's own style
    pub spacing: Pt,
}

/// The advance of a single character
pub(crate) fn advance_of(metrics: &dyn FontMetrics, ch: char, size: Pt) -> Pt {
    let mut buf = [0u8; 4];
    metrics.width(ch.encode_utf8(&mut buf), size)
}

/// Width of a run of cells: the sum of advances, plus the spacing of every character
/// after the first. A lone character carries twice its spacing.
pub(crate) fn cells_width(cells: &[Cell]) -> Pt {
    match cells {
        [] => Pt::ZERO,
        [only] => only.advance + only.spacing * 2.0,
        [first, rest @ ..] => {
            first.advance
                + rest
                    .iter()
                    .map(|cell| cell.advance + cell.spacing)
                    .sum::<Pt>()
        }
    }
}

/// Index of the first character at which the growing prefix no longer fits, or `None`
/// if the whole run fits
fn over_position(cells: &[Cell], max_width: Pt) -> Option<usize> {
    let mut width = Pt::ZERO;
    for (i, cell) in cells.iter().enumerate() {
        let prefix = if i == 0 {
            width = cell.advance;
            cell.advance + cell.spacing * 2.0
        } else {
            width += cell.advance + cell.spacing;
            width
        };
        if prefix > max_width {
            return Some(i);
        }
    }
    None
}

/// How many cells to keep on the line, given the first cell that overflows
fn split_position(cells: &[Cell], over: usize) -> usize {
    // a box narrower than one character still takes one character per line
    let over = over.max(1);
    if over >= cells.len() {
        return cells.len();
    }
    if cells[over].ch == ' ' {
        return over;
    }
    match cells[..over].iter().rposition(|cell| is_breakable(cell.ch)) {
        Some(at) => at + 1,
        None => over,
    }
}

/// Break a manual-break-free run of cells into lines no wider than `max_width`,
/// returning the cell range of each line. Lines are right-trimmed and continuation
/// lines left-trimmed of whitespace. An empty run yields one empty line.
pub(crate) fn break_cells(cells: &[Cell], max_width: Pt) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;

    loop {
        let rest = &cells[start..];
        let Some(over) = over_position(rest, max_width) else {
            lines.push(start..cells.len());
            break;
        };
        if over == 0 {
            log::warn!(
                "`{}` is wider than the {} box it is laid out in",
                rest[0].ch,
                max_width
            );
        }

        let split = start + split_position(rest, over);
        let mut end = split;
        while end > start && cells[end - 1].ch.is_whitespace() {
            end -= 1;
        }
        let mut next = split;
        while next < cells.len() && cells[next].ch.is_whitespace() {
            next += 1;
        }

        if next == start {
            // no progress: keep the remainder as one overflowing line
            lines.push(start..cells.len());
            break;
        }
        lines.push(start..end);
        if next >= cells.len() {
            break;
        }
        start = next;
    }

    lines
}

/// Wraps plain text set in a single font, size, and character spacing
#[derive(Clone, Copy)]
pub struct LineBreaker<'a> {
    metrics: &'a dyn FontMetrics,
    size: Pt,
    spacing: Pt,
}

impl<'a> LineBreaker<'a> {
    pub fn new(metrics: &'a dyn FontMetrics, size: Pt, spacing: Pt) -> Self {
        LineBreaker {
            metrics,
            size,
            spacing,
        }
    }

    /// The width of `text` in this breaker's font, size, and spacing
    pub fn width(&self, text: &str) -> Pt {
        width_of_text(text, self.metrics, self.size, self.spacing)
    }

    fn cells(&self, line: &str) -> Vec<Cell> {
        line.chars()
            .map(|ch| Cell {
                ch,
                advance: advance_of(self.metrics, ch, self.size),
                spacing: self.spacing,
            })
            .collect()
    }

    /// Wrap a single line of text that contains no manual breaks
    pub fn split_line(&self, line: &str, max_width: Pt) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let cells = self.cells(line);
        break_cells(&cells, max_width)
            .into_iter()
            .map(|range| chars[range].iter().collect())
            .collect()
    }

    /// Split text on its manual breaks, then wrap each paragraph
    pub fn split_text(&self, text: &str, max_width: Pt) -> Vec<String> {
        split_manual_breaks(text)
            .into_iter()
            .flat_map(|paragraph| self.split_line(paragraph, max_width))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MonospaceMetrics;

    const FONT: MonospaceMetrics = MonospaceMetrics {
        units_per_em: 1000.0,
        advance: 500.0,
        ascender: 800.0,
        descender: -200.0,
    };

    fn breaker() -> LineBreaker<'static> {
        // 5pt per character
        LineBreaker::new(&FONT, Pt(10.0), Pt(0.0))
    }

    #[test]
    fn wraps_at_spaces() {
        assert_eq!(
            breaker().split_line("this will wrap", Pt(20.0)),
            vec!["this", "will", "wrap"]
        );
    }

    #[test]
    fn hard_splits_unbreakable_text() {
        assert_eq!(
            breaker().split_line("thiswillbecut", Pt(25.0)),
            vec!["thisw", "illbe", "cut"]
        );
    }

    #[test]
    fn breaks_after_hyphens_and_dashes() {
        assert_eq!(
            breaker().split_line("well-known fact", Pt(30.0)),
            vec!["well-", "known", "fact"]
        );
        assert_eq!(
            breaker().split_line("a\u{2014}bcdef", Pt(20.0)),
            vec!["a\u{2014}", "bcde", "f"]
        );
    }

    #[test]
    fn fitting_text_is_untouched() {
        let text = "  leading and trailing  ";
        let width = breaker().width(text);
        assert_eq!(breaker().split_line(text, width), vec![text]);
    }

    #[test]
    fn narrow_boxes_take_one_character_per_line() {
        assert_eq!(breaker().split_line("abc", Pt(1.0)), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(breaker().split_line("", Pt(20.0)), vec![""]);
        assert_eq!(breaker().split_text("a\n\nb", Pt(20.0)), vec!["a", "", "b"]);
    }

    #[test]
    fn recognises_every_manual_break() {
        assert_eq!(
            split_manual_breaks("a\r\nb\rc\nd\u{000C}e\u{000B}f"),
            vec!["a", "b", "c", "d", "e", "f"]
        );
        assert_eq!(split_manual_breaks("end\n"), vec!["end", ""]);
    }

    #[test]
    fn spacing_counts_towards_the_break() {
        // 5pt glyphs plus 1pt between characters: "abc" is 17pt, "abcd" 23pt
        let breaker = LineBreaker::new(&FONT, Pt(10.0), Pt(1.0));
        assert_eq!(breaker.split_line("abcd", Pt(20.0)), vec!["abc", "d"]);
        assert_eq!(breaker.width("abc"), Pt(17.0));
    }

    #[test]
    fn lone_characters_carry_double_spacing() {
        let cells = [Cell {
            ch: 'a',
            advance: Pt(5.0),
            spacing: Pt(1.0),
        }];
        assert_eq!(cells_width(&cells), Pt(7.0));
        assert_eq!(cells_width(&[]), Pt(0.0));
    }
}
