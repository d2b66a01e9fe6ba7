use crate::{Pt, ResolvedStyle};

/// A run of characters within one [Line] that share a resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct LineFragment {
    pub text: String,
    pub style: ResolvedStyle,
    /// Offset of the fragment from the start of its line
    pub x: Pt,
    pub width: Pt,
    /// Height from the top of the fragment's font to its baseline
    pub text_height: Pt,
}

/// One laid out line of text. Its width never exceeds the width it was broken against,
/// unless a single character on its own is already wider.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Line {
    pub fragments: Vec<LineFragment>,
    pub width: Pt,
    /// The line ends its paragraph, either at a manual break or at the end of the
    /// content. Justified text leaves such lines ragged.
    pub hard_break: bool,
}

impl Line {
    /// A blank line, as produced by an empty paragraph or an explicit blank-line marker
    pub fn blank() -> Line {
        Line {
            fragments: Vec::new(),
            width: Pt::ZERO,
            hard_break: true,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|fragment| fragment.text.is_empty())
    }

    /// The line's text with styling dropped
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect()
    }
}

/// An inclusive window of global line indices. Only lines inside the window are drawn,
/// but every line still advances the vertical cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        LineRange { start, end }
    }

    /// A window covering everything
    pub fn all() -> Self {
        LineRange {
            start: 0,
            end: usize::MAX,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// Every index from `index` onwards lies past the window
    pub fn is_beyond(&self, index: usize) -> bool {
        index > self.end
    }
}

impl Default for LineRange {
    fn default() -> Self {
        LineRange::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_inclusive() {
        let range = LineRange::new(2, 4);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
        assert!(range.is_beyond(5));
        assert!(!range.is_beyond(4));
        assert!(LineRange::all().contains(1_000_000));
    }

    #[test]
    fn blank_lines_have_no_size() {
        let line = Line::blank();
        assert!(line.is_blank());
        assert!(line.hard_break);
        assert!(line.fragments.is_empty());
        assert_eq!(line.text(), "");
    }
}
