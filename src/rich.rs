use crate::{LayoutError, SegmentStyle};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A contiguous run of text sharing one set of style overrides
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StyledSegment {
    pub text: String,
    pub style: SegmentStyle,
}

impl StyledSegment {
    pub fn new(text: impl Into<String>, style: SegmentStyle) -> Self {
        StyledSegment {
            text: text.into(),
            style,
        }
    }

    /// A segment with no overrides, i.e. in the field's base style
    pub fn plain(text: impl Into<String>) -> Self {
        StyledSegment::new(text, SegmentStyle::default())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A run of `len` characters starting at character index `start`, all sharing `style`.
/// A span with `len == 0` is an explicit blank-line marker.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpan {
    pub start: usize,
    pub len: usize,
    pub style: SegmentStyle,
}

impl StyleSpan {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Field content with per-character styling, stored as a backing character array plus
/// run-length style spans. Adjacent spans with identical styles are always merged, so
/// content built one character at a time collapses to as few runs as its styling allows.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RichContent {
    chars: Vec<char>,
    spans: Vec<StyleSpan>,
}

#[derive(Serialize, Deserialize)]
struct LetterRecord {
    letter: String,
    #[serde(default)]
    style: SegmentStyle,
}

impl RichContent {
    pub fn new() -> RichContent {
        RichContent::default()
    }

    /// Content in the field's base style
    pub fn from_plain(text: &str) -> RichContent {
        let mut content = RichContent::new();
        content.push(text, SegmentStyle::default());
        content
    }

    pub fn from_segments<I>(segments: I) -> RichContent
    where
        I: IntoIterator<Item = StyledSegment>,
    {
        let mut content = RichContent::new();
        for segment in segments {
            content.push(&segment.text, segment.style);
        }
        content
    }

    /// Parse a per-character style record array, e.g.
    /// `[{"letter": "a", "style": {"fontSize": 12}}]`. Any style key a record leaves out
    /// is inherited from the field's base style when the content is laid out.
    pub fn from_letter_records(json: &str) -> Result<RichContent, LayoutError> {
        let records: Vec<LetterRecord> =
            serde_json::from_str(json).map_err(LayoutError::StyleRecords)?;
        let mut content = RichContent::new();
        for record in records {
            content.push(&record.letter, record.style);
        }
        Ok(content)
    }

    /// Write the content back out as one style record per character
    pub fn to_letter_records(&self) -> Result<String, LayoutError> {
        let mut records = Vec::with_capacity(self.chars.len());
        for span in self.spans.iter() {
            if span.len == 0 {
                records.push(LetterRecord {
                    letter: String::new(),
                    style: span.style.clone(),
                });
                continue;
            }
            for ch in &self.chars[span.start..span.end()] {
                records.push(LetterRecord {
                    letter: ch.to_string(),
                    style: span.style.clone(),
                });
            }
        }
        serde_json::to_string(&records).map_err(LayoutError::StyleRecords)
    }

    /// Append `text` in `style`. Empty text appends a blank-line marker.
    pub fn push(&mut self, text: &str, style: SegmentStyle) {
        let start = self.chars.len();
        self.chars.extend(text.chars());
        let len = self.chars.len() - start;

        if len > 0 {
            if let Some(last) = self.spans.last_mut() {
                if last.len > 0 && last.style == style {
                    last.len += len;
                    return;
                }
            }
        }
        self.spans.push(StyleSpan { start, len, style });
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.spans.is_empty()
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    /// The content with all styling dropped
    pub fn plain_text(&self) -> String {
        let mut text = String::with_capacity(self.chars.len());
        for span in self.spans.iter() {
            if span.len == 0 {
                text.push('\n');
            } else {
                text.extend(&self.chars[span.start..span.end()]);
            }
        }
        text
    }

    /// The style of the character at `index`
    pub fn style_at(&self, index: usize) -> Option<&SegmentStyle> {
        let at = self.spans.partition_point(|span| span.end() <= index);
        self.spans
            .get(at)
            .filter(|span| span.len > 0 && span.start <= index)
            .map(|span| &span.style)
    }

    /// Modify the style of every character in `range` (in character indices), e.g. to
    /// toggle bold on a selection. Spans are split at the range boundaries and re-merged
    /// afterwards.
    pub fn apply<F>(&mut self, range: Range<usize>, f: F)
    where
        F: Fn(&mut SegmentStyle),
    {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        if start == end {
            return;
        }

        let mut spans = Vec::with_capacity(self.spans.len() + 2);
        for span in self.spans.drain(..) {
            if span.len == 0 || span.end() <= start || span.start >= end {
                spans.push(span);
                continue;
            }

            if span.start < start {
                spans.push(StyleSpan {
                    start: span.start,
                    len: start - span.start,
                    style: span.style.clone(),
                });
            }
            let inner_start = span.start.max(start);
            let inner_end = span.end().min(end);
            let mut style = span.style.clone();
            f(&mut style);
            spans.push(StyleSpan {
                start: inner_start,
                len: inner_end - inner_start,
                style,
            });
            if span.end() > end {
                spans.push(StyleSpan {
                    start: end,
                    len: span.end() - end,
                    style: span.style,
                });
            }
        }

        self.spans = merge_spans(spans);
    }

    /// The content as styled segments, one per style run
    pub fn segments(&self) -> Vec<StyledSegment> {
        self.spans
            .iter()
            .map(|span| StyledSegment {
                text: self.chars[span.start..span.end()].iter().collect(),
                style: span.style.clone(),
            })
            .collect()
    }
}

impl From<&str> for RichContent {
    fn from(text: &str) -> Self {
        RichContent::from_plain(text)
    }
}

fn merge_spans(spans: Vec<StyleSpan>) -> Vec<StyleSpan> {
    let mut merged: Vec<StyleSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(last) = merged.last_mut() {
            if span.len > 0 && last.len > 0 && last.style == span.style && last.end() == span.start
            {
                last.len += span.len;
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Colour, Pt};

    #[test]
    fn adjacent_identical_styles_are_merged() {
        let json = r##"[
            {"letter": "a", "style": {"fontSize": 12}},
            {"letter": "b", "style": {"fontSize": 12}},
            {"letter": "c", "style": {"fontColor": "#ff0000"}},
            {"letter": "d"}
        ]"##;
        let content = RichContent::from_letter_records(json).expect("valid records");
        assert_eq!(content.len(), 4);
        assert_eq!(content.spans().len(), 3);
        assert_eq!(content.style_at(1).and_then(|s| s.font_size), Some(Pt(12.0)));
        assert_eq!(
            content.style_at(2).and_then(|s| s.colour),
            Some(Colour::new_rgb(1.0, 0.0, 0.0))
        );
        assert_eq!(content.style_at(3), Some(&SegmentStyle::default()));
        assert_eq!(content.style_at(4), None);
        assert_eq!(content.plain_text(), "abcd");
    }

    #[test]
    fn applying_a_style_splits_and_remerges_runs() {
        let mut content = RichContent::from_plain("hello world");
        content.apply(6..11, |style| style.bold = Some(true));
        let segments = content.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "hello ");
        assert_eq!(segments[1].text, "world");
        assert_eq!(segments[1].style.bold, Some(true));

        content.apply(6..11, |style| style.bold = None);
        assert_eq!(content.spans().len(), 1);

        content.apply(2..4, |style| style.italic = Some(true));
        let texts: Vec<String> = content.segments().into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["he", "ll", "o world"]);
    }

    #[test]
    fn empty_letters_survive_as_blank_line_markers() {
        let mut content = RichContent::new();
        content.push("one", SegmentStyle::default());
        content.push("", SegmentStyle::default());
        content.push("two", SegmentStyle::default());
        let segments = content.segments();
        assert_eq!(segments.len(), 3);
        assert!(segments[1].is_empty());
        assert_eq!(content.plain_text(), "one\ntwo");
    }

    #[test]
    fn letter_records_round_trip_through_json() {
        let mut content = RichContent::from_plain("ab");
        content.apply(1..2, |style| style.underline = Some(true));
        let json = content.to_letter_records().unwrap();
        assert_eq!(
            json,
            r#"[{"letter":"a","style":{}},{"letter":"b","style":{"underline":true}}]"#
        );
        assert_eq!(RichContent::from_letter_records(&json).unwrap(), content);
    }

    #[test]
    fn malformed_records_are_an_error() {
        let err = RichContent::from_letter_records(r#"[{"style": {}}]"#).err();
        assert!(matches!(err, Some(LayoutError::StyleRecords(_))));
    }
}
