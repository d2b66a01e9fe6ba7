//! A small markdown-like markup for text fields.
//!
//! Block syntax, one construct per line:
//!
//! - ```` ```lang ```` fenced code
//! - `#` to `######` headings
//! - `| a | b |` pipe tables, whose second row must be a `|---|---|` separator
//! - `-`/`*` bullets and `1.` numbered list items, nested by two spaces of indent
//! - `>` blockquotes
//! - anything else: paragraphs of consecutive non-blank lines
//!
//! Inline syntax: `` `code` ``, `**bold**`/`__bold__`, `*italic*`/`_italic_`,
//! `{#RRGGBB}coloured{/}` and `{bg:#RRGGBB}highlighted{/bg}`. Everything but code nests.

use crate::{Colour, SegmentStyle, StyledSegment};

/// The marker drawn in front of a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    /// A numbered item, counting from 1 within its nesting level
    Ordered(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Nesting depth; 0 is the outermost level
    pub level: usize,
    pub marker: ListMarker,
    pub segments: Vec<StyledSegment>,
}

/// A pipe table. Rows keep the cells they were written with, which may be more or
/// fewer than there are headers.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableData {
    pub headers: Vec<Vec<StyledSegment>>,
    pub rows: Vec<Vec<Vec<StyledSegment>>>,
}

/// One block of parsed markup content, laid out top to bottom
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Paragraph(Vec<StyledSegment>),
    Heading {
        /// 1 through 6
        level: u8,
        segments: Vec<StyledSegment>,
    },
    Code {
        language: Option<String>,
        text: String,
    },
    Blockquote(Vec<StyledSegment>),
    List(Vec<ListItem>),
    Table(TableData),
}

/// Parse markup text into blocks
pub fn parse_blocks(text: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some((before, language, code, after)) = next_fence(rest) {
        parse_non_code_blocks(before, &mut blocks);
        blocks.push(ContentBlock::Code {
            language,
            text: code.to_string(),
        });
        rest = after;
    }
    parse_non_code_blocks(rest, &mut blocks);

    blocks
}

/// Find the next complete ```` ``` ```` fence, returning the text before it, the
/// language tag, the fenced text, and the text after it
fn next_fence(text: &str) -> Option<(&str, Option<String>, &str, &str)> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    let lang_len = after_open
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(after_open.len());
    let language = &after_open[..lang_len];
    let body = &after_open[lang_len..];
    let body = body.strip_prefix('\n').unwrap_or(body);
    let close = body.find("```")?;

    Some((
        &text[..open],
        (!language.is_empty()).then(|| language.to_string()),
        &body[..close],
        &body[close + 3..],
    ))
}

fn parse_non_code_blocks(text: &str, blocks: &mut Vec<ContentBlock>) {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some((level, content)) = heading(line) {
            blocks.push(ContentBlock::Heading {
                level,
                segments: parse_inline(content),
            });
            i += 1;
            continue;
        }

        if let Some((table, consumed)) = parse_table(&lines[i..]) {
            blocks.push(ContentBlock::Table(table));
            i += consumed;
            continue;
        }

        if list_item(line).is_some() {
            let (items, consumed) = parse_list(&lines[i..]);
            blocks.push(ContentBlock::List(items));
            i += consumed;
            continue;
        }

        if blockquote(line).is_some() {
            let mut quoted = Vec::new();
            while let Some(content) = lines.get(i).copied().and_then(blockquote) {
                quoted.push(content);
                i += 1;
            }
            blocks.push(ContentBlock::Blockquote(parse_inline(&quoted.join("\n"))));
            continue;
        }

        let mut paragraph = Vec::new();
        while let Some(&line) = lines.get(i) {
            if line.trim().is_empty()
                || heading(line).is_some()
                || list_item(line).is_some()
                || table_row(line.trim()).is_some()
                || blockquote(line).is_some()
            {
                break;
            }
            paragraph.push(line);
            i += 1;
        }
        if paragraph.is_empty() {
            // a lone table row without a separator: keep it as text
            paragraph.push(line);
            i += 1;
        }
        blocks.push(ContentBlock::Paragraph(parse_inline(&paragraph.join("\n"))));
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    let content = rest.trim_start();
    if content.len() == rest.len() {
        return None;
    }
    Some((hashes as u8, content))
}

fn blockquote(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => Some(rest),
    }
}

/// The cells of a `|`-delimited row, which must already be trimmed
fn table_row(line: &str) -> Option<Vec<&str>> {
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    if inner.is_empty() {
        return None;
    }
    Some(inner.split('|').map(str::trim).collect())
}

fn is_table_separator(line: &str) -> bool {
    line.strip_prefix('|')
        .and_then(|inner| inner.strip_suffix('|'))
        .map(|inner| {
            !inner.is_empty()
                && inner
                    .chars()
                    .all(|c| c.is_whitespace() || matches!(c, '-' | ':' | '|'))
        })
        .unwrap_or(false)
}

fn parse_table(lines: &[&str]) -> Option<(TableData, usize)> {
    let header = table_row(lines.first()?.trim())?;
    if !is_table_separator(lines.get(1)?.trim()) {
        return None;
    }

    let mut table = TableData {
        headers: header.into_iter().map(parse_inline).collect(),
        rows: Vec::new(),
    };
    let mut consumed = 2;
    while let Some(cells) = lines.get(consumed).and_then(|line| table_row(line.trim())) {
        table.rows.push(cells.into_iter().map(parse_inline).collect());
        consumed += 1;
    }
    Some((table, consumed))
}

/// A list line's indent (in characters), whether it is numbered, and its content
fn list_item(line: &str) -> Option<(usize, bool, &str)> {
    let body = line.trim_start();
    let indent = line[..line.len() - body.len()].chars().count();

    let (ordered, rest) = if let Some(rest) = body.strip_prefix(&['-', '*'][..]) {
        (false, rest)
    } else {
        let digits = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
        if digits == 0 {
            return None;
        }
        (true, body[digits..].strip_prefix('.')?)
    };

    let content = rest.trim_start();
    if content.len() == rest.len() {
        return None;
    }
    Some((indent, ordered, content))
}

fn parse_list(lines: &[&str]) -> (Vec<ListItem>, usize) {
    let mut items = Vec::new();
    // running counters for ordered items, one per nesting level
    let mut counters: Vec<u32> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if let Some((indent, ordered, content)) = list_item(lines[i]) {
            let level = indent / 2;
            let marker = if ordered {
                counters.resize(level + 1, 0);
                counters[level] += 1;
                ListMarker::Ordered(counters[level])
            } else {
                ListMarker::Bullet
            };
            items.push(ListItem {
                level,
                marker,
                segments: parse_inline(content),
            });
            i += 1;
            continue;
        }

        // a single blank line between two items keeps the list going
        let continues = lines[i].trim().is_empty()
            && lines.get(i + 1).and_then(|next| list_item(next)).is_some();
        if !continues {
            break;
        }
        i += 1;
    }

    (items, i)
}

/// Parse inline styles. Adjacent runs with the same style are merged; empty input
/// yields no segments.
pub fn parse_inline(text: &str) -> Vec<StyledSegment> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    parse_inline_into(&chars, &SegmentStyle::default(), &mut segments);
    segments
}

fn push_segment(segments: &mut Vec<StyledSegment>, text: &str, style: &SegmentStyle) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = segments.last_mut() {
        if last.style == *style {
            last.text.push_str(text);
            return;
        }
    }
    segments.push(StyledSegment::new(text, style.clone()));
}

fn find_from(chars: &[char], from: usize, pattern: &str) -> Option<usize> {
    let pattern: Vec<char> = pattern.chars().collect();
    if from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(pattern.len())
        .position(|window| window == pattern.as_slice())
        .map(|at| at + from)
}

fn starts_with(chars: &[char], at: usize, pattern: &str) -> bool {
    let mut i = at;
    for p in pattern.chars() {
        if chars.get(i) != Some(&p) {
            return false;
        }
        i += 1;
    }
    true
}

/// Read a `#RRGGBB` colour followed by `}` at `at`, returning the colour and the index
/// just past the brace
fn colour_tag(chars: &[char], at: usize) -> Option<(Colour, usize)> {
    if chars.get(at) != Some(&'#') {
        return None;
    }
    let digits = chars.get(at + 1..at + 7)?;
    if chars.get(at + 7) != Some(&'}') {
        return None;
    }
    if !digits.iter().all(char::is_ascii_hexdigit) {
        let tag: String = digits.iter().collect();
        log::warn!("`#{tag}` is not a colour; keeping the tag as text");
        return None;
    }
    let hex: String = digits.iter().collect();
    Some((Colour::from_hex(&hex)?, at + 8))
}

/// A styled span recognised at the start of some text
struct InlineSpan {
    style: SegmentStyle,
    content: std::ops::Range<usize>,
    end: usize,
    nested: bool,
}

fn inline_span(chars: &[char], at: usize) -> Option<InlineSpan> {
    let ch = chars[at];
    let has_newline = |range: std::ops::Range<usize>| chars[range].contains(&'\n');

    if ch == '`' {
        let close = find_from(chars, at + 1, "`")?;
        if close == at + 1 {
            return None;
        }
        return Some(InlineSpan {
            style: SegmentStyle::code(),
            content: at + 1..close,
            end: close + 1,
            nested: false,
        });
    }

    if starts_with(chars, at, "**") || starts_with(chars, at, "__") {
        let delimiter = if ch == '*' { "**" } else { "__" };
        let close = find_from(chars, at + 2, delimiter)?;
        if close == at + 2 || has_newline(at + 2..close) {
            return None;
        }
        return Some(InlineSpan {
            style: SegmentStyle::bold(),
            content: at + 2..close,
            end: close + 2,
            nested: true,
        });
    }

    if ch == '*' || ch == '_' {
        if at > 0 && chars[at - 1] == ch {
            return None;
        }
        let close = (at + 1..chars.len()).find(|&i| chars[i] == ch)?;
        if close == at + 1 || chars.get(close + 1) == Some(&ch) || has_newline(at + 1..close) {
            return None;
        }
        return Some(InlineSpan {
            style: SegmentStyle::italic(),
            content: at + 1..close,
            end: close + 1,
            nested: true,
        });
    }

    if starts_with(chars, at, "{bg:") {
        let (colour, start) = colour_tag(chars, at + 4)?;
        let close = find_from(chars, start, "{/bg}")?;
        if has_newline(start..close) {
            return None;
        }
        return Some(InlineSpan {
            style: SegmentStyle::highlighted(colour),
            content: start..close,
            end: close + 5,
            nested: true,
        });
    }

    if ch == '{' {
        let (colour, start) = colour_tag(chars, at + 1)?;
        let close = find_from(chars, start, "{/}")?;
        if has_newline(start..close) {
            return None;
        }
        return Some(InlineSpan {
            style: SegmentStyle::coloured(colour),
            content: start..close,
            end: close + 3,
            nested: true,
        });
    }

    None
}

fn parse_inline_into(chars: &[char], style: &SegmentStyle, segments: &mut Vec<StyledSegment>) {
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        match inline_span(chars, i) {
            Some(span) => {
                push_segment(segments, &plain, style);
                plain.clear();

                let inner = style.merged(&span.style);
                if span.nested {
                    parse_inline_into(&chars[span.content], &inner, segments);
                } else {
                    let text: String = chars[span.content].iter().collect();
                    push_segment(segments, &text, &inner);
                }
                i = span.end;
            }
            None => {
                plain.push(chars[i]);
                i += 1;
            }
        }
    }
    push_segment(segments, &plain, style);
}

/// Whether `text` uses any block or inline markup
pub fn is_rich_text(text: &str) -> bool {
    let lines: Vec<&str> = text.split('\n').collect();
    for (i, line) in lines.iter().enumerate() {
        if heading(line).is_some() || blockquote(line).is_some() || list_item(line).is_some() {
            return true;
        }
        let starts_table = table_row(line.trim()).is_some()
            && lines
                .get(i + 1)
                .map(|next| is_table_separator(next.trim()))
                .unwrap_or(false);
        if starts_table {
            return true;
        }
    }

    next_fence(text).is_some()
        || parse_inline(text)
            .iter()
            .any(|segment| segment.style != SegmentStyle::default())
}

/// The plain text of some markup, with every marker removed
pub fn strip(text: &str) -> String {
    let mut unfenced = String::with_capacity(text.len());
    let mut rest = text;
    while let Some((before, _, code, after)) = next_fence(rest) {
        unfenced.push_str(before);
        unfenced.push_str(code);
        rest = after;
    }
    unfenced.push_str(rest);

    unfenced
        .split('\n')
        .map(strip_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line(line: &str) -> String {
    let trimmed = line.trim();
    if is_table_separator(trimmed) {
        return String::new();
    }
    let body = if let Some((_, content)) = heading(line) {
        content.to_string()
    } else if let Some(content) = blockquote(line) {
        content.to_string()
    } else if let Some(cells) = table_row(trimmed) {
        cells.join(" ")
    } else if let Some((_, _, content)) = list_item(line) {
        let indent = &line[..line.len() - line.trim_start().len()];
        format!("{indent}{content}")
    } else {
        line.to_string()
    };

    parse_inline(&body)
        .into_iter()
        .map(|segment| segment.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[StyledSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(parse_inline("Hello World"), vec![StyledSegment::plain("Hello World")]);
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn parses_inline_styles() {
        let segments = parse_inline("Hello **World**");
        assert_eq!(texts(&segments), vec!["Hello ", "World"]);
        assert_eq!(segments[1].style.bold, Some(true));

        let segments = parse_inline("__bold__ and *italic* and _also_");
        assert_eq!(segments[0].style.bold, Some(true));
        assert_eq!(segments[2].text, "italic");
        assert_eq!(segments[2].style.italic, Some(true));
        assert_eq!(segments[4].style.italic, Some(true));

        let segments = parse_inline("{#FF0000}red{/} {bg:#FFFF00}marked{/bg}");
        assert_eq!(segments[0].style.colour, Colour::from_hex("#ff0000"));
        assert_eq!(segments[2].text, "marked");
        assert_eq!(segments[2].style.background, Colour::from_hex("#ffff00"));
    }

    #[test]
    fn styles_nest_except_inside_code() {
        let segments = parse_inline("**bold _both_**");
        assert_eq!(texts(&segments), vec!["bold ", "both"]);
        assert_eq!(segments[1].style.bold, Some(true));
        assert_eq!(segments[1].style.italic, Some(true));

        let segments = parse_inline("run `**x**` now");
        assert_eq!(texts(&segments), vec!["run ", "**x**", " now"]);
        assert_eq!(segments[1].style.code, Some(true));
        assert_eq!(segments[1].style.bold, None);
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(texts(&parse_inline("2 * 3 = 6")), vec!["2 * 3 = 6"]);
        assert_eq!(texts(&parse_inline("{#zzzzzz}x{/}")), vec!["{#zzzzzz}x{/}"]);
        assert_eq!(texts(&parse_inline("a `` b")), vec!["a `` b"]);
    }

    #[test]
    fn parses_headings_and_paragraphs() {
        let blocks = parse_blocks("# Title\nfirst line\nsecond line\n\n###### Small");
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            ContentBlock::Heading {
                level: 1,
                segments: vec![StyledSegment::plain("Title")]
            }
        );
        assert_eq!(
            blocks[1],
            ContentBlock::Paragraph(vec![StyledSegment::plain("first line\nsecond line")])
        );
        assert!(matches!(blocks[2], ContentBlock::Heading { level: 6, .. }));
        assert!(matches!(parse_blocks("#nospace")[0], ContentBlock::Paragraph(_)));
    }

    #[test]
    fn parses_fenced_code() {
        let blocks = parse_blocks("before\n```rust\nfn main() {}\n```\nafter");
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            ContentBlock::Code {
                language: Some("rust".into()),
                text: "fn main() {}\n".into()
            }
        );

        let blocks = parse_blocks("```\nx\n```");
        assert!(matches!(&blocks[0], ContentBlock::Code { language: None, .. }));
    }

    #[test]
    fn parses_blockquotes() {
        let blocks = parse_blocks("> Line 1\n>Line 2\n\nafter");
        assert_eq!(
            blocks[0],
            ContentBlock::Blockquote(vec![StyledSegment::plain("Line 1\nLine 2")])
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn parses_nested_lists_with_running_counters() {
        let blocks = parse_blocks("1. one\n  - inner\n  1. sub\n  2. sub\n\n2. two\n3. three");
        let ContentBlock::List(items) = &blocks[0] else {
            panic!("expected a list, got {blocks:?}");
        };
        assert_eq!(blocks.len(), 1);
        let markers: Vec<(usize, ListMarker)> =
            items.iter().map(|item| (item.level, item.marker)).collect();
        assert_eq!(
            markers,
            vec![
                (0, ListMarker::Ordered(1)),
                (1, ListMarker::Bullet),
                (1, ListMarker::Ordered(1)),
                (1, ListMarker::Ordered(2)),
                (0, ListMarker::Ordered(2)),
                (0, ListMarker::Ordered(3)),
            ]
        );
    }

    #[test]
    fn deeper_counters_restart_under_a_new_parent() {
        let blocks = parse_blocks("1. a\n  1. x\n  2. y\n2. b\n  1. z");
        let ContentBlock::List(items) = &blocks[0] else {
            panic!("expected a list");
        };
        assert_eq!(items[4].marker, ListMarker::Ordered(1));
    }

    #[test]
    fn parses_tables() {
        let blocks = parse_blocks("| Name | Qty |\n|------|:---:|\n| Apple | **3** |\n| Pear | 4 |");
        let ContentBlock::Table(table) = &blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1][0].style.bold, Some(true));
        assert_eq!(table.rows[1].len(), 2);

        let blocks = parse_blocks("| not | a table |");
        assert!(matches!(blocks[0], ContentBlock::Paragraph(_)));
    }

    #[test]
    fn detects_markup() {
        for rich in [
            "# Heading",
            "**bold**",
            "__bold__",
            "*italic*",
            "_italic_",
            "{#FF0000}red{/}",
            "{bg:#FFFF00}highlight{/bg}",
            "Use `code` here",
            "```\ncode\n```",
            "> quote",
            "- item",
            "| a |\n|---|",
        ] {
            assert!(is_rich_text(rich), "{rich}");
        }
        assert!(!is_rich_text("Hello World"));
        assert!(!is_rich_text("Just a normal paragraph"));
    }

    #[test]
    fn strips_markup() {
        assert_eq!(strip("# Heading"), "Heading");
        assert_eq!(strip("**bold** and __bold__"), "bold and bold");
        assert_eq!(strip("{#FF0000}red{/}"), "red");
        assert_eq!(strip("{bg:#FFFF00}highlight{/bg}"), "highlight");
        assert_eq!(strip("> quoted"), "quoted");
        assert_eq!(strip("  - item"), "  item");
        assert_eq!(strip("| a | b |\n|---|---|\n| 1 | 2 |"), "a b\n\n1 2");
        assert_eq!(strip("```js\nlet x;\n```"), "let x;\n");
    }
}
