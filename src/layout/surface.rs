use super::line::Line;
use crate::{Alignment, Colour, LayoutConfig, Pt, ResolvedStyle};
use unicode_segmentation::UnicodeSegmentation;

/// Draw a run of text with its left edge at `x` and its baseline at `baseline_y`
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub x: Pt,
    pub baseline_y: Pt,
    pub text: String,
    /// Resolved style, naming the concrete font and the character spacing to draw with
    pub style: ResolvedStyle,
    /// Extra space to put after every grapheme cluster but the last, for justified text
    pub grapheme_spacing: Pt,
}

/// Draw a straight rule starting at (`x`, `y`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleCommand {
    pub x: Pt,
    pub y: Pt,
    pub length: Pt,
    pub thickness: Pt,
    /// Runs to the right if true, downwards otherwise
    pub horizontal: bool,
    pub colour: Colour,
}

/// Fill a rectangle whose top left corner is at (`x`, `y`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectCommand {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
    pub colour: Colour,
}

/// Something for a drawing surface to do. Coordinates are local to the text box: x
/// grows to the right and y grows downwards from the top of the box.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text(TextCommand),
    Rule(RuleCommand),
    Rect(RectCommand),
}

/// A drawing surface that receives positioned commands in paint order
pub trait Surface {
    fn draw(&mut self, command: DrawCommand);
}

/// Collects every command, for callers that draw later or inspect the result
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectCommand> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Rect(rect) => Some(rect),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &RuleCommand> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Rule(rule) => Some(rule),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

/// Discards everything; used for passes that only measure
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn draw(&mut self, _command: DrawCommand) {}
}

/// Where a line sits horizontally within `width`: its offset from the left edge, and
/// the extra space justified text puts between grapheme clusters
pub(crate) fn align_line(line: &Line, width: Pt, alignment: Alignment) -> (Pt, Pt) {
    let slack = (width - line.width).max(Pt::ZERO);
    match alignment {
        Alignment::Left => (Pt::ZERO, Pt::ZERO),
        Alignment::Center => (slack / 2.0, Pt::ZERO),
        Alignment::Right => (slack, Pt::ZERO),
        Alignment::Justify if line.hard_break => (Pt::ZERO, Pt::ZERO),
        Alignment::Justify => {
            let graphemes = line.text().graphemes(true).count();
            if graphemes < 2 {
                (Pt::ZERO, Pt::ZERO)
            } else {
                (Pt::ZERO, slack / (graphemes - 1) as f32)
            }
        }
    }
}

/// How [paint_line] decorates a line
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PaintOptions {
    /// Draw every fragment bold, not just those styled so
    pub bold: bool,
    /// Draw the background box behind inline code fragments
    pub code_backgrounds: bool,
}

/// Draw one line with its left edge at `x` and its baseline at `baseline`. Bold is
/// simulated by drawing a fragment a second time, nudged to the right.
pub(crate) fn paint_line(
    surface: &mut dyn Surface,
    line: &Line,
    x: Pt,
    baseline: Pt,
    grapheme_spacing: Pt,
    options: PaintOptions,
    config: &LayoutConfig,
) {
    let mut graphemes_before = 0;
    for fragment in line.fragments.iter() {
        let graphemes = fragment.text.graphemes(true).count();
        let left = x + fragment.x + grapheme_spacing * graphemes_before as f32;
        let width = fragment.width + grapheme_spacing * graphemes.saturating_sub(1) as f32;
        let height = fragment.text_height;
        graphemes_before += graphemes;

        if let Some(colour) = fragment.style.background {
            surface.draw(DrawCommand::Rect(RectCommand {
                x: left,
                y: baseline - height,
                width,
                height: height * 1.2,
                colour,
            }));
        }
        if options.code_backgrounds && fragment.style.code {
            surface.draw(DrawCommand::Rect(RectCommand {
                x: left - Pt(2.0),
                y: baseline - height * 0.95,
                width: width + Pt(4.0),
                height: height * 1.1,
                colour: config.code_background,
            }));
        }

        let text = TextCommand {
            x: left,
            baseline_y: baseline,
            text: fragment.text.clone(),
            style: fragment.style.clone(),
            grapheme_spacing,
        };
        if options.bold || fragment.style.bold {
            let stroke = fragment.style.font_size * config.bold_stroke_ratio * 0.5;
            let bold = TextCommand {
                x: left + stroke,
                ..text.clone()
            };
            surface.draw(DrawCommand::Text(text));
            surface.draw(DrawCommand::Text(bold));
        } else {
            surface.draw(DrawCommand::Text(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LineFragment;
    use crate::TextStyle;

    fn fragment(text: &str, x: f32, width: f32) -> LineFragment {
        LineFragment {
            text: text.to_string(),
            style: TextStyle::default().resolved(),
            x: Pt(x),
            width: Pt(width),
            text_height: Pt(8.0),
        }
    }

    fn line(fragments: Vec<LineFragment>, hard_break: bool) -> Line {
        let width = fragments.iter().map(|f| f.width).sum();
        Line {
            fragments,
            width,
            hard_break,
        }
    }

    #[test]
    fn alignment_places_the_slack() {
        let l = line(vec![fragment("abcd", 0.0, 20.0)], true);
        assert_eq!(align_line(&l, Pt(100.0), Alignment::Left), (Pt(0.0), Pt(0.0)));
        assert_eq!(align_line(&l, Pt(100.0), Alignment::Center), (Pt(40.0), Pt(0.0)));
        assert_eq!(align_line(&l, Pt(100.0), Alignment::Right), (Pt(80.0), Pt(0.0)));
        // the last line of a paragraph stays ragged
        assert_eq!(align_line(&l, Pt(100.0), Alignment::Justify), (Pt(0.0), Pt(0.0)));
    }

    #[test]
    fn justify_spreads_the_slack_between_graphemes() {
        // "e" followed by a combining acute accent is one cluster
        let l = line(vec![fragment("ae\u{301}b", 0.0, 20.0)], false);
        let (offset, extra) = align_line(&l, Pt(30.0), Alignment::Justify);
        assert_eq!(offset, Pt(0.0));
        assert_eq!(extra, Pt(5.0));
    }

    #[test]
    fn later_fragments_shift_by_the_justified_spacing() {
        let l = line(
            vec![fragment("ab", 0.0, 10.0), fragment("cd", 10.0, 10.0)],
            false,
        );
        let mut surface = RecordingSurface::new();
        let config = LayoutConfig::default();
        paint_line(&mut surface, &l, Pt(0.0), Pt(10.0), Pt(2.0), PaintOptions::default(), &config);
        let xs: Vec<Pt> = surface.texts().map(|t| t.x).collect();
        assert_eq!(xs, vec![Pt(0.0), Pt(14.0)]);
        assert!(surface.texts().all(|t| t.grapheme_spacing == Pt(2.0)));
    }

    #[test]
    fn bold_and_code_fragments_are_decorated() {
        let mut bold = fragment("b", 0.0, 5.0);
        bold.style.bold = true;
        let mut code = fragment("c", 5.0, 5.0);
        code.style.code = true;
        let l = line(vec![bold, code], true);

        let mut surface = RecordingSurface::new();
        let config = LayoutConfig::default();
        let options = PaintOptions {
            bold: false,
            code_backgrounds: true,
        };
        paint_line(&mut surface, &l, Pt(0.0), Pt(10.0), Pt(0.0), options, &config);
        assert_eq!(surface.texts().count(), 3);
        let rect = surface.rects().next().copied().expect("code background");
        assert_eq!(rect.x, Pt(3.0));
        assert_eq!(rect.width, Pt(9.0));
        assert_eq!(rect.colour, config.code_background);
    }
}
