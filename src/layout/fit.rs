use super::breaker::{split_manual_breaks, LineBreaker};
use super::splitter::RichSegmentSplitter;
use crate::config::{require_non_negative, require_positive};
use crate::fonts::FontResolver;
use crate::metrics::FontMetrics;
use crate::{
    DynamicFitSetting, FitAxis, LayoutBox, LayoutConfig, LayoutError, Pt, StyledSegment, TextStyle,
};

/// The space some content takes up at one candidate font size
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FitMeasure {
    /// For [FitAxis::Horizontal], the widest unwrapped paragraph; for
    /// [FitAxis::Vertical], the widest wrapped line
    pub width: Pt,
    /// Total height of the wrapped lines
    pub height: Pt,
}

/// Lays content out at a candidate size so that [DynamicFitSolver] can judge it. Every
/// call is an independent, complete measurement pass.
pub trait FitProbe {
    fn measure(&self, size: Pt, axis: FitAxis) -> Result<FitMeasure, LayoutError>;
}

/// Probes plain text in a single font
pub struct PlainProbe<'a> {
    metrics: &'a dyn FontMetrics,
    paragraphs: Vec<&'a str>,
    character_spacing: Pt,
    line_height: f32,
    box_width: Pt,
}

impl<'a> PlainProbe<'a> {
    pub fn new(
        metrics: &'a dyn FontMetrics,
        text: &'a str,
        style: &TextStyle,
        box_width: Pt,
    ) -> Self {
        PlainProbe {
            metrics,
            paragraphs: split_manual_breaks(text),
            character_spacing: style.character_spacing,
            line_height: style.line_height,
            box_width,
        }
    }
}

impl FitProbe for PlainProbe<'_> {
    fn measure(&self, size: Pt, axis: FitAxis) -> Result<FitMeasure, LayoutError> {
        let breaker = LineBreaker::new(self.metrics, size, self.character_spacing);
        let first_line = self.metrics.line_height(size) * self.line_height;
        let other_line = size * self.line_height;

        let mut measure = FitMeasure::default();
        let mut first = true;
        for paragraph in self.paragraphs.iter() {
            for line in breaker.split_line(paragraph, self.box_width) {
                if axis == FitAxis::Vertical {
                    measure.width = measure.width.max(breaker.width(&line));
                }
                measure.height += if first { first_line } else { other_line };
                first = false;
            }
            if axis == FitAxis::Horizontal {
                measure.width = measure.width.max(breaker.width(paragraph));
            }
        }
        Ok(measure)
    }
}

/// Probes styled segments. Segments that set their own font size keep it; everything
/// else follows the candidate size. Lines after the first advance by the candidate
/// size, as they do when the field is laid out.
pub struct RichProbe<'a> {
    fonts: &'a dyn FontResolver,
    base: &'a TextStyle,
    segments: &'a [StyledSegment],
    box_width: Pt,
}

impl<'a> RichProbe<'a> {
    pub fn new(
        fonts: &'a dyn FontResolver,
        base: &'a TextStyle,
        segments: &'a [StyledSegment],
        box_width: Pt,
    ) -> Self {
        RichProbe {
            fonts,
            base,
            segments,
            box_width,
        }
    }
}

impl FitProbe for RichProbe<'_> {
    fn measure(&self, size: Pt, axis: FitAxis) -> Result<FitMeasure, LayoutError> {
        let style = self.base.with_font_size(size);
        let splitter = RichSegmentSplitter::new(self.fonts, &style);
        let lines = splitter.split(self.segments, self.box_width)?;

        let mut measure = FitMeasure::default();
        for (i, line) in lines.iter().enumerate() {
            measure.height += if i == 0 {
                splitter.text_height(line)? * style.line_height
            } else {
                size * style.line_height
            };
        }
        measure.width = match axis {
            FitAxis::Vertical => lines.iter().map(|line| line.width).fold(Pt::ZERO, Pt::max),
            FitAxis::Horizontal => splitter
                .split(self.segments, Pt(f32::INFINITY))?
                .iter()
                .map(|line| line.width)
                .fold(Pt::ZERO, Pt::max),
        };
        Ok(measure)
    }
}

/// Searches for the font size that best fills a box: as large as possible without
/// overflowing it, within the bounds of a [DynamicFitSetting].
///
/// The search steps by a fixed increment and only ever moves in one direction per
/// solve, so it runs at most `(max - min) / step` measurement passes. Solving the
/// result again returns the same size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicFitSolver {
    step: Pt,
    tolerance: Pt,
}

impl Default for DynamicFitSolver {
    fn default() -> Self {
        DynamicFitSolver::from_config(&LayoutConfig::default())
    }
}

impl DynamicFitSolver {
    pub fn new(step: Pt, tolerance: Pt) -> Self {
        DynamicFitSolver { step, tolerance }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        DynamicFitSolver::new(config.fit_step, config.fit_tolerance)
    }

    /// Find the font size for content measured by `probe`. Without a setting, or with
    /// one whose `max` is below its `min`, the declared size is returned unchanged.
    pub fn solve(
        &self,
        declared: Pt,
        setting: Option<&DynamicFitSetting>,
        layout_box: LayoutBox,
        probe: &dyn FitProbe,
    ) -> Result<Pt, LayoutError> {
        let Some(setting) = setting else {
            return Ok(declared);
        };
        self.check()?;
        if !setting.is_enabled() {
            log::debug!(
                "dynamic fit disabled: max {} is below min {}; keeping {}",
                setting.max,
                setting.min,
                declared
            );
            return Ok(declared);
        }

        let (min, max, axis) = (setting.min, setting.max, setting.fit);
        let mut size = declared.max(min).min(max);
        let mut measure = probe.measure(size, axis)?;
        log::debug!(
            "dynamic fit: starting at {size} in {}x{} ({axis:?}, {min}..{max})",
            layout_box.width,
            layout_box.height
        );

        let overflows = |m: &FitMeasure| {
            m.width > layout_box.width + self.tolerance
                || m.height > layout_box.height + self.tolerance
        };

        if overflows(&measure) && size > min {
            while overflows(&measure) && size > min {
                size = (size - self.step).max(min);
                measure = probe.measure(size, axis)?;
                log::trace!("shrunk to {size}: {measure:?}");
            }
            log::debug!("dynamic fit: shrunk to {size}");
            return Ok(size);
        }

        while size < max && self.has_room(&measure, layout_box, axis) {
            let next = (size + self.step).min(max);
            let grown = probe.measure(next, axis)?;
            log::trace!("trying {next}: {grown:?}");
            let fits = match axis {
                FitAxis::Vertical => {
                    grown.height < layout_box.height
                        && grown.width <= layout_box.width + self.tolerance
                }
                FitAxis::Horizontal => {
                    grown.width < layout_box.width
                        && grown.height <= layout_box.height + self.tolerance
                }
            };
            if !fits {
                break;
            }
            size = next;
            measure = grown;
        }
        log::debug!("dynamic fit: settled on {size}");
        Ok(size)
    }

    /// The search only terminates if every step makes progress
    fn check(&self) -> Result<(), LayoutError> {
        require_positive("fitStep", self.step.0)?;
        require_non_negative("fitTolerance", self.tolerance.0)
    }

    fn has_room(&self, measure: &FitMeasure, layout_box: LayoutBox, axis: FitAxis) -> bool {
        match axis {
            FitAxis::Horizontal => measure.width < layout_box.width,
            FitAxis::Vertical => measure.height < layout_box.height,
        }
    }
}
