//! Text layout: measuring, wrapping, fitting, and positioning text in fixed-size boxes.
//!
//! The pieces build on each other:
//!
//! - [`LineBreaker`] wraps plain text set in one font, size, and character spacing
//! - [`RichSegmentSplitter`] wraps styled segments, where every character may carry
//!   its own font, size, and spacing
//! - [`DynamicFitSolver`] searches for the font size that best fills a box, measuring
//!   candidates through a [`FitProbe`]
//! - [`BlockComposer`] lays out parsed markup blocks top to bottom and renders any
//!   window of their lines, for content that flows over several pages
//! - [`layout_field`] and [`layout_markup_field`] tie these together for one template
//!   field
//!
//! Nothing is drawn directly: positioned text, rules, and rectangles are handed to a
//! [`Surface`] in box-local coordinates.
//!
//! # Example
//!
//! ```
//! use pdf_textfit::{FontSet, LayoutConfig, Mm, MonospaceMetrics, TextField, TextStyle};
//! use pdf_textfit::layout::{layout_field, RecordingSurface};
//!
//! let fonts = FontSet::builder()
//!     .add("Mono", MonospaceMetrics::default(), true)
//!     .build()
//!     .expect("exactly one fallback font");
//!
//! let field = TextField {
//!     width: Mm(50.0),
//!     height: Mm(20.0),
//!     style: TextStyle::default(),
//!     dynamic_font_size: None,
//! };
//! let layout = layout_field(&field, "Hello, world!".into(), &fonts, &LayoutConfig::default())
//!     .expect("the field's font is in the set");
//!
//! let mut surface = RecordingSurface::new();
//! layout.render(&mut surface);
//! assert_eq!(surface.texts().count(), 1);
//! ```

mod block;
mod breaker;
mod field;
mod fit;
mod line;
mod splitter;
mod surface;

pub use block::*;
pub use breaker::{is_breakable, is_manual_break, split_manual_breaks, LineBreaker};
pub use field::*;
pub use fit::*;
pub use line::*;
pub use splitter::*;
pub use surface::{
    DrawCommand, NullSurface, RecordingSurface, RectCommand, RuleCommand, Surface, TextCommand,
};
