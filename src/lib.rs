mod colour;
pub use colour::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod fonts;
pub use fonts::*;

/// Measuring, wrapping, fitting, and positioning text within template boxes
pub mod layout;

/// A small markdown-like markup language for rich text fields
pub mod markup;

mod metrics;
pub use metrics::*;

mod rich;
pub use rich::*;

mod style;
pub use style::*;

mod units;
pub use units::*;

/// Re-export of the font parser backing [Font], for callers that need raw face data
pub use owned_ttf_parser;
