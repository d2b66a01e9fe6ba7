use thiserror::Error;

/// Problems with the fonts supplied for a template. These are always surfaced to the
/// caller: substituting another font silently would render the wrong glyphs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no fonts were supplied")]
    /// The font set is empty
    EmptyFontSet,

    #[error("fallback flag is not found in font set; exactly one font must be the fallback")]
    /// None of the supplied fonts is flagged as the fallback
    NoFallbackFont,

    #[error("{0} fallback flags found in font set; exactly one font must be the fallback")]
    /// More than one font is flagged as the fallback
    MultipleFallbackFonts(usize),

    #[error("font `{0}` is not found in the font set")]
    /// A field names a font that is not part of the supplied set
    UnknownFont(String),
}

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error(transparent)]
    /// The supplied fonts do not form a valid configuration
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error("invalid per-character style records: {0}")]
    /// The per-character style record array could not be decoded
    StyleRecords(#[source] serde_json::Error),

    #[error("invalid layout configuration: {0}")]
    /// A [crate::LayoutConfig] document could not be decoded
    Config(#[source] serde_json::Error),

    #[error("invalid layout configuration: `{name}` must be {expected}, got {value}")]
    /// A [crate::LayoutConfig] value is outside the range layout can work with
    InvalidSetting {
        name: &'static str,
        expected: &'static str,
        value: f32,
    },
}
