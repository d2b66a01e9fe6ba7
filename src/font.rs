use crate::{metrics::FontMetrics, LayoutError};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};

/// A parsed TrueType or OpenType font, measured through [FontMetrics].
///
/// Parsing is delegated to [owned_ttf_parser]; this type only answers advance and
/// vertical-metric queries. Characters the font has no glyph for are measured as the
/// replacement character (U+FFFD), or `?` if the font lacks that too.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, LayoutError> {
        let face = OwnedFace::from_vec(bytes, 0)?;

        Ok(Font { face })
    }

    /// Obtain the full name of the font, if it carries one
    pub fn name(&self) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FULL_NAME && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Obtain the family name of the font, if it carries one
    pub fn family(&self) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Obtain the weight of the font (400 is regular, 700 is bold)
    pub fn weight(&self) -> u16 {
        self.face.as_face_ref().weight().to_number()
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.glyph_id('\u{FFFD}').or_else(|| self.glyph_id('?'))
    }
}

impl FontMetrics for Font {
    fn units_per_em(&self) -> f32 {
        self.face.as_face_ref().units_per_em() as f32
    }

    fn ascender(&self) -> f32 {
        self.face.as_face_ref().ascender() as f32
    }

    fn descender(&self) -> f32 {
        self.face.as_face_ref().descender() as f32
    }

    fn advance(&self, ch: char) -> f32 {
        self.glyph_id(ch)
            .or_else(|| self.replacement_glyph_id())
            .and_then(|gid| self.face.as_face_ref().glyph_hor_advance(GlyphId(gid)))
            .unwrap_or_default() as f32
    }
}
