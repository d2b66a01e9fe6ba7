use crate::units::Pt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Vertical and horizontal metrics of one loaded font, expressed in the font's design
/// units. Everything this crate needs to know about a font goes through this trait;
/// parsing font files is left to implementors such as [crate::Font].
///
/// The provided methods normalise design units to a 1000-unit em before scaling to the
/// requested size, so that every implementor measures identically.
pub trait FontMetrics: Send + Sync {
    /// The size of the font's em square in design units
    fn units_per_em(&self) -> f32;

    /// Distance from the baseline to the top of the font, in design units
    fn ascender(&self) -> f32;

    /// Distance from the baseline to the bottom of the font, in design units.
    /// Note: this is usually negative
    fn descender(&self) -> f32;

    /// Horizontal advance of a single character, in design units
    fn advance(&self, ch: char) -> f32;

    /// Calculate the width of a given string of text at the given font size, excluding any
    /// character spacing
    fn width(&self, text: &str, size: Pt) -> Pt {
        let scale = 1000.0 / self.units_per_em();
        let standard: f32 = text.chars().map(|ch| self.advance(ch) * scale).sum();
        Pt(standard * (size.0 / 1000.0))
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the
    /// given font size
    fn ascent(&self, size: Pt) -> Pt {
        Pt(self.ascender() / self.units_per_em() * size.0)
    }

    /// Calculate the descent for the given font size. This is usually negative
    fn descent(&self, size: Pt) -> Pt {
        Pt(self.descender() / self.units_per_em() * size.0)
    }

    /// The usable height of a line of text at the given size: the design height
    /// (ascent − descent) less the depth of the descender, i.e. the distance from the
    /// top of the font to its baseline
    fn line_height(&self, size: Pt) -> Pt {
        let scale = 1000.0 / self.units_per_em();
        let top = self.ascender() * scale;
        let bottom = self.descender() * scale;
        let height = (top - bottom) - (self.descender() * scale).abs();
        Pt(height / 1000.0 * size.0)
    }
}

/// Total extra width that character spacing adds to a run of `char_count` characters.
///
/// * no characters: nothing
/// * one character: twice the spacing
/// * otherwise: one spacing between each adjacent pair of characters
pub fn spacing_for_count(char_count: usize, spacing: Pt) -> Pt {
    match char_count {
        0 => Pt::ZERO,
        1 => spacing * 2.0,
        n => spacing * (n - 1) as f32,
    }
}

/// Total extra width that character spacing adds to `text`
pub fn character_spacing(text: &str, spacing: Pt) -> Pt {
    spacing_for_count(text.chars().count(), spacing)
}

/// Calculate the width of a given string of text given the font, font size, and
/// character spacing
pub fn width_of_text(text: &str, font: &dyn FontMetrics, size: Pt, spacing: Pt) -> Pt {
    font.width(text, size) + character_spacing(text, spacing)
}

/// Approximate metrics where every character has the same advance. Useful when no font
/// data is available (previews, estimates) and for exact arithmetic in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub units_per_em: f32,
    pub advance: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl MonospaceMetrics {
    /// Every character advances `advance` design units in a 1000-unit em
    pub fn new(advance: f32, ascender: f32, descender: f32) -> MonospaceMetrics {
        MonospaceMetrics {
            units_per_em: 1000.0,
            advance,
            ascender,
            descender,
        }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        MonospaceMetrics::new(500.0, 800.0, -200.0)
    }
}

impl FontMetrics for MonospaceMetrics {
    fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    fn ascender(&self) -> f32 {
        self.ascender
    }

    fn descender(&self) -> f32 {
        self.descender
    }

    fn advance(&self, _ch: char) -> f32 {
        self.advance
    }
}

impl<T: FontMetrics + ?Sized> FontMetrics for Box<T> {
    fn units_per_em(&self) -> f32 {
        (**self).units_per_em()
    }

    fn ascender(&self) -> f32 {
        (**self).ascender()
    }

    fn descender(&self) -> f32 {
        (**self).descender()
    }

    fn advance(&self, ch: char) -> f32 {
        (**self).advance(ch)
    }

    fn width(&self, text: &str, size: Pt) -> Pt {
        (**self).width(text, size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WidthKey {
    font: usize,
    text: String,
    size: u32,
}

/// Memoisation of measured text widths, keyed by font identity, text, and size.
/// Character spacing is added on top of the cached glyph widths, so it is not part of
/// the key.
///
/// Reads may happen concurrently; writes are insert-if-absent since a width is
/// idempotent to recompute. Nothing is ever evicted implicitly: call [WidthCache::clear]
/// when the fonts it was filled from change.
#[derive(Debug, Default)]
pub struct WidthCache {
    widths: RwLock<HashMap<WidthKey, Pt>>,
    next_font: AtomicUsize,
    hits: AtomicUsize,
}

impl WidthCache {
    pub fn new() -> WidthCache {
        WidthCache::default()
    }

    /// A key that no other font using this cache has
    fn register_font(&self) -> usize {
        self.next_font.fetch_add(1, Ordering::Relaxed)
    }

    fn get(&self, key: &WidthKey) -> Option<Pt> {
        let widths = self.widths.read().unwrap_or_else(|e| e.into_inner());
        let width = widths.get(key).copied();
        if width.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        width
    }

    fn insert(&self, key: WidthKey, width: Pt) -> Pt {
        let mut widths = self.widths.write().unwrap_or_else(|e| e.into_inner());
        *widths.entry(key).or_insert(width)
    }

    /// Number of memoised widths
    pub fn len(&self) -> usize {
        self.widths.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of width queries answered from the cache since it was created or last
    /// cleared
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Drop every memoised width
    pub fn clear(&self) {
        self.widths
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// A font whose [FontMetrics::width] results are memoised in a shared [WidthCache].
/// Every `CachedMetrics` gets its own identity within the cache, so any number of
/// fonts can share one.
#[derive(Debug)]
pub struct CachedMetrics<M> {
    font: M,
    font_key: usize,
    cache: Arc<WidthCache>,
}

impl<M: FontMetrics> CachedMetrics<M> {
    pub fn new(font: M, cache: Arc<WidthCache>) -> Self {
        CachedMetrics {
            font_key: cache.register_font(),
            font,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<WidthCache> {
        &self.cache
    }
}

impl<M: FontMetrics> FontMetrics for CachedMetrics<M> {
    fn units_per_em(&self) -> f32 {
        self.font.units_per_em()
    }

    fn ascender(&self) -> f32 {
        self.font.ascender()
    }

    fn descender(&self) -> f32 {
        self.font.descender()
    }

    fn advance(&self, ch: char) -> f32 {
        self.font.advance(ch)
    }

    fn width(&self, text: &str, size: Pt) -> Pt {
        let key = WidthKey {
            font: self.font_key,
            text: text.to_string(),
            size: size.0.to_bits(),
        };
        if let Some(width) = self.cache.get(&key) {
            return width;
        }
        self.cache.insert(key, self.font.width(text, size))
    }
}
