use crate::metrics::{CachedMetrics, FontMetrics, WidthCache};
use crate::ConfigurationError;
use id_arena::{Arena, Id};
use std::collections::HashMap;
use std::sync::Arc;

/// One named font within a [FontSet]
struct FontEntry {
    name: String,
    metrics: Box<dyn FontMetrics>,
    fallback: bool,
}

/// A font looked up from a [FontResolver]
#[derive(Clone, Copy)]
pub struct ResolvedFont<'a> {
    pub name: &'a str,
    pub metrics: &'a dyn FontMetrics,
}

/// Anything that can turn a field's (optional) font name into font metrics
pub trait FontResolver {
    /// Look up `name`, or the fallback font when a field names no font
    fn resolve(&self, name: Option<&str>) -> Result<ResolvedFont<'_>, ConfigurationError>;
}

/// The fonts available to a template, keyed by their logical name. Exactly one of
/// them is flagged as the fallback, which is used by any field that names no font.
///
/// Build one with [FontSet::builder]; the fallback cardinality is validated once when
/// the set is built so that layout never has to guess.
///
/// Every font in the set measures through one [WidthCache], so repeated layout of the
/// same template reuses the widths measured the first time.
pub struct FontSet {
    fonts: Arena<FontEntry>,
    by_name: HashMap<String, Id<FontEntry>>,
    fallback: Id<FontEntry>,
    cache: Arc<WidthCache>,
}

#[derive(Default)]
pub struct FontSetBuilder {
    entries: Vec<FontEntry>,
    cache: Option<Arc<WidthCache>>,
}

impl FontSetBuilder {
    /// Add a font under a logical name. Adding a second font with the same name
    /// replaces the first.
    pub fn add<M>(mut self, name: impl Into<String>, metrics: M, fallback: bool) -> Self
    where
        M: FontMetrics + 'static,
    {
        let name = name.into();
        self.entries.retain(|entry| entry.name != name);
        self.entries.push(FontEntry {
            name,
            metrics: Box::new(metrics),
            fallback,
        });
        self
    }

    /// Measure through `cache` instead of a cache of the set's own, for instance to
    /// share widths between several font sets
    pub fn with_width_cache(mut self, cache: Arc<WidthCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validate the fallback flags and produce the font set
    pub fn build(self) -> Result<FontSet, ConfigurationError> {
        if self.entries.is_empty() {
            return Err(ConfigurationError::EmptyFontSet);
        }
        let fallbacks = self.entries.iter().filter(|entry| entry.fallback).count();
        match fallbacks {
            0 => return Err(ConfigurationError::NoFallbackFont),
            1 => {}
            n => return Err(ConfigurationError::MultipleFallbackFonts(n)),
        }

        let cache = self.cache.unwrap_or_default();
        let mut fonts = Arena::new();
        let mut by_name = HashMap::with_capacity(self.entries.len());
        let mut fallback = None;
        for entry in self.entries {
            let is_fallback = entry.fallback;
            let name = entry.name.clone();
            let id = fonts.alloc(FontEntry {
                metrics: Box::new(CachedMetrics::new(entry.metrics, Arc::clone(&cache))),
                ..entry
            });
            if is_fallback {
                fallback = Some(id);
            }
            by_name.insert(name, id);
        }

        Ok(FontSet {
            fonts,
            by_name,
            fallback: fallback.ok_or(ConfigurationError::NoFallbackFont)?,
            cache,
        })
    }
}

impl FontSet {
    pub fn builder() -> FontSetBuilder {
        FontSetBuilder::default()
    }

    /// The font used by fields that name no font
    pub fn fallback(&self) -> ResolvedFont<'_> {
        self.entry(self.fallback)
    }

    /// The cache every font in the set measures through
    pub fn width_cache(&self) -> &Arc<WidthCache> {
        &self.cache
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|(_, entry)| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.len() == 0
    }

    /// Check every font name referenced by a template's fields up front, reporting the
    /// first one that is not in this set
    pub fn check_fields<'n>(
        &self,
        names: impl IntoIterator<Item = &'n str>,
    ) -> Result<(), ConfigurationError> {
        for name in names {
            if !self.by_name.contains_key(name) {
                return Err(ConfigurationError::UnknownFont(name.to_string()));
            }
        }
        Ok(())
    }

    fn entry(&self, id: Id<FontEntry>) -> ResolvedFont<'_> {
        let entry = &self.fonts[id];
        ResolvedFont {
            name: &entry.name,
            metrics: entry.metrics.as_ref(),
        }
    }
}

impl FontResolver for FontSet {
    fn resolve(&self, name: Option<&str>) -> Result<ResolvedFont<'_>, ConfigurationError> {
        match name {
            None => Ok(self.fallback()),
            Some(name) => self
                .by_name
                .get(name)
                .map(|&id| self.entry(id))
                .ok_or_else(|| ConfigurationError::UnknownFont(name.to_string())),
        }
    }
}

/// A resolver over a single font, answering every lookup with it. This is the
/// degenerate case used when a caller has already picked the font for a field.
#[derive(Clone, Copy)]
pub struct SingleFont<'a> {
    name: &'a str,
    metrics: &'a dyn FontMetrics,
}

impl<'a> SingleFont<'a> {
    pub fn new(name: &'a str, metrics: &'a dyn FontMetrics) -> Self {
        SingleFont { name, metrics }
    }
}

impl FontResolver for SingleFont<'_> {
    fn resolve(&self, _name: Option<&str>) -> Result<ResolvedFont<'_>, ConfigurationError> {
        Ok(ResolvedFont {
            name: self.name,
            metrics: self.metrics,
        })
    }
}
