//! A shared cache of parsed fonts.
//!
//! Each key gets one cell which is initialised at most once. The first caller for a key parses the
//! font while concurrent callers for the same key wait on the cell, later callers read it without
//! contention. The map lock is only held long enough to find or create a cell, so fonts with
//! different keys are parsed in parallel.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::debug;
use rustc_hash::FxHashMap;

use crate::charmap::CidToGidMap;
use crate::error::FontError;
use crate::font::FontTableSet;
use crate::resource::FontKey;
use crate::text::FontSource;

type Cell<T> = Arc<OnceLock<Result<Arc<T>, FontError>>>;

/// Parsed fonts and their CID to glyph id maps, keyed by font identity.
///
/// Failures are cached too: a font that fails to parse fails the same way for every caller
/// until it is released.
pub struct FontCache<K = FontKey> {
    fonts: Mutex<FxHashMap<K, Cell<FontTableSet>>>,
    cid_to_gid_maps: Mutex<FxHashMap<K, Cell<CidToGidMap>>>,
}

impl<K> FontCache<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        FontCache {
            fonts: Mutex::new(FxHashMap::default()),
            cid_to_gid_maps: Mutex::new(FxHashMap::default()),
        }
    }

    /// Return the parsed font for `key`, calling `load` for its bytes if it hasn't been parsed.
    pub fn get_or_parse<F>(&self, key: &K, load: F) -> Result<Arc<FontTableSet>, FontError>
    where
        F: FnOnce() -> Result<Vec<u8>, FontError>,
    {
        let cell = cell(&self.fonts, key);
        if let Some(font) = cell.get() {
            debug!("font cache hit for {:?}", key);
            return font.clone();
        }
        cell.get_or_init(|| {
            let data = load()?;
            let font = FontTableSet::parse(&data)?;
            debug!(
                "parsed font {:?}: {} glyphs, {} units per em",
                key,
                font.num_glyphs(),
                font.units_per_em()
            );
            Ok(Arc::new(font))
        })
        .clone()
    }

    /// Return the parsed font for `key` if it has been parsed.
    pub fn get(&self, key: &K) -> Option<Result<Arc<FontTableSet>, FontError>> {
        let fonts = self.fonts.lock().unwrap_or_else(PoisonError::into_inner);
        fonts.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the CID to glyph id map of the font for `key`, building it on first use.
    pub fn cid_to_gid_map<F>(&self, key: &K, load: F) -> Result<Arc<CidToGidMap>, FontError>
    where
        F: FnOnce() -> Result<Vec<u8>, FontError>,
    {
        let font = self.get_or_parse(key, load)?;
        cell(&self.cid_to_gid_maps, key)
            .get_or_init(|| {
                debug!("building CID to glyph id map for {:?}", key);
                let map = font.char_map()?.build_full_map();
                Ok(Arc::new(map))
            })
            .clone()
    }

    /// Discard everything cached for `key`. Returns `true` if anything was cached.
    ///
    /// Callers still holding the font keep it alive until they drop it.
    pub fn release(&self, key: &K) -> bool {
        let font = self
            .fonts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        let map = self
            .cid_to_gid_maps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        font.is_some() || map.is_some()
    }

    /// The number of fonts in the cache, including ones that failed to parse.
    pub fn len(&self) -> usize {
        self.fonts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FontCache<FontKey> {
    /// Return the parsed font for `key`, reading its bytes from `source` on first use.
    pub fn font_from_source(
        &self,
        source: &impl FontSource,
        key: &FontKey,
    ) -> Result<Arc<FontTableSet>, FontError> {
        self.get_or_parse(key, || source.font_data(key))
    }
}

impl<K> Default for FontCache<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        FontCache::new()
    }
}

fn cell<K, T>(map: &Mutex<FxHashMap<K, Cell<T>>>, key: &K) -> Cell<T>
where
    K: Eq + Hash + Clone,
{
    let mut map = map.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(map.entry(key.clone()).or_default())
}
