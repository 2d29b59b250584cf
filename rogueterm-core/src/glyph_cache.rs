//! Cache of rasterized glyph images keyed by cell appearance.
//!
//! - One image per distinct [`CellIdentity`]; identical cells share it
//! - No capacity bound and no expiry: entries live until [`GlyphCache::clear`]
//! - Backed by an LRU map, so a capacity bound can be added later without
//!   changing callers
//!
//! The unbounded table assumes a small working set of character, color and
//! style combinations, which holds for terminal-like displays. A console that
//! cycles through many distinct colors per frame grows the cache without
//! limit until it is cleared.

use lru::LruCache;
use rogueterm_data::{CellIdentity, GlyphRasterizer};
use rustc_hash::FxBuildHasher;

use crate::{error::Error, surface::Surface};

/// A surface-owned glyph image and its pixel size.
#[derive(Debug)]
pub struct RasterImage<I> {
    handle: I,
    width: u32,
    height: u32,
}

impl<I> RasterImage<I> {
    /// The surface image handle.
    pub fn handle(&self) -> &I {
        &self.handle
    }

    /// (width, height) in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Lookup counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: u64,
    pub misses: u64,
}

impl CacheStats {
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.lookups - self.misses
    }
}

/// Maps cell identities to rasterized images, rasterizing on first use.
pub struct GlyphCache<R, I> {
    rasterizer: R,
    entries: LruCache<CellIdentity, RasterImage<I>, FxBuildHasher>,
    stats: CacheStats,
}

impl<R: GlyphRasterizer, I> GlyphCache<R, I> {
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            entries: LruCache::unbounded_with_hasher(FxBuildHasher),
            stats: CacheStats::default(),
        }
    }

    /// Returns the image for `identity`, rasterizing and uploading it to
    /// `surface` on a miss.
    ///
    /// # Errors
    /// Fails if rasterization or image creation fails; nothing is cached in
    /// that case.
    pub fn get_or_create<S>(
        &mut self,
        identity: &CellIdentity,
        surface: &mut S,
    ) -> Result<&RasterImage<I>, Error>
    where
        S: Surface<Image = I> + ?Sized,
    {
        self.stats.lookups += 1;

        let Self { rasterizer, entries, stats } = self;
        entries.try_get_or_insert(*identity, || {
            stats.misses += 1;

            let bitmap = rasterizer.rasterize(identity)?;
            let (width, height) = bitmap.size();
            let handle = surface.create_image(&bitmap)?;
            tracing::trace!(?identity, width, height, "rasterized glyph");

            Ok(RasterImage { handle, width, height })
        })
    }

    /// Destroys every cached image and empties the table.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: Surface<Image = I> + ?Sized,
    {
        let released = self.entries.len();
        while let Some((_, image)) = self.entries.pop_lru() {
            surface.destroy_image(image.handle);
        }

        if released > 0 {
            tracing::debug!(released, "cleared glyph cache");
        }
    }

    /// Releases the rasterizer's font resources.
    pub fn release_rasterizer(&mut self) {
        self.rasterizer.release();
    }

    pub fn contains(&self, identity: &CellIdentity) -> bool {
        self.entries.contains(identity)
    }

    /// Returns total number of cached glyphs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }
}

impl<R, I> std::fmt::Debug for GlyphCache<R, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rogueterm_data::{CellStyle, Color, GlyphBitmap, RasterizeError};

    use super::*;
    use crate::surface::PixelRect;

    /// Counts rasterizations per identity.
    #[derive(Default)]
    struct CountingRasterizer {
        calls: Vec<CellIdentity>,
        fail_on: Option<char>,
    }

    impl GlyphRasterizer for CountingRasterizer {
        fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
            if self.fail_on == Some(identity.ch) {
                return Err(RasterizeError::glyph_render_failed(identity.ch));
            }

            self.calls.push(*identity);
            Ok(GlyphBitmap::filled(8, 16, identity.fg.to_rgba()))
        }
    }

    /// Hands out sequential image ids and records destroyed ones.
    #[derive(Default)]
    struct HandleSurface {
        next_id: u32,
        destroyed: Vec<u32>,
    }

    impl Surface for HandleSurface {
        type Image = u32;

        fn pixel_size(&self) -> (u32, u32) {
            (0, 0)
        }

        fn set_draw_color(&mut self, _color: Color) {}

        fn clear(&mut self) {}

        fn fill_rect(&mut self, _rect: PixelRect) {}

        fn copy_image(&mut self, _image: &u32, _dst: PixelRect) {}

        fn present(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn create_image(&mut self, _bitmap: &GlyphBitmap) -> Result<u32, Error> {
            self.next_id += 1;
            Ok(self.next_id)
        }

        fn destroy_image(&mut self, image: u32) {
            self.destroyed.push(image);
        }
    }

    fn identity(ch: char, style: CellStyle) -> CellIdentity {
        CellIdentity::new(ch, Color::WHITE, Color::BLACK, style)
    }

    fn cache() -> GlyphCache<CountingRasterizer, u32> {
        GlyphCache::new(CountingRasterizer::default())
    }

    #[test]
    fn repeated_lookup_reuses_image() {
        let mut cache = cache();
        let mut surface = HandleSurface::default();
        let at = identity('@', CellStyle::empty());

        let first = *cache.get_or_create(&at, &mut surface).unwrap().handle();
        let second = *cache.get_or_create(&at, &mut surface).unwrap().handle();

        assert_eq!(first, second);
        assert_eq!(cache.rasterizer().calls, vec![at]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), CacheStats { lookups: 2, misses: 1 });
        assert_eq!(cache.stats().hits(), 1);
    }

    #[test]
    fn single_style_flag_yields_distinct_entries() {
        let mut cache = cache();
        let mut surface = HandleSurface::default();
        let plain = identity('A', CellStyle::empty());
        let bold = identity('A', CellStyle::BOLD);

        let plain_handle = *cache.get_or_create(&plain, &mut surface).unwrap().handle();
        let bold_handle = *cache.get_or_create(&bold, &mut surface).unwrap().handle();

        assert_ne!(plain_handle, bold_handle);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.rasterizer().calls, vec![plain, bold]);
    }

    #[test]
    fn colors_are_part_of_the_key() {
        let mut cache = cache();
        let mut surface = HandleSurface::default();
        let white = identity('x', CellStyle::empty());
        let red = CellIdentity { fg: Color::rgb(255, 0, 0), ..white };

        cache.get_or_create(&white, &mut surface).unwrap();
        cache.get_or_create(&red, &mut surface).unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_destroys_everything_and_forces_rerasterization() {
        let mut cache = cache();
        let mut surface = HandleSurface::default();
        let a = identity('a', CellStyle::empty());
        let b = identity('b', CellStyle::ITALIC);

        cache.get_or_create(&a, &mut surface).unwrap();
        cache.get_or_create(&b, &mut surface).unwrap();
        cache.clear(&mut surface);

        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert!(!cache.contains(&a));
        surface.destroyed.sort_unstable();
        assert_eq!(surface.destroyed, vec![1, 2]);

        let handle = *cache.get_or_create(&a, &mut surface).unwrap().handle();
        assert_eq!(handle, 3);
        assert_eq!(cache.rasterizer().calls, vec![a, b, a]);
    }

    #[test]
    fn clear_on_empty_cache_is_noop() {
        let mut cache = cache();
        let mut surface = HandleSurface::default();

        cache.clear(&mut surface);
        cache.clear(&mut surface);

        assert!(cache.is_empty());
        assert!(surface.destroyed.is_empty());
    }

    #[test]
    fn failed_rasterization_is_not_cached() {
        let mut cache = GlyphCache::new(CountingRasterizer {
            fail_on: Some('?'),
            ..CountingRasterizer::default()
        });
        let mut surface = HandleSurface::default();
        let broken = identity('?', CellStyle::empty());

        let result = cache.get_or_create(&broken, &mut surface);

        assert!(matches!(result, Err(Error::Rasterization(_))));
        assert!(cache.is_empty());
        assert_eq!(surface.next_id, 0);
    }
}
