use std::sync::Arc;

use fontdb::{Database, Family, ID, Query, Style, Weight};
use rogueterm_data::{CellStyle, RasterizeError};
use swash::{CacheKey, FontRef};

/// Weights at or above this count as bold.
const BOLD_WEIGHT: u16 = 600;

/// Adjustments applied when a face stands in for a style it does not have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Synthesis {
    pub(crate) embolden: bool,
    pub(crate) skew: bool,
}

impl Synthesis {
    /// What must be synthesized to render `requested` with a face of the
    /// given weight and slant.
    pub(crate) fn needed(requested: CellStyle, weight: u16, italic: bool) -> Self {
        Self {
            embolden: requested.contains(CellStyle::BOLD) && weight < BOLD_WEIGHT,
            skew: requested.contains(CellStyle::ITALIC) && !italic,
        }
    }
}

/// An owned font face, shareable between style slots.
pub(crate) struct Face {
    data: Arc<Vec<u8>>,
    offset: u32,
    key: CacheKey,
    pub(crate) synthesis: Synthesis,
}

impl Face {
    fn new(data: Arc<Vec<u8>>, index: u32, synthesis: Synthesis) -> Option<Self> {
        let font = FontRef::from_index(&data, index as usize)?;
        let (offset, key) = (font.offset, font.key);

        Some(Self { data, offset, key, synthesis })
    }

    pub(crate) fn font(&self) -> FontRef<'_> {
        FontRef { data: &self.data, offset: self.offset, key: self.key }
    }
}

/// The four style variants of one family, indexed by bold and italic.
pub(crate) struct FontFaces {
    faces: [Face; 4],
}

impl FontFaces {
    /// Loads regular, bold, italic and bold-italic faces of `family`, or of
    /// the system monospace family when `None`. Missing variants reuse the
    /// regular face and are synthesized at render time.
    pub(crate) fn load(db: &Database, family: Option<&str>) -> Result<Self, RasterizeError> {
        let name = family.unwrap_or("monospace");
        let families = match family {
            Some(name) => [Family::Name(name)],
            None => [Family::Monospace],
        };

        let regular_id = query(db, &families, CellStyle::empty())
            .or_else(|| family.is_none().then(|| first_monospaced(db)).flatten())
            .ok_or_else(|| RasterizeError::font_not_found(name))?;
        let (regular_data, regular_index) = db
            .with_face_data(regular_id, |data, index| (Arc::new(data.to_vec()), index))
            .ok_or_else(|| RasterizeError::font_load_failed(name))?;

        let load_variant = |style: CellStyle| -> Result<Face, RasterizeError> {
            let id = query(db, &families, style).unwrap_or(regular_id);
            let (data, index) = if id == regular_id {
                (regular_data.clone(), regular_index)
            } else {
                db.with_face_data(id, |data, index| (Arc::new(data.to_vec()), index))
                    .ok_or_else(|| RasterizeError::font_load_failed(name))?
            };

            let synthesis = db
                .face(id)
                .map(|info| Synthesis::needed(style, info.weight.0, info.style != Style::Normal))
                .unwrap_or_default();
            tracing::debug!(family = name, ?style, ?synthesis, "loaded font face");

            Face::new(data, index, synthesis).ok_or_else(|| RasterizeError::font_load_failed(name))
        };

        Ok(Self {
            faces: [
                load_variant(CellStyle::empty())?,
                load_variant(CellStyle::BOLD)?,
                load_variant(CellStyle::ITALIC)?,
                load_variant(CellStyle::BOLD | CellStyle::ITALIC)?,
            ],
        })
    }

    pub(crate) fn regular(&self) -> &Face {
        &self.faces[0]
    }

    /// The face for a cell style; decorations do not affect the choice.
    pub(crate) fn select(&self, style: CellStyle) -> &Face {
        &self.faces[slot(style)]
    }
}

fn slot(style: CellStyle) -> usize {
    match (style.contains(CellStyle::BOLD), style.contains(CellStyle::ITALIC)) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    }
}

fn query(db: &Database, families: &[Family<'_>], style: CellStyle) -> Option<ID> {
    db.query(&Query {
        families,
        weight: if style.contains(CellStyle::BOLD) { Weight::BOLD } else { Weight::NORMAL },
        style: if style.contains(CellStyle::ITALIC) { Style::Italic } else { Style::Normal },
        ..Query::default()
    })
}

fn first_monospaced(db: &Database) -> Option<ID> {
    db.faces()
        .find(|face| face.monospaced && face.style == Style::Normal)
        .map(|face| face.id)
}
