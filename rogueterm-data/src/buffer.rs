use unicode_width::UnicodeWidthChar;

use crate::{Cell, CellStyle, Color, GlyphCell, RectCell};

/// Storage the console presents from.
///
/// Iteration is restartable and reflects the current content: mutating or
/// resizing the buffer between two iterations changes what the second one
/// yields.
pub trait CellBuffer {
    /// Grid size in (columns, rows).
    fn size(&self) -> (u16, u16);

    /// Resizes the grid in place. Either dimension may be zero, in which case
    /// iteration yields nothing.
    fn resize(&mut self, cols: u16, rows: u16);

    /// Iterates the drawable cells in presentation order.
    fn cells(&self) -> impl Iterator<Item = &Cell>;
}

/// Errors raised when writing to a [`GridBuffer`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("cell ({col}, {row}) is outside the {cols}x{rows} grid")]
    OutOfBounds { col: u16, row: u16, cols: u16, rows: u16 },

    #[error("character {0:?} cannot be drawn into a single cell")]
    Unrenderable(char),
}

/// Insertion-ordered cell buffer with at most one glyph per grid position.
///
/// Writing a glyph to an occupied position replaces the previous glyph in
/// place, keeping its presentation order. Rectangles are drawn in the order
/// they were added; adding a rectangle identical to a stored one is a no-op.
#[derive(Debug, Clone, Default)]
pub struct GridBuffer {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
    /// index into `cells` for each grid position, row-major
    slots: Vec<Option<usize>>,
}

impl GridBuffer {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: Vec::new(),
            slots: vec![None; cols as usize * rows as usize],
        }
    }

    /// Writes a glyph cell.
    ///
    /// # Errors
    /// Fails if the position lies outside the grid or the character has no
    /// printable width (control characters).
    pub fn put(&mut self, cell: GlyphCell) -> Result<(), BufferError> {
        let slot = self.slot_index(cell.col, cell.row)?;
        if cell.ch.width().is_none() {
            return Err(BufferError::Unrenderable(cell.ch));
        }

        match self.slots[slot] {
            Some(idx) => self.cells[idx] = Cell::Glyph(cell),
            None => {
                self.slots[slot] = Some(self.cells.len());
                self.cells.push(Cell::Glyph(cell));
            },
        }

        Ok(())
    }

    /// Writes `text` left to right starting at (`col`, `row`), clipping at the
    /// right edge of the grid. Returns the number of cells written.
    ///
    /// # Errors
    /// Fails if the start position lies outside the grid or the text contains
    /// an unrenderable character.
    pub fn put_str(
        &mut self,
        col: u16,
        row: u16,
        text: &str,
        fg: Color,
        bg: Color,
        style: CellStyle,
    ) -> Result<usize, BufferError> {
        self.slot_index(col, row)?;

        let mut written = 0;
        for (ch, x) in text.chars().zip(col..self.cols) {
            self.put(GlyphCell { col: x, row, ch, fg, bg, style })?;
            written += 1;
        }

        Ok(written)
    }

    /// Appends a filled rectangle unless an identical one is already stored,
    /// in which case it keeps its original presentation order. Redrawing the
    /// same rectangles every frame does not grow the buffer; rectangles that
    /// change must be removed with [`GridBuffer::clear`].
    ///
    /// Finding a duplicate is a linear scan over the stored cells.
    pub fn fill_rect(&mut self, rect: RectCell) {
        let cell = Cell::Rect(rect);
        if !self.cells.contains(&cell) {
            self.cells.push(cell);
        }
    }

    /// Returns the glyph at a grid position, if any.
    #[must_use]
    pub fn glyph_at(&self, col: u16, row: u16) -> Option<&GlyphCell> {
        let idx = self.slots[self.slot_index(col, row).ok()?]?;
        match &self.cells[idx] {
            Cell::Glyph(glyph) => Some(glyph),
            Cell::Rect(_) => None,
        }
    }

    /// Removes every cell, keeping the grid size.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.slots.fill(None);
    }

    /// Number of stored cells, glyphs and rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn slot_index(&self, col: u16, row: u16) -> Result<usize, BufferError> {
        if col >= self.cols || row >= self.rows {
            return Err(BufferError::OutOfBounds {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }

        Ok(row as usize * self.cols as usize + col as usize)
    }

    fn rebuild_slots(&mut self) {
        self.slots = vec![None; self.cols as usize * self.rows as usize];
        let cols = self.cols as usize;
        for (idx, cell) in self.cells.iter().enumerate() {
            if let Cell::Glyph(glyph) = cell {
                self.slots[glyph.row as usize * cols + glyph.col as usize] = Some(idx);
            }
        }
    }
}

impl CellBuffer for GridBuffer {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) == (self.cols, self.rows) {
            return;
        }

        self.cols = cols;
        self.rows = rows;
        self.cells.retain(|cell| match cell {
            Cell::Glyph(glyph) => glyph.col < cols && glyph.row < rows,
            Cell::Rect(_) => true,
        });
        self.rebuild_slots();
    }

    fn cells(&self) -> impl Iterator<Item = &Cell> {
        let visible = if self.cols == 0 || self.rows == 0 { &[][..] } else { &self.cells[..] };
        visible.iter()
    }
}
