//! The dungeon the demo walks around in.

use compact_str::{CompactString, format_compact};
use rogueterm_core::{
    BufferError, CallbackError, CellBuffer, CellStyle, Color, Frame, GlyphCell, GridBuffer,
    RectCell,
};

const MAP: [&str; 11] = [
    "##########################",
    "#........#...............#",
    "#........#....~~~~.......#",
    "#........+....~~~~.......#",
    "#........#...............#",
    "######+###########.#######",
    "#......................#.#",
    "#..####.........#......#.#",
    "#..#..#.........#......+.#",
    "#.............###........#",
    "##########################",
];

/// Rows above the map: title and a blank line.
const MAP_TOP: u16 = 2;
const MAP_LEFT: u16 = 1;
/// Frames between two steps while a direction key is held.
const MOVE_INTERVAL: u64 = 6;

const WALL: Color = Color::rgb(0x8a, 0x7f, 0x6e);
const FLOOR: Color = Color::rgb(0x3a, 0x3a, 0x44);
const WATER: Color = Color::rgb(0x30, 0x70, 0xd0);
const DOOR: Color = Color::rgb(0xa0, 0x60, 0x20);
const PLAYER: Color = Color::rgb(0xff, 0xdd, 0x33);
const TEXT: Color = Color::rgb(0xc8, 0xc8, 0xc8);
const BAR: Color = Color::rgb(0x90, 0x18, 0x18);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Left,
    Right,
    Up,
    Down,
}

impl Step {
    fn from_key(name: &str) -> Option<Self> {
        match name {
            "left" | "a" => Some(Step::Left),
            "right" | "d" => Some(Step::Right),
            "up" | "w" => Some(Step::Up),
            "down" | "s" => Some(Step::Down),
            _ => None,
        }
    }

    fn offset(self) -> (i32, i32) {
        match self {
            Step::Left => (-1, 0),
            Step::Right => (1, 0),
            Step::Up => (0, -1),
            Step::Down => (0, 1),
        }
    }
}

fn tile(x: i32, y: i32) -> Option<char> {
    let row = MAP.get(usize::try_from(y).ok()?)?;
    row.chars().nth(usize::try_from(x).ok()?)
}

fn walkable(x: i32, y: i32) -> bool {
    matches!(tile(x, y), Some('.' | '+'))
}

/// Player position and pacing; drawn from scratch every frame.
#[derive(Debug)]
pub struct Scene {
    player: (i32, i32),
    last_step: Option<u64>,
    steps: u32,
    frame_limit: Option<u64>,
}

impl Scene {
    pub fn new(frame_limit: Option<u64>) -> Self {
        Self { player: (2, 2), last_step: None, steps: 0, frame_limit }
    }

    /// Per-frame callback handed to the console.
    pub fn frame(&mut self, frame: &mut Frame<'_, GridBuffer>) -> Result<(), CallbackError> {
        let index = frame.frame_index();
        let keys = frame.keys_pressed();

        if keys.iter().any(|key| key == "escape") {
            tracing::info!(frame = index, "escape pressed, leaving the dungeon");
            frame.stop();
        }
        if self.frame_limit.is_some_and(|limit| index + 1 >= limit) {
            frame.stop();
        }

        self.update(&keys, index);
        self.draw(frame.buffer_mut(), index)?;
        Ok(())
    }

    fn update(&mut self, keys: &[CompactString], frame_index: u64) {
        let Some(step) = keys.iter().find_map(|key| Step::from_key(key)) else {
            self.last_step = None;
            return;
        };
        if self.last_step.is_some_and(|last| frame_index < last + MOVE_INTERVAL) {
            return;
        }

        self.last_step = Some(frame_index);
        let (dx, dy) = step.offset();
        let (x, y) = (self.player.0 + dx, self.player.1 + dy);
        if walkable(x, y) {
            self.player = (x, y);
            self.steps += 1;
        } else {
            tracing::trace!(x, y, "bumped into the dungeon");
        }
    }

    fn draw(&self, buffer: &mut GridBuffer, frame_index: u64) -> Result<(), BufferError> {
        buffer.clear();
        let (cols, rows) = buffer.size();
        if cols == 0 || rows == 0 {
            return Ok(());
        }

        put_text(
            buffer,
            0,
            " The Cellar ",
            TEXT,
            CellStyle::UNDERLINE | CellStyle::ITALIC,
        )?;

        for (y, line) in (0..).zip(MAP) {
            for (x, ch) in (0..).zip(line.chars()) {
                let fg = match ch {
                    '#' => WALL,
                    '~' => WATER,
                    '+' => DOOR,
                    _ => FLOOR,
                };
                put_clipped(buffer, GlyphCell::new(MAP_LEFT + x, MAP_TOP + y, ch).fg(fg))?;
            }
        }

        let (px, py) = self.player;
        if let (Ok(px), Ok(py)) = (u16::try_from(px), u16::try_from(py)) {
            let player = GlyphCell::new(MAP_LEFT + px, MAP_TOP + py, '@')
                .fg(PLAYER)
                .style(CellStyle::BOLD);
            put_clipped(buffer, player)?;
        }

        let status = format_compact!("frame {frame_index:>6}  steps {:>4}", self.steps);
        put_text(buffer, rows - 1, &status, TEXT, CellStyle::empty())?;

        // stamina bar in the top-left corner, shrinking one cell per 8 steps
        let width = 10u16.saturating_sub((self.steps / 8).min(10) as u16);
        if width > 0 {
            buffer.fill_rect(RectCell::new(0, 0, width, 1, BAR));
        }

        Ok(())
    }
}

/// Writes a glyph if it falls inside the grid.
fn put_clipped(buffer: &mut GridBuffer, cell: GlyphCell) -> Result<(), BufferError> {
    let (cols, rows) = buffer.size();
    if cell.col < cols && cell.row < rows {
        buffer.put(cell)?;
    }
    Ok(())
}

fn put_text(
    buffer: &mut GridBuffer,
    row: u16,
    text: &str,
    fg: Color,
    style: CellStyle,
) -> Result<(), BufferError> {
    if row < buffer.size().1 {
        buffer.put_str(0, row, text, fg, Color::BLACK, style)?;
    }
    Ok(())
}
