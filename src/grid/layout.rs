use super::hex::{HexLayout, OffsetCoord, PointF};
use crate::geometry::{Point, ScreenSize};
use crate::prefs::PreferenceSet;

/// Note at column 0 of the vertical center row.
const CENTER_NOTE: i32 = 55;
/// Odd hex columns start a minor third below the even ones.
const HEX_ODD_COLUMN_NOTE: i32 = 52;
/// Fourths between rectangular rows.
const RECT_ROW_STEP: i32 = 5;
/// Fifths between hex rows.
const HEX_ROW_STEP: i32 = 7;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A cell on the surface. `row` counts from the top of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridExtent {
    pub cols: u32,
    pub rows: u32,
}

impl GridExtent {
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as u32) < self.cols
            && (cell.row as u32) < self.rows
    }
}

/// Maps surface positions to grid cells and grid cells to MIDI notes.
#[derive(Debug, Clone)]
pub struct GridLayout {
    grid_size: u32,
    hex_grid_mode: bool,
    guitar_mode: bool,
    screen: ScreenSize,
    extent: GridExtent,
}

impl GridLayout {
    pub fn new(prefs: &PreferenceSet) -> Self {
        let mut layout = Self {
            grid_size: prefs.grid_size(),
            hex_grid_mode: prefs.hex_grid_mode(),
            guitar_mode: prefs.guitar_mode(),
            screen: ScreenSize::default(),
            extent: GridExtent::default(),
        };
        layout.resize(layout.screen);
        layout
    }

    /// Picks up layout-related preferences and recomputes the extent.
    pub fn configure(&mut self, prefs: &PreferenceSet) {
        self.grid_size = prefs.grid_size();
        self.hex_grid_mode = prefs.hex_grid_mode();
        self.guitar_mode = prefs.guitar_mode();
        self.resize(self.screen);
    }

    pub fn resize(&mut self, screen: ScreenSize) {
        self.screen = screen;
        self.extent = if self.hex_grid_mode {
            let (cols, rows) = self.hex_layout().grid_extent(screen);
            GridExtent { cols, rows }
        } else {
            GridExtent {
                cols: screen.width / self.grid_size,
                rows: screen.height / self.grid_size,
            }
        };
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn is_hex(&self) -> bool {
        self.hex_grid_mode
    }

    pub fn hex_layout(&self) -> HexLayout {
        HexLayout::for_grid_size(self.grid_size)
    }

    /// The cell under `point`, or `None` when it lies outside the grid.
    pub fn point_to_cell(&self, point: Point) -> Option<GridCell> {
        let cell = if self.hex_grid_mode {
            let coord = self.hex_layout().pixel_to_hex(point);
            GridCell::new(coord.col, coord.row)
        } else {
            if point.x < 0 || point.y < 0 {
                return None;
            }
            let size = self.grid_size as i32;
            GridCell::new(point.x / size, point.y / size)
        };
        self.extent.contains(cell).then_some(cell)
    }

    pub fn point_to_note(&self, point: Point) -> Option<u8> {
        self.point_to_cell(point).map(|cell| self.cell_to_note(cell))
    }

    /// MIDI note for a cell, clamped to `0..=127`. Pitch rises towards the
    /// top of the screen.
    pub fn cell_to_note(&self, cell: GridCell) -> u8 {
        let rows = self.extent.rows as i32;
        let row = rows - 1 - cell.row;
        let center_row = rows / 2;
        let note = if self.hex_grid_mode {
            let anchor = if cell.col % 2 == 0 {
                CENTER_NOTE
            } else {
                HEX_ODD_COLUMN_NOTE
            };
            anchor - center_row * HEX_ROW_STEP + cell.col / 2 + row * HEX_ROW_STEP
        } else {
            let mut offset = CENTER_NOTE - center_row * RECT_ROW_STEP;
            // major third between the G and B strings
            if self.guitar_mode && row > center_row {
                offset -= 1;
            }
            offset + cell.col + row * RECT_ROW_STEP
        };
        note.clamp(0, 127) as u8
    }

    pub fn cell_center(&self, cell: GridCell) -> PointF {
        if self.hex_grid_mode {
            self.hex_layout()
                .hex_to_pixel(OffsetCoord::new(cell.col, cell.row))
        } else {
            let size = self.grid_size as f64;
            PointF {
                x: (cell.col as f64 + 0.5) * size,
                y: (cell.row as f64 + 0.5) * size,
            }
        }
    }

    /// Closed outline of a cell, for drawing.
    pub fn cell_outline(&self, cell: GridCell) -> Vec<PointF> {
        if self.hex_grid_mode {
            self.hex_layout()
                .cell_corners(OffsetCoord::new(cell.col, cell.row))
                .to_vec()
        } else {
            let size = self.grid_size as f64;
            let left = cell.col as f64 * size;
            let top = cell.row as f64 * size;
            vec![
                PointF { x: left, y: top },
                PointF { x: left + size, y: top },
                PointF { x: left + size, y: top + size },
                PointF { x: left, y: top + size },
            ]
        }
    }

    /// All cells inside the extent, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + use<> {
        let GridExtent { cols, rows } = self.extent;
        (0..rows as i32).flat_map(move |row| (0..cols as i32).map(move |col| GridCell::new(col, row)))
    }
}

/// Scientific pitch name, with MIDI 60 as "C4".
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}
