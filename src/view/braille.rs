use ratatui::prelude::*;

/// Braille dot positions within a 2x4 cell:
/// (0,0)=0x01 (1,0)=0x08
/// (0,1)=0x02 (1,1)=0x10
/// (0,2)=0x04 (1,2)=0x20
/// (0,3)=0x40 (1,3)=0x80
pub const DOT_MAP: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40],
    [0x08, 0x10, 0x20, 0x80],
];

/// A canvas for sub-character braille rendering.
/// Each terminal character cell maps to a 2x4 grid of dots and remembers the
/// largest value plotted into it, which drives the cell colour.
pub struct BrailleCanvas {
    pub grid: Vec<bool>,
    pub grid_w: usize,
    pub grid_h: usize,
    cells: Vec<Option<f64>>,
    char_w: usize,
    char_h: usize,
}

impl BrailleCanvas {
    /// Create a new braille canvas for the given character dimensions.
    pub fn new(char_w: usize, char_h: usize) -> Self {
        let grid_w = char_w * 2;
        let grid_h = char_h * 4;
        Self {
            grid: vec![false; grid_w * grid_h],
            grid_w,
            grid_h,
            cells: vec![None; char_w * char_h],
            char_w,
            char_h,
        }
    }

    /// Set a dot and fold `value` into its cell (bounds-checked).
    #[inline]
    pub fn plot(&mut self, gx: usize, gy: usize, value: f64) {
        if gx < self.grid_w && gy < self.grid_h {
            self.grid[gy * self.grid_w + gx] = true;
            let cell = &mut self.cells[(gy / 4) * self.char_w + gx / 2];
            *cell = Some(cell.map_or(value, |v| v.max(value)));
        }
    }

    /// Value of the character cell at (cx, cy), if anything was plotted there.
    pub fn cell_value(&self, cx: usize, cy: usize) -> Option<f64> {
        if cx < self.char_w && cy < self.char_h {
            self.cells[cy * self.char_w + cx]
        } else {
            None
        }
    }

    /// Braille glyph for the cell at (cx, cy), or None when empty.
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        let mut braille: u8 = 0;
        for (dx, col) in DOT_MAP.iter().enumerate() {
            for (dy, &bit) in col.iter().enumerate() {
                let gx = cx * 2 + dx;
                let gy = cy * 4 + dy;
                if gx < self.grid_w && gy < self.grid_h && self.grid[gy * self.grid_w + gx] {
                    braille |= bit;
                }
            }
        }
        (braille != 0).then(|| char::from_u32(0x2800 + braille as u32).unwrap_or(' '))
    }

    /// Encode the grid to braille characters and write them to the frame buffer.
    /// `color_fn(value)` maps a cell's value to an RGB colour.
    pub fn render(&self, frame: &mut Frame, area: Rect, color_fn: impl Fn(f64) -> (u8, u8, u8)) {
        for cy in 0..self.char_h {
            for cx in 0..self.char_w {
                let (Some(ch), Some(value)) = (self.glyph(cx, cy), self.cell_value(cx, cy)) else {
                    continue;
                };
                let (r, g, b) = color_fn(value);
                let cell = frame
                    .buffer_mut()
                    .cell_mut((area.x + cx as u16, area.y + cy as u16));
                if let Some(cell) = cell {
                    cell.set_char(ch);
                    cell.set_fg(Color::Rgb(r, g, b));
                }
            }
        }
    }
}
