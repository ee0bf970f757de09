use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use pixelwall_store::prelude::{HexColor, Pixel, PixelLoc};

use crate::protocol::Paint;

/// Size of the wall in blocks. Coordinates run from `0` to `width - 1` and `height - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            width: 21,
            height: 6,
        }
    }
}

impl Grid {
    pub fn contains(&self, loc: PixelLoc) -> bool {
        (0..self.width as i64).contains(&loc.x) && (0..self.height as i64).contains(&loc.y)
    }
}

/// The wall's colors at one point in time. Never changes once built; cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallSnapshot {
    grid: Grid,
    cells: Arc<HashMap<PixelLoc, HexColor>>,
}

impl WallSnapshot {
    pub fn empty(grid: Grid) -> Self {
        Self {
            grid,
            cells: Arc::new(HashMap::new()),
        }
    }

    /// Builds the snapshot from the server's full pixel list. Blocks the list does not mention
    /// are unset; pixels outside the grid are ignored.
    pub fn from_pixels(grid: Grid, pixels: impl IntoIterator<Item = Pixel>) -> Self {
        let cells = pixels
            .into_iter()
            .filter(|pixel| grid.contains(pixel.loc()))
            .map(|pixel| (pixel.loc(), pixel.color))
            .collect();
        Self {
            grid,
            cells: Arc::new(cells),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn color_at(&self, x: i64, y: i64) -> Option<&HexColor> {
        self.cells.get(&PixelLoc { x, y })
    }

    /// Number of blocks holding a color.
    pub fn painted(&self) -> usize {
        self.cells.len()
    }

    /// A copy of this snapshot with one block repainted. Out-of-grid coordinates leave it as is.
    pub fn with_paint(&self, x: i64, y: i64, paint: &Paint) -> Self {
        let loc = PixelLoc { x, y };
        if !self.grid.contains(loc) {
            return self.clone();
        }
        let mut cells = (*self.cells).clone();
        match paint {
            Paint::Color(color) => {
                cells.insert(loc, color.clone());
            }
            Paint::Unset => {
                cells.remove(&loc);
            }
        }
        Self {
            grid: self.grid,
            cells: Arc::new(cells),
        }
    }
}

/// Draws the wall for a truecolor terminal, top row first. Unset blocks are dots.
pub fn render_text(snapshot: &WallSnapshot) -> String {
    let grid = snapshot.grid();
    let mut out = String::new();
    for y in (0..grid.height as i64).rev() {
        for x in 0..grid.width as i64 {
            match snapshot.color_at(x, y) {
                Some(color) => {
                    let [r, g, b] = color.rgb();
                    let _ = write!(out, "\x1b[48;2;{};{};{}m  \x1b[0m", r, g, b);
                }
                None => out.push_str(" ."),
            }
        }
        out.push('\n');
    }
    out
}
