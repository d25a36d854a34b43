//! Playfield grid.
//!
//! Cells live in one row-major vector. Live games use the 10x20 field; the combo
//! table builder makes 4-column scratch boards of the same type.
//! `(x, y)` counts x from the left wall and y down from the top row.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Grid of locked cells
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: u8,
    height: u8,
    /// `y * width + x`
    cells: Vec<Cell>,
}

impl Board {
    /// Empty 10x20 field
    pub fn new() -> Self {
        Self::with_size(BOARD_WIDTH, BOARD_HEIGHT)
    }

    pub fn with_size(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= self.width as i8 || y < 0 || y >= self.height as i8 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// `None` outside the grid, `Some(None)` for an empty cell
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Writes a cell; out-of-range writes are ignored and report `false`
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// In range and empty
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// In range and filled. Cells outside the grid are not occupied.
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        let start = y * self.width as usize;
        let end = start + self.width as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Number of full rows (without clearing them)
    pub fn count_full_rows(&self) -> usize {
        (0..self.height as usize)
            .filter(|&y| self.is_row_full(y))
            .count()
    }

    /// Removes full rows, shifting everything above them down.
    ///
    /// Returns the pre-clear indices of removed rows, lowest row first. A
    /// single lock never fills more than four rows.
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, 4> {
        let mut removed = ArrayVec::new();
        let width = self.width as usize;
        let mut write_y = self.height as usize;

        for read_y in (0..self.height as usize).rev() {
            if self.is_row_full(read_y) && !removed.is_full() {
                removed.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let from = read_y * width;
                    self.cells.copy_within(from..from + width, write_y * width);
                }
            }
        }

        self.cells[..write_y * width].fill(None);

        removed
    }

    /// Writes `kind` into every shape cell offset by `(x, y)`.
    ///
    /// Nothing is written unless all cells are free.
    pub fn lock_piece(&mut self, shape: &[(i8, i8)], x: i8, y: i8, kind: PieceKind) -> bool {
        if !shape.iter().all(|&(dx, dy)| self.is_valid(x + dx, y + dy)) {
            return false;
        }

        for &(dx, dy) in shape {
            self.set(x + dx, y + dy, Some(kind));
        }

        true
    }

    /// Stack height of column `x` (0 for an empty column)
    ///
    /// Heights are always derived from the grid, never cached.
    pub fn column_height(&self, x: usize) -> u8 {
        if x >= self.width as usize {
            return 0;
        }
        (0..self.height as usize)
            .find(|&y| self.cells[y * self.width as usize + x].is_some())
            .map(|top| self.height - top as u8)
            .unwrap_or(0)
    }

    /// Heights of the first `columns` columns
    pub fn heights(&self, columns: usize) -> Vec<u8> {
        (0..columns.min(self.width as usize))
            .map(|x| self.column_height(x))
            .collect()
    }

    /// Fill every cell outside the well `[well_x, well_x + well_width)`
    /// from row `top_row` down to the floor.
    ///
    /// Used by the 4-wide combo mode to keep the side walls at a constant height.
    pub fn fill_walls(&mut self, well_x: u8, well_width: u8, top_row: u8) {
        for y in top_row.min(self.height)..self.height {
            for x in 0..self.width {
                if x >= well_x && x < well_x + well_width {
                    continue;
                }
                let idx = y as usize * self.width as usize + x as usize;
                if self.cells[idx].is_none() {
                    self.cells[idx] = Some(PieceKind::O);
                }
            }
        }
    }

    /// Build a board from text rows, top row first (`#` or any non-space/non-dot is filled)
    ///
    /// Rows are aligned to the bottom of the board; missing rows stay empty.
    pub fn from_rows(width: u8, height: u8, rows: &[&str]) -> Self {
        let mut board = Self::with_size(width, height);
        let offset = height as usize - rows.len().min(height as usize);
        for (i, row) in rows.iter().take(height as usize).enumerate() {
            for (x, ch) in row.chars().take(width as usize).enumerate() {
                if ch != '.' && ch != ' ' {
                    board.set(x as i8, (offset + i) as i8, Some(PieceKind::O));
                }
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
