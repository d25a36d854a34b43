//! Geometry provider - collision and reachability queries used by the AI
//!
//! The AI never looks at shape tables directly. It asks a [`Geometry`] for
//! collision tests, landing rows, horizontal movement bounds, wall kicks and
//! static per-rotation facts (width, leftmost column, bottom profile).
//! [`Srs`] is the standard implementation backed by [`crate::pieces`].

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::pieces::{get_shape, kicks, PieceShape};
use crate::types::{PieceKind, Rotation};

/// Per footprint column: (lowest level, level above the highest mino),
/// both measured from the piece's lowest mino.
pub type Profile = ArrayVec<(u8, u8), 4>;

pub trait Geometry: Send + Sync {
    fn shape(&self, kind: PieceKind, rotation: Rotation) -> PieceShape;

    /// Kick offsets tried in order for a quarter turn
    fn kick_offsets(&self, kind: PieceKind, from: Rotation, clockwise: bool) -> &[(i8, i8)];

    /// Number of distinct orientations worth searching
    fn rotation_count(&self, kind: PieceKind) -> usize;

    /// True when the piece overlaps a filled cell or leaves the board
    fn collides(&self, board: &Board, kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> bool {
        self.shape(kind, rotation)
            .iter()
            .any(|&(dx, dy)| !board.is_valid(x + dx, y + dy))
    }

    /// Row the piece comes to rest at when dropped straight down from `y`
    fn lowest_row(&self, board: &Board, kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> i8 {
        let mut row = y;
        while !self.collides(board, kind, rotation, x, row + 1) {
            row += 1;
        }
        row
    }

    /// Leftmost and rightmost origin x reachable by sliding from `x` at row `y`
    fn movable_bounds(
        &self,
        board: &Board,
        kind: PieceKind,
        rotation: Rotation,
        x: i8,
        y: i8,
    ) -> (i8, i8) {
        let mut min_x = x;
        while !self.collides(board, kind, rotation, min_x - 1, y) {
            min_x -= 1;
        }
        let mut max_x = x;
        while !self.collides(board, kind, rotation, max_x + 1, y) {
            max_x += 1;
        }
        (min_x, max_x)
    }

    /// First kick offset that lets the piece turn, if any
    fn kick(
        &self,
        board: &Board,
        kind: PieceKind,
        from: Rotation,
        clockwise: bool,
        x: i8,
        y: i8,
    ) -> Option<(i8, i8)> {
        let to = if clockwise {
            from.rotate_cw()
        } else {
            from.rotate_ccw()
        };
        self.kick_offsets(kind, from, clockwise)
            .iter()
            .copied()
            .find(|&(dx, dy)| !self.collides(board, kind, to, x + dx, y + dy))
    }

    /// Number of columns the piece covers
    fn width(&self, kind: PieceKind, rotation: Rotation) -> u8 {
        let shape = self.shape(kind, rotation);
        let min = shape.iter().map(|m| m.0).min().unwrap_or(0);
        let max = shape.iter().map(|m| m.0).max().unwrap_or(0);
        (max - min + 1) as u8
    }

    /// Column offset of the leftmost mino relative to the origin
    fn left_offset(&self, kind: PieceKind, rotation: Rotation) -> i8 {
        self.shape(kind, rotation)
            .iter()
            .map(|m| m.0)
            .min()
            .unwrap_or(0)
    }

    /// Bottom/top levels of each covered column, left to right
    fn profile(&self, kind: PieceKind, rotation: Rotation) -> Profile {
        let shape = self.shape(kind, rotation);
        let left = self.left_offset(kind, rotation);
        let bottom = shape.iter().map(|m| m.1).max().unwrap_or(0);
        let mut profile = Profile::new();
        for col in 0..self.width(kind, rotation) as i8 {
            let levels = shape
                .iter()
                .filter(|m| m.0 - left == col)
                .map(|m| (bottom - m.1) as u8);
            let low = levels.clone().min().unwrap_or(0);
            let high = levels.max().map(|h| h + 1).unwrap_or(0);
            profile.push((low, high));
        }
        profile
    }
}

/// Standard SRS geometry
#[derive(Debug, Clone, Copy, Default)]
pub struct Srs;

impl Geometry for Srs {
    fn shape(&self, kind: PieceKind, rotation: Rotation) -> PieceShape {
        get_shape(kind, rotation)
    }

    fn kick_offsets(&self, kind: PieceKind, from: Rotation, clockwise: bool) -> &[(i8, i8)] {
        kicks(kind, from, clockwise)
    }

    fn rotation_count(&self, kind: PieceKind) -> usize {
        match kind {
            PieceKind::O => 1,
            PieceKind::I | PieceKind::S | PieceKind::Z => 2,
            PieceKind::T | PieceKind::J | PieceKind::L => 4,
        }
    }
}
