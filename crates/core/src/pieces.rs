//! Piece shapes and SRS kick data
//!
//! Shapes are stored as mino offsets inside a 4x4 box (x right, y down).
//! Kick tables follow the Super Rotation System.
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, Rotation};

/// `(dx, dy)` from the piece origin
pub type MinoOffset = (i8, i8);

pub type PieceShape = [MinoOffset; 4];

/// Shapes indexed by [piece id][rotation index]
const SHAPES: [[PieceShape; 4]; 7] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    SHAPES[kind.index()][rotation.index()]
}

/// SRS wall kick data
/// Each entry is (dx, dy) offset to try when rotation fails, y pointing down.
/// Test 0 is the unkicked rotation.
pub type KickTable = [[(i8, i8); 5]; 8];

/// Rows are `from * 2`, plus one for counter-clockwise turns
pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

const O_KICKS: KickTable = [[(0, 0); 5]; 8];

/// J, L, S, T and Z share one table
const JLSTZ_KICKS: KickTable = [
    // N->E
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // N->W
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // E->N
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // E->S
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // S->E
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // S->W
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // W->S
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // W->N
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

const I_KICKS: KickTable = [
    // N->E
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // N->W
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // E->N
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // E->S
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // S->E
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    // S->W
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // W->S
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // W->N
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

fn get_kick_index(from: Rotation, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Rotation::North, true) => 0,
        (Rotation::North, false) => 1,
        (Rotation::East, false) => 2,
        (Rotation::East, true) => 3,
        (Rotation::South, false) => 4,
        (Rotation::South, true) => 5,
        (Rotation::West, false) => 6,
        (Rotation::West, true) => 7,
    }
}

/// Kick offsets to try for a quarter turn from `from`
pub fn kicks(kind: PieceKind, from: Rotation, clockwise: bool) -> &'static [(i8, i8); 5] {
    &get_kick_table(kind)[get_kick_index(from, clockwise)]
}

/// Quarter turn with kicks: the first free test wins, returned with its offset
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
    clockwise: bool,
    is_valid: impl Fn(i8, i8) -> bool,
) -> Option<(Rotation, (i8, i8))> {
    let new_rotation = if clockwise {
        rotation.rotate_cw()
    } else {
        rotation.rotate_ccw()
    };
    let new_shape = get_shape(kind, new_rotation);

    kicks(kind, rotation, clockwise)
        .iter()
        .copied()
        .find(|&(dx, dy)| {
            new_shape
                .iter()
                .all(|&(mx, my)| is_valid(x + dx + mx, y + dy + my))
        })
        .map(|offset| (new_rotation, offset))
}

/// Origin of a freshly spawned piece
pub const SPAWN_POSITION: (i8, i8) = (3, 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_distinct_minos() {
        for kind in PieceKind::ALL {
            for rot in Rotation::ALL {
                let shape = get_shape(kind, rot);
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        assert_ne!(shape[i], shape[j], "{:?} {:?}", kind, rot);
                    }
                }
            }
        }
    }

    #[test]
    fn test_o_piece_never_kicks() {
        for rot in Rotation::ALL {
            assert_eq!(kicks(PieceKind::O, rot, true), &[(0, 0); 5]);
        }
    }

    #[test]
    fn test_try_rotate_against_wall_kicks() {
        // Vertical I hugging the left wall: plain rotation would leave the board.
        let valid = |x: i8, y: i8| (0..10).contains(&x) && (0..20).contains(&y);
        let (rot, (dx, _)) = try_rotate(PieceKind::I, Rotation::West, -1, 5, true, valid)
            .expect("I should kick off the wall");
        assert_eq!(rot, Rotation::North);
        assert!(dx > 0);
    }
}
