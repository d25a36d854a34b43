//! 4-wide field codes
//!
//! The combo AI reduces a field to the three lowest open rows of a 4-column
//! window, packed into 12 bits: bit `row * 4 + col`, row 0 being the bottom
//! window row and col 0 the leftmost window column.
//!
//! Only the 40 codes with exactly three residue cells that the combo graph
//! can stay inside are tracked; everything else maps to `None`.

use blockbot_core::types::PieceKind;
use blockbot_core::Board;

/// Window columns
pub const WINDOW_WIDTH: u8 = 4;
/// Window rows encoded in a code
pub const WINDOW_ROWS: u8 = 3;
/// Height of the scratch board used to simulate placements
pub const SCRATCH_HEIGHT: u8 = 8;

/// The closed set of tracked codes, sorted
pub const STABLE_CODES: [u16; 40] = [
    0x007, 0x00B, 0x00D, 0x00E, 0x013, 0x015, 0x016, 0x019, 0x01A, 0x01C, //
    0x023, 0x025, 0x026, 0x029, 0x02A, 0x02C, 0x031, 0x032, 0x043, 0x045, //
    0x046, 0x049, 0x04A, 0x04C, 0x061, 0x062, 0x064, 0x068, 0x083, 0x085, //
    0x086, 0x089, 0x08A, 0x08C, 0x0C4, 0x0C8, 0x111, 0x222, 0x444, 0x888, //
];

/// Number of tracked states
pub const STATE_COUNT: usize = STABLE_CODES.len();

/// State index of `code`, `None` for codes outside the tracked set
pub fn field_to_index(code: u16) -> Option<usize> {
    STABLE_CODES.binary_search(&code).ok()
}

/// Code of a tracked state index
pub fn index_to_code(index: usize) -> Option<u16> {
    STABLE_CODES.get(index).copied()
}

/// Scratch board holding `code` in its bottom three rows
pub fn code_to_board(code: u16) -> Board {
    let mut board = Board::with_size(WINDOW_WIDTH, SCRATCH_HEIGHT);
    for bit in 0..(WINDOW_WIDTH * WINDOW_ROWS) {
        if code & (1 << bit) != 0 {
            let row = bit / WINDOW_WIDTH;
            let col = bit % WINDOW_WIDTH;
            board.set(
                col as i8,
                (SCRATCH_HEIGHT - 1 - row) as i8,
                Some(PieceKind::O),
            );
        }
    }
    board
}

/// Code of a scratch board; `None` when a cell sits above the window
pub fn board_to_code(board: &Board) -> Option<u16> {
    let height = board.height();
    let mut code = 0u16;
    for y in 0..height {
        let row = height - 1 - y;
        for col in 0..WINDOW_WIDTH.min(board.width()) {
            if !board.is_occupied(col as i8, y as i8) {
                continue;
            }
            if row >= WINDOW_ROWS {
                return None;
            }
            code |= 1 << (row * WINDOW_WIDTH + col);
        }
    }
    Some(code)
}

/// Code of the live field's window starting at column `offset`.
///
/// Completely filled rows at the bottom of the window are skipped; the code
/// covers the next three rows up. `None` when the window does not fit the
/// board, every row is filled, or cells sit above the encoded rows.
pub fn window_code(board: &Board, offset: u8) -> Option<u16> {
    if offset as usize + WINDOW_WIDTH as usize > board.width() as usize {
        return None;
    }
    let filled = |col: u8, y: i16| board.is_occupied((offset + col) as i8, y as i8);
    let full_row = |y: i16| (0..WINDOW_WIDTH).all(|col| filled(col, y));

    let base = (0..board.height() as i16).rev().find(|&y| !full_row(y))?;

    let mut code = 0u16;
    for row in 0..WINDOW_ROWS {
        let y = base - row as i16;
        for col in 0..WINDOW_WIDTH {
            if y >= 0 && filled(col, y) {
                code |= 1 << (row * WINDOW_WIDTH + col);
            }
        }
    }

    let above = base - WINDOW_ROWS as i16;
    if (0..=above).any(|y| (0..WINDOW_WIDTH).any(|col| filled(col, y))) {
        return None;
    }
    Some(code)
}

/// Tracked state of the live field's window
pub fn window_state(board: &Board, offset: u8) -> Option<usize> {
    window_code(board, offset).and_then(field_to_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_codes_are_sorted_and_three_cells() {
        assert!(STABLE_CODES.windows(2).all(|w| w[0] < w[1]));
        assert!(STABLE_CODES.iter().all(|c| c.count_ones() == 3));
        assert!(STABLE_CODES.iter().all(|&c| c < 1 << 12));
    }

    #[test]
    fn test_every_code_round_trips_through_a_board() {
        for (index, &code) in STABLE_CODES.iter().enumerate() {
            let board = code_to_board(code);
            assert_eq!(board_to_code(&board), Some(code));
            assert_eq!(board_to_code(&board).and_then(field_to_index), Some(index));
        }
    }

    #[test]
    fn test_cells_above_window_are_rejected() {
        let mut board = code_to_board(0x007);
        board.set(0, 4, Some(PieceKind::T));
        assert_eq!(board_to_code(&board), None);
    }

    #[test]
    fn test_live_window_skips_full_rows() {
        let mut board = Board::new();
        board.fill_walls(6, 4, 10);
        for x in 6..10 {
            board.set(x, 19, Some(PieceKind::O));
        }
        for x in 6..9 {
            board.set(x, 18, Some(PieceKind::O));
        }
        assert_eq!(window_code(&board, 6), Some(0x007));
        assert_eq!(window_state(&board, 6), Some(0));
        assert_eq!(window_code(&board, 7), None);
    }

    #[test]
    fn test_live_window_rejects_floating_cells() {
        let mut board = Board::new();
        for x in 6..9 {
            board.set(x, 19, Some(PieceKind::O));
        }
        assert_eq!(window_state(&board, 6), Some(0));

        board.set(9, 15, Some(PieceKind::O));
        assert_eq!(window_code(&board, 6), None);
    }

    proptest! {
        #[test]
        fn prop_field_to_index_is_total(code in any::<u16>()) {
            match field_to_index(code) {
                Some(index) => prop_assert_eq!(STABLE_CODES[index], code),
                None => prop_assert!(!STABLE_CODES.contains(&code)),
            }
        }
    }
}
