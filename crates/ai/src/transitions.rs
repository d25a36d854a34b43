//! Transition table over the 4-wide field codes
//!
//! For every tracked state and piece the table lists the placements that
//! clear exactly one row and leave the window in another tracked state.
//! Placements are simulated on a 4x8 scratch board through the
//! [`Geometry`] provider:
//!
//! 1. every orientation (O only once) spawned at the top, slid to every
//!    reachable column and hard-dropped
//! 2. from every landing, a quarter turn either way with wall kicks,
//!    dropped again (a "twist")
//!
//! Only the first edge per resulting state is kept, hard drops first.
//! The table is deterministic and immutable once built; [`TransitionCell`]
//! builds it at most once and shares it.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use log::debug;

use blockbot_core::types::{PieceKind, Rotation, PIECE_COUNT};
use blockbot_core::{Board, Geometry};

use crate::field_code::{board_to_code, code_to_board, field_to_index, STABLE_CODES};

/// One placement edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Piece origin column inside the window, before any twist
    pub x: i8,
    pub rotation: Rotation,
    /// Rotation reached by turning after landing
    pub twist: Option<Rotation>,
    /// Resulting state index
    pub next: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: Vec<[Vec<Transition>; PIECE_COUNT]>,
    scores: Vec<i32>,
}

impl TransitionTable {
    pub fn build<G: Geometry + ?Sized>(geometry: &G) -> Self {
        let start = Instant::now();
        let edges: Vec<[Vec<Transition>; PIECE_COUNT]> = STABLE_CODES
            .iter()
            .map(|&code| {
                let board = code_to_board(code);
                std::array::from_fn(|i| state_edges(geometry, &board, PieceKind::ALL[i]))
            })
            .collect();

        let scores = edges
            .iter()
            .map(|per_piece| {
                let pieces = per_piece.iter().filter(|e| !e.is_empty()).count() as i32;
                let total = per_piece.iter().map(Vec::len).sum::<usize>() as i32;
                10 * pieces + total
            })
            .collect();

        let table = Self { edges, scores };
        debug!(
            "built transition table: {} states, {} edges in {:?}",
            table.state_count(),
            table.edge_count(),
            start.elapsed()
        );
        table
    }

    pub fn state_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges for `(state, piece)`; empty for unknown states
    pub fn edges(&self, state: usize, piece: PieceKind) -> &[Transition] {
        self.edges
            .get(state)
            .map(|per_piece| per_piece[piece.index()].as_slice())
            .unwrap_or(&[])
    }

    /// Desirability of a state: 10 per piece with an edge, plus 1 per edge
    pub fn score(&self, state: usize) -> i32 {
        self.scores.get(state).copied().unwrap_or(0)
    }

    pub fn edge_count(&self) -> usize {
        self.edges
            .iter()
            .flat_map(|per_piece| per_piece.iter())
            .map(Vec::len)
            .sum()
    }
}

fn state_edges<G: Geometry + ?Sized>(
    geometry: &G,
    board: &Board,
    kind: PieceKind,
) -> Vec<Transition> {
    let mut edges: Vec<Transition> = Vec::new();
    let mut landings: Vec<(Rotation, i8, i8)> = Vec::new();

    for rotation in Rotation::ALL {
        let x0 = -geometry.left_offset(kind, rotation);
        if !geometry.collides(board, kind, rotation, x0, 0) {
            let (min_x, max_x) = geometry.movable_bounds(board, kind, rotation, x0, 0);
            for x in min_x..=max_x {
                let y = geometry.lowest_row(board, kind, rotation, x, 0);
                landings.push((rotation, x, y));
                if let Some(next) = land(geometry, board, kind, rotation, x, y) {
                    record(
                        &mut edges,
                        Transition {
                            x,
                            rotation,
                            twist: None,
                            next,
                        },
                    );
                }
            }
        }
        // Every O orientation is the same shape.
        if kind == PieceKind::O {
            break;
        }
    }

    if kind != PieceKind::O {
        for &(rotation, x, y) in &landings {
            for clockwise in [false, true] {
                let Some((dx, dy)) = geometry.kick(board, kind, rotation, clockwise, x, y) else {
                    continue;
                };
                let to = if clockwise {
                    rotation.rotate_cw()
                } else {
                    rotation.rotate_ccw()
                };
                let tx = x + dx;
                let ty = geometry.lowest_row(board, kind, to, tx, y + dy);
                if let Some(next) = land(geometry, board, kind, to, tx, ty) {
                    record(
                        &mut edges,
                        Transition {
                            x,
                            rotation,
                            twist: Some(to),
                            next,
                        },
                    );
                }
            }
        }
    }

    edges
}

/// Keep only the first edge reaching each state
fn record(edges: &mut Vec<Transition>, edge: Transition) {
    if !edges.iter().any(|e| e.next == edge.next) {
        edges.push(edge);
    }
}

/// Lock the piece, require a single cleared row, look the result up
fn land<G: Geometry + ?Sized>(
    geometry: &G,
    board: &Board,
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
) -> Option<usize> {
    let mut scratch = board.clone();
    if !scratch.lock_piece(&geometry.shape(kind, rotation), x, y, kind) {
        return None;
    }
    if scratch.count_full_rows() != 1 {
        return None;
    }
    scratch.clear_full_rows();
    board_to_code(&scratch).and_then(field_to_index)
}

/// Build-once holder for a shared [`TransitionTable`]
#[derive(Debug, Default)]
pub struct TransitionCell {
    table: OnceLock<Arc<TransitionTable>>,
}

impl TransitionCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table, building it on first use
    pub fn get_or_build<G: Geometry + ?Sized>(&self, geometry: &G) -> Arc<TransitionTable> {
        Arc::clone(
            self.table
                .get_or_init(|| Arc::new(TransitionTable::build(geometry))),
        )
    }

    pub fn get(&self) -> Option<Arc<TransitionTable>> {
        self.table.get().cloned()
    }

    pub fn is_built(&self) -> bool {
        self.table.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbot_core::Srs;

    fn table() -> TransitionTable {
        TransitionTable::build(&Srs)
    }

    #[test]
    fn test_edge_counts() {
        let table = table();
        assert_eq!(table.state_count(), 40);
        assert_eq!(table.edge_count(), 190);

        let twists = (0..40)
            .flat_map(|s| PieceKind::ALL.iter().map(move |&p| (s, p)))
            .flat_map(|(s, p)| table.edges(s, p).to_vec())
            .filter(|t| t.twist.is_some())
            .count();
        assert_eq!(twists, 12);

        for state in 0..40 {
            assert!(PieceKind::ALL
                .iter()
                .any(|&p| !table.edges(state, p).is_empty()));
        }
    }

    #[test]
    fn test_flat_three_state() {
        let table = table();
        // 0x007: bottom window row filled except the rightmost column.
        assert_eq!(table.score(0), 56);
        assert!(table.edges(0, PieceKind::O).is_empty());
        assert_eq!(
            table.edges(0, PieceKind::I),
            &[
                Transition {
                    x: 0,
                    rotation: Rotation::North,
                    twist: None,
                    next: 0,
                },
                Transition {
                    x: 1,
                    rotation: Rotation::East,
                    twist: None,
                    next: 39,
                },
            ]
        );
    }

    #[test]
    fn test_state_scores() {
        let expected = [
            56, 70, 70, 56, 70, 46, 45, 70, 45, 56, 44, 11, 11, 22, 11, 11, 70, 57, 11, 11, 11,
            22, 11, 44, 22, 11, 11, 22, 56, 45, 45, 70, 46, 70, 57, 70, 46, 11, 11, 46,
        ];
        let table = table();
        let scores: Vec<i32> = (0..40).map(|s| table.score(s)).collect();
        assert_eq!(scores, expected);
        assert_eq!(table.score(40), 0);
    }

    #[test]
    fn test_o_has_no_duplicates() {
        let table = table();
        for state in 0..40 {
            let edges = table.edges(state, PieceKind::O);
            assert!(edges.len() <= 1);
            assert!(edges.iter().all(|t| t.rotation == Rotation::North));
        }
    }

    #[test]
    fn test_unknown_state_has_no_edges() {
        let table = table();
        assert!(table.edges(40, PieceKind::T).is_empty());
    }

    #[test]
    fn test_cell_builds_once() {
        let cell = TransitionCell::new();
        assert!(!cell.is_built());
        let first = cell.get_or_build(&Srs);
        let second = cell.get_or_build(&Srs);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cell.is_built());
        assert!(Arc::ptr_eq(&first, &cell.get().unwrap()));
    }
}
