//! Think jobs and published decisions
//!
//! A [`ThinkJob`] is a self-contained snapshot of everything a search needs
//! (board clone, pieces, hold state), so the worker never touches the live
//! game. A [`Decision`] is the immutable answer, published whole.

use blockbot_core::types::{PieceKind, Rotation};
use blockbot_core::{Board, GameState};

/// Snapshot handed to a [`crate::Thinker`]
#[derive(Debug, Clone, PartialEq)]
pub struct ThinkJob {
    /// Piece the decision is for
    pub piece_id: u64,
    pub board: Board,
    pub piece: PieceKind,
    pub hold: Option<PieceKind>,
    pub hold_allowed: bool,
    /// Preview pieces, nearest first
    pub next: Vec<PieceKind>,
}

impl ThinkJob {
    /// Job for the currently active piece (`None` when nothing is falling)
    pub fn from_game(game: &GameState) -> Option<Self> {
        let active = game.active()?;
        Some(Self {
            piece_id: game.piece_id(),
            board: game.board().clone(),
            piece: active.kind,
            hold: game.hold_piece(),
            hold_allowed: game.can_hold(),
            next: game.next_pieces().to_vec(),
        })
    }

    /// Job for the piece that spawns next, computed while the game is in ARE.
    ///
    /// The board is final once the previous piece has locked, so the
    /// answer stays valid when the piece appears.
    pub fn prethink(game: &GameState) -> Option<Self> {
        let (&piece, rest) = game.next_pieces().split_first()?;
        Some(Self {
            piece_id: game.piece_id() + 1,
            board: game.board().clone(),
            piece,
            hold: game.hold_piece(),
            hold_allowed: game.rule().hold_enabled,
            next: rest.to_vec(),
        })
    }
}

/// Best move for one piece
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub piece_id: u64,
    /// Piece that gets placed (the swapped-in piece when `hold` is set)
    pub piece: PieceKind,
    /// Origin column on the live board
    pub x: i8,
    pub rotation: Rotation,
    /// Rotation performed after landing
    pub twist: Option<Rotation>,
    pub hold: bool,
    pub found: bool,
    /// Nothing fits the surface cleanly
    pub no_fit: bool,
    pub score: f64,
}

impl Decision {
    pub fn not_found(piece_id: u64, piece: PieceKind) -> Self {
        Self {
            piece_id,
            piece,
            x: 0,
            rotation: Rotation::North,
            twist: None,
            hold: false,
            found: false,
            no_fit: false,
            score: 0.0,
        }
    }

    /// True when this decision drives the piece `piece_id` of kind `kind`.
    ///
    /// A hold swap spawns a new piece id, so a hold decision also covers
    /// the piece released by the swap. `swapped` must say whether the piece
    /// really came out of a swap: when the decided piece locks unheld, the
    /// next spawn can have the same id and kind but a different board.
    pub fn applies_to(&self, piece_id: u64, kind: PieceKind, swapped: bool) -> bool {
        self.piece_id == piece_id
            || (self.hold && swapped && self.piece_id + 1 == piece_id && self.piece == kind)
    }

    /// [`applies_to`](Self::applies_to) for the game's active piece
    pub fn applies_to_active(&self, game: &GameState) -> bool {
        game.active()
            .is_some_and(|p| self.applies_to(game.piece_id(), p.kind, game.hold_used()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbot_core::{PieceQueue, RuleConfig};

    fn game(pieces: &[PieceKind]) -> GameState {
        let mut game = GameState::new(RuleConfig::instant(), PieceQueue::from_sequence(pieces));
        game.start();
        game
    }

    #[test]
    fn test_job_from_active_piece() {
        let game = game(&[PieceKind::T, PieceKind::O, PieceKind::I]);
        let job = ThinkJob::from_game(&game).unwrap();
        assert_eq!(job.piece_id, 1);
        assert_eq!(job.piece, PieceKind::T);
        assert_eq!(&job.next[..2], &[PieceKind::O, PieceKind::I]);
        assert!(job.hold_allowed);
    }

    #[test]
    fn test_prethink_targets_next_piece() {
        let game = game(&[PieceKind::T, PieceKind::O, PieceKind::I]);
        let job = ThinkJob::prethink(&game).unwrap();
        assert_eq!(job.piece_id, 2);
        assert_eq!(job.piece, PieceKind::O);
        assert_eq!(job.next[0], PieceKind::I);
    }

    #[test]
    fn test_hold_decision_covers_swapped_piece() {
        let mut d = Decision::not_found(4, PieceKind::I);
        assert!(d.applies_to(4, PieceKind::T, false));
        assert!(!d.applies_to(5, PieceKind::I, true));

        d.hold = true;
        assert!(d.applies_to(5, PieceKind::I, true));
        assert!(!d.applies_to(5, PieceKind::O, true));
        assert!(!d.applies_to(6, PieceKind::I, true));
    }

    #[test]
    fn test_hold_decision_rejected_when_piece_locked_unheld() {
        let mut game = game(&[PieceKind::T, PieceKind::I]);
        let mut d = Decision::not_found(1, PieceKind::I);
        d.hold = true;
        d.found = true;

        // Same id and kind as the swap would give, but spawned after a lock.
        assert!(game.hard_drop());
        assert_eq!(game.piece_id(), 2);
        assert_eq!(game.active().map(|p| p.kind), Some(PieceKind::I));
        assert!(!d.applies_to_active(&game));
    }

    #[test]
    fn test_hold_decision_follows_the_swap() {
        let mut game = game(&[PieceKind::T, PieceKind::I]);
        let mut d = Decision::not_found(1, PieceKind::I);
        d.hold = true;
        assert!(d.applies_to_active(&game));
        assert!(game.hold());
        assert!(d.applies_to_active(&game));
    }
}
