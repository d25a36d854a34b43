//! Combo search - keeps a 4-wide well inside the tracked states
//!
//! The field is reduced to a [`crate::field_code`] state. Every edge of the
//! current piece (and, when hold is legal, of the hold piece) is scored by
//! [`ComboSearch::eval`], a pure recursion over the preview queue that
//! rewards each further placement with [`CHAIN_BONUS`] and scores the
//! horizon by the state's desirability.

use std::sync::Arc;

use log::debug;

use blockbot_core::types::PieceKind;
use blockbot_core::Geometry;

use crate::config::ComboConfig;
use crate::decision::{Decision, ThinkJob};
use crate::error::AiError;
use crate::field_code::{window_state, WINDOW_WIDTH};
use crate::transitions::{Transition, TransitionCell, TransitionTable};
use crate::worker::Thinker;

/// Reward per placement that keeps the chain alive
pub const CHAIN_BONUS: i32 = 1000;
/// Reward for a long piece kept in hold at the horizon
pub const LONG_IN_HOLD_BONUS: i32 = 50;

/// Root choice of [`ComboSearch::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboMove {
    pub transition: Transition,
    /// Piece that gets placed
    pub piece: PieceKind,
    pub hold: bool,
    pub score: i32,
}

pub struct ComboSearch<'a> {
    table: &'a TransitionTable,
}

impl<'a> ComboSearch<'a> {
    pub fn new(table: &'a TransitionTable) -> Self {
        Self { table }
    }

    /// Best first move from `state`.
    ///
    /// `queue` holds the previews; `depth` of them are searched (one more is
    /// used when holding into an empty box pulls the first preview forward).
    /// `None` when the state is unknown or no edge exists.
    pub fn search(
        &self,
        state: usize,
        current: PieceKind,
        hold: Option<PieceKind>,
        hold_allowed: bool,
        queue: &[PieceKind],
        depth: usize,
    ) -> Option<ComboMove> {
        if state >= self.table.state_count() {
            return None;
        }

        let mut best: Option<ComboMove> = None;
        let mut consider =
            |piece: PieceKind, held: Option<PieceKind>, rest: &[PieceKind], hold: bool| {
                for &transition in self.table.edges(state, piece) {
                    let score = CHAIN_BONUS + self.eval(transition.next, held, rest);
                    if best.map_or(true, |b| score > b.score) {
                        best = Some(ComboMove {
                            transition,
                            piece,
                            hold,
                            score,
                        });
                    }
                }
            };

        consider(current, hold, &queue[..depth.min(queue.len())], false);

        if hold_allowed {
            let swap = match hold {
                Some(held) => Some((held, &queue[..depth.min(queue.len())])),
                None => queue
                    .split_first()
                    .map(|(&first, rest)| (first, &rest[..depth.min(rest.len())])),
            };
            if let Some((alt, rest)) = swap {
                if alt != current {
                    consider(alt, Some(current), rest, true);
                }
            }
        }

        best
    }

    /// Best achievable score from `state` with `queue` still to place
    pub fn eval(&self, state: usize, hold: Option<PieceKind>, queue: &[PieceKind]) -> i32 {
        let Some((&piece, rest)) = queue.split_first() else {
            let bonus = if hold == Some(PieceKind::I) {
                LONG_IN_HOLD_BONUS
            } else {
                0
            };
            return self.table.score(state) + bonus;
        };

        let mut best = 0;
        for transition in self.table.edges(state, piece) {
            best = best.max(CHAIN_BONUS + self.eval(transition.next, hold, rest));
        }

        match hold {
            // Park the piece; the field does not change.
            None => best = best.max(self.eval(state, Some(piece), rest)),
            Some(held) if held != piece => {
                for transition in self.table.edges(state, held) {
                    best = best.max(CHAIN_BONUS + self.eval(transition.next, Some(piece), rest));
                }
            }
            Some(_) => {}
        }
        best
    }
}

/// [`Thinker`] running the combo search on the live well
pub struct ComboThinker {
    geometry: Arc<dyn Geometry>,
    cell: Arc<TransitionCell>,
    config: ComboConfig,
}

impl ComboThinker {
    pub fn new(
        geometry: Arc<dyn Geometry>,
        cell: Arc<TransitionCell>,
        config: ComboConfig,
    ) -> Self {
        Self {
            geometry,
            cell,
            config,
        }
    }

    pub fn cell(&self) -> &Arc<TransitionCell> {
        &self.cell
    }

    /// Leftmost well column on a board `width` columns wide
    fn well_offset(&self, width: u8) -> Option<u8> {
        match self.config.well_offset {
            Some(offset) => u8::try_from(offset).ok(),
            None => width.checked_sub(WINDOW_WIDTH),
        }
    }
}

impl Thinker for ComboThinker {
    fn build(&mut self) -> Result<(), AiError> {
        self.cell.get_or_build(self.geometry.as_ref());
        Ok(())
    }

    fn think(&mut self, job: &ThinkJob) -> Result<Decision, AiError> {
        let not_found = Decision::not_found(job.piece_id, job.piece);

        let Some(offset) = self.well_offset(job.board.width()) else {
            return Ok(not_found);
        };
        let Some(state) = window_state(&job.board, offset) else {
            debug!("combo piece {}: well left the tracked states", job.piece_id);
            return Ok(not_found);
        };

        let table = self.cell.get_or_build(self.geometry.as_ref());
        let search = ComboSearch::new(&table);
        let Some(mv) = search.search(
            state,
            job.piece,
            job.hold,
            job.hold_allowed,
            &job.next,
            self.config.max_depth,
        ) else {
            debug!("combo piece {}: no edge from state {}", job.piece_id, state);
            return Ok(not_found);
        };

        debug!(
            "combo piece {}: {:?} {:?} hold={} score={}",
            job.piece_id, mv.piece, mv.transition, mv.hold, mv.score
        );
        Ok(Decision {
            piece_id: job.piece_id,
            piece: mv.piece,
            x: offset as i8 + mv.transition.x,
            rotation: mv.transition.rotation,
            twist: mv.transition.twist,
            hold: mv.hold,
            found: true,
            no_fit: false,
            score: mv.score as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbot_core::types::Rotation;
    use blockbot_core::{Board, Srs};

    fn table() -> TransitionTable {
        TransitionTable::build(&Srs)
    }

    #[test]
    fn test_unknown_state_is_not_found() {
        let table = table();
        let search = ComboSearch::new(&table);
        assert_eq!(
            search.search(40, PieceKind::I, None, true, &[PieceKind::T], 5),
            None
        );
    }

    #[test]
    fn test_hold_rescues_dead_piece() {
        let table = table();
        let search = ComboSearch::new(&table);
        let queue = [PieceKind::I, PieceKind::T, PieceKind::L, PieceKind::J];

        // No O placement keeps state 0 inside the tracked set.
        let mv = search.search(0, PieceKind::O, None, true, &queue, 3).unwrap();
        assert!(mv.hold);
        assert_eq!(mv.piece, PieceKind::I);

        assert_eq!(search.search(0, PieceKind::O, None, false, &queue, 3), None);
    }

    #[test]
    fn test_eval_horizon_and_long_piece_bonus() {
        let table = table();
        let search = ComboSearch::new(&table);
        assert_eq!(search.eval(0, None, &[]), 56);
        assert_eq!(search.eval(0, Some(PieceKind::I), &[]), 56 + LONG_IN_HOLD_BONUS);
        // An O with an empty box can only be parked.
        assert_eq!(search.eval(0, None, &[PieceKind::O]), 56);
        assert_eq!(search.eval(0, Some(PieceKind::O), &[PieceKind::O]), 0);
    }

    #[test]
    fn test_longer_chains_win() {
        let table = table();
        let search = ComboSearch::new(&table);
        let one = search.eval(0, None, &[PieceKind::T]);
        assert!(one >= CHAIN_BONUS);
    }

    #[test]
    fn test_thinker_reads_live_well() {
        let mut board = Board::new();
        board.fill_walls(6, 4, 12);
        for x in 6..9 {
            board.set(x, 19, Some(PieceKind::O));
        }
        let mut thinker = ComboThinker::new(
            Arc::new(Srs),
            Arc::new(TransitionCell::new()),
            ComboConfig::default(),
        );
        thinker.build().unwrap();
        assert!(thinker.cell().is_built());

        let job = ThinkJob {
            piece_id: 9,
            board,
            piece: PieceKind::T,
            hold: None,
            hold_allowed: false,
            next: vec![
                PieceKind::I,
                PieceKind::L,
                PieceKind::J,
                PieceKind::S,
                PieceKind::Z,
            ],
        };
        let decision = thinker.think(&job).unwrap();
        assert!(decision.found);
        assert!(!decision.hold);
        // The only T edge from state 0 is West at window column 2.
        assert_eq!(decision.x, 8);
        assert_eq!(decision.rotation, Rotation::West);
        assert_eq!(decision.twist, None);
    }

    #[test]
    fn test_thinker_rejects_untracked_well() {
        let mut board = Board::new();
        board.fill_walls(6, 4, 12);
        for (x, y) in [(6, 19), (7, 19), (6, 18), (7, 18)] {
            board.set(x, y, Some(PieceKind::O));
        }
        let mut thinker = ComboThinker::new(
            Arc::new(Srs),
            Arc::new(TransitionCell::new()),
            ComboConfig::default(),
        );
        let job = ThinkJob {
            piece_id: 1,
            board,
            piece: PieceKind::I,
            hold: None,
            hold_allowed: true,
            next: vec![PieceKind::T; 6],
        };
        let decision = thinker.think(&job).unwrap();
        assert!(!decision.found);
        assert!(!thinker.cell().is_built());
    }
}
