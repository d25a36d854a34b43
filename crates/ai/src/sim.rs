//! Offline simulation - plays decisions with instant placement
//!
//! No frames and no controller: every decision is applied directly with
//! [`apply_place`]. Used for evaluating engines and by the benchmarks.

use log::{debug, info};

use blockbot_core::{Controller, GameState, Phase};
use blockbot_engine::apply_place;

use crate::decision::ThinkJob;
use crate::worker::Thinker;

/// Frames allowed to pass without an active piece before giving up
const IDLE_FRAME_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub pieces: u32,
    pub lines: u32,
    pub max_combo: u32,
    pub game_over: bool,
}

/// Play up to `max_pieces` pieces of `game` with `thinker`.
///
/// The round ends on a decision without a move, on an unplayable `no_fit`
/// decision (no hold to fall back on), on a search error, or when the
/// placement is rejected.
pub fn simulate<T: Thinker>(thinker: &mut T, game: &mut GameState, max_pieces: u32) -> SimStats {
    game.start();
    let idle = Controller::new();
    let mut idle_frames = 0;

    while game.pieces_placed() < max_pieces && !game.is_game_over() {
        let Some(job) = ThinkJob::from_game(game) else {
            idle_frames += 1;
            if idle_frames > IDLE_FRAME_LIMIT || game.phase() == Phase::GameOver {
                break;
            }
            game.frame(&idle);
            continue;
        };
        idle_frames = 0;

        let decision = match thinker.think(&job) {
            Ok(decision) => decision,
            Err(e) => {
                info!("piece {}: search failed: {}", job.piece_id, e);
                game.end_game();
                break;
            }
        };
        if !decision.found || (decision.no_fit && !decision.hold) {
            debug!(
                "piece {}: no playable move (found={}, no_fit={})",
                job.piece_id, decision.found, decision.no_fit
            );
            game.end_game();
            break;
        }

        if let Err(e) = apply_place(
            game,
            decision.x,
            decision.rotation,
            decision.twist,
            decision.hold,
        ) {
            debug!("piece {}: {} ({})", job.piece_id, e.message(), e.code());
            game.end_game();
            break;
        }
    }

    SimStats {
        pieces: game.pieces_placed(),
        lines: game.lines(),
        max_combo: game.max_combo(),
        game_over: game.is_game_over(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use blockbot_core::types::PieceKind;
    use blockbot_core::{ComboWell, PieceQueue, RuleConfig, Srs};

    use crate::combo::ComboThinker;
    use crate::config::{ComboConfig, RanksConfig};
    use crate::ranked::RanksThinker;
    use crate::ranks::RankTable;
    use crate::transitions::TransitionCell;

    #[test]
    fn test_ranks_simulation_places_pieces() {
        let mut thinker = RanksThinker::new(
            Arc::new(Srs),
            Arc::new(RankTable::empty(9, 2)),
            RanksConfig::default(),
        );
        let mut game = GameState::with_seed(RuleConfig::instant(), 7);
        let stats = simulate(&mut thinker, &mut game, 10);
        assert_eq!(stats.pieces, 10);
        assert!(!stats.game_over);
    }

    #[test]
    fn test_combo_simulation_stops_on_untracked_well() {
        let rule = RuleConfig {
            combo_well: Some(ComboWell { x: 6, wall_top: 12 }),
            ..RuleConfig::instant()
        };
        // An empty well has no residue to build a chain on.
        let mut game = GameState::new(rule, PieceQueue::from_sequence(&[PieceKind::O]));
        let mut thinker = ComboThinker::new(
            Arc::new(Srs),
            Arc::new(TransitionCell::new()),
            ComboConfig::default(),
        );
        let stats = simulate(&mut thinker, &mut game, 50);
        assert!(stats.game_over);
        assert_eq!(stats.pieces, 0);
    }
}
