use blockbot_core::types::Rotation;
use blockbot_core::{GameState, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    HoldUnavailable,
    RotationBlocked,
    TwistBlocked,
    XOutOfBounds,
    XBlocked,
    NotPlayable,
    NoActive,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold_unavailable",
            PlaceError::NotPlayable => "not_playable",
            PlaceError::RotationBlocked
            | PlaceError::TwistBlocked
            | PlaceError::XOutOfBounds
            | PlaceError::XBlocked
            | PlaceError::NoActive => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold is not allowed for this piece",
            PlaceError::RotationBlocked => "target rotation is blocked",
            PlaceError::TwistBlocked => "could not twist after landing",
            PlaceError::XOutOfBounds => "target column is outside the field",
            PlaceError::XBlocked => "path to target column is blocked",
            PlaceError::NotPlayable => "game is not accepting moves",
            PlaceError::NoActive => "nothing to place",
        }
    }
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PlaceError {}

/// Place the active piece at origin column `target_x` with `target_rot`,
/// optionally holding first and twisting one quarter turn after landing.
///
/// On error the game may have been partially advanced (hold or rotation
/// already applied); callers treat any error as the end of their plan.
pub fn apply_place(
    state: &mut GameState,
    target_x: i8,
    target_rot: Rotation,
    twist: Option<Rotation>,
    use_hold: bool,
) -> Result<(), PlaceError> {
    if state.phase() != Phase::Move {
        return Err(PlaceError::NotPlayable);
    }

    if use_hold && !state.hold() {
        return Err(PlaceError::HoldUnavailable);
    }

    let Some(active0) = state.active() else {
        return Err(PlaceError::NoActive);
    };

    // Try the shorter direction first; a half turn tries both.
    let cw = active0.rotation.steps_cw_to(target_rot);
    let ccw = (4 - cw) % 4;
    let mut plans = [(true, cw), (false, ccw)];
    if plans[1].1 < plans[0].1 {
        plans.swap(0, 1);
    }

    let snapshot = state.clone();
    let mut rotated = false;
    for (is_cw, steps) in plans {
        *state = snapshot.clone();
        if (0..steps).all(|_| state.try_rotate(is_cw)) {
            rotated = true;
            break;
        }
    }

    let Some(active) = state.active() else {
        return Err(PlaceError::NoActive);
    };
    if !rotated || active.rotation != target_rot {
        return Err(PlaceError::RotationBlocked);
    }

    let shape = active.shape();
    let min_dx = shape.iter().map(|m| m.0).min().unwrap_or(0);
    let max_dx = shape.iter().map(|m| m.0).max().unwrap_or(0);
    let width = state.board().width() as i8;
    if target_x + min_dx < 0 || target_x + max_dx >= width {
        return Err(PlaceError::XOutOfBounds);
    }

    let dx = target_x - active.x;
    let step = dx.signum();
    for _ in 0..dx.abs() {
        if !state.try_move(step, 0) {
            return Err(PlaceError::XBlocked);
        }
    }

    if let Some(twist) = twist {
        while state.try_move(0, 1) {}
        let clockwise = target_rot.rotate_cw() == twist;
        if !state.try_rotate(clockwise) {
            return Err(PlaceError::TwistBlocked);
        }
    }

    if !state.hard_drop() {
        return Err(PlaceError::NoActive);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbot_core::types::PieceKind;
    use blockbot_core::{Board, PieceQueue, RuleConfig};

    fn instant_game(pieces: &[PieceKind]) -> GameState {
        let mut gs = GameState::new(RuleConfig::instant(), PieceQueue::from_sequence(pieces));
        gs.start();
        gs
    }

    #[test]
    fn place_rejected_before_start() {
        let mut gs = GameState::new(RuleConfig::instant(), PieceQueue::new(1));
        let err = apply_place(&mut gs, 3, Rotation::North, None, false).unwrap_err();
        assert_eq!(err, PlaceError::NotPlayable);
        assert_eq!(err.code(), "not_playable");
    }

    #[test]
    fn place_rejected_when_x_out_of_bounds() {
        let mut gs = instant_game(&[PieceKind::T]);
        let err = apply_place(&mut gs, -50, Rotation::North, None, false).unwrap_err();
        assert_eq!(err, PlaceError::XOutOfBounds);
    }

    #[test]
    fn place_rejected_when_x_blocked_by_collision() {
        let mut gs = instant_game(&[PieceKind::T]);
        // Wall in column 1 on the spawn rows.
        gs.board_mut().set(1, 0, Some(PieceKind::O));
        gs.board_mut().set(1, 1, Some(PieceKind::O));

        let err = apply_place(&mut gs, 0, Rotation::North, None, false).unwrap_err();
        assert_eq!(err, PlaceError::XBlocked);
    }

    #[test]
    fn place_locks_at_target() {
        let mut gs = instant_game(&[PieceKind::I, PieceKind::O]);
        // Vertical I (East) covers origin column + 2.
        apply_place(&mut gs, 7, Rotation::East, None, false).unwrap();

        assert_eq!(gs.pieces_placed(), 1);
        assert_eq!(gs.board().column_height(9), 4);
        assert_eq!(gs.active().map(|p| p.kind), Some(PieceKind::O));
    }

    #[test]
    fn place_with_hold_uses_the_next_piece() {
        let mut gs = instant_game(&[PieceKind::T, PieceKind::O]);
        apply_place(&mut gs, 3, Rotation::North, None, true).unwrap();

        assert_eq!(gs.hold_piece(), Some(PieceKind::T));
        assert_eq!(gs.board().column_height(4), 2);
        assert_eq!(gs.board().column_height(5), 2);
    }

    #[test]
    fn place_with_twist_tucks_under_overhang() {
        let mut gs = instant_game(&[PieceKind::T]);
        // T slot: column 2 is covered on row 17, so South cannot drop straight in.
        *gs.board_mut() = Board::from_rows(10, 20, &["###.......", "##...#####", "###.######"]);

        apply_place(&mut gs, 2, Rotation::East, Some(Rotation::South), false).unwrap();

        assert_eq!(gs.lines(), 2);
        assert_eq!(gs.board().column_height(0), 1);
        assert_eq!(gs.board().column_height(2), 1);
        assert_eq!(gs.board().column_height(3), 0);
    }
}
