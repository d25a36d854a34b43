//! Game state module - frame-driven simulation of one player's field
//!
//! One call to [`GameState::frame`] advances the game by exactly one frame,
//! consuming the controller bits for that frame. A round moves through
//! these phases:
//!
//! ```text
//! Ready --(ready_frames)--> Move --lock--> [LineClear] --> [Are] --> Move ...
//!                               \--spawn blocked--> GameOver
//! ```
//!
//! Every spawned piece (including the piece released by a hold swap) gets a
//! fresh, monotonic `piece_id`. The AI uses it to match decisions to pieces.

use log::debug;

use crate::board::Board;
use crate::controller::Controller;
use crate::pieces::{get_shape, try_rotate, PieceShape, SPAWN_POSITION};
use crate::rng::PieceQueue;
use crate::rule::{ComboWell, RuleConfig};
use crate::types::{Buttons, PieceKind, Rotation};

/// Move/rotate resets allowed while grounded before the lock timer keeps running
const LOCK_RESET_LIMIT: u8 = 15;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Spawn-orientation piece at the spawn origin
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_POSITION.0,
            y: SPAWN_POSITION.1,
        }
    }

    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Every mino in range and on an empty cell
    pub fn is_valid(&self, board: &Board) -> bool {
        self.shape()
            .iter()
            .all(|&(dx, dy)| board.is_valid(self.x + dx, self.y + dy))
    }

    /// Check if the piece is resting on something
    pub fn is_grounded(&self, board: &Board) -> bool {
        self.shape()
            .iter()
            .any(|&(dx, dy)| !board.is_valid(self.x + dx, self.y + dy + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Countdown before the first piece of the round
    Ready,
    /// Spawn delay after a lock
    Are,
    /// Pause after clearing lines
    LineClear,
    /// A piece is falling and accepts input
    Move,
    GameOver,
}

/// Complete state of one player's game
#[derive(Debug, Clone)]
pub struct GameState {
    rule: RuleConfig,
    board: Board,
    queue: PieceQueue,
    next: Vec<PieceKind>,
    active: Option<Tetromino>,
    hold: Option<PieceKind>,
    hold_used: bool,
    phase: Phase,
    phase_timer: u32,
    started: bool,
    /// Monotonic id, bumped on every spawn and every hold swap
    piece_id: u64,
    gravity_timer: u32,
    lock_timer: u32,
    lock_resets: u8,
    das_dir: i8,
    das_timer: u32,
    frame_count: u64,
    lines: u32,
    pieces_placed: u32,
    combo: u32,
    max_combo: u32,
}

impl GameState {
    pub fn new(rule: RuleConfig, mut queue: PieceQueue) -> Self {
        let mut next = vec![PieceKind::I; rule.next_count];
        queue.peek_into(&mut next);

        Self {
            rule,
            board: Board::new(),
            queue,
            next,
            active: None,
            hold: None,
            hold_used: false,
            phase: Phase::Ready,
            phase_timer: 0,
            started: false,
            piece_id: 0,
            gravity_timer: 0,
            lock_timer: 0,
            lock_resets: 0,
            das_dir: 0,
            das_timer: 0,
            frame_count: 0,
            lines: 0,
            pieces_placed: 0,
            combo: 0,
            max_combo: 0,
        }
    }

    /// Create a game with a 7-bag queue seeded with `seed`
    pub fn with_seed(rule: RuleConfig, seed: u32) -> Self {
        Self::new(rule, PieceQueue::new(seed))
    }

    /// Begin the round: enter the ready countdown (or spawn at once when it is zero)
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        if let Some(well) = self.rule.combo_well {
            self.refill_walls(well);
        }
        self.phase = Phase::Ready;
        self.phase_timer = self.rule.ready_frames;
        if self.phase_timer == 0 {
            self.spawn_piece();
        }
    }

    /// Advance one frame
    pub fn frame(&mut self, ctrl: &Controller) {
        if !self.started {
            return;
        }
        self.frame_count += 1;

        match self.phase {
            Phase::Ready | Phase::Are => {
                if self.count_down() {
                    self.spawn_piece();
                }
            }
            Phase::LineClear => {
                if self.count_down() {
                    self.enter_are();
                }
            }
            Phase::Move => self.frame_move(ctrl),
            Phase::GameOver => {}
        }
    }

    fn count_down(&mut self) -> bool {
        self.phase_timer = self.phase_timer.saturating_sub(1);
        self.phase_timer == 0
    }

    fn frame_move(&mut self, ctrl: &Controller) {
        if self.active.is_none() {
            return;
        }

        if ctrl.is_newly_pressed(Buttons::HOLD) && self.hold() {
            return;
        }

        self.handle_rotation(ctrl);
        self.handle_shift(ctrl);

        if self.rule.hard_drop_enabled && ctrl.is_newly_pressed(Buttons::HARD_DROP) {
            self.hard_drop();
            return;
        }

        if self.rule.soft_drop_enabled && ctrl.is_pressed(Buttons::SOFT_DROP) {
            // Soft drop on the ground locks at once.
            if !self.try_move(0, 1) {
                self.lock_piece();
                return;
            }
            self.gravity_timer = 0;
        } else {
            self.gravity_timer += 1;
            if self.gravity_timer >= self.rule.gravity_frames {
                self.gravity_timer = 0;
                self.try_move(0, 1);
            }
        }

        if self.is_grounded() {
            self.lock_timer += 1;
            if self.lock_timer >= self.rule.lock_delay_frames {
                self.lock_piece();
            }
        } else {
            self.lock_timer = 0;
        }
    }

    fn handle_rotation(&mut self, ctrl: &Controller) {
        let default_cw = self.rule.rotate_default_right;
        if self.rule.rotate_double_enabled && ctrl.is_newly_pressed(Buttons::ROTATE_180) {
            self.try_rotate_180();
        } else if ctrl.is_newly_pressed(Buttons::ROTATE_A)
            || ctrl.is_newly_pressed(Buttons::ROTATE_C)
        {
            self.try_rotate(default_cw);
        } else if self.rule.rotate_reverse_enabled && ctrl.is_newly_pressed(Buttons::ROTATE_B) {
            self.try_rotate(!default_cw);
        }
    }

    fn handle_shift(&mut self, ctrl: &Controller) {
        let dir = match (
            ctrl.is_pressed(Buttons::LEFT),
            ctrl.is_pressed(Buttons::RIGHT),
        ) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        };

        if dir == 0 {
            self.das_dir = 0;
            self.das_timer = 0;
            return;
        }

        let button = if dir < 0 { Buttons::LEFT } else { Buttons::RIGHT };
        if dir != self.das_dir || ctrl.is_newly_pressed(button) {
            self.das_dir = dir;
            self.das_timer = 0;
            self.try_move(dir, 0);
        } else {
            self.das_timer += 1;
            if self.das_timer >= self.rule.das_frames {
                self.try_move(dir, 0);
            }
        }
    }

    fn enter_are(&mut self) {
        if self.rule.are_frames == 0 {
            self.spawn_piece();
        } else {
            self.phase = Phase::Are;
            self.phase_timer = self.rule.are_frames;
        }
    }

    fn spawn_piece(&mut self) -> bool {
        let kind = self.queue.draw();
        self.spawn_kind(kind)
    }

    fn spawn_kind(&mut self, kind: PieceKind) -> bool {
        let piece = Tetromino::new(kind);
        self.piece_id += 1;
        self.queue.peek_into(&mut self.next);

        if !piece.is_valid(&self.board) {
            debug!("spawn blocked for piece {} ({:?})", self.piece_id, kind);
            self.active = None;
            self.phase = Phase::GameOver;
            return false;
        }

        self.active = Some(piece);
        self.phase = Phase::Move;
        self.hold_used = false;
        self.gravity_timer = 0;
        self.lock_timer = 0;
        self.lock_resets = 0;
        true
    }

    /// Shifts the active piece by `(dx, dy)` if the target is free
    pub fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let moved = Tetromino {
            x: active.x + dx,
            y: active.y + dy,
            ..active
        };
        if !moved.is_valid(&self.board) {
            return false;
        }

        self.active = Some(moved);
        if dy != 0 || (dx != 0 && self.is_grounded()) {
            self.reset_lock_timer();
        }
        true
    }

    /// Try to rotate the active piece a quarter turn with SRS wall kicks
    pub fn try_rotate(&mut self, clockwise: bool) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        if active.kind == PieceKind::O {
            return false;
        }

        let result = try_rotate(
            active.kind,
            active.rotation,
            active.x,
            active.y,
            clockwise,
            |x, y| self.board.is_valid(x, y),
        );

        match result {
            Some((rotation, (dx, dy))) => {
                self.active = Some(Tetromino {
                    rotation,
                    x: active.x + dx,
                    y: active.y + dy,
                    ..active
                });
                self.reset_lock_timer();
                true
            }
            None => false,
        }
    }

    /// Double rotation in place (no kicks)
    pub fn try_rotate_180(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let turned = Tetromino {
            rotation: active.rotation.rotate_180(),
            ..active
        };
        if !turned.is_valid(&self.board) {
            return false;
        }
        self.active = Some(turned);
        self.reset_lock_timer();
        true
    }

    fn reset_lock_timer(&mut self) {
        if self.lock_resets < LOCK_RESET_LIMIT {
            self.lock_timer = 0;
            self.lock_resets += 1;
        }
    }

    /// Drop the active piece to its landing row and lock it
    pub fn hard_drop(&mut self) -> bool {
        let (Some(active), Some(ghost_y)) = (self.active, self.ghost_y()) else {
            return false;
        };
        self.active = Some(Tetromino {
            y: ghost_y,
            ..active
        });
        self.lock_piece();
        true
    }

    /// Swap the active piece with the hold box (or the next piece when empty)
    pub fn hold(&mut self) -> bool {
        if !self.can_hold() || self.phase != Phase::Move {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let spawned = match self.hold.replace(active.kind) {
            Some(kind) => self.spawn_kind(kind),
            None => self.spawn_piece(),
        };
        self.hold_used = true;
        spawned
    }

    /// Writes the active piece into the grid and starts the line-clear or ARE phase
    pub fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let shape = active.shape();
        if !self
            .board
            .lock_piece(&shape, active.x, active.y, active.kind)
        {
            debug!("lock overlapped the stack at ({}, {})", active.x, active.y);
        }
        self.pieces_placed += 1;

        let cleared = self.board.clear_full_rows().len() as u32;
        if cleared > 0 {
            if let Some(well) = self.rule.combo_well {
                self.refill_walls(well);
            }
            self.lines += cleared;
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }

        if cleared > 0 && self.rule.line_delay_frames > 0 {
            self.phase = Phase::LineClear;
            self.phase_timer = self.rule.line_delay_frames;
        } else {
            self.enter_are();
        }
    }

    fn refill_walls(&mut self, well: ComboWell) {
        self.board
            .fill_walls(well.x, ComboWell::WIDTH, well.wall_top);
    }

    /// End the round immediately (offline simulation uses this on dead ends)
    pub fn end_game(&mut self) {
        self.active = None;
        self.phase = Phase::GameOver;
    }

    pub fn is_grounded(&self) -> bool {
        self.active
            .map(|piece| piece.is_grounded(&self.board))
            .unwrap_or(false)
    }

    /// Row the active piece would land on
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        let mut y = active.y;
        while (Tetromino { y: y + 1, ..active }).is_valid(&self.board) {
            y += 1;
        }
        Some(y)
    }

    pub fn rule(&self) -> &RuleConfig {
        &self.rule
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for scripted setups
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    /// True when the rules allow hold and it was not used for this piece
    pub fn can_hold(&self) -> bool {
        self.rule.hold_enabled && !self.hold_used
    }

    /// The active piece was released by a hold swap
    pub fn hold_used(&self) -> bool {
        self.hold_used
    }

    /// Preview pieces, nearest first
    pub fn next_pieces(&self) -> &[PieceKind] {
        &self.next
    }

    pub fn piece_id(&self) -> u64 {
        self.piece_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn pieces_placed(&self) -> u32 {
        self.pieces_placed
    }

    /// Consecutive line-clearing locks so far (0 after a lock without clears)
    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(rule: RuleConfig, pieces: &[PieceKind]) -> GameState {
        GameState::new(rule, PieceQueue::from_sequence(pieces))
    }

    #[test]
    fn test_ready_countdown_then_spawn() {
        let mut gs = scripted(RuleConfig::default(), &[PieceKind::T]);
        gs.start();
        assert_eq!(gs.phase(), Phase::Ready);

        let idle = Controller::new();
        for _ in 0..44 {
            gs.frame(&idle);
            assert_eq!(gs.phase(), Phase::Ready);
        }
        gs.frame(&idle);
        assert_eq!(gs.phase(), Phase::Move);
        assert_eq!(gs.piece_id(), 1);
        assert_eq!(gs.active().map(|p| p.kind), Some(PieceKind::T));
    }

    #[test]
    fn test_hard_drop_then_are() {
        let mut gs = scripted(
            RuleConfig {
                ready_frames: 0,
                ..RuleConfig::default()
            },
            &[PieceKind::T, PieceKind::O],
        );
        gs.start();
        assert_eq!(gs.piece_id(), 1);

        let mut ctrl = Controller::new();
        ctrl.press(Buttons::HARD_DROP);
        gs.frame(&ctrl);
        assert!(gs.active().is_none());
        assert_eq!(gs.phase(), Phase::Are);
        assert_eq!(gs.board().column_height(4), 2);

        let idle = Controller::new();
        for _ in 0..11 {
            gs.frame(&idle);
            assert_eq!(gs.phase(), Phase::Are);
        }
        gs.frame(&idle);
        assert_eq!(gs.phase(), Phase::Move);
        assert_eq!(gs.piece_id(), 2);
        assert_eq!(gs.active().map(|p| p.kind), Some(PieceKind::O));
    }

    #[test]
    fn test_single_line_clear() {
        let mut gs = scripted(RuleConfig::instant(), &[PieceKind::I]);
        for x in 4..10 {
            gs.board_mut().set(x, 19, Some(PieceKind::O));
        }
        gs.start();
        for _ in 0..3 {
            assert!(gs.try_move(-1, 0));
        }
        assert!(gs.hard_drop());

        assert_eq!(gs.lines(), 1);
        assert_eq!(gs.combo(), 1);
        assert_eq!(gs.board().column_height(5), 0);
        assert_eq!(gs.piece_id(), 2);
        assert_eq!(gs.phase(), Phase::Move);
    }

    #[test]
    fn test_hold_swaps_and_bumps_piece_id() {
        let mut gs = scripted(
            RuleConfig::instant(),
            &[PieceKind::T, PieceKind::O, PieceKind::I],
        );
        gs.start();
        assert_eq!(gs.piece_id(), 1);

        assert!(gs.hold());
        assert_eq!(gs.hold_piece(), Some(PieceKind::T));
        assert_eq!(gs.active().map(|p| p.kind), Some(PieceKind::O));
        assert_eq!(gs.piece_id(), 2);
        assert!(gs.hold_used());
        assert!(!gs.can_hold());
        assert!(!gs.hold());

        assert!(gs.hard_drop());
        assert_eq!(gs.active().map(|p| p.kind), Some(PieceKind::I));
        assert!(!gs.hold_used());
        assert!(gs.can_hold());

        assert!(gs.hold());
        assert_eq!(gs.active().map(|p| p.kind), Some(PieceKind::T));
        assert_eq!(gs.hold_piece(), Some(PieceKind::I));
        assert_eq!(gs.piece_id(), 4);
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut gs = scripted(RuleConfig::default(), &[PieceKind::T]);
        gs.start();
        gs.board_mut().set(4, 1, Some(PieceKind::O));

        let idle = Controller::new();
        for _ in 0..45 {
            gs.frame(&idle);
        }
        assert!(gs.is_game_over());
        assert!(gs.active().is_none());
    }

    #[test]
    fn test_das_repeats_after_delay() {
        let mut gs = scripted(RuleConfig::instant(), &[PieceKind::T]);
        gs.start();
        assert_eq!(gs.active().map(|p| p.x), Some(3));

        let mut ctrl = Controller::new();
        let mut hold_left = |gs: &mut GameState| {
            ctrl.press(Buttons::LEFT);
            gs.frame(&ctrl);
            ctrl.end_frame();
        };

        hold_left(&mut gs);
        assert_eq!(gs.active().map(|p| p.x), Some(2));
        for _ in 0..9 {
            hold_left(&mut gs);
        }
        assert_eq!(gs.active().map(|p| p.x), Some(2));
        hold_left(&mut gs);
        assert_eq!(gs.active().map(|p| p.x), Some(1));
    }

    #[test]
    fn test_combo_well_walls_refill_after_clear() {
        let rule = RuleConfig {
            combo_well: Some(ComboWell { x: 6, wall_top: 12 }),
            ..RuleConfig::instant()
        };
        let mut gs = scripted(rule, &[PieceKind::I]);
        gs.start();
        assert_eq!(gs.board().column_height(0), 8);
        assert_eq!(gs.board().column_height(6), 0);

        for x in 6..9 {
            gs.board_mut().set(x, 19, Some(PieceKind::O));
        }
        assert!(gs.try_rotate(true));
        for _ in 0..4 {
            assert!(gs.try_move(1, 0));
        }
        assert!(gs.hard_drop());

        assert_eq!(gs.lines(), 1);
        assert_eq!(gs.board().column_height(0), 8);
        assert_eq!(gs.board().column_height(6), 0);
        assert_eq!(gs.board().column_height(9), 3);
    }
}
