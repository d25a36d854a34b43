//! Control mapper - turns a decision into per-frame button presses
//!
//! Each frame produces at most one horizontal press, one rotation press and
//! one drop press. Buttons the game edge-triggers (rotations, hold, hard
//! drop) are only pressed when they were up on the previous frame, so the
//! mapper alternates between the two default-direction bindings to rotate
//! on consecutive frames.

use log::debug;

use blockbot_core::types::Buttons;
use blockbot_core::{GameState, Geometry, RuleConfig};

use crate::decision::Decision;

/// Buttons for one frame, plus whether the decision went stale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutput {
    pub buttons: Buttons,
    /// The target became unreachable; ask for a new decision
    pub rethink: bool,
}

#[derive(Debug, Default)]
pub struct ControlMapper {
    /// Frames spent waiting for a decision
    delay_frames: u64,
    /// Piece whose post-landing twist was already pressed
    twisted: Option<u64>,
}

impl ControlMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay_frames(&self) -> u64 {
        self.delay_frames
    }

    pub fn map<G: Geometry + ?Sized>(
        &mut self,
        geometry: &G,
        game: &GameState,
        decision: Option<&Decision>,
        prev: Buttons,
    ) -> ControlOutput {
        let mut out = ControlOutput::default();
        let Some(active) = game.active() else {
            return out;
        };
        let piece_id = game.piece_id();

        let Some(decision) = decision.filter(|d| d.applies_to_active(game)) else {
            self.delay_frames += 1;
            return out;
        };
        if !decision.found {
            return out;
        }

        let rule = game.rule();
        let board = game.board();

        if decision.hold && active.kind != decision.piece {
            if !game.can_hold() {
                out.rethink = true;
            } else if !prev.contains(Buttons::HOLD) {
                out.buttons = Buttons::HOLD;
            }
            return out;
        }

        if self.twisted == Some(piece_id) {
            out.buttons = drop_button(rule, prev);
            return out;
        }

        if active.rotation == decision.rotation {
            let (min_x, max_x) =
                geometry.movable_bounds(board, active.kind, active.rotation, active.x, active.y);
            if decision.x < min_x || decision.x > max_x {
                debug!(
                    "piece {}: x={} outside {}..={}, rethinking",
                    piece_id, decision.x, min_x, max_x
                );
                out.rethink = true;
                return out;
            }
        } else {
            let steps = active.rotation.steps_cw_to(decision.rotation);
            if steps == 2 && rule.rotate_double_enabled {
                if !prev.contains(Buttons::ROTATE_180) {
                    out.buttons.insert(Buttons::ROTATE_180);
                }
            } else {
                let clockwise = match steps {
                    1 => true,
                    3 => false,
                    _ => rule.rotate_default_right,
                };
                // Without the reverse binding the default one goes the long way round.
                let button = quarter_turn_button(rule, clockwise, prev)
                    .or_else(|| quarter_turn_button(rule, rule.rotate_default_right, prev));
                if let Some(button) = button {
                    out.buttons.insert(button);
                }
            }
        }

        if active.x != decision.x {
            let button = if active.x < decision.x {
                Buttons::RIGHT
            } else {
                Buttons::LEFT
            };
            if rule.das_frames <= 1 || !prev.contains(button) {
                out.buttons.insert(button);
            }
            return out;
        }

        if active.rotation != decision.rotation {
            return out;
        }

        match decision.twist {
            Some(_) if !active.is_grounded(board) => {
                if rule.soft_drop_enabled {
                    out.buttons.insert(Buttons::SOFT_DROP);
                }
            }
            Some(twist) => {
                let clockwise = decision.rotation.rotate_cw() == twist;
                match quarter_turn_button(rule, clockwise, prev) {
                    Some(button) => {
                        out.buttons.insert(button);
                        self.twisted = Some(piece_id);
                    }
                    None if !rule.rotate_reverse_enabled => {
                        debug!("piece {}: twist needs the reverse binding", piece_id);
                        self.twisted = Some(piece_id);
                    }
                    None => {}
                }
            }
            None => out.buttons.insert(drop_button(rule, prev)),
        }
        out
    }
}

/// Binding that turns a quarter in the wanted direction and was up last frame
fn quarter_turn_button(rule: &RuleConfig, clockwise: bool, prev: Buttons) -> Option<Buttons> {
    if clockwise == rule.rotate_default_right {
        [Buttons::ROTATE_A, Buttons::ROTATE_C]
            .into_iter()
            .find(|&b| !prev.contains(b))
    } else if rule.rotate_reverse_enabled && !prev.contains(Buttons::ROTATE_B) {
        Some(Buttons::ROTATE_B)
    } else {
        None
    }
}

fn drop_button(rule: &RuleConfig, prev: Buttons) -> Buttons {
    if rule.hard_drop_enabled && !prev.contains(Buttons::HARD_DROP) {
        Buttons::HARD_DROP
    } else if rule.soft_drop_enabled {
        Buttons::SOFT_DROP
    } else {
        Buttons::NONE
    }
}
