//! Rule configuration - which controls exist and how the timers run
//!
//! Passed explicitly to [`crate::GameState::new`]; nothing reads global state.

use crate::types::{
    ARE_FRAMES, DAS_FRAMES, GRAVITY_FRAMES, LINE_DELAY_FRAMES, LOCK_DELAY_FRAMES, NEXT_COUNT,
    READY_FRAMES,
};

/// 4-wide combo mode: the well stays open, everything else is wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboWell {
    /// Leftmost well column
    pub x: u8,
    /// Walls are kept filled from this row down
    pub wall_top: u8,
}

impl ComboWell {
    pub const WIDTH: u8 = 4;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    pub hold_enabled: bool,
    pub hard_drop_enabled: bool,
    pub soft_drop_enabled: bool,
    /// `ROTATE_180` performs a double rotation
    pub rotate_double_enabled: bool,
    /// `ROTATE_B` turns in the reverse direction (otherwise it is ignored)
    pub rotate_reverse_enabled: bool,
    /// `ROTATE_A`/`ROTATE_C` turn clockwise when true, counter-clockwise otherwise
    pub rotate_default_right: bool,
    pub ready_frames: u32,
    pub are_frames: u32,
    pub line_delay_frames: u32,
    pub lock_delay_frames: u32,
    pub gravity_frames: u32,
    pub das_frames: u32,
    pub next_count: usize,
    pub combo_well: Option<ComboWell>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            hold_enabled: true,
            hard_drop_enabled: true,
            soft_drop_enabled: true,
            rotate_double_enabled: false,
            rotate_reverse_enabled: true,
            rotate_default_right: false,
            ready_frames: READY_FRAMES,
            are_frames: ARE_FRAMES,
            line_delay_frames: LINE_DELAY_FRAMES,
            lock_delay_frames: LOCK_DELAY_FRAMES,
            gravity_frames: GRAVITY_FRAMES,
            das_frames: DAS_FRAMES,
            next_count: NEXT_COUNT,
            combo_well: None,
        }
    }
}

impl RuleConfig {
    /// Read overrides from `BLOCKBOT_RULE_*` environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let mut rule = Self::default();
        let flag = |name: &str, default: bool| {
            env::var(name)
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(default)
        };
        let frames = |name: &str, default: u32| {
            env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        };

        rule.hold_enabled = flag("BLOCKBOT_RULE_HOLD", rule.hold_enabled);
        rule.hard_drop_enabled = flag("BLOCKBOT_RULE_HARD_DROP", rule.hard_drop_enabled);
        rule.soft_drop_enabled = flag("BLOCKBOT_RULE_SOFT_DROP", rule.soft_drop_enabled);
        rule.rotate_double_enabled = flag("BLOCKBOT_RULE_ROTATE_180", rule.rotate_double_enabled);
        rule.rotate_reverse_enabled =
            flag("BLOCKBOT_RULE_ROTATE_REVERSE", rule.rotate_reverse_enabled);
        rule.rotate_default_right = flag("BLOCKBOT_RULE_DEFAULT_RIGHT", rule.rotate_default_right);
        rule.are_frames = frames("BLOCKBOT_RULE_ARE", rule.are_frames);
        rule.line_delay_frames = frames("BLOCKBOT_RULE_LINE_DELAY", rule.line_delay_frames);
        rule.lock_delay_frames = frames("BLOCKBOT_RULE_LOCK_DELAY", rule.lock_delay_frames);
        rule.gravity_frames = frames("BLOCKBOT_RULE_GRAVITY", rule.gravity_frames).max(1);
        rule.das_frames = frames("BLOCKBOT_RULE_DAS", rule.das_frames);
        rule
    }

    /// Instant rules for offline simulation and tests: no delays at all.
    pub fn instant() -> Self {
        Self {
            ready_frames: 0,
            are_frames: 0,
            line_delay_frames: 0,
            ..Self::default()
        }
    }
}
