//! Plain data shared by the game, the engine and the AI crates.
//!
//! Nothing here depends on another crate.
//!
//! # Field
//!
//! The live field is 10 columns by 20 rows. Row 0 is the top row and pieces
//! spawn with their origin at (3, 0).
//!
//! # Frame Timing Defaults
//!
//! The simulation is frame driven (one call per frame, ~60 per second).
//! All timing values below are in frames:
//!
//! | Constant | Frames | Meaning |
//! |----------|--------|---------|
//! | `READY_FRAMES` | 45 | Countdown before the first piece spawns |
//! | `ARE_FRAMES` | 12 | Delay between a lock and the next spawn |
//! | `LINE_DELAY_FRAMES` | 20 | Extra pause after a line clear |
//! | `LOCK_DELAY_FRAMES` | 30 | Grounded frames before a piece locks |
//! | `GRAVITY_FRAMES` | 60 | Frames per row of natural gravity |
//! | `DAS_FRAMES` | 10 | Frames before a held direction auto-repeats |
//!
//! # Examples
//!
//! ```
//! use blockbot_types::{Buttons, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(PieceKind::from_index(piece.index()), Some(piece));
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//!
//! let mut buttons = Buttons::NONE;
//! buttons.insert(Buttons::LEFT);
//! assert!(buttons.contains(Buttons::LEFT));
//!
//! assert_eq!(BOARD_WIDTH as usize * BOARD_HEIGHT as usize, 200);
//! ```

/// Columns in the live field
pub const BOARD_WIDTH: u8 = 10;

/// Rows in the live field
pub const BOARD_HEIGHT: u8 = 20;

/// Frames shown before the first piece of a round spawns
pub const READY_FRAMES: u32 = 45;

/// Delay between a piece locking and the next one spawning (ARE)
pub const ARE_FRAMES: u32 = 12;

/// Additional pause after clearing lines
pub const LINE_DELAY_FRAMES: u32 = 20;

/// Grounded frames before the active piece locks
pub const LOCK_DELAY_FRAMES: u32 = 30;

/// Frames per row of natural gravity
pub const GRAVITY_FRAMES: u32 = 60;

/// Delayed auto shift: frames a direction must be held before repeating
pub const DAS_FRAMES: u32 = 10;

/// Number of preview pieces exposed by the game
pub const NEXT_COUNT: usize = 6;

/// Number of distinct piece kinds
pub const PIECE_COUNT: usize = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_timing_defaults() {
        assert_eq!(READY_FRAMES, 45);
        assert_eq!(ARE_FRAMES, 12);
        assert_eq!(LINE_DELAY_FRAMES, 20);
        assert_eq!(LOCK_DELAY_FRAMES, 30);
        assert_eq!(GRAVITY_FRAMES, 60);
        assert_eq!(DAS_FRAMES, 10);
        assert!(NEXT_COUNT >= 5, "combo search needs five previews");
    }

    #[test]
    fn piece_index_roundtrip() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PieceKind::from_index(i), Some(*kind));
        }
        assert_eq!(PieceKind::from_index(PIECE_COUNT), None);
    }

    #[test]
    fn rotation_index_roundtrip() {
        for i in 0..4 {
            assert_eq!(Rotation::from_index(i).index(), i);
        }
        assert_eq!(Rotation::from_index(5), Rotation::East);
        assert_eq!(Rotation::North.rotate_180(), Rotation::South);
        assert_eq!(Rotation::West.rotate_180(), Rotation::East);
    }

    #[test]
    fn buttons_set_operations() {
        let mut b = Buttons::NONE;
        assert!(b.is_empty());
        b.insert(Buttons::ROTATE_A);
        b.insert(Buttons::HARD_DROP);
        assert!(b.contains(Buttons::ROTATE_A));
        assert!(b.contains(Buttons::HARD_DROP));
        assert!(!b.contains(Buttons::HOLD));
        b.remove(Buttons::ROTATE_A);
        assert!(!b.contains(Buttons::ROTATE_A));
        assert_eq!(b | Buttons::LEFT, Buttons(Buttons::HARD_DROP.0 | Buttons::LEFT.0));
    }
}

/// Piece kinds.
///
/// The declaration order is the piece id used by the AI tables:
/// I=0, O=1, T=2, S=3, Z=4, J=5, L=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All piece kinds in id order
    pub const ALL: [PieceKind; PIECE_COUNT] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Numeric piece id (0..7)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Case-insensitive single-letter name
    ///
    /// ```
    /// use blockbot_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("z"), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_str("tt"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Orientation, named by where the spawn "up" side points.
///
/// North is the spawn orientation; each clockwise quarter turn moves one step
/// along North, East, South, West.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    /// Numeric rotation (0..4, clockwise steps from North)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Build a rotation from any step count (taken modulo 4)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// One quarter turn clockwise
    ///
    /// ```
    /// use blockbot_types::Rotation;
    ///
    /// assert_eq!(Rotation::South.rotate_cw().rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// One quarter turn counter-clockwise
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    pub fn rotate_180(&self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Clockwise quarter turns needed to reach `target` (0..4)
    pub fn steps_cw_to(&self, target: Rotation) -> usize {
        (target.index() + 4 - self.index()) % 4
    }
}

/// Controller button bits for one frame
///
/// Human input and the AI control mapper both fill the same set of bits.
/// Which physical rotate button turns which way is decided by the rule
/// configuration (`A`/`C` turn in the default direction, `B` the reverse
/// direction, `ROTATE_180` is the double rotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    /// Hard drop
    pub const HARD_DROP: Buttons = Buttons(1 << 0);
    /// Soft drop (held)
    pub const SOFT_DROP: Buttons = Buttons(1 << 1);
    pub const LEFT: Buttons = Buttons(1 << 2);
    pub const RIGHT: Buttons = Buttons(1 << 3);
    /// Rotate in the default direction
    pub const ROTATE_A: Buttons = Buttons(1 << 4);
    /// Rotate in the reverse direction
    pub const ROTATE_B: Buttons = Buttons(1 << 5);
    /// Second binding of the default direction
    pub const ROTATE_C: Buttons = Buttons(1 << 6);
    pub const HOLD: Buttons = Buttons(1 << 7);
    /// Double (180°) rotation
    pub const ROTATE_180: Buttons = Buttons(1 << 8);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when any bit of `other` is set
    pub fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Buttons) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Buttons) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Buttons) {
        self.0 |= rhs.0;
    }
}

/// Grid cell: `None` when empty, otherwise the kind that filled it
pub type Cell = Option<PieceKind>;
