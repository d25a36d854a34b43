//! Core game logic - pure, deterministic, and testable
//!
//! Everything the AI needs to reason about a field lives here, and nothing
//! here touches the terminal, threads or the filesystem:
//!
//! - **Deterministic**: the same seed (or scripted sequence) replays the same game
//! - **Frame driven**: [`GameState::frame`] advances exactly one frame
//! - **Geometry as a seam**: the AI only sees fields through the [`Geometry`] trait
//!
//! # Module Structure
//!
//! - [`board`]: field grid of runtime size, line clearing, derived column heights
//! - [`pieces`]: tetromino shapes and SRS wall kick tables
//! - [`geometry`]: collision/landing/bounds queries consumed by the AI, plus [`Srs`]
//! - [`rng`]: 7-bag and scripted piece queues with unbounded preview
//! - [`rule`]: rule configuration (enabled controls, frame timings, combo well)
//! - [`controller`]: per-frame button state with edge detection
//! - [`game_state`]: phases, gravity, lock delay, DAS, hold
//!
//! # Example
//!
//! ```
//! use blockbot_core::{Controller, GameState, PieceQueue, RuleConfig};
//! use blockbot_core::types::{Buttons, PieceKind};
//!
//! let queue = PieceQueue::from_sequence(&[PieceKind::O]);
//! let mut game = GameState::new(RuleConfig::instant(), queue);
//! game.start();
//! assert_eq!(game.piece_id(), 1);
//!
//! let mut ctrl = Controller::new();
//! ctrl.press(Buttons::HARD_DROP);
//! game.frame(&ctrl);
//!
//! assert_eq!(game.pieces_placed(), 1);
//! assert_eq!(game.board().column_height(4), 2);
//! ```

pub mod board;
pub mod controller;
pub mod game_state;
pub mod geometry;
pub mod pieces;
pub mod rng;
pub mod rule;

pub use blockbot_types as types;

pub use board::Board;
pub use controller::Controller;
pub use game_state::{GameState, Phase, Tetromino};
pub use geometry::{Geometry, Profile, Srs};
pub use pieces::{get_shape, try_rotate};
pub use rng::{PieceQueue, SimpleRng};
pub use rule::{ComboWell, RuleConfig};
