//! AI players for blockbot
//!
//! Two search engines share one worker/control pipeline:
//!
//! - **ranks**: multi-ply heuristic stacking over column heights, scored
//!   through a [`RankTable`] keyed by the stack surface, with a forced
//!   four-row clear when the stack gets tall
//! - **combo**: bounded-depth search over a precomputed
//!   [`TransitionTable`] of 4-wide well states, keeping a single-clear
//!   chain alive as long as possible
//!
//! Searches run on a per-player [`AiWorker`] (or inline), publish a
//! [`Decision`], and the [`ControlMapper`] replays it as button presses
//! frame by frame.
//!
//! # Module Structure
//!
//! - [`heights`]: surface vectors and the piece-fits test
//! - [`ranks`]: rank table storage, persistence and generation
//! - [`ranked`]: the ranks search and its [`Thinker`]
//! - [`field_code`]: 4-wide window encoding and the tracked state set
//! - [`transitions`]: the transition table and its build-once cell
//! - [`combo`]: the combo search and its [`Thinker`]
//! - [`worker`]: worker thread, job mailbox, decision publishing
//! - [`control`]: decision to per-frame buttons
//! - [`player`]: [`AiPlayer`] hooks and the two bot players
//! - [`host`]: frame driver for one AI-controlled game
//! - [`sim`]: instant-placement offline simulation
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use blockbot_ai::{simulate, RankTable, RanksConfig, RanksThinker};
//! use blockbot_core::{GameState, RuleConfig, Srs};
//!
//! let mut thinker = RanksThinker::new(
//!     Arc::new(Srs),
//!     Arc::new(RankTable::empty(9, 2)),
//!     RanksConfig::default(),
//! );
//! let mut game = GameState::with_seed(RuleConfig::instant(), 1);
//! let stats = simulate(&mut thinker, &mut game, 5);
//! assert_eq!(stats.pieces, 5);
//! ```

pub mod combo;
pub mod config;
pub mod control;
pub mod decision;
pub mod error;
pub mod field_code;
pub mod heights;
pub mod host;
pub mod player;
pub mod ranked;
pub mod ranks;
pub mod sim;
pub mod transitions;
pub mod worker;

pub use combo::{ComboMove, ComboSearch, ComboThinker, CHAIN_BONUS, LONG_IN_HOLD_BONUS};
pub use config::{AiConfig, ComboConfig, RanksConfig};
pub use control::{ControlMapper, ControlOutput};
pub use decision::{Decision, ThinkJob};
pub use error::AiError;
pub use field_code::{field_to_index, window_state, STABLE_CODES};
pub use host::AiHost;
pub use player::{combo_player, ranks_player, AiPlayer, BotPlayer, ComboPlayer, RanksPlayer};
pub use ranked::{RankedMove, RankedSearch, RanksThinker, Score};
pub use ranks::RankTable;
pub use sim::{simulate, SimStats};
pub use transitions::{Transition, TransitionCell, TransitionTable};
pub use worker::{AiWorker, Thinker};
