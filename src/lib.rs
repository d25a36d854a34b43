//! blockbot (workspace facade crate).
//!
//! Re-exports the workspace crates as `blockbot::{types,core,engine,ai}` so
//! binaries, integration tests and benches share one import root.

pub use blockbot_ai as ai;
pub use blockbot_core as core;
pub use blockbot_engine as engine;
pub use blockbot_types as types;
