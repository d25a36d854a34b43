//! Instant placement engine
//!
//! Applies a decided move (target x, rotation, optional twist, hold) to a
//! [`GameState`](blockbot_core::GameState) in one call, without going through
//! per-frame controller input. Offline simulation and benchmarks use this to
//! play thousands of pieces quickly.

pub mod place;

pub use place::{apply_place, PlaceError};
