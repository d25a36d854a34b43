//! Rank table - desirability of every stack surface
//!
//! A surface of `stack_width` columns has `stack_width - 1` clamped
//! differences, each in `-max_jump..=max_jump`. The table stores one `f32`
//! per surface, indexed by reading the differences as a base
//! `2 * max_jump + 1` number (first difference most significant).
//!
//! Tables are produced offline by [`RankTable::generate`] (value iteration
//! over all surfaces) and stored as JSON. A missing or broken file is not
//! fatal: [`RankTable::load_or_empty`] falls back to an empty table that
//! ranks everything 0.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use blockbot_core::types::{PieceKind, Rotation};
use blockbot_core::{Geometry, Profile};

use crate::error::AiError;
use crate::heights::{add_to_heights, fits, surface_into, within_jump};

/// Widest stack a table may describe (keeps `base^(width-1)` addressable)
pub const MAX_STACK_WIDTH: usize = 12;

/// Largest clamp a table may use; differences must fit an `i8`
pub const MAX_JUMP: u8 = 63;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    stack_width: usize,
    max_jump: u8,
    values: Vec<f32>,
}

impl RankTable {
    /// A table that ranks every surface 0
    pub fn empty(stack_width: usize, max_jump: u8) -> Self {
        Self {
            stack_width,
            max_jump,
            values: Vec::new(),
        }
    }

    /// Build a table by ranking every surface with `rank`
    pub fn from_fn(
        stack_width: usize,
        max_jump: u8,
        mut rank: impl FnMut(&[i8]) -> f32,
    ) -> Result<Self, AiError> {
        let size = table_size(stack_width, max_jump)?;
        let mut surface = vec![0i8; stack_width - 1];
        let values = (0..size)
            .map(|index| {
                decode_into(index, max_jump, &mut surface);
                rank(&surface)
            })
            .collect();
        Ok(Self {
            stack_width,
            max_jump,
            values,
        })
    }

    pub fn stack_width(&self) -> usize {
        self.stack_width
    }

    pub fn max_jump(&self) -> u8 {
        self.max_jump
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Table index of a clamped surface
    ///
    /// `None` when the surface length does not match the table width or a
    /// difference is outside the clamp.
    pub fn index_of(&self, surface: &[i8]) -> Option<usize> {
        if surface.len() + 1 != self.stack_width {
            return None;
        }
        let mj = self.max_jump as i16;
        let base = 2 * self.max_jump as usize + 1;
        surface.iter().try_fold(0usize, |acc, &d| {
            let d = d as i16;
            if d < -mj || d > mj {
                None
            } else {
                acc.checked_mul(base)?.checked_add((d + mj) as usize)
            }
        })
    }

    /// Rank of a clamped surface (0 for unknown surfaces or an empty table)
    pub fn rank(&self, surface: &[i8]) -> f32 {
        self.index_of(surface)
            .and_then(|index| self.values.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Surface differences for a table index
    pub fn surface_at(&self, index: usize) -> Vec<i8> {
        let mut surface = vec![0i8; self.stack_width.saturating_sub(1)];
        decode_into(index, self.max_jump, &mut surface);
        surface
    }

    /// Load the JSON form, validating its dimensions
    pub fn load(path: &Path) -> Result<Self, AiError> {
        let text = fs::read_to_string(path)?;
        let table: RankTable = serde_json::from_str(&text)?;
        table.validate()?;
        debug!(
            "loaded rank table {} ({} entries)",
            path.display(),
            table.values.len()
        );
        Ok(table)
    }

    /// [`RankTable::load`], falling back to an empty table on any error
    pub fn load_or_empty(path: Option<&Path>, stack_width: usize, max_jump: u8) -> Self {
        let Some(path) = path else {
            warn!("no rank table configured, every surface ranks 0");
            return Self::empty(stack_width, max_jump);
        };
        match Self::load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!("rank table {} unavailable ({}), using empty table", path.display(), e);
                Self::empty(stack_width, max_jump)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AiError> {
        let text = serde_json::to_string(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), AiError> {
        let expected = table_size(self.stack_width, self.max_jump)?;
        if !self.values.is_empty() && self.values.len() != expected {
            return Err(AiError::RankTableSize {
                stack_width: self.stack_width,
                max_jump: self.max_jump,
                expected,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    /// Value iteration over every surface.
    ///
    /// Each surface starts at 1. An iteration sets every surface to the
    /// average, over the seven pieces, of the best value reachable by a
    /// flush placement that keeps all differences within the clamp
    /// (0 when the piece has no such placement), then rescales so the best
    /// surface is 1.
    pub fn generate<G: Geometry + ?Sized>(
        geometry: &G,
        stack_width: usize,
        max_jump: u8,
        iterations: usize,
    ) -> Result<Self, AiError> {
        let size = table_size(stack_width, max_jump)?;
        let profiles = piece_profiles(geometry);

        // Successor lists depend only on the surface, so compute them once.
        let mut surface = vec![0i8; stack_width - 1];
        let mut heights = vec![0u8; stack_width];
        let mut next_surface = Vec::with_capacity(stack_width - 1);
        let mut successors: Vec<[Vec<usize>; 7]> = Vec::with_capacity(size);
        let probe = Self::empty(stack_width, max_jump);

        for index in 0..size {
            decode_into(index, max_jump, &mut surface);
            surface_to_heights(&surface, &mut heights);

            let mut per_piece: [Vec<usize>; 7] = Default::default();
            for (kind, rotations) in &profiles {
                let list = &mut per_piece[kind.index()];
                for profile in rotations {
                    for column in 0..stack_width.saturating_sub(profile.len() - 1) {
                        if !fits(&heights, column, profile) {
                            continue;
                        }
                        let mut next = heights.clone();
                        add_to_heights(&mut next, column, profile);
                        if !within_jump(&next, max_jump) {
                            continue;
                        }
                        surface_into(&next, max_jump, &mut next_surface);
                        if let Some(n) = probe.index_of(&next_surface) {
                            if !list.contains(&n) {
                                list.push(n);
                            }
                        }
                    }
                }
            }
            successors.push(per_piece);
        }

        let mut values = vec![1.0f32; size];
        let mut scratch = vec![0.0f32; size];
        for iteration in 0..iterations {
            for (index, per_piece) in successors.iter().enumerate() {
                let total: f32 = per_piece
                    .iter()
                    .map(|list| list.iter().map(|&n| values[n]).fold(0.0f32, f32::max))
                    .sum();
                scratch[index] = total / PieceKind::ALL.len() as f32;
            }
            let best = scratch.iter().copied().fold(0.0f32, f32::max);
            if best > 0.0 {
                for v in scratch.iter_mut() {
                    *v /= best;
                }
            }
            std::mem::swap(&mut values, &mut scratch);
            debug!("rank iteration {} done (best {:.4})", iteration + 1, best);
        }

        info!(
            "generated rank table: width {}, max jump {}, {} surfaces",
            stack_width, max_jump, size
        );
        Ok(Self {
            stack_width,
            max_jump,
            values,
        })
    }
}

/// Number of surfaces for a stack width / clamp
pub fn table_size(stack_width: usize, max_jump: u8) -> Result<usize, AiError> {
    if !(2..=MAX_STACK_WIDTH).contains(&stack_width) {
        return Err(AiError::StackWidth(stack_width));
    }
    if max_jump > MAX_JUMP {
        return Err(AiError::MaxJump(max_jump));
    }
    let base = 2 * max_jump as usize + 1;
    base.checked_pow(stack_width as u32 - 1)
        .ok_or(AiError::RankTableTooLarge {
            stack_width,
            max_jump,
        })
}

fn decode_into(mut index: usize, max_jump: u8, out: &mut [i8]) {
    let base = 2 * max_jump as usize + 1;
    for slot in out.iter_mut().rev() {
        *slot = (index % base) as i8 - max_jump as i8;
        index /= base;
    }
}

/// Lowest non-negative heights with the given differences
fn surface_to_heights(surface: &[i8], out: &mut [u8]) {
    let mut h = 0i16;
    let mut min = 0i16;
    let mut raw = Vec::with_capacity(out.len());
    raw.push(0i16);
    for &d in surface {
        h += d as i16;
        min = min.min(h);
        raw.push(h);
    }
    for (slot, value) in out.iter_mut().zip(raw) {
        *slot = (value - min) as u8;
    }
}

fn piece_profiles<G: Geometry + ?Sized>(geometry: &G) -> Vec<(PieceKind, Vec<Profile>)> {
    PieceKind::ALL
        .iter()
        .map(|&kind| {
            let rotations = (0..geometry.rotation_count(kind))
                .map(|r| geometry.profile(kind, Rotation::from_index(r)))
                .collect();
            (kind, rotations)
        })
        .collect()
}
