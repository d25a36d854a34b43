//! Heights/surface model
//!
//! The ranks search never looks at cells. It works on a heights vector (one
//! relative stack height per stack column) and on the surface derived from
//! it: adjacent differences clamped to `±max_jump`. Pieces are described by
//! their [`Profile`] (bottom and top level of each covered column).
//!
//! A placement *fits* when the piece rests flush on the stack, i.e. every
//! covered column touches its bottom cell without leaving a hole.

use blockbot_core::Profile;

/// Adjacent height differences clamped to `±max_jump`
pub fn surface(heights: &[u8], max_jump: u8) -> Vec<i8> {
    let mut out = Vec::with_capacity(heights.len().saturating_sub(1));
    surface_into(heights, max_jump, &mut out);
    out
}

/// [`surface`] into a reusable buffer
pub fn surface_into(heights: &[u8], max_jump: u8, out: &mut Vec<i8>) {
    let mj = max_jump as i16;
    out.clear();
    out.extend(
        heights
            .windows(2)
            .map(|w| (w[1] as i16 - w[0] as i16).clamp(-mj, mj) as i8),
    );
}

/// Total amount by which adjacent differences exceed the clamp
pub fn distance(heights: &[u8], max_jump: u8) -> u32 {
    heights
        .windows(2)
        .map(|w| {
            let diff = (w[1] as i16 - w[0] as i16).unsigned_abs();
            diff.saturating_sub(max_jump as u16) as u32
        })
        .sum()
}

/// True when every adjacent difference is within `±max_jump`
pub fn within_jump(heights: &[u8], max_jump: u8) -> bool {
    distance(heights, max_jump) == 0
}

/// Height of the piece's lowest mino when dropped at `column`
///
/// `None` when the profile does not fit inside the heights vector.
pub fn landing_base(heights: &[u8], column: usize, profile: &Profile) -> Option<i16> {
    if profile.is_empty() || column + profile.len() > heights.len() {
        return None;
    }
    profile
        .iter()
        .enumerate()
        .map(|(i, &(low, _))| heights[column + i] as i16 - low as i16)
        .max()
        .map(|base| base.max(0))
}

/// True when the piece dropped at `column` rests flush (no holes)
pub fn fits(heights: &[u8], column: usize, profile: &Profile) -> bool {
    let Some(base) = landing_base(heights, column, profile) else {
        return false;
    };
    profile
        .iter()
        .enumerate()
        .all(|(i, &(low, _))| heights[column + i] as i16 == base + low as i16)
}

/// Deposit the piece's footprint at `column`.
///
/// Works for non-flush placements too (holes are simply covered).
/// Returns false, leaving `heights` untouched, when the profile sticks out.
pub fn add_to_heights(heights: &mut [u8], column: usize, profile: &Profile) -> bool {
    let Some(base) = landing_base(heights, column, profile) else {
        return false;
    };
    for (i, &(_, high)) in profile.iter().enumerate() {
        heights[column + i] = (base + high as i16).min(u8::MAX as i16) as u8;
    }
    true
}

/// `(min, max)` of the heights (`(0, 0)` when empty)
pub fn min_max(heights: &[u8]) -> (u8, u8) {
    let min = heights.iter().copied().min().unwrap_or(0);
    let max = heights.iter().copied().max().unwrap_or(0);
    (min, max)
}
