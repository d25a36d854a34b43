//! Piece supply for games and simulations.
//!
//! The default source deals shuffled bags holding each of the seven kinds once.
//! Bags are appended to a preview buffer on demand, so any number of upcoming
//! pieces can be inspected without consuming them.
//!
//! Also provides a simple LCG for deterministic testing, and a fixed cyclic
//! sequence mode for scripted scenarios.

use std::collections::VecDeque;

use crate::types::PieceKind;

/// 32-bit linear congruential generator, reproducible from its seed
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // zero is a fixed point
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform-ish value below `max`
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// In-place Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

#[derive(Debug, Clone)]
enum Source {
    Bag(SimpleRng),
    /// Scripted pieces, repeated forever
    Cycle { pieces: Vec<PieceKind>, pos: usize },
}

/// Piece generator with an unbounded preview
#[derive(Debug, Clone)]
pub struct PieceQueue {
    upcoming: VecDeque<PieceKind>,
    source: Source,
    seed: u32,
}

impl PieceQueue {
    /// Create a new 7-bag queue with the given seed
    pub fn new(seed: u32) -> Self {
        let mut queue = Self {
            upcoming: VecDeque::with_capacity(14),
            source: Source::Bag(SimpleRng::new(seed)),
            seed,
        };
        queue.ensure(1);
        queue
    }

    /// Create a queue that repeats `pieces` in order
    ///
    /// Falls back to a single I piece when `pieces` is empty.
    pub fn from_sequence(pieces: &[PieceKind]) -> Self {
        let pieces = if pieces.is_empty() {
            vec![PieceKind::I]
        } else {
            pieces.to_vec()
        };
        let mut queue = Self {
            upcoming: VecDeque::with_capacity(pieces.len()),
            source: Source::Cycle { pieces, pos: 0 },
            seed: 0,
        };
        queue.ensure(1);
        queue
    }

    /// Make sure at least `n` pieces are buffered
    fn ensure(&mut self, n: usize) {
        while self.upcoming.len() < n {
            match &mut self.source {
                Source::Bag(rng) => {
                    let mut bag = PieceKind::ALL;
                    rng.shuffle(&mut bag);
                    self.upcoming.extend(bag);
                }
                Source::Cycle { pieces, pos } => {
                    self.upcoming.push_back(pieces[*pos]);
                    *pos = (*pos + 1) % pieces.len();
                }
            }
        }
    }

    /// Upcoming piece, if one is buffered
    pub fn peek(&self) -> Option<PieceKind> {
        self.upcoming.front().copied()
    }

    /// Copy the next `out.len()` pieces into `out`, refilling as needed.
    pub fn peek_into(&mut self, out: &mut [PieceKind]) {
        self.ensure(out.len());
        for (slot, kind) in out.iter_mut().zip(self.upcoming.iter()) {
            *slot = *kind;
        }
    }

    /// Removes and returns the upcoming piece
    pub fn draw(&mut self) -> PieceKind {
        self.ensure(1);
        let piece = self.upcoming.pop_front().unwrap_or(PieceKind::I);
        self.ensure(1);
        piece
    }

    /// Seed the queue was created with (0 for scripted sequences)
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
