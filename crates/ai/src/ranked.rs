//! Ranks search - multi-ply lookahead over the heights model
//!
//! Every rotation and column of the current piece that rests flush on the
//! stack is tried on a copy of the heights; the previews are searched the
//! same way and the leaves are scored by the rank table. Only the outermost
//! call records a move, the recursion just returns scores.
//!
//! The rightmost board column is kept open as a well. It is not part of the
//! heights vector: its index is `heights.len()`, and only a forced long
//! piece clear ever goes there.

use std::cmp::Ordering;
use std::sync::Arc;

use arrayvec::ArrayVec;
use log::{debug, warn};

use blockbot_core::types::{PieceKind, Rotation};
use blockbot_core::{Geometry, Profile};

use crate::config::RanksConfig;
use crate::decision::{Decision, ThinkJob};
use crate::error::AiError;
use crate::heights::{add_to_heights, distance, fits, min_max, surface_into};
use crate::ranks::{RankTable, MAX_STACK_WIDTH};
use crate::worker::Thinker;

/// Lowest stack height at which a long piece clear is considered
pub const LONG_CLEAR_MIN_HEIGHT: u8 = 4;
/// Highest stack height that forces the long piece clear
pub const LONG_CLEAR_FORCE_HEIGHT: u8 = 8;
/// Rows removed by a vertical long piece in the well
pub const LONG_CLEAR_ROWS: u8 = 4;

type Heights = ArrayVec<u8, MAX_STACK_WIDTH>;

/// Leaf score of a placement sequence.
///
/// Lower `distance` wins, then higher `rank`. `long_piece_used` is carried
/// along for the caller and never takes part in comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Score {
    pub rank: f32,
    pub distance: u32,
    pub long_piece_used: bool,
}

impl Score {
    /// Beats or ties every other score
    pub const FORCED: Score = Score {
        rank: f32::MAX,
        distance: 0,
        long_piece_used: true,
    };

    /// Loses to every real score
    pub const NONE: Score = Score {
        rank: 0.0,
        distance: u32::MAX,
        long_piece_used: false,
    };
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| self.rank.total_cmp(&other.rank))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

/// Top-level result of [`RankedSearch::search`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMove {
    /// Leftmost stack column covered (`heights.len()` for the well)
    pub column: usize,
    pub rotation: Rotation,
    pub score: Score,
    /// Vertical long piece into the well
    pub forced: bool,
    /// No placement scored above zero rank
    pub no_fit: bool,
}

/// True when a long piece must go into the well
pub fn forces_long_clear(piece: PieceKind, heights: &[u8], planned: bool) -> bool {
    if piece != PieceKind::I || planned || heights.is_empty() {
        return false;
    }
    let (min, max) = min_max(heights);
    min >= LONG_CLEAR_MIN_HEIGHT && max >= LONG_CLEAR_FORCE_HEIGHT
}

/// Heights after a vertical long piece in the well cleared four rows
pub fn after_long_clear(heights: &[u8]) -> Vec<u8> {
    heights
        .iter()
        .map(|h| h.saturating_sub(LONG_CLEAR_ROWS))
        .collect()
}

pub struct RankedSearch<'a> {
    table: &'a RankTable,
    max_jump: u8,
    /// Searched orientations per piece id
    orientations: [ArrayVec<(Rotation, Profile), 4>; 7],
}

impl<'a> RankedSearch<'a> {
    pub fn new<G: Geometry + ?Sized>(geometry: &G, table: &'a RankTable) -> Self {
        let orientations = std::array::from_fn(|i| {
            let kind = PieceKind::ALL[i];
            (0..geometry.rotation_count(kind).min(4))
                .map(|r| {
                    let rotation = Rotation::from_index(r);
                    (rotation, geometry.profile(kind, rotation))
                })
                .collect()
        });
        Self {
            table,
            max_jump: table.max_jump(),
            orientations,
        }
    }

    /// Best move for `pieces[0]` looking ahead through the rest.
    ///
    /// `None` only when the piece cannot be placed anywhere at all (the
    /// heights are narrower than every orientation, or `pieces` is empty).
    pub fn search(&self, heights: &[u8], pieces: &[PieceKind]) -> Option<RankedMove> {
        let (&piece, rest) = pieces.split_first()?;
        if heights.is_empty() || heights.len() > MAX_STACK_WIDTH {
            return None;
        }

        if forces_long_clear(piece, heights, false) {
            debug!("forcing long piece clear on heights {:?}", heights);
            return Some(RankedMove {
                column: heights.len(),
                rotation: Rotation::East,
                score: Score::FORCED,
                forced: true,
                no_fit: false,
            });
        }

        let mut best: Option<RankedMove> = None;
        for (rotation, profile) in &self.orientations[piece.index()] {
            for column in columns(heights.len(), profile) {
                if !fits(heights, column, profile) {
                    continue;
                }
                let mut next: Heights = heights.iter().copied().collect();
                add_to_heights(&mut next, column, profile);
                let score = self.evaluate(&next, rest, false);
                if best.map_or(true, |b| score > b.score) {
                    best = Some(RankedMove {
                        column,
                        rotation: *rotation,
                        score,
                        forced: false,
                        no_fit: false,
                    });
                }
            }
        }

        match best {
            Some(mut mv) => {
                mv.no_fit = mv.score.rank == 0.0;
                Some(mv)
            }
            None => self.fallback(heights, piece),
        }
    }

    /// Best score reachable by placing `pieces` in order on `heights`.
    ///
    /// `planned` marks a branch that already spent a long piece on a forced
    /// clear; it is never forced twice.
    pub fn evaluate(&self, heights: &[u8], pieces: &[PieceKind], planned: bool) -> Score {
        let Some((&piece, rest)) = pieces.split_first() else {
            return self.terminal(heights);
        };

        if forces_long_clear(piece, heights, planned) {
            let reduced = after_long_clear(heights);
            let score = self.evaluate(&reduced, rest, true);
            return Score {
                long_piece_used: true,
                ..score
            };
        }

        let mut best = Score::NONE;
        for (_, profile) in &self.orientations[piece.index()] {
            for column in columns(heights.len(), profile) {
                if !fits(heights, column, profile) {
                    continue;
                }
                let mut next: Heights = heights.iter().copied().collect();
                add_to_heights(&mut next, column, profile);
                let score = self.evaluate(&next, rest, planned);
                if score > best {
                    best = score;
                }
            }
        }
        best
    }

    /// Leaf score of a heights vector
    pub fn terminal(&self, heights: &[u8]) -> Score {
        let mut surface = Vec::with_capacity(MAX_STACK_WIDTH);
        surface_into(heights, self.max_jump, &mut surface);
        Score {
            rank: self.table.rank(&surface),
            distance: distance(heights, self.max_jump),
            long_piece_used: false,
        }
    }

    /// Least bad placement when nothing rests flush
    fn fallback(&self, heights: &[u8], piece: PieceKind) -> Option<RankedMove> {
        let mut best: Option<RankedMove> = None;
        for (rotation, profile) in &self.orientations[piece.index()] {
            for column in columns(heights.len(), profile) {
                let mut next: Heights = heights.iter().copied().collect();
                if !add_to_heights(&mut next, column, profile) {
                    continue;
                }
                let score = Score {
                    rank: 0.0,
                    ..self.terminal(&next)
                };
                if best.map_or(true, |b| score > b.score) {
                    best = Some(RankedMove {
                        column,
                        rotation: *rotation,
                        score,
                        forced: false,
                        no_fit: true,
                    });
                }
            }
        }
        best
    }
}

fn columns(stack_width: usize, profile: &Profile) -> std::ops::Range<usize> {
    0..(stack_width + 1).saturating_sub(profile.len())
}

/// [`Thinker`] running the ranks search on the stack columns of a job
pub struct RanksThinker {
    geometry: Arc<dyn Geometry>,
    table: Arc<RankTable>,
    config: RanksConfig,
}

impl RanksThinker {
    pub fn new(geometry: Arc<dyn Geometry>, table: Arc<RankTable>, config: RanksConfig) -> Self {
        if !table.is_empty()
            && (table.stack_width() != config.stack_width || table.max_jump() != config.max_jump)
        {
            warn!(
                "rank table is {} wide (max jump {}), configured {} wide (max jump {})",
                table.stack_width(),
                table.max_jump(),
                config.stack_width,
                config.max_jump
            );
        }
        Self {
            geometry,
            table,
            config,
        }
    }

    /// Load the configured table (or fall back to an empty one)
    pub fn from_config(geometry: Arc<dyn Geometry>, config: RanksConfig) -> Self {
        let table = RankTable::load_or_empty(
            config.table_path.as_deref(),
            config.stack_width,
            config.max_jump,
        );
        Self::new(geometry, Arc::new(table), config)
    }

    pub fn table(&self) -> &Arc<RankTable> {
        &self.table
    }

    fn decision(&self, job: &ThinkJob, piece: PieceKind, mv: RankedMove, hold: bool) -> Decision {
        let left = self.geometry.left_offset(piece, mv.rotation);
        Decision {
            piece_id: job.piece_id,
            piece,
            x: mv.column as i8 - left,
            rotation: mv.rotation,
            twist: None,
            hold,
            found: true,
            no_fit: mv.no_fit,
            score: mv.score.rank as f64,
        }
    }
}

impl Thinker for RanksThinker {
    fn think(&mut self, job: &ThinkJob) -> Result<Decision, AiError> {
        let heights = job.board.heights(self.config.stack_width);
        let depth = self.config.preview_depth;
        let search = RankedSearch::new(self.geometry.as_ref(), &self.table);

        let sequence = |first: PieceKind, queue: &[PieceKind]| -> Vec<PieceKind> {
            std::iter::once(first)
                .chain(queue.iter().copied().take(depth))
                .collect()
        };

        let primary = search.search(&heights, &sequence(job.piece, &job.next));

        let alternative = if job.hold_allowed {
            let (alt, queue) = match job.hold {
                Some(held) => (Some(held), &job.next[..]),
                None => (job.next.first().copied(), job.next.get(1..).unwrap_or(&[])),
            };
            alt.and_then(|alt| {
                search
                    .search(&heights, &sequence(alt, queue))
                    .map(|mv| (alt, mv))
            })
        } else {
            None
        };

        let decision = match (primary, alternative) {
            (Some(mv), Some((alt, alt_mv))) if mv.no_fit || alt_mv.score > mv.score => {
                self.decision(job, alt, alt_mv, true)
            }
            (Some(mv), _) => self.decision(job, job.piece, mv, false),
            (None, Some((alt, alt_mv))) => self.decision(job, alt, alt_mv, true),
            (None, None) => Decision::not_found(job.piece_id, job.piece),
        };

        debug!(
            "ranks piece {}: {:?} x={} {:?} hold={} no_fit={}",
            decision.piece_id,
            decision.piece,
            decision.x,
            decision.rotation,
            decision.hold,
            decision.no_fit
        );
        Ok(decision)
    }
}
