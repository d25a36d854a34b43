//! AI players - the per-frame hooks a game host calls
//!
//! A [`BotPlayer`] glues one [`Thinker`] to its [`AiWorker`] and a
//! [`ControlMapper`]. Think requests go out when a piece appears (or, with
//! prethinking, while the game waits in ARE); the mapper turns whatever
//! decision has been published into button presses.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use blockbot_core::{Controller, GameState, Geometry, Phase};

use crate::combo::ComboThinker;
use crate::config::AiConfig;
use crate::control::ControlMapper;
use crate::decision::{Decision, ThinkJob};
use crate::error::AiError;
use crate::ranked::RanksThinker;
use crate::transitions::TransitionCell;
use crate::worker::{AiWorker, Thinker};

/// Hooks driven by the host once per frame, in this order:
/// [`on_first`](AiPlayer::on_first), [`on_new_piece`](AiPlayer::on_new_piece)
/// when a new piece became active,
/// [`compute_control_input`](AiPlayer::compute_control_input), then
/// [`on_last`](AiPlayer::on_last) after the game consumed the input.
pub trait AiPlayer {
    fn name(&self) -> &str;

    fn init(&mut self, game: &GameState, player: usize) -> Result<(), AiError>;

    fn shutdown(&mut self, game: &GameState, player: usize);

    fn on_new_piece(&mut self, game: &GameState, player: usize);

    fn on_first(&mut self, game: &GameState, player: usize);

    fn on_last(&mut self, _game: &GameState, _player: usize) {}

    fn compute_control_input(&mut self, game: &GameState, player: usize, ctrl: &mut Controller);
}

pub struct BotPlayer<T: Thinker> {
    name: String,
    /// Handed to the worker on `init`
    thinker: Option<T>,
    worker: Option<AiWorker<T>>,
    mapper: ControlMapper,
    geometry: Arc<dyn Geometry>,
    threaded: bool,
    delay: Duration,
    prethink: bool,
    build_on_ready: bool,
    build_requested: bool,
    /// Highest piece id a think was requested for
    requested: u64,
    /// Piece id that already got its one rethink
    rethought: Option<u64>,
}

pub type RanksPlayer = BotPlayer<RanksThinker>;
pub type ComboPlayer = BotPlayer<ComboThinker>;

impl<T: Thinker> BotPlayer<T> {
    pub fn new(name: &str, thinker: T, geometry: Arc<dyn Geometry>, config: &AiConfig) -> Self {
        Self {
            name: name.to_string(),
            thinker: Some(thinker),
            worker: None,
            mapper: ControlMapper::new(),
            geometry,
            threaded: config.threaded,
            delay: Duration::from_millis(config.think_delay_ms),
            prethink: false,
            build_on_ready: false,
            build_requested: false,
            requested: 0,
            rethought: None,
        }
    }

    /// Think about the upcoming piece while the game waits in ARE
    pub fn with_prethink(mut self, enabled: bool) -> Self {
        self.prethink = enabled;
        self
    }

    /// Ask the worker to build its tables during the ready countdown
    pub fn with_build_on_ready(mut self, enabled: bool) -> Self {
        self.build_on_ready = enabled;
        self
    }

    pub fn worker(&self) -> Option<&AiWorker<T>> {
        self.worker.as_ref()
    }

    pub fn latest(&self) -> Option<Arc<Decision>> {
        self.worker.as_ref().and_then(AiWorker::latest)
    }

    pub fn mapper(&self) -> &ControlMapper {
        &self.mapper
    }

    fn request(&mut self, job: Option<ThinkJob>) {
        let (Some(worker), Some(job)) = (self.worker.as_mut(), job) else {
            return;
        };
        let piece_id = job.piece_id;
        match worker.request_think(job) {
            Ok(()) => self.requested = self.requested.max(piece_id),
            Err(e) => warn!("{}: think request for piece {} failed: {}", self.name, piece_id, e),
        }
    }
}

impl<T: Thinker> AiPlayer for BotPlayer<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, _game: &GameState, player: usize) -> Result<(), AiError> {
        let Some(thinker) = self.thinker.take() else {
            return Ok(());
        };
        let worker = if self.threaded {
            AiWorker::spawn(&format!("{}-{}", self.name, player), thinker, self.delay)?
        } else {
            AiWorker::inline(thinker)
        };
        debug!(
            "{} ready for player {} (threaded={})",
            self.name, player, self.threaded
        );
        self.worker = Some(worker);
        Ok(())
    }

    fn shutdown(&mut self, _game: &GameState, player: usize) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
            debug!(
                "{} for player {} stopped after {} frames waiting",
                self.name,
                player,
                self.mapper.delay_frames()
            );
        }
    }

    fn on_new_piece(&mut self, game: &GameState, _player: usize) {
        if game.active().is_none() || self.requested >= game.piece_id() {
            return;
        }
        // A prethought or held-over decision already covers this piece.
        if self.latest().is_some_and(|d| d.applies_to_active(game)) {
            return;
        }
        self.request(ThinkJob::from_game(game));
    }

    fn on_first(&mut self, game: &GameState, _player: usize) {
        match game.phase() {
            Phase::Ready if self.build_on_ready && !self.build_requested => {
                if let Some(worker) = self.worker.as_mut() {
                    match worker.request_build() {
                        Ok(()) => self.build_requested = true,
                        Err(e) => warn!("{}: build request failed: {}", self.name, e),
                    }
                }
            }
            Phase::Are if self.prethink && self.requested <= game.piece_id() => {
                self.request(ThinkJob::prethink(game));
            }
            _ => {}
        }
    }

    fn compute_control_input(&mut self, game: &GameState, _player: usize, ctrl: &mut Controller) {
        let latest = self.latest();
        let out = self.mapper.map(
            self.geometry.as_ref(),
            game,
            latest.as_deref(),
            ctrl.previous(),
        );
        ctrl.set_buttons(out.buttons);
        // At most one rethink per piece.
        if out.rethink && self.rethought != Some(game.piece_id()) {
            self.rethought = Some(game.piece_id());
            self.request(ThinkJob::from_game(game));
        }
    }
}

/// Stacking AI with a rank table loaded from `config.ranks.table_path`
pub fn ranks_player(geometry: Arc<dyn Geometry>, config: &AiConfig) -> RanksPlayer {
    let thinker = RanksThinker::from_config(Arc::clone(&geometry), config.ranks.clone());
    BotPlayer::new("ranks", thinker, geometry, config).with_prethink(config.ranks.prethink)
}

/// 4-wide combo AI; `cell` may be shared between players
pub fn combo_player(
    geometry: Arc<dyn Geometry>,
    cell: Arc<TransitionCell>,
    config: &AiConfig,
) -> ComboPlayer {
    let thinker = ComboThinker::new(Arc::clone(&geometry), cell, config.combo.clone());
    BotPlayer::new("combo", thinker, geometry, config).with_build_on_ready(true)
}
