//! Frame driver for one AI-controlled game
//!
//! [`AiHost`] owns the controller of one player and calls the
//! [`AiPlayer`] hooks around each [`GameState::frame`].

use log::info;

use blockbot_core::{Controller, GameState};

use crate::error::AiError;
use crate::player::AiPlayer;

pub struct AiHost {
    player: Box<dyn AiPlayer>,
    index: usize,
    ctrl: Controller,
    /// Piece id seen on the previous frame
    last_piece: u64,
}

impl AiHost {
    pub fn new(player: Box<dyn AiPlayer>, index: usize) -> Self {
        Self {
            player,
            index,
            ctrl: Controller::new(),
            last_piece: 0,
        }
    }

    pub fn init(&mut self, game: &GameState) -> Result<(), AiError> {
        self.player.init(game, self.index)?;
        info!("player {} driven by {}", self.index, self.player.name());
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.player.name()
    }

    /// Buttons pressed on the last stepped frame
    pub fn last_buttons(&self) -> blockbot_core::types::Buttons {
        self.ctrl.previous()
    }

    /// Run one frame of `game` under AI control
    pub fn step(&mut self, game: &mut GameState) {
        self.player.on_first(game, self.index);

        let piece_id = game.piece_id();
        if piece_id != self.last_piece && game.active().is_some() {
            self.last_piece = piece_id;
            self.player.on_new_piece(game, self.index);
        }

        self.player
            .compute_control_input(game, self.index, &mut self.ctrl);
        game.frame(&self.ctrl);
        self.ctrl.end_frame();

        self.player.on_last(game, self.index);
    }

    pub fn shutdown(&mut self, game: &GameState) {
        self.player.shutdown(game, self.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use blockbot_core::types::PieceKind;
    use blockbot_core::{PieceQueue, RuleConfig, Srs};

    use crate::config::AiConfig;
    use crate::player::ranks_player;

    #[test]
    fn test_host_plays_a_sequence() {
        let config = AiConfig {
            threaded: false,
            ..AiConfig::default()
        };
        let mut game = GameState::new(
            RuleConfig::instant(),
            PieceQueue::from_sequence(&[PieceKind::O, PieceKind::I, PieceKind::T]),
        );
        game.start();

        let mut host = AiHost::new(Box::new(ranks_player(Arc::new(Srs), &config)), 0);
        host.init(&game).unwrap();
        assert_eq!(host.name(), "ranks");

        for _ in 0..600 {
            if game.pieces_placed() >= 5 || game.is_game_over() {
                break;
            }
            host.step(&mut game);
        }
        host.shutdown(&game);

        assert!(game.pieces_placed() >= 5);
        assert!(!game.is_game_over());
    }
}
