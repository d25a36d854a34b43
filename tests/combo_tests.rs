//! Combo tables and search against live boards

use std::sync::Arc;

use blockbot::ai::field_code::{board_to_code, code_to_board, index_to_code, STATE_COUNT};
use blockbot::ai::{
    combo_player, field_to_index, simulate, window_state, AiConfig, AiHost, ComboConfig,
    ComboThinker, ThinkJob, Thinker, TransitionCell, TransitionTable, STABLE_CODES,
};
use blockbot::core::{Board, ComboWell, GameState, RuleConfig, Srs};
use blockbot::types::{PieceKind, Rotation, BOARD_HEIGHT};

#[test]
fn test_field_to_index_covers_every_code() {
    for code in 0u16..(1 << 12) {
        match STABLE_CODES.binary_search(&code) {
            Ok(index) => assert_eq!(field_to_index(code), Some(index)),
            Err(_) => assert_eq!(field_to_index(code), None),
        }
    }
    for index in 0..STATE_COUNT {
        let code = index_to_code(index).unwrap();
        let decoded = board_to_code(&code_to_board(code)).unwrap();
        assert_eq!(field_to_index(decoded), Some(index));
    }
    assert_eq!(index_to_code(STATE_COUNT), None);
}

#[test]
fn test_table_build_is_deterministic() {
    let first = TransitionTable::build(&Srs);
    let second = TransitionTable::build(&Srs);
    assert_eq!(first, second);
    assert_eq!(first.edge_count(), 190);
}

#[test]
fn test_cell_rebuild_is_a_no_op() {
    let cell = TransitionCell::new();
    let built = cell.get_or_build(&Srs);
    for _ in 0..3 {
        assert!(Arc::ptr_eq(&built, &cell.get_or_build(&Srs)));
    }
}

#[test]
fn test_o_piece_edges_are_unique() {
    let table = TransitionTable::build(&Srs);
    for state in 0..table.state_count() {
        let edges = table.edges(state, PieceKind::O);
        assert!(edges.len() <= 1, "state {} has {} O edges", state, edges.len());
        assert!(edges.iter().all(|t| t.rotation == Rotation::North && t.twist.is_none()));
    }
}

#[test]
fn test_untracked_window_is_not_found() {
    // Two cells stacked in one column: 0x011 is not a tracked code.
    let mut board = Board::new();
    board.fill_walls(6, 4, 12);
    board.set(6, 19, Some(PieceKind::L));
    board.set(6, 18, Some(PieceKind::L));
    assert_eq!(window_state(&board, 6), None);

    let cell = Arc::new(TransitionCell::new());
    let mut thinker = ComboThinker::new(Arc::new(Srs), Arc::clone(&cell), ComboConfig::default());
    let job = ThinkJob {
        piece_id: 12,
        board,
        piece: PieceKind::T,
        hold: Some(PieceKind::I),
        hold_allowed: true,
        next: vec![PieceKind::S, PieceKind::Z, PieceKind::O],
    };
    let decision = thinker.think(&job).unwrap();
    assert!(!decision.found);
    assert_eq!(decision.piece_id, 12);
    assert!(!cell.is_built());
}

#[test]
fn test_combo_decision_lands_inside_the_well() {
    let mut board = Board::new();
    board.fill_walls(6, 4, 10);
    for x in 6..9 {
        board.set(x, 19, Some(PieceKind::O));
    }
    let mut thinker = ComboThinker::new(
        Arc::new(Srs),
        Arc::new(TransitionCell::new()),
        ComboConfig {
            max_depth: 3,
            ..ComboConfig::default()
        },
    );
    let job = ThinkJob {
        piece_id: 1,
        board,
        piece: PieceKind::I,
        hold: None,
        hold_allowed: false,
        next: vec![PieceKind::T, PieceKind::L, PieceKind::J],
    };
    let decision = thinker.think(&job).unwrap();
    assert!(decision.found);
    assert!(!decision.hold);
    assert!(decision.x >= 6 - 2 && decision.x <= 9);
}

/// Seeded game with a 4-wide well at columns 6..10 and three residue cells
fn residue_game(seed: u32) -> GameState {
    let rule = RuleConfig {
        combo_well: Some(ComboWell {
            x: 6,
            wall_top: BOARD_HEIGHT / 2,
        }),
        ..RuleConfig::instant()
    };
    let mut game = GameState::with_seed(rule, seed);
    let bottom = BOARD_HEIGHT as i8 - 1;
    for x in 6..9 {
        game.board_mut().set(x, bottom, Some(PieceKind::I));
    }
    game
}

#[test]
fn test_combo_simulation_keeps_the_chain() {
    let mut game = residue_game(3);
    let mut thinker = ComboThinker::new(
        Arc::new(Srs),
        Arc::new(TransitionCell::new()),
        ComboConfig::default(),
    );
    let stats = simulate(&mut thinker, &mut game, 40);
    assert!(stats.max_combo >= 20, "chain broke: {:?}", stats);
    assert!(stats.lines >= stats.max_combo);
    // Walls are refilled after every clear, the window stays inside the well.
    assert_eq!(game.board().column_height(0), BOARD_HEIGHT / 2);
}

#[test]
fn test_combo_host_keeps_the_chain_frame_by_frame() {
    let mut game = residue_game(3);
    game.start();
    let config = AiConfig {
        threaded: false,
        ..AiConfig::default()
    };
    let cell = Arc::new(TransitionCell::new());
    let mut host = AiHost::new(Box::new(combo_player(Arc::new(Srs), cell, &config)), 0);
    host.init(&game).unwrap();

    for _ in 0..10_000 {
        if game.pieces_placed() >= 15 || game.is_game_over() {
            break;
        }
        host.step(&mut game);
    }
    host.shutdown(&game);
    assert!(game.pieces_placed() >= 15);
    assert!(game.max_combo() >= 10, "max combo {}", game.max_combo());
}
