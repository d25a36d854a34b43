//! Terminal demo (default binary).
//!
//! Watches one AI play in the terminal. Environment:
//!
//! - `BLOCKBOT_AI`: `ranks` (default) or `combo`
//! - `BLOCKBOT_SEED`: piece queue seed
//! - `BLOCKBOT_LOG_PATH`: append log records to this file (nothing is logged otherwise)
//! - `BLOCKBOT_RULE_*`, `BLOCKBOT_AI_*`, `BLOCKBOT_RANKS_*`, `BLOCKBOT_COMBO_*`: see the
//!   config types
//!
//! `q` or `Esc` quits.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, style::Print, terminal, QueueableCommand};
use log::info;

use blockbot::ai::{combo_player, ranks_player, AiConfig, AiHost, AiPlayer, TransitionCell};
use blockbot::core::{ComboWell, GameState, Geometry, RuleConfig, Srs};
use blockbot::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

const FRAME: Duration = Duration::from_micros(16_667);

fn main() -> Result<()> {
    init_logging()?;

    let mode = env::var("BLOCKBOT_AI").unwrap_or_else(|_| "ranks".to_string());
    let seed = env::var("BLOCKBOT_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let geometry: Arc<dyn Geometry> = Arc::new(Srs);
    let config = AiConfig::from_env();
    let mut rule = RuleConfig::from_env();

    let player: Box<dyn AiPlayer> = match mode.trim() {
        "combo" => {
            rule.combo_well = Some(ComboWell {
                x: BOARD_WIDTH - ComboWell::WIDTH,
                wall_top: BOARD_HEIGHT / 2,
            });
            let cell = Arc::new(TransitionCell::new());
            Box::new(combo_player(geometry, cell, &config))
        }
        "ranks" => Box::new(ranks_player(geometry, &config)),
        other => anyhow::bail!("unknown BLOCKBOT_AI {:?} (expected ranks or combo)", other),
    };

    let well = rule.combo_well;
    let mut game = GameState::with_seed(rule, seed);
    if let Some(well) = well {
        // Three residue cells so the chain has something to start from.
        let bottom = BOARD_HEIGHT as i8 - 1;
        for x in well.x..well.x + 3 {
            game.board_mut().set(x as i8, bottom, Some(PieceKind::I));
        }
    }
    game.start();

    let mut host = AiHost::new(player, 0);
    host.init(&game).context("starting the AI")?;
    info!("{} playing seed {}", host.name(), seed);

    let mut stdout = io::stdout();
    enter(&mut stdout)?;
    let result = run(&mut stdout, &mut host, &mut game);
    host.shutdown(&game);
    // Always try to restore terminal state.
    let _ = exit(&mut stdout);

    info!(
        "finished: {} pieces, {} lines, max combo {}",
        game.pieces_placed(),
        game.lines(),
        game.max_combo()
    );
    result
}

fn init_logging() -> Result<()> {
    let Some(path) = env::var("BLOCKBOT_LOG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(out: &mut io::Stdout, host: &mut AiHost, game: &mut GameState) -> Result<()> {
    let mut next_frame = Instant::now();
    loop {
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let ctrl_c =
                    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
                if key.kind == KeyEventKind::Press
                    && (ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc))
                {
                    return Ok(());
                }
            }
            continue;
        }

        next_frame += FRAME;
        if !game.is_game_over() {
            host.step(game);
        }
        draw(out, host, game)?;
    }
}

fn draw(out: &mut io::Stdout, host: &AiHost, game: &GameState) -> Result<()> {
    let board = game.board();
    let active = game.active();

    let mut rows = Vec::with_capacity(board.height() as usize + 1);
    for y in 0..board.height() as i8 {
        let mut line = String::from("|");
        for x in 0..board.width() as i8 {
            let falling = active.is_some_and(|p| {
                p.shape()
                    .iter()
                    .any(|&(dx, dy)| p.x + dx == x && p.y + dy == y)
            });
            line.push_str(if falling {
                "[]"
            } else if board.is_occupied(x, y) {
                "##"
            } else {
                " ."
            });
        }
        line.push('|');
        rows.push(line);
    }
    rows.push(format!("+{}+", "-".repeat(board.width() as usize * 2)));

    let name = |kind: Option<PieceKind>| kind.map_or("-", |k| k.as_str());
    let next: Vec<&str> = game.next_pieces().iter().map(|p| p.as_str()).collect();
    let side = [
        format!("ai     {}", host.name()),
        format!("hold   {}", name(game.hold_piece())),
        format!("next   {}", next.join(" ")),
        format!("pieces {}", game.pieces_placed()),
        format!("lines  {}", game.lines()),
        format!("combo  {} (max {})", game.combo(), game.max_combo()),
        format!("phase  {:?}", game.phase()),
        format!("input  {:#06x}", host.last_buttons().0),
        String::new(),
        if game.is_game_over() {
            "GAME OVER - q to quit".to_string()
        } else {
            "q to quit".to_string()
        },
    ];

    out.queue(cursor::MoveTo(0, 0))?;
    for (y, row) in rows.iter().enumerate() {
        out.queue(cursor::MoveTo(0, y as u16))?;
        out.queue(Print(row))?;
        if let Some(text) = side.get(y) {
            out.queue(Print(format!("  {:<32}", text)))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn enter(out: &mut io::Stdout) -> Result<()> {
    terminal::enable_raw_mode()?;
    out.queue(terminal::EnterAlternateScreen)?;
    out.queue(cursor::Hide)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.flush()?;
    Ok(())
}

fn exit(out: &mut io::Stdout) -> Result<()> {
    out.queue(cursor::Show)?;
    out.queue(terminal::LeaveAlternateScreen)?;
    out.flush()?;
    terminal::disable_raw_mode()?;
    Ok(())
}
