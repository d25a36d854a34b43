//! Rank table generator.
//!
//! Usage: `ranks-gen <out.json> [stack_width] [max_jump] [iterations]`
//!
//! Writes a table the ranks AI loads through `BLOCKBOT_RANKS_PATH`. Progress
//! is logged through `RUST_LOG` (default `info`).

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use blockbot::ai::{RankTable, RanksConfig};
use blockbot::core::Srs;

const DEFAULT_ITERATIONS: usize = 8;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let out = args
        .next()
        .map(PathBuf::from)
        .context("usage: ranks-gen <out.json> [stack_width] [max_jump] [iterations]")?;

    let defaults = RanksConfig::default();
    let stack_width = parse_arg(args.next(), "stack_width", defaults.stack_width)?;
    let max_jump = parse_arg(args.next(), "max_jump", defaults.max_jump)?;
    let iterations = parse_arg(args.next(), "iterations", DEFAULT_ITERATIONS)?;

    let start = Instant::now();
    let table = RankTable::generate(&Srs, stack_width, max_jump, iterations)?;
    info!(
        "generated {} entries ({} wide, max jump {}) in {:?}",
        table.len(),
        stack_width,
        max_jump,
        start.elapsed()
    );

    table
        .save(&out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("wrote {}", out.display());
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(arg: Option<String>, name: &str, default: T) -> Result<T> {
    match arg {
        Some(s) => s
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid {}: {:?}", name, s)),
        None => Ok(default),
    }
}
