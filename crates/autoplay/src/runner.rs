//! Auto-play loop: repeatedly ask the advisor for a direction and apply it
//! until the game is lost, capped, or (optionally) won.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use twenty48_core::{Advisor, GameState, Score, Tile};

/// Knobs for a batch of self-play games, after config and CLI are merged.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayOptions {
    pub seed: u64,
    pub games: u32,
    pub max_moves: Option<u64>,
    pub stop_on_win: bool,
    pub workers: Option<usize>,
    pub print_boards: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// No direction changes the board.
    Lost,
    /// Reached 2048 with `stop_on_win` set.
    Won,
    MoveCap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub game: u32,
    pub seed: u64,
    pub moves: u64,
    pub score: Score,
    pub highest_tile: Tile,
    pub won: bool,
    pub end: EndReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub games: usize,
    pub wins: usize,
    pub best_score: Score,
    pub mean_score: f64,
    pub best_tile: Tile,
}

impl BatchStats {
    pub fn from_summaries(summaries: &[GameSummary]) -> Self {
        let games = summaries.len();
        let total: Score = summaries.iter().map(|s| s.score).sum();
        Self {
            games,
            wins: summaries.iter().filter(|s| s.won).count(),
            best_score: summaries.iter().map(|s| s.score).max().unwrap_or(0),
            mean_score: if games == 0 { 0.0 } else { total as f64 / games as f64 },
            best_tile: summaries.iter().map(|s| s.highest_tile).max().unwrap_or(0),
        }
    }
}

/// Play one game to completion. `on_move` sees the state after every
/// accepted move.
pub fn play_game<F>(
    game: u32,
    seed: u64,
    advisor: &Advisor,
    opts: &PlayOptions,
    mut on_move: F,
) -> GameSummary
where
    F: FnMut(&GameState),
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = GameState::new(&mut rng);
    let mut moves: u64 = 0;
    let mut won = false;
    on_move(&state);

    let end = loop {
        if !won && state.is_won() {
            won = true;
            info!(
                "game {}: reached 2048 after {} moves (score {})",
                game, moves, state.score
            );
            if opts.stop_on_win {
                break EndReason::Won;
            }
        }
        if state.is_lost() {
            break EndReason::Lost;
        }
        if let Some(cap) = opts.max_moves {
            if moves >= cap {
                warn!("game {}: stopped at move cap {}", game, cap);
                break EndReason::MoveCap;
            }
        }
        // A stuck board gives no suggestion; that is a loss for auto-play.
        let Some(dir) = state.suggest_move(advisor) else {
            break EndReason::Lost;
        };
        let (next, accepted) = state.apply_move(dir, &mut rng);
        debug_assert!(accepted, "advisor suggested a no-op move");
        state = next;
        moves += 1;
        on_move(&state);
    };

    debug!("game {} finished: {:?} after {} moves", game, end, moves);
    GameSummary {
        game,
        seed,
        moves,
        score: state.score,
        highest_tile: state.highest_tile(),
        won,
        end,
    }
}

/// Play `opts.games` games, in parallel when there is more than one.
/// Game `i` is seeded with `opts.seed + i`, so results do not depend on
/// scheduling.
pub fn run_games(advisor: &Advisor, opts: &PlayOptions) -> Result<Vec<GameSummary>> {
    info!("Playing {} game(s) from seed {}", opts.games, opts.seed);

    if opts.games == 1 {
        let print = opts.print_boards;
        let summary = play_game(0, opts.seed, advisor, opts, |state| {
            if print {
                println!("score: {}\n{}", state.score, state.board);
            }
        });
        return Ok(vec![summary]);
    }

    if opts.print_boards {
        warn!("--print-boards is ignored when playing more than one game");
    }

    let pb = if opts.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(u64::from(opts.games));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})",
            )
            .context("invalid progress bar template")?
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb
    };

    let process = || -> Vec<GameSummary> {
        (0..opts.games)
            .into_par_iter()
            .map(|game| {
                let seed = opts.seed.wrapping_add(u64::from(game));
                let summary = play_game(game, seed, advisor, opts, |_| {});
                pb.inc(1);
                summary
            })
            .collect()
    };

    let summaries = if let Some(n) = opts.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("failed to build rayon thread pool")?
            .install(process)
    } else {
        process()
    };

    pb.finish_with_message("games played");
    Ok(summaries)
}

/// Write one JSON object per game.
pub fn write_results(path: &Path, summaries: &[GameSummary]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for summary in summaries {
        serde_json::to_writer(&mut writer, summary)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    info!("Wrote {} result(s) to {}", summaries.len(), path.display());
    Ok(())
}
