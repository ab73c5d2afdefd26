mod config;
mod runner;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};
use twenty48_core::{Advisor, Board, Direction, GameState};

use config::Config;
use runner::{BatchStats, PlayOptions};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Headless 2048: let the heuristic advisor play, suggest a move, or apply one"
)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Let the advisor play one or more games to the end
    Play(PlayArgs),
    /// Print the advisor's choice and per-direction scores for a board
    Suggest {
        /// Board as four rows separated by '/', e.g. "2 2 0 0/0 0 0 0/0 0 0 0/0 0 0 4"
        #[arg(long)]
        board: Board,
    },
    /// Apply one move (with tile spawn) to a board
    Step {
        #[arg(long)]
        board: Board,
        /// up, down, left or right
        #[arg(long)]
        dir: Direction,
        /// Seed for the spawned tile (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Base seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,
    /// Number of games to play
    #[arg(long, value_name = "N")]
    games: Option<u32>,
    /// Stop each game after N accepted moves
    #[arg(long, value_name = "N")]
    max_moves: Option<u64>,
    /// End a game on reaching 2048 instead of playing on
    #[arg(long)]
    stop_on_win: bool,
    /// Score the four directions in parallel
    #[arg(long)]
    parallel_advisor: bool,
    /// Print the board after every move (single game only)
    #[arg(long)]
    print_boards: bool,
    /// Number of worker threads (defaults to Rayon default)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
    /// JSON-lines file for per-game summaries
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,
    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &cli.config {
        info!("Using configuration file: {}", path.display());
    }

    match cli.cmd {
        Cmd::Play(args) => play(config, args),
        Cmd::Suggest { board } => {
            suggest(&config, board);
            Ok(())
        }
        Cmd::Step { board, dir, seed } => {
            step(board, dir, seed);
            Ok(())
        }
    }
}

fn play(config: Config, args: PlayArgs) -> Result<()> {
    let run = config.run;
    let opts = PlayOptions {
        seed: args.seed.unwrap_or(run.seed),
        games: args.games.unwrap_or(run.games).max(1),
        max_moves: args.max_moves.or(run.max_moves),
        stop_on_win: args.stop_on_win || run.stop_on_win,
        workers: args.workers.or(run.workers),
        print_boards: args.print_boards,
        quiet: args.quiet,
    };
    let advisor = Advisor::with_weights(config.heuristic)
        .parallel(args.parallel_advisor || run.parallel_advisor);
    debug!("Heuristic weights: {:?}", advisor.weights());

    let summaries = runner::run_games(&advisor, &opts)?;
    if let Some(path) = args.results.or(run.results_file) {
        runner::write_results(&path, &summaries)?;
    }

    let stats = BatchStats::from_summaries(&summaries);
    info!(
        "Completed {} game(s): {} reached 2048, best score {}, mean score {:.1}, best tile {}",
        stats.games, stats.wins, stats.best_score, stats.mean_score, stats.best_tile
    );
    if summaries.len() == 1 {
        let s = &summaries[0];
        println!(
            "Moves made: {}, score: {}, highest tile: {}, ended: {:?}",
            s.moves, s.score, s.highest_tile, s.end
        );
    }
    Ok(())
}

fn suggest(config: &Config, board: Board) {
    let advisor = Advisor::with_weights(config.heuristic);
    print!("{}", board);
    for branch in advisor.branch_evals(board) {
        if branch.legal {
            println!("{:>5}: {}", branch.dir, branch.score);
        } else {
            println!("{:>5}: (no change)", branch.dir);
        }
    }
    match advisor.suggest(board) {
        Some(dir) => println!("suggested: {}", dir),
        None => println!("no move changes the board: game over"),
    }
}

fn step(board: Board, dir: Direction, seed: Option<u64>) {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let before = GameState::from_board(board);
    let (after, accepted) = before.apply_move(dir, &mut rng);
    if !accepted {
        println!("move {} rejected: board unchanged", dir);
        return;
    }
    print!("{}", after.board);
    println!("score delta: {}", after.score - before.score);
    if after.is_won() {
        println!("You reached 2048!");
    }
    if after.is_lost() {
        println!("No more moves available.");
    }
}
