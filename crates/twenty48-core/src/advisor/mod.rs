//! One-ply heuristic move advisor.
//!
//! For each direction the advisor slides a copy of the board, scores the
//! result with the heuristic in [`heuristic`], and recommends the best legal
//! direction. No tile is spawned during look-ahead and the caller's board is
//! never modified (`Board` is `Copy`).
//!
//! Quick start
//! ```
//! use twenty48_core::advisor::Advisor;
//! use twenty48_core::engine::{Board, Direction};
//!
//! let b: Board = "0 0 0 2/0 0 0 2/0 0 0 0/0 0 0 0".parse().unwrap();
//! let advisor = Advisor::new();
//! assert!(advisor.suggest(b).is_some());
//!
//! // Parallel scoring gives the same answer.
//! assert_eq!(advisor.clone().parallel(true).suggest(b), advisor.suggest(b));
//! ```

use log::trace;
use rayon::prelude::*;

use crate::engine::{Board, Direction};

pub mod heuristic;

pub use heuristic::{evaluate, evaluate_with, EvaluationScore, HeuristicWeights};

/// Per-direction evaluation at the root.
///
/// - `score` is the heuristic value of the board after sliding in `dir`.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchEval {
    pub dir: Direction,
    pub score: EvaluationScore,
    pub legal: bool,
}

/// Heuristic move advisor. Holds only configuration; it keeps no state
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct Advisor {
    weights: HeuristicWeights,
    parallel: bool,
}

impl Advisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: HeuristicWeights) -> Self {
        Self {
            weights,
            parallel: false,
        }
    }

    /// Score the four directions on the rayon pool instead of in sequence.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Evaluate every direction, in [`Direction::ALL`] order.
    pub fn branch_evals(&self, board: Board) -> [BranchEval; 4] {
        if self.parallel {
            let evals: Vec<BranchEval> = Direction::ALL
                .par_iter()
                .map(|&dir| self.eval_branch(board, dir))
                .collect();
            std::array::from_fn(|i| evals[i])
        } else {
            Direction::ALL.map(|dir| self.eval_branch(board, dir))
        }
    }

    /// Recommend the legal direction with the highest score.
    ///
    /// Ties go to the earliest direction in Up, Down, Left, Right order.
    /// Returns `None` when no direction changes the board; callers should
    /// treat that like a loss.
    pub fn suggest(&self, board: Board) -> Option<Direction> {
        best_legal(&self.branch_evals(board))
    }

    fn eval_branch(&self, board: Board, dir: Direction) -> BranchEval {
        let outcome = board.shift(dir);
        let score = evaluate_with(outcome.board, &self.weights);
        trace!(
            "branch {}: legal={} delta={} score={}",
            dir,
            outcome.changed,
            outcome.score_delta,
            score
        );
        BranchEval {
            dir,
            score,
            legal: outcome.changed,
        }
    }
}

/// First strictly-better legal branch wins.
fn best_legal(branches: &[BranchEval]) -> Option<Direction> {
    let mut best: Option<&BranchEval> = None;
    for branch in branches.iter().filter(|b| b.legal) {
        match best {
            Some(current) if branch.score <= current.score => {}
            _ => best = Some(branch),
        }
    }
    best.map(|b| b.dir)
}

/// Suggest a move with default weights.
pub fn suggest(board: Board) -> Option<Direction> {
    Advisor::new().suggest(board)
}
