use serde::{Deserialize, Serialize};

use crate::engine::{Board, SIZE};

/// Relative desirability of a board. Only meaningful when compared against
/// other boards scored within the same decision.
pub type EvaluationScore = i64;

/// Weights for the three heuristic terms.
///
/// The defaults reproduce the plain sum: smoothness + monotonicity
/// (with a 10000 corner bonus) + 500 per empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Added when the largest tile sits in the top-left corner.
    pub corner_bonus: i64,
    /// Reward per empty cell.
    pub empty_weight: i64,
    pub smoothness_weight: i64,
    pub monotonicity_weight: i64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            corner_bonus: 10_000,
            empty_weight: 500,
            smoothness_weight: 1,
            monotonicity_weight: 1,
        }
    }
}

/// Score `board` with the default weights.
///
/// ```
/// use twenty48_core::advisor::evaluate;
/// use twenty48_core::engine::Board;
/// let open: Board = "4 0 0 0/0 0 0 0/0 0 0 0/0 0 0 0".parse().unwrap();
/// let cramped: Board = "2 4 2 4/4 2 4 2/2 4 2 4/4 2 4 0".parse().unwrap();
/// assert!(evaluate(open) > evaluate(cramped));
/// ```
#[inline]
pub fn evaluate(board: Board) -> EvaluationScore {
    evaluate_with(board, &HeuristicWeights::default())
}

pub fn evaluate_with(board: Board, weights: &HeuristicWeights) -> EvaluationScore {
    weights.smoothness_weight * smoothness(board)
        + weights.monotonicity_weight * monotonicity(board, weights.corner_bonus)
        + empty_bonus(board, weights.empty_weight)
}

/// Negated sum of absolute differences between each cell and its right and
/// lower neighbours. Zero for a uniform board, more negative when rougher.
pub fn smoothness(board: Board) -> EvaluationScore {
    let rows = board.rows();
    let mut score = 0;
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = i64::from(rows[r][c]);
            if c + 1 < SIZE {
                score -= (v - i64::from(rows[r][c + 1])).abs();
            }
            if r + 1 < SIZE {
                score -= (v - i64::from(rows[r + 1][c])).abs();
            }
        }
    }
    score
}

/// Rewards tiles that do not exceed the tile above or to the left, plus
/// `corner_bonus` when the maximum tile is at the top-left.
///
/// An empty board counts as having its maximum (0) in the corner.
pub fn monotonicity(board: Board, corner_bonus: i64) -> EvaluationScore {
    let rows = board.rows();
    let mut score = 0;
    if rows[0][0] == board.highest_tile() {
        score += corner_bonus;
    }
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = rows[r][c];
            if r > 0 && rows[r - 1][c] >= v {
                score += i64::from(v);
            }
            if c > 0 && rows[r][c - 1] >= v {
                score += i64::from(v);
            }
        }
    }
    score
}

#[inline]
pub fn empty_bonus(board: Board, empty_weight: i64) -> EvaluationScore {
    board.count_empty() as i64 * empty_weight
}
