//! twenty48-core: a 4x4 sliding-tile merge engine plus a heuristic move advisor.
//!
//! This crate provides:
//! - A plain `Board` value type with ergonomic methods (`shift`, `with_random_tile`,
//!   `is_lost`, ...)
//! - The slide/merge transition engine and the tile spawner (`engine` module)
//! - A one-ply heuristic advisor scoring smoothness, monotonicity and empty cells
//!   (`advisor` module)
//! - `GameState`, the board + score pair a front end threads through its calls (`game` module)
//!
//! Quick start:
//! ```
//! use twenty48_core::engine::{Board, Direction};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let out = b0.shift(Direction::Left);
//! assert!(out.board.tile_sum() == b0.tile_sum());
//! ```
//!
//! Full loop (what an auto-play timer would do)
//! ```
//! use twenty48_core::advisor::Advisor;
//! use twenty48_core::game::GameState;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let advisor = Advisor::new();
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut state = GameState::new(&mut rng);
//! let mut moves = 0u32;
//! while !state.is_lost() && moves < 16 {
//!     match state.suggest_move(&advisor) {
//!         Some(dir) => {
//!             state = state.apply_move(dir, &mut rng).0;
//!             moves += 1;
//!         }
//!         None => break,
//!     }
//! }
//! assert!(moves > 0);
//! ```
//!
//! Note: randomness only enters through the RNG handed to the spawner
//! (`Board::with_random_tile`, `GameState::new`, `GameState::apply_move`).
//! Thread-RNG conveniences exist, but prefer a seeded RNG when you need determinism.
//!
pub mod advisor;
pub mod engine;
pub mod game;

pub use advisor::{Advisor, BranchEval, EvaluationScore, HeuristicWeights};
pub use engine::{Board, Direction, MoveOutcome, Score, Tile};
pub use game::GameState;
