//! Engine module: the 4x4 board, the slide/merge transitions, tile spawning
//! and win/loss detection. Everything here is pure apart from the RNG the
//! caller passes to the spawner.
//!
//! - `Board` is a plain `Copy` matrix with useful methods.
//! - Free functions mirror the methods when convenient (e.g., `shift`).

mod ops;
pub mod state;

pub use state::{
    Board, BoardError, Direction, ParseDirectionError, Score, Tile, TilesIter, MAX_TILE, SIZE,
};

pub use ops::{
    can_move, insert_random_tile, is_lost, is_won, move_down, move_left, move_right, move_up,
    shift, slide_and_merge, spawn, MoveOutcome, WIN_TILE,
};
