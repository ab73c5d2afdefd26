use rand::Rng;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::ops::{self, MoveOutcome};
use serde::{Deserialize, Serialize};

/// Cell value: 0 for empty, otherwise a power of two >= 2.
pub type Tile = u32;
/// Points accumulated from merges.
pub type Score = u64;

/// Side length of the square grid.
pub const SIZE: usize = 4;

/// Largest tile a 4x4 game can produce (2^17). Two of these never merge.
pub const MAX_TILE: Tile = 1 << 17;

pub(crate) type Rows = [[Tile; SIZE]; SIZE];

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in enumeration order. The advisor breaks ties in this order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Position of this direction within [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.pad(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction {0:?} (expected up, down, left or right)")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Errors from building a [`Board`] out of caller-supplied values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("expected 4 rows, got {0}")]
    WrongRowCount(usize),
    #[error("row {row}: expected 4 tiles, got {len}")]
    WrongColumnCount { row: usize, len: usize },
    #[error("row {row}: cannot parse tile {text:?}")]
    ParseTile {
        row: usize,
        text: String,
        #[source]
        source: ParseIntError,
    },
    #[error("tile at ({row}, {col}) is {value}, not a power of two in 2..=131072")]
    InvalidTile { row: usize, col: usize, value: Tile },
}

/// The 4x4 grid of tile values, row-major, stored by value.
///
/// `Board` is `Copy`: every transition takes a board and hands back a fresh
/// one, so speculative evaluation never touches the caller's grid.
/// Every nonzero cell holds a power of two; constructors that accept outside
/// input enforce this.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[[Tile; SIZE]; SIZE]", into = "[[Tile; SIZE]; SIZE]")]
pub struct Board(pub(crate) Rows);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Build a board from rows of tile values, rejecting anything that is
    /// neither 0 nor a power of two in `2..=MAX_TILE`.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(b.tile(3, 3), 4);
    /// assert!(Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[Tile; SIZE]; SIZE]) -> Result<Self, BoardError> {
        for (row, line) in rows.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Board(rows))
    }

    /// Borrow the rows of this board.
    #[inline]
    pub fn rows(&self) -> &[[Tile; SIZE]; SIZE] {
        &self.0
    }

    /// Consume this `Board`, returning its rows.
    #[inline]
    pub fn into_rows(self) -> [[Tile; SIZE]; SIZE] {
        self.0
    }

    /// Value at `(row, col)`; 0 when empty.
    #[inline]
    pub fn tile(&self, row: usize, col: usize) -> Tile {
        self.0[row][col]
    }

    /// Slide/merge tiles in `dir` without inserting a new tile.
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Direction};
    /// let b: Board = "2 2 0 0/0 0 0 0/0 0 0 0/0 0 0 0".parse().unwrap();
    /// let out = b.shift(Direction::Left);
    /// assert!(out.changed);
    /// assert_eq!(out.score_delta, 4);
    /// assert_eq!(out.board.tile(0, 0), 4);
    /// ```
    #[inline]
    pub fn shift(self, dir: Direction) -> MoveOutcome {
        ops::shift(self, dir)
    }

    /// Insert a 2 (90%) or 4 (10%) into a uniformly chosen empty cell, using the provided RNG.
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        ops::spawn(self, rng)
    }

    /// Convenience: like `with_random_tile` but uses thread-local RNG.
    #[inline]
    pub fn with_random_tile_thread(self) -> Self {
        let mut rng = rand::thread_rng();
        self.with_random_tile(&mut rng)
    }

    /// True if any cell holds the winning tile.
    #[inline]
    pub fn is_won(self) -> bool {
        ops::is_won(self)
    }

    /// True if the board is full and no two neighbours are equal.
    #[inline]
    pub fn is_lost(self) -> bool {
        ops::is_lost(self)
    }

    /// True if at least one direction changes the board.
    #[inline]
    pub fn can_move(self) -> bool {
        ops::can_move(self)
    }

    /// Return the highest tile value present on the board (0 if empty).
    #[inline]
    pub fn highest_tile(self) -> Tile {
        self.tiles().max().unwrap_or(0)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize {
        self.tiles().filter(|&t| t == 0).count()
    }

    /// Coordinates of empty cells in row-major order.
    pub fn empty_cells(self) -> impl Iterator<Item = (usize, usize)> {
        (0..SIZE * SIZE)
            .map(|idx| (idx / SIZE, idx % SIZE))
            .filter(move |&(r, c)| self.0[r][c] == 0)
    }

    /// Sum of all tile values.
    #[inline]
    pub fn tile_sum(self) -> Score {
        self.tiles().map(Score::from).sum()
    }

    /// Iterate over tile values in row-major order.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter {
            rows: self.0,
            idx: 0,
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: Tile) {
        self.0[row][col] = value;
    }
}

/// 0, or a power of two in `2..=MAX_TILE`.
#[inline]
pub(crate) fn is_valid_tile(value: Tile) -> bool {
    value == 0 || ((2..=MAX_TILE).contains(&value) && value.is_power_of_two())
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Parses four rows separated by `/` or newlines; tiles within a row are
/// separated by whitespace or commas.
///
/// ```
/// use twenty48_core::engine::Board;
/// let b: Board = "2,0,0,0 / 0 4 0 0 / 0 0 8 0 / 0 0 0 16".parse().unwrap();
/// assert_eq!(b.highest_tile(), 16);
/// ```
impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .split(|c| c == '/' || c == '\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() != SIZE {
            return Err(BoardError::WrongRowCount(lines.len()));
        }
        let mut rows = [[0; SIZE]; SIZE];
        for (row, line) in lines.iter().enumerate() {
            let cells: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|c| !c.is_empty())
                .collect();
            if cells.len() != SIZE {
                return Err(BoardError::WrongColumnCount {
                    row,
                    len: cells.len(),
                });
            }
            for (col, text) in cells.iter().enumerate() {
                rows[row][col] = text.parse().map_err(|source| BoardError::ParseTile {
                    row,
                    text: text.to_string(),
                    source,
                })?;
            }
        }
        Board::from_rows(rows)
    }
}

impl TryFrom<[[Tile; SIZE]; SIZE]> for Board {
    type Error = BoardError;
    fn try_from(rows: [[Tile; SIZE]; SIZE]) -> Result<Self, Self::Error> {
        Board::from_rows(rows)
    }
}

impl From<Board> for [[Tile; SIZE]; SIZE] {
    fn from(b: Board) -> Self {
        b.into_rows()
    }
}

/// Iterator over tile values in row-major order.
#[derive(Clone)]
pub struct TilesIter {
    rows: Rows,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = Tile;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= SIZE * SIZE {
            return None;
        }
        let v = self.rows[self.idx / SIZE][self.idx % SIZE];
        self.idx += 1;
        Some(v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = SIZE * SIZE - self.idx;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for TilesIter {}

impl IntoIterator for Board {
    type Item = Tile;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

impl IntoIterator for &Board {
    type Item = Tile;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}
