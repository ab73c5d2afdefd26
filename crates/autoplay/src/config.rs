use std::io::Read;
use std::path::{Path, PathBuf};

use twenty48_core::HeuristicWeights;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: Run,

    /// Weights for the move advisor's board evaluation. Omitted keys keep
    /// their defaults (corner 10000, 500 per empty cell, unit smoothness and
    /// monotonicity).
    #[serde(default)]
    pub heuristic: HeuristicWeights,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Run {
    /// Base seed; game `i` uses `seed + i`.
    #[serde(default = "defaults::seed")]
    pub seed: u64,
    #[serde(default = "defaults::games")]
    pub games: u32,
    /// Stop a game after this many accepted moves (None plays to the end).
    #[serde(default)]
    pub max_moves: Option<u64>,
    /// End a game on reaching 2048 instead of playing on.
    #[serde(default)]
    pub stop_on_win: bool,
    /// Score the four directions in parallel on each move.
    #[serde(default)]
    pub parallel_advisor: bool,
    /// Worker threads for multi-game runs (defaults to Rayon default).
    #[serde(default)]
    pub workers: Option<usize>,
    /// JSON-lines file receiving one summary per game.
    #[serde(default)]
    pub results_file: Option<PathBuf>,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            seed: defaults::seed(),
            games: defaults::games(),
            max_moves: None,
            stop_on_win: false,
            parallel_advisor: false,
            workers: None,
            results_file: None,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut contents = String::new();
        std::fs::File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_toml(p),
            None => Ok(Self::default()),
        }
    }
}

mod defaults {
    pub fn seed() -> u64 { 0 }
    pub fn games() -> u32 { 1 }
}
