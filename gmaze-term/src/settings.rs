use std::{
    fs, io,
    path::{Path, PathBuf},
};

use gmaze::{algorithms::Algorithm, config::MazeConfig};
use ron::{self, extensions::Extensions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::args::Args;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Contents of the config file, overridden by the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub maze: MazeConfig,
    /// Picked by the weights in `maze` when unset.
    pub algorithm: Option<Algorithm>,
    pub solve: Option<bool>,
    pub verbose: Option<bool>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
        Ok(options.from_str(text)?)
    }

    pub fn apply_args(&mut self, args: &Args) {
        let maze = &mut self.maze;
        if let Some(rows) = args.rows {
            maze.rows = rows;
        }
        if let Some(columns) = args.columns {
            maze.columns = columns;
        }
        if let Some(cell_size) = args.cell_size {
            maze.cell_size = cell_size;
        }
        if let Some(delay) = args.delay {
            maze.delay_ms = delay;
        }
        if args.algorithm.is_some() {
            self.algorithm = args.algorithm;
        }
        if args.seed.is_some() {
            maze.seed = args.seed;
        }
        if args.no_solve {
            self.solve = Some(false);
        }
        if args.verbose {
            self.verbose = Some(true);
        }
    }

    pub fn solve(&self) -> bool {
        self.solve.unwrap_or(true)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_ron(
            "(
                maze: (rows: 7, columns: 9, delay_ms: 15, seed: 42),
                algorithm: recursive_division,
                solve: false,
            )",
        )
        .unwrap();

        assert_eq!(settings.maze.rows, 7);
        assert_eq!(settings.maze.columns, 9);
        assert_eq!(settings.maze.delay_ms, 15);
        assert_eq!(settings.maze.seed, Some(42));
        assert_eq!(settings.algorithm, Some(Algorithm::RecursiveDivision));
        assert_eq!(settings.maze.cell_size, MazeConfig::default().cell_size);
        assert!(!settings.solve());
        assert!(!settings.verbose());
    }

    #[test]
    fn empty_file_is_default() {
        let settings = Settings::from_ron("()").unwrap();
        assert_eq!(settings.maze, MazeConfig::default());
        assert!(settings.solve());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(
            Settings::from_ron("(maze: 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Settings::load("/definitely/not/here.ron"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn args_override_file() {
        let mut settings = Settings::from_ron("(maze: (rows: 7, columns: 9))").unwrap();
        let args = Args {
            columns: Some(40),
            delay: Some(0),
            no_solve: true,
            ..Default::default()
        };
        settings.apply_args(&args);

        assert_eq!(settings.maze.rows, 7);
        assert_eq!(settings.maze.columns, 40);
        assert_eq!(settings.maze.delay_ms, 0);
        assert!(!settings.solve());
    }
}
