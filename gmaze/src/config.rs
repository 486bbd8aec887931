use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{AlgorithmWeights, DEFAULT_STALL_FACTOR},
    grid::GridError,
    maze::MazeError,
};

/// Everything a [`Maze`](crate::maze::Maze) needs to know up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub rows: i32,
    pub columns: i32,
    /// Side of a cell for renderers, which draw in pixels.
    pub cell_size: i32,
    /// Pause after each step, `0` runs without animation.
    pub delay_ms: u64,
    pub weights: AlgorithmWeights,
    /// Fixed seed, a random one is drawn for each generation when unset.
    pub seed: Option<u64>,
    /// Aldous-Broder gives up after this many steps per cell.
    pub stall_factor: NonZeroUsize,
}

impl MazeConfig {
    pub fn new(rows: i32, columns: i32) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    pub fn with_delay(self, delay_ms: u64) -> Self {
        Self { delay_ms, ..self }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_weights(self, weights: AlgorithmWeights) -> Self {
        Self { weights, ..self }
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        if self.rows <= 0 || self.columns <= 0 || self.cell_size <= 0 {
            return Err(GridError::InvalidDimension {
                rows: self.rows,
                columns: self.columns,
                cell_size: self.cell_size,
            }
            .into());
        }

        if self.weights.total() == 0 {
            return Err(MazeError::InvalidWeights);
        }

        Ok(())
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            columns: 30,
            cell_size: 10,
            delay_ms: 0,
            weights: AlgorithmWeights::default(),
            seed: None,
            stall_factor: NonZeroUsize::new(DEFAULT_STALL_FACTOR).unwrap(),
        }
    }
}
