mod aldous_broder;
mod backtracker;
mod hunt_and_kill;
mod prims;
mod recursive_division;

pub use aldous_broder::{AldousBroder, DEFAULT_STALL_FACTOR};
pub use backtracker::Backtracker;
pub use hunt_and_kill::HuntAndKill;
pub use prims::Prims;
pub use recursive_division::{Division, Orientation, Rect, RecursiveDivision};

use std::{fmt, num::NonZeroUsize, str::FromStr, sync::Arc};

use hashbrown::HashMap;
use rand::{distributions::WeightedIndex, prelude::Distribution as _, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    clock::AnimationClock,
    grid::{CellId, CellTag, GridError, GridGraph},
    registry::Registry,
};

/// Random number generator used for anything, where determinism is required.
pub type Random = rand_xoshiro::Xoshiro256StarStar;

/// Registry of the maze generators.
pub type GeneratorRegistry = Registry<Arc<dyn MazeGenerator>, Algorithm>;

/// Why a generation or solve run did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("run was cancelled")]
    Cancelled,
    #[error("generation stalled after {steps} steps")]
    GenerationStalled { steps: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm '{0}'")]
pub struct UnknownAlgorithm(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    AldousBroder,
    Prims,
    HuntAndKill,
    Backtracker,
    RecursiveDivision,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::AldousBroder,
        Algorithm::Prims,
        Algorithm::HuntAndKill,
        Algorithm::Backtracker,
        Algorithm::RecursiveDivision,
    ];

    /// Name for display next to the maze.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::AldousBroder => "Aldous-Broder",
            Algorithm::Prims => "Prim's",
            Algorithm::HuntAndKill => "Hunt and Kill",
            Algorithm::Backtracker => "DFS / Backtracker",
            Algorithm::RecursiveDivision => "Recursive Division",
        }
    }

    /// Identifier used in configs and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::AldousBroder => "aldous_broder",
            Algorithm::Prims => "prims",
            Algorithm::HuntAndKill => "hunt_and_kill",
            Algorithm::Backtracker => "backtracker",
            Algorithm::RecursiveDivision => "recursive_division",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.key() == wanted || a.name().to_lowercase() == s.trim().to_lowercase())
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Relative chance of each algorithm being picked when the caller doesn't choose one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmWeights {
    map: HashMap<Algorithm, u32>,
}

impl AlgorithmWeights {
    /// All weights zero, nothing can be picked until some are set.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn only(algorithm: Algorithm) -> Self {
        Self::empty().with(algorithm, 1)
    }

    pub fn with(mut self, algorithm: Algorithm, weight: u32) -> Self {
        self.map.insert(algorithm, weight);
        self
    }

    pub fn get(&self, algorithm: Algorithm) -> u32 {
        self.map.get(&algorithm).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.map.values().map(|&w| w as u64).sum()
    }

    /// Picks an algorithm proportionally to its weight, `None` if all weights are zero.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Algorithm> {
        // fixed order, so the pick only depends on the rng
        let weights = Algorithm::ALL.map(|a| self.get(a));
        let dist = WeightedIndex::new(weights).ok()?;
        Some(Algorithm::ALL[dist.sample(rng)])
    }
}

impl Default for AlgorithmWeights {
    /// Aldous-Broder is slow on bigger grids, so it is picked rarely.
    fn default() -> Self {
        Self::empty()
            .with(Algorithm::AldousBroder, 5)
            .with(Algorithm::Prims, 20)
            .with(Algorithm::HuntAndKill, 25)
            .with(Algorithm::Backtracker, 25)
            .with(Algorithm::RecursiveDivision, 25)
    }
}

/// One way of turning a freshly built grid into a perfect maze.
///
/// Implementations get a grid with all walls closed and visit counters at zero. They report every
/// wall change to the clock, call [`AnimationClock::tick`] after it and give up with
/// [`RunError::Cancelled`] as soon as the clock says so.
pub trait MazeGenerator: fmt::Debug + Sync + Send {
    fn generate(
        &self,
        grid: &mut GridGraph,
        rng: &mut Random,
        clock: &AnimationClock,
    ) -> Result<(), RunError>;

    fn guess_progress_complexity(&self, grid: &GridGraph) -> usize {
        grid.len()
    }
}

/// Registry with all five generators.
pub fn default_registry(stall_factor: NonZeroUsize) -> GeneratorRegistry {
    let mut registry: GeneratorRegistry = Registry::new();
    registry.register(
        Algorithm::AldousBroder,
        Arc::new(AldousBroder { stall_factor }),
    );
    registry.register(Algorithm::Prims, Arc::new(Prims));
    registry.register(Algorithm::HuntAndKill, Arc::new(HuntAndKill));
    registry.register(Algorithm::Backtracker, Arc::new(Backtracker));
    registry.register(
        Algorithm::RecursiveDivision,
        Arc::new(RecursiveDivision::default()),
    );
    registry
}

/// Runs `generator` on `grid` from start to the final frame.
pub fn run_generator(
    generator: &dyn MazeGenerator,
    grid: &mut GridGraph,
    rng: &mut Random,
    clock: &AnimationClock,
) -> Result<(), RunError> {
    grid.reset_visits();
    clock
        .progress()
        .restart(generator.guess_progress_complexity(grid));

    generator.generate(grid, rng, clock)?;

    grid.clear_tags();
    clock.progress().finish();
    clock.finish(grid);
    Ok(())
}

/// Opens the wall between two cells and ends the step.
pub(crate) fn carve(
    grid: &mut GridGraph,
    clock: &AnimationClock,
    from: CellId,
    to: CellId,
) -> Result<(), RunError> {
    grid.knock_down_wall(from, to)?;
    clock.cell_changed(grid, from);
    clock.cell_changed(grid, to);
    clock.tick()
}

pub(crate) fn retag(grid: &mut GridGraph, clock: &AnimationClock, id: CellId, tag: CellTag) {
    grid.set_tag(id, tag);
    clock.cell_changed(grid, id);
}
