use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
};

use pausable_clock::PausableClock;
use rand::{thread_rng, Rng as _, SeedableRng as _};
use thiserror::Error;

use crate::{
    algorithms::{
        default_registry, run_generator, AldousBroder, Algorithm, GeneratorRegistry,
        MazeGenerator, Random, RunError,
    },
    clock::{AnimationClock, AnimationDelay, Renderer},
    config::MazeConfig,
    grid::{CellWall, GridError, GridGraph},
    progress::{Progress, ProgressHandle},
    solver::{self, PathResult},
};

#[derive(Debug, Error)]
pub enum MazeError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("a generation or solve is already running on this maze")]
    RunInProgress,
    #[error("algorithm weights are all zero, nothing to pick from")]
    InvalidWeights,
    #[error("no generator registered for {0}")]
    MissingGenerator(Algorithm),
    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// Result of a finished generation.
#[derive(Debug, Clone)]
pub struct GeneratedMaze {
    pub algorithm: Algorithm,
    /// Replaying the seed with the same algorithm and size gives the same maze.
    pub seed: u64,
    pub grid: GridGraph,
}

/// Run happening on a worker thread.
pub struct RunningJob<R> {
    pub handle: JoinHandle<Result<R, MazeError>>,
    pub progress: ProgressHandle,
    pause: Arc<PausableClock>,
}

impl<R> RunningJob<R> {
    pub fn progress(&self) -> Progress {
        self.progress.progress()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.progress.stop();
        self.pause.resume();
    }

    pub fn wait(self) -> Result<R, MazeError> {
        self.handle.join().map_err(|_| MazeError::WorkerPanicked)?
    }
}

/// Released when dropped, wherever the run ends.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock_grid(grid: &Mutex<GridGraph>) -> MutexGuard<'_, GridGraph> {
    // walls are consistent after every write, a panicked run leaves a usable grid
    grid.lock().unwrap_or_else(PoisonError::into_inner)
}

struct GenerationJob {
    algorithm: Algorithm,
    seed: u64,
    rng: Random,
    generator: Arc<dyn MazeGenerator>,
    config: MazeConfig,
    grid: Arc<Mutex<GridGraph>>,
    clock: AnimationClock,
}

impl GenerationJob {
    fn run(mut self) -> Result<GeneratedMaze, MazeError> {
        let fresh = GridGraph::build(self.config.rows, self.config.columns, self.config.cell_size)?;

        let mut grid = lock_grid(&self.grid);
        *grid = fresh;

        log::debug!(
            "Generating {}x{} maze with {} (seed {})",
            self.config.rows,
            self.config.columns,
            self.algorithm,
            self.seed
        );
        run_generator(&*self.generator, &mut grid, &mut self.rng, &self.clock)?;

        Ok(GeneratedMaze {
            algorithm: self.algorithm,
            seed: self.seed,
            grid: grid.clone(),
        })
    }
}

struct SolveJob {
    grid: Arc<Mutex<GridGraph>>,
    clock: AnimationClock,
}

impl SolveJob {
    fn run(self) -> Result<PathResult, MazeError> {
        let mut grid = lock_grid(&self.grid);
        Ok(solver::solve(&mut grid, &self.clock)?)
    }
}

/// A maze and the controls around it.
///
/// Owns the current grid and runs generators and the solver on it, either on the calling thread
/// or on a worker. At most one run is active at a time, the others fail with
/// [`MazeError::RunInProgress`]. The grid is rebuilt from scratch for every generation.
pub struct Maze {
    config: MazeConfig,
    grid: Arc<Mutex<GridGraph>>,
    registry: GeneratorRegistry,
    renderer: Option<Arc<dyn Renderer>>,
    delay: AnimationDelay,
    pause: Arc<PausableClock>,
    running: Arc<AtomicBool>,
    current: Mutex<ProgressHandle>,
}

impl Maze {
    pub fn new(config: MazeConfig) -> Result<Self, MazeError> {
        config.validate()?;
        let grid = GridGraph::build(config.rows, config.columns, config.cell_size)?;

        Ok(Self {
            registry: default_registry(config.stall_factor),
            delay: AnimationDelay::from_millis(config.delay_ms),
            grid: Arc::new(Mutex::new(grid)),
            renderer: None,
            pause: Arc::new(PausableClock::default()),
            running: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(ProgressHandle::new()),
            config,
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Replaces the generator used for `algorithm`.
    pub fn register_generator(&mut self, algorithm: Algorithm, generator: Arc<dyn MazeGenerator>) {
        self.registry.register(algorithm, generator);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn start_run(&self) -> Result<RunGuard, MazeError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MazeError::RunInProgress)?;
        Ok(RunGuard(self.running.clone()))
    }

    fn current(&self) -> MutexGuard<'_, ProgressHandle> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn new_clock(&self) -> AnimationClock {
        let progress = ProgressHandle::new();
        *self.current() = progress.clone();

        AnimationClock::new(
            self.delay.clone(),
            self.renderer.clone(),
            progress,
            self.pause.clone(),
        )
    }

    fn prepare_generation(&self, algorithm: Option<Algorithm>) -> Result<GenerationJob, MazeError> {
        let seed = self.config.seed.unwrap_or_else(|| thread_rng().gen());
        let mut rng = Random::seed_from_u64(seed);

        let algorithm = match algorithm {
            Some(algorithm) => algorithm,
            None => self
                .config
                .weights
                .choose(&mut rng)
                .ok_or(MazeError::InvalidWeights)?,
        };
        let generator = self
            .registry
            .get(&algorithm)
            .cloned()
            .ok_or(MazeError::MissingGenerator(algorithm))?;

        Ok(GenerationJob {
            algorithm,
            seed,
            rng,
            generator,
            config: self.config.clone(),
            grid: self.grid.clone(),
            clock: self.new_clock(),
        })
    }

    /// Builds a fresh grid and turns it into a maze, with `algorithm` or a weighted random one.
    pub fn generate(&self, algorithm: Option<Algorithm>) -> Result<GeneratedMaze, MazeError> {
        let _guard = self.start_run()?;
        self.prepare_generation(algorithm)?.run()
    }

    pub fn generate_threaded(
        &self,
        algorithm: Option<Algorithm>,
    ) -> Result<RunningJob<GeneratedMaze>, MazeError> {
        let guard = self.start_run()?;
        let job = self.prepare_generation(algorithm)?;
        let progress = job.clock.progress().clone();

        let handle = thread::spawn(move || {
            let _guard = guard;
            job.run()
        });

        Ok(RunningJob {
            handle,
            progress,
            pause: self.pause.clone(),
        })
    }

    fn prepare_solve(&self) -> SolveJob {
        SolveJob {
            grid: self.grid.clone(),
            clock: self.new_clock(),
        }
    }

    /// Searches the current grid for a path from the origin to the destination.
    pub fn solve(&self) -> Result<PathResult, MazeError> {
        let _guard = self.start_run()?;
        self.prepare_solve().run()
    }

    pub fn solve_threaded(&self) -> Result<RunningJob<PathResult>, MazeError> {
        let guard = self.start_run()?;
        let job = self.prepare_solve();
        let progress = job.clock.progress().clone();

        let handle = thread::spawn(move || {
            let _guard = guard;
            job.run()
        });

        Ok(RunningJob {
            handle,
            progress,
            pause: self.pause.clone(),
        })
    }

    /// Stops the active run at its next step. Does nothing when idle.
    pub fn cancel(&self) {
        self.current().stop();
        self.pause.resume();
    }

    /// Freezes an animated run before its next frame.
    ///
    /// Returns `false` if already paused, or when the delay is zero: batch runs have no frames to
    /// wait between and are not paused.
    pub fn pause(&self) -> bool {
        if self.delay.millis() == 0 {
            return false;
        }
        self.pause.pause()
    }

    pub fn resume(&self) -> bool {
        self.pause.resume()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Takes effect from the next step, also for a run in progress.
    pub fn set_animation_delay(&self, delay_ms: u64) {
        self.delay.set_millis(delay_ms);
    }

    pub fn animation_delay(&self) -> u64 {
        self.delay.millis()
    }

    /// Copy of the current grid.
    pub fn grid(&self) -> Result<GridGraph, MazeError> {
        let _guard = self.start_run()?;
        let grid = lock_grid(&self.grid).clone();
        Ok(grid)
    }

    /// Hides a shown solution, walls stay as they are.
    pub fn clear_solution(&self) -> Result<(), MazeError> {
        let _guard = self.start_run()?;
        let clock = self.new_clock();
        solver::clear_solution(&mut lock_grid(&self.grid), &clock);
        Ok(())
    }

    /// Moves the walker one cell through an open wall, see [`GridGraph::step_walker`].
    ///
    /// Returns `false` when the way is blocked. The walker is back on the origin after every
    /// generation.
    pub fn step(&self, dir: CellWall) -> Result<bool, MazeError> {
        let _guard = self.start_run()?;
        let mut grid = lock_grid(&self.grid);

        let from = grid.walker();
        let Some(to) = grid.step_walker(dir) else {
            return Ok(false);
        };
        self.new_clock().redraw(&mut grid, &[from, to]);

        if grid.destination() == Some(to) {
            log::debug!("Walker reached the destination");
        }
        Ok(true)
    }

    /// Moves the goal of the solver, `None` removes it. Reset by the next generation.
    pub fn set_destination(&self, destination: Option<(i32, i32)>) -> Result<(), MazeError> {
        let _guard = self.start_run()?;
        let mut grid = lock_grid(&self.grid);

        let destination = match destination {
            Some((row, column)) => Some(
                grid.cell_at(row, column)
                    .ok_or(GridError::OutOfBounds { row, column })?,
            ),
            None => None,
        };
        grid.set_destination(destination);
        Ok(())
    }

    /// Applies a new config, rebuilding the grid. Not allowed during a run.
    pub fn reconfigure(&mut self, config: MazeConfig) -> Result<(), MazeError> {
        config.validate()?;
        let _guard = self.start_run()?;

        let grid = GridGraph::build(config.rows, config.columns, config.cell_size)?;
        *lock_grid(&self.grid) = grid;

        self.registry.register(
            Algorithm::AldousBroder,
            Arc::new(AldousBroder {
                stall_factor: config.stall_factor,
            }),
        );
        self.delay.set_millis(config.delay_ms);
        self.config = config;

        log::debug!(
            "Maze reconfigured to {}x{}",
            self.config.rows,
            self.config.columns
        );
        Ok(())
    }
}
