use std::num::NonZeroUsize;

use crate::{
    clock::AnimationClock,
    grid::{CellTag, GridGraph},
};

use super::{carve, retag, MazeGenerator, Random, RunError};

pub const DEFAULT_STALL_FACTOR: usize = 1000;

/// Random walk, that opens a wall whenever it steps into a cell for the first time.
///
/// Produces uniform spanning trees, but the walk can take very long on bigger grids, so it is cut
/// off after `stall_factor` steps per cell.
#[derive(Debug, Clone, Copy)]
pub struct AldousBroder {
    pub stall_factor: NonZeroUsize,
}

impl AldousBroder {
    pub fn max_steps(&self, cells: usize) -> usize {
        cells.saturating_mul(self.stall_factor.get())
    }
}

impl Default for AldousBroder {
    fn default() -> Self {
        Self {
            stall_factor: NonZeroUsize::new(DEFAULT_STALL_FACTOR).unwrap(),
        }
    }
}

impl MazeGenerator for AldousBroder {
    fn generate(
        &self,
        grid: &mut GridGraph,
        rng: &mut Random,
        clock: &AnimationClock,
    ) -> Result<(), RunError> {
        let total = grid.len();
        let max_steps = self.max_steps(total);

        let mut current = grid.origin();
        grid.visit(current);
        retag(grid, clock, current, CellTag::Cursor);

        let mut visited = 1;
        let mut steps = 0;
        while visited < total {
            if steps >= max_steps {
                log::warn!("Aldous-Broder gave up after {steps} steps, {visited}/{total} cells visited");
                return Err(RunError::GenerationStalled { steps });
            }
            steps += 1;
            clock.check()?;

            let Some(next) = grid.random_neighbor(current, rng) else {
                return Err(RunError::GenerationStalled { steps });
            };

            retag(grid, clock, current, CellTag::Blank);
            retag(grid, clock, next, CellTag::Cursor);

            if !grid.is_visited(next) {
                grid.visit(next);
                visited += 1;
                clock.progress().set_done(visited);
                carve(grid, clock, current, next)?;
            }

            current = next;
        }

        retag(grid, clock, current, CellTag::Blank);
        log::debug!("Aldous-Broder finished in {steps} steps");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;
    use crate::algorithms::tests::{check_frame_per_carve, check_generator, generate_seeded};

    #[test]
    fn perfect_and_deterministic() {
        check_generator(&AldousBroder::default());
    }

    #[test]
    fn one_frame_per_carve() {
        check_frame_per_carve(&AldousBroder::default());
    }

    #[test]
    fn small_grid_visits_every_cell_once() {
        let grid = generate_seeded(&AldousBroder::default(), 3, 3, 11);
        assert_eq!(grid.open_edge_count(), 8);
        assert!(grid.all_cells().all(|c| c.visits() == 1));
    }

    #[test]
    fn stalls_when_bound_is_too_tight() {
        let generator = AldousBroder {
            stall_factor: NonZeroUsize::new(1).unwrap(),
        };
        // a walk over 400 cells never covers them all in 400 steps
        let mut grid = GridGraph::build(20, 20, 1).unwrap();
        let mut rng = Random::seed_from_u64(5);
        let res = generator.generate(&mut grid, &mut rng, &AnimationClock::batch());

        assert_eq!(res, Err(RunError::GenerationStalled { steps: 400 }));
        assert!(grid.is_wall_symmetric());
    }
}
