use rand::seq::SliceRandom as _;

use crate::{
    clock::AnimationClock,
    grid::{CellId, CellTag, GridGraph, Neighbors},
};

use super::{carve, retag, MazeGenerator, Random, RunError};

/// Randomized depth-first search with an explicit stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtracker;

impl MazeGenerator for Backtracker {
    fn generate(
        &self,
        grid: &mut GridGraph,
        rng: &mut Random,
        clock: &AnimationClock,
    ) -> Result<(), RunError> {
        let total = grid.len();
        let mut stack: Vec<CellId> = Vec::with_capacity(total);

        let mut current = grid.random_cell(rng);
        grid.visit(current);
        retag(grid, clock, current, CellTag::Cursor);

        let mut visited = 1;
        let mut first_unvisited = 0;
        while visited < total {
            clock.check()?;

            let unvisited: Neighbors = grid
                .closed_neighbors_of(current)
                .into_iter()
                .filter(|n| !grid.is_visited(*n))
                .collect();

            if let Some(&next) = unvisited.choose(rng) {
                stack.push(current);
                retag(grid, clock, current, CellTag::Active);
                carve(grid, clock, current, next)?;

                grid.visit(next);
                visited += 1;
                clock.progress().set_done(visited);
                current = next;
            } else {
                retag(grid, clock, current, CellTag::Blank);
                current = match stack.pop() {
                    Some(prev) => prev,
                    None => {
                        // lattice is connected, so this means a bug somewhere else
                        log::warn!(
                            "Backtracker ran out of stack with {} cells left, restarting",
                            total - visited
                        );
                        while grid.is_visited(CellId(first_unvisited)) {
                            first_unvisited += 1;
                        }
                        let restart = CellId(first_unvisited);
                        grid.visit(restart);
                        visited += 1;
                        restart
                    }
                };
                clock.tick()?;
            }

            retag(grid, clock, current, CellTag::Cursor);
        }

        for id in stack.into_iter().chain([current]) {
            retag(grid, clock, id, CellTag::Blank);
        }

        Ok(())
    }
}
