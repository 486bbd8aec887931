use rand::{seq::SliceRandom as _, Rng as _};

use crate::{
    clock::AnimationClock,
    grid::{CellId, CellTag, GridGraph, Neighbors},
};

use super::{carve, retag, MazeGenerator, Random, RunError};

/// Randomized Prim's, grows the maze from a random cell by admitting random frontier cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prims;

struct Frontier {
    cells: Vec<CellId>,
    member: Vec<bool>,
}

impl Frontier {
    fn new(len: usize) -> Self {
        Self {
            cells: Vec::new(),
            member: vec![false; len],
        }
    }

    fn insert(&mut self, id: CellId) -> bool {
        if self.member[id.index()] {
            return false;
        }
        self.member[id.index()] = true;
        self.cells.push(id);
        true
    }

    fn take_random(&mut self, rng: &mut Random) -> Option<CellId> {
        if self.cells.is_empty() {
            return None;
        }

        let id = self.cells.swap_remove(rng.gen_range(0..self.cells.len()));
        self.member[id.index()] = false;
        Some(id)
    }
}

impl MazeGenerator for Prims {
    fn generate(
        &self,
        grid: &mut GridGraph,
        rng: &mut Random,
        clock: &AnimationClock,
    ) -> Result<(), RunError> {
        let mut frontier = Frontier::new(grid.len());

        let admit = |grid: &mut GridGraph, frontier: &mut Frontier, id: CellId| {
            grid.visit(id);
            retag(grid, clock, id, CellTag::Blank);
            for n in grid.neighbors_of(id) {
                if !grid.is_visited(n) && frontier.insert(n) {
                    retag(grid, clock, n, CellTag::Frontier);
                }
            }
        };

        let start = grid.random_cell(rng);
        admit(grid, &mut frontier, start);
        let mut admitted = 1;

        while let Some(current) = frontier.take_random(rng) {
            clock.check()?;
            retag(grid, clock, current, CellTag::Active);

            let inside: Neighbors = grid
                .neighbors_of(current)
                .into_iter()
                .filter(|n| grid.is_visited(*n))
                .collect();
            let &target = inside
                .choose(rng)
                .expect("frontier cell without a neighbor in the maze");

            carve(grid, clock, current, target)?;
            admit(grid, &mut frontier, current);

            admitted += 1;
            clock.progress().set_done(admitted);
        }

        debug_assert_eq!(admitted, grid.len());
        Ok(())
    }
}
