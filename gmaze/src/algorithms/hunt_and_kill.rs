use rand::seq::SliceRandom as _;

use crate::{
    clock::AnimationClock,
    grid::{CellId, CellTag, GridGraph, Neighbors},
};

use super::{carve, retag, MazeGenerator, Random, RunError};

/// Random walk into unvisited cells. When the walk gets stuck, the grid is scanned row by row for
/// the first unvisited cell next to the maze, which is connected and the walk continues from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuntAndKill;

fn unvisited_neighbors(grid: &GridGraph, id: CellId) -> Neighbors {
    grid.neighbors_of(id)
        .into_iter()
        .filter(|n| !grid.is_visited(*n))
        .collect()
}

/// First unvisited cell in row-major order, that touches a visited one, together with that
/// visited neighbor. `scan_from` skips the fully visited prefix of the grid.
fn hunt(grid: &GridGraph, scan_from: &mut usize, rng: &mut Random) -> Option<(CellId, CellId)> {
    let len = grid.len();
    while *scan_from < len && grid.is_visited(CellId(*scan_from)) {
        *scan_from += 1;
    }

    (*scan_from..len)
        .map(CellId)
        .filter(|id| !grid.is_visited(*id))
        .find_map(|id| {
            let visited: Neighbors = grid
                .neighbors_of(id)
                .into_iter()
                .filter(|n| grid.is_visited(*n))
                .collect();
            visited.choose(rng).map(|&n| (id, n))
        })
}

impl MazeGenerator for HuntAndKill {
    fn generate(
        &self,
        grid: &mut GridGraph,
        rng: &mut Random,
        clock: &AnimationClock,
    ) -> Result<(), RunError> {
        let total = grid.len();
        let mut scan_from = 0;
        let mut hunts = 0;

        let mut current = grid.origin();
        grid.visit(current);
        retag(grid, clock, current, CellTag::Cursor);

        let mut visited = 1;
        while visited < total {
            clock.check()?;
            retag(grid, clock, current, CellTag::Blank);

            let next = match unvisited_neighbors(grid, current).choose(rng) {
                Some(&next) => {
                    carve(grid, clock, current, next)?;
                    next
                }
                None => {
                    hunts += 1;
                    let Some((found, joined)) = hunt(grid, &mut scan_from, rng) else {
                        return Err(RunError::GenerationStalled { steps: visited });
                    };
                    carve(grid, clock, found, joined)?;
                    found
                }
            };

            grid.visit(next);
            visited += 1;
            clock.progress().set_done(visited);

            current = next;
            retag(grid, clock, current, CellTag::Cursor);
        }

        retag(grid, clock, current, CellTag::Blank);
        log::debug!("Hunt and Kill needed {hunts} hunts");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;
    use crate::algorithms::tests::{check_frame_per_carve, check_generator};

    #[test]
    fn perfect_and_deterministic() {
        check_generator(&HuntAndKill);
    }

    #[test]
    fn one_frame_per_carve() {
        check_frame_per_carve(&HuntAndKill);
    }

    #[test]
    fn hunt_picks_first_row_major_candidate() {
        let mut grid = GridGraph::build(3, 3, 1).unwrap();
        let mut rng = Random::seed_from_u64(0);

        // visited: (0,1) and (1,1), the first unvisited cell touching them is (0,0)
        let a = grid.cell_at(0, 1).unwrap();
        let b = grid.cell_at(1, 1).unwrap();
        grid.visit(a);
        grid.visit(b);

        let mut scan_from = 0;
        let (found, joined) = hunt(&grid, &mut scan_from, &mut rng).unwrap();
        assert_eq!(found, grid.cell_at(0, 0).unwrap());
        assert_eq!(joined, a);
        assert_eq!(scan_from, 0);

        grid.visit(found);
        let (found, _) = hunt(&grid, &mut scan_from, &mut rng).unwrap();
        assert_eq!(scan_from, 2);
        assert_eq!(found, grid.cell_at(0, 2).unwrap());
    }

    #[test]
    fn hunt_on_finished_grid_finds_nothing() {
        let mut grid = GridGraph::build(2, 2, 1).unwrap();
        let ids: Vec<_> = grid.ids().collect();
        for id in ids {
            grid.visit(id);
        }

        let mut scan_from = 0;
        let mut rng = Random::seed_from_u64(0);
        assert_eq!(hunt(&grid, &mut scan_from, &mut rng), None);
        assert_eq!(scan_from, 4);
    }
}
