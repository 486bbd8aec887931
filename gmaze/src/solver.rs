use crate::{
    algorithms::{retag, RunError},
    clock::AnimationClock,
    grid::{CellId, CellTag, GridGraph, Neighbors},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    /// Cells from the origin to the destination, both included.
    Found(Vec<CellId>),
    NoPathFound,
    /// The grid has no destination set.
    NoDestination,
}

impl PathResult {
    pub fn path(&self) -> Option<&[CellId]> {
        match self {
            PathResult::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found(_))
    }
}

/// Depth-first search from the origin through open walls.
///
/// Visit counters are reset first. A step only goes to an open neighbor visited less often than the
/// current cell, so the search never walks back into its own trail. Cells on the way are tagged
/// [`CellTag::Active`], abandoned ones go back to [`CellTag::Blank`] and the final path ends up as
/// [`CellTag::Path`].
pub fn solve(grid: &mut GridGraph, clock: &AnimationClock) -> Result<PathResult, RunError> {
    let Some(destination) = grid.destination() else {
        return Ok(PathResult::NoDestination);
    };

    grid.reset_visits();
    clock.progress().restart(grid.len());

    let mut stack: Vec<CellId> = Vec::new();
    let mut current = grid.origin();
    grid.visit(current);
    retag(grid, clock, current, CellTag::Active);

    let mut explored = 1;
    while current != destination {
        clock.check()?;

        let level = grid.cell(current).visits();
        let candidates: Neighbors = grid
            .open_neighbors_of(current)
            .into_iter()
            .filter(|n| grid.cell(*n).visits() < level)
            .collect();

        match candidates.first() {
            Some(&next) => {
                stack.push(current);
                current = next;
                grid.visit(current);
                explored += 1;
                clock.progress().set_done(explored);
                retag(grid, clock, current, CellTag::Active);
            }
            None => {
                retag(grid, clock, current, CellTag::Blank);
                match stack.pop() {
                    Some(prev) => current = prev,
                    None => {
                        log::debug!("no path after exploring {explored} cells");
                        clock.progress().finish();
                        clock.finish(grid);
                        return Ok(PathResult::NoPathFound);
                    }
                }
            }
        }

        clock.tick()?;
    }

    stack.push(destination);
    for &id in &stack {
        retag(grid, clock, id, CellTag::Path);
    }
    log::debug!(
        "found path of {} cells after exploring {explored}",
        stack.len()
    );

    clock.progress().finish();
    clock.finish(grid);
    Ok(PathResult::Found(stack))
}

/// Turns the tags of a solved grid back to blank.
pub fn clear_solution(grid: &mut GridGraph, clock: &AnimationClock) {
    grid.clear_tags();
    clock.finish(grid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{tests::generate_seeded, Backtracker, Prims};

    fn assert_valid_path(grid: &GridGraph, path: &[CellId]) {
        assert_eq!(path.first(), Some(&grid.origin()));
        assert_eq!(path.last(), grid.destination().as_ref());
        for pair in path.windows(2) {
            assert_eq!(grid.is_wall_between(pair[0], pair[1]), Some(false));
        }

        let mut unique = path.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), path.len(), "path repeats a cell");
    }

    #[test]
    fn finds_path_in_generated_mazes() {
        for seed in 0..8 {
            let mut grid = generate_seeded(&Backtracker, 9, 12, seed);
            let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
            let path = res.path().unwrap().to_vec();

            assert_valid_path(&grid, &path);
            for cell in grid.all_cells() {
                assert_eq!(cell.tag() == CellTag::Path, path.contains(&cell.id()));
            }
        }

        let mut grid = generate_seeded(&Prims, 15, 4, 3);
        let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
        assert_valid_path(&grid, res.path().unwrap());
    }

    #[test]
    fn single_cell() {
        let mut grid = GridGraph::build(1, 1, 1).unwrap();
        let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
        assert_eq!(res, PathResult::Found(vec![grid.origin()]));
    }

    #[test]
    fn closed_grid_has_no_path() {
        let mut grid = GridGraph::build(3, 3, 1).unwrap();
        let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
        assert_eq!(res, PathResult::NoPathFound);
        assert!(grid.all_cells().all(|c| c.tag() != CellTag::Path));
    }

    #[test]
    fn walled_off_destination() {
        let mut grid = GridGraph::build(2, 3, 1).unwrap();
        grid.knock_down_all_walls();
        let end = grid.destination().unwrap();
        let up = grid.cell(end).up().unwrap();
        let left = grid.cell(end).left().unwrap();
        grid.raise_wall(end, up).unwrap();
        grid.raise_wall(end, left).unwrap();

        let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
        assert_eq!(res, PathResult::NoPathFound);
    }

    #[test]
    fn no_destination() {
        let mut grid = GridGraph::build(2, 2, 1).unwrap();
        grid.set_destination(None);
        let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
        assert_eq!(res, PathResult::NoDestination);
    }

    #[test]
    fn open_grid_path_is_simple() {
        let mut grid = GridGraph::build(5, 5, 1).unwrap();
        grid.knock_down_all_walls();
        let res = solve(&mut grid, &AnimationClock::batch()).unwrap();
        assert_valid_path(&grid, res.path().unwrap());
    }

    #[test]
    fn clearing_removes_path_tags() {
        let mut grid = generate_seeded(&Backtracker, 4, 4, 1);
        solve(&mut grid, &AnimationClock::batch()).unwrap();
        clear_solution(&mut grid, &AnimationClock::batch());
        assert!(grid.all_cells().all(|c| c.tag() == CellTag::Blank));
    }
}
