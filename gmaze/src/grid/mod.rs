pub mod cell;
pub use cell::{Cell, CellId, CellSnapshot, CellTag, CellWall};

use rand::{seq::SliceRandom as _, Rng};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{array::Array2D, dims::Dims};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid maze dimension {rows}x{columns} with cell size {cell_size}, all must be positive")]
    InvalidDimension {
        rows: i32,
        columns: i32,
        cell_size: i32,
    },
    #[error("cells {0} and {1} are not adjacent")]
    NotAdjacent(CellId, CellId),
    #[error("no cell at row {row}, column {column}")]
    OutOfBounds { row: i32, column: i32 },
}

pub type Neighbors = SmallVec<[CellId; 4]>;

/// 4-connected lattice of cells, the graph every algorithm works on.
///
/// Cells live in a row-major arena and point at each other by [`CellId`]. The topology is fixed at
/// construction, after that only walls, visit counters and tags change. All wall writes go through
/// one helper that updates both sides, so the two flags of a wall always agree.
#[derive(Debug, Clone)]
pub struct GridGraph {
    cells: Array2D<Cell>,
    cell_size: u32,
    origin: CellId,
    destination: Option<CellId>,
    walker: CellId,
}

impl GridGraph {
    pub fn build(rows: i32, columns: i32, cell_size: i32) -> Result<Self, GridError> {
        if rows <= 0 || columns <= 0 || cell_size <= 0 {
            return Err(GridError::InvalidDimension {
                rows,
                columns,
                cell_size,
            });
        }

        let size = Dims(columns, rows);
        let cells = Array2D::from_fn(columns as usize, rows as usize, |pos| {
            let mut neighbors = [None; 4];
            for dir in CellWall::get_in_order() {
                let other = pos + dir.to_coord();
                if other.0 >= 0 && other.1 >= 0 && other.0 < size.0 && other.1 < size.1 {
                    neighbors[dir as usize] = Some(CellId(other.linear_index(size)));
                }
            }

            Cell::new(CellId(pos.linear_index(size)), pos, neighbors)
        });

        let last = cells.len() - 1;
        Ok(GridGraph {
            cells,
            cell_size: cell_size as u32,
            origin: CellId(0),
            destination: Some(CellId(last)),
            walker: CellId(0),
        })
    }

    pub fn rows(&self) -> usize {
        self.cells.height()
    }

    pub fn columns(&self) -> usize {
        self.cells.width()
    }

    /// `Dims(columns, rows)`
    pub fn size(&self) -> Dims {
        self.cells.size()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn origin(&self) -> CellId {
        self.origin
    }

    pub fn destination(&self) -> Option<CellId> {
        self.destination
    }

    /// `None` means there is nothing to solve for.
    pub fn set_destination(&mut self, destination: Option<CellId>) {
        self.destination = destination;
    }

    /// Cell the walker stands on, the origin after every build.
    pub fn walker(&self) -> CellId {
        self.walker
    }

    /// Moves the walker one cell through an open wall and leaves a trail behind it.
    ///
    /// Returns the new cell, `None` when the wall is closed or `dir` leads off the grid.
    pub fn step_walker(&mut self, dir: CellWall) -> Option<CellId> {
        let from = self.walker;
        let cell = self.cell(from);
        let to = cell.neighbor(dir).filter(|_| cell.is_open(dir))?;

        self.set_tag(from, CellTag::Trail);
        self.set_tag(to, CellTag::Cursor);
        self.walker = to;
        Some(to)
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    pub fn get_cell(&self, pos: Dims) -> Option<&Cell> {
        self.cells.get(pos)
    }

    pub fn cell_at(&self, row: i32, column: i32) -> Option<CellId> {
        self.get_cell(Dims(column, row)).map(Cell::id)
    }

    /// All cells in row-major order. Cheap to call again, so it can be restarted at will.
    pub fn all_cells(&self) -> impl Iterator<Item = &Cell> + Clone + '_ {
        self.cells_slice().iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.len()).map(CellId)
    }

    fn cells_slice(&self) -> &[Cell] {
        self.cells.as_slice()
    }

    pub fn neighbors_of(&self, id: CellId) -> Neighbors {
        self.cell(id).neighbors().map(|(_, n)| n).collect()
    }

    pub fn open_neighbors_of(&self, id: CellId) -> Neighbors {
        let cell = self.cell(id);
        cell.neighbors()
            .filter(|(dir, _)| !cell.get_wall(*dir))
            .map(|(_, n)| n)
            .collect()
    }

    pub fn closed_neighbors_of(&self, id: CellId) -> Neighbors {
        let cell = self.cell(id);
        cell.neighbors()
            .filter(|(dir, _)| cell.get_wall(*dir))
            .map(|(_, n)| n)
            .collect()
    }

    pub fn random_neighbor<R: Rng + ?Sized>(&self, id: CellId, rng: &mut R) -> Option<CellId> {
        self.neighbors_of(id).choose(rng).copied()
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> CellId {
        CellId(rng.gen_range(0..self.len()))
    }

    /// Every cell reachable from `start` ignoring walls. On a lattice this is the whole grid.
    pub fn reachable_from(&self, start: CellId) -> Vec<CellId> {
        self.closure(start, |grid, id| grid.neighbors_of(id))
    }

    /// Every cell reachable from `start` through open walls only.
    pub fn connected_from(&self, start: CellId) -> Vec<CellId> {
        self.closure(start, |grid, id| grid.open_neighbors_of(id))
    }

    fn closure(&self, start: CellId, next: impl Fn(&Self, CellId) -> Neighbors) -> Vec<CellId> {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![start];
        let mut found = Vec::new();
        seen[start.0] = true;

        while let Some(current) = stack.pop() {
            found.push(current);
            for n in next(self, current) {
                if !seen[n.0] {
                    seen[n.0] = true;
                    stack.push(n);
                }
            }
        }

        found
    }

    pub fn wall_between(&self, a: CellId, b: CellId) -> Option<CellWall> {
        self.cell(a)
            .neighbors()
            .find(|(_, n)| *n == b)
            .map(|(dir, _)| dir)
    }

    /// Writes the wall on both sides. This is the only place walls are changed.
    fn write_wall(&mut self, a: CellId, dir: CellWall, closed: bool) -> Option<CellId> {
        let b = self.cell(a).neighbor(dir)?;
        self.cells[a.0].set_wall(dir, closed);
        self.cells[b.0].set_wall(dir.reverse_wall(), closed);
        Some(b)
    }

    fn set_wall(&mut self, a: CellId, b: CellId, closed: bool) -> Result<(), GridError> {
        let dir = self.wall_between(a, b).ok_or(GridError::NotAdjacent(a, b))?;
        self.write_wall(a, dir, closed);
        Ok(())
    }

    pub fn knock_down_wall(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        self.set_wall(a, b, false)
    }

    pub fn raise_wall(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        self.set_wall(a, b, true)
    }

    pub fn is_wall_between(&self, a: CellId, b: CellId) -> Option<bool> {
        self.wall_between(a, b).map(|dir| self.cell(a).get_wall(dir))
    }

    pub fn knock_down_all_walls(&mut self) {
        for id in 0..self.len() {
            for dir in [CellWall::Right, CellWall::Down] {
                self.write_wall(CellId(id), dir, false);
            }
        }
    }

    /// Number of open edges, each counted once.
    pub fn open_edge_count(&self) -> usize {
        self.all_cells()
            .map(|cell| {
                [CellWall::Right, CellWall::Down]
                    .into_iter()
                    .filter(|&dir| cell.is_open(dir))
                    .count()
            })
            .sum()
    }

    /// The open edges form a spanning tree: connected and exactly `len - 1` edges.
    pub fn is_perfect(&self) -> bool {
        self.open_edge_count() == self.len() - 1
            && self.connected_from(self.origin).len() == self.len()
    }

    /// Checks that every wall flag matches the one on the other side.
    pub fn is_wall_symmetric(&self) -> bool {
        self.all_cells().all(|cell| {
            cell.neighbors().all(|(dir, n)| {
                cell.get_wall(dir) == self.cell(n).get_wall(dir.reverse_wall())
            })
        })
    }

    pub fn visit(&mut self, id: CellId) -> u32 {
        self.cells[id.0].visit()
    }

    pub fn is_visited(&self, id: CellId) -> bool {
        self.cell(id).visits() > 0
    }

    pub fn reset_visits(&mut self) {
        self.cells.iter_mut().for_each(Cell::reset_visits);
    }

    pub fn set_tag(&mut self, id: CellId, tag: CellTag) {
        self.cells[id.0].set_tag(tag);
    }

    pub fn clear_tags(&mut self) {
        self.cells.iter_mut().for_each(|c| c.set_tag(CellTag::Blank));
    }

    /// Copies the cell for the renderer and counts the hand-off.
    pub fn snapshot(&mut self, id: CellId) -> CellSnapshot {
        self.cells[id.0].mark_drawn();
        CellSnapshot::new(self.cell(id), self.cell_size)
    }

    /// Wall masks of all cells, row-major. Two grids with equal layouts are the same maze.
    pub fn wall_layout(&self) -> Vec<u8> {
        self.all_cells().map(Cell::wall_mask).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_non_positive() {
        assert!(matches!(
            GridGraph::build(0, 3, 1),
            Err(GridError::InvalidDimension { rows: 0, .. })
        ));
        assert!(GridGraph::build(3, -1, 1).is_err());
        assert!(GridGraph::build(3, 3, 0).is_err());
    }

    #[test]
    fn all_cells_are_distinct_and_row_major() {
        for (rows, columns) in [(1, 1), (1, 5), (4, 1), (3, 7)] {
            let grid = GridGraph::build(rows, columns, 1).unwrap();
            let cells: Vec<_> = grid.all_cells().collect();
            assert_eq!(cells.len(), (rows * columns) as usize);
            for (i, cell) in cells.iter().enumerate() {
                assert_eq!(cell.id().index(), i);
                assert_eq!(cell.row(), i as i32 / columns);
                assert_eq!(cell.column(), i as i32 % columns);
            }
            // restartable
            assert_eq!(grid.all_cells().count(), cells.len());
        }
    }

    #[test]
    fn neighbors_are_symmetric() {
        let grid = GridGraph::build(4, 5, 1).unwrap();
        for cell in grid.all_cells() {
            for (dir, n) in cell.neighbors() {
                assert_eq!(grid.cell(n).neighbor(dir.reverse_wall()), Some(cell.id()));
            }
            assert!((2..=4).contains(&cell.degree()));
            let on_border =
                cell.row() == 0 || cell.column() == 0 || cell.row() == 3 || cell.column() == 4;
            assert_eq!(on_border, cell.degree() < 4);
        }
    }

    #[test]
    fn origin_and_destination() {
        let grid = GridGraph::build(3, 4, 1).unwrap();
        assert_eq!(grid.cell(grid.origin()).pos(), Dims(0, 0));
        assert_eq!(grid.cell(grid.destination().unwrap()).pos(), Dims(3, 2));

        let single = GridGraph::build(1, 1, 1).unwrap();
        assert_eq!(Some(single.origin()), single.destination());
    }

    #[test]
    fn knock_down_and_raise_are_symmetric() {
        let mut grid = GridGraph::build(3, 3, 1).unwrap();
        let a = grid.cell_at(1, 1).unwrap();
        let b = grid.cell_at(1, 2).unwrap();
        let before = grid.wall_layout();

        grid.knock_down_wall(a, b).unwrap();
        assert_eq!(grid.is_wall_between(a, b), Some(false));
        assert_eq!(grid.is_wall_between(b, a), Some(false));
        assert!(grid.is_wall_symmetric());

        let changed: Vec<_> = before
            .iter()
            .zip(grid.wall_layout())
            .enumerate()
            .filter(|(_, (x, y))| **x != *y)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(changed, vec![a.index(), b.index()]);

        grid.raise_wall(b, a).unwrap();
        assert_eq!(grid.wall_layout(), before);
    }

    #[test]
    fn walls_between_non_neighbors_fail() {
        let mut grid = GridGraph::build(3, 3, 1).unwrap();
        let a = grid.cell_at(0, 0).unwrap();
        let c = grid.cell_at(1, 1).unwrap();
        assert_eq!(grid.knock_down_wall(a, c), Err(GridError::NotAdjacent(a, c)));
        assert_eq!(grid.knock_down_wall(a, a), Err(GridError::NotAdjacent(a, a)));
        assert!(grid.is_wall_symmetric());
    }

    #[test]
    fn open_and_closed_neighbors_partition() {
        let mut grid = GridGraph::build(3, 3, 1).unwrap();
        let center = grid.cell_at(1, 1).unwrap();
        let up = grid.cell_at(0, 1).unwrap();
        grid.knock_down_wall(center, up).unwrap();

        assert_eq!(grid.open_neighbors_of(center).as_slice(), &[up]);
        assert_eq!(grid.closed_neighbors_of(center).len(), 3);
        assert_eq!(grid.neighbors_of(center).len(), 4);
    }

    #[test]
    fn reachability() {
        let mut grid = GridGraph::build(10, 12, 1).unwrap();
        assert_eq!(grid.reachable_from(grid.origin()).len(), 120);
        assert_eq!(grid.connected_from(grid.origin()).len(), 1);
        assert!(!grid.is_perfect());

        grid.knock_down_all_walls();
        assert_eq!(grid.connected_from(grid.origin()).len(), 120);
        assert_eq!(grid.open_edge_count(), 10 * 11 + 12 * 9);
        assert!(grid.is_wall_symmetric());
    }

    #[test]
    fn reachability_does_not_recurse() {
        let mut grid = GridGraph::build(1, 200_000, 1).unwrap();
        grid.knock_down_all_walls();
        assert_eq!(grid.connected_from(grid.origin()).len(), 200_000);
        assert!(grid.is_perfect());
    }

    #[test]
    fn walker_needs_open_walls() {
        let mut grid = GridGraph::build(2, 2, 1).unwrap();
        let origin = grid.origin();
        let right = grid.cell_at(0, 1).unwrap();
        assert_eq!(grid.walker(), origin);

        assert_eq!(grid.step_walker(CellWall::Right), None);
        assert_eq!(grid.step_walker(CellWall::Up), None);
        assert_eq!(grid.walker(), origin);

        grid.knock_down_wall(origin, right).unwrap();
        assert_eq!(grid.step_walker(CellWall::Right), Some(right));
        assert_eq!(grid.walker(), right);
        assert_eq!(grid.cell(origin).tag(), CellTag::Trail);
        assert_eq!(grid.cell(right).tag(), CellTag::Cursor);

        // off the grid, even though nothing else blocks it
        grid.knock_down_all_walls();
        assert_eq!(grid.step_walker(CellWall::Right), None);
        assert_eq!(grid.step_walker(CellWall::Left), Some(origin));
    }

    #[test]
    fn visits_reset() {
        let mut grid = GridGraph::build(2, 2, 1).unwrap();
        let o = grid.origin();
        assert_eq!(grid.visit(o), 1);
        assert_eq!(grid.visit(o), 2);
        grid.reset_visits();
        assert!(grid.all_cells().all(|c| c.visits() == 0));
    }

    #[test]
    fn snapshot_counts_draws() {
        let mut grid = GridGraph::build(2, 2, 16).unwrap();
        let o = grid.origin();
        assert_eq!(grid.snapshot(o).draw_visits, 1);
        let snap = grid.snapshot(o);
        assert_eq!(snap.draw_visits, 2);
        assert_eq!(snap.cell_size, 16);
        assert!(CellWall::get_in_order().iter().all(|&w| snap.has_wall(w)));
    }
}
