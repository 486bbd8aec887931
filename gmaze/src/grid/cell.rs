use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dims::Dims;

use self::CellWall::*;

/// Stable index of a cell inside its [`GridGraph`](super::GridGraph).
///
/// Ids are only meaningful for the grid that produced them, a rebuilt grid hands out new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellWall {
    Up,
    Right,
    Down,
    Left,
}

impl CellWall {
    pub fn to_coord(self) -> Dims {
        match self {
            Up => Dims(0, -1),
            Right => Dims(1, 0),
            Down => Dims(0, 1),
            Left => Dims(-1, 0),
        }
    }

    pub fn reverse_wall(self) -> CellWall {
        match self {
            Up => Down,
            Right => Left,
            Down => Up,
            Left => Right,
        }
    }

    /// Clockwise, starting at the top.
    pub fn get_in_order() -> [CellWall; 4] {
        [Up, Right, Down, Left]
    }

    pub(crate) fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Display hint attached to a cell.
///
/// Algorithms set it to show what they are doing, the renderer decides how (or whether) to draw
/// it. Nothing in the algorithms depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellTag {
    #[default]
    Untouched,
    Blank,
    /// The cell an algorithm is currently standing on.
    Cursor,
    /// Picked, about to be processed.
    Active,
    Frontier,
    /// Inside the rectangle being divided.
    Region,
    Path,
    /// Left behind by the hand-driven walker.
    Trail,
}

pub(crate) const ALL_WALLS: u8 = 0b1111;

#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    pos: Dims,
    neighbors: [Option<CellId>; 4],
    walls: u8,
    visits: u32,
    draw_visits: u32,
    tag: CellTag,
}

impl Cell {
    pub(crate) fn new(id: CellId, pos: Dims, neighbors: [Option<CellId>; 4]) -> Cell {
        Cell {
            id,
            pos,
            neighbors,
            walls: ALL_WALLS,
            visits: 0,
            draw_visits: 0,
            tag: CellTag::default(),
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn pos(&self) -> Dims {
        self.pos
    }

    pub fn row(&self) -> i32 {
        self.pos.row()
    }

    pub fn column(&self) -> i32 {
        self.pos.column()
    }

    pub fn neighbor(&self, dir: CellWall) -> Option<CellId> {
        self.neighbors[dir as usize]
    }

    pub fn up(&self) -> Option<CellId> {
        self.neighbor(Up)
    }

    pub fn right(&self) -> Option<CellId> {
        self.neighbor(Right)
    }

    pub fn down(&self) -> Option<CellId> {
        self.neighbor(Down)
    }

    pub fn left(&self) -> Option<CellId> {
        self.neighbor(Left)
    }

    /// Present neighbors together with the direction they are in.
    pub fn neighbors(&self) -> impl Iterator<Item = (CellWall, CellId)> + '_ {
        CellWall::get_in_order()
            .into_iter()
            .filter_map(|dir| self.neighbor(dir).map(|id| (dir, id)))
    }

    pub fn degree(&self) -> usize {
        self.neighbors.iter().flatten().count()
    }

    /// Wall flag in the given direction. Walls on the boundary of the grid are never removed.
    pub fn get_wall(&self, dir: CellWall) -> bool {
        self.walls & dir.bit() != 0
    }

    /// `true` when there is a neighbor in that direction and no wall between them.
    pub fn is_open(&self, dir: CellWall) -> bool {
        self.neighbor(dir).is_some() && !self.get_wall(dir)
    }

    pub fn wall_mask(&self) -> u8 {
        self.walls
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn draw_visits(&self) -> u32 {
        self.draw_visits
    }

    pub fn tag(&self) -> CellTag {
        self.tag
    }

    pub(crate) fn set_wall(&mut self, dir: CellWall, closed: bool) {
        if closed {
            self.walls |= dir.bit();
        } else {
            self.walls &= !dir.bit();
        }
    }

    pub(crate) fn visit(&mut self) -> u32 {
        self.visits += 1;
        self.visits
    }

    pub(crate) fn reset_visits(&mut self) {
        self.visits = 0;
    }

    pub(crate) fn set_tag(&mut self, tag: CellTag) {
        self.tag = tag;
    }

    pub(crate) fn mark_drawn(&mut self) {
        self.draw_visits += 1;
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cell {}

/// Copy of the drawable state of one cell, handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSnapshot {
    pub id: CellId,
    pub row: i32,
    pub column: i32,
    pub cell_size: u32,
    pub tag: CellTag,
    /// How many times this cell was handed to the renderer, including this time.
    pub draw_visits: u32,
    walls: u8,
}

impl CellSnapshot {
    pub(crate) fn new(cell: &Cell, cell_size: u32) -> Self {
        // walls towards the outside of the grid are always drawn
        let mut walls = cell.walls;
        for dir in CellWall::get_in_order() {
            if cell.neighbor(dir).is_none() {
                walls |= dir.bit();
            }
        }

        Self {
            id: cell.id,
            row: cell.row(),
            column: cell.column(),
            cell_size,
            tag: cell.tag,
            draw_visits: cell.draw_visits,
            walls,
        }
    }

    pub fn has_wall(&self, dir: CellWall) -> bool {
        self.walls & dir.bit() != 0
    }

    pub fn pos(&self) -> Dims {
        Dims(self.column, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_are_independent() {
        let mut cell = Cell::new(CellId(0), Dims(0, 0), [None, Some(CellId(1)), None, None]);
        assert!(CellWall::get_in_order().iter().all(|&w| cell.get_wall(w)));

        cell.set_wall(Right, false);
        assert!(!cell.get_wall(Right));
        assert!(cell.get_wall(Up) && cell.get_wall(Down) && cell.get_wall(Left));
        assert!(cell.is_open(Right));
        assert!(!cell.is_open(Left));

        cell.set_wall(Right, true);
        assert_eq!(cell.wall_mask(), ALL_WALLS);
    }

    #[test]
    fn reverse_and_coord_agree() {
        for dir in CellWall::get_in_order() {
            assert_eq!(dir.reverse_wall().to_coord() + dir.to_coord(), Dims(0, 0));
            assert_ne!(dir.reverse_wall(), dir);
        }
    }

    #[test]
    fn snapshot_closes_outer_walls() {
        let mut cell = Cell::new(CellId(0), Dims(0, 0), [None, Some(CellId(1)), None, None]);
        cell.set_wall(Right, false);
        // the flag can not be opened through the grid, but a snapshot must not trust that
        cell.set_wall(Up, false);

        let snap = CellSnapshot::new(&cell, 8);
        assert!(snap.has_wall(Up));
        assert!(!snap.has_wall(Right));
        assert_eq!(snap.cell_size, 8);
    }
}
