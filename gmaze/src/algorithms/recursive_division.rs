use rand::Rng as _;

use crate::{
    clock::AnimationClock,
    dims::Dims,
    grid::{CellTag, GridGraph},
};

use super::{retag, MazeGenerator, Random, RunError};

/// Inclusive block of cells, rows `top..=bottom`, columns `left..=right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Rect {
    pub fn whole(grid: &GridGraph) -> Self {
        Self {
            top: 0,
            bottom: grid.rows() as i32 - 1,
            left: 0,
            right: grid.columns() as i32 - 1,
        }
    }

    /// Difference between the last and first row.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Difference between the last and first column.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn is_divisible(&self) -> bool {
        self.height() >= 1 && self.width() >= 1
    }

    pub fn cells(&self) -> impl Iterator<Item = Dims> + '_ {
        (self.top..=self.bottom)
            .flat_map(move |row| (self.left..=self.right).map(move |col| Dims(col, row)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Wall runs left to right, between row `line` and `line + 1`.
    Horizontal,
    /// Wall runs top to bottom, between column `line` and `line + 1`.
    Vertical,
}

/// One wall line across a rect with a single gap in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Division {
    pub rect: Rect,
    pub orientation: Orientation,
    pub line: i32,
    /// Column (horizontal line) or row (vertical line) left open.
    pub gap: i32,
}

impl Division {
    /// The two rects on either side of the line.
    pub fn halves(&self) -> (Rect, Rect) {
        let r = self.rect;
        match self.orientation {
            Orientation::Horizontal => (
                Rect { bottom: self.line, ..r },
                Rect { top: self.line + 1, ..r },
            ),
            Orientation::Vertical => (
                Rect { right: self.line, ..r },
                Rect { left: self.line + 1, ..r },
            ),
        }
    }

    /// Cell pairs, that get a wall between them. Skips the gap.
    pub fn walls(&self) -> impl Iterator<Item = (Dims, Dims)> + '_ {
        let (from, to) = match self.orientation {
            Orientation::Horizontal => (self.rect.left, self.rect.right),
            Orientation::Vertical => (self.rect.top, self.rect.bottom),
        };

        (from..=to)
            .filter(move |i| *i != self.gap)
            .map(move |i| match self.orientation {
                Orientation::Horizontal => (Dims(i, self.line), Dims(i, self.line + 1)),
                Orientation::Vertical => (Dims(self.line, i), Dims(self.line + 1, i)),
            })
    }
}

/// Starts with every wall open and splits the grid by walls with one gap each.
///
/// `texture` biases the orientation of the lines. Values near 1 give long corridors across the
/// grid, near 0.5 more square rooms. When unset it's drawn per run from `[0.5, 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveDivision {
    pub texture: Option<f64>,
}

impl RecursiveDivision {
    pub fn draw_texture(rng: &mut Random) -> f64 {
        0.5 + (rng.gen::<f64>() + rng.gen::<f64>()) / 4.0
    }

    /// Decides where to split `rect`, `None` once it's a single row or column.
    pub fn plan(rect: Rect, texture: f64, rng: &mut Random) -> Option<Division> {
        if !rect.is_divisible() {
            return None;
        }

        let (width, height) = (rect.width(), rect.height());

        let mut vertical = width > height;
        let area = (width as f64) * (height as f64);
        if rng.gen::<f64>() < texture.powf(area.cbrt()) {
            vertical = !vertical;
        }

        if height < 3 {
            vertical = rng.gen::<f64>() > texture;
        } else if width < 3 {
            vertical = rng.gen::<f64>() < texture;
        }

        let division = if vertical {
            Division {
                rect,
                orientation: Orientation::Vertical,
                line: rng.gen_range(rect.left..rect.right),
                gap: rng.gen_range(rect.top..=rect.bottom),
            }
        } else {
            Division {
                rect,
                orientation: Orientation::Horizontal,
                line: rng.gen_range(rect.top..rect.bottom),
                gap: rng.gen_range(rect.left..=rect.right),
            }
        };

        Some(division)
    }

    fn tag_rect(grid: &mut GridGraph, clock: &AnimationClock, rect: Rect, tag: CellTag) {
        if !clock.is_animated() {
            return;
        }
        for pos in rect.cells() {
            if let Some(id) = grid.cell_at(pos.row(), pos.column()) {
                retag(grid, clock, id, tag);
            }
        }
    }
}

impl MazeGenerator for RecursiveDivision {
    fn generate(
        &self,
        grid: &mut GridGraph,
        rng: &mut Random,
        clock: &AnimationClock,
    ) -> Result<(), RunError> {
        let texture = self.texture.unwrap_or_else(|| Self::draw_texture(rng));
        log::debug!("Recursive division with texture {texture:.3}");

        grid.knock_down_all_walls();
        let whole = Rect::whole(grid);
        Self::tag_rect(grid, clock, whole, CellTag::Blank);
        clock.tick()?;

        let mut raised = 0;
        let mut stack = vec![whole];
        while let Some(rect) = stack.pop() {
            clock.check()?;
            let Some(division) = Self::plan(rect, texture, rng) else {
                continue;
            };

            Self::tag_rect(grid, clock, rect, CellTag::Region);
            for (a, b) in division.walls() {
                let (Some(a), Some(b)) = (
                    grid.cell_at(a.row(), a.column()),
                    grid.cell_at(b.row(), b.column()),
                ) else {
                    continue;
                };

                grid.raise_wall(a, b)?;
                clock.cell_changed(grid, a);
                clock.cell_changed(grid, b);
                raised += 1;
                clock.progress().set_done(raised);
                clock.tick()?;
            }
            Self::tag_rect(grid, clock, rect, CellTag::Blank);

            let (first, second) = division.halves();
            stack.push(second);
            stack.push(first);
        }

        Ok(())
    }

    /// Walls raised in total, the edges of the lattice minus the ones of a spanning tree.
    fn guess_progress_complexity(&self, grid: &GridGraph) -> usize {
        let (rows, columns) = (grid.rows(), grid.columns());
        let edges = rows * (columns - 1) + columns * (rows - 1);
        edges - (grid.len() - 1)
    }
}
