use std::{
    io::{self, stdout, Stdout, Write},
    panic,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use gmaze::{
    clock::Renderer,
    grid::{Cell, CellSnapshot, CellTag, CellWall, GridGraph},
};

/// Indexed by segments present: up = 1, right = 2, down = 4, left = 8.
const JUNCTIONS: [char; 16] = [
    ' ', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
];

const CELL_WIDTH: usize = 3;

/// What the text drawing needs to know about a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    walls: [bool; 4],
    tag: CellTag,
}

impl CellView {
    pub const UNTOUCHED: CellView = CellView {
        walls: [true; 4],
        tag: CellTag::Untouched,
    };

    fn closed(&self, dir: CellWall) -> bool {
        self.walls[dir as usize]
    }
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            walls: CellWall::get_in_order().map(|dir| cell.get_wall(dir)),
            tag: cell.tag(),
        }
    }
}

impl From<&CellSnapshot> for CellView {
    fn from(cell: &CellSnapshot) -> Self {
        Self {
            walls: CellWall::get_in_order().map(|dir| cell.has_wall(dir)),
            tag: cell.tag,
        }
    }
}

fn tag_fill(tag: CellTag) -> &'static str {
    match tag {
        CellTag::Untouched => "▒▒▒",
        CellTag::Blank => "   ",
        CellTag::Cursor => " █ ",
        CellTag::Active => " ▪ ",
        CellTag::Frontier => " · ",
        CellTag::Region => "░░░",
        CellTag::Path => " • ",
        CellTag::Trail => " ∘ ",
    }
}

/// Box drawing of a `rows` x `columns` maze, one string per line of text.
pub fn draw_maze(rows: usize, columns: usize, views: &[CellView]) -> Vec<String> {
    let view = |r: isize, c: isize| -> Option<&CellView> {
        if r < 0 || c < 0 || r as usize >= rows || c as usize >= columns {
            return None;
        }
        views.get(r as usize * columns + c as usize)
    };
    let wall = |r: isize, c: isize, dir: CellWall| view(r, c).is_some_and(|v| v.closed(dir));

    let mut lines = Vec::with_capacity(rows * 2 + 1);
    for r in 0..=rows as isize {
        let mut line = String::new();
        for c in 0..=columns as isize {
            let up = wall(r - 1, c, CellWall::Left) || wall(r - 1, c - 1, CellWall::Right);
            let right = wall(r, c, CellWall::Up) || wall(r - 1, c, CellWall::Down);
            let down = wall(r, c, CellWall::Left) || wall(r, c - 1, CellWall::Right);
            let left = wall(r, c - 1, CellWall::Up) || wall(r - 1, c - 1, CellWall::Down);
            let mask = up as usize | (right as usize) << 1 | (down as usize) << 2 | (left as usize) << 3;
            line.push(JUNCTIONS[mask]);

            if c < columns as isize {
                let ch = if right { '─' } else { ' ' };
                line.extend(std::iter::repeat(ch).take(CELL_WIDTH));
            }
        }
        lines.push(line);

        if r == rows as isize {
            break;
        }

        let mut line = String::new();
        for c in 0..=columns as isize {
            let closed = wall(r, c, CellWall::Left) || wall(r, c - 1, CellWall::Right);
            line.push(if closed { '│' } else { ' ' });
            if let Some(v) = view(r, c) {
                line.push_str(tag_fill(v.tag));
            }
        }
        lines.push(line);
    }

    lines
}

pub fn draw_grid(grid: &GridGraph) -> Vec<String> {
    let views: Vec<CellView> = grid.all_cells().map(CellView::from).collect();
    draw_maze(grid.rows(), grid.columns(), &views)
}

struct Frame<W> {
    out: W,
    rows: usize,
    columns: usize,
    cells: Vec<CellView>,
    title: String,
    shown: Vec<String>,
    dirty: bool,
}

impl<W: Write> Frame<W> {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone()];
        lines.extend(draw_maze(self.rows, self.columns, &self.cells));
        lines
    }

    fn draw(&mut self) -> io::Result<()> {
        let lines = self.lines();
        for (y, line) in lines.iter().enumerate() {
            if self.shown.get(y) == Some(line) {
                continue;
            }
            queue!(
                self.out,
                cursor::MoveTo(0, y as u16),
                Print(line),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        self.out.flush()?;

        self.shown = lines;
        self.dirty = false;
        Ok(())
    }
}

/// Keeps the last snapshot of every cell and redraws the changed lines at each frame boundary.
pub struct TermRenderer<W: Write + Send = Stdout> {
    frame: Mutex<Frame<W>>,
}

impl TermRenderer<Stdout> {
    pub fn stdout(rows: usize, columns: usize) -> Self {
        Self::new(stdout(), rows, columns)
    }
}

impl<W: Write + Send> TermRenderer<W> {
    pub fn new(out: W, rows: usize, columns: usize) -> Self {
        Self {
            frame: Mutex::new(Frame {
                out,
                rows,
                columns,
                cells: vec![CellView::UNTOUCHED; rows * columns],
                title: String::new(),
                shown: Vec::new(),
                dirty: true,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<Frame<W>> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let mut frame = self.lock();
        frame.title = title.into();
        frame.dirty = true;
    }

    /// Draws right away, not waiting for a frame boundary.
    pub fn redraw(&self) -> io::Result<()> {
        self.lock().draw()
    }

    pub fn into_inner(self) -> W {
        self.frame
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }
}

impl<W: Write + Send> Renderer for TermRenderer<W> {
    fn on_cell_changed(&self, cell: CellSnapshot) {
        let mut guard = self.lock();
        let frame = &mut *guard;
        let idx = cell.row as usize * frame.columns + cell.column as usize;
        if let Some(slot) = frame.cells.get_mut(idx) {
            *slot = CellView::from(&cell);
            frame.dirty = true;
        }
    }

    fn on_frame_boundary(&self) {
        let mut frame = self.lock();
        if !frame.dirty {
            return;
        }
        if let Err(err) = frame.draw() {
            log::warn!("Failed to draw frame: {err}");
        }
    }
}

/// Alternate screen with hidden cursor and raw input, restored on drop (and on panic).
pub struct Screen;

impl Screen {
    pub fn enter() -> io::Result<Self> {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show);
            let _ = terminal::disable_raw_mode();
            prev(info)
        }));

        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Screen)
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
