use std::{io, sync::Arc, time::Duration};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use gmaze::{
    grid::CellWall,
    maze::{GeneratedMaze, Maze, MazeError, RunningJob},
    solver::PathResult,
};
use thiserror::Error;

use crate::{
    args::Args,
    logging,
    renderer::{draw_grid, Screen, TermRenderer},
    settings::{ConfigError, Settings},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

const POLL: Duration = Duration::from_millis(30);
const MAX_DELAY_MS: u64 = 2000;

/// What a key press asks the running job to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Cancel,
    TogglePause,
    Faster,
    Slower,
    Move(CellWall),
}

impl Control {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Control::Cancel)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(Control::Cancel),
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(Control::TogglePause),
            KeyCode::Char('+') | KeyCode::Char('f') => Some(Control::Faster),
            KeyCode::Char('-') => Some(Control::Slower),
            KeyCode::Up | KeyCode::Char('w' | 'W') => Some(Control::Move(CellWall::Up)),
            KeyCode::Right | KeyCode::Char('d' | 'D') => Some(Control::Move(CellWall::Right)),
            KeyCode::Down | KeyCode::Char('s' | 'S') => Some(Control::Move(CellWall::Down)),
            KeyCode::Left | KeyCode::Char('a' | 'A') => Some(Control::Move(CellWall::Left)),
            _ => None,
        }
    }

    pub fn apply(self, maze: &Maze) {
        match self {
            Control::Cancel => maze.cancel(),
            Control::TogglePause => {
                if !maze.pause() {
                    maze.resume();
                }
            }
            Control::Faster => maze.set_animation_delay(maze.animation_delay() / 2),
            Control::Slower => {
                let delay = (maze.animation_delay() * 2).clamp(1, MAX_DELAY_MS);
                maze.set_animation_delay(delay);
            }
            Control::Move(dir) => match maze.step(dir) {
                Ok(moved) => log::debug!("Walker {dir:?}, moved: {moved}"),
                // only while a run holds the maze
                Err(err) => log::debug!("Walker can't move: {err}"),
            },
        }
    }
}

/// Waits for the job, handling keys while the animation is on screen.
fn drive<R>(maze: &Maze, job: RunningJob<R>, interactive: bool) -> Result<R, AppError> {
    while interactive && !job.is_finished() {
        if !event::poll(POLL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if let Some(control) = Control::from_key(key) {
                log::debug!("{control:?}");
                control.apply(maze);
            }
        }
    }

    Ok(job.wait()?)
}

/// Lets the user walk the finished maze until they quit.
fn explore(maze: &Maze, renderer: &TermRenderer) -> Result<(), AppError> {
    renderer.set_title("Walk with arrows / WASD, [q] done");
    renderer.redraw()?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match Control::from_key(key) {
            Some(Control::Cancel) => return Ok(()),
            Some(control @ Control::Move(_)) => control.apply(maze),
            _ => {}
        }
    }
}

pub fn summary(generated: &GeneratedMaze, solution: Option<&PathResult>) -> String {
    let mut lines = vec![format!(
        "{} (seed {})",
        generated.algorithm.name(),
        generated.seed
    )];

    match solution {
        Some(PathResult::Found(path)) => lines.push(format!("Path: {} cells", path.len())),
        Some(PathResult::NoPathFound) => lines.push("No path found".to_string()),
        Some(PathResult::NoDestination) => lines.push("No destination set".to_string()),
        None => {}
    }

    lines.join("\n")
}

pub fn run(args: Args) -> Result<(), AppError> {
    logging::init();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply_args(&args);
    if settings.verbose() {
        logging::get_logger().set_min_level(log::Level::Debug);
    }

    let config = settings.maze.clone();
    let animate = config.delay_ms > 0;
    let renderer = Arc::new(TermRenderer::stdout(
        config.rows.max(0) as usize,
        config.columns.max(0) as usize,
    ));

    let mut maze = Maze::new(config)?;
    if animate {
        maze = maze.with_renderer(renderer.clone());
    }

    let screen = if animate {
        logging::get_logger().hold();
        renderer.set_title("Generating... [space] pause  [+/-] speed  [q] stop");
        Some(Screen::enter()?)
    } else {
        None
    };

    let mut result = generate_and_solve(&maze, &renderer, &settings, animate);
    if animate && result.is_ok() {
        if let Err(err) = explore(&maze, &renderer) {
            result = Err(err);
        }
    }

    drop(screen);
    logging::get_logger().release();

    let (generated, solution) = result?;
    let grid = maze.grid()?;

    for line in draw_grid(&grid) {
        println!("{line}");
    }
    println!("{}", summary(&generated, solution.as_ref()));

    Ok(())
}

fn generate_and_solve(
    maze: &Maze,
    renderer: &TermRenderer,
    settings: &Settings,
    animate: bool,
) -> Result<(GeneratedMaze, Option<PathResult>), AppError> {
    let job = maze.generate_threaded(settings.algorithm)?;
    let generated = drive(maze, job, animate)?;
    log::debug!("Generated with {} (seed {})", generated.algorithm, generated.seed);

    if !settings.solve() {
        return Ok((generated, None));
    }

    if animate {
        renderer.set_title(format!(
            "{} - solving... [space] pause  [+/-] speed  [q] stop",
            generated.algorithm.name()
        ));
        renderer.redraw()?;
    }

    let job = maze.solve_threaded()?;
    let solution = drive(maze, job, animate)?;
    Ok((generated, Some(solution)))
}

#[cfg(test)]
mod tests {
    use gmaze::{algorithms::Algorithm, config::MazeConfig};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_controls() {
        assert_eq!(Control::from_key(key(KeyCode::Char('q'))), Some(Control::Cancel));
        assert_eq!(
            Control::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Control::Cancel)
        );
        assert_eq!(Control::from_key(key(KeyCode::Char(' '))), Some(Control::TogglePause));
        assert_eq!(Control::from_key(key(KeyCode::Char('+'))), Some(Control::Faster));
        assert_eq!(Control::from_key(key(KeyCode::Char('-'))), Some(Control::Slower));
        assert_eq!(
            Control::from_key(key(KeyCode::Left)),
            Some(Control::Move(CellWall::Left))
        );
        assert_eq!(
            Control::from_key(key(KeyCode::Char('w'))),
            Some(Control::Move(CellWall::Up))
        );
        assert_eq!(
            Control::from_key(key(KeyCode::Char('s'))),
            Some(Control::Move(CellWall::Down))
        );
        assert_eq!(Control::from_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn controls_change_maze() {
        let maze = Maze::new(MazeConfig::new(3, 3).with_delay(10)).unwrap();

        Control::Faster.apply(&maze);
        assert_eq!(maze.animation_delay(), 5);
        Control::Slower.apply(&maze);
        Control::Slower.apply(&maze);
        assert_eq!(maze.animation_delay(), 20);

        Control::TogglePause.apply(&maze);
        assert!(maze.is_paused());
        Control::TogglePause.apply(&maze);
        assert!(!maze.is_paused());

        maze.set_animation_delay(0);
        Control::Slower.apply(&maze);
        assert_eq!(maze.animation_delay(), 1);
    }

    #[test]
    fn move_control_walks() {
        let maze = Maze::new(MazeConfig::new(1, 3)).unwrap();
        maze.generate(Some(Algorithm::Backtracker)).unwrap();

        Control::Move(CellWall::Up).apply(&maze);
        let origin = maze.grid().unwrap().origin();
        assert_eq!(maze.grid().unwrap().walker(), origin);

        // a single row has its only corridor to the right
        Control::Move(CellWall::Right).apply(&maze);
        Control::Move(CellWall::Right).apply(&maze);
        let grid = maze.grid().unwrap();
        assert_eq!(grid.walker(), grid.cell_at(0, 2).unwrap());
    }

    #[test]
    fn batch_run_summary() {
        let maze = Maze::new(MazeConfig::new(4, 5).with_seed(8)).unwrap();
        let job = maze.generate_threaded(Some(Algorithm::Prims)).unwrap();
        let generated = drive(&maze, job, false).unwrap();
        let job = maze.solve_threaded().unwrap();
        let solution = drive(&maze, job, false).unwrap();

        let text = summary(&generated, Some(&solution));
        assert!(text.starts_with("Prim's (seed 8)"));
        assert!(text.contains("Path: "));
    }
}
