use crate::console::{color, Console};
use crate::error::{ToolError, ToolInitError};
use crate::interrupt::{Interrupt, INTERRUPT};
use crate::platform::platform;
use crate::session::Session;
use crate::tool::{require, ArgSpec, Descriptor, Handler, Invocation, ToolImpl};
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const FRAME_DELAY: Duration = Duration::from_millis(20);
const DEFAULT_PASSES: usize = 3;
/// Largest side and cell count a grid may have; beyond that it can't be drawn anyway.
const MAX_SIDE: usize = 1024;
const MAX_CELLS: usize = 65_536;

/// Binary grid animated by filling and emptying random cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    rows: Vec<Vec<u8>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![0; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn cells(&self) -> usize {
        self.width * self.height()
    }

    pub fn points(&self) -> usize {
        self.rows.iter().flatten().filter(|&&v| v == 1).count()
    }

    pub fn is_full(&self) -> bool {
        self.points() == self.cells()
    }

    pub fn is_empty(&self) -> bool {
        self.points() == 0
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.rows[y][x] = value;
    }

    fn positions(&self, value: u8) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v == value {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Set a random empty cell. Returns false when the grid is already full.
    pub fn add_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.flip_random(rng, 0, 1)
    }

    /// Clear a random filled cell. Returns false when the grid is already empty.
    pub fn remove_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.flip_random(rng, 1, 0)
    }

    fn flip_random<R: Rng + ?Sized>(&mut self, rng: &mut R, from: u8, to: u8) -> bool {
        match self.positions(from).choose(rng) {
            Some(&(x, y)) => {
                self.set(x, y, to);
                true
            }
            None => false,
        }
    }

    /// Rows with their sums; the last three rows carry the totals when the
    /// grid is tall enough, the first one the optional progress label.
    pub fn render(&self, console: &Console<'_>, progress: Option<&str>) -> String {
        let mut lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let sum: u32 = row.iter().map(|&v| u32::from(v)).sum();
                let code = if (sum as f64) < self.width as f64 / 3.0 {
                    color::RED
                } else {
                    color::GREEN
                };
                format!(" {row:?} = {}{}", console.paint(code, &sum.to_string()), " ".repeat(2usize.saturating_sub(sum.to_string().len())))
            })
            .collect();

        let gap = "  ";
        let n = lines.len();
        if n > 2 {
            let fill = if self.cells() == 0 {
                0.0
            } else {
                self.points() as f64 / self.cells() as f64 * 100.0
            };
            lines[n - 3].push_str(&format!("{gap}Points : {}", self.points()));
            lines[n - 2].push_str(&format!("{gap}Cells  : {}", self.cells()));
            lines[n - 1].push_str(&format!("{gap}Filled : {fill:.2} %"));
        }
        if let (Some(label), Some(first)) = (progress, lines.first_mut()) {
            first.push_str(&format!("{gap}Iteration(s) : {label}"));
        }
        lines.join("\n")
    }
}

pub fn parse_dimension(field: &str, value: &str) -> Result<usize, ToolError> {
    let invalid = |reason: String| ToolError::InvalidArgument {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    };
    match value.parse::<usize>() {
        Ok(n) if n > MAX_SIDE => Err(invalid(format!("at most {MAX_SIDE}"))),
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid("expected a positive integer".to_string())),
    }
}

/// Validated grid size.
pub fn checked_grid(x: &str, y: &str) -> Result<Grid, ToolError> {
    let width = parse_dimension("x", x)?;
    let height = parse_dimension("y", y)?;
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_CELLS => Ok(Grid::new(width, height)),
        _ => Err(ToolError::InvalidArgument {
            field: "x * y".to_string(),
            value: format!("{x} * {y}"),
            reason: format!("a grid holds at most {MAX_CELLS} cells"),
        }),
    }
}

pub struct Matrix {
    descriptor: Descriptor<Matrix>,
}

impl Matrix {
    pub fn new() -> Result<Self, ToolInitError> {
        let descriptor = Descriptor::new(
            "Matrix",
            "0.2a",
            Invocation::new("matrix", "mat", "(mat)rix"),
            vec![
                ArgSpec::new("-n", "--new", "<x> <y>", "Create a matrix with custom dimensions"),
                ArgSpec::detailed(
                    "-r",
                    "--random",
                    "<x> <y> <i>",
                    "Create a matrix with placed random point",
                    &["<i> is the number of fill/empty passes (default 3)", "Ctrl-C stops the animation"],
                ),
            ],
            vec![Matrix::create as Handler<Matrix>, Matrix::random as Handler<Matrix>],
        )?
        .with_fallback(Matrix::help);
        Ok(Self { descriptor })
    }

    fn help(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        session.console.line(self.descriptor.render_help());
        Ok(())
    }

    fn create(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 2, "-n <x> <y>")?;
        let grid = checked_grid(&args[0], &args[1])?;
        platform().clear_screen();
        session.console.line(grid.render(&session.console, None));
        Ok(())
    }

    fn random(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 2, "-r <x> <y> <i>")?;
        let mut grid = checked_grid(&args[0], &args[1])?;
        let passes = match args.get(2) {
            Some(v) => parse_dimension("i", v)?,
            None => DEFAULT_PASSES,
        };
        platform().clear_screen();
        session.console.line(grid.render(&session.console, None));
        session.console.prompt("Press enter to start ...")?;

        let finished = {
            let _busy = INTERRUPT.busy();
            animate(session, &mut grid, passes, &INTERRUPT)
        };
        let (code, word) = if finished {
            (color::GREEN, "FINISHED")
        } else {
            (color::YELLOW, "STOPPED")
        };
        let done = session.console.paint(code, word);
        session.console.line(format!(" [ {done} ] "));
        Ok(())
    }
}

/// Alternate fill and empty passes, one frame per changed cell. Returns false
/// when Ctrl-C cut the animation short.
fn animate(session: &mut Session<'_>, grid: &mut Grid, passes: usize, interrupt: &Interrupt) -> bool {
    let mut rng = rand::thread_rng();
    for pass in 0..passes {
        let label = format!("{}/{passes}", pass + 1);
        let filling = pass % 2 == 0;
        loop {
            if interrupt.take() {
                return false;
            }
            let changed = if filling {
                grid.add_random(&mut rng)
            } else {
                grid.remove_random(&mut rng)
            };
            if !changed {
                break;
            }
            platform().clear_screen();
            session.console.line(grid.render(&session.console, Some(&label)));
            std::thread::sleep(FRAME_DELAY);
        }
    }
    true
}

impl ToolImpl for Matrix {
    fn descriptor(&self) -> &Descriptor<Self> {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::tool::Outcome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn plain() -> Console<'static> {
        Console::new(Cursor::new(""), std::io::sink(), false)
    }

    #[test]
    fn random_fill_until_full_then_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = Grid::new(3, 2);
        let mut steps = 0;
        while grid.add_random(&mut rng) {
            steps += 1;
        }
        assert_eq!(steps, 6);
        assert!(grid.is_full());
        while grid.remove_random(&mut rng) {}
        assert!(grid.is_empty());
    }

    #[test]
    fn render_shows_sums_and_totals() {
        let mut grid = Grid::new(3, 3);
        grid.set(0, 0, 1);
        grid.set(1, 0, 1);
        let text = grid.render(&plain(), Some("1/3"));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" [1, 1, 0] = 2"));
        assert!(lines[0].contains("Points : 2"));
        assert!(lines[0].ends_with("Iteration(s) : 1/3"));
        assert!(lines[1].contains("Cells  : 9"));
        assert!(lines[2].contains("Filled : 22.22 %"));
    }

    #[test]
    fn small_grids_have_no_totals() {
        let text = Grid::new(2, 2).render(&plain(), None);
        assert_eq!(text, " [0, 0] = 0 \n [0, 0] = 0 ");
    }

    #[test]
    fn dimensions_must_be_positive() {
        assert_eq!(parse_dimension("x", "4").unwrap(), 4);
        assert!(parse_dimension("x", "0").is_err());
        assert!(parse_dimension("y", "-2").is_err());
        assert!(parse_dimension("y", "wide").is_err());
    }

    #[test]
    fn oversized_grids_are_rejected() {
        assert!(parse_dimension("x", "1024").is_ok());
        assert!(parse_dimension("x", "1025").is_err());
        assert!(parse_dimension("x", "18446744073709551615").is_err());
        assert!(checked_grid("256", "256").is_ok());
        assert!(checked_grid("1024", "65").is_err());

        let mut h = Harness::new();
        let matrix = Matrix::new().unwrap();
        let (outcome, out) = h.dispatch(&matrix, &["mat", "-n", "1000000000000", "1"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("at most 1024"));
        let (outcome, out) = h.dispatch(&matrix, &["mat", "-r", "1000", "1000"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("at most 65536 cells"));
    }

    #[test]
    fn interrupt_stops_the_animation() {
        let mut h = Harness::new();
        let mut out = Vec::new();
        let interrupt = Interrupt::new();
        let _busy = interrupt.busy();
        assert!(!interrupt.on_signal());
        let mut grid = Grid::new(2, 2);
        let finished = {
            let console = Console::new(Cursor::new(""), &mut out, false);
            let mut session = Session::new(console, &mut h.config);
            animate(&mut session, &mut grid, 3, &interrupt)
        };
        assert!(!finished);
        assert!(grid.is_empty());
        assert!(out.is_empty());
        assert!(!interrupt.take());
    }

    #[test]
    fn no_argument_shows_help() {
        let mut h = Harness::new();
        let matrix = Matrix::new().unwrap();
        let (outcome, out) = h.dispatch(&matrix, &["mat"], "");
        assert_eq!(outcome, Outcome::Handled);
        assert!(out.contains(" Launching: matrix <arg>"));
    }

    #[test]
    fn invalid_dimension_is_reported() {
        let mut h = Harness::new();
        let matrix = Matrix::new().unwrap();
        let (outcome, out) = h.dispatch(&matrix, &["mat", "-n", "3", "tall"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("invalid value \"tall\" for y"));
    }

    #[test]
    fn random_animation_finishes() {
        let mut h = Harness::new();
        let matrix = Matrix::new().unwrap();
        let (outcome, out) = h.dispatch(&matrix, &["mat", "-r", "2", "1", "2"], "\n");
        assert_eq!(outcome, Outcome::Handled, "{out}");
        assert!(out.contains("Iteration(s) : 2/2"));
        assert!(out.trim_end().ends_with("[ FINISHED ]"));
    }
}
