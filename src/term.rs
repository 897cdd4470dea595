use std::io::{stdout, Stdout, Write};

use anyhow::{bail, Context, Result};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::frontend::{Frontend, Scene};
use crate::grid::{Grid, Vector2};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

// Each board cell is two columns wide so it looks roughly square.
const CELL_WIDTH: TermInt = 2;
const SNAKE_HEAD: [char; 2] = ['█', '█'];
const SNAKE_BODY: [char; 2] = ['▓', '▓'];
const FOOD: [char; 2] = ['[', ']'];
const EMPTY: [char; 2] = [' ', ' '];

/// Foreground/background pair the board is painted with.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub foreground: Color,
    pub background: Color,
}

impl Theme {
    /// Dark pixels on a pale green LCD.
    pub fn lcd() -> Self {
        Theme {
            foreground: Color::Rgb { r: 0x43, g: 0x52, b: 0x3d },
            background: Color::Rgb { r: 0xc7, g: 0xf0, b: 0xd8 },
        }
    }

    pub fn mono() -> Self {
        Theme { foreground: Color::Reset, background: Color::Reset }
    }
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    board: Coords,
    stdout: Stdout,
    theme: Theme,
    screen: Vec<char>,
    current_msg: Option<Message>,
    score: u32,
    high_score: u32,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    /// Fails if the terminal can't fit `grid` plus its border and status line.
    pub fn new(grid: Grid, theme: Theme) -> Result<Self> {
        let (width, height) = terminal::size().context("reading terminal size")?;
        let board = (grid.width as TermInt * CELL_WIDTH, grid.height as TermInt);

        let needed = (board.0 + 2, board.1 + 3);
        if width < needed.0 || height < needed.1 {
            bail!(
                "terminal is {}x{}, a {}x{} board needs at least {}x{}",
                width,
                height,
                grid.width,
                grid.height,
                needed.0,
                needed.1
            );
        }

        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager {
            width,
            height,
            board,
            stdout: stdout(),
            theme,
            screen,
            current_msg: None,
            score: 0,
            high_score: 0,
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("entering alternate screen")?;
        terminal::enable_raw_mode().context("enabling raw mode")?;
        let theme = self.theme;
        execute!(
            self.stdout,
            cursor::Hide,
            cursor::DisableBlinking,
            style::SetForegroundColor(theme.foreground),
            style::SetBackgroundColor(theme.background)
        )
        .context("configuring cursor and colours")?;

        self.clear()?;
        self.draw_borders()?;
        self.draw_status()?;
        self.flush()
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("disabling raw mode")?;
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
        .context("leaving alternate screen")?;
        Ok(())
    }

    pub fn draw_borders(&mut self) -> Result<()> {
        let end_x = self.board.0 + 1;
        let end_y = self.board.1 + 1;

        for x in 0..=end_x {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let longest = lines.iter().map(|x| x.chars().count()).max().unwrap_or(0);
        let msg_width = (longest as TermInt + 2).min(self.width);
        let msg_height = (lines.len() as TermInt + 2).min(self.height);

        // Centre on the board, but keep the box on screen for narrow boards
        let center = (self.board.0 / 2 + 1, self.board.1 / 2 + 1);
        let top_left = (
            center.0.saturating_sub(msg_width / 2).min(self.width - msg_width),
            center.1.saturating_sub(msg_height / 2).min(self.height - msg_height),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().take(msg_width as usize).enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                let ch = self.screen[self.width as usize * y as usize + x as usize];
                self.print_at_no_save((x, y), ch)?;
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        self.print_at_no_save(pos, ch)?;
        self.screen[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("clearing screen")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("flushing terminal")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_cell(&mut self, cell: Vector2, glyph: [char; 2]) -> Result<()> {
        let x = 1 + cell.x as TermInt * CELL_WIDTH;
        let y = 1 + cell.y as TermInt;
        self.print_at((x, y), glyph[0])?;
        self.print_at((x + 1, y), glyph[1])
    }

    fn draw_status(&mut self) -> Result<()> {
        let y = self.board.1 + 2;
        let text = format!(
            "{:<width$}",
            format!("Score: {}  High: {}", self.score, self.high_score),
            width = self.board.0 as usize + 2
        );
        for (x, ch) in text.chars().enumerate() {
            self.print_at((x as TermInt, y), ch)?;
        }
        Ok(())
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("drawing to terminal")
    }
}

impl Frontend for TermManager {
    fn render(&mut self, scene: &Scene) -> Result<()> {
        for y in 0..scene.grid.height {
            for x in 0..scene.grid.width {
                self.print_cell(Vector2::new(x, y), EMPTY)?;
            }
        }

        self.print_cell(scene.food.position(), FOOD)?;

        for (i, segment) in scene.snake.body().iter().enumerate() {
            if scene.grid.contains(*segment) {
                self.print_cell(*segment, if i == 0 {SNAKE_HEAD} else {SNAKE_BODY})?;
            }
        }

        self.flush()
    }

    fn set_score(&mut self, score: u32) -> Result<()> {
        self.score = score;
        self.draw_status()?;
        self.flush()
    }

    fn set_high_score(&mut self, high_score: u32) -> Result<()> {
        self.high_score = high_score;
        self.draw_status()?;
        self.flush()
    }

    fn show_overlay(&mut self, title: &str, message: &str, action: &str) -> Result<()> {
        let action = format!("[ {} ]", action);
        self.show_message(&[title, message, "", &action])
    }

    fn hide_overlay(&mut self) -> Result<()> {
        self.hide_message()
    }
}
