//! DisplaySurface: the fixed-size terminal region one session draws into.
//!
//! Geometry is captured once when the surface is opened; the viewport does
//! not follow later terminal resizes. A surface opened on the real terminal
//! switches to raw mode and the alternate screen, and switches back in
//! `Drop`, so the terminal is restored on every way out of a session
//! (fatal error, early return, unwinding panic).

use std::io::{self, Stdout};

use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::crossterm::{
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use tracing::{debug, warn};

pub struct DisplaySurface<B: Backend> {
    terminal: Terminal<B>,
    area: Rect,
    frames: u64,
    restore_terminal: bool,
}

impl DisplaySurface<CrosstermBackend<Stdout>> {
    /// Take over the controlling terminal.
    pub fn open() -> io::Result<Self> {
        enable_raw_mode()?;
        match Self::enter() {
            Ok(surface) => Ok(surface),
            Err(e) => {
                restore_terminal();
                Err(e)
            }
        }
    }

    fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let (columns, rows) = terminal::size()?;
        let area = Rect::new(0, 0, columns, rows);
        debug!("surface: opened {}x{}", columns, rows);

        let mut surface = Self::with_area(CrosstermBackend::new(stdout), area)?;
        surface.restore_terminal = true;
        Ok(surface)
    }
}

impl<B: Backend> DisplaySurface<B> {
    /// Wrap an arbitrary backend without touching the real terminal.
    pub fn headless(backend: B) -> io::Result<Self> {
        let size = backend.size().map_err(backend_error)?;
        Self::with_area(backend, Rect::new(0, 0, size.width, size.height))
    }

    fn with_area(backend: B, area: Rect) -> io::Result<Self> {
        let mut terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Fixed(area),
            },
        )
        .map_err(backend_error)?;
        terminal.hide_cursor().map_err(backend_error)?;
        terminal.clear().map_err(backend_error)?;
        Ok(Self {
            terminal,
            area,
            frames: 0,
            restore_terminal: false,
        })
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Draw a frame. Only cells that differ from the previous frame are
    /// written to the backend.
    pub fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render).map_err(backend_error)?;
        self.frames += 1;
        Ok(())
    }

    /// Number of frames drawn since the surface was opened.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B: Backend> Drop for DisplaySurface<B> {
    fn drop(&mut self) {
        if self.restore_terminal {
            if let Err(e) = self.terminal.show_cursor() {
                warn!("surface: could not show cursor: {}", e);
            }
            restore_terminal();
            debug!("surface: terminal restored");
        }
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!("surface: could not leave raw mode: {}", e);
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        warn!("surface: could not leave alternate screen: {}", e);
    }
}

fn backend_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::other(e.to_string())
}
