//! Renderer: the bordered "now playing" view.
//!
//! Layout inside the border:
//!
//! ```text
//!   ┌ plenum ───────────── PLAY ┐
//!   │artist                     │
//!   │album                      │
//!   │title                      │
//!   │2:05 / 3:20                │  ← time row
//!   └───────────────────────────┘
//! ```
//!
//! Missing fields are skipped rather than left blank, so the time row sits
//! directly under the last track line (clamped to the last inner row).

use std::io;

use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;
use tracing::{debug, trace};

use plenum_proto::protocol::{PlayState, PlaybackStatus, TrackInfo};

use crate::differ::Changes;
use crate::surface::DisplaySurface;
use crate::theme::{play_state_color, style_border, style_time, style_title, style_track_line};

const TITLE: &str = " plenum ";

/// What is currently on the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusView {
    pub lines: Vec<String>,
    pub time_row: u16,
    pub time_text: Option<String>,
    pub state: Option<PlayState>,
}

pub struct Renderer<B: Backend> {
    surface: DisplaySurface<B>,
    view: StatusView,
}

impl<B: Backend> Renderer<B> {
    /// Take ownership of the surface and draw the empty frame.
    pub fn new(surface: DisplaySurface<B>) -> io::Result<Self> {
        let mut renderer = Self {
            surface,
            view: StatusView::default(),
        };
        renderer.redraw()?;
        Ok(renderer)
    }

    #[cfg(test)]
    pub fn view(&self) -> &StatusView {
        &self.view
    }

    /// Apply `changes` to the view and draw. Does nothing when empty.
    pub fn render(&mut self, changes: &Changes) -> io::Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        if let Some(track) = &changes.track {
            self.show_track(track);
        }
        if let Some(status) = &changes.status {
            self.show_status(status);
        }
        self.redraw()
    }

    fn show_track(&mut self, track: &TrackInfo) {
        let inner = inner_area(self.surface.area());
        self.view.lines = track.lines().map(str::to_string).collect();
        // Old lines go; the last known time follows the new row.
        self.view.time_row = time_row(self.view.lines.len(), inner.height);
        debug!(
            "render: track changed ({} lines, time row {})",
            self.view.lines.len(),
            self.view.time_row
        );
    }

    fn show_status(&mut self, status: &PlaybackStatus) {
        self.view.state = status.state;
        self.view.time_text = status
            .elapsed_total()
            .map(|(elapsed, total)| format_elapsed_total(elapsed, total));
    }

    fn redraw(&mut self) -> io::Result<()> {
        let view = &self.view;
        self.surface.draw(|frame| draw_view(frame, view))?;
        trace!("render: frame {} drawn", self.surface.frames());
        Ok(())
    }

    #[cfg(test)]
    pub fn surface(&self) -> &DisplaySurface<B> {
        &self.surface
    }
}

fn draw_view(frame: &mut Frame, view: &StatusView) {
    let area = frame.area();
    let mut block = Block::bordered()
        .border_style(style_border())
        .title(Line::from(Span::styled(TITLE, style_title())));
    if let Some(state) = view.state {
        block = block.title_top(
            Line::from(Span::styled(
                format!(" {} ", state.label()),
                Style::default().fg(play_state_color(state)),
            ))
            .right_aligned(),
        );
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    for (row, line) in view.lines.iter().enumerate() {
        let Some(rect) = row_rect(inner, row as u16) else {
            break;
        };
        frame.render_widget(
            Paragraph::new(Span::styled(line.as_str(), style_track_line(row))),
            rect,
        );
    }

    if let Some(time) = view.time_text.as_deref() {
        if let Some(rect) = row_rect(inner, view.time_row) {
            frame.render_widget(Clear, rect);
            frame.render_widget(Paragraph::new(Span::styled(time, style_time())), rect);
        }
    }
}

fn inner_area(area: Rect) -> Rect {
    Block::bordered().inner(area)
}

fn row_rect(inner: Rect, row: u16) -> Option<Rect> {
    (row < inner.height).then(|| Rect::new(inner.x, inner.y + row, inner.width, 1))
}

/// Row right after the last track line, clamped to the last usable row.
pub fn time_row(lines_written: usize, inner_height: u16) -> u16 {
    let last_row = inner_height.saturating_sub(1);
    u16::try_from(lines_written).unwrap_or(u16::MAX).min(last_row)
}

/// `M:SS` under an hour, `H:MM:SS` from there on.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

pub fn format_elapsed_total(elapsed: u64, total: u64) -> String {
    format!("{} / {}", format_duration(elapsed), format_duration(total))
}
