//! Colour palette for the status view.

use ratatui::style::{Color, Modifier, Style};

use plenum_proto::protocol::PlayState;

pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_PAUSED: Color = Color::Rgb(255, 184, 80);
pub const C_STOPPED: Color = Color::Rgb(255, 95, 95);

pub fn style_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_title() -> Style {
    Style::default().fg(C_MUTED)
}

/// Artist, album and title lines get progressively quieter.
pub fn style_track_line(row: usize) -> Style {
    match row {
        0 => Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        1 => Style::default().fg(C_PRIMARY),
        _ => Style::default().fg(C_SECONDARY),
    }
}

pub fn style_time() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn play_state_color(state: PlayState) -> Color {
    match state {
        PlayState::Play => C_PLAYING,
        PlayState::Pause => C_PAUSED,
        PlayState::Stop => C_STOPPED,
    }
}
