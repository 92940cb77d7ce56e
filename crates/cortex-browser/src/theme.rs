use crate::view::Status;
use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const FOCUSED_BORDER: Style = Style::new().fg(Color::Cyan);
pub const MUTED_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const LABEL_STYLE: Style = Style::new().fg(Color::Rgb(131, 165, 152));
pub const VALUE_STYLE: Style = Style::new()
    .fg(Color::Rgb(250, 189, 47))
    .add_modifier(Modifier::BOLD);

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub mod icons {
    pub const MALE: &str = "♂";
    pub const FEMALE: &str = "♀";
    pub const LOADING: &str = "~";
    pub const OK: &str = "x";
    pub const ERROR: &str = "!";
    pub const IMAGE: &str = "#";
}

pub fn status_color(status: &Status) -> Color {
    match status {
        Status::Idle => Color::Rgb(146, 131, 116),
        Status::Loading => Color::Rgb(131, 165, 152),
        Status::Loaded { .. } => Color::Rgb(184, 187, 38),
        Status::Error { .. } => Color::Rgb(254, 128, 25),
    }
}

pub fn status_icon(status: &Status) -> &'static str {
    match status {
        Status::Idle => " ",
        Status::Loading => icons::LOADING,
        Status::Loaded { .. } => icons::OK,
        Status::Error { .. } => icons::ERROR,
    }
}
