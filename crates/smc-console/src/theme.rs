use ratatui::style::{Color, Modifier, Style};
use smc_core::{ConnectionStatus, NoticeLevel};

#[derive(Clone, Copy)]
pub struct ConsoleTheme {
    pub surface: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub ok: Color,
    pub warn: Color,
    pub critical: Color,
    pub info: Color,
}

pub fn console_theme() -> ConsoleTheme {
    ConsoleTheme {
        surface: Color::Rgb(17, 26, 46),
        border: Color::Rgb(71, 85, 105),
        title: Color::Rgb(191, 219, 254),
        text: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(148, 163, 184),
        accent: Color::Rgb(56, 189, 248),
        ok: Color::Rgb(34, 197, 94),
        warn: Color::Rgb(245, 158, 11),
        critical: Color::Rgb(239, 68, 68),
        info: Color::Rgb(59, 130, 246),
    }
}

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);

pub fn status_color(status: ConnectionStatus, theme: ConsoleTheme) -> Color {
    match status {
        ConnectionStatus::Live => theme.ok,
        ConnectionStatus::Connecting => theme.info,
        ConnectionStatus::Retrying => theme.warn,
        ConnectionStatus::Offline => theme.critical,
    }
}

pub fn notice_color(level: NoticeLevel, theme: ConsoleTheme) -> Color {
    match level {
        NoticeLevel::Info => theme.info,
        NoticeLevel::Success => theme.ok,
        NoticeLevel::Error => theme.critical,
    }
}

/// Gauge color steps up as usage approaches the limit.
pub fn usage_color(percent: f64, theme: ConsoleTheme) -> Color {
    if percent >= 90.0 {
        theme.critical
    } else if percent >= 70.0 {
        theme.warn
    } else {
        theme.ok
    }
}

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub mod icons {
    pub const DIRECTORY: &str = "d";
    pub const FILE: &str = "-";
    pub const PARENT: &str = "^";
    pub const MODIFIED: &str = "*";
}
