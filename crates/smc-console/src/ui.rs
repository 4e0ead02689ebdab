use crate::app::App;
use crate::theme::{self, icons, ConsoleTheme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame,
};
use smc_core::file_manager::Row as ListingRow;
use smc_core::format::{format_bytes, format_timestamp};
use smc_core::{EditorSession, ModalBody, Tab, TelemetryPanel, Transport};

pub fn render_ui(frame: &mut Frame, app: &App) {
    let theme = theme::console_theme();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());
    frame.render_widget(render_tabs(app, theme), layout[0]);
    match app.view.active() {
        Tab::Monitor => render_monitor(frame, app, theme, layout[1]),
        Tab::Files => match app.files.editor() {
            Some(session) => render_editor(frame, session, theme, layout[1]),
            None => render_listing(frame, app, theme, layout[1]),
        },
    }
    frame.render_widget(render_status_line(app, theme), layout[2]);
    if app.files.modal().is_visible() {
        render_modal(frame, app, theme);
    }
    if app.help_open {
        render_help_overlay(frame, theme);
    }
}

fn render_tabs(app: &App, theme: ConsoleTheme) -> Tabs<'static> {
    let status = app.status();
    let transport = match app.link.transport() {
        Transport::Push => "push",
        Transport::Poll => "poll",
    };
    let title = Line::from(vec![
        Span::styled(
            " smc ",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.backend_label.clone(), Style::default().fg(theme.muted)),
        Span::raw("  "),
        Span::styled(
            format!("{} ({transport}) ", status.label()),
            Style::default().fg(theme::status_color(status, theme)),
        ),
    ]);
    let titles: Vec<Line<'static>> = Tab::ALL
        .iter()
        .map(|tab| Line::from(format!("{} {}", tab.index() + 1, tab.title())))
        .collect();
    Tabs::new(titles)
        .select(app.view.active().index())
        .style(Style::default().fg(theme.muted))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" | ")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(title),
        )
}

fn render_monitor(frame: &mut Frame, app: &App, theme: ConsoleTheme, area: Rect) {
    let Some(snapshot) = app.link.latest() else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("waiting for telemetry ({})", app.status().label()),
                Style::default().fg(theme.muted),
            )))
            .block(panel_block("Monitor", theme)),
            area,
        );
        return;
    };
    let panel = TelemetryPanel::from_snapshot(snapshot);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);
    frame.render_widget(
        usage_gauge("CPU", panel.cpu_percent, panel.cpu_text.clone(), theme),
        layout[0],
    );
    frame.render_widget(
        usage_gauge(
            "Memory",
            panel.memory_percent,
            format!("{} / {}", panel.memory_used, panel.memory_total),
            theme,
        ),
        layout[1],
    );
    frame.render_widget(
        Paragraph::new(Text::from(monitor_lines(app, &panel, theme)))
            .block(panel_block("Details", theme))
            .wrap(Wrap { trim: false }),
        layout[2],
    );
}

fn usage_gauge(title: &'static str, percent: f64, label: String, theme: ConsoleTheme) -> Gauge<'static> {
    Gauge::default()
        .block(panel_block(title, theme))
        .gauge_style(
            Style::default()
                .fg(theme::usage_color(percent, theme))
                .bg(theme.surface),
        )
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label)
}

fn monitor_lines(app: &App, panel: &TelemetryPanel, theme: ConsoleTheme) -> Vec<Line<'static>> {
    let key = |text: &str| Span::styled(format!("{text:<9}"), Style::default().fg(theme.muted));
    let value = |text: String| Span::styled(text, Style::default().fg(theme.text));
    vec![
        Line::from(vec![
            key("CPU"),
            value(panel.cpu_text.clone()),
            Span::raw("   "),
            key("load"),
            value(panel.load_text.clone()),
        ]),
        Line::from(vec![
            key("Memory"),
            value(format!(
                "used {}  free {}  total {}",
                panel.memory_used, panel.memory_free, panel.memory_total
            )),
        ]),
        Line::from(vec![
            key("Disk"),
            value(format!(
                "used {}  free {}  read {}  write {}",
                panel.disk_used, panel.disk_free, panel.disk_read, panel.disk_write
            )),
        ]),
        Line::from(vec![
            key("Network"),
            value(format!("up {}  down {}", panel.net_up, panel.net_down)),
        ]),
        Line::from(vec![
            key("Sampled"),
            value(panel.sampled_at.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "reconnects {}  dropped frames {}",
                app.link.reconnects(),
                app.link.dropped_frames()
            ),
            Style::default().fg(theme.muted),
        )),
    ]
}

fn render_listing(frame: &mut Frame, app: &App, theme: ConsoleTheme, area: Rect) {
    let files = &app.files;
    let mut title = format!("Files {}", files.current_path());
    if files.is_loading() {
        title.push_str("  loading...");
    }
    let block = panel_block_owned(title, theme);

    if let Some(err) = files.list_error() {
        if files.listing().is_none() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("list failed: {err}"),
                    Style::default().fg(theme.critical),
                ))
                .block(block),
                area,
            );
            return;
        }
    }

    let rows: Vec<Row> = files
        .rows()
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let cells = match row {
                ListingRow::Parent => vec![
                    Cell::from(format!("{} ..", icons::PARENT)),
                    Cell::from(""),
                    Cell::from(""),
                    Cell::from(""),
                ],
                ListingRow::Entry(entry) => {
                    let (icon, size) = if entry.is_directory {
                        (icons::DIRECTORY, "-".to_string())
                    } else {
                        (icons::FILE, format_bytes(entry.size))
                    };
                    let name_style = if entry.is_directory {
                        Style::default().fg(theme.accent)
                    } else {
                        Style::default().fg(theme.text)
                    };
                    vec![
                        Cell::from(Span::styled(format!("{icon} {}", entry.name), name_style)),
                        Cell::from(size),
                        Cell::from(format_timestamp(entry.modified_time)),
                        Cell::from(entry.permissions.clone()),
                    ]
                }
            };
            Row::new(cells).style(theme::zebra_row_style(index))
        })
        .collect();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(u16::from(files.list_error().is_some()))])
        .split(area);

    let widths = [
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(19),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Name", "Size", "Modified", "Perms"]).style(theme::HEADER_STYLE))
        .block(block)
        .highlight_style(theme::SELECTED_STYLE);
    let mut state = TableState::default().with_selected(Some(files.selected()));
    frame.render_stateful_widget(table, layout[0], &mut state);

    if let Some(err) = files.list_error() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("list failed: {err}"),
                Style::default().fg(theme.critical),
            )),
            layout[1],
        );
    }
}

fn render_editor(frame: &mut Frame, session: &EditorSession, theme: ConsoleTheme, area: Rect) {
    let marker = if session.buffer.is_modified() {
        icons::MODIFIED
    } else {
        ""
    };
    let block = panel_block_owned(format!("Edit {}{marker}  ({})", session.file_name, session.path), theme);
    let inner = block.inner(area);
    let (row, col) = session.buffer.cursor();
    let height = usize::from(inner.height.max(1));
    let top = row.saturating_sub(height - 1);
    let lines: Vec<Line> = session
        .buffer
        .lines()
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(theme.text))
            .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0))
            .block(block),
        area,
    );
    let x = inner
        .x
        .saturating_add(u16::try_from(col).unwrap_or(u16::MAX))
        .min(inner.right().saturating_sub(1));
    let y = inner
        .y
        .saturating_add(u16::try_from(row - top).unwrap_or(u16::MAX))
        .min(inner.bottom().saturating_sub(1));
    frame.set_cursor(x, y);
}

fn render_status_line(app: &App, theme: ConsoleTheme) -> Paragraph<'static> {
    if let Some(notice) = app.files.notice() {
        return Paragraph::new(Span::styled(
            notice.text.clone(),
            Style::default().fg(theme::notice_color(notice.level, theme)),
        ));
    }
    let hint = match (app.view.active(), app.files.editor().is_some()) {
        (Tab::Files, true) => "Ctrl+S save  Esc close editor",
        (Tab::Files, false) => {
            "Enter open  Backspace up  n file  d dir  m rename  x delete  u upload  r refresh  ? help"
        }
        (Tab::Monitor, _) => "1/2 switch tab  ? help  q quit",
    };
    Paragraph::new(Span::styled(hint, Style::default().fg(theme.muted)))
}

fn render_modal(frame: &mut Frame, app: &App, theme: ConsoleTheme) {
    let Some(request) = app.files.modal().current() else {
        return;
    };
    let area = centered_rect(60, 30, frame.size());
    let mut lines = Vec::new();
    match &request.body {
        ModalBody::Prompt { label, input } => {
            lines.push(Line::from(Span::styled(
                label.clone(),
                Style::default().fg(theme.muted),
            )));
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(theme.accent)),
                Span::styled(input.clone(), Style::default().fg(theme.text)),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter confirm  Esc cancel  Ctrl+W close",
                Style::default().fg(theme.muted),
            )));
        }
        ModalBody::Question(question) => {
            lines.push(Line::from(Span::styled(
                question.clone(),
                Style::default().fg(theme.text),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "y/Enter confirm  n/Esc cancel  Ctrl+W close",
                Style::default().fg(theme.muted),
            )));
        }
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.surface))
        .title(Span::styled(
            request.title.clone(),
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
    if let ModalBody::Prompt { input, .. } = &request.body {
        let offset = u16::try_from(input.chars().count() + 2).unwrap_or(u16::MAX);
        let x = inner
            .x
            .saturating_add(offset)
            .min(inner.right().saturating_sub(1));
        frame.set_cursor(x, inner.y.saturating_add(1));
    }
}

fn render_help_overlay(frame: &mut Frame, theme: ConsoleTheme) {
    let area = centered_rect(70, 70, frame.size());
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let lines = vec![
        section("Navigation"),
        Line::from("  1/2      monitor / files"),
        Line::from("  Tab      cycle tab"),
        Line::from(""),
        section("Files"),
        Line::from("  j/k      move selection"),
        Line::from("  Enter    open directory or edit file"),
        Line::from("  Bksp/h   parent directory"),
        Line::from("  r        refresh listing"),
        Line::from("  n / d    new file / new directory"),
        Line::from("  m        rename selected"),
        Line::from("  x        delete selected"),
        Line::from("  u        upload local file"),
        Line::from(""),
        section("Editor"),
        Line::from("  Ctrl+S   save"),
        Line::from("  Esc      close (unsaved edits are dropped)"),
        Line::from(""),
        section("Session"),
        Line::from("  ? or F1  toggle this help"),
        Line::from("  q        quit (Ctrl+C anywhere)"),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(theme.text).bg(theme.surface))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border))
                    .title(Span::styled(
                        "Help",
                        Style::default()
                            .fg(theme.title)
                            .add_modifier(Modifier::BOLD),
                    )),
            )
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn panel_block(title: &'static str, theme: ConsoleTheme) -> Block<'static> {
    panel_block_owned(title.to_string(), theme)
}

fn panel_block_owned(title: String, theme: ConsoleTheme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppEvent;
    use ratatui::{backend::TestBackend, Terminal};
    use smc_core::{LinkEvent, LinkTiming};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| render_ui(frame, app))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn monitor_shows_formatted_snapshot() {
        let mut app = App::new(LinkTiming::default(), "http://h/".to_string());
        app.apply_event(AppEvent::Link(LinkEvent::PushOpened));
        app.apply_event(AppEvent::Link(LinkEvent::Frame(
            r#"{"cpuUsage":0.25,"memoryUsedBytes":1048576,"memoryTotalBytes":4194304,"systemLoadAverage":[1.5]}"#
                .to_string(),
        )));
        let screen = draw(&app);
        assert!(screen.contains("live (push)"));
        assert!(screen.contains("25.0%"));
        assert!(screen.contains("1.0 MB / 4.0 MB"));
        assert!(screen.contains("1.50"));
    }

    #[test]
    fn monitor_waits_before_first_snapshot() {
        let app = App::new(LinkTiming::default(), "http://h/".to_string());
        assert!(draw(&app).contains("waiting for telemetry (connecting)"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 50, area);
        assert!(rect.x >= area.x && rect.right() <= area.right());
        assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
        assert_eq!(rect.width, 60);
    }
}
