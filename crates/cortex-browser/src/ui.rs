use crate::state::App;
use crate::theme::{self, icons};
use crate::view::{PanelId, Status, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, rows[0]);
    render_panels(f, app, rows[1]);
    render_status(f, app.navigator.view(), rows[2]);

    if app.navigator.view().show_help {
        render_help(f, area);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let selection = app.navigator.selection();
    let mut context = vec![Span::styled("Cortex ", theme::HEADER_STYLE)];
    context.push(Span::styled(app.api_base.clone(), theme::MUTED_STYLE));
    if let Some(uid) = selection.user() {
        context.push(Span::raw("  user "));
        context.push(Span::styled(uid.to_string(), theme::VALUE_STYLE));
    }
    if let Some((uid, sid)) = &app.navigator.view().shown_snapshot {
        context.push(Span::raw("  snapshot "));
        context.push(Span::styled(format!("{uid}/{sid}"), theme::VALUE_STYLE));
    }

    let block = Block::default().borders(Borders::BOTTOM);
    let p = Paragraph::new(vec![
        Line::from(context),
        Line::from(Span::styled(
            "u browse users  enter open  tab focus  esc close  ? help  q quit",
            theme::MUTED_STYLE,
        )),
    ])
    .block(block);
    f.render_widget(p, area);
}

fn render_panels(f: &mut Frame, app: &mut App, area: Rect) {
    let view = app.navigator.view();
    let open: Vec<PanelId> = [PanelId::Users, PanelId::Snapshots, PanelId::Snapshot]
        .into_iter()
        .filter(|panel| view.is_open(*panel))
        .collect();

    if open.is_empty() {
        let hint = Paragraph::new(Line::from(vec![
            Span::raw("Press "),
            Span::styled("u", Style::default().fg(Color::Cyan)),
            Span::raw(" to browse users."),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(hint, area);
        return;
    }

    let constraints: Vec<Constraint> = open
        .iter()
        .map(|panel| match panel {
            PanelId::Snapshot => Constraint::Min(0),
            other => Constraint::Percentage(view.panel_width(*other)),
        })
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (panel, column) in open.into_iter().zip(columns.iter()) {
        match panel {
            PanelId::Snapshot => render_snapshot(f, app, *column),
            list_panel => render_list_panel(f, app, list_panel, *column),
        }
    }
}

fn panel_block(app: &App, panel: PanelId) -> Block<'static> {
    let border_style = if app.focus == panel {
        theme::FOCUSED_BORDER
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", panel.title()))
        .border_style(border_style)
}

fn render_list_panel(f: &mut Frame, app: &mut App, panel: PanelId, area: Rect) {
    let block = panel_block(app, panel);
    let Some(list) = app.navigator.view_mut().list_mut(panel) else {
        return;
    };

    let items: Vec<ListItem> = list
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| ListItem::new(entry.label.clone()).style(theme::zebra_row_style(i)))
        .collect();
    let widget = List::new(items)
        .block(block)
        .highlight_style(theme::SELECTED_STYLE)
        .highlight_symbol("> ");
    f.render_stateful_widget(widget, area, list.state_mut());
}

fn render_snapshot(f: &mut Frame, app: &App, area: Rect) {
    let block = panel_block(app, PanelId::Snapshot);
    let lines = snapshot_lines(app.navigator.view());
    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn snapshot_lines(view: &View) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(card) = &view.user_card {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", card.icon()), theme::VALUE_STYLE),
            Span::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Birthday  ", theme::LABEL_STYLE),
            Span::raw(card.birthday.clone()),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(feelings) = &view.feelings {
        lines.push(Line::from(Span::styled("Feelings", theme::HEADER_STYLE)));
        for (label, value) in feelings.rows() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {label:<12}"), theme::LABEL_STYLE),
                Span::styled(value.to_string(), theme::VALUE_STYLE),
            ]));
        }
        lines.push(Line::from(""));
    }

    if let Some(image) = &view.background {
        let mut spans = vec![
            Span::styled(format!("{} Color image ", icons::IMAGE), theme::HEADER_STYLE),
            Span::raw(image.url.clone()),
        ];
        if let Some((w, h)) = image.dimensions() {
            spans.push(Span::styled(format!("  {w}x{h}"), theme::MUTED_STYLE));
        }
        lines.push(Line::from(spans));
    }

    if lines.is_empty() {
        let note = if view.is_loading() {
            "Loading snapshot..."
        } else {
            "Nothing rendered for this snapshot."
        };
        lines.push(Line::from(Span::styled(note, theme::MUTED_STYLE)));
    }
    lines
}

fn status_text(view: &View) -> String {
    match &view.status {
        Status::Idle => "ready".to_string(),
        Status::Loading => format!("loading ({} in flight)", view.in_flight),
        Status::Loaded { at } => format!("loaded {}", at.format("%H:%M:%S")),
        Status::Error { path, message, at } => {
            format!("{} error on {path}: {message}", at.format("%H:%M:%S"))
        }
    }
}

fn render_status(f: &mut Frame, view: &View, area: Rect) {
    let color = theme::status_color(&view.status);
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", theme::status_icon(&view.status)),
            Style::default().fg(Color::Black).bg(color),
        ),
        Span::styled(format!(" {}", status_text(view)), Style::default().fg(color)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 60, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    let inner_area = block.inner(popup);
    f.render_widget(Clear, popup);
    f.render_widget(block, popup);

    let keys = [
        ("u", "Browse users"),
        ("j / Down", "Next entry"),
        ("k / Up", "Previous entry"),
        ("Enter", "Open selected entry"),
        ("Tab", "Switch focus"),
        ("Esc / h", "Close focused panel"),
        ("?", "Toggle help"),
        ("q", "Quit"),
    ];
    let mut text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    text.extend(keys.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{key:<11}"), Style::default().fg(Color::Cyan)),
            Span::raw(*action),
        ])
    }));

    let p = Paragraph::new(text).wrap(Wrap { trim: true });
    f.render_widget(p, inner_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
