use checkmark_core::tasks::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{App, Mode};

struct Palette {
    bg: Color,
    fg: Color,
    accent: Color,
    muted: Color,
    selection: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            bg: Color::White,
            fg: Color::Black,
            accent: Color::Rgb(0x57, 0x5f, 0xcf),
            muted: Color::Gray,
            selection: Color::Rgb(0xe4, 0xe4, 0xf2),
        },
        Theme::Dark => Palette {
            bg: Color::Rgb(0x36, 0x35, 0x35),
            fg: Color::White,
            accent: Color::Rgb(0xa0, 0xa8, 0xff),
            muted: Color::DarkGray,
            selection: Color::Rgb(0x4a, 0x49, 0x49),
        },
    }
}

pub(super) fn draw(frame: &mut Frame, app: &App) {
    let state = app.session.state();
    let p = palette(state.theme);

    frame.render_widget(
        Block::default().style(Style::default().bg(p.bg).fg(p.fg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, &p, chunks[0]);
    draw_input(frame, app, &p, chunks[1]);
    draw_tasks(frame, app, &p, chunks[2]);
    draw_footer(frame, app, &p, chunks[3]);
}

fn framed<'a>(title: &'a str, focused: bool, p: &Palette) -> Block<'a> {
    let border = if focused { p.accent } else { p.muted };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn draw_header(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let theme = app.session.state().theme;
    let icon = match theme {
        Theme::Light => "☾",
        Theme::Dark => "☀",
    };
    let mut spans = vec![
        Span::styled(
            "TODO",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{icon} {} (t)", theme.label()),
            Style::default().fg(p.muted),
        ),
    ];
    if app.in_flight > 0 {
        spans.push(Span::styled("   syncing…", Style::default().fg(p.muted)));
    }
    let header = Paragraph::new(Line::from(spans)).block(framed("checkmark", false, p));
    frame.render_widget(header, area);
}

fn draw_input(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let input = &app.session.state().input;
    let focused = app.mode == Mode::Input;
    let line = if input.is_empty() && !focused {
        Line::from(Span::styled(
            "Create a new task !",
            Style::default().fg(p.muted),
        ))
    } else {
        Line::from(input.as_str())
    };
    frame.render_widget(
        Paragraph::new(line).block(framed("New task (a)", focused, p)),
        area,
    );
    if focused {
        let width = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(width)
            .min(area.right().saturating_sub(2));
        frame.set_cursor_position((x, area.y + 1));
    }
}

fn draw_tasks(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let state = app.session.state();
    let title = format!("Tasks ({})", state.tasks.len());
    let block = framed(&title, app.mode != Mode::Input, p);

    if state.tasks.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "There are not any tasks ...",
            Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .tasks
        .iter()
        .map(|t| {
            let mark = if t.is_done {
                Span::styled("✔ ", Style::default().fg(p.accent))
            } else {
                Span::styled("○ ", Style::default().fg(p.muted))
            };
            let label = if state.is_editing(&t.id) {
                Span::styled(
                    format!("{}▏", state.editing_text),
                    Style::default().add_modifier(Modifier::UNDERLINED),
                )
            } else if t.is_done {
                Span::styled(
                    t.task.as_str(),
                    Style::default()
                        .fg(p.muted)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                Span::raw(t.task.as_str())
            };
            ListItem::new(Line::from(vec![mark, label]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(p.selection).add_modifier(Modifier::BOLD));
    let mut list_state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_footer(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let line = match &app.status {
        Some(status) => {
            let color = if status.is_error { Color::Red } else { p.accent };
            Line::from(Span::styled(status.text.as_str(), Style::default().fg(color)))
        }
        None => help_line(app, p),
    };
    frame.render_widget(
        Paragraph::new(line).block(framed("Controls", false, p)),
        area,
    );
}

fn help_line(app: &App, p: &Palette) -> Line<'static> {
    let keys: Vec<(&str, &str)> = match app.mode {
        Mode::Browse => {
            let mut keys = vec![
                ("a", "add"),
                ("space", "toggle"),
                ("e", "edit"),
                ("d", "delete"),
            ];
            if !app.session.state().tasks.is_empty() {
                keys.push(("C", "clear all"));
            }
            keys.extend([("r", "reload"), ("q", "quit")]);
            keys
        }
        Mode::Input => vec![("enter", "add"), ("esc", "back")],
        Mode::Edit => vec![("enter", "save"), ("esc", "cancel")],
    };

    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (key, what) in keys {
        spans.push(Span::styled(key.to_string(), Style::default().fg(p.accent)));
        spans.push(Span::raw(format!(" {what}  ")));
    }
    Line::from(spans)
}
