use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::conversation::{ChatMessage, ChatRole};
use crate::preferences::Preference;

/// Most compose-box lines shown before it scrolls
const MAX_INPUT_LINES: u16 = 5;

/// Split a line into plain and `**bold**` spans. Everything else is literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            }
            // No closing **, treat as literal
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_lines = (app.draft.text().split('\n').count() as u16).clamp(1, MAX_INPUT_LINES);

    let [header_area, chat_area, prefs_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(4),
        Constraint::Length(input_lines + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_preferences(app, frame, prefs_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 🍳 Recipe Advisor ", Style::default().fg(Color::LightRed).bold()),
        Span::styled(
            "Ask for recipes based on ingredients, diet, time... ",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(app.endpoint().to_string(), Style::default().fg(Color::DarkGray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn message_lines(msg: &ChatMessage, lines: &mut Vec<Line<'static>>) {
    match (msg.role, msg.is_source) {
        (ChatRole::User, _) => {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.split('\n') {
                lines.push(Line::from(line.to_string()));
            }
        }
        (ChatRole::Bot, false) => {
            lines.push(Line::from(Span::styled(
                "Chef:",
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.split('\n') {
                lines.push(parse_markdown_line(line));
            }
        }
        (ChatRole::Bot, true) => {
            for line in msg.content.split('\n') {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }
    lines.push(Line::default());
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.conversation.messages() {
        message_lines(msg, &mut lines);
    }

    if app.conversation.is_pending() {
        lines.push(Line::from(Span::styled(
            "Chef:",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let line_count = u16::try_from(chat.line_count(inner_width)).unwrap_or(u16::MAX);
    app.update_chat_lines(line_count);

    let chat = chat.block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_preferences(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Preferences ");

    let mut toggles: Vec<Span> = Vec::new();
    for (i, pref) in Preference::all().into_iter().enumerate() {
        let on = app.preferences.is_set(pref);
        let mark = if on { "[x]" } else { "[ ]" };
        let style = if on {
            Style::default().fg(Color::LightRed).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        toggles.push(Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)));
        toggles.push(Span::styled(format!("{} {}  ", mark, pref.display_name()), style));
    }

    let servings_value = if app.input_mode == InputMode::Servings {
        Span::styled(
            format!("[{}_]", app.servings_input),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )
    } else {
        Span::styled(
            format!("[{}]", app.servings.get()),
            Style::default().fg(Color::White).bold(),
        )
    };
    let servings = Line::from(vec![
        Span::styled("Servings: ", Style::default().fg(Color::Gray).bold()),
        servings_value,
        Span::styled(" people", Style::default().fg(Color::DarkGray)),
    ]);

    let panel = Paragraph::new(vec![Line::from(toggles), servings]).block(block);
    frame.render_widget(panel, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let pending = app.conversation.is_pending();

    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if pending {
        " Waiting for the chef... ".to_string()
    } else if editing {
        format!(
            " Your ingredients or recipe idea (Enter send, {} new line) ",
            app.newline_hint()
        )
    } else {
        " Ask (i to type) ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor line visible when the draft is taller than the box
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) = app.draft.cursor_line_col();
    let first_line = (cursor_line + 1).saturating_sub(inner_height);
    let h_offset = if inner_width == 0 {
        0
    } else {
        (cursor_col + 1).saturating_sub(inner_width)
    };

    let visible: Vec<Line> = app
        .draft
        .text()
        .split('\n')
        .skip(first_line)
        .take(inner_height)
        .map(|line| Line::from(line.chars().skip(h_offset).take(inner_width).collect::<String>()))
        .collect();

    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing && inner_height > 0 && inner_width > 0 {
        frame.set_cursor_position(Position::new(
            area.x + 1 + (cursor_col - h_offset) as u16,
            area.y + 1 + (cursor_line - first_line) as u16,
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" TYPING ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::Servings => (" SERVINGS ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Gray);

    let newline_key = format!(" {} ", app.newline_hint());
    let pairs: Vec<(&str, &str)> = match app.input_mode {
        InputMode::Normal => vec![
            (" i ", " type "),
            (" 1-5 ", " filters "),
            (" +/- ", " servings "),
            (" s ", " set servings "),
            (" j/k ", " scroll "),
            (" q ", " quit "),
        ],
        InputMode::Editing => vec![
            (" Enter ", " send "),
            (newline_key.as_str(), " new line "),
            (" F1-F5 ", " filters "),
            (" Esc ", " stop typing "),
        ],
        InputMode::Servings => vec![(" Enter ", " apply "), (" Esc ", " cancel ")],
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in pairs {
        spans.push(Span::styled(key.to_string(), key_style));
        spans.push(Span::styled(label, label_style));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
