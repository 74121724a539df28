use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use crate::app::{App, BackendStatus, Phase};

const PLACEHOLDER: &str = "Share your idea and watch it transform into an amazing scenario...";

/// Word-wraps text to `width` columns. Words longer than a line are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        lines.push(chunk.iter().collect());
                    } else {
                        current = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_len = word_len;
            }
        }

        lines.push(current);
    }

    lines
}

/// Splits text into rows of exactly `width` chars (except the last of each
/// line), so the editor cursor maps onto screen cells one to one.
fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for raw_line in text.split('\n') {
        let chars: Vec<char> = raw_line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
        // A full last row pushes the cursor onto a fresh one
        if chars.len() % width == 0 {
            rows.push(String::new());
        }
    }

    rows
}

/// Row and column of the char at `cursor` in the output of [`hard_wrap`].
fn cursor_position(text: &str, cursor: usize, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let mut row = 0usize;
    let mut remaining = cursor;

    for raw_line in text.split('\n') {
        let len = raw_line.chars().count();
        if remaining <= len {
            return (row + remaining / width, remaining % width);
        }
        row += len / width + 1;
        remaining -= len + 1;
    }

    (row, 0)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.generated {
        render_result_view(app, frame, body_area);
    } else {
        render_input_view(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status_text, status_color) = match app.backend_status {
        BackendStatus::Unknown => ("", Color::DarkGray),
        BackendStatus::Online => (" ● backend online ", Color::Green),
        BackendStatus::Offline => (" ● backend offline ", Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" ✨ ScenarioAI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let subtitle = Line::from(Span::styled(
        " Transform your ideas into compelling scenarios",
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ));

    let header = Paragraph::new(vec![title, subtitle]).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_input_view(app: &App, frame: &mut Frame, area: Rect) {
    let [input_area, button_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(area);

    let border_color = if app.loading { Color::DarkGray } else { Color::Yellow };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" 💡 Your idea ");

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let inner_height = input_area.height.saturating_sub(2) as usize;

    if app.idea.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
        .block(input_block);
        frame.render_widget(placeholder, input_area);
    } else {
        let rows = hard_wrap(&app.idea, inner_width);
        let (cursor_row, _) = cursor_position(&app.idea, app.idea_cursor, inner_width);

        // Keep the cursor row visible
        let offset = cursor_row.saturating_sub(inner_height.saturating_sub(1));
        let text_style = if app.loading {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let visible: Vec<Line> = rows
            .into_iter()
            .skip(offset)
            .take(inner_height)
            .map(Line::from)
            .collect();

        let input = Paragraph::new(Text::from(visible))
            .style(text_style)
            .block(input_block);
        frame.render_widget(input, input_area);
    }

    if app.editable() && inner_width > 0 && inner_height > 0 {
        let (row, col) = cursor_position(&app.idea, app.idea_cursor, inner_width);
        let row = row.min(inner_height - 1);
        frame.set_cursor_position((
            input_area.x + 1 + col as u16,
            input_area.y + 1 + row as u16,
        ));
    }

    render_generate_button(app, frame, button_area);
}

fn render_generate_button(app: &App, frame: &mut Frame, area: Rect) {
    let (label, style) = if app.loading {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        (
            format!("⏳ Generating{:<3}", dots),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )
    } else if app.can_generate() {
        (
            "🚀 Generate Scenario (Enter)".to_string(),
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        )
    } else {
        (
            "🚀 Generate Scenario".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", label), style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(button, area);
}

/// Bordered panel height for `lines` of content, capped at `max` but never
/// below one content row.
fn panel_height(lines: usize, max: u16) -> u16 {
    let content = lines.min(usize::from(u16::MAX - 2)) as u16;
    (content + 2).min(max).max(3)
}

fn render_result_view(app: &mut App, frame: &mut Frame, area: Rect) {
    let idea_width = area.width.saturating_sub(2) as usize;
    let idea_lines = wrap_text(&app.idea, idea_width);
    // Idea panel takes at most a third of the screen
    let idea_height = panel_height(idea_lines.len(), area.height / 3);

    let [idea_area, scenario_area] = Layout::vertical([
        Constraint::Length(idea_height),
        Constraint::Min(0),
    ])
    .areas(area);

    let idea = Paragraph::new(Text::from(
        idea_lines.into_iter().map(Line::from).collect::<Vec<_>>(),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" 💡 Your Idea "),
    );
    frame.render_widget(idea, idea_area);

    let [text_area, scrollbar_area] = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(scenario_area);

    let scenario_width = text_area.width.saturating_sub(2) as usize;
    let scenario_lines = wrap_text(&app.scenario, scenario_width);

    // Store dimensions for scroll bounds (inner size minus borders)
    app.scenario_height = text_area.height.saturating_sub(2);
    app.total_scenario_lines = scenario_lines.len().min(u16::MAX as usize) as u16;

    let scenario = Paragraph::new(Text::from(
        scenario_lines.into_iter().map(Line::from).collect::<Vec<_>>(),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 🎬 Generated Scenario "),
    )
    .scroll((app.scenario_scroll, 0));
    frame.render_widget(scenario, text_area);

    if app.total_scenario_lines > app.scenario_height {
        let mut state = ScrollbarState::default()
            .content_length(app.total_scenario_lines.saturating_sub(app.scenario_height) as usize)
            .position(app.scenario_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut state,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let phase = app.phase();
    let (mode_text, mode_style) = match phase {
        Phase::Idle | Phase::Editing => (" IDEA ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        Phase::Loading => (" GENERATING ", Style::default().bg(Color::Magenta).fg(Color::White)),
        Phase::Result => (" SCENARIO ", Style::default().bg(Color::Blue).fg(Color::White)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match phase {
        Phase::Idle => vec![
            Span::styled(" type ", label_style),
            Span::styled(" Alt+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Phase::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" generate ", label_style),
            Span::styled(" Alt+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Phase::Loading => vec![
            Span::styled(" waiting for the backend ", label_style),
            Span::styled(" Ctrl+C ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Phase::Result => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" n ", key_style),
            Span::styled(" new scenario ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScenarioClient;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(ScenarioClient::new("http://127.0.0.1:9/generate").unwrap())
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_wrap_text_words() {
        assert_eq!(wrap_text("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        assert_eq!(wrap_text("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrap_text("abcdefghi", 4), vec!["abcd", "efgh", "i"]);
    }

    #[test]
    fn test_hard_wrap_and_cursor_agree() {
        let text = "abcdef\nxy";
        assert_eq!(hard_wrap(text, 3), vec!["abc", "def", "", "xy"]);

        assert_eq!(cursor_position(text, 0, 3), (0, 0));
        assert_eq!(cursor_position(text, 4, 3), (1, 1));
        // End of a full row sits at the start of the next
        assert_eq!(cursor_position(text, 6, 3), (2, 0));
        assert_eq!(cursor_position(text, 7, 3), (3, 0));
        assert_eq!(cursor_position(text, 9, 3), (3, 2));
    }

    #[test]
    fn test_renders_placeholder_when_idle() {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        let mut app = app();
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("ScenarioAI"));
        assert!(screen.contains("Share your idea"));
        assert!(screen.contains("IDEA"));
    }

    #[test]
    fn test_renders_loading_indicator() {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        let mut app = app();
        app.idea = "a robot chef".to_string();
        app.idea_cursor = 12;
        app.loading = true;
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("a robot chef"));
        assert!(screen.contains("Generating"));
    }

    #[test]
    fn test_renders_result_and_records_scroll_bounds() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut app = app();
        app.idea = "a robot chef".to_string();
        app.scenario = (1..=40).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        app.generated = true;
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("Generated Scenario"));
        assert!(screen.contains("line 1"));
        assert!(screen.contains("new scenario"));
        assert_eq!(app.total_scenario_lines, 40);
        assert!(app.scenario_height > 0 && app.scenario_height < 40);
    }

    #[test]
    fn test_panel_height_bounds() {
        assert_eq!(panel_height(0, 10), 3);
        assert_eq!(panel_height(4, 10), 6);
        assert_eq!(panel_height(40, 10), 10);
        assert_eq!(panel_height(65_534, 100), 100);
        assert_eq!(panel_height(65_535, u16::MAX), u16::MAX);
        assert_eq!(panel_height(70_000, 20), 20);
    }

    #[test]
    fn test_renders_result_with_huge_idea() {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app();
        app.idea = "x\n".repeat(70_000);
        app.scenario = "ok".to_string();
        app.generated = true;
        terminal.draw(|f| render(&mut app, f)).unwrap();

        assert!(screen_text(&terminal).contains("Generated Scenario"));
    }
}
