use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::ui::chat_loop::ChatScreen;
use crate::ui::picker::ModelPicker;
use crate::ui::theme::Theme;
use crate::ui::transcript::{wrap_text, TranscriptEntry};

const MAX_INPUT_LINES: u16 = 6;
const INDICATOR_FRAMES: [&str; 3] = ["○", "◐", "●"];

pub fn ui(f: &mut Frame, screen: &mut ChatScreen) {
    let input_lines = (screen.textarea.lines().len() as u16).clamp(1, MAX_INPUT_LINES);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(input_lines + 2), // +2 for borders
            Constraint::Length(1),
        ])
        .split(f.area());

    render_transcript(f, screen, chunks[0]);
    render_input(f, screen, chunks[1]);
    render_status(f, screen, chunks[2]);

    if let Some(picker) = &screen.picker {
        render_picker(f, picker, &screen.theme);
    }
}

fn render_transcript(f: &mut Frame, screen: &mut ChatScreen, area: Rect) {
    let width = area.width as usize;
    let lines = build_display_lines(screen.app.view().entries(), &screen.theme, width);

    let available_height = area.height.saturating_sub(1); // title row
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_offset = total.saturating_sub(available_height);

    screen.page_height = available_height.max(1);
    let view = screen.app.view_mut();
    view.clamp_scroll(max_offset);
    let scroll_offset = max_offset - view.scroll_from_bottom();

    let logging = match screen.app.transcript_path() {
        Some(path) => path.display().to_string(),
        None => "off".to_string(),
    };
    let title = format!(
        "desktop4mistral v{} - {} • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        screen.app.model_id(),
        logging
    );

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(Span::styled(title, screen.theme.title_style)))
        .scroll((scroll_offset, 0));
    f.render_widget(paragraph, area);
}

/// Sender header, wrapped body and a blank separator per entry.
pub fn build_display_lines(
    entries: &[TranscriptEntry],
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in entries {
        lines.push(Line::from(Span::styled(
            entry.sender.clone(),
            theme.sender_style(entry.color),
        )));
        let body_style = theme.body_style(entry.color);
        for row in wrap_text(&entry.text, width) {
            lines.push(Line::from(Span::styled(row, body_style)));
        }
        lines.push(Line::default());
    }
    lines
}

fn render_input(f: &mut Frame, screen: &mut ChatScreen, area: Rect) {
    if screen.app.view().input_enabled() {
        screen.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(screen.theme.border_style)
                .title("Type your message (Enter to send, Alt+Enter for new line, Ctrl+O models, Ctrl+N new chat, Ctrl+C to quit)"),
        );
        screen.textarea.set_style(screen.theme.text_style);
        screen.textarea.set_cursor_line_style(Style::default());
        f.render_widget(&screen.textarea, area);
        return;
    }

    let indicator = INDICATOR_FRAMES[(screen.ticks % INDICATOR_FRAMES.len() as u64) as usize];
    let waiting = Paragraph::new(format!("Waiting for response... {indicator}"))
        .style(screen.theme.disabled_input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(screen.theme.border_style)
                .title("Esc to cancel, Ctrl+C to quit"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(waiting, area);
}

fn render_status(f: &mut Frame, screen: &ChatScreen, area: Rect) {
    let text = screen
        .status
        .clone()
        .unwrap_or_else(|| format!("Model: {}", screen.app.model_id()));
    f.render_widget(
        Paragraph::new(text).style(screen.theme.status_style),
        area,
    );
}

fn render_picker(f: &mut Frame, picker: &ModelPicker, theme: &Theme) {
    let area = centered_rect(60, 60, f.area());
    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|model| {
            let mut spans = vec![Span::raw(model.id.clone())];
            if !model.description.trim().is_empty() {
                spans.push(Span::styled(
                    format!("  {}", model.description.trim()),
                    theme.status_style,
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style)
                .title("Select model (↑/↓, Enter to switch, Esc to close)"),
        )
        .highlight_style(theme.picker_highlight_style);
    let mut state = ListState::default();
    state.select(Some(picker.selected));

    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ColorTag;

    #[test]
    fn entries_render_header_body_and_separator() {
        let theme = Theme::default();
        let entries = vec![
            TranscriptEntry {
                sender: "You".into(),
                text: "hello there".into(),
                color: ColorTag::User,
            },
            TranscriptEntry {
                sender: "System".into(),
                text: "Now using mistral-tiny".into(),
                color: ColorTag::System,
            },
        ];

        let lines = build_display_lines(&entries, &theme, 6);
        let text: Vec<String> = lines.iter().map(|line| line.to_string()).collect();

        assert_eq!(
            text,
            vec!["You", "hello", "there", "", "System", "Now", "using", "mistra", "l-tiny", ""]
        );
        assert_eq!(lines[0].spans[0].style, theme.user_style);
        assert_eq!(lines[5].spans[0].style, theme.system_style);
    }
}
