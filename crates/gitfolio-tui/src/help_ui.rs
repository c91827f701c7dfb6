use crate::app::App;
use crate::ui::rgb;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Browsing",
        &[
            ("j / ↓", "Next repository"),
            ("k / ↑", "Previous repository"),
            ("n / →", "Next page"),
            ("p / ←", "Previous page"),
            ("Enter", "Open repository in browser"),
            ("o", "Open profile in browser"),
        ],
    ),
    (
        "Filtering",
        &[
            ("/", "Search names, descriptions and topics"),
            ("Esc", "Leave search (x clears it)"),
            ("l", "Language tags; Space toggles"),
            ("s", "Sort by stars, forks, updated or name"),
        ],
    ),
    (
        "General",
        &[
            ("t", "Toggle light/dark theme"),
            ("r", "Reload profile"),
            ("?", "Show this help"),
            ("q", "Quit"),
        ],
    ),
];

/// Render keybindings help popup
pub fn render_keybindings_help(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let colors = &app.theme.colors;
    let bg = rgb(colors.background);
    let content = keybindings_content(
        rgb(colors.accent),
        rgb(colors.foreground),
        rgb(colors.muted),
    );

    let help = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keybindings ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(rgb(colors.border_focused)))
                .style(Style::default().bg(bg)),
        )
        .style(Style::default().bg(bg));

    frame.render_widget(help, popup_area);
}

fn keybindings_content(accent: Color, fg: Color, muted: Color) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(
            format!(" {} ", title),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in bindings.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("   {:<10}", key), Style::default().fg(fg)),
                Span::styled(action.to_string(), Style::default().fg(muted)),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "   Press ? or Esc to close",
        Style::default().fg(muted),
    )));
    lines
}

/// Helper to create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 15);
    }

    #[test]
    fn test_every_section_listed() {
        let lines = keybindings_content(Color::Reset, Color::Reset, Color::Reset);
        let text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        for (title, _) in SECTIONS {
            assert!(text.contains(title));
        }
    }
}
