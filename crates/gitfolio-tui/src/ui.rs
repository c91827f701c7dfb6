// UI rendering logic
use crate::app::{App, InputMode, Screen};
use crate::help_ui::{centered_rect, render_keybindings_help};
use gitfolio_core::{theme, ErrorPage, RepoCard, SortKey};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Minimum card width; the grid fits as many columns as this allows
const CARD_WIDTH: u16 = 38;
const CARD_HEIGHT: u16 = 7;

pub(crate) fn rgb(color: theme::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

pub fn render(frame: &mut Frame, app: &App) {
    let bg = rgb(app.theme.colors.background);
    frame.render_widget(Block::default().style(Style::default().bg(bg)), frame.area());

    match &app.screen {
        Screen::Loading => render_loading(frame, app, frame.area()),
        Screen::Error(page) => render_error(frame, app, page, frame.area()),
        Screen::Gallery => render_gallery(frame, app),
    }

    if let Some(popup) = &app.popup {
        render_user_popup(frame, app, &popup.message);
    }

    if app.input_mode == InputMode::Help {
        render_keybindings_help(frame, app, frame.area());
    }
}

fn render_gallery(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Profile header
            Constraint::Length(3), // Search + sort
            Constraint::Length(3), // Language tags
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(1), // Pagination
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_profile(frame, app, chunks[0]);
    render_toolbar(frame, app, chunks[1]);
    render_language_tags(frame, app, chunks[2]);
    render_cards(frame, app, chunks[3]);
    render_pagination(frame, app, chunks[4]);
    render_status_bar(frame, app, chunks[5]);

    if app.input_mode == InputMode::SortMenu {
        render_sort_menu(frame, app, chunks[1]);
    }
}

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let Some(profile) = &app.profile else {
        return;
    };

    let mut stats = Vec::new();
    for (i, stat) in profile.stats.iter().enumerate() {
        if i > 0 {
            stats.push(Span::styled("  ·  ", Style::default().fg(rgb(colors.muted))));
        }
        stats.push(Span::styled(
            stat.value.clone(),
            Style::default()
                .fg(rgb(colors.accent))
                .add_modifier(Modifier::BOLD),
        ));
        stats.push(Span::styled(
            format!(" {}", stat.kind.label()),
            Style::default().fg(rgb(colors.subtitle)),
        ));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(
                profile.display_name.clone(),
                Style::default()
                    .fg(rgb(colors.title))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(profile.login.clone(), Style::default().fg(rgb(colors.muted))),
        ]),
        Line::from(Span::styled(
            profile.bio.clone(),
            Style::default().fg(rgb(colors.foreground)),
        )),
        Line::from(stats),
    ];

    let header = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", profile.title))
                .border_style(Style::default().fg(rgb(colors.border))),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(header, area);
}

fn render_toolbar(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(area);

    let searching = app.input_mode == InputMode::Searching;
    let (text, style) = if app.search_input.is_empty() && !searching {
        (
            "Press / to search".to_string(),
            Style::default().fg(rgb(colors.muted)),
        )
    } else if searching {
        (
            format!("{}_", app.search_input),
            Style::default().fg(rgb(colors.foreground)),
        )
    } else {
        (
            app.search_input.clone(),
            Style::default().fg(rgb(colors.foreground)),
        )
    };

    let search_border = if searching {
        colors.border_focused
    } else {
        colors.border
    };

    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(Style::default().fg(rgb(search_border))),
    );
    frame.render_widget(search, chunks[0]);

    let sort_border = if app.input_mode == InputMode::SortMenu {
        colors.border_focused
    } else {
        colors.border
    };
    let sort = Paragraph::new(format!("{} ▾", app.collection.sort_key().label()))
        .style(Style::default().fg(rgb(colors.foreground)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Sort [s] ")
                .border_style(Style::default().fg(rgb(sort_border))),
        );
    frame.render_widget(sort, chunks[1]);
}

fn render_language_tags(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let focused = app.input_mode == InputMode::Languages;

    let mut spans = Vec::new();
    for (i, tag) in app.language_tags().into_iter().enumerate() {
        let mut style = if app.is_tag_active(i) {
            Style::default()
                .fg(rgb(colors.background))
                .bg(rgb(colors.tag_active))
        } else {
            Style::default().fg(rgb(colors.subtitle))
        };
        if focused && i == app.language_cursor {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        spans.push(Span::styled(format!(" {} ", tag), style));
        spans.push(Span::raw(" "));
    }

    let border = if focused {
        colors.border_focused
    } else {
        colors.border
    };

    let tags = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Languages [l] ")
            .border_style(Style::default().fg(rgb(border))),
    );
    frame.render_widget(tags, area);
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    if let Some(message) = app.empty_message() {
        let empty = Paragraph::new(message)
            .style(Style::default().fg(rgb(colors.muted)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::NONE));
        let middle = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        frame.render_widget(empty, middle);
        return;
    }

    let cards = app.cards();
    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;

    // Scroll by whole rows so the selected card stays on screen
    let selected_row = app.selected_index / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let card_width = area.width / columns as u16;
    for (i, card) in cards.iter().enumerate() {
        let row = i / columns;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let col = i % columns;
        let rect = Rect {
            x: area.x + col as u16 * card_width,
            y: area.y + (row - first_row) as u16 * CARD_HEIGHT,
            width: card_width,
            height: CARD_HEIGHT,
        }
        .intersection(area);
        render_card(frame, app, card, i == app.selected_index, rect);
    }
}

fn render_card(frame: &mut Frame, app: &App, card: &RepoCard, selected: bool, area: Rect) {
    let colors = &app.theme.colors;

    let mut title = vec![Span::styled(
        card.name.clone(),
        Style::default()
            .fg(rgb(colors.title))
            .add_modifier(Modifier::BOLD),
    )];
    if card.is_fork {
        title.push(Span::styled(" fork", Style::default().fg(rgb(colors.fork_badge))));
    }

    let mut language_line = vec![
        Span::styled("● ", Style::default().fg(rgb(card.language_color))),
        Span::styled(card.language.clone(), Style::default().fg(rgb(colors.foreground))),
    ];
    if !card.languages.is_empty() {
        language_line.push(Span::styled(
            format!("  {}", card.languages.join(" · ")),
            Style::default().fg(rgb(colors.muted)),
        ));
    }

    let lines = vec![
        Line::from(title),
        Line::from(Span::styled(
            card.description.clone(),
            Style::default().fg(rgb(colors.subtitle)),
        )),
        Line::from(language_line),
        Line::from(vec![
            Span::styled(format!("★ {}", card.stars), Style::default().fg(rgb(colors.stars))),
            Span::raw("   "),
            Span::styled(format!("⑂ {}", card.forks), Style::default().fg(rgb(colors.forks))),
            Span::raw("   "),
            Span::styled(
                format!("Updated {}", card.updated),
                Style::default().fg(rgb(colors.muted)),
            ),
        ]),
    ];

    let (border, bg) = if selected {
        (colors.border_focused, colors.selected_bg)
    } else {
        (colors.border, colors.background)
    };

    let widget = Paragraph::new(lines)
        .style(Style::default().bg(rgb(bg)))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(rgb(border))),
        );
    frame.render_widget(widget, area);
}

fn render_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let Some(pagination) = app.pagination() else {
        return;
    };
    let colors = &app.theme.colors;

    let arrow = |enabled: bool, symbol: &'static str| {
        let color = if enabled { colors.accent } else { colors.muted };
        Span::styled(symbol, Style::default().fg(rgb(color)))
    };

    let line = Line::from(vec![
        arrow(pagination.has_previous, "◀ "),
        Span::styled(pagination.label, Style::default().fg(rgb(colors.foreground))),
        arrow(pagination.has_next, " ▶"),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let text = if let Some(message) = &app.status_message {
        message.clone()
    } else {
        let hints = match app.input_mode {
            InputMode::Searching => "Type to filter | Enter: Apply | Esc: Done",
            InputMode::Languages => "←/→: Move | Space: Toggle | Esc: Done",
            InputMode::SortMenu => "↑/↓: Move | Enter: Choose | Esc: Cancel",
            InputMode::Help => "Esc: Close",
            InputMode::Normal => {
                "/: Search | l: Languages | s: Sort | n/p: Page | Enter: Open | t: Theme | ?: Help | q: Quit"
            }
        };
        format!(
            "{} of {} repositories | {}",
            app.collection.filtered_count(),
            app.collection.total_count(),
            hints
        )
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(rgb(colors.muted))),
        area,
    );
}

fn render_sort_menu(frame: &mut Frame, app: &App, anchor: Rect) {
    let colors = &app.theme.colors;
    let options = SortKey::all();
    let width = 24.min(anchor.width);
    let area = Rect {
        x: anchor.x + anchor.width.saturating_sub(width),
        y: anchor.y + anchor.height,
        width,
        height: options.len() as u16 + 2,
    }
    .intersection(frame.area());

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let style = if i == app.sort_cursor {
                Style::default()
                    .fg(rgb(colors.accent))
                    .bg(rgb(colors.selected_bg))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(rgb(colors.foreground))
            };
            Line::from(Span::styled(format!(" {} ", key.label()), style))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(rgb(colors.border_focused)))
                .style(Style::default().bg(rgb(colors.background))),
        ),
        area,
    );
}

fn render_user_popup(frame: &mut Frame, app: &App, message: &str) {
    let colors = &app.theme.colors;
    let area = frame.area();
    let width = (message.chars().count() as u16 + 6).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: 3,
    }
    .intersection(area);

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(rgb(colors.accent)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(rgb(colors.accent)))
                    .style(Style::default().bg(rgb(colors.background))),
            ),
        rect,
    );
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let rect = centered_rect(40, 20, area);
    frame.render_widget(
        Paragraph::new("Loading profile...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(rgb(colors.muted))),
        rect,
    );
}

fn render_error(frame: &mut Frame, app: &App, page: &ErrorPage, area: Rect) {
    let colors = &app.theme.colors;
    let rect = centered_rect(60, 40, area);

    let lines = vec![
        Line::from(Span::styled(
            page.title,
            Style::default()
                .fg(rgb(colors.error))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            page.message,
            Style::default().fg(rgb(colors.foreground)),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[r]", Style::default().fg(rgb(colors.accent))),
            Span::styled(" Retry   ", Style::default().fg(rgb(colors.muted))),
            Span::styled("[q]", Style::default().fg(rgb(colors.accent))),
            Span::styled(" Quit", Style::default().fg(rgb(colors.muted))),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(rgb(colors.error))),
            ),
        rect,
    );
}
