//! Rendering functions for the Terminal UI components

use crate::constants::{FALLBACK_DISPLAY_NAME, HELP_TEXT};
use crate::gate::Route;
use crate::tui::state::{Tab, TuiState};
use crate::views::SearchMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const PRIVACY_TEXT: &str = "\
SecondBrain stores your display name and a sign-in token on this machine so \
you stay signed in between runs. Signing out removes both.

Your nodes live on the SecondBrain backend and are only sent to it with your \
own token. Nothing is shared with third parties beyond the Google sign-in.";

const TERMS_TEXT: &str = "\
SecondBrain is provided as is. You are responsible for the content you save \
to your knowledge store. Deleted nodes cannot be recovered.";

/// Rendering functions for the TUI
pub fn render_ui(state: &TuiState, f: &mut Frame) {
    let size = f.size();
    f.render_widget(Clear, size);

    match state.route() {
        Route::Landing => render_landing(state, f, size),
        Route::Privacy => render_document(f, size, "Privacy Policy", PRIVACY_TEXT),
        Route::Terms => render_document(f, size, "Terms of Service", TERMS_TEXT),
        Route::Home => render_dashboard(state, f, size),
    }

    if state.nodes.pending_delete().is_some() {
        render_delete_modal(state, f);
    }
    if state.show_help {
        render_popup(f, "Help (any key to close)", HELP_TEXT, Color::Cyan);
    }
    if let Some(alert) = state.alert {
        render_popup(f, "Alert (Enter to dismiss)", alert.message(), Color::Red);
    }
}

fn render_landing(state: &TuiState, f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "SecondBrain",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Your second brain for everything you read, watch and save."),
        Line::from(""),
    ];

    if state.signing_in {
        lines.push(Line::from(Span::styled(
            "Signing in...",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" sign in with Google"),
        ]));
    }
    if let Some(status) = &state.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "p privacy   t terms   q quit",
        Style::default().fg(Color::DarkGray),
    )));

    let height = lines.len() as u16 + 2;
    let landing = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(landing, centered_rect(70, height, area));
}

fn render_document(f: &mut Frame, area: Rect, title: &str, body: &str) {
    let document = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!("{} (Esc to go back)", title)),
        );
    f.render_widget(document, centered_rect(80, 12, area));
}

fn render_dashboard(state: &TuiState, f: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(1)])
        .split(area);

    render_sidebar(state, f, columns[0]);
    match state.tab {
        Tab::Assistant => render_search(state, f, columns[1]),
        Tab::Nodes => render_nodes(state, f, columns[1]),
    }
}

fn render_sidebar(state: &TuiState, f: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let entries = [Tab::Assistant, Tab::Nodes].map(|tab| {
        let style = if tab == state.tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        ListItem::new(Line::from(Span::styled(format!(" {} ", tab.title()), style)))
    });
    let mut items: Vec<ListItem> = entries.into_iter().collect();
    items.push(ListItem::new(""));
    items.push(ListItem::new(Span::styled(
        " Logout (Ctrl+L)",
        Style::default().fg(Color::Red),
    )));

    let menu = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("SecondBrain"),
    );
    f.render_widget(menu, rows[0]);

    let name = state
        .display_name()
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());
    let user = Paragraph::new(name).block(Block::default().borders(Borders::ALL));
    f.render_widget(user, rows[1]);
}

fn render_search(state: &TuiState, f: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Mode selector
            Constraint::Length(3), // Query
            Constraint::Min(1),    // Results
        ])
        .split(area);

    let mode = state.search.mode();
    let mut modes: Vec<Span> = Vec::new();
    for candidate in SearchMode::ALL {
        let style = if candidate == mode {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        modes.push(Span::styled(format!(" {} ", candidate.label()), style));
        modes.push(Span::raw("  "));
    }
    modes.push(Span::styled(
        mode.description(),
        Style::default().fg(Color::DarkGray),
    ));
    let selector = Paragraph::new(Line::from(modes)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Mode (Ctrl+T)"),
    );
    f.render_widget(selector, rows[0]);

    let query = if state.search.query().is_empty() {
        Line::from(Span::styled(
            mode.placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.search.query())
    };
    let input = Paragraph::new(query).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(input, rows[1]);

    let block = Block::default().borders(Borders::ALL).title("Results");
    if let Some(hint) = state.search.hint() {
        let hint = Paragraph::new(Span::styled(hint, Style::default().fg(Color::Yellow)))
            .block(block);
        f.render_widget(hint, rows[2]);
        return;
    }
    if mode == SearchMode::Semantic {
        let note = Paragraph::new("Ask a question to get answers from your notes.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(note, rows[2]);
        return;
    }
    if state.search.is_loading() {
        f.render_widget(Paragraph::new("Loading nodes...").block(block), rows[2]);
        return;
    }

    let results = state.search.results();
    if state.search.shows_results() && results.is_empty() {
        f.render_widget(Paragraph::new("No matches").block(block), rows[2]);
        return;
    }
    let items: Vec<ListItem> = results.into_iter().map(node_item).collect();
    f.render_widget(List::new(items).block(block), rows[2]);
}

fn render_nodes(state: &TuiState, f: &mut Frame, area: Rect) {
    let count = state.nodes.nodes().len();
    let title = if state.nodes.is_loading() {
        "Nodes (loading...)".to_string()
    } else {
        format!("Nodes ({})   d delete   r refresh", count)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title);

    if count == 0 && !state.nodes.is_loading() {
        f.render_widget(Paragraph::new("No nodes yet.").block(block), area);
        return;
    }

    let items: Vec<ListItem> = state.nodes.nodes().iter().map(node_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.nodes.selected_index()));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn node_item(node: &crate::knowledge::Node) -> ListItem<'_> {
    let mut lines = vec![
        Line::from(Span::styled(
            node.display_title(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            node.summary(),
            Style::default().fg(Color::Gray),
        )),
    ];
    if let Some(url) = &node.url {
        lines.push(Line::from(Span::styled(
            url.as_str(),
            Style::default().fg(Color::Blue),
        )));
    }
    ListItem::new(lines)
}

fn render_delete_modal(state: &TuiState, f: &mut Frame) {
    let title = state
        .nodes
        .pending_delete()
        .map(|node| node.display_title())
        .unwrap_or_default();
    let body = format!(
        "Delete \"{}\"?\nThis cannot be undone.\n\ny confirm   n cancel",
        title
    );
    render_popup(f, "Delete node", &body, Color::Yellow);
}

fn render_popup(f: &mut Frame, title: &str, body: &str, color: Color) {
    let height = body.lines().count() as u16 + 2;
    let area = centered_rect(60, height, f.size());
    f.render_widget(Clear, area);

    let popup = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
    f.render_widget(popup, area);
}

/// Rect of `percent_x` width and `height` rows, centered in `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 10, area);
        assert_eq!(rect, Rect::new(20, 15, 60, 10));

        let tiny = centered_rect(60, 50, Rect::new(0, 0, 10, 5));
        assert_eq!(tiny.height, 5);
        assert!(tiny.x + tiny.width <= 10);
    }
}
