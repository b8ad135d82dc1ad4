use crate::output::{DisplayItem, Icon};
use crate::tui::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(5),    // Results
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);
    draw_results_list(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_query_input(f: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Find "));

    f.render_widget(input, area);

    let cursor_x = area.x + app.query.chars().count() as u16 + 1;
    f.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
}

fn draw_results_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app.items.iter().map(item_line).collect();

    let match_count = app.items.iter().filter(|i| i.is_match()).count();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Results ({match_count}) ")),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.items.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn item_line(item: &DisplayItem) -> ListItem<'_> {
    let line = match item.icon {
        Icon::Match => {
            let name = item.name.as_str();
            let split = name
                .trim_end_matches('/')
                .rfind('/')
                .map(|i| i + 1)
                .unwrap_or(0);
            Line::from(vec![
                Span::styled(&name[..split], Style::default().fg(Color::Blue)),
                Span::styled(&name[split..], Style::default().fg(Color::White)),
            ])
        }
        Icon::Info => Line::from(Span::styled(
            item.name.as_str(),
            Style::default().fg(Color::Cyan),
        )),
        Icon::Error => Line::from(vec![
            Span::styled(
                "error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(item.name.as_str()),
        ]),
    };
    ListItem::new(line)
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.is_searching() {
        "Searching...".to_string()
    } else {
        app.status_message.clone()
    };
    let status = Paragraph::new(text).style(Style::default().fg(Color::Cyan));

    f.render_widget(status, area);
}
