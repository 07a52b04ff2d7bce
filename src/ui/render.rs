use super::app::{App, Notice};
use crate::form::{FieldKind, FormField, TaskForm};
use crate::kanban_board::Column;
use crate::task::Task;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

const HELP: &str =
    "c create  ←→ column  ↑↓ task  1/2/3 set status  </> move  e edit  d delete  q quit";

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_columns(f, chunks[1], app);
    render_footer(f, chunks[2], app);

    if let Some(form) = &app.form {
        render_form(f, form, f.area());
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18)])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Board Infinity",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your Task Management Dashboard",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, parts[0]);

    let button = Paragraph::new(Line::from(Span::styled(
        " [c] Create Task ",
        Style::default().fg(Color::White).bg(Color::Indexed(61)),
    )))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(button, parts[1]);
}

fn render_columns(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, column) in app.board.columns().iter().enumerate() {
        let focused = app.selected_status == i && app.form.is_none();
        let selected = focused.then_some(app.selected_task);
        render_column(f, chunks[i], column, selected);
    }
}

/// One status column. `selected` highlights a row when the column has focus.
pub fn render_column(f: &mut Frame, area: Rect, column: &Column<'_>, selected: Option<usize>) {
    let items: Vec<ListItem> = column.tasks.iter().map(|t| task_item(t)).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ({}) ", column.status, column.tasks.len()))
                .borders(Borders::ALL)
                .border_style(if selected.is_some() {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    if !column.tasks.is_empty() {
        state.select(selected);
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Row for a single task: priority badge, title, description and date.
pub fn task_item(task: &Task) -> ListItem<'_> {
    let badge = Span::styled(
        format!(" {} ", task.priority.as_str().to_uppercase()),
        Style::default()
            .fg(Color::White)
            .bg(task.priority.badge_color()),
    );

    let mut lines = vec![
        Line::from(vec![
            badge,
            Span::raw(" "),
            Span::styled(
                task.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            task.description.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(Span::styled(
        task.display_date(),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    ListItem::new(lines)
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.notice {
        Some(Notice::Error(msg)) => Span::styled(msg.as_str(), Style::default().fg(Color::Red)),
        Some(Notice::Info(msg)) => Span::styled(msg.as_str(), Style::default().fg(Color::Green)),
        None if app.form.is_some() => Span::styled(
            "Tab next field  ↑↓ change option  Enter create  Esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
        None => Span::styled(HELP, Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(Paragraph::new(Line::from(line)), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render_form(f: &mut Frame, form: &TaskForm, area: Rect) {
    let height = form.fields.len() as u16 * 3 + 3;
    let modal = centered_rect(60, height, area);
    f.render_widget(Clear, modal);

    let block = Block::default()
        .title(" Create New Task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Indexed(61)));
    let inner = block.inner(modal);
    f.render_widget(block, modal);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            std::iter::repeat(Constraint::Length(3))
                .take(form.fields.len())
                .chain(std::iter::once(Constraint::Min(1)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (idx, field) in form.fields.iter().enumerate() {
        render_form_field(f, field, chunks[idx], idx == form.focused);
    }

    let buttons = Paragraph::new("[Enter] Create   [Esc] Cancel")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Right);
    if let Some(area) = chunks.last() {
        f.render_widget(buttons, *area);
    }
}

fn render_form_field(f: &mut Frame, field: &FormField, area: Rect, focused: bool) {
    let border = if field.error.is_some() {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let mut block = Block::default()
        .title(field.label)
        .borders(Borders::ALL)
        .border_style(border);
    if let Some(error) = &field.error {
        block = block.title_bottom(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    let text = match field.kind {
        FieldKind::Select if focused => format!("‹ {} ›", field.value),
        FieldKind::Select => field.value.clone(),
        FieldKind::Text | FieldKind::Date if focused => {
            let mut text: String = field.value.chars().take(field.cursor).collect();
            text.push('│');
            text.extend(field.value.chars().skip(field.cursor));
            text
        }
        FieldKind::Text | FieldKind::Date => field.value.clone(),
    };

    f.render_widget(Paragraph::new(text).block(block), area);
}
