use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use tallybook_core::utils::{display_width, pad_to_width, truncate_string};

use crate::app::{App, AppState, Focus};

use super::styles;

/// Width of the right-aligned amount column
const AMOUNT_WIDTH: usize = 14;

/// Columns used by everything except the description in a record row:
/// date + padding, amount column, delete marker, borders
const ROW_FIXED_WIDTH: usize = 13 + AMOUNT_WIDTH + 5 + 2;

const DELETE_MARKER: &str = "[−]";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Entry form
            Constraint::Min(5),    // Record list
            Constraint::Length(1), // Running total
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_form(frame, app, chunks[1]);
    render_records(frame, app, chunks[2]);
    render_total(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ShowingAlert => render_alert_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Tallybook";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn input_field<'a>(label: &'a str, value: &'a str, width: usize, focused: bool) -> Vec<Span<'a>> {
    let cursor = if focused { "▌" } else { " " };
    let shown = truncate_string(value, width);
    vec![
        Span::styled(format!("{}: [", label), styles::muted_style()),
        Span::styled(
            format!("{}{}", pad_to_width(&shown, width), cursor),
            styles::input_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.focus.is_input();

    let mut spans = vec![Span::raw(" ")];
    spans.extend(input_field(
        "Description",
        &app.description_input,
        28,
        app.focus == Focus::Description,
    ));
    spans.push(Span::raw("   "));
    spans.extend(input_field(
        "Amount",
        &app.amount_input,
        12,
        app.focus == Focus::Amount,
    ));
    spans.push(Span::raw("   "));
    spans.push(Span::styled("[Enter]", styles::help_key_style()));
    spans.push(Span::styled(" Add", styles::muted_style()));

    let block = Block::default()
        .title(" New entry ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_records(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let block = Block::default()
        .title(format!(" Records ({}) ", app.view.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if let Some(placeholder) = app.view.placeholder() {
        let paragraph = Paragraph::new(Line::from(Span::styled(placeholder, styles::muted_style())))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let description_width = (area.width as usize).saturating_sub(ROW_FIXED_WIDTH).max(8);

    let items: Vec<ListItem> = app
        .view
        .rows
        .iter()
        .map(|row| {
            let selected = focused && row.position == app.selection;
            let style = if selected {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let line = Line::from(vec![
                Span::styled(format!(" {}  ", row.date), styles::muted_style()),
                Span::raw(pad_to_width(
                    &truncate_string(&row.description, description_width),
                    description_width,
                )),
                Span::styled(
                    format!("{:>width$}", format!("${}", row.amount), width = AMOUNT_WIDTH),
                    styles::amount_style(),
                ),
                Span::raw("  "),
                Span::styled(DELETE_MARKER, styles::delete_marker_style(selected)),
            ]);

            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_total(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Total: ", styles::highlight_style()),
        Span::styled(format!("${}", app.view.total_display), styles::total_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.focus.is_input() {
        "[Tab] next field | [Esc] list | [Ctrl+E] export"
    } else {
        "[a]dd | [d]elete | [e]xport | [q]uit"
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} entries ", app.view.len()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(display_width(&left_text))
        .saturating_sub(display_width(&right_text));

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn overlay_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 20, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            format!("  Tallybook {}", version),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Entry form", styles::highlight_style())),
        key_line("Tab", "Next field / record list"),
        key_line("Enter", "Next field, or add from Amount"),
        key_line("Esc", "Go to record list"),
        key_line("Ctrl+E", "Export to CSV"),
        Line::from(""),
        Line::from(Span::styled(" Record list", styles::highlight_style())),
        key_line("↑/↓ j/k", "Navigate records"),
        key_line("a", "Add a new entry"),
        key_line("d / Del", "Delete selected record"),
        key_line("e", "Export to CSV"),
        key_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(help_text).block(overlay_block()), area);
}

fn render_alert_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 8, frame.area());
    frame.render_widget(Clear, area);

    let message = app.alert.as_deref().unwrap_or_default();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", message), styles::error_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" to continue", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(overlay_block());
    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 9, frame.area());
    frame.render_widget(Clear, area);

    let target = app
        .pending_delete
        .and_then(|id| app.view.rows.iter().find(|r| r.id == id));

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Delete this record?",
            styles::highlight_style(),
        )),
    ];
    if let Some(row) = target {
        lines.push(Line::from(Span::raw(format!(
            "   {} - {} ${}",
            row.date,
            truncate_string(&row.description, 20),
            row.amount
        ))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(" to delete, ", styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ]));

    frame.render_widget(Paragraph::new(lines).block(overlay_block()), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block()), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
