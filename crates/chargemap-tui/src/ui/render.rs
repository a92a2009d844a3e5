use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Tab};
use crate::forms::{LoginFocus, SignupFocus, StationField};

use super::styles;
use super::tabs::{map, stations};

/// Width of text inside form fields.
const FIELD_WIDTH: usize = 22;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::SigningUp => render_signup_overlay(frame, app),
        AppState::EditingStation => render_station_form_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::EditingPowerFilter | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  ⚡ chargemap";
    let user = match app.identity {
        Some(ref identity) => format!("{}  [?] Help", identity.display_name()),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + user.chars().count() + 2),
        )),
        Span::styled(user, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [(1, Tab::Stations), (2, Tab::Map)];

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, tab)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", key, tab.title());
        if app.current_tab == *tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Stations => stations::render(frame, app, area),
        Tab::Map => map::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.is_authenticated() {
        "[u]pdate | [L]ogout | [q]uit"
    } else {
        "[q]uit"
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.loading {
        " Loading stations... ".to_string()
    } else {
        match app.cache_age() {
            Some(age) => format!(" {} stations | Updated {} ", app.all_stations().len(), age),
            None => " No stations loaded ".to_string(),
        }
    };

    let left_style = match app.status_message {
        Some(ref msg) if msg.starts_with("Error:") => styles::error_style(),
        _ => styles::muted_style(),
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 27, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  chargemap", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-2", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓ j/k", "Navigate list"),
        help_line("PgUp/PgDn", "Scroll a page"),
        Line::from(""),
        Line::from(Span::styled(" Stations", styles::highlight_style())),
        help_line("n", "Add a new charger"),
        help_line("e", "Edit selected (yours only)"),
        help_line("d", "Delete selected (yours only)"),
        help_line("s / c", "Cycle status / connector filter"),
        help_line("p", "Filter by power output"),
        help_line("x", "Clear filters"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("u", "Refresh stations"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// One labelled input row: `Label: [value▌]`.
fn field_line(label: &str, value: &str, focused: bool, secret: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown: String = if secret {
        "*".repeat(value.chars().count().min(FIELD_WIDTH))
    } else {
        // Keep the tail visible while typing past the field width.
        let skip = value.chars().count().saturating_sub(FIELD_WIDTH);
        value.chars().skip(skip).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {:>17}: [", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Choice row cycled with ←/→.
fn choice_line(label: &str, value: Option<&str>, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown = value.unwrap_or("Select...");
    Line::from(vec![
        Span::styled(format!("  {:>17}: ", label), styles::muted_style()),
        Span::styled(format!("◀ {:<width$} ▶", shown, width = FIELD_WIDTH - 4), style),
    ])
}

fn button_line(label: &str, focused: bool, busy: bool) -> Line<'static> {
    let label = if busy { "…" } else { label };
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::raw("                 ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn error_line(error: &Option<String>) -> Vec<Line<'static>> {
    match error {
        Some(message) => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", message), styles::error_style())),
        ],
        None => Vec::new(),
    }
}

fn render_form(frame: &mut Frame, title: &str, lines: Vec<Line<'static>>, width: u16) {
    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(width, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let mut lines = vec![Line::from("")];
    lines.push(field_line("Email", &app.login_email, app.login_focus == LoginFocus::Email, false));
    lines.push(field_line(
        "Password",
        &app.login_password,
        app.login_focus == LoginFocus::Password,
        true,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button, app.submitting));
    lines.extend(error_line(&app.login_error));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  No account? Press ", styles::muted_style()),
        Span::styled("Ctrl+S", styles::help_key_style()),
        Span::styled(" to sign up", styles::muted_style()),
    ]));

    render_form(frame, "Login", lines, 50);
}

fn render_signup_overlay(frame: &mut Frame, app: &App) {
    let form = &app.signup;
    let focus = app.signup_focus;
    let mut lines = vec![Line::from("")];
    lines.push(field_line("Username", &form.username, focus == SignupFocus::Username, false));
    lines.push(field_line("Full name", &form.full_name, focus == SignupFocus::FullName, false));
    lines.push(field_line("Email", &form.email, focus == SignupFocus::Email, false));
    lines.push(field_line("Password", &form.password, focus == SignupFocus::Password, true));
    lines.push(field_line(
        "Confirm password",
        &form.confirm_password,
        focus == SignupFocus::ConfirmPassword,
        true,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Sign Up", focus == SignupFocus::Button, app.submitting));
    lines.extend(error_line(&app.signup_error));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Have an account? Press ", styles::muted_style()),
        Span::styled("Ctrl+S", styles::help_key_style()),
        Span::styled(" to log in", styles::muted_style()),
    ]));

    render_form(frame, "Sign Up", lines, 50);
}

fn render_station_form_overlay(frame: &mut Frame, app: &App) {
    let form = &app.station_form;
    let focused = |field: StationField| form.focus == field;

    let mut lines = vec![Line::from("")];
    lines.push(field_line(
        StationField::Name.label(),
        &form.name,
        focused(StationField::Name),
        false,
    ));
    lines.push(choice_line(
        StationField::Status.label(),
        form.status.map(|s| s.as_str()),
        focused(StationField::Status),
    ));
    lines.push(field_line(
        StationField::Power.label(),
        &form.power,
        focused(StationField::Power),
        false,
    ));
    lines.push(choice_line(
        StationField::Connector.label(),
        form.connector.map(|c| c.as_str()),
        focused(StationField::Connector),
    ));
    lines.push(field_line(
        StationField::Latitude.label(),
        &form.latitude,
        focused(StationField::Latitude),
        false,
    ));
    lines.push(field_line(
        StationField::Longitude.label(),
        &form.longitude,
        focused(StationField::Longitude),
        false,
    ));
    lines.push(Line::from(""));
    lines.push(button_line(
        form.submit_label(),
        focused(StationField::Submit),
        app.submitting,
    ));
    lines.extend(error_line(&form.error));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab/↑↓ move  ←/→ choose  Enter save  Esc cancel",
        styles::muted_style(),
    )));

    render_form(frame, form.title(), lines, 54);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let name = app
        .pending_delete
        .as_ref()
        .map(|s| s.name.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Delete this charger?",
            styles::highlight_style(),
        )),
        Line::from(Span::styled(format!("   {}", name), styles::list_item_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    render_form(frame, "Delete", lines, 46);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
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

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
