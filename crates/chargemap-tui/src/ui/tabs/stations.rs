use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use chargemap_core::utils::{format_coordinates, format_power, truncate_string};
use chargemap_core::Station;

use crate::app::{App, AppState};
use crate::ui::styles;

const OWNED_MARKER: &str = "(Created by you)";

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_filter_bar(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let visible = app.visible_stations();
    render_station_list(frame, app, &visible, body[0]);
    render_station_detail(frame, app, visible.get(app.station_selection), body[1]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.filter.status.map(|s| s.as_str()).unwrap_or("All");
    let connector = app
        .filter
        .connector_type
        .map(|c| c.as_str())
        .unwrap_or("All");

    let editing_power = app.state == AppState::EditingPowerFilter;
    let power = if editing_power {
        format!("{}▌", app.power_filter_input)
    } else {
        app.filter
            .power_output
            .map(format_power)
            .unwrap_or_else(|| "Any".to_string())
    };

    let line = Line::from(vec![
        Span::styled(" [s] Status: ", styles::muted_style()),
        Span::styled(status, styles::filter_style(app.filter.status.is_some())),
        Span::styled("   [c] Connector: ", styles::muted_style()),
        Span::styled(connector, styles::filter_style(app.filter.connector_type.is_some())),
        Span::styled("   [p] Power: ", styles::muted_style()),
        Span::styled(
            power,
            if editing_power {
                styles::selected_style()
            } else {
                styles::filter_style(app.filter.power_output.is_some())
            },
        ),
        Span::styled("   [x] Clear", styles::muted_style()),
    ]);

    let block = Block::default()
        .title(" Filters ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing_power));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_station_list(frame: &mut Frame, app: &App, stations: &[Station], area: Rect) {
    let items: Vec<ListItem> = stations
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let mut spans = vec![
                Span::styled("● ", styles::station_status_style(station.status)),
                Span::raw(format!(
                    "{:<24} {:>9}  {:<8}",
                    truncate_string(&station.name, 24),
                    format_power(station.power_output),
                    station.connector_type.as_str(),
                )),
            ];
            if app.is_owned(station) {
                spans.push(Span::styled(format!(" {}", OWNED_MARKER), styles::success_style()));
            }

            let style = if i == app.station_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = if app.filter.is_empty() {
        format!(" Chargers ({}) ", stations.len())
    } else {
        format!(" Chargers ({} of {}) ", stations.len(), app.all_stations().len())
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if items.is_empty() {
        let message = if app.loading {
            "Loading chargers..."
        } else if app.filter.is_empty() {
            "No chargers yet. Press [n] to add one."
        } else {
            "No chargers match the filters"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            format!("  {}", message),
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.station_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn detail_row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), styles::highlight_style()),
        Span::raw(value),
    ])
}

fn render_station_detail(frame: &mut Frame, app: &App, station: Option<&Station>, area: Rect) {
    let (title, lines) = match station {
        Some(station) => {
            let owned = app.is_owned(station);
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("Status      ", styles::highlight_style()),
                    Span::styled(
                        station.status.as_str(),
                        styles::station_status_style(station.status),
                    ),
                ]),
                detail_row("Power", format_power(station.power_output)),
                detail_row("Connector", station.connector_type.to_string()),
                detail_row("Location", format_coordinates(&station.location)),
                Line::from(""),
            ];

            if owned {
                lines.push(Line::from(Span::styled(OWNED_MARKER, styles::success_style())));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("[e]", styles::help_key_style()),
                    Span::styled(" Edit   ", styles::help_desc_style()),
                    Span::styled("[d]", styles::help_key_style()),
                    Span::styled(" Delete", styles::help_desc_style()),
                ]));
            }

            (format!(" {} ", station.name), lines)
        }
        None => (
            " No Charger Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a charger from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
