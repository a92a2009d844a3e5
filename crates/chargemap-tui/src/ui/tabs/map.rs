//! Station map drawn on a ratatui canvas over the built-in world outline.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders,
    },
    Frame,
};

use chargemap_core::utils::{map_bounds, truncate_string};

use crate::app::App;
use crate::ui::styles;

/// Labels longer than this are cut so neighbouring markers stay readable.
const LABEL_LENGTH: usize = 18;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let stations = app.all_stations();
    let bounds = map_bounds(stations);
    let selected_id = app.selected_station().map(|s| s.id);

    let title = if stations.is_empty() {
        " Map (no chargers) ".to_string()
    } else {
        format!(" Map ({} chargers) ", stations.len())
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .marker(Marker::Braille)
        .x_bounds([bounds.min_lon, bounds.max_lon])
        .y_bounds([bounds.min_lat, bounds.max_lat])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: styles::MAP_OUTLINE,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for station in stations.iter().filter(|s| s.location.is_valid()) {
                let (x, y) = (station.location.longitude, station.location.latitude);
                let selected = selected_id.as_deref() == Some(station.id.as_str());
                let color = if selected {
                    Color::White
                } else {
                    styles::station_status_color(station.status)
                };

                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color,
                });

                let label_style = if selected {
                    styles::selected_style()
                } else {
                    Style::default().fg(color)
                };
                ctx.print(
                    x,
                    y,
                    Span::styled(
                        format!(" {}", truncate_string(&station.name, LABEL_LENGTH)),
                        label_style,
                    ),
                );
            }
        });

    frame.render_widget(canvas, area);
}
