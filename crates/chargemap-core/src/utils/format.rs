use crate::models::{Location, Station};

/// Map center used when there is nothing to fit.
pub const DEFAULT_CENTER: Location = Location {
    latitude: 20.5937,
    longitude: 78.9629,
};

/// Degrees shown around [`DEFAULT_CENTER`] on an empty map.
const DEFAULT_SPAN: f64 = 30.0;

/// Smallest span fitted around stations, so a single point still gets a view.
const MIN_SPAN: f64 = 0.05;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// "22 kW", "7.4 kW"
pub fn format_power(kw: f64) -> String {
    format!("{} kW", kw)
}

pub fn format_coordinates(location: &Location) -> String {
    format!("{:.4}, {:.4}", location.latitude, location.longitude)
}

/// Rectangle of the map to draw, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapBounds {
    fn around(center: Location, lat_span: f64, lon_span: f64) -> Self {
        Self {
            min_lat: (center.latitude - lat_span / 2.0).max(-90.0),
            max_lat: (center.latitude + lat_span / 2.0).min(90.0),
            min_lon: (center.longitude - lon_span / 2.0).max(-180.0),
            max_lon: (center.longitude + lon_span / 2.0).min(180.0),
        }
    }
}

#[cfg(test)]
impl MapBounds {
    fn center(&self) -> Location {
        Location::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    fn contains(&self, location: &Location) -> bool {
        (self.min_lat..=self.max_lat).contains(&location.latitude)
            && (self.min_lon..=self.max_lon).contains(&location.longitude)
    }
}

/// Fit the view to every station with a valid location, padded by 10%.
///
/// With no plottable stations the view is centered on [`DEFAULT_CENTER`].
pub fn map_bounds(stations: &[Station]) -> MapBounds {
    let mut points = stations.iter().map(|s| s.location).filter(Location::is_valid);

    let Some(first) = points.next() else {
        return MapBounds::around(DEFAULT_CENTER, DEFAULT_SPAN, DEFAULT_SPAN);
    };

    let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
    let (mut min_lon, mut max_lon) = (first.longitude, first.longitude);
    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lon = min_lon.min(p.longitude);
        max_lon = max_lon.max(p.longitude);
    }

    let lat_span = ((max_lat - min_lat) * 1.2).max(MIN_SPAN);
    let lon_span = ((max_lon - min_lon) * 1.2).max(MIN_SPAN);
    let center = Location::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0);
    MapBounds::around(center, lat_span, lon_span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectorType, StationStatus};

    fn at(lat: f64, lon: f64) -> Station {
        Station {
            id: format!("{}:{}", lat, lon),
            name: "Station".to_string(),
            status: StationStatus::Active,
            power_output: 22.0,
            connector_type: ConnectorType::TypeA,
            location: Location::new(lat, lon),
            owner_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Chargé Plaza", 9), "Chargé...");
    }

    #[test]
    fn test_format_power_and_coordinates() {
        assert_eq!(format_power(22.0), "22 kW");
        assert_eq!(format_power(7.4), "7.4 kW");
        assert_eq!(
            format_coordinates(&Location::new(12.97161, 77.59456)),
            "12.9716, 77.5946"
        );
    }

    #[test]
    fn test_map_bounds_empty_uses_default_center() {
        let bounds = map_bounds(&[]);
        let center = bounds.center();
        assert!((center.latitude - DEFAULT_CENTER.latitude).abs() < 1e-9);
        assert!((center.longitude - DEFAULT_CENTER.longitude).abs() < 1e-9);
        assert!(bounds.contains(&DEFAULT_CENTER));
    }

    #[test]
    fn test_map_bounds_fits_all_stations() {
        let stations = vec![at(12.97, 77.59), at(28.61, 77.20), at(19.07, 72.87)];
        let bounds = map_bounds(&stations);
        for s in &stations {
            assert!(bounds.contains(&s.location), "{:?} outside {:?}", s.location, bounds);
        }
        assert!(bounds.max_lat - bounds.min_lat < DEFAULT_SPAN);
    }

    #[test]
    fn test_map_bounds_single_station_has_minimum_span() {
        let bounds = map_bounds(&[at(12.97, 77.59)]);
        assert!(bounds.max_lat - bounds.min_lat >= MIN_SPAN - f64::EPSILON);
        assert!(bounds.contains(&Location::new(12.97, 77.59)));
    }

    #[test]
    fn test_map_bounds_ignores_invalid_locations() {
        let bounds = map_bounds(&[at(12.97, 77.59), at(200.0, 0.0)]);
        assert!(bounds.max_lat < 20.0);
    }
}
