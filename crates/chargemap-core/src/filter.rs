//! Client-side station filtering.

use crate::models::{ConnectorType, Station, StationStatus};

/// Criteria from the filter bar. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StationFilter {
    pub status: Option<StationStatus>,
    pub connector_type: Option<ConnectorType>,
    pub power_output: Option<f64>,
}

impl StationFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.connector_type.is_none() && self.power_output.is_none()
    }

    /// A station passes when every criterion that is set matches exactly.
    pub fn matches(&self, station: &Station) -> bool {
        self.status.map_or(true, |s| station.status == s)
            && self.connector_type.map_or(true, |c| station.connector_type == c)
            && self.power_output.map_or(true, |p| station.power_output == p)
    }

    /// Stations passing the filter, in their original order.
    pub fn apply(&self, stations: &[Station]) -> Vec<Station> {
        stations.iter().filter(|s| self.matches(s)).cloned().collect()
    }

    /// Parse the power box. Blank means no constraint.
    pub fn parse_power(input: &str) -> Result<Option<f64>, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(Some)
            .ok_or_else(|| format!("Invalid power value: {}", trimmed))
    }
}

pub fn filter_stations(stations: &[Station], criteria: &StationFilter) -> Vec<Station> {
    criteria.apply(stations)
}
