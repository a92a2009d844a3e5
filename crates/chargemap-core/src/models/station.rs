use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Operational status of a charging station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationStatus {
    Active,
    Inactive,
}

impl StationStatus {
    pub const ALL: [StationStatus; 2] = [StationStatus::Active, StationStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Active => "Active",
            StationStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plug type offered by a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "Type A")]
    TypeA,
    #[serde(rename = "Type B")]
    TypeB,
    #[serde(rename = "Micro-B")]
    MicroB,
    #[serde(rename = "Mini-B")]
    MiniB,
}

impl ConnectorType {
    pub const ALL: [ConnectorType; 4] = [
        ConnectorType::TypeA,
        ConnectorType::TypeB,
        ConnectorType::MicroB,
        ConnectorType::MiniB,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorType::TypeA => "Type A",
            ConnectorType::TypeB => "Type B",
            ConnectorType::MicroB => "Micro-B",
            ConnectorType::MiniB => "Mini-B",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "number_or_string")]
    pub latitude: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A charging station as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub status: StationStatus,
    #[serde(rename = "powerOutput", deserialize_with = "number_or_string")]
    pub power_output: f64,
    #[serde(rename = "connectorType")]
    pub connector_type: ConnectorType,
    pub location: Location,
    #[serde(rename = "user", alias = "ownerId")]
    pub owner_id: String,
}

impl Station {
    /// Whether the given identity id created this station.
    ///
    /// Only used to decide which controls to show; the server enforces ownership.
    pub fn is_owned_by(&self, identity_id: &str) -> bool {
        self.owner_id == identity_id
    }

    /// The editable part of this station, e.g. to prefill an edit form.
    pub fn fields(&self) -> StationFields {
        StationFields {
            name: self.name.clone(),
            status: self.status,
            power_output: self.power_output,
            connector_type: self.connector_type,
            location: self.location,
        }
    }
}

/// Fields submitted when creating or replacing a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationFields {
    pub name: String,
    pub status: StationStatus,
    #[serde(rename = "powerOutput")]
    pub power_output: f64,
    #[serde(rename = "connectorType")]
    pub connector_type: ConnectorType,
    pub location: Location,
}

/// Create body: the station fields tagged with the creating identity.
#[derive(Debug, Clone, Serialize)]
pub struct NewStation<'a> {
    #[serde(flatten)]
    pub fields: &'a StationFields,
    pub user: &'a str,
}

/// Accept a JSON number or a numeric string.
///
/// Form-driven writers store these as strings; reads may return either.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_station_from_api() {
        let json = r#"{
            "_id": "665f1c2a9b1e",
            "name": "Depot North",
            "status": "Active",
            "powerOutput": 50,
            "connectorType": "Micro-B",
            "location": {"latitude": "12.971599", "longitude": 77.594566},
            "user": "u1",
            "__v": 0
        }"#;

        let station: Station = serde_json::from_str(json).expect("station should parse");
        assert_eq!(station.id, "665f1c2a9b1e");
        assert_eq!(station.status, StationStatus::Active);
        assert_eq!(station.power_output, 50.0);
        assert_eq!(station.connector_type, ConnectorType::MicroB);
        assert_eq!(station.location.latitude, 12.971599);
        assert_eq!(station.owner_id, "u1");
    }

    #[test]
    fn test_power_output_as_string() {
        let json = r#"{"_id":"s1","name":"A","status":"Inactive","powerOutput":" 22.5 ",
            "connectorType":"Type B","location":{"latitude":0,"longitude":0},"user":"u"}"#;
        let station: Station = serde_json::from_str(json).expect("station should parse");
        assert_eq!(station.power_output, 22.5);
    }

    #[test]
    fn test_rejects_unknown_connector() {
        let json = r#"{"_id":"s1","name":"A","status":"Active","powerOutput":7,
            "connectorType":"CCS","location":{"latitude":0,"longitude":0},"user":"u"}"#;
        assert!(serde_json::from_str::<Station>(json).is_err());
    }

    #[test]
    fn test_new_station_body_flattens_fields() {
        let fields = StationFields {
            name: "Depot".to_string(),
            status: StationStatus::Active,
            power_output: 11.0,
            connector_type: ConnectorType::TypeA,
            location: Location::new(1.5, -2.25),
        };
        let body = serde_json::to_value(NewStation { fields: &fields, user: "u1" })
            .expect("body should serialize");

        assert_eq!(body["name"], "Depot");
        assert_eq!(body["connectorType"], "Type A");
        assert_eq!(body["powerOutput"], 11.0);
        assert_eq!(body["location"]["longitude"], -2.25);
        assert_eq!(body["user"], "u1");
    }

    #[test]
    fn test_location_bounds() {
        assert!(Location::new(90.0, 180.0).is_valid());
        assert!(Location::new(-90.0, -180.0).is_valid());
        assert!(!Location::new(90.5, 0.0).is_valid());
        assert!(!Location::new(0.0, -181.0).is_valid());
    }
}
