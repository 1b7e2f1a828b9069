use serde::{Deserialize, Serialize};

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }
}

/// What to look up. Exactly one form is sent per request.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Place(String),
    Coordinates(Coordinates),
}

impl WeatherQuery {
    /// Parameters understood by the proxy endpoint (`input` or `latitude`/`longitude`).
    pub fn proxy_params(&self) -> Vec<(&'static str, String)> {
        match self {
            WeatherQuery::Place(name) => vec![("input", name.clone())],
            WeatherQuery::Coordinates(c) => vec![
                ("latitude", c.latitude.to_string()),
                ("longitude", c.longitude.to_string()),
            ],
        }
    }

    /// Parameters understood by the provider (`q` or `lat`/`lon`).
    pub fn provider_params(&self) -> Vec<(&'static str, String)> {
        match self {
            WeatherQuery::Place(name) => vec![("q", name.clone())],
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::Place(name) => f.write_str(name),
            WeatherQuery::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
        }
    }
}

/// One entry of the provider's `weather` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionRecord {
    /// Provider condition code, e.g. 800 for clear sky.
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub description: String,
    /// Icon selector such as `01d`; the last character is `d` by day and `n` by night.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Current conditions for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub name: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub conditions: Vec<ConditionRecord>,
}

impl WeatherResult {
    /// The provider sends a one-element list; the first record is the one displayed.
    pub fn primary_condition(&self) -> Option<&ConditionRecord> {
        self.conditions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_query_params() {
        let q = WeatherQuery::Place("Paris".into());
        assert_eq!(q.proxy_params(), vec![("input", "Paris".to_string())]);
        assert_eq!(q.provider_params(), vec![("q", "Paris".to_string())]);
    }

    #[test]
    fn coordinate_query_params() {
        let q = WeatherQuery::Coordinates(Coordinates::new(48.85, 2.35).expect("valid"));
        assert_eq!(
            q.proxy_params(),
            vec![("latitude", "48.85".to_string()), ("longitude", "2.35".to_string())]
        );
        assert_eq!(
            q.provider_params(),
            vec![("lat", "48.85".to_string()), ("lon", "2.35".to_string())]
        );
    }

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        assert!(Coordinates::new(91.0, 0.0).is_none());
        assert!(Coordinates::new(0.0, -180.5).is_none());
        assert!(Coordinates::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn condition_record_tolerates_missing_fields() {
        let rec: ConditionRecord = serde_json::from_str(r#"{"description":"mist"}"#).unwrap();
        assert_eq!(rec.id, None);
        assert_eq!(rec.icon, None);
        assert_eq!(rec.description, "mist");
    }
}
