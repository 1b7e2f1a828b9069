//! Human-friendly formatting of a lookup result.

use chrono::NaiveDate;
use std::fmt;

use crate::{
    icon::{UNKNOWN_ICON, provider_icon_url, resolve_icon},
    model::WeatherResult,
    session::SessionView,
};

/// Rounds half-way cases towards positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Display-ready fields for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherView {
    pub heading: String,
    pub date: String,
    pub temperature: String,
    pub description: String,
    pub feels_like: String,
    pub wind: String,
    pub humidity: String,
    pub icon: String,
    pub icon_url: Option<String>,
}

impl WeatherView {
    pub fn new(result: &WeatherResult, today: NaiveDate) -> Self {
        let condition = result.primary_condition();

        let heading = if result.country.is_empty() {
            result.name.clone()
        } else {
            format!("{}, {}", result.name, result.country)
        };

        Self {
            heading,
            date: today.format("%A, %-d %B").to_string(),
            temperature: round_half_up(result.temperature_c).to_string(),
            description: condition.map(|c| c.description.to_uppercase()).unwrap_or_default(),
            feels_like: format!("feels like {} °C", round_half_up(result.feels_like_c)),
            wind: format!("{} m/s", round_half_up(result.wind_speed_mps)),
            humidity: format!("{} %", result.humidity_pct),
            icon: condition.map_or_else(|| UNKNOWN_ICON.to_string(), resolve_icon),
            icon_url: condition
                .and_then(|c| c.icon.as_deref())
                .map(provider_icon_url),
        }
    }
}

impl fmt::Display for WeatherView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "{}", self.date)?;
        writeln!(f, "[{}]  {} °C", self.icon, self.temperature)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        write!(f, "{}  |  wind {}  |  humidity {}", self.feels_like, self.wind, self.humidity)
    }
}

/// Render the whole session: spinner, error line, then the last result if any.
pub fn render_session(view: &SessionView, today: NaiveDate) -> String {
    let mut lines = Vec::new();

    if view.is_loading() {
        lines.push("… loading".to_string());
    }
    if let Some(message) = view.error() {
        lines.push(format!("! {message}"));
    }
    if let Some(result) = &view.last_result {
        lines.push(WeatherView::new(result, today).to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ConditionRecord, session::UiState};

    fn paris() -> WeatherResult {
        WeatherResult {
            name: "Paris".into(),
            country: "FR".into(),
            temperature_c: 15.4,
            feels_like_c: 14.1,
            humidity_pct: 60,
            wind_speed_mps: 3.2,
            conditions: vec![ConditionRecord {
                id: Some(800),
                description: "clear sky".into(),
                icon: Some("01d".into()),
            }],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn paris_example() {
        let view = WeatherView::new(&paris(), today());

        assert_eq!(view.heading, "Paris, FR");
        assert_eq!(view.date, "Monday, 19 October");
        assert_eq!(view.temperature, "15");
        assert_eq!(view.description, "CLEAR SKY");
        assert_eq!(view.feels_like, "feels like 14 °C");
        assert_eq!(view.wind, "3 m/s");
        assert_eq!(view.humidity, "60 %");
        assert_eq!(view.icon, "day-clear");
        assert_eq!(
            view.icon_url.as_deref(),
            Some("https://openweathermap.org/img/wn/01d@2x.png")
        );
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49), 0);
    }

    #[test]
    fn no_condition_renders_unknown_icon() {
        let mut result = paris();
        result.conditions.clear();
        result.country.clear();

        let view = WeatherView::new(&result, today());
        assert_eq!(view.heading, "Paris");
        assert_eq!(view.icon, "unknown");
        assert!(view.icon_url.is_none());
        assert!(view.description.is_empty());
    }

    #[test]
    fn session_render_shows_error_above_last_result() {
        let view = SessionView {
            state: UiState::Error("city not found".into()),
            last_result: Some(paris()),
        };

        let rendered = render_session(&view, today());
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("! city not found"));
        assert_eq!(lines.next(), Some("Paris, FR"));
    }

    #[test]
    fn session_render_loading() {
        let view = SessionView { state: UiState::Loading, last_result: None };
        assert_eq!(render_session(&view, today()), "… loading");
    }
}
