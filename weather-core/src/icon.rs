//! Maps provider condition codes to the bundled SVG icon names.
//!
//! Full list of provider conditions: <https://openweathermap.org/weather-conditions>

use crate::model::ConditionRecord;

/// Icon category shared by a group of condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ThunderstormsRain,
    Thunderstorms,
    Drizzle,
    Rain,
    Snow,
    Sleet,
    Haze,
    Smoke,
    Dust,
    Fog,
    Clear,
    Hurricane,
    Cloudy,
    Overcast,
    Extreme,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ThunderstormsRain => "thunderstorms-rain",
            Category::Thunderstorms => "thunderstorms",
            Category::Drizzle => "drizzle",
            Category::Rain => "rain",
            Category::Snow => "snow",
            Category::Sleet => "sleet",
            Category::Haze => "haze",
            Category::Smoke => "smoke",
            Category::Dust => "dust",
            Category::Fog => "fog",
            Category::Clear => "clear",
            Category::Hurricane => "hurricane",
            Category::Cloudy => "cloudy",
            Category::Overcast => "overcast",
            Category::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const UNKNOWN_ICON: &str = "unknown";

const DAY_PREFIX: &str = "day-";
const NIGHT_PREFIX: &str = "night-";

use Category::*;

/// Sorted by code; looked up with a binary search.
static CONDITION_TABLE: &[(u32, Category)] = &[
    // 2xx thunderstorm
    (200, ThunderstormsRain), // with light rain
    (201, ThunderstormsRain), // with rain
    (202, ThunderstormsRain), // with heavy rain
    (210, Thunderstorms),     // light
    (211, Thunderstorms),
    (212, Thunderstorms), // heavy
    (221, Thunderstorms), // ragged
    (230, ThunderstormsRain), // with light drizzle
    (231, ThunderstormsRain), // with drizzle
    (232, ThunderstormsRain), // with heavy drizzle
    // 3xx drizzle
    (300, Drizzle),
    (301, Drizzle),
    (302, Drizzle),
    (310, Drizzle),
    (311, Drizzle),
    (312, Drizzle),
    (313, Drizzle),
    (314, Drizzle),
    (321, Drizzle),
    // 5xx rain
    (500, Rain),
    (501, Rain),
    (502, Rain),
    (503, Rain),
    (504, Rain),
    (511, Rain), // freezing rain
    (520, Rain),
    (521, Rain),
    (522, Rain),
    (531, Rain),
    // 6xx snow
    (600, Snow),
    (601, Snow),
    (602, Snow),
    (611, Sleet),
    (612, Sleet),
    (613, Sleet),
    (615, Sleet), // light rain and snow
    (616, Sleet), // rain and snow
    (620, Snow),
    (621, Snow),
    (622, Snow),
    // 7xx atmosphere
    (701, Haze), // mist
    (711, Smoke),
    (721, Haze),
    (731, Dust), // sand/dust whirls
    (741, Fog),
    (751, Dust), // sand
    (761, Dust),
    (762, Dust), // volcanic ash
    (771, Clear), // squalls
    (781, Hurricane), // tornado
    // 800 clear, 80x clouds
    (800, Clear),
    (801, Cloudy),   // few clouds: 11-25%
    (802, Cloudy),   // scattered clouds: 25-50%
    (803, Overcast), // broken clouds: 51-84%
    (804, Extreme),  // overcast clouds: 85-100%
];

/// Category for a provider condition code, if the code is known.
pub fn category_for(code: u32) -> Option<Category> {
    CONDITION_TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| CONDITION_TABLE[idx].1)
}

/// All known condition codes, ascending.
pub fn known_codes() -> impl Iterator<Item = u32> {
    CONDITION_TABLE.iter().map(|(code, _)| *code)
}

/// Derives the icon name (e.g. `day-clear`) for a condition record.
///
/// Unknown or missing codes resolve to `unknown`. The day/night prefix follows
/// the last character of the icon selector and defaults to day when the
/// selector is missing or empty.
pub fn resolve_icon(condition: &ConditionRecord) -> String {
    let Some(category) = condition.id.and_then(category_for) else {
        return UNKNOWN_ICON.to_string();
    };

    let is_daytime = match condition.icon.as_deref() {
        Some(selector) if !selector.is_empty() => selector.ends_with('d'),
        _ => true,
    };
    let prefix = if is_daytime { DAY_PREFIX } else { NIGHT_PREFIX };

    format!("{prefix}{category}")
}

/// SVG file name of the bundled icon, e.g. `day-clear.svg`.
pub fn icon_file_name(condition: &ConditionRecord) -> String {
    format!("{}.svg", resolve_icon(condition))
}

/// Provider-hosted PNG for the raw icon selector.
pub fn provider_icon_url(selector: &str) -> String {
    format!("https://openweathermap.org/img/wn/{selector}@2x.png")
}
