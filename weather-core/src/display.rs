//! Turning a snapshot into status text.

use crate::model::{DisplayMode, Status, StatusKind, WeatherSnapshot};

/// Tooltip for every state that has no weather description.
pub const APP_TOOLTIP: &str = "Instant Weather";

/// Glyph for icon codes missing from [`ICONS`].
pub const UNKNOWN_ICON: &str = "🌡️";

const ICONS: [(&str, &str); 18] = [
    ("01d", "☀️"),
    ("01n", "🌙"),
    ("02d", "⛅"),
    ("02n", "⛅"),
    ("03d", "☁️"),
    ("03n", "☁️"),
    ("04d", "☁️"),
    ("04n", "☁️"),
    ("09d", "☔️"),
    ("09n", "☔️"),
    ("10d", "☔️"),
    ("10n", "☔️"),
    ("11d", "⚡️"),
    ("11n", "⚡️"),
    ("13d", "❄️"),
    ("13n", "❄️"),
    ("50d", "🌫"),
    ("50n", "🌫"),
];

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Emoji for an OpenWeather icon code.
pub fn icon(code: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(UNKNOWN_ICON)
}

/// One of 8 compass points for a wind bearing in degrees.
pub fn compass(deg: f64) -> &'static str {
    let sector = ((deg + 22.5).rem_euclid(360.0) / 45.0).floor() as usize;
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    COMPASS[sector % COMPASS.len()]
}

/// Round half towards positive infinity, so `-0.5` becomes `0` and `2.5`
/// becomes `3`.
fn round_half_up(value: f64) -> i64 {
    // `f64::round` breaks ties away from zero; only negative ties differ.
    let rounded = value.round();
    if value - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

fn mode_text(mode: DisplayMode, snapshot: &WeatherSnapshot) -> String {
    match mode {
        DisplayMode::Temperature => {
            let celsius = snapshot.temperature_c;
            format!(
                "{}℃/{}℉",
                round_half_up(celsius),
                round_half_up(celsius * 1.8 + 32.0)
            )
        }
        DisplayMode::Humidity => format!("{}%", snapshot.humidity_pct),
        DisplayMode::Wind => format!(
            "{}m/s {}",
            snapshot.wind_speed_mps,
            compass(snapshot.wind_deg)
        ),
        DisplayMode::Location => format!("{}, {}", snapshot.location_name, snapshot.country),
    }
}

/// Status line for a snapshot in the given mode. The tooltip is always the
/// weather description.
pub fn render(mode: DisplayMode, snapshot: &WeatherSnapshot) -> Status {
    Status {
        text: format!("{} {}", icon(&snapshot.icon), mode_text(mode, snapshot)),
        tooltip: snapshot.description.clone(),
        kind: StatusKind::Weather,
    }
}

/// Shown while location or API key is missing.
pub fn unconfigured() -> Status {
    Status {
        text: "🌈 Set location and API Key".to_string(),
        tooltip: APP_TOOLTIP.to_string(),
        kind: StatusKind::Unconfigured,
    }
}

/// Shown after a failed fetch.
pub fn unavailable() -> Status {
    Status {
        text: "🌏 Weather Unavailable".to_string(),
        tooltip: APP_TOOLTIP.to_string(),
        kind: StatusKind::Unavailable,
    }
}
