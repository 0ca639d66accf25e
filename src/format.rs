use time::OffsetDateTime;

const MINUTE_MS: i128 = 60 * 1000;
const HOUR_MS: i128 = 60 * MINUTE_MS;
const DAY_MS: i128 = 24 * HOUR_MS;

pub const DEFAULT_WEATHER_ICON: &str = "cloud";

pub fn format_relative_time(then: OffsetDateTime) -> String {
    format_relative_time_at(then, OffsetDateTime::now_utc())
}

/// Buckets are computed by integer division of the elapsed milliseconds, so
/// 59s is still "Just now" and 3599s is "59 minutes ago".
pub fn format_relative_time_at(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed_ms = (now - then).whole_milliseconds();
    let minutes = elapsed_ms / MINUTE_MS;
    let hours = elapsed_ms / HOUR_MS;
    let days = elapsed_ms / DAY_MS;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minutes ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else {
        format!("{days} days ago")
    }
}

pub fn abbreviate_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

pub fn weather_icon_key(condition: &str) -> &'static str {
    match condition.trim().to_ascii_lowercase().as_str() {
        "clear" | "sunny" => "sun",
        "partly cloudy" | "partly-cloudy" => "cloud-sun",
        "cloudy" | "clouds" | "overcast" => "cloud",
        "rain" | "rainy" | "drizzle" | "showers" => "cloud-rain",
        "thunderstorm" | "storm" | "stormy" => "bolt",
        "snow" | "snowy" | "sleet" => "snowflake",
        "fog" | "foggy" | "mist" | "haze" => "smog",
        "wind" | "windy" => "wind",
        _ => DEFAULT_WEATHER_ICON,
    }
}
