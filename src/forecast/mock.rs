//! Deterministic forecast fixtures for tests.

use super::types::*;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde_json::{json, Value};

/// Zone the fixtures express local hours in.
pub const FIXTURE_TZ: chrono_tz::Tz = chrono_tz::Europe::Berlin;

/// Unix timestamp of `hour`:00 local time on `date` in [`FIXTURE_TZ`].
pub fn ts(date: NaiveDate, hour: u32) -> i64 {
    let local = date.and_hms_opt(hour, 0, 0).unwrap_or_default();
    FIXTURE_TZ
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_default()
}

pub fn entry(timestamp: i64, temp: f64, temp_min: f64, temp_max: f64) -> RawForecastEntry {
    entry_with(
        timestamp,
        temp,
        temp_min,
        temp_max,
        Condition::Clouds,
        "Bedeckt",
        "04d",
    )
}

pub fn entry_with(
    timestamp: i64,
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    condition: Condition,
    description: &str,
    icon_code: &str,
) -> RawForecastEntry {
    RawForecastEntry {
        timestamp,
        temp_current: temp,
        temp_min,
        temp_max,
        condition,
        description: description.to_string(),
        icon_code: icon_code.to_string(),
    }
}

pub fn forecast_of(entries: Vec<RawForecastEntry>) -> RawForecast {
    RawForecast {
        entries,
        location_name: Some("Teterow".to_string()),
    }
}

/// OpenWeather 3-hour forecast body with `count` items starting at `start`.
/// Every eighth slot is rainy, the rest clear; temperatures follow a simple
/// diurnal curve.
pub fn forecast3h_body(start: DateTime<Utc>, count: usize) -> Value {
    let list: Vec<Value> = (0..count)
        .map(|i| {
            let target_time = start + Duration::hours(3 * i as i64);
            let hour = target_time.with_timezone(&FIXTURE_TZ).hour();
            let is_day = (6..18).contains(&hour);
            let rainy = i % 8 == 0;

            let base_temp = 12.0 + 4.0 * ((hour as f64 - 9.0) * std::f64::consts::PI / 12.0).sin();
            let (main, description, icon) = if rainy {
                ("Rain", "leichter Regen", if is_day { "10d" } else { "10n" })
            } else {
                ("Clear", "klarer Himmel", if is_day { "01d" } else { "01n" })
            };

            json!({
                "dt": target_time.timestamp(),
                "main": {
                    "temp": base_temp,
                    "feels_like": base_temp - 1.0,
                    "temp_min": base_temp - 1.5,
                    "temp_max": base_temp + 1.5,
                    "pressure": 1013,
                    "humidity": 70
                },
                "weather": [{
                    "id": if rainy { 500 } else { 800 },
                    "main": main,
                    "description": description,
                    "icon": icon
                }],
                "clouds": { "all": if rainy { 90 } else { 5 } },
                "wind": { "speed": 3.4, "deg": 240 },
                "pop": if rainy { 0.6 } else { 0.0 },
                "sys": { "pod": if is_day { "d" } else { "n" } },
                "dt_txt": target_time.format("%Y-%m-%d %H:%M:%S").to_string()
            })
        })
        .collect();

    json!({
        "cod": "200",
        "message": 0,
        "cnt": list.len(),
        "list": list,
        "city": {
            "id": 2823368,
            "name": "Teterow",
            "coord": { "lat": 53.822, "lon": 12.788 },
            "country": "DE",
            "timezone": 7200,
            "sunrise": start.timestamp(),
            "sunset": start.timestamp() + 11 * 3600
        }
    })
}
