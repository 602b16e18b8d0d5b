use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::utils::{is_hex_color, parse_timezone, validate_coordinates};

pub const DEFAULT_LATITUDE: f64 = 53.822;
pub const DEFAULT_LONGITUDE: f64 = 12.788;
pub const DEFAULT_FORECAST_DAYS: u8 = 3;
pub const DEFAULT_CACHE_MINUTES: u32 = 30;
pub const MAX_FORECAST_DAYS: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Normal,
    Large,
}

impl FromStr for FontSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "normal" => Ok(Self::Normal),
            "large" => Ok(Self::Large),
            _ => Err(()),
        }
    }
}

impl FontSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Normal => "normal",
            Self::Large => "large",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardWidth {
    Auto,
    Small,
    Medium,
    Large,
}

impl FromStr for CardWidth {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(()),
        }
    }
}

impl CardWidth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconStyle {
    Light,
    Normal,
    Dark,
}

impl FromStr for IconStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "normal" => Ok(Self::Normal),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

impl IconStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Normal => "normal",
            Self::Dark => "dark",
        }
    }
}

/// Cosmetic settings; never read by the aggregation code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StyleConfig {
    pub text_color: String,
    pub bg_color: String,
    pub accent_color: String,
    pub font_size: FontSize,
    pub card_width: CardWidth,
    pub icon_style: IconStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            text_color: "#333333".to_string(),
            bg_color: "#ffffff".to_string(),
            accent_color: "#f7971e".to_string(),
            font_size: FontSize::Small,
            card_width: CardWidth::Medium,
            icon_style: IconStyle::Normal,
        }
    }
}

/// Input of a single forecast fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub cache_duration_minutes: u32,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub openweather_forecast_path: String,
    pub language: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub forecast_days: u8,
    pub cache_duration_minutes: u32,
    pub timezone: Tz,
    pub admin_token: Option<String>,
    pub bind_addr: String,
    pub style: StyleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            language: "de".to_string(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            location_name: None,
            forecast_days: DEFAULT_FORECAST_DAYS,
            cache_duration_minutes: DEFAULT_CACHE_MINUTES,
            timezone: chrono_tz::Europe::Berlin,
            admin_token: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            style: StyleConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from a key lookup. Values that fail validation
    /// fall back to their defaults with a warning instead of aborting startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let latitude = checked_or_default(
            parse_or_default(get("WEATHER_LATITUDE"), "WEATHER_LATITUDE", defaults.latitude),
            |lat| validate_coordinates(lat, 0.0).is_ok(),
            "WEATHER_LATITUDE",
            defaults.latitude,
        );
        let longitude = checked_or_default(
            parse_or_default(get("WEATHER_LONGITUDE"), "WEATHER_LONGITUDE", defaults.longitude),
            |lon| validate_coordinates(0.0, lon).is_ok(),
            "WEATHER_LONGITUDE",
            defaults.longitude,
        );
        let forecast_days = checked_or_default(
            parse_or_default(
                get("WEATHER_FORECAST_DAYS"),
                "WEATHER_FORECAST_DAYS",
                defaults.forecast_days,
            ),
            |days| (1..=MAX_FORECAST_DAYS).contains(&days),
            "WEATHER_FORECAST_DAYS",
            defaults.forecast_days,
        );
        let cache_duration_minutes = checked_or_default(
            parse_or_default(
                get("WEATHER_CACHE_MINUTES"),
                "WEATHER_CACHE_MINUTES",
                defaults.cache_duration_minutes,
            ),
            |minutes| (5..=1440).contains(&minutes),
            "WEATHER_CACHE_MINUTES",
            defaults.cache_duration_minutes,
        );

        let timezone = match get("APP_TIMEZONE") {
            Some(name) => parse_timezone(&name).unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {}", e, defaults.timezone);
                defaults.timezone
            }),
            None => defaults.timezone,
        };

        let style = StyleConfig {
            text_color: color_or_default(
                get("WEATHER_TEXT_COLOR"),
                "WEATHER_TEXT_COLOR",
                &defaults.style.text_color,
            ),
            bg_color: color_or_default(
                get("WEATHER_BG_COLOR"),
                "WEATHER_BG_COLOR",
                &defaults.style.bg_color,
            ),
            accent_color: color_or_default(
                get("WEATHER_ACCENT_COLOR"),
                "WEATHER_ACCENT_COLOR",
                &defaults.style.accent_color,
            ),
            font_size: parse_or_default(
                get("WEATHER_FONT_SIZE"),
                "WEATHER_FONT_SIZE",
                defaults.style.font_size,
            ),
            card_width: parse_or_default(
                get("WEATHER_CARD_WIDTH"),
                "WEATHER_CARD_WIDTH",
                defaults.style.card_width,
            ),
            icon_style: parse_or_default(
                get("WEATHER_ICON_STYLE"),
                "WEATHER_ICON_STYLE",
                defaults.style.icon_style,
            ),
        };

        Config {
            openweather_api_key: get("OPENWEATHER_API_KEY"),
            openweather_base_url: get("OPENWEATHER_BASE_URL")
                .unwrap_or(defaults.openweather_base_url),
            openweather_forecast_path: get("OPENWEATHER_FORECAST_PATH")
                .unwrap_or(defaults.openweather_forecast_path),
            language: get("OPENWEATHER_LANG").unwrap_or(defaults.language),
            latitude,
            longitude,
            location_name: get("WEATHER_LOCATION_NAME"),
            forecast_days,
            cache_duration_minutes,
            timezone,
            admin_token: get("ADMIN_TOKEN"),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            style,
        }
    }

    /// Fetch parameters, or `None` when no API key is configured.
    pub fn fetch_request(&self) -> Option<FetchRequest> {
        let api_key = self.openweather_api_key.as_ref()?;
        Some(FetchRequest {
            api_key: api_key.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            cache_duration_minutes: self.cache_duration_minutes,
        })
    }
}

fn parse_or_default<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using default", value, key);
            default
        }),
        None => default,
    }
}

fn checked_or_default<T: Copy + std::fmt::Debug>(
    value: T,
    valid: impl Fn(T) -> bool,
    key: &str,
    default: T,
) -> T {
    if valid(value) {
        value
    } else {
        tracing::warn!("{} out of range ({:?}), using default", key, value);
        default
    }
}

fn color_or_default(raw: Option<String>, key: &str, default: &str) -> String {
    match raw {
        Some(color) if is_hex_color(&color) => color,
        Some(color) => {
            tracing::warn!("Invalid color {:?} for {}, using default", color, key);
            default.to_string()
        }
        None => default.to_string(),
    }
}
