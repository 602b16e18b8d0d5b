use axum::http::StatusCode;
use chrono::{DateTime, Locale, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, IconStyle, StyleConfig};
use crate::forecast::{
    aggregate::{compute_current, compute_next_days},
    openweather::{ApiFailure, FetchError},
    types::{CurrentConditions, DayForecast, RawForecast},
};
use crate::icons::WeatherIcon;
use crate::utils::{capitalize_first, escape_html, round_temp};

/// Language of the card's own text. Descriptions come from the API in the
/// configured `lang`, so the labels follow the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiLanguage {
    German,
    English,
}

impl UiLanguage {
    pub fn from_tag(tag: &str) -> Self {
        if tag.to_ascii_lowercase().starts_with("de") {
            UiLanguage::German
        } else {
            UiLanguage::English
        }
    }

    fn locale(&self) -> Locale {
        match self {
            UiLanguage::German => Locale::de_DE,
            UiLanguage::English => Locale::en_US,
        }
    }

    fn long_date_format(&self) -> &'static str {
        match self {
            UiLanguage::German => "%A, %-d. %B",
            UiLanguage::English => "%A, %-d %B",
        }
    }

    fn unknown_location(&self) -> &'static str {
        match self {
            UiLanguage::German => "Unbekannter Ort",
            UiLanguage::English => "Unknown location",
        }
    }

    fn footer(&self, updated: &str) -> String {
        let source = r#"<a href="https://openweathermap.org/" target="_blank" rel="noopener">OpenWeatherMap</a>"#;
        match self {
            UiLanguage::German => {
                format!("Daten von {} • Aktualisiert: {} Uhr", source, updated)
            }
            UiLanguage::English => format!("Data from {} • Updated {}", source, updated),
        }
    }

    fn fetch_reason(&self, error: &FetchError) -> String {
        match (self, error) {
            (_, FetchError::ApiError(ApiFailure::Status(code))) => format!("HTTP {}", code),
            (UiLanguage::German, FetchError::ApiError(failure)) => match failure {
                ApiFailure::Timeout => "Zeitüberschreitung der Anfrage".to_string(),
                ApiFailure::Unreachable => "Wetterdienst nicht erreichbar".to_string(),
                _ => "Anfrage an den Wetterdienst fehlgeschlagen".to_string(),
            },
            (UiLanguage::English, FetchError::ApiError(failure)) => failure.to_string(),
            (UiLanguage::German, FetchError::ParseError(_)) => {
                "ungültige API-Antwort".to_string()
            }
            (UiLanguage::English, FetchError::ParseError(_)) => "invalid API response".to_string(),
            (UiLanguage::German, FetchError::InvalidCoordinates) => {
                "ungültige Koordinaten".to_string()
            }
            (UiLanguage::English, FetchError::InvalidCoordinates) => {
                "invalid coordinates".to_string()
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("no OpenWeather API key configured")]
    ConfigMissing,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("forecast contained no entries")]
    NoData,
}

impl WidgetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WidgetError::ConfigMissing => StatusCode::SERVICE_UNAVAILABLE,
            WidgetError::Fetch(_) => StatusCode::BAD_GATEWAY,
            WidgetError::NoData => StatusCode::OK,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WidgetError::ConfigMissing => "config_missing",
            WidgetError::Fetch(FetchError::ParseError(_)) => "parse_error",
            WidgetError::Fetch(_) => "api_error",
            WidgetError::NoData => "no_data",
        }
    }

    pub fn user_message(&self, language: UiLanguage) -> String {
        match (language, self) {
            (UiLanguage::German, WidgetError::ConfigMissing) => {
                "Bitte konfigurieren Sie den OpenWeatherMap API-Key.".to_string()
            }
            (UiLanguage::English, WidgetError::ConfigMissing) => {
                "Please configure the OpenWeatherMap API key.".to_string()
            }
            (UiLanguage::German, WidgetError::Fetch(e)) => format!(
                "Fehler beim Laden der Wetterdaten: {}",
                language.fetch_reason(e)
            ),
            (UiLanguage::English, WidgetError::Fetch(e)) => format!(
                "Could not load weather data: {}",
                language.fetch_reason(e)
            ),
            (UiLanguage::German, WidgetError::NoData) => {
                "Keine Wetterdaten verfügbar.".to_string()
            }
            (UiLanguage::English, WidgetError::NoData) => "No weather data available.".to_string(),
        }
    }
}

/// Everything the card shows, already aggregated.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetView {
    pub location_name: String,
    pub current: CurrentConditions,
    pub next_days: Vec<DayForecast>,
    pub generated_at: DateTime<Tz>,
}

impl WidgetView {
    pub fn build(
        forecast: &RawForecast,
        config: &Config,
        now: DateTime<Utc>,
    ) -> Result<Self, WidgetError> {
        let tz = config.timezone;
        let local_now = now.with_timezone(&tz);
        let today: NaiveDate = local_now.date_naive();

        let current = compute_current(forecast, today, &tz).ok_or(WidgetError::NoData)?;
        let next_days =
            compute_next_days(forecast, today, &tz, usize::from(config.forecast_days));

        Ok(Self {
            location_name: location_name(forecast, config),
            current,
            next_days,
            generated_at: local_now,
        })
    }
}

/// Configured override, then the provider's city name.
pub fn location_name(forecast: &RawForecast, config: &Config) -> String {
    config
        .location_name
        .clone()
        .or_else(|| forecast.location_name.clone())
        .unwrap_or_else(|| {
            UiLanguage::from_tag(&config.language)
                .unknown_location()
                .to_string()
        })
}

pub fn css_classes(style: &StyleConfig) -> String {
    let mut classes = vec![
        "weather-card".to_string(),
        format!("font-{}", style.font_size.as_str()),
        format!("width-{}", style.card_width.as_str()),
    ];
    if style.icon_style != IconStyle::Normal {
        classes.push(format!("icons-{}", style.icon_style.as_str()));
    }
    classes.join(" ")
}

pub fn css_vars(style: &StyleConfig) -> String {
    format!(
        ":root {{ --weather-text-color: {}; --weather-bg-color: {}; --weather-accent-color: {}; }}",
        style.text_color, style.bg_color, style.accent_color
    )
}

pub fn render_widget(view: &WidgetView, style: &StyleConfig, language: UiLanguage) -> String {
    let locale = language.locale();
    let tz = view.generated_at.timezone();
    let current = &view.current;
    let current_icon = WeatherIcon::classify(&current.condition, &current.icon_code);
    let current_time = DateTime::from_timestamp(current.timestamp, 0)
        .unwrap_or_default()
        .with_timezone(&tz);

    let mut output = format!("<style>{}</style>\n", css_vars(style));
    output.push_str(&format!(
        "<div class=\"{}\">\n",
        escape_html(&css_classes(style))
    ));

    output.push_str("  <div class=\"weather-today\">\n");
    output.push_str(&format!(
        "    <h2 class=\"weather-location\">{}</h2>\n",
        escape_html(&view.location_name.to_uppercase())
    ));
    output.push_str(&format!(
        "    <div class=\"weather-icon icon-{}\">{}</div>\n",
        current_icon.name(),
        current_icon.svg()
    ));
    output.push_str(&format!(
        "    <div class=\"weather-temp\">{}<span class=\"unit\">°C</span></div>\n",
        round_temp(current.temp)
    ));
    output.push_str(&format!(
        "    <div class=\"weather-description\">{}</div>\n",
        escape_html(&capitalize_first(&current.description))
    ));
    output.push_str(&format!(
        "    <div class=\"weather-meta\"><span class=\"date\">{}</span> <span class=\"temp-min\">{}°</span> / <span class=\"temp-max\">{}°</span></div>\n",
        current_time.format_localized(language.long_date_format(), locale),
        round_temp(current.temp_min),
        round_temp(current.temp_max)
    ));
    output.push_str("  </div>\n");

    if !view.next_days.is_empty() {
        output.push_str("  <div class=\"weather-next-days\">\n");
        for day in &view.next_days {
            let icon = WeatherIcon::classify(&day.condition, &day.icon_code);
            let day_time = DateTime::from_timestamp(day.timestamp, 0)
                .unwrap_or_default()
                .with_timezone(&tz);
            output.push_str(&format!(
                "    <div class=\"weather-day\"><div class=\"day-label\">{}</div><div class=\"day-date\">{}</div><div class=\"day-icon icon-{}\">{}</div><div class=\"day-temp\">{}° / {}°</div></div>\n",
                day_time.format_localized("%a", locale),
                day.date.format("%-d.%-m."),
                icon.name(),
                icon.svg(),
                round_temp(day.temp_min),
                round_temp(day.temp_max)
            ));
        }
        output.push_str("  </div>\n");
    }

    output.push_str(&format!(
        "  <div class=\"weather-footer\"><small>{}</small></div>\n",
        language.footer(&view.generated_at.format("%H:%M").to_string())
    ));
    output.push_str("</div>\n");

    output
}

pub fn render_error(error: &WidgetError, language: UiLanguage) -> String {
    let mut output = format!(
        "<div class=\"weather-error\">{}",
        escape_html(&error.user_message(language))
    );
    if matches!(error, WidgetError::ConfigMissing) {
        output.push_str(match language {
            UiLanguage::German => {
                "<br><small>OPENWEATHER_API_KEY setzen und den Dienst neu starten.</small>"
            }
            UiLanguage::English => {
                "<br><small>Set OPENWEATHER_API_KEY and restart the service.</small>"
            }
        });
    }
    output.push_str("</div>\n");
    output
}
