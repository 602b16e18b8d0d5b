use crate::forecast::types::Condition;

const CLOUD_PATH: &str = "M19.35 10.04A7.49 7.49 0 0 0 12 4C9.11 4 6.6 5.64 5.35 8.04A5.994 5.994 0 0 0 0 14c0 3.31 2.69 6 6 6h13c2.76 0 5-2.24 5-5 0-2.64-2.05-4.78-4.65-4.96z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    ClearDay,
    ClearNight,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Atmosphere,
    Fallback,
}

impl WeatherIcon {
    /// Night variants are picked when the provider icon code carries an `n`.
    pub fn classify(condition: &Condition, icon_code: &str) -> Self {
        let is_night = icon_code.contains('n');

        match condition {
            Condition::Clear if is_night => Self::ClearNight,
            Condition::Clear => Self::ClearDay,
            Condition::Clouds => Self::Clouds,
            Condition::Rain | Condition::Drizzle => Self::Rain,
            Condition::Snow => Self::Snow,
            Condition::Thunderstorm => Self::Thunderstorm,
            Condition::Mist
            | Condition::Fog
            | Condition::Haze
            | Condition::Smoke
            | Condition::Dust => Self::Atmosphere,
            Condition::Other(_) => Self::Fallback,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearDay => "clear-day",
            Self::ClearNight => "clear-night",
            Self::Clouds => "clouds",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorm",
            Self::Atmosphere => "atmosphere",
            Self::Fallback => "cloud",
        }
    }

    pub fn svg(&self) -> String {
        match self {
            Self::ClearNight => {
                r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M21 12.79A9 9 0 1 1 11.21 3 7 7 0 0 0 21 12.79z"/></svg>"#.to_string()
            }
            Self::ClearDay => concat!(
                r#"<svg viewBox="0 0 24 24" fill="currentColor" stroke="currentColor" stroke-width="0.5">"#,
                r#"<circle cx="12" cy="12" r="4"/>"#,
                r#"<line x1="12" y1="1" x2="12" y2="3"/><line x1="12" y1="21" x2="12" y2="23"/>"#,
                r#"<line x1="4.22" y1="4.22" x2="5.64" y2="5.64"/><line x1="18.36" y1="18.36" x2="19.78" y2="19.78"/>"#,
                r#"<line x1="1" y1="12" x2="3" y2="12"/><line x1="21" y1="12" x2="23" y2="12"/>"#,
                r#"<line x1="4.22" y1="19.78" x2="5.64" y2="18.36"/><line x1="18.36" y1="5.64" x2="19.78" y2="4.22"/>"#,
                "</svg>"
            )
            .to_string(),
            Self::Clouds | Self::Fallback => format!(
                r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="{}"/></svg>"#,
                CLOUD_PATH
            ),
            Self::Rain => format!(
                concat!(
                    r#"<svg viewBox="0 0 24 24" fill="currentColor" stroke="currentColor" stroke-width="1.5">"#,
                    r#"<path stroke="none" d="{}"/>"#,
                    r#"<line x1="8" y1="19" x2="8" y2="21"/><line x1="11" y1="19" x2="11" y2="21"/><line x1="14" y1="19" x2="14" y2="21"/>"#,
                    "</svg>"
                ),
                CLOUD_PATH
            ),
            Self::Snow => format!(
                concat!(
                    r#"<svg viewBox="0 0 24 24" fill="currentColor" stroke="currentColor" stroke-width="1">"#,
                    r#"<path stroke="none" d="{}"/>"#,
                    r#"<circle cx="8" cy="19" r="0.5"/><circle cx="11" cy="19" r="0.5"/><circle cx="14" cy="19" r="0.5"/>"#,
                    r#"<circle cx="9.5" cy="21" r="0.5"/><circle cx="12.5" cy="21" r="0.5"/>"#,
                    "</svg>"
                ),
                CLOUD_PATH
            ),
            Self::Thunderstorm => format!(
                concat!(
                    r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="{}"/>"#,
                    r##"<path fill="#FFD700" d="M14 13h-3l2 5v-3h2l-2-5v3z"/>"##,
                    "</svg>"
                ),
                CLOUD_PATH
            ),
            Self::Atmosphere => concat!(
                r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round">"#,
                r#"<line x1="3" y1="9" x2="21" y2="9"/><line x1="3" y1="13" x2="21" y2="13"/><line x1="3" y1="17" x2="21" y2="17"/>"#,
                "</svg>"
            )
            .to_string(),
        }
    }
}
