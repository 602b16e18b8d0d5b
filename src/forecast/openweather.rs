use super::types::*;
use crate::config::Config;
use std::time::Duration;
use thiserror::Error;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a request to the weather API produced no usable response. Carries no
/// text from the HTTP client, whose errors embed the request URL and with it
/// the API key.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFailure {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request timed out after {}s", REQUEST_TIMEOUT.as_secs())]
    Timeout,
    #[error("connection to weather API failed")]
    Unreachable,
    #[error("request to weather API failed")]
    RequestFailed,
    #[error("HTTP client setup failed")]
    ClientSetup,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API error: {0}")]
    ApiError(ApiFailure),
    #[error("invalid API response: {0}")]
    ParseError(String),
    #[error("Invalid coordinates")]
    InvalidCoordinates,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    forecast_url: String,
    language: String,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        // TLS verification stays at reqwest's default (on).
        let client = reqwest::Client::builder()
            .user_agent(concat!("ForecastWidget/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("HTTP client setup failed: {}", e);
                FetchError::ApiError(ApiFailure::ClientSetup)
            })?;

        Ok(Self {
            client,
            forecast_url: format!(
                "{}{}",
                config.openweather_base_url, config.openweather_forecast_path
            ),
            language: config.language.clone(),
        })
    }

    /// One GET against the 3-hour forecast endpoint. No retries.
    pub async fn get_forecast3h(
        &self,
        api_key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<RawForecast, FetchError> {
        if !self.is_valid_coordinates(lat, lon) {
            return Err(FetchError::InvalidCoordinates);
        }

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("units", "metric"),
                ("lang", self.language.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ApiError(ApiFailure::Status(status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(transport_failure)?;

        let forecast: Forecast3hResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::ParseError(e.to_string()))?;

        RawForecast::try_from(forecast)
    }

    fn is_valid_coordinates(&self, lat: f64, lon: f64) -> bool {
        crate::utils::validate_coordinates(lat, lon).is_ok()
    }
}

fn transport_failure(error: reqwest::Error) -> FetchError {
    // The URL holds the `appid` query parameter.
    let error = error.without_url();
    tracing::warn!("Weather API request failed: {}", error);

    let failure = if error.is_timeout() {
        ApiFailure::Timeout
    } else if error.is_connect() {
        ApiFailure::Unreachable
    } else {
        ApiFailure::RequestFailed
    };
    FetchError::ApiError(failure)
}

// Convert OpenWeather data to internal format
impl TryFrom<&Forecast3hItem> for RawForecastEntry {
    type Error = FetchError;

    fn try_from(item: &Forecast3hItem) -> Result<Self, Self::Error> {
        let weather = item.weather.first().ok_or_else(|| {
            FetchError::ParseError(format!("entry {} has no weather condition", item.dt))
        })?;

        Ok(Self {
            timestamp: item.dt,
            temp_current: item.main.temp,
            temp_min: item.main.temp_min,
            temp_max: item.main.temp_max,
            condition: Condition::from(weather.main.as_str()),
            description: weather.description.clone(),
            icon_code: weather.icon.clone(),
        })
    }
}

impl TryFrom<Forecast3hResponse> for RawForecast {
    type Error = FetchError;

    fn try_from(response: Forecast3hResponse) -> Result<Self, Self::Error> {
        let entries = response
            .list
            .iter()
            .map(RawForecastEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entries,
            location_name: response
                .city
                .and_then(|city| city.name)
                .filter(|name| !name.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::mock::forecast3h_body;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        let config = Config {
            openweather_base_url: server.uri(),
            ..Config::default()
        };
        OpenWeatherClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_forecast3h_sends_query_and_parses_entries() {
        let server = MockServer::start().await;
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("lat", "53.822"))
            .and(query_param("lon", "12.788"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "de"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast3h_body(start, 16)))
            .expect(1)
            .mount(&server)
            .await;

        let forecast = client_for(&server)
            .get_forecast3h("test-key", 53.822, 12.788)
            .await
            .unwrap();

        assert_eq!(forecast.entries.len(), 16);
        assert_eq!(forecast.location_name.as_deref(), Some("Teterow"));
        assert_eq!(forecast.entries[0].timestamp, start.timestamp());
        assert_eq!(forecast.entries[0].condition, Condition::Rain);
        assert_eq!(forecast.entries[1].condition, Condition::Clear);
        assert!(forecast
            .entries
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_forecast3h("bad-key", 53.822, 12.788)
            .await
            .unwrap_err();

        match err {
            FetchError::ApiError(failure) => assert_eq!(failure, ApiFailure::Status(401)),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_list_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cod": "200",
                "city": { "name": "Teterow" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_forecast3h("test-key", 53.822, 12.788)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_forecast3h("test-key", 53.822, 12.788)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_entry_without_weather_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [{
                    "dt": 1_792_400_400,
                    "main": { "temp": 10.0, "temp_min": 9.0, "temp_max": 11.0 },
                    "weather": []
                }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_forecast3h("test-key", 53.822, 12.788)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "list": [] })),
            )
            .mount(&server)
            .await;

        let forecast = client_for(&server)
            .get_forecast3h("test-key", 53.822, 12.788)
            .await
            .unwrap();

        assert!(forecast.entries.is_empty());
        assert!(forecast.location_name.is_none());
    }

    #[tokio::test]
    async fn test_invalid_coordinates_skip_the_network() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_forecast3h("test-key", 95.0, 12.788)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidCoordinates));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_api_error() {
        let config = Config {
            openweather_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = OpenWeatherClient::new(&config).unwrap();

        let err = client
            .get_forecast3h("test-key", 53.822, 12.788)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_dropped_connection_does_not_expose_api_key() {
        use crate::render::{render_error, UiLanguage, WidgetError};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let config = Config {
            openweather_base_url: format!("http://{}", addr),
            ..Config::default()
        };
        let err = OpenWeatherClient::new(&config)
            .unwrap()
            .get_forecast3h("SECRET-KEY-123", 53.822, 12.788)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::ApiError(ApiFailure::RequestFailed | ApiFailure::Unreachable)
        ));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));

        let widget_error = WidgetError::Fetch(err);
        for language in [UiLanguage::German, UiLanguage::English] {
            let page = render_error(&widget_error, language);
            assert!(!page.contains("SECRET-KEY-123"));
            assert!(!page.contains("appid"));
        }
    }
}
