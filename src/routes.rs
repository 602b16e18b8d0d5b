use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::{
    config::Config,
    forecast::ForecastFetcher,
    render::{render_error, render_widget, UiLanguage, WidgetError, WidgetView},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<ForecastFetcher>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &WidgetError, language: UiLanguage) -> Self {
        Self {
            error: error.user_message(language),
            code: error.code().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub status: String,
}

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fetch (or reuse) the forecast and aggregate it for display.
pub async fn load_view(state: &AppState) -> Result<WidgetView, WidgetError> {
    let request = state
        .config
        .fetch_request()
        .ok_or(WidgetError::ConfigMissing)?;

    let forecast = state.fetcher.fetch(&request).await?;
    WidgetView::build(&forecast, &state.config, Utc::now())
}

pub async fn get_widget(State(state): State<AppState>) -> Response {
    let language = UiLanguage::from_tag(&state.config.language);
    match load_view(&state).await {
        Ok(view) => Html(render_widget(&view, &state.config.style, language)).into_response(),
        Err(e) => {
            tracing::error!("Widget render failed: {}", e);
            (e.status_code(), Html(render_error(&e, language))).into_response()
        }
    }
}

pub async fn get_forecast(
    State(state): State<AppState>,
) -> Result<Json<WidgetView>, (StatusCode, Json<ErrorResponse>)> {
    match load_view(&state).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            tracing::error!("Forecast request failed: {}", e);
            let language = UiLanguage::from_tag(&state.config.language);
            Err((e.status_code(), Json(ErrorResponse::new(&e, language))))
        }
    }
}

pub async fn clear_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CacheClearedResponse>, StatusCode> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        tracing::warn!("Cache clear refused: no ADMIN_TOKEN configured");
        return Err(StatusCode::FORBIDDEN);
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if tokens_match(token, expected) => {
            state.fetcher.clear_cache().await;
            Ok(Json(CacheClearedResponse {
                status: "cleared".to_string(),
            }))
        }
        Some(_) => {
            tracing::warn!("Cache clear refused: wrong admin token");
            Err(StatusCode::FORBIDDEN)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/widget", get(get_widget))
        .route("/forecast", get(get_forecast))
        .route("/admin/cache/clear", post(clear_cache))
        .with_state(state)
}
