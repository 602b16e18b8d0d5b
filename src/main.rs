use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod forecast;
mod icons;
mod render;
mod routes;
mod utils;

use config::Config;
use forecast::{openweather::OpenWeatherClient, ForecastFetcher, ForecastStore};
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_widget_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    if config.openweather_api_key.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set, the widget will ask for configuration");
    }
    tracing::info!(
        "Forecast for {:.3}, {:.3} ({} days, cache {} min, zone {})",
        config.latitude,
        config.longitude,
        config.forecast_days,
        config.cache_duration_minutes,
        config.timezone
    );

    let client = OpenWeatherClient::new(&config)?;
    let fetcher = Arc::new(ForecastFetcher::new(client, ForecastStore::new()));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        fetcher,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
