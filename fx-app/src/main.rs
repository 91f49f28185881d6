//! # FX Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the rate store adapter and the rate provider
//! - Create the rate cache and the conversion service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_hex::{ConversionService, RateCache, inbound::HttpServer};
use fx_repo::{FixedRateProvider, HttpRateProvider, build_repo};
use fx_types::RateProvider;

use config::{Config, ProviderConfig};

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fx-service"), provider))
}

fn build_provider(config: &ProviderConfig) -> Arc<dyn RateProvider> {
    match config {
        ProviderConfig::Fixed => Arc::new(FixedRateProvider::new()),
        ProviderConfig::Http { url, api_key } => {
            Arc::new(HttpRateProvider::new(url.clone(), api_key.clone()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize OpenTelemetry tracing when an OTLP collector is configured
    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fx_app=debug,fx_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting FX server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);

    // Build repository (handles connection, migration and seeding)
    let repo = build_repo(&config.database_url).await?;
    tracing::info!(backend = repo.backend(), "Rate store ready");

    let provider = build_provider(&config.provider);
    tracing::info!(
        provider = provider.id(),
        ttl_secs = config.cache.ttl.as_secs(),
        fetch_timeout_ms = config.cache.fetch_timeout.as_millis() as u64,
        stale_policy = ?config.cache.stale_policy,
        "Rate cache configured"
    );
    let cache = RateCache::new(provider, config.cache);

    // Create the conversion service
    let service =
        ConversionService::new(repo, cache).with_convert_deadline(config.convert_deadline);

    // Create and run the HTTP server
    let server = HttpServer::with_rate_limit(service, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
