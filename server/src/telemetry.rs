//! Logging, OpenTelemetry export and per-request database query counting.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_SERVICE_NAME: &str = "eatinn-server";

tokio::task_local! {
    /// Task-local counter for database queries in the current request.
    /// This follows the async task across await points and thread migrations.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are sent
/// to the collector. Otherwise, only console logging is used.
pub fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return;
    };

    if !collector_reachable(&endpoint) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return;
    }

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.clone())
        .build();

    let exporters = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .and_then(|spans| {
            opentelemetry_otlp::LogExporter::builder()
                .with_tonic()
                .with_endpoint(&endpoint)
                .build()
                .map(|logs| (spans, logs))
        });

    let (trace_exporter, log_exporter) = match exporters {
        Ok(exporters) => exporters,
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
            tracing::warn!(error = %e, "failed to create OTLP exporters, using console logging only");
            return;
        }
    };

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();
    let tracer = trace_provider.tracer(DEFAULT_SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(trace_provider);
    let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();
    let otel_log_layer = OpenTelemetryTracingBridge::new(&log_provider);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    tracing::info!(
        "OpenTelemetry enabled, exporting traces and logs to {} as {}",
        endpoint,
        service_name
    );
}

/// Quick TCP check to see if the collector is up.
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

/// Counts one statement against the current request, if there is one.
pub fn record_db_query() {
    let _ = DB_QUERY_COUNTER.try_with(|counter| {
        counter.fetch_add(1, Ordering::Relaxed);
    });
}

/// Get the current database query count for this request, if available.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// Runs blocking work on the blocking pool, keeping the request's query
/// counter in scope.
pub async fn run_blocking<T, F>(f: F) -> Result<T, tokio::task::JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let counter = DB_QUERY_COUNTER.try_with(Arc::clone).ok();
    tokio::task::spawn_blocking(move || match counter {
        Some(counter) => DB_QUERY_COUNTER.sync_scope(counter, f),
        None => f(),
    })
    .await
}

/// Middleware that initializes the per-request database query counter.
///
/// This must be added to the router AFTER the TraceLayer (so it runs BEFORE
/// the trace span is created, wrapping the entire request lifecycle).
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Middleware that adds X-DB-Query-Count header to responses.
/// Only enabled when TRACK_DB_QUERY_COUNT=1 environment variable is set.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if env::var("TRACK_DB_QUERY_COUNT")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        if let Some(count) = get_query_count() {
            if let Ok(value) = axum::http::header::HeaderValue::from_str(&count.to_string()) {
                response.headers_mut().insert("X-DB-Query-Count", value);
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queries_are_counted_inside_scope() {
        let counter = Arc::new(AtomicU32::new(0));
        let count = DB_QUERY_COUNTER
            .scope(counter, async {
                record_db_query();
                record_db_query();
                get_query_count()
            })
            .await;
        assert_eq!(count, Some(2));
    }

    #[tokio::test]
    async fn test_counter_follows_blocking_work() {
        let counter = Arc::new(AtomicU32::new(0));
        let count = DB_QUERY_COUNTER
            .scope(counter, async {
                run_blocking(record_db_query).await.unwrap();
                get_query_count()
            })
            .await;
        assert_eq!(count, Some(1));
    }

    #[test]
    fn test_recording_outside_a_request_is_a_no_op() {
        record_db_query();
        assert_eq!(get_query_count(), None);
    }

    #[test]
    fn test_unreachable_collector() {
        assert!(!collector_reachable("http://127.0.0.1:1"));
        assert!(!collector_reachable("not a host"));
    }
}
