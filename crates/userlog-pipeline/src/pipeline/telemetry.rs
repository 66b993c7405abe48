//! # Telemetry Features
//!
//! Structured logs are always on: every pipeline event goes through `tracing`
//! and is printed by a `tracing_subscriber::fmt` layer filtered by `RUST_LOG`
//! (default `info`).
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry metrics (counters and histograms for
//!   submitted jobs, generated users and written reports).
//! - `stdout`: Enables the stdout OpenTelemetry exporter.
//!
//! ## Feature constraints
//!
//! - `stdout` requires `metrics`.
//!
//! ## Metrics behavior
//!
//! - Metric helpers compile to no-ops when `metrics` is disabled, so call sites
//!   never need their own `cfg` gates.
//!
//! ## Example usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --features metrics,stdout -- --num-jobs 5
//! ```

// Disallow using `stdout` without `metrics`
#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires 'metrics' to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down every provider. Failures are reported on stderr
    /// since the subscriber may already be gone.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        );

    #[cfg(feature = "metrics")]
    let registry = {
        let scope = InstrumentationScope::builder("userlog")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);

        registry.with(tracing_opentelemetry::MetricsLayer::new(
            meter_provider.clone(),
        ))
    };

    registry.try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("userlog")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "metrics")]
static JOBS_SUBMITTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static USERS_GENERATED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REPORTS_WRITTEN: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static RUN_FAILURES: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static LOG_ENTRIES_PER_USER: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REPORT_WRITE_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = JOBS_SUBMITTED.set(
        meter
            .u64_counter("jobs_submitted")
            .with_description("Jobs enqueued by the job source")
            .build(),
    );

    let _ = USERS_GENERATED.set(
        meter
            .u64_counter("users_generated")
            .with_description("User records produced by the generation pool")
            .build(),
    );

    let _ = REPORTS_WRITTEN.set(
        meter
            .u64_counter("reports_written")
            .with_description("Reports persisted by the persistence pool")
            .build(),
    );

    let _ = RUN_FAILURES.set(
        meter
            .u64_counter("run_failures")
            .with_description("Runs aborted by an error or cancellation")
            .build(),
    );

    let _ = LOG_ENTRIES_PER_USER.set(
        meter
            .f64_histogram("log_entries_per_user")
            .with_description("Synthesized log length per user")
            .build(),
    );

    let _ = REPORT_WRITE_DURATION_MS.set(
        meter
            .f64_histogram("report_write_duration")
            .with_unit("ms")
            .with_description("Time to create, write and sync one report")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_jobs_submitted() {
    if let Some(counter) = JOBS_SUBMITTED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_jobs_submitted() {}

#[cfg(feature = "metrics")]
pub fn increment_users_generated() {
    if let Some(counter) = USERS_GENERATED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_users_generated() {}

#[cfg(feature = "metrics")]
pub fn increment_reports_written() {
    if let Some(counter) = REPORTS_WRITTEN.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_reports_written() {}

#[cfg(feature = "metrics")]
pub fn increment_run_failures() {
    if let Some(counter) = RUN_FAILURES.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_run_failures() {}

#[cfg(feature = "metrics")]
pub fn record_log_entries(count: f64) {
    if let Some(histogram) = LOG_ENTRIES_PER_USER.get() {
        histogram.record(count, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_log_entries(_count: f64) {}

#[cfg(feature = "metrics")]
pub fn record_write_duration(duration_ms: f64) {
    if let Some(histogram) = REPORT_WRITE_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_write_duration(_duration_ms: f64) {}
