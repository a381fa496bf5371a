//! Common logging and telemetry initializer
//!
//! The OpenTelemetry exporter is only available with the `telemetry` feature.

use std::path::PathBuf;

use eyre::Result;
use tracing::trace;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

#[cfg(feature = "telemetry")]
static PROVIDER: std::sync::OnceLock<opentelemetry_sdk::trace::SdkTracerProvider> =
    std::sync::OnceLock::new();

#[tracing::instrument]
pub fn init_logging(
    name: &'static str,
    use_telemetry: bool,
    use_tree: bool,
    use_file: Option<PathBuf>,
) -> Result<()> {
    // Initialise logging early
    //
    // Load filters from environment
    //
    let filter = EnvFilter::from_default_env();

    // Do we want hierarchical output?
    //
    let tree = if use_tree {
        Some(
            HierarchicalLayer::new(2)
                .with_ansi(true)
                .with_span_retrace(true)
                .with_span_modes(true)
                .with_targets(true)
                .with_verbose_entry(true)
                .with_verbose_exit(true)
                .with_bracketed_fields(true),
        )
    } else {
        None
    };

    // Log to file?
    //
    let file = use_file.map(|dir| {
        // Basic append-only rolling file for all traces.
        //
        let file_appender = tracing_appender::rolling::hourly(dir, name);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
    });

    // Combine filters & exporters
    //
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(file);

    #[cfg(feature = "telemetry")]
    {
        use opentelemetry::trace::TracerProvider;

        let otlp = if use_telemetry {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .build()?;
            let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .build();
            let tracer = provider.tracer(name);
            let _ = PROVIDER.set(provider);
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        } else {
            None
        };
        registry.with(otlp).try_init()?;
    }

    #[cfg(not(feature = "telemetry"))]
    {
        registry.try_init()?;
        if use_telemetry {
            tracing::warn!("{name}: built without the telemetry feature, ignoring.");
        }
    }

    trace!("Logging initialised.");
    Ok(())
}

#[tracing::instrument]
pub fn close_logging() {
    #[cfg(feature = "telemetry")]
    {
        if let Some(provider) = PROVIDER.get() {
            let _ = provider.shutdown();
        }
    }
    trace!("Logging closed.");
}
