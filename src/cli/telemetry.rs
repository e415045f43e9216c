//! Log output and optional trace export.
//!
//! Logs always go to stderr through a `fmt` layer. Setting
//! `OTEL_EXPORTER_OTLP_ENDPOINT` additionally exports spans (the request spans
//! and the Gemini call) over OTLP/gRPC.

use crate::GIT_COMMIT_HASH;
use anyhow::{Context, Result};
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider, Resource};
use std::{env, sync::OnceLock, time::Duration};
use tonic::{
    metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;

const ENV_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const ENV_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";
const ENV_INSTANCE_ID: &str = "OTEL_SERVICE_INSTANCE_ID";
const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

// Connection-level chatter from the HTTP stacks on both sides of the service.
const QUIET_TARGETS: [&str; 5] = [
    "hyper=warn",
    "hyper_util=warn",
    "h2=warn",
    "reqwest=warn",
    "opentelemetry_sdk=warn",
];

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Where and how spans are shipped.
#[derive(Debug)]
struct Exporter {
    endpoint: String,
    tls_domain: Option<String>,
    metadata: MetadataMap,
}

impl Exporter {
    /// Build from the raw endpoint and `k=v,k=v` header list. An endpoint
    /// without scheme is taken as https. Pairs without `=` are skipped.
    fn from_parts(endpoint: &str, headers: Option<&str>) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };

        let tls_domain = endpoint
            .strip_prefix("https://")
            .and_then(|rest| rest.split(['/', ':']).next())
            .filter(|host| !host.is_empty())
            .map(str::to_string);

        let mut metadata = MetadataMap::new();
        for (key, value) in headers
            .unwrap_or_default()
            .split(',')
            .filter_map(|pair| pair.split_once('='))
        {
            let key = key.trim().to_ascii_lowercase();
            let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
                .with_context(|| format!("invalid exporter header name: {key}"))?;
            let value = MetadataValue::<Ascii>::try_from(value.trim())
                .with_context(|| format!("invalid value for exporter header {key}"))?;
            metadata.insert(name, value);
        }

        Ok(Self {
            endpoint,
            tls_domain,
            metadata,
        })
    }

    fn from_env() -> Result<Option<Self>> {
        let Ok(endpoint) = env::var(ENV_ENDPOINT) else {
            return Ok(None);
        };
        let headers = env::var(ENV_HEADERS).ok();
        Self::from_parts(&endpoint, headers.as_deref()).map(Some)
    }

    fn into_provider(self) -> Result<SdkTracerProvider> {
        let mut builder = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint)
            .with_compression(Compression::Gzip)
            .with_timeout(EXPORT_TIMEOUT)
            .with_metadata(self.metadata);

        if let Some(domain) = self.tls_domain {
            builder = builder.with_tls_config(
                ClientTlsConfig::new()
                    .domain_name(domain)
                    .with_native_roots(),
            );
        }

        let exporter = builder.build().context("failed to build OTLP span exporter")?;

        Ok(SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource())
            .build())
    }
}

fn resource() -> Resource {
    let instance = env::var(ENV_INSTANCE_ID).unwrap_or_else(|_| Ulid::new().to_string());

    Resource::builder_empty()
        .with_attributes([
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", instance),
            KeyValue::new("vcs.revision", GIT_COMMIT_HASH),
        ])
        .build()
}

/// `RUST_LOG` wins over the verbosity-derived default.
fn filter(level: Level) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    for directive in QUIET_TARGETS {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the exporter settings are invalid or a subscriber is
/// already installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = filter(verbosity_level.unwrap_or(Level::ERROR))?;
    let fmt_layer = fmt::layer().with_target(false).compact();

    let otel_layer = match Exporter::from_env()? {
        Some(exporter) => {
            let provider = exporter.into_provider()?;
            let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
            global::set_text_map_propagator(TraceContextPropagator::new());
            global::set_tracer_provider(provider.clone());
            let _ = TRACER_PROVIDER.set(provider);
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans. Does nothing when export was not enabled.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        debug!("flushing spans");
        if let Err(err) = provider.shutdown() {
            debug!("tracer shutdown: {}", err);
        }
    }
}
