use tracing::{debug, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Connection-level chatter from the HTTP stack, capped unless `RUST_LOG`
/// says otherwise.
const QUIET_DEPENDENCIES: [&str; 2] = ["hyper=warn", "hyper_util=warn"];

/// Install a global tracing subscriber using the provided logging settings.
///
/// `RUST_LOG` directives, when present, refine the configured base level.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    let rust_log_set = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let env_filter = build_filter(logging.level, rust_log_set)?;

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })?;

    debug!(
        target = "homeblog::telemetry",
        level = %logging.level,
        json = matches!(logging.format, LogFormat::Json),
        "tracing initialised"
    );
    Ok(())
}

fn build_filter(level: LevelFilter, rust_log_set: bool) -> Result<EnvFilter, InfraError> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if rust_log_set || level <= LevelFilter::WARN {
        return Ok(filter);
    }

    for directive in QUIET_DEPENDENCIES {
        let directive = directive
            .parse()
            .map_err(|err| InfraError::telemetry(format!("invalid directive `{directive}`: {err}")))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}
