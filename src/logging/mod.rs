use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Default directives when RUST_LOG is not set
pub fn default_directives(level: &str) -> String {
    format!("econsite_api={level},tower_http={level},sqlx=warn", level = level)
}

/// Install the global subscriber. RUST_LOG wins over the configured level.
/// Safe to call more than once; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_use_configured_level() {
        assert_eq!(default_directives("debug"), "econsite_api=debug,tower_http=debug,sqlx=warn");
    }

    #[test]
    fn init_twice_is_harmless() {
        let config = LoggingConfig {
            level: "info".to_string(),
            json: false,
        };
        init(&config);
        init(&config);
    }
}
