use tracing::warn;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "info";

/// Installs the global fmt subscriber, filtered by `RUST_LOG` (default
/// `info`). Logs go to stderr so JSON reports on stdout stay parseable.
pub fn init_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = log_filter(directives.as_deref());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Some(err) = rejected {
        warn!(
            %err,
            "invalid {} directives, falling back to '{DEFAULT_FILTER}'",
            EnvFilter::DEFAULT_ENV
        );
    }
}

/// Malformed directives yield the default filter plus the parse error.
fn log_filter(directives: Option<&str>) -> (EnvFilter, Option<ParseError>) {
    match directives.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(err)) => (EnvFilter::new(DEFAULT_FILTER), Some(err)),
        None => (EnvFilter::new(DEFAULT_FILTER), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> String {
        EnvFilter::new(DEFAULT_FILTER).to_string()
    }

    #[test]
    fn unset_uses_default() {
        let (filter, rejected) = log_filter(None);
        assert!(rejected.is_none());
        assert_eq!(filter.to_string(), default_filter());
    }

    #[test]
    fn valid_directives_are_kept() {
        let (filter, rejected) = log_filter(Some("ev_charge_env=debug"));
        assert!(rejected.is_none());
        assert_eq!(filter.to_string(), "ev_charge_env=debug");
    }

    #[test]
    fn malformed_directives_fall_back() {
        let (filter, rejected) = log_filter(Some("ev_charge_env=loudest"));
        assert!(rejected.is_some());
        assert_eq!(filter.to_string(), default_filter());
    }
}
