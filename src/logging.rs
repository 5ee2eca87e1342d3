//! Diagnostic logging.
//!
//! User-facing output goes to stdout through [`crate::report`]; tracing output
//! goes to stderr so `mob --print` stays safe to pipe. Quiet (`warn`) unless
//! `GITMOB_LOG` or `RUST_LOG` says otherwise.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";

/// Builds the filter for `directive`.
///
/// # Returns
///
/// The filter to install, plus the parse error when `directive` was
/// rejected and [`DEFAULT_FILTER`] is used instead.
fn build_filter(directive: Option<&str>) -> (EnvFilter, Option<String>) {
    match directive.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(e)) => (EnvFilter::new(DEFAULT_FILTER), Some(e.to_string())),
        None => (EnvFilter::new(DEFAULT_FILTER), None),
    }
}

/// Installs the global subscriber. Safe to call more than once.
///
/// An invalid `directive` is reported as a warning once the subscriber is up.
pub fn init(directive: Option<&str>) {
    let (filter, rejected) = build_filter(directive);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();

    if let Some(error) = rejected {
        warn!(
            directive = directive.unwrap_or_default(),
            %error,
            "ignoring invalid log filter, using {DEFAULT_FILTER}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init(Some("git_mob=debug"));
        init(Some("git_mob=loud"));
        init(None);
    }

    #[test]
    fn valid_directive_is_used() {
        let (filter, rejected) = build_filter(Some("git_mob=debug"));
        assert_eq!(rejected, None);
        assert_eq!(filter.to_string(), "git_mob=debug");
    }

    #[test]
    fn invalid_directive_is_reported() {
        let (filter, rejected) = build_filter(Some("git_mob=loud"));
        assert!(rejected.is_some());
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn no_directive_is_quiet() {
        let (filter, rejected) = build_filter(None);
        assert_eq!(rejected, None);
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
    }
}
