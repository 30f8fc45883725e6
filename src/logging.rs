//! Diagnostic logging setup for the binary.

use crate::output::Verbosity;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `fixity=debug`.
pub const LOG_ENV: &str = "FIXITY_LOG";

/// Default filter directive for a verbosity level.
#[must_use]
pub const fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "fixity=debug,info",
    }
}

/// Install a stderr `tracing` subscriber. `FIXITY_LOG` overrides the level
/// implied by `verbosity`. Calling this twice is harmless.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for v in [Verbosity::Quiet, Verbosity::Normal, Verbosity::Verbose] {
            assert!(default_directive(v).parse::<EnvFilter>().is_ok());
        }
    }

    #[test]
    fn test_init_twice() {
        init(Verbosity::Normal);
        init(Verbosity::Verbose);
    }
}
