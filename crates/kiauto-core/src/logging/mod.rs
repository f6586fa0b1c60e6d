use tracing::Span;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default domain used to tag every component span.
pub const DEFAULT_DOMAIN: &str = "kiauto";

/// Initialize logging for the given verbosity.
///
/// `0` emits warnings and errors only, `1` adds info events and `2` or more
/// enables debug events (one level per `-v` on the command line).
/// `RUST_LOG` directives are honored on top of this.
pub fn init_logging(verbosity: u8) {
    let level = level_for_verbosity(verbosity);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(
                    format!("kiauto={level}")
                        .parse()
                        .expect("Invalid log directive"),
                )
                .add_directive(
                    format!("kiauto_core={level}")
                        .parse()
                        .expect("Invalid log directive"),
                ),
        )
        .init();
}

fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Logging context handed to each component when it is constructed.
///
/// Components keep the span returned by [`LogContext::span`] and enter it for
/// every operation, so all of their events carry the same `domain` and
/// `component` fields without any process-wide named logger.
#[derive(Debug, Clone)]
pub struct LogContext {
    domain: String,
}

impl LogContext {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Create the span a component enters while it works.
    pub fn span(&self, component: &'static str) -> Span {
        tracing::info_span!("component", domain = %self.domain, component = component)
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}
