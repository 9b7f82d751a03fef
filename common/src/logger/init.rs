use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Output knobs coming from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset.
    pub verbose: bool,

    /// Emit one JSON object per event instead of the human format.
    pub json: bool,
}

impl LogOptions {
    fn default_directive(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logger(service_name: &'static str, opts: LogOptions) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(opts.default_directive()));

        let builder = fmt()
            .with_env_filter(filter)
            .with_target(true) // <-- shows crate/module path
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        if opts.json {
            builder.json().init();
        } else {
            builder.init();
        }

        tracing::info!(
            service = service_name,
            verbose = opts.verbose,
            json = opts.json,
            "logger initialized"
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_selects_debug_directive() {
        let opts = LogOptions {
            verbose: true,
            json: false,
        };
        assert_eq!(opts.default_directive(), "debug");
        assert_eq!(LogOptions::default().default_directive(), "info");
    }
}
