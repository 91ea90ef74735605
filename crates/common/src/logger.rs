use tracing_subscriber::EnvFilter;

const QUIET_TARGETS: &[&str] = &["hyper=warn", "reqwest=warn"];

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn setup_logger(level: &str) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    for directive in QUIET_TARGETS {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        // .with_file(true)
        // .with_line_number(true)
        .with_target(true)
        // .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_env_filter(filter)
        .init();
}
