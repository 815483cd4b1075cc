use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::environment::Environment;

/// Install a stderr subscriber; `RUST_LOG` overrides the default level.
pub fn setup_stderr_logging(env: &impl Environment, verbose: bool) {
    let filter = env
        .env_var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(env.atty_stderr())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
