use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
///
/// `RUST_LOG` wins over everything; otherwise `-v` and `-vv` raise the
/// configured level to at least debug and trace.
pub fn init(config: &LoggingConfig, verbose: u8) {
    let directives = effective_directives(&config.level, verbose);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    if let Err(e) = installed {
        tracing::debug!(%e, "global subscriber already installed");
    }
}

/// Filter directives for `configured` under `verbose` `-v` flags. A plain
/// configured level that is already more verbose is kept; per-target
/// directives are replaced by the flag's level.
fn effective_directives(configured: &str, verbose: u8) -> String {
    let floor = match verbose {
        0 => return configured.to_owned(),
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    match configured.parse::<LevelFilter>() {
        Ok(level) if level >= floor => configured.to_owned(),
        _ => floor.to_string().to_ascii_lowercase(),
    }
}
