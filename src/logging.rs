use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `LAWINE_LOG` is set
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "lawine=debug"
    } else {
        "lawine=warn"
    }
}

/// Install the global stderr subscriber.
///
/// `RUST_LOG`, then `LAWINE_LOG`, override the level picked by `--verbose`.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("LAWINE_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(true), "lawine=debug");
        assert_eq!(default_filter(false), "lawine=warn");
    }
}
