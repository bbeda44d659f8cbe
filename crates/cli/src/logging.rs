use anyhow::{anyhow, Result};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;

pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// `RUST_LOG` wins over the command-line level when it is set.
pub fn init_tracing(level: LevelFilter) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("ログの初期化に失敗しました: {err}"))
}

#[cfg(test)]
mod tests {
    use super::level_for;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::INFO);
        assert_eq!(level_for(1, false), LevelFilter::DEBUG);
        assert_eq!(level_for(3, false), LevelFilter::TRACE);
        assert_eq!(level_for(2, true), LevelFilter::ERROR);
    }
}
