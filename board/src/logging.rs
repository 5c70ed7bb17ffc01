use crate::config::LoggingConfig;
use std::str::FromStr;

/// Installs the global logger. Records go to stderr so they never mix with
/// table output on stdout, and to `config.output` when set.
pub fn setup_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = log::LevelFilter::from_str(&config.level).unwrap_or_else(|_| {
        eprintln!("Unknown log level {:?}, using warn", config.level);
        log::LevelFilter::Warn
    });

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        // reqwest and its connection pool are noisy below warn
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr());

    if let Some(ref path) = config.output {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
