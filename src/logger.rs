use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

/// Initializes logging from a log4rs YAML config file.
///
/// # Errors
/// Returns an error if the file cannot be read or log4rs is already initialized.
pub fn init_path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Build a rolling-file config writing `{dir}/csvview.log`.
///
/// # Errors
/// Returns an error if the directory or appender cannot be created.
pub fn build_config(
    dir: &Path,
    level: LevelFilter,
    retention: u32,
) -> Result<Config, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join("csvview.{}.log").display()), retention)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join("csvview.log"), Box::new(policy))?;
    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(level))?;
    Ok(config)
}

/// Configure logging globally for the process.
/// - dir: base directory for logs; if None, current directory.
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// # Errors
/// Returns an error if the config cannot be built or a logger is already set.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config = build_config(&base, parse_level(level.unwrap_or("info")), retention.unwrap_or(7))?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Configure logging from environment variables if present:
/// - CSVVIEW_LOG_DIR
/// - CSVVIEW_LOG_LEVEL
/// - CSVVIEW_LOG_RETENTION
///
/// Returns `Ok(false)` and leaves logging off when neither dir nor level is set.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<bool, Box<dyn std::error::Error>> {
    let dir = std::env::var("CSVVIEW_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("CSVVIEW_LOG_LEVEL").ok();
    if dir.is_none() && level.is_none() {
        return Ok(false);
    }
    let retention = std::env::var("CSVVIEW_LOG_RETENTION").ok().and_then(|s| s.parse::<u32>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)?;
    Ok(true)
}
