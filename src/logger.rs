use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_BYTES: u64 = 10 * 1024 * 1024;

/// Initializes the logging system from a log4rs config file (yaml/json/toml).
pub fn init_path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = log4rs::config::load_config_file(path, log4rs::config::Deserializers::default())?;
    log4rs::init_config(config)?;
    Ok(())
}

/// error|warn|info|debug|trace, anything else is info.
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(
    dir: &Path,
    stem: &str,
    keep: u32,
) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_BYTES)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Builds the logging config: `{dir}/app.log` for everything, `{dir}/audit.log` for `docdigest::audit`.
/// - dir: base directory for logs; if None, current directory.
/// - retention: number of rolled files to keep (default 7)
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(
            Logger::builder()
                .appender("audit")
                .additive(false)
                .build(crate::telemetry::AUDIT_TARGET, LevelFilter::Info),
        )
        .build(Root::builder().appender("app").build(lvl))?;
    Ok(config)
}

/// Configure logging globally for the process. Fails if a logger is already installed.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, level, retention)?;
    log4rs::init_config(config)?;
    Ok(())
}
