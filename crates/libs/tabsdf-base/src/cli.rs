//! Command line helpers shared by the tabsdf executables.

use log::LevelFilter;
use std::{
    io::Write,
    time::{Duration, SystemTime},
};

/// Arguments shared by every executable.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Verbosity level for the log.
    #[clap(
        short,
        long,
        help = "Verbosity of the log\n  0 - error\n  1 - warn\n  2 - info\n  3 - debug\n  4 - \
                trace\n\x08",
        default_value_t = 2
    )]
    pub log_level: u8,

    /// Whether to print the elapsed time in the log.
    #[clap(long, help = "Print the time elapsed since launch in front of log messages.")]
    pub log_timestamp: bool,
}

impl CommonArgs {
    /// Installs the logger configured by these arguments.
    ///
    /// `launch_time` is the origin of the printed elapsed time.
    pub fn init_logging(&self, launch_time: SystemTime, filters: &[LogFilter]) {
        setup_logging(
            self.log_timestamp.then_some(launch_time),
            self.log_level,
            filters,
        );
    }
}

/// Parses the arguments; returns them with the launch time.
///
/// Nothing is logged here since the logger is installed from the parsed
/// arguments; see [`launch_message`].
pub fn parse_args<T: clap::Parser>() -> (T, SystemTime) { (T::parse(), SystemTime::now()) }

/// Line announcing the launch of the program called `name`, to be logged
/// once the logger is installed.
pub fn launch_message(name: &str, launch_time: SystemTime) -> String {
    format!(
        "{} {} started at {} ({}).",
        name,
        crate::VERSION,
        chrono::DateTime::<chrono::Utc>::from(launch_time).format("%Y-%m-%d %H:%M:%S"),
        std::env::consts::OS
    )
}

/// Log level override of one module.
pub type LogFilter<'a> = (&'a str, LevelFilter);

/// Installs `env_logger` as the global logger.
///
/// # Arguments
///
/// * `timestamp` - Origin of the elapsed time printed in front of every
///   message; `None` prints no time.
/// * `log_level` - Level of the whole program, see [`log_filter_from_level`].
/// * `filters` - Per-module overrides.
pub fn setup_logging(timestamp: Option<SystemTime>, log_level: u8, filters: &[LogFilter]) {
    let mut builder = env_logger::builder();
    builder.format(move |buf, record| {
        let module = record
            .module_path()
            .and_then(|path| path.split("::").next())
            .unwrap_or("?");
        if let Some(elapsed) = timestamp.and_then(|t| t.elapsed().ok()) {
            write!(buf, "{} ", format_elapsed(elapsed))?;
        }
        writeln!(buf, "{:5} [{}]: {}", record.level(), module, record.args())
    });
    filters.iter().for_each(|(module, level)| {
        builder.filter(Some(module), *level);
    });
    builder.filter_level(log_filter_from_level(log_level)).init();
}

/// Formats a duration as `h:m:s.mmm`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{}:{}:{}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        elapsed.subsec_millis()
    )
}

/// Converts a verbosity level to a log filter; anything above 4 is trace.
pub fn log_filter_from_level(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels() {
        assert_eq!(log_filter_from_level(0), LevelFilter::Error);
        assert_eq!(log_filter_from_level(2), LevelFilter::Info);
        assert_eq!(log_filter_from_level(200), LevelFilter::Trace);
    }

    #[test]
    fn launch_line() {
        let launch_time = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 + 3_661);
        let line = launch_message("tabsdf-ddr", launch_time);
        assert_eq!(
            line,
            format!(
                "tabsdf-ddr {} started at 1970-01-02 01:01:01 ({}).",
                crate::VERSION,
                std::env::consts::OS
            )
        );
    }

    #[test]
    fn elapsed_time() {
        assert_eq!(format_elapsed(Duration::from_millis(7)), "0:0:0.007");
        assert_eq!(format_elapsed(Duration::from_millis(3_723_450)), "1:2:3.450");
    }
}
