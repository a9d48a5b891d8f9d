use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

use crate::utils::config::PackagePaths;

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "ERROR".red(),
        Level::Warn => "WARN".yellow(),
        Level::Info => "INFO".normal(),
        Level::Debug => "DEBUG".blue(),
        Level::Trace => "TRACE".dimmed(),
    }
}

/// Install the crate logger. `RUST_LOG` still wins for anything it names.
///
/// Dependencies log at warn. This crate logs at info, or debug with `verbose`, which also
/// adds the module path to every line. Calling twice is harmless.
pub fn setup_logging(verbose: bool) {
    let name = PackagePaths::get().pkg_name();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(name, level)
        .format(move |buf, record| {
            let tag = level_tag(record.level());
            if verbose || record.level() <= Level::Warn {
                writeln!(
                    buf,
                    "[{} {} {}] {}",
                    name.cyan(),
                    tag,
                    record.target().white(),
                    record.args()
                )
            } else {
                writeln!(buf, "[{}] {}", name.cyan(), record.args())
            }
        })
        .try_init();
}

/// Colors for the CLI summary lines.
pub struct Colors;

impl Colors {
    pub const LINKED: &'static str = "green";
    pub const COPIED: &'static str = "cyan";
    pub const MISSING: &'static str = "yellow";

    pub fn colorize(color: &str, text: &str) -> String {
        text.color(color).to_string()
    }
}
