/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use ::std::fmt;
use ::std::path::{Path, PathBuf};
use ::std::time::{Duration, Instant};
use ::log::{Level, LevelFilter, Record};

/// Builder-style setup for logging
#[derive(Debug, Clone, Default)]
pub struct GlobalLogger {
    path: Option<PathBuf>,
    verbosity: Verbosity,
}

impl GlobalLogger {
    /// Also append the log to this file.
    pub fn path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self
    { self.path = Some(path.as_ref().to_owned()); self }

    /// Any integer will be accepted; the level will be truncated
    /// to the most extreme value supported.
    pub fn verbosity(&mut self, level: i32) -> &mut Self
    {
        self.verbosity = match level {
            level if level <= 0 => Verbosity::Default,
            1 => Verbosity::Loud,
            _ => Verbosity::Louder,
        };
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity { Default, Loud, Louder }

impl Default for Verbosity {
    fn default() -> Self { Verbosity::Default }
}

impl Verbosity {
    /// Level for our own crates.  Dependencies stay at `Warn`.
    fn our_level(self) -> LevelFilter
    {
        match self {
            Verbosity::Default => LevelFilter::Info,
            Verbosity::Loud => LevelFilter::Debug,
            Verbosity::Louder => LevelFilter::Trace,
        }
    }
}

impl GlobalLogger {
    /// Install the logger.  This can only succeed once per process.
    pub fn apply(&mut self) -> FailResult<()>
    {
        self.dispatch()?.apply()?;
        Ok(())
    }

    /// Colored lines go to stdout; the log file gets the same lines without
    /// escape codes.
    fn dispatch(&self) -> FailResult<::fern::Dispatch>
    {
        let ours = self.verbosity.our_level();
        let start = Instant::now();

        let mut fern = ::fern::Dispatch::new()
            .level(LevelFilter::Warn)
            .level_for("rla_linalg", ours)
            .level_for("rla_tasks", ours)
            .chain({
                ::fern::Dispatch::new()
                    .format(move |out, message, record| {
                        format_line(out, message, record, start.elapsed(), true)
                    })
                    .chain(::std::io::stdout())
            });

        if let Some(path) = self.path.as_ref() {
            fern = fern.chain({
                ::fern::Dispatch::new()
                    .format(move |out, message, record| {
                        format_line(out, message, record, start.elapsed(), false)
                    })
                    .chain(::fern::log_file(path)?)
            });
        }
        Ok(fern)
    }
}

fn format_line(
    out: ::fern::FormatCallback,
    message: &fmt::Arguments,
    record: &Record,
    t: Duration,
    color: bool,
) {
    let level = match color {
        true => ColorizedLevel(record.level()).to_string(),
        false => record.level().to_string(),
    };
    out.finish(format_args!("[{:>4}.{:03}s][{}][{}] {}",
        t.as_secs(),
        t.subsec_millis(),
        record.target(),
        level,
        message))
}

#[derive(Debug, Copy, Clone)]
pub struct ColorizedLevel(pub Level);
impl fmt::Display for ColorizedLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let style = match self.0 {
            Level::Error => ::ansi_term::Colour::Red.bold(),
            Level::Warn  => ::ansi_term::Colour::Red.normal(),
            Level::Info  => ::ansi_term::Colour::Cyan.bold(),
            Level::Debug => ::ansi_term::Colour::Yellow.dimmed(),
            Level::Trace => ::ansi_term::Colour::Cyan.normal(),
        };
        write!(f, "{}", style.paint(self.0.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_saturates() {
        let level = |v| GlobalLogger::default().verbosity(v).verbosity.our_level();
        assert_eq!(level(-3), LevelFilter::Info);
        assert_eq!(level(0), LevelFilter::Info);
        assert_eq!(level(1), LevelFilter::Debug);
        assert_eq!(level(2), LevelFilter::Trace);
        assert_eq!(level(100), LevelFilter::Trace);
    }

    #[test]
    fn log_file_has_no_escape_codes() {
        use ::log::Log;

        let dir = ::tempdir::TempDir::new("rla-logging").unwrap();
        let path = dir.path().join("log.txt");
        let (_, logger) = GlobalLogger::default().path(&path).dispatch().unwrap().into_log();

        logger.log(&Record::builder()
            .args(format_args!("something happened"))
            .level(Level::Warn)
            .target("rla_tasks::cmd")
            .build());
        logger.flush();

        let text = ::std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[rla_tasks::cmd][WARN] something happened"), "{:?}", text);
        assert!(!text.contains('\u{1b}'), "{:?}", text);
    }

    #[test]
    fn colorized_level_keeps_the_name() {
        for &level in &[Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            let s = ColorizedLevel(level).to_string();
            assert!(s.contains(&level.to_string()), "{:?}", s);
        }
    }
}
