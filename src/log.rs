use std::fmt::Display;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;

use crate::env::Env;

mod color {
    pub const YELLOW: u8 = 33;
    pub const RED: u8 = 31;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Warning,
    Error,
}

impl LogLevel {
    fn color(self) -> u8 {
        match self {
            Self::Warning => color::YELLOW,
            Self::Error => color::RED,
        }
    }

    fn text(self) -> &'static str {
        match self {
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// The level marker, in colour if the output is a terminal.
    pub fn colourize(self, is_terminal: bool) -> String {
        if is_terminal {
            format!("\x1B[{}m{}\x1B[0m", self.color(), self.text())
        } else {
            self.text().into()
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// The name the program was invoked as, without leading directories.
pub fn program_name(env: &impl Env) -> String {
    env.args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| clap::crate_name!().into())
}

/// Report a message to the user on stderr.
pub fn log(env: impl Env, level: LogLevel, text: impl Display) {
    let mut err = env.stderr();
    let prog = program_name(&env);
    let marker = level.colourize(err.is_terminal());
    writeln!(err, "[{prog}] {marker}: {text}");
}

pub fn warn(env: impl Env, text: impl Display) {
    log(env, LogLevel::Warning, text)
}

/// Install the diagnostics subscriber for the current thread.
///
/// Diagnostics go to the stderr of the environment. Without `-v` only
/// warnings and errors are shown, each `-v` adds one level of detail.
pub fn init_tracing(env: &impl Env, verbosity: u8) -> DefaultGuard {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let stderr = env.stderr();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(stderr.is_terminal())
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(stderr)
        .finish();

    tracing::subscriber::set_default(subscriber)
}
