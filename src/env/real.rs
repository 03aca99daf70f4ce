use std::borrow::Cow;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};

use crate::error::Error;
use crate::tool::{ToolCommand, ToolOutput};

use super::{Env, Stream};

/// Use real I/O
pub struct RealEnv;

impl Env for RealEnv {
    fn args_os(&self) -> impl Iterator<Item = OsString> {
        std::env::args_os()
    }

    fn stdout(&self) -> Stream<impl io::Write> {
        let stdout = io::stdout();
        Stream {
            is_terminal: stdout.is_terminal(),
            writer: Mutex::new(stdout),
        }
    }

    fn stderr(&self) -> Stream<impl io::Write + Send + Sync + 'static> {
        let stderr = io::stderr();
        Stream {
            is_terminal: stderr.is_terminal(),
            writer: Mutex::new(stderr),
        }
    }

    fn in_cwd<'a>(&self, path: &'a impl AsRef<Path>) -> Cow<'a, Path> {
        let path = path.as_ref();
        if path.is_absolute() {
            return path.into();
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path).into(),
            Err(_) => path.into(),
        }
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn exec(&self, cmd: &ToolCommand) -> Result<ToolOutput, Error> {
        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());
        if let Some(dir) = cmd.current_dir() {
            command.current_dir(self.in_cwd(&dir));
        }

        let output = command
            .output()
            .map_err(|e| format!("unable to run {}: {e}", cmd.program()))?;

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
