use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::{fmt, fs, io};

use chrono::NaiveDate;

use crate::error::Error;
use crate::tool::{ToolCommand, ToolOutput};
use crate::{parse_args, run, Args};

use super::Env;
use super::Stream;

/// A command to run in a [`FakeEnv`]
///
/// This is used for testing the utilities, running the real code in a fake
/// environment.
#[derive(Clone)]
pub struct FakeCmd {
    /// The command to run, including `argv[0]`
    cmd: Vec<OsString>,
    cwd: Option<PathBuf>,
    today: NaiveDate,

    /// Scripted behaviour of external tools, by tool name.
    tools: Vec<(String, FakeTool)>,
}

/// The scripted behaviour of an external tool
#[derive(Clone, Debug, Default)]
pub struct FakeTool {
    pub output: ToolOutput,

    /// Files written by the tool, relative to the working directory.
    pub creates: Vec<(PathBuf, String)>,
}

impl FakeTool {
    /// A tool that succeeds with the given stdout.
    pub fn ok(stdout: &str) -> Self {
        Self {
            output: ToolOutput {
                status: Some(0),
                stdout: stdout.into(),
                stderr: String::new(),
            },
            creates: Vec::new(),
        }
    }

    /// A tool that fails with the given stderr.
    pub fn fail(stderr: &str) -> Self {
        Self {
            output: ToolOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: stderr.into(),
            },
            creates: Vec::new(),
        }
    }

    /// Let the tool write a file when it runs.
    pub fn creates(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.creates.push((path.into(), content.into()));
        self
    }
}

/// The result of running a [`FakeCmd`]
///
/// The fields are public to allow for easy assertions in tests.
#[derive(Debug)]
pub struct FakeResult {
    pub exit_code: u8,
    pub stdout: String,
    pub stderr: String,

    /// Every external command that was run, in order.
    pub commands: Vec<String>,
}

/// An environment that mocks interaction with the outside world
pub struct FakeEnv {
    /// Description of the command being run
    pub cmd: FakeCmd,

    /// The mocked stdout
    pub stdout: FakeStream,

    /// The mocked stderr
    pub stderr: FakeStream,

    /// The external commands that were run
    pub commands: Arc<Mutex<Vec<ToolCommand>>>,
}

impl Env for FakeEnv {
    fn args_os(&self) -> impl Iterator<Item = OsString> {
        self.cmd.cmd.iter().map(Into::into)
    }

    fn stdout(&self) -> Stream<impl io::Write> {
        Stream {
            writer: Mutex::new(self.stdout.clone()),
            is_terminal: false,
        }
    }

    fn stderr(&self) -> Stream<impl io::Write + Send + Sync + 'static> {
        Stream {
            writer: Mutex::new(self.stderr.clone()),
            is_terminal: false,
        }
    }

    fn in_cwd<'a>(&self, path: &'a impl AsRef<Path>) -> Cow<'a, Path> {
        match &self.cmd.cwd {
            Some(cwd) => cwd.join(path).into(),
            None => path.as_ref().into(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.cmd.today
    }

    fn exec(&self, cmd: &ToolCommand) -> Result<ToolOutput, Error> {
        self.commands.lock().unwrap().push(cmd.clone());

        // Spawning fails like a real process would without its directory.
        if let Some(dir) = cmd.current_dir() {
            if !self.in_cwd(&dir).is_dir() {
                return Err(format!(
                    "unable to run {}: No such file or directory",
                    cmd.program()
                )
                .into());
            }
        }

        // The tool is recognised by name anywhere in the command line, so
        // that it is found when wrapped in `docker compose run` too.
        let tool = self
            .cmd
            .tools
            .iter()
            .find(|(name, _)| cmd.argv().any(|arg| arg == name.as_str()))
            .map(|(_, tool)| tool.clone())
            .unwrap_or_else(|| FakeTool::ok(""));

        for (path, content) in &tool.creates {
            let path = self.in_cwd(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }

        Ok(tool.output)
    }
}

impl FakeCmd {
    /// Construct a new [`FakeCmd`] with a given command.
    ///
    /// The command can consist of multiple strings to specify a subcommand.
    /// The date defaults to 2025-06-15.
    pub fn new<S: Into<OsString>>(cmd: impl IntoIterator<Item = S>) -> Self {
        Self {
            cmd: cmd.into_iter().map(Into::into).collect(),
            cwd: None,
            today: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            tools: Vec::new(),
        }
    }

    pub fn cwd(&self, path: impl AsRef<Path>) -> Self {
        Self {
            cwd: Some(path.as_ref().to_path_buf()),
            ..self.clone()
        }
    }

    pub fn today(&self, today: NaiveDate) -> Self {
        Self {
            today,
            ..self.clone()
        }
    }

    /// Script the behaviour of an external tool.
    ///
    /// Tools without a script succeed without output.
    pub fn tool(&self, name: &str, tool: FakeTool) -> Self {
        let mut new = self.clone();
        new.tools.push((name.into(), tool));
        new
    }

    /// Add arguments to a clone of the [`FakeCmd`]
    ///
    /// ```rust,ignore
    /// let cmd = FakeCmd::new(["zonectl"])
    /// let sub1 = cmd.args(["sub1"]);  // zonectl sub1
    /// let sub2 = cmd.args(["sub2"]);  // zonectl sub2
    /// let sub3 = sub2.args(["sub3"]); // zonectl sub2 sub3
    /// ```
    pub fn args<S: Into<OsString>>(&self, args: impl IntoIterator<Item = S>) -> Self {
        let mut new = self.clone();
        new.cmd.extend(args.into_iter().map(Into::into));
        new
    }

    /// Parse the arguments of this [`FakeCmd`] and return the result
    pub fn parse(&self) -> Result<Args, Error> {
        parse_args(FakeEnv::from(self.clone()))
    }

    /// Run the [`FakeCmd`] in a [`FakeEnv`], returning a [`FakeResult`]
    pub fn run(&self) -> FakeResult {
        let env = FakeEnv::from(self.clone());

        let exit_code = run(&env);

        FakeResult {
            exit_code,
            stdout: env.get_stdout(),
            stderr: env.get_stderr(),
            commands: env.get_commands(),
        }
    }
}

impl From<FakeCmd> for FakeEnv {
    fn from(cmd: FakeCmd) -> Self {
        FakeEnv {
            cmd,
            stdout: Default::default(),
            stderr: Default::default(),
            commands: Default::default(),
        }
    }
}

impl FakeEnv {
    pub fn get_stdout(&self) -> String {
        String::from_utf8(self.stdout.0.lock().unwrap().clone()).unwrap()
    }

    pub fn get_stderr(&self) -> String {
        String::from_utf8(self.stderr.0.lock().unwrap().clone()).unwrap()
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

/// A type to used to mock stdout and stderr
#[derive(Clone, Default)]
pub struct FakeStream(Arc<Mutex<Vec<u8>>>);

impl io::Write for FakeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // do nothing
        Ok(())
    }
}

impl fmt::Display for FakeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(std::str::from_utf8(&self.0.lock().unwrap()).unwrap())
    }
}
