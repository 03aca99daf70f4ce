//! Invocation of the external DNS toolchain.
//!
//! The BIND utilities either run inside a Docker Compose service or
//! directly on the host. [`Toolchain`] hides that difference: the workflow
//! asks for e.g. "check this zone" and gets a ready to run [`ToolCommand`]
//! whose paths are the ones the tool itself will see.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{Config, Runner};
use crate::env::Env;
use crate::keys::{DnssecAlgorithm, DnssecFlag};
use crate::zone::{ZoneContext, ZoneLayout, ZoneName};

//------------ ToolCommand ---------------------------------------------------

/// A fully specified external program invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// The program followed by its arguments.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argv: Vec<_> = self.argv().collect();
        f.write_str(&argv.join(" "))
    }
}

//------------ ToolOutput ----------------------------------------------------

/// The captured result of a finished [`ToolCommand`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// The exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// The text that best describes a failure of the tool.
    ///
    /// The BIND checkers print their diagnostics on stdout, so stdout is
    /// used when nothing was written to stderr.
    pub fn error_text(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

//------------ Toolchain -----------------------------------------------------

/// Builds the commands for the DNS utilities.
pub struct Toolchain<'a> {
    config: &'a Config,

    /// The zone and key locations as the tools see them.
    layout: ZoneLayout,
}

impl<'a> Toolchain<'a> {
    pub fn new(env: &impl Env, config: &'a Config) -> Self {
        Self {
            config,
            layout: config.tool_layout(env),
        }
    }

    /// `named-checkzone` on the unsigned zone file.
    pub fn checkzone(&self, zone: &ZoneName) -> ToolCommand {
        self.wrap(
            ToolCommand::new("named-checkzone")
                .arg(zone.as_str())
                .arg(path_arg(&self.layout.zone_file(zone, ZoneContext::Unsigned))),
        )
    }

    /// `dnssec-signzone` turning the unsigned zone file into the signed one.
    pub fn signzone(&self, zone: &ZoneName) -> ToolCommand {
        let cmd = ToolCommand::new("dnssec-signzone")
            // Smart signing, keys are picked up from the key directory.
            .arg("-S")
            // The serial was already set when the unsigned zone was made.
            .args(["-N", "keep"])
            .arg("-d")
            .arg(path_arg(&self.config.dsset_dir))
            .args(["-o", zone.as_str()])
            .arg("-K")
            .arg(path_arg(self.layout.keys_dir()))
            .arg("-f")
            .arg(path_arg(&self.layout.zone_file(zone, ZoneContext::Signed)))
            .arg(path_arg(&self.layout.zone_file(zone, ZoneContext::Unsigned)))
            .with_current_dir(self.layout.zones_dir(ZoneContext::Signed));
        self.wrap(cmd)
    }

    /// `dnssec-verify` on the signed zone file.
    pub fn verify(&self, zone: &ZoneName) -> ToolCommand {
        self.wrap(
            ToolCommand::new("dnssec-verify")
                .args(["-o", zone.as_str()])
                .arg(path_arg(&self.layout.zone_file(zone, ZoneContext::Signed))),
        )
    }

    /// `dnssec-keygen` for a new key of the given type.
    pub fn keygen(
        &self,
        zone: &ZoneName,
        algorithm: DnssecAlgorithm,
        flag: DnssecFlag,
    ) -> ToolCommand {
        let mut cmd = ToolCommand::new("dnssec-keygen")
            .args(["-a", algorithm.mnemonic()])
            .arg("-K")
            .arg(path_arg(self.layout.keys_dir()))
            .args(["-n", "ZONE"]);
        if flag == DnssecFlag::Ksk {
            cmd = cmd.args(["-f", flag.mnemonic()]);
        }
        self.wrap(cmd.arg(zone.as_str()))
    }

    /// DS records (SHA-256) for the given public key files.
    ///
    /// All keys are handled by a single shell so that a container only has
    /// to be started once.
    pub fn dsfromkey<S: AsRef<str>>(&self, key_files: &[S]) -> ToolCommand {
        let script = key_files
            .iter()
            .map(|file| format!("dnssec-dsfromkey -2 {}", file.as_ref()))
            .collect::<Vec<_>>()
            .join(" && ");
        self.wrap(
            ToolCommand::new("sh")
                .args(["-c".to_string(), script])
                .with_current_dir(self.layout.keys_dir()),
        )
    }

    /// A `dig` query with arbitrary arguments.
    pub fn dig<S: Into<String>>(&self, args: impl IntoIterator<Item = S>) -> ToolCommand {
        self.wrap(ToolCommand::new("dig").args(args))
    }

    /// Adapt a command to the configured runner.
    fn wrap(&self, cmd: ToolCommand) -> ToolCommand {
        match self.config.runner {
            Runner::Local => cmd,
            Runner::Docker => {
                let docker = &self.config.docker;
                let workdir = cmd
                    .current_dir()
                    .map(path_arg)
                    .unwrap_or_else(|| path_arg(&docker.workdir));

                let mut wrapped = ToolCommand::new("docker").arg("compose");
                for file in &docker.compose_files {
                    wrapped = wrapped.args(["-f".to_string(), path_arg(file)]);
                }
                wrapped
                    .args(["run", "--rm", "-w"])
                    .arg(workdir)
                    .arg(docker.service.as_str())
                    .args(cmd.argv())
            }
        }
    }
}

fn path_arg(path: impl AsRef<Path>) -> String {
    path.as_ref().display().to_string()
}

//============ Tests =========================================================
