//! The configuration file.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::env::Env;
use crate::error::Error;
use crate::zone::ZoneLayout;

/// Name of the configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "zonectl.json";

//------------ Config --------------------------------------------------------

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Host directory containing the `raw`, `unsigned` and `signed` zone
    /// directories.
    pub zones_dir: PathBuf,

    /// Host directory containing the DNSSEC key files.
    pub keys_dir: PathBuf,

    /// The token in raw zone files that is replaced by the serial.
    pub serial_placeholder: String,

    /// Where `dnssec-signzone` may drop its dsset files.
    pub dsset_dir: PathBuf,

    /// How the DNS tools are invoked.
    pub runner: Runner,

    pub docker: DockerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zones_dir: PathBuf::from(".docker/server/zones"),
            keys_dir: PathBuf::from(".docker/server/keys"),
            serial_placeholder: "__SERIAL__".into(),
            dsset_dir: PathBuf::from("/tmp"),
            runner: Runner::Docker,
            docker: DockerConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicitly given file must exist. Without one, the default file
    /// in the working directory is used if present and the built-in
    /// defaults otherwise.
    pub fn load(env: &impl Env, path: Option<&Path>) -> Result<Self, Error> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let file = match File::open(env.in_cwd(&path)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound && !required => {
                return Ok(Self::default())
            }
            Err(err) => {
                return Err(format!(
                    "unable to open config file '{}': {err}",
                    path.display()
                )
                .into())
            }
        };

        serde_json::from_reader(file).map_err(|err| {
            format!("unable to parse config file '{}': {err}", path.display()).into()
        })
    }

    /// Where zone files and keys are on this machine.
    pub fn host_layout(&self, env: &impl Env) -> ZoneLayout {
        ZoneLayout::new(
            env.in_cwd(&self.zones_dir).into_owned(),
            env.in_cwd(&self.keys_dir).into_owned(),
        )
    }

    /// Where zone files and keys are as seen by the DNS tools.
    pub fn tool_layout(&self, env: &impl Env) -> ZoneLayout {
        match self.runner {
            Runner::Local => self.host_layout(env),
            Runner::Docker => {
                ZoneLayout::new(self.docker.zones_dir.clone(), self.docker.keys_dir.clone())
            }
        }
    }
}

//------------ Runner --------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Runner {
    /// Run the tools in a Docker Compose service.
    #[default]
    Docker,

    /// Run the tools installed on this machine.
    Local,
}

//------------ DockerConfig --------------------------------------------------

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DockerConfig {
    /// The Compose service that has the DNS tools installed.
    pub service: String,

    /// Default working directory inside the container.
    pub workdir: PathBuf,

    /// The zones directory as mounted in the container.
    pub zones_dir: PathBuf,

    /// The key directory as mounted in the container.
    pub keys_dir: PathBuf,

    /// Extra Compose files, passed with `-f`.
    pub compose_files: Vec<PathBuf>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            service: "tools".into(),
            workdir: PathBuf::from("/data"),
            zones_dir: PathBuf::from("/data/zones"),
            keys_dir: PathBuf::from("/data/keys"),
            compose_files: Vec::new(),
        }
    }
}

//============ Tests =========================================================
