use std::path::PathBuf;

use tracing::debug;

use crate::config::{Config, Runner};
use crate::env::Env;

use super::commands::Command;
use super::error::Error;

#[derive(Clone, Debug, clap::Parser)]
#[command(version, disable_help_subcommand = true)]
pub struct Args {
    /// The configuration file [default: zonectl.json if it exists]
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// The directory with the raw, unsigned and signed zone directories
    #[arg(long = "zones-dir", value_name = "DIR", global = true)]
    pub zones_dir: Option<PathBuf>,

    /// The directory with the DNSSEC keys
    #[arg(long = "keys-dir", value_name = "DIR", global = true)]
    pub keys_dir: Option<PathBuf>,

    /// How to run the DNS tools
    #[arg(long = "runner", value_name = "RUNNER", value_enum, global = true)]
    pub runner: Option<Runner>,

    /// Show more diagnostics, can be repeated
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn execute(self, env: impl Env) -> Result<(), Error> {
        let config = self.load_config(&env)?;
        debug!(?config, "using configuration");
        self.command.execute(env, &config)
    }

    /// Load the configuration and apply the command line overrides.
    fn load_config(&self, env: &impl Env) -> Result<Config, Error> {
        let mut config = Config::load(env, self.config.as_deref())?;
        if let Some(zones_dir) = &self.zones_dir {
            config.zones_dir = zones_dir.clone();
        }
        if let Some(keys_dir) = &self.keys_dir {
            config.keys_dir = keys_dir.clone();
        }
        if let Some(runner) = self.runner {
            config.runner = runner;
        }
        Ok(config)
    }
}
