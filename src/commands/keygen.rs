use std::fs;

use clap::builder::ValueParser;
use tracing::info;

use crate::config::Config;
use crate::env::Env;
use crate::error::{Context, Error};
use crate::keys::{find_zone_keys, DnssecAlgorithm, DnssecFlag};
use crate::log;
use crate::tool::Toolchain;
use crate::zone::{parse_zone_name, ZoneName};

use super::keys::Keys;

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Keygen {
    /// The signature algorithm to generate keys for
    #[arg(
        short = 'a',
        long = "algorithm",
        value_name = "ALGORITHM",
        value_enum,
        ignore_case = true,
        default_value_t = DnssecAlgorithm::Ed25519
    )]
    algorithm: DnssecAlgorithm,

    /// The zone to generate keys for
    #[arg(value_name = "ZONE", value_parser = ValueParser::new(parse_zone_name))]
    zone: ZoneName,
}

impl Keygen {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let keys_dir = config.host_layout(&env).keys_dir().to_path_buf();

        let existing = find_zone_keys(&keys_dir, &self.zone, Some(self.algorithm))?;
        if !existing.is_empty() {
            log::warn(
                &env,
                format_args!(
                    "keys already exist for zone {} and algorithm {}",
                    self.zone, self.algorithm
                ),
            );
            return Ok(());
        }

        // The tools may run in a container that only sees a bind mount of
        // this directory.
        fs::create_dir_all(&keys_dir)
            .map_err(|err| format!("unable to create '{}': {err}", keys_dir.display()))?;

        let toolchain = Toolchain::new(&env, config);
        writeln!(env.stdout(), "Generating {} keys for zone {}", self.algorithm, self.zone);

        for flag in [DnssecFlag::Ksk, DnssecFlag::Zsk] {
            let cmd = toolchain.keygen(&self.zone, self.algorithm, flag);
            info!(command = %cmd, "generating {}", flag.mnemonic());

            let output = env.exec(&cmd)?;
            if !output.success() {
                return Err(format!(
                    "failed to create {}: {}",
                    flag.mnemonic(),
                    output.error_text()
                )
                .into());
            }
            writeln!(
                env.stdout(),
                "{} created: {}",
                flag.mnemonic(),
                output.stdout.trim()
            );
        }

        Keys::new(self.zone.clone(), false)
            .execute(&env, config)
            .with_context(|| format!("listing the keys of zone {}", self.zone))
    }
}
