use clap::builder::ValueParser;

use crate::config::Config;
use crate::env::Env;
use crate::error::Error;
use crate::log;
use crate::store::FsZoneStore;
use crate::workflow::{Outcome, ZoneSigner};
use crate::zone::{parse_zone_name, ZoneName};

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Check {
    /// The zone to check
    #[arg(value_name = "ZONE", value_parser = ValueParser::new(parse_zone_name))]
    zone: ZoneName,
}

impl Check {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let store = FsZoneStore::new(config.host_layout(&env));
        let signer = ZoneSigner::new(&env, store, config);

        match signer.check(&self.zone)? {
            Outcome::Done => {
                writeln!(env.stdout(), "Syntax OK for zone {}", self.zone);
            }
            Outcome::Missing => log::warn(
                &env,
                format_args!("unsigned zone file not found for zone {}", self.zone),
            ),
        }
        Ok(())
    }
}
