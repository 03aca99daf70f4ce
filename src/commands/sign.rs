use clap::builder::ValueParser;

use crate::config::Config;
use crate::env::Env;
use crate::error::{Context, Error};
use crate::store::FsZoneStore;
use crate::workflow::ZoneSigner;
use crate::zone::{parse_zone_name, ZoneName};

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Sign {
    /// The zone to sign
    #[arg(value_name = "ZONE", value_parser = ValueParser::new(parse_zone_name))]
    zone: ZoneName,
}

impl Sign {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let store = FsZoneStore::new(config.host_layout(&env));
        let signer = ZoneSigner::new(&env, store, config);

        writeln!(env.stdout(), "DNSSEC signature for zone {}", self.zone);
        let step = signer
            .sign(&self.zone)
            .with_context(|| format!("signing zone {}", self.zone))?;
        writeln!(
            env.stdout(),
            "Zone {} signed and verified with serial {}",
            self.zone,
            step.next
        );
        Ok(())
    }
}
