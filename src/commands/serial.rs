use clap::builder::ValueParser;

use crate::config::Config;
use crate::env::Env;
use crate::error::Error;
use crate::store::FsZoneStore;
use crate::workflow::ZoneSigner;
use crate::zone::{parse_zone_name, ZoneName};

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Serial {
    /// The zone to show the serial of
    #[arg(value_name = "ZONE", value_parser = ValueParser::new(parse_zone_name))]
    zone: ZoneName,
}

impl Serial {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let store = FsZoneStore::new(config.host_layout(&env));
        let step = ZoneSigner::new(&env, store, config).next_serial(&self.zone)?;

        let mut out = env.stdout();
        match step.current {
            0 => writeln!(out, "current serial: none"),
            current => writeln!(out, "current serial: {current}"),
        }
        writeln!(out, "next serial:    {}", step.next);
        Ok(())
    }
}
