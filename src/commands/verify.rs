use clap::builder::ValueParser;

use crate::config::Config;
use crate::env::Env;
use crate::error::Error;
use crate::log;
use crate::store::FsZoneStore;
use crate::workflow::{Outcome, ZoneSigner};
use crate::zone::{parse_zone_name, ZoneName};

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Verify {
    /// The zone to verify
    #[arg(value_name = "ZONE", value_parser = ValueParser::new(parse_zone_name))]
    zone: ZoneName,
}

impl Verify {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let store = FsZoneStore::new(config.host_layout(&env));
        let signer = ZoneSigner::new(&env, store, config);

        match signer.verify(&self.zone)? {
            Outcome::Done => {
                writeln!(env.stdout(), "DNSSEC verification OK for zone {}", self.zone);
            }
            Outcome::Missing => log::warn(
                &env,
                format_args!("signed zone file not found for zone {}", self.zone),
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use crate::env::fake::{FakeCmd, FakeTool};

    #[test]
    fn verify_signed_zone() {
        let dir = tempfile::TempDir::new().unwrap();
        let signed = dir.path().join(".docker/server/zones/signed");
        fs::create_dir_all(&signed).unwrap();
        fs::write(signed.join("example.com.zone"), "2025061501 ; serial\n").unwrap();

        let cmd = FakeCmd::new(["zonectl", "verify", "example.com"]).cwd(dir.path());

        let res = cmd.run();
        assert_eq!(res.exit_code, 0);
        assert_eq!(res.stdout, "DNSSEC verification OK for zone example.com\n");
        assert_eq!(
            res.commands,
            ["docker compose run --rm -w /data tools dnssec-verify -o example.com \
              /data/zones/signed/example.com.zone"]
        );

        let res = cmd
            .tool(
                "dnssec-verify",
                FakeTool::fail("Zone contains NSEC records but no signatures\n"),
            )
            .run();
        assert_eq!(res.exit_code, 1);
        assert_eq!(
            res.stderr,
            "[zonectl] ERROR: failed to verify zone example.com: \
             Zone contains NSEC records but no signatures\n"
        );
    }

    #[test]
    fn verify_without_signed_zone() {
        let dir = tempfile::TempDir::new().unwrap();
        let res = FakeCmd::new(["zonectl", "verify", "example.com"])
            .cwd(dir.path())
            .run();

        assert_eq!(res.exit_code, 0);
        assert_eq!(
            res.stderr,
            "[zonectl] WARNING: signed zone file not found for zone example.com\n"
        );
        assert!(res.commands.is_empty());
    }
}
