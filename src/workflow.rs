//! The zone signing workflow.
//!
//! A zone moves through three stages, each a zone file of its own:
//!
//! ```text
//!   raw  --prepare-->  unsigned  --sign-->  signed
//! ```
//!
//! `prepare` replaces the serial placeholder of the raw zone with a fresh
//! serial and checks the syntax of the result. `sign` always prepares the
//! unsigned zone anew before handing it to the signer, and verifies the
//! signed zone afterwards. Every step has to succeed for the next one to
//! run. Files written by earlier steps are left in place when a later one
//! fails.

use tracing::{debug, info};

use crate::config::Config;
use crate::env::Env;
use crate::error::{bail, Context, Error};
use crate::serial::{compute_next_serial, extract_current_serial};
use crate::store::ZoneStore;
use crate::tool::{ToolCommand, ToolOutput, Toolchain};
use crate::zone::{ZoneContext, ZoneName};

//------------ Outcome -------------------------------------------------------

/// The result of a step that needs a zone file that may not be there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The step ran and succeeded.
    Done,

    /// The zone file the step works on does not exist, nothing was done.
    Missing,
}

//------------ SerialStep ----------------------------------------------------

/// The serial of the last signed zone and the one to use next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerialStep {
    /// The serial of the signed zone, 0 if it has never been signed.
    pub current: u64,
    pub next: u32,
}

//------------ ZoneSigner ----------------------------------------------------

pub struct ZoneSigner<'a, E, S> {
    env: E,
    store: S,
    config: &'a Config,
    toolchain: Toolchain<'a>,
}

impl<'a, E: Env, S: ZoneStore> ZoneSigner<'a, E, S> {
    pub fn new(env: E, store: S, config: &'a Config) -> Self {
        let toolchain = Toolchain::new(&env, config);
        Self {
            env,
            store,
            config,
            toolchain,
        }
    }

    /// Determine the serial for the next signing run.
    pub fn next_serial(&self, zone: &ZoneName) -> Result<SerialStep, Error> {
        let current = self
            .store
            .get_zone_file(zone, ZoneContext::Signed)?
            .map(|content| extract_current_serial(content.lines()))
            .unwrap_or(0);
        let next = compute_next_serial(current, self.env.today())?;
        Ok(SerialStep { current, next })
    }

    /// Create the unsigned zone from the raw zone and check its syntax.
    pub fn prepare(&self, zone: &ZoneName) -> Result<SerialStep, Error> {
        let raw = self
            .store
            .get_zone_file(zone, ZoneContext::Raw)?
            .ok_or_else(|| {
                format!(
                    "zone file not found: {}",
                    self.store.describe(zone, ZoneContext::Raw)
                )
            })?;

        let step = self.next_serial(zone)?;
        info!(zone = %zone, current = step.current, next = step.next, "computed serial");

        let unsigned = raw.replace(&self.config.serial_placeholder, &step.next.to_string());
        self.store
            .put_zone_file(zone, ZoneContext::Unsigned, &unsigned)?;
        info!(zone = %zone, "wrote unsigned zone");

        match self.check(zone)? {
            Outcome::Done => Ok(step),
            Outcome::Missing => Err(format!(
                "unsigned zone file not found: {}",
                self.store.describe(zone, ZoneContext::Unsigned)
            )
            .into()),
        }
    }

    /// Check the syntax of the unsigned zone.
    pub fn check(&self, zone: &ZoneName) -> Result<Outcome, Error> {
        if !self.store.has_zone_file(zone, ZoneContext::Unsigned)? {
            return Ok(Outcome::Missing);
        }

        let output = self.run(&self.toolchain.checkzone(zone))?;
        if !output.success() {
            bail!("failed to check zone {zone}: {}", output.error_text());
        }
        info!(zone = %zone, "unsigned zone syntax is valid");
        Ok(Outcome::Done)
    }

    /// Run the whole workflow: prepare, sign and verify.
    pub fn sign(&self, zone: &ZoneName) -> Result<SerialStep, Error> {
        let step = self
            .prepare(zone)
            .with_context(|| format!("preparing zone {zone}"))?;

        // dnssec-signzone runs inside the signed zone directory.
        self.store.ensure_context_dir(ZoneContext::Signed)?;
        let output = self.run(&self.toolchain.signzone(zone))?;
        if !output.success() {
            bail!("failed to sign zone {zone}: {}", output.error_text());
        }
        info!(zone = %zone, serial = step.next, "signed zone");

        match self.verify(zone)? {
            Outcome::Done => Ok(step),
            Outcome::Missing => Err(format!(
                "signed zone file not found after signing: {}",
                self.store.describe(zone, ZoneContext::Signed)
            )
            .into()),
        }
    }

    /// Verify the signatures of the signed zone.
    pub fn verify(&self, zone: &ZoneName) -> Result<Outcome, Error> {
        if !self.store.has_zone_file(zone, ZoneContext::Signed)? {
            return Ok(Outcome::Missing);
        }

        let output = self.run(&self.toolchain.verify(zone))?;
        if !output.success() {
            bail!("failed to verify zone {zone}: {}", output.error_text());
        }
        info!(zone = %zone, "signatures verified");
        Ok(Outcome::Done)
    }

    fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, Error> {
        debug!(command = %cmd, "running external tool");
        let output = self.env.exec(cmd)?;
        debug!(status = ?output.status, "external tool finished");
        Ok(output)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::config::Config;
    use crate::env::fake::{FakeCmd, FakeEnv, FakeTool};
    use crate::store::{MemZoneStore, ZoneStore};
    use crate::zone::{ZoneContext, ZoneName};

    use super::{Outcome, SerialStep, ZoneSigner};

    const RAW: &str = "\
$TTL 3600
@ IN SOA ns1.example.com. hostmaster.example.com. (
    __SERIAL__ ; serial
    3600 ; refresh
    900 ; retry
    1209600 ; expire
    300 ; minimum
)
@ IN NS ns1.example.com.
; the serial is __SERIAL__
";

    fn zone() -> ZoneName {
        "example.com".parse().unwrap()
    }

    fn env() -> FakeEnv {
        FakeEnv::from(FakeCmd::new(["zonectl"]))
    }

    #[test]
    fn prepare_first_serial() {
        let env = env();
        let config = Config::default();
        let store = MemZoneStore::default().with_file(&zone(), ZoneContext::Raw, RAW);

        let signer = ZoneSigner::new(&env, &store, &config);
        let step = signer.prepare(&zone()).unwrap();
        assert_eq!(
            step,
            SerialStep {
                current: 0,
                next: 2025061501
            }
        );

        let unsigned = store
            .get_zone_file(&zone(), ZoneContext::Unsigned)
            .unwrap()
            .unwrap();
        assert!(unsigned.contains("    2025061501 ; serial\n"));
        assert!(unsigned.contains("; the serial is 2025061501\n"));
        assert!(!unsigned.contains("__SERIAL__"));

        // The raw zone stays untouched.
        assert_eq!(
            store.get_zone_file(&zone(), ZoneContext::Raw).unwrap(),
            Some(RAW.into())
        );

        let commands = env.get_commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].ends_with(
            "named-checkzone example.com /data/zones/unsigned/example.com.zone"
        ));
    }

    #[test]
    fn prepare_continues_from_signed_serial() {
        let env = env();
        let config = Config::default();
        let store = MemZoneStore::default()
            .with_file(&zone(), ZoneContext::Raw, RAW)
            .with_file(
                &zone(),
                ZoneContext::Signed,
                "example.com. 3600 IN SOA ns1 host 2025061507 ; serial\n",
            );

        let signer = ZoneSigner::new(&env, &store, &config);
        assert_eq!(signer.prepare(&zone()).unwrap().next, 2025061508);
    }

    #[test]
    fn prepare_uses_configured_placeholder() {
        let env = env();
        let config = Config {
            serial_placeholder: "@@SERIAL@@".into(),
            ..Default::default()
        };
        let store = MemZoneStore::default().with_file(
            &zone(),
            ZoneContext::Raw,
            "@@SERIAL@@ ; serial\n__SERIAL__\n",
        );

        ZoneSigner::new(&env, &store, &config)
            .prepare(&zone())
            .unwrap();
        assert_eq!(
            store.get_zone_file(&zone(), ZoneContext::Unsigned).unwrap(),
            Some("2025061501 ; serial\n__SERIAL__\n".into())
        );
    }

    #[test]
    fn prepare_without_raw_zone() {
        let env = env();
        let config = Config::default();
        let store = MemZoneStore::default();

        let err = ZoneSigner::new(&env, &store, &config)
            .prepare(&zone())
            .unwrap_err();
        assert_eq!(err.to_string(), "zone file not found: raw/example.com.zone");
        assert!(env.get_commands().is_empty());
        assert!(!store.has_zone_file(&zone(), ZoneContext::Unsigned).unwrap());
    }

    #[test]
    fn prepare_with_future_serial() {
        let env = FakeEnv::from(
            FakeCmd::new(["zonectl"]).today(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()),
        );
        let config = Config::default();
        let store = MemZoneStore::default()
            .with_file(&zone(), ZoneContext::Raw, RAW)
            .with_file(&zone(), ZoneContext::Signed, "2025061501 ; serial\n");

        let err = ZoneSigner::new(&env, &store, &config)
            .prepare(&zone())
            .unwrap_err();
        assert!(err.to_string().contains("in the future"));
        assert!(!store.has_zone_file(&zone(), ZoneContext::Unsigned).unwrap());
    }

    #[test]
    fn failed_check_aborts_signing() {
        let env = FakeEnv::from(FakeCmd::new(["zonectl"]).tool(
            "named-checkzone",
            FakeTool {
                output: crate::tool::ToolOutput {
                    status: Some(1),
                    stdout: "zone example.com/IN: has no NS records\n".into(),
                    stderr: String::new(),
                },
                creates: Vec::new(),
            },
        ));
        let config = Config::default();
        let store = MemZoneStore::default().with_file(&zone(), ZoneContext::Raw, RAW);

        let err = ZoneSigner::new(&env, &store, &config)
            .sign(&zone())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to check zone example.com: zone example.com/IN: has no NS records"
        );

        // The unsigned zone is kept for inspection, the signer never ran.
        assert!(store.has_zone_file(&zone(), ZoneContext::Unsigned).unwrap());
        let commands = env.get_commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].contains("named-checkzone"));
    }

    #[test]
    fn sign_without_signed_output() {
        // The fake signer succeeds but writes nothing to the in-memory store.
        let env = env();
        let config = Config::default();
        let store = MemZoneStore::default().with_file(&zone(), ZoneContext::Raw, RAW);

        let err = ZoneSigner::new(&env, &store, &config)
            .sign(&zone())
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("signed zone file not found after signing"));
        assert_eq!(env.get_commands().len(), 2);
    }

    #[test]
    fn standalone_steps_report_missing_files() {
        let env = env();
        let config = Config::default();
        let store = MemZoneStore::default();
        let signer = ZoneSigner::new(&env, &store, &config);

        assert_eq!(signer.check(&zone()).unwrap(), Outcome::Missing);
        assert_eq!(signer.verify(&zone()).unwrap(), Outcome::Missing);
        assert!(env.get_commands().is_empty());
    }

    #[test]
    fn verify_failure_is_fatal() {
        let env = FakeEnv::from(
            FakeCmd::new(["zonectl"]).tool("dnssec-verify", FakeTool::fail("No DNSKEY for zone")),
        );
        let config = Config::default();
        let store =
            MemZoneStore::default().with_file(&zone(), ZoneContext::Signed, "2025061501 ; serial");

        let err = ZoneSigner::new(&env, &store, &config)
            .verify(&zone())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to verify zone example.com: No DNSKEY for zone"
        );
    }
}
