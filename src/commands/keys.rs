use clap::builder::ValueParser;
use tracing::debug;

use crate::config::Config;
use crate::env::Env;
use crate::error::{bail, Error};
use crate::keys::{find_zone_keys, DnssecFlag, KeyError, KeyFile};
use crate::log;
use crate::tool::Toolchain;
use crate::zone::{parse_zone_name, ZoneName};

const HEADER: [&str; 5] = ["Tag", "Type", "Algorithm", "PK", "Key (base64)"];

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Keys {
    /// List only key signing keys
    #[arg(short = 'k', long = "only-ksk")]
    only_ksk: bool,

    /// The zone to list the keys of
    #[arg(value_name = "ZONE", value_parser = ValueParser::new(parse_zone_name))]
    zone: ZoneName,
}

impl Keys {
    pub fn new(zone: ZoneName, only_ksk: bool) -> Self {
        Self { only_ksk, zone }
    }

    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let layout = config.host_layout(&env);
        let keys = find_zone_keys(layout.keys_dir(), &self.zone, None)?;
        if keys.is_empty() {
            log::warn(&env, format_args!("no keys found for zone {}", self.zone));
            return Ok(());
        }

        let mut rows = Vec::new();
        let mut ksk_files = Vec::new();
        for key in &keys {
            let data = key.read()?;
            check_key_tag(&env, key, data.key_tag());

            let is_ksk = data.flag == DnssecFlag::Ksk;
            if !self.only_ksk || is_ksk {
                rows.push([
                    key.tag(),
                    data.flag.to_string(),
                    data.algorithm.to_string(),
                    if key.private_path().is_file() { "OK" } else { "KO" }.to_string(),
                    data.public_key,
                ]);
            }
            if is_ksk {
                ksk_files.push(key.file_name());
            }
        }

        let mut out = env.stdout();
        let title = if self.only_ksk { "KSK(s)" } else { "Key(s)" };
        writeln!(out, "{title} for zone {}", self.zone);
        writeln!(out);
        write_table(&mut out, &rows);

        if ksk_files.is_empty() {
            log::warn(
                &env,
                format_args!("zone {} has no KSK, no DS records to show", self.zone),
            );
            return Ok(());
        }

        let cmd = Toolchain::new(&env, config).dsfromkey(&ksk_files);
        debug!(command = %cmd, "generating DS records");
        let output = env.exec(&cmd)?;
        if !output.success() {
            bail!("failed to generate DS records: {}", output.error_text());
        }

        writeln!(out);
        writeln!(out, "DS record(s) for the registrar");
        writeln!(out);
        writeln!(out, "{}", output.stdout.trim_end());
        Ok(())
    }
}

/// Warn if the tag in a key file name doesn't match its DNSKEY record.
fn check_key_tag(env: &impl Env, key: &KeyFile, computed: Result<u16, KeyError>) {
    let named = key.tag();
    match computed {
        Ok(computed) if named.parse::<u16>() == Ok(computed) => {}
        Ok(computed) => log::warn(
            env,
            format_args!(
                "key tag {computed} of '{}' differs from the tag in its name",
                key.file_name()
            ),
        ),
        Err(err) => log::warn(
            env,
            format_args!("cannot compute the key tag of '{}': {err}", key.file_name()),
        ),
    }
}

fn write_table<T: std::io::Write>(out: &mut crate::env::Stream<T>, rows: &[[String; 5]]) {
    let mut widths = HEADER.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: [&str; 5]| {
        let cells: Vec<_> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:width$}"))
            .collect();
        cells.join("  ").trim_end().to_string()
    };

    writeln!(out, "{}", line(HEADER));
    writeln!(out, "{}", line(widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str)));
    for row in rows {
        writeln!(out, "{}", line(row.each_ref().map(String::as_str)));
    }
}
