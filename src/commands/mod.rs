//! The commands of _zonectl_.
pub mod check;
pub mod completion;
pub mod dig;
pub mod keygen;
pub mod keys;
pub mod serial;
pub mod sign;
pub mod verify;

use crate::config::Config;
use crate::env::Env;

use super::error::Error;

#[derive(Clone, Debug, PartialEq, Eq, clap::Subcommand)]
pub enum Command {
    /// Sign a zone with DNSSEC
    ///
    /// The serial placeholder of the raw zone file is replaced by the next
    /// serial, the result is written as the unsigned zone and checked with
    /// named-checkzone. The unsigned zone is then signed with
    /// dnssec-signzone using the keys in the key directory and the signed
    /// zone is verified with dnssec-verify.
    ///
    /// Serials have the form YYYYMMDDVV. The next serial continues from the
    /// serial of the previously signed zone.
    #[command(name = "sign", verbatim_doc_comment)]
    Sign(self::sign::Sign),

    /// Check the syntax of the unsigned zone with named-checkzone
    #[command(name = "check")]
    Check(self::check::Check),

    /// Verify the signatures of the signed zone with dnssec-verify
    #[command(name = "verify")]
    Verify(self::verify::Verify),

    /// Show the current serial of a zone and the one the next signing will use
    #[command(name = "serial")]
    Serial(self::serial::Serial),

    /// Generate a key signing key and a zone signing key for a zone
    ///
    /// Nothing is generated if the zone already has keys for the
    /// algorithm. The keys of the zone are listed afterwards.
    #[command(name = "keygen")]
    Keygen(self::keygen::Keygen),

    /// List the DNSSEC keys of a zone and the DS records of its KSKs
    #[command(name = "keys")]
    Keys(self::keys::Keys),

    /// Run dig with the given arguments
    #[command(name = "dig")]
    Dig(self::dig::Dig),

    /// Print a shell completion script
    #[command(name = "completion")]
    Completion(self::completion::Completion),
}

impl Command {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        match self {
            Self::Sign(sign) => sign.execute(env, config),
            Self::Check(check) => check.execute(env, config),
            Self::Verify(verify) => verify.execute(env, config),
            Self::Serial(serial) => serial.execute(env, config),
            Self::Keygen(keygen) => keygen.execute(env, config),
            Self::Keys(keys) => keys.execute(env, config),
            Self::Dig(dig) => dig.execute(env, config),
            Self::Completion(completion) => completion.execute(env),
        }
    }
}
