//! Reading DNSSEC key files.
//!
//! Keys are generated by `dnssec-keygen` and stored as
//! `K<zone>.+<algorithm>+<tag>.key` (the DNSKEY record in zone file format)
//! and a matching `.private` file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use domain::base::iana::SecAlg;
use domain::rdata::Dnskey;
use domain::utils::base64;
use regex::Regex;

use crate::error::Error;
use crate::zone::ZoneName;

/// The DNSKEY fields following the record type: flags, protocol, algorithm
/// and the public key.
static DNSKEY_FIELDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DNSKEY\s+(\d+)\s+\d+\s+(\d+)\s+(.+)").unwrap());

static KEY_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+(\d+)\+(\d+)\.key$").unwrap());

//------------ DnssecFlag ----------------------------------------------------

/// The DNSKEY flags of the keys we work with.
///
/// See RFC 4034, section 2.1.1: bit 7 is the zone key flag, bit 15 the
/// secure entry point flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DnssecFlag {
    /// Zone signing key.
    Zsk,

    /// Key signing key.
    Ksk,
}

impl DnssecFlag {
    pub fn to_int(self) -> u16 {
        match self {
            Self::Zsk => 256,
            Self::Ksk => 257,
        }
    }

    pub fn from_int(flags: u16) -> Option<Self> {
        match flags {
            256 => Some(Self::Zsk),
            257 => Some(Self::Ksk),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Zsk => "ZSK",
            Self::Ksk => "KSK",
        }
    }
}

impl fmt::Display for DnssecFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mnemonic(), self.to_int())
    }
}

//------------ DnssecAlgorithm -----------------------------------------------

/// The supported DNSSEC signing algorithms.
///
/// See <https://www.iana.org/assignments/dns-sec-alg-numbers/>. The
/// deprecated SHA-1 based algorithms are not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DnssecAlgorithm {
    /// RSA with SHA-256.
    #[value(name = "RSASHA256", alias("8"))]
    RsaSha256,

    /// RSA with SHA-512.
    #[value(name = "RSASHA512", alias("10"))]
    RsaSha512,

    /// ECDSA P-256 with SHA-256.
    #[value(name = "ECDSAP256SHA256", alias("13"))]
    EcdsaP256Sha256,

    /// ECDSA P-384 with SHA-384.
    #[value(name = "ECDSAP384SHA384", alias("14"))]
    EcdsaP384Sha384,

    /// ED25519.
    #[value(name = "ED25519", alias("15"))]
    Ed25519,

    /// ED448.
    #[value(name = "ED448", alias("16"))]
    Ed448,
}

impl DnssecAlgorithm {
    pub fn to_int(self) -> u8 {
        match self {
            Self::RsaSha256 => 8,
            Self::RsaSha512 => 10,
            Self::EcdsaP256Sha256 => 13,
            Self::EcdsaP384Sha384 => 14,
            Self::Ed25519 => 15,
            Self::Ed448 => 16,
        }
    }

    pub fn from_int(algorithm: u8) -> Option<Self> {
        match algorithm {
            8 => Some(Self::RsaSha256),
            10 => Some(Self::RsaSha512),
            13 => Some(Self::EcdsaP256Sha256),
            14 => Some(Self::EcdsaP384Sha384),
            15 => Some(Self::Ed25519),
            16 => Some(Self::Ed448),
            _ => None,
        }
    }

    /// The name as used by the BIND tools.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::RsaSha256 => "RSASHA256",
            Self::RsaSha512 => "RSASHA512",
            Self::EcdsaP256Sha256 => "ECDSAP256SHA256",
            Self::EcdsaP384Sha384 => "ECDSAP384SHA384",
            Self::Ed25519 => "ED25519",
            Self::Ed448 => "ED448",
        }
    }
}

impl fmt::Display for DnssecAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mnemonic(), self.to_int())
    }
}

//------------ KeyError ------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// No uncommented line with a DNSKEY record.
    MissingDnskey,

    /// The flags are neither a ZSK nor a KSK.
    UnknownFlag(String),

    /// The algorithm number is not supported.
    UnknownAlgorithm(String),

    /// The public key is not valid base64.
    InvalidPublicKey(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDnskey => f.write_str("no DNSKEY record found"),
            Self::UnknownFlag(flag) => write!(f, "unrecognized DNSKEY flag: {flag}"),
            Self::UnknownAlgorithm(alg) => write!(f, "unrecognized DNSSEC algorithm: {alg}"),
            Self::InvalidPublicKey(err) => write!(f, "invalid public key: {err}"),
        }
    }
}

impl std::error::Error for KeyError {}

impl From<KeyError> for Error {
    fn from(err: KeyError) -> Self {
        err.to_string().into()
    }
}

//------------ KeyData -------------------------------------------------------

/// The interesting parts of a DNSKEY record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyData {
    pub flag: DnssecFlag,
    pub algorithm: DnssecAlgorithm,

    /// The base64 encoded public key, without whitespace.
    pub public_key: String,
}

impl KeyData {
    /// Compute the key tag as specified in RFC 4034, appendix B.
    pub fn key_tag(&self) -> Result<u16, KeyError> {
        let key: Vec<u8> = base64::decode(&self.public_key)
            .map_err(|err| KeyError::InvalidPublicKey(err.to_string()))?;

        let dnskey = Dnskey::new(
            self.flag.to_int(),
            3,
            SecAlg::from_int(self.algorithm.to_int()),
            key,
        )
        .map_err(|err| KeyError::InvalidPublicKey(err.to_string()))?;
        Ok(dnskey.key_tag())
    }
}

/// Extract the key data from the content of a `.key` file.
///
/// The DNSKEY record is taken from the first line that is not a comment.
/// `dnssec-keygen` splits long keys with spaces, these are removed.
pub fn extract_key_data(content: &str) -> Result<KeyData, KeyError> {
    let captures = content
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(';'))
        .find_map(|line| DNSKEY_FIELDS.captures(line))
        .ok_or(KeyError::MissingDnskey)?;

    let flag = &captures[1];
    let flag = flag
        .parse()
        .ok()
        .and_then(DnssecFlag::from_int)
        .ok_or_else(|| KeyError::UnknownFlag(flag.into()))?;

    let algorithm = &captures[2];
    let algorithm = algorithm
        .parse()
        .ok()
        .and_then(DnssecAlgorithm::from_int)
        .ok_or_else(|| KeyError::UnknownAlgorithm(algorithm.into()))?;

    let public_key = captures[3]
        .split(';')
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect();

    Ok(KeyData {
        flag,
        algorithm,
        public_key,
    })
}

/// Extract the key tag from the name of a `.key` file.
///
/// Returns an empty string if the name does not end in
/// `+<algorithm>+<tag>.key`.
pub fn extract_key_tag(file_name: &str) -> String {
    let base_name = Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    KEY_FILE_NAME
        .captures(&base_name)
        .map(|captures| captures[2].to_string())
        .unwrap_or_default()
}

//------------ KeyFile -------------------------------------------------------

/// A public key file of a zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The key tag as given in the file name.
    pub fn tag(&self) -> String {
        extract_key_tag(&self.file_name())
    }

    /// The matching private key file.
    pub fn private_path(&self) -> PathBuf {
        self.path.with_extension("private")
    }

    pub fn read(&self) -> Result<KeyData, Error> {
        let content = fs::read_to_string(&self.path)
            .map_err(|err| format!("unable to load file '{}': {err}", self.path.display()))?;
        extract_key_data(&content)
            .map_err(|err| format!("{err} in '{}'", self.path.display()).into())
    }
}

/// Find the public key files of a zone, sorted by file name.
///
/// With an algorithm, only keys of that algorithm are returned.
pub fn find_zone_keys(
    keys_dir: &Path,
    zone: &ZoneName,
    algorithm: Option<DnssecAlgorithm>,
) -> Result<Vec<KeyFile>, Error> {
    let prefix = match algorithm {
        Some(algorithm) => format!("K{zone}.+{:03}+", algorithm.to_int()),
        None => format!("K{zone}.+"),
    };

    let entries = match fs::read_dir(keys_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(format!(
                "unable to read key directory '{}': {err}",
                keys_dir.display()
            )
            .into())
        }
    };

    let mut keys = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && name.ends_with(".key") && entry.path().is_file() {
            keys.push(KeyFile { path: entry.path() });
        }
    }
    keys.sort_by_key(KeyFile::file_name);
    Ok(keys)
}

//============ Tests =========================================================
