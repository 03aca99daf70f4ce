//! Zone names, zone file contexts and where zone files live.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// The extension of every zone file.
pub const ZONE_FILE_EXTENSION: &str = ".zone";

//------------ ZoneName ------------------------------------------------------

/// A validated zone name.
///
/// Zone names end up in file paths, so only names that pass
/// [`is_valid_zone_name`] can be constructed. A single trailing dot is
/// dropped when parsing, `example.com.` is the zone `example.com`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneName(String);

impl ZoneName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file name of this zone's zone file.
    pub fn file_name(&self) -> String {
        format!("{}{ZONE_FILE_EXTENSION}", self.0)
    }
}

impl FromStr for ZoneName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix('.').unwrap_or(s);
        if is_valid_zone_name(name) {
            Ok(Self(name.into()))
        } else {
            Err(format!("invalid zone name: {s}").into())
        }
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a zone name argument.
pub fn parse_zone_name(arg: &str) -> Result<ZoneName, Error> {
    arg.parse()
}

/// Check whether a string is usable as a zone name.
///
/// The name must contain at least one dot and be a syntactically valid
/// host name: dot separated labels of ASCII letters, digits and hyphens,
/// no label empty, longer than 63 octets or starting or ending with a
/// hyphen. A trailing dot is not accepted here, [`ZoneName`] strips it
/// before checking.
pub fn is_valid_zone_name(name: &str) -> bool {
    if !name.contains('.') || name.len() > 253 {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

//------------ ZoneContext ---------------------------------------------------

/// The stage of a zone file in the signing workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneContext {
    /// Edited by hand, contains the serial placeholder.
    Raw,

    /// The raw zone with a real serial, input of the signer.
    Unsigned,

    /// Output of the signer, served by the name server.
    Signed,
}

impl ZoneContext {
    pub const ALL: [Self; 3] = [Self::Raw, Self::Unsigned, Self::Signed];

    /// The name of the directory holding zone files of this context.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Unsigned => "unsigned",
            Self::Signed => "signed",
        }
    }
}

impl fmt::Display for ZoneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//------------ ZoneLayout ----------------------------------------------------

/// The location of zone files and keys.
///
/// Zone files are stored as `<zones>/<context>/<zone>.zone`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneLayout {
    zones: PathBuf,
    keys: PathBuf,
}

impl ZoneLayout {
    pub fn new(zones: impl Into<PathBuf>, keys: impl Into<PathBuf>) -> Self {
        Self {
            zones: zones.into(),
            keys: keys.into(),
        }
    }

    pub fn zones_root(&self) -> &Path {
        &self.zones
    }

    pub fn zones_dir(&self, context: ZoneContext) -> PathBuf {
        self.zones.join(context.as_str())
    }

    pub fn zone_file(&self, zone: &ZoneName, context: ZoneContext) -> PathBuf {
        self.zones_dir(context).join(zone.file_name())
    }

    pub fn keys_dir(&self) -> &Path {
        &self.keys
    }
}

//============ Tests =========================================================
