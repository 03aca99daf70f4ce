//! Date based zone serials.
//!
//! Serials have the form `YYYYMMDDVV`: the date the zone was signed on
//! followed by a two digit version counter for that day, starting at 01.
//! This keeps serials increasing as long as a zone is signed at most 99
//! times a day and the clock does not go backwards.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::Error;

/// The highest version number usable on a single day.
pub const MAX_VERSION: u32 = 99;

/// A line like `2025123001 ; serial`, as written in SOA records.
static SERIAL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d{10}\s*;\s*serial").unwrap());

static SERIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{10}").unwrap());

//------------ SerialError ---------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerialError {
    /// The date of the current serial lies after today.
    InFuture(u64),

    /// The current serial already uses the last version of today.
    VersionExhausted(u64),

    /// The date cannot be encoded in a 32 bit serial.
    OutOfRange(NaiveDate),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InFuture(serial) => {
                write!(f, "current serial number is in the future: {serial}")
            }
            Self::VersionExhausted(serial) => write!(
                f,
                "next version exceeds maximum version of {MAX_VERSION} for today: {serial}"
            ),
            Self::OutOfRange(date) => {
                write!(f, "date {date} cannot be encoded in a serial number")
            }
        }
    }
}

impl std::error::Error for SerialError {}

impl From<SerialError> for Error {
    fn from(err: SerialError) -> Self {
        err.to_string().into()
    }
}

//------------ Functions -----------------------------------------------------

/// The date encoded as a `YYYYMMDD` number.
fn date_number(date: NaiveDate) -> u64 {
    // Dates before year 0 have no sensible serial, they clamp to 0.
    let year = u64::try_from(date.year()).unwrap_or(0);
    year * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day())
}

/// Compute the serial following `current` when signing on `today`.
///
/// A `current` of zero means the zone has never been signed. A serial from
/// an earlier day restarts the version at 01, however old it is.
///
/// `current` is wider than a serial so that ten digit numbers which do not
/// fit into 32 bits are still seen for what they are.
pub fn compute_next_serial(current: u64, today: NaiveDate) -> Result<u32, SerialError> {
    let today_number = date_number(today);

    let version = if current == 0 {
        1
    } else {
        let serial_date = current / 100;
        let serial_version = current % 100;

        if serial_date > today_number {
            return Err(SerialError::InFuture(current));
        }

        if serial_date < today_number {
            1
        } else if serial_version >= u64::from(MAX_VERSION) {
            return Err(SerialError::VersionExhausted(current));
        } else {
            serial_version + 1
        }
    };

    u32::try_from(today_number * 100 + version)
        .map_err(|_| SerialError::OutOfRange(today))
}

/// Find the serial in the lines of a zone file.
///
/// Returns the ten digit number on the first line that has one followed by
/// a `; serial` comment, or 0 if there is no such line.
pub fn extract_current_serial<I, S>(lines: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .find(|line| SERIAL_LINE.is_match(line.as_ref()))
        .and_then(|line| {
            SERIAL
                .find(line.as_ref())
                .and_then(|m| m.as_str().parse().ok())
        })
        .unwrap_or(0)
}

//============ Tests =========================================================
