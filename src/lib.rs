//! Serial management and DNSSEC signing for BIND style zone files.
//!
//! Zone files go through three stages, each in a directory of its own:
//! the hand written `raw` zone with a serial placeholder, the `unsigned`
//! zone with a date based serial filled in and the `signed` zone produced
//! by `dnssec-signzone`. The BIND tools do the actual checking, signing and
//! verification, either in a Docker Compose service or on the host.
use std::ffi::OsString;

use clap::Parser;
use env::Env;
use error::Error;

pub use self::args::Args;

pub mod args;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod keys;
pub mod log;
pub mod serial;
pub mod store;
pub mod tool;
pub mod util;
pub mod workflow;
pub mod zone;

pub fn parse_args(env: impl Env) -> Result<Args, Error> {
    let args: Vec<OsString> = env.args_os().collect();
    Ok(Args::try_parse_from(args)?)
}

pub fn run(env: impl Env) -> u8 {
    let res = parse_args(&env).and_then(|args| {
        let _guard = log::init_tracing(&env, args.verbosity);
        args.execute(&env)
    });
    match res {
        Ok(()) => 0,
        Err(err) => {
            err.pretty_print(&env);
            err.exit_code()
        }
    }
}
