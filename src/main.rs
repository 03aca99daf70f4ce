use std::process::ExitCode;

fn main() -> ExitCode {
    zonectl::run(zonectl::env::RealEnv).into()
}
