use crate::config::Config;
use crate::env::Env;
use crate::error::{bail, Error};
use crate::tool::Toolchain;

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Dig {
    /// The arguments passed on to dig
    #[arg(
        value_name = "ARGS",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

impl Dig {
    pub fn execute(self, env: impl Env, config: &Config) -> Result<(), Error> {
        let cmd = Toolchain::new(&env, config).dig(self.args);
        let output = env.exec(&cmd)?;
        if !output.success() {
            bail!("dig failed: {}", output.error_text());
        }
        write!(env.stdout(), "{}", output.stdout);
        Ok(())
    }
}
