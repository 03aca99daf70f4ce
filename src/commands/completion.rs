use crate::env::Env;
use crate::error::Error;
use crate::log::program_name;
use crate::Args;

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Completion {
    /// The shell to generate the completion script for
    #[arg(value_name = "SHELL")]
    shell: clap_complete::Shell,
}

impl Completion {
    pub fn execute(self, env: impl Env) -> Result<(), Error> {
        let binary_name = program_name(&env);

        clap_complete::generate(
            self.shell,
            &mut <Args as clap::CommandFactory>::command(),
            binary_name,
            &mut &env.stdout(),
        );

        Ok(())
    }
}
