use super::{Command, CommandError};
use crate::core::env::{is_valid_name, EnvError};
use crate::shell::ShellContext;

#[derive(Clone, Debug, Default)]
pub struct UnsetCommand;

impl Command for UnsetCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError> {
        let mut status = 0;
        for name in args {
            if !is_valid_name(name) {
                eprintln!("vena: unset: {}", EnvError::InvalidName(name.clone()));
                status = 1;
                continue;
            }
            ctx.env.unset(name);
        }
        Ok(status)
    }
}
