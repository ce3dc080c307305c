use super::{Command, CommandError};
use crate::shell::ShellContext;
use std::env;
use std::io::{self, Write};

#[derive(Clone, Debug, Default)]
pub struct PwdCommand;

impl Command for PwdCommand {
    fn execute(&self, _args: &[String], _ctx: &mut ShellContext) -> Result<i32, CommandError> {
        let cwd = env::current_dir()
            .map_err(|e| CommandError::ExecutionError(crate::process::sys::os_message(&e)))?;
        writeln!(io::stdout().lock(), "{}", cwd.display())?;
        Ok(0)
    }
}
