use super::{Command, CommandError};
use crate::shell::ShellContext;
use std::io::{self, Write};

/// Print the shell's variables as `NAME=VALUE`, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct EnvCommand;

impl Command for EnvCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError> {
        if let Some(first) = args.first() {
            return Err(CommandError::InvalidArguments(format!(
                "{}: arguments are not supported",
                first
            )));
        }

        let mut out = io::stdout().lock();
        for (name, value) in ctx.env.iter() {
            writeln!(out, "{}={}", name, value)?;
        }
        Ok(0)
    }
}
