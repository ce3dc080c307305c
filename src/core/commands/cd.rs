use super::{Command, CommandError};
use crate::path::PathExpander;
use crate::process::sys::os_message;
use crate::shell::ShellContext;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Clone, Debug, Default)]
pub struct CdCommand;

impl CdCommand {
    fn target(args: &[String], ctx: &ShellContext) -> Result<(PathBuf, bool), CommandError> {
        match args.first().map(String::as_str) {
            None => ctx
                .env
                .get("HOME")
                .map(|home| (PathBuf::from(home), false))
                .ok_or_else(|| CommandError::ExecutionError("HOME not set".into())),
            Some("-") => ctx
                .env
                .get("OLDPWD")
                .map(|old| (PathBuf::from(old), true))
                .ok_or_else(|| CommandError::ExecutionError("OLDPWD not set".into())),
            Some(path) => Ok((PathExpander::from_env(&ctx.env).expand(path)?, false)),
        }
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError> {
        if args.len() > 1 {
            return Err(CommandError::InvalidArguments("too many arguments".into()));
        }
        let (target, announce) = Self::target(args, ctx)?;

        let previous = env::current_dir()
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| ctx.env.get("PWD").map(str::to_string));

        env::set_current_dir(&target).map_err(|e| {
            CommandError::ExecutionError(format!("{}: {}", target.display(), os_message(&e)))
        })?;

        let current = env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| target.to_string_lossy().into_owned());
        if let Some(previous) = previous {
            ctx.env.set("OLDPWD", &previous)?;
        }
        ctx.env.set("PWD", &current)?;

        if announce {
            writeln!(io::stdout().lock(), "{}", current)?;
        }
        Ok(0)
    }
}
