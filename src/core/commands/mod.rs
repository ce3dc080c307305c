use std::collections::BTreeMap;
use std::io;

mod cd;
mod echo;
mod env;
mod exit;
mod export;
mod pwd;
mod unset;

pub use cd::CdCommand;
pub use echo::EchoCommand;
pub use env::EnvCommand;
pub use exit::ExitCommand;
pub use export::ExportCommand;
pub use pwd::PwdCommand;
pub use unset::UnsetCommand;

use crate::core::env::EnvError;
use crate::path::PathError;
use crate::process::sys::os_message;
use crate::shell::ShellContext;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    ExecutionError(String),
    #[error("write error: {}", os_message(.0))]
    Io(#[from] io::Error),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Path(#[from] PathError),
}

/// A command that runs inside the shell process. `args` excludes the
/// command name. The returned value becomes the command's status.
pub trait Command {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError>;
}

#[derive(Clone, Debug)]
enum CommandType {
    Cd(CdCommand),
    Echo(EchoCommand),
    Env(EnvCommand),
    Exit(ExitCommand),
    Export(ExportCommand),
    Pwd(PwdCommand),
    Unset(UnsetCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, ctx),
            CommandType::Echo(cmd) => cmd.execute(args, ctx),
            CommandType::Env(cmd) => cmd.execute(args, ctx),
            CommandType::Exit(cmd) => cmd.execute(args, ctx),
            CommandType::Export(cmd) => cmd.execute(args, ctx),
            CommandType::Pwd(cmd) => cmd.execute(args, ctx),
            CommandType::Unset(cmd) => cmd.execute(args, ctx),
        }
    }
}

/// Registry of builtins, looked up by exact command name.
#[derive(Clone, Debug)]
pub struct Builtins {
    commands: BTreeMap<&'static str, CommandType>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd", CommandType::Cd(CdCommand));
        commands.insert("echo", CommandType::Echo(EchoCommand));
        commands.insert("env", CommandType::Env(EnvCommand));
        commands.insert("exit", CommandType::Exit(ExitCommand));
        commands.insert("export", CommandType::Export(ExportCommand));
        commands.insert("pwd", CommandType::Pwd(PwdCommand));
        commands.insert("unset", CommandType::Unset(UnsetCommand));
        Self { commands }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Run `argv[0]` if it names a builtin. Errors are reported on stderr
    /// as `vena: NAME: message` and turn into status 1.
    pub fn run(&self, argv: &[String], ctx: &mut ShellContext) -> Option<i32> {
        let (name, args) = argv.split_first()?;
        let command = self.commands.get(name.as_str())?;
        tracing::debug!(builtin = %name, ?args, "running builtin");

        let status = match command.execute(args, ctx) {
            Ok(status) => status,
            Err(e) => {
                eprintln!("vena: {}: {}", name, e);
                1
            }
        };
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::EnvStore;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_builtin_detection() {
        let builtins = Builtins::new();
        for name in ["cd", "echo", "env", "exit", "export", "pwd", "unset"] {
            assert!(builtins.is_builtin(name), "{} should be builtin", name);
        }
        assert!(!builtins.is_builtin("ls"));
        assert!(!builtins.is_builtin(""));
        assert_eq!(builtins.names().count(), 7);
    }

    #[test]
    fn test_run_unknown_is_none() {
        let builtins = Builtins::new();
        let mut ctx = ShellContext::new(EnvStore::new());
        assert_eq!(builtins.run(&argv(&["ls"]), &mut ctx), None);
        assert_eq!(builtins.run(&[], &mut ctx), None);
    }

    #[test]
    fn test_errors_become_status_one() {
        let builtins = Builtins::new();
        let mut ctx = ShellContext::new(EnvStore::new());
        assert_eq!(builtins.run(&argv(&["cd", "a", "b"]), &mut ctx), Some(1));
    }

    #[test]
    fn test_export_then_unset_through_registry() {
        let builtins = Builtins::new();
        let mut ctx = ShellContext::new(EnvStore::new());
        assert_eq!(builtins.run(&argv(&["export", "A=1"]), &mut ctx), Some(0));
        assert_eq!(ctx.env.get("A"), Some("1"));
        assert_eq!(builtins.run(&argv(&["unset", "A"]), &mut ctx), Some(0));
        assert_eq!(ctx.env.get("A"), None);
    }
}
