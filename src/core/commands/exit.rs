use super::{Command, CommandError};
use crate::shell::ShellContext;

#[derive(Clone, Debug, Default)]
pub struct ExitCommand;

impl ExitCommand {
    fn parse_status(arg: &str) -> Option<i32> {
        arg.trim()
            .parse::<i64>()
            .ok()
            .map(|n| n.rem_euclid(256) as i32)
    }
}

impl Command for ExitCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError> {
        if ctx.interactive {
            eprintln!("exit");
        }

        let status = match args {
            [] => ctx.last_status,
            [arg] => match Self::parse_status(arg) {
                Some(status) => status,
                None => {
                    eprintln!("vena: exit: {}: numeric argument required", arg);
                    2
                }
            },
            [first, ..] if Self::parse_status(first).is_none() => {
                eprintln!("vena: exit: {}: numeric argument required", first);
                2
            }
            _ => {
                return Err(CommandError::InvalidArguments("too many arguments".into()));
            }
        };

        ctx.request_exit(status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::EnvStore;

    fn run(args: &[&str], last_status: i32) -> (Result<i32, CommandError>, Option<i32>) {
        let mut ctx = ShellContext::new(EnvStore::new());
        ctx.last_status = last_status;
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let result = ExitCommand.execute(&args, &mut ctx);
        (result, ctx.exit_requested())
    }

    #[test]
    fn test_exit_with_code() {
        let (result, requested) = run(&["5"], 0);
        assert_eq!(result.unwrap(), 5);
        assert_eq!(requested, Some(5));
    }

    #[test]
    fn test_exit_defaults_to_last_status() {
        assert_eq!(run(&[], 3).1, Some(3));
    }

    #[test]
    fn test_exit_wraps_modulo_256() {
        assert_eq!(run(&["256"], 0).1, Some(0));
        assert_eq!(run(&["300"], 0).1, Some(44));
        assert_eq!(run(&["-1"], 0).1, Some(255));
    }

    #[test]
    fn test_exit_non_numeric() {
        let (result, requested) = run(&["abc"], 0);
        assert_eq!(result.unwrap(), 2);
        assert_eq!(requested, Some(2));
    }

    #[test]
    fn test_exit_too_many_arguments_stays() {
        let (result, requested) = run(&["1", "2"], 0);
        assert!(matches!(result, Err(CommandError::InvalidArguments(_))));
        assert_eq!(requested, None);
    }
}
