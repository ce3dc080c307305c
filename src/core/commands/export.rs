use super::{Command, CommandError};
use crate::core::env::{is_valid_name, EnvError};
use crate::lexer::remove_quotes;
use crate::shell::ShellContext;
use std::io::{self, Write};

#[derive(Clone, Debug, Default)]
pub struct ExportCommand;

impl ExportCommand {
    /// Split at the first `=` outside quotes. Arguments reach export with
    /// their quotes intact, so `A="x=y"` splits after `A`.
    fn split_assignment(arg: &str) -> (&str, Option<&str>) {
        let mut quote = None;
        for (i, c) in arg.char_indices() {
            match (quote, c) {
                (None, '\'' | '"') => quote = Some(c),
                (Some(q), c) if q == c => quote = None,
                (None, '=') => return (&arg[..i], Some(&arg[i + 1..])),
                _ => {}
            }
        }
        (arg, None)
    }

    fn list(ctx: &ShellContext) -> Result<(), CommandError> {
        let mut out = io::stdout().lock();
        for (name, value) in ctx.env.iter() {
            writeln!(out, "export {}=\"{}\"", name, value)?;
        }
        Ok(())
    }

    fn assign(arg: &str, ctx: &mut ShellContext) -> Result<(), EnvError> {
        let (name, value) = Self::split_assignment(arg);
        let name = remove_quotes(name).text;
        if !is_valid_name(&name) {
            return Err(EnvError::InvalidName(remove_quotes(arg).text));
        }

        match value {
            Some(value) => ctx.env.set(&name, &remove_quotes(value).text),
            None if ctx.env.contains(&name) => Ok(()),
            None => ctx.env.set(&name, ""),
        }
    }
}

impl Command for ExportCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<i32, CommandError> {
        if args.is_empty() {
            Self::list(ctx)?;
            return Ok(0);
        }

        let mut status = 0;
        for arg in args {
            if let Err(e) = Self::assign(arg, ctx) {
                eprintln!("vena: export: {}", e);
                status = 1;
            }
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::EnvStore;

    fn run(args: &[&str], ctx: &mut ShellContext) -> i32 {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        ExportCommand.execute(&args, ctx).unwrap()
    }

    fn context() -> ShellContext {
        ShellContext::new(EnvStore::new())
    }

    #[test]
    fn test_export_simple() {
        let mut ctx = context();
        assert_eq!(run(&["TEST_VAR=value"], &mut ctx), 0);
        assert_eq!(ctx.env.get("TEST_VAR"), Some("value"));
    }

    #[test]
    fn test_export_quoted_value() {
        let mut ctx = context();
        run(&["Q=\"quoted value\"", "S='single'"], &mut ctx);
        assert_eq!(ctx.env.get("Q"), Some("quoted value"));
        assert_eq!(ctx.env.get("S"), Some("single"));
    }

    #[test]
    fn test_export_splits_at_first_unquoted_equals() {
        let mut ctx = context();
        run(&["A=b=c", "B=\"x=y\""], &mut ctx);
        assert_eq!(ctx.env.get("A"), Some("b=c"));
        assert_eq!(ctx.env.get("B"), Some("x=y"));
    }

    #[test]
    fn test_export_name_only() {
        let mut ctx = context();
        ctx.env.set("KEEP", "kept").unwrap();
        run(&["KEEP", "FRESH"], &mut ctx);
        assert_eq!(ctx.env.get("KEEP"), Some("kept"));
        assert_eq!(ctx.env.get("FRESH"), Some(""));
    }

    #[test]
    fn test_export_invalid_identifier_continues() {
        let mut ctx = context();
        assert_eq!(run(&["1A=x", "=v", "OK=1"], &mut ctx), 1);
        assert_eq!(ctx.env.get("OK"), Some("1"));
        assert_eq!(ctx.env.len(), 1);
    }

    #[test]
    fn test_export_empty_value() {
        let mut ctx = context();
        run(&["EMPTY="], &mut ctx);
        assert_eq!(ctx.env.get("EMPTY"), Some(""));
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(ExportCommand::split_assignment("A=1"), ("A", Some("1")));
        assert_eq!(ExportCommand::split_assignment("\"A=1\""), ("\"A=1\"", None));
        assert_eq!(ExportCommand::split_assignment("NAME"), ("NAME", None));
    }
}
