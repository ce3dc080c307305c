use super::{Command, CommandError};
use crate::shell::ShellContext;
use std::io::{self, Write};

#[derive(Clone, Debug, Default)]
pub struct EchoCommand;

impl EchoCommand {
    /// Leading `-n` / `-e` flags, combined or repeated. Stops at the first
    /// argument that is not made only of those letters.
    fn flags(args: &[String]) -> (bool, bool, usize) {
        let (mut newline, mut escapes) = (true, false);
        let mut consumed = 0;
        for arg in args {
            let Some(letters) = arg.strip_prefix('-') else {
                break;
            };
            if letters.is_empty() || !letters.chars().all(|c| c == 'n' || c == 'e') {
                break;
            }
            newline &= !letters.contains('n');
            escapes |= letters.contains('e');
            consumed += 1;
        }
        (newline, escapes, consumed)
    }

    fn unescape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('a') => out.push('\x07'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        out
    }

    fn render(args: &[String]) -> String {
        let (newline, escapes, skip) = Self::flags(args);
        let mut text = args[skip..].join(" ");
        if escapes {
            text = Self::unescape(&text);
        }
        if newline {
            text.push('\n');
        }
        text
    }
}

impl Command for EchoCommand {
    fn execute(&self, args: &[String], _ctx: &mut ShellContext) -> Result<i32, CommandError> {
        let mut out = io::stdout().lock();
        out.write_all(Self::render(args).as_bytes())?;
        out.flush()?;
        Ok(0)
    }
}
