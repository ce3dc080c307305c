use std::borrow::Cow;

use super::{CommandCompleter, PathCompleter};
use crate::highlight::SyntaxHighlighter;
use crate::lexer::{is_operator_start, is_space};

use rustyline::{
    completion::{Completer, Pair},
    highlight::{CmdKind, Highlighter},
    hint::{Hinter, HistoryHinter},
    validate::Validator,
    Context, Helper,
};

/// Start of the word under the cursor, and whether it sits in command
/// position (line start, or right after `|`, `&`, `;`, `(`).
fn word_at(line: &str) -> (usize, bool) {
    let start = line
        .rfind(|c: char| is_space(c) || is_operator_start(c))
        .map_or(0, |idx| idx + 1);
    let before = line[..start].trim_end_matches(is_space);
    let command_position = match before.chars().last() {
        None => true,
        Some(c) => matches!(c, '|' | '&' | ';' | '('),
    };
    (start, command_position)
}

pub struct ShellHelper {
    commands: CommandCompleter,
    paths: PathCompleter,
    highlighter: SyntaxHighlighter,
    hinter: HistoryHinter,
    last_status: i32,
}

impl ShellHelper {
    pub fn new<'a>(builtins: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            commands: CommandCompleter::new(builtins),
            paths: PathCompleter::new(),
            highlighter: SyntaxHighlighter::new(),
            hinter: HistoryHinter::new(),
            last_status: 0,
        }
    }

    /// Sync with the shell before each prompt.
    pub fn update(&mut self, search_path: Option<&str>, last_status: i32) {
        self.commands.refresh(search_path);
        self.last_status = last_status;
    }
}

impl Helper for ShellHelper {}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(self.highlighter.highlight_line(line))
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(self.highlighter.highlight_prompt(prompt, self.last_status))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(self.highlighter.highlight_hint(hint))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Validator for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before_cursor = &line[..pos];
        let (start, command_position) = word_at(before_cursor);
        let word = &before_cursor[start..];

        let matches = if command_position && !word.contains('/') {
            self.commands.complete_command(word)
        } else {
            self.paths.complete_path(word)
        };
        Ok((start, matches))
    }
}
