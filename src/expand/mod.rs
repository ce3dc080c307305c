//! `$VAR` / `$?` substitution and quote removal over a lexed line.
//!
//! Every simple command is one segment. A segment whose first word is
//! `export` keeps its quotes so the builtin can split `NAME="a value"`
//! itself; every other word, and every redirection target, is stripped.

use crate::core::env::{is_name_char, is_name_start};
use crate::lexer::{Quote, Token, TokenKind};
use crate::shell::ShellContext;

#[derive(Debug, Default, PartialEq, Eq)]
struct Expanded {
    /// Substituted text, quote characters kept.
    kept: String,
    /// Substituted text with the source's quote characters removed.
    stripped: String,
    had_quotes: bool,
    quoted_by: Option<Quote>,
}

pub fn expand(tokens: &mut Vec<Token>, ctx: &ShellContext) {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut at_segment_start = true;
    let mut export_mode = false;
    let mut after_redirect = false;

    for mut token in tokens.drain(..) {
        if token.kind.is_redirection() {
            after_redirect = true;
            expanded.push(token);
            continue;
        }
        if token.kind != TokenKind::Word {
            at_segment_start = true;
            export_mode = false;
            after_redirect = false;
            expanded.push(token);
            continue;
        }

        let is_target = std::mem::take(&mut after_redirect);
        if at_segment_start && !is_target {
            export_mode = token.text == "export";
            at_segment_start = false;
        }

        let source = token.source().to_string();
        let result = expand_word(&source, ctx);

        if export_mode && !is_target {
            token.text = result.kept;
            token.had_quotes = false;
            token.quoted_by = None;
        } else {
            // An unquoted expansion to nothing leaves no word behind.
            if !is_target && !source.is_empty() && !result.had_quotes && result.stripped.is_empty()
            {
                continue;
            }
            token.text = result.stripped;
            token.had_quotes = result.had_quotes;
            token.quoted_by = result.quoted_by;
        }
        expanded.push(token);
    }

    *tokens = expanded;
}

/// Expand one string outside of any token context, stripping quotes.
pub fn expand_str(s: &str, ctx: &ShellContext) -> String {
    expand_word(s, ctx).stripped
}

fn expand_word(src: &str, ctx: &ShellContext) -> Expanded {
    let mut out = Expanded::default();
    let mut state: Option<Quote> = None;
    let mut chars = src.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match (state, c) {
            (None, '\'') => {
                state = Some(Quote::Single);
                out.quote_seen(Quote::Single, c);
            }
            (None, '"') => {
                state = Some(Quote::Double);
                out.quote_seen(Quote::Double, c);
            }
            (Some(Quote::Single), '\'') | (Some(Quote::Double), '"') => {
                state = None;
                out.kept.push(c);
            }
            (Some(Quote::Single), '$') => out.push_str("$"),
            (_, '$') => {
                let consumed = substitute(&src[i + 1..], ctx, &mut out);
                for _ in 0..consumed {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Substitute the reference following a `$`. Returns how many characters
/// after the `$` were consumed.
fn substitute(rest: &str, ctx: &ShellContext, out: &mut Expanded) -> usize {
    let mut chars = rest.chars();
    match chars.next() {
        Some('?') => {
            out.push_str(&ctx.last_status.to_string());
            1
        }
        Some(c) if c.is_ascii_digit() => 1,
        Some(c) if is_name_start(c) => {
            let len = 1 + chars.take_while(|&c| is_name_char(c)).count();
            let name = &rest[..len];
            if let Some(value) = ctx.env.get(name) {
                out.push_str(value);
            }
            len
        }
        _ => {
            out.push_str("$");
            0
        }
    }
}

impl Expanded {
    fn push(&mut self, c: char) {
        self.kept.push(c);
        self.stripped.push(c);
    }

    fn push_str(&mut self, s: &str) {
        self.kept.push_str(s);
        self.stripped.push_str(s);
    }

    fn quote_seen(&mut self, quote: Quote, c: char) {
        self.kept.push(c);
        self.had_quotes = true;
        if quote == Quote::Single || self.quoted_by.is_none() {
            self.quoted_by = Some(quote);
        }
    }
}
