use crate::core::env::is_name_char;
use crate::lexer::{is_operator_start, is_space};
use inksac::prelude::*;

fn command_style() -> Style {
    Style::builder().foreground(Color::Cyan).bold().build()
}

fn flag_style() -> Style {
    Style::builder().foreground(Color::Yellow).build()
}

fn operator_style() -> Style {
    Style::builder().foreground(Color::Blue).bold().build()
}

fn string_style() -> Style {
    Style::builder().foreground(Color::Green).build()
}

fn variable_style() -> Style {
    Style::builder().foreground(Color::Magenta).build()
}

/// Byte length of the word starting at the beginning of `s`. An open quote
/// runs to the end of the input.
fn word_len(s: &str) -> usize {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if is_space(c) || is_operator_start(c) => return i,
            None => {}
        }
    }
    s.len()
}

fn operator_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes {
        [a, b, ..] if a == b && matches!(*a, b'|' | b'&' | b'<' | b'>') => 2,
        _ => 1,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn enabled(&self) -> bool {
        !matches!(self.color_support, ColorSupport::NoColor)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled() {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Color an input line the way the lexer will see it: the word in
    /// command position, flags, quoted spans, `$` references, operators.
    pub fn highlight_line(&self, line: &str) -> String {
        if !self.enabled() {
            return line.to_string();
        }

        let mut out = String::with_capacity(line.len() * 2);
        let mut command_position = true;
        let mut redirect_target = false;
        let mut rest = line;

        while let Some(c) = rest.chars().next() {
            let len = if is_space(c) {
                out.push(c);
                c.len_utf8()
            } else if is_operator_start(c) {
                let len = operator_len(rest);
                let op = &rest[..len];
                out.push_str(&self.paint(op, operator_style()));
                if matches!(op, "<" | ">" | ">>" | "<<") {
                    redirect_target = true;
                } else {
                    command_position = true;
                }
                len
            } else {
                let len = word_len(rest);
                let word = &rest[..len];
                if std::mem::take(&mut redirect_target) {
                    out.push_str(&self.highlight_word(word));
                } else if std::mem::take(&mut command_position) {
                    out.push_str(&self.paint(word, command_style()));
                } else if word.starts_with('-') {
                    out.push_str(&self.paint(word, flag_style()));
                } else {
                    out.push_str(&self.highlight_word(word));
                }
                len
            };
            rest = &rest[len..];
        }
        out
    }

    fn highlight_word(&self, word: &str) -> String {
        let mut out = String::new();
        let mut rest = word;

        while let Some(c) = rest.chars().next() {
            let len = match c {
                '\'' | '"' => {
                    let len = rest[1..].find(c).map_or(rest.len(), |close| close + 2);
                    out.push_str(&self.paint(&rest[..len], string_style()));
                    len
                }
                '$' => {
                    let name_len = if rest[1..].starts_with('?') {
                        1
                    } else {
                        rest[1..].chars().take_while(|&c| is_name_char(c)).count()
                    };
                    out.push_str(&self.paint(&rest[..1 + name_len], variable_style()));
                    1 + name_len
                }
                _ => {
                    let len = rest
                        .find(|c| matches!(c, '\'' | '"' | '$'))
                        .unwrap_or(rest.len());
                    out.push_str(&rest[..len]);
                    len
                }
            };
            rest = &rest[len..];
        }
        out
    }

    /// `~/dir$ `, with the marker red after a failed command.
    pub fn highlight_prompt(&self, prompt: &str, last_status: i32) -> String {
        if !self.enabled() {
            return prompt.to_string();
        }
        let Some(dir) = prompt.strip_suffix("$ ") else {
            return prompt.to_string();
        };

        let dir_style = Style::builder().foreground(Color::Blue).bold().build();
        let marker = if last_status == 0 {
            self.paint("$", Style::builder().foreground(Color::Green).bold().build())
        } else {
            self.highlight_error("$")
        };
        format!("{}{} ", self.paint(dir, dir_style), marker)
    }

    pub fn highlight_error(&self, error: &str) -> String {
        self.paint(error, Style::builder().foreground(Color::Red).bold().build())
    }

    pub fn highlight_hint(&self, hint: &str) -> String {
        self.paint(
            hint,
            Style::builder().foreground(Color::RGB(128, 128, 128)).build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_identity() {
        let h = SyntaxHighlighter::plain();
        let line = "cat < in | grep -v \"a b\" >> out && echo $HOME";
        assert_eq!(h.highlight_line(line), line);
        assert_eq!(h.highlight_prompt("~/src$ ", 1), "~/src$ ");
        assert_eq!(h.highlight_error("oops"), "oops");
    }

    #[test]
    fn test_word_len_respects_quotes() {
        assert_eq!(word_len("abc def"), 3);
        assert_eq!(word_len("'a b'c d"), 6);
        assert_eq!(word_len("a|b"), 1);
        assert_eq!(word_len("\"open"), 5);
    }

    #[test]
    fn test_operator_len() {
        assert_eq!(operator_len("||x"), 2);
        assert_eq!(operator_len(">>"), 2);
        assert_eq!(operator_len("|&"), 1);
        assert_eq!(operator_len(";;"), 1);
        assert_eq!(operator_len("("), 1);
    }
}
