//! Splits one input line into words and operators.
//!
//! Quote characters only group: inside `'...'` or `"..."` whitespace and
//! operator characters are literal. The quotes stay in [`Token::raw`] so the
//! expander can tell quoted `$` from unquoted `$`, and are removed from
//! [`Token::text`].

mod token;

pub use token::{Quote, Token, TokenKind};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected EOF while looking for matching `{quote}'")]
    UnterminatedQuote { quote: char, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub text: String,
    pub had_quotes: bool,
    pub quoted_by: Option<Quote>,
}

pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        pos = skip_spaces(line, pos);
        let Some(c) = line[pos..].chars().next() else {
            break;
        };

        if is_operator_start(c) {
            let (kind, len) = operator_at(&line[pos..]);
            tokens.push(Token::operator(kind));
            pos += len;
        } else {
            let end = word_end(line, pos)?;
            tokens.push(Token::word(&line[pos..end]));
            pos = end;
        }
    }

    tokens.push(Token::end());
    tracing::debug!(count = tokens.len(), "tokenized line");
    Ok(tokens)
}

pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

pub fn is_operator_start(c: char) -> bool {
    matches!(c, '|' | '&' | ';' | '<' | '>' | '(' | ')')
}

fn skip_spaces(line: &str, pos: usize) -> usize {
    line[pos..]
        .char_indices()
        .find(|&(_, c)| !is_space(c))
        .map_or(line.len(), |(i, _)| pos + i)
}

/// Two-character operators are tried before their one-character form.
fn operator_at(rest: &str) -> (TokenKind, usize) {
    let two = rest.get(..2).unwrap_or("");
    match two {
        "<<" => return (TokenKind::Heredoc, 2),
        ">>" => return (TokenKind::Append, 2),
        "&&" => return (TokenKind::And, 2),
        "||" => return (TokenKind::Or, 2),
        _ => {}
    }

    let kind = match rest.as_bytes().first() {
        Some(b'|') => TokenKind::Pipe,
        Some(b'&') => TokenKind::Amp,
        Some(b';') => TokenKind::Semi,
        Some(b'<') => TokenKind::RedirIn,
        Some(b'>') => TokenKind::RedirOut,
        Some(b'(') => TokenKind::LParen,
        _ => TokenKind::RParen,
    };
    (kind, 1)
}

/// Byte offset one past the end of the word starting at `start`.
fn word_end(line: &str, start: usize) -> Result<usize, LexError> {
    let mut pos = start;
    while let Some(c) = line[pos..].chars().next() {
        if is_space(c) || is_operator_start(c) {
            break;
        }
        if c == '\'' || c == '"' {
            let len = match_quote(line, pos).ok_or(LexError::UnterminatedQuote {
                quote: c,
                position: pos,
            })?;
            pos += len;
        } else {
            pos += c.len_utf8();
        }
    }
    Ok(pos)
}

/// Length of the quoted span opening at `pos`, both quotes included.
/// `None` when the quote is never closed.
fn match_quote(line: &str, pos: usize) -> Option<usize> {
    let quote = line[pos..].chars().next()?;
    let body = &line[pos + 1..];
    body.find(quote).map(|close| close + 2)
}

/// Remove every quote character that opens or closes a quoted span.
/// A `'` inside `"..."` is literal and vice versa.
pub fn remove_quotes(s: &str) -> Stripped {
    let mut text = String::with_capacity(s.len());
    let mut state: Option<Quote> = None;
    let mut single = false;
    let mut double = false;

    for c in s.chars() {
        match (state, c) {
            (None, '\'') => {
                state = Some(Quote::Single);
                single = true;
            }
            (None, '"') => {
                state = Some(Quote::Double);
                double = true;
            }
            (Some(Quote::Single), '\'') | (Some(Quote::Double), '"') => state = None,
            _ => text.push(c),
        }
    }

    let quoted_by = if single {
        Some(Quote::Single)
    } else if double {
        Some(Quote::Double)
    } else {
        None
    };

    Stripped {
        text,
        had_quotes: single || double,
        quoted_by,
    }
}

/// True while a quote opened on this line is still unbalanced; the line
/// reader keeps asking for physical lines until this is false.
pub fn needs_continuation(line: &str) -> bool {
    let mut state: Option<Quote> = None;
    for c in line.chars() {
        state = match (state, c) {
            (None, '\'') => Some(Quote::Single),
            (None, '"') => Some(Quote::Double),
            (Some(Quote::Single), '\'') | (Some(Quote::Double), '"') => None,
            (s, _) => s,
        };
    }
    state.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(line: &str) -> Vec<String> {
        tokenize(line)
            .unwrap()
            .into_iter()
            .filter(Token::is_word)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(texts("ls -la /tmp"), ["ls", "-la", "/tmp"]);
        assert_eq!(
            kinds("ls -la"),
            [TokenKind::Word, TokenKind::Word, TokenKind::End]
        );
    }

    #[test]
    fn test_exactly_one_end_token() {
        for line in ["", "   ", "a | b", "x && y || z ; w &"] {
            let tokens = tokenize(line).unwrap();
            let ends = tokens.iter().filter(|t| t.kind == TokenKind::End).count();
            assert_eq!(ends, 1, "line {:?}", line);
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::End));
        }
    }

    #[test]
    fn test_double_operators_are_greedy() {
        assert_eq!(
            kinds("a<<b>>c&&d||e"),
            [
                TokenKind::Word,
                TokenKind::Heredoc,
                TokenKind::Word,
                TokenKind::Append,
                TokenKind::Word,
                TokenKind::And,
                TokenKind::Word,
                TokenKind::Or,
                TokenKind::Word,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_single_operators() {
        assert_eq!(
            kinds("(a) < b > c | d & e ; f"),
            [
                TokenKind::LParen,
                TokenKind::Word,
                TokenKind::RParen,
                TokenKind::RedirIn,
                TokenKind::Word,
                TokenKind::RedirOut,
                TokenKind::Word,
                TokenKind::Pipe,
                TokenKind::Word,
                TokenKind::Amp,
                TokenKind::Word,
                TokenKind::Semi,
                TokenKind::Word,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_quoted_word_keeps_raw() {
        let tokens = tokenize("\"a b\" c").unwrap();
        assert_eq!(tokens[0].text, "a b");
        assert_eq!(tokens[0].raw.as_deref(), Some("\"a b\""));
        assert!(tokens[0].had_quotes);
        assert_eq!(tokens[0].quoted_by, Some(Quote::Double));
        assert_eq!(tokens[1].text, "c");
        assert!(!tokens[1].had_quotes);
    }

    #[test]
    fn test_operators_inside_quotes_are_literal() {
        assert_eq!(texts("echo 'a | b' \"c;d\""), ["echo", "a | b", "c;d"]);
    }

    #[test]
    fn test_adjacent_quotes_join_one_word() {
        assert_eq!(texts("a'b c'\"d\"e"), ["ab cde"]);
        let tokens = tokenize("x'y'\"z\"").unwrap();
        assert_eq!(tokens[0].quoted_by, Some(Quote::Single));
    }

    #[test]
    fn test_nested_other_quote_is_literal() {
        assert_eq!(texts("\"it's\" 'say \"hi\"'"), ["it's", "say \"hi\""]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            tokenize("echo \"abc"),
            Err(LexError::UnterminatedQuote {
                quote: '"',
                position: 5
            })
        );
        assert!(tokenize("echo 'abc").is_err());
    }

    #[test]
    fn test_newline_is_whitespace() {
        assert_eq!(texts("echo a\nb"), ["echo", "a", "b"]);
    }

    #[test]
    fn test_needs_continuation() {
        assert!(needs_continuation("echo \"abc"));
        assert!(needs_continuation("echo 'it\"s"));
        assert!(!needs_continuation("echo \"it's\""));
        assert!(!needs_continuation("plain"));
    }

    #[test]
    fn test_remove_quotes_flags() {
        let s = remove_quotes("plain");
        assert_eq!(s.text, "plain");
        assert!(!s.had_quotes);
        assert_eq!(s.quoted_by, None);

        let s = remove_quotes("A=\"x y\"");
        assert_eq!(s.text, "A=x y");
        assert_eq!(s.quoted_by, Some(Quote::Double));
    }
}
