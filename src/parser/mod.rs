//! Recursive-descent parser over an expanded token list.
//!
//! ```text
//! list       := and_or ( (';' | '&') list? )?
//! and_or     := pipeline ( ('&&' | '||') pipeline )*
//! pipeline   := simple_cmd ( '|' simple_cmd )*
//! simple_cmd := '(' list ')'  |  ( WORD | redir )+
//! redir      := ('<' | '>' | '>>' | '<<') WORD
//! ```
//!
//! `list` nests to the right; `and_or` and `pipeline` build left-deep trees.

mod ast;

pub use ast::{Command, Node, RedirectKind, Redirection};

use crate::lexer::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error near unexpected token `{0}'")]
    MissingCommand(String),
    #[error("syntax error near unexpected token `{found}': expected a filename after `{operator}'")]
    MissingRedirectTarget { operator: String, found: String },
    #[error("syntax error: expected `)'")]
    UnclosedParen,
    #[error("syntax error near unexpected token `)'")]
    UnmatchedParen,
    #[error("syntax error near unexpected token `{0}'")]
    UnexpectedToken(String),
}

/// Parse a whole line. `Ok(None)` for a line with no tokens. On error
/// nothing of the line survives.
pub fn parse(tokens: &[Token]) -> Result<Option<Node>, ParseError> {
    let mut parser = Parser::new(tokens);
    if parser.peek_kind() == TokenKind::End {
        return Ok(None);
    }

    let root = parser.parse_list()?;
    match parser.peek_kind() {
        TokenKind::End => {
            tracing::debug!(tree = %root, "parsed line");
            Ok(Some(root))
        }
        TokenKind::RParen => Err(ParseError::UnmatchedParen),
        _ => Err(ParseError::UnexpectedToken(parser.peek_text())),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().map_or(TokenKind::End, |t| t.kind)
    }

    fn peek_text(&self) -> String {
        self.peek()
            .map_or_else(|| TokenKind::End.symbol().to_string(), |t| match t.kind {
                TokenKind::End => TokenKind::End.symbol().to_string(),
                _ => t.to_string(),
            })
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn starts_command(&self) -> bool {
        let kind = self.peek_kind();
        kind == TokenKind::Word || kind == TokenKind::LParen || kind.is_redirection()
    }

    fn parse_list(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_and_or()?;

        match self.peek_kind() {
            TokenKind::Semi => {
                self.advance();
                if !self.starts_command() {
                    return Ok(left);
                }
                let right = self.parse_list()?;
                Ok(Node::Sequence {
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            TokenKind::Amp => {
                self.advance();
                let right = if self.starts_command() {
                    Some(Box::new(self.parse_list()?))
                } else {
                    None
                };
                Ok(Node::Background {
                    left: Box::new(left),
                    right,
                })
            }
            _ => Ok(left),
        }
    }

    fn parse_and_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_pipeline()?;

        loop {
            let kind = self.peek_kind();
            if kind != TokenKind::And && kind != TokenKind::Or {
                return Ok(left);
            }
            self.advance();
            let right = Box::new(self.parse_pipeline()?);
            let l = Box::new(left);
            left = if kind == TokenKind::And {
                Node::And { left: l, right }
            } else {
                Node::Or { left: l, right }
            };
        }
    }

    fn parse_pipeline(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_simple_cmd()?;

        while self.peek_kind() == TokenKind::Pipe {
            self.advance();
            let right = self.parse_simple_cmd()?;
            left = Node::Pipeline {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_simple_cmd(&mut self) -> Result<Node, ParseError> {
        if self.peek_kind() == TokenKind::LParen {
            return self.parse_subshell();
        }

        let mut command = Command::default();
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::Word => {
                    command.argv.push(token.text.clone());
                    self.advance();
                }
                Some(token) if token.kind.is_redirection() => {
                    self.advance();
                    command.redirections.push(self.parse_redirect(token)?);
                }
                _ => break,
            }
        }

        if command.argv.is_empty() && command.redirections.is_empty() {
            if self.peek_kind() == TokenKind::RParen && self.depth == 0 {
                return Err(ParseError::UnmatchedParen);
            }
            return Err(ParseError::MissingCommand(self.peek_text()));
        }
        Ok(Node::Command(command))
    }

    fn parse_redirect(&mut self, operator: &Token) -> Result<Redirection, ParseError> {
        let kind = match operator.kind {
            TokenKind::RedirIn => RedirectKind::Input,
            TokenKind::RedirOut => RedirectKind::Output,
            TokenKind::Append => RedirectKind::Append,
            _ => RedirectKind::Heredoc,
        };

        match self.peek() {
            Some(target) if target.kind == TokenKind::Word => {
                self.advance();
                Ok(Redirection::new(kind, target.text.clone()))
            }
            _ => Err(ParseError::MissingRedirectTarget {
                operator: kind.symbol().to_string(),
                found: self.peek_text(),
            }),
        }
    }

    fn parse_subshell(&mut self) -> Result<Node, ParseError> {
        self.advance();
        self.depth += 1;
        let body = self.parse_list()?;
        self.depth -= 1;

        if self.peek_kind() != TokenKind::RParen {
            return Err(ParseError::UnclosedParen);
        }
        self.advance();
        Ok(Node::Subshell {
            body: Box::new(body),
        })
    }
}
