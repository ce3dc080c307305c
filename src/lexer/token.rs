use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Pipe,     // |
    And,      // &&
    Or,       // ||
    LParen,   // (
    RParen,   // )
    RedirIn,  // <
    RedirOut, // >
    Append,   // >>
    Heredoc,  // <<
    Amp,      // &
    Semi,     // ;
    End,
}

impl TokenKind {
    pub fn is_redirection(self) -> bool {
        matches!(
            self,
            TokenKind::RedirIn | TokenKind::RedirOut | TokenKind::Append | TokenKind::Heredoc
        )
    }

    /// Tokens that end a simple command's run of words.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            TokenKind::Pipe
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::Amp
                | TokenKind::Semi
                | TokenKind::End
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::Pipe => "|",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::RedirIn => "<",
            TokenKind::RedirOut => ">",
            TokenKind::Append => ">>",
            TokenKind::Heredoc => "<<",
            TokenKind::Amp => "&",
            TokenKind::Semi => ";",
            TokenKind::End => "newline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Word text with its quotes removed; the operator symbol otherwise.
    pub text: String,
    /// Source slice of a word, quotes included.
    pub raw: Option<String>,
    pub had_quotes: bool,
    /// `Single` wins when both kinds were present.
    pub quoted_by: Option<Quote>,
}

impl Token {
    pub fn operator(kind: TokenKind) -> Self {
        Self {
            kind,
            text: kind.symbol().to_string(),
            raw: None,
            had_quotes: false,
            quoted_by: None,
        }
    }

    pub fn end() -> Self {
        Self {
            kind: TokenKind::End,
            text: String::new(),
            raw: None,
            had_quotes: false,
            quoted_by: None,
        }
    }

    pub fn word(raw: &str) -> Self {
        let stripped = super::remove_quotes(raw);
        Self {
            kind: TokenKind::Word,
            text: stripped.text,
            raw: Some(raw.to_string()),
            had_quotes: stripped.had_quotes,
            quoted_by: stripped.quoted_by,
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// The text expansion starts from.
    pub fn source(&self) -> &str {
        match self.raw.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => &self.text,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Word => write!(f, "{}", self.text),
            kind => write!(f, "{}", kind.symbol()),
        }
    }
}
