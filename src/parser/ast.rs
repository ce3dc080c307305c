use std::fmt;
use std::os::fd::OwnedFd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Input,
    Output,
    Append,
    Heredoc,
}

impl RedirectKind {
    pub fn symbol(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
            RedirectKind::Append => ">>",
            RedirectKind::Heredoc => "<<",
        }
    }
}

#[derive(Debug)]
pub struct Redirection {
    pub kind: RedirectKind,
    /// File name, or the delimiter line for a heredoc.
    pub target: String,
    /// Read end of the captured heredoc body. Only ever set for
    /// `Heredoc`; `None` means not captured (yet, or interrupted).
    pub resolved_fd: Option<OwnedFd>,
}

impl Redirection {
    pub fn new(kind: RedirectKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            resolved_fd: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Command {
    pub argv: Vec<String>,
    /// Applied in order; a later entry for the same stream wins.
    pub redirections: Vec<Redirection>,
}

impl Command {
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Close heredoc read ends held by this process.
    pub fn release_heredocs(&mut self) {
        for redir in &mut self.redirections {
            redir.resolved_fd = None;
        }
    }
}

#[derive(Debug)]
pub enum Node {
    Command(Command),
    Pipeline { left: Box<Node>, right: Box<Node> },
    And { left: Box<Node>, right: Box<Node> },
    Or { left: Box<Node>, right: Box<Node> },
    Sequence { left: Box<Node>, right: Box<Node> },
    Background { left: Box<Node>, right: Option<Box<Node>> },
    Subshell { body: Box<Node> },
}

impl Node {
    /// Visit every command in evaluation order.
    pub fn for_each_command_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Command),
    {
        match self {
            Node::Command(cmd) => f(cmd),
            Node::Pipeline { left, right }
            | Node::And { left, right }
            | Node::Or { left, right }
            | Node::Sequence { left, right } => {
                left.for_each_command_mut(f);
                right.for_each_command_mut(f);
            }
            Node::Background { left, right } => {
                left.for_each_command_mut(f);
                if let Some(right) = right {
                    right.for_each_command_mut(f);
                }
            }
            Node::Subshell { body } => body.for_each_command_mut(f),
        }
    }
}

fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
        write!(f, "{:?}", word)
    } else {
        write!(f, "{}", word)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(cmd")?;
        for arg in &self.argv {
            write!(f, " ")?;
            write_word(f, arg)?;
        }
        for redir in &self.redirections {
            write!(f, " {}", redir.kind.symbol())?;
            write_word(f, &redir.target)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Command(cmd) => write!(f, "{}", cmd),
            Node::Pipeline { left, right } => write!(f, "(| {} {})", left, right),
            Node::And { left, right } => write!(f, "(&& {} {})", left, right),
            Node::Or { left, right } => write!(f, "(|| {} {})", left, right),
            Node::Sequence { left, right } => write!(f, "(; {} {})", left, right),
            Node::Background { left, right: Some(right) } => write!(f, "(& {} {})", left, right),
            Node::Background { left, right: None } => write!(f, "(& {})", left),
            Node::Subshell { body } => write!(f, "(sub {})", body),
        }
    }
}
