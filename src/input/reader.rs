use super::ShellHelper;
use crate::error::ShellError;
use crate::lexer::needs_continuation;
use crate::process::{signal, sys};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use std::io;
use std::path::PathBuf;

pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C while reading; the pending line is discarded.
    Interrupted,
    Eof,
}

enum Source {
    Terminal {
        editor: Box<Editor<ShellHelper, FileHistory>>,
        history: Option<PathBuf>,
    },
    /// Unbuffered reads from fd 0, so heredoc children see every byte
    /// after the current line.
    Stdin,
}

/// Where command lines come from.
pub struct LineReader {
    source: Source,
}

impl LineReader {
    pub fn terminal(helper: ShellHelper, history: Option<PathBuf>) -> Result<Self, ShellError> {
        let mut editor = Editor::<ShellHelper, FileHistory>::new()?;
        editor.set_helper(Some(helper));
        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), "no history loaded: {}", e);
            }
        }
        Ok(Self {
            source: Source::Terminal {
                editor: Box::new(editor),
                history,
            },
        })
    }

    pub fn stdin() -> Self {
        Self {
            source: Source::Stdin,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.source, Source::Terminal { .. })
    }

    pub fn update_helper(&mut self, search_path: Option<&str>, last_status: i32) {
        if let Source::Terminal { editor, .. } = &mut self.source {
            if let Some(helper) = editor.helper_mut() {
                helper.update(search_path, last_status);
            }
        }
    }

    /// Read one logical command line. While a quote is open, further
    /// physical lines are read with a `> ` prompt and joined with `\n`.
    pub fn read_command(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        let mut line = match self.read_physical(prompt)? {
            ReadOutcome::Line(line) => line,
            other => return Ok(other),
        };

        while needs_continuation(&line) {
            match self.read_physical("> ")? {
                ReadOutcome::Line(next) => {
                    line.push('\n');
                    line.push_str(&next);
                }
                ReadOutcome::Interrupted => return Ok(ReadOutcome::Interrupted),
                ReadOutcome::Eof => break,
            }
        }

        if let Source::Terminal { editor, .. } = &mut self.source {
            if !line.trim().is_empty() {
                editor.add_history_entry(line.as_str())?;
            }
        }
        Ok(ReadOutcome::Line(line))
    }

    fn read_physical(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        match &mut self.source {
            Source::Terminal { editor, .. } => match editor.readline(prompt) {
                Ok(line) => Ok(ReadOutcome::Line(line)),
                Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
                Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
                Err(e) => Err(e.into()),
            },
            Source::Stdin => match sys::read_line(libc::STDIN_FILENO) {
                Ok(Some(line)) => Ok(ReadOutcome::Line(line)),
                Ok(None) => Ok(ReadOutcome::Eof),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    signal::take_interrupt();
                    Ok(ReadOutcome::Interrupted)
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    pub fn save_history(&mut self) {
        if let Source::Terminal {
            editor,
            history: Some(path),
        } = &mut self.source
        {
            if let Err(e) = editor.save_history(path.as_path()) {
                tracing::warn!(path = %path.display(), "failed to save history: {}", e);
            }
        }
    }
}
