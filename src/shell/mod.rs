use std::env;

mod context;

pub use context::ShellContext;

use crate::{
    core::{
        config::{ConfigPaths, RcLoader},
        env::EnvStore,
    },
    error::ShellError,
    expand::expand,
    flags::Flags,
    input::{LineReader, ReadOutcome, ShellHelper},
    lexer::tokenize,
    parser::{parse, Node},
    path::PathExpander,
    process::{
        signal::{self, SignalMode},
        sys, Executor, WaitOutcome,
    },
};

/// Exit status of a line that failed to lex or parse.
const SYNTAX_ERROR: i32 = 2;

pub struct Shell {
    ctx: ShellContext,
    executor: Executor,
    reader: LineReader,
    paths: Option<ConfigPaths>,
    flags: Flags,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let mut ctx = ShellContext::new(EnvStore::from_process());
        ctx.interactive = sys::isatty(libc::STDIN_FILENO);
        ctx.quiet = flags.quiet;

        let paths = match ConfigPaths::new(&ctx.env) {
            Ok(paths) => Some(match &flags.config {
                Some(rc) => paths.with_rc(rc),
                None => paths,
            }),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        };

        let executor = Executor::new();
        let reader = if ctx.interactive {
            let helper = ShellHelper::new(executor.builtins().names());
            LineReader::terminal(helper, paths.as_ref().map(|p| p.history_path.clone()))?
        } else {
            LineReader::stdin()
        };
        tracing::debug!(interactive = ctx.interactive, "shell initialized");

        Ok(Shell {
            ctx,
            executor,
            reader,
            paths,
            flags,
        })
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    /// Run the startup file, then read and run lines until end of input or
    /// `exit`. Returns the shell's exit status.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        self.load_rc()?;

        let status = loop {
            if let Some(code) = self.ctx.exit_requested() {
                break code;
            }
            self.reap_jobs();

            signal::install(SignalMode::Prompt)?;
            signal::take_interrupt();
            let prompt = self.prompt();
            self.reader
                .update_helper(self.ctx.env.get("PATH"), self.ctx.last_status);

            match self.reader.read_command(&prompt)? {
                ReadOutcome::Line(line) => {
                    self.run_line(&line);
                }
                ReadOutcome::Interrupted => self.ctx.last_status = 130,
                ReadOutcome::Eof => {
                    if self.ctx.interactive {
                        eprintln!("exit");
                    }
                    break self.ctx.last_status;
                }
            }
        };

        self.reader.save_history();
        Ok(status)
    }

    /// Lex, expand, parse and execute one logical line. Syntax errors run
    /// nothing and set the status to 2.
    pub fn run_line(&mut self, line: &str) -> i32 {
        self.ctx.line = line.to_string();
        match self.prepare(line) {
            Ok(Some(mut root)) => self.executor.run(&mut root, &mut self.ctx),
            Ok(None) => self.ctx.last_status,
            Err(status) => {
                self.ctx.last_status = status;
                status
            }
        }
    }

    fn prepare(&self, line: &str) -> Result<Option<Node>, i32> {
        let mut tokens = tokenize(line).map_err(|e| {
            eprintln!("vena: {}", e);
            SYNTAX_ERROR
        })?;
        expand(&mut tokens, &self.ctx);
        parse(&tokens).map_err(|e| {
            eprintln!("vena: {}", e);
            SYNTAX_ERROR
        })
    }

    fn load_rc(&mut self) -> Result<(), ShellError> {
        if self.flags.norc {
            return Ok(());
        }
        let commands = match &self.paths {
            Some(paths) => RcLoader::new(paths).load()?,
            None => return Ok(()),
        };

        for command in commands {
            self.run_line(&command);
            if self.ctx.exit_requested().is_some() {
                break;
            }
        }
        Ok(())
    }

    /// Collect background jobs that finished since the last prompt.
    fn reap_jobs(&self) {
        while let Some((pid, raw)) = sys::try_reap() {
            let outcome = WaitOutcome::from_raw(raw);
            tracing::debug!(pid, status = outcome.status(), "background job finished");
            if self.ctx.interactive && !self.ctx.quiet {
                eprintln!("[done] {}", pid);
            }
        }
    }

    fn prompt(&self) -> String {
        if !self.reader.is_terminal() {
            return String::new();
        }
        let cwd = env::current_dir()
            .map(|dir| PathExpander::from_env(&self.ctx.env).abbreviate(&dir))
            .unwrap_or_else(|_| "?".to_string());
        format!("{}$ ", cwd)
    }
}
