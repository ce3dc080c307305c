use crate::core::env::EnvStore;

/// State that outlives a single line. Every stage receives it by
/// reference; nothing else is global except the signal flag.
#[derive(Debug)]
pub struct ShellContext {
    pub env: EnvStore,
    /// `$?`.
    pub last_status: i32,
    /// Standard input is a terminal.
    pub interactive: bool,
    pub quiet: bool,
    /// Set inside a forked background job.
    pub in_background: bool,
    /// Raw text of the line being executed.
    pub line: String,
    exit_request: Option<i32>,
}

impl ShellContext {
    pub fn new(env: EnvStore) -> Self {
        Self {
            env,
            last_status: 0,
            interactive: false,
            quiet: false,
            in_background: false,
            line: String::new(),
            exit_request: None,
        }
    }

    pub fn request_exit(&mut self, status: i32) {
        self.exit_request = Some(status);
    }

    pub fn exit_requested(&self) -> Option<i32> {
        self.exit_request
    }
}
