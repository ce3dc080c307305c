mod completer;
mod reader;

pub use completer::{CommandCompleter, PathCompleter, ShellHelper};
pub use reader::{LineReader, ReadOutcome};
