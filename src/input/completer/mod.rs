mod command;
mod helper;
mod path;

pub use command::CommandCompleter;
pub use helper::ShellHelper;
pub use path::PathCompleter;
