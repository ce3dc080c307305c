use clap::Parser;
use std::process::ExitCode;
use vena::flags::Flags;
use vena::shell::Shell;

fn main() -> Result<ExitCode, vena::error::ShellError> {
    let flags = Flags::parse();
    vena::logging::init(flags.log_level());

    let mut shell = Shell::new(flags)?;
    let status = shell.run()?;
    Ok(ExitCode::from((status & 0xff) as u8))
}
