use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "vena")]
#[command(about = "A small interactive POSIX-style shell")]
#[command(version)]
pub struct Flags {
    /// Read startup commands from FILE instead of ~/.venarc
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip the startup file
    #[arg(long = "norc")]
    pub norc: bool,

    /// Suppress informational output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

impl Flags {
    /// Log level for the stderr subscriber.
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::WARN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let flags = Flags::try_parse_from(["vena"]).unwrap();
        assert!(flags.config.is_none());
        assert!(!flags.norc && !flags.quiet && !flags.debug);
        assert_eq!(flags.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_short_and_long_forms() {
        let flags = Flags::try_parse_from(["vena", "-c", "/tmp/rc", "-q"]).unwrap();
        assert_eq!(flags.config, Some(PathBuf::from("/tmp/rc")));
        assert_eq!(flags.log_level(), tracing::Level::ERROR);

        let flags = Flags::try_parse_from(["vena", "--debug", "--norc"]).unwrap();
        assert!(flags.norc);
        assert_eq!(flags.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_config_requires_value() {
        assert!(Flags::try_parse_from(["vena", "--config"]).is_err());
    }
}
