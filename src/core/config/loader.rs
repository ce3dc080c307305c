use super::{ConfigError, ConfigPaths};
use crate::lexer::needs_continuation;
use std::fs;
use std::io;
use std::path::Path;

/// Reads the startup file into command lines for the shell to run.
pub struct RcLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> RcLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    /// Missing default rc files are not an error; a file named on the
    /// command line must exist.
    pub fn load(&self) -> Result<Vec<String>, ConfigError> {
        let path = &self.paths.rc_path;
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loading rc file");
                Ok(Self::commands(&content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.paths.rc_required {
                    Err(ConfigError::ConfigFileNotFound(display(path)))
                } else {
                    Ok(Vec::new())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Split file contents into command lines. Blank lines and `#` comments
    /// are skipped; an open quote carries over onto the following lines.
    pub fn commands(content: &str) -> Vec<String> {
        let mut commands = Vec::new();
        let mut pending: Option<String> = None;

        for line in content.lines() {
            let current = match pending.take() {
                Some(mut open) => {
                    open.push('\n');
                    open.push_str(line);
                    open
                }
                None => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    line.to_string()
                }
            };

            if needs_continuation(&current) {
                pending = Some(current);
            } else {
                commands.push(current);
            }
        }

        commands.extend(pending);
        commands
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::EnvStore;

    fn paths_in(dir: &Path) -> ConfigPaths {
        let mut env = EnvStore::new();
        env.set("HOME", &dir.to_string_lossy()).unwrap();
        ConfigPaths::new(&env).unwrap()
    }

    #[test]
    fn test_commands_skip_comments_and_blanks() {
        let content = "# setup\n\nexport A=1\n   # indented comment\necho $A\n";
        assert_eq!(RcLoader::commands(content), ["export A=1", "echo $A"]);
    }

    #[test]
    fn test_commands_join_open_quotes() {
        let content = "echo \"one\n# not a comment\ntwo\"\necho done\n";
        assert_eq!(
            RcLoader::commands(content),
            ["echo \"one\n# not a comment\ntwo\"", "echo done"]
        );
    }

    #[test]
    fn test_unterminated_quote_kept_for_error_reporting() {
        assert_eq!(RcLoader::commands("echo 'oops\n"), ["echo 'oops"]);
    }

    #[test]
    fn test_missing_default_rc_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        assert!(RcLoader::new(&paths).load().unwrap().is_empty());
    }

    #[test]
    fn test_missing_explicit_rc_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path()).with_rc(dir.path().join("nope.rc"));
        assert!(matches!(
            RcLoader::new(&paths).load(),
            Err(ConfigError::ConfigFileNotFound(_))
        ));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::write(&paths.rc_path, "export GREETING=hi\n").unwrap();
        assert_eq!(RcLoader::new(&paths).load().unwrap(), ["export GREETING=hi"]);
    }
}
