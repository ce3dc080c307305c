use std::collections::BTreeSet;

use rustyline::completion::Pair;

/// Names valid in command position: builtins plus executables on `PATH`.
#[derive(Clone, Debug, Default)]
pub struct CommandCompleter {
    builtins: BTreeSet<String>,
    commands: BTreeSet<String>,
}

impl CommandCompleter {
    pub fn new<'a>(builtins: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            builtins: builtins.into_iter().map(String::from).collect(),
            commands: BTreeSet::new(),
        }
    }

    /// Rescan `search_path`. Called whenever the prompt is about to show,
    /// so `export PATH=...` is picked up.
    pub fn refresh(&mut self, search_path: Option<&str>) {
        self.commands = crate::path::executables(search_path).into_iter().collect();
        self.commands.extend(self.builtins.iter().cloned());
    }

    pub fn complete_command(&self, prefix: &str) -> Vec<Pair> {
        self.commands
            .iter()
            .chain(self.builtins.iter())
            .filter(|name| name.starts_with(prefix))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{} ", name),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_complete_without_refresh() {
        let completer = CommandCompleter::new(["cd", "echo", "exit", "export"]);
        let names: Vec<String> = completer
            .complete_command("ex")
            .into_iter()
            .map(|p| p.display)
            .collect();
        assert_eq!(names, ["exit", "export"]);
    }

    #[test]
    fn test_replacement_adds_space() {
        let completer = CommandCompleter::new(["pwd"]);
        let pairs = completer.complete_command("p");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "pwd ");
    }
}
