use std::fs;
use std::path::Path;

use rustyline::completion::Pair;

/// File name completion relative to the current directory.
#[derive(Clone, Debug, Default)]
pub struct PathCompleter;

impl PathCompleter {
    pub fn new() -> Self {
        Self
    }

    /// Complete the last path component of `partial`. The directory part is
    /// kept verbatim in every replacement.
    pub fn complete_path(&self, partial: &str) -> Vec<Pair> {
        let (dir_part, prefix) = match partial.rfind('/') {
            Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
            None => ("", partial),
        };
        let search = if dir_part.is_empty() { "." } else { dir_part };

        let Ok(entries) = fs::read_dir(search) else {
            return Vec::new();
        };

        let mut matches: Vec<Pair> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.'))
                {
                    return None;
                }
                let full = format!("{}{}", dir_part, name);
                let pair = if Path::new(search).join(&name).is_dir() {
                    Pair {
                        display: format!("{}/", name),
                        replacement: format!("{}/", full),
                    }
                } else {
                    Pair {
                        display: name,
                        replacement: format!("{} ", full),
                    }
                };
                Some(pair)
            })
            .collect();

        matches.sort_by(|a, b| a.display.cmp(&b.display));
        matches
    }
}
