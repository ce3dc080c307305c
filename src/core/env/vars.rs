use super::{is_valid_name, EnvError};
use indexmap::IndexMap;
use std::env;
use std::ffi::CString;

/// Shell variables, in insertion order.
///
/// Built once from the inherited process environment. The process
/// environment itself is never written back: children receive a fresh
/// array from [`EnvStore::to_envp`] right before `execve`.
#[derive(Clone, Debug, Default)]
pub struct EnvStore {
    vars: IndexMap<String, String>,
}

impl EnvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_process() -> Self {
        let mut store = Self::new();
        for (key, value) in env::vars_os() {
            let key = key.to_string_lossy().into_owned();
            if key.is_empty() {
                continue;
            }
            store.vars.insert(key, value.to_string_lossy().into_owned());
        }
        store
    }

    /// Insert or overwrite `name`. An existing entry keeps its position.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        if !is_valid_name(name) {
            return Err(EnvError::InvalidName(name.to_string()));
        }
        if value.contains('\0') {
            return Err(EnvError::NulByte(name.to_string()));
        }

        match self.vars.get_mut(name) {
            Some(slot) => *slot = value.to_string(),
            None => {
                self.vars.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.vars.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `NAME=VALUE` strings in exec format.
    pub fn to_envp(&self) -> Vec<CString> {
        self.vars
            .iter()
            .filter_map(|(k, v)| CString::new(format!("{}={}", k, v)).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() -> Result<(), EnvError> {
        let mut store = EnvStore::new();
        store.set("TEST_VAR", "test value")?;
        assert_eq!(store.get("TEST_VAR"), Some("test value"));
        Ok(())
    }

    #[test]
    fn test_overwrite_keeps_single_entry() -> Result<(), EnvError> {
        let mut store = EnvStore::new();
        store.set("A", "1")?;
        store.set("B", "x")?;
        store.set("A", "2")?;

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("A"), Some("2"));
        let names: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["A", "B"]);
        Ok(())
    }

    #[test]
    fn test_unset() -> Result<(), EnvError> {
        let mut store = EnvStore::new();
        store.set("A", "1")?;
        assert_eq!(store.unset("A").as_deref(), Some("1"));
        assert_eq!(store.get("A"), None);
        assert!(store.unset("A").is_none());
        Ok(())
    }

    #[test]
    fn test_unset_preserves_order() -> Result<(), EnvError> {
        let mut store = EnvStore::new();
        for name in ["A", "B", "C"] {
            store.set(name, name)?;
        }
        store.unset("B");
        let names: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["A", "C"]);
        Ok(())
    }

    #[test]
    fn test_invalid_var_name() {
        let mut store = EnvStore::new();
        assert!(store.set("", "value").is_err());
        assert!(store.set("9X", "value").is_err());
    }

    #[test]
    fn test_to_envp() -> Result<(), EnvError> {
        let mut store = EnvStore::new();
        store.set("HOME", "/home/test")?;
        store.set("EMPTY", "")?;
        let envp = store.to_envp();
        assert_eq!(envp[0].to_str().ok(), Some("HOME=/home/test"));
        assert_eq!(envp[1].to_str().ok(), Some("EMPTY="));
        Ok(())
    }

    #[test]
    fn test_from_process_snapshot() {
        let store = EnvStore::from_process();
        if let Ok(path) = env::var("PATH") {
            assert_eq!(store.get("PATH"), Some(path.as_str()));
        }
    }
}
