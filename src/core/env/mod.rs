mod vars;

pub use vars::EnvStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("`{0}': not a valid identifier")]
    InvalidName(String),
    #[error("`{0}': value contains a NUL byte")]
    NulByte(String),
}

/// First character of a variable name: `[A-Za-z_]`.
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Any later character of a variable name: `[A-Za-z0-9_]`.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => chars.all(is_name_char),
        _ => false,
    }
}
