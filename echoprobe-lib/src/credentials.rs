//! bcrypt hashing for the credential generator.

use std::io::BufRead;

use crate::error::{ProbeError, Result};

pub use bcrypt::DEFAULT_COST;

/// Hash `password` with bcrypt at the given cost (4..=31)
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    if password.is_empty() {
        return Err(ProbeError::Config("password cannot be empty".into()));
    }
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Strip the line terminator from a password read from stdin, nothing else:
/// leading and trailing spaces are part of the password.
pub fn trim_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Read a password piped in on `reader`: the first line, without its line
/// terminator. Interactive input goes through a hidden TTY prompt instead.
pub fn read_password_line<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(trim_line_ending(&line).to_string())
}
