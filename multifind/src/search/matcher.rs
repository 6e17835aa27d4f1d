use std::ffi::{OsStr, OsString};

/// Compares two file names.
///
/// With `ignore_case` set, bytes are folded with an ASCII-only lowercase
/// mapping; bytes outside ASCII must be identical.
pub fn names_match(candidate: &[u8], wanted: &[u8], ignore_case: bool) -> bool {
    if !ignore_case {
        return candidate == wanted;
    }
    if candidate.len() != wanted.len() {
        return false;
    }
    candidate
        .iter()
        .zip(wanted)
        .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
}

/// Matches directory entry names against one wanted name
#[derive(Debug, Clone)]
pub struct NameMatcher {
    wanted: OsString,
    ignore_case: bool,
}

impl NameMatcher {
    pub fn new(wanted: impl Into<OsString>, ignore_case: bool) -> Self {
        Self {
            wanted: wanted.into(),
            ignore_case,
        }
    }

    pub fn wanted(&self) -> &OsStr {
        &self.wanted
    }

    /// Checks a file name as the OS reports it, without lossy conversion
    pub fn is_match(&self, name: &OsStr) -> bool {
        names_match(
            name.as_encoded_bytes(),
            self.wanted.as_encoded_bytes(),
            self.ignore_case,
        )
    }
}
