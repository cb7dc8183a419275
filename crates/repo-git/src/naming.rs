//! Branch name to directory name mapping
//!
//! A branch such as `feature/login` must become a single path segment. The
//! mapping is a percent-style escape of exactly two bytes, `%` and `/`, so
//! it is reversible: `decode_segment(encode_branch(b)) == b` for every valid
//! branch, and two distinct branches never share a directory.
//!
//! ```text
//! {base_dir}/{alias}.git/               bare repository
//! {base_dir}/{alias}-{encoded branch}/  worktree
//! ```

use std::path::{Path, PathBuf};

use crate::{DecodeError, Result, validate};

const ESCAPE: u8 = b'%';
const SEPARATOR: u8 = b'/';

/// Separator the pre-0.2.0 layout substituted for `/`.
pub const LEGACY_SEPARATOR: &str = "__";

fn escape_byte(byte: u8) -> Option<&'static str> {
    match byte {
        ESCAPE => Some("%25"),
        SEPARATOR => Some("%2F"),
        _ => None,
    }
}

/// Encode a branch name into a filesystem-safe directory segment.
///
/// The escape character is escaped too, so a literal `%2F` in a branch
/// name cannot be confused with an encoded `/`.
pub fn encode_branch(branch: &str) -> Result<String> {
    validate::validate_branch_name(branch)?;

    let mut encoded = String::with_capacity(branch.len());
    for ch in branch.chars() {
        match u8::try_from(ch).ok().and_then(escape_byte) {
            Some(escaped) => encoded.push_str(escaped),
            None => encoded.push(ch),
        }
    }
    Ok(encoded)
}

/// Decode a directory segment produced by [`encode_branch`].
///
/// Decoding is strict: only `%25` and `%2F` are accepted as escapes, so
/// every segment has exactly one branch and vice versa. Anything else is a
/// corrupted directory name and is reported, never repaired.
pub fn decode_segment(segment: &str) -> std::result::Result<String, DecodeError> {
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            ESCAPE => {
                if i + 3 > bytes.len() {
                    return Err(DecodeError::Truncated {
                        segment: segment.to_string(),
                        offset: i,
                    });
                }
                let sequence = &bytes[i..i + 3];
                let byte = match sequence {
                    b"%25" => ESCAPE,
                    b"%2F" => SEPARATOR,
                    _ => {
                        return Err(DecodeError::InvalidEscape {
                            segment: segment.to_string(),
                            offset: i,
                            sequence: String::from_utf8_lossy(sequence).to_string(),
                        });
                    }
                };
                decoded.push(byte);
                i += 3;
            }
            SEPARATOR => {
                return Err(DecodeError::UnescapedSeparator {
                    segment: segment.to_string(),
                    offset: i,
                });
            }
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8(decoded).map_err(|_| DecodeError::NotUtf8 {
        segment: segment.to_string(),
    })
}

/// Directory of the worktree for `branch` of `alias`.
pub fn worktree_dir(base_dir: &Path, alias: &str, branch: &str) -> Result<PathBuf> {
    validate::validate_repo_alias(alias)?;
    let encoded = encode_branch(branch)?;
    Ok(base_dir.join(format!("{alias}-{encoded}")))
}

/// Directory of the bare repository for `alias`.
pub fn bare_repo_dir(base_dir: &Path, alias: &str) -> Result<PathBuf> {
    validate::validate_repo_alias(alias)?;
    Ok(base_dir.join(format!("{alias}.git")))
}

/// Directory name the pre-0.2.0 layout used: `/` replaced with `__`.
///
/// Lossy, which is why it was replaced; kept only so old directories can be
/// located and moved.
pub fn legacy_dir_name(alias: &str, branch: &str) -> String {
    format!("{alias}-{}", branch.replace('/', LEGACY_SEPARATOR))
}

/// Split a directory name into `(alias, branch)` given the known alias.
///
/// Returns `Ok(None)` when the name does not belong to `alias` at all.
pub fn parse_worktree_dir_name(
    dir_name: &str,
    alias: &str,
) -> std::result::Result<Option<String>, DecodeError> {
    match dir_name.strip_prefix(alias).and_then(|rest| rest.strip_prefix('-')) {
        Some(segment) if !segment.is_empty() => decode_segment(segment).map(Some),
        _ => Ok(None),
    }
}
