use crate::error::{Error, Result};

/// Separator used to flatten hierarchical key paths into vault names.
pub const KEY_SEPARATOR: &str = "__";

const PATH_SEPARATOR: char = '/';

/// Map a hierarchical key path onto the flat name space of a vault.
///
/// Keys containing [`KEY_SEPARATOR`] are rejected instead of escaped, so the
/// mapping stays collision-free.
pub fn encode_key(path: &str) -> Result<String> {
    if path.contains(KEY_SEPARATOR) {
        return Err(Error::InvalidKey {
            key: path.to_string(),
        });
    }
    Ok(path.replace(PATH_SEPARATOR, KEY_SEPARATOR))
}

/// Reverse of [`encode_key`], used when translating listings back to paths.
pub fn decode_key(name: &str) -> String {
    name.replace(KEY_SEPARATOR, "/")
}

/// Final segment of a key path, or the whole path when it has no `/`.
pub fn leaf_segment(path: &str) -> &str {
    match path.rsplit_once(PATH_SEPARATOR) {
        Some((_, leaf)) => leaf,
        None => path,
    }
}
