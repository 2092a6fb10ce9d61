//! Normalization of module-discovery keys into route patterns.
//!
//! A module discovered at `./routes/users/$id.api.rs` serves the pattern
//! `/users/$id`. Index modules serve their parent directory:
//!
//! ```ignore
//!  ./routes/index.page.rs          ""  (matches "/")
//!  ./routes/users/index.api.rs     /users
//!  ./routes/files/$$rest.api.rs    /files/$$rest
//! ```
use crate::error::Error;

/// Strips `prefix` and `suffix` from `key` and collapses a trailing
/// `/index` to the parent path.
pub fn pattern_for(key: &str, prefix: &str, suffix: &str) -> Result<String, Error> {
    let prefix = prefix.trim_end_matches('/');

    let pattern = key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .ok_or_else(|| Error::UnrecognizedModule {
            key: key.to_owned(),
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        })?;

    let pattern = pattern.strip_suffix("/index").unwrap_or(pattern);
    Ok(pattern.to_owned())
}
