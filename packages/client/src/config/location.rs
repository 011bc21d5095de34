//! Process-wide fallback for the credential directory
//!
//! Mirrors the `ssl.props.location` property: a directory configured once for
//! the whole process and used by every transport constructed without one.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::defaults::SSL_PROPS_LOCATION_ENV;
use crate::error::{self, Result};

static SSL_PROPS_LOCATION: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Set (or clear with `None`) the process-wide credential directory.
pub fn set_ssl_props_location(dir: Option<PathBuf>) {
    let mut guard = match SSL_PROPS_LOCATION.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = dir;
}

/// The process-wide credential directory, if one was set.
pub fn ssl_props_location() -> Option<PathBuf> {
    let guard = match SSL_PROPS_LOCATION.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.clone()
}

/// Resolve the credential directory for one transport.
///
/// Order: the explicit directory, the process-wide property, then the
/// `SSL_PROPS_LOCATION` environment variable. Empty values count as unset.
///
/// # Errors
///
/// Returns a `Config` error when none of the sources yields a directory.
pub fn resolve_credential_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit.filter(|dir| !dir.as_os_str().is_empty()) {
        return Ok(dir.to_path_buf());
    }

    if let Some(dir) = ssl_props_location().filter(|dir| !dir.as_os_str().is_empty()) {
        return Ok(dir);
    }

    match env::var_os(SSL_PROPS_LOCATION_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Err(error::config("missing credential path")),
    }
}
