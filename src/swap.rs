//! Atomic replacement of the canonical slot file.
//!
//! Whole-file rewrites never touch the canonical file directly. The new
//! contents are written to a staging file next to it and then promoted here:
//! the previous file is copied to a backup and the staging file is renamed
//! over the canonical path. The rename is atomic on the same filesystem, so a
//! crash leaves either the old or the new file in place, never a mix.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Suffix of the staging file used by whole-file rewrites.
pub const STAGING_SUFFIX: &str = ".tmp";

/// Suffix of the backup kept by [`promote`].
pub const BACKUP_SUFFIX: &str = ".bak";

/// Path of the staging file for `canonical`.
pub fn staging_path(canonical: &Path) -> PathBuf {
    with_suffix(canonical, STAGING_SUFFIX)
}

/// Path of the backup file for `canonical`.
pub fn backup_path(canonical: &Path) -> PathBuf {
    with_suffix(canonical, BACKUP_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Promote `staging` to `canonical`.
///
/// When `backup` is given, the current canonical contents are copied there
/// first (replacing any older backup). The canonical path exists at every
/// point of the swap.
pub fn promote(staging: &Path, canonical: &Path, backup: Option<&Path>) -> Result<()> {
    if staging == canonical {
        return Err(Error::invalid_argument("staging path must differ from the canonical path"));
    }
    if !staging.exists() {
        return Err(Error::invalid_state(format!(
            "staging file not found: {}",
            staging.display()
        )));
    }

    if let Some(backup) = backup {
        if backup == canonical || backup == staging {
            return Err(Error::invalid_argument(
                "backup path must differ from canonical and staging paths",
            ));
        }
        match fs::copy(canonical, backup) {
            Ok(_) => log::debug!("Backed up {:?} to {:?}", canonical, backup),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No canonical file at {:?}, skipping backup", canonical)
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }

    fs::rename(staging, canonical)?;
    log::info!("Promoted {:?} to {:?}", staging, canonical);
    Ok(())
}

/// Remove a leftover staging file, if any.
pub fn remove_staging(canonical: &Path) -> Result<bool> {
    match fs::remove_file(staging_path(canonical)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Io(e)),
    }
}
