//! Hierarchy-preserving move and copy
//!
//! A file at `source_root/a/b/c.jpg` routed to `dest` lands at
//! `dest/a/b/c.jpg`. Existing destination files are overwritten (or the
//! OS error is surfaced); nothing is renamed to dodge a collision.

use crate::config::TransferMode;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where `source` ends up when re-rooted from `source_root` to `destination_root`
pub fn destination_path(source: &Path, source_root: &Path, destination_root: &Path) -> Result<PathBuf> {
    let relative = source
        .strip_prefix(source_root)
        .map_err(|_| Error::OutsideSourceRoot {
            path: source.to_path_buf(),
            root: source_root.to_path_buf(),
        })?;
    Ok(destination_root.join(relative))
}

/// Move or copy `source` under `destination_root`, returning the new path
pub fn transfer(
    source: &Path,
    source_root: &Path,
    destination_root: &Path,
    mode: TransferMode,
) -> Result<PathBuf> {
    let dest = destination_path(source, source_root, destination_root)?;

    perform_file_operation(source, &dest, mode).map_err(|e| Error::Transfer {
        path: source.to_path_buf(),
        source: e,
    })?;

    info!(
        source = %source.display(),
        dest = %dest.display(),
        ?mode,
        "Transferred"
    );
    Ok(dest)
}

fn perform_file_operation(source: &Path, dest: &Path, mode: TransferMode) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    match mode {
        TransferMode::Copy => copy_with_metadata(source, dest),
        TransferMode::Move => match fs::rename(source, dest) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                debug!(error = %e, "Rename crosses file systems, falling back to copy");
                copy_then_remove(source, dest, |path| fs::remove_file(path))
            }
            Err(e) => Err(e),
        },
    }
}

/// Copy, then delete the source with `remove`
///
/// When the source cannot be deleted the copy is removed again, so a failed
/// move never leaves the file in both places.
fn copy_then_remove(
    source: &Path,
    dest: &Path,
    remove: impl FnOnce(&Path) -> std::io::Result<()>,
) -> std::io::Result<()> {
    copy_with_metadata(source, dest)?;
    if let Err(e) = remove(source) {
        if let Err(cleanup) = fs::remove_file(dest) {
            warn!(dest = %dest.display(), error = %cleanup, "Failed to roll back copy");
        }
        return Err(e);
    }
    Ok(())
}

/// Copy contents, permissions and access/modification times
fn copy_with_metadata(source: &Path, dest: &Path) -> std::io::Result<()> {
    let metadata = fs::metadata(source)?;
    copy_file(source, dest)?;

    fs::set_permissions(dest, metadata.permissions())?;
    let atime = filetime::FileTime::from_last_access_time(&metadata);
    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest, atime, mtime)?;
    Ok(())
}

/// Copy file with buffered I/O
fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}
