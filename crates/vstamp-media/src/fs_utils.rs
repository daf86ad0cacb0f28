//! Filesystem helpers for moving finished outputs into place.
//!
//! Stamped clips are written to the temp work directory, which is often on a
//! different filesystem than the user's videos, so a plain rename can fail
//! with EXDEV.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

use crate::error::{MediaError, MediaResult};

/// EXDEV on Linux and macOS.
const EXDEV: i32 = 18;
/// ERROR_NOT_SAME_DEVICE on Windows.
const ERROR_NOT_SAME_DEVICE: i32 = 17;

/// Move `src` to `dst`, replacing `dst` and creating its parent directory.
///
/// Falls back to copy-and-delete across filesystems. The copy goes to a
/// sibling `.partial` file first so `dst` never holds a truncated video.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if src == dst {
        return Ok(());
    }
    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    ensure_parent_dir(dst).await?;

    match fs::rename(src, dst).await {
        Ok(()) => {
            debug!(src = %src.display(), dst = %dst.display(), "Moved file");
            Ok(())
        }
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device rename, falling back to copy"
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the parent directory of `path` if it is missing.
pub async fn ensure_parent_dir(path: &Path) -> MediaResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).await?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_cross_device_error(e: &std::io::Error) -> bool {
    let code = e.raw_os_error();
    if cfg!(windows) {
        code == Some(ERROR_NOT_SAME_DEVICE)
    } else {
        code == Some(EXDEV)
    }
}

fn partial_path(dst: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dst.file_name().unwrap_or_default());
    name.push(".partial");
    dst.with_file_name(name)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let partial = partial_path(dst);

    if let Err(e) = fs::copy(src, &partial).await {
        error!(src = %src.display(), tmp = %partial.display(), error = %e, "Copy failed during cross-device move");
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&partial, dst).await {
        error!(tmp = %partial.display(), dst = %dst.display(), error = %e, "Rename failed during cross-device move");
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }

    // The output is in place; a leftover source only wastes temp space
    if let Err(e) = fs::remove_file(src).await {
        warn!(src = %src.display(), error = %e, "Failed to remove source after cross-device move");
    }

    Ok(())
}
