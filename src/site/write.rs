use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{TapError, TapResult};
use crate::telemetry;

pub const PAGE_FILE: &str = "index.html";
pub const STATIC_SUBDIR: &str = "static";

/// Remove everything inside `dir`, then make sure it exists.
///
/// An entry that cannot be removed is logged and left behind; the number of
/// such entries is returned.
pub fn clear_output_dir(dir: &Path) -> TapResult<usize> {
    clear_with(dir, |path, is_dir| if is_dir { fs::remove_dir_all(path) } else { fs::remove_file(path) })
}

fn clear_with<R>(dir: &Path, remove: R) -> TapResult<usize>
where
    R: Fn(&Path, bool) -> io::Result<()>,
{
    let log = telemetry::build();
    let mut skipped = 0usize;

    if dir.is_dir() {
        for entry in fs::read_dir(dir).map_err(|e| TapError::fs(dir, e))? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => { log.warn_kv("⚠️ unreadable entry", [("dir", dir.display().to_string()), ("error", e.to_string())]); skipped += 1; continue; }
            };
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if let Err(e) = remove(&path, is_dir) {
                log.warn_kv("⚠️ could not delete", [("path", path.display().to_string()), ("error", e.to_string())]);
                skipped += 1;
            }
        }
    }

    fs::create_dir_all(dir).map_err(|e| TapError::fs(dir, e))?;
    Ok(skipped)
}

/// Write `html` to `<dir>/index.html`, creating `dir` as needed.
pub fn write_page(dir: &Path, html: &str) -> TapResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| TapError::fs(dir, e))?;
    let path = dir.join(PAGE_FILE);
    fs::write(&path, html).map_err(|e| TapError::fs(&path, e))?;
    Ok(path)
}

/// Mirror `static_dir` into `<out_dir>/static`. Returns the number of files copied.
pub fn copy_static_assets(static_dir: &Path, out_dir: &Path) -> TapResult<usize> {
    if !static_dir.is_dir() {
        return Err(TapError::fs(static_dir, io::Error::new(io::ErrorKind::NotFound, "static dir missing")));
    }
    let dest_root = out_dir.join(STATIC_SUBDIR);
    let mut copied = 0usize;
    for entry in WalkDir::new(static_dir).sort_by_file_name() {
        let entry = entry.map_err(walk_err)?;
        let rel = entry.path().strip_prefix(static_dir).unwrap_or(entry.path());
        let dest = dest_root.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| TapError::fs(&dest, e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| TapError::fs(&dest, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

pub(crate) fn walk_err(e: walkdir::Error) -> TapError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    TapError::fs(path, io::Error::from(e))
}
