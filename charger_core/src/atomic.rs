use std::{fs, io::Write, path::Path};

use crate::error::{ChargerError, Result};

/// Replace `path` with `bytes` via a fsynced temp file and rename.
///
/// The parent directory is created when missing. Readers never observe a
/// partially written file. Failures are reported as `ChargerError::Io`
/// naming the target path.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    write_inner(path, bytes).map_err(|e| io_error(path, &e))
}

/// Create the directory that will hold `path`, if any.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => fs::create_dir_all(dir).map_err(|e| io_error(path, &e)),
        None => Ok(()),
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> ChargerError {
    ChargerError::Io(format!("{}: {e}", path.display()))
}

fn write_inner(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    let res = (|| {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if res.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    res
}
