//! Recreate files from one tree inside the output tree, by hardlink or copy.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::MultiError;
use crate::utils::config::DEFAULT_DIR_MODE;

use super::tools::path_relative_to;

/// How a source file is connected to its place in the output tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectOp {
    Link,
    Copy,
    /// Resolve paths but touch nothing.
    DryRun,
}

impl ConnectOp {
    fn apply(self, src: &Path, dst: &Path) -> Result<()> {
        match self {
            ConnectOp::DryRun => Ok(()),
            ConnectOp::Link => {
                ensure_containing_dirs(dst)?;
                fs::hard_link(src, dst).with_context(|| {
                    format!("could not link {} => {}", src.display(), dst.display())
                })
            }
            ConnectOp::Copy => {
                ensure_containing_dirs(dst)?;
                copy_file(src, dst)
            }
        }
    }
}

/// Apply `op` to every file, placing each at the same path relative to `src_dir` under `out_dir`.
///
/// One failure does not stop the rest; all of them come back together. Returns the number connected.
pub fn connect_files<'a, I>(
    files: I,
    src_dir: &Path,
    out_dir: &Path,
    op: ConnectOp,
) -> std::result::Result<usize, MultiError>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut errors = MultiError::new();
    let mut connected = 0_usize;
    for file in files {
        match connect_file(file, src_dir, out_dir, op) {
            Ok(_) => connected += 1,
            Err(e) => errors.push(e.context(format!("could not connect {}", file.display()))),
        }
    }
    match errors.into_option() {
        None => Ok(connected),
        Some(errors) => Err(errors),
    }
}

/// Connect one file. Returns the destination path.
pub fn connect_file(src_path: &Path, src_dir: &Path, out_dir: &Path, op: ConnectOp) -> Result<PathBuf> {
    let rel = path_relative_to(src_path, src_dir).with_context(|| {
        format!(
            "{} is not contained in {}",
            src_path.display(),
            src_dir.display()
        )
    })?;
    let out_path = out_dir.join(rel);
    op.apply(src_path, &out_path)?;
    Ok(out_path)
}

/// Create every missing directory above `file_path`.
pub fn ensure_containing_dirs(file_path: &Path) -> Result<()> {
    let Some(dir) = file_path.parent() else {
        return Ok(());
    };
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DEFAULT_DIR_MODE);
    }
    builder
        .create(dir)
        .with_context(|| format!("could not make directories for {}", file_path.display()))
}

/// Copy a regular file's bytes to a new file at `dst`. Fails if `dst` exists.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let mut src_file =
        File::open(src).with_context(|| format!("could not open {} for copying", src.display()))?;
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(remove_execute_bits(DEFAULT_DIR_MODE));
    }
    let mut dst_file = options
        .open(dst)
        .with_context(|| format!("could not open {} as copy destination", dst.display()))?;
    io::copy(&mut src_file, &mut dst_file)
        .with_context(|| format!("could not copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Clear the execute bits of a unix mode.
pub fn remove_execute_bits(mode: u32) -> u32 {
    mode & !0o111
}
