//! Path discovery: walk a root and produce one [`PathedData`] per regular file.

use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::errors::FileHashError;

/// Readable byte stream for one file. Dropping it closes the underlying handle.
pub type DataReader = Box<dyn Read + Send>;

/// A discovered file: its path plus, optionally, an already-open reader.
///
/// Walkers normally hand out paths only and the consuming worker opens the file, so at most
/// `workers` descriptors are open at a time. Test walkers may attach a reader up front.
pub struct PathedData {
    path: PathBuf,
    data: Option<DataReader>,
}

impl PathedData {
    /// Entry that will be opened from disk by whoever consumes it.
    pub fn new(path: PathBuf) -> Self {
        Self { path, data: None }
    }

    /// Entry whose data is already open.
    pub fn with_reader(path: PathBuf, reader: DataReader) -> Self {
        Self {
            path,
            data: Some(reader),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the data if not already open. The returned reader is owned by the caller and closed on drop.
    pub fn open(self) -> std::result::Result<(PathBuf, DataReader), FileHashError> {
        match self.data {
            Some(reader) => Ok((self.path, reader)),
            None => match File::open(&self.path) {
                Ok(file) => Ok((self.path, Box::new(file))),
                Err(source) => Err(FileHashError::Open {
                    path: self.path,
                    source,
                }),
            },
        }
    }
}

/// Something that can enumerate the regular files under a root.
pub trait PathWalker: Send + Sync {
    /// Call `visit` once per regular file under `root`. Any error (from the walk or from `visit`) aborts the walk.
    fn walk(&self, root: &Path, visit: &mut dyn FnMut(PathedData) -> Result<()>) -> Result<()>;
}

/// One result from a directory walk.
pub enum WalkOutcome {
    File(PathBuf),
    /// Directories, symlinks, devices, sockets: never hashed.
    Skipped,
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: std::result::Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) if entry.file_type().is_file() => WalkOutcome::File(entry.into_path()),
        Ok(_) => WalkOutcome::Skipped,
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Walks the real filesystem with walkdir. Does not follow symlinks; only regular files are visited.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileWalker;

impl PathWalker for FileWalker {
    fn walk(&self, root: &Path, visit: &mut dyn FnMut(PathedData) -> Result<()>) -> Result<()> {
        let iter = walkdir::WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .map(to_outcome_walkdir);
        for outcome in iter {
            match outcome {
                WalkOutcome::File(path) => visit(PathedData::new(path))?,
                WalkOutcome::Skipped => {}
                WalkOutcome::Err { msg, path } => {
                    let at = path
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    return Err(anyhow!("{}", msg)).with_context(|| format!("could not walk {at}"));
                }
            }
        }
        Ok(())
    }
}

/// Materialize every item `walker` yields under `root`. A walk error discards everything collected so far.
pub fn collect_walk_items(walker: &dyn PathWalker, root: &Path) -> Result<Vec<PathedData>> {
    let mut items = Vec::new();
    walker.walk(root, &mut |item| {
        items.push(item);
        Ok(())
    })?;
    Ok(items)
}
