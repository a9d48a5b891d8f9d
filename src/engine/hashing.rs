//! File hashing utilities

use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Sha256, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::FileDigest;
use crate::utils::config::HashingConsts;

/// Running hash state. Fed the whole stream, then finished into a [`FileDigest`].
pub trait ContentHasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finish(self: Box<Self>) -> FileDigest;
}

macro_rules! impl_content_hasher_for_sha2 {
    ($($hasher:ty),* $(,)?) => {
        $(
            impl ContentHasher for $hasher {
                fn update(&mut self, data: &[u8]) {
                    sha2::Digest::update(self, data);
                }

                fn finish(self: Box<Self>) -> FileDigest {
                    FileDigest::new(sha2::Digest::finalize(*self).to_vec())
                }
            }
        )*
    };
}

impl_content_hasher_for_sha2!(Sha256, Sha512);

impl ContentHasher for blake3::Hasher {
    fn update(&mut self, data: &[u8]) {
        blake3::Hasher::update(self, data);
    }

    fn finish(self: Box<Self>) -> FileDigest {
        FileDigest::new(self.finalize().as_bytes().to_vec())
    }
}

/// Constructor for a fresh hasher; called once per file.
pub type HasherFactory = Arc<dyn Fn() -> Box<dyn ContentHasher> + Send + Sync>;

/// Digest algorithm selectable from the CLI and `.dupelink.toml`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    pub fn new_hasher(self) -> Box<dyn ContentHasher> {
        match self {
            HashAlgorithm::Sha256 => Box::new(<Sha256 as sha2::Digest>::new()),
            HashAlgorithm::Sha512 => Box::new(<Sha512 as sha2::Digest>::new()),
            HashAlgorithm::Blake3 => Box::new(blake3::Hasher::new()),
        }
    }

    pub fn factory(self) -> HasherFactory {
        Arc::new(move || self.new_hasher())
    }
}

/// Stream every byte of `reader` into `hasher`. Returns the number of bytes hashed.
///
/// Reads in fixed chunks so memory stays flat regardless of file size. Any read failure
/// invalidates the whole file; the partially fed hasher must be discarded.
pub fn hash_reader(hasher: &mut dyn ContentHasher, reader: &mut dyn Read) -> io::Result<u64> {
    let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    let mut total = 0_u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
        total += n as u64;
    }
    Ok(total)
}

/// Hash the file at `path` in full with `algorithm`.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<FileDigest> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = algorithm.new_hasher();
    hash_reader(hasher.as_mut(), &mut file)
        .with_context(|| format!("hash {}", path.display()))?;
    Ok(hasher.finish())
}
