//! Map files of one tree onto identical files of another, by digest.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::{FileMap, PathHashes};

/// Bucket paths by hex digest. Digests are keyed by value so equal content lands together.
pub fn map_hashes_to_paths(hashes: &PathHashes) -> HashMap<String, Vec<PathBuf>> {
    let mut by_digest: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for (path, digest) in hashes {
        by_digest
            .entry(digest.to_hex())
            .or_default()
            .push(path.clone());
    }
    by_digest
}

/// Every path in `hashes` whose content also exists in `other`, mapped to all such `other` paths.
pub fn find_identical_files(hashes: &PathHashes, other: &PathHashes) -> FileMap {
    let other_by_digest = map_hashes_to_paths(other);
    let mut identical = FileMap::new();
    for (digest, paths) in map_hashes_to_paths(hashes) {
        let Some(other_paths) = other_by_digest.get(&digest) else {
            continue;
        };
        let mut related = other_paths.clone();
        related.sort();
        for path in paths {
            identical
                .entry(path)
                .or_default()
                .extend(related.iter().cloned());
        }
    }
    identical
}

/// Swap keys and values: each related path maps back to every key it was related to.
pub fn flip_file_map(files: &FileMap) -> FileMap {
    let mut flipped = FileMap::new();
    for (path, related) in files {
        for related_path in related {
            flipped
                .entry(related_path.clone())
                .or_default()
                .push(path.clone());
        }
    }
    for paths in flipped.values_mut() {
        paths.sort();
    }
    flipped
}

/// Paths of `hashes` that are not keys of `files`, sorted.
pub fn unmapped_files(hashes: &PathHashes, files: &FileMap) -> Vec<PathBuf> {
    let mapped: HashSet<&PathBuf> = files.keys().collect();
    let mut unmapped: Vec<PathBuf> = hashes
        .keys()
        .filter(|path| !mapped.contains(path))
        .cloned()
        .collect();
    unmapped.sort();
    unmapped
}
