use anyhow::anyhow;
use dupelink::engine::hashing::HashAlgorithm;
use dupelink::engine::progress::ProgressReporter;
use dupelink::engine::serial::SerialWalkHasher;
use dupelink::pipeline::{
    CancelToken, FileWalker, HashOutcome, ParallelWalkHasher, PathWalker, PathedData, WalkSettings,
    collect_walk_items, create_walk_channels, dispatch_work, hash_worker_loop, process_data,
};
use dupelink::scan::walk_hasher_for;
use dupelink::{FileHashError, PathHashes, WalkHasher};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- mock walker ---

#[derive(Clone, Copy)]
enum Content {
    Data(&'static str),
    /// Reader that errors on first read.
    Broken,
    /// Stalls on its first read, then yields the data.
    Slow(&'static str),
}

/// Reader that counts how many times it was dropped (closed).
struct CountingReader {
    inner: Cursor<&'static [u8]>,
    broken: bool,
    slow: bool,
    closes: Arc<AtomicUsize>,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.slow {
            self.slow = false;
            std::thread::sleep(Duration::from_millis(300));
        }
        if self.broken {
            return Err(io::Error::other("disk on fire"));
        }
        self.inner.read(buf)
    }
}

impl Drop for CountingReader {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Yields a fixed list of files, in order, each with an already-open reader.
struct StaticWalker {
    files: Vec<(&'static str, Content)>,
    closes: Arc<AtomicUsize>,
}

impl StaticWalker {
    fn new(files: Vec<(&'static str, Content)>) -> Arc<Self> {
        Arc::new(Self {
            files,
            closes: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl PathWalker for StaticWalker {
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(PathedData) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        for (rel, content) in &self.files {
            let (bytes, broken, slow) = match *content {
                Content::Data(s) => (s.as_bytes(), false, false),
                Content::Broken => (&b""[..], true, false),
                Content::Slow(s) => (s.as_bytes(), false, true),
            };
            let reader = CountingReader {
                inner: Cursor::new(bytes),
                broken,
                slow,
                closes: Arc::clone(&self.closes),
            };
            visit(PathedData::with_reader(root.join(rel), Box::new(reader)))?;
        }
        Ok(())
    }
}

/// Yields every file of `inner`, then fails.
struct FailingWalker {
    inner: Arc<StaticWalker>,
}

impl PathWalker for FailingWalker {
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(PathedData) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        self.inner.walk(root, visit)?;
        Err(anyhow!("lost track of {}", root.display()))
    }
}

#[derive(Default)]
struct RecordingReporter {
    values: Mutex<Vec<usize>>,
}

impl ProgressReporter for RecordingReporter {
    fn report_progress(&self, progress: usize) {
        self.values.lock().unwrap().push(progress);
    }
}

const ROOT: &str = "root";

fn canonical_files() -> Vec<(&'static str, Content)> {
    vec![
        ("a/b", Content::Data("hello world")),
        ("a/bb/c", Content::Data("my awesome file!")),
        ("a/bb/d", Content::Data("unit testing...")),
        ("a/bb/e", Content::Data("this is the last file I'm testing")),
    ]
}

fn canonical_hex() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "a/b",
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
        ),
        (
            "a/bb/c",
            "6cd8ca076b44600d0c183520c0c30bd6d65995b11a36727dcee777fa8e6f5ad0",
        ),
        (
            "a/bb/d",
            "100182cad7531dc4c202e34ee5c666ea284c66196f1bfee24812d11ba1543d86",
        ),
        (
            "a/bb/e",
            "d6f542548b05eeef1e909a850dd3f3e383caffdb7e59f059b739584322fee77f",
        ),
    ]
}

fn settings_with(walker: Arc<dyn PathWalker>) -> WalkSettings {
    WalkSettings::for_algorithm(HashAlgorithm::Sha256).walker(walker)
}

fn hashers_with(settings: WalkSettings) -> Vec<Box<dyn WalkHasher>> {
    vec![
        Box::new(SerialWalkHasher::new(settings.clone())),
        Box::new(ParallelWalkHasher::new(2, settings.clone())),
        Box::new(ParallelWalkHasher::new(4, settings)),
    ]
}

fn assert_canonical(hashes: &PathHashes) {
    assert_eq!(hashes.len(), 4);
    for (rel, hex) in canonical_hex() {
        let digest = hashes
            .get(&Path::new(ROOT).join(rel))
            .unwrap_or_else(|| panic!("missing {rel}"));
        assert_eq!(digest.to_hex(), hex, "{rel}");
    }
}

// --- walk_and_hash ---

#[test]
fn test_serial_and_parallel_hash_canonical_tree() {
    let walker = StaticWalker::new(canonical_files());
    let hashers = hashers_with(settings_with(walker.clone()));
    for (run, hasher) in hashers.iter().enumerate() {
        let (hashes, errors) = hasher.walk_and_hash(Path::new(ROOT)).unwrap();
        assert!(errors.is_none());
        assert_canonical(&hashes);
        // Every reader closed exactly once per walk.
        assert_eq!(walker.closes(), 4 * (run + 1));
    }
}

#[test]
fn test_worker_count_does_not_change_result() {
    let walker = StaticWalker::new(canonical_files());
    let reference = SerialWalkHasher::new(settings_with(walker.clone()))
        .walk_and_hash(Path::new(ROOT))
        .unwrap()
        .0;
    for workers in [1, 2, 3, 4, 8, 16] {
        let (hashes, errors) = walk_hasher_for(workers, settings_with(walker.clone()))
            .walk_and_hash(Path::new(ROOT))
            .unwrap();
        assert!(errors.is_none());
        assert_eq!(hashes, reference, "workers={workers}");
    }
}

#[test]
fn test_same_hasher_is_reusable() {
    let walker = StaticWalker::new(canonical_files());
    let hasher = ParallelWalkHasher::new(3, settings_with(walker.clone()));
    let first = hasher.walk_and_hash(Path::new(ROOT)).unwrap().0;
    let second = hasher.walk_and_hash(Path::new(ROOT)).unwrap().0;
    assert_eq!(first, second);
    assert_eq!(walker.closes(), 8);
}

#[test]
fn test_failing_file_last_keeps_other_hashes() {
    let mut files = canonical_files();
    files.push(("a/broken", Content::Broken));
    let walker = StaticWalker::new(files);
    for hasher in hashers_with(settings_with(walker.clone())) {
        let before = walker.closes();
        let (hashes, errors) = hasher.walk_and_hash(Path::new(ROOT)).unwrap();
        assert_canonical(&hashes);
        assert!(!hashes.contains_key(&Path::new(ROOT).join("a/broken")));
        let errors = errors.expect("one file failed");
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("a/broken"));
        let err = errors.errors()[0]
            .downcast_ref::<FileHashError>()
            .expect("per-file error");
        assert_eq!(err.path(), &Path::new(ROOT).join("a/broken"));
        assert_eq!(walker.closes() - before, 5);
    }
}

#[test]
fn test_keep_going_hashes_everything_after_failure() {
    let mut files = vec![("a/broken", Content::Broken)];
    files.extend(canonical_files());
    let walker = StaticWalker::new(files);
    for hasher in hashers_with(settings_with(walker.clone()).fail_fast(false)) {
        let (hashes, errors) = hasher.walk_and_hash(Path::new(ROOT)).unwrap();
        assert_canonical(&hashes);
        assert_eq!(errors.map(|e| e.len()), Some(1));
    }
    assert_eq!(walker.closes(), 15);
}

#[test]
fn test_fail_fast_stops_dispatch_and_closes_everything() {
    let mut files = vec![("a/broken", Content::Broken)];
    files.extend(canonical_files());
    let walker = StaticWalker::new(files);

    // Serial is deterministic: nothing after the failure is hashed.
    let (hashes, errors) = SerialWalkHasher::new(settings_with(walker.clone()))
        .walk_and_hash(Path::new(ROOT))
        .unwrap();
    assert!(hashes.is_empty());
    assert_eq!(errors.map(|e| e.len()), Some(1));
    assert_eq!(walker.closes(), 5);

    let (hashes, errors) = ParallelWalkHasher::new(2, settings_with(walker.clone()))
        .walk_and_hash(Path::new(ROOT))
        .unwrap();
    assert!(!hashes.contains_key(&Path::new(ROOT).join("a/broken")));
    assert_eq!(errors.map(|e| e.len()), Some(1));
    // Undispatched readers are dropped unopened, still exactly once.
    assert_eq!(walker.closes(), 10);
}

#[test]
fn test_fail_fast_still_records_file_in_flight() {
    let mut files = vec![
        ("slow", Content::Slow("hello world")),
        ("broken", Content::Broken),
    ];
    let trailing: Vec<&'static str> = (0..50)
        .map(|i| &*Box::leak(format!("rest/{i}").into_boxed_str()))
        .collect();
    files.extend(trailing.iter().map(|rel| (*rel, Content::Data("tail"))));
    let walker = StaticWalker::new(files);

    let hasher = ParallelWalkHasher::new(2, settings_with(walker.clone()));
    assert_eq!(hasher.num_workers(), 2);
    let (hashes, errors) = hasher.walk_and_hash(Path::new(ROOT)).unwrap();

    // The slow file was taken before the failure cancelled the walk; it must still be recorded.
    assert_eq!(
        hashes[&Path::new(ROOT).join("slow")].to_hex(),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    assert_eq!(errors.map(|e| e.len()), Some(1));
    let tail_hashed = trailing
        .iter()
        .filter(|rel| hashes.contains_key(&Path::new(ROOT).join(rel)))
        .count();
    assert!(tail_hashed < 10, "dispatch kept going: {tail_hashed} trailing files hashed");
    assert_eq!(walker.closes(), 52);
}

#[test]
fn test_parallel_hasher_clamps_worker_count() {
    let walker = StaticWalker::new(canonical_files());
    let hasher = ParallelWalkHasher::new(0, settings_with(walker));
    assert_eq!(hasher.num_workers(), 1);
    let (hashes, errors) = hasher.walk_and_hash(Path::new(ROOT)).unwrap();
    assert_canonical(&hashes);
    assert!(errors.is_none());
}

#[test]
fn test_walk_error_returns_err_and_no_map() {
    let walker = Arc::new(FailingWalker {
        inner: StaticWalker::new(canonical_files()),
    });
    for hasher in hashers_with(settings_with(walker.clone())) {
        let err = hasher.walk_and_hash(Path::new(ROOT)).unwrap_err();
        assert!(format!("{:#}", err).contains("lost track of root"));
    }
    assert_eq!(walker.inner.closes(), 12);
}

#[test]
fn test_missing_root_is_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    for workers in [1, 4] {
        let result = walk_hasher_for(workers, WalkSettings::for_algorithm(HashAlgorithm::Sha256))
            .walk_and_hash(&missing);
        assert!(result.is_err(), "workers={workers}");
    }
}

#[test]
fn test_empty_dir_gives_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    for workers in [1, 4] {
        let (hashes, errors) = dupelink::hash_dir(dir.path(), workers, HashAlgorithm::Sha256).unwrap();
        assert!(hashes.is_empty());
        assert!(errors.is_none());
    }
}

#[test]
fn test_interrupt_aborts_walk() {
    let walker = StaticWalker::new(canonical_files());
    let flag = Arc::new(AtomicBool::new(true));
    let settings = settings_with(walker.clone()).interrupt(Some(flag));
    for hasher in hashers_with(settings) {
        let err = hasher.walk_and_hash(Path::new(ROOT)).unwrap_err();
        assert!(err.to_string().contains("interrupted"));
    }
    assert_eq!(walker.closes(), 12);
}

#[test]
fn test_progress_reported_per_dispatched_file() {
    let walker = StaticWalker::new(canonical_files());
    for workers in [1, 4] {
        let reporter = Arc::new(RecordingReporter::default());
        let settings = settings_with(walker.clone()).progress(reporter.clone());
        walk_hasher_for(workers, settings)
            .walk_and_hash(Path::new(ROOT))
            .unwrap();
        assert_eq!(*reporter.values.lock().unwrap(), vec![0, 0, 25, 50, 75]);
    }
}

// --- real filesystem ---

#[test]
fn test_file_walker_hashes_real_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("a/bb")).unwrap();
    std::fs::create_dir_all(root.join("empty")).unwrap();
    for (rel, content) in canonical_files() {
        if let Content::Data(s) = content {
            std::fs::write(root.join(rel), s).unwrap();
        }
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(root.join("a/b"), root.join("a/link")).unwrap();

    for workers in [1, 2, 4] {
        let (hashes, errors) = dupelink::hash_dir(root, workers, HashAlgorithm::Sha256).unwrap();
        assert!(errors.is_none());
        assert_eq!(hashes.len(), 4, "dirs and symlinks are skipped");
        for (rel, hex) in canonical_hex() {
            assert_eq!(hashes[&root.join(rel)].to_hex(), hex);
        }
    }
}

#[test]
fn test_collect_walk_items_only_regular_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("x/y")).unwrap();
    std::fs::write(dir.path().join("x/y/z"), "z").unwrap();
    std::fs::write(dir.path().join("top"), "t").unwrap();
    let mut paths: Vec<PathBuf> = collect_walk_items(&FileWalker, dir.path())
        .unwrap()
        .iter()
        .map(|item| item.path().to_path_buf())
        .collect();
    paths.sort();
    assert_eq!(paths, vec![dir.path().join("top"), dir.path().join("x/y/z")]);
}

#[test]
fn test_process_data_open_failure() {
    let dir = tempfile::tempdir().unwrap();
    let item = PathedData::new(dir.path().join("gone"));
    match process_data(item, &HashAlgorithm::Sha256.factory()) {
        HashOutcome::Failed(err @ FileHashError::Open { .. }) => {
            assert!(err.to_string().starts_with("could not open data for path"));
        }
        _ => panic!("expected open failure"),
    }
}

// --- dispatch / workers / cancel ---

#[test]
fn test_dispatch_with_cancelled_token_sends_nothing() {
    let walker = StaticWalker::new(canonical_files());
    let items = collect_walk_items(walker.as_ref(), Path::new(ROOT)).unwrap();
    let channels = create_walk_channels();
    let cancel = CancelToken::new(None);
    cancel.cancel();
    let reporter = RecordingReporter::default();
    let sent = dispatch_work(items, channels.work_tx, &cancel, &reporter);
    assert_eq!(sent, 0);
    assert!(reporter.values.lock().unwrap().is_empty());
    assert_eq!(walker.closes(), 4);
    // Sender dropped on return.
    assert!(channels.work_rx.recv().is_err());
}

#[test]
fn test_worker_loop_with_cancelled_token_exits() {
    let channels = create_walk_channels();
    let (result_tx, result_rx) = crossbeam_channel::bounded(1);
    let cancel = CancelToken::new(None);
    cancel.cancel();
    // work_tx stays open: only the cancel check can end the loop.
    hash_worker_loop(
        0,
        channels.work_rx,
        result_tx,
        cancel,
        HashAlgorithm::Sha256.factory(),
    );
    assert!(result_rx.recv().is_err());
    drop(channels.work_tx);
}

#[test]
fn test_cancel_token_is_idempotent_and_shared() {
    let cancel = CancelToken::new(None);
    let clone = cancel.clone();
    assert!(!clone.is_cancelled());
    cancel.cancel();
    cancel.cancel();
    clone.cancel();
    assert!(clone.is_cancelled());
    assert!(!clone.interrupted());
    assert!(clone.signal().recv().is_err());
}

#[test]
fn test_cancel_token_observes_interrupt() {
    let flag = Arc::new(AtomicBool::new(false));
    let cancel = CancelToken::new(Some(flag.clone()));
    assert!(!cancel.is_cancelled());
    flag.store(true, Ordering::SeqCst);
    assert!(cancel.interrupted());
    assert!(cancel.is_cancelled());
    assert!(cancel.signal().recv().is_err());
}
