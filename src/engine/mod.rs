//! Engine module: hashing, progress, tree comparison and linking

pub mod arg_parser;
pub mod cli;
pub mod compare;
pub mod connect;
pub mod hashing;
pub mod progress;
pub mod serial;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use compare::{find_identical_files, flip_file_map, map_hashes_to_paths, unmapped_files};
pub use connect::{ConnectOp, connect_file, connect_files, remove_execute_bits};
pub use hashing::{ContentHasher, HashAlgorithm, HasherFactory, hash_file, hash_reader};
pub use progress::{
    BarReporter, NoopProgressReporter, ProgressAggregator, ProgressReporter, SubProgressReporter,
};
pub use serial::SerialWalkHasher;
pub use tools::{assert_dirs_exist, dir_is_empty, path_relative_to};
