pub mod config;
pub mod dupelink_toml;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use dupelink_toml::{DupelinkToml, apply_file_to_opts, load_dupelink_toml, parse_dupelink_toml};
pub use fd_limit::{
    FDS_PER_WORKER, determine_workers_given_fd_limit, max_open_fds, max_workers_by_fd_limit,
};
pub use logger::{Colors, setup_logging};
