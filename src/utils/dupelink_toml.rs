//! Load `.dupelink.toml` from a directory (CLI only). Library callers build `WalkSettings` themselves.

use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::engine::hashing::HashAlgorithm;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub struct DupelinkToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    workers: Option<usize>,
    algorithm: Option<HashAlgorithm>,
    copy_missing: Option<bool>,
    dry_run: Option<bool>,
    verbose: Option<bool>,
    fail_fast: Option<bool>,
}

/// Load `.dupelink.toml` from `dir` if present. Returns None if file missing or unreadable.
pub fn load_dupelink_toml(dir: &Path) -> Option<DupelinkToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_dupelink_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_dupelink_toml(s: &str) -> Result<DupelinkToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $section.$field {
                $opts.$field = v;
            }
        )+
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &DupelinkToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, workers, algorithm, copy_missing, dry_run, verbose, fail_fast);
}
