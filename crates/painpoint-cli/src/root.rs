use painpoint_core::paths::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Resolve the project root holding `painpoints.yaml`.
///
/// Priority:
/// 1. `--root` flag / `PAINPOINTS_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `start` looking for `painpoints.yaml`
/// 3. Walk upward from `start` looking for `.git/`
/// 4. Fall back to `start`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(explicit, &cwd)
}

fn resolve_from(explicit: Option<&Path>, start: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    find_upward(start, |dir| dir.join(CONFIG_FILE).is_file())
        .or_else(|| find_upward(start, |dir| dir.join(".git").is_dir()))
        .unwrap_or_else(|| start.to_path_buf())
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| found(dir)).map(Path::to_path_buf)
}
