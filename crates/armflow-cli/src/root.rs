use armflow_core::config::PLAN_FILE;
use std::path::{Path, PathBuf};

/// Resolve the plan file.
///
/// Priority:
/// 1. `--plan` flag / `ARMFLOW_PLAN` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `armflow.yaml`
///
/// Returns `None` when neither yields a path.
pub fn resolve_plan(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_plan_from(&cwd)
}

/// First `armflow.yaml` found in `start` or any of its ancestors.
pub fn find_plan_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(PLAN_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}

/// Directory plan commands run in: the plan file's parent.
pub fn plan_dir(plan_path: &Path) -> PathBuf {
    match plan_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_plan_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.yaml");
        assert_eq!(resolve_plan(Some(&path)), Some(path));
    }

    #[test]
    fn finds_plan_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PLAN_FILE), "actions: []\n").unwrap();
        let subdir = dir.path().join("cell/station");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_plan_from(&subdir), Some(dir.path().join(PLAN_FILE)));
    }

    #[test]
    fn nearest_plan_shadows_outer_one() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PLAN_FILE), "actions: []\n").unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(inner.join(PLAN_FILE), "actions: []\n").unwrap();

        assert_eq!(find_plan_from(&inner), Some(inner.join(PLAN_FILE)));
    }

    #[test]
    fn directory_named_like_plan_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(PLAN_FILE)).unwrap();
        // May still find a plan further up the real filesystem; never this one.
        assert_ne!(find_plan_from(dir.path()), Some(dir.path().join(PLAN_FILE)));
    }

    #[test]
    fn bare_file_name_runs_in_cwd() {
        assert_eq!(plan_dir(Path::new("armflow.yaml")), PathBuf::from("."));
        assert_eq!(plan_dir(Path::new("/srv/cell/armflow.yaml")), PathBuf::from("/srv/cell"));
    }
}
