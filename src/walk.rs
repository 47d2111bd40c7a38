use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::config::WalkConfig;
use crate::error::GosqlfmtError;

/// Collect the source files under `root`, sorted by path.
///
/// Hidden entries (leading `.`) and directories named in `skip_dirs` are
/// pruned; files must carry the configured extension and must not match an
/// `exclude` glob. `.gitignore` is not consulted. A root that is itself a
/// file is returned as-is.
pub fn source_files(root: &Path, config: &WalkConfig) -> Result<Vec<PathBuf>, GosqlfmtError> {
    let meta = std::fs::metadata(root).map_err(|e| GosqlfmtError::WalkFailed {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if meta.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let excludes = build_excludes(&config.exclude)?;
    let skip_dirs = config.skip_dirs.clone();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let Some(name) = entry.file_name().to_str() else {
                return true;
            };
            if name.starts_with('.') {
                return false;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && skip_dirs.iter().any(|d| d == name))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| GosqlfmtError::WalkFailed {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if !has_extension(path, &config.extension) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_match(rel) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension.trim_start_matches('.'))
}

fn build_excludes(patterns: &[String]) -> Result<GlobSet, GosqlfmtError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| GosqlfmtError::ConfigInvalid {
            path: None,
            reason: format!("exclude pattern {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| GosqlfmtError::ConfigInvalid {
        path: None,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package p\n").unwrap();
    }

    fn rel_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn selects_go_files_and_skips_hidden_and_vendor() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "main.go");
        touch(root, "README.md");
        touch(root, ".hidden.go");
        touch(root, ".git/hooks/x.go");
        touch(root, "vendor/lib/lib.go");
        touch(root, "store/vendor/dep.go");
        touch(root, "store/vendors.go");
        touch(root, "store/db.go");

        let files = source_files(root, &WalkConfig::default()).unwrap();
        assert_eq!(
            rel_names(root, &files),
            vec!["main.go", "store/db.go", "store/vendors.go"]
        );
    }

    #[test]
    fn exclude_globs_match_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "a.go");
        touch(root, "pkg/testdata/fixture.go");
        touch(root, "pkg/b.go");

        let config = WalkConfig {
            exclude: vec!["**/testdata/**".into()],
            ..WalkConfig::default()
        };
        let files = source_files(root, &config).unwrap();
        assert_eq!(rel_names(root, &files), vec!["a.go", "pkg/b.go"]);
    }

    #[test]
    fn file_root_is_returned_directly() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "only.go");
        let file = dir.path().join("only.go");
        assert_eq!(source_files(&file, &WalkConfig::default()).unwrap(), vec![file]);
    }

    #[test]
    fn missing_root_is_walk_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = source_files(&dir.path().join("missing"), &WalkConfig::default()).unwrap_err();
        assert!(matches!(err, GosqlfmtError::WalkFailed { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_glob_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = WalkConfig {
            exclude: vec!["a[".into()],
            ..WalkConfig::default()
        };
        let err = source_files(dir.path(), &config).unwrap_err();
        assert!(matches!(err, GosqlfmtError::ConfigInvalid { .. }));
    }
}
