//! Python file collection
//!
//! Expands the paths given on the command line into the list of Python
//! files to process. Directories are walked recursively; `--ignore`
//! prefixes apply everywhere, config excludes only to walked entries
//! (a file named explicitly was asked for).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py" || ext == "pyi")
}

fn is_ignored(path: &Path, ignore: &[String]) -> bool {
    let text = path.to_string_lossy().replace('\\', "/");
    ignore.iter().any(|prefix| text.starts_with(prefix.as_str()))
}

/// Expand `paths` into Python files plus the paths that do not exist.
pub fn collect(paths: &[PathBuf], ignore: &[String], config: &Config) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut missing = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_python_file(path) && !is_ignored(path, ignore) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_python_file(e.path()))
            {
                let file_path = entry.path();
                if !is_ignored(file_path, ignore) && !config.should_exclude(file_path) {
                    files.push(file_path.to_path_buf());
                }
            }
        } else {
            missing.push(path.clone());
        }
    }

    (files, missing)
}
