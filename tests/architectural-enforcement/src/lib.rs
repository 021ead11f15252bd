//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The conductor core stays free of UI frameworks
//! - No sleep() calls in production code
//! - No panicking shortcuts in production code
//!
//! These tests are designed to catch violations early in the development cycle.

use std::fs;
use std::path::{Path, PathBuf};

/// A source file with its test module stripped
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Production lines, numbered from 1
    pub lines: Vec<(usize, String)>,
}

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root), with
/// everything from the first `#[cfg(test)]` onwards dropped
pub fn production_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(root.join(dir))
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };

        let lines = content
            .lines()
            .enumerate()
            .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
            .map(|(idx, line)| (idx + 1, line.to_string()))
            .collect();

        files.push(SourceFile {
            path: entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_path_buf(),
            lines,
        });
    }

    files
}

/// Lines whose code part (comments removed) contains any of `needles`
pub fn find_violations(files: &[SourceFile], needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in files {
        for (number, line) in &file.lines {
            let code = line.split("//").next().unwrap_or(line);
            if needles.iter().any(|n| code.contains(n)) {
                violations.push(format!(
                    "{}:{} - {}",
                    file.path.display(),
                    number,
                    line.trim()
                ));
            }
        }
    }
    violations
}
