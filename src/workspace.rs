use anyhow::{Context, Result};
use fs_err as fs;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static UNSAFE_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s/:]").expect("static regex"));

const UNITS: [&str; 5] = ["b", "Kb", "Mb", "Gb", "Tb"];

/// Turn a user-supplied identifier into a single path component.
pub fn sanitize_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name.trim(), "-").into_owned()
}

/// Human readable size, base 1024.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.2} {}", UNITS[unit])
    }
}

/// Root directory under which tools keep their state, one folder per tool.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tool_dir(&self, tool_name: &str) -> PathBuf {
        self.root.join(sanitize_name(tool_name))
    }

    /// Create the tool directory if needed.
    pub fn ensure_tool_dir(&self, tool_name: &str) -> Result<PathBuf> {
        let dir = self.tool_dir(tool_name);
        if !dir.is_dir() {
            fs::create_dir_all(&dir).with_context(|| format!("creating {tool_name} workspace"))?;
            log::info!("created workspace for {tool_name} at {}", dir.display());
        }
        Ok(dir)
    }
}

/// Sorted names of the sub-directories of `dir`; empty when `dir` is missing.
pub fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_whitespace_and_separators() {
        assert_eq!(sanitize_name("ubuntu:22.04 lts"), "ubuntu-22.04-lts");
        assert_eq!(sanitize_name("library/alpine:latest"), "library-alpine-latest");
        assert_eq!(sanitize_name("  spaced\tname "), "spaced-name");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(512), "512 b");
        assert_eq!(format_size(2048), "2.00 Kb");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.50 Mb");
        assert_eq!(format_size(3 * 1024u64.pow(4)), "3.00 Tb");
    }

    #[test]
    fn tool_dirs_live_under_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        let dir = ws.ensure_tool_dir("WSLBuilder").unwrap();
        assert_eq!(dir, tmp.path().join("WSLBuilder"));
        assert!(dir.is_dir());
        std::fs::create_dir(dir.join("b")).unwrap();
        std::fs::create_dir(dir.join("a")).unwrap();
        std::fs::write(dir.join("file.txt"), "x").unwrap();
        assert_eq!(list_dirs(&dir).unwrap(), vec!["a", "b"]);
        assert!(list_dirs(&tmp.path().join("missing")).unwrap().is_empty());
    }
}
