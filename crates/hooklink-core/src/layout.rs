//! Where tracked hooks live and where git expects them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HooklinkError;

/// Tracked hooks directory, relative to the repository root.
pub const SOURCE_HOOKS_DIR: &[&str] = &["config", "git", "hooks"];

/// Git's hooks directory, relative to the repository root.
pub const TARGET_HOOKS_DIR: &[&str] = &[".git", "hooks"];

/// A single hook: a tracked file and the git hooks entry it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    /// File name shared by source and target.
    pub name: String,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Resolved source and target hook directories of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookLayout {
    source_dir: PathBuf,
    target_dir: PathBuf,
}

impl HookLayout {
    /// Compute the layout under `root` without checking the filesystem.
    pub fn new(root: &Path) -> Self {
        let join = |parts: &[&str]| parts.iter().fold(root.to_path_buf(), |p, c| p.join(c));
        Self {
            source_dir: join(SOURCE_HOOKS_DIR),
            target_dir: join(TARGET_HOOKS_DIR),
        }
    }

    /// Compute the layout under `root` and require both directories to exist.
    ///
    /// # Errors
    ///
    /// Returns [`HooklinkError::SourceDirMissing`] or
    /// [`HooklinkError::TargetDirMissing`], checked in that order.
    pub fn open(root: &Path) -> Result<Self, HooklinkError> {
        let layout = Self::new(root);
        if !layout.source_dir.is_dir() {
            return Err(HooklinkError::SourceDirMissing(layout.source_dir));
        }
        if !layout.target_dir.is_dir() {
            return Err(HooklinkError::TargetDirMissing(layout.target_dir));
        }
        Ok(layout)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Every entry of the source directory, in directory-listing order.
    pub fn hooks(&self) -> Result<Vec<Hook>, HooklinkError> {
        let mut hooks = Vec::new();
        for entry in fs::read_dir(&self.source_dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            hooks.push(Hook {
                name: file_name.to_string_lossy().into_owned(),
                source: entry.path(),
                target: self.target_dir.join(&file_name),
            });
        }
        Ok(hooks)
    }
}
