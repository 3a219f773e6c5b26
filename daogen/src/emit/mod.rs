//! Writing generated files
//!
//! [`Emitter`] decides whether a rendered file may be written and hands it
//! to a [`FileSink`]. Model, DAO and repository files are only replaced when
//! forced; an existing connection utility is never replaced.

use crate::codegen::{ArtifactKind, GeneratedFile};
use crate::error::{GenError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Destination for generated files
#[cfg_attr(test, mockall::automock)]
pub trait FileSink: Send + Sync {
    /// Whether a file already exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Write `content` to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if a directory or the file cannot be written.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// File sink rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Sink writing relative paths under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSink for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
        }
        fs::write(&target, content).map_err(|e| GenError::io(&target, e))
    }
}

/// What happened to one generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written to a new file
    Created,
    /// Replaced an existing file (forced)
    Overwritten,
    /// Left the existing file untouched
    SkippedExisting,
}

/// Outcome of emitting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Relative path
    pub path: PathBuf,
    /// Description of the content
    pub description: String,
    /// What the file contains
    pub kind: ArtifactKind,
    /// What happened
    pub outcome: WriteOutcome,
}

/// Applies the overwrite policy and writes through a [`FileSink`]
pub struct Emitter<S> {
    sink: S,
    force: bool,
}

impl<S: FileSink> Emitter<S> {
    /// Emitter overwriting existing files only when `force` is set
    pub const fn new(sink: S, force: bool) -> Self {
        Self { sink, force }
    }

    /// Write one file if the policy allows it
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if writing fails.
    pub fn emit(&self, file: &GeneratedFile) -> Result<EmittedFile> {
        let exists = self.sink.exists(&file.path);
        let outcome = match (exists, file.kind) {
            (false, _) => WriteOutcome::Created,
            (true, ArtifactKind::Connection) => WriteOutcome::SkippedExisting,
            (true, _) if self.force => WriteOutcome::Overwritten,
            (true, _) => WriteOutcome::SkippedExisting,
        };

        if outcome == WriteOutcome::SkippedExisting {
            warn!(path = %file.path.display(), "file exists, skipping");
        } else {
            self.sink.write(&file.path, &file.content)?;
            info!(path = %file.path.display(), ?outcome, "wrote file");
        }

        Ok(EmittedFile {
            path: file.path.clone(),
            description: file.description.clone(),
            kind: file.kind,
            outcome,
        })
    }

    /// Write all files in order, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first [`GenError::Io`] encountered.
    pub fn emit_all(&self, files: &[GeneratedFile]) -> Result<Vec<EmittedFile>> {
        files.iter().map(|file| self.emit(file)).collect()
    }
}
