use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::protocol::MethodError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// File access confined to a single root directory.
///
/// Every client-supplied path is relative to the root. `..` segments and
/// absolute paths are rejected up front, and the resolved path is checked to
/// still lie inside the canonical root, so symlinks cannot escape it.
#[derive(Debug, Clone)]
pub struct FileSandbox {
    root: PathBuf,
}

impl FileSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn read(&self, path: &str) -> Result<String, MethodError> {
        let target = self.resolve_existing(path).await?;
        tokio::fs::read_to_string(&target)
            .await
            .map_err(|e| io_failure(path, e))
    }

    /// Create or truncate `path` (its parent must already exist). Returns the
    /// number of bytes written.
    pub async fn write(&self, path: &str, contents: &str) -> Result<usize, MethodError> {
        let target = self.resolve_new(path).await?;
        tokio::fs::write(&target, contents.as_bytes())
            .await
            .map_err(|e| io_failure(path, e))?;
        Ok(contents.len())
    }

    /// Entries of a directory (the root when `path` is `None`), sorted by name.
    pub async fn list(&self, path: Option<&str>) -> Result<Vec<FileEntry>, MethodError> {
        let dir = match path {
            Some(p) if !p.is_empty() => self.resolve_existing(p).await?,
            _ => self.canonical_root().await?,
        };
        let shown = path.unwrap_or(".");

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| io_failure(shown, e))?;

        let mut listing = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_failure(shown, e))? {
            let metadata = entry.metadata().await.map_err(|e| io_failure(shown, e))?;
            listing.push(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: metadata.is_dir(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
            });
        }

        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    /// Remove a regular file. Returns `false` when nothing was there.
    pub async fn delete(&self, path: &str) -> Result<bool, MethodError> {
        reject_traversal(path)?;
        let root = self.canonical_root().await?;

        let target = match tokio::fs::canonicalize(root.join(path)).await {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_failure(path, e)),
        };
        ensure_contained(&root, &target, path)?;

        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|e| io_failure(path, e))?;
        if metadata.is_dir() {
            return Err(MethodError::failed(format!("{path} is a directory")));
        }

        tokio::fs::remove_file(&target)
            .await
            .map(|_| true)
            .map_err(|e| io_failure(path, e))
    }

    async fn canonical_root(&self) -> Result<PathBuf, MethodError> {
        tokio::fs::canonicalize(&self.root).await.map_err(|e| {
            tracing::warn!("Files root {} not accessible: {e}", self.root.display());
            MethodError::failed("files root is not accessible")
        })
    }

    /// Resolve a path that must already exist.
    async fn resolve_existing(&self, path: &str) -> Result<PathBuf, MethodError> {
        reject_traversal(path)?;
        let root = self.canonical_root().await?;

        let canonical = tokio::fs::canonicalize(root.join(path))
            .await
            .map_err(|e| io_failure(path, e))?;

        ensure_contained(&root, &canonical, path)?;
        Ok(canonical)
    }

    /// Resolve a path whose final component may not exist yet.
    async fn resolve_new(&self, path: &str) -> Result<PathBuf, MethodError> {
        reject_traversal(path)?;
        let root = self.canonical_root().await?;

        let candidate = root.join(path);
        let file_name = candidate
            .file_name()
            .ok_or_else(|| MethodError::invalid_arguments("path must name a file"))?
            .to_owned();
        let parent = candidate.parent().unwrap_or(root.as_path());

        let parent = tokio::fs::canonicalize(parent).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MethodError::failed(format!("parent directory of {path} does not exist"))
            } else {
                io_failure(path, e)
            }
        })?;

        ensure_contained(&root, &parent, path)?;

        let target = parent.join(file_name);
        match tokio::fs::symlink_metadata(&target).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                // A dangling link would be followed by the write.
                let existing = tokio::fs::canonicalize(&target).await.map_err(|_| {
                    MethodError::invalid_arguments(format!(
                        "path `{path}` is a link that does not resolve inside the files root"
                    ))
                })?;
                ensure_contained(&root, &existing, path)?;
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_failure(path, e)),
        }
        Ok(target)
    }
}

fn reject_traversal(path: &str) -> Result<(), MethodError> {
    if path.is_empty()
        || path.contains("..")
        || path.starts_with('/')
        || path.starts_with('\\')
        || Path::new(path).is_absolute()
    {
        return Err(MethodError::invalid_arguments(format!(
            "path `{path}` must be relative to the files root"
        )));
    }
    Ok(())
}

fn ensure_contained(root: &Path, resolved: &Path, shown: &str) -> Result<(), MethodError> {
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(MethodError::invalid_arguments(format!(
            "path `{shown}` escapes the files root"
        )))
    }
}

fn io_failure(path: &str, err: std::io::Error) -> MethodError {
    match err.kind() {
        ErrorKind::NotFound => MethodError::failed(format!("{path}: no such file or directory")),
        _ => {
            tracing::warn!("File operation on {path} failed: {err}");
            MethodError::failed(format!("{path}: {err}"))
        }
    }
}
