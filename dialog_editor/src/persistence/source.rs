//! Where named trees live.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::PersistenceError;

const TREE_EXTENSION: &str = "json";

/// Named storage for canonical tree documents.
#[allow(async_fn_in_trait)]
pub trait TreeSource {
    /// Names of every stored tree, sorted.
    async fn list(&self) -> Result<Vec<String>, PersistenceError>;

    async fn read(&self, name: &str) -> Result<Vec<u8>, PersistenceError>;

    async fn write(&self, name: &str, contents: &[u8]) -> Result<(), PersistenceError>;
}

/// Names become file stems, so they may not reach outside the directory.
fn check_name(name: &str) -> Result<(), PersistenceError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(PersistenceError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// One `<name>.json` file per tree in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, PersistenceError> {
        check_name(name)?;
        Ok(self.root.join(format!("{name}.{TREE_EXTENSION}")))
    }
}

impl TreeSource for DirectorySource {
    async fn list(&self) -> Result<Vec<String>, PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            name: self.root.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(io_err)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TREE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if check_name(stem).is_ok() => names.push(stem.to_owned()),
                _ => log::debug!("source: skipping unloadable entry {}", path.display()),
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, PersistenceError> {
        let path = self.path_for(name)?;
        tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            ErrorKind::NotFound => PersistenceError::NotFound(name.to_owned()),
            _ => PersistenceError::Io {
                name: name.to_owned(),
                source,
            },
        })
    }

    /// Writes a hidden sibling first and renames it over the target, so a
    /// failed write leaves the previous document intact.
    async fn write(&self, name: &str, contents: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(name)?;
        let staging = self.root.join(format!(".{name}.{TREE_EXTENSION}.tmp"));
        let io_err = |source| PersistenceError::Io {
            name: name.to_owned(),
            source,
        };

        if let Err(source) = tokio::fs::write(&staging, contents).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_err(source));
        }
        tokio::fs::rename(&staging, &path).await.map_err(io_err)
    }
}

/// Trees held in memory, e.g. resources bundled with the game.
#[derive(Debug, Default)]
pub struct MemorySource {
    trees: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.trees.get_mut().insert(name.into(), contents.into());
        self
    }

    /// Current contents stored under `name`.
    pub async fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.trees.lock().await.get(name).cloned()
    }
}

impl TreeSource for MemorySource {
    async fn list(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.trees.lock().await.keys().cloned().collect())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, PersistenceError> {
        self.trees
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(name.to_owned()))
    }

    async fn write(&self, name: &str, contents: &[u8]) -> Result<(), PersistenceError> {
        check_name(name)?;
        self.trees
            .lock()
            .await
            .insert(name.to_owned(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_round_trip_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        source.write("guard", b"{}").await.unwrap();
        source.write("merchant", b"[]").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"ignored").await.unwrap();

        assert_eq!(source.list().await.unwrap(), vec!["guard", "merchant"]);
        assert_eq!(source.read("merchant").await.unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_directory_lists_only_loadable_names() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        source.write("guard", b"{}").await.unwrap();
        tokio::fs::write(dir.path().join(".draft.json"), b"{}").await.unwrap();

        let names = source.list().await.unwrap();
        assert_eq!(names, vec!["guard"]);
        for name in names {
            source.read(&name).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_directory_overwrite_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        source.write("guard", b"{\"v\":1}").await.unwrap();
        source.write("guard", b"{\"v\":2}").await.unwrap();

        assert_eq!(source.read("guard").await.unwrap(), b"{\"v\":2}");
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            files.push(entry.file_name().into_string().unwrap());
        }
        assert_eq!(files, vec!["guard.json"]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        source.write("guard", b"{}").await.unwrap();

        // A directory in the staging slot makes the write fail.
        tokio::fs::create_dir(dir.path().join(".guard.json.tmp")).await.unwrap();
        assert!(matches!(
            source.write("guard", b"[]").await,
            Err(PersistenceError::Io { .. })
        ));
        assert_eq!(source.read("guard").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_directory_missing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(matches!(
            source.read("nobody").await,
            Err(PersistenceError::NotFound(name)) if name == "nobody"
        ));
    }

    #[tokio::test]
    async fn test_names_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        for name in ["../evil", "a/b", "", ".hidden"] {
            assert!(matches!(
                source.write(name, b"{}").await,
                Err(PersistenceError::InvalidName(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new().with_tree("bundled", "{}");
        assert_eq!(source.list().await.unwrap(), vec!["bundled"]);

        source.write("fresh", b"[1]").await.unwrap();
        assert_eq!(source.contents("fresh").await, Some(b"[1]".to_vec()));
        assert!(matches!(
            source.read("ghost").await,
            Err(PersistenceError::NotFound(_))
        ));
    }
}
