use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub file_type: FileType,
    pub target: Option<PathBuf>,
}

/// In-memory file system used by tests.
///
/// Symlinks are modelled explicitly so that canonicalization of `PATH` shims
/// (e.g. `/usr/bin/java -> /usr/lib/jvm/.../bin/java`) can be exercised.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            root: PathBuf::from("/mock"),
        }
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            root,
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), FileType::File, None);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), FileType::Directory, None);
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let target = self.normalize_path(target.as_ref());
        self.insert(link.as_ref(), FileType::Symlink, Some(target));
    }

    fn insert(&self, path: &Path, file_type: FileType, target: Option<PathBuf>) {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(path, MockEntry { file_type, target });
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                file_type: FileType::Directory,
                target: None,
            });
        }
    }

    /// Follows symlinks until a non-link entry is reached.
    fn resolve(&self, path: &Path) -> Option<(PathBuf, FileType)> {
        let files = self.files.read().unwrap();
        let mut current = self.normalize_path(path);

        for _ in 0..32 {
            let entry = files.get(&current)?;
            match (&entry.file_type, &entry.target) {
                (FileType::Symlink, Some(target)) => current = target.clone(),
                (file_type, _) => return Some((current, *file_type)),
            }
        }

        None
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, FileType::Directory)))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, FileType::File)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let (path, file_type) = self
            .resolve(path)
            .ok_or_else(|| anyhow!("Directory not found: {:?}", path))?;

        if file_type != FileType::Directory {
            return Err(anyhow!("Not a directory: {:?}", path));
        }

        let files = self.files.read().unwrap();
        let mut entries = Vec::new();
        for (file_path, entry) in files.iter() {
            if file_path.parent() == Some(path.as_path()) {
                let name = file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();

                entries.push(DirEntry {
                    path: file_path.clone(),
                    name,
                    file_type: entry.file_type,
                });
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .map(|(resolved, _)| resolved)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))
    }

    fn find_executable(&self, name: &str, search_path: &OsStr) -> Option<PathBuf> {
        std::env::split_paths(search_path)
            .map(|dir| self.normalize_path(&dir).join(name))
            .find(|candidate| self.is_file(candidate))
    }
}
