use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{DirEntry, EntryKind, FileSystem, Metadata};

#[derive(Clone, Debug)]
enum Node {
    Dir { mode: u32 },
    File { data: Vec<u8>, mode: u32 },
}

/// An in-memory filesystem.
///
/// Paths are absolute and keyed in a sorted map, so a directory's
/// descendants always directly follow it. Filesystem roots (`/`, `C:\`)
/// exist implicitly. Errors use the same [`io::ErrorKind`]s the operating
/// system would report.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a single directory. The parent must already exist.
    pub fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        let path = normalize(path)?;
        let mut nodes = self.lock();

        if is_root(&path) || nodes.contains_key(&path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        ensure_parent_dir(&nodes, &path)?;

        nodes.insert(path, Node::Dir { mode });
        Ok(())
    }

    /// Create a directory and every missing ancestor.
    pub fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let path = normalize(path)?;
        let mut nodes = self.lock();

        let mut ancestors: Vec<&Path> = path.ancestors().filter(|p| !is_root(p)).collect();
        ancestors.reverse();

        for dir in ancestors {
            match nodes.get(dir) {
                Some(Node::Dir { .. }) => {}
                Some(Node::File { .. }) => return Err(not_a_directory(dir)),
                None => {
                    nodes.insert(dir.to_path_buf(), Node::Dir { mode });
                }
            }
        }

        Ok(())
    }

    /// Create or truncate a file with `data`. The parent must exist.
    pub fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        let path = normalize(path)?;
        let mut nodes = self.lock();

        if is_root(&path) || matches!(nodes.get(&path), Some(Node::Dir { .. })) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        ensure_parent_dir(&nodes, &path)?;

        nodes.insert(
            path,
            Node::File {
                data: data.to_vec(),
                mode,
            },
        );
        Ok(())
    }

    pub fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = normalize(path)?;
        match self.lock().get(&path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(&path)),
        }
    }

    /// Permission bits the path was created with.
    pub fn mode(&self, path: &Path) -> io::Result<u32> {
        let path = normalize(path)?;
        match self.lock().get(&path) {
            Some(Node::Dir { mode }) | Some(Node::File { mode, .. }) => Ok(*mode),
            None => Err(not_found(&path)),
        }
    }

    /// Remove a file or an empty directory.
    pub fn remove(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path)?;
        let mut nodes = self.lock();

        match nodes.get(&path) {
            None => return Err(not_found(&path)),
            Some(Node::Dir { .. }) if descendants(&nodes, &path).next().is_some() => {
                return Err(io::Error::new(
                    io::ErrorKind::DirectoryNotEmpty,
                    format!("{} is not empty", path.display()),
                ));
            }
            Some(_) => {}
        }

        nodes.remove(&path);
        Ok(())
    }

    /// Remove a path and everything below it.
    pub fn remove_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path)?;
        let mut nodes = self.lock();

        if is_root(&path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to remove a filesystem root",
            ));
        }
        if nodes.remove(&path).is_none() {
            return Err(not_found(&path));
        }

        let doomed: Vec<PathBuf> = descendants(&nodes, &path).cloned().collect();
        for p in doomed {
            nodes.remove(&p);
        }

        Ok(())
    }

    /// Move a file or directory (with its subtree) to `to`.
    pub fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from = normalize(from)?;
        let to = normalize(to)?;
        let mut nodes = self.lock();

        if !nodes.contains_key(&from) {
            return Err(not_found(&from));
        }
        if to.starts_with(&from) && to != from {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot move {} inside itself", from.display()),
            ));
        }
        ensure_parent_dir(&nodes, &to)?;
        if let Some(Node::Dir { .. }) = nodes.get(&to) {
            if descendants(&nodes, &to).next().is_some() {
                return Err(io::Error::new(
                    io::ErrorKind::DirectoryNotEmpty,
                    format!("{} is not empty", to.display()),
                ));
            }
        }

        let mut moved: Vec<(PathBuf, Node)> = Vec::new();
        let subtree: Vec<PathBuf> = std::iter::once(from.clone())
            .chain(descendants(&nodes, &from).cloned())
            .collect();
        for old in subtree {
            if let Some(node) = nodes.remove(&old) {
                let rest = old.strip_prefix(&from).unwrap_or(Path::new(""));
                moved.push((to.join(rest), node));
            }
        }
        nodes.remove(&to);
        nodes.extend(moved);

        Ok(())
    }

    pub fn exists(&self, path: &Path) -> bool {
        match normalize(path) {
            Ok(path) => is_root(&path) || self.lock().contains_key(&path),
            Err(_) => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        // A panic while holding the lock cannot leave the map half-updated in
        // a way later readers care about.
        self.nodes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MemoryFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let path = normalize(path)?;
        let nodes = self.lock();

        match nodes.get(&path) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File { .. }) => return Err(not_a_directory(&path)),
            None if is_root(&path) => {}
            None => return Err(not_found(&path)),
        }

        let entries = descendants(&nodes, &path)
            .filter(|p| p.parent() == Some(path.as_path()))
            .filter_map(|p| {
                let name = p.file_name()?;
                let entry = match &nodes[p] {
                    Node::Dir { .. } => DirEntry::new(name, EntryKind::Directory, 0),
                    Node::File { data, .. } => {
                        DirEntry::new(name, EntryKind::File, data.len() as u64)
                    }
                };
                Some(entry)
            })
            .collect();

        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        let path = normalize(path)?;
        if is_root(&path) {
            return Ok(Metadata {
                is_dir: true,
                len: 0,
            });
        }

        match self.lock().get(&path) {
            Some(Node::Dir { .. }) => Ok(Metadata {
                is_dir: true,
                len: 0,
            }),
            Some(Node::File { data, .. }) => Ok(Metadata {
                is_dir: false,
                len: data.len() as u64,
            }),
            None => Err(not_found(&path)),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        String::from_utf8(self.read_file(path)?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Every key strictly below `dir`.
fn descendants<'a>(
    nodes: &'a BTreeMap<PathBuf, Node>,
    dir: &'a Path,
) -> impl Iterator<Item = &'a PathBuf> + 'a {
    nodes
        .range::<Path, _>((std::ops::Bound::Excluded(dir), std::ops::Bound::Unbounded))
        .map(|(p, _)| p)
        .take_while(move |p| p.starts_with(dir))
}

fn ensure_parent_dir(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if is_root(parent) => Ok(()),
        Some(parent) => match nodes.get(parent) {
            Some(Node::Dir { .. }) => Ok(()),
            Some(Node::File { .. }) => Err(not_a_directory(parent)),
            None => Err(not_found(parent)),
        },
        None => Ok(()),
    }
}

/// Lexically clean an absolute path.
fn normalize(path: &Path) -> io::Result<PathBuf> {
    if !path.is_absolute() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not an absolute path", path.display()),
        ));
    }

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !is_root(&out) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn is_root(path: &Path) -> bool {
    path.parent().is_none()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("{} is not a directory", path.display()),
    )
}
