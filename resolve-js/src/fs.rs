use crate::path;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;

/// Read-only filesystem access, as the bundler core sees it. Implementations
/// must answer with the same virtual `/`-separated absolute paths they are
/// queried with.
pub trait FileSystem {
  fn read_file(&self, path: &str) -> Option<String>;
  fn is_file(&self, path: &str) -> bool;
  fn is_dir(&self, path: &str) -> bool;
  fn list_dir(&self, path: &str) -> Option<Vec<String>>;
}

/// In-memory filesystem backed by a path → contents map. Directories are
/// implied by the paths of the files they contain.
pub struct MockFs {
  files: HashMap<String, String>,
  dirs: HashSet<String>,
}

impl MockFs {
  pub fn new<K: Into<String>, V: Into<String>>(entries: impl IntoIterator<Item = (K, V)>) -> MockFs {
    let mut files = HashMap::new();
    let mut dirs = HashSet::new();
    for (key, value) in entries {
      let key = key.into();
      for ancestor in path::ancestors(path::dir(&key)) {
        dirs.insert(ancestor.to_string());
      }
      files.insert(key, value.into());
    }
    MockFs { files, dirs }
  }
}

impl FileSystem for MockFs {
  fn read_file(&self, path: &str) -> Option<String> {
    self.files.get(path).cloned()
  }

  fn is_file(&self, path: &str) -> bool {
    self.files.contains_key(path)
  }

  fn is_dir(&self, path: &str) -> bool {
    self.dirs.contains(path)
  }

  fn list_dir(&self, dir_path: &str) -> Option<Vec<String>> {
    if !self.is_dir(dir_path) {
      return None;
    }
    let mut names: Vec<String> = self
      .files
      .keys()
      .filter(|file| path::dir(file) == dir_path)
      .map(|file| path::base(file).to_string())
      .collect();
    names.sort_unstable();
    Some(names)
  }
}

/// The real filesystem. Paths are passed straight through to the OS, so this
/// is only meaningful on hosts where absolute paths are `/`-separated.
pub struct OsFs;

impl FileSystem for OsFs {
  fn read_file(&self, path: &str) -> Option<String> {
    std::fs::read_to_string(path).ok()
  }

  fn is_file(&self, path: &str) -> bool {
    std::fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
  }

  fn is_dir(&self, path: &str) -> bool {
    std::fs::metadata(path).map(|meta| meta.is_dir()).unwrap_or(false)
  }

  fn list_dir(&self, path: &str) -> Option<Vec<String>> {
    let entries = std::fs::read_dir(path).ok()?;
    let mut names: Vec<String> = entries
      .filter_map(|entry| entry.ok())
      .filter_map(|entry| entry.file_name().into_string().ok())
      .collect();
    names.sort_unstable();
    Some(names)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mock_fs_implies_directories() {
    let fs = MockFs::new([("/a/b/c.js", "x"), ("/a/d.js", "y")]);
    assert!(fs.is_file("/a/b/c.js"));
    assert!(!fs.is_file("/a/b"));
    assert!(fs.is_dir("/a"));
    assert!(fs.is_dir("/a/b"));
    assert!(fs.is_dir("/"));
    assert!(!fs.is_dir("/missing"));
    assert_eq!(fs.read_file("/a/d.js").as_deref(), Some("y"));
    assert_eq!(fs.list_dir("/a"), Some(vec!["d.js".to_string()]));
  }
}
